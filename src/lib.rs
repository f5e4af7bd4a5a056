#[cfg(feature = "cli")]
pub mod cli;
pub mod codec;
pub mod config;
pub mod finding;
pub mod graph;
pub mod layout;
pub mod rules;
pub mod view;

#[cfg(feature = "cli")]
pub use cli::run;
pub use codec::{AppState, SHARE_URL_BUDGET, decode_state, encode_state};
pub use config::{LayoutConfig, load_config};
pub use finding::{
    Finding, Severity, SeverityCounts, counts_by_severity, group_by_node, max_severity,
};
pub use graph::{Edge, EdgeKind, Graph, GraphError, NodeRef};
pub use layout::{Diagram, EdgeStroke, Position, PositionedNode, StyledEdge, compute_layout};
pub use rules::{EngineConfig, RuleInfo, RuleRegistry, RuleToggle, registry};
pub use view::ViewState;
