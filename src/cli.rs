use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};

use crate::codec::{AppState, SHARE_URL_BUDGET, decode_state, encode_state};
use crate::config::load_config;
use crate::finding::Finding;
use crate::graph::Graph;
use crate::layout::compute_layout;

#[derive(Parser, Debug)]
#[command(name = "flens", version, about = "Workflow lint viewer core: layout and share links")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Lay out a workflow graph and print the diagram as JSON
    Layout {
        /// Graph JSON (rule engine output contract) or '-' for stdin
        #[arg(short = 'i', long = "input")]
        input: PathBuf,

        /// Findings JSON array to annotate nodes with
        #[arg(short = 'f', long = "findings")]
        findings: Option<PathBuf>,

        /// Output file; stdout if omitted
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,

        /// Layout config JSON file
        #[arg(short = 'c', long = "configFile")]
        config: Option<PathBuf>,
    },
    /// Compress a workflow document into a URL-safe share string
    Encode {
        /// Workflow JSON or '-' for stdin
        #[arg(short = 'i', long = "input")]
        input: PathBuf,
    },
    /// Expand a share string back into workflow JSON
    Decode {
        /// The encoded share string
        encoded: String,
    },
}

pub fn run() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    match args.command {
        Command::Layout {
            input,
            findings,
            output,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            let graph_json = read_input(&input)?;
            let graph = Graph::from_json(&graph_json)?;
            let findings: Vec<Finding> = match findings {
                Some(path) => {
                    let raw = read_input(&path)?;
                    serde_json::from_str(&raw)
                        .with_context(|| format!("parsing findings {}", path.display()))?
                }
                None => Vec::new(),
            };
            let diagram = compute_layout(&graph, &findings, &config);
            let rendered = serde_json::to_string_pretty(&diagram)?;
            write_output(&rendered, output.as_deref())?;
        }
        Command::Encode { input } => {
            let raw = read_input(&input)?;
            let workflow: serde_json::Value =
                serde_json::from_str(&raw).context("parsing workflow JSON")?;
            if !workflow.is_object() {
                return Err(anyhow!("workflow document must be a JSON object"));
            }
            let encoded = encode_state(&AppState { workflow });
            if encoded.len() > SHARE_URL_BUDGET {
                eprintln!(
                    "warning: encoded state is {} characters, past the {} character URL budget",
                    encoded.len(),
                    SHARE_URL_BUDGET
                );
            }
            println!("{encoded}");
        }
        Command::Decode { encoded } => {
            let state = decode_state(encoded.trim())
                .ok_or_else(|| anyhow!("input is not a valid share string"))?;
            println!("{}", serde_json::to_string_pretty(&state.workflow)?);
        }
    }
    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn write_output(content: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("writing {}", path.display()))?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}
