use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use flowlens::config::LayoutConfig;
use flowlens::finding::{Finding, Severity};
use flowlens::graph::{Edge, Graph, NodeRef};
use flowlens::layout::compute_layout;

fn synthetic_workflow(nodes: usize, extra_edges: usize) -> (Graph, Vec<Finding>) {
    let mut graph = Graph::new();
    for i in 0..nodes {
        graph.nodes.push(NodeRef {
            id: format!("n{i}"),
            node_type: "step".to_string(),
            name: Some(format!("Step {i}")),
            ..NodeRef::default()
        });
    }
    for i in 0..nodes.saturating_sub(1) {
        graph.edges.push(Edge {
            from: format!("n{i}"),
            to: format!("n{}", i + 1),
            on: None,
        });
    }
    let mut count = 0usize;
    'outer: for i in 0..nodes {
        for j in (i + 2)..nodes {
            if count >= extra_edges {
                break 'outer;
            }
            graph.edges.push(Edge {
                from: format!("n{i}"),
                to: format!("n{j}"),
                on: None,
            });
            count += 1;
        }
    }
    let findings = (0..nodes)
        .step_by(3)
        .map(|i| Finding {
            rule: "T01".to_string(),
            severity: Severity::Should,
            message: "missing timeout".to_string(),
            path: "workflow.json".to_string(),
            line: i as u64,
            node_id: Some(format!("n{i}")),
            raw_details: None,
        })
        .collect();
    (graph, findings)
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    let config = LayoutConfig::default();
    for (nodes, extra_edges) in [(10usize, 5usize), (50, 60), (200, 300)] {
        let name = format!("workflow_{nodes}_{extra_edges}");
        let (graph, findings) = synthetic_workflow(nodes, extra_edges);
        group.bench_with_input(
            BenchmarkId::from_parameter(name),
            &(graph, findings),
            |b, (graph, findings)| {
                b.iter(|| {
                    let diagram = compute_layout(black_box(graph), findings, &config);
                    black_box(diagram.nodes.len());
                });
            },
        );
    }
    group.finish();
}

fn bench_codec(c: &mut Criterion) {
    use flowlens::codec::{decode_state, encode_state, AppState};

    let mut group = c.benchmark_group("codec");
    let workflow = serde_json::json!({
        "name": "bench",
        "nodes": (0..100).map(|i| serde_json::json!({
            "id": format!("n{i}"),
            "name": format!("Step {i}"),
            "type": "step"
        })).collect::<Vec<_>>(),
        "connections": {}
    });
    let state = AppState { workflow };
    let encoded = encode_state(&state);
    group.bench_function("encode_100_nodes", |b| {
        b.iter(|| black_box(encode_state(black_box(&state))));
    });
    group.bench_function("decode_100_nodes", |b| {
        b.iter(|| black_box(decode_state(black_box(&encoded))));
    });
    group.finish();
}

criterion_group!(benches, bench_layout, bench_codec);
criterion_main!(benches);
