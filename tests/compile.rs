mod common;

use common::*;
use harvestgraph::graphs::{CompileError, OpId, OperationGraph, compile};
use harvestgraph::issues::Issues;
use harvestgraph::nodes::encoding;
use harvestgraph::operations::OperationKind;

fn chain_from_init(graph: &OperationGraph) -> Vec<String> {
    let mut cursor = graph.init().expect("compiled graphs always have Init");
    let mut chain = vec![graph.operation(cursor).to_string()];
    while let Some(&next) = graph.successors(cursor).first() {
        assert_eq!(
            graph.successors(cursor).len(),
            1,
            "expected a linear chain at {}",
            graph.operation(cursor)
        );
        chain.push(graph.operation(next).to_string());
        cursor = next;
    }
    chain
}

fn reachable_from(graph: &OperationGraph, start: OpId) -> usize {
    let mut visited = vec![false; graph.len()];
    visited[start.index()] = true;
    let mut frontier = vec![start];
    let mut count = 1;
    while let Some(id) = frontier.pop() {
        for &succ in graph.successors(id) {
            if !visited[succ.index()] {
                visited[succ.index()] = true;
                count += 1;
                frontier.push(succ);
            }
        }
    }
    count
}

#[test]
fn end_to_end_csv_dataset_compiles_to_linear_chain() {
    let computation = compile(
        Issues::new(),
        vec![
            metadata("M"),
            file_object("F", Some("M"), "http://x/data.csv", encoding::CSV),
            record_set("R", "M"),
            leaf_field("R/name", "R", &["F", "col"]),
        ],
    )
    .unwrap();

    assert!(!computation.has_errors());
    assert_eq!(
        chain_from_init(computation.graph()),
        vec![
            "Init(M)",
            "Download(F)",
            "ReadTable(F)",
            "ReadField(R/name)",
            "GroupRecordSet(R)",
        ]
    );
}

#[test]
fn init_is_the_sole_root() {
    let computation = compile(
        Issues::new(),
        vec![
            metadata("M"),
            file_object("files/a", Some("M"), "http://x/a.csv", encoding::CSV),
            file_object("files/b", Some("M"), "http://x/b.csv", encoding::CSV),
            file_object("files/c", None, "http://x/c.tar", encoding::TAR),
        ],
    )
    .unwrap();
    let graph = computation.graph();

    let entries = graph.entry_operations();
    let init = graph.init().unwrap();
    assert_eq!(entries, vec![init]);
    assert!(graph.operation(init).is_init());

    // Every originally-rootless operation hangs directly off Init: one
    // Download per file, each reached by exactly one edge.
    let downloads: Vec<_> = graph
        .iter()
        .filter(|(_, op)| matches!(op.kind, OperationKind::Download { .. }))
        .map(|(id, _)| id)
        .collect();
    assert_eq!(downloads.len(), 3);
    for id in downloads {
        assert_eq!(graph.predecessors(id), &[init]);
    }

    // And the whole graph is reachable from Init.
    assert_eq!(reachable_from(graph, init), graph.len());
}

#[test]
fn missing_metadata_is_a_hard_error_with_diagnostics() {
    let result = compile(
        Issues::new(),
        vec![file_object(
            "F",
            None,
            "http://x/data.csv",
            encoding::CSV,
        )],
    );

    let Err(CompileError::NoMetadata { issues }) = result else {
        panic!("expected CompileError::NoMetadata");
    };
    let messages: Vec<_> = issues.errors().map(|i| i.message.clone()).collect();
    assert_eq!(
        messages,
        vec!["No metadata is defined in the dataset.".to_string()]
    );
}

#[test]
fn malformed_field_source_skips_only_that_field() {
    let computation = compile(
        Issues::new(),
        vec![
            metadata("M"),
            file_object("F", Some("M"), "http://x/data.csv", encoding::CSV),
            record_set("R", "M"),
            // Resolves structurally (first segment names F) but has the
            // wrong arity for a leaf field.
            leaf_field("R/broken", "R", &["F"]),
            leaf_field("R/name", "R", &["F", "col"]),
        ],
    )
    .unwrap();
    let graph = computation.graph();

    let messages: Vec<_> = computation
        .issues()
        .errors()
        .map(|i| i.message.clone())
        .collect();
    assert_eq!(messages, vec!["Wrong source in node \"R/broken\"".to_string()]);

    // The sibling still compiled all the way to its record set.
    let read_fields: Vec<_> = graph
        .iter()
        .filter(|(_, op)| matches!(op.kind, OperationKind::ReadField { .. }))
        .collect();
    assert_eq!(read_fields.len(), 1);
    assert_eq!(read_fields[0].1.node_uid, "R/name");
    assert!(
        graph
            .iter()
            .any(|(_, op)| matches!(op.kind, OperationKind::GroupRecordSet { .. }))
    );
}

#[test]
fn overlength_field_source_is_also_skipped() {
    let computation = compile(
        Issues::new(),
        vec![
            metadata("M"),
            file_object("F", Some("M"), "http://x/data.csv", encoding::CSV),
            record_set("R", "M"),
            leaf_field("R/deep", "R", &["F", "col", "sub"]),
        ],
    )
    .unwrap();

    let messages: Vec<_> = computation
        .issues()
        .errors()
        .map(|i| i.message.clone())
        .collect();
    assert_eq!(messages, vec!["Wrong source in node \"R/deep\"".to_string()]);
    assert!(
        !computation
            .graph()
            .iter()
            .any(|(_, op)| matches!(op.kind, OperationKind::ReadField { .. }))
    );
}

#[test]
fn identical_inputs_compile_to_identical_download_parameters() {
    let build = || {
        compile(
            Issues::new(),
            vec![
                metadata("M"),
                file_object("F", Some("M"), "http://x/data.csv", encoding::CSV),
            ],
        )
        .unwrap()
    };
    let first = build();
    let second = build();

    let urls = |graph: &OperationGraph| {
        graph
            .iter()
            .filter_map(|(_, op)| match &op.kind {
                OperationKind::Download { url } => {
                    Some(harvestgraph::operations::cache_key(url))
                }
                _ => None,
            })
            .collect::<Vec<_>>()
    };
    // Deterministic cache keys: repeated compilations hit the same cache.
    assert_eq!(urls(first.graph()), urls(second.graph()));
}
