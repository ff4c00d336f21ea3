//! Property tests for the two compilation stages.

mod common;
use common::*;

use proptest::prelude::*;
use harvestgraph::graphs::{build_structure_graph, compile};
use harvestgraph::issues::Issues;
use harvestgraph::nodes::{Node, encoding};

/// Generate short lowercase record names.
fn name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,12}").unwrap()
}

/// One Metadata root plus a tabular FileObject per name.
fn flat_dataset(names: &[String]) -> Vec<Node> {
    let mut nodes = vec![metadata("root")];
    for name in names {
        nodes.push(file_object(
            &format!("files/{name}"),
            Some("root"),
            &format!("https://example.com/{name}.csv"),
            encoding::CSV,
        ));
    }
    nodes
}

proptest! {
    #[test]
    fn prop_unique_uids_build_without_errors(
        mut names in prop::collection::vec(name_strategy(), 1..8),
    ) {
        names.sort();
        names.dedup();
        let nodes = flat_dataset(&names);
        let total = nodes.len();

        let mut issues = Issues::new();
        let (entry, graph) = build_structure_graph(&mut issues, nodes);

        prop_assert!(entry.is_some());
        prop_assert_eq!(graph.len(), total);
        prop_assert!(issues.is_empty(), "unexpected issues: {}", issues);
    }

    #[test]
    fn prop_init_is_always_the_single_entry_operation(
        mut names in prop::collection::vec(name_strategy(), 1..8),
    ) {
        names.sort();
        names.dedup();

        let computation = compile(Issues::new(), flat_dataset(&names)).unwrap();
        let graph = computation.graph();
        let init = graph.init().unwrap();

        // Exactly one operation with in-degree 0, and it is Init.
        prop_assert_eq!(graph.entry_operations(), vec![init]);
        prop_assert!(graph.operation(init).is_init());

        // Everything is reachable from Init.
        let mut visited = vec![false; graph.len()];
        visited[init.index()] = true;
        let mut frontier = vec![init];
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
        prop_assert_eq!(count, graph.len());
    }
}
