//! # Harvestgraph: Dataset Metadata to Operation-Graph Compiler
//!
//! Harvestgraph compiles a declarative description of a dataset's structure
//! (a flat collection of typed records describing files, file collections,
//! record sets, and fields) into an executable dependency graph of
//! primitive data-generation operations. An external executor can traverse
//! the output graph in dependency order to materialize the dataset: fetch
//! remote files, parse tabular data, project columns, assemble records.
//!
//! ## Core Concepts
//!
//! - **Nodes**: typed metadata records with declared relationships
//! - **Structure graph**: who depends on whom to exist or compute
//! - **Operations**: the closed vocabulary of primitive executable steps
//! - **Operation graph**: the partial order those steps must respect
//! - **Issues**: the diagnostic sink both compiler stages report into
//!
//! ## Quick Start
//!
//! ```
//! use harvestgraph::graphs::compile;
//! use harvestgraph::issues::Issues;
//! use harvestgraph::nodes::{Field, FileObject, Metadata, Node, RecordSet, Source, encoding};
//!
//! let nodes = vec![
//!     Node::from(Metadata::new("movielens")),
//!     Node::from(FileObject {
//!         uid: "ratings".into(),
//!         parent_uid: Some("movielens".into()),
//!         name: "ratings".into(),
//!         content_url: "https://example.com/ratings.csv".into(),
//!         encoding_format: encoding::CSV.into(),
//!         contained_in: vec![],
//!     }),
//!     Node::from(RecordSet {
//!         uid: "ratings_records".into(),
//!         parent_uid: Some("movielens".into()),
//!         name: "ratings_records".into(),
//!     }),
//!     Node::from(Field {
//!         uid: "ratings_records/user_id".into(),
//!         parent_uid: Some("ratings_records".into()),
//!         name: "user_id".into(),
//!         source: Some(Source::new(["ratings", "user_id"])),
//!         has_sub_fields: false,
//!     }),
//! ];
//!
//! let computation = compile(Issues::new(), nodes).expect("metadata record present");
//! assert!(!computation.has_errors());
//!
//! // Walk the compiled chain from the Init root.
//! let graph = computation.graph();
//! let mut cursor = graph.init().expect("compiled graphs always have Init");
//! let mut chain = vec![graph.operation(cursor).to_string()];
//! while let Some(&next) = graph.successors(cursor).first() {
//!     chain.push(graph.operation(next).to_string());
//!     cursor = next;
//! }
//! assert_eq!(
//!     chain,
//!     vec![
//!         "Init(movielens)",
//!         "Download(ratings)",
//!         "ReadTable(ratings)",
//!         "ReadField(ratings_records/user_id)",
//!         "GroupRecordSet(ratings_records)",
//!     ]
//! );
//! ```
//!
//! ## Error Handling
//!
//! Both compiler stages are best-effort: recoverable problems (duplicate
//! identifiers, dangling references, malformed field sources) skip the
//! smallest possible unit of work and land on the
//! [`Issues`](issues::Issues) sink instead of aborting. Only an input with
//! no Metadata record at all fails hard, as
//! [`CompileError::NoMetadata`](graphs::CompileError), because no entry
//! node can be designated.
//!
//! Inspect [`ComputationGraph::has_errors`](graphs::ComputationGraph::has_errors)
//! before handing a graph to an executor; the crate never makes that call
//! for you.
//!
//! ## Module Guide
//!
//! - [`nodes`] - Typed dataset metadata records and encoding helpers
//! - [`graphs`] - Structure-graph building, lowering, and validation
//! - [`operations`] - Operation variants and the artifact cache-key contract
//! - [`issues`] - Diagnostic accumulation shared by all stages

pub mod graphs;
pub mod issues;
pub mod nodes;
pub mod operations;
