//! Graph construction and compilation for dataset generation.
//!
//! This module is the two-stage core of the crate. The first stage,
//! [`build_structure_graph`], turns the flat record list into a
//! [`StructureGraph`]: a directed multigraph encoding which record depends
//! on which, with the single Metadata record designated as entry node. The
//! second stage, [`ComputationGraph::from_nodes`], walks that graph
//! breadth-first and lowers every record into primitive
//! [`Operation`](crate::operations::Operation)s, chained in dependency
//! order and rooted under a single `Init` operation.
//!
//! # Core Concepts
//!
//! - **Structure graph**: declared relationships between records
//!   (containment, field sources, parenthood), producer → consumer.
//! - **Operation graph**: executable steps derived from the structure
//!   graph; the partial order an external executor must respect.
//! - **Entry node / Init**: the unique root of each graph.
//! - **Issue sink**: both stages report recoverable problems to
//!   [`Issues`](crate::issues::Issues) and keep going.
//!
//! # Quick Start
//!
//! ```
//! use harvestgraph::graphs::compile;
//! use harvestgraph::issues::Issues;
//! use harvestgraph::nodes::{FileObject, Metadata, Node, encoding};
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
//! ];
//!
//! let computation = compile(Issues::new(), nodes).expect("metadata record present");
//! assert!(!computation.has_errors());
//!
//! // The graph has a single root from which everything is reachable.
//! let graph = computation.graph();
//! let init = graph.init().expect("compiled graphs always have Init");
//! assert!(graph.operation(init).is_init());
//! ```
//!
//! # Two-stage pipeline, step by step
//!
//! ```
//! use harvestgraph::graphs::{ComputationGraph, build_structure_graph};
//! use harvestgraph::issues::Issues;
//! use harvestgraph::nodes::{Metadata, Node};
//!
//! let mut issues = Issues::new();
//! let (entry, structure) =
//!     build_structure_graph(&mut issues, vec![Node::from(Metadata::new("ds"))]);
//! let entry = entry.expect("metadata record present");
//!
//! let mut computation = ComputationGraph::from_nodes(issues, entry, &structure);
//! computation.check_graph();
//! assert!(!computation.has_errors());
//! ```

mod computation;
mod structure;
mod validation;


pub use computation::{CompileError, ComputationGraph, OpId, OperationGraph, compile};
pub use structure::{StructureGraph, StructureNodeId, build_structure_graph};
