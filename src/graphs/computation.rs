//! Operation graph compilation by breadth-first lowering.
//!
//! The compiler walks the structure graph layer by layer from the entry
//! node and lowers each record into zero or more [`Operation`]s, chaining
//! them onto the most recent operation of the producing lineage. The
//! resulting [`OperationGraph`] describes a partial order for an external
//! executor: an operation may begin only once every operation with an edge
//! into it has completed.
//!
//! Lowering never aborts early. Malformed records are skipped with a
//! diagnostic on the sink and compilation continues with their siblings, so
//! a best-effort graph is always produced.

use miette::Diagnostic;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::issues::Issues;
use crate::nodes::{Node, encoding};
use crate::operations::{MarkerReason, Operation, OperationKind};

use super::structure::{StructureGraph, StructureNodeId, build_structure_graph};

/// Stable handle to an operation in an [`OperationGraph`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OpId(pub(crate) usize);

impl OpId {
    /// Position of the operation in creation order.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Directed multigraph of primitive executable operations, arena-backed.
#[derive(Debug, Clone, Default)]
pub struct OperationGraph {
    ops: Vec<Operation>,
    preds: Vec<Vec<OpId>>,
    succs: Vec<Vec<OpId>>,
    init: Option<OpId>,
}

impl OperationGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an operation with no edges yet.
    pub fn add_operation(&mut self, op: Operation) -> OpId {
        let id = OpId(self.ops.len());
        self.ops.push(op);
        self.preds.push(Vec::new());
        self.succs.push(Vec::new());
        id
    }

    /// Add a dependency edge: `to` may only run after `from` completed.
    pub fn add_edge(&mut self, from: OpId, to: OpId) {
        self.succs[from.0].push(to);
        self.preds[to.0].push(from);
    }

    /// The operation behind a handle.
    #[must_use]
    pub fn operation(&self, id: OpId) -> &Operation {
        &self.ops[id.0]
    }

    /// The sole root of a compiled graph. `None` only for graphs assembled
    /// by hand.
    #[must_use]
    pub fn init(&self) -> Option<OpId> {
        self.init
    }

    /// Operations `id` has an edge to, in edge insertion order.
    #[must_use]
    pub fn successors(&self, id: OpId) -> &[OpId] {
        &self.succs[id.0]
    }

    /// Operations with an edge into `id`, in edge insertion order.
    #[must_use]
    pub fn predecessors(&self, id: OpId) -> &[OpId] {
        &self.preds[id.0]
    }

    /// All handles in creation order.
    pub fn ids(&self) -> impl Iterator<Item = OpId> + use<> {
        (0..self.ops.len()).map(OpId)
    }

    /// Iterate over handles and operations in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (OpId, &Operation)> {
        self.ops.iter().enumerate().map(|(i, op)| (OpId(i), op))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Operations with in-degree 0.
    #[must_use]
    pub fn entry_operations(&self) -> Vec<OpId> {
        self.ids().filter(|&id| self.preds[id.0].is_empty()).collect()
    }

    pub(crate) fn adjacency_consistent(&self) -> bool {
        super::structure::adjacency_mirrors(&self.succs, &self.preds)
    }
}

impl From<OpId> for usize {
    fn from(id: OpId) -> usize {
        id.0
    }
}

/// Immutable pairing of the diagnostic sink and the compiled operation
/// graph, handed to an external executor.
///
/// Built once by [`ComputationGraph::from_nodes`]; the graph is never
/// edited afterwards. Validation ([`check_graph`](Self::check_graph)) only
/// appends diagnostics to the sink.
#[derive(Debug)]
pub struct ComputationGraph {
    pub(super) issues: Issues,
    pub(super) graph: OperationGraph,
}

impl ComputationGraph {
    /// Pair an existing sink with a hand-assembled graph. Compilation goes
    /// through [`from_nodes`](Self::from_nodes) instead.
    #[must_use]
    pub fn new(issues: Issues, graph: OperationGraph) -> Self {
        Self { issues, graph }
    }

    /// Lower the structure graph into an operation graph.
    ///
    /// Walks the structure graph in breadth-first layers starting at
    /// `entry`. Per record, the last operation of every already-lowered
    /// predecessor lineage is inherited first, then the type-specific
    /// lowering rule runs:
    ///
    /// - leaf Field with a source: a `ReadField` chained onto its
    ///   predecessor, then an upward walk through nested field groups to a
    ///   `GroupRecordSet`;
    /// - FileObject: an entry-point `Download`, extraction sentinels for
    ///   differently-encoded contained resources, a `ReadTable` for tabular
    ///   formats;
    /// - FileSet with containers: a merge sentinel converging all producer
    ///   lineages;
    /// - everything else propagates its predecessor's last operation
    ///   unchanged.
    ///
    /// Finally every operation left with in-degree 0 is anchored under a
    /// single `Init` operation tagged with the entry record.
    #[must_use]
    pub fn from_nodes(
        issues: Issues,
        entry: StructureNodeId,
        structure: &StructureGraph,
    ) -> ComputationGraph {
        let mut issues = issues;
        let mut graph = OperationGraph::new();
        // Most recent operation per structural lineage. BFS layer order
        // guarantees producer lineages are mapped before consumers read
        // them; written at most once per record per lowering rule.
        let mut last_op: FxHashMap<StructureNodeId, OpId> = FxHashMap::default();

        for layer in structure.bfs_layers(entry) {
            for &node_id in &layer {
                for &pred in structure.predecessors(node_id) {
                    if let Some(&op) = last_op.get(&pred) {
                        last_op.insert(node_id, op);
                    }
                }
                match structure.node(node_id) {
                    Node::Field(field) => {
                        let Some(source) = field.source.as_ref().filter(|_| !field.has_sub_fields)
                        else {
                            continue;
                        };
                        if source.reference.len() != 2 {
                            issues
                                .add_error(format!("Wrong source in node \"{}\"", field.uid));
                            continue;
                        }
                        // A missing or un-lowered predecessor means the
                        // source failed to resolve earlier; that error is
                        // already on the sink.
                        let Some(pred_op) = structure
                            .predecessors(node_id)
                            .first()
                            .and_then(|pred| last_op.get(pred).copied())
                        else {
                            continue;
                        };
                        let read = graph.add_operation(Operation::new(
                            OperationKind::ReadField {
                                column: source.reference[1].clone(),
                            },
                            &field.uid,
                        ));
                        graph.add_edge(pred_op, read);
                        last_op.insert(node_id, read);

                        // Walk nested field groups up to the record set.
                        let mut current = read;
                        let mut ancestor = structure.parent(node_id);
                        while let Some(parent_id) = ancestor {
                            match structure.node(parent_id) {
                                Node::Field(group) => {
                                    let marker = graph.add_operation(Operation::new(
                                        OperationKind::Marker {
                                            reason: MarkerReason::FieldGroup,
                                        },
                                        &group.uid,
                                    ));
                                    graph.add_edge(current, marker);
                                    current = marker;
                                    last_op.insert(parent_id, marker);
                                    ancestor = structure.parent(parent_id);
                                }
                                Node::RecordSet(record_set) => {
                                    let group = graph.add_operation(Operation::new(
                                        OperationKind::GroupRecordSet {
                                            name: record_set.name.clone(),
                                        },
                                        &record_set.uid,
                                    ));
                                    graph.add_edge(current, group);
                                    last_op.insert(parent_id, group);
                                    break;
                                }
                                _ => break,
                            }
                        }
                    }
                    Node::FileObject(file) => {
                        // Downloads are entry points of the operation graph;
                        // Init anchors them at the end of the pass.
                        let download = graph.add_operation(Operation::new(
                            OperationKind::Download {
                                url: file.content_url.clone(),
                            },
                            &file.uid,
                        ));
                        let mut current = download;
                        for &succ in structure.successors(node_id) {
                            let succ_node = structure.node(succ);
                            if encoding::is_archive(&file.encoding_format)
                                && succ_node
                                    .encoding_format()
                                    .is_some_and(|format| format != file.encoding_format)
                            {
                                let marker = graph.add_operation(Operation::new(
                                    OperationKind::Marker {
                                        reason: MarkerReason::Extraction,
                                    },
                                    &file.uid,
                                ));
                                graph.add_edge(current, marker);
                                current = marker;
                            }
                        }
                        if encoding::is_tabular(&file.encoding_format) {
                            let read = graph.add_operation(Operation::new(
                                OperationKind::ReadTable {
                                    url: file.content_url.clone(),
                                },
                                &file.uid,
                            ));
                            graph.add_edge(current, read);
                            current = read;
                        }
                        last_op.insert(node_id, current);
                    }
                    Node::FileSet(file_set) => {
                        if !file_set.contained_in.is_empty() {
                            let merge = graph.add_operation(Operation::new(
                                OperationKind::Marker {
                                    reason: MarkerReason::Merge,
                                },
                                &file_set.uid,
                            ));
                            // Producer lineages converge here.
                            for &pred in structure.predecessors(node_id) {
                                if let Some(&pred_op) = last_op.get(&pred) {
                                    graph.add_edge(pred_op, merge);
                                    last_op.insert(pred, merge);
                                }
                            }
                            last_op.insert(node_id, merge);
                        }
                    }
                    // Metadata and RecordSet records emit nothing directly;
                    // the propagation step above carries their lineage.
                    Node::Metadata(_) | Node::RecordSet(_) => {}
                }
            }
        }

        let entries = graph.entry_operations();
        let init = graph.add_operation(Operation::new(
            OperationKind::Init,
            structure.node(entry).uid(),
        ));
        for entry_op in entries {
            graph.add_edge(init, entry_op);
        }
        graph.init = Some(init);

        tracing::debug!(operations = graph.len(), "operation graph compiled");
        ComputationGraph { issues, graph }
    }

    /// The accumulated diagnostic sink.
    #[must_use]
    pub fn issues(&self) -> &Issues {
        &self.issues
    }

    /// The compiled operation graph.
    #[must_use]
    pub fn graph(&self) -> &OperationGraph {
        &self.graph
    }

    /// Whether any error-level diagnostic was recorded across both stages.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.issues.has_errors()
    }

    /// Split into sink and graph, e.g. to hand the graph to an executor.
    #[must_use]
    pub fn into_parts(self) -> (Issues, OperationGraph) {
        (self.issues, self.graph)
    }
}

/// Hard failures of the end-to-end [`compile`] pipeline.
///
/// Everything representable as an accumulated diagnostic stays on the sink;
/// only a state with no designatable entry node short-circuits.
#[derive(Debug, Error, Diagnostic)]
pub enum CompileError {
    /// The input contains no Metadata record, so no entry node exists and
    /// no operation graph can be compiled.
    #[error("no metadata record in input: cannot designate an entry node")]
    #[diagnostic(
        code(harvestgraph::graphs::no_metadata),
        help("Every dataset description must contain exactly one Metadata record.")
    )]
    NoMetadata {
        /// Diagnostics accumulated up to the point of failure.
        issues: Issues,
    },
}

/// Compile a flat record list all the way to a validated computation graph.
///
/// Runs the structure-graph builder, the breadth-first lowering pass, and
/// the post-hoc validator in sequence. Recoverable problems land on the
/// sink inside the returned graph; inspect
/// [`ComputationGraph::has_errors`] before handing the graph to an
/// executor.
pub fn compile(issues: Issues, nodes: Vec<Node>) -> Result<ComputationGraph, CompileError> {
    let mut issues = issues;
    let (entry, structure) = build_structure_graph(&mut issues, nodes);
    let Some(entry) = entry else {
        return Err(CompileError::NoMetadata { issues });
    };
    let mut computation = ComputationGraph::from_nodes(issues, entry, &structure);
    computation.check_graph();
    Ok(computation)
}
