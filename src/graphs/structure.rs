//! Structure graph: declared relationships between dataset records.
//!
//! The structure graph encodes "who depends on whom to exist or compute".
//! Records live in an arena indexed by [`StructureNodeId`] handles, with
//! predecessor and successor adjacency kept as first-class owned lists.
//! Edges point from producer to consumer.
//!
//! Predecessors are determined per record by the first matching rule:
//!
//! - FileObject/FileSet with a non-empty `contained_in`: each referenced
//!   container is a predecessor.
//! - Field with a resolvable `source`: the referenced node (whole-path uid
//!   concatenation first, then the first path segment) is the single
//!   predecessor.
//! - Anything else: the record named by `parent_uid` is the predecessor.
//!
//! Each non-Metadata record additionally carries a resolved `parent`
//! back-pointer used by the lowering pass to walk nested field groups
//! upward. It is distinct from graph edges.

use rustc_hash::FxHashMap;

use crate::issues::Issues;
use crate::nodes::Node;

/// Stable handle to a record in a [`StructureGraph`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StructureNodeId(pub(crate) usize);

impl StructureNodeId {
    /// Position of the record in input order.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct StructureEntry {
    node: Node,
    parent: Option<StructureNodeId>,
}

/// Directed multigraph over dataset records, arena-backed.
///
/// Built once by [`build_structure_graph`] and never mutated afterwards.
/// Every input record occupies one arena slot; uid lookup resolves through
/// a separate index with an explicit last-wins policy for duplicates.
#[derive(Debug, Clone, Default)]
pub struct StructureGraph {
    entries: Vec<StructureEntry>,
    uid_index: FxHashMap<String, StructureNodeId>,
    preds: Vec<Vec<StructureNodeId>>,
    succs: Vec<Vec<StructureNodeId>>,
}

impl StructureGraph {
    fn push(&mut self, node: Node) -> StructureNodeId {
        let id = StructureNodeId(self.entries.len());
        self.entries.push(StructureEntry { node, parent: None });
        self.preds.push(Vec::new());
        self.succs.push(Vec::new());
        id
    }

    fn add_edge(&mut self, from: StructureNodeId, to: StructureNodeId) {
        self.succs[from.0].push(to);
        self.preds[to.0].push(from);
    }

    /// The record behind a handle.
    #[must_use]
    pub fn node(&self, id: StructureNodeId) -> &Node {
        &self.entries[id.0].node
    }

    /// Resolved structural parent back-pointer, if any.
    #[must_use]
    pub fn parent(&self, id: StructureNodeId) -> Option<StructureNodeId> {
        self.entries[id.0].parent
    }

    /// Resolve a uid through the index (last-wins under duplicates).
    #[must_use]
    pub fn resolve(&self, uid: &str) -> Option<StructureNodeId> {
        self.uid_index.get(uid).copied()
    }

    /// Records with an edge into `id`, in edge insertion order.
    #[must_use]
    pub fn predecessors(&self, id: StructureNodeId) -> &[StructureNodeId] {
        &self.preds[id.0]
    }

    /// Records `id` has an edge to, in edge insertion order.
    #[must_use]
    pub fn successors(&self, id: StructureNodeId) -> &[StructureNodeId] {
        &self.succs[id.0]
    }

    /// All handles in input order.
    pub fn ids(&self) -> impl Iterator<Item = StructureNodeId> + use<> {
        (0..self.entries.len()).map(StructureNodeId)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Breadth-first layers from `entry`: layer `k` holds the records at
    /// shortest-edge-distance `k`. Discovery order within a layer follows
    /// adjacency insertion order, so layering is deterministic.
    ///
    /// This ordering is the invariant the lowering pass relies on: every
    /// record reachable from the entry first appears in a layer strictly
    /// after the layer that discovered it.
    #[must_use]
    pub fn bfs_layers(&self, entry: StructureNodeId) -> Vec<Vec<StructureNodeId>> {
        let mut visited = vec![false; self.entries.len()];
        visited[entry.0] = true;
        let mut layers = Vec::new();
        let mut frontier = vec![entry];
        while !frontier.is_empty() {
            let mut next = Vec::new();
            for &id in &frontier {
                for &succ in self.successors(id) {
                    if !visited[succ.0] {
                        visited[succ.0] = true;
                        next.push(succ);
                    }
                }
            }
            layers.push(std::mem::replace(&mut frontier, next));
        }
        layers
    }

    /// Every successor edge must be mirrored by a predecessor entry and vice
    /// versa. Structurally guaranteed by `add_edge`; checked defensively.
    pub(crate) fn adjacency_consistent(&self) -> bool {
        adjacency_mirrors(&self.succs, &self.preds)
    }
}

/// Check that forward and reverse adjacency describe the same edge multiset.
pub(crate) fn adjacency_mirrors<T>(succs: &[Vec<T>], preds: &[Vec<T>]) -> bool
where
    T: Copy + Into<usize>,
{
    if succs.len() != preds.len() {
        return false;
    }
    let count = |lists: &[Vec<T>], reversed: bool| {
        let mut edges: FxHashMap<(usize, usize), usize> = FxHashMap::default();
        for (from, targets) in lists.iter().enumerate() {
            for &to in targets {
                let to: usize = to.into();
                let key = if reversed { (to, from) } else { (from, to) };
                *edges.entry(key).or_insert(0) += 1;
            }
        }
        edges
    };
    count(succs, false) == count(preds, true)
}

impl From<StructureNodeId> for usize {
    fn from(id: StructureNodeId) -> usize {
        id.0
    }
}

/// Build the structure graph from a flat record list.
///
/// Returns the designated entry node (the single Metadata record) and the
/// graph. Recoverable problems — duplicate uids, references to unknown
/// records, a malformed relationship — are reported to `issues` and the
/// smallest affected unit is skipped; a best-effort graph is always
/// returned. Only the absence of any Metadata record leaves the entry
/// handle empty.
pub fn build_structure_graph(
    issues: &mut Issues,
    nodes: Vec<Node>,
) -> (Option<StructureNodeId>, StructureGraph) {
    let mut graph = StructureGraph::default();

    // Arena and uid index first; duplicate uids keep the latest record.
    for node in nodes {
        let uid = node.uid().to_string();
        let id = graph.push(node);
        if graph.uid_index.insert(uid.clone(), id).is_some() {
            issues.add_error(format!("Duplicate node with the same identifier: {uid}"));
        }
    }

    for index in 0..graph.entries.len() {
        let id = StructureNodeId(index);
        let node = graph.entries[index].node.clone();
        if node.is_metadata() {
            continue;
        }

        let parent = match node.parent_uid() {
            Some(parent_uid) => {
                let resolved = graph.resolve(parent_uid);
                if resolved.is_none() {
                    issues.add_error(format!(
                        "There is a reference to node named \"{parent_uid}\", but this node doesn't exist."
                    ));
                }
                resolved
            }
            None => None,
        };
        graph.entries[index].parent = parent;

        match &node {
            Node::FileObject(_) | Node::FileSet(_) if !node.contained_in().is_empty() => {
                for container in node.contained_in() {
                    match graph.resolve(container) {
                        Some(source) => graph.add_edge(source, id),
                        None => issues.add_error(format!(
                            "There is a reference to node named \"{container}\", but this node doesn't exist."
                        )),
                    }
                }
            }
            Node::Field(field) if field.source.is_some() => {
                // `source.is_some()` guaranteed by the match guard.
                let Some(source) = field.source.as_ref() else {
                    continue;
                };
                let joined = source.concatenated_uid();
                // The whole reference may name another field, or its first
                // segment may name a top-level record.
                if let Some(origin) = graph.resolve(&joined) {
                    graph.add_edge(origin, id);
                } else if let Some(origin) = source
                    .reference
                    .first()
                    .and_then(|head| graph.resolve(head))
                {
                    graph.add_edge(origin, id);
                } else {
                    issues.add_error(format!("Source refers to an unknown node \"{joined}\"."));
                }
            }
            _ => {
                if let Some(parent_id) = parent {
                    graph.add_edge(parent_id, id);
                }
            }
        }
    }

    // The single Metadata record is the entry node; first in input order
    // wins if duplicates slipped through.
    let entry = graph.ids().find(|&id| graph.node(id).is_metadata());
    let Some(entry) = entry else {
        issues.add_error("No metadata is defined in the dataset.");
        return (None, graph);
    };

    // Anchor top-level resources that nothing else produces to the root.
    let rootless: Vec<StructureNodeId> = graph
        .ids()
        .filter(|&id| {
            id != entry && graph.predecessors(id).is_empty() && graph.node(id).is_resource()
        })
        .collect();
    for id in rootless {
        tracing::debug!(node = %graph.node(id), "anchoring rootless resource to entry node");
        graph.add_edge(entry, id);
    }

    if !graph.adjacency_consistent() {
        issues.add_error("Structure graph is not directed.");
    }

    tracing::debug!(
        records = graph.len(),
        entry = %graph.node(entry),
        "structure graph built"
    );
    (Some(entry), graph)
}
