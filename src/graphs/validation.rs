//! Post-hoc structural validation of compiled operation graphs.

use super::computation::ComputationGraph;

/// Validation logic for [`ComputationGraph`].
impl ComputationGraph {
    /// Check the compiled operation graph for structural problems.
    ///
    /// Purely diagnostic: every finding is appended to the issue sink and
    /// the graph itself is never touched. Callers decide whether to proceed
    /// to execution based on [`has_errors`](Self::has_errors).
    ///
    /// Checks performed:
    ///
    /// - forward and reverse adjacency must mirror each other (the
    ///   defensive stand-in for "the graph is directed"; guaranteed by
    ///   construction, checked anyway);
    /// - no operation may have an edge to itself, since a self-loop can
    ///   never be scheduled by a dependency-order executor. Each self-loop
    ///   is reported with the offending operation's originating record uid.
    pub fn check_graph(&mut self) {
        if !self.graph.adjacency_consistent() {
            self.issues.add_error("Computation graph is not directed.");
        }
        let self_loops: Vec<&str> = self
            .graph
            .ids()
            .filter(|&id| self.graph.successors(id).contains(&id))
            .map(|id| self.graph.operation(id).node_uid.as_str())
            .collect();
        if !self_loops.is_empty() {
            self.issues.add_error(format!(
                "The following operations refer to themselves: {self_loops:?}"
            ));
        }
    }
}
