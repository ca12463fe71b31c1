//! Parent pointers and g-values for plan reconstruction (spec §3 "Search
//! Node" / §4.9 step 2 "reconstruct plan"). Grounded on the teacher's
//! `search/search_space.rs`: a `SegVec` parallel to the state registry's
//! arena, indexed by the same [`StateId`], growing on demand as new states
//! are registered.

use crate::search::search_node::SearchNode;
use crate::state::StateId;
use crate::task::OperatorId;
use segvec::{Linear, SegVec};

#[derive(Debug)]
pub struct SearchSpace {
    nodes: SegVec<SearchNode, Linear>,
}

impl SearchSpace {
    pub fn new() -> Self {
        SearchSpace { nodes: SegVec::new() }
    }

    /// Ensures a node exists for `id`, growing the arena with fresh
    /// [`SearchNode::new_unvisited`] placeholders as needed; state ids are
    /// assigned densely ascending by the registry, so this never leaves a
    /// gap unfilled.
    fn ensure(&mut self, id: StateId) {
        while self.nodes.len() <= id.index() {
            self.nodes.push(SearchNode::new_unvisited());
        }
    }

    pub fn node(&self, id: StateId) -> &SearchNode {
        self.nodes.get(id.index()).expect("search node missing for registered state")
    }

    pub fn node_mut(&mut self, id: StateId) -> &mut SearchNode {
        self.ensure(id);
        self.nodes.get_mut(id.index()).expect("just ensured")
    }

    /// Walks parent pointers back from `goal` to the root, returning the
    /// operators in forward (root-to-goal) order.
    pub fn extract_plan(&self, goal: StateId) -> Vec<OperatorId> {
        let mut steps = Vec::new();
        let mut current = goal;
        while let Some((parent, op)) = self.node(current).parent() {
            steps.push(op);
            current = parent;
        }
        steps.reverse();
        steps
    }
}

impl Default for SearchSpace {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_plan_by_walking_parent_pointers() {
        let mut space = SearchSpace::new();
        space.node_mut(StateId(0)).open(0, None);
        space.node_mut(StateId(1)).open(3, Some((StateId(0), OperatorId(0))));
        space.node_mut(StateId(2)).open(5, Some((StateId(1), OperatorId(1))));
        assert_eq!(space.extract_plan(StateId(2)), vec![OperatorId(0), OperatorId(1)]);
    }

    #[test]
    fn root_state_extracts_an_empty_plan() {
        let mut space = SearchSpace::new();
        space.node_mut(StateId(0)).open(0, None);
        assert_eq!(space.extract_plan(StateId(0)), vec![]);
    }
}
