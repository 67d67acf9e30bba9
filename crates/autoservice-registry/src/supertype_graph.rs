//! Direct supertype edges between classes and their breadth-first closure.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use autoservice_core::ClassId;
use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::{FxHashMap, FxHashSet};

/// Edges point from a class to each of its declared supertypes.
///
/// Closures are memoized; any new edge drops the memo.
#[derive(Debug, Clone, Default)]
pub struct SupertypeGraph {
    graph: DiGraph<ClassId, ()>,
    nodes: FxHashMap<ClassId, NodeIndex>,
    closures: RefCell<FxHashMap<NodeIndex, Rc<[ClassId]>>>,
}

impl SupertypeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn node(&mut self, id: &ClassId) -> NodeIndex {
        if let Some(node) = self.nodes.get(id) {
            return *node;
        }
        let node = self.graph.add_node(id.clone());
        self.nodes.insert(id.clone(), node);
        node
    }

    /// Record that `subtype` directly extends or implements `supertype`.
    pub fn add_edge(&mut self, subtype: &ClassId, supertype: &ClassId) {
        let from = self.node(subtype);
        let to = self.node(supertype);
        if from != to && !self.graph.contains_edge(from, to) {
            self.graph.add_edge(from, to, ());
            self.closures.get_mut().clear();
        }
    }

    /// Direct supertypes in declaration order.
    pub fn direct(&self, id: &ClassId) -> Vec<ClassId> {
        let Some(&node) = self.nodes.get(id) else {
            return Vec::new();
        };
        self.ordered_neighbors(node)
            .into_iter()
            .map(|n| self.graph[n].clone())
            .collect()
    }

    // petgraph yields the most recently added edge first.
    fn ordered_neighbors(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut neighbors: Vec<_> = self.graph.neighbors(node).collect();
        neighbors.reverse();
        neighbors
    }

    /// The class itself followed by every transitive supertype, breadth-first
    /// and deduplicated. Terminates on cycles.
    pub fn closure(&self, id: &ClassId) -> Rc<[ClassId]> {
        let Some(&start) = self.nodes.get(id) else {
            return Rc::from(vec![id.clone()]);
        };
        if let Some(cached) = self.closures.borrow().get(&start) {
            return Rc::clone(cached);
        }

        let mut visited = FxHashSet::default();
        let mut queue = VecDeque::from([start]);
        let mut order = Vec::new();
        visited.insert(start);
        while let Some(node) = queue.pop_front() {
            order.push(self.graph[node].clone());
            for next in self.ordered_neighbors(node) {
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        let closure: Rc<[ClassId]> = Rc::from(order);
        self.closures
            .borrow_mut()
            .insert(start, Rc::clone(&closure));
        closure
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
