//! Package Tree - hierarchical storage for classes and type aliases.
//!
//! Uses `petgraph::DiGraph` with:
//! - Nodes: `PackageData` (classes and type aliases declared in that package)
//! - Edges: `Contains(name)` from a package to its direct subpackage

use autoservice_core::FqName;
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use rustc_hash::FxHashMap;

use crate::entry::{ClassEntry, TypeAliasEntry};

/// Edge types in the package graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageEdge {
    /// Parent package contains child package.
    /// The String is the child's simple name.
    Contains(String),
}

/// Data stored in each package node.
#[derive(Debug, Clone, Default)]
pub struct PackageData {
    /// Classes by their dotted name relative to the package (`Outer.Inner`).
    pub classes: FxHashMap<String, ClassEntry>,

    /// Type aliases by simple name.
    pub type_aliases: FxHashMap<String, TypeAliasEntry>,
}

impl PackageData {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone)]
pub struct PackageTree {
    graph: DiGraph<PackageData, PackageEdge>,

    /// The root (unnamed) package node.
    root: NodeIndex,
}

impl Default for PackageTree {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageTree {
    /// Create a new package tree with an empty root.
    pub fn new() -> Self {
        let mut graph = DiGraph::new();
        let root = graph.add_node(PackageData::new());
        Self { graph, root }
    }

    pub fn root(&self) -> NodeIndex {
        self.root
    }

    pub fn package(&self, node: NodeIndex) -> Option<&PackageData> {
        self.graph.node_weight(node)
    }

    pub fn package_mut(&mut self, node: NodeIndex) -> Option<&mut PackageData> {
        self.graph.node_weight_mut(node)
    }

    /// Find a direct subpackage by name.
    pub fn find_child(&self, parent: NodeIndex, name: &str) -> Option<NodeIndex> {
        self.graph.edges(parent).find_map(|edge| match edge.weight() {
            PackageEdge::Contains(child) if child == name => Some(edge.target()),
            _ => None,
        })
    }

    pub fn get_or_create_child(&mut self, parent: NodeIndex, name: &str) -> NodeIndex {
        if let Some(child) = self.find_child(parent, name) {
            return child;
        }

        let child = self.graph.add_node(PackageData::new());
        self.graph
            .add_edge(parent, child, PackageEdge::Contains(name.to_string()));
        child
    }

    /// Get or create a package path from root.
    pub fn get_or_create_path<S: AsRef<str>>(&mut self, path: &[S]) -> NodeIndex {
        let mut current = self.root;
        for segment in path {
            current = self.get_or_create_child(current, segment.as_ref());
        }
        current
    }

    /// Get an existing package by path, or None if it doesn't exist.
    pub fn get_path<S: AsRef<str>>(&self, path: &[S]) -> Option<NodeIndex> {
        let mut current = self.root;
        for segment in path {
            current = self.find_child(current, segment.as_ref())?;
        }
        Some(current)
    }

    fn find_parent(&self, node: NodeIndex) -> Option<(NodeIndex, &str)> {
        self.graph
            .edges_directed(node, Direction::Incoming)
            .find_map(|edge| match edge.weight() {
                PackageEdge::Contains(name) => Some((edge.source(), name.as_str())),
            })
    }

    /// Full name of a package node.
    pub fn package_name(&self, node: NodeIndex) -> FqName {
        let mut path = Vec::new();
        let mut current = node;
        while let Some((parent, name)) = self.find_parent(current) {
            path.push(name.to_string());
            current = parent;
        }
        path.reverse();
        FqName::new(path)
    }

    /// Iterate over every package node with its data.
    pub fn packages(&self) -> impl Iterator<Item = (NodeIndex, &PackageData)> {
        self.graph
            .node_indices()
            .filter_map(|node| self.graph.node_weight(node).map(|data| (node, data)))
    }

    pub fn package_count(&self) -> usize {
        self.graph.node_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_find_paths() {
        let mut tree = PackageTree::new();
        let example = tree.get_or_create_path(&["com", "example"]);

        assert_eq!(tree.get_path(&["com", "example"]), Some(example));
        assert!(tree.get_path(&["com", "other"]).is_none());
        assert_eq!(tree.get_or_create_path(&["com", "example"]), example);
        assert_eq!(tree.package_count(), 3);
    }

    #[test]
    fn package_name_walks_to_root() {
        let mut tree = PackageTree::new();
        let node = tree.get_or_create_path(&["kotlin", "collections"]);
        assert_eq!(tree.package_name(node).to_string(), "kotlin.collections");
        assert!(tree.package_name(tree.root()).is_root());
    }

    #[test]
    fn empty_path_is_root() {
        let tree = PackageTree::new();
        let empty: [&str; 0] = [];
        assert_eq!(tree.get_path(&empty), Some(tree.root()));
    }
}
