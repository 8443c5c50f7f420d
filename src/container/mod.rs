//! # Container tree
//!
//! Every domain object in a disk decomposition (the disk itself, each sector,
//! each reconstructed file, each AppleSoft program) is a node in a single
//! parent/child tree. The tree exists so that anomalies discovered anywhere
//! during the walk can be attached to the most specific enclosing object, and
//! so that a caller can recurse the whole decomposition in a stable,
//! deterministic order.
//!
//! Rather than modeling containers as trait objects (which would force every
//! domain type behind a `Box<dyn Container>` and fight the borrow checker
//! over back-references), the tree is an arena: nodes are addressed by
//! [`NodeId`], a plain index into a `Vec`. This is the approach the design
//! notes call for ("a sector handle is `(disk_id, track, sector)` resolvable
//! via the disk... no true cycles are needed in the object graph") applied
//! uniformly to every container, not just sectors.

pub mod anomaly;

pub use anomaly::{Anomaly, AnomalyLevel};

/// Opaque handle to a node in a [`Tree`]. Stable for the lifetime of the tree;
/// never reused.
#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash)]
pub struct NodeId(u32);

/// A single node: a human-readable label, its parent (`None` only for the
/// root), its children in insertion order, and its accumulated anomalies.
#[derive(Debug)]
pub struct Node {
    pub label: String,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub anomalies: Vec<Anomaly>,
}

/// The arena itself. Owned by the root domain object (in this crate, always
/// a [`crate::disk::Disk`]).
#[derive(Debug,Default)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Create the root node. Must be called exactly once, before any
    /// `add_child`.
    pub fn add_root(&mut self, label: impl Into<String>) -> NodeId {
        assert!(self.nodes.is_empty(), "tree already has a root");
        self.nodes.push(Node { label: label.into(), parent: None, children: Vec::new(), anomalies: Vec::new() });
        NodeId(0)
    }

    /// Append a new child under `parent`. A child may have at most one
    /// parent; since nodes are only ever created through this method, a
    /// re-parent attempt is structurally impossible (the child does not yet
    /// exist to be re-parented) rather than a checked runtime error.
    pub fn add_child(&mut self, parent: NodeId, label: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node { label: label.into(), parent: Some(parent), children: Vec::new(), anomalies: Vec::new() });
        self.nodes[parent.0 as usize].children.push(id);
        id
    }

    /// Attach an anomaly to `id`. Never fails; anomalies are accumulated, not
    /// thrown, so a walk can always continue after recording one.
    pub fn append_anomaly(&mut self, id: NodeId, level: AnomalyLevel, message: impl Into<String>) {
        self.nodes[id.0 as usize].anomalies.push(Anomaly::new(level, message));
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    pub fn anomalies(&self, id: NodeId) -> &[Anomaly] {
        &self.nodes[id.0 as usize].anomalies
    }

    /// All anomalies in the whole tree, in depth-first pre-order, alongside
    /// the label of the container each one is attached to.
    pub fn all_anomalies(&self) -> Vec<(&str, &Anomaly)> {
        let mut out = Vec::new();
        if !self.nodes.is_empty() {
            self.recurse_anomalies(NodeId(0), &mut out);
        }
        out
    }

    fn recurse_anomalies<'a>(&'a self, id: NodeId, out: &mut Vec<(&'a str, &'a Anomaly)>) {
        let node = &self.nodes[id.0 as usize];
        for a in &node.anomalies {
            out.push((node.label.as_str(), a));
        }
        for &child in &node.children {
            self.recurse_anomalies(child, out);
        }
    }

    /// Depth-first pre-order traversal of every descendant of `id` (`id`
    /// itself is not visited; callers that want the root included should
    /// call the visitor on it before recursing).
    pub fn recurse(&self, id: NodeId, visitor: &mut dyn FnMut(NodeId, &Node)) {
        for &child in &self.nodes[id.0 as usize].children {
            visitor(child, &self.nodes[child.0 as usize]);
            self.recurse(child, visitor);
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recurse_is_depth_first_preorder() {
        let mut t = Tree::new();
        let root = t.add_root("disk");
        let a = t.add_child(root, "a");
        let _a1 = t.add_child(a, "a1");
        let _b = t.add_child(root, "b");

        let mut order = Vec::new();
        t.recurse(root, &mut |_id, node| order.push(node.label.clone()));
        assert_eq!(order, vec!["a","a1","b"]);
    }

    #[test]
    fn anomalies_accumulate_without_failing() {
        let mut t = Tree::new();
        let root = t.add_root("disk");
        t.append_anomaly(root, AnomalyLevel::Info, "first");
        t.append_anomaly(root, AnomalyLevel::Corruption, "second");
        assert_eq!(t.anomalies(root).len(), 2);
    }
}
