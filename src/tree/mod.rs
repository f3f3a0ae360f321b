//! The merged path tree.
//!
//! # Overview
//!
//! Every record path is inserted into one tree rooted at an unnamed root.
//! Nodes live in an [`Arena`] and refer to each other by [`NodeId`]:
//!
//! * `parent` / `child` / `sibling` give the directory structure. Children are
//!   kept sorted by `(name, vnode)`, so an archive's virtual node sorts right
//!   after the archive file of the same name.
//! * `group` links equivalent nodes into a circular ring (see [`ring`]).
//!
//! While records are being ingested the children of a directory form a
//! circular list whose entry point is the last child, which makes appends of
//! already-sorted input O(1). [`TreeBuilder::finish`] cuts every such ring into
//! a terminated list and hands out the sealed [`Tree`] that the grouping
//! passes work on.
//!
//! # Example
//!
//! ```
//! use finddup::tree::TreeBuilder;
//!
//! let mut builder = TreeBuilder::new().unwrap();
//! builder.insert("photos/2019/a.jpg", 100).unwrap();
//! builder.insert("backup.zip%%%%/2019/a.jpg", 100).unwrap();
//! let tree = builder.finish();
//!
//! let zip = tree.find("backup.zip%%%%").unwrap();
//! assert!(tree.node(zip).is_vnode());
//! assert_eq!(tree.node(tree.root()).size(), 200);
//! ```

pub mod ring;
pub mod walk;

use std::cmp::Ordering;

use crate::arena::{Arena, ArenaError, ArenaId, NameRef, StringPool};

pub use ring::Ring;
pub use walk::{Ancestors, Children};

/// Handle to a node of the tree.
pub type NodeId = ArenaId;

/// Suffix marking a path component as the root of a virtual subtree, such
/// as the contents of an archive.
pub const VNODE_MARKER: &str = "%%%%";

/// Why a node does not count on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dupe {
    /// Repeats the content of the given sibling.
    Sibling(NodeId),
    /// Sole child that its parent directory was collapsed onto.
    Parent,
}

/// One path component.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) name: NameRef,
    pub(crate) size: u64,
    pub(crate) parent: Option<NodeId>,
    pub(crate) child: Option<NodeId>,
    pub(crate) sibling: Option<NodeId>,
    pub(crate) group: Option<NodeId>,
    pub(crate) dupe: Option<Dupe>,
    pub(crate) child_count: u32,
    pub(crate) slave: bool,
    pub(crate) vnode: bool,
    pub(crate) keep: bool,
    pub(crate) visited: bool,
    pub(crate) last_child: bool,
}

impl Node {
    fn new(name: NameRef, vnode: bool) -> Self {
        Self {
            name,
            size: 0,
            parent: None,
            child: None,
            sibling: None,
            group: None,
            dupe: None,
            child_count: 0,
            slave: false,
            vnode,
            keep: false,
            visited: false,
            last_child: false,
        }
    }

    /// Aggregate size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Parent directory, `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Next member of this node's group ring.
    #[must_use]
    pub fn group(&self) -> Option<NodeId> {
        self.group
    }

    /// Dupe marking, if any.
    #[must_use]
    pub fn dupe(&self) -> Option<Dupe> {
        self.dupe
    }

    /// Number of children that count for directory equivalence.
    #[must_use]
    pub fn child_count(&self) -> u32 {
        self.child_count
    }

    /// Whether the node has any children.
    #[must_use]
    pub fn has_children(&self) -> bool {
        self.child.is_some()
    }

    #[must_use]
    pub fn is_slave(&self) -> bool {
        self.slave
    }

    #[must_use]
    pub fn is_vnode(&self) -> bool {
        self.vnode
    }

    #[must_use]
    pub fn is_kept(&self) -> bool {
        self.keep
    }

    #[must_use]
    pub fn is_sibling_dupe(&self) -> bool {
        matches!(self.dupe, Some(Dupe::Sibling(_)))
    }

    #[must_use]
    pub fn is_parent_dupe(&self) -> bool {
        self.dupe == Some(Dupe::Parent)
    }
}

/// Split a raw path component into its stored name and vnode flag.
#[must_use]
pub fn split_marker(component: &str) -> (&str, bool) {
    match component.strip_suffix(VNODE_MARKER) {
        Some(name) => (name, true),
        None => (component, false),
    }
}

/// Sealed tree with terminated sibling lists.
#[derive(Debug)]
pub struct Tree {
    nodes: Arena<Node>,
    names: StringPool,
    root: NodeId,
}

impl Tree {
    fn empty() -> Result<Self, ArenaError> {
        let mut names = StringPool::new();
        let mut nodes = Arena::new();
        let root_name = names.intern("")?;
        let root = nodes.alloc(Node::new(root_name, false))?;
        Ok(Self { nodes, names, root })
    }

    /// The unnamed root that every record path hangs off.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Access a node.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }

    /// Stored name of a node (without the vnode marker).
    #[must_use]
    pub fn name(&self, id: NodeId) -> &str {
        self.names.get(self.nodes[id].name)
    }

    /// Number of nodes, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether only the root exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Bytes reserved for nodes and names.
    #[must_use]
    pub fn allocated_bytes(&self) -> usize {
        self.nodes.allocated_bytes() + self.names.allocated_bytes()
    }

    /// Every node id, in creation order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        self.nodes.ids()
    }

    /// Full slash-separated path of a node, vnode markers included.
    ///
    /// The root renders as the empty string.
    #[must_use]
    pub fn path(&self, id: NodeId) -> String {
        let mut parts: Vec<&str> = Vec::new();
        let mut cur = Some(id);
        while let Some(n) = cur {
            if n == self.root {
                break;
            }
            if self.nodes[n].vnode {
                parts.push(VNODE_MARKER);
            }
            parts.push(self.name(n));
            parts.push("/");
            cur = self.nodes[n].parent;
        }
        parts.pop();
        parts.reverse();
        parts.concat()
    }

    /// Look up a node by path, using the same component rules as insertion.
    #[must_use]
    pub fn find(&self, path: &str) -> Option<NodeId> {
        let mut cur = self.root;
        for (i, component) in path.split('/').enumerate() {
            if component.is_empty() && i > 0 {
                continue;
            }
            let (name, vnode) = split_marker(component);
            let mut found = None;
            for c in self.children(cur) {
                match self.key_cmp(c, name, vnode) {
                    Ordering::Less => continue,
                    Ordering::Equal => found = Some(c),
                    Ordering::Greater => {}
                }
                break;
            }
            cur = found?;
        }
        Some(cur)
    }

    /// Clear the scratch `visited` flag on every node.
    pub fn reset_visited(&mut self) {
        for id in self.nodes.ids() {
            self.nodes[id].visited = false;
        }
    }

    /// Clear every `keep` flag.
    pub fn reset_keep(&mut self) {
        for id in self.nodes.ids() {
            self.nodes[id].keep = false;
        }
    }

    fn key_cmp(&self, id: NodeId, name: &str, vnode: bool) -> Ordering {
        self.name(id)
            .cmp(name)
            .then(self.nodes[id].vnode.cmp(&vnode))
    }
}

/// Result of looking a name up among a parent's children.
enum Slot {
    Found(NodeId),
    Vacant(Link),
}

/// Where a new child goes in its parent's ring.
enum Link {
    First,
    Append,
    After(NodeId),
}

/// Ingestion-time view of the tree.
///
/// Sibling lists are circular here, so traversal helpers of [`Tree`] are not
/// exposed until [`finish`](Self::finish) seals the structure.
#[derive(Debug)]
pub struct TreeBuilder {
    tree: Tree,
}

impl TreeBuilder {
    /// Create a builder holding only the root.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError`] if the first arena block cannot be reserved.
    pub fn new() -> Result<Self, ArenaError> {
        Ok(Self {
            tree: Tree::empty()?,
        })
    }

    /// Insert (or find) the node for `path` and return it.
    ///
    /// Missing intermediate directories are created. If anything along the
    /// path had to be created, `size` is added to the leaf and its ancestors,
    /// stopping after the first virtual node so that archive contents are not
    /// charged to the directory holding the archive a second time.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError`] if a node or its name cannot be allocated.
    pub fn insert(&mut self, path: &str, size: u64) -> Result<NodeId, ArenaError> {
        let mut cur = self.tree.root;
        let mut created = false;

        for (i, component) in path.split('/').enumerate() {
            if component.is_empty() && i > 0 {
                continue;
            }
            let (name, vnode) = split_marker(component);
            cur = match self.locate(cur, name, vnode) {
                Slot::Found(id) => id,
                Slot::Vacant(link) => {
                    created = true;
                    self.link_child(cur, link, name, vnode)?
                }
            };
        }

        if created {
            let mut up = Some(cur);
            while let Some(id) = up {
                let node = self.tree.node_mut(id);
                node.size = node.size.saturating_add(size);
                if node.vnode {
                    break;
                }
                up = node.parent;
            }
        }

        Ok(cur)
    }

    /// Access a node.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        self.tree.node(id)
    }

    /// Full path of a node.
    #[must_use]
    pub fn path(&self, id: NodeId) -> String {
        self.tree.path(id)
    }

    /// Number of nodes, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Whether only the root exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub(crate) fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    /// Cut every sibling ring at its last child and seal the tree.
    #[must_use]
    pub fn finish(mut self) -> Tree {
        let ids: Vec<NodeId> = self.tree.ids().collect();
        for id in ids {
            let Some(tail) = self.tree.nodes[id].child else {
                continue;
            };
            debug_assert!(self.tree.nodes[tail].last_child);
            let head = self.tree.nodes[tail].sibling;
            self.tree.nodes[tail].sibling = None;
            self.tree.nodes[id].child = head;
        }
        self.tree
    }

    fn locate(&self, parent: NodeId, name: &str, vnode: bool) -> Slot {
        let tree = &self.tree;
        let Some(tail) = tree.nodes[parent].child else {
            return Slot::Vacant(Link::First);
        };
        match tree.key_cmp(tail, name, vnode) {
            Ordering::Equal => return Slot::Found(tail),
            Ordering::Less => return Slot::Vacant(Link::Append),
            Ordering::Greater => {}
        }

        // The tail sorts after the new key, so the scan stops at the tail at the latest.
        let mut prev = tail;
        while let Some(p) = tree.nodes[prev].sibling {
            match tree.key_cmp(p, name, vnode) {
                Ordering::Equal => return Slot::Found(p),
                Ordering::Greater => break,
                Ordering::Less => prev = p,
            }
        }
        Slot::Vacant(Link::After(prev))
    }

    fn link_child(
        &mut self,
        parent: NodeId,
        link: Link,
        name: &str,
        vnode: bool,
    ) -> Result<NodeId, ArenaError> {
        let name = self.tree.names.intern(name)?;
        let id = self.tree.nodes.alloc(Node::new(name, vnode))?;
        let nodes = &mut self.tree.nodes;
        nodes[id].parent = Some(parent);

        match link {
            Link::First => {
                nodes[id].sibling = Some(id);
                nodes[id].last_child = true;
                nodes[parent].child = Some(id);
            }
            Link::Append => {
                if let Some(tail) = nodes[parent].child {
                    nodes[id].sibling = nodes[tail].sibling;
                    nodes[tail].sibling = Some(id);
                    nodes[tail].last_child = false;
                }
                nodes[id].last_child = true;
                nodes[parent].child = Some(id);
            }
            Link::After(prev) => {
                nodes[id].sibling = nodes[prev].sibling;
                nodes[prev].sibling = Some(id);
            }
        }
        Ok(id)
    }
}
