use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use anyhow::ensure;

use super::behavior::Behavior;

/// Weak back-reference from a child (or a behavior) to its node.
pub(crate) type NodeLink = Weak<RefCell<NodeData>>;

pub(crate) struct NodeData {
    name: String,
    enabled: bool,
    parent: NodeLink,
    children: Vec<SceneNode>,
    behaviors: Vec<Behavior>,
}

/// Shared handle to a node in the scene tree.
///
/// Cloning the handle does not clone the node. Parents own their children;
/// a node with no parent lives as long as some handle to it does.
#[derive(Clone)]
pub struct SceneNode(Rc<RefCell<NodeData>>);

impl SceneNode {
    /// Creates an enabled, unnamed, parentless node.
    pub fn new() -> Self {
        Self::named("")
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self(Rc::new(RefCell::new(NodeData {
            name: name.into(),
            enabled: true,
            parent: Weak::new(),
            children: Vec::new(),
            behaviors: Vec::new(),
        })))
    }

    pub fn name(&self) -> String {
        self.0.borrow().name.clone()
    }

    pub fn enabled(&self) -> bool {
        self.0.borrow().enabled
    }

    /// Enables or disables the node. A disabled node hides its whole subtree
    /// from dispatch without detaching anything.
    pub fn set_enabled(&self, enabled: bool) {
        self.0.borrow_mut().enabled = enabled;
    }

    pub fn parent(&self) -> Option<SceneNode> {
        self.0.borrow().parent.upgrade().map(SceneNode)
    }

    /// Moves this node under `parent`.
    ///
    /// The node is removed from its previous parent's child list and appended
    /// to the end of `parent`'s. Re-assigning the current parent therefore
    /// moves the node to the back without duplicating it.
    ///
    /// Fails, leaving the tree untouched, if `parent` is this node or one of
    /// its descendants.
    pub fn set_parent(&self, parent: &SceneNode) -> anyhow::Result<()> {
        ensure!(
            !self.is_self_or_ancestor_of(parent),
            "cannot parent scene node {:?} under itself or its own descendant {:?}",
            self.name(),
            parent.name(),
        );

        self.detach();
        self.0.borrow_mut().parent = Rc::downgrade(&parent.0);
        parent.0.borrow_mut().children.push(self.clone());
        Ok(())
    }

    /// Removes this node from its parent, making it a root candidate.
    ///
    /// Returns `false` if it had no parent.
    pub fn detach(&self) -> bool {
        let Some(old) = self.parent() else {
            return false;
        };
        {
            let mut old = old.0.borrow_mut();
            if let Some(pos) = old.children.iter().position(|c| c.ptr_eq(self)) {
                old.children.remove(pos);
            }
        }
        self.0.borrow_mut().parent = Weak::new();
        true
    }

    /// Snapshot of the children. Editing the returned vector does not touch
    /// the tree; use [`set_parent`](Self::set_parent) for that.
    pub fn children(&self) -> Vec<SceneNode> {
        self.0.borrow().children.clone()
    }

    /// Snapshot of the attached behaviors, in attachment order.
    pub fn behaviors(&self) -> Vec<Behavior> {
        self.0.borrow().behaviors.clone()
    }

    /// First attached behavior created with kind `K`, if any.
    pub fn behavior<K: 'static>(&self) -> Option<Behavior> {
        self.0
            .borrow()
            .behaviors
            .iter()
            .find(|b| b.is::<K>())
            .cloned()
    }

    /// Whether both handles refer to the same node.
    #[inline]
    pub fn ptr_eq(&self, other: &SceneNode) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Depth-first preorder walk of the enabled part of the subtree rooted
    /// here. A disabled node is skipped together with all its descendants.
    pub fn enabled_preorder(&self) -> Vec<SceneNode> {
        let mut out = Vec::new();
        let mut stack = vec![self.clone()];

        while let Some(node) = stack.pop() {
            let data = node.0.borrow();
            if !data.enabled {
                continue;
            }
            // Reversed so the first child is visited first.
            stack.extend(data.children.iter().rev().cloned());
            drop(data);
            out.push(node);
        }
        out
    }

    /// Non-owning handle to this node, for handlers that act on it.
    pub fn downgrade(&self) -> WeakSceneNode {
        WeakSceneNode(self.link())
    }

    pub(crate) fn link(&self) -> NodeLink {
        Rc::downgrade(&self.0)
    }

    pub(crate) fn from_link(link: &NodeLink) -> Option<SceneNode> {
        link.upgrade().map(SceneNode)
    }

    pub(crate) fn attach(&self, behavior: Behavior) {
        self.0.borrow_mut().behaviors.push(behavior);
    }

    fn is_self_or_ancestor_of(&self, node: &SceneNode) -> bool {
        let mut cursor = Some(node.clone());
        while let Some(n) = cursor {
            if n.ptr_eq(self) {
                return true;
            }
            cursor = n.parent();
        }
        false
    }
}

/// Non-owning handle to a [`SceneNode`].
///
/// A handler that captures a strong `SceneNode` keeps its own node alive
/// through the node's behavior list, so a detached subtree is never freed.
/// Capture this instead and upgrade it when the handler runs.
#[derive(Clone, Default)]
pub struct WeakSceneNode(NodeLink);

impl WeakSceneNode {
    /// The node, unless it has been dropped.
    pub fn upgrade(&self) -> Option<SceneNode> {
        SceneNode::from_link(&self.0)
    }
}

impl fmt::Debug for WeakSceneNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("WeakSceneNode").field(&self.upgrade()).finish()
    }
}

impl Default for SceneNode {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SceneNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        f.debug_struct("SceneNode")
            .field("name", &data.name)
            .field("enabled", &data.enabled)
            .field("children", &data.children.len())
            .field("behaviors", &data.behaviors.len())
            .finish()
    }
}
