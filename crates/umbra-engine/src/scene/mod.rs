//! Scene graph.
//!
//! A scene is a tree of [`SceneNode`]s. Each node owns its children and the
//! [`Behavior`]s attached to it; children point back at their parent weakly,
//! so dropping the root handle releases the whole tree.
//!
//! Behaviors carry one optional handler per lifecycle [`Event`]. The
//! dispatcher (`core::Umbra`) walks the enabled part of the tree, snapshots
//! the behaviors that handle an event, orders them by priority and invokes
//! them.
//!
//! A handler that needs its own node or behavior should capture a
//! [`WeakSceneNode`] or [`WeakBehavior`]. Strong handles captured by a
//! handler form a reference cycle with the node's behavior list.

mod behavior;
mod event;
mod node;

pub use behavior::{Behavior, BehaviorKind, Handler, WeakBehavior};
pub use event::Event;
pub use node::{SceneNode, WeakSceneNode};
