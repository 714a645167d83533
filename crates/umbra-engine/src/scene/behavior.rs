use std::any::{TypeId, type_name};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::core::Umbra;

use super::event::Event;
use super::node::{NodeLink, SceneNode};

/// Lifecycle handler. Receives the dispatcher that fired the event.
pub type Handler = Box<dyn FnMut(&mut Umbra) -> anyhow::Result<()>>;

/// Identifies what a behavior is, for lookup through
/// [`SceneNode::behavior`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BehaviorKind {
    id: TypeId,
    name: &'static str,
}

impl BehaviorKind {
    pub fn of<K: 'static>() -> Self {
        Self {
            id: TypeId::of::<K>(),
            name: type_name::<K>(),
        }
    }

    pub fn name(self) -> &'static str {
        self.name
    }
}

/// Kind given to behaviors built with [`Behavior::new`].
struct Anonymous;

struct BehaviorData {
    kind: BehaviorKind,
    priority: Cell<i32>,
    node: NodeLink,
    handlers: RefCell<[Option<Handler>; 3]>,
    // Bumped whenever a slot is written through `on` or `clear`.
    revisions: [Cell<u32>; 3],
}

/// A unit of logic attached to one scene node.
///
/// A behavior registers itself with its node when constructed and stays
/// there. It holds at most one handler per [`Event`]; events without a
/// handler skip the behavior.
///
/// Lower `priority` runs first. Behaviors with equal priority run in tree
/// order, then attachment order.
#[derive(Clone)]
pub struct Behavior(Rc<BehaviorData>);

impl Behavior {
    /// Attaches an anonymous behavior to `node`.
    pub fn new(node: &SceneNode, priority: i32) -> Self {
        Self::attach(node, priority, BehaviorKind::of::<Anonymous>())
    }

    /// Attaches a behavior of kind `K`, findable with `node.behavior::<K>()`.
    pub fn with_kind<K: 'static>(node: &SceneNode, priority: i32) -> Self {
        Self::attach(node, priority, BehaviorKind::of::<K>())
    }

    fn attach(node: &SceneNode, priority: i32, kind: BehaviorKind) -> Self {
        let behavior = Self(Rc::new(BehaviorData {
            kind,
            priority: Cell::new(priority),
            node: node.link(),
            handlers: RefCell::new([None, None, None]),
            revisions: Default::default(),
        }));
        node.attach(behavior.clone());
        behavior
    }

    pub fn kind(&self) -> BehaviorKind {
        self.0.kind
    }

    pub fn is<K: 'static>(&self) -> bool {
        self.0.kind.id == TypeId::of::<K>()
    }

    pub fn priority(&self) -> i32 {
        self.0.priority.get()
    }

    /// Takes effect from the next dispatch pass.
    pub fn set_priority(&self, priority: i32) {
        self.0.priority.set(priority);
    }

    /// The node this behavior is attached to, unless it has been dropped.
    pub fn node(&self) -> Option<SceneNode> {
        SceneNode::from_link(&self.0.node)
    }

    /// Non-owning handle to this behavior, for handlers that act on it.
    pub fn downgrade(&self) -> WeakBehavior {
        WeakBehavior(Rc::downgrade(&self.0))
    }

    /// Installs `handler` for `event`, replacing any previous one.
    ///
    /// The behavior owns `handler`. To reach this behavior or its node from
    /// inside, capture [`downgrade`](Self::downgrade) or
    /// [`SceneNode::downgrade`] rather than a clone.
    pub fn on<F>(&self, event: Event, handler: F) -> &Self
    where
        F: FnMut(&mut Umbra) -> anyhow::Result<()> + 'static,
    {
        self.0.handlers.borrow_mut()[event.index()] = Some(Box::new(handler));
        self.bump(event);
        self
    }

    /// Removes the handler for `event`.
    pub fn clear(&self, event: Event) {
        self.0.handlers.borrow_mut()[event.index()] = None;
        self.bump(event);
    }

    fn bump(&self, event: Event) {
        let rev = &self.0.revisions[event.index()];
        rev.set(rev.get().wrapping_add(1));
    }

    pub fn handles(&self, event: Event) -> bool {
        self.0.handlers.borrow()[event.index()].is_some()
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Behavior) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Runs the handler for `event`. Returns `None` if there is none.
    ///
    /// The handler is taken out of its slot for the duration of the call, so
    /// it may install, replace or clear handlers on this behavior, and a
    /// nested dispatch of the same event skips it. It goes back into the slot
    /// only if the call left the slot untouched.
    pub(crate) fn invoke(&self, event: Event, umbra: &mut Umbra) -> Option<anyhow::Result<()>> {
        let idx = event.index();
        let mut handler = self.0.handlers.borrow_mut()[idx].take()?;
        let revision = self.0.revisions[idx].get();

        let result = handler(umbra);

        if self.0.revisions[idx].get() == revision {
            self.0.handlers.borrow_mut()[idx] = Some(handler);
        }
        Some(result)
    }
}

/// Non-owning handle to a [`Behavior`].
#[derive(Clone, Default)]
pub struct WeakBehavior(Weak<BehaviorData>);

impl WeakBehavior {
    /// The behavior, unless its node and every other handle are gone.
    pub fn upgrade(&self) -> Option<Behavior> {
        self.0.upgrade().map(Behavior)
    }
}

impl fmt::Debug for WeakBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("WeakBehavior").field(&self.upgrade()).finish()
    }
}

impl fmt::Debug for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handles: Vec<Event> = Event::ALL.into_iter().filter(|e| self.handles(*e)).collect();
        f.debug_struct("Behavior")
            .field("kind", &self.0.kind.name)
            .field("priority", &self.priority())
            .field("handles", &handles)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::UmbraConfig;

    fn umbra() -> Umbra {
        Umbra::new(UmbraConfig::default()).unwrap()
    }

    #[test]
    fn registers_with_node_on_construction() {
        let node = SceneNode::new();
        let b = Behavior::new(&node, 4);
        assert_eq!(node.behaviors().len(), 1);
        assert!(node.behaviors()[0].ptr_eq(&b));
        assert!(b.node().unwrap().ptr_eq(&node));
        assert_eq!(b.priority(), 4);
    }

    #[test]
    fn handles_reflects_installed_handlers() {
        let node = SceneNode::new();
        let b = Behavior::new(&node, 0);
        assert!(!b.handles(Event::Update));

        b.on(Event::Update, |_| Ok(()));
        assert!(b.handles(Event::Update));
        assert!(!b.handles(Event::Fixed));

        b.clear(Event::Update);
        assert!(!b.handles(Event::Update));
    }

    #[test]
    fn invoke_without_handler_is_none() {
        let node = SceneNode::new();
        let b = Behavior::new(&node, 0);
        assert!(b.invoke(Event::Load, &mut umbra()).is_none());
    }

    #[test]
    fn invoke_returns_handler_result() {
        let node = SceneNode::new();
        let b = Behavior::new(&node, 0);
        b.on(Event::Fixed, |_| anyhow::bail!("boom"));
        let result = b.invoke(Event::Fixed, &mut umbra()).unwrap();
        assert!(result.is_err());
        // Handler is kept after failing.
        assert!(b.handles(Event::Fixed));
    }

    #[test]
    fn handler_may_replace_itself() {
        let node = SceneNode::new();
        let b = Behavior::new(&node, 0);
        let hits = Rc::new(Cell::new(0));

        let inner = b.downgrade();
        let h = hits.clone();
        b.on(Event::Update, move |_| {
            let h = h.clone();
            if let Some(me) = inner.upgrade() {
                me.on(Event::Update, move |_| {
                    h.set(h.get() + 10);
                    Ok(())
                });
            }
            Ok(())
        });

        let mut u = umbra();
        b.invoke(Event::Update, &mut u);
        b.invoke(Event::Update, &mut u);
        assert_eq!(hits.get(), 10);
    }

    #[test]
    fn handler_may_clear_itself() {
        let node = SceneNode::new();
        let b = Behavior::new(&node, 0);
        let inner = b.downgrade();
        b.on(Event::Load, move |_| {
            if let Some(me) = inner.upgrade() {
                me.clear(Event::Load);
            }
            Ok(())
        });
        let mut u = umbra();
        assert!(b.invoke(Event::Load, &mut u).is_some());
        assert!(!b.handles(Event::Load));
        assert!(b.invoke(Event::Load, &mut u).is_none());
    }

    #[test]
    fn weak_captures_let_a_detached_subtree_drop() {
        let root = SceneNode::new();
        let child = SceneNode::named("child");
        child.set_parent(&root).unwrap();

        let b = Behavior::new(&child, 0);
        let (me, node) = (b.downgrade(), child.downgrade());
        b.on(Event::Update, move |_| {
            if let (Some(me), Some(node)) = (me.upgrade(), node.upgrade()) {
                node.set_enabled(!node.enabled());
                me.set_priority(me.priority() + 1);
            }
            Ok(())
        });

        let mut u = umbra();
        b.invoke(Event::Update, &mut u);
        assert!(!child.enabled());
        assert_eq!(b.priority(), 1);

        let (weak_child, weak_b) = (child.downgrade(), b.downgrade());
        child.detach();
        drop((child, b));
        assert!(weak_child.upgrade().is_none());
        assert!(weak_b.upgrade().is_none());
    }

    #[test]
    fn kind_names_the_type() {
        struct Spinner;
        let node = SceneNode::new();
        let b = Behavior::with_kind::<Spinner>(&node, 0);
        assert!(b.is::<Spinner>());
        assert!(b.kind().name().ends_with("Spinner"));
    }
}
