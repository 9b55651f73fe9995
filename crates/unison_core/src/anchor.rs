//! Anchors: named references to visual targets
//!
//! An anchor does not hold its target. It holds a locator that is invoked
//! every time the target is needed, because the target may not exist yet
//! when the anchor is registered.
//!
//! Anchors never call their own hooks and never change their own status;
//! both are driven by the motion controller orchestrating a transition over
//! a connector that contains the anchor.
//!
//! # Example
//!
//! ```rust
//! use unison_core::{Anchor, AnchorStatus, HookFns};
//!
//! let anchor: Anchor<u32> = Anchor::new(|| Some(7))
//!     .named("avatar")
//!     .with_hooks(HookFns::new().on_forward_end(|event| {
//!         println!("{} finished", event.direction);
//!     }));
//!
//! assert_eq!(anchor.resolve(), Some(7));
//! assert_eq!(anchor.status(), AnchorStatus::Begin);
//! ```

use std::fmt;

use slotmap::{new_key_type, SlotMap};

use crate::error::{MotionError, Result};
use crate::registry::Registry;

new_key_type! {
    /// Handle to an anchor stored in an [`AnchorSet`]
    pub struct AnchorId;
}

/// Which side of a transition an anchor currently shows
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AnchorStatus {
    /// The begin element is the visible one
    #[default]
    Begin,
    /// The end element is the visible one
    End,
    /// A transition is in progress
    Running,
}

impl AnchorStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AnchorStatus::Begin => "begin",
            AnchorStatus::End => "end",
            AnchorStatus::Running => "running",
        }
    }
}

impl fmt::Display for AnchorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a transition
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Begin element morphs into the end element
    Forward,
    /// End element morphs back into the begin element
    Backward,
}

impl Direction {
    /// Status both anchors must have before a transition in this direction
    pub fn required_status(self) -> AnchorStatus {
        match self {
            Direction::Forward => AnchorStatus::Begin,
            Direction::Backward => AnchorStatus::End,
        }
    }

    /// Status both anchors have after a transition in this direction
    pub fn terminal_status(self) -> AnchorStatus {
        match self {
            Direction::Forward => AnchorStatus::End,
            Direction::Backward => AnchorStatus::Begin,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Forward => "forward",
            Direction::Backward => "backward",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Edge of a transition at which a hook fires
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HookPhase {
    Start,
    End,
}

/// Payload handed to anchor hooks
#[derive(Clone, Debug, PartialEq)]
pub struct MotionEvent<T> {
    pub direction: Direction,
    /// Target of the connector's begin anchor
    pub begin: T,
    /// Target of the connector's end anchor
    pub end: T,
    /// Target of the anchor receiving the event
    pub current: T,
}

/// Lifecycle hooks of an anchor
///
/// Every method defaults to a no-op, so implementors only override the
/// edges they care about.
pub trait AnchorHooks<T> {
    fn on_forward_start(&mut self, _event: &MotionEvent<T>) {}
    fn on_forward_end(&mut self, _event: &MotionEvent<T>) {}
    fn on_backward_start(&mut self, _event: &MotionEvent<T>) {}
    fn on_backward_end(&mut self, _event: &MotionEvent<T>) {}
}

/// Hooks that do nothing
#[derive(Clone, Copy, Debug, Default)]
pub struct NoHooks;

impl<T> AnchorHooks<T> for NoHooks {}

type HookFn<T> = Box<dyn FnMut(&MotionEvent<T>)>;

/// Closure-backed hooks, built with chained setters
pub struct HookFns<T> {
    forward_start: Option<HookFn<T>>,
    forward_end: Option<HookFn<T>>,
    backward_start: Option<HookFn<T>>,
    backward_end: Option<HookFn<T>>,
}

impl<T> Default for HookFns<T> {
    fn default() -> Self {
        Self {
            forward_start: None,
            forward_end: None,
            backward_start: None,
            backward_end: None,
        }
    }
}

impl<T> HookFns<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_forward_start(mut self, f: impl FnMut(&MotionEvent<T>) + 'static) -> Self {
        self.forward_start = Some(Box::new(f));
        self
    }

    pub fn on_forward_end(mut self, f: impl FnMut(&MotionEvent<T>) + 'static) -> Self {
        self.forward_end = Some(Box::new(f));
        self
    }

    pub fn on_backward_start(mut self, f: impl FnMut(&MotionEvent<T>) + 'static) -> Self {
        self.backward_start = Some(Box::new(f));
        self
    }

    pub fn on_backward_end(mut self, f: impl FnMut(&MotionEvent<T>) + 'static) -> Self {
        self.backward_end = Some(Box::new(f));
        self
    }
}

impl<T> AnchorHooks<T> for HookFns<T> {
    fn on_forward_start(&mut self, event: &MotionEvent<T>) {
        if let Some(f) = self.forward_start.as_mut() {
            f(event);
        }
    }

    fn on_forward_end(&mut self, event: &MotionEvent<T>) {
        if let Some(f) = self.forward_end.as_mut() {
            f(event);
        }
    }

    fn on_backward_start(&mut self, event: &MotionEvent<T>) {
        if let Some(f) = self.backward_start.as_mut() {
            f(event);
        }
    }

    fn on_backward_end(&mut self, event: &MotionEvent<T>) {
        if let Some(f) = self.backward_end.as_mut() {
            f(event);
        }
    }
}

/// A named reference to a visual target
pub struct Anchor<T> {
    name: Option<String>,
    locator: Box<dyn Fn() -> Option<T>>,
    hooks: Box<dyn AnchorHooks<T>>,
    status: AnchorStatus,
}

impl<T: 'static> Anchor<T> {
    /// Create an anchor whose target is found by `locator`
    pub fn new(locator: impl Fn() -> Option<T> + 'static) -> Self {
        Self {
            name: None,
            locator: Box::new(locator),
            hooks: Box::new(NoHooks),
            status: AnchorStatus::Begin,
        }
    }

    /// Give the anchor a name for registry lookup and event payloads
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_hooks(mut self, hooks: impl AnchorHooks<T> + 'static) -> Self {
        self.hooks = Box::new(hooks);
        self
    }
}

impl<T> Anchor<T> {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Locate the current target
    pub fn resolve(&self) -> Option<T> {
        (self.locator)()
    }

    pub fn status(&self) -> AnchorStatus {
        self.status
    }

    /// Overwrite the status
    ///
    /// Only the controller currently orchestrating a transition over a
    /// connector containing this anchor may call this.
    pub fn set_status(&mut self, status: AnchorStatus) {
        self.status = status;
    }

    /// Dispatch `event` to the hook matching its direction and `phase`
    pub fn notify(&mut self, phase: HookPhase, event: &MotionEvent<T>) {
        match (event.direction, phase) {
            (Direction::Forward, HookPhase::Start) => self.hooks.on_forward_start(event),
            (Direction::Forward, HookPhase::End) => self.hooks.on_forward_end(event),
            (Direction::Backward, HookPhase::Start) => self.hooks.on_backward_start(event),
            (Direction::Backward, HookPhase::End) => self.hooks.on_backward_end(event),
        }
    }
}

impl<T> fmt::Debug for Anchor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Anchor")
            .field("name", &self.name)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Reference to an anchor by handle or by registered name
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnchorRef {
    Id(AnchorId),
    Name(String),
}

impl From<AnchorId> for AnchorRef {
    fn from(id: AnchorId) -> Self {
        AnchorRef::Id(id)
    }
}

impl From<&str> for AnchorRef {
    fn from(name: &str) -> Self {
        AnchorRef::Name(name.to_string())
    }
}

impl From<String> for AnchorRef {
    fn from(name: String) -> Self {
        AnchorRef::Name(name)
    }
}

/// Arena of anchors plus their name registry
///
/// Connectors refer to anchors by [`AnchorId`], so no anchor is ever shared
/// through a mutable reference between controllers.
pub struct AnchorSet<T> {
    anchors: SlotMap<AnchorId, Anchor<T>>,
    names: Registry<AnchorId>,
}

impl<T> Default for AnchorSet<T> {
    fn default() -> Self {
        Self {
            anchors: SlotMap::with_key(),
            names: Registry::new(),
        }
    }
}

impl<T> AnchorSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an anchor; a named anchor replaces any earlier holder of its name
    pub fn insert(&mut self, anchor: Anchor<T>) -> AnchorId {
        let name = anchor.name.clone();
        let id = self.anchors.insert(anchor);
        if let Some(name) = name {
            self.names.register(name, id);
        }
        id
    }

    /// Remove an anchor and, if it still owns it, its name
    pub fn remove(&mut self, id: AnchorId) -> Option<Anchor<T>> {
        let anchor = self.anchors.remove(id)?;
        if let Some(name) = anchor.name() {
            self.names.remove_if(name, &id);
        }
        Some(anchor)
    }

    pub fn get(&self, id: AnchorId) -> Option<&Anchor<T>> {
        self.anchors.get(id)
    }

    pub fn get_mut(&mut self, id: AnchorId) -> Option<&mut Anchor<T>> {
        self.anchors.get_mut(id)
    }

    /// Like [`get`](Self::get), but a missing anchor is an error
    pub fn require(&self, id: AnchorId) -> Result<&Anchor<T>> {
        self.anchors
            .get(id)
            .ok_or_else(|| MotionError::UnknownAnchor(format!("{:?}", id)))
    }

    pub fn require_mut(&mut self, id: AnchorId) -> Result<&mut Anchor<T>> {
        self.anchors
            .get_mut(id)
            .ok_or_else(|| MotionError::UnknownAnchor(format!("{:?}", id)))
    }

    pub fn lookup(&self, name: &str) -> Option<AnchorId> {
        self.names.get(name).copied()
    }

    /// Turn a handle or name into a live handle
    pub fn resolve_ref(&self, anchor: &AnchorRef) -> Result<AnchorId> {
        match anchor {
            AnchorRef::Id(id) if self.anchors.contains_key(*id) => Ok(*id),
            AnchorRef::Id(id) => Err(MotionError::UnknownAnchor(format!("{:?}", id))),
            AnchorRef::Name(name) => self
                .lookup(name)
                .ok_or_else(|| MotionError::UnknownAnchor(name.clone())),
        }
    }

    /// Human-readable identification for messages
    pub fn label(&self, id: AnchorId) -> String {
        match self.anchors.get(id).and_then(|a| a.name()) {
            Some(name) => name.to_string(),
            None => format!("<unnamed {:?}>", id),
        }
    }

    /// Resolve the target of `id`, failing when the locator finds nothing
    pub fn require_target(&self, id: AnchorId) -> Result<T> {
        self.require(id)?
            .resolve()
            .ok_or_else(|| MotionError::not_found(self.label(id)))
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AnchorId, &Anchor<T>)> {
        self.anchors.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn event(direction: Direction) -> MotionEvent<u32> {
        MotionEvent {
            direction,
            begin: 1,
            end: 2,
            current: 1,
        }
    }

    #[test]
    fn test_locator_is_invoked_lazily() {
        let target = Rc::new(RefCell::new(None));
        let shared = target.clone();
        let anchor = Anchor::new(move || *shared.borrow());

        assert_eq!(anchor.resolve(), None);
        *target.borrow_mut() = Some(42u32);
        assert_eq!(anchor.resolve(), Some(42));
    }

    #[test]
    fn test_notify_dispatches_by_direction_and_phase() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let (a, b, c) = (log.clone(), log.clone(), log.clone());
        let mut anchor = Anchor::new(|| Some(1u32)).with_hooks(
            HookFns::new()
                .on_forward_start(move |_| a.borrow_mut().push("forward-start"))
                .on_forward_end(move |_| b.borrow_mut().push("forward-end"))
                .on_backward_end(move |_| c.borrow_mut().push("backward-end")),
        );

        anchor.notify(HookPhase::Start, &event(Direction::Forward));
        anchor.notify(HookPhase::End, &event(Direction::Forward));
        // No hook registered for this edge
        anchor.notify(HookPhase::Start, &event(Direction::Backward));
        anchor.notify(HookPhase::End, &event(Direction::Backward));

        assert_eq!(
            *log.borrow(),
            vec!["forward-start", "forward-end", "backward-end"]
        );
    }

    #[test]
    fn test_set_names_and_removal() {
        let mut set = AnchorSet::new();
        let first = set.insert(Anchor::new(|| Some(1u32)).named("card"));
        let second = set.insert(Anchor::new(|| Some(2u32)).named("card"));

        assert_eq!(set.lookup("card"), Some(second));

        // Removing the replaced anchor must not drop the newer name binding
        set.remove(first);
        assert_eq!(set.lookup("card"), Some(second));

        set.remove(second);
        assert_eq!(set.lookup("card"), None);
        assert!(set.is_empty());
    }

    #[test]
    fn test_resolve_ref() {
        let mut set = AnchorSet::new();
        let id = set.insert(Anchor::new(|| Some(1u32)).named("hero"));

        assert_eq!(set.resolve_ref(&"hero".into()), Ok(id));
        assert_eq!(set.resolve_ref(&id.into()), Ok(id));
        assert_eq!(
            set.resolve_ref(&"missing".into()),
            Err(MotionError::UnknownAnchor("missing".into()))
        );
    }

    #[test]
    fn test_require_target() {
        let mut set = AnchorSet::new();
        let id = set.insert(Anchor::<u32>::new(|| None).named("ghost"));
        assert_eq!(set.require_target(id), Err(MotionError::not_found("ghost")));

        let unnamed = set.insert(Anchor::new(|| Some(3u32)));
        assert_eq!(set.require_target(unnamed), Ok(3));
        assert!(set.label(unnamed).starts_with("<unnamed"));
    }

    #[test]
    fn test_direction_statuses() {
        assert_eq!(Direction::Forward.required_status(), AnchorStatus::Begin);
        assert_eq!(Direction::Forward.terminal_status(), AnchorStatus::End);
        assert_eq!(Direction::Backward.required_status(), AnchorStatus::End);
        assert_eq!(Direction::Backward.terminal_status(), AnchorStatus::Begin);
    }
}
