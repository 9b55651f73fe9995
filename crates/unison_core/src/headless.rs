//! Headless rendering backend
//!
//! An in-memory [`Surface`] and [`StyleSink`] for tests, server-side dry
//! runs and hosts that apply the generated state themselves.
//!
//! `HeadlessSurface` is a cheap cloneable handle, so anchor locators can
//! capture a clone and look nodes up lazily by name.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::{new_key_type, SlotMap};

use crate::geometry::{CornerRadii, ElementBox};
use crate::surface::{RuleHandle, StyleSink, Surface};

new_key_type! {
    /// Handle to a node of a [`HeadlessSurface`]
    pub struct NodeId;
}

/// Recorded state of one headless node
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeState {
    pub element_box: ElementBox,
    pub radii: CornerRadii,
    /// `false` models `display: none`
    pub displayed: bool,
    pub static_position: bool,
    pub classes: FxHashSet<String>,
}

#[derive(Default)]
struct SurfaceInner {
    nodes: SlotMap<NodeId, NodeState>,
    names: FxHashMap<String, NodeId>,
}

/// In-memory surface of named nodes
#[derive(Clone, Default)]
pub struct HeadlessSurface {
    inner: Rc<RefCell<SurfaceInner>>,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a displayed, statically positioned node with square corners
    pub fn add_node(&self, name: impl Into<String>, element_box: ElementBox) -> NodeId {
        let mut inner = self.inner.borrow_mut();
        let id = inner.nodes.insert(NodeState {
            element_box,
            radii: CornerRadii::default(),
            displayed: true,
            static_position: true,
            classes: FxHashSet::default(),
        });
        inner.names.insert(name.into(), id);
        id
    }

    /// Remove a node; its name stops resolving
    pub fn remove_node(&self, id: NodeId) -> Option<NodeState> {
        let mut inner = self.inner.borrow_mut();
        inner.names.retain(|_, node| *node != id);
        inner.nodes.remove(id)
    }

    /// Find a node by name
    pub fn find(&self, name: &str) -> Option<NodeId> {
        let inner = self.inner.borrow();
        inner
            .names
            .get(name)
            .copied()
            .filter(|id| inner.nodes.contains_key(*id))
    }

    /// A locator for [`Anchor::new`](crate::Anchor::new) that finds `name` on demand
    pub fn locator(&self, name: impl Into<String>) -> impl Fn() -> Option<NodeId> + 'static {
        let surface = self.clone();
        let name = name.into();
        move || surface.find(&name)
    }

    pub fn set_box(&self, id: NodeId, element_box: ElementBox) {
        self.update(id, |node| node.element_box = element_box);
    }

    pub fn set_radii(&self, id: NodeId, radii: impl Into<CornerRadii>) {
        let radii = radii.into();
        self.update(id, |node| node.radii = radii);
    }

    pub fn set_displayed(&self, id: NodeId, displayed: bool) {
        self.update(id, |node| node.displayed = displayed);
    }

    pub fn set_static_position(&self, id: NodeId, static_position: bool) {
        self.update(id, |node| node.static_position = static_position);
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.inner
            .borrow()
            .nodes
            .get(id)
            .map(|node| node.classes.contains(class))
            .unwrap_or(false)
    }

    /// Classes currently applied to a node, sorted
    pub fn classes(&self, id: NodeId) -> Vec<String> {
        let mut classes: Vec<String> = self
            .inner
            .borrow()
            .nodes
            .get(id)
            .map(|node| node.classes.iter().cloned().collect())
            .unwrap_or_default();
        classes.sort();
        classes
    }

    /// Snapshot of a node's state
    pub fn state(&self, id: NodeId) -> Option<NodeState> {
        self.inner.borrow().nodes.get(id).cloned()
    }

    fn update(&self, id: NodeId, f: impl FnOnce(&mut NodeState)) {
        match self.inner.borrow_mut().nodes.get_mut(id) {
            Some(node) => f(node),
            None => tracing::warn!("HeadlessSurface: update of unknown node {:?}", id),
        }
    }
}

impl Surface for HeadlessSurface {
    type Target = NodeId;

    fn element_box(&self, target: &NodeId) -> ElementBox {
        self.inner
            .borrow()
            .nodes
            .get(*target)
            .map(|node| node.element_box)
            .unwrap_or_default()
    }

    fn corner_radii(&self, target: &NodeId) -> CornerRadii {
        self.inner
            .borrow()
            .nodes
            .get(*target)
            .map(|node| node.radii.clone())
            .unwrap_or_default()
    }

    fn is_visible(&self, target: &NodeId) -> bool {
        self.inner
            .borrow()
            .nodes
            .get(*target)
            .map(|node| node.displayed)
            .unwrap_or(false)
    }

    fn is_static_position(&self, target: &NodeId) -> bool {
        self.inner
            .borrow()
            .nodes
            .get(*target)
            .map(|node| node.static_position)
            .unwrap_or(true)
    }

    fn set_class(&mut self, target: &NodeId, class: &str, present: bool) {
        self.update(*target, |node| {
            if present {
                node.classes.insert(class.to_string());
            } else {
                node.classes.remove(class);
            }
        });
    }
}

/// In-memory style sink keeping every active rule set
#[derive(Debug, Default)]
pub struct MemoryStyleSink {
    rules: IndexMap<RuleHandle, String>,
    next_handle: u64,
    published: usize,
}

impl MemoryStyleSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of active rule sets
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Total number of `publish` calls so far
    pub fn published_count(&self) -> usize {
        self.published
    }

    pub fn get(&self, handle: RuleHandle) -> Option<&str> {
        self.rules.get(&handle).map(String::as_str)
    }

    /// All active rule text, in publication order
    pub fn text(&self) -> String {
        self.rules.values().cloned().collect::<Vec<_>>().join("\n")
    }

    /// Whether any active rule set contains `fragment`
    pub fn contains(&self, fragment: &str) -> bool {
        self.rules.values().any(|rules| rules.contains(fragment))
    }
}

impl StyleSink for MemoryStyleSink {
    fn publish(&mut self, rules: &str) -> RuleHandle {
        self.next_handle += 1;
        self.published += 1;
        let handle = RuleHandle(self.next_handle);
        self.rules.insert(handle, rules.to_string());
        handle
    }

    fn retract(&mut self, handle: RuleHandle) {
        self.rules.shift_remove(&handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_follows_node_lifetime() {
        let surface = HeadlessSurface::new();
        let locate = surface.locator("card");
        assert_eq!(locate(), None);

        let id = surface.add_node("card", ElementBox::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(locate(), Some(id));

        surface.remove_node(id);
        assert_eq!(locate(), None);
    }

    #[test]
    fn test_classes_and_visibility() {
        let mut surface = HeadlessSurface::new();
        let id = surface.add_node("card", ElementBox::new(0.0, 0.0, 10.0, 10.0));

        surface.set_class(&id, "b", true);
        surface.set_class(&id, "a", true);
        surface.set_class(&id, "b", false);
        assert_eq!(surface.classes(id), vec!["a".to_string()]);

        assert!(surface.is_visible(&id));
        surface.set_displayed(id, false);
        assert!(!surface.is_visible(&id));
    }

    #[test]
    fn test_sink_publish_and_retract() {
        let mut sink = MemoryStyleSink::new();
        let a = sink.publish(".a {opacity: 1;}");
        let b = sink.publish(".b {opacity: 0;}");
        assert_ne!(a, b);
        assert!(sink.contains(".b {"));

        sink.retract(a);
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.get(b), Some(".b {opacity: 0;}"));
        assert_eq!(sink.published_count(), 2);

        // Unknown handles are ignored
        sink.retract(a);
        assert_eq!(sink.len(), 1);
    }
}
