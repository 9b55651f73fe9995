//! Contracts with the rendering surface
//!
//! The motion engine never touches a renderer directly. Geometry reads and
//! class toggling go through [`Surface`]; generated rule text goes through
//! [`StyleSink`]. Both are expected to answer synchronously.

use std::fmt;

use crate::geometry::{CornerRadii, ElementBox};

/// Geometry & presentation provider
pub trait Surface {
    /// Live visual element handed out by anchor locators
    type Target: Clone + fmt::Debug + 'static;

    /// Box of `target`, with offsets accumulated from the surface root
    fn element_box(&self, target: &Self::Target) -> ElementBox;

    /// Computed corner radii of `target`
    fn corner_radii(&self, target: &Self::Target) -> CornerRadii;

    /// Whether `target` is rendered at all (effective display is not `none`)
    ///
    /// Hiding through the visibility marker class does not count as
    /// invisible here.
    fn is_visible(&self, target: &Self::Target) -> bool;

    /// Whether `target` uses static positioning
    ///
    /// Transforms with `z-index` need a positioned element, so animation
    /// classes add `position: relative` when this returns true.
    fn is_static_position(&self, _target: &Self::Target) -> bool {
        true
    }

    /// Add or remove a presentation class on `target`
    fn set_class(&mut self, target: &Self::Target, class: &str, present: bool);
}

/// Handle to a published rule set
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleHandle(pub u64);

/// Accepts generated rule text and makes it active on the surface
pub trait StyleSink {
    /// Activate `rules`, returning a handle that can later retract them
    fn publish(&mut self, rules: &str) -> RuleHandle;

    /// Deactivate a previously published rule set; unknown handles are ignored
    fn retract(&mut self, handle: RuleHandle);
}
