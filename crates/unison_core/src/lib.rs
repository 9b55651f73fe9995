//! Unison Core
//!
//! Leaf entities and boundary contracts for shared-element transitions:
//!
//! - **Anchors**: Named references to visual targets with lifecycle hooks and status
//! - **Geometry**: Element boxes and unit-aware corner radii
//! - **Surface / StyleSink**: Contracts for the rendering surface that owns the targets
//! - **CSS builders**: Rule and keyframe text generation
//! - **Headless backend**: In-memory surface and sink for tests and dry runs
//!
//! # Example
//!
//! ```rust
//! use unison_core::{Anchor, AnchorSet, ElementBox, HeadlessSurface};
//!
//! let surface = HeadlessSurface::new();
//! surface.add_node("thumb", ElementBox::new(0.0, 0.0, 100.0, 50.0));
//!
//! let mut anchors = AnchorSet::new();
//! let thumb = anchors.insert(Anchor::new(surface.locator("thumb")).named("thumb"));
//!
//! assert_eq!(anchors.lookup("thumb"), Some(thumb));
//! assert!(anchors.get(thumb).and_then(|a| a.resolve()).is_some());
//! ```

pub mod anchor;
pub mod css;
pub mod error;
pub mod geometry;
pub mod headless;
pub mod ids;
pub mod registry;
pub mod surface;

pub use anchor::{
    Anchor, AnchorHooks, AnchorId, AnchorRef, AnchorSet, AnchorStatus, Direction, HookFns,
    HookPhase, MotionEvent, NoHooks,
};
pub use css::{animation_value, format_number, transform_value, CssRule, Declarations, Keyframes};
pub use error::{MotionError, Result};
pub use geometry::{Corner, CornerRadii, ElementBox, Length, LengthUnit, Offset};
pub use headless::{HeadlessSurface, MemoryStyleSink, NodeId, NodeState};
pub use ids::{random_code, random_code_with_rng, unique_token};
pub use registry::Registry;
pub use surface::{RuleHandle, StyleSink, Surface};
