//! Unison Motion
//!
//! Shared-element transitions between pairs of anchors:
//!
//! - **ContinuousMotion**: Progress-driven (0-100), recomputed on every `set`
//! - **DiscreteMotion**: Duration-based `forward` / `backward` runs
//! - **Interpolation**: Pure transform, opacity and corner radius math
//! - **Stage**: Anchors, surface, style sink and timers shared by controllers
//!
//! # Example
//!
//! ```rust
//! use unison_core::{Anchor, AnchorStatus, ElementBox, HeadlessSurface, MemoryStyleSink};
//! use unison_motion::{DiscreteMotion, DiscreteOptions, Stage};
//!
//! let surface = HeadlessSurface::new();
//! surface.add_node("thumb", ElementBox::new(0.0, 0.0, 100.0, 50.0));
//! surface.add_node("detail", ElementBox::new(300.0, 0.0, 200.0, 50.0));
//!
//! let mut stage = Stage::new(surface.clone(), MemoryStyleSink::new());
//! let thumb = stage.add_anchor(Anchor::new(surface.locator("thumb")).named("thumb"));
//! stage.add_anchor(Anchor::new(surface.locator("detail")).named("detail"));
//!
//! let mut motion = DiscreteMotion::new(DiscreteOptions::default().with_duration(300));
//! motion.connect(&mut stage, "thumb", "detail").unwrap();
//! motion.forward(&mut stage).unwrap();
//!
//! stage.advance(300);
//! assert_eq!(stage.anchors().get(thumb).unwrap().status(), AnchorStatus::End);
//! ```

pub mod base;
pub mod config;
pub mod continuous;
pub mod discrete;
pub mod interpolate;
pub mod stage;
pub mod timer;

pub use base::{Connector, Motion, MotionBase, TargetPair};
pub use config::{
    ContinuousOptions, DiscreteOptions, DurationSpec, Fade, FadeDetail, FadeSpec, MotionOptions,
    DEFAULT_DURATION_MS,
};
pub use continuous::ContinuousMotion;
pub use discrete::{CompletionEvent, DiscreteMotion, TransitionHandle};
pub use interpolate::{Affine, CornerFrame, Endpoints, Frame, TransitionWindow};
pub use stage::{Stage, Task, VISIBILITY_CLASS_PREFIX};
pub use timer::{TimerId, TimerQueue};
