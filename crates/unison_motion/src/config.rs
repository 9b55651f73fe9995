//! Controller configuration
//!
//! Options are fixed at construction. All structs deserialize with serde so
//! hosts can keep transition settings in TOML or JSON next to the rest of
//! their configuration; omitted fields take the defaults below.
//!
//! ```toml
//! name = "gallery"
//! z_index = 10
//! duration = { forward = 300, backward = 450 }
//! timing = "ease-in-out"
//! transition = { duration = 200, delay = 100 }
//! ```

use serde::{Deserialize, Serialize};
use unison_core::{Direction, Offset};

/// Default duration of a discrete transition, in milliseconds
pub const DEFAULT_DURATION_MS: u32 = 500;

/// Options shared by every controller
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionOptions {
    /// Name for registry lookup and log/error messages
    pub name: Option<String>,
    /// Stacking order of the end side; the begin side uses `z_index + 1`
    pub z_index: i32,
    /// Horizontal bias, applied to the forward direction only
    pub offset_left: f32,
    /// Vertical bias, applied to the forward direction only
    pub offset_top: f32,
}

impl MotionOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    pub fn with_offset(mut self, left: f32, top: f32) -> Self {
        self.offset_left = left;
        self.offset_top = top;
        self
    }

    pub fn bias(&self) -> Offset {
        Offset::new(self.offset_left, self.offset_top)
    }
}

/// Options of a [`ContinuousMotion`](crate::ContinuousMotion)
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContinuousOptions {
    #[serde(flatten)]
    pub motion: MotionOptions,
    /// Crossfade window `[start, stop]` in progress units (0-100)
    ///
    /// Without a window the elements swap visibility at progress 0 and 100.
    pub transition: Option<[f32; 2]>,
}

impl ContinuousOptions {
    pub fn new(motion: MotionOptions) -> Self {
        Self {
            motion,
            transition: None,
        }
    }

    pub fn with_transition(mut self, start: f32, stop: f32) -> Self {
        self.transition = Some([start, stop]);
        self
    }
}

/// Transition duration: one value for both directions, or one per direction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DurationSpec {
    Both(u32),
    PerDirection {
        #[serde(default)]
        forward: Option<u32>,
        #[serde(default)]
        backward: Option<u32>,
    },
}

impl Default for DurationSpec {
    fn default() -> Self {
        DurationSpec::Both(DEFAULT_DURATION_MS)
    }
}

impl DurationSpec {
    /// Duration in milliseconds for `direction`
    ///
    /// A per-direction value that is missing or zero falls back to the default.
    pub fn for_direction(&self, direction: Direction) -> u32 {
        match *self {
            DurationSpec::Both(ms) => ms,
            DurationSpec::PerDirection { forward, backward } => {
                let ms = match direction {
                    Direction::Forward => forward,
                    Direction::Backward => backward,
                };
                ms.filter(|ms| *ms > 0).unwrap_or(DEFAULT_DURATION_MS)
            }
        }
    }
}

/// Duration and delay of a fade, in milliseconds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FadeDetail {
    pub duration: u32,
    #[serde(default)]
    pub delay: u32,
}

/// A fade given as a bare duration or as duration + delay
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Fade {
    Duration(u32),
    Detail(FadeDetail),
}

impl Fade {
    /// Normalized detail; a zero duration means no fade
    pub fn detail(self) -> Option<FadeDetail> {
        let detail = match self {
            Fade::Duration(duration) => FadeDetail { duration, delay: 0 },
            Fade::Detail(detail) => detail,
        };
        (detail.duration > 0).then_some(detail)
    }
}

/// Fade configuration of a discrete transition
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FadeSpec {
    /// Same fade in both directions
    Uniform(Fade),
    /// Independent fades; a missing direction does not fade
    PerDirection {
        #[serde(default)]
        forward: Option<Fade>,
        #[serde(default)]
        backward: Option<Fade>,
    },
}

impl FadeSpec {
    pub fn for_direction(&self, direction: Direction) -> Option<FadeDetail> {
        match *self {
            FadeSpec::Uniform(fade) => fade.detail(),
            FadeSpec::PerDirection { forward, backward } => match direction {
                Direction::Forward => forward.and_then(Fade::detail),
                Direction::Backward => backward.and_then(Fade::detail),
            },
        }
    }
}

/// Options of a [`DiscreteMotion`](crate::DiscreteMotion)
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscreteOptions {
    #[serde(flatten)]
    pub motion: MotionOptions,
    pub duration: DurationSpec,
    /// CSS `animation-timing-function` of the morph
    pub timing: Option<String>,
    /// Crossfade between the two elements; without it they swap at the end
    pub transition: Option<FadeSpec>,
}

impl DiscreteOptions {
    pub fn new(motion: MotionOptions) -> Self {
        Self {
            motion,
            ..Self::default()
        }
    }

    pub fn with_duration(mut self, ms: u32) -> Self {
        self.duration = DurationSpec::Both(ms);
        self
    }

    pub fn with_durations(mut self, forward: u32, backward: u32) -> Self {
        self.duration = DurationSpec::PerDirection {
            forward: Some(forward),
            backward: Some(backward),
        };
        self
    }

    pub fn with_timing(mut self, timing: impl Into<String>) -> Self {
        self.timing = Some(timing.into());
        self
    }

    pub fn with_fade(mut self, fade: FadeSpec) -> Self {
        self.transition = Some(fade);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discrete_defaults() {
        let options = DiscreteOptions::default();
        assert_eq!(options.duration.for_direction(Direction::Forward), 500);
        assert_eq!(options.duration.for_direction(Direction::Backward), 500);
        assert_eq!(options.transition, None);
        assert_eq!(options.motion.z_index, 0);
    }

    #[test]
    fn test_discrete_from_toml() {
        let options: DiscreteOptions = toml::from_str(
            r#"
            name = "gallery"
            z_index = 10
            offset_left = 4.0
            duration = { forward = 300 }
            timing = "ease-in-out"
            transition = { duration = 200, delay = 100 }
            "#,
        )
        .unwrap();

        assert_eq!(options.motion.name.as_deref(), Some("gallery"));
        assert_eq!(options.motion.z_index, 10);
        assert_eq!(options.motion.bias(), Offset::new(4.0, 0.0));
        assert_eq!(options.duration.for_direction(Direction::Forward), 300);
        assert_eq!(options.duration.for_direction(Direction::Backward), 500);
        assert_eq!(options.timing.as_deref(), Some("ease-in-out"));
        let fade = options.transition.unwrap();
        assert_eq!(
            fade.for_direction(Direction::Backward),
            Some(FadeDetail {
                duration: 200,
                delay: 100
            })
        );
    }

    #[test]
    fn test_fade_shapes_from_json() {
        let bare: FadeSpec = serde_json::from_str("250").unwrap();
        assert_eq!(
            bare.for_direction(Direction::Forward),
            Some(FadeDetail {
                duration: 250,
                delay: 0
            })
        );

        let split: FadeSpec =
            serde_json::from_str(r#"{"forward": {"duration": 100, "delay": 50}}"#).unwrap();
        assert_eq!(
            split.for_direction(Direction::Forward),
            Some(FadeDetail {
                duration: 100,
                delay: 50
            })
        );
        assert_eq!(split.for_direction(Direction::Backward), None);

        let disabled: FadeSpec = serde_json::from_str(r#"{"duration": 0}"#).unwrap();
        assert_eq!(disabled.for_direction(Direction::Forward), None);
    }

    #[test]
    fn test_continuous_from_json() {
        let options: ContinuousOptions =
            serde_json::from_str(r#"{"z_index": 2, "transition": [20, 80]}"#).unwrap();
        assert_eq!(options.motion.z_index, 2);
        assert_eq!(options.transition, Some([20.0, 80.0]));
    }
}
