//! Transform interpolation
//!
//! Pure math shared by both controllers. Given the boxes of the begin and
//! end elements and a fraction `t` in `[0, 1]`, computes:
//!
//! - the affine transform (translate + scale, origin at the left-top corner)
//!   that makes each element occupy the interpolated box,
//! - the opacity pair inside a [`TransitionWindow`],
//! - the corner radii of both sides, when both ends share a unit.
//!
//! The begin element moves towards the end box as `t` grows; the end element
//! starts on top of the begin box and settles into its own box at `t = 1`.

use unison_core::{transform_value, Corner, CornerRadii, ElementBox, Length, MotionError, Offset, Result};

/// Translate + scale, applied with `transform-origin: left top`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Affine {
    pub translate_x: f32,
    pub translate_y: f32,
    pub scale_x: f32,
    pub scale_y: f32,
}

impl Affine {
    pub const IDENTITY: Affine = Affine {
        translate_x: 0.0,
        translate_y: 0.0,
        scale_x: 1.0,
        scale_y: 1.0,
    };

    pub fn new(translate_x: f32, translate_y: f32, scale_x: f32, scale_y: f32) -> Self {
        Self {
            translate_x,
            translate_y,
            scale_x,
            scale_y,
        }
    }

    /// The opposite morph: translation negated, scale reciprocal
    ///
    /// An element moved from box A onto box B by `self` is brought from B
    /// back onto A by `self.reversed()`, each applied at its own origin.
    pub fn reversed(&self) -> Self {
        Self::new(
            -self.translate_x,
            -self.translate_y,
            ratio(1.0, self.scale_x),
            ratio(1.0, self.scale_y),
        )
    }

    /// CSS `transform` value
    pub fn to_css(&self) -> String {
        transform_value(self.translate_x, self.translate_y, self.scale_x, self.scale_y)
    }

    /// Check if two transforms are approximately equal
    pub fn approx_eq(&self, other: &Affine, epsilon: f32) -> bool {
        (self.translate_x - other.translate_x).abs() < epsilon
            && (self.translate_y - other.translate_y).abs() < epsilon
            && (self.scale_x - other.scale_x).abs() < epsilon
            && (self.scale_y - other.scale_y).abs() < epsilon
    }
}

impl Default for Affine {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Progress sub-range over which the two elements crossfade
///
/// Stored as fractions of the whole transition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionWindow {
    start: f32,
    stop: f32,
}

impl TransitionWindow {
    /// Build a window from progress values in `[0, 100]`
    ///
    /// Requires `0 <= start < 100`, `0 < stop <= 100` and `start < stop`.
    pub fn from_progress(start: f32, stop: f32) -> Result<Self> {
        if !(start >= 0.0 && start < 100.0) {
            return Err(MotionError::ArgumentInvalid(format!(
                "transition window start must be >= 0 and < 100, got {}",
                start
            )));
        }
        if !(stop > 0.0 && stop <= 100.0) {
            return Err(MotionError::ArgumentInvalid(format!(
                "transition window stop must be > 0 and <= 100, got {}",
                stop
            )));
        }
        if start >= stop {
            return Err(MotionError::ArgumentInvalid(format!(
                "transition window start ({}) must be less than stop ({})",
                start, stop
            )));
        }
        Ok(Self {
            start: start / 100.0,
            stop: stop / 100.0,
        })
    }

    /// Start fraction
    pub fn start(&self) -> f32 {
        self.start
    }

    /// Stop fraction
    pub fn stop(&self) -> f32 {
        self.stop
    }

    /// Opacity of the begin element at fraction `t`
    ///
    /// 1 before the window, 0 after it, linear inside.
    pub fn begin_opacity(&self, t: f32) -> f32 {
        if t < self.start {
            1.0
        } else if t > self.stop {
            0.0
        } else {
            1.0 - (t - self.start) / (self.stop - self.start)
        }
    }

    /// Opacity of the end element at fraction `t`
    pub fn end_opacity(&self, t: f32) -> f32 {
        1.0 - self.begin_opacity(t)
    }
}

/// Interpolated state of both sides at one fraction
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    pub begin: Affine,
    pub end: Affine,
    /// `None` when no transition window is configured
    pub begin_opacity: Option<f32>,
    pub end_opacity: Option<f32>,
}

/// Interpolated corner radii of both sides at one fraction
///
/// Indexed like [`Corner::ALL`]. A `None` corner means no radius override:
/// begin and end use different units for that corner.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CornerFrame {
    pub begin: [Option<Length>; 4],
    pub end: [Option<Length>; 4],
}

impl CornerFrame {
    /// `(css property, value)` rows for the begin side
    pub fn begin_rows(&self) -> impl Iterator<Item = (&'static str, &Length)> {
        rows(&self.begin)
    }

    /// `(css property, value)` rows for the end side
    pub fn end_rows(&self) -> impl Iterator<Item = (&'static str, &Length)> {
        rows(&self.end)
    }
}

fn rows(side: &[Option<Length>; 4]) -> impl Iterator<Item = (&'static str, &Length)> {
    Corner::ALL
        .iter()
        .zip(side.iter())
        .filter_map(|(corner, radius)| radius.as_ref().map(|r| (corner.css_property(), r)))
}

/// Begin and end boxes of one connector, plus the forward positional bias
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Endpoints {
    pub begin: ElementBox,
    pub end: ElementBox,
    /// Extra displacement applied to the begin side only
    pub bias: Offset,
}

impl Endpoints {
    pub fn new(begin: ElementBox, end: ElementBox) -> Self {
        Self {
            begin,
            end,
            bias: Offset::ZERO,
        }
    }

    pub fn with_bias(mut self, bias: Offset) -> Self {
        self.bias = bias;
        self
    }

    /// Same boxes with roles exchanged and no bias
    pub fn swapped(&self) -> Self {
        Self::new(self.end, self.begin)
    }

    /// `end - begin` position difference
    pub fn diff(&self) -> Offset {
        Offset::new(self.end.left - self.begin.left, self.end.top - self.begin.top)
    }

    /// End size relative to begin size
    pub fn forward_scale(&self) -> (f32, f32) {
        (
            ratio(self.end.width, self.begin.width),
            ratio(self.end.height, self.begin.height),
        )
    }

    /// Begin size relative to end size
    pub fn backward_scale(&self) -> (f32, f32) {
        (
            ratio(self.begin.width, self.end.width),
            ratio(self.begin.height, self.end.height),
        )
    }

    /// Transform of the begin element at fraction `t`
    pub fn begin_affine(&self, t: f32) -> Affine {
        let diff = self.diff();
        let (sx, sy) = self.forward_scale();
        Affine::new(
            (diff.left + self.bias.left) * t,
            (diff.top + self.bias.top) * t,
            1.0 + (sx - 1.0) * t,
            1.0 + (sy - 1.0) * t,
        )
    }

    /// Transform of the end element at fraction `t`
    pub fn end_affine(&self, t: f32) -> Affine {
        let diff = self.diff();
        let (sx, sy) = self.backward_scale();
        let reverse = 1.0 - t;
        Affine::new(
            -diff.left * reverse,
            -diff.top * reverse,
            1.0 + (sx - 1.0) * reverse,
            1.0 + (sy - 1.0) * reverse,
        )
    }

    /// Transforms and opacities of both sides at fraction `t`
    pub fn frame(&self, t: f32, window: Option<&TransitionWindow>) -> Frame {
        Frame {
            begin: self.begin_affine(t),
            end: self.end_affine(t),
            begin_opacity: window.map(|w| w.begin_opacity(t)),
            end_opacity: window.map(|w| w.end_opacity(t)),
        }
    }

    /// Corner radii of both sides at fraction `t`
    ///
    /// The radius is interpolated linearly between the begin and end values,
    /// then multiplied by the smaller reciprocal of that side's current
    /// scale so the scaled corner never outgrows the scaled box.
    pub fn radii(&self, begin: &CornerRadii, end: &CornerRadii, t: f32) -> CornerFrame {
        let begin_factor = compensation(&self.begin_affine(t));
        let end_factor = compensation(&self.end_affine(t));

        let mut frame = CornerFrame::default();
        for (i, corner) in Corner::ALL.iter().enumerate() {
            let from = begin.get(*corner);
            let to = end.get(*corner);
            if !from.same_unit(to) {
                continue;
            }
            let value = Length::new(from.value + (to.value - from.value) * t, from.unit.clone());
            frame.begin[i] = Some(value.scaled(begin_factor));
            frame.end[i] = Some(value.scaled(end_factor));
        }
        frame
    }
}

fn compensation(affine: &Affine) -> f32 {
    ratio(1.0, affine.scale_x).min(ratio(1.0, affine.scale_y))
}

/// `a / b`, or 1 for a degenerate zero-sized denominator
fn ratio(a: f32, b: f32) -> f32 {
    if b == 0.0 {
        1.0
    } else {
        a / b
    }
}
