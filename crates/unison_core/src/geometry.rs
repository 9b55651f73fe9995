//! Geometry values read from the rendering surface
//!
//! Boxes are measured from the root of the surface (cumulative offsets),
//! not from the immediate parent. Corner radii keep their CSS unit so that
//! interpolation can refuse to mix units.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::css::format_number;

/// On-screen box of a target, relative to the surface root
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementBox {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl ElementBox {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Build a root-relative box from a chain of offsets
    ///
    /// `offsets` walks from the element itself up through its offset
    /// parents; every `(left, top)` pair is summed.
    pub fn from_offset_chain(
        offsets: impl IntoIterator<Item = (f32, f32)>,
        width: f32,
        height: f32,
    ) -> Self {
        let (left, top) = offsets
            .into_iter()
            .fold((0.0, 0.0), |(l, t), (dl, dt)| (l + dl, t + dt));
        Self::new(left, top, width, height)
    }

    /// Top-left corner of the box
    pub fn origin(&self) -> Offset {
        Offset::new(self.left, self.top)
    }
}

/// A 2D displacement in surface pixels
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Offset {
    pub left: f32,
    pub top: f32,
}

impl Offset {
    pub const ZERO: Offset = Offset {
        left: 0.0,
        top: 0.0,
    };

    pub fn new(left: f32, top: f32) -> Self {
        Self { left, top }
    }
}

/// CSS length unit of a corner radius
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LengthUnit {
    #[default]
    Px,
    Percent,
    Em,
    Rem,
    /// Any other unit, kept verbatim (`vw`, `pt`, ...)
    Other(String),
}

impl LengthUnit {
    pub fn as_str(&self) -> &str {
        match self {
            LengthUnit::Px => "px",
            LengthUnit::Percent => "%",
            LengthUnit::Em => "em",
            LengthUnit::Rem => "rem",
            LengthUnit::Other(unit) => unit,
        }
    }

    fn parse(unit: &str) -> Self {
        match unit.trim().to_ascii_lowercase().as_str() {
            "" | "px" => LengthUnit::Px,
            "%" => LengthUnit::Percent,
            "em" => LengthUnit::Em,
            "rem" => LengthUnit::Rem,
            other => LengthUnit::Other(other.to_string()),
        }
    }
}

/// A numeric CSS length with its unit (e.g. `4px`, `50%`)
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Length {
    pub value: f32,
    pub unit: LengthUnit,
}

impl Length {
    pub fn new(value: f32, unit: LengthUnit) -> Self {
        Self { value, unit }
    }

    pub fn px(value: f32) -> Self {
        Self::new(value, LengthUnit::Px)
    }

    pub fn percent(value: f32) -> Self {
        Self::new(value, LengthUnit::Percent)
    }

    /// Parse a computed-style length such as `"4px"`, `"50%"` or `"0"`
    ///
    /// A bare number is read as pixels. Returns `None` when there is no
    /// leading number.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let split = text
            .char_indices()
            .find(|&(i, c)| {
                !(c.is_ascii_digit() || c == '.' || ((c == '-' || c == '+') && i == 0))
            })
            .map(|(i, _)| i)
            .unwrap_or(text.len());
        let value: f32 = text[..split].parse().ok()?;
        Some(Self::new(value, LengthUnit::parse(&text[split..])))
    }

    /// Whether two lengths can be interpolated numerically
    pub fn same_unit(&self, other: &Length) -> bool {
        self.unit == other.unit
    }

    /// Same unit, value multiplied by `factor`
    pub fn scaled(&self, factor: f32) -> Self {
        Self::new(self.value * factor, self.unit.clone())
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", format_number(self.value), self.unit.as_str())
    }
}

/// One corner of a box
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Corner {
    /// Clockwise from top-left
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomRight,
        Corner::BottomLeft,
    ];

    /// CSS longhand property for this corner
    pub fn css_property(self) -> &'static str {
        match self {
            Corner::TopLeft => "border-top-left-radius",
            Corner::TopRight => "border-top-right-radius",
            Corner::BottomRight => "border-bottom-right-radius",
            Corner::BottomLeft => "border-bottom-left-radius",
        }
    }
}

/// Computed corner radii of a target
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CornerRadii {
    pub top_left: Length,
    pub top_right: Length,
    pub bottom_right: Length,
    pub bottom_left: Length,
}

impl CornerRadii {
    /// Order: top_left, top_right, bottom_right, bottom_left (clockwise from top-left)
    pub fn new(top_left: Length, top_right: Length, bottom_right: Length, bottom_left: Length) -> Self {
        Self {
            top_left,
            top_right,
            bottom_right,
            bottom_left,
        }
    }

    pub fn uniform(radius: Length) -> Self {
        Self {
            top_left: radius.clone(),
            top_right: radius.clone(),
            bottom_right: radius.clone(),
            bottom_left: radius,
        }
    }

    pub fn get(&self, corner: Corner) -> &Length {
        match corner {
            Corner::TopLeft => &self.top_left,
            Corner::TopRight => &self.top_right,
            Corner::BottomRight => &self.bottom_right,
            Corner::BottomLeft => &self.bottom_left,
        }
    }

    pub fn set(&mut self, corner: Corner, radius: Length) {
        match corner {
            Corner::TopLeft => self.top_left = radius,
            Corner::TopRight => self.top_right = radius,
            Corner::BottomRight => self.bottom_right = radius,
            Corner::BottomLeft => self.bottom_left = radius,
        }
    }
}

impl From<Length> for CornerRadii {
    fn from(radius: Length) -> Self {
        Self::uniform(radius)
    }
}
