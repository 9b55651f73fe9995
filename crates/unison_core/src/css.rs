//! CSS rule text builders
//!
//! Motion controllers describe their visual state as declarative text that
//! is handed to a [`StyleSink`](crate::surface::StyleSink). Declarations keep
//! insertion order so the generated text is deterministic.

use std::fmt;

use indexmap::IndexMap;

/// Prefixes emitted alongside properties that older engines only know prefixed
pub const VENDOR_PREFIXES: [&str; 3] = ["-webkit-", "-moz-", "-o-"];

/// Format a number for CSS output
///
/// Negative zero is printed as `0`, and whole numbers carry no fraction.
pub fn format_number(value: f32) -> String {
    // -0.0 + 0.0 == +0.0
    format!("{}", value + 0.0)
}

/// `translate(..px, ..px) scale(.., ..)`
pub fn transform_value(tx: f32, ty: f32, sx: f32, sy: f32) -> String {
    format!(
        "translate({}px, {}px) scale({}, {})",
        format_number(tx),
        format_number(ty),
        format_number(sx),
        format_number(sy)
    )
}

/// One entry of an `animation` shorthand list
///
/// `name duration [timing] [delay]`
pub fn animation_value(name: &str, duration_ms: u32, timing: Option<&str>, delay_ms: Option<u32>) -> String {
    let mut value = format!("{} {}ms", name, duration_ms);
    if let Some(timing) = timing {
        value.push(' ');
        value.push_str(timing);
    }
    if let Some(delay) = delay_ms {
        value.push_str(&format!(" {}ms", delay));
    }
    value
}

/// Ordered declaration block (`key: value;` rows)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Declarations {
    rows: IndexMap<String, String>,
}

impl Declarations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a row, replacing an earlier row with the same key
    pub fn add(&mut self, key: &str, value: impl fmt::Display) {
        self.rows.insert(key.to_string(), value.to_string());
    }

    /// Add a row with an `!important` suffix
    pub fn add_important(&mut self, key: &str, value: impl fmt::Display) {
        self.rows.insert(key.to_string(), format!("{} !important", value));
    }

    /// Add a row plus one copy per vendor prefix
    pub fn add_prefixed(&mut self, key: &str, value: impl fmt::Display) {
        let value = value.to_string();
        self.add(key, &value);
        for prefix in VENDOR_PREFIXES {
            self.add(&format!("{}{}", prefix, key), &value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.rows.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

impl fmt::Display for Declarations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.rows {
            write!(f, "{}: {};", key, value)?;
        }
        Ok(())
    }
}

/// A `selector { ... }` rule
#[derive(Clone, Debug, PartialEq)]
pub struct CssRule {
    selector: String,
    declarations: Declarations,
}

impl CssRule {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            declarations: Declarations::new(),
        }
    }

    /// Rule targeting a single class name
    pub fn class(name: &str) -> Self {
        Self::new(format!(".{}", name))
    }

    pub fn add(mut self, key: &str, value: impl fmt::Display) -> Self {
        self.declarations.add(key, value);
        self
    }

    pub fn add_important(mut self, key: &str, value: impl fmt::Display) -> Self {
        self.declarations.add_important(key, value);
        self
    }

    pub fn add_prefixed(mut self, key: &str, value: impl fmt::Display) -> Self {
        self.declarations.add_prefixed(key, value);
        self
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn declarations(&self) -> &Declarations {
        &self.declarations
    }
}

impl fmt::Display for CssRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{{}}}", self.selector, self.declarations)
    }
}

/// A two-stop `@keyframes` block
#[derive(Clone, Debug, PartialEq)]
pub struct Keyframes {
    name: String,
    from: Declarations,
    to: Declarations,
}

impl Keyframes {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            from: Declarations::new(),
            to: Declarations::new(),
        }
    }

    pub fn add_from(mut self, key: &str, value: impl fmt::Display) -> Self {
        self.from.add(key, value);
        self
    }

    pub fn add_to(mut self, key: &str, value: impl fmt::Display) -> Self {
        self.to.add(key, value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn from_stop(&self) -> &Declarations {
        &self.from
    }

    pub fn to_stop(&self) -> &Declarations {
        &self.to
    }
}

impl fmt::Display for Keyframes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "@keyframes {} {{from {{{}}} to {{{}}}}}",
            self.name, self.from, self.to
        )
    }
}
