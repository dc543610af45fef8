//! Spawn configuration: glyph sets, value ranges, placement and end-state
//! options. Everything the original pages tuned inline lives here so a batch is
//! fully described by a [`GlyphSet`] plus a [`SpawnConfig`].

use std::rc::Rc;

use rand::Rng;

use crate::error::{Result, SpawnError};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Non-empty set of display glyphs. One is picked uniformly per entity.
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphSet(Rc<[String]>);

impl GlyphSet {
    pub fn new<I, S>(glyphs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let glyphs: Vec<String> = glyphs.into_iter().map(Into::into).collect();
        if glyphs.is_empty() {
            return Err(SpawnError::EmptyGlyphSet);
        }
        Ok(Self(glyphs.into()))
    }

    /// Built-in tables; callers pass non-empty constants.
    pub(crate) fn from_table(glyphs: &[&str]) -> Self {
        debug_assert!(!glyphs.is_empty(), "glyph table is empty");
        Self(glyphs.iter().map(|g| (*g).to_owned()).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn contains(&self, glyph: &str) -> bool {
        self.iter().any(|g| g == glyph)
    }

    pub(crate) fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        &self.0[rng.gen_range(0..self.0.len())]
    }
}

/// Inclusive `[min, max]` range sampled uniformly.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Span {
    pub min: f64,
    pub max: f64,
}

impl Span {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub const fn fixed(value: f64) -> Self {
        Self { min: value, max: value }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.min == self.max {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }

    fn validate(&self, field: &'static str) -> Result<()> {
        let ok = self.min.is_finite() && self.max.is_finite() && self.min >= 0.0 && self.min <= self.max;
        if ok {
            Ok(())
        } else {
            Err(SpawnError::InvalidRange { field, min: self.min, max: self.max })
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "camelCase"))]
pub enum SizeUnit {
    #[default]
    Rem,
    Px,
}

impl SizeUnit {
    pub fn suffix(self) -> &'static str {
        match self {
            SizeUnit::Rem => "rem",
            SizeUnit::Px => "px",
        }
    }
}

/// Where a fresh entity is placed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "camelCase"))]
pub enum PositionMode {
    /// Random left offset across `horizontal_span` viewport widths; vertical start left to styling.
    #[default]
    RandomHorizontal,
    /// Dead centre of the viewport.
    FixedCenter,
    /// Random on both axes.
    RandomBoth,
}

/// Animated end-state applied shortly after creation.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "camelCase"))]
pub enum EndState {
    FadeOut,
    FlyUp { rise_vh: f64 },
    /// Square scatter of `±radius_px` per axis plus a random spin.
    ScatterRadial { radius_px: f64 },
}

impl Default for EndState {
    fn default() -> Self {
        EndState::FlyUp { rise_vh: 110.0 }
    }
}

/// How the glyph is drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "camelCase"))]
pub enum RenderMode {
    /// Glyph is text content (emoji).
    #[default]
    Text,
    /// Glyph is a CSS colour filling a square of `size`.
    Swatch,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase", default)
)]
pub struct SpawnConfig {
    pub size_range: Span,
    pub size_unit: SizeUnit,
    /// Lifetime in milliseconds.
    pub duration_range: Span,
    pub position_mode: PositionMode,
    /// Upper bound (vw) for random horizontal placement.
    pub horizontal_span: f64,
    pub end_state: EndState,
    pub transition_delay_ms: f64,
    /// Entities created synchronously by `spawn_recurring` before the first tick.
    pub initial_burst: usize,
    pub per_tick: usize,
    /// Within a burst, entity `i` appears at `i * stagger_ms`.
    pub stagger_ms: f64,
    pub render: RenderMode,
    pub class_name: Option<String>,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            size_range: Span::new(1.5, 3.0),
            size_unit: SizeUnit::Rem,
            duration_range: Span::new(3_000.0, 8_000.0),
            position_mode: PositionMode::RandomHorizontal,
            horizontal_span: 100.0,
            end_state: EndState::default(),
            transition_delay_ms: 10.0,
            initial_burst: 0,
            per_tick: 1,
            stagger_ms: 0.0,
            render: RenderMode::Text,
            class_name: None,
        }
    }
}

impl SpawnConfig {
    pub fn with_size(mut self, range: Span, unit: SizeUnit) -> Self {
        self.size_range = range;
        self.size_unit = unit;
        self
    }

    pub fn with_duration_ms(mut self, range: Span) -> Self {
        self.duration_range = range;
        self
    }

    pub fn with_position(mut self, mode: PositionMode) -> Self {
        self.position_mode = mode;
        self
    }

    pub fn with_horizontal_span(mut self, vw: f64) -> Self {
        self.horizontal_span = vw;
        self
    }

    pub fn with_end_state(mut self, end_state: EndState) -> Self {
        self.end_state = end_state;
        self
    }

    pub fn with_transition_delay_ms(mut self, delay: f64) -> Self {
        self.transition_delay_ms = delay;
        self
    }

    pub fn with_initial_burst(mut self, count: usize) -> Self {
        self.initial_burst = count;
        self
    }

    pub fn with_per_tick(mut self, count: usize) -> Self {
        self.per_tick = count;
        self
    }

    pub fn with_stagger_ms(mut self, stagger: f64) -> Self {
        self.stagger_ms = stagger;
        self
    }

    pub fn with_render(mut self, render: RenderMode) -> Self {
        self.render = render;
        self
    }

    pub fn with_class_name<S: Into<String>>(mut self, class_name: S) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    /// Rejects anything that would make a batch misbehave: inverted or
    /// non-finite ranges, negative values, and a transition delay that does
    /// not fall strictly inside the shortest possible lifetime.
    pub fn validate(&self) -> Result<()> {
        self.size_range.validate("size")?;
        self.duration_range.validate("duration")?;
        non_negative("horizontal_span", self.horizontal_span)?;
        non_negative("transition_delay_ms", self.transition_delay_ms)?;
        non_negative("stagger_ms", self.stagger_ms)?;
        match self.end_state {
            EndState::FadeOut => {}
            EndState::FlyUp { rise_vh } => non_negative("rise_vh", rise_vh)?,
            EndState::ScatterRadial { radius_px } => non_negative("radius_px", radius_px)?,
        }
        if self.transition_delay_ms >= self.duration_range.min {
            return Err(SpawnError::TransitionTooLate {
                delay_ms: self.transition_delay_ms,
                min_duration_ms: self.duration_range.min,
            });
        }
        Ok(())
    }

    /// Parse a JSON document (camelCase keys, missing keys take defaults) and validate it.
    #[cfg(feature = "serde_json")]
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: SpawnConfig = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SpawnError::InvalidValue { field, value })
    }
}
