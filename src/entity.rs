use std::fmt;

use rand::Rng;

use crate::config::{EndState, GlyphSet, PositionMode, RenderMode, SizeUnit, SpawnConfig};

/// Identifier of one transient entity. Unique per spawner, never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Initial placement, in viewport units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Position {
    Horizontal { left_vw: f64 },
    Center,
    Both { left_vw: f64, top_vh: f64 },
}

/// The end-state an entity transitions into. Values are already drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EndTransform {
    FadeOut,
    FlyUp { rise_vh: f64 },
    Scatter { dx_px: f64, dy_px: f64, rotate_deg: f64 },
}

impl EndTransform {
    /// CSS `transform` value, if the end-state moves the entity.
    pub fn css_transform(&self) -> Option<String> {
        match *self {
            EndTransform::FadeOut => None,
            EndTransform::FlyUp { rise_vh } => Some(format!("translateY(-{rise_vh}vh)")),
            EndTransform::Scatter { dx_px, dy_px, rotate_deg } => {
                Some(format!("translate({dx_px}px, {dy_px}px) rotate({rotate_deg}deg)"))
            }
        }
    }

    /// Final opacity. Floaters stay visible while rising; the rest fade.
    pub fn opacity(&self) -> f64 {
        match self {
            EndTransform::FlyUp { .. } => 1.0,
            EndTransform::FadeOut | EndTransform::Scatter { .. } => 0.0,
        }
    }
}

/// One transient visual element, fully drawn and ready to append.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub glyph: String,
    pub position: Position,
    pub size: f64,
    pub size_unit: SizeUnit,
    pub duration_ms: f64,
    /// Time left for the transition once it starts.
    pub transition_ms: f64,
    pub end_transform: EndTransform,
    pub render: RenderMode,
    pub class_name: Option<String>,
}

impl Entity {
    /// Draw every randomized attribute for a new entity.
    pub(crate) fn draw<R: Rng + ?Sized>(
        id: EntityId,
        glyphs: &GlyphSet,
        cfg: &SpawnConfig,
        rng: &mut R,
    ) -> Self {
        let glyph = glyphs.choose(rng).to_owned();
        let size = cfg.size_range.sample(rng);
        let duration_ms = cfg.duration_range.sample(rng);
        let position = match cfg.position_mode {
            PositionMode::RandomHorizontal => Position::Horizontal {
                left_vw: unit_draw(rng, cfg.horizontal_span),
            },
            PositionMode::FixedCenter => Position::Center,
            PositionMode::RandomBoth => Position::Both {
                left_vw: unit_draw(rng, cfg.horizontal_span),
                top_vh: unit_draw(rng, 100.0),
            },
        };
        let end_transform = match cfg.end_state {
            EndState::FadeOut => EndTransform::FadeOut,
            EndState::FlyUp { rise_vh } => EndTransform::FlyUp { rise_vh },
            EndState::ScatterRadial { radius_px } => EndTransform::Scatter {
                dx_px: symmetric_draw(rng, radius_px),
                dy_px: symmetric_draw(rng, radius_px),
                rotate_deg: unit_draw(rng, 360.0),
            },
        };
        Self {
            id,
            glyph,
            position,
            size,
            size_unit: cfg.size_unit,
            duration_ms,
            transition_ms: (duration_ms - cfg.transition_delay_ms).max(0.0),
            end_transform,
            render: cfg.render,
            class_name: cfg.class_name.clone(),
        }
    }

    /// Inline CSS for the initial state.
    ///
    /// Text entities carry `animation-duration` set to their lifetime so a
    /// stylesheet keyframe animation on their class (`.floater`, `.note`)
    /// runs exactly as long as the entity lives. The end-state itself is a
    /// `transform` / `opacity` transition over the rest of the lifetime.
    pub fn inline_style(&self) -> String {
        let size = format!("{}{}", self.size, self.size_unit.suffix());
        let mut style = String::from("position:fixed; pointer-events:none; ");
        match self.position {
            Position::Horizontal { left_vw } => style.push_str(&format!("left:{left_vw}vw; bottom:-50px; ")),
            Position::Center => style.push_str("left:50%; top:50%; "),
            Position::Both { left_vw, top_vh } => {
                style.push_str(&format!("left:{left_vw}vw; top:{top_vh}vh; "))
            }
        }
        match self.render {
            RenderMode::Text => {
                style.push_str(&format!(
                    "font-size:{size}; animation-duration:{}ms; ",
                    self.duration_ms
                ));
            }
            RenderMode::Swatch => {
                style.push_str(&format!(
                    "width:{size}; height:{size}; background-color:{}; ",
                    self.glyph
                ));
            }
        }
        let easing = match self.end_transform {
            EndTransform::FlyUp { .. } => "linear",
            EndTransform::FadeOut | EndTransform::Scatter { .. } => "ease-out",
        };
        style.push_str(&format!(
            "transition: transform {t}ms {easing}, opacity {t}ms {easing};",
            t = self.transition_ms
        ));
        style
    }
}

fn unit_draw<R: Rng + ?Sized>(rng: &mut R, max: f64) -> f64 {
    if max <= 0.0 { 0.0 } else { rng.gen_range(0.0..max) }
}

fn symmetric_draw<R: Rng + ?Sized>(rng: &mut R, radius: f64) -> f64 {
    if radius <= 0.0 { 0.0 } else { rng.gen_range(-radius..radius) }
}
