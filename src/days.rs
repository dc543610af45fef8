//! Day-keyed glyph sets and the three stock effects used by the pages:
//! the floating background, the confetti burst and the music-note shower.

use crate::config::{EndState, GlyphSet, PositionMode, RenderMode, SizeUnit, Span, SpawnConfig};

/// Glyphs per page day key (the page id prefix, e.g. `rose` for `rose-day`).
pub const DAY_GLYPHS: &[(&str, &[&str])] = &[
    ("rose", &["🌹", "🌷", "💐", "🥀"]),
    ("propose", &["💍", "💎", "💖", "💘"]),
    ("chocolate", &["🍫", "🍬", "🍩", "🍪", "🌰"]),
    ("teddy", &["🧸", "🐼", "🐨", "🐻"]),
    ("promise", &["🤞", "🤝", "💝", "📜"]),
    ("hug", &["🤗", "🫂", "👐", "💞"]),
    ("kiss", &["💋", "😽", "😗", "👄"]),
    ("valentine", &["❤️", "💘", "💖", "💗", "💓", "🥰"]),
];

/// Used when the page id matches no day.
pub const DEFAULT_GLYPHS: &[&str] = &["❤️", "✨", "🎁"];

pub const BACKGROUND_INTERVAL_MS: f64 = 800.0;
pub const BACKGROUND_INITIAL_COUNT: usize = 20;

pub const CONFETTI_COUNT: usize = 30;
pub const CONFETTI_COLORS: &[&str] = &["#f00", "#0f0", "#00f", "#ff0", "#0ff"];

pub const MUSIC_NOTE_COUNT: usize = 15;
pub const MUSIC_NOTES: &[&str] = &["🎵", "🎶", "🎼", "🎹", "🎷"];

/// `"rose-day"` -> `"rose"`. Ids without a dash are returned whole.
pub fn day_key(page_id: &str) -> &str {
    page_id.split('-').next().unwrap_or(page_id)
}

pub fn glyphs_for_day(key: &str) -> &'static [&'static str] {
    DAY_GLYPHS
        .iter()
        .find(|(day, _)| *day == key)
        .map(|(_, glyphs)| *glyphs)
        .unwrap_or(DEFAULT_GLYPHS)
}

pub fn glyphs_for_page(page_id: &str) -> GlyphSet {
    GlyphSet::from_table(glyphs_for_day(day_key(page_id)))
}

pub fn confetti_glyphs() -> GlyphSet {
    GlyphSet::from_table(CONFETTI_COLORS)
}

pub fn music_note_glyphs() -> GlyphSet {
    GlyphSet::from_table(MUSIC_NOTES)
}

/// Emoji drifting up the page: 1.5–3rem, 3–8s, anywhere across the width.
pub fn background_config() -> SpawnConfig {
    SpawnConfig::default()
        .with_size(Span::new(1.5, 3.0), SizeUnit::Rem)
        .with_duration_ms(Span::new(3_000.0, 8_000.0))
        .with_position(PositionMode::RandomHorizontal)
        .with_horizontal_span(100.0)
        .with_end_state(EndState::FlyUp { rise_vh: 110.0 })
        .with_initial_burst(BACKGROUND_INITIAL_COUNT)
        .with_class_name("floater")
}

/// 10px colour squares bursting out of the centre for one second.
pub fn confetti_config() -> SpawnConfig {
    SpawnConfig::default()
        .with_size(Span::fixed(10.0), SizeUnit::Px)
        .with_duration_ms(Span::fixed(1_000.0))
        .with_position(PositionMode::FixedCenter)
        .with_end_state(EndState::ScatterRadial { radius_px: 200.0 })
        .with_transition_delay_ms(10.0)
        .with_render(RenderMode::Swatch)
}

/// Notes rising from the bottom, one every 300ms, each living 5s.
pub fn music_note_config() -> SpawnConfig {
    SpawnConfig::default()
        .with_size(Span::new(1.0, 3.0), SizeUnit::Rem)
        .with_duration_ms(Span::fixed(5_000.0))
        .with_position(PositionMode::RandomHorizontal)
        .with_horizontal_span(90.0)
        .with_end_state(EndState::FlyUp { rise_vh: 110.0 })
        .with_stagger_ms(300.0)
        .with_class_name("note")
}
