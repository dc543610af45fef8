//! Valentine floaters core crate.
//!
//! Short-lived decorative entities (floating emoji, confetti, music notes) for
//! the Valentine's week pages. The spawner itself is plain Rust driven through
//! the [`Surface`] and [`Scheduler`] traits, so it runs natively against
//! [`MemorySurface`] / [`ManualScheduler`]; the `web` module binds it to the
//! DOM and browser timers when built for wasm32.

use wasm_bindgen::prelude::*;

pub mod config;
pub mod days;
pub mod entity;
pub mod error;
pub mod scheduler;
pub mod spawner;
pub mod surface;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::{EndState, GlyphSet, PositionMode, RenderMode, SizeUnit, Span, SpawnConfig};
pub use entity::{EndTransform, Entity, EntityId, Position};
pub use error::{Result, SpawnError};
pub use scheduler::{MIN_INTERVAL_MS, ManualScheduler, Scheduler, TimerId};
pub use spawner::{RecurringHandle, Spawner};
pub use surface::{MemorySurface, Placed, Surface};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    #[cfg(target_arch = "wasm32")]
    let _ = tracing_wasm::try_set_as_global_default();
}
