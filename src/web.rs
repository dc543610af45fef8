//! DOM surface, browser timers and the JS-facing entry points.
//!
//! Entities are plain `div`s whose initial state is written as inline styles
//! (see [`Entity::inline_style`]); the end-state is a CSS transition
//! (`transform` / `opacity`) running for the remainder of the lifetime.
//! Removal detaches the element.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement, Window, window};

use crate::config::RenderMode;
use crate::days;
use crate::entity::{EndTransform, Entity, EntityId};
use crate::error::{Result, SpawnError};
use crate::scheduler::{Scheduler, TimerId};
use crate::spawner::{RecurringHandle, Spawner};
use crate::surface::Surface;

fn js_err(err: JsValue) -> SpawnError {
    SpawnError::surface(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

fn browser() -> Result<(Window, Document)> {
    let win = window().ok_or_else(|| SpawnError::surface("no window"))?;
    let doc = win.document().ok_or_else(|| SpawnError::surface("no document"))?;
    Ok((win, doc))
}

// --- Surface -----------------------------------------------------------------

/// Surface backed by a DOM container.
pub struct DomSurface {
    document: Document,
    container: HtmlElement,
    live: HashMap<EntityId, HtmlElement>,
}

impl DomSurface {
    pub fn new(document: Document, container: HtmlElement) -> Self {
        Self { document, container, live: HashMap::new() }
    }

    /// Append a fresh `div.floating-container` to the body and draw into it.
    pub fn floating_container(document: Document) -> Result<Self> {
        let body = document.body().ok_or_else(|| SpawnError::surface("no body"))?;
        let container: HtmlElement = document
            .create_element("div")
            .map_err(js_err)?
            .dyn_into()
            .map_err(|_| SpawnError::surface("div is not an HtmlElement"))?;
        container.set_class_name("floating-container");
        body.append_child(&container).map_err(js_err)?;
        Ok(Self::new(document, container))
    }

    /// Draw straight into the body (confetti, notes).
    pub fn body(document: Document) -> Result<Self> {
        let body = document.body().ok_or_else(|| SpawnError::surface("no body"))?;
        Ok(Self::new(document, body))
    }

    fn build(&self, entity: &Entity) -> Result<HtmlElement> {
        let el: HtmlElement = self
            .document
            .create_element("div")
            .map_err(js_err)?
            .dyn_into()
            .map_err(|_| SpawnError::surface("div is not an HtmlElement"))?;
        if let Some(class) = &entity.class_name {
            el.set_class_name(class);
        }
        if entity.render == RenderMode::Text {
            el.set_text_content(Some(&entity.glyph));
        }
        let style = entity.inline_style();
        el.set_attribute("style", &style).map_err(js_err)?;
        Ok(el)
    }
}

impl Surface for DomSurface {
    fn append(&mut self, entity: &Entity) -> Result<()> {
        let el = self.build(entity)?;
        self.container.append_child(&el).map_err(js_err)?;
        self.live.insert(entity.id, el);
        Ok(())
    }

    fn apply_end_state(&mut self, id: EntityId, end: &EndTransform) {
        let Some(el) = self.live.get(&id) else { return };
        let style = el.style();
        if let Some(transform) = end.css_transform() {
            style.set_property("transform", &transform).ok();
        }
        style.set_property("opacity", &end.opacity().to_string()).ok();
    }

    fn remove(&mut self, id: EntityId) -> bool {
        match self.live.remove(&id) {
            Some(el) => {
                el.remove();
                true
            }
            None => false,
        }
    }

    fn len(&self) -> usize {
        self.live.len()
    }
}

// --- Scheduler ---------------------------------------------------------------

enum BrowserTimer {
    Timeout(i32),
    // Closure has to outlive the interval; dropped on cancel.
    Interval(i32, Closure<dyn FnMut()>),
}

/// `setTimeout` / `setInterval` on the window.
pub struct BrowserScheduler {
    window: Window,
    next_id: Cell<u64>,
    timers: std::rc::Rc<RefCell<HashMap<TimerId, BrowserTimer>>>,
}

impl BrowserScheduler {
    pub fn new(window: Window) -> Self {
        Self { window, next_id: Cell::new(0), timers: Default::default() }
    }

    fn allocate(&self) -> TimerId {
        let id = TimerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        id
    }
}

impl Scheduler for BrowserScheduler {
    fn run_once(&self, delay_ms: f64, task: Box<dyn FnOnce()>) -> TimerId {
        let id = self.allocate();
        let timers = self.timers.clone();
        let cb = Closure::once_into_js(move || {
            timers.borrow_mut().remove(&id);
            task();
        });
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(cb.unchecked_ref(), delay_ms.round() as i32)
        {
            Ok(handle) => {
                self.timers.borrow_mut().insert(id, BrowserTimer::Timeout(handle));
            }
            Err(err) => tracing::warn!(?err, "setTimeout failed"),
        }
        id
    }

    fn run_every(&self, interval_ms: f64, task: Box<dyn FnMut()>) -> TimerId {
        let id = self.allocate();
        let closure = Closure::wrap(task);
        match self.window.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            interval_ms.round() as i32,
        ) {
            Ok(handle) => {
                self.timers.borrow_mut().insert(id, BrowserTimer::Interval(handle, closure));
            }
            Err(err) => tracing::warn!(?err, "setInterval failed"),
        }
        id
    }

    fn cancel(&self, id: TimerId) {
        let Some(timer) = self.timers.borrow_mut().remove(&id) else { return };
        match timer {
            BrowserTimer::Timeout(handle) => self.window.clear_timeout_with_handle(handle),
            BrowserTimer::Interval(handle, _closure) => self.window.clear_interval_with_handle(handle),
        }
    }
}

// --- JS entry points ---------------------------------------------------------

type DomSpawner = Spawner<DomSurface, BrowserScheduler>;

fn spawner_on(surface: DomSurface, win: Window) -> DomSpawner {
    Spawner::new(surface, BrowserScheduler::new(win))
}

/// Handle returned to JS by [`start_floating_background`].
#[wasm_bindgen]
pub struct BackgroundHandle {
    inner: RecurringHandle,
}

#[wasm_bindgen]
impl BackgroundHandle {
    /// Stop spawning. Floaters already visible finish their flight.
    pub fn cancel(&self) {
        self.inner.cancel();
    }

    #[wasm_bindgen(getter)]
    pub fn cancelled(&self) -> bool {
        self.inner.is_cancelled()
    }
}

/// Populate the page background with the day's emoji and keep it topped up.
/// `page_id` is the body id, e.g. `"rose-day"`.
#[wasm_bindgen]
pub fn start_floating_background(page_id: &str) -> std::result::Result<BackgroundHandle, JsValue> {
    let (win, doc) = browser()?;
    let spawner = spawner_on(DomSurface::floating_container(doc)?, win);
    let glyphs = days::glyphs_for_page(page_id);
    tracing::info!(page_id, day = days::day_key(page_id), "starting floating background");
    let inner = spawner.spawn_recurring(days::BACKGROUND_INTERVAL_MS, &glyphs, &days::background_config())?;
    Ok(BackgroundHandle { inner })
}

#[wasm_bindgen]
pub fn burst_confetti() -> std::result::Result<(), JsValue> {
    let (win, doc) = browser()?;
    let spawner = spawner_on(DomSurface::body(doc)?, win);
    spawner.spawn_burst(days::CONFETTI_COUNT, &days::confetti_glyphs(), &days::confetti_config())?;
    Ok(())
}

#[wasm_bindgen]
pub fn play_music_notes() -> std::result::Result<(), JsValue> {
    let (win, doc) = browser()?;
    let spawner = spawner_on(DomSurface::body(doc)?, win);
    spawner.spawn_burst(days::MUSIC_NOTE_COUNT, &days::music_note_glyphs(), &days::music_note_config())?;
    Ok(())
}

/// Burst with a caller-supplied glyph list and JSON config.
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn burst_custom(count: usize, glyphs: Vec<String>, config_json: &str) -> std::result::Result<(), JsValue> {
    let glyphs = crate::config::GlyphSet::new(glyphs)?;
    let cfg = crate::config::SpawnConfig::from_json(config_json)?;
    let (win, doc) = browser()?;
    let spawner = spawner_on(DomSurface::body(doc)?, win);
    spawner.spawn_burst(count, &glyphs, &cfg)?;
    Ok(())
}
