//! Transient entity spawner.
//!
//! A batch is either one [`Spawner::spawn_burst`] call or one tick of a
//! [`Spawner::spawn_recurring`] timer. For every entity in a batch the spawner:
//!
//! 1. draws glyph, size, lifetime and position from the [`SpawnConfig`],
//! 2. appends it to the surface in its initial state,
//! 3. after `transition_delay_ms` applies the end-state (cosmetic only),
//! 4. removes it exactly `duration_ms` after it was appended.
//!
//! Removal is scheduled unconditionally and the surface treats a second
//! removal as a no-op, so nothing outlives its lifetime. Cancelling a recurring
//! spawn stops future ticks only; entities already on the surface still expire
//! on their own schedule.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, trace, warn};

use crate::config::{GlyphSet, SpawnConfig};
use crate::entity::{Entity, EntityId};
use crate::error::{Result, SpawnError};
use crate::scheduler::{MIN_INTERVAL_MS, Scheduler, TimerId};
use crate::surface::Surface;

/// Owns the surface, the scheduler and the random source. Cheap to clone; all
/// clones share the same state.
pub struct Spawner<S, C> {
    surface: Rc<RefCell<S>>,
    scheduler: Rc<C>,
    rng: Rc<RefCell<StdRng>>,
    next_id: Rc<Cell<u64>>,
}

impl<S, C> Clone for Spawner<S, C> {
    fn clone(&self) -> Self {
        Self {
            surface: self.surface.clone(),
            scheduler: self.scheduler.clone(),
            rng: self.rng.clone(),
            next_id: self.next_id.clone(),
        }
    }
}

impl<S, C> Spawner<S, C>
where
    S: Surface + 'static,
    C: Scheduler + 'static,
{
    pub fn new(surface: S, scheduler: C) -> Self {
        Self::with_rng(surface, scheduler, StdRng::from_entropy())
    }

    pub fn with_rng(surface: S, scheduler: C, rng: StdRng) -> Self {
        Self::from_shared(Rc::new(RefCell::new(surface)), Rc::new(scheduler), rng)
    }

    /// Build on a surface / scheduler the caller keeps a handle to.
    pub fn from_shared(surface: Rc<RefCell<S>>, scheduler: Rc<C>, rng: StdRng) -> Self {
        Self {
            surface,
            scheduler,
            rng: Rc::new(RefCell::new(rng)),
            next_id: Rc::new(Cell::new(0)),
        }
    }

    pub fn surface(&self) -> &Rc<RefCell<S>> {
        &self.surface
    }

    pub fn scheduler(&self) -> &Rc<C> {
        &self.scheduler
    }

    /// Spawn `count` entities as one batch.
    ///
    /// With `stagger_ms == 0` all of them are appended before this returns;
    /// otherwise entity `i` is appended `i * stagger_ms` later (entity 0 right
    /// away). An append failure ends the batch: entities already appended keep
    /// their scheduled removal and the error is returned (or, for staggered
    /// entities, logged).
    pub fn spawn_burst(&self, count: usize, glyphs: &GlyphSet, cfg: &SpawnConfig) -> Result<()> {
        cfg.validate()?;
        debug!(count, stagger_ms = cfg.stagger_ms, "spawning burst");

        if cfg.stagger_ms <= 0.0 {
            for _ in 0..count {
                self.spawn_one(glyphs, cfg)?;
            }
            return Ok(());
        }

        if count > 0 {
            self.spawn_one(glyphs, cfg)?;
        }
        // Shared between the delayed spawns so one failure stops the rest of the batch.
        let aborted = Rc::new(Cell::new(false));
        let cfg = Rc::new(cfg.clone());
        for i in 1..count {
            let (spawner, glyphs, cfg, aborted) =
                (self.clone(), glyphs.clone(), cfg.clone(), aborted.clone());
            self.scheduler.run_once(
                i as f64 * cfg.stagger_ms,
                Box::new(move || {
                    if aborted.get() {
                        return;
                    }
                    if let Err(err) = spawner.spawn_one(&glyphs, &cfg) {
                        warn!(%err, index = i, "staggered spawn failed; dropping rest of batch");
                        aborted.set(true);
                    }
                }),
            );
        }
        Ok(())
    }

    /// Spawn `cfg.initial_burst` entities synchronously, then `cfg.per_tick`
    /// entities every `interval_ms` until the returned handle is cancelled.
    ///
    /// `interval_ms` must be at least [`MIN_INTERVAL_MS`]. A failing initial
    /// burst or tick is logged and skipped; later ticks still run.
    pub fn spawn_recurring(
        &self,
        interval_ms: f64,
        glyphs: &GlyphSet,
        cfg: &SpawnConfig,
    ) -> Result<RecurringHandle> {
        if !(interval_ms.is_finite() && interval_ms >= MIN_INTERVAL_MS) {
            return Err(SpawnError::InvalidInterval(interval_ms));
        }
        cfg.validate()?;

        let initial = cfg.initial_burst;
        for _ in 0..initial {
            if let Err(err) = self.spawn_one(glyphs, cfg) {
                warn!(%err, "initial burst failed; starting ticks anyway");
                break;
            }
        }

        let cancelled = Rc::new(Cell::new(false));
        let (spawner, glyphs, cfg, flag) =
            (self.clone(), glyphs.clone(), cfg.clone(), cancelled.clone());
        let timer = self.scheduler.run_every(
            interval_ms,
            Box::new(move || {
                if flag.get() {
                    return;
                }
                for _ in 0..cfg.per_tick {
                    if let Err(err) = spawner.spawn_one(&glyphs, &cfg) {
                        warn!(%err, "recurring tick failed; waiting for next tick");
                        break;
                    }
                }
            }),
        );
        debug!(interval_ms, initial, "recurring spawn started");

        let scheduler: Rc<dyn Scheduler> = self.scheduler.clone();
        Ok(RecurringHandle { cancelled, timer, scheduler })
    }

    /// Create, append and schedule one entity.
    fn spawn_one(&self, glyphs: &GlyphSet, cfg: &SpawnConfig) -> Result<EntityId> {
        let id = EntityId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        let entity = Entity::draw(id, glyphs, cfg, &mut *self.rng.borrow_mut());

        self.surface.borrow_mut().append(&entity)?;
        trace!(%id, glyph = %entity.glyph, duration_ms = entity.duration_ms, "entity appended");

        // Transition is registered before removal so it wins any tie.
        let surface = self.surface.clone();
        let end = entity.end_transform;
        self.scheduler.run_once(
            cfg.transition_delay_ms,
            Box::new(move || surface.borrow_mut().apply_end_state(id, &end)),
        );

        let surface = self.surface.clone();
        self.scheduler.run_once(
            entity.duration_ms,
            Box::new(move || {
                if surface.borrow_mut().remove(id) {
                    trace!(%id, "entity expired");
                }
            }),
        );
        Ok(id)
    }
}

/// Stops a recurring spawn. Dropping the handle does not cancel.
pub struct RecurringHandle {
    cancelled: Rc<Cell<bool>>,
    timer: TimerId,
    scheduler: Rc<dyn Scheduler>,
}

impl RecurringHandle {
    /// Suppress all future ticks. Entities already on the surface are left to
    /// expire on their own. Calling it again is a no-op.
    pub fn cancel(&self) {
        if !self.cancelled.replace(true) {
            self.scheduler.cancel(self.timer);
            debug!("recurring spawn cancelled");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

impl std::fmt::Debug for RecurringHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecurringHandle")
            .field("timer", &self.timer)
            .field("cancelled", &self.cancelled.get())
            .finish()
    }
}
