// Native integration tests for the spawner. They drive it with the in-memory
// surface and the virtual clock, so no browser is needed.

use std::cell::RefCell;
use std::rc::Rc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use valentine_floaters::{
    EntityId, GlyphSet, MIN_INTERVAL_MS, ManualScheduler, MemorySurface, SizeUnit, Span, SpawnConfig, SpawnError,
    Spawner, Surface, days,
};

type Rig = (
    Spawner<MemorySurface, ManualScheduler>,
    Rc<RefCell<MemorySurface>>,
    Rc<ManualScheduler>,
);

fn rig(seed: u64) -> Rig {
    let surface = Rc::new(RefCell::new(MemorySurface::new()));
    let sched = Rc::new(ManualScheduler::new());
    let spawner = Spawner::from_shared(surface.clone(), sched.clone(), StdRng::seed_from_u64(seed));
    (spawner, surface, sched)
}

fn hearts() -> GlyphSet {
    GlyphSet::new(["❤️", "💖", "💘"]).unwrap()
}

// Lifetimes long enough that nothing expires during the tick checks.
fn long_lived() -> SpawnConfig {
    SpawnConfig::default().with_duration_ms(Span::fixed(10_000.0))
}

#[test]
fn confetti_burst_of_thirty_clears_after_lifetime() {
    let (spawner, surface, sched) = rig(1);
    spawner
        .spawn_burst(days::CONFETTI_COUNT, &days::confetti_glyphs(), &days::confetti_config())
        .unwrap();
    assert_eq!(surface.borrow().len(), 30);

    sched.advance(999.0);
    assert_eq!(surface.borrow().len(), 30);
    assert!(surface.borrow().entities().all(|p| p.end_applied));

    sched.advance(1.0);
    assert!(surface.borrow().is_empty());
    assert_eq!(surface.borrow().appended_total(), 30);
    assert_eq!(surface.borrow().removed_total(), 30);
    assert_eq!(sched.pending(), 0);
}

#[test]
fn drawn_sizes_and_durations_stay_in_range() {
    let (spawner, surface, _sched) = rig(2);
    let cfg = SpawnConfig::default()
        .with_size(Span::new(1.5, 3.0), SizeUnit::Rem)
        .with_duration_ms(Span::new(3_000.0, 8_000.0));
    spawner.spawn_burst(500, &hearts(), &cfg).unwrap();

    let surface = surface.borrow();
    assert_eq!(surface.len(), 500);
    for placed in surface.entities() {
        let e = &placed.entity;
        assert!(cfg.size_range.contains(e.size), "size {} out of range", e.size);
        assert!(cfg.duration_range.contains(e.duration_ms), "duration {} out of range", e.duration_ms);
    }
}

#[test]
fn every_entity_is_gone_by_its_own_duration() {
    let (spawner, surface, sched) = rig(3);
    let cfg = SpawnConfig::default().with_duration_ms(Span::new(3_000.0, 8_000.0));
    spawner.spawn_burst(100, &hearts(), &cfg).unwrap();
    let lifetimes: Vec<(EntityId, f64)> =
        surface.borrow().entities().map(|p| (p.entity.id, p.entity.duration_ms)).collect();

    for t in 1..=8_000 {
        sched.advance(1.0);
        let now = t as f64;
        let surface = surface.borrow();
        for &(id, d) in &lifetimes {
            assert_eq!(surface.contains(id), d > now, "entity {id} with lifetime {d} at t={now}");
        }
    }
    assert!(surface.borrow().is_empty());
}

#[test]
fn single_glyph_set_is_used_for_every_entity() {
    let (spawner, surface, _sched) = rig(4);
    let rose = GlyphSet::new(["🌹"]).unwrap();
    spawner.spawn_burst(50, &rose, &SpawnConfig::default()).unwrap();
    assert!(surface.borrow().entities().all(|p| p.entity.glyph == "🌹"));
}

#[test]
fn glyphs_are_drawn_only_from_the_set() {
    let (spawner, surface, _sched) = rig(5);
    let set = days::glyphs_for_page("chocolate-day");
    spawner.spawn_burst(200, &set, &SpawnConfig::default()).unwrap();
    let surface = surface.borrow();
    assert!(surface.entities().all(|p| set.contains(&p.entity.glyph)));
    // 200 draws over five glyphs hit every one of them.
    for glyph in set.iter() {
        assert!(surface.entities().any(|p| p.entity.glyph == glyph), "{glyph} never drawn");
    }
}

#[test]
fn recurring_populates_immediately_then_ticks() {
    let (spawner, surface, sched) = rig(6);
    let cfg = long_lived().with_initial_burst(20);
    let handle = spawner.spawn_recurring(800.0, &hearts(), &cfg).unwrap();
    assert_eq!(surface.borrow().len(), 20);

    sched.advance(799.0);
    assert_eq!(surface.borrow().len(), 20);
    sched.advance(1.0);
    assert_eq!(surface.borrow().len(), 21);
    sched.advance(1_600.0);
    assert_eq!(surface.borrow().len(), 23);

    handle.cancel();
    assert!(handle.is_cancelled());
    sched.advance(5_000.0);
    assert_eq!(surface.borrow().appended_total(), 23);

    // Cancelling does not clear what is already on screen; it expires on schedule.
    assert_eq!(surface.borrow().len(), 23);
    sched.advance(10_000.0);
    assert!(surface.borrow().is_empty());
    assert_eq!(surface.borrow().removed_total(), 23);
}

#[test]
fn background_preset_keeps_surface_bounded() {
    let (spawner, surface, sched) = rig(7);
    let handle = spawner
        .spawn_recurring(days::BACKGROUND_INTERVAL_MS, &days::glyphs_for_page("rose-day"), &days::background_config())
        .unwrap();
    assert_eq!(surface.borrow().len(), days::BACKGROUND_INITIAL_COUNT);

    // Lifetimes cap at 8s, so at most 20 + 8000/800 entities can be alive.
    for _ in 0..600 {
        sched.advance(100.0);
        assert!(surface.borrow().len() <= days::BACKGROUND_INITIAL_COUNT + 10);
    }
    handle.cancel();
    sched.advance(8_000.0);
    assert!(surface.borrow().is_empty());
}

#[test]
fn cancel_twice_is_harmless() {
    let (spawner, _surface, sched) = rig(8);
    let handle = spawner.spawn_recurring(800.0, &hearts(), &long_lived()).unwrap();
    handle.cancel();
    handle.cancel();
    assert!(handle.is_cancelled());
    sched.advance(2_000.0);
    assert_eq!(sched.pending(), 0);
}

#[test]
fn early_removal_makes_expiry_a_no_op() {
    let (spawner, surface, sched) = rig(9);
    spawner.spawn_burst(3, &hearts(), &long_lived()).unwrap();
    assert!(surface.borrow_mut().remove(EntityId(1)));
    assert!(!surface.borrow_mut().remove(EntityId(1)));
    assert_eq!(surface.borrow().len(), 2);

    sched.advance(10_000.0);
    assert!(surface.borrow().is_empty());
    assert_eq!(surface.borrow().removed_total(), 3);
}

#[test]
fn end_state_is_applied_after_the_transition_delay() {
    let (spawner, surface, sched) = rig(10);
    let cfg = long_lived().with_transition_delay_ms(10.0);
    spawner.spawn_burst(5, &hearts(), &cfg).unwrap();
    assert!(surface.borrow().entities().all(|p| !p.end_applied));
    sched.advance(9.0);
    assert!(surface.borrow().entities().all(|p| !p.end_applied));
    sched.advance(1.0);
    assert!(surface.borrow().entities().all(|p| p.end_applied));
}

#[test]
fn failing_tick_does_not_stop_the_schedule() {
    let (spawner, surface, sched) = rig(11);
    let _handle = spawner.spawn_recurring(800.0, &hearts(), &long_lived()).unwrap();

    surface.borrow_mut().set_reject_appends(true);
    sched.advance(1_600.0);
    assert_eq!(surface.borrow().appended_total(), 0);

    // A failing burst is reported to its caller and leaves the recurring timer alone.
    assert!(matches!(
        spawner.spawn_burst(3, &hearts(), &long_lived()),
        Err(SpawnError::Surface(_))
    ));

    surface.borrow_mut().set_reject_appends(false);
    sched.advance(800.0);
    assert_eq!(surface.borrow().appended_total(), 1);
}

#[test]
fn failing_initial_burst_still_starts_the_ticks() {
    let (spawner, surface, sched) = rig(16);
    surface.borrow_mut().set_reject_appends(true);
    let handle = spawner
        .spawn_recurring(800.0, &hearts(), &long_lived().with_initial_burst(20))
        .unwrap();
    assert!(!handle.is_cancelled());
    assert_eq!(surface.borrow().appended_total(), 0);

    surface.borrow_mut().set_reject_appends(false);
    sched.advance(4_000.0);
    assert_eq!(surface.borrow().appended_total(), 5);
}

#[test]
fn interval_below_scheduler_floor_is_rejected() {
    let (spawner, surface, sched) = rig(17);
    assert!(matches!(
        spawner.spawn_recurring(MIN_INTERVAL_MS / 2.0, &hearts(), &long_lived()),
        Err(SpawnError::InvalidInterval(_))
    ));
    assert!(surface.borrow().is_empty());
    assert_eq!(sched.pending(), 0);

    let handle = spawner.spawn_recurring(MIN_INTERVAL_MS, &hearts(), &long_lived()).unwrap();
    sched.advance(10.0);
    assert_eq!(surface.borrow().appended_total(), 10);
    handle.cancel();
}

#[test]
fn invalid_config_fails_before_touching_the_surface() {
    let (spawner, surface, sched) = rig(12);
    let inverted = SpawnConfig::default().with_duration_ms(Span::new(8_000.0, 3_000.0));
    assert!(matches!(
        spawner.spawn_burst(10, &hearts(), &inverted),
        Err(SpawnError::InvalidRange { field: "duration", .. })
    ));
    assert!(matches!(
        spawner.spawn_recurring(0.0, &hearts(), &SpawnConfig::default()),
        Err(SpawnError::InvalidInterval(_))
    ));
    assert!(matches!(
        spawner.spawn_recurring(f64::INFINITY, &hearts(), &SpawnConfig::default()),
        Err(SpawnError::InvalidInterval(_))
    ));
    assert!(surface.borrow().is_empty());
    assert_eq!(sched.pending(), 0);
}

#[test]
fn music_notes_are_staggered_and_each_lives_five_seconds() {
    let (spawner, surface, sched) = rig(13);
    spawner
        .spawn_burst(days::MUSIC_NOTE_COUNT, &days::music_note_glyphs(), &days::music_note_config())
        .unwrap();
    assert_eq!(surface.borrow().len(), 1);

    sched.advance(300.0);
    assert_eq!(surface.borrow().len(), 2);
    sched.advance(3_900.0);
    assert_eq!(surface.borrow().len(), 15);
    sched.advance(800.0);
    assert_eq!(surface.borrow().len(), 14);
    sched.advance(4_200.0);
    assert!(surface.borrow().is_empty());
    assert_eq!(surface.borrow().appended_total(), 15);
}

#[test]
fn staggered_failure_drops_the_rest_of_its_batch() {
    let (spawner, surface, sched) = rig(14);
    let cfg = long_lived().with_stagger_ms(100.0);
    spawner.spawn_burst(5, &hearts(), &cfg).unwrap();
    surface.borrow_mut().set_reject_appends(true);
    sched.advance(100.0);
    surface.borrow_mut().set_reject_appends(false);
    sched.advance(1_000.0);
    assert_eq!(surface.borrow().appended_total(), 1);
}

#[test]
fn batches_are_independent() {
    let (spawner, surface, sched) = rig(15);
    spawner.spawn_burst(4, &hearts(), &SpawnConfig::default().with_duration_ms(Span::fixed(1_000.0))).unwrap();
    sched.advance(500.0);
    spawner.spawn_burst(4, &hearts(), &SpawnConfig::default().with_duration_ms(Span::fixed(1_000.0))).unwrap();
    assert_eq!(surface.borrow().len(), 8);
    sched.advance(500.0);
    assert_eq!(surface.borrow().len(), 4);
    sched.advance(500.0);
    assert!(surface.borrow().is_empty());
}

#[test]
fn entropy_seeded_spawner_works_natively() {
    let spawner = Spawner::new(MemorySurface::new(), ManualScheduler::new());
    spawner.spawn_burst(3, &hearts(), &SpawnConfig::default()).unwrap();
    assert_eq!(spawner.surface().borrow().len(), 3);
    spawner.scheduler().advance(8_000.0);
    assert!(spawner.surface().borrow().is_empty());
}
