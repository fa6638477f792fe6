//! Per-frame simulation tick
//!
//! Order within a tick: difficulty → player physics → spawn → scroll →
//! collision → score. Nothing runs unless the phase is `Running`.

use super::collision::first_hit;
use super::run::RunAction;
use super::state::{GameEvent, World};
use super::{difficulty, physics, score, spawn};

/// Input sampled once per tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Jump held (keyboard, mouse or touch)
    pub jump: bool,
}

/// Why a tick was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Delta time was negative or not finite
    InvalidDelta,
    /// The clock could not produce a delta
    ClockFault,
    /// The advanced state would have been corrupt
    CorruptState,
}

/// What a tick did
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Phase is not `Running`; nothing happened
    Inert,
    /// Tick dropped without touching state
    Skipped(SkipReason),
    /// Tick ran; events in the order they happened
    Advanced(Vec<GameEvent>),
}

impl TickOutcome {
    pub fn events(&self) -> &[GameEvent] {
        match self {
            TickOutcome::Advanced(events) => events,
            _ => &[],
        }
    }
}

/// Drive one display frame: sample the clock (only while running) and tick
pub fn frame(world: &mut World, now_ms: f64, input: &TickInput) -> TickOutcome {
    if !world.phase.is_live() {
        return TickOutcome::Inert;
    }
    match world.clock.sample(now_ms) {
        Some(dt) => tick(world, input, dt),
        None => {
            log::warn!("Skipping tick: frame clock fault at {now_ms}");
            TickOutcome::Skipped(SkipReason::ClockFault)
        }
    }
}

/// Advance the world by `dt` seconds
pub fn tick(world: &mut World, input: &TickInput, dt: f32) -> TickOutcome {
    if !world.phase.is_live() {
        return TickOutcome::Inert;
    }
    if !dt.is_finite() || dt < 0.0 {
        log::warn!("Skipping tick: invalid dt {dt}");
        return TickOutcome::Skipped(SkipReason::InvalidDelta);
    }
    let dt = dt.min(world.tuning.max_delta_time);

    // Work on a copy so a corrupt result is never committed
    let mut sim = world.sim;
    difficulty::advance(&mut sim, dt, &world.tuning);
    let next_score = score::advance(sim.score, dt, world.tuning.score_rate);
    if !sim.is_sane() || !next_score.is_finite() {
        log::warn!("Skipping tick: state would be corrupt ({sim:?})");
        return TickOutcome::Skipped(SkipReason::CorruptState);
    }
    world.sim = sim;

    let mut events = Vec::new();
    let ground_y = world.ground_y();

    if physics::integrate(
        &mut world.player,
        dt,
        world.sim.constants(),
        ground_y,
        input.jump,
    ) {
        events.push(GameEvent::Jumped);
    }

    let thresholds = spawn::thresholds(&world.sim, &world.tuning);
    if spawn::should_spawn(
        &world.obstacles,
        thresholds,
        world.viewport,
        dt,
        world.tuning.spawn_chance,
        &mut world.rng,
    ) {
        let id = world.next_entity_id();
        let obstacle =
            spawn::make_obstacle(id, world.viewport, ground_y, world.sim.elapsed, &world.tuning);
        world.obstacles.push(obstacle);
        events.push(GameEvent::ObstacleSpawned { id });
    }
    spawn::scroll(&mut world.obstacles, world.sim.speed, dt);

    if let Some(hit) = first_hit(&world.player, &world.obstacles) {
        log::info!("Hit obstacle {} at score {:.0}", hit.id, world.sim.score);
        world.apply(RunAction::Collide);
        if let Some(summary) = world.last_run {
            events.push(GameEvent::GameOver(summary));
        }
        return TickOutcome::Advanced(events);
    }

    world.sim.score = next_score;
    world.sim.elapsed += dt;

    let band = score::milestone(world.sim.score, world.tuning.milestone_interval);
    if band > world.last_milestone {
        world.last_milestone = band;
        events.push(GameEvent::Milestone(band));
    }

    let whole = score::finalize(world.sim.score);
    if !world.passed_best && world.best_score > 0 && whole > world.best_score {
        world.passed_best = true;
        events.push(GameEvent::NewBest(whole));
    }

    TickOutcome::Advanced(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Tuning;
    use crate::sim::state::{Obstacle, RunPhase, Viewport};
    use glam::Vec2;

    const DT: f32 = 1.0 / 60.0;

    fn running_world() -> World {
        let mut w = World::new(Tuning::default(), Viewport::new(800.0, 600.0), 12345);
        w.start();
        w
    }

    fn obstacle_on_player(w: &World) -> Obstacle {
        Obstacle {
            id: 999,
            pos: Vec2::new(w.player.pos.x + 10.0, w.ground_y() - 100.0),
            size: Vec2::new(30.0, 100.0),
            spawned_at: 0.0,
        }
    }

    #[test]
    fn test_idle_world_is_inert() {
        let mut w = World::new(Tuning::default(), Viewport::new(800.0, 600.0), 1);
        assert_eq!(tick(&mut w, &TickInput::default(), DT), TickOutcome::Inert);
        assert_eq!(w.sim.score, 0.0);
    }

    #[test]
    fn test_first_tick_spawns_at_right_edge() {
        let mut w = running_world();
        let outcome = tick(&mut w, &TickInput::default(), DT);
        assert!(matches!(
            outcome.events(),
            [GameEvent::ObstacleSpawned { .. }]
        ));
        assert_eq!(w.obstacles.len(), 1);
        // Spawned at the edge, then scrolled once
        assert!((w.obstacles[0].pos.x - (800.0 - w.sim.speed * DT)).abs() < 1e-3);
        assert_eq!(w.obstacles[0].pos.y + w.obstacles[0].size.y, w.ground_y());
    }

    #[test]
    fn test_score_increases_while_running() {
        let mut w = running_world();
        let mut last = w.sim.score;
        for _ in 0..30 {
            tick(&mut w, &TickInput::default(), DT);
            assert!(w.sim.score > last);
            last = w.sim.score;
        }
    }

    #[test]
    fn test_invalid_dt_is_skipped_without_change() {
        let mut w = running_world();
        tick(&mut w, &TickInput::default(), DT);
        let before_sim = w.sim;
        let before_y = w.player.pos.y;
        let before_obstacles = w.obstacles.len();

        for bad in [f32::NAN, f32::INFINITY, -0.5] {
            assert_eq!(
                tick(&mut w, &TickInput { jump: true }, bad),
                TickOutcome::Skipped(SkipReason::InvalidDelta)
            );
        }
        assert_eq!(w.sim, before_sim);
        assert_eq!(w.player.pos.y, before_y);
        assert_eq!(w.obstacles.len(), before_obstacles);
    }

    #[test]
    fn test_corrupt_speed_is_skipped() {
        let mut w = running_world();
        w.sim.speed = f32::NAN;
        assert_eq!(
            tick(&mut w, &TickInput::default(), DT),
            TickOutcome::Skipped(SkipReason::CorruptState)
        );
        assert_eq!(w.sim.score, 0.0);
    }

    #[test]
    fn test_oversized_dt_is_clamped() {
        let mut w = running_world();
        tick(&mut w, &TickInput::default(), 5.0);
        assert!((w.sim.score - 10.0 / 30.0).abs() < 1e-4);
    }

    #[test]
    fn test_collision_ends_run_and_freezes_score() {
        let mut w = running_world();
        w.best_score = 0;
        w.sim.score = 123.4;
        let obstacle = obstacle_on_player(&w);
        w.obstacles.push(obstacle);

        let outcome = tick(&mut w, &TickInput::default(), DT);
        assert_eq!(w.phase, RunPhase::GameOver);
        assert_eq!(w.sim.score, 123.4);
        let summary = w.last_run.unwrap();
        assert_eq!(summary.final_score, 123);
        assert!(
            outcome
                .events()
                .contains(&GameEvent::GameOver(summary))
        );

        // Frozen afterwards
        assert_eq!(tick(&mut w, &TickInput::default(), DT), TickOutcome::Inert);
        assert_eq!(w.sim.score, 123.4);
    }

    #[test]
    fn test_jump_clears_obstacle() {
        let mut w = running_world();
        // Jump, then rise for a while before placing an obstacle underneath
        tick(&mut w, &TickInput { jump: true }, DT);
        for _ in 0..15 {
            tick(&mut w, &TickInput::default(), DT);
        }
        assert!(!w.player.grounded);
        assert!(w.player.bottom() < w.ground_y() - 100.0);

        w.obstacles.clear();
        let obstacle = obstacle_on_player(&w);
        w.obstacles.push(obstacle);
        tick(&mut w, &TickInput::default(), DT);
        assert_eq!(w.phase, RunPhase::Running);
    }

    #[test]
    fn test_milestone_and_new_best_events() {
        let mut w = running_world();
        w.best_score = 100;
        w.sim.score = 399.99;
        // Keep the track clear of the player
        w.obstacles.clear();

        let outcome = tick(&mut w, &TickInput::default(), DT);
        let events = outcome.events();
        assert!(events.contains(&GameEvent::Milestone(1)));
        assert!(events.contains(&GameEvent::NewBest(400)));

        // Each fires once
        let outcome = tick(&mut w, &TickInput::default(), DT);
        assert!(
            !outcome
                .events()
                .iter()
                .any(|e| matches!(e, GameEvent::Milestone(_) | GameEvent::NewBest(_)))
        );
    }

    #[test]
    fn test_frame_ignores_clock_while_paused() {
        let mut w = running_world();
        assert!(matches!(
            frame(&mut w, 0.0, &TickInput::default()),
            TickOutcome::Advanced(_)
        ));
        w.toggle_pause();
        assert_eq!(
            frame(&mut w, 10_000.0, &TickInput::default()),
            TickOutcome::Inert
        );
    }

    #[test]
    fn test_determinism() {
        let mut a = World::new(Tuning::default(), Viewport::new(800.0, 600.0), 99999);
        let mut b = World::new(Tuning::default(), Viewport::new(800.0, 600.0), 99999);
        a.start();
        b.start();
        for i in 0..600 {
            let input = TickInput { jump: i % 45 == 0 };
            tick(&mut a, &input, DT);
            tick(&mut b, &input, DT);
        }
        assert_eq!(a.sim, b.sim);
        assert_eq!(a.phase, b.phase);
        assert_eq!(a.obstacles.len(), b.obstacles.len());
        assert_eq!(a.player.pos, b.player.pos);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            #[test]
            fn prop_running_world_invariants(
                seed in any::<u64>(),
                steps in prop::collection::vec((0.0f32..0.05, any::<bool>()), 1..400),
            ) {
                let mut w = World::new(Tuning::default(), Viewport::new(800.0, 600.0), seed);
                w.start();
                let mut last = w.sim;
                for (dt, jump) in steps {
                    tick(&mut w, &TickInput { jump }, dt);
                    prop_assert!(w.sim.score >= last.score);
                    prop_assert!(w.sim.speed >= last.speed);
                    prop_assert!(w.player.bottom() <= w.ground_y() + 1e-3);
                    for pair in w.obstacles.windows(2) {
                        prop_assert!(pair[0].spawned_at <= pair[1].spawned_at);
                    }
                    last = w.sim;
                    if w.phase != RunPhase::Running {
                        break;
                    }
                }
            }
        }
    }
}
