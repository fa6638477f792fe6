//! End-to-end runs through the public API

use glam::Vec2;
use rural_runner::profile::{
    HighScoreWrite, MemoryStore, ProfileStore, Session, StoreError, UserProfile,
};
use rural_runner::sim::{
    self, CountdownDisplay, GameEvent, Obstacle, RunPhase, TickInput, TickOutcome, Viewport,
    World,
};
use rural_runner::Tuning;

const DT: f32 = 1.0 / 60.0;
const FRAME_MS: f64 = 1000.0 / 60.0;

fn running_world(seed: u64) -> World {
    let mut world = World::new(Tuning::default(), Viewport::new(800.0, 600.0), seed);
    assert!(world.start().success);
    world
}

fn obstacle_on_player(world: &World) -> Obstacle {
    Obstacle {
        id: 9_999,
        pos: Vec2::new(world.player.pos.x + 20.0, world.ground_y() - 100.0),
        size: Vec2::new(30.0, 100.0),
        spawned_at: world.sim.elapsed,
    }
}

/// Counts writes on top of an in-memory store
#[derive(Default)]
struct RecordingStore {
    inner: MemoryStore,
    writes: Vec<(String, u64)>,
}

impl ProfileStore for RecordingStore {
    fn get_user(&self, id: &str) -> Result<UserProfile, StoreError> {
        self.inner.get_user(id)
    }
    fn create_user(&mut self, id: &str, display_name: &str) -> Result<UserProfile, StoreError> {
        self.inner.create_user(id, display_name)
    }
    fn find_by_name(&self, display_name: &str) -> Result<Option<UserProfile>, StoreError> {
        self.inner.find_by_name(display_name)
    }
    fn update_high_score(&mut self, id: &str, value: u64) -> Result<(), StoreError> {
        self.writes.push((id.to_string(), value));
        self.inner.update_high_score(id, value)
    }
    fn list_top_scores(&self, limit: usize) -> Result<Vec<UserProfile>, StoreError> {
        self.inner.list_top_scores(limit)
    }
}

#[test]
fn one_second_of_running_without_input() {
    let mut world = running_world(7);
    for _ in 0..60 {
        tick_ok(&mut world, false);
    }

    assert_eq!(world.phase, RunPhase::Running);
    assert!(world.player.grounded);
    assert_eq!(world.player.bottom(), world.ground_y());
    assert!((world.sim.score - 10.0).abs() < 0.01, "score {}", world.sim.score);
    assert!((world.sim.speed - 307.0).abs() < 0.01, "speed {}", world.sim.speed);
    assert!(!world.obstacles.is_empty());
}

fn tick_ok(world: &mut World, jump: bool) -> Vec<GameEvent> {
    match sim::tick(world, &TickInput { jump }, DT) {
        TickOutcome::Advanced(events) => events,
        other => panic!("tick did not advance: {other:?}"),
    }
}

#[test]
fn pause_and_countdown_freeze_the_run() {
    let mut world = running_world(11);
    let input = TickInput::default();
    let mut now = 0.0;
    for _ in 0..30 {
        sim::frame(&mut world, now, &input);
        now += FRAME_MS;
    }
    let frozen = world.sim;
    let frozen_obstacles: Vec<f32> = world.obstacles.iter().map(|o| o.pos.x).collect();

    assert!(world.toggle_pause().success);
    // Five seconds of frames while paused
    for _ in 0..300 {
        now += FRAME_MS;
        assert_eq!(sim::frame(&mut world, now, &input), TickOutcome::Inert);
    }

    assert!(world.toggle_pause().success);
    assert_eq!(world.phase, RunPhase::CountingDown);
    let mut shown = vec![world.countdown_display()];
    while let Some(display) = world.countdown_tick() {
        // Frames during the countdown change nothing
        now += 1000.0;
        assert_eq!(sim::frame(&mut world, now, &input), TickOutcome::Inert);
        shown.push(Some(display));
    }
    assert_eq!(
        shown,
        [
            Some(CountdownDisplay::Number(3)),
            Some(CountdownDisplay::Number(2)),
            Some(CountdownDisplay::Number(1)),
            Some(CountdownDisplay::Go),
        ]
    );
    assert_eq!(world.phase, RunPhase::Running);
    assert_eq!(world.sim, frozen);
    let obstacles: Vec<f32> = world.obstacles.iter().map(|o| o.pos.x).collect();
    assert_eq!(obstacles, frozen_obstacles);

    // First frame after resuming re-anchors the clock instead of jumping
    now += 8_000.0;
    sim::frame(&mut world, now, &input);
    assert_eq!(world.sim.score, frozen.score);

    now += FRAME_MS;
    sim::frame(&mut world, now, &input);
    let gained = world.sim.score - frozen.score;
    assert!(gained > 0.0 && gained < 0.2, "gained {gained}");
}

#[test]
fn resuming_mid_jump_costs_at_most_one_tick_of_fall() {
    let mut world = running_world(13);
    tick_ok(&mut world, true);
    for _ in 0..5 {
        tick_ok(&mut world, false);
    }
    assert!(!world.player.grounded);
    world.obstacles.clear();
    let vel_before = world.player.vel_y;
    let height_before = world.player.pos.y;

    assert!(world.toggle_pause().success);
    assert!(world.toggle_pause().success);
    while world.countdown_tick().is_some() {}
    assert_eq!(world.phase, RunPhase::Running);
    assert_eq!(world.player.vel_y, vel_before);

    // Half a minute passes before the first frame after the countdown
    let input = TickInput::default();
    let bound = world.sim.gravity * world.tuning.max_delta_time + 1e-3;
    let mut now = 30_000.0;
    for _ in 0..2 {
        let vel = world.player.vel_y;
        sim::frame(&mut world, now, &input);
        assert!(
            (world.player.vel_y - vel).abs() <= bound,
            "vel jumped from {vel} to {}",
            world.player.vel_y
        );
        now += FRAME_MS;
    }
    assert!(!world.player.grounded);
    assert!((world.player.pos.y - height_before).abs() < 20.0);
}

#[test]
fn only_a_better_score_is_written() {
    let mut store = RecordingStore::default();
    store.inner.insert(UserProfile {
        id: "farmer1".into(),
        display_name: "Ada".into(),
        high_score: 300,
    });
    let mut session = Session::new();
    session.login(&store, "farmer1").unwrap();

    let mut world = World::new(Tuning::default(), Viewport::new(800.0, 600.0), 3);
    for (score, expect_write) in [(500.6_f32, true), (200.0, false)] {
        world.best_score = session.best_score();
        world.start();
        world.sim.score = score;
        let hit = obstacle_on_player(&world);
        world.obstacles.push(hit);

        let events = tick_ok(&mut world, false);
        let Some(GameEvent::GameOver(summary)) = events.last().copied() else {
            panic!("expected game over, got {events:?}");
        };
        assert_eq!(world.phase, RunPhase::GameOver);
        assert_eq!(summary.is_new_best(), expect_write);

        let result = session.record_run(&mut store, summary.final_score);
        if expect_write {
            assert_eq!(result, HighScoreWrite::Saved(500));
        } else {
            assert_eq!(result, HighScoreWrite::NotABest);
        }
    }

    assert_eq!(store.writes, [("farmer1".to_string(), 500)]);
    assert_eq!(session.best_score(), 500);
}

#[test]
fn restart_after_game_over_starts_clean() {
    let mut world = running_world(5);
    for _ in 0..60 {
        tick_ok(&mut world, false);
    }
    world.sim.score = 25.0;
    let hit = obstacle_on_player(&world);
    world.obstacles.push(hit);
    tick_ok(&mut world, false);
    assert_eq!(world.phase, RunPhase::GameOver);
    assert_eq!(world.best_score, 25);

    assert!(world.start().success);
    assert_eq!(world.sim.score, 0.0);
    assert_eq!(world.sim.speed, 300.0);
    assert!(world.obstacles.is_empty());
    assert!(world.player.grounded);
}

#[test]
fn tuning_override_changes_the_run() {
    let tuning = Tuning::from_json(r#"{ "score_rate": 20.0, "speed_growth_rate": 0.0 }"#).unwrap();
    let mut world = World::new(tuning, Viewport::new(800.0, 600.0), 1);
    world.start();
    for _ in 0..60 {
        tick_ok(&mut world, false);
    }
    assert!((world.sim.score - 20.0).abs() < 0.01);
    assert_eq!(world.sim.speed, 300.0);
}

#[test]
fn long_run_keeps_obstacles_in_spawn_order() {
    let mut world = World::new(Tuning::default(), Viewport::new(800.0, 600.0), 2024);
    world.start();
    // Drop anything about to reach the player so the run never ends
    let safe_x = world.player.pos.x + world.player.size.x + 50.0;
    for _ in 0..(60 * 30) {
        world.obstacles.retain(|o| o.pos.x > safe_x);
        tick_ok(&mut world, false);
        for pair in world.obstacles.windows(2) {
            assert!(pair[0].pos.x < pair[1].pos.x);
            assert!(pair[0].spawned_at <= pair[1].spawned_at);
        }
    }
    assert_eq!(world.phase, RunPhase::Running);
    assert!(world.sim.speed > 300.0 + 7.0 * 29.0);
}
