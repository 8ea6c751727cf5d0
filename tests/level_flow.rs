//! End-to-end level flow driven through `tick`

use std::collections::BTreeMap;

use fish_frenzy::backend::{
    AdminCredentials, Backend, InMemoryService, Leaderboard, RemoteGameConfig,
};
use fish_frenzy::consts::POWERUP_RADIUS;
use fish_frenzy::sim::effects::activate;
use fish_frenzy::sim::{
    Cooldown, GameEvent, GamePhase, GameState, LossReason, PowerUpItem, PowerUpKind, Rarity,
    TickInput, Treat, TreatKind, tick,
};
use glam::Vec2;
use serde_json::json;

/// Level 1 with the shark parked in a corner and never chasing
fn quiet_game(seed: u64) -> GameState {
    let mut state = GameState::new(seed);
    state.new_game(0);
    state.particles_enabled = false;
    state.shark.pos = Vec2::new(20.0, 20.0);
    state.shark.start_delay = u32::MAX;
    state
}

fn treat_at(pos: Vec2) -> Treat {
    Treat::new(pos, TreatKind::Worm, 0.0)
}

fn step(state: &mut GameState) {
    tick(state, &TickInput::default());
}

fn admin() -> AdminCredentials {
    AdminCredentials {
        email: "ops@example.com".to_string(),
        password: "hunter2".to_string(),
    }
}

#[test]
fn test_last_treat_wins_level() {
    let mut state = quiet_game(1);
    let fish = state.fish.pos;
    state.treats = vec![treat_at(fish + Vec2::new(23.0, 0.0))];

    step(&mut state);

    assert_eq!(state.phase, GamePhase::Won);
    assert_eq!(state.score, 10);
    assert!(
        state
            .drain_events()
            .iter()
            .any(|e| matches!(e, GameEvent::LevelEnded { phase: GamePhase::Won }))
    );

    assert!(state.next_level());
    assert_eq!(state.level, 2);
    assert_eq!(state.treats.len(), 9);
    assert!(state.is_playing());
}

#[test]
fn test_frenzy_doubles_treat_points() {
    let mut state = quiet_game(2);
    let fish = state.fish.pos;
    state.treats = vec![treat_at(fish + Vec2::new(23.0, 0.0))];
    let now = state.clock.now();
    state.effects.activate_for(PowerUpKind::Frenzy, now, 3000.0);

    step(&mut state);

    assert_eq!(state.score, 20);
}

#[test]
fn test_shark_contact_loses_level() {
    let mut state = quiet_game(3);
    let fish = state.fish.pos;
    state.shark.pos = fish + Vec2::new(29.0, 0.0);
    state.shark.start_delay = 0;

    step(&mut state);

    assert_eq!(state.phase, GamePhase::Lost(LossReason::SharkContact));
    // Terminal: further ticks change nothing
    let frame = state.frame;
    step(&mut state);
    assert_eq!(state.frame, frame);
    assert!(!state.next_level());
}

#[test]
fn test_poison_can_run_the_clock_out() {
    let mut state = quiet_game(4);
    state.time_left = 2;

    activate(&mut state, PowerUpKind::Poison);

    assert_eq!(state.time_left, 0);
    assert_eq!(state.phase, GamePhase::Lost(LossReason::Poisoned));
}

#[test]
fn test_recollecting_ice_refreshes_duration() {
    let mut state = quiet_game(5);
    activate(&mut state, PowerUpKind::Ice);
    for _ in 0..120 {
        step(&mut state);
    }
    let now = state.clock.now();
    let left = state.effects.remaining_ms(PowerUpKind::Ice, now).unwrap_or(0.0);
    assert!((left - 2000.0).abs() < 20.0, "left {left}");

    activate(&mut state, PowerUpKind::Ice);
    let left = state.effects.remaining_ms(PowerUpKind::Ice, now).unwrap_or(0.0);
    assert!((left - 4000.0).abs() < 1.0, "left {left}");
    assert!(state.shark.speed < state.shark.base_speed);
}

/// Live shark, Magnet running and a short-lived field item: everything that
/// would move or change on an unpaused frame
fn busy_field(state: &mut GameState) {
    state.shark.start_delay = 0;
    let now = state.clock.now();
    state.effects.activate_for(PowerUpKind::Magnet, now, 10_000.0);
    state.field.clear();
    state.field.insert(PowerUpItem {
        kind: PowerUpKind::Poison,
        pos: Vec2::new(600.0, 100.0),
        radius: POWERUP_RADIUS,
        bob_phase: 0.0,
        life: Cooldown::start(now, 500.0),
    });
}

/// Step until the running sequence resolves, checking that nothing but the
/// sequence advances in between
fn run_sequence(state: &mut GameState) {
    let fish = state.fish.pos;
    let shark = state.shark.pos;
    let treats: Vec<Vec2> = state.treats.iter().map(|t| t.pos).collect();
    let items = state.field.count();
    let time_left = state.time_left;

    let mut frames = 0;
    while state.sequence.is_running() && frames < 300 {
        step(state);
        frames += 1;
        if state.sequence.is_running() {
            assert_eq!(state.fish.pos, fish, "frame {frames}");
            assert_eq!(state.shark.pos, shark, "frame {frames}");
            let now: Vec<Vec2> = state.treats.iter().map(|t| t.pos).collect();
            assert_eq!(now, treats, "frame {frames}");
            assert_eq!(state.field.count(), items, "frame {frames}");
        }
    }
    assert!(state.sequence.is_idle());
    // The countdown is frozen for the whole sequence
    assert_eq!(state.time_left, time_left);
}

#[test]
fn test_swap_freezes_then_trades_places() {
    let mut state = quiet_game(6);
    state.treats = vec![treat_at(Vec2::new(600.0, 400.0))];
    busy_field(&mut state);
    let fish_from = state.fish.pos;
    let shark_from = state.shark.pos;

    activate(&mut state, PowerUpKind::Swap);
    assert!(state.is_paused());
    run_sequence(&mut state);

    assert!(state.fish.pos.distance(shark_from) < 10.0);
    // The shark resumes chasing on the resolving frame
    assert!(state.shark.pos.distance(fish_from) < 10.0);
    assert!(state.is_playing());
    assert!(
        state
            .drain_events()
            .iter()
            .any(|e| matches!(e, GameEvent::Swapped))
    );
}

#[test]
fn test_hook_reels_fish_onto_nearest_treat() {
    let mut state = quiet_game(7);
    let target = Vec2::new(600.0, 400.0);
    state.treats = vec![treat_at(target), treat_at(Vec2::new(40.0, 440.0))];
    busy_field(&mut state);

    activate(&mut state, PowerUpKind::Hook);
    assert!(state.sequence.is_hook());
    run_sequence(&mut state);

    assert_eq!(state.score, 10);
    assert_eq!(state.treats_left(), 1);
    assert!(state.fish.pos.distance(target) < 1.0);
    assert!(state.is_playing());
}

#[test]
fn test_combo_multiplier_caps_at_five() {
    let mut state = quiet_game(8);
    let fish = state.fish.pos;
    state.treats = (0..6).map(|_| treat_at(fish)).collect();

    step(&mut state);

    assert_eq!(state.score, 10 + 20 + 30 + 40 + 50 + 50);
    let points: Vec<u64> = state
        .drain_events()
        .into_iter()
        .filter_map(|e| match e {
            GameEvent::TreatCollected { points, .. } => Some(points),
            _ => None,
        })
        .collect();
    assert_eq!(points, vec![10, 20, 30, 40, 50, 50]);
}

#[test]
fn test_time_runs_out() {
    let mut state = quiet_game(9);
    state.treats = vec![treat_at(Vec2::new(600.0, 400.0))];
    state.time_left = 1;

    for _ in 0..61 {
        step(&mut state);
    }

    assert_eq!(state.phase, GamePhase::Lost(LossReason::TimeUp));
}

#[test]
fn test_boot_applies_remote_rarities() {
    let mut service = InMemoryService::new(admin());
    let mut rarities = BTreeMap::new();
    rarities.insert("ice".to_string(), json!(5));
    rarities.insert("nonsense".to_string(), json!(2));
    rarities.insert("shield".to_string(), json!(-3));
    service.set_game_config(Some(RemoteGameConfig { rarities }));

    let mut backend = Backend::with_cache(service, Leaderboard::new());
    let boot = backend.boot();

    assert!(!boot.maintenance);
    assert_eq!(boot.catalog.rarity(PowerUpKind::Ice), Rarity::Mythical);
    assert_eq!(
        boot.catalog.rarity(PowerUpKind::Shield),
        PowerUpKind::Shield.default_rarity()
    );
    assert_eq!(
        boot.catalog.rarity(PowerUpKind::Frenzy),
        PowerUpKind::Frenzy.default_rarity()
    );
}

#[test]
fn test_maintenance_reported_at_boot() {
    let mut backend = Backend::with_cache(InMemoryService::new(admin()), Leaderboard::new());
    assert!(backend.admin_set_maintenance(&admin(), true).is_ok());
    assert!(backend.boot().maintenance);
}

#[test]
fn test_outage_degrades_to_cache() {
    let mut service = InMemoryService::new(admin());
    service.set_available(false);
    let mut backend = Backend::with_cache(service, Leaderboard::new());

    let boot = backend.boot();
    assert!(!boot.maintenance);
    assert!(!backend.is_online());
    assert_eq!(backend.global_high_score(), 0);

    assert_eq!(backend.submit_score("abc", 420, 3), Ok(Some(1)));
    assert_eq!(backend.global_high_score(), 420);
    assert_eq!(backend.cache().entries[0].name, "ABC");
}

#[test]
fn test_finished_run_reaches_leaderboard() {
    let mut backend = Backend::with_cache(InMemoryService::new(admin()), Leaderboard::new());
    backend.boot();

    let mut state = quiet_game(10);
    let fish = state.fish.pos;
    state.treats = vec![treat_at(fish)];
    step(&mut state);
    assert_eq!(state.phase, GamePhase::Won);

    let rank = backend.submit_score("FSH", state.score, state.level);
    assert_eq!(rank, Ok(Some(1)));
    assert!(backend.is_online());
    assert_eq!(backend.high_scores()[0].score, 10);

    // A fresh game knows the score to beat
    state.new_game(backend.global_high_score());
    assert_eq!(state.global_high_score, 10);
}
