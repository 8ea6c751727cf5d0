//! Fixed timestep simulation tick
//!
//! One call advances the level by exactly one frame (`FRAME_MS`).

use glam::{IVec2, Vec2};

use super::catalog::PowerUpKind;
use super::effects::{MAGNET_PULL, expire_effects, star_bounce, use_shield};
use super::scoring::collect_treat;
use super::sequence::{Resolution, SequenceStep};
use super::spawner::{try_spawn_power_ups, update_field_items};
use super::state::{GameEvent, GamePhase, GameState, LossReason};
use crate::consts::*;

/// Directional keys held this frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputIntent {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl InputIntent {
    /// Movement axis with components in -1..=1 (screen y grows downward)
    pub fn axis(&self) -> IVec2 {
        IVec2::new(
            self.right as i32 - self.left as i32,
            self.down as i32 - self.up as i32,
        )
    }

    fn toward(dir: Vec2) -> Self {
        const DEADZONE: f32 = 0.3;
        let d = dir.normalize_or_zero();
        Self {
            up: d.y < -DEADZONE,
            down: d.y > DEADZONE,
            left: d.x < -DEADZONE,
            right: d.x > DEADZONE,
        }
    }
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub intent: InputIntent,
    /// Pause toggle (Escape)
    pub toggle_pause: bool,
    /// Tab hidden or window blurred: pause, never unpause
    pub focus_lost: bool,
    /// Demo mode - AI steers the fish
    pub autopilot: bool,
}

/// Advance the game state by one fixed frame
pub fn tick(state: &mut GameState, input: &TickInput) {
    if input.toggle_pause {
        state.toggle_user_pause();
    }
    if input.focus_lost {
        state.set_user_paused(true);
    }

    // A user pause freezes everything, including the level clock
    if !state.is_playing() || state.user_paused {
        return;
    }

    state.clock.advance(FRAME_MS);
    state.frame += 1;

    update_countdown(state);
    if !state.is_playing() {
        return;
    }

    expire_effects(state);
    if !state.is_playing() {
        return;
    }

    advance_sequence(state);

    if !state.is_paused() {
        let intent = if input.autopilot {
            autopilot_intent(state)
        } else {
            input.intent
        };
        state.fish.steer(intent.axis());

        update_shark(state);
        if !state.is_playing() {
            return;
        }
        update_buddy(state);
        update_treats(state);
        if !state.is_playing() {
            return;
        }
    }

    state.update_particles();

    if !state.is_paused() {
        try_spawn_power_ups(state);
        update_field_items(state);
    }
}

/// 1 Hz countdown; decrements are skipped while frozen
fn update_countdown(state: &mut GameState) {
    let fired = state.countdown.poll(state.clock.now());
    if fired == 0 || state.timer_frozen() {
        return;
    }
    state.time_left -= fired as i32;
    if state.time_left <= 0 {
        state.time_left = 0;
        state.end_level(GamePhase::Lost(LossReason::TimeUp));
    }
}

fn advance_sequence(state: &mut GameState) {
    let SequenceStep::Resolve(resolution) = state.sequence.advance() else {
        return;
    };
    match resolution {
        Resolution::SwapPositions { fish_to, shark_to } => {
            state.fish.pos = fish_to;
            state.shark.pos = shark_to;
            state.spawn_particles(fish_to, PowerUpKind::Swap.glow(), 16);
            state.spawn_particles(shark_to, PowerUpKind::Swap.glow(), 16);
            state.push_event(GameEvent::Swapped);
        }
        Resolution::HookTeleport { target } => {
            state.fish.pos = target;
            state.fish.vel = Vec2::ZERO;
            state.spawn_particles(target, PowerUpKind::Hook.glow(), 16);
            state.push_event(GameEvent::Hooked { pos: target });
        }
    }
    log::debug!("Sequence resolved: {resolution:?}");
}

fn update_shark(state: &mut GameState) {
    if state.shark.hidden || state.effects.is_active(PowerUpKind::Hourglass) {
        return;
    }

    if state.shark.start_delay > 0 {
        state.shark.start_delay -= 1;
        state.shark.tail_phase += 0.06;
        return;
    }

    let target = state.decoy.as_ref().map_or(state.fish.pos, |d| d.pos);
    state.shark.chase(target);

    if let Some(decoy) = state.decoy.as_ref()
        && state.shark.pos.distance(decoy.pos) < DECOY_EATEN_RADIUS
    {
        let pos = decoy.pos;
        state.decoy = None;
        state.effects.clear(PowerUpKind::Decoy);
        state.spawn_particles(pos, PowerUpKind::Decoy.glow(), 12);
        state.push_event(GameEvent::DecoyEaten { pos });
        state.push_event(GameEvent::EffectEnded {
            kind: PowerUpKind::Decoy,
        });
    }

    if state.shark.pos.distance(state.fish.pos) < SHARK_CONTACT_RADIUS {
        if state.effects.is_active(PowerUpKind::Star) {
            star_bounce(state);
        } else if state.effects.is_active(PowerUpKind::Shield) {
            use_shield(state);
        } else {
            state.end_level(GamePhase::Lost(LossReason::SharkContact));
        }
    }
}

fn update_buddy(state: &mut GameState) {
    let fish_pos = state.fish.pos;
    let Some(buddy) = state.buddy.as_mut() else {
        return;
    };
    buddy.follow(fish_pos);
    let buddy_pos = buddy.pos;

    for i in 0..state.treats.len() {
        let treat = &state.treats[i];
        if !treat.collected && treat.pos.distance(buddy_pos) < TREAT_PICKUP_RADIUS {
            collect_treat(state, i);
        }
    }
}

/// Magnet pull, fish pickups, tombstone sweep, win check, combo decay
fn update_treats(state: &mut GameState) {
    let fish_pos = state.fish.pos;

    if state.effects.is_active(PowerUpKind::Magnet) {
        for t in state.treats.iter_mut().filter(|t| !t.collected) {
            let d = fish_pos - t.pos;
            let len = d.length();
            if len > 5.0 {
                t.pos += d / len * MAGNET_PULL;
            }
        }
    }

    for i in 0..state.treats.len() {
        let treat = &state.treats[i];
        if !treat.collected && treat.pos.distance(fish_pos) < TREAT_PICKUP_RADIUS {
            collect_treat(state, i);
        }
    }

    state.treats.retain(|t| !t.collected);
    if state.treats.is_empty() {
        state.end_level(GamePhase::Won);
        return;
    }

    state.combo.decay(state.clock.now());
}

/// Simple AI used by the demo: chase the nearest treat, flee a close shark
pub fn autopilot_intent(state: &GameState) -> InputIntent {
    const DANGER_RADIUS: f32 = 110.0;
    let fish = state.fish.pos;

    let shark_threat = !state.shark.hidden
        && state.shark.start_delay == 0
        && !state.effects.is_active(PowerUpKind::Star)
        && state.shark.pos.distance(fish) < DANGER_RADIUS;
    if shark_threat {
        let away = fish - state.shark.pos;
        // Slide along the wall instead of pinning against it
        let toward_center = crate::field_center() - fish;
        return InputIntent::toward(away.normalize_or_zero() * 2.0 + toward_center.normalize_or_zero());
    }

    let nearest_item = state
        .field_items()
        .filter(|item| item.kind != PowerUpKind::Poison && item.kind != PowerUpKind::Goop)
        .map(|item| item.pos)
        .filter(|p| p.distance(fish) < 120.0)
        .min_by(|a, b| a.distance(fish).total_cmp(&b.distance(fish)));
    let nearest_treat = state
        .treats
        .iter()
        .filter(|t| !t.collected)
        .map(|t| t.pos)
        .min_by(|a, b| a.distance(fish).total_cmp(&b.distance(fish)));

    match nearest_item.or(nearest_treat) {
        Some(target) => InputIntent::toward(target - fish),
        None => InputIntent::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::effects::activate;
    use crate::sim::entity::{PowerUpItem, Treat, TreatKind};
    use crate::sim::timer::Cooldown;

    fn quiet_level(seed: u64) -> GameState {
        let mut state = GameState::new(seed);
        state.start_level();
        // Park the shark far away so it cannot interfere
        state.shark.pos = Vec2::new(20.0, 20.0);
        state.shark.start_delay = u32::MAX;
        state
    }

    #[test]
    fn test_axis_from_keys() {
        let intent = InputIntent {
            up: true,
            right: true,
            ..Default::default()
        };
        assert_eq!(intent.axis(), IVec2::new(1, -1));
        let both = InputIntent {
            left: true,
            right: true,
            ..Default::default()
        };
        assert_eq!(both.axis(), IVec2::ZERO);
    }

    #[test]
    fn test_countdown_decrements_each_second() {
        let mut state = quiet_level(1);
        let start = state.time_left;
        for _ in 0..60 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.time_left, start - 1);
    }

    #[test]
    fn test_hourglass_freezes_countdown_and_shark() {
        let mut state = quiet_level(1);
        state.shark.start_delay = 0;
        state.shark.pos = Vec2::new(100.0, 100.0);
        activate(&mut state, PowerUpKind::Hourglass);
        let start = state.time_left;
        let shark = state.shark.pos;
        for _ in 0..120 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.time_left, start);
        assert_eq!(state.shark.pos, shark);
    }

    #[test]
    fn test_time_up_loses() {
        let mut state = quiet_level(1);
        state.time_left = 1;
        for _ in 0..61 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.phase, GamePhase::Lost(LossReason::TimeUp));
        assert_eq!(state.time_left, 0);
    }

    #[test]
    fn test_user_pause_freezes_clock() {
        let mut state = quiet_level(1);
        tick(
            &mut state,
            &TickInput {
                toggle_pause: true,
                ..Default::default()
            },
        );
        let now = state.clock.now();
        let fish = state.fish.pos;
        let held = TickInput {
            intent: InputIntent {
                right: true,
                ..Default::default()
            },
            ..Default::default()
        };
        for _ in 0..200 {
            tick(&mut state, &held);
        }
        assert_eq!(state.clock.now(), now);
        assert_eq!(state.fish.pos, fish);

        // Focus loss never unpauses
        tick(
            &mut state,
            &TickInput {
                focus_lost: true,
                ..Default::default()
            },
        );
        assert!(state.user_paused);
    }

    #[test]
    fn test_shield_absorbs_one_bite() {
        let mut state = quiet_level(1);
        state.shark.start_delay = 0;
        activate(&mut state, PowerUpKind::Shield);
        state.shark.pos = state.fish.pos + Vec2::new(10.0, 0.0);
        tick(&mut state, &TickInput::default());
        assert!(state.is_playing());
        assert!(!state.effects.is_active(PowerUpKind::Shield));
        assert!(state.shark.pos.distance(state.fish.pos) > SHARK_CONTACT_RADIUS);
    }

    #[test]
    fn test_star_beats_shield() {
        let mut state = quiet_level(1);
        state.shark.start_delay = 0;
        activate(&mut state, PowerUpKind::Shield);
        activate(&mut state, PowerUpKind::Star);
        state.shark.pos = state.fish.pos + Vec2::new(10.0, 0.0);
        tick(&mut state, &TickInput::default());
        assert!(state.is_playing());
        assert!(state.effects.is_active(PowerUpKind::Shield));
    }

    #[test]
    fn test_ghost_shark_cannot_bite() {
        let mut state = quiet_level(1);
        state.shark.start_delay = 0;
        activate(&mut state, PowerUpKind::Ghost);
        state.shark.pos = state.fish.pos;
        tick(&mut state, &TickInput::default());
        assert!(state.is_playing());
    }

    #[test]
    fn test_shark_eats_decoy_first() {
        let mut state = quiet_level(1);
        state.shark.start_delay = 0;
        activate(&mut state, PowerUpKind::Decoy);
        if let Some(decoy) = state.decoy.as_ref() {
            state.shark.pos = decoy.pos + Vec2::new(5.0, 0.0);
        }
        // Speeds are recomputed from the base every frame
        state.shark.base_speed = 0.0;
        tick(&mut state, &TickInput::default());
        assert!(state.decoy.is_none());
        assert!(!state.effects.is_active(PowerUpKind::Decoy));

        let events = state.drain_events();
        assert!(events.iter().any(|e| matches!(e, GameEvent::DecoyEaten { .. })));
        assert!(events.contains(&GameEvent::EffectEnded {
            kind: PowerUpKind::Decoy
        }));
    }

    #[test]
    fn test_magnet_pulls_treats() {
        let mut state = quiet_level(1);
        let fish = state.fish.pos;
        state.treats = vec![
            Treat::new(fish + Vec2::new(200.0, 0.0), TreatKind::Shrimp, 0.0),
            Treat::new(fish + Vec2::new(-200.0, 0.0), TreatKind::Shrimp, 0.0),
        ];
        activate(&mut state, PowerUpKind::Magnet);
        tick(&mut state, &TickInput::default());
        assert!(state.treats[0].pos.x < fish.x + 200.0 - 17.0);
    }

    #[test]
    fn test_buddy_collects_treats() {
        let mut state = quiet_level(1);
        state.fish.pos = Vec2::new(100.0, 100.0);
        activate(&mut state, PowerUpKind::Buddy);
        let buddy_pos = state.buddy.as_ref().map(|b| b.pos).unwrap_or_default();
        assert!(buddy_pos.distance(state.fish.pos) > 400.0);
        state.treats = vec![
            Treat::new(buddy_pos, TreatKind::Fries, 0.0),
            Treat::new(Vec2::new(40.0, 440.0), TreatKind::Fries, 0.0),
        ];
        tick(&mut state, &TickInput::default());
        assert_eq!(state.treats.len(), 1);
        assert_eq!(state.treats[0].pos, Vec2::new(40.0, 440.0));
        assert_eq!(state.score, 10);
    }

    #[test]
    fn test_buddy_picks_up_field_items() {
        let mut state = quiet_level(1);
        state.fish.pos = Vec2::new(100.0, 100.0);
        activate(&mut state, PowerUpKind::Buddy);
        let buddy_pos = state.buddy.as_ref().map(|b| b.pos).unwrap_or_default();
        state.treats = vec![Treat::new(Vec2::new(40.0, 440.0), TreatKind::Fries, 0.0)];
        state.field.clear();
        let now = state.clock.now();
        state.field.insert(PowerUpItem {
            kind: PowerUpKind::Ice,
            pos: buddy_pos,
            radius: POWERUP_RADIUS,
            bob_phase: 0.0,
            life: Cooldown::start(now, 5000.0),
        });

        tick(&mut state, &TickInput::default());

        assert!(!state.field.contains(PowerUpKind::Ice));
        assert!(state.effects.is_active(PowerUpKind::Ice));
    }

    #[test]
    fn test_buddy_gone_after_expiry() {
        let mut state = quiet_level(1);
        activate(&mut state, PowerUpKind::Buddy);
        for _ in 0..200 {
            tick(&mut state, &TickInput::default());
        }
        assert!(state.buddy.is_none());
    }

    #[test]
    fn test_autopilot_heads_for_treat() {
        let mut state = quiet_level(1);
        let fish = state.fish.pos;
        state.treats = vec![Treat::new(fish + Vec2::new(150.0, 0.0), TreatKind::Worm, 0.0)];
        state.field.clear();
        let intent = autopilot_intent(&state);
        assert!(intent.right);
        assert!(!intent.left);
    }
}
