//! Power-up activation, timed deactivation and derived speeds
//!
//! Every timed effect is one slot in `ActiveEffects`; deactivation happens
//! when `expire_effects` finds the slot's cooldown has run out. Speeds are
//! never adjusted incrementally, they are recomputed from whatever is active.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::catalog::{PowerUpKind, can_activate};
use super::entity::{Buddy, Decoy, Treat};
use super::sequence::Sequence;
use super::state::{GameEvent, GamePhase, GameState, LossReason};
use super::timer::Cooldown;
use crate::consts::*;
use crate::{bearing, clamp_to_field};

/// Shark speed factor while Ice is active
pub const ICE_SPEED_FACTOR: f32 = 0.25;
/// Fish speed factor while Goop is active
pub const GOOP_SPEED_FACTOR: f32 = 0.5;
/// Magnet pull per frame
pub const MAGNET_PULL: f32 = 18.0;
/// Seconds removed by Poison
pub const POISON_PENALTY_SECONDS: i32 = 3;
/// How far from the fish a decoy appears
pub const DECOY_OFFSET: f32 = 100.0;
/// Treats multiplied by Crazy, per treat a level would normally start with
pub const CRAZY_TREAT_FACTOR: u32 = 20;

/// One row of the effect table
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectSlot {
    pub active: bool,
    /// Pending deactivation; `None` for effects that last until used
    pub timer: Option<Cooldown>,
}

/// Active-effect table indexed by `PowerUpKind`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffects {
    slots: [EffectSlot; PowerUpKind::COUNT],
}

/// A running timed effect, for the HUD
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectTimer {
    pub kind: PowerUpKind,
    pub remaining_ms: f64,
    pub fraction: f32,
}

impl ActiveEffects {
    pub fn is_active(&self, kind: PowerUpKind) -> bool {
        self.slots[kind.index()].active
    }

    /// Arm (or re-arm to the full duration) a timed effect
    pub fn activate_for(&mut self, kind: PowerUpKind, now: f64, duration_ms: f64) {
        self.slots[kind.index()] = EffectSlot {
            active: true,
            timer: Some(Cooldown::start(now, duration_ms)),
        };
    }

    /// Raise an untimed flag (Shield)
    pub fn set_flag(&mut self, kind: PowerUpKind) {
        self.slots[kind.index()] = EffectSlot {
            active: true,
            timer: None,
        };
    }

    pub fn clear(&mut self, kind: PowerUpKind) {
        self.slots[kind.index()] = EffectSlot::default();
    }

    pub fn remaining_ms(&self, kind: PowerUpKind, now: f64) -> Option<f64> {
        let slot = &self.slots[kind.index()];
        if !slot.active {
            return None;
        }
        slot.timer.map(|t| t.remaining(now))
    }

    /// Active timed effects whose cooldown has run out, in catalog order
    pub fn due(&self, now: f64) -> Vec<PowerUpKind> {
        PowerUpKind::ALL
            .into_iter()
            .filter(|k| {
                let slot = &self.slots[k.index()];
                slot.active && slot.timer.is_some_and(|t| t.is_expired(now))
            })
            .collect()
    }

    /// Drop every flag and pending expiry
    pub fn reset_all(&mut self) {
        self.slots = Default::default();
    }

    pub fn timers(&self, now: f64) -> Vec<EffectTimer> {
        PowerUpKind::ALL
            .into_iter()
            .filter_map(|kind| {
                let slot = &self.slots[kind.index()];
                let timer = slot.timer.filter(|_| slot.active)?;
                Some(EffectTimer {
                    kind,
                    remaining_ms: timer.remaining(now),
                    fraction: timer.fraction_remaining(now),
                })
            })
            .collect()
    }
}

/// Fish top speed from the base plus Frenzy, then Goop
pub fn fish_speed(effects: &ActiveEffects) -> f32 {
    let mut speed = FISH_BASE_SPEED;
    if effects.is_active(PowerUpKind::Frenzy) {
        speed += FRENZY_SPEED_BOOST;
    }
    if effects.is_active(PowerUpKind::Goop) {
        speed *= GOOP_SPEED_FACTOR;
    }
    speed
}

/// Shark speed from the level baseline and the active modifiers
pub fn shark_speed(base: f32, effects: &ActiveEffects) -> f32 {
    if effects.is_active(PowerUpKind::Hourglass) {
        return 0.0;
    }
    if effects.is_active(PowerUpKind::Ice) {
        return base * ICE_SPEED_FACTOR;
    }
    base
}

pub fn recompute_speeds(state: &mut GameState) {
    state.fish.speed = fish_speed(&state.effects);
    state.shark.speed = shark_speed(state.shark.base_speed, &state.effects);
}

/// Fish or buddy touched a field item
///
/// A pickup whose structural precondition no longer holds fizzles: the item
/// is already gone and nothing else happens.
pub fn pick_up(state: &mut GameState, kind: PowerUpKind, pos: Vec2) {
    state.spawn_particles(pos, kind.glow(), 14);
    if !can_activate(kind, state) {
        log::debug!("{} fizzled", kind.label());
        state.push_event(GameEvent::PowerUpFizzled { kind, pos });
        return;
    }
    log::debug!("Collected {}", kind.label());
    state.push_event(GameEvent::PowerUpCollected { kind, pos });
    activate(state, kind);
}

/// Apply a power-up's effect
pub fn activate(state: &mut GameState, kind: PowerUpKind) {
    let now = state.clock.now();
    if let Some(duration) = kind.effect_duration_ms() {
        state.effects.activate_for(kind, now, duration);
    }

    let fish_pos = state.fish.pos;
    match kind {
        PowerUpKind::Frenzy
        | PowerUpKind::Ice
        | PowerUpKind::Hourglass
        | PowerUpKind::Goop
        | PowerUpKind::Magnet
        | PowerUpKind::Star => {}
        PowerUpKind::Shield => state.effects.set_flag(kind),
        PowerUpKind::Ghost => state.shark.hidden = true,
        PowerUpKind::Buddy => {
            let tail_phase = state.rand_range(0.0, std::f32::consts::TAU);
            state.buddy = Some(Buddy {
                pos: Buddy::mirror_of(fish_pos),
                dir: -state.fish.dir,
                tail_phase,
            });
        }
        PowerUpKind::Bomb => {
            state.shark.pos = farthest_corner(fish_pos);
            state.spawn_particles(fish_pos, 0xff4444, 20);
            state.spawn_particles(fish_pos, 0xffaa00, 14);
        }
        PowerUpKind::Crazy => {
            let count = (5 + state.level * 2) * CRAZY_TREAT_FACTOR;
            for _ in 0..count {
                state.spawn_treat();
            }
            state.spawn_particles(fish_pos, kind.glow(), 40);
        }
        PowerUpKind::Decoy => {
            let away = bearing(fish_pos, state.shark.pos);
            let pos = fish_pos - Vec2::new(away.cos(), away.sin()) * DECOY_OFFSET;
            let tail_phase = state.rand_range(0.0, std::f32::consts::TAU);
            state.decoy = Some(Decoy {
                pos: clamp_to_field(pos, 30.0),
                dir: state.fish.dir,
                tail_phase,
            });
        }
        PowerUpKind::Swap => {
            state.sequence = Sequence::swap(fish_pos, state.shark.pos);
        }
        PowerUpKind::Double => double_treats(state),
        PowerUpKind::Wave => wave_treats(state),
        PowerUpKind::Poison => {
            state.time_left = (state.time_left - POISON_PENALTY_SECONDS).max(0);
            state.spawn_particles(fish_pos, kind.glow(), 16);
            if state.time_left <= 0 {
                state.end_level(GamePhase::Lost(LossReason::Poisoned));
            }
        }
        PowerUpKind::Hook => {
            if let Some(target) = nearest_treat(state, fish_pos) {
                state.sequence = Sequence::hook(fish_pos, target);
            }
        }
    }

    recompute_speeds(state);
}

/// Deactivate every timed effect whose expiry has passed
pub fn expire_effects(state: &mut GameState) {
    let now = state.clock.now();
    for kind in state.effects.due(now) {
        state.effects.clear(kind);
        match kind {
            PowerUpKind::Ghost => state.shark.hidden = false,
            PowerUpKind::Buddy => {
                if let Some(buddy) = state.buddy.take() {
                    state.spawn_particles(buddy.pos, kind.glow(), 8);
                }
            }
            PowerUpKind::Decoy => state.decoy = None,
            PowerUpKind::Crazy => {
                state.push_event(GameEvent::EffectEnded { kind });
                state.end_level(GamePhase::Lost(LossReason::Overdose));
                return;
            }
            _ => {}
        }
        state.push_event(GameEvent::EffectEnded { kind });
    }
    recompute_speeds(state);
}

/// Consume the shield on shark contact, throwing the shark back
pub fn use_shield(state: &mut GameState) {
    state.effects.clear(PowerUpKind::Shield);
    let fish_pos = state.fish.pos;
    state.shark.knock_back_from(fish_pos);
    state.spawn_particles(fish_pos, PowerUpKind::Shield.glow(), 20);
    state.push_event(GameEvent::ShieldSaved { pos: fish_pos });
}

/// Star contact: bounce the shark, keep the star
pub fn star_bounce(state: &mut GameState) {
    let fish_pos = state.fish.pos;
    state.shark.knock_back_from(fish_pos);
    state.spawn_particles(fish_pos, PowerUpKind::Star.glow(), 12);
    state.push_event(GameEvent::StarBounce { pos: fish_pos });
}

/// Field corner (30 in from both edges) farthest from `from`
pub fn farthest_corner(from: Vec2) -> Vec2 {
    let corners = [
        Vec2::new(30.0, 30.0),
        Vec2::new(FIELD_WIDTH - 30.0, 30.0),
        Vec2::new(30.0, FIELD_HEIGHT - 30.0),
        Vec2::new(FIELD_WIDTH - 30.0, FIELD_HEIGHT - 30.0),
    ];
    let mut best = corners[0];
    let mut best_d = 0.0;
    for c in corners {
        let d = c.distance(from);
        if d > best_d {
            best_d = d;
            best = c;
        }
    }
    best
}

fn nearest_treat(state: &GameState, from: Vec2) -> Option<Vec2> {
    state
        .treats
        .iter()
        .filter(|t| !t.collected)
        .map(|t| t.pos)
        .min_by(|a, b| a.distance(from).total_cmp(&b.distance(from)))
}

fn double_treats(state: &mut GameState) {
    let originals: Vec<Treat> = state.treats.iter().filter(|t| !t.collected).cloned().collect();
    for t in originals {
        let jitter = Vec2::new(state.rand_range(-20.0, 20.0), state.rand_range(-20.0, 20.0));
        let bob = state.rand_range(0.0, std::f32::consts::TAU);
        state.treats.push(Treat::new(t.pos + jitter, t.kind, bob));
    }
    let fish_pos = state.fish.pos;
    state.spawn_particles(fish_pos, PowerUpKind::Double.glow(), 16);
}

/// Push each uncollected treat to its nearest edge, moving one axis only
fn wave_treats(state: &mut GameState) {
    let mut moved = Vec::new();
    for t in state.treats.iter_mut().filter(|t| !t.collected) {
        let left = t.pos.x;
        let right = FIELD_WIDTH - t.pos.x;
        let top = t.pos.y;
        let bottom = FIELD_HEIGHT - t.pos.y;
        let min = left.min(right).min(top).min(bottom);
        if min == left {
            t.pos.x = 20.0;
        } else if min == right {
            t.pos.x = FIELD_WIDTH - 20.0;
        } else if min == top {
            t.pos.y = 20.0;
        } else {
            t.pos.y = FIELD_HEIGHT - 20.0;
        }
        moved.push(t.pos);
    }
    for pos in moved {
        state.spawn_particles(pos, PowerUpKind::Wave.glow(), 3);
    }
}
