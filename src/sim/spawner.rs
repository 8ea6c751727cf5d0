//! Power-up field: budgeted, rarity-weighted spawning and item lifetimes

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::catalog::{Catalog, PowerUpKind, can_spawn};
use super::effects::pick_up;
use super::entity::PowerUpItem;
use super::state::{GameEvent, GameState};
use super::timer::Cooldown;
use crate::consts::*;

/// Items keep this far from the field edges
const ITEM_EDGE_MARGIN: f32 = 50.0;
/// Minimum spawn distance from the fish
const ITEM_FISH_CLEARANCE: f32 = 80.0;
/// Minimum spawn distance from other items and uncollected treats
const ITEM_SPACING: f32 = 40.0;
const PLACEMENT_ATTEMPTS: u32 = 30;

/// At most one item per kind is ever on the field
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldItems {
    slots: [Option<PowerUpItem>; PowerUpKind::COUNT],
}

impl FieldItems {
    pub fn count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn contains(&self, kind: PowerUpKind) -> bool {
        self.slots[kind.index()].is_some()
    }

    pub fn get(&self, kind: PowerUpKind) -> Option<&PowerUpItem> {
        self.slots[kind.index()].as_ref()
    }

    pub fn get_mut(&mut self, kind: PowerUpKind) -> Option<&mut PowerUpItem> {
        self.slots[kind.index()].as_mut()
    }

    pub fn insert(&mut self, item: PowerUpItem) {
        let idx = item.kind.index();
        self.slots[idx] = Some(item);
    }

    pub fn remove(&mut self, kind: PowerUpKind) -> Option<PowerUpItem> {
        self.slots[kind.index()].take()
    }

    pub fn clear(&mut self) {
        self.slots = Default::default();
    }

    pub fn iter(&self) -> impl Iterator<Item = &PowerUpItem> {
        self.slots.iter().flatten()
    }

    /// Summed rarity cost of everything on the field
    pub fn cost(&self, catalog: &Catalog) -> u32 {
        self.iter().map(|item| catalog.rarity(item.kind).cost()).sum()
    }
}

/// Total rarity cost allowed on the field at `level`
pub fn field_budget(level: u32) -> u32 {
    let steps = level.max(1) - 1;
    (7 + steps * 8 / 14).min(MAX_FIELD_BUDGET)
}

/// One spawn pass over the catalog
pub fn try_spawn_power_ups(state: &mut GameState) {
    if state.is_paused() {
        return;
    }
    let mut count = state.field.count();
    if count >= MAX_FIELD_ITEMS {
        return;
    }

    let budget = field_budget(state.level);
    let mut current_cost = state.field.cost(state.catalog());

    for kind in PowerUpKind::ALL {
        if count >= MAX_FIELD_ITEMS {
            break;
        }
        if state.field.contains(kind)
            || state.last_spawned == Some(kind)
            || !can_spawn(kind, state)
        {
            continue;
        }

        let entry = *state.catalog().entry(kind);
        let cost = entry.rarity.cost();
        if current_cost + cost > budget {
            continue;
        }

        let roll: f64 = state.rng.random();
        if roll >= PW_SPAWN_CHANCE * entry.rarity.spawn_multiplier() {
            continue;
        }

        let pos = find_item_position(state);
        let bob_phase = state.rand_range(0.0, std::f32::consts::TAU);
        let life = Cooldown::start(state.clock.now(), entry.lifetime_ms());
        state.field.insert(PowerUpItem {
            kind,
            pos,
            radius: POWERUP_RADIUS,
            bob_phase,
            life,
        });
        state.last_spawned = Some(kind);
        current_cost += cost;
        count += 1;

        log::debug!(
            "Spawned {} ({}) at ({:.0}, {:.0})",
            kind.label(),
            entry.rarity.name(),
            pos.x,
            pos.y
        );
        state.push_event(GameEvent::PowerUpSpawned { kind, pos });
    }
}

/// Rejection-sample a spot away from the fish, other items and treats
///
/// After the last attempt the final candidate is used as-is.
fn find_item_position(state: &mut GameState) -> Vec2 {
    let mut pos = random_item_position(state);
    for _ in 1..PLACEMENT_ATTEMPTS {
        let clear = pos.distance(state.fish.pos) >= ITEM_FISH_CLEARANCE
            && !state.overlaps_existing(pos, ITEM_SPACING);
        if clear {
            break;
        }
        pos = random_item_position(state);
    }
    pos
}

fn random_item_position(state: &mut GameState) -> Vec2 {
    Vec2::new(
        state.rand_range(ITEM_EDGE_MARGIN, FIELD_WIDTH - ITEM_EDGE_MARGIN),
        state.rand_range(ITEM_EDGE_MARGIN, FIELD_HEIGHT - ITEM_EDGE_MARGIN),
    )
}

/// Bob, expire and collect field items
pub fn update_field_items(state: &mut GameState) {
    let now = state.clock.now();
    for kind in PowerUpKind::ALL {
        if !state.is_playing() {
            return;
        }
        let Some(item) = state.field.get_mut(kind) else {
            continue;
        };
        item.bob_phase += 0.06;
        let pos = item.pos;

        if item.is_expired(now) {
            state.field.remove(kind);
            state.spawn_particles(pos, 0x333333, 4);
            state.push_event(GameEvent::PowerUpExpired { kind, pos });
            continue;
        }

        let by_fish = pos.distance(state.fish.pos) < POWERUP_PICKUP_RADIUS;
        let by_buddy = state
            .buddy
            .as_ref()
            .is_some_and(|b| pos.distance(b.pos) < POWERUP_PICKUP_RADIUS);
        if by_fish || by_buddy {
            state.field.remove(kind);
            pick_up(state, kind, pos);
        }
    }
}
