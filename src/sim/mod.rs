//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (`FRAME_MS` per tick)
//! - Seeded RNG only
//! - Stable iteration order (catalog order for power-ups)
//! - No rendering or platform dependencies

pub mod catalog;
pub mod effects;
pub mod entity;
pub mod scoring;
pub mod sequence;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod timer;

pub use catalog::{Catalog, CatalogEntry, PowerUpKind, Rarity, can_activate, can_spawn};
pub use effects::{ActiveEffects, EffectTimer};
pub use entity::{Buddy, Decoy, Fish, Particle, PowerUpItem, Shark, Treat, TreatKind};
pub use scoring::{Combo, collect_treat, streak_message};
pub use sequence::{HookPhase, Sequence, SwapPhase};
pub use spawner::{FieldItems, field_budget};
pub use state::{GameEvent, GamePhase, GameState, LossReason};
pub use tick::{InputIntent, TickInput, autopilot_intent, tick};
pub use timer::{Clock, Cooldown, Interval};
