//! Power-up catalog: kinds, rarity tiers and eligibility
//!
//! The catalog is resolved once at boot (built-in tiers plus any remote
//! overrides) and is read-only to the simulation afterwards.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::state::GameState;

/// Every power-up, in catalog (and spawn-scan) order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PowerUpKind {
    Frenzy,
    Ice,
    Shield,
    Poison,
    Goop,
    Hourglass,
    Buddy,
    Hook,
    Ghost,
    Bomb,
    Decoy,
    Swap,
    Star,
    Double,
    Magnet,
    Wave,
    Crazy,
}

impl PowerUpKind {
    pub const COUNT: usize = 17;

    pub const ALL: [PowerUpKind; Self::COUNT] = [
        PowerUpKind::Frenzy,
        PowerUpKind::Ice,
        PowerUpKind::Shield,
        PowerUpKind::Poison,
        PowerUpKind::Goop,
        PowerUpKind::Hourglass,
        PowerUpKind::Buddy,
        PowerUpKind::Hook,
        PowerUpKind::Ghost,
        PowerUpKind::Bomb,
        PowerUpKind::Decoy,
        PowerUpKind::Swap,
        PowerUpKind::Star,
        PowerUpKind::Double,
        PowerUpKind::Magnet,
        PowerUpKind::Wave,
        PowerUpKind::Crazy,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Key used by the remote config (`rarities.<key>`)
    pub fn key(self) -> &'static str {
        match self {
            PowerUpKind::Frenzy => "frenzy",
            PowerUpKind::Ice => "ice",
            PowerUpKind::Shield => "shield",
            PowerUpKind::Poison => "poison",
            PowerUpKind::Goop => "goop",
            PowerUpKind::Hourglass => "hourglass",
            PowerUpKind::Buddy => "buddy",
            PowerUpKind::Hook => "hook",
            PowerUpKind::Ghost => "ghost",
            PowerUpKind::Bomb => "bomb",
            PowerUpKind::Decoy => "decoy",
            PowerUpKind::Swap => "swap",
            PowerUpKind::Star => "star",
            PowerUpKind::Double => "double",
            PowerUpKind::Magnet => "magnet",
            PowerUpKind::Wave => "wave",
            PowerUpKind::Crazy => "crazy",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.key() == key)
    }

    /// HUD label
    pub fn label(self) -> &'static str {
        match self {
            PowerUpKind::Hourglass => "TIME STOP",
            PowerUpKind::Crazy => "OVERDOSE",
            PowerUpKind::Frenzy => "FRENZY",
            PowerUpKind::Ice => "ICE",
            PowerUpKind::Shield => "SHIELD",
            PowerUpKind::Poison => "POISON",
            PowerUpKind::Goop => "GOOP",
            PowerUpKind::Buddy => "BUDDY",
            PowerUpKind::Hook => "HOOK",
            PowerUpKind::Ghost => "GHOST",
            PowerUpKind::Bomb => "BOOM",
            PowerUpKind::Decoy => "DECOY",
            PowerUpKind::Swap => "SWAP",
            PowerUpKind::Star => "STAR",
            PowerUpKind::Double => "DOUBLE",
            PowerUpKind::Magnet => "MAGNET",
            PowerUpKind::Wave => "WAVE",
        }
    }

    /// Glow colour (0xRRGGBB) used for pickup bursts
    pub fn glow(self) -> u32 {
        match self {
            PowerUpKind::Frenzy => 0xff8800,
            PowerUpKind::Ice => 0x88ddff,
            PowerUpKind::Shield => 0x44ee88,
            PowerUpKind::Poison => 0x44ff00,
            PowerUpKind::Goop => 0x66cc44,
            PowerUpKind::Hourglass => 0xffdd44,
            PowerUpKind::Buddy => 0x44ddaa,
            PowerUpKind::Hook => 0xccaa44,
            PowerUpKind::Ghost => 0xff8844,
            PowerUpKind::Bomb => 0xff4444,
            PowerUpKind::Decoy => 0xffaa44,
            PowerUpKind::Swap => 0xaa44ff,
            PowerUpKind::Star => 0xffee44,
            PowerUpKind::Double => 0x44ddff,
            PowerUpKind::Magnet => 0xdd44ff,
            PowerUpKind::Wave => 0x4488ff,
            PowerUpKind::Crazy => 0xff00aa,
        }
    }

    pub fn default_rarity(self) -> Rarity {
        match self {
            PowerUpKind::Frenzy => Rarity::Common,
            PowerUpKind::Ice | PowerUpKind::Shield | PowerUpKind::Poison => Rarity::Uncommon,
            PowerUpKind::Goop | PowerUpKind::Hourglass | PowerUpKind::Buddy | PowerUpKind::Hook => {
                Rarity::Rare
            }
            PowerUpKind::Ghost | PowerUpKind::Bomb | PowerUpKind::Decoy | PowerUpKind::Swap => {
                Rarity::Epic
            }
            PowerUpKind::Star | PowerUpKind::Double | PowerUpKind::Magnet | PowerUpKind::Wave => {
                Rarity::Mythical
            }
            PowerUpKind::Crazy => Rarity::Special,
        }
    }

    /// How long the effect stays active, for effects with a timed deactivation
    pub fn effect_duration_ms(self) -> Option<f64> {
        match self {
            PowerUpKind::Frenzy => Some(3000.0),
            PowerUpKind::Ice => Some(4000.0),
            PowerUpKind::Magnet => Some(500.0),
            PowerUpKind::Ghost => Some(3000.0),
            PowerUpKind::Hourglass => Some(3500.0),
            PowerUpKind::Buddy => Some(3000.0),
            PowerUpKind::Bomb => Some(2000.0),
            PowerUpKind::Crazy => Some(5000.0),
            PowerUpKind::Decoy => Some(4000.0),
            PowerUpKind::Star => Some(3000.0),
            PowerUpKind::Goop => Some(4000.0),
            PowerUpKind::Shield
            | PowerUpKind::Poison
            | PowerUpKind::Hook
            | PowerUpKind::Swap
            | PowerUpKind::Double
            | PowerUpKind::Wave => None,
        }
    }
}

/// Rarity tier: spawn weight, field lifetime and budget cost
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rarity {
    /// Tier 0, reserved for Crazy
    Special,
    Common,
    Uncommon,
    Rare,
    Epic,
    Mythical,
}

/// Field lifetime of a tier-0 item
pub const SPECIAL_ITEM_LIFETIME_MS: f64 = 900.0;

impl Rarity {
    /// Only the ordinary tiers 1..=5 can be named by number
    pub fn from_tier(tier: u8) -> Option<Self> {
        match tier {
            1 => Some(Rarity::Common),
            2 => Some(Rarity::Uncommon),
            3 => Some(Rarity::Rare),
            4 => Some(Rarity::Epic),
            5 => Some(Rarity::Mythical),
            _ => None,
        }
    }

    pub fn tier(self) -> u8 {
        match self {
            Rarity::Special => 0,
            Rarity::Common => 1,
            Rarity::Uncommon => 2,
            Rarity::Rare => 3,
            Rarity::Epic => 4,
            Rarity::Mythical => 5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Rarity::Special => "Special",
            Rarity::Common => "Common",
            Rarity::Uncommon => "Uncommon",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Mythical => "Mythical",
        }
    }

    /// Field budget cost; the special tier costs as much as a mythical
    pub fn cost(self) -> u32 {
        match self {
            Rarity::Special => 5,
            other => other.tier() as u32,
        }
    }

    pub fn spawn_multiplier(self) -> f64 {
        match self {
            Rarity::Special => 0.15,
            Rarity::Common => 1.2,
            Rarity::Uncommon => 0.75,
            Rarity::Rare => 0.4,
            Rarity::Epic => 0.18,
            Rarity::Mythical => 0.08,
        }
    }

    pub fn field_lifetime_ms(self) -> f64 {
        match self {
            Rarity::Special => SPECIAL_ITEM_LIFETIME_MS,
            Rarity::Common => 5000.0,
            Rarity::Uncommon => 4500.0,
            Rarity::Rare => 3500.0,
            Rarity::Epic => 2500.0,
            Rarity::Mythical => 2000.0,
        }
    }
}

/// One catalog row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub kind: PowerUpKind,
    pub rarity: Rarity,
    /// Fixed field lifetime that ignores the tier default
    pub lifetime_override: Option<f64>,
}

impl CatalogEntry {
    fn builtin(kind: PowerUpKind) -> Self {
        let lifetime_override = match kind {
            PowerUpKind::Crazy => Some(SPECIAL_ITEM_LIFETIME_MS),
            _ => None,
        };
        Self {
            kind,
            rarity: kind.default_rarity(),
            lifetime_override,
        }
    }

    pub fn lifetime_ms(&self) -> f64 {
        self.lifetime_override
            .unwrap_or_else(|| self.rarity.field_lifetime_ms())
    }
}

/// The full power-up table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    entries: [CatalogEntry; PowerUpKind::COUNT],
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            entries: PowerUpKind::ALL.map(CatalogEntry::builtin),
        }
    }
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in tiers with remote `key -> 1..=5` overrides applied
    ///
    /// Unknown keys and out-of-range tiers are ignored, leaving the built-in
    /// tier in force.
    pub fn with_rarity_overrides(mut self, overrides: &BTreeMap<String, u8>) -> Self {
        for (key, &tier) in overrides {
            let (Some(kind), Some(rarity)) = (PowerUpKind::from_key(key), Rarity::from_tier(tier))
            else {
                log::warn!("Ignoring rarity override {key}={tier}");
                continue;
            };
            self.entries[kind.index()].rarity = rarity;
        }
        self
    }

    pub fn entry(&self, kind: PowerUpKind) -> &CatalogEntry {
        &self.entries[kind.index()]
    }

    pub fn rarity(&self, kind: PowerUpKind) -> Rarity {
        self.entry(kind).rarity
    }

    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }
}

/// Whether the spawner may place `kind` on the field right now
pub fn can_spawn(kind: PowerUpKind, state: &GameState) -> bool {
    let active = state.effects.is_active(kind);
    match kind {
        PowerUpKind::Poison => true,
        PowerUpKind::Double | PowerUpKind::Wave => !state.treats.is_empty(),
        PowerUpKind::Swap => !state.sequence.is_swap(),
        PowerUpKind::Hook => !state.treats.is_empty() && !state.sequence.is_hook(),
        PowerUpKind::Crazy => state.level > 9 && !active,
        _ => !active,
    }
}

/// Structural precondition re-checked when an item is picked up
///
/// "Already active" is deliberately absent: collecting an active timed
/// effect re-arms it.
pub fn can_activate(kind: PowerUpKind, state: &GameState) -> bool {
    match kind {
        PowerUpKind::Double | PowerUpKind::Wave => state.treats.iter().any(|t| !t.collected),
        PowerUpKind::Hook => state.sequence.is_idle() && state.treats.iter().any(|t| !t.collected),
        PowerUpKind::Swap => state.sequence.is_idle(),
        PowerUpKind::Crazy => state.level > 9,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_round_trip_and_order() {
        for (i, kind) in PowerUpKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
            assert_eq!(PowerUpKind::from_key(kind.key()), Some(*kind));
        }
        assert_eq!(PowerUpKind::from_key("rainbow"), None);
    }

    #[test]
    fn test_tier_table() {
        assert_eq!(Rarity::Common.spawn_multiplier(), 1.2);
        assert_eq!(Rarity::Mythical.field_lifetime_ms(), 2000.0);
        assert_eq!(Rarity::Special.cost(), 5);
        assert_eq!(Rarity::Epic.cost(), 4);
        assert_eq!(Rarity::from_tier(0), None);
        assert_eq!(Rarity::from_tier(6), None);
    }

    #[test]
    fn test_harmful_items_keep_ordinary_tiers() {
        let catalog = Catalog::default();
        assert_eq!(catalog.rarity(PowerUpKind::Poison).cost(), 2);
        assert_eq!(catalog.rarity(PowerUpKind::Goop).cost(), 3);
    }

    #[test]
    fn test_crazy_lifetime_is_fixed() {
        let catalog = Catalog::default();
        assert_eq!(catalog.entry(PowerUpKind::Crazy).lifetime_ms(), 900.0);
        assert_eq!(catalog.entry(PowerUpKind::Ice).lifetime_ms(), 4500.0);
    }

    #[test]
    fn test_overrides_apply_only_valid_values() {
        let mut overrides = BTreeMap::new();
        overrides.insert("ice".to_string(), 5);
        overrides.insert("frenzy".to_string(), 0);
        overrides.insert("shield".to_string(), 9);
        overrides.insert("unknown".to_string(), 3);
        let catalog = Catalog::default().with_rarity_overrides(&overrides);

        assert_eq!(catalog.rarity(PowerUpKind::Ice), Rarity::Mythical);
        assert_eq!(catalog.rarity(PowerUpKind::Frenzy), Rarity::Common);
        assert_eq!(catalog.rarity(PowerUpKind::Shield), Rarity::Uncommon);
        // Ice's field lifetime follows its new tier
        assert_eq!(catalog.entry(PowerUpKind::Ice).lifetime_ms(), 2000.0);
    }

    #[test]
    fn test_spawn_eligibility() {
        let mut state = GameState::new(1);
        assert!(can_spawn(PowerUpKind::Ice, &state));
        assert!(!can_spawn(PowerUpKind::Crazy, &state));

        state.effects.activate_for(PowerUpKind::Ice, 0.0, 4000.0);
        assert!(!can_spawn(PowerUpKind::Ice, &state));
        // ... but a pickup still goes through and re-arms
        assert!(can_activate(PowerUpKind::Ice, &state));

        state.treats.clear();
        assert!(!can_spawn(PowerUpKind::Hook, &state));
        assert!(!can_spawn(PowerUpKind::Double, &state));
        assert!(!can_activate(PowerUpKind::Wave, &state));
        assert!(can_spawn(PowerUpKind::Poison, &state));

        state.level = 10;
        assert!(can_spawn(PowerUpKind::Crazy, &state));
    }
}
