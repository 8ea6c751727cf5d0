//! Game state and core simulation types
//!
//! Everything one level of play needs lives in a single owned `GameState`.
//! Resetting it is how pending timers, effects and sequences are cancelled.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::catalog::{Catalog, PowerUpKind};
use super::effects::{ActiveEffects, EffectTimer, farthest_corner, recompute_speeds};
use super::entity::{Buddy, Decoy, Fish, MAX_PARTICLES, Particle, PowerUpItem, Shark, Treat, TreatKind};
use super::scoring::Combo;
use super::sequence::Sequence;
use super::spawner::FieldItems;
use super::timer::{Clock, Interval};
use crate::consts::*;

/// Why a level was lost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossReason {
    SharkContact,
    TimeUp,
    Poisoned,
    Overdose,
}

impl LossReason {
    pub fn message(self) -> &'static str {
        match self {
            LossReason::SharkContact => "The shark got you!",
            LossReason::TimeUp => "Time's up!",
            LossReason::Poisoned => "Poisoned!",
            LossReason::Overdose => "OVERDOSE!",
        }
    }
}

/// Current phase of a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    /// Every treat was collected
    Won,
    Lost(LossReason),
}

/// Feedback for the presentation layer, drained once per frame
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    TreatCollected { pos: Vec2, points: u64, multiplier: u32 },
    Streak { pos: Vec2, multiplier: u32 },
    NewHighScore { score: u64 },
    PowerUpSpawned { kind: PowerUpKind, pos: Vec2 },
    PowerUpCollected { kind: PowerUpKind, pos: Vec2 },
    PowerUpFizzled { kind: PowerUpKind, pos: Vec2 },
    PowerUpExpired { kind: PowerUpKind, pos: Vec2 },
    EffectEnded { kind: PowerUpKind },
    ShieldSaved { pos: Vec2 },
    StarBounce { pos: Vec2 },
    DecoyEaten { pos: Vec2 },
    Swapped,
    Hooked { pos: Vec2 },
    LevelEnded { phase: GamePhase },
}

/// Treats keep this far from the field edges
const TREAT_SPAWN_MARGIN: f32 = 30.0;
const TREAT_FISH_CLEARANCE: f32 = 60.0;
const TREAT_SPACING: f32 = 30.0;
const TREAT_PLACEMENT_ATTEMPTS: u32 = 30;
const SHARK_SPAWN_MARGIN: f32 = 60.0;
const SHARK_PLACEMENT_ATTEMPTS: u32 = 100;

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    /// Current level (1-based)
    pub level: u32,
    pub score: u64,
    /// Whole seconds left on the level countdown
    pub time_left: i32,
    pub max_time: i32,
    pub phase: GamePhase,
    /// Explicit pause or hidden tab
    pub user_paused: bool,
    pub clock: Clock,
    pub countdown: Interval,
    pub fish: Fish,
    pub shark: Shark,
    pub buddy: Option<Buddy>,
    pub decoy: Option<Decoy>,
    pub treats: Vec<Treat>,
    /// Visual particles (not gameplay-affecting)
    #[serde(skip)]
    pub particles: Vec<Particle>,
    pub particles_enabled: bool,
    pub field: FieldItems,
    pub effects: ActiveEffects,
    pub sequence: Sequence,
    pub combo: Combo,
    /// Kind of the previous spawn; never spawned twice in a row
    pub last_spawned: Option<PowerUpKind>,
    /// Best remote score fetched at game start (0 when unknown)
    pub global_high_score: u64,
    pub high_score_notified: bool,
    /// Frames simulated this level
    pub frame: u64,
    catalog: Catalog,
    #[serde(skip)]
    events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new game state with the given seed and built-in catalog
    pub fn new(seed: u64) -> Self {
        Self::with_catalog(seed, Catalog::default())
    }

    pub fn with_catalog(seed: u64, catalog: Catalog) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            level: 1,
            score: 0,
            time_left: LEVEL_SECONDS_BASE - 1,
            max_time: LEVEL_SECONDS_BASE - 1,
            phase: GamePhase::Playing,
            user_paused: false,
            clock: Clock::default(),
            countdown: Interval::new(0.0, 1000.0),
            fish: Fish::default(),
            shark: Shark::default(),
            buddy: None,
            decoy: None,
            treats: Vec::new(),
            particles: Vec::new(),
            particles_enabled: true,
            field: FieldItems::default(),
            effects: ActiveEffects::default(),
            sequence: Sequence::Idle,
            combo: Combo::default(),
            last_spawned: None,
            global_high_score: 0,
            high_score_notified: false,
            frame: 0,
            catalog,
            events: Vec::new(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Reset score and level and start level 1
    pub fn new_game(&mut self, global_high_score: u64) {
        self.level = 1;
        self.score = 0;
        self.global_high_score = global_high_score;
        self.high_score_notified = false;
        self.start_level();
    }

    /// Rebuild the field for the current level
    pub fn start_level(&mut self) {
        self.clock.reset();
        self.max_time = (LEVEL_SECONDS_BASE - self.level as i32).max(MIN_LEVEL_SECONDS);
        self.time_left = self.max_time;
        self.countdown = Interval::new(self.clock.now(), 1000.0);
        self.frame = 0;

        self.fish.reset_for_level();
        let shark_pos = self.pick_shark_spawn();
        self.shark.reset_for_level(self.level, shark_pos);

        self.treats.clear();
        self.particles.clear();
        self.field.clear();
        self.buddy = None;
        self.decoy = None;
        self.effects.reset_all();
        self.sequence = Sequence::Idle;
        self.combo.reset();
        self.last_spawned = None;
        self.user_paused = false;

        let treat_count = 5 + self.level * 2;
        for _ in 0..treat_count {
            self.spawn_treat();
        }

        recompute_speeds(self);
        self.phase = GamePhase::Playing;
        log::info!(
            "Level {} started: {} treats, {}s, shark speed {:.2}",
            self.level,
            self.treats.len(),
            self.max_time,
            self.shark.base_speed
        );
    }

    /// Advance to the next level after a win; returns false otherwise
    pub fn next_level(&mut self) -> bool {
        if self.phase != GamePhase::Won {
            return false;
        }
        self.level += 1;
        self.start_level();
        true
    }

    /// Leave `Playing` for a terminal phase, cancelling everything pending
    ///
    /// Only the first terminal transition of a level takes effect.
    pub fn end_level(&mut self, phase: GamePhase) {
        if !self.is_playing() || phase == GamePhase::Playing {
            return;
        }
        self.phase = phase;
        self.effects.reset_all();
        self.buddy = None;
        self.decoy = None;
        self.sequence = Sequence::Idle;
        self.shark.hidden = false;
        self.user_paused = false;
        recompute_speeds(self);

        match phase {
            GamePhase::Won => log::info!("Level {} cleared, score {}", self.level, self.score),
            GamePhase::Lost(reason) => {
                log::info!("Level {} lost: {}", self.level, reason.message())
            }
            GamePhase::Playing => {}
        }
        self.push_event(GameEvent::LevelEnded { phase });
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    /// Entity updates are suspended
    pub fn is_paused(&self) -> bool {
        self.user_paused || self.sequence.is_running()
    }

    /// The countdown does not decrement
    pub fn timer_frozen(&self) -> bool {
        self.is_paused() || self.effects.is_active(PowerUpKind::Hourglass)
    }

    pub fn set_user_paused(&mut self, paused: bool) {
        if !self.is_playing() || self.user_paused == paused {
            return;
        }
        self.user_paused = paused;
        log::info!("{}", if paused { "Paused" } else { "Resumed" });
    }

    pub fn toggle_user_pause(&mut self) {
        let paused = !self.user_paused;
        self.set_user_paused(paused);
    }

    /// Uncollected treats still on the field
    pub fn treats_left(&self) -> usize {
        self.treats.iter().filter(|t| !t.collected).count()
    }

    pub fn field_items(&self) -> impl Iterator<Item = &PowerUpItem> {
        self.field.iter()
    }

    pub fn effect_timers(&self) -> Vec<EffectTimer> {
        self.effects.timers(self.clock.now())
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Uniform sample in `[lo, hi)` from the run RNG
    pub fn rand_range(&mut self, lo: f32, hi: f32) -> f32 {
        if hi <= lo {
            return lo;
        }
        self.rng.random_range(lo..hi)
    }

    /// Whether `pos` is within `radius` of a field item or uncollected treat
    pub fn overlaps_existing(&self, pos: Vec2, radius: f32) -> bool {
        self.field.iter().any(|item| item.pos.distance(pos) < radius)
            || self
                .treats
                .iter()
                .any(|t| !t.collected && t.pos.distance(pos) < radius)
    }

    /// Add one treat away from the fish and other objects
    pub fn spawn_treat(&mut self) {
        let mut pos = self.random_treat_position();
        for _ in 0..TREAT_PLACEMENT_ATTEMPTS {
            if pos.distance(self.fish.pos) >= TREAT_FISH_CLEARANCE
                && !self.overlaps_existing(pos, TREAT_SPACING)
            {
                break;
            }
            pos = self.random_treat_position();
        }
        let kind = TreatKind::ALL[self.rng.random_range(0..TreatKind::ALL.len())];
        let bob = self.rand_range(0.0, std::f32::consts::TAU);
        self.treats.push(Treat::new(pos, kind, bob));
    }

    fn random_treat_position(&mut self) -> Vec2 {
        Vec2::new(
            self.rand_range(TREAT_SPAWN_MARGIN, FIELD_WIDTH - TREAT_SPAWN_MARGIN),
            self.rand_range(TREAT_SPAWN_MARGIN, FIELD_HEIGHT - TREAT_SPAWN_MARGIN),
        )
    }

    /// Random shark start at least `SHARK_SPAWN_CLEARANCE` from the fish
    fn pick_shark_spawn(&mut self) -> Vec2 {
        for _ in 0..SHARK_PLACEMENT_ATTEMPTS {
            let pos = Vec2::new(
                self.rand_range(SHARK_SPAWN_MARGIN, FIELD_WIDTH - SHARK_SPAWN_MARGIN),
                self.rand_range(SHARK_SPAWN_MARGIN, FIELD_HEIGHT - SHARK_SPAWN_MARGIN),
            );
            if pos.distance(self.fish.pos) >= SHARK_SPAWN_CLEARANCE {
                return pos;
            }
        }
        farthest_corner(self.fish.pos)
    }

    /// Burst of particles at `pos`
    ///
    /// Spread comes from a frame hash rather than the run RNG so that the
    /// particle setting never changes gameplay.
    pub fn spawn_particles(&mut self, pos: Vec2, color: u32, count: u32) {
        if !self.particles_enabled {
            return;
        }
        let seed = (self.frame as u32)
            .wrapping_mul(2654435761)
            .wrapping_add(self.particles.len() as u32 * 40503);
        for i in 0..count {
            if self.particles.len() >= MAX_PARTICLES {
                // Remove oldest particles to make room
                self.particles.remove(0);
            }
            let hash = seed.wrapping_add(i.wrapping_mul(7919)).wrapping_mul(2246822519);
            let unit = |shift: u32| ((hash >> shift) & 0xff) as f32 / 255.0;
            self.particles.push(Particle {
                pos,
                vel: Vec2::new(unit(0) * 4.0 - 2.0, unit(8) * 4.0 - 2.0),
                color,
                life: 1.0,
                decay: 0.02 + unit(16) * 0.03,
                size: 2.0 + unit(24) * 3.0,
            });
        }
    }

    pub fn update_particles(&mut self) {
        for p in &mut self.particles {
            p.update();
        }
        self.particles.retain(|p| p.life > 0.0);
    }
}
