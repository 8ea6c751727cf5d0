//! Entity records: fish, shark, helpers, treats, field items, particles
//!
//! Plain mutable data plus the per-entity motion rules. Cross-entity rules
//! (contact, pickups, effects) live in `tick`, `scoring` and `effects`.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::catalog::PowerUpKind;
use super::timer::Cooldown;
use crate::consts::*;
use crate::{bearing, clamp_to_box, clamp_to_field, field_center, shortest_angle_delta};

/// The player's fish
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fish {
    pub pos: Vec2,
    pub vel: Vec2,
    pub half_extents: Vec2,
    /// Facing: 1 = right, -1 = left
    pub dir: f32,
    /// Rendered pitch (radians), smoothed
    pub angle: f32,
    pub tail_phase: f32,
    /// Current top speed from active effects (without the hold bonus)
    pub speed: f32,
    pub friction: f32,
    /// Bonus built up by holding one direction
    pub accel_bonus: f32,
    pub last_move: IVec2,
}

impl Default for Fish {
    fn default() -> Self {
        Self {
            pos: field_center(),
            vel: Vec2::ZERO,
            half_extents: Vec2::new(FISH_WIDTH / 2.0, FISH_HEIGHT / 2.0),
            dir: 1.0,
            angle: 0.0,
            tail_phase: 0.0,
            speed: FISH_BASE_SPEED,
            friction: FISH_FRICTION,
            accel_bonus: 0.0,
            last_move: IVec2::ZERO,
        }
    }
}

impl Fish {
    /// Put the fish back at the field centre for a new level
    pub fn reset_for_level(&mut self) {
        *self = Self::default();
    }

    /// Apply one frame of directional intent (`mv` components are -1, 0 or 1)
    pub fn steer(&mut self, mv: IVec2) {
        if mv != IVec2::ZERO {
            if mv == self.last_move {
                self.accel_bonus = (self.accel_bonus + FISH_ACCEL_RATE).min(FISH_MAX_SPEED_BONUS);
            } else {
                self.accel_bonus *= 0.5;
            }
            self.last_move = mv;
        } else {
            self.accel_bonus *= 0.95;
            self.last_move = IVec2::ZERO;
        }

        let thrust = (self.speed + self.accel_bonus) * 0.3;
        if mv.x != 0 {
            self.vel.x += mv.x as f32 * thrust;
            self.dir = mv.x.signum() as f32;
        }
        if mv.y != 0 {
            self.vel.y += mv.y as f32 * thrust;
        }

        self.vel *= self.friction;
        self.pos = clamp_to_box(self.pos + self.vel, self.half_extents);

        if self.vel.length() > 0.5 {
            let target = self.vel.y.atan2(self.vel.x * self.dir).clamp(-1.4, 1.4);
            self.angle += (target - self.angle) * 0.12;
        } else {
            self.angle += (0.0 - self.angle) * 0.1;
        }

        if self.vel.x > 0.3 {
            self.dir = 1.0;
        } else if self.vel.x < -0.3 {
            self.dir = -1.0;
        }

        self.tail_phase += 0.15;
    }
}

/// The pursuing shark
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shark {
    pub pos: Vec2,
    /// Level-correct speed with no modifiers applied
    pub base_speed: f32,
    /// Speed after Ice/Hourglass modifiers
    pub speed: f32,
    /// Rendered heading, eased toward the chase bearing
    pub angle: f32,
    pub tail_phase: f32,
    pub chase_timer: f32,
    /// Ghost: hidden sharks neither move nor bite
    pub hidden: bool,
    /// Frames left before the shark starts chasing
    pub start_delay: u32,
}

impl Default for Shark {
    fn default() -> Self {
        Self {
            pos: Vec2::new(60.0, 60.0),
            base_speed: Self::speed_for_level(1),
            speed: Self::speed_for_level(1),
            angle: 0.0,
            tail_phase: 0.0,
            chase_timer: 0.0,
            hidden: false,
            start_delay: SHARK_START_DELAY,
        }
    }
}

impl Shark {
    pub fn speed_for_level(level: u32) -> f32 {
        0.75 + level as f32 * 0.2
    }

    pub fn reset_for_level(&mut self, level: u32, pos: Vec2) {
        let base = Self::speed_for_level(level);
        *self = Self {
            pos,
            base_speed: base,
            speed: base,
            ..Self::default()
        };
    }

    /// One frame of pursuit toward `target`
    ///
    /// Movement follows the bearing plus a sinusoidal wobble; the rendered
    /// heading eases toward the plain bearing.
    pub fn chase(&mut self, target: Vec2) {
        self.chase_timer += 0.02;
        let a = bearing(self.pos, target);
        let wobble = (self.chase_timer * 3.0).sin() * 0.4;
        self.pos += Vec2::new((a + wobble).cos(), (a + wobble).sin()) * self.speed;
        self.angle += shortest_angle_delta(self.angle, a) * SHARK_TURN_RATE;
        self.tail_phase += 0.12;
        self.pos = clamp_to_field(self.pos, SHARK_EDGE_MARGIN);
    }

    /// Throw the shark `SHARK_KNOCKBACK` units away from `from`
    pub fn knock_back_from(&mut self, from: Vec2) {
        let a = bearing(from, self.pos);
        self.pos += Vec2::new(a.cos(), a.sin()) * SHARK_KNOCKBACK;
        self.pos = clamp_to_field(self.pos, SHARK_EDGE_MARGIN);
    }
}

/// Helper fish mirroring the player through the field centre
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Buddy {
    pub pos: Vec2,
    pub dir: f32,
    pub tail_phase: f32,
}

impl Buddy {
    /// Point reflection of `p` through the field centre
    pub fn mirror_of(p: Vec2) -> Vec2 {
        Vec2::new(FIELD_WIDTH - p.x, FIELD_HEIGHT - p.y)
    }

    pub fn follow(&mut self, fish_pos: Vec2) {
        let target = Self::mirror_of(fish_pos);
        self.pos += (target - self.pos) * 0.1;
        self.pos = clamp_to_field(self.pos, 20.0);
        self.dir = if self.pos.x > FIELD_WIDTH / 2.0 { -1.0 } else { 1.0 };
        self.tail_phase += 0.2;
    }
}

/// Fake fish the shark prefers to chase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decoy {
    pub pos: Vec2,
    pub dir: f32,
    pub tail_phase: f32,
}

/// Treat artwork variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreatKind {
    Worm,
    Shrimp,
    Crab,
    Minnow,
    Tempura,
    Sushi,
    Burger,
    Pizza,
    Fries,
    Watermelon,
}

impl TreatKind {
    pub const ALL: [TreatKind; 10] = [
        TreatKind::Worm,
        TreatKind::Shrimp,
        TreatKind::Crab,
        TreatKind::Minnow,
        TreatKind::Tempura,
        TreatKind::Sushi,
        TreatKind::Burger,
        TreatKind::Pizza,
        TreatKind::Fries,
        TreatKind::Watermelon,
    ];
}

/// A collectible treat
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Treat {
    pub pos: Vec2,
    pub radius: f32,
    pub kind: TreatKind,
    pub bob_phase: f32,
    /// Tombstone; filtered out at the end of the treat pass
    pub collected: bool,
}

impl Treat {
    pub fn new(pos: Vec2, kind: TreatKind, bob_phase: f32) -> Self {
        Self {
            pos,
            radius: TREAT_RADIUS,
            kind,
            bob_phase,
            collected: false,
        }
    }
}

/// A power-up waiting on the field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUpItem {
    pub kind: PowerUpKind,
    pub pos: Vec2,
    pub radius: f32,
    pub bob_phase: f32,
    pub life: Cooldown,
}

impl PowerUpItem {
    pub fn is_expired(&self, now: f64) -> bool {
        self.life.is_expired(now)
    }

    /// Warning blink during the final 30% of the item's life
    pub fn is_blinking(&self, now: f64) -> bool {
        self.life.elapsed(now) > self.life.duration_ms * 0.7
    }
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: u32, // 0xRRGGBB
    pub life: f32,  // 0-1, decreases each frame
    pub decay: f32,
    pub size: f32,
}

impl Particle {
    pub fn update(&mut self) {
        self.pos += self.vel;
        self.life -= self.decay;
        self.vel.y -= 0.01;
    }
}

/// Maximum particles
pub const MAX_PARTICLES: usize = 512;
