//! Fish Frenzy - a fish-versus-shark arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, power-ups, scoring, level flow)
//! - `backend`: Leaderboard/config service contract and graceful degradation
//! - `settings`: Player preferences
//! - `controls`: Keyboard bindings

pub mod backend;
pub mod controls;
pub mod settings;
pub mod sim;

pub use backend::{Backend, BootConfig, PlayerName, ScoreService};
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation step (one animation frame at 60 Hz), in milliseconds
    pub const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Maximum frames simulated per animation callback
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Playfield dimensions
    pub const FIELD_WIDTH: f32 = 720.0;
    pub const FIELD_HEIGHT: f32 = 480.0;

    /// Fish movement
    pub const FISH_WIDTH: f32 = 36.0;
    pub const FISH_HEIGHT: f32 = 22.0;
    pub const FISH_BASE_SPEED: f32 = 2.5;
    pub const FISH_FRICTION: f32 = 0.88;
    /// Speed bonus gained per frame of sustained input
    pub const FISH_ACCEL_RATE: f32 = 0.003;
    pub const FISH_MAX_SPEED_BONUS: f32 = 0.8;
    pub const FRENZY_SPEED_BOOST: f32 = 1.2;

    /// Shark
    pub const SHARK_START_DELAY: u32 = 90;
    pub const SHARK_EDGE_MARGIN: f32 = 20.0;
    /// Minimum spawn distance from the fish at level start
    pub const SHARK_SPAWN_CLEARANCE: f32 = 150.0;
    pub const SHARK_TURN_RATE: f32 = 0.15;
    /// Distance the shark is thrown by Shield or Star
    pub const SHARK_KNOCKBACK: f32 = 80.0;

    /// Contact radii (centre to centre)
    pub const SHARK_CONTACT_RADIUS: f32 = 30.0;
    pub const TREAT_PICKUP_RADIUS: f32 = 24.0;
    pub const POWERUP_PICKUP_RADIUS: f32 = 26.0;
    pub const DECOY_EATEN_RADIUS: f32 = 25.0;

    /// Treats
    pub const TREAT_RADIUS: f32 = 14.0;
    pub const TREAT_EDGE_MARGIN: f32 = 30.0;

    /// Scoring
    pub const COMBO_WINDOW_MS: f64 = 1200.0;
    pub const MAX_COMBO_MULTIPLIER: u32 = 5;
    pub const TREAT_POINTS: u64 = 10;
    pub const FRENZY_TREAT_POINTS: u64 = 20;

    /// Power-up field
    pub const MAX_FIELD_ITEMS: usize = 3;
    pub const PW_SPAWN_CHANCE: f64 = 0.007;
    pub const POWERUP_RADIUS: f32 = 16.0;
    pub const MAX_FIELD_BUDGET: u32 = 15;

    /// Level timer
    pub const MIN_LEVEL_SECONDS: i32 = 18;
    pub const LEVEL_SECONDS_BASE: i32 = 35;
}

/// Field centre point
#[inline]
pub fn field_center() -> Vec2 {
    Vec2::new(consts::FIELD_WIDTH / 2.0, consts::FIELD_HEIGHT / 2.0)
}

/// Clamp a position so it stays `margin` units inside the field edges
#[inline]
pub fn clamp_to_field(pos: Vec2, margin: f32) -> Vec2 {
    clamp_to_box(pos, Vec2::splat(margin))
}

/// Clamp a position inside the field with separate horizontal/vertical margins
#[inline]
pub fn clamp_to_box(pos: Vec2, margin: Vec2) -> Vec2 {
    Vec2::new(
        pos.x.clamp(margin.x, consts::FIELD_WIDTH - margin.x),
        pos.y.clamp(margin.y, consts::FIELD_HEIGHT - margin.y),
    )
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Signed difference `to - from` along the shortest arc
#[inline]
pub fn shortest_angle_delta(from: f32, to: f32) -> f32 {
    normalize_angle(to - from)
}

/// Direction of `to` as seen from `from`, in radians
#[inline]
pub fn bearing(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}
