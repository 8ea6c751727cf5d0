//! Millisecond timing primitives on the level clock
//!
//! Nothing here schedules callbacks. Every deferred action in the game is an
//! expiry timestamp that the frame loop polls, so resetting the owning state
//! is all it takes to cancel it.

use serde::{Deserialize, Serialize};

/// Monotonic level clock, advanced by the fixed frame step
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Clock {
    now_ms: f64,
}

impl Clock {
    pub fn now(&self) -> f64 {
        self.now_ms
    }

    pub fn advance(&mut self, dt_ms: f64) {
        self.now_ms += dt_ms.max(0.0);
    }

    pub fn reset(&mut self) {
        self.now_ms = 0.0;
    }
}

/// A fixed-length countdown started at a point on the level clock
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cooldown {
    pub started_at: f64,
    pub duration_ms: f64,
}

impl Cooldown {
    pub fn start(now: f64, duration_ms: f64) -> Self {
        Self {
            started_at: now,
            duration_ms,
        }
    }

    pub fn expires_at(&self) -> f64 {
        self.started_at + self.duration_ms
    }

    pub fn elapsed(&self, now: f64) -> f64 {
        (now - self.started_at).max(0.0)
    }

    pub fn remaining(&self, now: f64) -> f64 {
        (self.expires_at() - now).max(0.0)
    }

    /// Expired strictly after the full duration has passed
    pub fn is_expired(&self, now: f64) -> bool {
        now - self.started_at > self.duration_ms
    }

    /// Remaining time as a 0..=1 fraction (for HUD bars)
    pub fn fraction_remaining(&self, now: f64) -> f32 {
        if self.duration_ms <= 0.0 {
            return 0.0;
        }
        (self.remaining(now) / self.duration_ms).clamp(0.0, 1.0) as f32
    }
}

/// Slack for accumulated frame-step rounding (60 x 16.67 ms lands just short of 1000)
const TIME_EPSILON_MS: f64 = 1e-6;

/// Repeating interval (the 1 Hz level countdown)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub period_ms: f64,
    next_at: f64,
}

impl Interval {
    pub fn new(now: f64, period_ms: f64) -> Self {
        Self {
            period_ms,
            next_at: now + period_ms,
        }
    }

    /// Number of periods that elapsed up to `now`; consumes them
    pub fn poll(&mut self, now: f64) -> u32 {
        if self.period_ms <= 0.0 {
            return 0;
        }
        let mut fired = 0;
        while now + TIME_EPSILON_MS >= self.next_at {
            self.next_at += self.period_ms;
            fired += 1;
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cooldown_remaining_and_expiry() {
        let cd = Cooldown::start(1000.0, 4000.0);
        assert_eq!(cd.remaining(3000.0), 2000.0);
        assert!(!cd.is_expired(5000.0));
        assert!(cd.is_expired(5000.1));
        assert_eq!(cd.remaining(9000.0), 0.0);
        assert!((cd.fraction_remaining(2000.0) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_interval_catches_up() {
        let mut iv = Interval::new(0.0, 1000.0);
        assert_eq!(iv.poll(999.0), 0);
        assert_eq!(iv.poll(1000.0), 1);
        assert_eq!(iv.poll(3500.0), 2);
        assert_eq!(iv.poll(3600.0), 0);
    }

    #[test]
    fn test_interval_tolerates_frame_rounding() {
        let mut iv = Interval::new(0.0, 1000.0);
        let mut now = 0.0;
        let mut fired = 0;
        for _ in 0..60 {
            now += 1000.0 / 60.0;
            fired += iv.poll(now);
        }
        assert_eq!(fired, 1);
    }

    #[test]
    fn test_clock_ignores_negative_steps() {
        let mut clock = Clock::default();
        clock.advance(16.0);
        clock.advance(-5.0);
        assert_eq!(clock.now(), 16.0);
        clock.reset();
        assert_eq!(clock.now(), 0.0);
    }
}
