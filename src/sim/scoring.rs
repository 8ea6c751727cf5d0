//! Treat collection, combo multiplier and streak feedback

use serde::{Deserialize, Serialize};

use super::catalog::PowerUpKind;
use super::state::{GameEvent, GameState};
use crate::consts::*;

/// Consecutive-collection counter
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Combo {
    pub count: u32,
    /// Level-clock time of the previous collection
    pub last_at: Option<f64>,
}

impl Combo {
    /// Record a collection at `now` and return the multiplier it earns
    pub fn register(&mut self, now: f64) -> u32 {
        match self.last_at {
            Some(last) if now - last < COMBO_WINDOW_MS => self.count += 1,
            _ => self.count = 1,
        }
        self.last_at = Some(now);
        self.multiplier()
    }

    pub fn multiplier(&self) -> u32 {
        self.count.min(MAX_COMBO_MULTIPLIER)
    }

    /// Drop the streak once the window has lapsed
    pub fn decay(&mut self, now: f64) {
        if self.count == 0 {
            return;
        }
        if let Some(last) = self.last_at
            && now - last > COMBO_WINDOW_MS
        {
            self.count = 0;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Points for one treat at the given multiplier
pub fn treat_points(frenzy: bool, multiplier: u32) -> u64 {
    let base = if frenzy { FRENZY_TREAT_POINTS } else { TREAT_POINTS };
    base * multiplier as u64
}

/// Popup text for a streak multiplier, if it earns one
pub fn streak_message(multiplier: u32) -> Option<&'static str> {
    match multiplier {
        2 => Some("NICE!"),
        3 => Some("GREAT!"),
        4 => Some("UNSTOPPABLE!"),
        m if m >= 5 => Some("GODLIKE!"),
        _ => None,
    }
}

/// Consume the treat at `idx` and score it
///
/// Returns the points awarded, or `None` if the treat was already taken.
pub fn collect_treat(state: &mut GameState, idx: usize) -> Option<u64> {
    let pos = {
        let treat = state.treats.get_mut(idx)?;
        if treat.collected {
            return None;
        }
        treat.collected = true;
        treat.pos
    };

    let now = state.clock.now();
    let multiplier = state.combo.register(now);
    let points = treat_points(state.effects.is_active(PowerUpKind::Frenzy), multiplier);
    state.score += points;

    state.push_event(GameEvent::TreatCollected {
        pos,
        points,
        multiplier,
    });
    if multiplier >= 2 {
        state.push_event(GameEvent::Streak { pos, multiplier });
    }

    if !state.high_score_notified
        && state.global_high_score > 0
        && state.score > state.global_high_score
    {
        state.high_score_notified = true;
        state.push_event(GameEvent::NewHighScore { score: state.score });
        log::info!("New high score: {}", state.score);
    }

    state.spawn_particles(pos, 0xffdd44, 8);
    Some(points)
}
