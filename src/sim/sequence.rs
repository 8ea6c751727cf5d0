//! Frame-counted Swap and Hook sequences
//!
//! While a sequence runs the simulation is paused; the sequence itself keeps
//! stepping once per frame and hands back a resolution when it finishes.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Frames the field holds still before a swap starts flickering
pub const SWAP_PAUSE_FRAMES: u32 = 60;
pub const SWAP_FLICKER_FRAMES: u32 = 36;
/// Frames for the hook line to reach its target (progress +0.05/frame)
pub const HOOK_LINE_FRAMES: u32 = 20;
pub const HOOK_FLICKER_FRAMES: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapPhase {
    Pause,
    Flicker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HookPhase {
    Line,
    Flicker,
}

/// The running sequence, if any
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum Sequence {
    #[default]
    Idle,
    Swap {
        phase: SwapPhase,
        frames: u32,
        fish_from: Vec2,
        shark_from: Vec2,
    },
    Hook {
        phase: HookPhase,
        frames: u32,
        origin: Vec2,
        target: Vec2,
    },
}

/// What the caller must apply when a sequence completes
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    /// Fish goes to `fish_to`, shark to `shark_to`
    SwapPositions { fish_to: Vec2, shark_to: Vec2 },
    HookTeleport { target: Vec2 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SequenceStep {
    Continue,
    Resolve(Resolution),
}

impl Sequence {
    pub fn swap(fish: Vec2, shark: Vec2) -> Self {
        Sequence::Swap {
            phase: SwapPhase::Pause,
            frames: 0,
            fish_from: fish,
            shark_from: shark,
        }
    }

    pub fn hook(origin: Vec2, target: Vec2) -> Self {
        Sequence::Hook {
            phase: HookPhase::Line,
            frames: 0,
            origin,
            target,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Sequence::Idle)
    }

    pub fn is_running(&self) -> bool {
        !self.is_idle()
    }

    pub fn is_swap(&self) -> bool {
        matches!(self, Sequence::Swap { .. })
    }

    pub fn is_hook(&self) -> bool {
        matches!(self, Sequence::Hook { .. })
    }

    pub fn swap_phase(&self) -> Option<SwapPhase> {
        match self {
            Sequence::Swap { phase, .. } => Some(*phase),
            _ => None,
        }
    }

    /// 0..=1 extension of the hook line; 1 once flickering
    pub fn hook_line_progress(&self) -> Option<f32> {
        match self {
            Sequence::Hook {
                phase: HookPhase::Line,
                frames,
                ..
            } => Some((*frames as f32 / HOOK_LINE_FRAMES as f32).min(1.0)),
            Sequence::Hook { .. } => Some(1.0),
            _ => None,
        }
    }

    /// Whether the swapped/hooked entities should be drawn this frame
    pub fn flicker_visible(&self) -> bool {
        match self {
            Sequence::Swap {
                phase: SwapPhase::Flicker,
                frames,
                ..
            }
            | Sequence::Hook {
                phase: HookPhase::Flicker,
                frames,
                ..
            } => (frames / 3) % 2 == 0,
            _ => true,
        }
    }

    /// Step one frame; returns to `Idle` on resolution
    pub fn advance(&mut self) -> SequenceStep {
        let resolution = match self {
            Sequence::Idle => return SequenceStep::Continue,
            Sequence::Swap {
                phase,
                frames,
                fish_from,
                shark_from,
            } => {
                *frames += 1;
                match *phase {
                    SwapPhase::Pause => {
                        if *frames >= SWAP_PAUSE_FRAMES {
                            *phase = SwapPhase::Flicker;
                            *frames = 0;
                        }
                        None
                    }
                    SwapPhase::Flicker if *frames >= SWAP_FLICKER_FRAMES => {
                        Some(Resolution::SwapPositions {
                            fish_to: *shark_from,
                            shark_to: *fish_from,
                        })
                    }
                    SwapPhase::Flicker => None,
                }
            }
            Sequence::Hook {
                phase,
                frames,
                target,
                ..
            } => {
                *frames += 1;
                match *phase {
                    HookPhase::Line => {
                        if *frames >= HOOK_LINE_FRAMES {
                            *phase = HookPhase::Flicker;
                            *frames = 0;
                        }
                        None
                    }
                    HookPhase::Flicker if *frames >= HOOK_FLICKER_FRAMES => {
                        Some(Resolution::HookTeleport { target: *target })
                    }
                    HookPhase::Flicker => None,
                }
            }
        };

        match resolution {
            Some(r) => {
                *self = Sequence::Idle;
                SequenceStep::Resolve(r)
            }
            None => SequenceStep::Continue,
        }
    }
}
