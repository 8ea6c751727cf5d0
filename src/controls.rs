//! Keyboard bindings
//!
//! Maps `KeyboardEvent.key` values to game commands. Kept free of DOM types so
//! the browser handlers stay thin.

use crate::sim::InputIntent;

/// Command bound to a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Arrow keys and WASD; held state goes through `set_direction`
    Steer,
    TogglePause,
    /// Next level after a win, submit initials after a loss
    Confirm,
    ToggleAutopilot,
    ToggleMysteryBlocks,
    ToggleParticles,
}

/// Action for a keydown, or None if the key is unbound
///
/// While a text field has focus only Enter is handled, so initials can be
/// typed with any letter.
pub fn key_action(key: &str, typing: bool) -> Option<KeyAction> {
    if typing {
        return (key == "Enter").then_some(KeyAction::Confirm);
    }
    match key {
        "ArrowUp" | "ArrowDown" | "ArrowLeft" | "ArrowRight" | "w" | "W" | "a" | "A" | "s"
        | "S" | "d" | "D" => Some(KeyAction::Steer),
        "Escape" => Some(KeyAction::TogglePause),
        "Enter" => Some(KeyAction::Confirm),
        "i" | "I" => Some(KeyAction::ToggleAutopilot),
        "m" | "M" => Some(KeyAction::ToggleMysteryBlocks),
        "p" | "P" => Some(KeyAction::ToggleParticles),
        _ => None,
    }
}

/// Update held directions; returns whether `key` was a direction
pub fn set_direction(intent: &mut InputIntent, key: &str, held: bool) -> bool {
    match key {
        "ArrowUp" | "w" | "W" => intent.up = held,
        "ArrowDown" | "s" | "S" => intent.down = held,
        "ArrowLeft" | "a" | "A" => intent.left = held,
        "ArrowRight" | "d" | "D" => intent.right = held,
        _ => return false,
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bindings_while_playing() {
        assert_eq!(key_action("a", false), Some(KeyAction::Steer));
        assert_eq!(key_action("ArrowUp", false), Some(KeyAction::Steer));
        assert_eq!(key_action("Escape", false), Some(KeyAction::TogglePause));
        assert_eq!(key_action("I", false), Some(KeyAction::ToggleAutopilot));
        assert_eq!(key_action("x", false), None);
    }

    #[test]
    fn test_text_field_only_takes_enter() {
        for key in ["w", "A", "s", "d", "i", "m", "p", "Escape", "ArrowLeft"] {
            assert_eq!(key_action(key, true), None, "{key}");
        }
        assert_eq!(key_action("Enter", true), Some(KeyAction::Confirm));
    }

    #[test]
    fn test_direction_press_and_release() {
        let mut intent = InputIntent::default();
        assert!(set_direction(&mut intent, "W", true));
        assert!(set_direction(&mut intent, "ArrowRight", true));
        assert!(intent.up && intent.right);
        assert!(set_direction(&mut intent, "w", false));
        assert!(!intent.up);
        assert!(!set_direction(&mut intent, "q", true));
    }
}
