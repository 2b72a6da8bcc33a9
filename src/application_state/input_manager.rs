//! # Input Manager
//!
//! This module stages input between ticks:
//! - Keyboard keys that are currently held
//! - Mouse button presses, queued until the next tick
//! - Pointer motion, accumulated until the next tick
//!
//! Window and device events only record what happened. The engine consumes the
//! staged state once per tick through `get_and_reset_processed_input`.

use std::collections::{HashMap, HashSet};

use winit::{
    event::{ElementState, KeyEvent, MouseButton, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use super::input_state::{ProcessedInputState, RawInputState};

/// Keys the sandbox reacts to. Everything else is ignored.
const KEY_CODES: [KeyCode; 10] = [
    KeyCode::KeyW,
    KeyCode::KeyS,
    KeyCode::KeyA,
    KeyCode::KeyD,
    KeyCode::ArrowUp,
    KeyCode::ArrowDown,
    KeyCode::ArrowLeft,
    KeyCode::ArrowRight,
    KeyCode::Space,
    KeyCode::ShiftLeft,
];

/// Manages the state of all input devices and processes input events.
#[derive(Debug, Default)]
pub struct InputManager {
    /// Keys held at the previous tick
    keys_old: HashSet<KeyCode>,
    /// Keys held right now
    keys_new: HashSet<KeyCode>,
    /// Mouse button presses not yet consumed
    pending_clicks: Vec<MouseButton>,
    /// Pointer motion not yet consumed
    mouse_delta: Option<(f64, f64)>,
}

impl InputManager {
    /// Creates a new InputManager with nothing held.
    pub fn new() -> Self {
        Self::default()
    }

    /// Processes a window event and updates internal input state.
    ///
    /// # Arguments
    /// * `event` - The window event to process
    pub fn intake_input(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state,
                        physical_key: PhysicalKey::Code(key),
                        ..
                    },
                ..
            } => match state {
                ElementState::Pressed => self.press_key(*key),
                ElementState::Released => self.release_key(*key),
            },
            WindowEvent::MouseInput {
                button,
                state: ElementState::Pressed,
                ..
            } => self.press_mouse_button(*button),
            _ => {}
        }
    }

    /// Marks `key` as held, if it is one the sandbox tracks.
    pub fn press_key(&mut self, key: KeyCode) {
        if KEY_CODES.contains(&key) {
            self.keys_new.insert(key);
        }
    }

    /// Marks `key` as released.
    pub fn release_key(&mut self, key: KeyCode) {
        self.keys_new.remove(&key);
    }

    /// Queues a mouse button press for the next tick.
    pub fn press_mouse_button(&mut self, button: MouseButton) {
        self.pending_clicks.push(button);
    }

    /// Adds pointer motion to the delta accumulated since the last tick.
    ///
    /// # Arguments
    /// * `delta` - The (x, y) delta of mouse movement since the last event
    pub fn intake_mouse_motion(&mut self, delta: (f64, f64)) {
        let (x, y) = self.mouse_delta.unwrap_or((0.0, 0.0));
        self.mouse_delta = Some((x + delta.0, y + delta.1));
    }

    /// Builds a snapshot of the staged input with key transitions resolved.
    pub fn create_processed_input_state(&self) -> ProcessedInputState {
        let keyboard_states: HashMap<KeyCode, RawInputState> = self
            .keys_old
            .union(&self.keys_new)
            .map(|key| {
                let state = RawInputState::from_raw_states(
                    self.keys_old.contains(key),
                    self.keys_new.contains(key),
                );
                (*key, state)
            })
            .collect();

        ProcessedInputState {
            keyboard_states,
            mouse_clicks: self.pending_clicks.clone(),
            mouse_delta: self.mouse_delta,
        }
    }

    /// Returns the processed input state and starts staging the next tick.
    ///
    /// Held keys stay held; queued clicks and pointer motion are consumed.
    pub fn get_and_reset_processed_input(&mut self) -> ProcessedInputState {
        let processed_input = self.create_processed_input_state();
        self.keys_old = self.keys_new.clone();
        self.pending_clicks.clear();
        self.mouse_delta = None;
        processed_input
    }

    /// Clears every held key, queued click and pending motion.
    ///
    /// This is called when the window loses focus or the pointer lock is
    /// released, to prevent stuck keys.
    pub fn reset_inputs(&mut self) {
        self.keys_old.clear();
        self.keys_new.clear();
        self.pending_clicks.clear();
        self.mouse_delta = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_transitions_span_ticks() {
        let mut input = InputManager::new();
        input.press_key(KeyCode::KeyW);

        let first = input.get_and_reset_processed_input();
        assert_eq!(first.get_key_state(KeyCode::KeyW), RawInputState::Pressed);

        let second = input.get_and_reset_processed_input();
        assert_eq!(second.get_key_state(KeyCode::KeyW), RawInputState::Held);

        input.release_key(KeyCode::KeyW);
        let third = input.get_and_reset_processed_input();
        assert_eq!(third.get_key_state(KeyCode::KeyW), RawInputState::Released);

        let fourth = input.get_and_reset_processed_input();
        assert_eq!(fourth.get_key_state(KeyCode::KeyW), RawInputState::NotPressed);
    }

    #[test]
    fn untracked_keys_are_ignored() {
        let mut input = InputManager::new();
        input.press_key(KeyCode::KeyQ);
        input.press_key(KeyCode::Escape);
        assert!(input.get_and_reset_processed_input().keyboard_states.is_empty());
    }

    #[test]
    fn clicks_are_queued_once() {
        let mut input = InputManager::new();
        input.press_mouse_button(MouseButton::Left);
        input.press_mouse_button(MouseButton::Right);

        let snapshot = input.get_and_reset_processed_input();
        assert_eq!(snapshot.get_mouse_clicks(), &[MouseButton::Left, MouseButton::Right]);
        assert!(input.get_and_reset_processed_input().get_mouse_clicks().is_empty());
    }

    #[test]
    fn mouse_motion_accumulates_until_consumed() {
        let mut input = InputManager::new();
        input.intake_mouse_motion((3.0, -1.0));
        input.intake_mouse_motion((2.0, 4.0));

        assert_eq!(input.get_and_reset_processed_input().get_mouse_delta(), Some((5.0, 3.0)));
        assert_eq!(input.get_and_reset_processed_input().get_mouse_delta(), None);
    }

    #[test]
    fn reset_clears_everything() {
        let mut input = InputManager::new();
        input.press_key(KeyCode::KeyD);
        input.press_key(KeyCode::Space);
        input.press_mouse_button(MouseButton::Left);
        input.intake_mouse_motion((1.0, 1.0));

        input.reset_inputs();

        let snapshot = input.get_and_reset_processed_input();
        assert!(!snapshot.any_active(&[KeyCode::KeyD, KeyCode::Space]));
        assert!(snapshot.get_mouse_clicks().is_empty());
        assert_eq!(snapshot.get_mouse_delta(), None);
    }
}
