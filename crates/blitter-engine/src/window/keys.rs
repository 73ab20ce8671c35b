use std::collections::HashSet;

use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Physical keys currently held, plus the ones pressed since the last frame.
#[derive(Debug, Default, Clone)]
pub struct KeyboardState {
    held: HashSet<KeyCode>,
    pressed: HashSet<KeyCode>,
}

impl KeyboardState {
    pub fn is_held(&self, key: KeyCode) -> bool {
        self.held.contains(&key)
    }

    /// Went down since the last [`end_frame`](Self::end_frame). Auto-repeat
    /// does not count.
    pub fn was_pressed(&self, key: KeyCode) -> bool {
        self.pressed.contains(&key)
    }

    pub fn apply(&mut self, event: &KeyEvent) {
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };
        self.set(code, event.state, event.repeat);
    }

    fn set(&mut self, code: KeyCode, state: ElementState, repeat: bool) {
        match state {
            ElementState::Pressed => {
                if self.held.insert(code) && !repeat {
                    self.pressed.insert(code);
                }
            }
            ElementState::Released => {
                self.held.remove(&code);
            }
        }
    }

    /// Clears per-frame edges.
    pub fn end_frame(&mut self) {
        self.pressed.clear();
    }

    /// Forgets everything, e.g. when focus is lost and releases will not arrive.
    pub fn reset(&mut self) {
        self.held.clear();
        self.pressed.clear();
    }
}
