use std::collections::HashSet;

use crate::coords::Vec2;

use super::frame::InputFrame;
use super::types::{ButtonState, InputEvent, Key, Modifiers, MouseButton};

/// What is held right now, and where the pointer is.
#[derive(Debug, Default)]
pub struct InputState {
    pub modifiers: Modifiers,
    pub focused: bool,
    /// Logical px; `None` while the pointer is outside the window.
    pub pointer_pos: Option<Vec2>,
    pub keys_down: HashSet<Key>,
    pub buttons_down: HashSet<MouseButton>,
}

impl InputState {
    /// Folds `ev` into the held state and records it, with its transitions, in `frame`.
    pub fn apply_event(&mut self, frame: &mut InputFrame, ev: InputEvent) {
        match ev {
            InputEvent::ModifiersChanged(m) => self.modifiers = m,

            InputEvent::Focused(focused) => {
                self.focused = focused;
                if !focused {
                    // Releases never arrive for an unfocused window; end any drag now.
                    self.keys_down.clear();
                    frame.buttons_released.extend(self.buttons_down.drain());
                }
            }

            InputEvent::PointerMoved { x, y } => self.pointer_pos = Some(Vec2::new(x, y)),
            InputEvent::PointerLeft => self.pointer_pos = None,

            InputEvent::Key { key, state, .. } => match state {
                ButtonState::Pressed => {
                    if self.keys_down.insert(key) {
                        frame.keys_pressed.insert(key);
                    }
                }
                ButtonState::Released => {
                    self.keys_down.remove(&key);
                }
            },

            InputEvent::PointerButton { button, state, x, y } => {
                self.pointer_pos = Some(Vec2::new(x, y));
                let changed = match state {
                    ButtonState::Pressed => self.buttons_down.insert(button),
                    ButtonState::Released => self.buttons_down.remove(&button),
                };
                if changed {
                    match state {
                        ButtonState::Pressed => frame.buttons_pressed.insert(button),
                        ButtonState::Released => frame.buttons_released.insert(button),
                    };
                }
            }

            InputEvent::Wheel(delta) => frame.wheel_lines += delta.lines_y(),
        }

        frame.events.push(ev);
    }

    #[inline]
    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    #[inline]
    pub fn button_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }

    #[inline]
    pub fn pointer(&self) -> Option<Vec2> {
        self.pointer_pos
    }
}
