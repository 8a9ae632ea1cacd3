use crate::coords::Vec2;

/// Key identity as the editor sees it.
///
/// Printable keys arrive as lowercase [`Key::Char`] following the active
/// keyboard layout; the few named keys shortcuts use get their own variant.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Tab,
    Space,
    Backspace,
    Delete,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Char(char),
    /// Anything else, by physical key code (0 when unknown).
    Other(u32),
}

/// Pressed/released, for keys and pointer buttons alike.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ButtonState {
    Pressed,
    Released,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    /// Cmd on macOS, the Windows key elsewhere.
    pub meta: bool,
}

/// Wheel movement; `Line` from notched wheels, `Pixel` from touchpads.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MouseWheelDelta {
    Line { x: f32, y: f32 },
    Pixel { x: f32, y: f32 },
}

/// Pixels per wheel line when normalizing touchpad input.
const PIXELS_PER_LINE: f32 = 40.0;

impl MouseWheelDelta {
    /// Vertical movement in lines; positive scrolls up.
    pub fn lines_y(self) -> f32 {
        match self {
            MouseWheelDelta::Line { y, .. } => y,
            MouseWheelDelta::Pixel { y, .. } => y / PIXELS_PER_LINE,
        }
    }
}

/// Window input after platform translation. Positions are logical px.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    ModifiersChanged(Modifiers),
    Key {
        key: Key,
        state: ButtonState,
        repeat: bool,
    },
    PointerMoved {
        x: f32,
        y: f32,
    },
    /// Carries the pointer position at the time of the press or release.
    PointerButton {
        button: MouseButton,
        state: ButtonState,
        x: f32,
        y: f32,
    },
    Wheel(MouseWheelDelta),
    PointerLeft,
    Focused(bool),
}

impl InputEvent {
    /// Pointer position carried by the event, if any.
    pub fn position(&self) -> Option<Vec2> {
        match *self {
            InputEvent::PointerMoved { x, y } | InputEvent::PointerButton { x, y, .. } => Some(Vec2::new(x, y)),
            _ => None,
        }
    }

    /// True for a first (non-repeat) press of `key`.
    pub fn is_key_press(&self, key: Key) -> bool {
        matches!(self, InputEvent::Key { key: k, state: ButtonState::Pressed, repeat: false } if *k == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touchpad_pixels_normalize_to_lines() {
        assert_eq!(MouseWheelDelta::Pixel { x: 0.0, y: 80.0 }.lines_y(), 2.0);
        assert_eq!(MouseWheelDelta::Line { x: 3.0, y: -1.0 }.lines_y(), -1.0);
    }

    #[test]
    fn key_press_ignores_repeats_and_releases() {
        let press = InputEvent::Key { key: Key::Char('p'), state: ButtonState::Pressed, repeat: false };
        let repeat = InputEvent::Key { key: Key::Char('p'), state: ButtonState::Pressed, repeat: true };
        let release = InputEvent::Key { key: Key::Char('p'), state: ButtonState::Released, repeat: false };
        assert!(press.is_key_press(Key::Char('p')));
        assert!(!press.is_key_press(Key::Char('r')));
        assert!(!repeat.is_key_press(Key::Char('p')));
        assert!(!release.is_key_press(Key::Char('p')));
    }

    #[test]
    fn only_pointer_events_carry_a_position() {
        let moved = InputEvent::PointerMoved { x: 2.0, y: 3.0 };
        assert_eq!(moved.position(), Some(Vec2::new(2.0, 3.0)));
        assert_eq!(InputEvent::PointerLeft.position(), None);
    }
}
