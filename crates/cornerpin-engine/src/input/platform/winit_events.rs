use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, KeyEvent, MouseButton as WinitButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{Key as LogicalKey, NamedKey, PhysicalKey};
use winit::window::Window;

use crate::input::{ButtonState, InputEvent, InputState, Key, Modifiers, MouseButton, MouseWheelDelta};

/// Maps one winit window event onto the engine's input model.
///
/// `None` for everything the editor does not consume (IME, touch, files...).
pub(crate) fn translate_window_event(
    window: &Window,
    state: &InputState,
    event: &WindowEvent,
) -> Option<InputEvent> {
    let ev = match event {
        WindowEvent::ModifiersChanged(m) => {
            let m = m.state();
            InputEvent::ModifiersChanged(Modifiers {
                shift: m.shift_key(),
                ctrl: m.control_key(),
                alt: m.alt_key(),
                meta: m.super_key(),
            })
        }
        WindowEvent::Focused(focused) => InputEvent::Focused(*focused),
        WindowEvent::CursorLeft { .. } => InputEvent::PointerLeft,
        WindowEvent::CursorMoved { position, .. } => {
            let [x, y] = logical(window, *position);
            InputEvent::PointerMoved { x, y }
        }
        WindowEvent::MouseInput { state: pressed, button, .. } => {
            // winit reports no position with buttons; use the last move.
            let (x, y) = state.pointer_pos.map_or((0.0, 0.0), |p| (p.x, p.y));
            InputEvent::PointerButton { button: mouse_button(*button), state: button_state(*pressed), x, y }
        }
        WindowEvent::MouseWheel { delta, .. } => InputEvent::Wheel(match *delta {
            MouseScrollDelta::LineDelta(x, y) => MouseWheelDelta::Line { x, y },
            MouseScrollDelta::PixelDelta(p) => {
                let [x, y] = logical(window, p);
                MouseWheelDelta::Pixel { x, y }
            }
        }),
        WindowEvent::KeyboardInput { event, .. } => InputEvent::Key {
            key: key(event),
            state: button_state(event.state),
            repeat: event.repeat,
        },
        _ => return None,
    };
    Some(ev)
}

fn logical(window: &Window, p: PhysicalPosition<f64>) -> [f32; 2] {
    let p = p.to_logical::<f64>(window.scale_factor());
    [p.x as f32, p.y as f32]
}

fn button_state(s: ElementState) -> ButtonState {
    match s {
        ElementState::Pressed => ButtonState::Pressed,
        ElementState::Released => ButtonState::Released,
    }
}

fn mouse_button(b: WinitButton) -> MouseButton {
    match b {
        WinitButton::Left => MouseButton::Left,
        WinitButton::Right => MouseButton::Right,
        WinitButton::Middle => MouseButton::Middle,
        WinitButton::Back => MouseButton::Other(3),
        WinitButton::Forward => MouseButton::Other(4),
        WinitButton::Other(n) => MouseButton::Other(n),
    }
}

/// Layout-aware: shortcuts follow the character printed on the key.
fn key(event: &KeyEvent) -> Key {
    match &event.logical_key {
        LogicalKey::Named(named) => match named {
            NamedKey::Escape => Key::Escape,
            NamedKey::Enter => Key::Enter,
            NamedKey::Tab => Key::Tab,
            NamedKey::Space => Key::Space,
            NamedKey::Backspace => Key::Backspace,
            NamedKey::Delete => Key::Delete,
            NamedKey::ArrowUp => Key::ArrowUp,
            NamedKey::ArrowDown => Key::ArrowDown,
            NamedKey::ArrowLeft => Key::ArrowLeft,
            NamedKey::ArrowRight => Key::ArrowRight,
            _ => physical(event.physical_key),
        },
        LogicalKey::Character(text) => match text.chars().next() {
            Some(c) => Key::Char(c.to_ascii_lowercase()),
            None => physical(event.physical_key),
        },
        _ => physical(event.physical_key),
    }
}

fn physical(key: PhysicalKey) -> Key {
    match key {
        PhysicalKey::Code(code) => Key::Other(code as u32),
        PhysicalKey::Unidentified(_) => Key::Other(0),
    }
}
