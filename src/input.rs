// Keyboard -> Action. Keys without a binding return None and are ignored by the loop.

use minifb::Key;

use crate::media::ReactionKey;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Quit,
    ToggleFrame,
    ToggleFullscreen,
    ZoomIn,
    ZoomOut,
    ZoomReset,
    ZoomMax,
    ToggleCircle,
    ToggleOnTop,
    OpacityUp,
    OpacityDown,
    React(ReactionKey),
}

pub fn action_for(key: Key) -> Option<Action> {
    let action = match key {
        Key::Escape => Action::Quit,
        Key::Space => Action::ToggleFrame,
        Key::F => Action::ToggleFullscreen,
        Key::Up => Action::ZoomIn,
        Key::Down => Action::ZoomOut,
        Key::O => Action::ZoomReset,
        Key::I => Action::ZoomMax,
        Key::V => Action::ToggleCircle,
        Key::T => Action::ToggleOnTop,
        Key::RightBracket => Action::OpacityUp,
        Key::LeftBracket => Action::OpacityDown,
        other => return reaction_char(other).and_then(ReactionKey::new).map(Action::React),
    };
    Some(action)
}

fn reaction_char(key: Key) -> Option<char> {
    let c = match key {
        Key::Q => 'q',
        Key::W => 'w',
        Key::E => 'e',
        Key::A => 'a',
        Key::S => 's',
        Key::D => 'd',
        Key::Z => 'z',
        Key::X => 'x',
        Key::C => 'c',
        Key::Key0 | Key::NumPad0 => '0',
        Key::Key1 | Key::NumPad1 => '1',
        Key::Key2 | Key::NumPad2 => '2',
        Key::Key3 | Key::NumPad3 => '3',
        Key::Key4 | Key::NumPad4 => '4',
        Key::Key5 | Key::NumPad5 => '5',
        Key::Key6 | Key::NumPad6 => '6',
        Key::Key7 | Key::NumPad7 => '7',
        Key::Key8 | Key::NumPad8 => '8',
        Key::Key9 | Key::NumPad9 => '9',
        _ => return None,
    };
    Some(c)
}
