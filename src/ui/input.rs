use crate::geometry::Point;

/// Pointer button identifier (decoupled from any windowing library).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    pub const ALL: [MouseButton; 3] = [MouseButton::Left, MouseButton::Right, MouseButton::Middle];
}

/// Edge and level state of one button or key for the current frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonState {
    /// Went down this frame.
    pub pressed: bool,
    /// Went up this frame.
    pub released: bool,
    /// Currently down.
    pub held: bool,
}

impl ButtonState {
    pub const IDLE: Self = Self {
        pressed: false,
        released: false,
        held: false,
    };
    pub const PRESSED: Self = Self {
        pressed: true,
        released: false,
        held: true,
    };
    pub const HELD: Self = Self {
        pressed: false,
        released: false,
        held: true,
    };
    pub const RELEASED: Self = Self {
        pressed: false,
        released: true,
        held: false,
    };
}

/// The enumerated key set the toolkit reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    Digit0,
    Digit1,
    Digit2,
    Digit3,
    Digit4,
    Digit5,
    Digit6,
    Digit7,
    Digit8,
    Digit9,
    Space,
    Period,
    Minus,
    Comma,
    Backspace,
    Shift,
}

const LETTERS: [Key; 26] = [
    Key::A,
    Key::B,
    Key::C,
    Key::D,
    Key::E,
    Key::F,
    Key::G,
    Key::H,
    Key::I,
    Key::J,
    Key::K,
    Key::L,
    Key::M,
    Key::N,
    Key::O,
    Key::P,
    Key::Q,
    Key::R,
    Key::S,
    Key::T,
    Key::U,
    Key::V,
    Key::W,
    Key::X,
    Key::Y,
    Key::Z,
];

const DIGITS: [Key; 10] = [
    Key::Digit0,
    Key::Digit1,
    Key::Digit2,
    Key::Digit3,
    Key::Digit4,
    Key::Digit5,
    Key::Digit6,
    Key::Digit7,
    Key::Digit8,
    Key::Digit9,
];

/// Shifted symbols of the digit row, US layout.
const DIGIT_SYMBOLS: [char; 10] = [')', '!', '@', '#', '$', '%', '^', '&', '*', '('];

impl Key {
    /// Every key in polling order.
    pub fn all() -> impl Iterator<Item = Key> {
        LETTERS.into_iter().chain(DIGITS).chain([
            Key::Space,
            Key::Period,
            Key::Minus,
            Key::Comma,
            Key::Backspace,
            Key::Shift,
        ])
    }

    /// Character appended by this key at the given shift level.
    /// `None` for keys that do not produce text.
    pub fn to_char(self, shift: bool) -> Option<char> {
        if let Some(i) = LETTERS.iter().position(|k| *k == self) {
            let lower = (b'a' + i as u8) as char;
            return Some(if shift { lower.to_ascii_uppercase() } else { lower });
        }
        if let Some(i) = DIGITS.iter().position(|k| *k == self) {
            return Some(if shift {
                DIGIT_SYMBOLS[i]
            } else {
                (b'0' + i as u8) as char
            });
        }
        match self {
            Key::Space => Some(' '),
            Key::Period => Some(if shift { '>' } else { '.' }),
            Key::Minus => Some(if shift { '_' } else { '-' }),
            Key::Comma => Some(if shift { '<' } else { ',' }),
            _ => None,
        }
    }
}

/// One key transition observed this frame, in the order it happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEdge {
    pub key: Key,
    pub state: ButtonState,
}

impl KeyEdge {
    pub const fn press(key: Key) -> Self {
        Self {
            key,
            state: ButtonState::PRESSED,
        }
    }

    pub const fn release(key: Key) -> Self {
        Self {
            key,
            state: ButtonState::RELEASED,
        }
    }
}

/// Raw input polling provided by the host.
pub trait InputSource {
    fn pointer(&self) -> Point;
    fn button(&self, button: MouseButton) -> ButtonState;
    /// Key transitions of this frame, oldest first.
    fn key_edges(&self) -> Vec<KeyEdge>;
    /// Edge and level state of one key at the end of this frame.
    fn key(&self, key: Key) -> ButtonState;
}

/// Plain per-frame input snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameInput {
    pub pointer: Point,
    pub buttons: [ButtonState; 3],
    pub keys: Vec<KeyEdge>,
    /// Keys held down from earlier frames.
    pub held: Vec<Key>,
}

impl FrameInput {
    /// Pointer at `pos`, nothing pressed.
    pub fn at(pos: Point) -> Self {
        Self {
            pointer: pos,
            ..Self::default()
        }
    }

    pub fn with_button(mut self, button: MouseButton, state: ButtonState) -> Self {
        self.buttons[button_index(button)] = state;
        self
    }

    pub fn with_keys(mut self, keys: impl IntoIterator<Item = KeyEdge>) -> Self {
        self.keys.extend(keys);
        self
    }

    pub fn with_held(mut self, keys: impl IntoIterator<Item = Key>) -> Self {
        self.held.extend(keys);
        self
    }
}

fn button_index(button: MouseButton) -> usize {
    match button {
        MouseButton::Left => 0,
        MouseButton::Right => 1,
        MouseButton::Middle => 2,
    }
}

impl InputSource for FrameInput {
    fn pointer(&self) -> Point {
        self.pointer
    }

    fn button(&self, button: MouseButton) -> ButtonState {
        self.buttons[button_index(button)]
    }

    fn key_edges(&self) -> Vec<KeyEdge> {
        self.keys.clone()
    }

    fn key(&self, key: Key) -> ButtonState {
        let mut state = ButtonState {
            held: self.held.contains(&key),
            ..ButtonState::IDLE
        };
        // The last edge decides the level.
        for edge in self.keys.iter().filter(|e| e.key == key) {
            state.pressed |= edge.state.pressed;
            state.released |= edge.state.released;
            state.held = edge.state.held;
        }
        state
    }
}
