//! USB HID keycodes and the modifier kinds the chord layer can hold.
//! See USB HID Usage Tables, Section 10 (Keyboard/Keypad Page 0x07).

/// USB HID keycodes emitted by the chord table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Keycode {
    // Letters
    A = 0x04,
    B = 0x05,
    C = 0x06,
    D = 0x07,
    E = 0x08,
    F = 0x09,
    G = 0x0A,
    H = 0x0B,
    I = 0x0C,
    J = 0x0D,
    K = 0x0E,
    L = 0x0F,
    M = 0x10,
    N = 0x11,
    O = 0x12,
    P = 0x13,
    Q = 0x14,
    R = 0x15,
    S = 0x16,
    T = 0x17,
    U = 0x18,
    V = 0x19,
    W = 0x1A,
    X = 0x1B,
    Y = 0x1C,
    Z = 0x1D,

    // Numbers
    N1 = 0x1E,
    N2 = 0x1F,
    N3 = 0x20,
    N4 = 0x21,
    N5 = 0x22,
    N6 = 0x23,
    N7 = 0x24,
    N8 = 0x25,
    N9 = 0x26,
    N0 = 0x27,

    // Control keys
    Enter = 0x28,
    Escape = 0x29,
    Backspace = 0x2A,
    Tab = 0x2B,
    Space = 0x2C,
    Minus = 0x2D,
    Equal = 0x2E,
    LBracket = 0x2F,
    RBracket = 0x30,
    Backslash = 0x31,
    Semicolon = 0x33,
    Quote = 0x34,
    Grave = 0x35,
    Comma = 0x36,
    Dot = 0x37,
    Slash = 0x38,

    // Navigation
    Delete = 0x4C,
    Right = 0x4F,
    Left = 0x50,
    Down = 0x51,
    Up = 0x52,
}

/// Shifted symbols for the number row, N1..N0.
const SHIFTED_DIGITS: [char; 10] = ['!', '@', '#', '$', '%', '^', '&', '*', '(', ')'];

impl Keycode {
    /// Raw HID usage ID.
    pub const fn usage(self) -> u8 {
        self as u8
    }

    /// Check if this keycode is a letter (A..Z).
    pub fn is_letter(self) -> bool {
        (Keycode::A.usage()..=Keycode::Z.usage()).contains(&self.usage())
    }

    /// Check if this keycode is on the number row (1..0).
    pub fn is_digit(self) -> bool {
        (Keycode::N1.usage()..=Keycode::N0.usage()).contains(&self.usage())
    }

    /// Character echoed on the status display when this key is sent.
    ///
    /// Letters echo lowercase, or uppercase with Shift held. Digits echo
    /// their shifted symbol with Shift held. Keys without a printable
    /// form echo `?`.
    pub fn echo(self, modifier: Option<ModifierKind>) -> char {
        let shifted = modifier == Some(ModifierKind::Shift);
        if self.is_letter() {
            let c = (b'a' + (self.usage() - Keycode::A.usage())) as char;
            return if shifted { c.to_ascii_uppercase() } else { c };
        }
        if self.is_digit() {
            let idx = (self.usage() - Keycode::N1.usage()) as usize;
            if shifted {
                return SHIFTED_DIGITS[idx];
            }
            // N1..N9 then N0
            return if idx == 9 { '0' } else { (b'1' + idx as u8) as char };
        }
        match self {
            Keycode::Space => ' ',
            Keycode::Enter => '\n',
            _ => '?',
        }
    }

    /// Short name for tables and charts.
    pub fn name(self) -> &'static str {
        match self {
            Keycode::A => "A",
            Keycode::B => "B",
            Keycode::C => "C",
            Keycode::D => "D",
            Keycode::E => "E",
            Keycode::F => "F",
            Keycode::G => "G",
            Keycode::H => "H",
            Keycode::I => "I",
            Keycode::J => "J",
            Keycode::K => "K",
            Keycode::L => "L",
            Keycode::M => "M",
            Keycode::N => "N",
            Keycode::O => "O",
            Keycode::P => "P",
            Keycode::Q => "Q",
            Keycode::R => "R",
            Keycode::S => "S",
            Keycode::T => "T",
            Keycode::U => "U",
            Keycode::V => "V",
            Keycode::W => "W",
            Keycode::X => "X",
            Keycode::Y => "Y",
            Keycode::Z => "Z",
            Keycode::N1 => "1",
            Keycode::N2 => "2",
            Keycode::N3 => "3",
            Keycode::N4 => "4",
            Keycode::N5 => "5",
            Keycode::N6 => "6",
            Keycode::N7 => "7",
            Keycode::N8 => "8",
            Keycode::N9 => "9",
            Keycode::N0 => "0",
            Keycode::Enter => "Ent",
            Keycode::Escape => "Esc",
            Keycode::Backspace => "Bksp",
            Keycode::Tab => "Tab",
            Keycode::Space => "Spc",
            Keycode::Minus => "-",
            Keycode::Equal => "=",
            Keycode::LBracket => "[",
            Keycode::RBracket => "]",
            Keycode::Backslash => "\\",
            Keycode::Semicolon => ";",
            Keycode::Quote => "'",
            Keycode::Grave => "`",
            Keycode::Comma => ",",
            Keycode::Dot => ".",
            Keycode::Slash => "/",
            Keycode::Delete => "Del",
            Keycode::Right => "\u{2192}",
            Keycode::Left => "\u{2190}",
            Keycode::Down => "\u{2193}",
            Keycode::Up => "\u{2191}",
        }
    }
}

/// Modifier the modifier layer can hold for one keystroke.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ModifierKind {
    Shift,
    Control,
    Alt,
    Gui,
}

impl ModifierKind {
    /// Left-hand modifier bit in the HID report modifier byte
    /// (bit 0 = LCtrl, bit 1 = LShift, bit 2 = LAlt, bit 3 = LGui).
    pub const fn report_bit(self) -> u8 {
        match self {
            ModifierKind::Control => 1 << 0,
            ModifierKind::Shift => 1 << 1,
            ModifierKind::Alt => 1 << 2,
            ModifierKind::Gui => 1 << 3,
        }
    }

    /// Single-letter status initial.
    pub const fn initial(self) -> char {
        match self {
            ModifierKind::Shift => 'S',
            ModifierKind::Control => 'C',
            ModifierKind::Alt => 'A',
            ModifierKind::Gui => 'G',
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ModifierKind::Shift => "Shift",
            ModifierKind::Control => "Ctrl",
            ModifierKind::Alt => "Alt",
            ModifierKind::Gui => "Gui",
        }
    }
}
