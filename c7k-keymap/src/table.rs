//! Chord table: combo to keycode, plus the modifier and mouse layers.
//!
//! The static tables below are the default configuration. [`ChordTable::new`]
//! validates a configuration once at startup and flattens the base layer into
//! a dense array indexed by combo mask.

use thiserror::Error;

use crate::combo::{Combo, COMBO_COUNT};
use crate::keycode::{Keycode, ModifierKind};

/// Pointer delta per mouse-layer press, in HID relative units.
pub const MOUSE_STEP: i8 = 10;

/// Invalid chord configuration. Fatal at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("the empty combo cannot be mapped")]
    EmptyCombo,
    #[error("combo {0} is mapped more than once")]
    DuplicateChord(Combo),
    #[error("modifier combo {0} must be a single key")]
    ModifierNotSingleKey(Combo),
    #[error("mouse and modifier triggers are both {0}")]
    TriggersCollide(Combo),
    #[error("trigger {0} is also mapped in the {1} table")]
    TriggerShadowsEntry(Combo, &'static str),
}

/// Combo to keycode, base layer.
pub type ChordEntry = (Combo, Keycode);
/// Single-key combo to modifier, picked after the layer trigger.
pub type ModifierEntry = (Combo, ModifierKind);
/// Single-key combo to pointer delta, active while the mouse layer is armed.
pub type MouseEntry = (Combo, (i8, i8));

const fn c(keys: &[u8]) -> Combo {
    Combo::of(keys)
}

/// Toggles the mouse layer.
pub const MOUSE_TRIGGER: Combo = c(&[4, 5]);
/// Arms the modifier layer.
pub const LAYER_TRIGGER: Combo = c(&[5, 6]);

/// Modifier picks: first four fingers.
pub static MODIFIER_CHORDS: [ModifierEntry; 4] = [
    (c(&[0]), ModifierKind::Shift),
    (c(&[1]), ModifierKind::Control),
    (c(&[2]), ModifierKind::Alt),
    (c(&[3]), ModifierKind::Gui),
];

/// Mouse layer: key 0 up, key 1 right, key 2 left, key 3 down.
pub static MOUSE_MOVES: [MouseEntry; 4] = [
    (c(&[0]), (0, -MOUSE_STEP)),
    (c(&[1]), (MOUSE_STEP, 0)),
    (c(&[2]), (-MOUSE_STEP, 0)),
    (c(&[3]), (0, MOUSE_STEP)),
];

/// Base layer.
///
/// Keys 0-3 are the finger keys, 4 and 6 are thumb keys and 5 is the
/// letter-extension key. Single fingers and finger pairs carry the most
/// frequent English letters; key 5 extends to the rarer letters, key 4 to
/// digits and arrows, key 6 to punctuation.
pub static CHORDS: &[ChordEntry] = &[
    // Letters
    (c(&[0]), Keycode::E),
    (c(&[1]), Keycode::I),
    (c(&[2]), Keycode::A),
    (c(&[3]), Keycode::S),
    (c(&[0, 1]), Keycode::R),
    (c(&[0, 2]), Keycode::O),
    (c(&[0, 3]), Keycode::C),
    (c(&[1, 2]), Keycode::N),
    (c(&[1, 3]), Keycode::L),
    (c(&[2, 3]), Keycode::T),
    (c(&[0, 5]), Keycode::M),
    (c(&[1, 5]), Keycode::G),
    (c(&[2, 5]), Keycode::H),
    (c(&[3, 5]), Keycode::B),
    (c(&[0, 1, 5]), Keycode::Y),
    (c(&[0, 2, 5]), Keycode::W),
    (c(&[0, 3, 5]), Keycode::X),
    (c(&[1, 2, 5]), Keycode::F),
    (c(&[1, 3, 5]), Keycode::K),
    (c(&[2, 3, 5]), Keycode::V),
    (c(&[0, 1, 2]), Keycode::D),
    (c(&[1, 2, 3]), Keycode::P),
    (c(&[0, 1, 2, 5]), Keycode::J),
    (c(&[1, 2, 3, 5]), Keycode::Z),
    (c(&[0, 1, 2, 3]), Keycode::U),
    (c(&[0, 1, 2, 3, 5]), Keycode::Q),
    // Editing
    (c(&[4]), Keycode::Space),
    (c(&[0, 6]), Keycode::Space),
    (c(&[0, 2, 3]), Keycode::Space),
    (c(&[0, 1, 3]), Keycode::Backspace),
    (c(&[0, 1, 3, 5]), Keycode::Delete),
    // Digits and arrows (thumb key 4)
    (c(&[0, 4]), Keycode::N1),
    (c(&[1, 4]), Keycode::N2),
    (c(&[2, 4]), Keycode::N3),
    (c(&[3, 4]), Keycode::N4),
    (c(&[0, 1, 4]), Keycode::N5),
    (c(&[1, 2, 4]), Keycode::N6),
    (c(&[2, 3, 4]), Keycode::N7),
    (c(&[0, 2, 4]), Keycode::N8),
    (c(&[1, 3, 4]), Keycode::N9),
    (c(&[0, 1, 2, 4]), Keycode::N0),
    (c(&[0, 3, 4]), Keycode::Up),
    (c(&[0, 1, 3, 4]), Keycode::Right),
    (c(&[0, 2, 3, 4]), Keycode::Left),
    (c(&[0, 1, 2, 3, 4]), Keycode::Down),
    (c(&[1, 2, 3, 4]), Keycode::Escape),
    // Punctuation (thumb key 6)
    (c(&[6]), Keycode::Backspace),
    (c(&[1, 6]), Keycode::Tab),
    (c(&[2, 6]), Keycode::Dot),
    (c(&[3, 6]), Keycode::Minus),
    (c(&[0, 1, 6]), Keycode::Enter),
    (c(&[0, 2, 6]), Keycode::Comma),
    (c(&[1, 2, 6]), Keycode::Backspace),
    (c(&[2, 3, 6]), Keycode::Slash),
    (c(&[1, 3, 6]), Keycode::LBracket),
    (c(&[0, 3, 6]), Keycode::RBracket),
    (c(&[1, 2, 3, 6]), Keycode::Backslash),
    (c(&[0, 1, 3, 6]), Keycode::Quote),
    (c(&[0, 2, 3, 6]), Keycode::Semicolon),
    (c(&[0, 1, 2, 3, 6]), Keycode::Grave),
];

/// Validated, immutable chord configuration.
#[derive(Clone, Debug)]
pub struct ChordTable {
    keys: [Option<Keycode>; COMBO_COUNT],
    entries: &'static [ChordEntry],
    modifiers: &'static [ModifierEntry],
    mouse_moves: &'static [MouseEntry],
    mouse_trigger: Combo,
    layer_trigger: Combo,
}

impl ChordTable {
    /// Validate a configuration and build the lookup table.
    ///
    /// Rejects empty or duplicate combos, modifier picks that are not a
    /// single key, and trigger combos that collide with each other or with
    /// any entry of the base, modifier or mouse tables.
    pub fn new(
        entries: &'static [ChordEntry],
        modifiers: &'static [ModifierEntry],
        mouse_moves: &'static [MouseEntry],
        mouse_trigger: Combo,
        layer_trigger: Combo,
    ) -> Result<Self, ConfigError> {
        let mut keys = [None; COMBO_COUNT];
        for &(combo, key) in entries {
            if combo.is_empty() {
                return Err(ConfigError::EmptyCombo);
            }
            let slot = &mut keys[combo.bits() as usize];
            if slot.is_some() {
                return Err(ConfigError::DuplicateChord(combo));
            }
            *slot = Some(key);
        }

        check_unique(modifiers.iter().map(|&(combo, _)| combo))?;
        if let Some(&(combo, _)) = modifiers.iter().find(|(combo, _)| combo.len() != 1) {
            return Err(ConfigError::ModifierNotSingleKey(combo));
        }
        check_unique(mouse_moves.iter().map(|&(combo, _)| combo))?;

        if mouse_trigger.is_empty() || layer_trigger.is_empty() {
            return Err(ConfigError::EmptyCombo);
        }
        if mouse_trigger == layer_trigger {
            return Err(ConfigError::TriggersCollide(mouse_trigger));
        }
        for trigger in [mouse_trigger, layer_trigger] {
            if keys[trigger.bits() as usize].is_some() {
                return Err(ConfigError::TriggerShadowsEntry(trigger, "chord"));
            }
            if modifiers.iter().any(|&(combo, _)| combo == trigger) {
                return Err(ConfigError::TriggerShadowsEntry(trigger, "modifier"));
            }
            if mouse_moves.iter().any(|&(combo, _)| combo == trigger) {
                return Err(ConfigError::TriggerShadowsEntry(trigger, "mouse"));
            }
        }

        Ok(Self {
            keys,
            entries,
            modifiers,
            mouse_moves,
            mouse_trigger,
            layer_trigger,
        })
    }

    /// The default configuration.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::new(
            CHORDS,
            &MODIFIER_CHORDS,
            &MOUSE_MOVES,
            MOUSE_TRIGGER,
            LAYER_TRIGGER,
        )
    }

    /// Base-layer keycode for a combo.
    pub fn key(&self, combo: Combo) -> Option<Keycode> {
        self.keys[combo.bits() as usize]
    }

    /// Modifier picked by a combo while the modifier layer is armed.
    pub fn modifier(&self, combo: Combo) -> Option<ModifierKind> {
        self.modifiers
            .iter()
            .find(|&&(c, _)| c == combo)
            .map(|&(_, kind)| kind)
    }

    /// Pointer delta for a combo while the mouse layer is armed.
    pub fn mouse_move(&self, combo: Combo) -> Option<(i8, i8)> {
        self.mouse_moves
            .iter()
            .find(|&&(c, _)| c == combo)
            .map(|&(_, delta)| delta)
    }

    pub fn mouse_trigger(&self) -> Combo {
        self.mouse_trigger
    }

    pub fn layer_trigger(&self) -> Combo {
        self.layer_trigger
    }

    /// Base-layer entries in declaration order.
    pub fn entries(&self) -> &'static [ChordEntry] {
        self.entries
    }

    pub fn modifiers(&self) -> &'static [ModifierEntry] {
        self.modifiers
    }

    pub fn mouse_moves(&self) -> &'static [MouseEntry] {
        self.mouse_moves
    }
}

fn check_unique(combos: impl Iterator<Item = Combo>) -> Result<(), ConfigError> {
    let mut seen = [false; COMBO_COUNT];
    for combo in combos {
        if combo.is_empty() {
            return Err(ConfigError::EmptyCombo);
        }
        if core::mem::replace(&mut seen[combo.bits() as usize], true) {
            return Err(ConfigError::DuplicateChord(combo));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_is_valid() {
        let table = ChordTable::builtin().unwrap();
        assert_eq!(table.key(c(&[0])), Some(Keycode::E));
        assert_eq!(table.key(c(&[0, 1])), Some(Keycode::R));
        assert_eq!(table.key(c(&[0, 1, 3, 5])), Some(Keycode::Delete));
        assert_eq!(table.key(Combo::ALL), None);
        assert_eq!(table.key(Combo::EMPTY), None);
    }

    #[test]
    fn builtin_triggers_are_unmapped() {
        let table = ChordTable::builtin().unwrap();
        assert_eq!(table.key(table.mouse_trigger()), None);
        assert_eq!(table.key(table.layer_trigger()), None);
    }

    #[test]
    fn modifier_and_mouse_lookups() {
        let table = ChordTable::builtin().unwrap();
        assert_eq!(table.modifier(c(&[0])), Some(ModifierKind::Shift));
        assert_eq!(table.modifier(c(&[3])), Some(ModifierKind::Gui));
        assert_eq!(table.modifier(c(&[4])), None);
        assert_eq!(table.mouse_move(c(&[1])), Some((10, 0)));
        assert_eq!(table.mouse_move(c(&[0])), Some((0, -10)));
        assert_eq!(table.mouse_move(c(&[0, 1])), None);
    }

    static DUPLICATE: [ChordEntry; 2] = [
        (c(&[0, 2, 4]), Keycode::Comma),
        (c(&[2, 0, 4]), Keycode::Equal),
    ];

    #[test]
    fn rejects_duplicate_chords() {
        let err = ChordTable::new(
            &DUPLICATE,
            &MODIFIER_CHORDS,
            &MOUSE_MOVES,
            MOUSE_TRIGGER,
            LAYER_TRIGGER,
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::DuplicateChord(c(&[0, 2, 4])));
    }

    static SHADOWED: [ChordEntry; 2] = [(c(&[0]), Keycode::E), (c(&[4, 5]), Keycode::Tab)];

    #[test]
    fn rejects_trigger_in_base_table() {
        let err = ChordTable::new(
            &SHADOWED,
            &MODIFIER_CHORDS,
            &MOUSE_MOVES,
            MOUSE_TRIGGER,
            LAYER_TRIGGER,
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::TriggerShadowsEntry(MOUSE_TRIGGER, "chord"));
    }

    #[test]
    fn rejects_colliding_triggers() {
        let err = ChordTable::new(
            CHORDS,
            &MODIFIER_CHORDS,
            &MOUSE_MOVES,
            LAYER_TRIGGER,
            LAYER_TRIGGER,
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::TriggersCollide(LAYER_TRIGGER));
    }

    static NO_SINGLES: [ChordEntry; 1] = [(c(&[0, 1]), Keycode::R)];

    #[test]
    fn rejects_trigger_in_modifier_table() {
        let err = ChordTable::new(
            &NO_SINGLES,
            &MODIFIER_CHORDS,
            &MOUSE_MOVES,
            MOUSE_TRIGGER,
            c(&[2]),
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::TriggerShadowsEntry(c(&[2]), "modifier"));
    }

    static MOVE_ON_TRIGGER: [MouseEntry; 2] = [(c(&[0]), (0, -MOUSE_STEP)), (c(&[5, 6]), (0, 1))];

    #[test]
    fn rejects_trigger_in_mouse_table() {
        let err = ChordTable::new(
            CHORDS,
            &MODIFIER_CHORDS,
            &MOVE_ON_TRIGGER,
            MOUSE_TRIGGER,
            LAYER_TRIGGER,
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::TriggerShadowsEntry(LAYER_TRIGGER, "mouse"));
    }

    static WIDE_MODIFIER: [ModifierEntry; 1] = [(c(&[0, 1]), ModifierKind::Shift)];

    #[test]
    fn rejects_multi_key_modifier() {
        let err = ChordTable::new(
            CHORDS,
            &WIDE_MODIFIER,
            &MOUSE_MOVES,
            MOUSE_TRIGGER,
            LAYER_TRIGGER,
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::ModifierNotSingleKey(c(&[0, 1])));
    }

    static EMPTY_ENTRY: [ChordEntry; 1] = [(Combo::EMPTY, Keycode::A)];

    #[test]
    fn rejects_empty_combo() {
        let err = ChordTable::new(
            &EMPTY_ENTRY,
            &MODIFIER_CHORDS,
            &MOUSE_MOVES,
            MOUSE_TRIGGER,
            LAYER_TRIGGER,
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::EmptyCombo);
    }
}
