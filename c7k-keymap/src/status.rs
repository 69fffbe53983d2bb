//! Short status texts for the device display.

use core::fmt;

use crate::dispatch::Action;
use crate::keycode::ModifierKind;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Status {
    /// Waiting for a host link.
    Advertising,
    Connected,
    Disconnected,
    /// Echo of the last emitted key.
    Key(char),
    Move(i8, i8),
    MouseLayer(bool),
    ModifierLayer,
    Modifier(ModifierKind),
}

impl Status {
    /// Status shown after `action`. `mouse_armed` is the mouse layer state
    /// after the action was applied.
    pub fn for_action(action: &Action, mouse_armed: bool) -> Status {
        match *action {
            Action::EmitKey(key) => Status::Key(key.echo(None)),
            Action::EmitModifiedKey(kind, key) => Status::Key(key.echo(Some(kind))),
            Action::MoveCursor(dx, dy) => Status::Move(dx, dy),
            Action::ToggleMouseLayer => Status::MouseLayer(mouse_armed),
            Action::ArmModifierLayer => Status::ModifierLayer,
            Action::PickModifier(kind) => Status::Modifier(kind),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Advertising => f.write_str("Advertising"),
            Status::Connected => f.write_str("Connected"),
            Status::Disconnected => f.write_str("Disconnected"),
            Status::Key(c) => write!(f, "{c}"),
            Status::Move(dx, dy) => write!(f, "Move: {dx},{dy}"),
            Status::MouseLayer(true) => f.write_str("Mouse: on"),
            Status::MouseLayer(false) => f.write_str("Mouse: off"),
            Status::ModifierLayer => f.write_str("Mod Layer"),
            Status::Modifier(kind) => write!(f, "{}", kind.initial()),
        }
    }
}
