//! Action dispatch: confirmed combo + layer state -> at most one action.

use crate::combo::Combo;
use crate::debounce::DebounceGate;
use crate::keycode::{Keycode, ModifierKind};
use crate::layer::{Layer, LayerState};
use crate::table::ChordTable;
use crate::Millis;

/// What a confirmed combo does.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    EmitKey(Keycode),
    EmitModifiedKey(ModifierKind, Keycode),
    MoveCursor(i8, i8),
    ToggleMouseLayer,
    ArmModifierLayer,
    PickModifier(ModifierKind),
}

impl Action {
    /// Actions followed by the cooldown delay before the next tick.
    pub fn is_rate_limited(&self) -> bool {
        matches!(
            self,
            Action::EmitKey(_) | Action::EmitModifiedKey(..) | Action::MoveCursor(..)
        )
    }
}

/// Resolves confirmed combos against the chord table.
#[derive(Clone, Debug)]
pub struct Dispatcher<'t> {
    table: &'t ChordTable,
    combo_window: Millis,
}

impl<'t> Dispatcher<'t> {
    pub fn new(table: &'t ChordTable, combo_window: Millis) -> Self {
        Self {
            table,
            combo_window,
        }
    }

    pub fn table(&self) -> &'t ChordTable {
        self.table
    }

    /// Decide the action for a confirmed combo, updating the layers.
    ///
    /// Rules in precedence order, the first match ends the tick:
    /// mouse trigger, layer trigger, then whatever the active layer does.
    /// A combo equal to the last dispatched one never matches anything, so
    /// each press dispatches once.
    pub fn resolve(
        &self,
        combo: Combo,
        now: Millis,
        gate: &DebounceGate,
        layers: &mut LayerState,
    ) -> Option<Action> {
        if gate.last_dispatched() == Some(combo) {
            return None;
        }

        if combo == self.table.mouse_trigger() {
            layers.toggle_mouse();
            return Some(Action::ToggleMouseLayer);
        }
        if combo == self.table.layer_trigger() {
            layers.arm_modifier();
            return Some(Action::ArmModifierLayer);
        }

        match layers.active() {
            Layer::Mouse => {
                let (dx, dy) = self.table.mouse_move(combo)?;
                Some(Action::MoveCursor(dx, dy))
            }
            Layer::ModifierArmed => {
                let kind = self.table.modifier(combo)?;
                layers.pick(kind);
                Some(Action::PickModifier(kind))
            }
            Layer::ModifierHeld(kind) => {
                let key = self.table.key(combo)?;
                layers.take_modifier();
                Some(Action::EmitModifiedKey(kind, key))
            }
            Layer::Idle => {
                let key = self.table.key(combo)?;
                gate.within_window(now, self.combo_window)
                    .then_some(Action::EmitKey(key))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (ChordTable, DebounceGate, LayerState) {
        (
            ChordTable::builtin().unwrap(),
            DebounceGate::new(10, 10),
            LayerState::new(),
        )
    }

    #[test]
    fn plain_key_when_nothing_pending() {
        let (table, gate, mut layers) = fixture();
        let dispatcher = Dispatcher::new(&table, 10);
        assert_eq!(
            dispatcher.resolve(Combo::of(&[2, 3]), 0, &gate, &mut layers),
            Some(Action::EmitKey(Keycode::T))
        );
    }

    #[test]
    fn same_combo_is_suppressed() {
        let (table, mut gate, mut layers) = fixture();
        let dispatcher = Dispatcher::new(&table, 10);
        gate.record_dispatch(Combo::of(&[0]), 0);
        assert_eq!(dispatcher.resolve(Combo::of(&[0]), 5, &gate, &mut layers), None);
    }

    #[test]
    fn rolled_combo_inside_window_dispatches() {
        let (table, mut gate, mut layers) = fixture();
        let dispatcher = Dispatcher::new(&table, 10);
        gate.record_dispatch(Combo::of(&[0]), 100);
        assert_eq!(
            dispatcher.resolve(Combo::of(&[0, 1]), 110, &gate, &mut layers),
            Some(Action::EmitKey(Keycode::R))
        );
    }

    #[test]
    fn rolled_combo_outside_window_waits_for_release() {
        let (table, mut gate, mut layers) = fixture();
        let dispatcher = Dispatcher::new(&table, 10);
        gate.record_dispatch(Combo::of(&[0]), 100);
        assert_eq!(dispatcher.resolve(Combo::of(&[0, 1]), 150, &gate, &mut layers), None);
    }

    #[test]
    fn triggers_take_precedence_over_layers() {
        let (table, gate, mut layers) = fixture();
        let dispatcher = Dispatcher::new(&table, 10);
        layers.arm_modifier();
        assert_eq!(
            dispatcher.resolve(Combo::of(&[4, 5]), 0, &gate, &mut layers),
            Some(Action::ToggleMouseLayer)
        );
        assert_eq!(layers.active(), Layer::Mouse);
        assert_eq!(
            dispatcher.resolve(Combo::of(&[5, 6]), 0, &gate, &mut layers),
            Some(Action::ArmModifierLayer)
        );
        assert_eq!(layers.active(), Layer::ModifierArmed);
    }

    #[test]
    fn mouse_layer_ignores_non_direction_combos() {
        let (table, gate, mut layers) = fixture();
        let dispatcher = Dispatcher::new(&table, 10);
        layers.toggle_mouse();
        assert_eq!(
            dispatcher.resolve(Combo::of(&[3]), 0, &gate, &mut layers),
            Some(Action::MoveCursor(0, 10))
        );
        assert_eq!(dispatcher.resolve(Combo::of(&[0, 1]), 0, &gate, &mut layers), None);
        assert_eq!(dispatcher.resolve(Combo::of(&[6]), 0, &gate, &mut layers), None);
        assert!(layers.mouse_armed());
    }

    #[test]
    fn modifier_layer_ignores_unknown_picks() {
        let (table, gate, mut layers) = fixture();
        let dispatcher = Dispatcher::new(&table, 10);
        layers.arm_modifier();
        assert_eq!(dispatcher.resolve(Combo::of(&[0, 1]), 0, &gate, &mut layers), None);
        assert_eq!(layers.active(), Layer::ModifierArmed);
    }

    #[test]
    fn modified_key_disarms() {
        let (table, gate, mut layers) = fixture();
        let dispatcher = Dispatcher::new(&table, 10);
        layers.arm_modifier();
        layers.pick(ModifierKind::Control);
        assert_eq!(
            dispatcher.resolve(Combo::of(&[0, 3]), 0, &gate, &mut layers),
            Some(Action::EmitModifiedKey(ModifierKind::Control, Keycode::C))
        );
        assert_eq!(layers.active(), Layer::Idle);
    }

    #[test]
    fn modified_key_ignores_unmapped_combo() {
        let (table, gate, mut layers) = fixture();
        let dispatcher = Dispatcher::new(&table, 10);
        layers.arm_modifier();
        layers.pick(ModifierKind::Shift);
        assert_eq!(dispatcher.resolve(Combo::ALL, 0, &gate, &mut layers), None);
        assert_eq!(layers.active(), Layer::ModifierHeld(ModifierKind::Shift));
    }

    #[test]
    fn rate_limits() {
        assert!(Action::EmitKey(Keycode::A).is_rate_limited());
        assert!(Action::MoveCursor(1, 0).is_rate_limited());
        assert!(!Action::ToggleMouseLayer.is_rate_limited());
        assert!(!Action::PickModifier(ModifierKind::Gui).is_rate_limited());
    }
}
