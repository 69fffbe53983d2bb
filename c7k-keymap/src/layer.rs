//! Auxiliary layer state.
//!
//! Two layers sit on top of the base chord table:
//! - the modifier layer, armed by the layer trigger; the next modifier pick
//!   selects Shift/Ctrl/Alt/Gui and the keystroke after that carries it,
//!   then the layer disarms itself
//! - the mouse layer, a plain toggle; while armed the finger keys move the
//!   pointer
//!
//! The two are mutually exclusive: arming one always clears the other.

use crate::keycode::ModifierKind;

/// Which rules apply to the next confirmed combo.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Layer {
    /// Base chord table.
    Idle,
    /// Modifier layer armed, waiting for a modifier pick.
    ModifierArmed,
    /// Modifier picked, waiting for the keystroke it applies to.
    ModifierHeld(ModifierKind),
    /// Mouse layer armed.
    Mouse,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LayerState {
    modifier_armed: bool,
    held_modifier: Option<ModifierKind>,
    mouse_armed: bool,
}

impl LayerState {
    pub const fn new() -> Self {
        Self {
            modifier_armed: false,
            held_modifier: None,
            mouse_armed: false,
        }
    }

    pub fn active(&self) -> Layer {
        self.check();
        match (self.mouse_armed, self.modifier_armed, self.held_modifier) {
            (true, _, _) => Layer::Mouse,
            (false, true, Some(kind)) => Layer::ModifierHeld(kind),
            (false, true, None) => Layer::ModifierArmed,
            (false, false, _) => Layer::Idle,
        }
    }

    pub fn modifier_armed(&self) -> bool {
        self.modifier_armed
    }

    pub fn held_modifier(&self) -> Option<ModifierKind> {
        self.held_modifier
    }

    pub fn mouse_armed(&self) -> bool {
        self.mouse_armed
    }

    /// Flip the mouse layer. Always drops the modifier layer.
    /// Returns the new mouse state.
    pub fn toggle_mouse(&mut self) -> bool {
        self.mouse_armed = !self.mouse_armed;
        self.modifier_armed = false;
        self.held_modifier = None;
        self.check();
        self.mouse_armed
    }

    /// Arm the modifier layer, dropping the mouse layer and any pick.
    pub fn arm_modifier(&mut self) {
        self.modifier_armed = true;
        self.held_modifier = None;
        self.mouse_armed = false;
        self.check();
    }

    /// Hold a modifier for the next keystroke. Ignored unless the modifier
    /// layer is armed.
    pub fn pick(&mut self, kind: ModifierKind) {
        if self.modifier_armed {
            self.held_modifier = Some(kind);
        }
        self.check();
    }

    /// Consume the held modifier and disarm the modifier layer.
    pub fn take_modifier(&mut self) -> Option<ModifierKind> {
        self.modifier_armed = false;
        let held = self.held_modifier.take();
        self.check();
        held
    }

    /// Back to idle.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn check(&self) {
        debug_assert!(
            !(self.modifier_armed && self.mouse_armed),
            "modifier and mouse layers armed together"
        );
        debug_assert!(
            self.held_modifier.is_none() || self.modifier_armed,
            "modifier held without the modifier layer"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_idle() {
        assert_eq!(LayerState::new().active(), Layer::Idle);
    }

    #[test]
    fn modifier_track() {
        let mut layers = LayerState::new();
        layers.arm_modifier();
        assert_eq!(layers.active(), Layer::ModifierArmed);
        layers.pick(ModifierKind::Alt);
        assert_eq!(layers.active(), Layer::ModifierHeld(ModifierKind::Alt));
        assert_eq!(layers.take_modifier(), Some(ModifierKind::Alt));
        assert_eq!(layers.active(), Layer::Idle);
    }

    #[test]
    fn rearming_is_idempotent() {
        let mut layers = LayerState::new();
        layers.arm_modifier();
        layers.arm_modifier();
        assert_eq!(layers.active(), Layer::ModifierArmed);
    }

    #[test]
    fn rearming_drops_pick() {
        let mut layers = LayerState::new();
        layers.arm_modifier();
        layers.pick(ModifierKind::Shift);
        layers.arm_modifier();
        assert_eq!(layers.held_modifier(), None);
    }

    #[test]
    fn pick_without_arm_is_ignored() {
        let mut layers = LayerState::new();
        layers.pick(ModifierKind::Shift);
        assert_eq!(layers.active(), Layer::Idle);
    }

    #[test]
    fn mouse_toggle_clears_modifier() {
        let mut layers = LayerState::new();
        layers.arm_modifier();
        layers.pick(ModifierKind::Control);
        assert!(layers.toggle_mouse());
        assert!(!layers.modifier_armed());
        assert_eq!(layers.held_modifier(), None);
        assert_eq!(layers.active(), Layer::Mouse);
    }

    #[test]
    fn arming_modifier_clears_mouse() {
        let mut layers = LayerState::new();
        layers.toggle_mouse();
        layers.arm_modifier();
        assert!(!layers.mouse_armed());
        assert_eq!(layers.active(), Layer::ModifierArmed);
    }

    #[test]
    fn mouse_toggles_back_off() {
        let mut layers = LayerState::new();
        assert!(layers.toggle_mouse());
        assert!(!layers.toggle_mouse());
        assert_eq!(layers.active(), Layer::Idle);
    }
}
