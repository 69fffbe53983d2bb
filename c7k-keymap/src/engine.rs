//! The per-tick chord pipeline: combo extraction, debounce, layers, dispatch.

use crate::combo::{Combo, Sample};
use crate::debounce::DebounceGate;
use crate::dispatch::{Action, Dispatcher};
use crate::layer::LayerState;
use crate::status::Status;
use crate::table::ChordTable;
use crate::Millis;

/// Timing constants, all in milliseconds.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Timing {
    /// How long a combo must be held before it counts.
    pub min_hold: Millis,
    /// Gap after a dispatch within which a rolled combo still dispatches.
    pub combo_window: Millis,
    /// Pause after a keystroke or pointer move.
    pub cooldown: Millis,
    /// Minimum spacing between two releases that clear the gate.
    pub release_window: Millis,
    /// Delay between two ticks.
    pub poll_interval: Millis,
}

impl Timing {
    pub const DEFAULT: Timing = Timing {
        min_hold: 10,
        combo_window: 10,
        cooldown: 10,
        release_window: 10,
        poll_interval: 50,
    };

    pub const fn with_min_hold(mut self, ms: Millis) -> Self {
        self.min_hold = ms;
        self
    }

    pub const fn with_combo_window(mut self, ms: Millis) -> Self {
        self.combo_window = ms;
        self
    }

    pub const fn with_cooldown(mut self, ms: Millis) -> Self {
        self.cooldown = ms;
        self
    }

    pub const fn with_release_window(mut self, ms: Millis) -> Self {
        self.release_window = ms;
        self
    }

    pub const fn with_poll_interval(mut self, ms: Millis) -> Self {
        self.poll_interval = ms;
        self
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// One dispatched action and the status it produces.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Dispatch {
    pub action: Action,
    pub status: Status,
}

/// Chord decoding state machine. Owns all mutable state; the chord table
/// is borrowed for the engine's lifetime.
#[derive(Clone, Debug)]
pub struct ChordEngine<'t> {
    dispatcher: Dispatcher<'t>,
    gate: DebounceGate,
    layers: LayerState,
    timing: Timing,
}

impl<'t> ChordEngine<'t> {
    pub fn new(table: &'t ChordTable, timing: Timing) -> Self {
        Self {
            dispatcher: Dispatcher::new(table, timing.combo_window),
            gate: DebounceGate::new(timing.min_hold, timing.release_window),
            layers: LayerState::new(),
            timing,
        }
    }

    /// Run one sample through the pipeline.
    pub fn tick(&mut self, sample: &Sample, now: Millis) -> Option<Dispatch> {
        let combo = self.gate.observe(Combo::from_sample(sample), now)?;
        let action = self
            .dispatcher
            .resolve(combo, now, &self.gate, &mut self.layers)?;
        self.gate.record_dispatch(combo, now);
        Some(Dispatch {
            action,
            status: Status::for_action(&action, self.layers.mouse_armed()),
        })
    }

    /// Drop back to idle: no hold in progress, no layer armed.
    pub fn reset(&mut self) {
        self.gate.reset();
        self.layers.reset();
    }

    pub fn layers(&self) -> &LayerState {
        &self.layers
    }

    pub fn gate(&self) -> &DebounceGate {
        &self.gate
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    pub fn table(&self) -> &'t ChordTable {
        self.dispatcher.table()
    }
}
