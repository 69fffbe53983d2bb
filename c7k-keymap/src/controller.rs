//! Poll loop tying a [`ChordEngine`] to a [`Device`].
//!
//! The loop is single threaded and fixed period: sample, tick, deliver,
//! sleep. A session lasts while the host link is up; when the link drops the
//! engine is reset so the next session starts from idle.

use crate::device::Device;
use crate::dispatch::Action;
use crate::engine::{ChordEngine, Dispatch};
use crate::status::Status;
use crate::Millis;

/// Link polling period while waiting for a host.
pub const LINK_POLL_MS: Millis = 50;
/// Pause after a link drop before advertising again.
pub const RECONNECT_DELAY_MS: Millis = 500;

pub struct Controller<'t, D> {
    engine: ChordEngine<'t>,
    device: D,
}

impl<'t, D: Device> Controller<'t, D> {
    pub fn new(engine: ChordEngine<'t>, device: D) -> Self {
        Self { engine, device }
    }

    /// Advertise, run a session, repeat, until the device powers down.
    pub fn run(&mut self) {
        while self.device.is_powered() {
            if self.wait_for_link() {
                self.run_session();
            }
        }
    }

    /// Block until a host link is up. Returns false if the device powered
    /// down first.
    pub fn wait_for_link(&mut self) -> bool {
        self.device.set_status(&Status::Advertising);
        while !self.device.is_connected() {
            if !self.device.is_powered() {
                return false;
            }
            self.device.delay_ms(LINK_POLL_MS);
        }
        self.device.set_status(&Status::Connected);
        true
    }

    /// Tick until the link drops, then reset to idle.
    pub fn run_session(&mut self) {
        self.engine.reset();
        while self.device.is_connected() && self.device.is_powered() {
            self.step();
        }
        self.engine.reset();
        self.device.set_status(&Status::Disconnected);
        self.device.delay_ms(RECONNECT_DELAY_MS);
    }

    /// One poll tick. Returns what was dispatched, if anything.
    pub fn step(&mut self) -> Option<Dispatch> {
        let sample = self.device.sample();
        let now = self.device.now();
        let dispatch = self.engine.tick(&sample, now);
        if let Some(dispatch) = &dispatch {
            self.deliver(dispatch);
        }
        self.device.delay_ms(self.engine.timing().poll_interval);
        dispatch
    }

    fn deliver(&mut self, dispatch: &Dispatch) {
        if !self.device.is_connected() {
            return;
        }
        match dispatch.action {
            Action::EmitKey(key) => self.device.press_and_release_key(key),
            Action::EmitModifiedKey(kind, key) => {
                self.device.press_and_release_modified_key(kind, key)
            }
            Action::MoveCursor(dx, dy) => self.device.move_cursor(dx, dy),
            Action::ToggleMouseLayer | Action::ArmModifierLayer | Action::PickModifier(_) => {}
        }
        self.device.set_status(&dispatch.status);
        if dispatch.action.is_rate_limited() {
            self.device.delay_ms(self.engine.timing().cooldown);
        }
    }

    pub fn engine(&self) -> &ChordEngine<'t> {
        &self.engine
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn into_device(self) -> D {
        self.device
    }
}
