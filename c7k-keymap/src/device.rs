//! Hardware boundaries of the chord engine.
//!
//! The engine itself never touches hardware. A board implements these
//! traits for its key lines, HID transport, status indicator and clock,
//! and hands itself to a [`Controller`](crate::controller::Controller).

use crate::combo::Sample;
use crate::keycode::{Keycode, ModifierKind};
use crate::status::Status;
use crate::Millis;

/// Reads all key lines once, polarity already corrected (true = pressed).
pub trait InputSampler {
    fn sample(&mut self) -> Sample;
}

/// HID transport to the host. Calls are fire and forget; the transport
/// drops them when it cannot deliver.
pub trait OutputSink {
    /// True while a host link is up.
    fn is_connected(&mut self) -> bool;

    fn press_and_release_key(&mut self, key: Keycode);

    fn press_and_release_modified_key(&mut self, modifier: ModifierKind, key: Keycode);

    fn move_cursor(&mut self, dx: i8, dy: i8);
}

/// Best-effort status feedback.
pub trait StatusDisplay {
    fn set_status(&mut self, status: &Status);
}

/// Monotonic millisecond clock with a blocking delay.
pub trait Clock {
    fn now(&self) -> Millis;

    fn delay_ms(&mut self, ms: Millis);
}

/// Everything the controller needs from a board.
pub trait Device: InputSampler + OutputSink + StatusDisplay + Clock {
    /// False once the board should stop running the chord loop.
    fn is_powered(&mut self) -> bool {
        true
    }
}
