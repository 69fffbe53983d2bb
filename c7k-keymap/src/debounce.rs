//! Hold-time debounce for whole combos.
//!
//! Unlike a per-key counter debouncer, the gate watches the combo as a
//! whole: a non-empty combo is confirmed once keys have been held for
//! `min_hold` ms, and stays confirmed every tick until release. The gate
//! also remembers the last dispatched combo so the dispatcher can suppress
//! repeats while the same keys stay down.

use crate::combo::Combo;
use crate::Millis;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DebounceGate {
    min_hold: Millis,
    release_window: Millis,
    /// Time the current hold started, None between presses.
    hold_start: Option<Millis>,
    /// Last time a release cleared the gate.
    last_release: Option<Millis>,
    last_dispatched: Option<Combo>,
    last_dispatched_at: Option<Millis>,
}

impl DebounceGate {
    pub const fn new(min_hold: Millis, release_window: Millis) -> Self {
        Self {
            min_hold,
            release_window,
            hold_start: None,
            last_release: None,
            last_dispatched: None,
            last_dispatched_at: None,
        }
    }

    /// Feed one tick's combo. Returns the combo once it is confirmed.
    ///
    /// An empty combo is a release: it clears the hold and the dispatch
    /// marker, unless another release was stamped less than
    /// `release_window` ago, in which case the sample is treated as noise.
    pub fn observe(&mut self, combo: Combo, now: Millis) -> Option<Combo> {
        if combo.is_empty() {
            let settled = self
                .last_release
                .map_or(true, |at| now.wrapping_sub(at) >= self.release_window);
            if settled {
                self.hold_start = None;
                self.last_dispatched = None;
                self.last_release = Some(now);
            }
            return None;
        }

        let start = *self.hold_start.get_or_insert(now);
        (now.wrapping_sub(start) >= self.min_hold).then_some(combo)
    }

    /// Mark `combo` as dispatched at `now`.
    pub fn record_dispatch(&mut self, combo: Combo, now: Millis) {
        self.last_dispatched = Some(combo);
        self.last_dispatched_at = Some(now);
    }

    /// Combo dispatched during the current hold, if any.
    pub fn last_dispatched(&self) -> Option<Combo> {
        self.last_dispatched
    }

    /// True when nothing is pending, or the last dispatch happened within
    /// `window` ms. Lets a rolling press settle into one chord.
    pub fn within_window(&self, now: Millis, window: Millis) -> bool {
        match (self.last_dispatched, self.last_dispatched_at) {
            (None, _) | (_, None) => true,
            (Some(_), Some(at)) => now.wrapping_sub(at) <= window,
        }
    }

    pub fn is_holding(&self) -> bool {
        self.hold_start.is_some()
    }

    /// Forget everything, keeping the timing.
    pub fn reset(&mut self) {
        *self = Self::new(self.min_hold, self.release_window);
    }
}
