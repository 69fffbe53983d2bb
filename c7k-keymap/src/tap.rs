//! Press-then-release bookkeeping for keyboard reports.
//!
//! A tap is two reports: the key down, then an empty report. If the press
//! went out but the release did not, the host sees the key held until some
//! later report clears it. [`ReleaseGuard`] remembers that debt so the
//! transport can retry the release on its next poll.

/// Tracks a key release the host has not received yet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReleaseGuard {
    owed: bool,
}

impl ReleaseGuard {
    pub const fn new() -> Self {
        Self { owed: false }
    }

    /// A press reached the host without its release.
    pub fn is_owed(&self) -> bool {
        self.owed
    }

    /// Forget any owed release, e.g. after a bus reset.
    pub fn clear(&mut self) {
        self.owed = false;
    }

    /// Send a press and its release through `send`, which gets `true` for
    /// the press report and `false` for the release, and returns whether the
    /// report was queued.
    ///
    /// An owed release is flushed first; if that fails the new press is not
    /// sent, so a stuck key never gains company.
    pub fn tap(&mut self, mut send: impl FnMut(bool) -> bool) -> bool {
        if !self.flush(&mut send) {
            return false;
        }
        if !send(true) {
            return false;
        }
        self.owed = !send(false);
        true
    }

    /// Retry an owed release. True when nothing is owed afterwards.
    pub fn flush(&mut self, mut send: impl FnMut(bool) -> bool) -> bool {
        if self.owed && send(false) {
            self.owed = false;
        }
        !self.owed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records reports and fails the ones listed in `fail`, by position.
    struct Link {
        sent: [Option<bool>; 8],
        count: usize,
        fail: &'static [usize],
    }

    impl Link {
        fn new(fail: &'static [usize]) -> Self {
            Self {
                sent: [None; 8],
                count: 0,
                fail,
            }
        }

        fn send(&mut self, press: bool) -> bool {
            let n = self.count;
            self.count += 1;
            if self.fail.contains(&n) {
                return false;
            }
            self.sent[n] = Some(press);
            true
        }
    }

    #[test]
    fn clean_tap_sends_press_then_release() {
        let mut guard = ReleaseGuard::new();
        let mut link = Link::new(&[]);
        assert!(guard.tap(|p| link.send(p)));
        assert_eq!(link.sent[..2], [Some(true), Some(false)]);
        assert!(!guard.is_owed());
    }

    #[test]
    fn failed_press_owes_nothing() {
        let mut guard = ReleaseGuard::new();
        let mut link = Link::new(&[0]);
        assert!(!guard.tap(|p| link.send(p)));
        assert_eq!(link.count, 1);
        assert!(!guard.is_owed());
    }

    #[test]
    fn dropped_release_is_retried_on_flush() {
        let mut guard = ReleaseGuard::new();
        let mut link = Link::new(&[1]);
        assert!(guard.tap(|p| link.send(p)));
        assert!(guard.is_owed());

        assert!(guard.flush(|p| link.send(p)));
        assert!(!guard.is_owed());
        assert_eq!(link.sent[2], Some(false));

        // Nothing owed: flush sends nothing.
        assert!(guard.flush(|p| link.send(p)));
        assert_eq!(link.count, 3);
    }

    #[test]
    fn next_tap_releases_first() {
        let mut guard = ReleaseGuard::new();
        let mut link = Link::new(&[1]);
        guard.tap(|p| link.send(p));
        assert!(guard.tap(|p| link.send(p)));
        assert_eq!(
            link.sent[..5],
            [Some(true), None, Some(false), Some(true), Some(false)]
        );
        assert!(!guard.is_owed());
    }

    #[test]
    fn stuck_release_blocks_new_press() {
        let mut guard = ReleaseGuard::new();
        let mut link = Link::new(&[1, 2]);
        guard.tap(|p| link.send(p));
        assert!(!guard.tap(|p| link.send(p)));
        assert_eq!(link.count, 3);
        assert!(guard.is_owed());
    }

    #[test]
    fn clear_drops_the_debt() {
        let mut guard = ReleaseGuard::new();
        let mut link = Link::new(&[1]);
        guard.tap(|p| link.send(p));
        guard.clear();
        assert_eq!(guard, ReleaseGuard::default());
    }
}
