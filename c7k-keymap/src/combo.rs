//! Canonical key combinations.
//!
//! A combo is the set of keys held at one sampling instant. It is stored as
//! a 7-bit mask (bit `i` = key `i`), so equality is set equality and the
//! value can index a dense 128-entry lookup table directly.

use core::fmt;

/// Number of physical keys on the device.
pub const KEY_COUNT: usize = 7;

/// Number of distinct combos, including the empty one.
pub const COMBO_COUNT: usize = 1 << KEY_COUNT;

/// One raw read of every key line, true = pressed.
pub type Sample = [bool; KEY_COUNT];

/// Index of a physical key, `0..KEY_COUNT`.
pub type KeyIndex = u8;

/// Set of currently held keys.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Combo(u8);

impl Combo {
    /// No keys held.
    pub const EMPTY: Combo = Combo(0);

    /// Every key held at once.
    pub const ALL: Combo = Combo((COMBO_COUNT - 1) as u8);

    /// Build a combo from key indices. Order and duplicates do not matter.
    ///
    /// Panics if an index is out of range; meant for static tables, where
    /// that panic is a compile error.
    pub const fn of(keys: &[KeyIndex]) -> Combo {
        let mut mask = 0u8;
        let mut i = 0;
        while i < keys.len() {
            assert!((keys[i] as usize) < KEY_COUNT, "key index out of range");
            mask |= 1 << keys[i];
            i += 1;
        }
        Combo(mask)
    }

    /// Like [`Combo::of`] but rejects out-of-range indices instead of panicking.
    pub fn try_of(keys: &[KeyIndex]) -> Option<Combo> {
        keys.iter().try_fold(Combo::EMPTY, |combo, &key| {
            ((key as usize) < KEY_COUNT).then(|| Combo(combo.0 | 1 << key))
        })
    }

    /// Extract the combo from a raw sample.
    pub fn from_sample(sample: &Sample) -> Combo {
        let mask = sample
            .iter()
            .enumerate()
            .filter(|&(_, &pressed)| pressed)
            .fold(0u8, |mask, (i, _)| mask | 1 << i);
        Combo(mask)
    }

    /// Rebuild a combo from its mask. Bits above the key count are dropped.
    pub const fn from_bits(bits: u8) -> Combo {
        Combo(bits & Combo::ALL.0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of held keys.
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub const fn contains(self, key: KeyIndex) -> bool {
        (key as usize) < KEY_COUNT && self.0 & (1 << key) != 0
    }

    /// Held key indices, ascending.
    pub fn keys(self) -> impl Iterator<Item = KeyIndex> {
        (0..KEY_COUNT as KeyIndex).filter(move |&k| self.contains(k))
    }

    /// Inverse of [`Combo::from_sample`].
    pub fn to_sample(self) -> Sample {
        let mut sample = [false; KEY_COUNT];
        for key in self.keys() {
            sample[key as usize] = true;
        }
        sample
    }

    /// Every combo, the empty one first.
    pub fn all() -> impl Iterator<Item = Combo> {
        (0..COMBO_COUNT as u8).map(Combo)
    }
}

/// Formats as `0+1+5`, or `-` when empty.
impl fmt::Display for Combo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("-");
        }
        for (n, key) in self.keys().enumerate() {
            if n > 0 {
                f.write_str("+")?;
            }
            write!(f, "{key}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Combo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Combo({self})")
    }
}
