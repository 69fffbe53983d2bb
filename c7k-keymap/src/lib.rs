//! Chord decoding for the c7k seven-key chorded keyboard.
//!
//! This crate is `no_std`-compatible so it can be used by both the AVR
//! firmware and the native CLI tool.
//!
//! Each poll tick the raw key sample goes through:
//! 1. [`Combo::from_sample`] - canonical set of held keys
//! 2. [`DebounceGate`] - a combo counts once it has been held long enough
//! 3. [`Dispatcher`] + [`LayerState`] - triggers, mouse and modifier layers,
//!    base chord table
//!
//! and yields at most one [`Action`]. [`ChordEngine`] bundles the three,
//! [`Controller`] runs the engine against a [`Device`].

#![no_std]

pub mod combo;
pub mod controller;
pub mod debounce;
pub mod device;
pub mod dispatch;
pub mod engine;
pub mod keycode;
pub mod layer;
pub mod status;
pub mod table;
pub mod tap;

/// Milliseconds from a free-running clock. Differences use wrapping math.
pub type Millis = u32;

pub use combo::{Combo, KeyIndex, Sample, KEY_COUNT};
pub use controller::Controller;
pub use debounce::DebounceGate;
pub use device::{Clock, Device, InputSampler, OutputSink, StatusDisplay};
pub use dispatch::{Action, Dispatcher};
pub use engine::{ChordEngine, Dispatch, Timing};
pub use keycode::{Keycode, ModifierKind};
pub use layer::{Layer, LayerState};
pub use status::Status;
pub use table::{ChordTable, ConfigError};
pub use tap::ReleaseGuard;
