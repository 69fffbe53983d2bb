use c7k_keymap::{ChordEngine, ChordTable, Combo, Sample, Timing, KEY_COUNT};
use proptest::prelude::*;

fn sample_strategy() -> impl Strategy<Value = Sample> {
    prop::array::uniform7(any::<bool>())
}

proptest! {
    #[test]
    fn extraction_is_deterministic(sample in sample_strategy()) {
        prop_assert_eq!(Combo::from_sample(&sample), Combo::from_sample(&sample));
    }

    #[test]
    fn extraction_ignores_key_order(keys in prop::collection::vec(0u8..KEY_COUNT as u8, 0..12)) {
        let mut shuffled = keys.clone();
        shuffled.reverse();
        shuffled.sort_unstable_by_key(|k| (k * 5) % 7);

        let mut sample = [false; KEY_COUNT];
        for &k in &keys {
            sample[k as usize] = true;
        }
        prop_assert_eq!(Combo::of(&keys), Combo::of(&shuffled));
        prop_assert_eq!(Combo::from_sample(&sample), Combo::of(&keys));
    }

    #[test]
    fn extracted_keys_are_sorted_and_unique(sample in sample_strategy()) {
        let keys: Vec<u8> = Combo::from_sample(&sample).keys().collect();
        prop_assert!(keys.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(keys.len(), sample.iter().filter(|&&p| p).count());
    }

    /// Random sample streams never leave both layers armed and never
    /// dispatch two actions for one uninterrupted hold of the same combo.
    #[test]
    fn random_streams_keep_invariants(
        samples in prop::collection::vec(sample_strategy(), 1..80),
        poll in 1u32..80,
    ) {
        let table = ChordTable::builtin().unwrap();
        let mut engine = ChordEngine::new(&table, Timing::DEFAULT);
        let mut now = 0u32;
        let mut previous: Option<Combo> = None;
        for sample in &samples {
            let combo = Combo::from_sample(sample);
            let dispatched = engine.tick(sample, now);
            let layers = engine.layers();
            prop_assert!(!(layers.mouse_armed() && layers.modifier_armed()));
            prop_assert!(layers.held_modifier().is_none() || layers.modifier_armed());
            if dispatched.is_some() {
                prop_assert_ne!(previous, Some(combo));
                previous = Some(combo);
            }
            if combo.is_empty() {
                previous = None;
            }
            now += poll;
        }
    }
}
