//! Property-based tests for audio gain math.
//! Verifies invariants hold for ALL inputs, not just fixed examples.

use platform::audio_types::{Gain, VolumePercent};

proptest::proptest! {
    /// VolumePercent::new never panics for any u8 input (clamps to 100).
    #[test]
    fn volume_percent_new_never_panics(pct in 0u8..=255u8) {
        let v = VolumePercent::new(pct);
        assert!(v.get() <= 100);
    }

    /// Gain::new always lands inside [0.0, 1.0].
    #[test]
    fn gain_new_is_clamped(value in proptest::num::f32::ANY) {
        let g = Gain::new(value).get();
        assert!((0.0..=1.0).contains(&g));
    }

    /// Any sequence of steps keeps the gain in range and the percent <= 100.
    #[test]
    fn gain_steps_stay_in_range(start in 0.0f32..=1.0f32, ups in proptest::collection::vec(proptest::bool::ANY, 0..40)) {
        let mut g = Gain::new(start);
        for up in ups {
            g = g.step(if up { 0.1 } else { -0.1 });
            assert!((0.0..=1.0).contains(&g.get()));
            assert!(g.percent().get() <= 100);
        }
    }

    /// Higher gain never reports a lower percentage.
    #[test]
    fn percent_is_monotone(a in 0.0f32..=1.0f32, b in 0.0f32..=1.0f32) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        assert!(Gain::new(lo).percent() <= Gain::new(hi).percent());
    }

    /// Scaling never increases sample magnitude.
    #[test]
    fn apply_never_amplifies(sample in proptest::num::i16::ANY, value in 0.0f32..=1.0f32) {
        let out = Gain::new(value).apply(sample);
        assert!(i32::from(out).abs() <= i32::from(sample).abs());
    }
}
