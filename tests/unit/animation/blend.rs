use super::*;
use crate::animation::random::ScriptedRandom;

#[test]
fn factor_increases_by_exactly_one_step_until_swap() {
    let rules = BlendRules::default();
    let mut rng = ScriptedRandom::new(vec![2, 50]);
    let mut st = BlendState::new(Rgba32::BLUE, Rgba32::RED);

    for tick in 1..=10u16 {
        assert!(!st.step(&rules, &mut rng));
        assert_eq!(st.factor, BlendFactor(tick * 100));
        assert!(st.factor.0 <= rules.threshold);
    }
    assert_eq!(st.displayed(), Rgba32::RED);
    assert_eq!(rng.drawn(), 0);

    assert!(st.step(&rules, &mut rng));
    assert_eq!(st.factor, BlendFactor::ZERO);
    assert_eq!(st.current, Rgba32::RED);
    assert_eq!(st.displayed(), Rgba32::RED);
    assert_eq!(st.target, Rgba32::ORANGE.with_alpha(82));
    assert_eq!(rng.drawn(), 2);
}

#[test]
fn large_steps_still_reset_below_threshold() {
    let rules = BlendRules::from_f32(0.3, 1.1);
    let mut rng = ScriptedRandom::new(vec![0]);
    let mut st = BlendState::new(Rgba32::BLUE, Rgba32::RED);
    let mut swaps = 0;
    for _ in 0..40 {
        if st.step(&rules, &mut rng) {
            swaps += 1;
        }
        assert!(st.factor.0 < rules.threshold);
    }
    assert_eq!(swaps, 10);
}

#[test]
fn float_conversion_rounds_to_milli_units() {
    assert_eq!(BlendFactor::from_f32(0.1), BlendFactor(100));
    assert_eq!(BlendFactor::from_f32(1.1), BlendFactor(1100));
    assert_eq!(BlendFactor(250).as_f32(), 0.25);
    assert_eq!(BlendFactor::ONE.to_u8(), 255);
    assert_eq!(BlendFactor(1100).to_u8(), 255);
    assert_eq!(BlendFactor::ZERO.to_u8(), 0);
}
