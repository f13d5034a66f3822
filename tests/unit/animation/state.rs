use super::*;
use crate::animation::blend::BlendFactor;
use crate::animation::random::{RngSource, ScriptedRandom};
use crate::assets::color::Rgba32;

fn screen() -> Rect16 {
    Rect16::new(0, 0, 319, 239)
}

fn assert_invariants(st: &AnimationState) {
    let inset = st.inset_bounds();
    for b in st.blocks() {
        assert!(inset.contains(b.position), "{:?} outside {:?}", b.position, inset);
        assert_ne!(b.velocity.x, 0);
        assert_ne!(b.velocity.y, 0);
        assert!((-2..=2).contains(&b.velocity.x));
        assert!((-2..=2).contains(&b.velocity.y));
        assert!(st.bounds().intersection(st.block_rect(b)) == Some(st.block_rect(b)));
    }
}

#[test]
fn blocks_stay_inside_inset_bounds_for_many_seeds() {
    let opts = AnimationOpts {
        block_count: 6,
        ..AnimationOpts::default()
    };
    for seed in 0..32u64 {
        let mut rng = RngSource::seeded(seed);
        let mut st = AnimationState::reset(screen(), &opts, &mut rng);
        assert_eq!(st.blocks().len(), 6);
        assert_invariants(&st);
        for _ in 0..600 {
            st.advance(&mut rng);
            assert_invariants(&st);
        }
    }
}

#[test]
fn reset_draws_in_documented_order() {
    // bg: idx, alpha, idx, alpha; block: x, y, dx (0 -> retry), dx, dy, alpha, idx, alpha
    let mut rng = ScriptedRandom::new(vec![4, 0, 5, 10, 70, 10, 2, 4, 0, 0, 1, 10]);
    let opts = AnimationOpts {
        block_count: 1,
        ..AnimationOpts::default()
    };
    let st = AnimationState::reset(screen(), &opts, &mut rng);
    assert_eq!(rng.drawn(), 12);

    let bg = st.background();
    assert_eq!(bg.current, Rgba32::GREEN.with_alpha(32));
    assert_eq!(bg.target, Rgba32::CYAN.with_alpha(42));
    assert_eq!(bg.factor, BlendFactor::ZERO);

    let b = st.blocks()[0];
    assert_eq!(b.position, Point16::new(100, 40));
    assert_eq!(b.velocity, Point16::new(2, -2));
    assert_eq!(b.color.current, Rgba32::BLUE.with_alpha(32));
    assert_eq!(b.color.target, Rgba32::RED.with_alpha(42));
}

#[test]
fn reset_reflects_a_first_step_that_would_leave_bounds() {
    // x = 0 % 260 + 30 = 30 with dx = -2 would step to 28.
    let mut rng = ScriptedRandom::new(vec![0, 0, 0, 0, 0, 90, 0, 4, 0, 0, 0]);
    let opts = AnimationOpts {
        block_count: 1,
        ..AnimationOpts::default()
    };
    let st = AnimationState::reset(screen(), &opts, &mut rng);
    let b = st.blocks()[0];
    assert_eq!(b.position, Point16::new(30, 120));
    assert_eq!(b.velocity, Point16::new(2, 2));
}

#[test]
fn background_only_moves_when_asked() {
    let mut rng = RngSource::seeded(7);
    let mut st = AnimationState::reset(screen(), &AnimationOpts::default(), &mut rng);
    let before = *st.background();
    for _ in 0..5 {
        st.advance(&mut rng);
    }
    assert_eq!(*st.background(), before);

    assert!(!st.advance_background(&mut rng));
    assert_eq!(st.background().factor, BlendFactor(100));
}

#[test]
fn zero_only_velocity_draws_fall_back_to_one() {
    // Every draw of 2 maps to a zero delta.
    let mut rng = ScriptedRandom::new(vec![2]);
    let opts = AnimationOpts {
        block_count: 2,
        ..AnimationOpts::default()
    };
    let st = AnimationState::reset(screen(), &opts, &mut rng);
    for b in st.blocks() {
        assert_eq!(b.position, Point16::new(32, 32));
        assert_eq!(b.velocity, Point16::new(1, 1));
    }
    assert_invariants(&st);
}
