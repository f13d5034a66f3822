use super::*;
use crate::animation::random::RngSource;
use crate::assets::decode::PopArtBackground;
use crate::foundation::config::RefreshVariant;
use crate::foundation::core::Size16;
use crate::panel::simulated::{SimulatedPanel, SimulatedPanelOpts};
use crate::render::compositor::DrawState;

fn small_config(variant: RefreshVariant) -> DisplayConfig {
    DisplayConfig {
        width: 64,
        height: 48,
        block_size: 10,
        transfer_buffer_bytes: 64 * 2 * 8,
        variant,
        ..DisplayConfig::default()
    }
}

fn session(cfg: &DisplayConfig) -> DisplaySession<SimulatedPanel> {
    let panel = SimulatedPanel::new(cfg.size(), SimulatedPanelOpts::default()).unwrap();
    DisplaySession::from_config(
        cfg,
        panel,
        Box::new(PopArtBackground),
        Box::new(RngSource::seeded(3)),
    )
    .unwrap()
}

#[test]
fn runs_frames_in_bands() {
    for variant in [RefreshVariant::Synchronous, RefreshVariant::Background] {
        let cfg = small_config(variant);
        let mut s = session(&cfg);
        let stats = s.run(5).unwrap();
        assert_eq!(stats.frames, 5);
        assert_eq!(stats.flush.frames, 5);
        assert_eq!(stats.flush.bands, 30);
        assert_eq!(s.panel().transfers(), 30);
        assert_eq!(s.screen().control().state(), DrawState::Animating);
        assert_eq!(s.pacer().total_frames(), 5);
    }
}

#[test]
fn rejects_mismatched_panel() {
    let cfg = small_config(RefreshVariant::Synchronous);
    let panel = SimulatedPanel::new(Size16::new(32, 48), SimulatedPanelOpts::default()).unwrap();
    let err = DisplaySession::from_config(
        &cfg,
        panel,
        Box::new(PopArtBackground),
        Box::new(RngSource::seeded(3)),
    )
    .unwrap_err();
    assert!(err.to_string().contains("32x48"), "{err}");
}

#[test]
fn rejects_invalid_config() {
    let cfg = DisplayConfig {
        block_count: 0,
        ..small_config(RefreshVariant::Synchronous)
    };
    let panel = SimulatedPanel::new(cfg.size(), SimulatedPanelOpts::default()).unwrap();
    assert!(
        DisplaySession::from_config(
            &cfg,
            panel,
            Box::new(PopArtBackground),
            Box::new(RngSource::seeded(3)),
        )
        .is_err()
    );
}

#[test]
fn starved_bulk_pool_keeps_drawing_the_background() {
    let cfg = DisplayConfig {
        bulk_pool_bytes: 1024,
        background_rgb565: 0x07e0,
        ..small_config(RefreshVariant::Background)
    };
    let mut s = session(&cfg);
    s.run(3).unwrap();
    assert_eq!(s.screen().control().state(), DrawState::Uninitialized);
    assert_eq!(s.screen().control().init_failures(), 3);

    let gram = s.panel().snapshot().unwrap();
    assert!(
        (0..48).all(|y| (0..64).all(|x| gram.pixel(x, y) == Some(crate::assets::color::Rgb565(0x07e0))))
    );
}
