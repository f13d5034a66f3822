use super::*;
use crate::assets::color::Rgb565;
use crate::panel::simulated::{SimulatedPanel, SimulatedPanelOpts};

/// Completes every transfer before `flush` returns.
struct InstantPanel {
    size: Size16,
    areas: Vec<PanelArea>,
}

impl Panel for InstantPanel {
    fn size(&self) -> Size16 {
        self.size
    }

    fn flush(
        &mut self,
        area: PanelArea,
        buffer: TransferBuffer,
        done: &FlushCompletion,
    ) -> WarholResult<()> {
        assert_eq!(buffer.filled().len(), area.byte_len());
        self.areas.push(area);
        done.notify(buffer);
        Ok(())
    }
}

fn instant(w: u16, h: u16) -> InstantPanel {
    InstantPanel {
        size: Size16::new(w, h),
        areas: Vec::new(),
    }
}

#[test]
fn rejects_buffers_smaller_than_a_row() {
    assert!(FlushPipeline::new(instant(320, 240), 639).is_err());
    assert!(FlushPipeline::new(instant(320, 240), 640).is_ok());
}

#[test]
fn full_screen_splits_into_bands() {
    let mut p = FlushPipeline::new(instant(320, 240), 320 * 60 * 2).unwrap();
    assert_eq!(p.rows_per_band(320), 60);

    let mut bands = Vec::new();
    p.present(Rect16::new(0, 0, 319, 239), |c| bands.push(c.area()))
        .unwrap();
    assert_eq!(
        bands,
        vec![
            Rect16::new(0, 0, 319, 59),
            Rect16::new(0, 60, 319, 119),
            Rect16::new(0, 120, 319, 179),
            Rect16::new(0, 180, 319, 239),
        ]
    );
    assert_eq!(
        p.panel().areas[3],
        PanelArea {
            x1: 0,
            y1: 180,
            x2: 320,
            y2: 240
        }
    );
    assert_eq!(p.stats().bands, 4);
    assert_eq!(p.stats().frames, 1);
}

#[test]
fn narrow_regions_get_taller_bands_and_a_short_tail() {
    let mut p = FlushPipeline::new(instant(320, 240), 100 * 2 * 7).unwrap();
    let mut bands = Vec::new();
    p.present(Rect16::new(10, 5, 109, 20), |c| bands.push(c.area()))
        .unwrap();
    assert_eq!(
        bands,
        vec![
            Rect16::new(10, 5, 109, 11),
            Rect16::new(10, 12, 109, 18),
            Rect16::new(10, 19, 109, 20),
        ]
    );
}

#[test]
fn regions_are_clipped_to_the_panel() {
    let mut p = FlushPipeline::new(instant(32, 16), 32 * 2 * 16).unwrap();
    let mut bands = Vec::new();
    p.present(Rect16::new(-5, -5, 100, 3), |c| bands.push(c.area()))
        .unwrap();
    assert_eq!(bands, vec![Rect16::new(0, 0, 31, 3)]);

    p.present(Rect16::new(40, 40, 50, 50), |_| panic!("painted offscreen"))
        .unwrap();
    assert_eq!(p.stats().bands, 1);
}

#[test]
fn slow_panel_forces_waits_and_preserves_content() {
    let opts = SimulatedPanelOpts {
        latency: Duration::from_millis(5),
    };
    let panel = SimulatedPanel::new(Size16::new(16, 12), opts).unwrap();
    let mut p = FlushPipeline::new(panel, 16 * 2 * 3).unwrap();

    p.present(Rect16::new(0, 0, 15, 11), |c| {
        let area = c.area();
        let shade = Rgb565(area.y1 as u16 * 0x0101);
        c.fill(area, shade);
    })
    .unwrap();
    assert!(p.stats().waits >= 1);
    p.wait_idle().unwrap();
    assert_eq!(p.in_flight(), 0);

    let gram = p.panel().snapshot().unwrap();
    assert_eq!(gram.pixel(0, 0), Some(Rgb565(0)));
    assert_eq!(gram.pixel(15, 4), Some(Rgb565(3 * 0x0101)));
    assert_eq!(gram.pixel(7, 11), Some(Rgb565(9 * 0x0101)));
    assert_eq!(p.panel().transfers(), 4);
}
