use super::*;
use crate::panel::simulated::{SimulatedPanel, SimulatedPanelOpts};
use crate::render::surface::Canvas;

#[derive(Debug)]
struct Swatch {
    bounds: Rect16,
    color: Rgb565,
    before: u32,
    after: u32,
    touches: u32,
}

impl Swatch {
    fn new(bounds: Rect16, color: Rgb565) -> Self {
        Self {
            bounds,
            color,
            before: 0,
            after: 0,
            touches: 0,
        }
    }
}

impl Drawable for Swatch {
    fn bounds(&self) -> Rect16 {
        self.bounds
    }

    fn on_before_paint(&mut self) {
        self.before += 1;
    }

    fn on_paint(&self, canvas: &mut Canvas<'_>, clip: Rect16) {
        assert!(self.bounds.intersection(clip) == Some(clip));
        canvas.fill(clip, self.color);
    }

    fn on_after_paint(&mut self) {
        self.after += 1;
    }

    fn on_touch(&mut self, _points: &[Point16]) -> bool {
        self.touches += 1;
        true
    }
}

fn pipeline(w: u16, h: u16, rows: usize) -> FlushPipeline<SimulatedPanel> {
    let panel = SimulatedPanel::new(Size16::new(w, h), SimulatedPanelOpts::default()).unwrap();
    FlushPipeline::new(panel, usize::from(w) * 2 * rows).unwrap()
}

#[test]
fn update_paints_background_then_control() {
    let swatch = Swatch::new(Rect16::new(2, 2, 5, 5), Rgb565::WHITE);
    let mut screen = Screen::new(Size16::new(8, 8), Rgb565(0x001f), swatch).unwrap();
    let mut flush = pipeline(8, 8, 3);

    screen.invalidate_rect(screen.bounds());
    assert!(screen.update(&mut flush).unwrap());
    flush.wait_idle().unwrap();

    let gram = flush.panel().snapshot().unwrap();
    assert_eq!(gram.pixel(0, 0), Some(Rgb565(0x001f)));
    assert_eq!(gram.pixel(7, 7), Some(Rgb565(0x001f)));
    assert_eq!(gram.pixel(2, 2), Some(Rgb565::WHITE));
    assert_eq!(gram.pixel(5, 5), Some(Rgb565::WHITE));
    assert_eq!(screen.control().before, 1);
    assert_eq!(screen.control().after, 1);
}

#[test]
fn clean_screen_skips_the_frame() {
    let swatch = Swatch::new(Rect16::new(0, 0, 3, 3), Rgb565::WHITE);
    let mut screen = Screen::new(Size16::new(4, 4), Rgb565::BLACK, swatch).unwrap();
    let mut flush = pipeline(4, 4, 4);
    assert!(!screen.update(&mut flush).unwrap());
    assert_eq!(screen.control().before, 0);
    assert_eq!(flush.stats().bands, 0);
}

#[test]
fn invalidation_accumulates_until_update() {
    let swatch = Swatch::new(Rect16::new(0, 0, 9, 9), Rgb565::WHITE);
    let mut screen = Screen::new(Size16::new(20, 20), Rgb565::BLACK, swatch).unwrap();
    screen.invalidate_rect(Rect16::new(1, 1, 2, 2));
    screen.invalidate_rect(Rect16::new(15, 4, 30, 6));
    assert_eq!(screen.dirty(), Some(Rect16::new(1, 1, 19, 6)));
    screen.invalidate_rect(Rect16::new(50, 50, 60, 60));
    assert_eq!(screen.dirty(), Some(Rect16::new(1, 1, 19, 6)));

    let mut flush = pipeline(20, 20, 20);
    screen.update(&mut flush).unwrap();
    assert_eq!(screen.dirty(), None);

    screen.invalidate();
    assert_eq!(screen.dirty(), Some(Rect16::new(0, 0, 9, 9)));
}

#[test]
fn touches_are_routed_only_when_they_hit_the_control() {
    let swatch = Swatch::new(Rect16::new(0, 0, 9, 9), Rgb565::WHITE);
    let mut screen = Screen::new(Size16::new(20, 20), Rgb565::BLACK, swatch).unwrap();
    assert!(!screen.touch(&[Point16::new(15, 15)]));
    assert!(screen.touch(&[Point16::new(15, 15), Point16::new(3, 3)]));
    assert_eq!(screen.control().touches, 1);
}

#[test]
fn control_must_overlap_the_screen() {
    let swatch = Swatch::new(Rect16::new(30, 30, 40, 40), Rgb565::WHITE);
    assert!(Screen::new(Size16::new(20, 20), Rgb565::BLACK, swatch).is_err());
}
