use crate::assets::color::Rgb565;
use crate::foundation::core::{Point16, Rect16, Size16};
use crate::foundation::error::{WarholError, WarholResult};
use crate::panel::flush::{FlushPipeline, Panel};
use crate::render::compositor::Drawable;

/// A screen with one registered control, a background color, and a dirty region.
#[derive(Debug)]
pub struct Screen<D: Drawable> {
    bounds: Rect16,
    background: Rgb565,
    control: D,
    dirty: Option<Rect16>,
}

impl<D: Drawable> Screen<D> {
    /// Screen of `size` showing `control` over `background`.
    pub fn new(size: Size16, background: Rgb565, control: D) -> WarholResult<Self> {
        let bounds = size.bounds()?;
        if !bounds.intersects(control.bounds()) {
            return Err(WarholError::validation(format!(
                "control at {:?} lies outside the {}x{} screen",
                control.bounds(),
                size.width,
                size.height
            )));
        }
        Ok(Self {
            bounds,
            background,
            control,
            dirty: None,
        })
    }

    /// Mark the whole control for repaint.
    pub fn invalidate(&mut self) {
        if let Some(r) = self.control.bounds().intersection(self.bounds) {
            self.invalidate_rect(r);
        }
    }

    /// Mark `rect` for repaint.
    pub fn invalidate_rect(&mut self, rect: Rect16) {
        let Some(r) = rect.intersection(self.bounds) else {
            return;
        };
        self.dirty = Some(match self.dirty {
            Some(d) => d.union(r),
            None => r,
        });
    }

    /// Region awaiting repaint.
    pub fn dirty(&self) -> Option<Rect16> {
        self.dirty
    }

    /// Repaint the dirty region through `flush`. Returns `false` when nothing was dirty.
    ///
    /// Each band is cleared to the background color before the control paints into it.
    pub fn update<P: Panel>(&mut self, flush: &mut FlushPipeline<P>) -> WarholResult<bool> {
        let Some(dirty) = self.dirty.take() else {
            return Ok(false);
        };
        self.control.on_before_paint();
        let control = &self.control;
        let background = self.background;
        let control_bounds = control.bounds();
        flush.present(dirty, |canvas| {
            let band = canvas.area();
            canvas.fill(band, background);
            if let Some(clip) = band.intersection(control_bounds) {
                control.on_paint(canvas, clip);
            }
        })?;
        self.control.on_after_paint();
        Ok(true)
    }

    /// Route touch points that land on the control. Returns `true` when handled.
    pub fn touch(&mut self, points: &[Point16]) -> bool {
        let bounds = self.control.bounds();
        if !points.iter().any(|p| bounds.contains(*p)) {
            return false;
        }
        self.control.on_touch(points)
    }

    /// Screen rectangle.
    pub fn bounds(&self) -> Rect16 {
        self.bounds
    }

    /// The registered control.
    pub fn control(&self) -> &D {
        &self.control
    }

    /// The registered control, mutably.
    pub fn control_mut(&mut self) -> &mut D {
        &mut self.control
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/screen.rs"]
mod tests;
