/// Pixel ratio cap used when none is configured.
pub const DEFAULT_PIXEL_RATIO_CAP: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum ViewportError {
    #[error("viewport height is zero")]
    ZeroHeight,
    #[error("viewport width is zero")]
    ZeroWidth,
    #[error("pixel ratio must be finite and positive, got {0}")]
    InvalidPixelRatio(f32),
}

/// Output configuration for one window size.
///
/// `width` and `height` are logical pixels. A fresh value is produced on
/// every resize; nothing updates one in place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f32,
}

impl ViewportState {
    /// Width over height. Both are non-zero by construction.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Backing buffer size in device pixels, at least 1x1.
    pub fn drawing_buffer_size(&self) -> (u32, u32) {
        let scale = |v: u32| ((v as f32 * self.pixel_ratio).floor() as u32).max(1);
        (scale(self.width), scale(self.height))
    }
}

/// Computes [`ViewportState`] from window size and device pixel ratio,
/// capping the ratio to bound fill cost on dense displays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportAdapter {
    pub pixel_ratio_cap: f32,
}

impl Default for ViewportAdapter {
    fn default() -> Self {
        Self::new(DEFAULT_PIXEL_RATIO_CAP)
    }
}

impl ViewportAdapter {
    pub fn new(pixel_ratio_cap: f32) -> Self {
        Self { pixel_ratio_cap }
    }

    pub fn recompute(
        &self,
        window_width: u32,
        window_height: u32,
        raw_pixel_ratio: f32,
    ) -> Result<ViewportState, ViewportError> {
        Self::recompute_with_cap(window_width, window_height, raw_pixel_ratio, self.pixel_ratio_cap)
    }

    pub fn recompute_with_cap(
        window_width: u32,
        window_height: u32,
        raw_pixel_ratio: f32,
        pixel_ratio_cap: f32,
    ) -> Result<ViewportState, ViewportError> {
        if window_height == 0 {
            return Err(ViewportError::ZeroHeight);
        }
        if window_width == 0 {
            return Err(ViewportError::ZeroWidth);
        }
        for ratio in [raw_pixel_ratio, pixel_ratio_cap] {
            if !ratio.is_finite() || ratio <= 0.0 {
                return Err(ViewportError::InvalidPixelRatio(ratio));
            }
        }
        Ok(ViewportState {
            width: window_width,
            height: window_height,
            pixel_ratio: raw_pixel_ratio.min(pixel_ratio_cap),
        })
    }

    /// Same as [`recompute`](Self::recompute) for a physical window size, as
    /// reported by the windowing system alongside its scale factor.
    ///
    /// A non-zero physical dimension is never less than one logical pixel.
    pub fn from_physical(
        &self,
        physical_width: u32,
        physical_height: u32,
        scale_factor: f64,
    ) -> Result<ViewportState, ViewportError> {
        if !scale_factor.is_finite() || scale_factor <= 0.0 {
            return Err(ViewportError::InvalidPixelRatio(scale_factor as f32));
        }
        let logical = |v: u32| {
            if v == 0 {
                0
            } else {
                ((v as f64 / scale_factor).round() as u32).max(1)
            }
        };
        self.recompute(logical(physical_width), logical(physical_height), scale_factor as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cap_is_enforced() {
        let s = ViewportAdapter::recompute_with_cap(1920, 1080, 3.0, 2.0).unwrap();
        assert_eq!(s.pixel_ratio, 2.0);
    }

    #[test]
    fn ratio_below_cap_passes_through() {
        let s = ViewportAdapter::recompute_with_cap(800, 600, 1.0, 2.0).unwrap();
        assert_eq!(s.pixel_ratio, 1.0);
        assert_eq!((s.width, s.height), (800, 600));
    }

    #[test]
    fn aspect_is_width_over_height_and_idempotent() {
        let a = ViewportAdapter::recompute_with_cap(400, 200, 1.0, 2.0).unwrap();
        let b = ViewportAdapter::recompute_with_cap(400, 200, 1.0, 2.0).unwrap();
        assert_eq!(a.aspect(), 2.0);
        assert_eq!(a, b);
    }

    #[test]
    fn zero_height_is_an_error() {
        assert_eq!(
            ViewportAdapter::default().recompute(640, 0, 1.0),
            Err(ViewportError::ZeroHeight)
        );
        assert_eq!(
            ViewportAdapter::recompute_with_cap(0, 0, 1.0, 2.0),
            Err(ViewportError::ZeroHeight)
        );
    }

    #[test]
    fn bad_ratios_are_rejected() {
        for raw in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            assert!(matches!(
                ViewportAdapter::recompute_with_cap(10, 10, raw, 2.0),
                Err(ViewportError::InvalidPixelRatio(_))
            ));
        }
        assert!(ViewportAdapter::recompute_with_cap(10, 10, 1.0, 0.0).is_err());
    }

    #[test]
    fn adapter_uses_its_cap() {
        let s = ViewportAdapter::new(1.5).recompute(100, 100, 4.0).unwrap();
        assert_eq!(s.pixel_ratio, 1.5);
    }

    #[test]
    fn drawing_buffer_scales_and_floors() {
        let s = ViewportAdapter::recompute_with_cap(101, 50, 1.5, 2.0).unwrap();
        assert_eq!(s.drawing_buffer_size(), (151, 75));
        let tiny = ViewportState {
            width: 1,
            height: 1,
            pixel_ratio: 0.25,
        };
        assert_eq!(tiny.drawing_buffer_size(), (1, 1));
    }

    #[test]
    fn from_physical_converts_to_logical() {
        let adapter = ViewportAdapter::default();
        let s = adapter.from_physical(2880, 1800, 2.0).unwrap();
        assert_eq!((s.width, s.height, s.pixel_ratio), (1440, 900, 2.0));
        assert_eq!(s.drawing_buffer_size(), (2880, 1800));

        let dense = adapter.from_physical(3000, 1500, 3.0).unwrap();
        assert_eq!((dense.width, dense.height), (1000, 500));
        assert_eq!(dense.drawing_buffer_size(), (2000, 1000));

        assert_eq!(adapter.from_physical(0, 0, 1.0), Err(ViewportError::ZeroHeight));
        assert!(adapter.from_physical(10, 10, 0.0).is_err());
    }

    #[test]
    fn zero_width_is_an_error() {
        assert_eq!(
            ViewportAdapter::recompute_with_cap(0, 480, 1.0, 2.0),
            Err(ViewportError::ZeroWidth)
        );
        assert_eq!(
            ViewportAdapter::default().from_physical(0, 600, 2.0),
            Err(ViewportError::ZeroWidth)
        );
    }

    #[test]
    fn sliver_windows_keep_one_logical_pixel() {
        let adapter = ViewportAdapter::default();

        let short = adapter.from_physical(3, 1, 3.0).unwrap();
        assert_eq!((short.width, short.height), (1, 1));

        let narrow = adapter.from_physical(1, 600, 3.0).unwrap();
        assert_eq!((narrow.width, narrow.height), (1, 200));
        assert!(narrow.aspect() > 0.0 && narrow.aspect().is_finite());
        assert_eq!(narrow.drawing_buffer_size(), (2, 400));
    }
}
