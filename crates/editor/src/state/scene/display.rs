//! Display helpers for skeletons and the canvas

use shared::Skeleton;

/// Get display name for a skeleton
pub fn skeleton_display_name(skeleton: &Skeleton) -> String {
    format!("Pose ({})", short_id(&skeleton.group_id))
}

/// First 8 characters of an id
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

/// On-screen scale for the canvas; never applied to stored coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayScale {
    pub ratio: f64,
}

impl Default for DisplayScale {
    fn default() -> Self {
        Self { ratio: 1.0 }
    }
}

impl DisplayScale {
    /// Largest ratio at which the canvas fits inside the available area
    pub fn fit(canvas_width: u32, canvas_height: u32, available: (f64, f64)) -> Self {
        if canvas_width == 0 || canvas_height == 0 || available.0 <= 0.0 || available.1 <= 0.0 {
            return Self::default();
        }
        let ratio = (available.0 / canvas_width as f64).min(available.1 / canvas_height as f64);
        Self { ratio }
    }

    /// Pixel size of the displayed canvas
    pub fn display_size(&self, canvas_width: u32, canvas_height: u32) -> (f64, f64) {
        (canvas_width as f64 * self.ratio, canvas_height as f64 * self.ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("0123456789abcdef"), "01234567");
        assert_eq!(short_id("abc"), "abc");
    }

    #[test]
    fn test_fit_limited_by_height() {
        let d = DisplayScale::fit(512, 1024, (800.0, 600.0));
        assert!((d.ratio - 600.0 / 1024.0).abs() < 1e-12);
        let (w, h) = d.display_size(512, 1024);
        assert!((h - 600.0).abs() < 1e-9);
        assert!(w < 800.0);
    }

    #[test]
    fn test_fit_degenerate_area() {
        assert_eq!(DisplayScale::fit(512, 512, (0.0, 100.0)), DisplayScale::default());
    }
}
