//! Resolution-relative UI scaling.
//!
//! A single dimensionless factor is derived from the ratio between the host
//! display diagonal and the reference diagonal (1920x1080), clamped to
//! [`MIN_SCALE`, `MAX_SCALE`]. Every pixel metric of the UI is a base value
//! multiplied by that factor and truncated toward zero.

use crate::error::{Error, Result};

pub const MIN_SCALE: f64 = 0.8;
pub const MAX_SCALE: f64 = 1.5;

pub const DEFAULT_BASE_WIDTH: u32 = 1920;
pub const DEFAULT_BASE_HEIGHT: u32 = 1080;
pub const DEFAULT_FONT_SIZE: u32 = 14;
pub const DEFAULT_ICON_SIZE: u32 = 24;
pub const DEFAULT_PADDING: u32 = 10;
pub const DEFAULT_MARGIN: u32 = 10;

/// Reference resolution and reference metrics.
///
/// Holds no cached state: every query recomputes from its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleManager {
    base_width: u32,
    base_height: u32,
    base_font_size: u32,
    base_icon_size: u32,
    base_padding: u32,
    base_margin: u32,
}

impl Default for ScaleManager {
    fn default() -> Self {
        Self {
            base_width: DEFAULT_BASE_WIDTH,
            base_height: DEFAULT_BASE_HEIGHT,
            base_font_size: DEFAULT_FONT_SIZE,
            base_icon_size: DEFAULT_ICON_SIZE,
            base_padding: DEFAULT_PADDING,
            base_margin: DEFAULT_MARGIN,
        }
    }
}

impl ScaleManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the reference resolution. Both sides must be positive.
    pub fn with_base_resolution(mut self, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension {
                width: width.into(),
                height: height.into(),
            });
        }
        self.base_width = width;
        self.base_height = height;
        Ok(self)
    }

    pub fn with_base_metrics(
        mut self,
        font_size: u32,
        icon_size: u32,
        padding: u32,
        margin: u32,
    ) -> Self {
        self.base_font_size = font_size;
        self.base_icon_size = icon_size;
        self.base_padding = padding;
        self.base_margin = margin;
        self
    }

    pub fn base_resolution(&self) -> (u32, u32) {
        (self.base_width, self.base_height)
    }

    pub fn base_font_size(&self) -> u32 {
        self.base_font_size
    }

    pub fn base_icon_size(&self) -> u32 {
        self.base_icon_size
    }

    pub fn base_padding(&self) -> u32 {
        self.base_padding
    }

    pub fn base_margin(&self) -> u32 {
        self.base_margin
    }

    /// `clamp(diag(w, h) / diag(base_w, base_h), 0.8, 1.5)`.
    pub fn scale_factor(&self, screen_width: i32, screen_height: i32) -> Result<f64> {
        if screen_width <= 0 || screen_height <= 0 {
            return Err(Error::InvalidDimension {
                width: screen_width.into(),
                height: screen_height.into(),
            });
        }
        let screen = diagonal(f64::from(screen_width), f64::from(screen_height));
        let base = diagonal(f64::from(self.base_width), f64::from(self.base_height));
        Ok((screen / base).clamp(MIN_SCALE, MAX_SCALE))
    }

    pub fn scaled_font_size(&self, screen_width: i32, screen_height: i32) -> Result<i32> {
        self.scaled(self.base_font_size, screen_width, screen_height)
    }

    pub fn scaled_icon_size(&self, screen_width: i32, screen_height: i32) -> Result<i32> {
        self.scaled(self.base_icon_size, screen_width, screen_height)
    }

    /// Scaled padding; `base` overrides the configured base padding.
    pub fn scaled_padding(
        &self,
        screen_width: i32,
        screen_height: i32,
        base: Option<u32>,
    ) -> Result<i32> {
        self.scaled(
            base.unwrap_or(self.base_padding),
            screen_width,
            screen_height,
        )
    }

    /// Scaled margin; `base` overrides the configured base margin.
    pub fn scaled_margin(
        &self,
        screen_width: i32,
        screen_height: i32,
        base: Option<u32>,
    ) -> Result<i32> {
        self.scaled(base.unwrap_or(self.base_margin), screen_width, screen_height)
    }

    pub fn scaled_size(&self, base_value: u32, screen_width: i32, screen_height: i32) -> Result<i32> {
        self.scaled(base_value, screen_width, screen_height)
    }

    fn scaled(&self, base_value: u32, screen_width: i32, screen_height: i32) -> Result<i32> {
        let factor = self.scale_factor(screen_width, screen_height)?;
        Ok(apply_factor(base_value, factor))
    }
}

/// Truncates toward zero; metrics are whole pixels.
pub fn apply_factor(base_value: u32, factor: f64) -> i32 {
    (f64::from(base_value) * factor) as i32
}

fn diagonal(width: f64, height: f64) -> f64 {
    width.hypot(height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_resolution_is_a_fixed_point() {
        let scale = ScaleManager::new();
        assert_eq!(scale.scale_factor(1920, 1080).unwrap(), 1.0);
        assert_eq!(scale.scaled_font_size(1920, 1080).unwrap(), 14);
    }

    #[test]
    fn large_displays_clamp_to_upper_bound() {
        let scale = ScaleManager::new();
        assert_eq!(scale.scale_factor(3840, 2160).unwrap(), MAX_SCALE);
        assert_eq!(scale.scaled_font_size(3840, 2160).unwrap(), 21);
    }

    #[test]
    fn small_displays_clamp_to_lower_bound() {
        let scale = ScaleManager::new();
        assert_eq!(scale.scale_factor(960, 540).unwrap(), MIN_SCALE);
        assert_eq!(scale.scaled_padding(960, 540, None).unwrap(), 8);
    }

    #[test]
    fn intermediate_resolution_truncates() {
        let scale = ScaleManager::new();
        let factor = scale.scale_factor(2560, 1440).unwrap();
        assert!((factor - 4.0 / 3.0).abs() < 1e-12);
        // 14 * 1.333.. = 18.66..
        assert_eq!(scale.scaled_font_size(2560, 1440).unwrap(), 18);
        assert_eq!(scale.scaled_icon_size(3840, 2160).unwrap(), 36);
    }

    #[test]
    fn optional_overrides_replace_configured_base() {
        let scale = ScaleManager::new();
        assert_eq!(scale.scaled_padding(3840, 2160, Some(4)).unwrap(), 6);
        assert_eq!(scale.scaled_margin(3840, 2160, Some(20)).unwrap(), 30);
        assert_eq!(scale.scaled_margin(3840, 2160, None).unwrap(), 15);
        assert_eq!(scale.scaled_size(220, 3840, 2160).unwrap(), 330);
    }

    #[test]
    fn rejects_non_positive_dimensions() {
        let scale = ScaleManager::new();
        for (w, h) in [(0, 1080), (1920, 0), (-1, 1080), (1920, -5)] {
            assert!(matches!(
                scale.scale_factor(w, h),
                Err(Error::InvalidDimension { .. })
            ));
            assert!(scale.scaled_font_size(w, h).is_err());
        }
    }

    #[test]
    fn custom_base_resolution() {
        let scale = ScaleManager::new()
            .with_base_resolution(1280, 720)
            .unwrap();
        assert_eq!(scale.scale_factor(1280, 720).unwrap(), 1.0);
        assert!((scale.scale_factor(1920, 1080).unwrap() - 1.5).abs() < 1e-12);
        assert!(ScaleManager::new().with_base_resolution(0, 720).is_err());
    }
}
