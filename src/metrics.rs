use crate::error::Result;
use crate::scale::{apply_factor, ScaleManager};

/// Every pixel metric the stylesheet and the shell need, computed once per
/// display size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    pub scale_factor: f64,
    pub font_size: i32,
    pub font_size_small: i32,
    pub font_size_large: i32,
    pub font_size_title: i32,
    pub lyric_font_size: i32,
    pub lyric_current_font_size: i32,
    pub icon_size: i32,
    pub icon_size_small: i32,
    pub padding: i32,
    pub padding_small: i32,
    pub margin: i32,
    pub margin_small: i32,
    pub radius: i32,
    pub radius_large: i32,
    pub sidebar_width: i32,
    pub nav_height: i32,
    pub row_height: i32,
    pub header_height: i32,
    pub player_bar_height: i32,
    pub button_height: i32,
    pub control_button_size: i32,
    pub play_button_size: i32,
    pub slider_groove: i32,
    pub slider_handle: i32,
    pub slider_groove_radius: i32,
    pub slider_handle_radius: i32,
    pub slider_handle_offset: i32,
    pub control_button_radius: i32,
    pub play_button_radius: i32,
    pub scrollbar_width: i32,
    pub scrollbar_radius: i32,
    pub input_height: i32,
    pub menu_item_height: i32,
    pub dialog_min_width: i32,
}

impl Metrics {
    pub fn compute(scale: &ScaleManager, screen_width: i32, screen_height: i32) -> Result<Self> {
        let factor = scale.scale_factor(screen_width, screen_height)?;
        Ok(Self::from_factor(scale, factor))
    }

    /// Metrics for an already computed scale factor.
    pub fn from_factor(scale: &ScaleManager, factor: f64) -> Self {
        let size = |base: u32| apply_factor(base, factor);
        let slider_groove = size(4);
        let slider_handle = size(14);
        let control_button_size = size(40);
        let play_button_size = size(48);
        let scrollbar_width = size(8);

        Self {
            scale_factor: factor,
            font_size: size(scale.base_font_size()),
            font_size_small: size(12),
            font_size_large: size(18),
            font_size_title: size(24),
            lyric_font_size: size(16),
            lyric_current_font_size: size(20),
            icon_size: size(scale.base_icon_size()),
            icon_size_small: size(16),
            padding: size(scale.base_padding()),
            padding_small: size(5),
            margin: size(scale.base_margin()),
            margin_small: size(5),
            radius: size(6),
            radius_large: size(10),
            sidebar_width: size(220),
            nav_height: size(40),
            row_height: size(36),
            header_height: size(32),
            player_bar_height: size(80),
            button_height: size(32),
            control_button_size,
            play_button_size,
            slider_groove,
            slider_handle,
            slider_groove_radius: slider_groove / 2,
            slider_handle_radius: slider_handle / 2,
            slider_handle_offset: (slider_handle - slider_groove) / 2,
            control_button_radius: control_button_size / 2,
            play_button_radius: play_button_size / 2,
            scrollbar_width,
            scrollbar_radius: scrollbar_width / 2,
            input_height: size(32),
            menu_item_height: size(28),
            dialog_min_width: size(420),
        }
    }

    /// Looks up an integer metric by its template name.
    pub fn get(&self, name: &str) -> Option<i32> {
        Some(match name {
            "font_size" => self.font_size,
            "font_size_small" => self.font_size_small,
            "font_size_large" => self.font_size_large,
            "font_size_title" => self.font_size_title,
            "lyric_font_size" => self.lyric_font_size,
            "lyric_current_font_size" => self.lyric_current_font_size,
            "icon_size" => self.icon_size,
            "icon_size_small" => self.icon_size_small,
            "padding" => self.padding,
            "padding_small" => self.padding_small,
            "margin" => self.margin,
            "margin_small" => self.margin_small,
            "radius" => self.radius,
            "radius_large" => self.radius_large,
            "sidebar_width" => self.sidebar_width,
            "nav_height" => self.nav_height,
            "row_height" => self.row_height,
            "header_height" => self.header_height,
            "player_bar_height" => self.player_bar_height,
            "button_height" => self.button_height,
            "control_button_size" => self.control_button_size,
            "play_button_size" => self.play_button_size,
            "slider_groove" => self.slider_groove,
            "slider_handle" => self.slider_handle,
            "slider_groove_radius" => self.slider_groove_radius,
            "slider_handle_radius" => self.slider_handle_radius,
            "slider_handle_offset" => self.slider_handle_offset,
            "control_button_radius" => self.control_button_radius,
            "play_button_radius" => self.play_button_radius,
            "scrollbar_width" => self.scrollbar_width,
            "scrollbar_radius" => self.scrollbar_radius,
            "input_height" => self.input_height,
            "menu_item_height" => self.menu_item_height,
            "dialog_min_width" => self.dialog_min_width,
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_metrics_equal_base_values() {
        let metrics = Metrics::compute(&ScaleManager::new(), 1920, 1080).unwrap();
        assert_eq!(metrics.scale_factor, 1.0);
        assert_eq!(metrics.font_size, 14);
        assert_eq!(metrics.padding, 10);
        assert_eq!(metrics.padding_small, 5);
        assert_eq!(metrics.sidebar_width, 220);
        assert_eq!(metrics.get("player_bar_height"), Some(80));
        assert_eq!(metrics.slider_handle_offset, 5);
        assert_eq!(metrics.get("play_button_radius"), Some(24));
        assert_eq!(metrics.get("nope"), None);
    }

    #[test]
    fn metrics_follow_scale_manager() {
        let scale = ScaleManager::new();
        let metrics = Metrics::compute(&scale, 3840, 2160).unwrap();
        assert_eq!(metrics.font_size, scale.scaled_font_size(3840, 2160).unwrap());
        assert_eq!(metrics.icon_size, 36);
        assert_eq!(metrics.sidebar_width, 330);
        assert_eq!(metrics.get("radius"), Some(9));
    }

    #[test]
    fn from_factor_matches_compute() {
        let scale = ScaleManager::new();
        let factor = scale.scale_factor(2560, 1440).unwrap();
        assert_eq!(
            Metrics::from_factor(&scale, factor),
            Metrics::compute(&scale, 2560, 1440).unwrap()
        );
        assert_eq!(
            Metrics::from_factor(&scale, factor).padding,
            scale.scaled_padding(2560, 1440, None).unwrap()
        );
    }

    #[test]
    fn invalid_display_fails() {
        assert!(Metrics::compute(&ScaleManager::new(), 0, 0).is_err());
    }
}
