use eframe::egui::{self, Color32, CornerRadius, FontId, Stroke, TextStyle, Vec2};

use soundstage::{Color, Metrics, Theme};

fn to_corner_radius(value: i32) -> CornerRadius {
    CornerRadius::same(value.clamp(0, u8::MAX as i32) as u8)
}

fn to_color32(color: Color) -> Color32 {
    let [r, g, b, a] = color.to_array();
    Color32::from_rgba_unmultiplied(r, g, b, a)
}

/// Palette lookup for the shell. Generation has already validated the
/// theme, so a miss only happens with the fallback path and paints magenta.
pub fn role(theme: &Theme, key: &str) -> Color32 {
    theme
        .color(key)
        .map(to_color32)
        .unwrap_or(Color32::from_rgb(255, 0, 255))
}

/// Composites a translucent overlay role over an opaque base role.
fn overlay(theme: &Theme, base: &str, layer: &str) -> Color32 {
    let base = role(theme, base);
    let layer = role(theme, layer);
    let alpha = f32::from(layer.a()) / 255.0;
    let mix = |b: u8, l: u8| (f32::from(b) * (1.0 - alpha) + f32::from(l) * alpha).round() as u8;
    Color32::from_rgb(
        mix(base.r(), layer.r()),
        mix(base.g(), layer.g()),
        mix(base.b(), layer.b()),
    )
}

/// Applies the palette and derived metrics to the whole egui context.
pub fn apply_style(ctx: &egui::Context, theme: &Theme, metrics: &Metrics) {
    let mut style = (*ctx.style()).clone();

    let font = metrics.font_size as f32;
    style.text_styles.insert(TextStyle::Body, FontId::proportional(font));
    style.text_styles.insert(TextStyle::Button, FontId::proportional(font));
    style.text_styles.insert(
        TextStyle::Small,
        FontId::proportional(metrics.font_size_small as f32),
    );
    style.text_styles.insert(
        TextStyle::Heading,
        FontId::proportional(metrics.font_size_large as f32),
    );
    style.text_styles.insert(TextStyle::Monospace, FontId::monospace(font));

    let padding = metrics.padding as f32;
    let padding_small = metrics.padding_small as f32;
    style.spacing.button_padding = Vec2::new(padding, padding_small);
    style.spacing.item_spacing = Vec2::new(metrics.margin_small as f32, padding_small);
    style.spacing.window_margin = egui::Margin::same(metrics.margin.clamp(0, i8::MAX as i32) as i8);
    style.spacing.interact_size.y = metrics.button_height as f32;
    style.spacing.icon_width = metrics.icon_size_small as f32;
    style.spacing.scroll.bar_width = metrics.scrollbar_width as f32;

    let background = role(theme, "background");
    let surface = role(theme, "surface");
    let border = role(theme, "border");
    let primary = role(theme, "primary");
    let corner_radius = to_corner_radius(metrics.radius);
    let border_stroke = Stroke::new(1.0, border);

    style.visuals.dark_mode = theme.name == "dark";
    style.visuals.window_fill = background;
    style.visuals.window_stroke = border_stroke;
    style.visuals.window_corner_radius = to_corner_radius(metrics.radius_large);
    style.visuals.panel_fill = surface;
    style.visuals.faint_bg_color = role(theme, "surface_alt");
    style.visuals.extreme_bg_color = background;
    style.visuals.override_text_color = Some(role(theme, "text_primary"));
    style.visuals.hyperlink_color = primary;

    let widgets = &mut style.visuals.widgets;
    widgets.noninteractive.bg_fill = surface;
    widgets.noninteractive.weak_bg_fill = surface;
    widgets.noninteractive.bg_stroke = border_stroke;
    widgets.noninteractive.fg_stroke = Stroke::new(1.0, role(theme, "text_secondary"));
    widgets.noninteractive.corner_radius = corner_radius;

    widgets.inactive.bg_fill = surface;
    widgets.inactive.weak_bg_fill = surface;
    widgets.inactive.bg_stroke = border_stroke;
    widgets.inactive.fg_stroke = Stroke::new(1.0, role(theme, "text_secondary"));
    widgets.inactive.corner_radius = corner_radius;

    widgets.hovered.bg_fill = overlay(theme, "surface", "hover_overlay");
    widgets.hovered.weak_bg_fill = widgets.hovered.bg_fill;
    widgets.hovered.bg_stroke = Stroke::new(1.0, role(theme, "primary_light"));
    widgets.hovered.fg_stroke = Stroke::new(1.0, role(theme, "text_primary"));
    widgets.hovered.corner_radius = corner_radius;

    widgets.active.bg_fill = role(theme, "primary_dark");
    widgets.active.weak_bg_fill = widgets.active.bg_fill;
    widgets.active.bg_stroke = Stroke::new(1.0, primary);
    widgets.active.fg_stroke = Stroke::new(1.0, role(theme, "on_primary"));
    widgets.active.corner_radius = corner_radius;

    widgets.open.bg_fill = overlay(theme, "surface", "selected_overlay");
    widgets.open.weak_bg_fill = widgets.open.bg_fill;
    widgets.open.corner_radius = corner_radius;

    style.visuals.selection.bg_fill = overlay(theme, "surface", "selected_overlay");
    style.visuals.selection.stroke = Stroke::new(1.0, primary);

    ctx.set_style(style);
}

#[cfg(test)]
mod tests {
    use super::*;
    use soundstage::{ScaleManager, ThemeName};

    #[test]
    fn overlay_composites_over_base() {
        let theme = Theme::builtin(ThemeName::Light);
        // White surface under 5% black.
        assert_eq!(
            overlay(&theme, "surface", "hover_overlay"),
            Color32::from_rgb(242, 242, 242)
        );
    }

    #[test]
    fn apply_style_sets_palette_and_sizes() {
        let ctx = egui::Context::default();
        let theme = Theme::builtin(ThemeName::Dark);
        let metrics = Metrics::compute(&ScaleManager::new(), 3840, 2160).unwrap();
        apply_style(&ctx, &theme, &metrics);

        let style = ctx.style();
        assert!(style.visuals.dark_mode);
        assert_eq!(style.visuals.panel_fill, role(&theme, "surface"));
        assert_eq!(
            style.text_styles.get(&TextStyle::Body).map(|f| f.size),
            Some(21.0)
        );
        assert_eq!(style.spacing.button_padding, Vec2::new(15.0, 7.0));
    }

    #[test]
    fn missing_role_is_visible() {
        let mut theme = Theme::builtin(ThemeName::Light);
        theme.colors.remove("primary");
        assert_eq!(role(&theme, "primary"), Color32::from_rgb(255, 0, 255));
    }
}
