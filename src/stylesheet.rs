//! Global stylesheet assembly.
//!
//! [`RULES`] is the complete, ordered rule table. Later rules override
//! earlier ones with the same specificity, so generic widget rules come
//! before the object-name rules that refine them. Generation validates every
//! rule against the theme and metrics before rendering anything.

use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::metrics::Metrics;
use crate::scale::ScaleManager;
use crate::template::{tokenize, Segment};
use crate::theme::Theme;

/// One named target of the stylesheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleRule {
    pub name: &'static str,
    pub selector: &'static str,
    pub declarations: &'static [&'static str],
}

const fn rule(
    name: &'static str,
    selector: &'static str,
    declarations: &'static [&'static str],
) -> StyleRule {
    StyleRule {
        name,
        selector,
        declarations,
    }
}

pub const RULES: &[StyleRule] = &[
    rule(
        "application base",
        "QWidget",
        &[
            "font-size: {metrics.font_size}px",
            "color: {colors.text_primary}",
            "background-color: {colors.background}",
        ],
    ),
    rule(
        "main window",
        "QMainWindow",
        &["background-color: {colors.background}"],
    ),
    rule(
        "push button",
        "QPushButton",
        &[
            "background-color: {colors.primary}",
            "color: {colors.on_primary}",
            "border: none",
            "border-radius: {metrics.radius}px",
            "padding: {metrics.padding_small}px {metrics.padding}px",
            "min-height: {metrics.button_height}px",
        ],
    ),
    rule(
        "push button hover",
        "QPushButton:hover",
        &["background-color: {colors.primary_light}"],
    ),
    rule(
        "push button pressed",
        "QPushButton:pressed",
        &["background-color: {colors.primary_dark}"],
    ),
    rule(
        "push button disabled",
        "QPushButton:disabled",
        &[
            "background-color: {colors.border}",
            "color: {colors.text_tertiary}",
        ],
    ),
    rule(
        "secondary button",
        "QPushButton#secondaryButton",
        &[
            "background-color: transparent",
            "color: {colors.primary}",
            "border: 1px solid {colors.primary}",
        ],
    ),
    rule(
        "secondary button hover",
        "QPushButton#secondaryButton:hover",
        &["background-color: {colors.hover_overlay}"],
    ),
    rule(
        "tool button",
        "QToolButton",
        &[
            "background-color: transparent",
            "border: none",
            "border-radius: {metrics.radius}px",
            "padding: {metrics.padding_small}px",
            "qproperty-iconSize: {metrics.icon_size}px {metrics.icon_size}px",
        ],
    ),
    rule(
        "tool button hover",
        "QToolButton:hover",
        &["background-color: {colors.hover_overlay}"],
    ),
    rule(
        "sidebar background",
        "QWidget#sidebar",
        &[
            "background-color: {colors.surface}",
            "border-right: 1px solid {colors.border}",
            "min-width: {metrics.sidebar_width}px",
            "max-width: {metrics.sidebar_width}px",
        ],
    ),
    rule(
        "sidebar title",
        "QLabel#sidebarTitle",
        &[
            "color: {colors.primary}",
            "font-size: {metrics.font_size_title}px",
            "font-weight: bold",
            "padding: {metrics.padding}px",
        ],
    ),
    rule(
        "nav button",
        "QPushButton#navButton",
        &[
            "background-color: transparent",
            "color: {colors.text_secondary}",
            "border: none",
            "border-radius: {metrics.radius}px",
            "text-align: left",
            "padding: {metrics.padding_small}px {metrics.padding}px",
            "margin: 0 {metrics.margin_small}px",
            "min-height: {metrics.nav_height}px",
            "font-size: {metrics.font_size}px",
        ],
    ),
    rule(
        "nav button hover",
        "QPushButton#navButton:hover",
        &[
            "background-color: {colors.hover_overlay}",
            "color: {colors.text_primary}",
        ],
    ),
    rule(
        "nav button checked",
        "QPushButton#navButton:checked",
        &[
            "background-color: {colors.selected_overlay}",
            "color: {colors.primary}",
            "font-weight: bold",
        ],
    ),
    rule(
        "section title",
        "QLabel#sectionTitle",
        &[
            "color: {colors.text_primary}",
            "font-size: {metrics.font_size_large}px",
            "font-weight: bold",
            "margin-bottom: {metrics.margin_small}px",
        ],
    ),
    rule(
        "secondary label",
        "QLabel#secondaryLabel",
        &[
            "color: {colors.text_secondary}",
            "font-size: {metrics.font_size_small}px",
        ],
    ),
    rule(
        "line edit",
        "QLineEdit",
        &[
            "background-color: {colors.surface}",
            "color: {colors.text_primary}",
            "border: 1px solid {colors.border}",
            "border-radius: {metrics.radius}px",
            "padding: 0 {metrics.padding}px",
            "min-height: {metrics.input_height}px",
            "selection-background-color: {colors.primary}",
            "selection-color: {colors.on_primary}",
        ],
    ),
    rule(
        "line edit focus",
        "QLineEdit:focus",
        &["border: 1px solid {colors.primary}"],
    ),
    rule(
        "combo box",
        "QComboBox",
        &[
            "background-color: {colors.surface}",
            "color: {colors.text_primary}",
            "border: 1px solid {colors.border}",
            "border-radius: {metrics.radius}px",
            "padding: 0 {metrics.padding}px",
            "min-height: {metrics.input_height}px",
        ],
    ),
    rule(
        "combo box popup",
        "QComboBox QAbstractItemView",
        &[
            "background-color: {colors.surface}",
            "border: 1px solid {colors.border}",
            "selection-background-color: {colors.selected_overlay}",
            "selection-color: {colors.primary}",
        ],
    ),
    rule(
        "list widget",
        "QListWidget",
        &[
            "background-color: {colors.surface}",
            "border: 1px solid {colors.border}",
            "border-radius: {metrics.radius}px",
            "outline: 0",
        ],
    ),
    rule(
        "list item",
        "QListWidget::item",
        &[
            "color: {colors.text_primary}",
            "min-height: {metrics.row_height}px",
            "padding: 0 {metrics.padding}px",
        ],
    ),
    rule(
        "list item hover",
        "QListWidget::item:hover",
        &["background-color: {colors.hover_overlay}"],
    ),
    rule(
        "list item selected",
        "QListWidget::item:selected",
        &[
            "background-color: {colors.selected_overlay}",
            "color: {colors.primary}",
        ],
    ),
    rule(
        "song table",
        "QTableWidget#songTable",
        &[
            "background-color: {colors.surface}",
            "alternate-background-color: {colors.surface_alt}",
            "border: none",
            "gridline-color: {colors.border}",
            "selection-background-color: {colors.selected_overlay}",
            "selection-color: {colors.text_primary}",
            "outline: 0",
        ],
    ),
    rule(
        "table row",
        "QTableWidget#songTable::item",
        &[
            "height: {metrics.row_height}px",
            "padding: 0 {metrics.padding}px",
            "border: none",
        ],
    ),
    rule(
        "table row hover",
        "QTableWidget#songTable::item:hover",
        &["background-color: {colors.hover_overlay}"],
    ),
    rule(
        "table row selected",
        "QTableWidget#songTable::item:selected",
        &[
            "background-color: {colors.selected_overlay}",
            "color: {colors.primary}",
        ],
    ),
    rule(
        "table header",
        "QHeaderView::section",
        &[
            "background-color: {colors.surface}",
            "color: {colors.text_secondary}",
            "border: none",
            "border-bottom: 1px solid {colors.border}",
            "padding: 0 {metrics.padding}px",
            "min-height: {metrics.header_height}px",
            "font-size: {metrics.font_size_small}px",
            "font-weight: bold",
        ],
    ),
    rule(
        "table corner",
        "QTableCornerButton::section",
        &["background-color: {colors.surface}", "border: none"],
    ),
    rule(
        "album cover",
        "QLabel#albumCover",
        &[
            "background-color: {colors.surface_alt}",
            "border: 1px solid {colors.shadow}",
            "border-radius: {metrics.radius_large}px",
        ],
    ),
    rule(
        "lyric panel",
        "QWidget#lyricPanel",
        &[
            "background-color: {colors.surface}",
            "border-left: 1px solid {colors.border}",
            "padding: {metrics.padding}px",
        ],
    ),
    rule(
        "lyric line",
        "QLabel#lyricLine",
        &[
            "color: {colors.text_tertiary}",
            "font-size: {metrics.lyric_font_size}px",
            "padding: {metrics.padding_small}px 0",
        ],
    ),
    rule(
        "lyric current line",
        "QLabel#lyricCurrent",
        &[
            "color: {colors.primary}",
            "font-size: {metrics.lyric_current_font_size}px",
            "font-weight: bold",
        ],
    ),
    rule(
        "player bar",
        "QWidget#playerBar",
        &[
            "background-color: {colors.surface}",
            "border-top: 1px solid {colors.border}",
            "min-height: {metrics.player_bar_height}px",
            "max-height: {metrics.player_bar_height}px",
        ],
    ),
    rule(
        "song title label",
        "QLabel#songTitle",
        &[
            "color: {colors.text_primary}",
            "font-size: {metrics.font_size_large}px",
            "font-weight: bold",
        ],
    ),
    rule(
        "song artist label",
        "QLabel#songArtist",
        &[
            "color: {colors.text_secondary}",
            "font-size: {metrics.font_size_small}px",
        ],
    ),
    rule(
        "time label",
        "QLabel#timeLabel",
        &[
            "color: {colors.text_tertiary}",
            "font-size: {metrics.font_size_small}px",
        ],
    ),
    rule(
        "control button",
        "QPushButton#controlButton",
        &[
            "background-color: transparent",
            "border: none",
            "border-radius: {metrics.control_button_radius}px",
            "min-width: {metrics.control_button_size}px",
            "max-width: {metrics.control_button_size}px",
            "min-height: {metrics.control_button_size}px",
            "max-height: {metrics.control_button_size}px",
            "qproperty-iconSize: {metrics.icon_size}px {metrics.icon_size}px",
        ],
    ),
    rule(
        "control button hover",
        "QPushButton#controlButton:hover",
        &["background-color: {colors.hover_overlay}"],
    ),
    rule(
        "play button",
        "QPushButton#playButton",
        &[
            "background-color: {colors.primary}",
            "border: none",
            "border-radius: {metrics.play_button_radius}px",
            "min-width: {metrics.play_button_size}px",
            "max-width: {metrics.play_button_size}px",
            "min-height: {metrics.play_button_size}px",
            "max-height: {metrics.play_button_size}px",
        ],
    ),
    rule(
        "play button hover",
        "QPushButton#playButton:hover",
        &["background-color: {colors.primary_light}"],
    ),
    rule(
        "slider groove",
        "QSlider::groove:horizontal",
        &[
            "background-color: {colors.border}",
            "height: {metrics.slider_groove}px",
            "border-radius: {metrics.slider_groove_radius}px",
        ],
    ),
    rule(
        "slider fill",
        "QSlider::sub-page:horizontal",
        &[
            "background-color: {colors.primary}",
            "border-radius: {metrics.slider_groove_radius}px",
        ],
    ),
    rule(
        "slider handle",
        "QSlider::handle:horizontal",
        &[
            "background-color: {colors.primary}",
            "width: {metrics.slider_handle}px",
            "height: {metrics.slider_handle}px",
            "margin: -{metrics.slider_handle_offset}px 0",
            "border-radius: {metrics.slider_handle_radius}px",
        ],
    ),
    rule(
        "slider handle hover",
        "QSlider::handle:horizontal:hover",
        &["background-color: {colors.primary_light}"],
    ),
    rule(
        "progress bar",
        "QProgressBar",
        &[
            "background-color: {colors.border}",
            "color: {colors.text_primary}",
            "border: none",
            "border-radius: {metrics.radius}px",
            "text-align: center",
            "min-height: {metrics.slider_handle}px",
        ],
    ),
    rule(
        "progress chunk",
        "QProgressBar::chunk",
        &[
            "background-color: {colors.primary}",
            "border-radius: {metrics.radius}px",
        ],
    ),
    rule(
        "vertical scrollbar",
        "QScrollBar:vertical",
        &[
            "background: transparent",
            "width: {metrics.scrollbar_width}px",
            "margin: 0",
        ],
    ),
    rule(
        "vertical scrollbar handle",
        "QScrollBar::handle:vertical",
        &[
            "background-color: {colors.scrollbar}",
            "border-radius: {metrics.scrollbar_radius}px",
            "min-height: {metrics.row_height}px",
        ],
    ),
    rule(
        "horizontal scrollbar",
        "QScrollBar:horizontal",
        &[
            "background: transparent",
            "height: {metrics.scrollbar_width}px",
            "margin: 0",
        ],
    ),
    rule(
        "horizontal scrollbar handle",
        "QScrollBar::handle:horizontal",
        &[
            "background-color: {colors.scrollbar}",
            "border-radius: {metrics.scrollbar_radius}px",
            "min-width: {metrics.row_height}px",
        ],
    ),
    rule(
        "scrollbar handle hover",
        "QScrollBar::handle:hover",
        &["background-color: {colors.text_tertiary}"],
    ),
    rule(
        "scrollbar arrows",
        "QScrollBar::add-line, QScrollBar::sub-line, QScrollBar::add-page, QScrollBar::sub-page",
        &["width: 0", "height: 0", "background: none"],
    ),
    rule(
        "dialog",
        "QDialog",
        &[
            "background-color: {colors.background}",
            "min-width: {metrics.dialog_min_width}px",
        ],
    ),
    rule(
        "dialog title",
        "QLabel#dialogTitle",
        &[
            "color: {colors.text_primary}",
            "font-size: {metrics.font_size_large}px",
            "font-weight: bold",
            "padding-bottom: {metrics.padding_small}px",
        ],
    ),
    rule(
        "menu",
        "QMenu",
        &[
            "background-color: {colors.surface}",
            "border: 1px solid {colors.border}",
            "border-radius: {metrics.radius}px",
            "padding: {metrics.padding_small}px 0",
        ],
    ),
    rule(
        "menu item",
        "QMenu::item",
        &[
            "color: {colors.text_primary}",
            "padding: {metrics.padding_small}px {metrics.padding}px",
            "min-height: {metrics.menu_item_height}px",
        ],
    ),
    rule(
        "menu item selected",
        "QMenu::item:selected",
        &[
            "background-color: {colors.selected_overlay}",
            "color: {colors.primary}",
        ],
    ),
    rule(
        "menu separator",
        "QMenu::separator",
        &[
            "height: 1px",
            "background-color: {colors.border}",
            "margin: {metrics.padding_small}px {metrics.padding}px",
        ],
    ),
    rule(
        "tooltip",
        "QToolTip",
        &[
            "background-color: {colors.surface}",
            "color: {colors.text_primary}",
            "border: 1px solid {colors.border}",
            "padding: {metrics.padding_small}px",
            "font-size: {metrics.font_size_small}px",
        ],
    ),
];

/// Every palette key referenced anywhere in [`RULES`].
pub fn required_keys() -> Result<BTreeSet<&'static str>> {
    let mut keys = BTreeSet::new();
    for rule in RULES {
        for &declaration in rule.declarations {
            for segment in tokenize(rule.name, declaration)? {
                if let Segment::Color(key) = segment {
                    keys.insert(key);
                }
            }
        }
    }
    Ok(keys)
}

/// Renders the full stylesheet for `theme` on a `screen_width` x
/// `screen_height` display.
///
/// Deterministic in its inputs. Fails before producing any text if the
/// dimensions are invalid or the theme lacks a referenced color.
pub fn generate(
    theme: &Theme,
    scale: &ScaleManager,
    screen_width: i32,
    screen_height: i32,
) -> Result<String> {
    let metrics = Metrics::compute(scale, screen_width, screen_height)?;
    render(theme, &metrics)
}

/// Renders [`RULES`] against precomputed metrics.
pub fn render(theme: &Theme, metrics: &Metrics) -> Result<String> {
    let compiled = compile(theme, metrics)?;

    let mut out = String::new();
    for (idx, (rule, declarations)) in compiled.iter().enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        out.push_str(&format!("/* {} */\n{} {{\n", rule.name, rule.selector));
        for declaration in declarations {
            out.push_str(&format!("    {declaration};\n"));
        }
        out.push_str("}\n");
    }
    Ok(out)
}

/// Tokenizes and validates every rule up front, then substitutes values.
fn compile(theme: &Theme, metrics: &Metrics) -> Result<Vec<(&'static StyleRule, Vec<String>)>> {
    let mut parsed = Vec::with_capacity(RULES.len());
    for rule in RULES {
        let mut declarations = Vec::with_capacity(rule.declarations.len());
        for &declaration in rule.declarations {
            declarations.push(tokenize(rule.name, declaration)?);
        }
        parsed.push((rule, declarations));
    }

    for (rule, declarations) in &parsed {
        for segment in declarations.iter().flatten() {
            match *segment {
                Segment::Color(key) if !theme.contains(key) => {
                    return Err(Error::MissingThemeKey {
                        theme: theme.name.clone(),
                        key: key.to_string(),
                        rule: rule.name.to_string(),
                    });
                }
                Segment::Metric(name) if metrics.get(name).is_none() => {
                    return Err(Error::UnknownMetric {
                        rule: rule.name.to_string(),
                        metric: name.to_string(),
                    });
                }
                _ => {}
            }
        }
    }

    Ok(parsed
        .into_iter()
        .map(|(rule, declarations)| {
            let rendered = declarations
                .iter()
                .map(|segments| substitute(segments, theme, metrics))
                .collect();
            (rule, rendered)
        })
        .collect())
}

fn substitute(segments: &[Segment<'_>], theme: &Theme, metrics: &Metrics) -> String {
    let mut out = String::new();
    for segment in segments {
        match *segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Color(key) => {
                if let Some(color) = theme.color(key) {
                    out.push_str(&color.to_string());
                }
            }
            Segment::Metric(name) => {
                if let Some(value) = metrics.get(name) {
                    out.push_str(&value.to_string());
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::ThemeName;

    #[test]
    fn rule_names_are_unique() {
        let names: BTreeSet<_> = RULES.iter().map(|rule| rule.name).collect();
        assert_eq!(names.len(), RULES.len());
        assert!(RULES.len() >= 40);
    }

    #[test]
    fn every_template_is_well_formed() {
        let metrics = Metrics::compute(&ScaleManager::new(), 1920, 1080).unwrap();
        for rule in RULES {
            for &declaration in rule.declarations {
                for segment in tokenize(rule.name, declaration).unwrap() {
                    if let Segment::Metric(name) = segment {
                        assert!(metrics.get(name).is_some(), "{}: {name}", rule.name);
                    }
                }
            }
        }
    }

    #[test]
    fn builtin_themes_cover_required_keys() {
        let keys = required_keys().unwrap();
        for name in ThemeName::ALL {
            let theme = Theme::builtin(name);
            for key in &keys {
                assert!(theme.contains(key), "{name} lacks {key}");
            }
        }
    }

    #[test]
    fn renders_rules_in_table_order() {
        let theme = Theme::builtin(ThemeName::Light);
        let sheet = generate(&theme, &ScaleManager::new(), 1920, 1080).unwrap();

        let mut last = 0;
        for rule in RULES {
            let marker = format!("/* {} */\n{} {{", rule.name, rule.selector);
            let at = sheet[last..]
                .find(&marker)
                .unwrap_or_else(|| panic!("{} out of order", rule.name));
            last += at + marker.len();
        }
    }

    #[test]
    fn substitutes_colors_and_metrics() {
        let theme = Theme::builtin(ThemeName::Light);
        let sheet = generate(&theme, &ScaleManager::new(), 3840, 2160).unwrap();
        assert!(sheet.starts_with(
            "/* application base */\nQWidget {\n    font-size: 21px;\n    color: #1f2329;\n"
        ));
        assert!(sheet.contains("QWidget#sidebar {\n    background-color: #ffffff;"));
        assert!(sheet.contains("min-width: 330px;"));
        assert!(sheet.contains("background-color: rgba(0, 0, 0, 13);"));
        assert!(!sheet.contains("{colors."));
        assert!(!sheet.contains("{metrics."));
    }

    #[test]
    fn missing_key_reports_first_offending_rule() {
        let mut theme = Theme::builtin(ThemeName::Dark);
        theme.colors.remove("scrollbar");
        let err = generate(&theme, &ScaleManager::new(), 1920, 1080).unwrap_err();
        assert_eq!(
            err,
            Error::MissingThemeKey {
                theme: "dark".to_string(),
                key: "scrollbar".to_string(),
                rule: "vertical scrollbar handle".to_string(),
            }
        );
    }

    #[test]
    fn invalid_dimensions_fail_before_rendering() {
        let theme = Theme::builtin(ThemeName::Light);
        assert!(matches!(
            generate(&theme, &ScaleManager::new(), 0, 1080),
            Err(Error::InvalidDimension { .. })
        ));
    }
}
