use std::{cell::Cell, fs, path::PathBuf, rc::Rc, sync::Arc};

use eframe::egui::{self, RichText};

use soundstage::{
    stylesheet, watch::PaletteWatcher, Config, Metrics, ScaleManager, Theme, ThemeName,
    ThemeRegistry,
};

use crate::style::{apply_style, role};

const FALLBACK_SCREEN: (i32, i32) = (1920, 1080);
const STYLESHEET_EXPORT_PATH: &str = "soundstage.qss";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Library,
    Lyrics,
    Settings,
}

impl View {
    const ALL: [View; 3] = [View::Library, View::Lyrics, View::Settings];

    fn label(&self) -> &'static str {
        match self {
            View::Library => "Library",
            View::Lyrics => "Lyrics",
            View::Settings => "Settings",
        }
    }
}

pub struct App {
    scale: ScaleManager,
    registry: ThemeRegistry,
    palette_dir: Option<PathBuf>,
    theme_changed: Rc<Cell<bool>>,
    screen: (i32, i32),
    theme: Arc<Theme>,
    metrics: Metrics,
    stylesheet: String,
    style_error: Option<String>,
    palette_watcher: Option<PaletteWatcher>,
    watch_palettes: bool,
    palette_error: Option<String>,
    export_status: Option<String>,
    view: View,
}

impl App {
    pub fn new(ctx: &egui::Context, config: Config) -> Self {
        let scale = config.scale.scale_manager();
        let palette_dir = config.ui.palette_dir.clone();

        let (mut registry, palette_error) = match palette_dir.as_deref() {
            Some(dir) => match ThemeRegistry::with_overrides(dir) {
                Ok(registry) => (registry, None),
                Err(err) => (ThemeRegistry::new(), Some(format!("{err:#}"))),
            },
            None => (ThemeRegistry::new(), None),
        };
        if let Err(err) = registry.switch_theme(config.ui.theme.as_str()) {
            log::warn!("{err}");
        }

        let theme_changed = Rc::new(Cell::new(false));
        {
            let theme_changed = Rc::clone(&theme_changed);
            registry.subscribe(move |theme| {
                log::debug!("Theme changed to {}", theme.name);
                theme_changed.set(true);
            });
        }

        let mut app = Self {
            theme: registry.current(),
            metrics: Metrics::from_factor(&scale, 1.0),
            scale,
            registry,
            palette_dir,
            theme_changed,
            screen: screen_size(ctx),
            stylesheet: String::new(),
            style_error: None,
            palette_watcher: None,
            watch_palettes: config.ui.hot_reload,
            palette_error,
            export_status: None,
            view: View::Library,
        };
        app.refresh(ctx);
        app
    }

    /// Regenerates metrics, stylesheet and egui style from one theme snapshot.
    fn refresh(&mut self, ctx: &egui::Context) {
        let theme = self.registry.current();
        let (width, height) = self.screen;
        let generated = Metrics::compute(&self.scale, width, height).and_then(|metrics| {
            stylesheet::render(&theme, &metrics).map(|sheet| (metrics, sheet))
        });

        match generated {
            Ok((metrics, sheet)) => {
                log::info!(
                    "Styled {} theme for {width}x{height} (scale {:.2})",
                    theme.name,
                    metrics.scale_factor
                );
                self.theme = theme;
                self.metrics = metrics;
                self.stylesheet = sheet;
                self.style_error = None;
            }
            Err(err) => {
                log::warn!("Falling back to built-in light theme: {err}");
                self.style_error = Some(err.to_string());
                let fallback = Arc::new(Theme::builtin(ThemeName::Light));
                self.metrics = Metrics::from_factor(&ScaleManager::new(), 1.0);
                self.stylesheet = stylesheet::render(&fallback, &self.metrics).unwrap_or_default();
                self.theme = fallback;
            }
        }

        apply_style(ctx, &self.theme, &self.metrics);
    }

    fn maintain_palette_watcher(&mut self) {
        let Some(dir) = self.palette_dir.clone() else {
            return;
        };

        if self.watch_palettes {
            if self.palette_watcher.is_none() {
                match PaletteWatcher::new(&dir) {
                    Ok(watcher) => {
                        self.palette_watcher = Some(watcher);
                        self.palette_error = None;
                    }
                    Err(err) => {
                        self.palette_error = Some(err.to_string());
                        self.watch_palettes = false;
                    }
                }
            }
        } else if self.palette_watcher.is_some() {
            self.palette_watcher = None;
        }

        let changed = self
            .palette_watcher
            .as_ref()
            .map(|watcher| watcher.poll())
            .unwrap_or(false);
        if changed {
            match self.registry.reload_from_dir(&dir) {
                Ok(()) => self.palette_error = None,
                Err(err) => {
                    log::warn!("Failed to reload palettes: {err:#}");
                    self.palette_error = Some(format!("{err:#}"));
                }
            }
        }
    }

    fn render_sidebar(&mut self, ctx: &egui::Context) {
        let metrics = self.metrics;
        egui::SidePanel::left("sidebar")
            .resizable(false)
            .exact_width(metrics.sidebar_width as f32)
            .show(ctx, |ui| {
                ui.add_space(metrics.padding as f32);
                ui.label(
                    RichText::new("Soundstage")
                        .size(metrics.font_size_title as f32)
                        .color(role(&self.theme, "primary"))
                        .strong(),
                );
                ui.add_space(metrics.margin as f32);

                for view in View::ALL {
                    ui.scope(|nav| {
                        nav.spacing_mut().interact_size.y = metrics.nav_height as f32;
                        let text = RichText::new(view.label()).size(metrics.font_size as f32);
                        nav.selectable_value(&mut self.view, view, text);
                    });
                }
            });
    }

    fn render_player_bar(&self, ctx: &egui::Context) {
        let metrics = self.metrics;
        egui::TopBottomPanel::bottom("player-bar")
            .exact_height(metrics.player_bar_height as f32)
            .show(ctx, |ui| {
                ui.horizontal_centered(|row| {
                    row.vertical(|col| {
                        col.label(
                            RichText::new("Nothing playing")
                                .size(metrics.font_size_large as f32)
                                .strong(),
                        );
                        col.label(
                            RichText::new("Pick a song from the library")
                                .size(metrics.font_size_small as f32)
                                .color(role(&self.theme, "text_secondary")),
                        );
                    });
                    row.add_space(metrics.margin as f32);

                    let control = egui::vec2(
                        metrics.control_button_size as f32,
                        metrics.control_button_size as f32,
                    );
                    let play = egui::vec2(
                        metrics.play_button_size as f32,
                        metrics.play_button_size as f32,
                    );
                    // Playback lives in the platform media framework; the
                    // controls only show the sized layout until one is attached.
                    row.add_enabled(false, egui::Button::new("⏮").min_size(control));
                    row.add_enabled(
                        false,
                        egui::Button::new(
                            RichText::new("▶").size(metrics.icon_size as f32),
                        )
                        .min_size(play),
                    );
                    row.add_enabled(false, egui::Button::new("⏭").min_size(control));
                });
            });
    }

    fn render_library(&self, ui: &mut egui::Ui) {
        let metrics = self.metrics;
        ui.heading("Library");
        ui.add_space(metrics.margin_small as f32);
        egui::Grid::new("song-table")
            .striped(true)
            .num_columns(4)
            .min_row_height(metrics.row_height as f32)
            .spacing(egui::vec2(metrics.padding as f32, 0.0))
            .show(ui, |grid| {
                for header in ["Title", "Artist", "Album", "Duration"] {
                    grid.label(
                        RichText::new(header)
                            .size(metrics.font_size_small as f32)
                            .color(role(&self.theme, "text_secondary"))
                            .strong(),
                    );
                }
                grid.end_row();
            });
        ui.add_space(metrics.margin as f32);
        ui.label(
            RichText::new("No songs imported yet.")
                .color(role(&self.theme, "text_tertiary")),
        );
    }

    fn render_lyrics(&self, ui: &mut egui::Ui) {
        let metrics = self.metrics;
        ui.heading("Lyrics");
        ui.add_space(metrics.margin as f32);
        ui.vertical_centered(|col| {
            col.label(
                RichText::new("No lyrics loaded")
                    .size(metrics.lyric_current_font_size as f32)
                    .color(role(&self.theme, "primary"))
                    .strong(),
            );
            col.label(
                RichText::new("Start a song to see synced lyrics here.")
                    .size(metrics.lyric_font_size as f32)
                    .color(role(&self.theme, "text_tertiary")),
            );
        });
    }

    fn render_settings(&mut self, ui: &mut egui::Ui) {
        let metrics = self.metrics;
        ui.heading("Settings");
        ui.add_space(metrics.margin_small as f32);

        let current = self.registry.current_name();
        let mut selected = current;
        egui::ComboBox::from_label("Theme")
            .selected_text(self.theme.display_name.clone())
            .show_ui(ui, |combo| {
                for name in self.registry.names().collect::<Vec<_>>() {
                    let label = self
                        .registry
                        .get_theme(name.as_str())
                        .map(|theme| theme.display_name.clone())
                        .unwrap_or_else(|_| name.to_string());
                    combo.selectable_value(&mut selected, name, label);
                }
            });
        if selected != current {
            if let Err(err) = self.registry.switch_theme(selected.as_str()) {
                self.style_error = Some(err.to_string());
            }
        }

        if self.palette_dir.is_some() {
            ui.checkbox(&mut self.watch_palettes, "Reload palettes when files change");
        }
        if let Some(err) = &self.palette_error {
            ui.colored_label(ui.visuals().error_fg_color, err);
        }
        for warning in self.registry.warnings() {
            ui.colored_label(ui.visuals().warn_fg_color, warning);
        }

        ui.separator();
        let (width, height) = self.screen;
        ui.label(format!(
            "Display {width}x{height} · scale {:.2} · font {}px · icon {}px · padding {}px",
            metrics.scale_factor, metrics.font_size, metrics.icon_size, metrics.padding
        ));
        if let Some(err) = &self.style_error {
            ui.colored_label(ui.visuals().error_fg_color, err);
        }

        ui.separator();
        ui.horizontal(|row| {
            row.label(RichText::new("Stylesheet").strong());
            if row.button("Export").clicked() {
                self.export_status = Some(match fs::write(STYLESHEET_EXPORT_PATH, &self.stylesheet) {
                    Ok(()) => format!("Wrote {STYLESHEET_EXPORT_PATH}"),
                    Err(err) => format!("Failed to write {STYLESHEET_EXPORT_PATH}: {err}"),
                });
            }
            if let Some(status) = &self.export_status {
                row.label(RichText::new(status).small());
            }
        });
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |scroll| {
                let mut text = self.stylesheet.as_str();
                scroll.add(
                    egui::TextEdit::multiline(&mut text)
                        .code_editor()
                        .desired_width(f32::INFINITY),
                );
            });
    }
}

/// Monitor size in logical pixels, or the reference size when unknown.
fn screen_size(ctx: &egui::Context) -> (i32, i32) {
    ctx.input(|input| input.viewport().monitor_size)
        .map(|size| (size.x.round() as i32, size.y.round() as i32))
        .filter(|(w, h)| *w > 0 && *h > 0)
        .unwrap_or(FALLBACK_SCREEN)
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.maintain_palette_watcher();

        let screen = screen_size(ctx);
        if screen != self.screen {
            log::info!(
                "Display changed {}x{} -> {}x{}",
                self.screen.0,
                self.screen.1,
                screen.0,
                screen.1
            );
            self.screen = screen;
            self.theme_changed.set(true);
        }
        if self.theme_changed.replace(false) {
            self.refresh(ctx);
        }

        self.render_sidebar(ctx);
        self.render_player_bar(ctx);
        egui::CentralPanel::default()
            .frame(egui::Frame::central_panel(&ctx.style()).fill(role(&self.theme, "background")))
            .show(ctx, |ui| match self.view {
                View::Library => self.render_library(ui),
                View::Lyrics => self.render_lyrics(ui),
                View::Settings => self.render_settings(ui),
            });

        if self.watch_palettes {
            ctx.request_repaint_after(std::time::Duration::from_millis(500));
        }
    }
}
