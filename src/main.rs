mod app;
mod style;

use eframe::egui::ViewportBuilder;

use soundstage::Config;

use crate::app::App;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("soundstage=info"))
        .init();

    let config = Config::load().unwrap_or_else(|err| {
        log::warn!("{err:#}; using default config");
        Config::default()
    });

    let native_options = eframe::NativeOptions {
        viewport: ViewportBuilder::default()
            .with_title("Soundstage")
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([960.0, 600.0]),
        ..Default::default()
    };
    let run_res = eframe::run_native(
        "Soundstage",
        native_options,
        Box::new(
            move |cc| -> std::result::Result<
                Box<dyn eframe::App>,
                Box<dyn std::error::Error + Send + Sync>,
            > { Ok(Box::new(App::new(&cc.egui_ctx, config))) },
        ),
    );
    if let Err(e) = run_res {
        return Err(Box::new(e));
    }

    Ok(())
}
