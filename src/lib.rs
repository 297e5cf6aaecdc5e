//! Resolution-aware scaling and theme/stylesheet generation for the
//! soundstage music player.
//!
//! The host reads the display size, derives [`Metrics`] through a
//! [`ScaleManager`], picks the current [`Theme`] from the [`ThemeRegistry`]
//! and renders one stylesheet with [`stylesheet::generate`].

pub mod color;
pub mod config;
pub mod error;
pub mod metrics;
pub mod registry;
pub mod scale;
pub mod stylesheet;
pub mod template;
pub mod theme;
pub mod watch;

pub use color::Color;
pub use config::Config;
pub use error::{Error, Result};
pub use metrics::Metrics;
pub use registry::ThemeRegistry;
pub use scale::ScaleManager;
pub use stylesheet::{generate, StyleRule, RULES};
pub use theme::{Theme, ThemeName};
