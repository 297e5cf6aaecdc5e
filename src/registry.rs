//! Process-wide "current theme" selection.
//!
//! The registry is owned by the application shell and lives on the UI
//! thread. It starts on [`ThemeName::Light`], changes only through
//! [`ThemeRegistry::switch_theme`] (or a palette [`ThemeRegistry::reload`]) and
//! hands out immutable [`Arc<Theme>`] snapshots, so a stylesheet generated
//! from one snapshot never mixes in colors from a later switch.

use std::{collections::BTreeMap, fmt, path::Path, sync::Arc};

use crate::error::{Error, Result};
use crate::theme::{load_theme, Theme, ThemeName};

/// Alias accepted by [`ThemeRegistry::get_theme`] for the active theme.
pub const CURRENT_THEME_ALIAS: &str = "current";

type Observer = Box<dyn FnMut(&Theme)>;

pub struct ThemeRegistry {
    themes: BTreeMap<ThemeName, Arc<Theme>>,
    current: ThemeName,
    observers: Vec<Observer>,
    warnings: Vec<String>,
}

impl fmt::Debug for ThemeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeRegistry")
            .field("current", &self.current)
            .field("themes", &self.themes.keys().collect::<Vec<_>>())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Default for ThemeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ThemeRegistry {
    /// Built-in palettes only.
    pub fn new() -> Self {
        let themes = ThemeName::ALL
            .into_iter()
            .map(|name| (name, Arc::new(Theme::builtin(name))))
            .collect();
        Self {
            themes,
            current: ThemeName::default(),
            observers: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Built-in palettes with `light.toml`/`dark.toml` from `dir` merged in.
    pub fn with_overrides(dir: &Path) -> anyhow::Result<Self> {
        let mut registry = Self::new();
        let (themes, warnings) = load_overridden_themes(dir)?;
        registry.themes = themes;
        registry.warnings = warnings;
        Ok(registry)
    }

    pub fn names(&self) -> impl Iterator<Item = ThemeName> + '_ {
        self.themes.keys().copied()
    }

    /// Looks up a theme by name; `"current"` resolves to the active one.
    pub fn get_theme(&self, name: &str) -> Result<Arc<Theme>> {
        if name == CURRENT_THEME_ALIAS {
            return Ok(self.current());
        }
        let name: ThemeName = name.parse()?;
        self.themes
            .get(&name)
            .cloned()
            .ok_or_else(|| Error::UnknownTheme {
                name: name.to_string(),
            })
    }

    pub fn current(&self) -> Arc<Theme> {
        self.themes
            .get(&self.current)
            .cloned()
            .unwrap_or_else(|| Arc::new(Theme::builtin(self.current)))
    }

    pub fn current_name(&self) -> ThemeName {
        self.current
    }

    /// Makes `name` the current theme and notifies every observer, in
    /// subscription order, with the new theme.
    pub fn switch_theme(&mut self, name: &str) -> Result<()> {
        let name: ThemeName = name.parse()?;
        if name != self.current {
            log::info!("Switching theme {} -> {}", self.current, name);
        }
        self.current = name;
        self.notify();
        Ok(())
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&Theme) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Swaps in freshly loaded palettes, keeping the current selection.
    pub fn reload(&mut self, themes: impl IntoIterator<Item = Theme>) -> Result<()> {
        let mut replaced = self.themes.clone();
        for theme in themes {
            let name: ThemeName = theme.name.parse()?;
            replaced.insert(name, Arc::new(theme));
        }
        self.themes = replaced;
        self.notify();
        Ok(())
    }

    /// Re-reads override files from `dir`; see [`ThemeRegistry::with_overrides`].
    pub fn reload_from_dir(&mut self, dir: &Path) -> anyhow::Result<()> {
        let (themes, warnings) = load_overridden_themes(dir)?;
        self.warnings = warnings;
        self.reload(themes.into_values().map(Arc::unwrap_or_clone))?;
        Ok(())
    }

    /// Warnings collected while loading palette overrides.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    fn notify(&mut self) {
        let theme = self.current();
        for observer in self.observers.iter_mut() {
            observer(&theme);
        }
    }
}

fn load_overridden_themes(
    dir: &Path,
) -> anyhow::Result<(BTreeMap<ThemeName, Arc<Theme>>, Vec<String>)> {
    let mut themes = BTreeMap::new();
    let mut warnings = Vec::new();
    for name in ThemeName::ALL {
        let mut loaded = load_theme(name, Some(dir))?;
        for warning in &loaded.warnings {
            log::warn!("{warning}");
        }
        warnings.append(&mut loaded.warnings);
        themes.insert(name, Arc::new(loaded.theme));
    }
    Ok((themes, warnings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, rc::Rc};

    #[test]
    fn starts_on_light() {
        let registry = ThemeRegistry::new();
        assert_eq!(registry.current_name(), ThemeName::Light);
        assert_eq!(registry.current().name, "light");
        assert_eq!(registry.names().count(), 2);
    }

    #[test]
    fn current_alias_tracks_switches() {
        let mut registry = ThemeRegistry::new();
        registry.switch_theme("dark").unwrap();
        assert_eq!(registry.get_theme("current").unwrap().name, "dark");
        assert_eq!(registry.get_theme("light").unwrap().name, "light");
    }

    #[test]
    fn unknown_theme_leaves_selection_untouched() {
        let mut registry = ThemeRegistry::new();
        let err = registry.switch_theme("sepia").unwrap_err();
        assert!(matches!(err, Error::UnknownTheme { .. }));
        assert_eq!(registry.current_name(), ThemeName::Light);
        assert!(registry.get_theme("sepia").is_err());
    }

    #[test]
    fn padded_names_are_unknown() {
        let mut registry = ThemeRegistry::new();
        assert!(matches!(
            registry.get_theme(" dark "),
            Err(Error::UnknownTheme { name }) if name == " dark "
        ));
        assert!(registry.get_theme("current\n").is_err());
        assert!(registry.switch_theme("\tdark").is_err());
        assert_eq!(registry.current_name(), ThemeName::Light);
    }

    #[test]
    fn observers_are_notified_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut registry = ThemeRegistry::new();
        for tag in ["first", "second"] {
            let seen = Rc::clone(&seen);
            registry.subscribe(move |theme| {
                seen.borrow_mut().push(format!("{tag}:{}", theme.name));
            });
        }

        registry.switch_theme("dark").unwrap();
        registry.switch_theme("dark").unwrap();
        assert_eq!(
            *seen.borrow(),
            vec!["first:dark", "second:dark", "first:dark", "second:dark"]
        );
    }

    #[test]
    fn snapshots_survive_switches() {
        let mut registry = ThemeRegistry::new();
        let snapshot = registry.current();
        registry.switch_theme("dark").unwrap();
        assert_eq!(snapshot.name, "light");
        assert_eq!(*snapshot, Theme::builtin(ThemeName::Light));
    }

    #[test]
    fn reload_keeps_selection_and_notifies() {
        let count = Rc::new(RefCell::new(0));
        let mut registry = ThemeRegistry::new();
        registry.switch_theme("dark").unwrap();
        {
            let count = Rc::clone(&count);
            registry.subscribe(move |_| *count.borrow_mut() += 1);
        }

        let mut dark = Theme::builtin(ThemeName::Dark);
        dark.display_name = "Midnight".to_string();
        registry.reload([dark]).unwrap();

        assert_eq!(registry.current_name(), ThemeName::Dark);
        assert_eq!(registry.current().display_name, "Midnight");
        assert_eq!(*count.borrow(), 1);

        let bogus = Theme::new("sepia", BTreeMap::new());
        assert!(registry.reload([bogus]).is_err());
        assert_eq!(registry.current().display_name, "Midnight");
    }
}
