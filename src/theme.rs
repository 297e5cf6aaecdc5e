use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
    collections::{BTreeMap, HashMap},
    fmt, fs,
    path::Path,
    str::FromStr,
};

use crate::color::Color;
use crate::error::Error;

pub const PALETTE_ENGINE_VERSION: &str = "1";

/// The fixed set of built-in themes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ThemeName {
    Light,
    Dark,
}

impl ThemeName {
    pub const ALL: [ThemeName; 2] = [ThemeName::Light, ThemeName::Dark];

    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeName::Light => "light",
            ThemeName::Dark => "dark",
        }
    }
}

impl Default for ThemeName {
    fn default() -> Self {
        ThemeName::Light
    }
}

impl fmt::Display for ThemeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeName {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Error> {
        match s {
            "light" => Ok(ThemeName::Light),
            "dark" => Ok(ThemeName::Dark),
            other => Err(Error::UnknownTheme {
                name: other.to_string(),
            }),
        }
    }
}

/// A named palette of semantic color roles.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: String,
    pub display_name: String,
    pub colors: BTreeMap<String, Color>,
}

impl Theme {
    pub fn new(name: impl Into<String>, colors: BTreeMap<String, Color>) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            name,
            colors,
        }
    }

    pub fn builtin(name: ThemeName) -> Theme {
        let doc = builtin_document(name);
        let mut warnings = Vec::new();
        resolve_document(doc, None, &mut warnings)
    }

    pub fn color(&self, key: &str) -> Option<Color> {
        self.colors.get(key).copied()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.colors.contains_key(key)
    }
}

#[derive(Debug, Clone)]
pub struct LoadedTheme {
    pub theme: Theme,
    pub warnings: Vec<String>,
}

/// Loads a built-in theme with `<dir>/<name>.toml` merged over it.
///
/// Problems inside the override file become warnings; only an unreadable
/// existing file is an error.
pub fn load_theme(name: ThemeName, palette_dir: Option<&Path>) -> Result<LoadedTheme> {
    let mut warnings = Vec::new();
    let builtin = Theme::builtin(name);
    let mut doc = builtin_document(name);

    if let Some(dir) = palette_dir {
        let path = dir.join(format!("{}.toml", name.as_str()));
        if path.exists() {
            let data = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read palette file: {}", path.display()))?;
            match toml::from_str::<ThemeDocument>(&data) {
                Ok(overlay) => match overlay.meta.engine.as_deref() {
                    Some(engine) if engine != PALETTE_ENGINE_VERSION => {
                        warnings.push(format!(
                            "{}: palette engine version {engine} does not match {PALETTE_ENGINE_VERSION}; using built-in colors",
                            path.display()
                        ));
                    }
                    Some(_) => merge_documents(&mut doc, overlay),
                    None => {
                        warnings.push(format!(
                            "{}: meta.engine missing; assuming version {PALETTE_ENGINE_VERSION}",
                            path.display()
                        ));
                        merge_documents(&mut doc, overlay);
                    }
                },
                Err(err) => {
                    warnings.push(format!("Failed to parse {}: {err}", path.display()));
                }
            }
        }
    }

    let mut theme = resolve_document(doc, Some(&builtin), &mut warnings);
    // The registry addresses themes by their fixed name, whatever the file says.
    theme.name = name.as_str().to_string();
    Ok(LoadedTheme { theme, warnings })
}

fn resolve_document(
    doc: ThemeDocument,
    fallback: Option<&Theme>,
    warnings: &mut Vec<String>,
) -> Theme {
    let mut keys: Vec<&String> = doc.colors.keys().collect();
    keys.sort();

    let mut done = HashMap::new();
    let mut colors = BTreeMap::new();
    for key in keys {
        let parsed = resolve_key(key, &doc.colors, &mut done, &mut Vec::new())
            .and_then(|value| Color::parse(&value).map_err(|err| err.to_string()));
        match parsed {
            Ok(color) => {
                colors.insert(key.clone(), color);
            }
            Err(reason) => match fallback.and_then(|theme| theme.color(key)) {
                Some(color) => {
                    warnings.push(format!("{key}: {reason}; keeping built-in {color}"));
                    colors.insert(key.clone(), color);
                }
                None => warnings.push(format!("{key}: {reason}; dropped")),
            },
        }
    }

    let name = doc.meta.name.unwrap_or_default();
    let display_name = doc.meta.display_name.unwrap_or_else(|| name.clone());
    Theme {
        name,
        display_name,
        colors,
    }
}

/// Longest value a palette entry may expand to.
const MAX_RESOLVED_LEN: usize = 256;

type Resolved = std::result::Result<String, String>;

/// Expands the `{colors.key}` references in `key`'s value.
///
/// Results are memoized in `done`; `visiting` holds the chain being expanded
/// so a key that leads back to itself is reported instead of recursed into.
fn resolve_key(
    key: &str,
    raw: &HashMap<String, String>,
    done: &mut HashMap<String, Resolved>,
    visiting: &mut Vec<String>,
) -> Resolved {
    if let Some(result) = done.get(key) {
        return result.clone();
    }
    if visiting.iter().any(|seen| seen == key) {
        return Err(format!(
            "reference cycle {} -> {key}",
            visiting.join(" -> ")
        ));
    }
    let Some(value) = raw.get(key) else {
        return Err(format!("unknown reference {{colors.{key}}}"));
    };

    visiting.push(key.to_string());
    let result = expand_references(value, raw, done, visiting);
    visiting.pop();
    done.insert(key.to_string(), result.clone());
    result
}

fn expand_references(
    value: &str,
    raw: &HashMap<String, String>,
    done: &mut HashMap<String, Resolved>,
    visiting: &mut Vec<String>,
) -> Resolved {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after
            .find('}')
            .ok_or_else(|| format!("unterminated reference in {value}"))?;
        let token = &after[..close];
        let key = token
            .strip_prefix("colors.")
            .ok_or_else(|| format!("unknown token {{{token}}}"))?;
        out.push_str(&resolve_key(key, raw, done, visiting)?);
        if out.len() > MAX_RESOLVED_LEN {
            return Err(format!("expands past {MAX_RESOLVED_LEN} bytes"));
        }
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

fn merge_documents(base: &mut ThemeDocument, overlay: ThemeDocument) {
    if overlay.meta.engine.is_some() {
        base.meta.engine = overlay.meta.engine;
    }
    if overlay.meta.name.is_some() {
        base.meta.name = overlay.meta.name;
    }
    if overlay.meta.display_name.is_some() {
        base.meta.display_name = overlay.meta.display_name;
    }
    base.colors.extend(overlay.colors);
}

#[derive(Clone, Default, Deserialize)]
#[serde(default)]
struct ThemeDocument {
    meta: MetaSection,
    colors: HashMap<String, String>,
}

#[derive(Clone, Default, Deserialize)]
#[serde(default)]
struct MetaSection {
    engine: Option<String>,
    name: Option<String>,
    display_name: Option<String>,
}

fn builtin_document(name: ThemeName) -> ThemeDocument {
    let source = match name {
        ThemeName::Light => LIGHT_THEME_TOML,
        ThemeName::Dark => DARK_THEME_TOML,
    };
    toml::from_str(source).expect("Embedded palette must parse")
}

const LIGHT_THEME_TOML: &str = r##"
[meta]
engine = "1"
name = "light"
display_name = "Light"

[colors]
primary = "#1e88e5"
primary_light = "#6ab7ff"
primary_dark = "#005cb2"
on_primary = "#ffffff"
background = "#f5f6f8"
surface = "#ffffff"
surface_alt = "#f0f2f5"
text_primary = "#1f2329"
text_secondary = "#5f6773"
text_tertiary = "#9aa1ab"
border = "#e1e4e8"
hover_overlay = "rgba(0, 0, 0, 0.05)"
selected_overlay = "rgba(30, 136, 229, 0.12)"
scrollbar = "rgba(0, 0, 0, 0.25)"
shadow = "rgba(0, 0, 0, 0.10)"
"##;

const DARK_THEME_TOML: &str = r##"
[meta]
engine = "1"
name = "dark"
display_name = "Dark"

[colors]
primary = "#4c8dff"
primary_light = "#80b0ff"
primary_dark = "#336cff"
on_primary = "#081123"
background = "#15161b"
surface = "#1d1f26"
surface_alt = "#24262e"
text_primary = "#f7f9fc"
text_secondary = "#9ea7b8"
text_tertiary = "#6b7385"
border = "#2a2c35"
hover_overlay = "rgba(255, 255, 255, 0.06)"
selected_overlay = "rgba(76, 141, 255, 0.20)"
scrollbar = "rgba(255, 255, 255, 0.22)"
shadow = "rgba(0, 0, 0, 0.45)"
"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_themes_parse_every_color() {
        for name in ThemeName::ALL {
            let doc = builtin_document(name);
            let theme = Theme::builtin(name);
            assert_eq!(theme.name, name.as_str());
            assert_eq!(theme.colors.len(), doc.colors.len());
        }
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert_eq!("dark".parse::<ThemeName>().unwrap(), ThemeName::Dark);
        let err = "sepia".parse::<ThemeName>().unwrap_err();
        assert_eq!(
            err,
            Error::UnknownTheme {
                name: "sepia".to_string()
            }
        );
    }

    #[test]
    fn builtin_palettes_differ() {
        let light = Theme::builtin(ThemeName::Light);
        let dark = Theme::builtin(ThemeName::Dark);
        assert_ne!(light.color("background"), dark.color("background"));
        assert_eq!(
            light.color("hover_overlay"),
            Some(Color::from_rgba(0, 0, 0, 13))
        );
    }

    #[test]
    fn references_resolve_through_chains() {
        let mut colors = HashMap::new();
        colors.insert("a".to_string(), "{colors.b}".to_string());
        colors.insert("b".to_string(), "{colors.c}".to_string());
        colors.insert("c".to_string(), "#102030".to_string());
        colors.insert("d".to_string(), "{colors.zzz}".to_string());
        let mut done = HashMap::new();

        assert_eq!(
            resolve_key("a", &colors, &mut done, &mut Vec::new()).unwrap(),
            "#102030"
        );
        assert_eq!(done.get("b"), Some(&Ok("#102030".to_string())));
        let err = resolve_key("d", &colors, &mut done, &mut Vec::new()).unwrap_err();
        assert_eq!(err, "unknown reference {colors.zzz}");
    }

    #[test]
    fn reference_cycles_are_errors() {
        let mut colors = HashMap::new();
        colors.insert("a".to_string(), "{colors.b}".to_string());
        colors.insert("b".to_string(), "{colors.a}".to_string());
        colors.insert("c".to_string(), "{colors.c}{colors.c}".to_string());
        let mut done = HashMap::new();

        let err = resolve_key("a", &colors, &mut done, &mut Vec::new()).unwrap_err();
        assert_eq!(err, "reference cycle a -> b -> a");
        assert!(resolve_key("c", &colors, &mut done, &mut Vec::new()).is_err());
    }

    #[test]
    fn expansion_length_is_capped() {
        let mut colors = HashMap::new();
        colors.insert("base".to_string(), "x".repeat(200));
        colors.insert("twice".to_string(), "{colors.base}{colors.base}".to_string());
        let err = resolve_key("twice", &colors, &mut HashMap::new(), &mut Vec::new()).unwrap_err();
        assert!(err.contains("256"));
    }

    #[test]
    fn missing_override_dir_yields_builtin() {
        let loaded = load_theme(ThemeName::Dark, None).unwrap();
        assert_eq!(loaded.theme, Theme::builtin(ThemeName::Dark));
        assert!(loaded.warnings.is_empty());
    }
}
