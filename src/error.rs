use thiserror::Error;

/// Errors raised by the scaling and theming core.
///
/// All of these are local validation failures detected at the call that
/// introduced the bad input. Callers are expected to fall back to a default
/// theme or metric set rather than render with partial styling.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Screen dimensions must both be strictly positive.
    #[error("invalid screen dimensions {width}x{height}")]
    InvalidDimension { width: i64, height: i64 },

    /// Theme name outside the built-in set.
    #[error("unknown theme '{name}'")]
    UnknownTheme { name: String },

    /// A stylesheet rule references a palette key the theme does not define.
    #[error("theme '{theme}' is missing color '{key}' required by rule '{rule}'")]
    MissingThemeKey {
        theme: String,
        key: String,
        rule: String,
    },

    #[error("invalid color '{value}': {reason}")]
    InvalidColor { value: String, reason: String },

    #[error("malformed template in rule '{rule}': {reason}")]
    MalformedTemplate { rule: String, reason: String },

    #[error("rule '{rule}' references unknown metric '{metric}'")]
    UnknownMetric { rule: String, metric: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid_color(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidColor {
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(rule: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedTemplate {
            rule: rule.into(),
            reason: reason.into(),
        }
    }
}
