use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Straight (non-premultiplied) RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::from_rgba(0, 0, 0, 0);

    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn is_opaque(&self) -> bool {
        self.a == u8::MAX
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Parses `#rrggbb`, `#rrggbbaa`, `rgb(..)`, `rgba(..)` or `transparent`.
    ///
    /// Channels are 0-255; an `rgba` alpha containing a `.` is a 0-1 fraction.
    pub fn parse(value: &str) -> Result<Self> {
        let v = value.trim();
        if v.eq_ignore_ascii_case("transparent") {
            return Ok(Color::TRANSPARENT);
        }
        if let Some(hex) = v.strip_prefix('#') {
            return Color::from_hex(hex)
                .ok_or_else(|| Error::invalid_color(v, "expected #rrggbb or #rrggbbaa"));
        }

        let Some((function, args)) = v.strip_suffix(')').and_then(|body| body.split_once('('))
        else {
            return Err(Error::invalid_color(v, "unsupported color format"));
        };
        let args: Vec<&str> = args.split(',').map(str::trim).collect();
        match (function.trim(), args.as_slice()) {
            ("rgb", [r, g, b]) => Ok(Color::from_rgb(
                channel(v, r)?,
                channel(v, g)?,
                channel(v, b)?,
            )),
            ("rgba", [r, g, b, a]) => Ok(Color::from_rgba(
                channel(v, r)?,
                channel(v, g)?,
                channel(v, b)?,
                alpha(v, a)?,
            )),
            ("rgb" | "rgba", _) => Err(Error::invalid_color(
                v,
                format!("{} components given", args.len()),
            )),
            _ => Err(Error::invalid_color(v, "unsupported color format")),
        }
    }

    fn from_hex(hex: &str) -> Option<Self> {
        if !matches!(hex.len(), 6 | 8) || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let byte = |at: usize| u8::from_str_radix(&hex[at..at + 2], 16).ok();
        let a = if hex.len() == 8 { byte(6)? } else { u8::MAX };
        Some(Color::from_rgba(byte(0)?, byte(2)?, byte(4)?, a))
    }
}

fn channel(color: &str, src: &str) -> Result<u8> {
    match src.parse::<f32>() {
        Ok(n) if (0.0..=255.0).contains(&n) => Ok(n.round() as u8),
        _ => Err(Error::invalid_color(color, format!("channel {src} is outside 0-255"))),
    }
}

fn alpha(color: &str, src: &str) -> Result<u8> {
    if !src.contains('.') {
        return channel(color, src);
    }
    match src.parse::<f32>() {
        Ok(n) if (0.0..=1.0).contains(&n) => Ok((n * 255.0).round() as u8),
        _ => Err(Error::invalid_color(color, format!("alpha {src} is outside 0-1"))),
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Color::parse(s)
    }
}

/// Stylesheet notation: `#rrggbb` when opaque, `rgba(r, g, b, a)` otherwise.
impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_opaque() {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_forms() {
        assert_eq!(Color::parse("#1e88e5").unwrap(), Color::from_rgb(30, 136, 229));
        assert_eq!(
            Color::parse("#00000080").unwrap(),
            Color::from_rgba(0, 0, 0, 128)
        );
        assert!(Color::parse("#12345").is_err());
        assert!(Color::parse("#gggggg").is_err());
    }

    #[test]
    fn parses_functional_forms() {
        assert_eq!(
            Color::parse("rgb(10, 20, 30)").unwrap(),
            Color::from_rgb(10, 20, 30)
        );
        assert_eq!(
            Color::parse("rgba(0, 0, 0, 0.5)").unwrap(),
            Color::from_rgba(0, 0, 0, 128)
        );
        assert_eq!(
            Color::parse("rgba(255, 255, 255, 20)").unwrap(),
            Color::from_rgba(255, 255, 255, 20)
        );
        assert_eq!(Color::parse(" transparent ").unwrap(), Color::TRANSPARENT);
    }

    #[test]
    fn rejects_out_of_range_channels() {
        let err = Color::parse("rgb(300, 0, 0)").unwrap_err();
        assert!(matches!(err, Error::InvalidColor { .. }));
        assert!(Color::parse("rgba(0, 0, 0, 1.5)").is_err());
        assert!(Color::parse("hsl(0, 0%, 0%)").is_err());
        assert!(Color::parse("rgb(1, 2)").is_err());
        assert!(Color::parse("rgba(0, 0, 0, 0.5").is_err());
    }

    #[test]
    fn display_uses_hex_for_opaque_and_rgba_otherwise() {
        assert_eq!(Color::from_rgb(255, 0, 16).to_string(), "#ff0010");
        assert_eq!(
            Color::from_rgba(0, 0, 0, 13).to_string(),
            "rgba(0, 0, 0, 13)"
        );
    }
}
