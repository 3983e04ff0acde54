#![forbid(unsafe_code)]

//! Named system colors.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A color from the system palette, or any other RGB value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemColor {
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
    Pink,
    Other { r: u8, g: u8, b: u8 },
}

impl SystemColor {
    /// The named colors, in palette order.
    pub const NAMED: [Self; 7] = [
        Self::Red,
        Self::Orange,
        Self::Yellow,
        Self::Green,
        Self::Blue,
        Self::Purple,
        Self::Pink,
    ];

    /// Display name. Colors outside the palette have an empty name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Red => "System Red",
            Self::Orange => "System Orange",
            Self::Yellow => "System Yellow",
            Self::Green => "System Green",
            Self::Blue => "System Blue",
            Self::Purple => "System Purple",
            Self::Pink => "System Pink",
            Self::Other { .. } => "",
        }
    }

    #[must_use]
    pub fn rgb(&self) -> (u8, u8, u8) {
        match *self {
            Self::Red => (255, 59, 48),
            Self::Orange => (255, 149, 0),
            Self::Yellow => (255, 204, 0),
            Self::Green => (52, 199, 89),
            Self::Blue => (0, 122, 255),
            Self::Purple => (175, 82, 222),
            Self::Pink => (255, 45, 85),
            Self::Other { r, g, b } => (r, g, b),
        }
    }

    /// Palette color with this exact RGB value, else [`SystemColor::Other`].
    #[must_use]
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::NAMED
            .into_iter()
            .find(|color| color.rgb() == (r, g, b))
            .unwrap_or(Self::Other { r, g, b })
    }

    /// `#rrggbb`.
    #[must_use]
    pub fn hex(&self) -> String {
        let (r, g, b) = self.rgb();
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

impl fmt::Display for SystemColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_colors_have_system_names() {
        let names: Vec<_> = SystemColor::NAMED.iter().map(SystemColor::name).collect();
        assert_eq!(names, [
            "System Red",
            "System Orange",
            "System Yellow",
            "System Green",
            "System Blue",
            "System Purple",
            "System Pink",
        ]);
    }

    #[test]
    fn unknown_color_has_empty_name() {
        let gray = SystemColor::Other { r: 128, g: 128, b: 128 };
        assert_eq!(gray.name(), "");
        assert_eq!(gray.to_string(), "");
        assert_eq!(gray.hex(), "#808080");
    }

    #[test]
    fn from_rgb_recognizes_palette() {
        for color in SystemColor::NAMED {
            let (r, g, b) = color.rgb();
            assert_eq!(SystemColor::from_rgb(r, g, b), color);
        }
        assert_eq!(
            SystemColor::from_rgb(1, 2, 3),
            SystemColor::Other { r: 1, g: 2, b: 3 }
        );
    }
}
