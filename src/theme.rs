//! Theme palettes.
//!
//! Maps a theme identifier from the event record to a four-color palette.
//! Unknown, empty, or missing identifiers resolve to the default palette;
//! resolution never fails, so every render has usable colors.

use image::Rgba;

/// Four-color palette resolved once per render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub primary: Rgba<u8>,
    pub secondary: Rgba<u8>,
    pub accent: Rgba<u8>,
    pub background: Rgba<u8>,
}

const fn rgb(r: u8, g: u8, b: u8) -> Rgba<u8> {
    Rgba([r, g, b, 255])
}

/// Known theme identifiers and their palettes.
const THEMES: &[(&str, Palette)] = &[
    ("royal", Palette::DEFAULT),
    (
        "midnight",
        Palette {
            primary: rgb(0x1e, 0x3a, 0x8a),
            secondary: rgb(0x17, 0x25, 0x54),
            accent: rgb(0x38, 0xbd, 0xf8),
            background: rgb(0x02, 0x06, 0x17),
        },
    ),
    (
        "blush",
        Palette {
            primary: rgb(0xbe, 0x18, 0x5d),
            secondary: rgb(0x83, 0x18, 0x43),
            accent: rgb(0xf9, 0xa8, 0xd4),
            background: rgb(0x2a, 0x0a, 0x18),
        },
    ),
    (
        "emerald",
        Palette {
            primary: rgb(0x04, 0x78, 0x57),
            secondary: rgb(0x06, 0x4e, 0x3b),
            accent: rgb(0x6e, 0xe7, 0xb7),
            background: rgb(0x03, 0x1c, 0x16),
        },
    ),
    (
        "noir",
        Palette {
            primary: rgb(0x27, 0x27, 0x2a),
            secondary: rgb(0x18, 0x18, 0x1b),
            accent: rgb(0xea, 0xb3, 0x08),
            background: rgb(0x09, 0x09, 0x0b),
        },
    ),
];

impl Palette {
    /// Fallback palette used whenever the theme id doesn't resolve.
    pub const DEFAULT: Palette = Palette {
        primary: rgb(0x6b, 0x21, 0xa8),
        secondary: rgb(0x58, 0x1c, 0x87),
        accent: rgb(0xfb, 0xbf, 0x24),
        background: rgb(0x1a, 0x10, 0x30),
    };

    /// Resolve a theme id to its palette.
    ///
    /// `None`, the empty string, and unknown ids all yield [`Palette::DEFAULT`].
    pub fn resolve(theme_id: Option<&str>) -> Palette {
        let Some(id) = theme_id else {
            return Palette::DEFAULT;
        };
        THEMES
            .iter()
            .find(|(name, _)| *name == id)
            .map(|(_, palette)| *palette)
            .unwrap_or(Palette::DEFAULT)
    }

    /// Names of all registered themes.
    pub fn known_themes() -> impl Iterator<Item = &'static str> {
        THEMES.iter().map(|(name, _)| *name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn unknown_ids_fall_back_to_default() {
        assert_eq!(Palette::resolve(Some("does-not-exist")), Palette::DEFAULT);
        assert_eq!(Palette::resolve(Some("")), Palette::DEFAULT);
        assert_eq!(Palette::resolve(None), Palette::DEFAULT);
    }

    #[test]
    fn default_palette_matches_documented_colors() {
        let p = Palette::DEFAULT;
        assert_eq!(p.primary, Rgba([0x6b, 0x21, 0xa8, 255]));
        assert_eq!(p.secondary, Rgba([0x58, 0x1c, 0x87, 255]));
        assert_eq!(p.accent, Rgba([0xfb, 0xbf, 0x24, 255]));
        assert_eq!(p.background, Rgba([0x1a, 0x10, 0x30, 255]));
    }

    #[test]
    fn known_themes_resolve_with_opaque_colors() {
        for name in Palette::known_themes() {
            let p = Palette::resolve(Some(name));
            for c in [p.primary, p.secondary, p.accent, p.background] {
                assert_eq!(c.0[3], 255, "theme {name} has a translucent color");
            }
        }
    }

    #[test]
    fn royal_is_the_default_palette() {
        assert_eq!(Palette::resolve(Some("royal")), Palette::DEFAULT);
    }
}
