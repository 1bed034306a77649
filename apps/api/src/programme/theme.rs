//! Visual themes for generated programmes.

use std::path::{Path, PathBuf};

use crate::layout::FontFamily;
use crate::render::Rgb;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeName {
    #[default]
    Classic,
    Fairy,
    Forest,
    Arabian,
    Spy,
    Drama,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub name: ThemeName,
    pub text: Rgb,
    pub heading: Rgb,
    pub font: FontFamily,
    /// Separator colour.
    pub accent: Rgb,
}

const THEMES: [Theme; 6] = [
    Theme {
        name: ThemeName::Classic,
        text: Rgb(0x33, 0x33, 0x33),
        heading: Rgb(0x22, 0x22, 0x22),
        font: FontFamily::TimesRoman,
        accent: Rgb(0x00, 0x7b, 0xff),
    },
    Theme {
        name: ThemeName::Fairy,
        text: Rgb(0xe0, 0x70, 0xe0),
        heading: Rgb(0xb0, 0x50, 0xb0),
        font: FontFamily::Courier,
        accent: Rgb(0xf7, 0xca, 0xfc),
    },
    Theme {
        name: ThemeName::Forest,
        text: Rgb(0x22, 0x8b, 0x22),
        heading: Rgb(0x14, 0x59, 0x14),
        font: FontFamily::TimesRoman,
        accent: Rgb(0xd4, 0xec, 0xd1),
    },
    Theme {
        name: ThemeName::Arabian,
        text: Rgb(0xff, 0xd7, 0x00),
        heading: Rgb(0xcf, 0xa1, 0x00),
        font: FontFamily::HelveticaBold,
        accent: Rgb(0xff, 0xfb, 0xe6),
    },
    Theme {
        name: ThemeName::Spy,
        text: Rgb(0x44, 0x44, 0x44),
        heading: Rgb(0x22, 0x22, 0x22),
        font: FontFamily::Helvetica,
        accent: Rgb(0xe4, 0xe4, 0xe4),
    },
    Theme {
        name: ThemeName::Drama,
        text: Rgb(0xb2, 0x22, 0x22),
        heading: Rgb(0x7a, 0x18, 0x18),
        font: FontFamily::TimesBold,
        accent: Rgb(0xff, 0xe5, 0xe5),
    },
];

impl ThemeName {
    pub const ALL: [ThemeName; 6] = [
        ThemeName::Classic,
        ThemeName::Fairy,
        ThemeName::Forest,
        ThemeName::Arabian,
        ThemeName::Spy,
        ThemeName::Drama,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeName::Classic => "classic",
            ThemeName::Fairy => "fairy",
            ThemeName::Forest => "forest",
            ThemeName::Arabian => "arabian",
            ThemeName::Spy => "spy",
            ThemeName::Drama => "drama",
        }
    }

    /// Unknown or missing names fall back to classic.
    pub fn parse(value: Option<&str>) -> Self {
        value
            .and_then(|v| Self::ALL.into_iter().find(|t| t.as_str() == v))
            .unwrap_or_default()
    }

    pub fn theme(self) -> &'static Theme {
        match self {
            ThemeName::Classic => &THEMES[0],
            ThemeName::Fairy => &THEMES[1],
            ThemeName::Forest => &THEMES[2],
            ThemeName::Arabian => &THEMES[3],
            ThemeName::Spy => &THEMES[4],
            ThemeName::Drama => &THEMES[5],
        }
    }
}

impl Theme {
    /// Banner image drawn across the top of every page, if present on disk.
    pub fn border_asset(&self, assets_dir: &Path) -> PathBuf {
        assets_dir.join(format!("{}-border.png", self.name.as_str()))
    }
}
