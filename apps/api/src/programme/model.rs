//! Programme submission model: everything one printed programme is built from.

use std::path::PathBuf;

use crate::programme::theme::ThemeName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreditsLayout {
    #[default]
    List,
    /// Photo grid; falls back to the list when no cast member has a photo.
    Grid,
}

impl CreditsLayout {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("grid") => CreditsLayout::Grid,
            _ => CreditsLayout::List,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdvertLayout {
    #[default]
    Full,
    Half,
    Quarter,
}

impl AdvertLayout {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("half") => AdvertLayout::Half,
            Some("quarter") => AdvertLayout::Quarter,
            _ => AdvertLayout::Full,
        }
    }

    /// Image box width on a page `page_width` points wide.
    pub fn image_width(self, page_width: f32) -> f32 {
        match self {
            AdvertLayout::Full => page_width - 80.0,
            AdvertLayout::Half => (page_width - 100.0) / 2.0,
            AdvertLayout::Quarter => (page_width - 120.0) / 3.0,
        }
    }

    pub fn image_height(self) -> f32 {
        match self {
            AdvertLayout::Quarter => 80.0,
            _ => 120.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CastMember {
    pub name: String,
    pub role: String,
    pub photo: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CrewMember {
    pub name: String,
    pub role: String,
}

/// Only credits with both a name and a role are printed.
pub trait Credit {
    fn name(&self) -> &str;
    fn role(&self) -> &str;

    fn is_listed(&self) -> bool {
        !self.name().is_empty() && !self.role().is_empty()
    }

    fn list_line(&self) -> String {
        format!("{} ....... {}", self.name(), self.role())
    }
}

impl Credit for CastMember {
    fn name(&self) -> &str {
        &self.name
    }
    fn role(&self) -> &str {
        &self.role
    }
}

impl Credit for CrewMember {
    fn name(&self) -> &str {
        &self.name
    }
    fn role(&self) -> &str {
        &self.role
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Advert {
    pub title: String,
    pub layout: AdvertLayout,
    pub image: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Programme {
    pub theme: ThemeName,
    pub play_name: Option<String>,
    pub date: Option<String>,
    pub venue: Option<String>,
    pub synopsis: Option<String>,
    pub director: Option<String>,
    pub contact_info: Option<String>,
    pub director_note: Option<String>,
    pub sponsor_info: Option<String>,
    pub credits_layout: CreditsLayout,
    /// Print name, date and venue over the cover image instead of on a title page.
    pub overlay_info: bool,
    pub cast: Vec<CastMember>,
    pub crew: Vec<CrewMember>,
    pub adverts: Vec<Advert>,
    pub logo: Option<PathBuf>,
    pub cover_image: Option<PathBuf>,
    pub director_photo: Option<PathBuf>,
    pub photos: Vec<PathBuf>,
}

impl Programme {
    pub fn title(&self) -> &str {
        self.play_name.as_deref().unwrap_or("Play Name")
    }

    pub fn uses_photo_grid(&self) -> bool {
        self.credits_layout == CreditsLayout::Grid && self.cast.iter().any(|m| m.photo.is_some())
    }

    pub fn has_adverts_page(&self) -> bool {
        !self.adverts.is_empty() || self.sponsor_info.is_some()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_parsing_defaults() {
        assert_eq!(CreditsLayout::parse(Some("grid")), CreditsLayout::Grid);
        assert_eq!(CreditsLayout::parse(Some("table")), CreditsLayout::List);
        assert_eq!(AdvertLayout::parse(None), AdvertLayout::Full);
        assert_eq!(AdvertLayout::parse(Some("quarter")), AdvertLayout::Quarter);
    }

    #[test]
    fn test_advert_boxes_on_a5() {
        let width = 419.53;
        assert!((AdvertLayout::Full.image_width(width) - 339.53).abs() < 0.01);
        assert!((AdvertLayout::Half.image_width(width) - 159.765).abs() < 0.01);
        assert_eq!(AdvertLayout::Quarter.image_height(), 80.0);
        assert_eq!(AdvertLayout::Half.image_height(), 120.0);
    }

    #[test]
    fn test_credit_needs_name_and_role() {
        let crew = CrewMember {
            name: "Sam".to_string(),
            role: String::new(),
        };
        assert!(!crew.is_listed());
        let cast = CastMember {
            name: "Ada".to_string(),
            role: "Cecily".to_string(),
            photo: None,
        };
        assert!(cast.is_listed());
        assert_eq!(cast.list_line(), "Ada ....... Cecily");
    }

    #[test]
    fn test_grid_requires_a_photo() {
        let mut programme = Programme {
            credits_layout: CreditsLayout::Grid,
            cast: vec![CastMember {
                name: "Ada".to_string(),
                role: "Cecily".to_string(),
                photo: None,
            }],
            ..Programme::default()
        };
        assert!(!programme.uses_photo_grid());
        programme.cast[0].photo = Some(PathBuf::from("uploads/ada.png"));
        assert!(programme.uses_photo_grid());
    }
}
