//! Programme page sequence.
//!
//! Cover, optional cover image, title page, synopsis, cast and crew, optional
//! director's note, optional adverts and sponsors, then one page per photo.
//! Every page opens with the theme's border banner when the asset exists.
//!
//! A picture that fails to load is logged and replaced by a placeholder or a
//! short notice; it never fails the document.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::programme::model::{Credit, Programme};
use crate::programme::theme::Theme;
use crate::preview::template::PageTemplate;
use crate::render::pdf::{Align, ImageBox, PdfWriter, Rgb, TextStyle};
use crate::render::RenderError;

pub const PAGE_MARGIN: f32 = 40.0;

const GRID_PHOTO: f32 = 60.0;
const GRID_SPACING: f32 = 90.0;
const GRID_ROW: f32 = 100.0;
const GRID_COLUMNS: usize = 3;

/// Lays out `programme` on `template` pages and returns the PDF bytes.
pub fn render_programme(
    programme: &Programme,
    template: &PageTemplate,
    assets_dir: &Path,
) -> Result<Vec<u8>, RenderError> {
    let theme = programme.theme.theme();
    let border = Some(theme.border_asset(assets_dir)).filter(|p| p.exists());

    let mut composer = Composer {
        w: PdfWriter::new(template, PAGE_MARGIN, programme.title()),
        programme,
        theme,
        border,
    };
    composer.cover();
    composer.cover_image();
    composer.title_page();
    composer.synopsis();
    composer.credits();
    composer.director_note();
    composer.adverts();
    composer.photos();
    composer.w.finish()
}

struct Composer<'a> {
    w: PdfWriter,
    programme: &'a Programme,
    theme: &'static Theme,
    border: Option<PathBuf>,
}

impl Composer<'_> {
    fn heading(&self, size: f32) -> TextStyle {
        TextStyle::new(self.theme.font, size, self.theme.heading)
    }

    fn body(&self, size: f32) -> TextStyle {
        TextStyle::new(self.theme.font, size, self.theme.text)
    }

    fn new_page(&mut self) {
        self.w.add_page();
        self.themed_border();
    }

    fn themed_border(&mut self) {
        let Some(border) = self.border.clone() else {
            return;
        };
        let margin = self.w.margin();
        let placement = ImageBox::stretch(self.w.content_width(), 24.0).at(margin, margin - 20.0);
        if let Err(e) = self.w.image(&border, placement) {
            warn!(path = %border.display(), error = %e, "failed to draw theme border");
        }
        self.w.move_down(1.2);
    }

    fn section_title(&mut self, title: &str) {
        self.new_page();
        self.w.text(title, &self.heading(18.0).align(Align::Center));
        self.w.move_down(1.0);
        self.w.separator(self.theme.accent, 1.5);
    }

    /// Draws an optional picture, logging and reporting failure.
    fn picture(&mut self, path: &Path, placement: ImageBox, what: &str) -> bool {
        match self.w.image(path, placement) {
            Ok(_) => true,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load {what}");
                false
            }
        }
    }

    // ── pages ───────────────────────────────────────────────────────────────

    fn cover(&mut self) {
        let programme = self.programme;
        self.themed_border();
        if let Some(logo) = &programme.logo {
            self.picture(logo, ImageBox::fit(80.0, 40.0), "logo");
        }
    }

    fn cover_image(&mut self) {
        let programme = self.programme;
        let Some(cover) = &programme.cover_image else {
            return;
        };
        self.new_page();
        let (width, height) = (self.w.page_width(), self.w.page_height());
        if !self.picture(cover, ImageBox::fit(width - 80.0, height - 120.0).centered(), "cover image") {
            return;
        }
        if programme.overlay_info {
            let overlay = TextStyle::new(self.theme.font, 16.0, Rgb::WHITE).align(Align::Center);
            let margin = self.w.margin();
            let column = self.w.content_width();
            self.w
                .text_at(programme.title(), &overlay, margin, height - 100.0, column);
            let line = format!(
                "{} | {}",
                programme.date.as_deref().unwrap_or_default(),
                programme.venue.as_deref().unwrap_or_default()
            );
            self.w.text(&line, &TextStyle { size: 12.0, ..overlay });
        }
    }

    fn title_page(&mut self) {
        let p = self.programme;
        if p.cover_image.is_some() && p.overlay_info {
            return;
        }
        if p.cover_image.is_some() {
            self.new_page();
        }

        self.w.text(p.title(), &self.heading(24.0).align(Align::Center));
        self.w.move_down(0.5);
        let details = self.body(14.0).align(Align::Center);
        self.w.text(p.date.as_deref().unwrap_or_default(), &details);
        self.w.text(p.venue.as_deref().unwrap_or_default(), &details);
        self.w.text(
            &format!("Director: {}", p.director.as_deref().unwrap_or_default()),
            &details,
        );
        self.w.move_down(1.0);

        if let Some(contact) = &p.contact_info {
            self.w.separator(self.theme.accent, 1.5);
            self.w
                .text("Contact Information:", &self.heading(12.0).align(Align::Center));
            self.w.text(contact, &self.body(10.0).align(Align::Center));
            self.w.move_down(1.0);
        }
    }

    fn synopsis(&mut self) {
        self.section_title("Synopsis");
        let synopsis = self.programme.synopsis.as_deref().unwrap_or_default();
        self.w.text(synopsis, &self.body(12.0).align(Align::Justify));
    }

    fn credits(&mut self) {
        let programme = self.programme;
        self.section_title("Cast & Crew");
        self.w.text("Cast:", &self.heading(15.0).underline());
        self.w.move_down(0.3);

        if programme.uses_photo_grid() {
            self.cast_grid();
        } else {
            let style = self.body(11.0);
            for member in programme.cast.iter().filter(|m| m.is_listed()) {
                self.w.text(&member.list_line(), &style);
            }
        }
        self.w.move_down(1.0);

        self.w.text("Crew:", &self.heading(15.0).underline());
        let style = self.body(11.0);
        for member in programme.crew.iter().filter(|m| m.is_listed()) {
            self.w.text(&member.list_line(), &style);
        }
    }

    fn cast_grid(&mut self) {
        let programme = self.programme;
        let margin = self.w.margin();
        let bottom = self.w.page_height() - margin;
        let name_style = self.body(9.0).align(Align::Center);
        let role_style = TextStyle::new(self.theme.font, 8.0, Rgb::GREY).align(Align::Center);

        let mut x = margin;
        let mut y = self.w.y();
        let mut column = 0;

        for member in programme.cast.iter().filter(|m| m.is_listed()) {
            if column >= GRID_COLUMNS {
                column = 0;
                x = margin;
                y += GRID_ROW;
            }
            if y + GRID_ROW > bottom {
                self.new_page();
                y = self.w.y();
            }

            let placed = member.photo.as_deref().is_some_and(|photo| {
                let placement = ImageBox::fit(GRID_PHOTO, GRID_PHOTO).at(x, y).centered();
                self.picture(photo, placement, "cast photo")
            });
            if !placed {
                self.w
                    .fill_rect(x, y, GRID_PHOTO, GRID_PHOTO, Rgb::PLACEHOLDER);
            }

            self.w
                .text_at(&member.name, &name_style, x, y + GRID_PHOTO + 5.0, GRID_PHOTO);
            self.w
                .text_at(&member.role, &role_style, x, y + GRID_PHOTO + 18.0, GRID_PHOTO);

            x += GRID_SPACING;
            column += 1;
        }

        self.w.set_y(y + 120.0);
    }

    fn director_note(&mut self) {
        let programme = self.programme;
        let Some(note) = &programme.director_note else {
            return;
        };
        self.section_title("Director's Note");

        let mut width = self.w.content_width();
        if let Some(photo) = &programme.director_photo {
            let x = self.w.page_width() - self.w.margin() - 80.0;
            let mut placement = ImageBox::fit(80.0, 80.0);
            placement.x = Some(x);
            placement.align = Align::Right;
            self.picture(photo, placement, "director photo");
            width = self.w.page_width() - 120.0;
        }

        let margin = self.w.margin();
        self.w
            .text_in(note, &self.body(12.0).align(Align::Justify), margin, width);
        self.w.move_down(1.0);
        if let Some(director) = &programme.director {
            self.w
                .text(&format!("- {director}"), &self.heading(11.0).align(Align::Right));
        }
    }

    fn adverts(&mut self) {
        let programme = self.programme;
        if !programme.has_adverts_page() {
            return;
        }
        self.section_title("Adverts & Sponsors");

        let page_width = self.w.page_width();
        for advert in &programme.adverts {
            self.w.text(&advert.title, &self.heading(14.0));
            if let Some(image) = &advert.image {
                let placement = ImageBox::fit(
                    advert.layout.image_width(page_width),
                    advert.layout.image_height(),
                );
                if !self.picture(image, placement, "advert image") {
                    self.w.text(
                        "Error loading advert image",
                        &TextStyle::new(self.theme.font, 10.0, Rgb::RED),
                    );
                }
            }
            self.w.move_down(1.0);
        }

        if let Some(sponsors) = &programme.sponsor_info {
            self.w.text("Our Sponsors:", &self.heading(15.0).underline());
            self.w.text(sponsors, &self.body(11.0));
        }
    }

    fn photos(&mut self) {
        let programme = self.programme;
        let (width, height) = (self.w.page_width(), self.w.page_height());
        for (idx, photo) in programme.photos.iter().enumerate() {
            self.new_page();
            self.w.text(
                &format!("Photo {}", idx + 1),
                &self.heading(15.0).align(Align::Center),
            );
            self.w.move_down(0.5);
            let placement = ImageBox::fit(width - 80.0, height - 130.0).centered();
            if !self.picture(photo, placement, "photo") {
                self.w.text(
                    "Error displaying photo",
                    &TextStyle::new(self.theme.font, 10.0, Rgb::RED).align(Align::Center),
                );
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::programme::model::{Advert, AdvertLayout, CastMember, CreditsLayout, CrewMember};
    use crate::programme::theme::ThemeName;
    use crate::preview::template::A5;
    use lopdf::Document;

    fn png(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        image::RgbImage::from_pixel(6, 4, image::Rgb([30, 90, 30]))
            .save(&path)
            .unwrap();
        path
    }

    fn page_count(bytes: &[u8]) -> usize {
        Document::load_mem(bytes).unwrap().get_pages().len()
    }

    fn minimal() -> Programme {
        Programme {
            play_name: Some("The Importance of Being Earnest".to_string()),
            synopsis: Some("Two bachelors invent alter egos.".to_string()),
            cast: vec![CastMember {
                name: "Ada".to_string(),
                role: "Gwendolen".to_string(),
                photo: None,
            }],
            crew: vec![CrewMember {
                name: "Sam".to_string(),
                role: "Lighting".to_string(),
            }],
            ..Programme::default()
        }
    }

    #[test]
    fn test_minimal_programme_has_three_pages() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = render_programme(&minimal(), &A5, dir.path()).unwrap();
        assert_eq!(page_count(&bytes), 3);
    }

    #[test]
    fn test_full_programme_page_sequence() {
        let dir = tempfile::tempdir().unwrap();
        png(dir.path(), "forest-border.png");
        let programme = Programme {
            theme: ThemeName::Forest,
            credits_layout: CreditsLayout::Grid,
            director: Some("Morgan".to_string()),
            director_note: Some("Thank you for coming.".to_string()),
            director_photo: Some(png(dir.path(), "director.png")),
            contact_info: Some("box office 01234 567890".to_string()),
            sponsor_info: Some("The Village Bakery".to_string()),
            cover_image: Some(png(dir.path(), "cover.png")),
            logo: Some(png(dir.path(), "logo.png")),
            adverts: vec![Advert {
                title: "Hair by Jo".to_string(),
                layout: AdvertLayout::Half,
                image: Some(png(dir.path(), "advert.png")),
            }],
            photos: vec![png(dir.path(), "a.png"), png(dir.path(), "b.png")],
            cast: vec![
                CastMember {
                    name: "Ada".to_string(),
                    role: "Gwendolen".to_string(),
                    photo: Some(png(dir.path(), "ada.png")),
                },
                CastMember {
                    name: "Bo".to_string(),
                    role: "Cecily".to_string(),
                    photo: None,
                },
            ],
            ..minimal()
        };

        // cover, cover image, title, synopsis, credits, note, adverts, 2 photos
        let bytes = render_programme(&programme, &A5, dir.path()).unwrap();
        assert_eq!(page_count(&bytes), 9);

        let overlaid = Programme {
            overlay_info: true,
            ..programme
        };
        let bytes = render_programme(&overlaid, &A5, dir.path()).unwrap();
        assert_eq!(page_count(&bytes), 8);
    }

    #[test]
    fn test_missing_pictures_do_not_fail_generation() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("deleted.png");
        let programme = Programme {
            credits_layout: CreditsLayout::Grid,
            logo: Some(gone.clone()),
            photos: vec![gone.clone()],
            cast: vec![CastMember {
                name: "Ada".to_string(),
                role: "Gwendolen".to_string(),
                photo: Some(gone.clone()),
            }],
            adverts: vec![Advert {
                title: "Teas".to_string(),
                layout: AdvertLayout::Quarter,
                image: Some(gone),
            }],
            ..minimal()
        };
        let bytes = render_programme(&programme, &A5, dir.path()).unwrap();
        assert_eq!(page_count(&bytes), 5);
    }

    #[test]
    fn test_large_cast_grid_spills_onto_next_page() {
        let dir = tempfile::tempdir().unwrap();
        let photo = png(dir.path(), "face.png");
        let cast = (0..15)
            .map(|i| CastMember {
                name: format!("Player {i}"),
                role: "Chorus".to_string(),
                photo: Some(photo.clone()),
            })
            .collect();
        let programme = Programme {
            credits_layout: CreditsLayout::Grid,
            cast,
            ..minimal()
        };
        let bytes = render_programme(&programme, &A5, dir.path()).unwrap();
        assert!(page_count(&bytes) > 3);
    }
}
