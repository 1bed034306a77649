//! Multipart programme form intake.
//!
//! Text fields arrive as `name` or `name[]`, repeated for list entries. Upload
//! fields are stored on disk as they stream in, under a timestamped name, and
//! are capped per field. The n-th cast photo belongs to the n-th cast member,
//! and likewise for advert images.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::programme::model::{
    Advert, AdvertLayout, CastMember, CreditsLayout, CrewMember, Programme,
};
use crate::programme::theme::ThemeName;

/// Upload fields and the most files each accepts.
pub const UPLOAD_FIELDS: [(&str, usize); 6] = [
    ("photos", 4),
    ("logo", 1),
    ("coverImage", 1),
    ("directorPhoto", 1),
    ("castPhoto", 15),
    ("advertImage", 10),
];

#[derive(Debug, Default)]
pub struct Submission {
    fields: HashMap<String, Vec<String>>,
    files: HashMap<&'static str, Vec<PathBuf>>,
}

impl Submission {
    pub fn push_text(&mut self, name: &str, value: String) {
        let name = name.strip_suffix("[]").unwrap_or(name);
        self.fields.entry(name.to_string()).or_default().push(value);
    }

    /// Checks that one more file may be stored under `field`, returning its canonical name.
    pub fn accept_file(&self, field: &str) -> Result<&'static str, AppError> {
        let (name, max) = UPLOAD_FIELDS
            .iter()
            .find(|(name, _)| *name == field)
            .ok_or_else(|| AppError::Validation(format!("Unexpected file field '{field}'")))?;
        if self.files(name).len() >= *max {
            return Err(AppError::Validation(format!(
                "Too many files for '{name}' (at most {max})"
            )));
        }
        Ok(*name)
    }

    pub fn push_file(&mut self, field: &'static str, path: PathBuf) {
        self.files.entry(field).or_default().push(path);
    }

    /// First value of a text field; blank values count as absent.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .and_then(|values| values.first())
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    pub fn texts(&self, name: &str) -> &[String] {
        self.fields.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn files(&self, name: &str) -> &[PathBuf] {
        self.files.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    fn file(&self, name: &str) -> Option<PathBuf> {
        self.files(name).first().cloned()
    }

    pub fn into_programme(self) -> Programme {
        let cast_roles = self.texts("castRole");
        let cast_photos = self.files("castPhoto");
        let cast = self
            .texts("castName")
            .iter()
            .enumerate()
            .map(|(i, name)| CastMember {
                name: name.trim().to_string(),
                role: cast_roles.get(i).map(|r| r.trim().to_string()).unwrap_or_default(),
                photo: cast_photos.get(i).cloned(),
            })
            .collect();

        let crew_roles = self.texts("crewRole");
        let crew = self
            .texts("crewName")
            .iter()
            .enumerate()
            .map(|(i, name)| CrewMember {
                name: name.trim().to_string(),
                role: crew_roles.get(i).map(|r| r.trim().to_string()).unwrap_or_default(),
            })
            .collect();

        let advert_layouts = self.texts("advertLayout");
        let advert_images = self.files("advertImage");
        let adverts = self
            .texts("advertTitle")
            .iter()
            .enumerate()
            .filter(|(_, title)| !title.trim().is_empty())
            .map(|(i, title)| Advert {
                title: title.trim().to_string(),
                layout: AdvertLayout::parse(advert_layouts.get(i).map(String::as_str)),
                image: advert_images.get(i).cloned(),
            })
            .collect();

        Programme {
            theme: ThemeName::parse(self.text("theme").as_deref()),
            play_name: self.text("playName"),
            date: self.text("date"),
            venue: self.text("venue"),
            synopsis: self.text("synopsis"),
            director: self.text("director"),
            contact_info: self.text("contactInfo"),
            director_note: self.text("directorNote"),
            sponsor_info: self.text("sponsorInfo"),
            credits_layout: CreditsLayout::parse(self.text("creditsLayout").as_deref()),
            overlay_info: self.text("overlayInfo").is_some(),
            cast,
            crew,
            adverts,
            logo: self.file("logo"),
            cover_image: self.file("coverImage"),
            director_photo: self.file("directorPhoto"),
            photos: self.files("photos").to_vec(),
        }
    }
}

/// Keeps the final path component of an uploaded file name, limited to safe characters.
pub fn sanitise_file_name(original: &str) -> String {
    let base = original.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

/// On-disk name for an upload; `id` keeps same-named parts apart.
pub fn stored_file_name(unix_millis: i64, id: Uuid, original: &str) -> String {
    format!("{unix_millis}-{}-{}", id.simple(), sanitise_file_name(original))
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::Validation(e.body_text())
    }
}

/// Reads every part of the form, writing uploads into `upload_dir`.
pub async fn read_submission(
    mut multipart: Multipart,
    upload_dir: &Path,
) -> Result<Submission, AppError> {
    let mut submission = Submission::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        let Some(original) = field.file_name().map(str::to_string) else {
            let value = field.text().await.map_err(multipart_error)?;
            submission.push_text(&name, value);
            continue;
        };

        let field_name = submission.accept_file(name.strip_suffix("[]").unwrap_or(&name))?;
        let data = field.bytes().await.map_err(multipart_error)?;
        if data.is_empty() {
            continue;
        }

        let stored = stored_file_name(
            chrono::Utc::now().timestamp_millis(),
            Uuid::new_v4(),
            &original,
        );
        let path = upload_dir.join(&stored);
        tokio::fs::write(&path, &data)
            .await
            .map_err(|e| AppError::Internal(anyhow::Error::new(e).context("failed to store upload")))?;
        debug!(field = field_name, path = %path.display(), bytes = data.len(), "stored upload");
        submission.push_file(field_name, path);
    }

    Ok(submission)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(fields: &[(&str, &str)]) -> Submission {
        let mut s = Submission::default();
        for (name, value) in fields {
            s.push_text(name, value.to_string());
        }
        s
    }

    #[test]
    fn test_bracketed_names_merge_with_plain() {
        let s = submission(&[("castName[]", "Ada"), ("castName", "Bo")]);
        assert_eq!(s.texts("castName"), ["Ada".to_string(), "Bo".to_string()]);
    }

    #[test]
    fn test_blank_text_is_absent() {
        let s = submission(&[("venue", "   "), ("date", "12 May")]);
        assert_eq!(s.text("venue"), None);
        assert_eq!(s.text("date").as_deref(), Some("12 May"));
        assert_eq!(s.text("director"), None);
    }

    #[test]
    fn test_upload_limits() {
        let mut s = Submission::default();
        assert_eq!(s.accept_file("logo").unwrap(), "logo");
        s.push_file("logo", PathBuf::from("uploads/1-logo.png"));
        assert!(matches!(s.accept_file("logo"), Err(AppError::Validation(_))));
        assert!(matches!(s.accept_file("headshot"), Err(AppError::Validation(_))));

        for i in 0..4 {
            let field = s.accept_file("photos").unwrap();
            s.push_file(field, PathBuf::from(format!("uploads/{i}.png")));
        }
        assert!(s.accept_file("photos").is_err());
        assert!(s.accept_file("castPhoto").is_ok());
    }

    #[test]
    fn test_sanitised_names() {
        assert_eq!(sanitise_file_name("poster.png"), "poster.png");
        assert_eq!(sanitise_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitise_file_name("C:\\photos\\my face.jpg"), "my_face.jpg");
        assert_eq!(sanitise_file_name(".."), "upload");
        assert_eq!(
            stored_file_name(1700000000000, Uuid::nil(), "a b.png"),
            "1700000000000-00000000000000000000000000000000-a_b.png"
        );
    }

    #[tokio::test]
    async fn test_same_named_uploads_are_stored_separately() {
        use axum::body::Body;
        use axum::extract::FromRequest;
        use axum::http::{header, Request};

        const BOUNDARY: &str = "playbill-form";
        let mut body = String::new();
        for data in ["first-photo-bytes", "second-photo-bytes"] {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"castPhoto\"; filename=\"image.jpg\"\r\nContent-Type: image/jpeg\r\n\r\n{data}\r\n"
            ));
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        let request = Request::builder()
            .method("POST")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        let multipart = Multipart::from_request(request, &()).await.unwrap();

        let dir = tempfile::tempdir().unwrap();
        let submission = read_submission(multipart, dir.path()).await.unwrap();
        let stored = submission.files("castPhoto");
        assert_eq!(stored.len(), 2);
        assert_ne!(stored[0], stored[1]);
        assert_eq!(std::fs::read_to_string(&stored[0]).unwrap(), "first-photo-bytes");
        assert_eq!(std::fs::read_to_string(&stored[1]).unwrap(), "second-photo-bytes");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_into_programme_pairs_lists_by_index() {
        let mut s = submission(&[
            ("theme", "spy"),
            ("playName", "Hamlet"),
            ("creditsLayout", "grid"),
            ("overlayInfo", "on"),
            ("castName[]", "Ada"),
            ("castRole[]", "Ophelia"),
            ("castName[]", "Bo"),
            ("crewName[]", "Sam"),
            ("crewRole[]", "Sound"),
            ("advertTitle[]", ""),
            ("advertLayout[]", "half"),
            ("advertTitle[]", "Teas"),
            ("advertLayout[]", "quarter"),
        ]);
        s.push_file("castPhoto", PathBuf::from("uploads/ada.png"));
        s.push_file("advertImage", PathBuf::from("uploads/blank.png"));
        s.push_file("advertImage", PathBuf::from("uploads/teas.png"));

        let p = s.into_programme();
        assert_eq!(p.theme, ThemeName::Spy);
        assert_eq!(p.title(), "Hamlet");
        assert!(p.overlay_info);
        assert_eq!(p.credits_layout, CreditsLayout::Grid);

        assert_eq!(p.cast.len(), 2);
        assert_eq!(p.cast[0].photo, Some(PathBuf::from("uploads/ada.png")));
        assert_eq!(p.cast[1].role, "");
        assert_eq!(p.cast[1].photo, None);
        assert_eq!(p.crew[0].role, "Sound");

        assert_eq!(p.adverts.len(), 1);
        assert_eq!(p.adverts[0].title, "Teas");
        assert_eq!(p.adverts[0].layout, AdvertLayout::Quarter);
        assert_eq!(p.adverts[0].image, Some(PathBuf::from("uploads/teas.png")));
    }

    #[test]
    fn test_empty_form_defaults() {
        let p = Submission::default().into_programme();
        assert_eq!(p.theme, ThemeName::Classic);
        assert_eq!(p.title(), "Play Name");
        assert!(!p.overlay_info);
        assert!(p.cast.is_empty());
        assert!(!p.has_adverts_page());
    }
}
