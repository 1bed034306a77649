//! Axum route handlers for programme generation.

use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
};
use tracing::info;

use crate::errors::AppError;
use crate::programme::form::read_submission;
use crate::render::render_programme;
use crate::state::AppState;

/// POST /generate
///
/// Accepts the programme form with its uploads and responds with the PDF as an
/// attachment named after the play.
pub async fn handle_generate(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let submission = read_submission(multipart, &state.config.upload_dir).await?;
    let programme = submission.into_programme();
    let disposition = attachment_disposition(programme.play_name.as_deref());

    info!(
        theme = programme.theme.as_str(),
        cast = programme.cast.len(),
        photos = programme.photos.len(),
        "generating programme"
    );

    let template = state.template;
    let assets_dir = state.config.theme_assets_dir.clone();
    let pdf = tokio::task::spawn_blocking(move || {
        render_programme(&programme, &template, &assets_dir)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("render task failed: {e}")))??;

    info!(bytes = pdf.len(), "programme generated");

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        pdf,
    )
        .into_response())
}

/// `attachment; filename="<play name>.pdf"`, reduced to header-safe characters.
pub fn attachment_disposition(play_name: Option<&str>) -> String {
    let stem: String = play_name
        .unwrap_or("programme")
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("attachment; filename=\"{stem}.pdf\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disposition_defaults_to_programme() {
        assert_eq!(
            attachment_disposition(None),
            "attachment; filename=\"programme.pdf\""
        );
    }

    #[test]
    fn test_disposition_keeps_header_safe() {
        assert_eq!(
            attachment_disposition(Some("Les Misérables \"Live\"")),
            "attachment; filename=\"Les Mis_rables _Live_.pdf\""
        );
    }
}
