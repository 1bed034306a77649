//! Axum route handlers for the preview API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::preview::estimator::{
    OverflowReport, PageFitEstimator, PreviewOptions, PreviewStyles, SettleSchedule,
};
use crate::preview::metric_surface::{MetricDocument, PreviewGeometry};
use crate::preview::surface::{Border, SurfaceExtent, WarningBanner};
use crate::preview::template::{DimensionCheck, PageTemplate};
use crate::state::AppState;

const CHECK_CONTAINER: &str = "preview-check";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PreviewCheckRequest {
    pub content: String,
    #[serde(default)]
    pub styles: PreviewStyles,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewCheckResponse {
    pub report: OverflowReport,
    pub warning: Option<WarningBanner>,
    pub border: Option<Border>,
    pub page_background: String,
    pub text_color: Option<String>,
    pub extent: Option<SurfaceExtent>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/preview/check
///
/// Lays `content` out on a fresh A5 preview and returns every heuristic's verdict
/// plus the resulting surface state. Overflow is reported, never rejected.
pub async fn handle_preview_check(
    State(state): State<AppState>,
    Json(request): Json<PreviewCheckRequest>,
) -> Result<Json<PreviewCheckResponse>, AppError> {
    let template = state.template;
    let response = tokio::task::spawn_blocking(move || check_content(template, &request))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("preview check task failed: {e}")))??;

    tracing::info!(
        overflowing = response.report.overflowing,
        details = response.report.details.len(),
        "preview check complete"
    );
    Ok(Json(response))
}

/// GET /api/preview/dimensions
pub async fn handle_dimensions(State(state): State<AppState>) -> Json<DimensionCheck> {
    Json(state.template.verify())
}

fn check_content(
    template: PageTemplate,
    request: &PreviewCheckRequest,
) -> Result<PreviewCheckResponse, AppError> {
    let mut document = MetricDocument::new(PreviewGeometry::for_template(&template));
    document.register(CHECK_CONTAINER);

    let options = PreviewOptions {
        styles: request.styles.clone(),
        settle: SettleSchedule::Immediate,
        template,
        ..PreviewOptions::default()
    };
    let estimator =
        PageFitEstimator::create_preview(&mut document, CHECK_CONTAINER, &request.content, options);

    // Empty content leaves the placeholder in place and schedules nothing.
    let report = estimator
        .last_report()
        .or_else(|| estimator.run_overflow_checks())
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("preview surface not mounted")))?;
    let surface = estimator
        .inspect(|s| {
            (
                s.warning(),
                s.border(),
                s.page_background(),
                s.text_color(),
                s.extent().ok(),
            )
        })
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("preview surface not mounted")))?;

    Ok(PreviewCheckResponse {
        report,
        warning: surface.0,
        border: surface.1,
        page_background: surface.2,
        text_color: surface.3,
        extent: surface.4,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::template::A5;

    fn request(content: &str) -> PreviewCheckRequest {
        PreviewCheckRequest {
            content: content.to_string(),
            styles: PreviewStyles::default(),
        }
    }

    #[test]
    fn test_short_content_reports_no_overflow() {
        let response = check_content(A5, &request("<p>Curtain up at 7.30pm</p>")).unwrap();
        assert!(!response.report.overflowing);
        assert_eq!(response.report.results.len(), 3);
        assert!(!response.warning.unwrap().visible);
        assert!(response.border.is_none());
    }

    #[test]
    fn test_long_content_reports_overflow_with_border() {
        let content = "<p>The interval lasts twenty minutes; refreshments are served in the foyer.</p>"
            .repeat(40);
        let response = check_content(A5, &request(&content)).unwrap();
        assert!(response.report.overflowing);
        assert!(response.warning.unwrap().visible);
        assert!(response.border.is_some());
        assert!(response.extent.unwrap().scroll_height > 357.0);
    }

    #[test]
    fn test_empty_content_measures_placeholder() {
        let response = check_content(A5, &request("")).unwrap();
        assert!(!response.report.overflowing);
        assert!(!response.warning.unwrap().visible);
    }

    #[test]
    fn test_styles_are_echoed() {
        let req = PreviewCheckRequest {
            content: "<p>x</p>".to_string(),
            styles: PreviewStyles {
                background_color: Some("#d4ecd1".to_string()),
                color: Some("#228B22".to_string()),
            },
        };
        let response = check_content(A5, &req).unwrap();
        assert_eq!(response.page_background, "#d4ecd1");
        assert_eq!(response.text_color.as_deref(), Some("#228B22"));
    }
}
