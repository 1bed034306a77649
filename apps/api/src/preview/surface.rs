//! The layout substrate a preview estimator measures against.
//!
//! A surface bundles the page box, the content box inside it, the warning banner
//! and a way to open off-screen scratch areas. Any layout engine that can answer
//! these questions can host a preview; [`super::metric_surface`] is the one this
//! crate ships.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layout::Typography;

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

/// Scrollable and visible extent of the content box, both axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SurfaceExtent {
    pub scroll_width: f32,
    pub scroll_height: f32,
    pub client_width: f32,
    pub client_height: f32,
}

/// Effective overflow clipping of the content box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowStyle {
    Visible,
    Hidden,
    Clip,
    Scroll,
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Border {
    pub width_px: f32,
    pub color: &'static str,
    pub radius_px: f32,
}

/// Border drawn around content that overflows the page.
pub const ERROR_BORDER: Border = Border {
    width_px: 2.0,
    color: "#dc3545",
    radius_px: 4.0,
};

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct WarningBanner {
    pub visible: bool,
    pub text: String,
}

/// Handle of an open scratch area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScratchId(pub u64);

/// What a surface renders when a preview is mounted onto it.
#[derive(Debug, Clone, PartialEq)]
pub struct MountLayout {
    pub title: Option<String>,
    pub placeholder: String,
    pub label: Option<String>,
    /// Initial banner text; `None` when overflow warnings are disabled.
    pub warning: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeasureError {
    #[error("surface is not attached to a layout")]
    Detached,

    #[error("scratch area {0:?} is not open")]
    UnknownScratch(ScratchId),

    #[error("measurement failed: {0}")]
    Failed(String),
}

// ────────────────────────────────────────────────────────────────────────────
// Traits
// ────────────────────────────────────────────────────────────────────────────

/// A mounted preview: page box, content box, banner and scratch areas.
///
/// Setters never fail; measurement may. Setting the banner on a surface
/// mounted without one is ignored.
pub trait PreviewSurface: Send {
    fn mount(&mut self, layout: &MountLayout);

    fn markup(&self) -> String;
    fn set_markup(&mut self, markup: &str);

    fn page_background(&self) -> String;
    fn set_page_background(&mut self, color: &str);

    fn text_color(&self) -> Option<String>;
    fn set_text_color(&mut self, color: &str);

    fn border(&self) -> Option<Border>;
    fn set_border(&mut self, border: Option<Border>);

    fn warning(&self) -> Option<WarningBanner>;
    /// Shows or hides the banner; `text: None` keeps the current text.
    fn set_warning(&mut self, visible: bool, text: Option<&str>);

    fn extent(&self) -> Result<SurfaceExtent, MeasureError>;
    fn overflow_style(&self) -> Result<OverflowStyle, MeasureError>;

    fn open_scratch(&mut self, typography: &Typography) -> Result<ScratchId, MeasureError>;
    /// Replaces the scratch area's content and returns its natural height.
    fn scratch_height(&mut self, id: ScratchId, markup: &str) -> Result<f32, MeasureError>;
    fn close_scratch(&mut self, id: ScratchId);
}

/// Resolves container ids to surfaces.
pub trait SurfaceHost {
    fn find_surface(&mut self, container_id: &str) -> Option<Box<dyn PreviewSurface>>;
}

// ────────────────────────────────────────────────────────────────────────────
// Scoped scratch area
// ────────────────────────────────────────────────────────────────────────────

/// An off-screen scratch area that is closed when dropped, on every exit path.
pub struct ScratchArea<'s> {
    surface: &'s mut dyn PreviewSurface,
    id: ScratchId,
}

impl<'s> ScratchArea<'s> {
    pub fn open(
        surface: &'s mut dyn PreviewSurface,
        typography: &Typography,
    ) -> Result<Self, MeasureError> {
        let id = surface.open_scratch(typography)?;
        Ok(Self { surface, id })
    }

    pub fn measure(&mut self, markup: &str) -> Result<f32, MeasureError> {
        self.surface.scratch_height(self.id, markup)
    }
}

impl Drop for ScratchArea<'_> {
    fn drop(&mut self) {
        self.surface.close_scratch(self.id);
    }
}
