//! Physical page templates and the preview box that stands in for them on screen.

use serde::Serialize;

use crate::layout::{FontFamily, Typography};

/// Largest accepted difference between the physical and on-screen aspect ratios.
pub const RATIO_TOLERANCE: f64 = 0.0001;

const POINTS_PER_MM: f64 = 72.0 / 25.4;

/// A fixed physical page and its preview rendition.
///
/// The preview box keeps 0.1 px of height precision: at 280 px wide, the
/// integer box 280 × 397 is off the A5 ratio by 5.3e-4, which the ratio check
/// rejects; 397.3 px is within 5e-6.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageTemplate {
    pub name: &'static str,
    pub width_mm: f64,
    pub height_mm: f64,
    pub preview_width_px: f64,
    pub preview_height_px: f64,
    /// Padding between the preview page edge and its content surface.
    pub preview_padding_px: f64,
    /// Text column of the physical renderer, in preview px.
    pub content_width_px: f32,
    /// Usable content height of the physical page, in preview px.
    pub content_height_px: f32,
    /// Slack allowed before the virtual reflow declares overflow.
    pub content_tolerance_px: f32,
}

pub const A5: PageTemplate = PageTemplate {
    name: "A5",
    width_mm: 148.0,
    height_mm: 210.0,
    preview_width_px: 280.0,
    preview_height_px: 397.3,
    preview_padding_px: 20.0,
    content_width_px: 240.0,
    content_height_px: 357.0,
    content_tolerance_px: 10.0,
};

impl Default for PageTemplate {
    fn default() -> Self {
        A5
    }
}

/// Result of comparing a template's preview box against its physical ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionCheck {
    pub is_correct: bool,
    pub expected_ratio: f64,
    pub actual_ratio: f64,
    pub difference: f64,
    pub width_px: f64,
    pub height_px: f64,
    pub width_mm: f64,
    pub height_mm: f64,
}

impl PageTemplate {
    pub fn physical_ratio(&self) -> f64 {
        self.width_mm / self.height_mm
    }

    pub fn preview_ratio(&self) -> f64 {
        self.preview_width_px / self.preview_height_px
    }

    /// Caption shown under the preview, e.g. `148mm × 210mm (A5)`.
    pub fn label(&self) -> String {
        format!("{}mm × {}mm ({})", self.width_mm, self.height_mm, self.name)
    }

    /// Physical page size in PDF points.
    pub fn size_pt(&self) -> (f32, f32) {
        (
            (self.width_mm * POINTS_PER_MM) as f32,
            (self.height_mm * POINTS_PER_MM) as f32,
        )
    }

    pub fn verify(&self) -> DimensionCheck {
        let expected_ratio = self.physical_ratio();
        let actual_ratio = self.preview_ratio();
        let difference = (expected_ratio - actual_ratio).abs();
        DimensionCheck {
            is_correct: difference < RATIO_TOLERANCE,
            expected_ratio,
            actual_ratio,
            difference,
            width_px: self.preview_width_px,
            height_px: self.preview_height_px,
            width_mm: self.width_mm,
            height_mm: self.height_mm,
        }
    }

    /// Typography of the physical renderer's text column, used for off-screen measurement.
    pub fn renderer_typography(&self) -> Typography {
        Typography {
            font: FontFamily::TimesRoman,
            font_size_px: 11.0,
            line_height: 1.4,
            width_px: self.content_width_px,
            break_words: true,
        }
    }
}

/// Checks the A5 preview box against the A5 paper ratio.
pub fn verify_a5_dimensions() -> DimensionCheck {
    A5.verify()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
