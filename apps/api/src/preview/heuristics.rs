//! Overflow heuristics — three independent, imperfect answers to "does it fit?".
//!
//! 1. Scroll extent: scrollable vs visible extent of the content box, with
//!    tolerance bands for sub-pixel rounding.
//! 2. Clipped style: the same comparison without tolerance, only when the
//!    content box clips.
//! 3. Virtual reflow: the markup measured off-screen at the physical renderer's
//!    typography against the page's fixed content height.
//!
//! A heuristic that cannot measure returns `Unavailable` instead of a verdict.

use serde::Serialize;

use crate::layout::Typography;
use crate::preview::surface::{MeasureError, OverflowStyle, PreviewSurface, ScratchArea};
use crate::preview::template::PageTemplate;

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverflowVerdict {
    pub overflow: bool,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HeuristicOutcome {
    Verdict(OverflowVerdict),
    Unavailable { error: String },
}

impl HeuristicOutcome {
    pub fn is_overflow(&self) -> bool {
        matches!(self, HeuristicOutcome::Verdict(v) if v.overflow)
    }
}

impl From<Result<OverflowVerdict, MeasureError>> for HeuristicOutcome {
    fn from(result: Result<OverflowVerdict, MeasureError>) -> Self {
        match result {
            Ok(verdict) => HeuristicOutcome::Verdict(verdict),
            Err(e) => HeuristicOutcome::Unavailable {
                error: e.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Heuristic {
    ScrollExtent,
    ClippedStyle,
    VirtualReflow,
}

/// Thresholds and reference typography the heuristics compare against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeuristicSettings {
    pub vertical_tolerance_px: f32,
    pub horizontal_tolerance_px: f32,
    pub virtual_typography: Typography,
    pub content_height_px: f32,
    pub virtual_tolerance_px: f32,
}

impl HeuristicSettings {
    pub fn for_template(template: &PageTemplate) -> Self {
        Self {
            vertical_tolerance_px: 5.0,
            horizontal_tolerance_px: 2.0,
            virtual_typography: template.renderer_typography(),
            content_height_px: template.content_height_px,
            virtual_tolerance_px: template.content_tolerance_px,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Evaluation
// ────────────────────────────────────────────────────────────────────────────

impl Heuristic {
    pub const ALL: [Heuristic; 3] = [
        Heuristic::ScrollExtent,
        Heuristic::ClippedStyle,
        Heuristic::VirtualReflow,
    ];

    /// 1-based position used in user-facing reasons ("Method 3: ...").
    pub fn number(self) -> usize {
        match self {
            Heuristic::ScrollExtent => 1,
            Heuristic::ClippedStyle => 2,
            Heuristic::VirtualReflow => 3,
        }
    }

    pub fn evaluate(
        self,
        surface: &mut dyn PreviewSurface,
        settings: &HeuristicSettings,
    ) -> HeuristicOutcome {
        let result = match self {
            Heuristic::ScrollExtent => scroll_extent(surface, settings),
            Heuristic::ClippedStyle => clipped_style(surface),
            Heuristic::VirtualReflow => virtual_reflow(surface, settings),
        };
        result.into()
    }
}

fn scroll_extent(
    surface: &dyn PreviewSurface,
    settings: &HeuristicSettings,
) -> Result<OverflowVerdict, MeasureError> {
    let e = surface.extent()?;
    let vertical = e.scroll_height > e.client_height + settings.vertical_tolerance_px;
    let horizontal = e.scroll_width > e.client_width + settings.horizontal_tolerance_px;

    let reason = if vertical {
        format!(
            "Content height ({}px) exceeds container ({}px)",
            e.scroll_height, e.client_height
        )
    } else if horizontal {
        format!(
            "Content width ({}px) exceeds container ({}px)",
            e.scroll_width, e.client_width
        )
    } else {
        "No overflow".to_string()
    };

    Ok(OverflowVerdict {
        overflow: vertical || horizontal,
        reason,
    })
}

fn clipped_style(surface: &dyn PreviewSurface) -> Result<OverflowVerdict, MeasureError> {
    let clipping = surface.overflow_style()? != OverflowStyle::Visible;
    let overflow = clipping && {
        let e = surface.extent()?;
        e.scroll_height > e.client_height || e.scroll_width > e.client_width
    };

    Ok(OverflowVerdict {
        overflow,
        reason: if overflow {
            "Computed style indicates overflow".to_string()
        } else {
            "No computed overflow".to_string()
        },
    })
}

fn virtual_reflow(
    surface: &mut dyn PreviewSurface,
    settings: &HeuristicSettings,
) -> Result<OverflowVerdict, MeasureError> {
    let markup = surface.markup();
    let height = {
        let mut area = ScratchArea::open(surface, &settings.virtual_typography)?;
        area.measure(&markup)?.round()
    };
    let limit = settings.content_height_px;

    let reason = if height > limit {
        format!("Virtual content height ({height}px) exceeds A5 content area ({limit}px)")
    } else {
        "No virtual overflow".to_string()
    };

    Ok(OverflowVerdict {
        overflow: height > limit + settings.virtual_tolerance_px,
        reason,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
