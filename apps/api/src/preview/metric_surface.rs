//! In-memory preview surface laid out with the static metric tables.
//!
//! Extents are rounded to whole pixels the way a browser reports
//! `scrollHeight`/`clientHeight`. Layout is synchronous, so estimators over this
//! surface can evaluate without settling delays.

use std::collections::{HashMap, HashSet};

use crate::layout::{reflow, FontFamily, Typography};
use crate::preview::surface::{
    Border, MeasureError, MountLayout, OverflowStyle, PreviewSurface, ScratchId, SurfaceExtent,
    SurfaceHost, WarningBanner,
};
use crate::preview::template::PageTemplate;

pub const DEFAULT_PAGE_BACKGROUND: &str = "#ffffff";

/// Box model and typography of the on-screen preview page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewGeometry {
    pub page_width_px: f32,
    pub page_height_px: f32,
    pub padding_px: f32,
    /// Typography of the content box; `width_px` is the content box width.
    pub typography: Typography,
    pub overflow: OverflowStyle,
}

impl PreviewGeometry {
    pub fn for_template(template: &PageTemplate) -> Self {
        let page_width_px = template.preview_width_px as f32;
        let page_height_px = template.preview_height_px as f32;
        let padding_px = template.preview_padding_px as f32;
        Self {
            page_width_px,
            page_height_px,
            padding_px,
            typography: Typography {
                font: FontFamily::TimesRoman,
                font_size_px: 11.0,
                line_height: 1.4,
                width_px: page_width_px - 2.0 * padding_px,
                break_words: false,
            },
            overflow: OverflowStyle::Hidden,
        }
    }

    fn client_height_px(&self) -> f32 {
        self.page_height_px - 2.0 * self.padding_px
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Surface
// ────────────────────────────────────────────────────────────────────────────

pub struct MetricSurface {
    geometry: PreviewGeometry,
    title: Option<String>,
    label: Option<String>,
    markup: String,
    page_background: String,
    text_color: Option<String>,
    border: Option<Border>,
    warning: Option<WarningBanner>,
    scratches: HashMap<ScratchId, Typography>,
    next_scratch: u64,
}

impl MetricSurface {
    pub fn new(geometry: PreviewGeometry) -> Self {
        Self {
            geometry,
            title: None,
            label: None,
            markup: String::new(),
            page_background: DEFAULT_PAGE_BACKGROUND.to_string(),
            text_color: None,
            border: None,
            warning: None,
            scratches: HashMap::new(),
            next_scratch: 0,
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn open_scratch_count(&self) -> usize {
        self.scratches.len()
    }
}

impl PreviewSurface for MetricSurface {
    fn mount(&mut self, layout: &MountLayout) {
        self.title = layout.title.clone();
        self.label = layout.label.clone();
        self.markup = layout.placeholder.clone();
        self.warning = layout.warning.as_ref().map(|text| WarningBanner {
            visible: false,
            text: text.clone(),
        });
    }

    fn markup(&self) -> String {
        self.markup.clone()
    }

    fn set_markup(&mut self, markup: &str) {
        self.markup = markup.to_string();
    }

    fn page_background(&self) -> String {
        self.page_background.clone()
    }

    fn set_page_background(&mut self, color: &str) {
        self.page_background = color.to_string();
    }

    fn text_color(&self) -> Option<String> {
        self.text_color.clone()
    }

    fn set_text_color(&mut self, color: &str) {
        self.text_color = Some(color.to_string());
    }

    fn border(&self) -> Option<Border> {
        self.border
    }

    fn set_border(&mut self, border: Option<Border>) {
        self.border = border;
    }

    fn warning(&self) -> Option<WarningBanner> {
        self.warning.clone()
    }

    fn set_warning(&mut self, visible: bool, text: Option<&str>) {
        if let Some(banner) = self.warning.as_mut() {
            banner.visible = visible;
            if let Some(text) = text {
                banner.text = text.to_string();
            }
        }
    }

    fn extent(&self) -> Result<SurfaceExtent, MeasureError> {
        let natural = reflow(&self.markup, &self.geometry.typography);
        let client_width = self.geometry.typography.width_px.round();
        let client_height = self.geometry.client_height_px().round();
        Ok(SurfaceExtent {
            scroll_width: natural.width_px.round().max(client_width),
            scroll_height: natural.height_px.round().max(client_height),
            client_width,
            client_height,
        })
    }

    fn overflow_style(&self) -> Result<OverflowStyle, MeasureError> {
        Ok(self.geometry.overflow)
    }

    fn open_scratch(&mut self, typography: &Typography) -> Result<ScratchId, MeasureError> {
        let id = ScratchId(self.next_scratch);
        self.next_scratch += 1;
        self.scratches.insert(id, *typography);
        Ok(id)
    }

    fn scratch_height(&mut self, id: ScratchId, markup: &str) -> Result<f32, MeasureError> {
        let typography = self
            .scratches
            .get(&id)
            .ok_or(MeasureError::UnknownScratch(id))?;
        Ok(reflow(markup, typography).height_px)
    }

    fn close_scratch(&mut self, id: ScratchId) {
        self.scratches.remove(&id);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Host
// ────────────────────────────────────────────────────────────────────────────

/// A set of registered preview containers backed by metric surfaces.
pub struct MetricDocument {
    geometry: PreviewGeometry,
    containers: HashSet<String>,
}

impl MetricDocument {
    pub fn new(geometry: PreviewGeometry) -> Self {
        Self {
            geometry,
            containers: HashSet::new(),
        }
    }

    pub fn register(&mut self, container_id: &str) {
        self.containers.insert(container_id.to_string());
    }
}

impl SurfaceHost for MetricDocument {
    fn find_surface(&mut self, container_id: &str) -> Option<Box<dyn PreviewSurface>> {
        if !self.containers.contains(container_id) {
            return None;
        }
        Some(Box::new(MetricSurface::new(self.geometry)))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
