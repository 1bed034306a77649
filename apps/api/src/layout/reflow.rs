//! Reflow — lays preview markup out in a fixed-width column and measures it.
//!
//! Greedy word wrap per block with the static metric tables, browser-default
//! heading scales and vertical margins, adjacent margins collapsed to the larger
//! of the two. Pure and CPU-bound; callers on the async side keep it short.

use serde::{Deserialize, Serialize};

use crate::layout::font_metrics::{get_metrics, FontFamily};
use crate::layout::markup::{parse_blocks, Block, BlockKind};

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

/// Typography of a measuring column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Typography {
    pub font: FontFamily,
    pub font_size_px: f32,
    /// Line height as a multiple of the font size.
    pub line_height: f32,
    /// Column width available to text.
    pub width_px: f32,
    /// Split words wider than the column instead of letting them overflow.
    pub break_words: bool,
}

/// Natural extent of laid-out markup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReflowMetrics {
    pub height_px: f32,
    /// Widest line extent including indentation; exceeds the column width only
    /// when an unbreakable word overflows it.
    pub width_px: f32,
    pub line_count: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Core functions
// ────────────────────────────────────────────────────────────────────────────

/// Lays `markup` out at `typography` and returns its natural extent.
pub fn reflow(markup: &str, typography: &Typography) -> ReflowMetrics {
    let blocks = parse_blocks(markup);

    let mut height = 0.0_f32;
    let mut width = 0.0_f32;
    let mut line_count = 0usize;
    let mut pending_margin: Option<f32> = None;

    for block in &blocks {
        let (block_height, block_width, block_lines) = measure_block(block, typography);
        let margin = block_margin_px(block.kind, typography.font_size_px);

        height += match pending_margin {
            Some(previous) => previous.max(margin),
            None => margin,
        };
        height += block_height;
        width = width.max(block_width);
        line_count += block_lines;
        pending_margin = Some(margin);
    }
    height += pending_margin.unwrap_or(0.0);

    ReflowMetrics {
        height_px: height,
        width_px: width,
        line_count,
    }
}

/// Returns `(height, width, lines)` of a single block without its margins.
fn measure_block(block: &Block, typography: &Typography) -> (f32, f32, usize) {
    match block.kind {
        BlockKind::ListBoundary => return (0.0, 0.0, 0),
        BlockKind::Image => return (block.image_height_px.max(0.0), block.indent_px, 0),
        _ => {}
    }

    let size = typography.font_size_px * font_scale(block.kind);
    let font = match block.kind {
        BlockKind::Heading(_) => typography.font.bold(),
        _ => typography.font,
    };
    let metrics = get_metrics(font);
    let available_px = (typography.width_px - block.indent_px).max(size);
    let available_em = available_px / size;

    let mut lines = 0usize;
    let mut widest = 0.0_f32;
    for segment in &block.segments {
        let wrapped = metrics.wrap(segment, available_em, typography.break_words);
        // An empty run still occupies the line a `<br>` opened.
        lines += wrapped.len().max(1);
        for line in &wrapped {
            widest = widest.max(line.width_em * size);
        }
    }

    let height = lines as f32 * size * typography.line_height;
    (height, widest + block.indent_px, lines)
}

/// Font size multiplier relative to the column's base size.
fn font_scale(kind: BlockKind) -> f32 {
    match kind {
        BlockKind::Heading(1) => 2.0,
        BlockKind::Heading(2) => 1.5,
        BlockKind::Heading(3) => 1.17,
        BlockKind::Heading(5) => 0.83,
        BlockKind::Heading(6) => 0.67,
        _ => 1.0,
    }
}

/// Top and bottom margin (they are equal for every supported element).
fn block_margin_px(kind: BlockKind, base_size_px: f32) -> f32 {
    let size = base_size_px * font_scale(kind);
    let em = match kind {
        BlockKind::Paragraph | BlockKind::Blockquote => 1.0,
        BlockKind::ListBoundary => 1.0,
        BlockKind::Heading(1) => 0.67,
        BlockKind::Heading(2) => 0.83,
        BlockKind::Heading(3) => 1.0,
        BlockKind::Heading(4) => 1.33,
        BlockKind::Heading(5) => 1.67,
        BlockKind::Heading(6) => 2.33,
        _ => 0.0,
    };
    em * size
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn column() -> Typography {
        Typography {
            font: FontFamily::TimesRoman,
            font_size_px: 11.0,
            line_height: 1.4,
            width_px: 240.0,
            break_words: true,
        }
    }

    #[test]
    fn test_empty_markup_has_zero_height() {
        let m = reflow("", &column());
        assert_eq!(m.height_px, 0.0);
        assert_eq!(m.line_count, 0);
    }

    #[test]
    fn test_single_line_height() {
        let m = reflow("Opening night", &column());
        assert_eq!(m.line_count, 1);
        assert!((m.height_px - 15.4).abs() < 1e-3, "got {}", m.height_px);
    }

    #[test]
    fn test_paragraph_margins_collapse() {
        let one = reflow("<p>A</p>", &column()).height_px;
        let two = reflow("<p>A</p><p>B</p>", &column()).height_px;
        // 11px margin above, between (collapsed) and below.
        assert!((one - (15.4 + 22.0)).abs() < 1e-3, "got {one}");
        assert!((two - (2.0 * 15.4 + 33.0)).abs() < 1e-3, "got {two}");
    }

    #[test]
    fn test_heading_is_taller_than_body() {
        let body = reflow("Synopsis", &column()).height_px;
        let heading = reflow("<h1>Synopsis</h1>", &column()).height_px;
        assert!(heading > body * 2.0);
    }

    #[test]
    fn test_long_text_wraps_to_many_lines() {
        let text = "The company rehearsed every evening in the old chapel hall. ".repeat(30);
        let m = reflow(&text, &column());
        assert!(m.line_count > 20, "got {} lines", m.line_count);
        assert!(m.width_px <= 240.0 + 1e-3);
    }

    #[test]
    fn test_unbreakable_word_widens_without_break_words() {
        let mut typography = column();
        typography.break_words = false;
        let m = reflow(&"W".repeat(60), &typography);
        assert!(m.width_px > 240.0);

        let broken = reflow(&"W".repeat(60), &column());
        assert!(broken.width_px <= 240.0 + 1e-3);
        assert!(broken.line_count > 1);
    }

    #[test]
    fn test_image_contributes_its_height() {
        let m = reflow(r#"<img src="cover.jpg" height="200">"#, &column());
        assert!((m.height_px - 200.0).abs() < 1e-3);
    }
}
