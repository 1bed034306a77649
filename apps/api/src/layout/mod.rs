// Layout substrate shared by the preview estimator and the PDF renderer:
// static font metrics, a block model for preview markup, and column reflow.

pub mod font_metrics;
pub mod markup;
pub mod reflow;

pub use font_metrics::{get_metrics, FontFamily};
pub use reflow::{reflow, Typography};
