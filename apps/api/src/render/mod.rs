//! PDF output: a cursor-based page writer and the programme page sequence.

pub mod pdf;
pub mod programme;

use thiserror::Error;

pub use pdf::Rgb;
pub use programme::render_programme;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}
