//! Page-fit preview: advisory overflow estimation for content shown on an A5 page.

pub mod estimator;
pub mod handlers;
pub mod heuristics;
pub mod metric_surface;
pub mod surface;
pub mod template;

pub use template::{verify_a5_dimensions, A5};
