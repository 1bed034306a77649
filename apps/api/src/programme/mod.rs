//! Printed programme generation: form intake, themes and the generate endpoint.

pub mod form;
pub mod handlers;
pub mod model;
pub mod theme;
