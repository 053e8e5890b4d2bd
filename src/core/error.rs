// Copyright @yucwang 2026

use crate::math::dpdf::DiscretePDFError;

use thiserror::Error;

/// Failures surfaced while assembling a scene or configuring a renderer.
///
/// Numerical degeneracies during rendering (zero pdfs, grazing angles, missed
/// rays) are never errors; they contribute zero radiance.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error(transparent)]
    Distribution(#[from] DiscretePDFError),
}

pub type Result<T> = std::result::Result<T, RenderError>;
