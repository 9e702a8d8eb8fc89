//! Error taxonomy for the signing surface.
//!
//! Every variant is recoverable: the host shows `user_message()` and lets the
//! operator retry. Nothing here aborts an interaction session.

use crate::id::PlacementId;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SignError {
    /// Page natural size or container width is not known yet.
    #[error("viewport not ready: page size or container width unknown")]
    ViewportNotReady,

    /// Export found no ink on the capture surface.
    #[error("capture is empty")]
    EmptyCapture,

    /// Captured or cached image reports unusable dimensions.
    #[error("invalid image dimensions {width}x{height}")]
    InvalidImageDimensions { width: f64, height: f64 },

    /// Submission attempted with no placements.
    #[error("no placements to submit")]
    NoPlacements,

    /// An operation referenced a placement that is not in the store.
    #[error("unknown placement {0}")]
    UnknownPlacement(PlacementId),

    /// The trimmed raster could not be encoded.
    #[error("image encoding failed: {0}")]
    Encode(String),

    /// Configuration JSON could not be parsed.
    #[error("config parse failed: {0}")]
    Config(String),

    /// The signing endpoint rejected the payload.
    #[error("signing endpoint error: {0}")]
    Endpoint(String),
}

impl SignError {
    /// Short text suitable for a toast / inline notice.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::ViewportNotReady => "The document is still loading. Please try again in a moment.",
            Self::EmptyCapture => "Please draw your signature before placing it.",
            Self::InvalidImageDimensions { .. } => {
                "The saved signature could not be used. Please draw it again."
            }
            Self::NoPlacements => "Place at least one signature before submitting.",
            Self::UnknownPlacement(_) => "That signature is no longer on the page.",
            Self::Encode(_) => "The signature image could not be prepared. Please try again.",
            Self::Config(_) => "The signing screen is misconfigured.",
            Self::Endpoint(_) => "The document could not be signed. Please try again.",
        }
    }

    /// Stable machine-readable name, for hosts that branch on the error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ViewportNotReady => "viewportNotReady",
            Self::EmptyCapture => "emptyCapture",
            Self::InvalidImageDimensions { .. } => "invalidImageDimensions",
            Self::NoPlacements => "noPlacements",
            Self::UnknownPlacement(_) => "unknownPlacement",
            Self::Encode(_) => "encode",
            Self::Config(_) => "config",
            Self::Endpoint(_) => "endpoint",
        }
    }

    /// Whether the operator should be asked to draw a new signature.
    pub fn needs_recapture(&self) -> bool {
        matches!(
            self,
            Self::EmptyCapture | Self::InvalidImageDimensions { .. }
        )
    }
}
