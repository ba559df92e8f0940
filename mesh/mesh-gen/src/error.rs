//! Error types for mesh generation.

use thiserror::Error;

/// Errors that can occur during mesh generation.
#[derive(Debug, Error)]
pub enum MeshingError {
    /// The domain has no boundary loops.
    #[error("Domain has no boundary loops")]
    EmptyDomain,

    /// A boundary loop has too few points to enclose area.
    #[error("Boundary loop {index} has only {points} points (at least 3 required)")]
    DegenerateLoop {
        /// Index of the offending loop.
        index: usize,
        /// Number of points supplied.
        points: usize,
    },

    /// A boundary segment has (near) zero length.
    #[error("Segment {segment} of boundary loop {index} has zero length")]
    ZeroLengthSegment {
        /// Index of the offending loop.
        index: usize,
        /// Index of the offending segment within the loop.
        segment: usize,
    },

    /// A loop winds the wrong way for its role.
    #[error("Boundary loop {index} must wind {expected} (exterior CCW, holes CW)")]
    InvalidWinding {
        /// Index of the offending loop.
        index: usize,
        /// The required winding, as text.
        expected: &'static str,
    },

    /// The boundary loops enclose no positive area.
    #[error("Boundary loops enclose a non-positive area ({area})")]
    NonPositiveArea {
        /// The signed area found.
        area: f64,
    },

    /// The advancing front lost its cyclic structure.
    #[error("Advancing front corrupted: {0}")]
    FrontCorruption(&'static str),

    /// The triangulation driver exhausted its iteration bound without
    /// emptying the front.
    #[error("No progress after {iterations} iterations ({remaining} front edges remain)")]
    NoProgress {
        /// Iterations performed before giving up.
        iterations: usize,
        /// Front edges still present.
        remaining: usize,
    },

    /// Quad layer generation aborted; completed layers are retained and the
    /// rest of the domain can still be triangulated.
    #[error("Quad layer {layer} aborted")]
    QuadLayerAborted {
        /// Zero-based index of the layer that failed.
        layer: usize,
    },

    /// A configuration value is outside its valid range.
    #[error("Invalid parameter {name}: {value}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },
}

/// Result type for mesh generation operations.
pub type MeshingResult<T> = std::result::Result<T, MeshingError>;
