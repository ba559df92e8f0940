//! Parameters for mesh generation.

use std::f64::consts::FRAC_PI_2;

use geom2d::Point2;

use crate::error::{MeshingError, MeshingResult};

/// Parameters for the advancing-front mesher.
#[derive(Debug, Clone)]
pub struct MesherParams {
    /// Angle threshold for quad layers: above it a wedge is kept between
    /// adjacent projections (and gap closure inserts a Steiner vertex)
    /// instead of merging. Default: π/2
    pub quad_layer_angle: f64,

    /// Fraction of the per-edge layer height used as the vertex search
    /// radius when placing projected layer vertices. Default: 0.75
    pub quad_layer_range: f64,

    /// The triangulation driver aborts with
    /// [`NoProgress`](crate::MeshingError::NoProgress) after
    /// `max_iter_factor · |initial front|` iterations. Default: 20
    pub max_iter_factor: usize,

    /// Vertex search radius during triangulation, as a multiple of the
    /// ideal element height. Default: 1.5
    pub vertex_search_factor: f64,
}

impl Default for MesherParams {
    fn default() -> Self {
        Self {
            quad_layer_angle: FRAC_PI_2,
            quad_layer_range: 0.75,
            max_iter_factor: 20,
            vertex_search_factor: 1.5,
        }
    }
}

impl MesherParams {
    /// Set the quad layer wedge angle threshold.
    #[must_use]
    pub const fn with_quad_layer_angle(mut self, angle: f64) -> Self {
        self.quad_layer_angle = angle;
        self
    }

    /// Set the quad layer search range factor.
    #[must_use]
    pub const fn with_quad_layer_range(mut self, range: f64) -> Self {
        self.quad_layer_range = range;
        self
    }

    /// Set the iteration bound factor.
    #[must_use]
    pub const fn with_max_iter_factor(mut self, factor: usize) -> Self {
        self.max_iter_factor = factor;
        self
    }

    /// Set the triangulation vertex search factor.
    #[must_use]
    pub const fn with_vertex_search_factor(mut self, factor: f64) -> Self {
        self.vertex_search_factor = factor;
        self
    }

    /// Checks every knob against its valid range.
    ///
    /// # Errors
    ///
    /// Returns [`MeshingError::InvalidParameter`] naming the first knob out
    /// of range.
    pub fn validate(&self) -> MeshingResult<()> {
        if !(self.quad_layer_angle > 0.0 && self.quad_layer_angle < std::f64::consts::PI) {
            return Err(MeshingError::InvalidParameter {
                name: "quad_layer_angle",
                value: self.quad_layer_angle,
            });
        }
        if !(self.quad_layer_range > 0.0 && self.quad_layer_range.is_finite()) {
            return Err(MeshingError::InvalidParameter {
                name: "quad_layer_range",
                value: self.quad_layer_range,
            });
        }
        if self.max_iter_factor == 0 {
            return Err(MeshingError::InvalidParameter {
                name: "max_iter_factor",
                value: 0.0,
            });
        }
        if !(self.vertex_search_factor > 0.0 && self.vertex_search_factor.is_finite()) {
            return Err(MeshingError::InvalidParameter {
                name: "vertex_search_factor",
                value: self.vertex_search_factor,
            });
        }
        Ok(())
    }
}

/// Request for structured quad layers along a run of boundary edges.
#[derive(Debug, Clone)]
pub struct QuadLayerOptions {
    /// Coordinate near the first base vertex of the layer run.
    pub start: Point2<f64>,
    /// Coordinate near the last base vertex of the layer run. Equal to
    /// `start` (up to the nearest front vertex) for a closed layer.
    pub end: Point2<f64>,
    /// Height of the first layer.
    pub first_height: f64,
    /// Multiplier applied to the height after each layer.
    pub growth_rate: f64,
    /// Number of layers to grow.
    pub n_layers: usize,
}

impl QuadLayerOptions {
    pub(crate) fn validate(&self) -> MeshingResult<()> {
        if !(self.first_height > 0.0 && self.first_height.is_finite()) {
            return Err(MeshingError::InvalidParameter {
                name: "first_height",
                value: self.first_height,
            });
        }
        if !(self.growth_rate > 0.0 && self.growth_rate.is_finite()) {
            return Err(MeshingError::InvalidParameter {
                name: "growth_rate",
                value: self.growth_rate,
            });
        }
        if self.n_layers == 0 {
            return Err(MeshingError::InvalidParameter {
                name: "n_layers",
                value: 0.0,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_are_valid() {
        let params = MesherParams::default();
        assert!(params.validate().is_ok());
        assert!((params.quad_layer_angle - FRAC_PI_2).abs() < 1e-12);
        assert!((params.quad_layer_range - 0.75).abs() < 1e-12);
        assert_eq!(params.max_iter_factor, 20);
    }

    #[test]
    fn builder_chains() {
        let params = MesherParams::default()
            .with_quad_layer_angle(1.0)
            .with_quad_layer_range(0.5)
            .with_max_iter_factor(5)
            .with_vertex_search_factor(2.0);
        assert!((params.quad_layer_angle - 1.0).abs() < 1e-12);
        assert!((params.quad_layer_range - 0.5).abs() < 1e-12);
        assert_eq!(params.max_iter_factor, 5);
        assert!((params.vertex_search_factor - 2.0).abs() < 1e-12);
    }

    #[test]
    fn out_of_range_is_rejected() {
        let params = MesherParams::default().with_quad_layer_angle(-1.0);
        assert!(matches!(
            params.validate(),
            Err(MeshingError::InvalidParameter {
                name: "quad_layer_angle",
                ..
            })
        ));

        let opts = QuadLayerOptions {
            start: Point2::new(0.0, 0.0),
            end: Point2::new(1.0, 0.0),
            first_height: 0.05,
            growth_rate: 0.0,
            n_layers: 3,
        };
        assert!(opts.validate().is_err());
    }
}
