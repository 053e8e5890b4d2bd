// Copyright @yucwang 2023

use crate::math::constants::{ Float, Vector2f, Vector3f };
use crate::math::frame::Frame;

/// Index of a shape in its owning scene.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ShapeId(pub usize);

/// Index of an emitter in its owning scene.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct EmitterId(pub usize);

/// Measure a density is expressed in.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Measure {
    Unknown,
    SolidAngle,
    Area,
    Discrete,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceIntersection {
    p: Vector3f,
    t: Float,
    uv: Vector2f,
    geo_frame: Frame,
    sh_frame: Frame,
    shape: Option<ShapeId>,
}

impl SurfaceIntersection {
    pub fn new(new_p: Vector3f,
               new_t: Float,
               new_uv: Vector2f,
               new_geo_normal: Vector3f,
               new_sh_normal: Vector3f) -> Self {
        Self { p: new_p, t: new_t, uv: new_uv,
               geo_frame: Frame::from_normal(new_geo_normal),
               sh_frame: Frame::from_normal(new_sh_normal),
               shape: None }
    }

    pub fn t(&self) -> Float {
        self.t
    }

    pub fn p(&self) -> Vector3f {
        self.p
    }

    pub fn uv(&self) -> Vector2f {
        self.uv
    }

    pub fn geo_normal(&self) -> Vector3f {
        self.geo_frame.n
    }

    pub fn sh_normal(&self) -> Vector3f {
        self.sh_frame.n
    }

    pub fn geo_frame(&self) -> &Frame {
        &self.geo_frame
    }

    pub fn sh_frame(&self) -> &Frame {
        &self.sh_frame
    }

    pub fn to_local(&self, v: &Vector3f) -> Vector3f {
        self.sh_frame.to_local(v)
    }

    pub fn to_world(&self, v: &Vector3f) -> Vector3f {
        self.sh_frame.to_world(v)
    }

    pub fn shape(&self) -> Option<ShapeId> {
        self.shape
    }

    pub fn with_shape(self, shape: ShapeId) -> Self {
        Self { shape: Some(shape), ..self }
    }
}

/// A point drawn on a shape's surface together with its density.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceSampleRecord {
    pub p: Vector3f,
    /// Geometric normal. Shading normals never enter densities.
    pub n: Vector3f,
    pub uv: Vector2f,
    pub pdf: Float,
    pub measure: Measure,
}

impl Default for SurfaceSampleRecord {
    fn default() -> Self {
        Self {
            p: Vector3f::zeros(),
            n: Vector3f::zeros(),
            uv: Vector2f::zeros(),
            pdf: 0.0,
            measure: Measure::Unknown,
        }
    }
}

impl SurfaceSampleRecord {
    pub fn new(p: Vector3f, n: Vector3f, uv: Vector2f, pdf: Float, measure: Measure) -> Self {
        Self { p, n, uv, pdf, measure }
    }

    /// Record for a point found by ray tracing rather than by sampling.
    pub fn from_intersection(its: &SurfaceIntersection) -> Self {
        Self {
            p: its.p(),
            n: its.geo_normal(),
            uv: its.uv(),
            pdf: 0.0,
            measure: Measure::Unknown,
        }
    }
}
