// Copyright @yucwang 2023

use crate::core::bvh::BVH;
use crate::core::computation_node::{ generate_node_id, ComputationNode };
use crate::core::error::{ RenderError, Result };
use crate::core::interaction::{ Measure, SurfaceIntersection, SurfaceSampleRecord };
use crate::core::shape::Shape;
use crate::math::aabb::AABB;
use crate::math::constants::{ Float, Vector2f, Vector3f };
use crate::math::dpdf::DiscretePDF;
use crate::math::ray::Ray3f;
use crate::math::warp::square_to_uniform_triangle;

use log::warn;

/// Indexed triangle mesh with optional per-vertex normals and uvs.
///
/// Triangles are sampled proportionally to their area through a discrete
/// pdf built at construction.
pub struct TriangleMesh {
    id: String,
    positions: Vec<Vector3f>,
    normals: Option<Vec<Vector3f>>,
    uvs: Option<Vec<Vector2f>>,
    indices: Vec<[usize; 3]>,
    area_pdf: DiscretePDF,
    total_area: Float,
    bbox: AABB,
    bvh: BVH,
}

// Barycentric hit record of a single triangle.
struct TriangleHit {
    t: Float,
    u: Float,
    v: Float,
}

impl TriangleMesh {
    pub fn new(positions: Vec<Vector3f>,
               indices: Vec<[usize; 3]>,
               normals: Option<Vec<Vector3f>>,
               uvs: Option<Vec<Vector2f>>) -> Result<Self> {
        if indices.is_empty() {
            return Err(RenderError::Configuration(String::from("triangle mesh has no faces")));
        }
        if let Some(bad) = indices.iter().flatten().find(|&&i| i >= positions.len()) {
            return Err(RenderError::Configuration(format!(
                "triangle mesh index {} out of range for {} vertices", bad, positions.len())));
        }
        if normals.as_ref().map_or(false, |n| n.len() != positions.len()) {
            return Err(RenderError::Configuration(String::from(
                "triangle mesh normal count does not match vertex count")));
        }
        if uvs.as_ref().map_or(false, |uv| uv.len() != positions.len()) {
            return Err(RenderError::Configuration(String::from(
                "triangle mesh uv count does not match vertex count")));
        }

        let mut mesh = Self {
            id: generate_node_id("mesh"),
            positions,
            normals,
            uvs,
            indices,
            area_pdf: DiscretePDF::default(),
            total_area: 0.0,
            bbox: AABB::default(),
            bvh: BVH::from_bounds(Vec::new()),
        };
        mesh.build_sampling_table()?;
        mesh.build_bvh();
        Ok(mesh)
    }

    /// Planar quad `corner + s * edge_u + t * edge_v`, `s, t` in `[0, 1]`,
    /// facing `edge_u x edge_v`.
    pub fn quad(corner: Vector3f, edge_u: Vector3f, edge_v: Vector3f) -> Result<Self> {
        let positions = vec![corner, corner + edge_u, corner + edge_u + edge_v, corner + edge_v];
        let uvs = vec![
            Vector2f::new(0.0, 0.0),
            Vector2f::new(1.0, 0.0),
            Vector2f::new(1.0, 1.0),
            Vector2f::new(0.0, 1.0),
        ];
        Self::new(positions, vec![[0, 1, 2], [0, 2, 3]], None, Some(uvs))
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    fn vertices(&self, index: usize) -> (Vector3f, Vector3f, Vector3f) {
        let [i0, i1, i2] = self.indices[index];
        (self.positions[i0], self.positions[i1], self.positions[i2])
    }

    pub fn triangle_area(&self, index: usize) -> Float {
        let (p0, p1, p2) = self.vertices(index);
        0.5 * (p1 - p0).cross(&(p2 - p0)).norm()
    }

    fn face_normal(&self, index: usize) -> Vector3f {
        let (p0, p1, p2) = self.vertices(index);
        (p1 - p0).cross(&(p2 - p0)).normalize()
    }

    fn triangle_bounds(&self, index: usize) -> AABB {
        let (p0, p1, p2) = self.vertices(index);
        let mut bounds = AABB::from_point(p0);
        bounds.expand_by_point(&p1);
        bounds.expand_by_point(&p2);
        bounds
    }

    fn build_sampling_table(&mut self) -> Result<()> {
        self.area_pdf.clear();
        self.area_pdf.reserve(self.indices.len());
        for i in 0..self.indices.len() {
            self.area_pdf.append(self.triangle_area(i))?;
        }
        self.total_area = self.area_pdf.normalize()?;
        if self.total_area <= 0.0 {
            return Err(RenderError::Configuration(format!(
                "triangle mesh '{}' has zero surface area", self.id)));
        }
        Ok(())
    }

    fn build_bvh(&mut self) {
        let bounds: Vec<AABB> = (0..self.indices.len()).map(|i| self.triangle_bounds(i)).collect();
        let mut bbox = AABB::default();
        for b in &bounds {
            bbox.expand_by_aabb(b);
        }
        self.bbox = bbox;
        self.bvh = BVH::from_bounds(bounds);
    }

    // Möller-Trumbore.
    fn intersect_triangle(&self, index: usize, ray: &Ray3f) -> Option<TriangleHit> {
        let (p0, p1, p2) = self.vertices(index);
        let edge1 = p1 - p0;
        let edge2 = p2 - p0;

        let pvec = ray.dir().cross(&edge2);
        let det = edge1.dot(&pvec);
        if det.abs() < 1e-8 {
            return None;
        }
        let inv_det = 1.0 / det;

        let tvec = ray.origin() - p0;
        let u = tvec.dot(&pvec) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let qvec = tvec.cross(&edge1);
        let v = ray.dir().dot(&qvec) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = edge2.dot(&qvec) * inv_det;
        if ray.test_segment(t) {
            Some(TriangleHit { t, u, v })
        } else {
            None
        }
    }

    fn interpolate_normal(&self, index: usize, w: Float, u: Float, v: Float) -> Option<Vector3f> {
        let normals = self.normals.as_ref()?;
        let [i0, i1, i2] = self.indices[index];
        Some((w * normals[i0] + u * normals[i1] + v * normals[i2]).normalize())
    }

    fn interpolate_uv(&self, index: usize, w: Float, u: Float, v: Float) -> Vector2f {
        match self.uvs.as_ref() {
            Some(uvs) => {
                let [i0, i1, i2] = self.indices[index];
                w * uvs[i0] + u * uvs[i1] + v * uvs[i2]
            }
            None => Vector2f::new(u, v),
        }
    }
}

impl ComputationNode for TriangleMesh {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        format!("TriangleMesh[id = {}, vertices = {}, triangles = {}, area = {}]",
                self.id, self.vertex_count(), self.triangle_count(), self.total_area)
    }
}

impl Shape for TriangleMesh {
    fn bounding_box(&self) -> AABB {
        self.bbox
    }

    fn surface_area(&self) -> Float {
        self.total_area
    }

    fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceIntersection> {
        let (index, hit) = self.bvh.ray_intersection(ray, |prim_idx, ray| {
            self.intersect_triangle(prim_idx, ray).map(|h| {
                let t = h.t;
                (h, t)
            })
        })?;

        let w = 1.0 - hit.u - hit.v;
        let (p0, p1, p2) = self.vertices(index);
        let p = w * p0 + hit.u * p1 + hit.v * p2;
        let geo_n = self.face_normal(index);
        let sh_n = self.interpolate_normal(index, w, hit.u, hit.v).unwrap_or(geo_n);
        let uv = self.interpolate_uv(index, w, hit.u, hit.v);

        Some(SurfaceIntersection::new(p, hit.t, uv, geo_n, sh_n))
    }

    fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        self.bvh.ray_intersection_t(ray, |prim_idx, ray| {
            self.intersect_triangle(prim_idx, ray).is_some()
        })
    }

    fn sample(&self, u: &Vector2f) -> SurfaceSampleRecord {
        let mut reused = u.y;
        let index = match self.area_pdf.sample_reuse(&mut reused) {
            Ok((index, _)) => index,
            Err(err) => {
                warn!("Sampling mesh '{}' failed: {}", self.id, err);
                return SurfaceSampleRecord::default();
            }
        };

        let bary = square_to_uniform_triangle(&Vector2f::new(u.x, reused));
        let w = 1.0 - bary.x - bary.y;
        let (p0, p1, p2) = self.vertices(index);
        let p = w * p0 + bary.x * p1 + bary.y * p2;
        // Face normal, matching the geometric normal reported by ray hits.
        let n = self.face_normal(index);
        let uv = self.interpolate_uv(index, w, bary.x, bary.y);

        SurfaceSampleRecord::new(p, n, uv, 1.0 / self.total_area, Measure::Area)
    }
}

#[cfg(test)]
mod tests {
    use super::TriangleMesh;
    use crate::core::interaction::Measure;
    use crate::core::sampler::Sampler;
    use crate::core::shape::Shape;
    use crate::math::constants::{ Float, Vector2f, Vector3f };
    use crate::math::ray::Ray3f;
    use crate::samplers::independent::IndependentSampler;
    use approx::assert_relative_eq;

    fn floor() -> TriangleMesh {
        TriangleMesh::quad(Vector3f::new(-1.0, 0.0, 1.0),
                           Vector3f::new(2.0, 0.0, 0.0),
                           Vector3f::new(0.0, 0.0, -2.0)).unwrap()
    }

    #[test]
    fn test_quad_geometry() {
        let mesh = floor();
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.vertex_count(), 4);
        assert_relative_eq!(mesh.surface_area(), 4.0, epsilon = 1e-5);

        let ray = Ray3f::new(Vector3f::new(0.25, 1.0, 0.5), Vector3f::new(0.0, -1.0, 0.0), None, None);
        let hit = mesh.ray_intersection(&ray).expect("ray should hit the quad");
        assert_relative_eq!(hit.t(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(hit.geo_normal().y, 1.0, epsilon = 1e-5);
        assert_relative_eq!(hit.uv().x, 0.625, epsilon = 1e-5);
        assert_relative_eq!(hit.uv().y, 0.25, epsilon = 1e-5);

        let miss = Ray3f::new(Vector3f::new(3.0, 1.0, 0.0), Vector3f::new(0.0, -1.0, 0.0), None, None);
        assert!(mesh.ray_intersection(&miss).is_none());
        assert!(!mesh.ray_intersection_t(&miss));
    }

    #[test]
    fn test_triangle_areas_match_total() {
        let positions = vec![
            Vector3f::new(0.0, 0.0, 0.0),
            Vector3f::new(3.0, 0.0, 0.0),
            Vector3f::new(0.0, 1.0, 0.0),
            Vector3f::new(0.0, 0.0, 5.0),
        ];
        let mesh = TriangleMesh::new(positions, vec![[0, 1, 2], [0, 1, 3], [0, 2, 3]], None, None).unwrap();
        let sum: Float = (0..mesh.triangle_count()).map(|i| mesh.triangle_area(i)).sum();
        assert_relative_eq!(sum, mesh.surface_area(), max_relative = 1e-6);
        assert_relative_eq!(sum, 1.5 + 7.5 + 2.5, max_relative = 1e-6);
    }

    #[test]
    fn test_sampling_is_area_proportional() {
        // A 1x1 and a 3x1 rectangle side by side.
        let positions = vec![
            Vector3f::new(0.0, 0.0, 0.0), Vector3f::new(1.0, 0.0, 0.0),
            Vector3f::new(1.0, 1.0, 0.0), Vector3f::new(0.0, 1.0, 0.0),
            Vector3f::new(4.0, 0.0, 0.0), Vector3f::new(4.0, 1.0, 0.0),
        ];
        let indices = vec![[0, 1, 2], [0, 2, 3], [1, 4, 5], [1, 5, 2]];
        let mesh = TriangleMesh::new(positions, indices, None, None).unwrap();

        let mut sampler = IndependentSampler::new(31);
        let n = 40_000;
        let mut right = 0;
        for _ in 0..n {
            let s = mesh.sample(&sampler.next_2d());
            assert_eq!(s.measure, Measure::Area);
            assert_relative_eq!(s.pdf, 0.25, epsilon = 1e-6);
            assert_relative_eq!(s.n.z, 1.0, epsilon = 1e-5);
            assert!(s.p.z.abs() < 1e-5 && s.p.y >= -1e-5 && s.p.y <= 1.0 + 1e-5);
            if s.p.x > 1.0 {
                right += 1;
            }
        }
        assert_relative_eq!(right as Float / n as Float, 0.75, epsilon = 0.01);
    }

    #[test]
    fn test_interpolated_normals() {
        let positions = vec![
            Vector3f::new(0.0, 0.0, 0.0),
            Vector3f::new(1.0, 0.0, 0.0),
            Vector3f::new(0.0, 1.0, 0.0),
        ];
        let tilted = Vector3f::new(1.0, 0.0, 1.0).normalize();
        let normals = vec![tilted; 3];
        let mesh = TriangleMesh::new(positions, vec![[0, 1, 2]], Some(normals), None).unwrap();

        let ray = Ray3f::new(Vector3f::new(0.2, 0.2, 1.0), Vector3f::new(0.0, 0.0, -1.0), None, None);
        let hit = mesh.ray_intersection(&ray).unwrap();
        assert_relative_eq!(hit.geo_normal().z, 1.0, epsilon = 1e-5);
        assert_relative_eq!(hit.sh_normal().x, tilted.x, epsilon = 1e-5);

        // Sampled points carry the face normal, like `geo_normal` on hits.
        let s = mesh.sample(&Vector2f::new(0.4, 0.7));
        assert_relative_eq!(s.n.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(s.n.z, hit.geo_normal().z, epsilon = 1e-6);
    }

    #[test]
    fn test_invalid_meshes_are_rejected() {
        let positions = vec![Vector3f::zeros(), Vector3f::new(1.0, 0.0, 0.0), Vector3f::new(0.0, 1.0, 0.0)];
        assert!(TriangleMesh::new(positions.clone(), vec![[0, 1, 3]], None, None).is_err());
        assert!(TriangleMesh::new(positions.clone(), Vec::new(), None, None).is_err());
        assert!(TriangleMesh::new(positions.clone(), vec![[0, 1, 2]], Some(vec![Vector3f::zeros()]), None).is_err());
        assert!(TriangleMesh::new(positions, vec![[0, 0, 0]], None, None).is_err());
    }
}
