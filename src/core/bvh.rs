// Copyright @yucwang 2026

use crate::math::aabb::AABB;
use crate::math::constants::{ Float, Vector3f };
use crate::math::ray::Ray3f;

const SAH_BUCKETS: usize = 12;

#[derive(Clone)]
struct BVHNode {
    bounds: AABB,
    left: Option<usize>,
    right: Option<usize>,
    start: usize,
    count: usize,
}

impl BVHNode {
    fn leaf(bounds: AABB, start: usize, count: usize) -> Self {
        Self { bounds, left: None, right: None, start, count }
    }

    fn interior(bounds: AABB, left: usize, right: usize) -> Self {
        Self { bounds, left: Some(left), right: Some(right), start: 0, count: 0 }
    }

    fn is_leaf(&self) -> bool {
        self.count > 0
    }
}

/// Bounding volume hierarchy over opaque primitives.
///
/// The tree only knows primitive bounds; exact intersection is delegated to
/// the caller through closures. Used both per mesh (over triangles) and per
/// scene (over shapes).
pub struct BVH {
    nodes: Vec<BVHNode>,
    indices: Vec<usize>,
    prim_bounds: Vec<AABB>,
    prim_centroids: Vec<Vector3f>,
    max_leaf_size: usize,
}

impl BVH {
    pub fn new(prim_bounds: Vec<AABB>, prim_centroids: Vec<Vector3f>) -> Self {
        Self::with_max_leaf_size(prim_bounds, prim_centroids, 4)
    }

    pub fn from_bounds(prim_bounds: Vec<AABB>) -> Self {
        let centroids = prim_bounds.iter().map(|b| b.center()).collect();
        Self::new(prim_bounds, centroids)
    }

    pub fn with_max_leaf_size(
        prim_bounds: Vec<AABB>,
        prim_centroids: Vec<Vector3f>,
        max_leaf_size: usize,
    ) -> Self {
        let mut bvh = Self {
            indices: (0..prim_bounds.len()).collect(),
            nodes: Vec::new(),
            prim_bounds,
            prim_centroids,
            max_leaf_size: max_leaf_size.max(1),
        };

        if !bvh.indices.is_empty() {
            let (bounds, centroid_bounds) = bvh.compute_bounds(0, bvh.indices.len());
            bvh.build(0, bvh.indices.len(), bounds, centroid_bounds);
        }

        bvh
    }

    pub fn bounds(&self) -> AABB {
        self.nodes.first().map(|n| n.bounds).unwrap_or_default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Closest hit reported by `hit_fn`. The ray handed to `hit_fn` has its
    /// `max_t` clipped to the closest hit found so far.
    pub fn ray_intersection<F, T>(&self, ray: &Ray3f, mut hit_fn: F) -> Option<(usize, T)>
    where
        F: FnMut(usize, &Ray3f) -> Option<(T, Float)>,
    {
        if self.nodes.is_empty() {
            return None;
        }

        let mut ray = *ray;
        let mut closest: Option<(usize, T)> = None;
        let mut stack = vec![0usize];

        while let Some(node_idx) = stack.pop() {
            let node = &self.nodes[node_idx];
            if !node.bounds.ray_intersect(&ray) {
                continue;
            }

            if node.is_leaf() {
                for i in 0..node.count {
                    let prim_idx = self.indices[node.start + i];
                    if let Some((hit, t)) = hit_fn(prim_idx, &ray) {
                        if ray.update(t) {
                            closest = Some((prim_idx, hit));
                        }
                    }
                }
            } else {
                if let Some(left) = node.left {
                    stack.push(left);
                }
                if let Some(right) = node.right {
                    stack.push(right);
                }
            }
        }

        closest
    }

    /// Any-hit query for shadow rays.
    pub fn ray_intersection_t<F>(&self, ray: &Ray3f, mut hit_fn: F) -> bool
    where
        F: FnMut(usize, &Ray3f) -> bool,
    {
        if self.nodes.is_empty() {
            return false;
        }

        let mut stack = vec![0usize];
        while let Some(node_idx) = stack.pop() {
            let node = &self.nodes[node_idx];
            if !node.bounds.ray_intersect(ray) {
                continue;
            }
            if node.is_leaf() {
                for i in 0..node.count {
                    let prim_idx = self.indices[node.start + i];
                    if hit_fn(prim_idx, ray) {
                        return true;
                    }
                }
            } else {
                if let Some(left) = node.left {
                    stack.push(left);
                }
                if let Some(right) = node.right {
                    stack.push(right);
                }
            }
        }

        false
    }

    fn push_leaf(&mut self, bounds: AABB, start: usize, count: usize) -> usize {
        let node_idx = self.nodes.len();
        self.nodes.push(BVHNode::leaf(bounds, start, count));
        node_idx
    }

    fn bucket_index(&self, prim_idx: usize, axis: usize, axis_min: Float, axis_max: Float) -> usize {
        let c = self.prim_centroids[prim_idx][axis];
        let b = ((c - axis_min) / (axis_max - axis_min) * SAH_BUCKETS as Float) as usize;
        b.min(SAH_BUCKETS - 1)
    }

    fn build(&mut self, start: usize, end: usize, bounds: AABB, centroid_bounds: AABB) -> usize {
        let count = end - start;
        if count <= self.max_leaf_size {
            return self.push_leaf(bounds, start, count);
        }

        let axis = centroid_bounds.max_extent();
        let axis_min = centroid_bounds.p_min[axis];
        let axis_max = centroid_bounds.p_max[axis];
        if (axis_max - axis_min).abs() < 1e-6 {
            return self.push_leaf(bounds, start, count);
        }

        // SAH with fixed buckets along the split axis.
        let mut buckets = vec![(0usize, AABB::default()); SAH_BUCKETS];
        for i in start..end {
            let idx = self.indices[i];
            let b = self.bucket_index(idx, axis, axis_min, axis_max);
            buckets[b].0 += 1;
            buckets[b].1.expand_by_aabb(&self.prim_bounds[idx]);
        }

        let area = bounds.surface_area().max(1e-6);
        let mut min_cost = Float::MAX;
        let mut min_split = 0usize;
        for split in 0..(SAH_BUCKETS - 1) {
            let mut b0 = AABB::default();
            let mut b1 = AABB::default();
            let mut count0 = 0usize;
            let mut count1 = 0usize;
            for (b, (n, bnd)) in buckets.iter().enumerate() {
                if b <= split {
                    count0 += n;
                    b0.expand_by_aabb(bnd);
                } else {
                    count1 += n;
                    b1.expand_by_aabb(bnd);
                }
            }
            let cost0 = if count0 > 0 { count0 as Float * b0.surface_area() } else { 0.0 };
            let cost1 = if count1 > 0 { count1 as Float * b1.surface_area() } else { 0.0 };
            let cost = 1.0 + (cost0 + cost1) / area;
            if cost < min_cost {
                min_cost = cost;
                min_split = split;
            }
        }

        if min_cost >= count as Float {
            return self.push_leaf(bounds, start, count);
        }

        let mut mid = start;
        for i in start..end {
            let idx = self.indices[i];
            if self.bucket_index(idx, axis, axis_min, axis_max) <= min_split {
                self.indices.swap(i, mid);
                mid += 1;
            }
        }

        if mid == start || mid == end {
            return self.push_leaf(bounds, start, count);
        }

        let (left_bounds, left_centroids) = self.compute_bounds(start, mid);
        let (right_bounds, right_centroids) = self.compute_bounds(mid, end);
        // Reserve the parent slot, then stitch the children in.
        let node_idx = self.push_leaf(bounds, 0, 0);
        let left = self.build(start, mid, left_bounds, left_centroids);
        let right = self.build(mid, end, right_bounds, right_centroids);
        self.nodes[node_idx] = BVHNode::interior(bounds, left, right);
        node_idx
    }

    fn compute_bounds(&self, start: usize, end: usize) -> (AABB, AABB) {
        let mut bounds = AABB::default();
        let mut centroid_bounds = AABB::default();
        for i in start..end {
            let idx = self.indices[i];
            bounds.expand_by_aabb(&self.prim_bounds[idx]);
            centroid_bounds.expand_by_point(&self.prim_centroids[idx]);
        }
        (bounds, centroid_bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::BVH;
    use crate::math::aabb::AABB;
    use crate::math::constants::{ Float, Vector3f };
    use crate::math::ray::Ray3f;

    // Axis-aligned unit squares in the plane z = depth, scattered along x.
    struct Tile {
        x: Float,
        depth: Float,
    }

    impl Tile {
        fn bounds(&self) -> AABB {
            AABB::new(Vector3f::new(self.x, 0.0, self.depth),
                      Vector3f::new(self.x + 1.0, 1.0, self.depth))
        }

        fn hit(&self, ray: &Ray3f) -> Option<Float> {
            let d = ray.dir();
            if d.z.abs() < 1e-8 {
                return None;
            }
            let t = (self.depth - ray.origin().z) / d.z;
            let p = ray.at(t);
            let inside = p.x >= self.x && p.x <= self.x + 1.0 && p.y >= 0.0 && p.y <= 1.0;
            if inside && ray.test_segment(t) { Some(t) } else { None }
        }
    }

    fn build_tiles() -> Vec<Tile> {
        let mut tiles = Vec::new();
        for i in 0..32 {
            // Two tiles per column at different depths.
            tiles.push(Tile { x: (i / 2) as Float * 2.0, depth: -((i % 2) as Float) * 3.0 - 1.0 });
        }
        tiles
    }

    #[test]
    fn test_bvh_matches_naive_closest_hit() {
        let tiles = build_tiles();
        let bvh = BVH::from_bounds(tiles.iter().map(|t| t.bounds()).collect());
        assert!(bvh.node_count() > 1);

        for column in 0..16 {
            let origin = Vector3f::new(column as Float * 2.0 + 0.5, 0.5, 2.0);
            let ray = Ray3f::new(origin, Vector3f::new(0.0, 0.0, -1.0), None, None);

            let hit = bvh.ray_intersection(&ray, |idx, ray| tiles[idx].hit(ray).map(|t| (t, t)));
            let naive = tiles.iter().enumerate()
                .filter_map(|(i, tile)| tile.hit(&ray).map(|t| (i, t)))
                .fold(None, |best: Option<(usize, Float)>, cur| match best {
                    Some(b) if b.1 <= cur.1 => Some(b),
                    _ => Some(cur),
                });

            let (idx, t) = hit.expect("bvh missed a tile");
            let (naive_idx, naive_t) = naive.expect("naive search missed a tile");
            assert_eq!(idx, naive_idx);
            assert!((t - naive_t).abs() < 1e-5);
            assert!((t - 3.0).abs() < 1e-5);
        }

        let miss = Ray3f::new(Vector3f::new(100.0, 100.0, 1.0), Vector3f::new(0.0, 0.0, -1.0), None, None);
        assert!(bvh.ray_intersection(&miss, |idx, ray| tiles[idx].hit(ray).map(|t| (t, t))).is_none());
    }

    #[test]
    fn test_bvh_shadow_query_respects_segment() {
        let tiles = build_tiles();
        let bvh = BVH::from_bounds(tiles.iter().map(|t| t.bounds()).collect());

        let origin = Vector3f::new(0.5, 0.5, 2.0);
        let dir = Vector3f::new(0.0, 0.0, -1.0);
        let blocked = Ray3f::new(origin, dir, None, Some(10.0));
        let short = Ray3f::new(origin, dir, None, Some(2.5));
        assert!(bvh.ray_intersection_t(&blocked, |idx, ray| tiles[idx].hit(ray).is_some()));
        assert!(!bvh.ray_intersection_t(&short, |idx, ray| tiles[idx].hit(ray).is_some()));
    }

    #[test]
    fn test_empty_bvh() {
        let bvh = BVH::from_bounds(Vec::new());
        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0), None, None);
        assert!(bvh.ray_intersection(&ray, |_, _| Some(((), 1.0))).is_none());
        assert!(!bvh.ray_intersection_t(&ray, |_, _| true));
        assert!(!bvh.bounds().is_valid());
    }
}
