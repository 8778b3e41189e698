//! Editable polygon mesh used as the pipes' geometry objects.
//!
//! Vertex positions are shared between faces and stored in local space;
//! `origin` translates the whole object into world space. Every face keeps
//! its corners counter-clockwise when seen from outside, so its normal
//! can always be recomputed from the positions alone.

use crate::{
    bounds::Bounds,
    config::Material,
    error::GeometryError,
    raycast::{RayHit, SELF_HIT_EPSILON, ray_triangle},
    types::{FaceId, VertexId},
};
use glam::{Vec2, Vec3};
use std::collections::{HashMap, HashSet};

#[derive(Clone, Debug)]
pub struct Face {
    /// Corner vertices, counter-clockwise seen from outside.
    pub indices: Vec<VertexId>,
    /// Cached by [`Mesh::refresh_surface`].
    pub normal: Vec3,
    pub tangent: Vec3,
    /// One UV per corner, world-space planar projection.
    pub uvs: Vec<Vec2>,
    pub material: Material,
}

impl Face {
    pub fn new(indices: Vec<VertexId>, material: Material) -> Self {
        let corners = indices.len();
        Self {
            indices,
            normal: Vec3::ZERO,
            tangent: Vec3::ZERO,
            uvs: vec![Vec2::ZERO; corners],
            material,
        }
    }

    /// Directed edges of the face boundary.
    pub fn edges(&self) -> impl Iterator<Item = (VertexId, VertexId)> + '_ {
        let n = self.indices.len();
        (0..n).map(move |i| (self.indices[i], self.indices[(i + 1) % n]))
    }
}

#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub origin: Vec3,
    pub positions: Vec<Vec3>,
    pub faces: Vec<Face>,
}

impl Mesh {
    /// Axis-aligned cube with edge length `size`, centred on the local
    /// origin. Face 0 points along +X.
    pub fn cube(size: f32) -> Self {
        let h = size * 0.5;
        let positions = (0..8)
            .map(|i| {
                Vec3::new(
                    if i & 1 != 0 { h } else { -h },
                    if i & 2 != 0 { h } else { -h },
                    if i & 4 != 0 { h } else { -h },
                )
            })
            .collect();

        let quads: [[VertexId; 4]; 6] = [
            [1, 3, 7, 5], // +X
            [0, 4, 6, 2], // -X
            [2, 6, 7, 3], // +Y
            [0, 1, 5, 4], // -Y
            [4, 5, 7, 6], // +Z
            [0, 2, 3, 1], // -Z
        ];
        let faces = quads
            .iter()
            .map(|q| Face::new(q.to_vec(), Material::default()))
            .collect();

        let mut mesh = Self {
            origin: Vec3::ZERO,
            positions,
            faces,
        };
        mesh.refresh_surface();
        mesh
    }

    pub fn with_origin(mut self, origin: Vec3) -> Self {
        self.origin = origin;
        self.refresh_surface();
        self
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn all_faces(&self) -> Vec<FaceId> {
        (0..self.faces.len()).collect()
    }

    pub fn world_position(&self, v: VertexId) -> Vec3 {
        self.origin + self.positions[v]
    }

    /// World-space corners of a face.
    pub fn face_points(&self, face: FaceId) -> impl Iterator<Item = Vec3> + '_ {
        self.faces[face]
            .indices
            .iter()
            .map(move |&v| self.world_position(v))
    }

    /// Outward unit normal of `face`, computed from the current positions
    /// with Newell's method.
    pub fn compute_face_normal(&self, face: FaceId) -> Vec3 {
        let idx = &self.faces[face].indices;
        let n = idx.len();
        let mut normal = Vec3::ZERO;
        for i in 0..n {
            let c = self.positions[idx[i]];
            let nx = self.positions[idx[(i + 1) % n]];
            normal.x += (c.y - nx.y) * (c.z + nx.z);
            normal.y += (c.z - nx.z) * (c.x + nx.x);
            normal.z += (c.x - nx.x) * (c.y + nx.y);
        }
        normal.normalize_or_zero()
    }

    /// Distinct vertices used by the given faces, in first-use order.
    pub fn face_vertices(&self, faces: &[FaceId]) -> Vec<VertexId> {
        let mut seen = HashSet::new();
        faces
            .iter()
            .flat_map(|&f| self.faces[f].indices.iter().copied())
            .filter(|v| seen.insert(*v))
            .collect()
    }

    /// Average world position of the given vertices.
    pub fn world_centroid(&self, vertices: &[VertexId]) -> Vec3 {
        if vertices.is_empty() {
            return self.origin;
        }
        let sum: Vec3 = vertices.iter().map(|&v| self.positions[v]).sum();
        self.origin + sum / vertices.len() as f32
    }

    pub fn translate_vertices(&mut self, vertices: &[VertexId], offset: Vec3) {
        for &v in vertices {
            self.positions[v] += offset;
        }
    }

    /// Extrudes `faces` as one group by `distance` along their normals.
    ///
    /// The selected faces are moved onto fresh copies of their vertices and
    /// a side quad is stitched along every perimeter edge, i.e. every edge
    /// not shared by two selected faces. Returns the new side faces.
    pub fn extrude(
        &mut self,
        faces: &[FaceId],
        distance: f32,
    ) -> Result<Vec<FaceId>, GeometryError> {
        let faces = self.checked_selection(faces)?;

        let directed: HashSet<(VertexId, VertexId)> =
            faces.iter().flat_map(|&f| self.faces[f].edges()).collect();

        // Offset direction per vertex: mean of the selected face normals
        // touching it.
        let mut push: HashMap<VertexId, Vec3> = HashMap::new();
        for &f in &faces {
            let n = self.compute_face_normal(f);
            for &v in &self.faces[f].indices {
                *push.entry(v).or_insert(Vec3::ZERO) += n;
            }
        }

        let mut remap: HashMap<VertexId, VertexId> = HashMap::with_capacity(push.len());
        for v in self.face_vertices(&faces) {
            let dir = push[&v].normalize_or_zero();
            remap.insert(v, self.positions.len());
            self.positions.push(self.positions[v] + dir * distance);
        }

        let mut sides = Vec::new();
        for &f in &faces {
            let material = self.faces[f].material;
            let perimeter: Vec<(VertexId, VertexId)> = self.faces[f]
                .edges()
                .filter(|&(a, b)| !directed.contains(&(b, a)))
                .collect();

            for (a, b) in perimeter {
                sides.push(self.faces.len());
                self.faces
                    .push(Face::new(vec![a, b, remap[&b], remap[&a]], material));
            }

            for v in &mut self.faces[f].indices {
                *v = remap[&*v];
            }
        }

        self.refresh_faces(&faces);
        self.refresh_faces(&sides);
        Ok(sides)
    }

    /// Re-projects the UVs of the given faces only.
    pub fn refresh_uv(&mut self, faces: &[FaceId]) {
        for &f in faces {
            let normal = self.compute_face_normal(f);
            let uvs = self.faces[f]
                .indices
                .iter()
                .map(|&v| planar_uv(self.origin + self.positions[v], normal))
                .collect();
            self.faces[f].uvs = uvs;
        }
    }

    /// Recomputes normals, tangents and UVs of every face.
    pub fn refresh_surface(&mut self) {
        let all = self.all_faces();
        self.refresh_faces(&all);
    }

    fn refresh_faces(&mut self, faces: &[FaceId]) {
        for &f in faces {
            let normal = self.compute_face_normal(f);
            let idx = &self.faces[f].indices;
            let tangent = match idx.as_slice() {
                [a, b, ..] => (self.positions[*b] - self.positions[*a]).normalize_or_zero(),
                _ => Vec3::ZERO,
            };
            let face = &mut self.faces[f];
            face.normal = normal;
            face.tangent = tangent;
        }
        self.refresh_uv(faces);
    }

    /// Removes the given faces and any vertices no longer referenced.
    pub fn delete_faces(&mut self, faces: &[FaceId]) -> Result<(), GeometryError> {
        let doomed: HashSet<FaceId> = self.checked_selection(faces)?.into_iter().collect();

        let mut index = 0;
        self.faces.retain(|_| {
            let keep = !doomed.contains(&index);
            index += 1;
            keep
        });

        self.compact_vertices();
        Ok(())
    }

    /// Moves `faces` into a new mesh, deleting them from this one.
    ///
    /// Fails if the selection is empty or covers the whole object, since
    /// either would leave one side of the split without faces.
    pub fn detach(&mut self, faces: &[FaceId]) -> Result<Mesh, GeometryError> {
        let selected = self.checked_selection(faces)?;
        if selected.len() == self.faces.len() {
            return Err(GeometryError::WholeObject(self.faces.len()));
        }

        let keep: HashSet<FaceId> = selected.iter().copied().collect();
        let inverse: Vec<FaceId> = (0..self.faces.len()).filter(|f| !keep.contains(f)).collect();

        let mut detached = self.clone();
        self.delete_faces(&selected)?;
        detached.delete_faces(&inverse)?;

        self.refresh_surface();
        detached.refresh_surface();
        Ok(detached)
    }

    pub fn set_face_material(&mut self, faces: &[FaceId], material: Material) {
        for &f in faces {
            if let Some(face) = self.faces.get_mut(f) {
                face.material = material;
            }
        }
    }

    pub fn set_material(&mut self, material: Material) {
        for face in &mut self.faces {
            face.material = material;
        }
    }

    /// World-space box around all vertices.
    pub fn world_bounds(&self) -> Bounds {
        let mut points = self.positions.iter().map(|&p| self.origin + p);
        let Some(first) = points.next() else {
            return Bounds::new(self.origin, Vec3::ZERO);
        };
        let mut bounds = Bounds::new(first, Vec3::ZERO);
        for p in points {
            bounds.encapsulate(p);
        }
        bounds
    }

    /// Closest hit of a world-space ray against this mesh.
    ///
    /// Hits nearer than [`SELF_HIT_EPSILON`] are skipped.
    pub fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        if self.faces.is_empty()
            || !self
                .world_bounds()
                .intersects_ray(origin, direction, max_distance)
        {
            return None;
        }

        let mut best: Option<f32> = None;
        for face in &self.faces {
            let idx = &face.indices;
            if idx.len() < 3 {
                continue;
            }
            let v0 = self.world_position(idx[0]);
            for pair in idx[1..].windows(2) {
                let (v1, v2) = (self.world_position(pair[0]), self.world_position(pair[1]));
                if let Some(t) = ray_triangle(origin, direction, v0, v1, v2)
                    && t > SELF_HIT_EPSILON
                    && t <= max_distance
                    && best.is_none_or(|b| t < b)
                {
                    best = Some(t);
                }
            }
        }

        best.map(|distance| RayHit {
            distance,
            point: origin + direction * distance,
        })
    }

    fn checked_selection(&self, faces: &[FaceId]) -> Result<Vec<FaceId>, GeometryError> {
        if faces.is_empty() {
            return Err(GeometryError::EmptySelection);
        }
        let count = self.faces.len();
        let mut seen = HashSet::new();
        let mut out = Vec::with_capacity(faces.len());
        for &face in faces {
            if face >= count {
                return Err(GeometryError::FaceOutOfRange { face, count });
            }
            if seen.insert(face) {
                out.push(face);
            }
        }
        Ok(out)
    }

    fn compact_vertices(&mut self) {
        let mut remap = vec![None; self.positions.len()];
        let mut positions = Vec::new();
        for face in &mut self.faces {
            for v in &mut face.indices {
                let new = *remap[*v].get_or_insert_with(|| {
                    positions.push(self.positions[*v]);
                    positions.len() - 1
                });
                *v = new;
            }
        }
        self.positions = positions;
    }
}

/// Projects `p` onto the axis plane most facing `normal`.
fn planar_uv(p: Vec3, normal: Vec3) -> Vec2 {
    let a = normal.abs();
    if a.x >= a.y && a.x >= a.z {
        Vec2::new(p.z, p.y)
    } else if a.y >= a.z {
        Vec2::new(p.x, p.z)
    } else {
        Vec2::new(p.x, p.y)
    }
}
