use std::sync::Arc;

use glam::{Mat3, Mat4, Vec3};

use crate::{AssetError, AssetId};

/// Indexed triangle mesh in CPU memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Axis-aligned bounds, or `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut points = self.positions.iter().map(|p| Vec3::from_array(*p));
        let first = points.next()?;
        Some(points.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
    }

    /// Area-weighted vertex normals from the triangle list.
    pub fn compute_normals(&mut self) {
        let mut acc = vec![Vec3::ZERO; self.positions.len()];
        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let (Some(pa), Some(pb), Some(pc)) = (
                self.positions.get(a),
                self.positions.get(b),
                self.positions.get(c),
            ) else {
                continue;
            };
            let (pa, pb, pc) = (Vec3::from(*pa), Vec3::from(*pb), Vec3::from(*pc));
            let n = (pb - pa).cross(pc - pa);
            acc[a] += n;
            acc[b] += n;
            acc[c] += n;
        }
        self.normals = acc
            .into_iter()
            .map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
            .collect();
    }

    fn transformed(mut self, matrix: Mat4) -> Self {
        if matrix == Mat4::IDENTITY {
            return self;
        }
        let normal_matrix = Mat3::from_mat4(matrix).inverse().transpose();
        for p in &mut self.positions {
            *p = matrix.transform_point3(Vec3::from(*p)).to_array();
        }
        for n in &mut self.normals {
            *n = (normal_matrix * Vec3::from(*n))
                .try_normalize()
                .unwrap_or(Vec3::Y)
                .to_array();
        }
        self
    }
}

/// A decoded glTF model with node transforms baked into its meshes.
#[derive(Debug, Clone)]
pub struct ModelData {
    pub id: AssetId,
    pub label: String,
    pub meshes: Vec<Arc<MeshData>>,
}

impl ModelData {
    /// Import a `.glb`, or a `.gltf` whose buffers are embedded.
    pub fn import(label: &str, bytes: &[u8]) -> Result<Self, AssetError> {
        let (document, buffers, _images) = gltf::import_slice(bytes)?;

        let mut meshes = Vec::new();
        let roots: Vec<gltf::Node> = match document
            .default_scene()
            .or_else(|| document.scenes().next())
        {
            Some(scene) => scene.nodes().collect(),
            None => Vec::new(),
        };

        if roots.is_empty() {
            for mesh in document.meshes() {
                collect_mesh(&mesh, Mat4::IDENTITY, &buffers, &mut meshes);
            }
        } else {
            let mut stack: Vec<(gltf::Node, Mat4)> =
                roots.into_iter().map(|n| (n, Mat4::IDENTITY)).collect();
            while let Some((node, parent)) = stack.pop() {
                let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());
                if let Some(mesh) = node.mesh() {
                    collect_mesh(&mesh, world, &buffers, &mut meshes);
                }
                stack.extend(node.children().map(|c| (c, world)));
            }
        }

        if meshes.is_empty() {
            return Err(AssetError::Unsupported(format!("{label}: model has no meshes")));
        }
        tracing::debug!(label, meshes = meshes.len(), "imported model");
        Ok(Self {
            id: AssetId::of(bytes),
            label: label.to_string(),
            meshes: meshes.into_iter().map(Arc::new).collect(),
        })
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(|m| m.triangle_count()).sum()
    }
}

fn collect_mesh(
    mesh: &gltf::Mesh,
    world: Mat4,
    buffers: &[gltf::buffer::Data],
    out: &mut Vec<MeshData>,
) {
    let base = mesh.name().unwrap_or("mesh");
    for (i, primitive) in mesh.primitives().enumerate() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            tracing::debug!(mesh = base, "skipping non-triangle primitive");
            continue;
        }
        let reader = primitive.reader(|b| buffers.get(b.index()).map(|d| d.0.as_slice()));
        let Some(positions) = reader.read_positions() else {
            continue;
        };
        let positions: Vec<[f32; 3]> = positions.collect();
        let indices: Vec<u32> = match reader.read_indices() {
            Some(ix) => ix.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };
        let uvs = match reader.read_tex_coords(0) {
            Some(uv) => uv.into_f32().collect(),
            None => vec![[0.0, 0.0]; positions.len()],
        };
        let mut data = MeshData {
            name: format!("{base}_{i}"),
            normals: Vec::new(),
            positions,
            uvs,
            indices,
        };
        match reader.read_normals() {
            Some(n) => data.normals = n.collect(),
            None => data.compute_normals(),
        }
        out.push(data.transformed(world));
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Minimal binary glTF: one triangle on a node translated by +1 on X.
    pub(crate) fn triangle_glb() -> Vec<u8> {
        let mut bin = Vec::new();
        for v in [[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
            for c in v {
                bin.extend_from_slice(&c.to_le_bytes());
            }
        }
        for i in [0u16, 1, 2] {
            bin.extend_from_slice(&i.to_le_bytes());
        }
        let buffer_len = bin.len();
        while bin.len() % 4 != 0 {
            bin.push(0);
        }

        let json = format!(
            r#"{{"asset":{{"version":"2.0"}},"scene":0,"scenes":[{{"nodes":[0]}}],"nodes":[{{"mesh":0,"translation":[1,0,0]}}],"meshes":[{{"name":"tri","primitives":[{{"attributes":{{"POSITION":0}},"indices":1}}]}}],"buffers":[{{"byteLength":{buffer_len}}}],"bufferViews":[{{"buffer":0,"byteOffset":0,"byteLength":36}},{{"buffer":0,"byteOffset":36,"byteLength":6}}],"accessors":[{{"bufferView":0,"componentType":5126,"count":3,"type":"VEC3","min":[0,0,0],"max":[1,1,0]}},{{"bufferView":1,"componentType":5123,"count":3,"type":"SCALAR"}}]}}"#
        );
        let mut json = json.into_bytes();
        while json.len() % 4 != 0 {
            json.push(b' ');
        }

        let total = 12 + 8 + json.len() + 8 + bin.len();
        let mut glb = Vec::with_capacity(total);
        glb.extend_from_slice(b"glTF");
        glb.extend_from_slice(&2u32.to_le_bytes());
        glb.extend_from_slice(&(total as u32).to_le_bytes());
        glb.extend_from_slice(&(json.len() as u32).to_le_bytes());
        glb.extend_from_slice(b"JSON");
        glb.extend_from_slice(&json);
        glb.extend_from_slice(&(bin.len() as u32).to_le_bytes());
        glb.extend_from_slice(b"BIN\0");
        glb.extend_from_slice(&bin);
        glb
    }

    #[test]
    fn imports_glb_and_bakes_node_transform() {
        let bytes = triangle_glb();
        let model = ModelData::import("tri.glb", &bytes).unwrap();
        assert_eq!(model.meshes.len(), 1);
        assert_eq!(model.triangle_count(), 1);

        let mesh = &model.meshes[0];
        assert_eq!(mesh.name, "tri_0");
        assert_eq!(mesh.positions[0], [1.0, 0.0, 0.0]);
        assert_eq!(mesh.uvs.len(), 3);
        // No normals in the file: computed from winding, facing +Z.
        let n = Vec3::from(mesh.normals[0]);
        assert!(n.abs_diff_eq(Vec3::Z, 1e-6));
        assert_eq!(model.id, AssetId::of(&bytes));
    }

    #[test]
    fn garbage_is_a_gltf_error() {
        assert!(matches!(
            ModelData::import("bad.glb", b"glTF garbage"),
            Err(AssetError::Gltf(_))
        ));
    }

    #[test]
    fn bounds_cover_all_points() {
        let mesh = MeshData {
            positions: vec![[-1.0, 2.0, 0.0], [3.0, -4.0, 5.0]],
            ..MeshData::default()
        };
        let (lo, hi) = mesh.bounds().unwrap();
        assert_eq!(lo, Vec3::new(-1.0, -4.0, 0.0));
        assert_eq!(hi, Vec3::new(3.0, 2.0, 5.0));
        assert!(MeshData::default().bounds().is_none());
    }
}
