use std::f32::consts::PI;
use std::sync::Arc;

use flyscene_assets::MeshData;
use glam::Vec3;

/// Shape attached to a scene node. Primitive shapes are tessellated on
/// demand; imported meshes are shared.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Box {
        width: f32,
        height: f32,
        depth: f32,
    },
    Sphere {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    },
    /// Lies in the local XY plane facing +Z.
    Plane { width: f32, height: f32 },
    Mesh(Arc<MeshData>),
}

impl Geometry {
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        Geometry::Box {
            width,
            height,
            depth,
        }
    }

    pub fn cube(size: f32) -> Self {
        Self::cuboid(size, size, size)
    }

    pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        Geometry::Sphere {
            radius,
            width_segments: width_segments.max(3),
            height_segments: height_segments.max(2),
        }
    }

    pub fn plane(width: f32, height: f32) -> Self {
        Geometry::Plane { width, height }
    }

    /// Stable key for caching uploaded vertex buffers.
    pub fn cache_key(&self) -> String {
        match self {
            Geometry::Box {
                width,
                height,
                depth,
            } => format!("box:{width}x{height}x{depth}"),
            Geometry::Sphere {
                radius,
                width_segments,
                height_segments,
            } => format!("sphere:{radius}:{width_segments}x{height_segments}"),
            Geometry::Plane { width, height } => format!("plane:{width}x{height}"),
            Geometry::Mesh(mesh) => format!("mesh:{:p}", Arc::as_ptr(mesh)),
        }
    }

    pub fn tessellate(&self) -> Arc<MeshData> {
        match self {
            Geometry::Box {
                width,
                height,
                depth,
            } => Arc::new(box_mesh(*width, *height, *depth)),
            Geometry::Sphere {
                radius,
                width_segments,
                height_segments,
            } => Arc::new(sphere_mesh(*radius, *width_segments, *height_segments)),
            Geometry::Plane { width, height } => Arc::new(plane_mesh(*width, *height)),
            Geometry::Mesh(mesh) => Arc::clone(mesh),
        }
    }
}

fn box_mesh(width: f32, height: f32, depth: f32) -> MeshData {
    let half = Vec3::new(width, height, depth) * 0.5;
    // (normal, u axis, v axis) with u × v == normal.
    let faces = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];

    let mut mesh = MeshData {
        name: "box".into(),
        ..MeshData::default()
    };
    for (normal, u, v) in faces {
        let extent = |axis: Vec3| axis.abs().dot(half);
        let center = normal * extent(normal);
        let (hu, hv) = (u * extent(u), v * extent(v));
        let base = mesh.positions.len() as u32;
        let corners = [
            (center - hu + hv, [0.0, 1.0]),
            (center + hu + hv, [1.0, 1.0]),
            (center - hu - hv, [0.0, 0.0]),
            (center + hu - hv, [1.0, 0.0]),
        ];
        for (p, uv) in corners {
            mesh.positions.push(p.to_array());
            mesh.normals.push(normal.to_array());
            mesh.uvs.push(uv);
        }
        mesh.indices
            .extend([base, base + 2, base + 1, base + 2, base + 3, base + 1]);
    }
    mesh
}

fn sphere_mesh(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let mut mesh = MeshData {
        name: "sphere".into(),
        ..MeshData::default()
    };
    let row = width_segments + 1;

    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            let p = Vec3::new(
                -radius * (u * 2.0 * PI).cos() * (v * PI).sin(),
                radius * (v * PI).cos(),
                radius * (u * 2.0 * PI).sin() * (v * PI).sin(),
            );
            mesh.positions.push(p.to_array());
            mesh.normals
                .push(p.try_normalize().unwrap_or(Vec3::Y).to_array());
            mesh.uvs.push([u, 1.0 - v]);
        }
    }

    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;
            // Pole rows collapse to a single triangle per quad.
            if iy != 0 {
                mesh.indices.extend([a, b, d]);
            }
            if iy != height_segments - 1 {
                mesh.indices.extend([b, c, d]);
            }
        }
    }
    mesh
}

fn plane_mesh(width: f32, height: f32) -> MeshData {
    let (hw, hh) = (width * 0.5, height * 0.5);
    MeshData {
        name: "plane".into(),
        positions: vec![[-hw, hh, 0.0], [hw, hh, 0.0], [-hw, -hh, 0.0], [hw, -hh, 0.0]],
        normals: vec![[0.0, 0.0, 1.0]; 4],
        uvs: vec![[0.0, 1.0], [1.0, 1.0], [0.0, 0.0], [1.0, 0.0]],
        indices: vec![0, 2, 1, 2, 3, 1],
    }
}
