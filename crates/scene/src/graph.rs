use std::collections::BTreeMap;

use flyscene_common::{Color, Transform};
use glam::Mat4;

use crate::geometry::Geometry;
use crate::material::{Material, ShaderMaterial};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub u32);

/// A scene node. Nodes without geometry act as groups.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub geometry: Option<Geometry>,
    pub material: Option<MaterialId>,
    pub parent: Option<NodeId>,
    pub visible: bool,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            geometry: None,
            material: None,
            parent: None,
            visible: true,
        }
    }

    pub fn mesh(name: impl Into<String>, geometry: Geometry, material: MaterialId) -> Self {
        Self {
            geometry: Some(geometry),
            material: Some(material),
            ..Self::new(name)
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_parent(mut self, parent: NodeId) -> Self {
        self.parent = Some(parent);
        self
    }
}

/// One drawable node resolved to world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    pub node: NodeId,
    pub material: MaterialId,
    pub world: Mat4,
}

/// Flat scene graph: nodes link to their parent by id.
#[derive(Debug, Clone)]
pub struct Scene {
    nodes: BTreeMap<NodeId, Node>,
    materials: BTreeMap<MaterialId, Material>,
    next_node: u32,
    next_material: u32,
    pub background: Color,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            nodes: BTreeMap::new(),
            materials: BTreeMap::new(),
            next_node: 0,
            next_material: 0,
            background: Color::BLACK,
        }
    }
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_material(&mut self, material: impl Into<Material>) -> MaterialId {
        let id = MaterialId(self.next_material);
        self.next_material += 1;
        self.materials.insert(id, material.into());
        id
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(&id)
    }

    pub fn material_mut(&mut self, id: MaterialId) -> Option<&mut Material> {
        self.materials.get_mut(&id)
    }

    pub fn materials(&self) -> impl Iterator<Item = (MaterialId, &Material)> {
        self.materials.iter().map(|(id, m)| (*id, m))
    }

    pub fn shader_materials_mut(&mut self) -> impl Iterator<Item = &mut ShaderMaterial> {
        self.materials.values_mut().filter_map(Material::as_shader_mut)
    }

    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        self.nodes.insert(id, node);
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().map(|(id, n)| (*id, n))
    }

    pub fn children(&self, parent: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .filter(move |(_, n)| n.parent == Some(parent))
            .map(|(id, _)| *id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    /// Material of a node, if the node exists and has one.
    pub fn node_material_mut(&mut self, id: NodeId) -> Option<&mut Material> {
        let material = self.nodes.get(&id)?.material?;
        self.materials.get_mut(&material)
    }

    /// Composed parent chain. A chain that loops back on itself is cut at the
    /// repeat.
    pub fn world_matrix(&self, id: NodeId) -> Option<Mat4> {
        let mut node = self.nodes.get(&id)?;
        let mut world = node.transform.matrix();
        let mut hops = 0;
        while let Some(parent_id) = node.parent {
            hops += 1;
            if hops > self.nodes.len() {
                tracing::warn!(?id, "parent cycle in scene graph");
                break;
            }
            let Some(parent) = self.nodes.get(&parent_id) else {
                break;
            };
            world = parent.transform.matrix() * world;
            node = parent;
        }
        Some(world)
    }

    fn effectively_visible<'a>(&'a self, mut node: &'a Node) -> bool {
        let mut hops = 0;
        loop {
            if !node.visible {
                return false;
            }
            hops += 1;
            match node.parent.and_then(|p| self.nodes.get(&p)) {
                Some(parent) if hops <= self.nodes.len() => node = parent,
                _ => return true,
            }
        }
    }

    /// Every visible node with geometry and a material, in node order.
    pub fn draw_list(&self) -> Vec<DrawItem> {
        self.nodes
            .iter()
            .filter(|(_, n)| n.geometry.is_some() && self.effectively_visible(n))
            .filter_map(|(id, n)| {
                let material = n.material.filter(|m| self.materials.contains_key(m))?;
                Some(DrawItem {
                    node: *id,
                    material,
                    world: self.world_matrix(*id)?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lights::LightRig;
    use crate::material::StandardMaterial;
    use glam::Vec3;

    #[test]
    fn ids_are_sequential_and_iteration_ordered() {
        let mut scene = Scene::new();
        let a = scene.add_node(Node::new("a"));
        let b = scene.add_node(Node::new("b"));
        assert_eq!((a, b), (NodeId(0), NodeId(1)));
        let names: Vec<_> = scene.nodes().map(|(_, n)| n.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn world_matrix_composes_parents() {
        let mut scene = Scene::new();
        let group = scene.add_node(
            Node::new("group").with_transform(
                Transform::from_position(Vec3::new(-10.0, -10.0, -30.0))
                    .with_scale(Vec3::splat(10.0)),
            ),
        );
        let child = scene.add_node(
            Node::new("child")
                .with_transform(Transform::from_position(Vec3::X))
                .with_parent(group),
        );
        let p = scene.world_matrix(child).unwrap().transform_point3(Vec3::ZERO);
        assert!(p.abs_diff_eq(Vec3::new(0.0, -10.0, -30.0), 1e-5));
        assert_eq!(scene.children(group).collect::<Vec<_>>(), vec![child]);
    }

    #[test]
    fn cyclic_parents_do_not_hang() {
        let mut scene = Scene::new();
        let a = scene.add_node(Node::new("a"));
        let b = scene.add_node(Node::new("b").with_parent(a));
        scene.node_mut(a).unwrap().parent = Some(b);
        assert!(scene.world_matrix(a).is_some());
    }

    #[test]
    fn draw_list_skips_groups_and_hidden() {
        let mut scene = Scene::new();
        let mat = scene.add_material(StandardMaterial::new(Color::WHITE));
        let shader = scene.add_material(ShaderMaterial::lit(&LightRig::demo(), 32.0, None));
        let group = scene.add_node(Node::new("group"));
        let shown = scene.add_node(Node::mesh("cube", Geometry::cube(1.0), mat).with_parent(group));
        let hidden = scene.add_node(Node::mesh("ball", Geometry::sphere(1.0, 8, 8), shader));
        scene.node_mut(hidden).unwrap().visible = false;

        let items = scene.draw_list();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].node, shown);

        scene.node_mut(group).unwrap().visible = false;
        assert!(scene.draw_list().is_empty());
        assert_eq!(scene.shader_materials_mut().count(), 1);
    }

    #[test]
    fn hidden_grandparent_hides_descendants() {
        let mut scene = Scene::new();
        let mat = scene.add_material(StandardMaterial::new(Color::WHITE));
        let root = scene.add_node(Node::new("root"));
        let mid = scene.add_node(Node::new("mid").with_parent(root));
        let leaf = scene.add_node(Node::mesh("leaf", Geometry::cube(1.0), mat).with_parent(mid));
        assert_eq!(scene.draw_list().len(), 1);
        assert_eq!(scene.draw_list()[0].node, leaf);

        scene.node_mut(root).unwrap().visible = false;
        assert!(scene.draw_list().is_empty());
    }
}
