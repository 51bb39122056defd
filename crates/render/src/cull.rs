use glam::Mat4;

use crate::scene::{Light, NodeId, NodeKind, SceneError, SceneGraph};

/// A geometry node paired with its accumulated world matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drawable {
    pub geometry: NodeId,
    pub world: Mat4,
}

/// Per-frame accumulator filled by a cull pass and consumed by the draw step.
#[derive(Debug, Clone, Default)]
pub struct DrawableList {
    drawables: Vec<Drawable>,
    lights: Vec<Light>,
}

impl DrawableList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the accumulator, keeping its allocation.
    pub fn reset(&mut self) {
        self.drawables.clear();
        self.lights.clear();
    }

    pub fn push(&mut self, drawable: Drawable) {
        self.drawables.push(drawable);
    }

    pub fn push_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    pub fn drawables(&self) -> &[Drawable] {
        &self.drawables
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn len(&self) -> usize {
        self.drawables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drawables.is_empty()
    }
}

/// Depth-first scene walk that composes parent and local transforms.
///
/// Every reachable geometry is emitted in traversal order; there is no
/// frustum rejection.
#[derive(Debug, Default)]
pub struct CullVisitor {
    stack: Vec<(NodeId, Mat4)>,
}

impl CullVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walk `root` and append its drawables and lights to `list`.
    /// Returns the number of drawables added.
    pub fn cull(
        &mut self,
        scene: &SceneGraph,
        root: NodeId,
        list: &mut DrawableList,
    ) -> Result<usize, SceneError> {
        let before = list.len();
        self.stack.clear();
        self.stack.push((root, Mat4::IDENTITY));

        while let Some((id, parent)) = self.stack.pop() {
            let kind = scene.kind(id).ok_or(SceneError::UnknownNode(id))?;
            let world = match kind {
                NodeKind::Group => parent,
                NodeKind::Transform(local) => parent * *local,
                NodeKind::Geometry(_) => {
                    list.push(Drawable {
                        geometry: id,
                        world: parent,
                    });
                    continue;
                }
            };
            for light in scene.lights(id) {
                list.push_light(light.clone());
            }
            // Reverse so children pop in insertion order.
            for child in scene.children(id).iter().rev() {
                self.stack.push((*child, world));
            }
        }

        Ok(list.len() - before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Geometry, RenderState, VertexArray};
    use glam::Vec3;

    fn empty_geometry() -> Geometry {
        Geometry::new(VertexArray::new(), RenderState::default())
    }

    #[test]
    fn cull_composes_nested_transforms() {
        let mut scene = SceneGraph::new();
        let root = scene.create_group();
        let outer = scene.create_transform(Mat4::from_translation(Vec3::X));
        let inner = scene.create_transform(Mat4::from_translation(Vec3::Y));
        let geo = scene.create_geometry(empty_geometry());
        scene.add_node(root, outer).unwrap();
        scene.add_node(outer, inner).unwrap();
        scene.add_node(inner, geo).unwrap();

        let mut list = DrawableList::new();
        let added = CullVisitor::new().cull(&scene, root, &mut list).unwrap();

        assert_eq!(added, 1);
        let world = list.drawables()[0].world;
        assert_eq!(world.transform_point3(Vec3::ZERO), Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn cull_preserves_child_order() {
        let mut scene = SceneGraph::new();
        let root = scene.create_group();
        let a = scene.create_geometry(empty_geometry());
        let b = scene.create_geometry(empty_geometry());
        scene.add_node(root, a).unwrap();
        scene.add_node(root, b).unwrap();

        let mut list = DrawableList::new();
        CullVisitor::new().cull(&scene, root, &mut list).unwrap();
        let order: Vec<NodeId> = list.drawables().iter().map(|d| d.geometry).collect();
        assert_eq!(order, vec![a, b]);
    }

    #[test]
    fn cull_collects_lights() {
        let mut scene = SceneGraph::new();
        let root = scene.create_group();
        scene.add_light(root, Light::default()).unwrap();

        let mut list = DrawableList::new();
        CullVisitor::new().cull(&scene, root, &mut list).unwrap();
        assert_eq!(list.lights().len(), 1);
        assert!(list.is_empty());
    }

    #[test]
    fn reset_clears_accumulator() {
        let mut list = DrawableList::new();
        list.push(Drawable {
            geometry: NodeId(0),
            world: Mat4::IDENTITY,
        });
        list.push_light(Light::default());
        list.reset();
        assert!(list.is_empty());
        assert!(list.lights().is_empty());
    }

    #[test]
    fn unknown_root_is_an_error() {
        let scene = SceneGraph::new();
        let mut list = DrawableList::new();
        assert_eq!(
            CullVisitor::new().cull(&scene, NodeId(42), &mut list),
            Err(SceneError::UnknownNode(NodeId(42)))
        );
    }
}
