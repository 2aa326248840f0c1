use crate::coords::Transform;
use crate::drawable::{Drawable, Geometry, Material};

use super::Scene;

/// Recipe for one drawable. Scenes are rebuilt from these on every surface epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawableSpec {
    pub label: String,
    pub geometry: Geometry,
    pub material: Material,
    pub local: Transform,
    /// Radians per second.
    pub spin: f32,
}

impl DrawableSpec {
    pub fn new(label: impl Into<String>, geometry: Geometry, material: Material) -> Self {
        Self {
            label: label.into(),
            geometry,
            material,
            local: Transform::IDENTITY,
            spin: 0.0,
        }
    }

    pub fn with_local(mut self, local: Transform) -> Self {
        self.local = local;
        self
    }

    pub fn with_spin(mut self, rad_per_sec: f32) -> Self {
        self.spin = rad_per_sec;
        self
    }
}

/// Ordered drawable recipes (draw order = list order).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneSpec {
    pub drawables: Vec<DrawableSpec>,
}

impl SceneSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, drawable: DrawableSpec) -> Self {
        self.drawables.push(drawable);
        self
    }

    /// Builds an unresourced scene.
    pub fn build(&self) -> Scene {
        let mut scene = Scene::new();
        for spec in &self.drawables {
            let drawable = Drawable::new(spec.label.clone(), spec.geometry.clone(), spec.material.clone());
            let id = scene.add_drawable(drawable);
            scene.set_local_transform(id, spec.local);
            scene.set_spin(id, spec.spin);
        }
        scene
    }
}
