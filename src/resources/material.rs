//! Surface materials shared by shapes.
//!
//! Shapes refer to a material through a [`MaterialId`]; the table itself lives
//! in [`PhysicsWorld`](crate::resources::physicsworld::PhysicsWorld) so that
//! changing a material is seen by every shape using it.

use rapier3d::prelude::Real;
use serde::Serialize;

/// Handle into the material table. Cheap to copy and share between shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MaterialId(usize);

impl MaterialId {
    /// The material every new shape starts with.
    pub const DEFAULT: MaterialId = MaterialId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// Friction and restitution coefficients of a surface.
///
/// The engine binding models one friction coefficient per collider; the
/// dynamic coefficient is the one applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub static_friction: Real,
    pub dynamic_friction: Real,
    pub restitution: Real,
}

impl Material {
    pub fn new(static_friction: Real, dynamic_friction: Real, restitution: Real) -> Self {
        Self {
            static_friction,
            dynamic_friction,
            restitution,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

/// Append-only list of materials; index 0 is the default material.
#[derive(Debug, Clone)]
pub struct MaterialTable {
    materials: Vec<Material>,
}

impl Default for MaterialTable {
    fn default() -> Self {
        Self::new()
    }
}

impl MaterialTable {
    pub fn new() -> Self {
        Self {
            materials: vec![Material::default()],
        }
    }

    pub fn create(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    pub fn get(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0)
    }

    pub fn get_mut(&mut self, id: MaterialId) -> Option<&mut Material> {
        self.materials.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_starts_with_default() {
        let table = MaterialTable::new();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(MaterialId::DEFAULT), Some(&Material::default()));
    }

    #[test]
    fn test_create_returns_sequential_ids() {
        let mut table = MaterialTable::new();
        let bouncy = table.create(Material::new(0.0, 0.0, 3.0));
        let soft = table.create(Material::new(0.0, 0.0, 0.5));
        assert_eq!(bouncy.index(), 1);
        assert_eq!(soft.index(), 2);
        assert_eq!(table.get(bouncy).map(|m| m.restitution), Some(3.0));
    }

    #[test]
    fn test_get_mut_edits_in_place() {
        let mut table = MaterialTable::new();
        table.get_mut(MaterialId::DEFAULT).unwrap().dynamic_friction = 0.2;
        assert_eq!(table.get(MaterialId::DEFAULT).unwrap().dynamic_friction, 0.2);
    }
}
