//! Named collections of materials.

use crate::ids::MaterialId;
use crate::material::Material;
use crate::ordered::{AsyncId, Ordered};

#[derive(Clone, Debug, Default)]
pub struct Library {
    /// Path the library was loaded from; not persisted.
    pub filename: String,
    materials: Ordered<Material>,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn materials(&self) -> &Ordered<Material> {
        &self.materials
    }

    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.materials.iter()
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        let id = material.id();
        self.materials.push(material);
        id
    }

    pub fn insert_material(&mut self, index: usize, material: Material) -> MaterialId {
        let id = material.id();
        self.materials.insert(index, material);
        id
    }

    pub fn remove_material(&mut self, id: MaterialId) -> Option<Material> {
        self.materials.remove(id).map(|(_, m)| m)
    }

    /// Resolve a captured `(position, id)` pair, tolerating reorders.
    pub fn get(&self, key: AsyncId<MaterialId>) -> Option<&Material> {
        self.materials.get_async(key)
    }

    pub fn get_mut(&mut self, key: AsyncId<MaterialId>) -> Option<&mut Material> {
        self.materials.get_async_mut(key)
    }

    pub fn get_by_id(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id)
    }

    pub fn get_by_id_mut(&mut self, id: MaterialId) -> Option<&mut Material> {
        self.materials.get_mut(id)
    }

    /// First material named `name`. Names are not required to be unique.
    pub fn get_by_name(&self, name: &str) -> Option<&Material> {
        self.materials.iter().find(|m| m.name == name)
    }

    pub fn get_by_name_mut(&mut self, name: &str) -> Option<&mut Material> {
        self.materials.iter_mut().find(|m| m.name == name)
    }

    pub fn position_of(&self, id: MaterialId) -> Option<usize> {
        self.materials.position_of(id)
    }

    pub fn async_id(&self, id: MaterialId) -> Option<AsyncId<MaterialId>> {
        self.materials.async_id(id)
    }
}

impl PartialEq for Library {
    fn eq(&self, other: &Self) -> bool {
        self.materials == other.materials
    }
}
