//! Scene snapshot store
//!
//! Holds the last successfully fetched entity list, the current selection,
//! the selected entity's detail and its component list. Readers get the list
//! as an `Arc` so a render pass never observes a half-applied refresh; every
//! replacement swaps the whole list in one assignment.

use crate::error::{InspectorError, Result};
use crate::types::{
    Component, ComponentId, Entity, EntityField, EntityId, FieldKey, PropertyPath,
    PropertyValue, Transform,
};
use std::sync::Arc;

/// A local mutation of one cached entity
#[derive(Debug, Clone, PartialEq)]
pub enum EntityPatch {
    /// Overwrite `name` or `tag`
    Field(EntityField, String),
    /// Overwrite the whole transform
    Transform(Transform),
}

impl EntityPatch {
    fn apply(&self, entity: &mut Entity) {
        match self {
            EntityPatch::Field(field, value) => entity.set_field(*field, value.clone()),
            EntityPatch::Transform(transform) => entity.transform = *transform,
        }
    }
}

/// Cached projection of the remote scene
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    entities: Arc<Vec<Entity>>,
    selection: Option<EntityId>,
    detail: Option<Entity>,
    components: Vec<Component>,
    /// Bumped on every successful replace
    generation: u64,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current entity list
    pub fn snapshot(&self) -> Arc<Vec<Entity>> {
        Arc::clone(&self.entities)
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entity(id).is_some()
    }

    /// Number of successful replacements so far
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Swap in a freshly fetched list
    pub fn replace(&mut self, entities: Vec<Entity>) {
        self.replace_preserving(entities, &[]);
    }

    /// Swap in a freshly fetched list, keeping the cached value of every
    /// protected field
    ///
    /// A field with an edit waiting to be sent keeps whatever the cache held
    /// before, so the refresh cannot move it under the user.
    pub fn replace_preserving(&mut self, mut entities: Vec<Entity>, protected: &[FieldKey]) {
        for key in protected {
            let Some(id) = key.entity() else { continue };
            let Some(old) = self.entity(id) else { continue };
            let Some(new) = entities.iter_mut().find(|e| e.id == id) else {
                continue;
            };
            match key {
                FieldKey::EntityProperty { field, .. } => {
                    new.set_field(*field, old.field(*field).to_string());
                }
                FieldKey::TransformAxis { part, axis, .. } => {
                    new.transform.set(*part, *axis, old.transform.get(*part, *axis));
                }
                FieldKey::ComponentProperty { .. } => {}
            }
        }

        self.entities = Arc::new(entities);
        self.generation += 1;
    }

    pub fn selection(&self) -> Option<EntityId> {
        self.selection
    }

    /// Select an entity from the current list
    ///
    /// Detail and components of any previous selection are dropped; the caller
    /// loads the new ones.
    pub fn select(&mut self, id: EntityId) -> Result<()> {
        if !self.contains(id) {
            return Err(InspectorError::entity_not_found(id));
        }
        if self.selection != Some(id) {
            self.detail = None;
            self.components.clear();
        }
        self.selection = Some(id);
        Ok(())
    }

    /// Drop the selection and everything loaded for it; returns the old id
    pub fn clear_selection(&mut self) -> Option<EntityId> {
        self.detail = None;
        self.components.clear();
        self.selection.take()
    }

    /// Whether the selection, if any, is still present in the list
    pub fn selection_is_live(&self) -> bool {
        self.selection.map_or(true, |id| self.contains(id))
    }

    pub fn detail(&self) -> Option<&Entity> {
        self.detail.as_ref()
    }

    /// Store the detail of the selected entity; ignored for any other id
    pub fn set_detail(&mut self, entity: Entity) -> bool {
        if self.selection == Some(entity.id) {
            self.detail = Some(entity);
            true
        } else {
            false
        }
    }

    /// Mutate a cached entity in the list and, if selected, its detail
    pub fn apply_local_patch(&mut self, id: EntityId, patch: &EntityPatch) -> Result<()> {
        let mut touched = false;

        if self.contains(id) {
            let entities = Arc::make_mut(&mut self.entities);
            if let Some(entity) = entities.iter_mut().find(|e| e.id == id) {
                patch.apply(entity);
                touched = true;
            }
        }
        if let Some(detail) = self.detail.as_mut().filter(|d| d.id == id) {
            patch.apply(detail);
            touched = true;
        }

        if touched {
            Ok(())
        } else {
            Err(InspectorError::entity_not_found(id))
        }
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.iter().find(|c| c.id == id)
    }

    /// Replace the component cache wholesale
    pub fn set_components(&mut self, components: Vec<Component>) {
        self.components = components;
    }

    /// Store a property value at `path`, creating the nested map when absent
    pub fn patch_component_property(
        &mut self,
        id: ComponentId,
        path: &PropertyPath,
        value: PropertyValue,
    ) -> Result<()> {
        let component = self
            .components
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| InspectorError::component_not_found(id))?;
        component.set_property(path, value)
    }

    pub fn set_component_enabled(&mut self, id: ComponentId, enabled: bool) -> Result<()> {
        let component = self
            .components
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| InspectorError::component_not_found(id))?;
        component.enabled = enabled;
        Ok(())
    }

    /// Entities whose name or tag contains `query`, ignoring case
    pub fn filtered(&self, query: &str) -> Vec<&Entity> {
        let query = query.trim().to_lowercase();
        self.entities.iter().filter(|e| e.matches(&query)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Axis, TransformPart};

    fn scene() -> Vec<Entity> {
        vec![
            Entity::new(1, "Camera").with_tag("MainCamera"),
            Entity::new(2, "Cube"),
        ]
    }

    #[test]
    fn test_replace_swaps_whole_list() {
        let mut store = SnapshotStore::new();
        store.replace(scene());
        let before = store.snapshot();

        store.replace(vec![Entity::new(1, "Camera")]);
        assert_eq!(before.len(), 2);
        assert_eq!(store.entities().len(), 1);
        assert_eq!(store.generation(), 2);
    }

    #[test]
    fn test_select_unknown_is_not_found() {
        let mut store = SnapshotStore::new();
        store.replace(scene());
        let err = store.select(9).unwrap_err();
        assert!(matches!(err, InspectorError::NotFound { id: 9, .. }));
        assert_eq!(store.selection(), None);
    }

    #[test]
    fn test_select_new_entity_drops_old_components() {
        let mut store = SnapshotStore::new();
        store.replace(scene());
        store.select(2).unwrap();
        store.set_components(vec![Component::new(20, "Renderer")]);

        store.select(2).unwrap();
        assert_eq!(store.components().len(), 1);

        store.select(1).unwrap();
        assert!(store.components().is_empty());
    }

    #[test]
    fn test_patch_updates_list_and_detail() {
        let mut store = SnapshotStore::new();
        store.replace(scene());
        store.select(2).unwrap();
        assert!(store.set_detail(Entity::new(2, "Cube")));

        store
            .apply_local_patch(2, &EntityPatch::Field(EntityField::Name, "Box".into()))
            .unwrap();
        assert_eq!(store.entity(2).unwrap().name, "Box");
        assert_eq!(store.detail().unwrap().name, "Box");

        assert!(store
            .apply_local_patch(7, &EntityPatch::Field(EntityField::Tag, "x".into()))
            .is_err());
    }

    #[test]
    fn test_patch_does_not_disturb_held_snapshot() {
        let mut store = SnapshotStore::new();
        store.replace(scene());
        let held = store.snapshot();
        store
            .apply_local_patch(1, &EntityPatch::Field(EntityField::Name, "Eye".into()))
            .unwrap();
        assert_eq!(held[0].name, "Camera");
        assert_eq!(store.entity(1).unwrap().name, "Eye");
    }

    #[test]
    fn test_replace_preserving_keeps_protected_fields() {
        let mut store = SnapshotStore::new();
        store.replace(scene());
        store
            .apply_local_patch(2, &EntityPatch::Field(EntityField::Name, "Local".into()))
            .unwrap();

        let mut fresh = scene();
        fresh[1].transform.set(TransformPart::Position, Axis::X, 4.0);
        fresh[1].transform.set(TransformPart::Position, Axis::Y, 9.0);

        let protected = vec![
            FieldKey::EntityProperty {
                entity: 2,
                field: EntityField::Name,
            },
            FieldKey::TransformAxis {
                entity: 2,
                part: TransformPart::Position,
                axis: Axis::Y,
            },
        ];
        store.replace_preserving(fresh, &protected);

        let cube = store.entity(2).unwrap();
        assert_eq!(cube.name, "Local");
        assert_eq!(cube.transform.position.x, 4.0);
        assert_eq!(cube.transform.position.y, 0.0);
    }

    #[test]
    fn test_component_patches() {
        let mut store = SnapshotStore::new();
        store.set_components(vec![Component::new(5, "Light").with_property("intensity", 1.0)]);

        store
            .patch_component_property(5, &PropertyPath::nested("color", "r"), 0.5.into())
            .unwrap();
        store.set_component_enabled(5, false).unwrap();

        let light = store.component(5).unwrap();
        assert_eq!(
            light.property(&PropertyPath::nested("color", "r")),
            Some(PropertyValue::Number(0.5))
        );
        assert!(!light.enabled);
        assert!(store.set_component_enabled(6, true).is_err());
    }

    #[test]
    fn test_filtered() {
        let mut store = SnapshotStore::new();
        store.replace(scene());
        let hits: Vec<EntityId> = store.filtered("  CAM ").iter().map(|e| e.id).collect();
        assert_eq!(hits, vec![1]);
        assert_eq!(store.filtered("").len(), 2);
    }
}
