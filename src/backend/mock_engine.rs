//! Mock Engine Implementation for Testing
//!
//! This module provides an in-memory engine that answers the same API as the
//! real engine process. It is used by the integration tests and by the
//! binary's `--mock` mode to exercise the inspector without a running game.
//!
//! # Features
//!
//! - **Scene state**: entities, per-entity components, pause flag
//! - **Call log**: the most recent [`MAX_RECORDED_CALLS`] requests are kept as
//!   [`ApiCall`]s for assertions
//! - **Fault injection**: fail the next N list requests, or reject writes to
//!   specific components with a fixed error string
//! - **Shared handle**: clones share state, so a test can keep a handle after
//!   moving one into the session worker
//!
//! # Example
//!
//! ```ignore
//! use live_inspector::backend::MockEngine;
//! use live_inspector::types::Entity;
//!
//! let engine = MockEngine::new()
//!     .with_entity(Entity::new(1, "Camera").with_tag("Camera"))
//!     .paused(true);
//! let observer = engine.clone();
//! // hand `engine` to a Session, inspect `observer.calls()` afterwards
//! ```

use super::api_trait::{ApiStats, EngineApi};
use crate::error::{InspectorError, Result};
use crate::types::{
    Component, ComponentId, Entity, EntityField, EntityId, EngineStats, EngineStatus,
    PropertyPath, PropertyValue, Transform, WriteAck,
};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

/// Oldest calls are discarded past this many
pub const MAX_RECORDED_CALLS: usize = 1024;

/// A request observed by the mock engine
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    Stats,
    ListEntities,
    GetEntity(EntityId),
    NotifySelection(EntityId),
    SetEntityProperty {
        id: EntityId,
        property: String,
        value: String,
    },
    SetTransform {
        id: EntityId,
        transform: Transform,
    },
    ListComponents(EntityId),
    SetComponentProperty {
        id: ComponentId,
        property: String,
        value: PropertyValue,
    },
    SetComponentEnabled {
        id: ComponentId,
        enabled: bool,
    },
    EngineStatus,
    Pause,
    Resume,
    Scene,
}

impl ApiCall {
    /// Whether this call mutates engine state
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            ApiCall::SetEntityProperty { .. }
                | ApiCall::SetTransform { .. }
                | ApiCall::SetComponentProperty { .. }
                | ApiCall::SetComponentEnabled { .. }
        )
    }
}

#[derive(Debug, Default)]
struct MockState {
    entities: BTreeMap<EntityId, Entity>,
    components: BTreeMap<EntityId, Vec<Component>>,
    paused: bool,
    offline: bool,
    fail_list_requests: u32,
    rejected_components: HashMap<ComponentId, String>,
    calls: VecDeque<ApiCall>,
    stats: ApiStats,
}

/// In-memory stand-in for the engine process
#[derive(Debug, Clone, Default)]
pub struct MockEngine {
    state: Arc<Mutex<MockState>>,
}

impl MockEngine {
    /// Create an empty, running engine
    pub fn new() -> Self {
        Self::default()
    }

    /// A small scene resembling the engine's default startup level
    pub fn sample() -> Self {
        Self::new()
            .with_entity(Entity::new(1, "Main Camera").with_tag("Camera"))
            .with_entity(Entity::new(2, "Cube").with_tag("Untagged"))
            .with_entity(Entity::new(3, "Sun").with_tag("DirectionalLight"))
            .with_components(
                2,
                vec![
                    Component::new(20, "Renderer").with_nested(
                        "color",
                        &[("r", 1.0), ("g", 1.0), ("b", 1.0), ("a", 1.0)],
                    ),
                    Component::new(21, "RigidBody")
                        .with_property("mass", 1.0)
                        .with_property("useGravity", true),
                ],
            )
            .with_components(
                3,
                vec![Component::new(30, "DirectionalLight").with_property("intensity", 1.5)],
            )
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        // Poisoning is ignored so one panicking test cannot wedge the shared state.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn with_entity(self, entity: Entity) -> Self {
        self.insert_entity(entity);
        self
    }

    pub fn with_components(self, entity: EntityId, components: Vec<Component>) -> Self {
        self.lock().components.insert(entity, components);
        self
    }

    pub fn paused(self, paused: bool) -> Self {
        self.set_paused(paused);
        self
    }

    /// Add or replace an entity (simulates the game spawning one)
    pub fn insert_entity(&self, entity: Entity) {
        self.lock().entities.insert(entity.id, entity);
    }

    /// Remove an entity and its components (simulates the game destroying one)
    pub fn remove_entity(&self, id: EntityId) {
        let mut state = self.lock();
        state.entities.remove(&id);
        state.components.remove(&id);
    }

    /// Current engine-side copy of an entity
    pub fn entity(&self, id: EntityId) -> Option<Entity> {
        self.lock().entities.get(&id).cloned()
    }

    /// Current engine-side copy of a component
    pub fn component(&self, id: ComponentId) -> Option<Component> {
        self.lock()
            .components
            .values()
            .flatten()
            .find(|c| c.id == id)
            .cloned()
    }

    pub fn set_paused(&self, paused: bool) {
        self.lock().paused = paused;
    }

    pub fn is_paused(&self) -> bool {
        self.lock().paused
    }

    /// Make every request fail with a network error
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Fail the next `count` entity list requests
    pub fn fail_next_list(&self, count: u32) {
        self.lock().fail_list_requests = count;
    }

    /// Answer writes to `component` with `{error: reason}`
    pub fn reject_component(&self, component: ComponentId, reason: impl Into<String>) {
        self.lock().rejected_components.insert(component, reason.into());
    }

    /// Requests received so far, oldest first
    pub fn calls(&self) -> Vec<ApiCall> {
        self.lock().calls.iter().cloned().collect()
    }

    /// Only the mutating requests received so far
    pub fn writes(&self) -> Vec<ApiCall> {
        self.lock().calls.iter().filter(|c| c.is_write()).cloned().collect()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Record the call and fail if offline
    fn enter(&self, call: ApiCall) -> Result<MutexGuard<'_, MockState>> {
        let mut state = self.lock();
        if state.calls.len() == MAX_RECORDED_CALLS {
            state.calls.pop_front();
        }
        state.calls.push_back(call);
        if state.offline {
            state.stats.record_failure();
            return Err(InspectorError::Network(
                "mock engine is offline".to_string(),
            ));
        }
        state.stats.record_success(1);
        Ok(state)
    }
}

impl EngineApi for MockEngine {
    fn stats(&mut self) -> Result<EngineStats> {
        let state = self.enter(ApiCall::Stats)?;
        Ok(EngineStats {
            actor_count: state.entities.len() as u64,
            component_count: state.components.values().map(|c| c.len() as u64).sum(),
        })
    }

    fn list_entities(&mut self) -> Result<Vec<Entity>> {
        let mut state = self.enter(ApiCall::ListEntities)?;
        if state.fail_list_requests > 0 {
            state.fail_list_requests -= 1;
            return Err(InspectorError::Network("injected list failure".to_string()));
        }
        Ok(state.entities.values().cloned().collect())
    }

    fn get_entity(&mut self, id: EntityId) -> Result<Entity> {
        let state = self.enter(ApiCall::GetEntity(id))?;
        state
            .entities
            .get(&id)
            .cloned()
            .ok_or_else(|| InspectorError::Network(format!("/actors/{} returned HTTP 404", id)))
    }

    fn notify_selection(&mut self, id: EntityId) -> Result<()> {
        self.enter(ApiCall::NotifySelection(id))?;
        Ok(())
    }

    fn set_entity_property(
        &mut self,
        id: EntityId,
        property: &str,
        value: &str,
    ) -> Result<WriteAck> {
        let mut state = self.enter(ApiCall::SetEntityProperty {
            id,
            property: property.to_string(),
            value: value.to_string(),
        })?;
        let field: EntityField = match property.parse() {
            Ok(f) => f,
            Err(_) => return Ok(WriteAck::rejected(format!("unknown property {}", property))),
        };
        match state.entities.get_mut(&id) {
            Some(entity) => {
                entity.set_field(field, value);
                Ok(WriteAck::ok())
            }
            None => Ok(WriteAck::rejected("actor not found")),
        }
    }

    fn set_transform(&mut self, id: EntityId, transform: &Transform) -> Result<WriteAck> {
        let mut state = self.enter(ApiCall::SetTransform {
            id,
            transform: *transform,
        })?;
        match state.entities.get_mut(&id) {
            Some(entity) => {
                entity.transform = *transform;
                Ok(WriteAck::ok())
            }
            None => Ok(WriteAck::rejected("actor not found")),
        }
    }

    fn list_components(&mut self, id: EntityId) -> Result<Vec<Component>> {
        let state = self.enter(ApiCall::ListComponents(id))?;
        Ok(state.components.get(&id).cloned().unwrap_or_default())
    }

    fn set_component_property(
        &mut self,
        id: ComponentId,
        property: &str,
        value: &PropertyValue,
    ) -> Result<WriteAck> {
        let mut state = self.enter(ApiCall::SetComponentProperty {
            id,
            property: property.to_string(),
            value: value.clone(),
        })?;
        if let Some(reason) = state.rejected_components.get(&id) {
            return Ok(WriteAck::rejected(reason.clone()));
        }
        let path = match PropertyPath::parse(property) {
            Ok(p) => p,
            Err(e) => return Ok(WriteAck::rejected(e.to_string())),
        };
        let component = state.components.values_mut().flatten().find(|c| c.id == id);
        match component {
            Some(c) => match c.set_property(&path, value.clone()) {
                Ok(()) => Ok(WriteAck::ok()),
                Err(e) => Ok(WriteAck::rejected(e.to_string())),
            },
            None => Ok(WriteAck::rejected("component not found")),
        }
    }

    fn set_component_enabled(&mut self, id: ComponentId, enabled: bool) -> Result<WriteAck> {
        let mut state = self.enter(ApiCall::SetComponentEnabled { id, enabled })?;
        if let Some(reason) = state.rejected_components.get(&id) {
            return Ok(WriteAck::rejected(reason.clone()));
        }
        match state.components.values_mut().flatten().find(|c| c.id == id) {
            Some(c) => {
                c.enabled = enabled;
                Ok(WriteAck::ok())
            }
            None => Ok(WriteAck::rejected("component not found")),
        }
    }

    fn engine_status(&mut self) -> Result<EngineStatus> {
        let state = self.enter(ApiCall::EngineStatus)?;
        Ok(EngineStatus {
            paused: state.paused,
        })
    }

    fn pause(&mut self) -> Result<()> {
        self.enter(ApiCall::Pause)?.paused = true;
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        self.enter(ApiCall::Resume)?.paused = false;
        Ok(())
    }

    fn scene_document(&mut self) -> Result<serde_json::Value> {
        let state = self.enter(ApiCall::Scene)?;
        let actors: Vec<serde_json::Value> = state
            .entities
            .values()
            .map(|e| {
                serde_json::json!({
                    "id": e.id,
                    "name": e.name,
                    "tag": e.tag,
                    "transform": e.transform,
                    "components": state.components.get(&e.id).cloned().unwrap_or_default(),
                })
            })
            .collect();
        Ok(serde_json::json!({ "actors": actors }))
    }

    fn stats_snapshot(&self) -> ApiStats {
        self.lock().stats.clone()
    }
}
