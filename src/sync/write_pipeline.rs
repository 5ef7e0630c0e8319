//! Property write pipeline
//!
//! Turns one field edit into an engine request and, once the engine accepts
//! it, into the local patch that keeps the cache in step. Sending and
//! applying are split: [`WritePipeline::send`] only talks to the engine and
//! reads the cache, [`WritePipeline::apply`] only mutates the cache. A write
//! that fails at any step leaves the cache untouched.
//!
//! Every write is gated on the engine being paused. With the gate closed the
//! request is refused before anything is sent.

use super::snapshot::{EntityPatch, SnapshotStore};
use crate::backend::EngineApi;
use crate::error::{InspectorError, Result, ResultExt};
use crate::types::{
    AckLeniency, Axis, ComponentId, EntityField, EntityId, FieldKey, PropertyPath,
    PropertyValue, TransformPart, WriteAck,
};
use std::fmt;

/// One user edit, ready to be sent
#[derive(Debug, Clone, PartialEq)]
pub enum WriteRequest {
    EntityProperty {
        entity: EntityId,
        field: EntityField,
        value: String,
    },
    TransformAxis {
        entity: EntityId,
        part: TransformPart,
        axis: Axis,
        value: f64,
    },
    ComponentProperty {
        component: ComponentId,
        path: PropertyPath,
        value: PropertyValue,
    },
    ComponentEnabled {
        component: ComponentId,
        enabled: bool,
    },
}

impl WriteRequest {
    /// Identity of the edited field; toggles have none and are never debounced
    pub fn key(&self) -> Option<FieldKey> {
        match self {
            WriteRequest::EntityProperty { entity, field, .. } => Some(FieldKey::EntityProperty {
                entity: *entity,
                field: *field,
            }),
            WriteRequest::TransformAxis {
                entity, part, axis, ..
            } => Some(FieldKey::TransformAxis {
                entity: *entity,
                part: *part,
                axis: *axis,
            }),
            WriteRequest::ComponentProperty {
                component, path, ..
            } => Some(FieldKey::ComponentProperty {
                component: *component,
                path: path.clone(),
            }),
            WriteRequest::ComponentEnabled { .. } => None,
        }
    }

    /// The property name as shown to the user
    pub fn property(&self) -> String {
        match self {
            WriteRequest::EntityProperty { field, .. } => field.to_string(),
            WriteRequest::TransformAxis { part, axis, .. } => format!("{}.{}", part, axis),
            WriteRequest::ComponentProperty { path, .. } => path.to_string(),
            WriteRequest::ComponentEnabled { .. } => "enabled".to_string(),
        }
    }
}

impl fmt::Display for WriteRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteRequest::EntityProperty { value, .. } => {
                write!(f, "Updated {} to {}", self.property(), value)
            }
            WriteRequest::TransformAxis { value, .. } => {
                write!(f, "Updated {} to {:.2}", self.property(), value)
            }
            WriteRequest::ComponentProperty { value, .. } => {
                write!(f, "Updated {} to {}", self.property(), value)
            }
            WriteRequest::ComponentEnabled { enabled, .. } => {
                write!(f, "Component {}", if *enabled { "enabled" } else { "disabled" })
            }
        }
    }
}

/// The cache change a successful write calls for
#[derive(Debug, Clone, PartialEq)]
pub enum AppliedWrite {
    Entity {
        id: EntityId,
        patch: EntityPatch,
    },
    ComponentProperty {
        id: ComponentId,
        path: PropertyPath,
        value: PropertyValue,
    },
    ComponentEnabled {
        id: ComponentId,
        enabled: bool,
    },
}

/// Sends edits to the engine and patches the cache on success
#[derive(Debug, Clone, Copy, Default)]
pub struct WritePipeline {
    component_leniency: AckLeniency,
}

impl WritePipeline {
    pub fn new(component_leniency: AckLeniency) -> Self {
        Self { component_leniency }
    }

    pub fn component_leniency(&self) -> AckLeniency {
        self.component_leniency
    }

    /// Send `request` to the engine
    ///
    /// Returns the patch to apply once the engine has accepted the write.
    /// Nothing is sent when `gate_open` is false or the request fails local
    /// validation.
    pub fn send(
        &self,
        request: &WriteRequest,
        gate_open: bool,
        api: &mut dyn EngineApi,
        store: &SnapshotStore,
    ) -> Result<AppliedWrite> {
        if !gate_open {
            return Err(InspectorError::GateClosed);
        }

        match request {
            WriteRequest::EntityProperty {
                entity,
                field,
                value,
            } => {
                let ack = api.set_entity_property(*entity, field.as_str(), value)?;
                check_ack(&ack, AckLeniency::Strict)?;
                Ok(AppliedWrite::Entity {
                    id: *entity,
                    patch: EntityPatch::Field(*field, value.clone()),
                })
            }
            WriteRequest::TransformAxis {
                entity,
                part,
                axis,
                value,
            } => {
                let current = api
                    .get_entity(*entity)
                    .with_context(|| format!("Failed to read transform of actor {}", entity))?;
                let mut transform = current.transform;
                transform.set(*part, *axis, *value);

                let ack = api.set_transform(*entity, &transform)?;
                check_ack(&ack, AckLeniency::Strict)?;
                Ok(AppliedWrite::Entity {
                    id: *entity,
                    patch: EntityPatch::Transform(transform),
                })
            }
            WriteRequest::ComponentProperty {
                component,
                path,
                value,
            } => {
                let cached = store
                    .component(*component)
                    .ok_or_else(|| InspectorError::component_not_found(*component))?;
                cached.validate_write(path, value)?;

                let ack = api.set_component_property(*component, &path.to_string(), value)?;
                check_ack(&ack, self.component_leniency)?;
                Ok(AppliedWrite::ComponentProperty {
                    id: *component,
                    path: path.clone(),
                    value: value.clone(),
                })
            }
            WriteRequest::ComponentEnabled { component, enabled } => {
                let ack = api.set_component_enabled(*component, *enabled)?;
                check_ack(&ack, AckLeniency::Strict)?;
                Ok(AppliedWrite::ComponentEnabled {
                    id: *component,
                    enabled: *enabled,
                })
            }
        }
    }

    /// Apply an accepted write to the cache
    pub fn apply(store: &mut SnapshotStore, applied: &AppliedWrite) -> Result<()> {
        match applied {
            AppliedWrite::Entity { id, patch } => store.apply_local_patch(*id, patch),
            AppliedWrite::ComponentProperty { id, path, value } => {
                store.patch_component_property(*id, path, value.clone())
            }
            AppliedWrite::ComponentEnabled { id, enabled } => {
                store.set_component_enabled(*id, *enabled)
            }
        }
    }
}

fn check_ack(ack: &WriteAck, leniency: AckLeniency) -> Result<()> {
    if ack.accepted(leniency) {
        Ok(())
    } else {
        Err(InspectorError::RemoteRejected(ack.reason()))
    }
}
