//! Core data types for the live inspector
//!
//! This module contains the local projection of the engine's scene graph and
//! the wire payloads exchanged with the engine API.
//!
//! # Main Types
//!
//! - [`Entity`] - A remote scene object with a [`Transform`]
//! - [`Component`] - A behaviour/data block attached to one entity
//! - [`PropertyValue`] - A component property value (number, bool, string, nested axes)
//! - [`FieldKey`] - Stable identity of one editable field, used to key debounce timers
//!
//! # Wire format
//!
//! The engine speaks camelCase JSON. Entities in the `/actors` listing may omit
//! the transform, in which case it defaults to identity.

use crate::error::{InspectorError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Engine-assigned entity id
pub type EntityId = u64;

/// Engine-assigned component id
pub type ComponentId = u64;

/// A 3-axis vector as sent by the engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };
    pub const ONE: Vec3 = Vec3 {
        x: 1.0,
        y: 1.0,
        z: 1.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Read one axis
    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Mutable access to one axis
    pub fn axis_mut(&mut self, axis: Axis) -> &mut f64 {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
            Axis::Z => &mut self.z,
        }
    }
}

/// One component of a vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn all() -> &'static [Axis] {
        &[Axis::X, Axis::Y, Axis::Z]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

impl std::str::FromStr for Axis {
    type Err = InspectorError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "x" | "X" => Ok(Axis::X),
            "y" | "Y" => Ok(Axis::Y),
            "z" | "Z" => Ok(Axis::Z),
            other => Err(InspectorError::InvalidField(format!("unknown axis '{}'", other))),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which vector of a transform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformPart {
    Position,
    /// Euler angles in degrees
    Rotation,
    Scale,
}

impl TransformPart {
    pub fn all() -> &'static [TransformPart] {
        &[
            TransformPart::Position,
            TransformPart::Rotation,
            TransformPart::Scale,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransformPart::Position => "position",
            TransformPart::Rotation => "rotation",
            TransformPart::Scale => "scale",
        }
    }
}

impl std::str::FromStr for TransformPart {
    type Err = InspectorError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "position" => Ok(TransformPart::Position),
            "rotation" => Ok(TransformPart::Rotation),
            "scale" => Ok(TransformPart::Scale),
            other => Err(InspectorError::InvalidField(format!(
                "unknown transform part '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for TransformPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position, rotation (degrees) and scale of an entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn part(&self, part: TransformPart) -> &Vec3 {
        match part {
            TransformPart::Position => &self.position,
            TransformPart::Rotation => &self.rotation,
            TransformPart::Scale => &self.scale,
        }
    }

    pub fn part_mut(&mut self, part: TransformPart) -> &mut Vec3 {
        match part {
            TransformPart::Position => &mut self.position,
            TransformPart::Rotation => &mut self.rotation,
            TransformPart::Scale => &mut self.scale,
        }
    }

    /// Read a single axis of one part
    pub fn get(&self, part: TransformPart, axis: Axis) -> f64 {
        self.part(part).get(axis)
    }

    /// Set a single axis of one part, leaving everything else untouched
    pub fn set(&mut self, part: TransformPart, axis: Axis, value: f64) {
        *self.part_mut(part).axis_mut(axis) = value;
    }
}

/// A remote scene object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub transform: Transform,
}

impl Entity {
    pub fn new(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            tag: String::new(),
            transform: Transform::default(),
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Read a string field by its wire name
    pub fn field(&self, field: EntityField) -> &str {
        match field {
            EntityField::Name => &self.name,
            EntityField::Tag => &self.tag,
        }
    }

    /// Overwrite a string field by its wire name
    pub fn set_field(&mut self, field: EntityField, value: impl Into<String>) {
        match field {
            EntityField::Name => self.name = value.into(),
            EntityField::Tag => self.tag = value.into(),
        }
    }

    /// Case-insensitive search over name and tag; `query` must already be lowercase
    pub fn matches(&self, query: &str) -> bool {
        query.is_empty()
            || self.name.to_lowercase().contains(query)
            || self.tag.to_lowercase().contains(query)
    }

    /// Coarse classification derived from the tag
    pub fn class(&self) -> EntityClass {
        let tag = self.tag.to_lowercase();
        if tag.contains("camera") {
            EntityClass::Camera
        } else if tag.contains("light") {
            EntityClass::Light
        } else {
            EntityClass::Other
        }
    }
}

/// Classification used by UI glue to pick an icon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityClass {
    Camera,
    Light,
    Other,
}

/// Editable string fields of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityField {
    Name,
    Tag,
}

impl EntityField {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityField::Name => "name",
            EntityField::Tag => "tag",
        }
    }
}

impl std::str::FromStr for EntityField {
    type Err = InspectorError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "name" => Ok(EntityField::Name),
            "tag" => Ok(EntityField::Tag),
            other => Err(InspectorError::InvalidField(format!(
                "entity has no editable property '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for EntityField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of a component property
///
/// Nested maps hold sub-axis numbers, e.g. a color `{r, g, b, a}` or a
/// vector `{x, y, z}`. Anything the engine sends that fits none of the
/// editable shapes is kept verbatim and is read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Number(f64),
    Text(String),
    Nested(BTreeMap<String, f64>),
    Unsupported(serde_json::Value),
}

impl PropertyValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_editable(&self) -> bool {
        !matches!(self, PropertyValue::Unsupported(_))
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Bool(b) => write!(f, "{}", b),
            PropertyValue::Number(n) => write!(f, "{}", n),
            PropertyValue::Text(s) => write!(f, "{}", s),
            PropertyValue::Nested(map) => {
                let parts: Vec<String> = map.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
            PropertyValue::Unsupported(v) => write!(f, "{}", v),
        }
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        PropertyValue::Number(v)
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        PropertyValue::Bool(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        PropertyValue::Text(v.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        PropertyValue::Text(v)
    }
}

/// A flat `key` or a two-level `key.subkey` path into a component's properties
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyPath {
    pub key: String,
    pub sub: Option<String>,
}

impl PropertyPath {
    pub fn flat(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            sub: None,
        }
    }

    pub fn nested(key: impl Into<String>, sub: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            sub: Some(sub.into()),
        }
    }

    pub fn parse(path: &str) -> Result<Self> {
        let mut parts = path.split('.');
        let key = parts.next().unwrap_or_default();
        let sub = parts.next();
        if key.is_empty() || sub.is_some_and(str::is_empty) || parts.next().is_some() {
            return Err(InspectorError::InvalidField(format!(
                "property path '{}' must be 'key' or 'key.subkey'",
                path
            )));
        }
        Ok(Self {
            key: key.to_string(),
            sub: sub.map(str::to_string),
        })
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sub {
            Some(sub) => write!(f, "{}.{}", self.key, sub),
            None => f.write_str(&self.key),
        }
    }
}

impl Serialize for PropertyPath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A behaviour/data block attached to one entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub id: ComponentId,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,
}

fn default_true() -> bool {
    true
}

impl Component {
    pub fn new(id: ComponentId, kind: impl Into<String>) -> Self {
        Self {
            id,
            kind: kind.into(),
            enabled: true,
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_nested(mut self, key: impl Into<String>, values: &[(&str, f64)]) -> Self {
        let map = values.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        self.properties.insert(key.into(), PropertyValue::Nested(map));
        self
    }

    /// Look up the value at a path
    pub fn property(&self, path: &PropertyPath) -> Option<PropertyValue> {
        let value = self.properties.get(&path.key)?;
        match (&path.sub, value) {
            (None, v) => Some(v.clone()),
            (Some(sub), PropertyValue::Nested(map)) => map.get(sub).copied().map(PropertyValue::Number),
            (Some(_), _) => None,
        }
    }

    /// Check that `value` can be stored at `path` without clobbering a
    /// differently shaped property
    pub fn validate_write(&self, path: &PropertyPath, value: &PropertyValue) -> Result<()> {
        if !value.is_editable() || matches!(value, PropertyValue::Nested(_)) {
            return Err(InspectorError::InvalidField(format!(
                "'{}' cannot be written as {}",
                path, value
            )));
        }
        if path.sub.is_some() {
            if value.as_f64().is_none() {
                return Err(InspectorError::InvalidField(format!(
                    "'{}' expects a number",
                    path
                )));
            }
            if let Some(existing) = self.properties.get(&path.key) {
                if !matches!(existing, PropertyValue::Nested(_)) {
                    return Err(InspectorError::InvalidField(format!(
                        "'{}' is not a nested property",
                        path.key
                    )));
                }
            }
        }
        Ok(())
    }

    /// Store `value` at `path`, creating the nested map when absent
    pub fn set_property(&mut self, path: &PropertyPath, value: PropertyValue) -> Result<()> {
        self.validate_write(path, &value)?;
        match &path.sub {
            None => {
                self.properties.insert(path.key.clone(), value);
            }
            Some(sub) => {
                let number = value.as_f64().unwrap_or_default();
                let entry = self
                    .properties
                    .entry(path.key.clone())
                    .or_insert_with(|| PropertyValue::Nested(BTreeMap::new()));
                if let PropertyValue::Nested(map) = entry {
                    map.insert(sub.clone(), number);
                }
            }
        }
        Ok(())
    }
}

/// Stable identity of one editable field
///
/// Two edits with the same key supersede each other; edits with different
/// keys are independent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldKey {
    EntityProperty {
        entity: EntityId,
        field: EntityField,
    },
    TransformAxis {
        entity: EntityId,
        part: TransformPart,
        axis: Axis,
    },
    ComponentProperty {
        component: ComponentId,
        path: PropertyPath,
    },
}

impl FieldKey {
    /// The entity whose cached snapshot row this field lives in, if any
    pub fn entity(&self) -> Option<EntityId> {
        match self {
            FieldKey::EntityProperty { entity, .. } | FieldKey::TransformAxis { entity, .. } => {
                Some(*entity)
            }
            FieldKey::ComponentProperty { .. } => None,
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKey::EntityProperty { entity, field } => write!(f, "actor_{}_{}", entity, field),
            FieldKey::TransformAxis { entity, part, axis } => {
                write!(f, "transform_{}_{}_{}", entity, part, axis)
            }
            FieldKey::ComponentProperty { component, path } => {
                write!(f, "component_{}_{}", component, path)
            }
        }
    }
}

/// Counters from `GET /stats`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineStats {
    #[serde(default)]
    pub actor_count: u64,
    #[serde(default)]
    pub component_count: u64,
}

/// Response of `GET /engine/status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EngineStatus {
    #[serde(default)]
    pub paused: bool,
}

/// Generic acknowledgement returned by write endpoints
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WriteAck {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WriteAck {
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }

    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Default::default()
        }
    }

    /// Whether the engine accepted the write under the given leniency
    pub fn accepted(&self, leniency: AckLeniency) -> bool {
        match leniency {
            AckLeniency::Strict => self.success && self.error.is_none(),
            AckLeniency::SuccessOrMessage => self.success || self.message.is_some(),
        }
    }

    /// Human readable reason for a refusal
    pub fn reason(&self) -> String {
        self.error
            .clone()
            .or_else(|| self.message.clone())
            .unwrap_or_else(|| "engine reported failure".to_string())
    }
}

/// How permissive to be when deciding whether a write was accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AckLeniency {
    /// Only `success: true` without an `error` counts
    Strict,
    /// `success: true` or any `message` counts
    #[default]
    SuccessOrMessage,
}

/// Connection status to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connected,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::Disconnected => write!(f, "Disconnected"),
            ConnectionStatus::Connected => write!(f, "Connected"),
        }
    }
}

/// Convert a camelCase property name to Title Case for flat property lists
pub fn humanize_property_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if i == 0 {
            out.extend(c.to_uppercase());
        } else if c.is_uppercase() {
            out.push(' ');
            out.push(c);
        } else {
            out.push(c);
        }
    }
    out.trim().to_string()
}
