//! Test data builders for creating test objects

use live_inspector::types::{Component, Entity, PropertyValue, Transform, Vec3};

/// Builder for creating test Entities
pub struct EntityBuilder {
    id: u64,
    name: String,
    tag: String,
    transform: Transform,
}

impl EntityBuilder {
    pub fn new(id: u64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            tag: "Untagged".to_string(),
            transform: Transform::default(),
        }
    }

    pub fn tag(mut self, tag: &str) -> Self {
        self.tag = tag.to_string();
        self
    }

    pub fn position(mut self, x: f64, y: f64, z: f64) -> Self {
        self.transform.position = Vec3::new(x, y, z);
        self
    }

    pub fn rotation(mut self, x: f64, y: f64, z: f64) -> Self {
        self.transform.rotation = Vec3::new(x, y, z);
        self
    }

    pub fn scale(mut self, x: f64, y: f64, z: f64) -> Self {
        self.transform.scale = Vec3::new(x, y, z);
        self
    }

    pub fn build(self) -> Entity {
        Entity::new(self.id, self.name)
            .with_tag(self.tag)
            .with_transform(self.transform)
    }
}

/// Builder for creating test Components
pub struct ComponentBuilder {
    component: Component,
}

impl ComponentBuilder {
    pub fn new(id: u64, kind: &str) -> Self {
        Self {
            component: Component::new(id, kind),
        }
    }

    pub fn property(mut self, key: &str, value: impl Into<PropertyValue>) -> Self {
        self.component = self.component.with_property(key, value);
        self
    }

    pub fn color(mut self, r: f64, g: f64, b: f64) -> Self {
        self.component = self
            .component
            .with_nested("color", &[("r", r), ("g", g), ("b", b)]);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.component.enabled = false;
        self
    }

    pub fn build(self) -> Component {
        self.component
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_builder() {
        let entity = EntityBuilder::new(4, "Lamp")
            .tag("PointLight")
            .position(1.0, 2.0, 3.0)
            .build();

        assert_eq!(entity.name, "Lamp");
        assert_eq!(entity.tag, "PointLight");
        assert_eq!(entity.transform.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(entity.transform.scale, Vec3::ONE);
    }
}
