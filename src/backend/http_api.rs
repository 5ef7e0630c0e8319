//! HTTP gateway to the engine's JSON API
//!
//! Blocking `reqwest` client; every call runs on the session worker thread,
//! so a slow engine only stalls the worker, never the UI.

use super::api_trait::{ApiStats, EngineApi};
use crate::config::ConnectionConfig;
use crate::error::{InspectorError, Result};
use crate::types::{
    Component, ComponentId, Entity, EntityId, EngineStats, EngineStatus, PropertyValue,
    Transform, WriteAck,
};
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Instant;

#[derive(Deserialize)]
struct ActorList {
    #[serde(default)]
    actors: Vec<Entity>,
}

#[derive(Deserialize)]
struct ComponentList {
    #[serde(default)]
    components: Vec<Component>,
}

#[derive(Serialize)]
struct PropertyBody<'a, V: Serialize> {
    property: &'a str,
    value: V,
}

#[derive(Serialize)]
struct EnabledBody {
    enabled: bool,
}

/// Engine API client over HTTP
pub struct HttpEngineApi {
    client: Client,
    base_url: String,
    stats: ApiStats,
}

impl HttpEngineApi {
    /// Create a client for the configured base URL
    pub fn new(config: &ConnectionConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| InspectorError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            stats: ApiStats::default(),
        })
    }

    /// The base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and time it
    fn send(&mut self, request: RequestBuilder) -> Result<Response> {
        let started = Instant::now();
        match request.send() {
            Ok(resp) => {
                self.stats
                    .record_success(started.elapsed().as_micros() as u64);
                Ok(resp)
            }
            Err(e) => {
                self.stats.record_failure();
                Err(e.into())
            }
        }
    }

    /// GET a path and decode the body, treating non-2xx as a network failure
    fn get_json<T: DeserializeOwned>(&mut self, path: &str) -> Result<T> {
        let request = self.client.get(self.url(path)).header("Cache-Control", "no-cache");
        let resp = self.send(request)?.error_for_status()?;
        Ok(resp.json()?)
    }

    /// POST a JSON body and decode the acknowledgement
    ///
    /// Write endpoints may answer non-2xx with an `{error}` body; that body is
    /// still returned so the caller can surface the engine's reason.
    fn post_ack<B: Serialize + ?Sized>(&mut self, path: &str, body: &B) -> Result<WriteAck> {
        let request = self.client.post(self.url(path)).json(body);
        let resp = self.send(request)?;
        let status = resp.status();
        match resp.json::<WriteAck>() {
            Ok(ack) => Ok(ack),
            Err(_) if !status.is_success() => Err(InspectorError::Network(format!(
                "{} returned HTTP {}",
                path, status
            ))),
            Err(e) => Err(e.into()),
        }
    }

    fn post_empty(&mut self, path: &str) -> Result<()> {
        let request = self.client.post(self.url(path));
        self.send(request)?.error_for_status()?;
        Ok(())
    }
}

impl EngineApi for HttpEngineApi {
    fn stats(&mut self) -> Result<EngineStats> {
        self.get_json("/stats")
    }

    fn list_entities(&mut self) -> Result<Vec<Entity>> {
        let list: ActorList = self.get_json("/actors")?;
        Ok(list.actors)
    }

    fn get_entity(&mut self, id: EntityId) -> Result<Entity> {
        self.get_json(&format!("/actors/{}", id))
    }

    fn notify_selection(&mut self, id: EntityId) -> Result<()> {
        let request = self.client.get(self.url(&format!("/editor/select/{}", id)));
        self.send(request)?.error_for_status()?;
        Ok(())
    }

    fn set_entity_property(
        &mut self,
        id: EntityId,
        property: &str,
        value: &str,
    ) -> Result<WriteAck> {
        self.post_ack(
            &format!("/actors/{}/property", id),
            &PropertyBody { property, value },
        )
    }

    fn set_transform(&mut self, id: EntityId, transform: &Transform) -> Result<WriteAck> {
        self.post_ack(&format!("/actors/{}/transform", id), transform)
    }

    fn list_components(&mut self, id: EntityId) -> Result<Vec<Component>> {
        let list: ComponentList = self.get_json(&format!("/actors/{}/components", id))?;
        Ok(list.components)
    }

    fn set_component_property(
        &mut self,
        id: ComponentId,
        property: &str,
        value: &PropertyValue,
    ) -> Result<WriteAck> {
        self.post_ack(
            &format!("/components/{}/property", id),
            &PropertyBody { property, value },
        )
    }

    fn set_component_enabled(&mut self, id: ComponentId, enabled: bool) -> Result<WriteAck> {
        self.post_ack(
            &format!("/components/{}/enabled", id),
            &EnabledBody { enabled },
        )
    }

    fn engine_status(&mut self) -> Result<EngineStatus> {
        self.get_json("/engine/status")
    }

    fn pause(&mut self) -> Result<()> {
        self.post_empty("/engine/pause")
    }

    fn resume(&mut self) -> Result<()> {
        self.post_empty("/engine/resume")
    }

    fn scene_document(&mut self) -> Result<serde_json::Value> {
        self.get_json("/scene")
    }

    fn stats_snapshot(&self) -> ApiStats {
        self.stats.clone()
    }
}
