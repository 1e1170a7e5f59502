use aqua_api::{ApiError, RequestSpec};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{execute, fetch, to_body};
use crate::AquaClient;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Aquarium {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub volume: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
    pub start_date: String,
    pub is_active: bool,
    pub is_public: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AquariumDraft {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub volume: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl AquariumDraft {
    pub fn new(name: impl Into<String>, kind: impl Into<String>, volume: f64) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            volume,
            dimensions: None,
            start_date: None,
            is_active: None,
            is_public: None,
            metadata: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AquariumUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Copy)]
pub struct Aquariums<'a> {
    client: &'a AquaClient,
}

impl<'a> Aquariums<'a> {
    pub(crate) fn new(client: &'a AquaClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Aquarium>, ApiError> {
        fetch(self.client, RequestSpec::get("/aquariums")).await
    }

    pub async fn get(&self, id: &str) -> Result<Aquarium, ApiError> {
        fetch(self.client, RequestSpec::get(format!("/aquariums/{id}"))).await
    }

    pub async fn create(&self, draft: &AquariumDraft) -> Result<Aquarium, ApiError> {
        fetch(self.client, RequestSpec::post("/aquariums", to_body(draft)?)).await
    }

    pub async fn update(&self, id: &str, update: &AquariumUpdate) -> Result<Aquarium, ApiError> {
        fetch(
            self.client,
            RequestSpec::put(format!("/aquariums/{id}"), to_body(update)?),
        )
        .await
    }

    pub async fn deactivate(&self, id: &str) -> Result<(), ApiError> {
        execute(self.client, RequestSpec::delete(format!("/aquariums/{id}"))).await
    }

    /// Shared aquariums of other keepers. Not deferred when offline.
    pub async fn public(&self, limit: u32, skip: u32) -> Result<Vec<Aquarium>, ApiError> {
        let spec = RequestSpec::get("/aquariums/public")
            .with_query("limit", limit)
            .with_query("skip", skip);
        self.client.send(spec, false).await?.decode_data()
    }
}
