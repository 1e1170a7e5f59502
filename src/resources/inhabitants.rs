use aqua_api::{ApiError, RequestSpec};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::{fetch, to_body};
use crate::AquaClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InhabitantKind {
    Fish,
    Invertebrate,
    Plant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inhabitant {
    pub id: String,
    pub aquarium_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: InhabitantKind,
    pub species: String,
    pub quantity: u32,
    pub added_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub removed_at: Option<String>,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InhabitantDraft {
    pub aquarium_id: String,
    #[serde(rename = "type")]
    pub kind: InhabitantKind,
    pub species: String,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InhabitantUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aquarium_id: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<InhabitantKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub species: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Copy)]
pub struct Inhabitants<'a> {
    client: &'a AquaClient,
}

impl<'a> Inhabitants<'a> {
    pub(crate) fn new(client: &'a AquaClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, aquarium_id: &str) -> Result<Vec<Inhabitant>, ApiError> {
        fetch(
            self.client,
            RequestSpec::get(format!("/inhabitants/aquarium/{aquarium_id}")),
        )
        .await
    }

    pub async fn get(&self, id: &str) -> Result<Inhabitant, ApiError> {
        fetch(self.client, RequestSpec::get(format!("/inhabitants/{id}"))).await
    }

    pub async fn create(&self, draft: &InhabitantDraft) -> Result<Inhabitant, ApiError> {
        fetch(self.client, RequestSpec::post("/inhabitants", to_body(draft)?)).await
    }

    pub async fn update(&self, id: &str, update: &InhabitantUpdate) -> Result<Inhabitant, ApiError> {
        fetch(
            self.client,
            RequestSpec::put(format!("/inhabitants/{id}"), to_body(update)?),
        )
        .await
    }

    /// Soft delete; the server keeps the record with `isActive = false`.
    pub async fn deactivate(&self, id: &str, reason: Option<&str>) -> Result<Inhabitant, ApiError> {
        let spec = RequestSpec::delete(format!("/inhabitants/{id}"))
            .with_body(reason.map_or_else(|| json!({}), |reason| json!({ "reason": reason })));
        fetch(self.client, spec).await
    }

    /// Move all of the stock, or `quantity` of it, to another aquarium.
    pub async fn move_to(
        &self,
        id: &str,
        target_aquarium_id: &str,
        quantity: Option<u32>,
    ) -> Result<Inhabitant, ApiError> {
        let mut body = Map::new();
        body.insert("targetAquariumId".to_owned(), json!(target_aquarium_id));
        if let Some(quantity) = quantity {
            body.insert("quantity".to_owned(), json!(quantity));
        }
        let spec = RequestSpec::post(format!("/inhabitants/{id}/move"), Value::Object(body));
        fetch(self.client, spec).await
    }

    pub async fn mark_death(
        &self,
        id: &str,
        quantity: u32,
        reason: Option<&str>,
    ) -> Result<Inhabitant, ApiError> {
        let mut body = Map::new();
        body.insert("quantity".to_owned(), json!(quantity));
        if let Some(reason) = reason {
            body.insert("reason".to_owned(), json!(reason));
        }
        let spec = RequestSpec::post(format!("/inhabitants/{id}/death"), Value::Object(body));
        fetch(self.client, spec).await
    }

    pub async fn breed(
        &self,
        id: &str,
        new_quantity: u32,
        notes: Option<&str>,
    ) -> Result<Inhabitant, ApiError> {
        let mut body = Map::new();
        body.insert("newQuantity".to_owned(), json!(new_quantity));
        if let Some(notes) = notes {
            body.insert("notes".to_owned(), json!(notes));
        }
        let spec = RequestSpec::post(format!("/inhabitants/{id}/breed"), Value::Object(body));
        fetch(self.client, spec).await
    }
}
