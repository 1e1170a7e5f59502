use std::collections::BTreeMap;

use aqua_api::{ApiError, RequestSpec};
use serde::{Deserialize, Serialize};

use super::{execute, fetch, to_body};
use crate::AquaClient;

/// One water test. Every measurement is optional; testers rarely log all of
/// them at once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterReading {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub aquarium_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(rename = "pH", default, skip_serializing_if = "Option::is_none")]
    pub ph: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ammonia: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nitrite: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nitrate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phosphate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kh: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gh: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oxygen_level: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub co2_level: Option<f64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub additional_parameters: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterParameterDraft {
    pub aquarium_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(flatten)]
    pub values: WaterParameterUpdate,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterParameterUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(rename = "pH", skip_serializing_if = "Option::is_none")]
    pub ph: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ammonia: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nitrite: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nitrate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phosphate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kh: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gh: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tds: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oxygen_level: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub co2_level: Option<f64>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub additional_parameters: BTreeMap<String, f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterPoint {
    pub date: String,
    pub value: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct WaterParameters<'a> {
    client: &'a AquaClient,
}

impl<'a> WaterParameters<'a> {
    pub(crate) fn new(client: &'a AquaClient) -> Self {
        Self { client }
    }

    pub async fn latest(&self, aquarium_id: &str) -> Result<WaterReading, ApiError> {
        fetch(
            self.client,
            RequestSpec::get(format!("/water-parameters/aquarium/{aquarium_id}/latest")),
        )
        .await
    }

    /// Daily series of one parameter (e.g. `nitrate`) over the last `days`.
    pub async fn history(
        &self,
        aquarium_id: &str,
        parameter: &str,
        days: u32,
    ) -> Result<Vec<ParameterPoint>, ApiError> {
        let spec = RequestSpec::get(format!(
            "/water-parameters/aquarium/{aquarium_id}/history/{parameter}"
        ))
        .with_query("days", days);
        fetch(self.client, spec).await
    }

    pub async fn list(&self, aquarium_id: &str, limit: u32) -> Result<Vec<WaterReading>, ApiError> {
        let spec = RequestSpec::get(format!("/water-parameters/aquarium/{aquarium_id}"))
            .with_query("limit", limit);
        fetch(self.client, spec).await
    }

    pub async fn create(&self, draft: &WaterParameterDraft) -> Result<WaterReading, ApiError> {
        fetch(self.client, RequestSpec::post("/water-parameters", to_body(draft)?)).await
    }

    pub async fn update(
        &self,
        id: &str,
        update: &WaterParameterUpdate,
    ) -> Result<WaterReading, ApiError> {
        fetch(
            self.client,
            RequestSpec::put(format!("/water-parameters/{id}"), to_body(update)?),
        )
        .await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        execute(self.client, RequestSpec::delete(format!("/water-parameters/{id}"))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn draft_flattens_measurements_with_server_names() {
        let draft = WaterParameterDraft {
            aquarium_id: "a1".to_owned(),
            timestamp: None,
            values: WaterParameterUpdate {
                ph: Some(7.2),
                co2_level: Some(20.0),
                ..WaterParameterUpdate::default()
            },
        };

        assert_eq!(
            serde_json::to_value(&draft).expect("serialize"),
            json!({"aquariumId": "a1", "pH": 7.2, "co2Level": 20.0})
        );
    }

    #[test]
    fn reading_decodes_sparse_payload() {
        let reading: WaterReading = serde_json::from_value(json!({
            "aquariumId": "a1",
            "timestamp": "2024-03-01T10:00:00Z",
            "nitrate": 10.5,
            "additionalParameters": {"iron": 0.1}
        }))
        .expect("deserialize");

        assert_eq!(reading.nitrate, Some(10.5));
        assert_eq!(reading.ph, None);
        assert_eq!(reading.additional_parameters.get("iron"), Some(&0.1));
    }
}
