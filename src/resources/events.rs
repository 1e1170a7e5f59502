use std::fmt;

use aqua_api::{ApiError, RequestSpec};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::{execute, fetch, to_body};
use crate::AquaClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "water.parameters")]
    WaterParameters,
    #[serde(rename = "water.change")]
    WaterChange,
    #[serde(rename = "feeding")]
    Feeding,
    #[serde(rename = "equipment.maintenance")]
    EquipmentMaintenance,
    #[serde(rename = "inhabitant.added")]
    InhabitantAdded,
    #[serde(rename = "inhabitant.removed")]
    InhabitantRemoved,
    #[serde(rename = "plant.trimmed")]
    PlantTrimmed,
    #[serde(rename = "observation")]
    Observation,
    #[serde(rename = "issue.detected")]
    IssueDetected,
    #[serde(rename = "issue.resolved")]
    IssueResolved,
    #[serde(rename = "complex.maintenance")]
    ComplexMaintenance,
    #[serde(rename = "media.added")]
    MediaAdded,
    #[serde(rename = "custom")]
    Custom,
}

impl EventType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WaterParameters => "water.parameters",
            Self::WaterChange => "water.change",
            Self::Feeding => "feeding",
            Self::EquipmentMaintenance => "equipment.maintenance",
            Self::InhabitantAdded => "inhabitant.added",
            Self::InhabitantRemoved => "inhabitant.removed",
            Self::PlantTrimmed => "plant.trimmed",
            Self::Observation => "observation",
            Self::IssueDetected => "issue.detected",
            Self::IssueResolved => "issue.resolved",
            Self::ComplexMaintenance => "complex.maintenance",
            Self::MediaAdded => "media.added",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl EventStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub aquarium_id: String,
    #[serde(rename = "type")]
    pub kind: EventType,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub timestamp: String,
    pub status: EventStatus,
    #[serde(default)]
    pub is_planned: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned_for: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub media_urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub linked_events: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_event_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub aquarium_id: String,
    #[serde(rename = "type")]
    pub kind: EventType,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EventStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_planned: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planned_for: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub media_urls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub linked_events: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_event_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u32>,
}

impl EventDraft {
    pub fn new(aquarium_id: impl Into<String>, kind: EventType, title: impl Into<String>) -> Self {
        Self {
            aquarium_id: aquarium_id.into(),
            kind,
            title: title.into(),
            description: None,
            timestamp: None,
            status: None,
            is_planned: None,
            planned_for: None,
            media_urls: Vec::new(),
            parameters: None,
            linked_events: Vec::new(),
            parent_event_id: None,
            correlation_id: None,
            sequence: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EventStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planned_for: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_urls: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_events: Option<Vec<String>>,
}

/// A parent event created together with its ordered children.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexEventDraft {
    pub parent_event: EventDraft,
    pub child_events: Vec<EventDraft>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexEvent {
    pub parent: Event,
    #[serde(default)]
    pub children: Vec<Event>,
}

/// Query filters for [`Events::list`]. Empty filters add no parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilters {
    pub types: Vec<EventType>,
    pub statuses: Vec<EventStatus>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub planned: Option<bool>,
    pub limit: Option<u32>,
    pub skip: Option<u32>,
}

impl EventFilters {
    pub fn apply(&self, spec: RequestSpec) -> RequestSpec {
        let spec = self
            .types
            .iter()
            .fold(spec, |spec, kind| spec.with_query("type", kind.as_str()));
        let spec = self
            .statuses
            .iter()
            .fold(spec, |spec, status| spec.with_query("status", status.as_str()));
        spec.with_optional_query("startDate", self.start_date.as_deref())
            .with_optional_query("endDate", self.end_date.as_deref())
            .with_optional_query("planned", self.planned)
            .with_optional_query("limit", self.limit.filter(|limit| *limit > 0))
            .with_optional_query("skip", self.skip.filter(|skip| *skip > 0))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Events<'a> {
    client: &'a AquaClient,
}

impl<'a> Events<'a> {
    pub(crate) fn new(client: &'a AquaClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, aquarium_id: &str, filters: &EventFilters) -> Result<Vec<Event>, ApiError> {
        let spec = filters.apply(RequestSpec::get(format!("/events/aquarium/{aquarium_id}")));
        fetch(self.client, spec).await
    }

    pub async fn recent(&self, aquarium_id: &str, limit: u32) -> Result<Vec<Event>, ApiError> {
        let spec = RequestSpec::get(format!("/events/aquarium/{aquarium_id}")).with_query("limit", limit);
        fetch(self.client, spec).await
    }

    pub async fn get(&self, id: &str) -> Result<Event, ApiError> {
        fetch(self.client, RequestSpec::get(format!("/events/{id}"))).await
    }

    pub async fn create(&self, draft: &EventDraft) -> Result<Event, ApiError> {
        fetch(self.client, RequestSpec::post("/events", to_body(draft)?)).await
    }

    pub async fn create_complex(&self, draft: &ComplexEventDraft) -> Result<Vec<Event>, ApiError> {
        fetch(self.client, RequestSpec::post("/events/complex", to_body(draft)?)).await
    }

    pub async fn update(&self, id: &str, update: &EventUpdate) -> Result<Event, ApiError> {
        fetch(self.client, RequestSpec::put(format!("/events/{id}"), to_body(update)?)).await
    }

    pub async fn update_status(&self, id: &str, status: EventStatus) -> Result<Event, ApiError> {
        let spec = RequestSpec::put(format!("/events/{id}/status"), json!({ "status": status }));
        fetch(self.client, spec).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        execute(self.client, RequestSpec::delete(format!("/events/{id}"))).await
    }

    pub async fn get_complex(&self, id: &str) -> Result<ComplexEvent, ApiError> {
        fetch(self.client, RequestSpec::get(format!("/events/{id}/complex"))).await
    }
}
