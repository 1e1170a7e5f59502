use std::collections::BTreeMap;

use aqua_api::{ApiError, RequestSpec};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::fetch;
use crate::AquaClient;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineMedia {
    pub id: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// Event as rendered on the timeline, with attached media inlined.
///
/// `type` and `status` stay strings: the timeline also carries event kinds
/// the event API does not enumerate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    pub id: String,
    pub aquarium_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub timestamp: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub media: Vec<TimelineMedia>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water_parameters: Option<BTreeMap<String, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineStats {
    pub total_events: u64,
    #[serde(default)]
    pub events_by_type: BTreeMap<String, u64>,
    pub media_count: u64,
    pub period_days: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryDay {
    pub date: String,
    #[serde(default)]
    pub media: Vec<MediaItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatedMedia {
    pub id: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    pub timestamp: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimelineFilters {
    pub types: Vec<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<u32>,
    pub skip: Option<u32>,
}

impl TimelineFilters {
    pub fn apply(&self, spec: RequestSpec) -> RequestSpec {
        let spec = self
            .types
            .iter()
            .fold(spec, |spec, kind| spec.with_query("types", kind));
        spec.with_optional_query("startDate", self.start_date.as_deref())
            .with_optional_query("endDate", self.end_date.as_deref())
            .with_optional_query("limit", self.limit.filter(|limit| *limit > 0))
            .with_optional_query("skip", self.skip.filter(|skip| *skip > 0))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Timeline<'a> {
    client: &'a AquaClient,
}

impl<'a> Timeline<'a> {
    pub(crate) fn new(client: &'a AquaClient) -> Self {
        Self { client }
    }

    pub async fn list(
        &self,
        aquarium_id: &str,
        filters: &TimelineFilters,
    ) -> Result<Vec<TimelineEvent>, ApiError> {
        let spec = filters.apply(RequestSpec::get(format!("/timeline/aquarium/{aquarium_id}")));
        fetch(self.client, spec).await
    }

    pub async fn stats(&self, aquarium_id: &str, days: u32) -> Result<TimelineStats, ApiError> {
        let spec = RequestSpec::get(format!("/timeline/aquarium/{aquarium_id}/stats"))
            .with_query("days", days);
        fetch(self.client, spec).await
    }

    pub async fn gallery(
        &self,
        aquarium_id: &str,
        limit: u32,
        skip: u32,
    ) -> Result<Vec<GalleryDay>, ApiError> {
        let spec = RequestSpec::get(format!("/timeline/aquarium/{aquarium_id}/gallery"))
            .with_query("limit", limit)
            .with_query("skip", skip);
        fetch(self.client, spec).await
    }

    /// Media of a single day; `date` is `YYYY-MM-DD`.
    pub async fn gallery_by_date(
        &self,
        aquarium_id: &str,
        date: &str,
    ) -> Result<Vec<DatedMedia>, ApiError> {
        fetch(
            self.client,
            RequestSpec::get(format!("/timeline/aquarium/{aquarium_id}/gallery/date/{date}")),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_repeat_types_and_skip_zero_paging() {
        let filters = TimelineFilters {
            types: vec!["feeding".to_owned(), "media.added".to_owned()],
            end_date: Some("2024-02-01".to_owned()),
            limit: Some(0),
            skip: Some(40),
            ..TimelineFilters::default()
        };

        let spec = filters.apply(RequestSpec::get("/timeline/aquarium/a1"));

        assert_eq!(
            spec.query,
            vec![
                ("types".to_owned(), "feeding".to_owned()),
                ("types".to_owned(), "media.added".to_owned()),
                ("endDate".to_owned(), "2024-02-01".to_owned()),
                ("skip".to_owned(), "40".to_owned()),
            ]
        );
    }
}
