//! Typed wrappers over [`AquaClient::send`](crate::AquaClient::send).
//!
//! Reads and writes are offline-safe unless a method says otherwise; every
//! response is decoded from the `data` envelope.

mod aquariums;
mod auth;
mod events;
mod inhabitants;
mod timeline;
mod water_parameters;

pub use aquariums::{Aquarium, AquariumDraft, AquariumUpdate, Aquariums, Dimensions};
pub use auth::{Auth, ProfileUpdate, Registration, UserProfile};
pub use events::{
    ComplexEvent, ComplexEventDraft, Event, EventDraft, EventFilters, EventStatus, EventType,
    EventUpdate, Events,
};
pub use inhabitants::{
    Inhabitant, InhabitantDraft, InhabitantKind, InhabitantUpdate, Inhabitants,
};
pub use timeline::{
    DatedMedia, GalleryDay, MediaItem, Timeline, TimelineEvent, TimelineFilters, TimelineMedia,
    TimelineStats,
};
pub use water_parameters::{
    ParameterPoint, WaterParameterDraft, WaterParameterUpdate, WaterParameters, WaterReading,
};

use aqua_api::{ApiError, RequestSpec};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::AquaClient;

async fn fetch<T>(client: &AquaClient, spec: RequestSpec) -> Result<T, ApiError>
where
    T: DeserializeOwned,
{
    client.send(spec, true).await?.decode_data()
}

async fn execute(client: &AquaClient, spec: RequestSpec) -> Result<(), ApiError> {
    client.send(spec, true).await.map(|_| ())
}

fn to_body<T>(value: &T) -> Result<Value, ApiError>
where
    T: Serialize + ?Sized,
{
    serde_json::to_value(value).map_err(ApiError::from)
}
