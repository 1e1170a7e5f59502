mod support;

use aqua_store::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY};
use aquadiary::resources::{
    EventDraft, EventFilters, EventStatus, EventType, Registration, TimelineFilters,
};
use aquadiary::{ApiError, KeyValueStore};
use serde_json::json;

use support::{credentials, harness, within, ScriptedServer};

#[tokio::test]
async fn aquarium_list_decodes_the_data_envelope() {
    let server = ScriptedServer::new(vec![(
        200,
        json!({"data": [{
            "id": "a1",
            "name": "Reef",
            "type": "marine",
            "volume": 120.0,
            "startDate": "2024-01-10",
            "isActive": true,
            "isPublic": false
        }]}),
    )])
    .await;
    let h = harness(&server.base_url, true);
    h.client
        .session()
        .establish(&credentials("valid-token", "refresh-1"))
        .expect("establish");

    let aquariums = within(h.client.aquariums().list()).await.expect("list");

    assert_eq!(aquariums.len(), 1);
    assert_eq!(aquariums[0].name, "Reef");
    assert_eq!(aquariums[0].kind, "marine");
    let requests = server.requests();
    assert_eq!(requests[0].path, "/api/aquariums");
    assert_eq!(requests[0].header("authorization"), Some("Bearer valid-token"));
}

#[tokio::test]
async fn expired_token_refreshes_once_for_profile() {
    let server = ScriptedServer::new(vec![
        (401, json!({"message": "jwt expired"})),
        (200, json!({"data": {"accessToken": "fresh-token"}})),
        (
            200,
            json!({"data": {"id": "u-1", "email": "keeper@example.com", "settings": {"units": "metric"}}}),
        ),
    ])
    .await;
    let h = harness(&server.base_url, true);
    h.client
        .session()
        .establish(&credentials("stale-token", "refresh-1"))
        .expect("establish");

    let profile = within(h.client.auth().profile()).await.expect("profile");

    assert_eq!(profile.id, "u-1");
    assert_eq!(
        profile.settings.as_ref().and_then(|settings| settings.get("units")),
        Some(&json!("metric"))
    );
    assert_eq!(
        server.paths(),
        vec![
            "GET /api/users/profile",
            "POST /api/auth/refresh",
            "GET /api/users/profile",
        ]
    );
    assert_eq!(
        server.requests()[2].header("authorization"),
        Some("Bearer fresh-token")
    );
}

#[tokio::test]
async fn login_establishes_and_persists_the_session() {
    let server = ScriptedServer::new(vec![(
        200,
        json!({
            "accessToken": "access-1",
            "refreshToken": "refresh-1",
            "user": {"id": "u-9", "email": "keeper@example.com", "firstName": "Ada"}
        }),
    )])
    .await;
    let h = harness(&server.base_url, true);

    let credentials = within(h.client.auth().login("keeper@example.com", "hunter2"))
        .await
        .expect("login");

    assert_eq!(credentials.user.id, "u-9");
    assert!(h.client.session().is_authenticated());
    assert_eq!(h.store.get(ACCESS_TOKEN_KEY).expect("get").as_deref(), Some("access-1"));
    assert_eq!(h.store.get(REFRESH_TOKEN_KEY).expect("get").as_deref(), Some("refresh-1"));
    let requests = server.requests();
    assert_eq!(requests[0].path, "/api/auth/login");
    assert_eq!(
        requests[0].json_body(),
        json!({"email": "keeper@example.com", "password": "hunter2"})
    );
}

#[tokio::test]
async fn rejected_login_does_not_attempt_refresh() {
    let server = ScriptedServer::new(vec![(401, json!({"message": "Invalid credentials"}))]).await;
    let h = harness(&server.base_url, true);
    h.client
        .session()
        .establish(&credentials("old-token", "refresh-1"))
        .expect("establish");

    let error = within(h.client.auth().login("keeper@example.com", "wrong"))
        .await
        .expect_err("login must fail");

    assert!(error.is_unauthorized());
    assert_eq!(error.to_string(), "Invalid credentials");
    assert_eq!(server.request_count(), 1);
}

#[tokio::test]
async fn register_is_never_deferred() {
    let server = ScriptedServer::new(Vec::new()).await;
    let h = harness(&server.base_url, false);
    let registration = Registration {
        email: "keeper@example.com".to_owned(),
        password: "hunter2".to_owned(),
        first_name: None,
        last_name: None,
    };

    let error = within(h.client.auth().register(&registration))
        .await
        .expect_err("offline registration must fail");

    assert!(matches!(error, ApiError::NetworkUnavailable));
    assert!(h.client.offline().is_empty());
}

#[tokio::test]
async fn logout_and_restore_session() {
    let server = ScriptedServer::new(Vec::new()).await;
    let h = harness(&server.base_url, true);
    h.client
        .session()
        .establish(&credentials("access-1", "refresh-1"))
        .expect("establish");

    let user = h.client.auth().restore_session().expect("restore");
    assert_eq!(user.map(|user| user.id), Some("u-1".to_owned()));

    h.client.auth().logout().expect("logout");
    assert!(!h.client.session().is_authenticated());
    for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY] {
        assert_eq!(h.store.get(key).expect("get"), None);
    }
    assert_eq!(h.client.auth().restore_session().expect("restore"), None);
}

#[tokio::test]
async fn public_aquariums_fail_fast_when_offline() {
    let server = ScriptedServer::new(Vec::new()).await;
    let h = harness(&server.base_url, false);

    let error = within(h.client.aquariums().public(10, 0))
        .await
        .expect_err("public listing is not offline-safe");

    assert!(error.is_network_unavailable());
    assert!(h.client.offline().is_empty());
}

#[tokio::test]
async fn event_calls_build_the_expected_requests() {
    let event = json!({
        "id": "e1",
        "aquariumId": "a1",
        "type": "feeding",
        "title": "Feeding",
        "timestamp": "2024-03-01T08:00:00Z",
        "status": "completed",
        "isPlanned": false
    });
    let server = ScriptedServer::new(vec![
        (200, json!({"data": [event.clone()]})),
        (201, json!({"data": event.clone()})),
        (200, json!({"data": event.clone()})),
        (200, json!({"data": null})),
    ])
    .await;
    let h = harness(&server.base_url, true);
    let events = h.client.events();

    let filters = EventFilters {
        types: vec![EventType::Feeding],
        statuses: vec![EventStatus::Completed, EventStatus::Cancelled],
        ..EventFilters::default()
    };
    let listed = within(events.list("a1", &filters)).await.expect("list");
    assert_eq!(listed[0].kind, EventType::Feeding);

    let created = within(events.create(&EventDraft::new("a1", EventType::Feeding, "Feeding")))
        .await
        .expect("create");
    assert_eq!(created.status, EventStatus::Completed);

    within(events.update_status("e1", EventStatus::InProgress))
        .await
        .expect("update status");
    within(events.delete("e1")).await.expect("delete");

    let requests = server.requests();
    assert_eq!(
        requests[0].path,
        "/api/events/aquarium/a1?type=feeding&status=completed&status=cancelled"
    );
    assert_eq!(requests[1].method, "POST");
    assert_eq!(
        requests[1].json_body(),
        json!({"aquariumId": "a1", "type": "feeding", "title": "Feeding"})
    );
    assert_eq!(requests[2].method, "PUT");
    assert_eq!(requests[2].path, "/api/events/e1/status");
    assert_eq!(requests[2].json_body(), json!({"status": "in_progress"}));
    assert_eq!(requests[3].method, "DELETE");
    assert_eq!(requests[3].path, "/api/events/e1");
}

#[tokio::test]
async fn inhabitant_actions_send_optional_fields_only_when_set() {
    let inhabitant = json!({
        "id": "i1",
        "aquariumId": "a2",
        "type": "fish",
        "species": "Paracheirodon innesi",
        "quantity": 12,
        "addedAt": "2024-01-01",
        "isActive": true
    });
    let server = ScriptedServer::new(vec![
        (200, json!({"data": inhabitant.clone()})),
        (200, json!({"data": inhabitant.clone()})),
        (200, json!({"data": inhabitant.clone()})),
    ])
    .await;
    let h = harness(&server.base_url, true);
    let inhabitants = h.client.inhabitants();

    within(inhabitants.move_to("i1", "a2", None))
        .await
        .expect("move");
    within(inhabitants.mark_death("i1", 2, Some("ich")))
        .await
        .expect("death");
    let bred = within(inhabitants.breed("i1", 12, None))
        .await
        .expect("breed");
    assert_eq!(bred.quantity, 12);

    let requests = server.requests();
    assert_eq!(requests[0].path, "/api/inhabitants/i1/move");
    assert_eq!(requests[0].json_body(), json!({"targetAquariumId": "a2"}));
    assert_eq!(requests[1].path, "/api/inhabitants/i1/death");
    assert_eq!(requests[1].json_body(), json!({"quantity": 2, "reason": "ich"}));
    assert_eq!(requests[2].path, "/api/inhabitants/i1/breed");
    assert_eq!(requests[2].json_body(), json!({"newQuantity": 12}));
}

#[tokio::test]
async fn water_and_timeline_queries() {
    let server = ScriptedServer::new(vec![
        (200, json!({"data": [{"date": "2024-03-01", "value": 10.0}]})),
        (
            200,
            json!({"data": {"totalEvents": 4, "eventsByType": {"feeding": 3}, "mediaCount": 1, "periodDays": 30}}),
        ),
        (200, json!({"data": []})),
    ])
    .await;
    let h = harness(&server.base_url, true);

    let history = within(h.client.water_parameters().history("a1", "nitrate", 30))
        .await
        .expect("history");
    assert_eq!(history[0].value, 10.0);

    let stats = within(h.client.timeline().stats("a1", 30))
        .await
        .expect("stats");
    assert_eq!(stats.events_by_type.get("feeding"), Some(&3));

    let filters = TimelineFilters {
        types: vec!["feeding".to_owned()],
        limit: Some(20),
        ..TimelineFilters::default()
    };
    within(h.client.timeline().list("a1", &filters))
        .await
        .expect("timeline");

    assert_eq!(
        server.paths(),
        vec![
            "GET /api/water-parameters/aquarium/a1/history/nitrate?days=30",
            "GET /api/timeline/aquarium/a1/stats?days=30",
            "GET /api/timeline/aquarium/a1?types=feeding&limit=20",
        ]
    );
}
