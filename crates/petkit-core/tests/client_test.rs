#![allow(clippy::unwrap_used)]
// End-to-end tests for `PetkitClient` against a wiremock account.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use petkit_api::RetryPolicy;
use petkit_core::{Action, ClientConfig, CoreError, DeviceKind, PetkitClient};

// ── Helpers ─────────────────────────────────────────────────────────

const TOKEN: &str = "tok-0123456789abcdef";

fn client_for(server: &MockServer) -> PetkitClient {
    let mut config = ClientConfig::new("owner@example.com", "password").with_region("CN");
    config.passport_url = Some(server.uri());
    config.domestic_gateway = Some(format!("{}/6/", server.uri()));
    config.timeout = Duration::from_secs(5);
    config.retry = RetryPolicy {
        max_retries: 1,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(1),
    };
    PetkitClient::new(&config).unwrap()
}

fn ok(result: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "result": result }))
}

fn account(with_fountain: bool) -> Value {
    let mut devices = vec![
        json!({ "deviceId": 100, "deviceName": "Office Litter Box", "deviceType": "" }),
        json!({ "deviceId": 200, "deviceName": "Kitchen", "deviceType": "d4s" }),
        json!({ "deviceId": 400, "deviceName": "Bedroom", "deviceType": "k2" }),
    ];
    if with_fountain {
        devices.push(json!({ "deviceId": 300, "deviceName": "Water Station" }));
    }
    json!([{
        "groupId": 1,
        "familyName": "Home",
        "deviceList": devices,
        "petList": [{ "petId": 9, "petName": "Mochi", "avatar": "mochi.png" }]
    }])
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/6/user/login"))
        .respond_with(ok(json!({
            "session": { "id": TOKEN, "userId": 42, "expiresIn": 86_400 }
        })))
        .mount(server)
        .await;
}

async fn mount_account(server: &MockServer, times: u64) {
    Mock::given(method("GET"))
        .and(path("/6/group/family/list"))
        .respond_with(ok(account(true)))
        .expect(times)
        .mount(server)
        .await;
}

/// Detail records for everything except the purifier.
async fn mount_details(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/6/pet/petDetail"))
        .respond_with(ok(json!({ "petId": 9, "weight": 4 })))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/6/t4/owndevices"))
        .respond_with(ok(json!([{
            "id": 100,
            "name": "Office Litter Box",
            "firmware": "1.2",
            "state": { "box": 3, "sandPercent": 70, "workState": { "workMode": 0 } }
        }])))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/6/d4s/owndevices"))
        .respond_with(ok(json!({ "list": [{
            "id": 200,
            "name": "Kitchen Feeder",
            "state": { "food1": 2, "food2": 1 }
        }]})))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/6/w5/owndevices"))
        .respond_with(ok(json!([{ "id": 300, "state": { "waterLevel": 1 } }])))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/6/t4/getDeviceRecord"))
        .respond_with(ok(json!([{ "eventType": 10 }])))
        .mount(server)
        .await;
}

async fn populated_server() -> MockServer {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_account(&server, 1).await;
    mount_details(&server).await;
    server
}

// ── Registry ────────────────────────────────────────────────────────

#[tokio::test]
async fn devices_include_pet_and_detailed_devices() {
    let server = populated_server().await;
    let client = client_for(&server);

    let devices = client.get_devices().await.unwrap();
    let ids: Vec<i64> = devices.iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![9, 100, 200, 300]);

    let fountain = client.get_device(300).await.unwrap();
    assert_eq!(fountain.kind, DeviceKind::WaterFountain);
    assert_eq!(fountain.name(), Some("Water Station"));

    // The purifier's detail call 404s, so it stays a stub.
    let purifier = client.get_device(400).await.unwrap();
    assert!(!purifier.has_info());
}

#[tokio::test]
async fn litter_status_reads_waste_level() {
    let server = populated_server().await;
    let client = client_for(&server);

    let status = client.get_litter_status(100).await.unwrap();
    assert_eq!(status.waste_level, 3);
    assert_eq!(status.litter_percent, 70);
    assert!(status.working);

    let records = client.get_device(100).await.unwrap().records.clone();
    assert_eq!(records, Some(json!([{ "eventType": 10 }])));

    assert!(matches!(
        client.get_feeder_status(100).await,
        Err(CoreError::WrongDeviceKind { .. })
    ));
}

#[tokio::test]
async fn pets_carry_merged_profile() {
    let server = populated_server().await;
    let client = client_for(&server);

    let pets = client.get_pets_list().await.unwrap();
    assert_eq!(pets.len(), 1);
    assert_eq!(pets[0].name, "Mochi");
    assert_eq!(pets[0].avatar.as_deref(), Some("mochi.png"));
    assert_eq!(pets[0].profile.as_ref().unwrap()["weight"], 4);
}

#[tokio::test]
async fn repeated_population_keeps_info_stable() {
    let server = populated_server().await;
    let client = client_for(&server);

    let first = client.get_device(100).await.unwrap().info.clone();
    client.populate().await.unwrap();
    let second = client.get_device(100).await.unwrap();
    assert_eq!(second.info, first);
    assert!(second.records.is_some());
    assert_eq!(client.registry().generation(), 2);
}

#[tokio::test]
async fn concurrent_population_runs_once() {
    let server = populated_server().await;
    let client = client_for(&server);

    let (a, b) = tokio::join!(client.populate(), client.populate());
    a.unwrap();
    b.unwrap();
    assert_eq!(client.registry().generation(), 1);
}

#[tokio::test]
async fn refresh_prunes_devices_that_left_the_account() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/6/group/family/list"))
        .respond_with(ok(account(true)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/6/group/family/list"))
        .respond_with(ok(account(false)))
        .mount(&server)
        .await;
    mount_details(&server).await;

    let client = client_for(&server);
    assert!(client.get_device(300).await.is_ok());

    client.refresh().await.unwrap();
    assert!(matches!(
        client.get_device(300).await,
        Err(CoreError::DeviceNotFound { device_id: 300 })
    ));
    assert!(client.get_device(100).await.is_ok());
}

#[tokio::test]
async fn refresh_during_population_still_refetches_account() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/6/group/family/list"))
        .respond_with(ok(account(true)))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/6/group/family/list"))
        .respond_with(ok(account(false)))
        .expect(1)
        .mount(&server)
        .await;
    // Slow detail call keeps the first pass in flight.
    Mock::given(method("POST"))
        .and(path("/6/t4/owndevices"))
        .respond_with(
            ok(json!([{ "id": 100, "name": "Office Litter Box" }]))
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&server)
        .await;
    mount_details(&server).await;

    let client = client_for(&server);
    let (populated, refreshed) = tokio::join!(client.populate(), async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        client.refresh().await
    });
    populated.unwrap();
    refreshed.unwrap();

    assert_eq!(client.registry().generation(), 2);
    assert!(matches!(
        client.get_device(300).await,
        Err(CoreError::DeviceNotFound { device_id: 300 })
    ));
}

#[tokio::test]
async fn camera_litter_box_gets_every_auxiliary_block() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/6/group/family/list"))
        .respond_with(ok(json!([{
            "groupId": 1,
            "deviceList": [
                { "deviceId": 100, "deviceName": "Hall", "deviceType": "t4" },
                { "deviceId": 600, "deviceName": "Studio", "deviceType": "t6" }
            ],
            "petList": []
        }])))
        .mount(&server)
        .await;
    for (code, id) in [("t4", 100), ("t6", 600)] {
        Mock::given(method("POST"))
            .and(path(format!("/6/{code}/owndevices")))
            .respond_with(ok(json!([{ "id": id, "state": { "box": 1 } }])))
            .mount(&server)
            .await;
    }
    let aux = [
        ("getDeviceRecord", json!([{ "eventType": 5 }])),
        ("statistic", json!({ "times": 4 })),
        ("getPetOutGraph", json!([1, 2])),
        ("getLiveFeed", json!({ "liveUrl": "rtmp://studio/live" })),
        ("getMediaList", json!([{ "mediaId": 7 }])),
    ];
    for (endpoint, body) in aux {
        Mock::given(method("POST"))
            .and(path(format!("/6/t6/{endpoint}")))
            .respond_with(ok(body))
            .expect(1)
            .mount(&server)
            .await;
    }
    for endpoint in ["getLiveFeed", "getMediaList"] {
        Mock::given(method("POST"))
            .and(path(format!("/6/t4/{endpoint}")))
            .respond_with(ok(json!([])))
            .expect(0)
            .mount(&server)
            .await;
    }

    let client = client_for(&server);
    let camera = client.get_device(600).await.unwrap();
    assert_eq!(camera.records, Some(json!([{ "eventType": 5 }])));
    assert_eq!(camera.statistics, Some(json!({ "times": 4 })));
    assert_eq!(camera.pet_graph, Some(json!([1, 2])));
    assert_eq!(camera.media, Some(json!([{ "mediaId": 7 }])));
    assert_eq!(
        camera.live_feed.as_ref().and_then(|f| f.url.as_deref()),
        Some("rtmp://studio/live")
    );

    let plain = client.get_device(100).await.unwrap();
    assert!(plain.has_info());
    assert!(plain.media.is_none());
    assert!(plain.live_feed.is_none());
}

#[tokio::test]
async fn account_failure_is_fatal() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/6/group/family/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": { "code": 5, "msg": "session expired" }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(matches!(
        client.get_devices().await,
        Err(CoreError::SessionExpired)
    ));
    assert!(!client.registry().is_populated());
}

// ── Commands ────────────────────────────────────────────────────────

#[tokio::test]
async fn clean_posts_control_device() {
    let server = populated_server().await;
    Mock::given(method("POST"))
        .and(path("/6/t4/controlDevice"))
        .and(body_string_contains("type=start"))
        .and(body_string_contains("start_action"))
        .respond_with(ok(json!("success")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.start_cleaning(100).await.unwrap();
    assert_eq!(result, json!("success"));
}

#[tokio::test]
async fn disallowed_action_sends_nothing() {
    let server = populated_server().await;
    Mock::given(method("POST"))
        .and(path("/6/d4s/controlDevice"))
        .respond_with(ok(json!("success")))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.send_command(200, Action::Clean, None).await.unwrap_err();
    match err {
        CoreError::UnsupportedAction {
            device_type,
            allowed,
            ..
        } => {
            assert_eq!(device_type, "d4s");
            assert!(allowed.contains(&"t4".to_owned()));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn unknown_action_name_is_unsupported() {
    let server = populated_server().await;
    let client = client_for(&server);

    let err = client.control_device(100, "self_destruct", None).await.unwrap_err();
    assert!(matches!(
        err,
        CoreError::UnsupportedAction { ref allowed, .. } if allowed.is_empty()
    ));
}

#[tokio::test]
async fn stub_device_cannot_be_commanded() {
    let server = populated_server().await;
    let client = client_for(&server);

    assert!(matches!(
        client.set_light(400, true).await,
        Err(CoreError::DeviceInfoMissing { device_id: 400 })
    ));
    assert!(matches!(
        client.start_cleaning(999).await,
        Err(CoreError::DeviceNotFound { device_id: 999 })
    ));
}

#[tokio::test]
async fn vendor_failure_is_wrapped_as_command_error() {
    let server = populated_server().await;
    Mock::given(method("POST"))
        .and(path("/6/d4s/saveDailyFeed"))
        .and(body_string_contains("amount1=10"))
        .and(body_string_contains("amount2=5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": { "code": 999, "msg": "hopper jammed" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.feed_dual(200, 10, 5).await.unwrap_err();
    assert!(matches!(err, CoreError::Command { ref action, device_id: 200, .. } if action == "feed"));
    assert!(matches!(err.root(), CoreError::Api { code: 999, .. }));
}

#[tokio::test]
async fn update_setting_encodes_kv() {
    let server = populated_server().await;
    Mock::given(method("POST"))
        .and(path("/6/t4/updateSettings"))
        .and(body_string_contains("id=100"))
        .and(body_string_contains("autoWork"))
        .respond_with(ok(json!("success")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .update_device_setting(100, "autoWork", json!(1))
        .await
        .unwrap();
}
