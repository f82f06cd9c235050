//! HTTP scenarios for the issue tracker strategy: request bodies, payload
//! shaping, and status-code normalization into the error taxonomy.

use serde_json::{json, Map, Value};
use tb_config::{AppConfig, AuthType, HttpConfig, ProviderCredentials};
use tb_providers::{IssueTrackerProvider, ProviderStrategy};
use tb_types::{BridgeError, ProviderOperation};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn tracker_at(url: String) -> IssueTrackerProvider {
    let credentials = ProviderCredentials {
        url,
        username: "bot@example.com".into(),
        token: "secret".into(),
        auth_type: AuthType::Basic,
    };
    IssueTrackerProvider::new(credentials, &AppConfig::default()).unwrap()
}

fn params(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

#[tokio::test]
async fn create_issue_posts_fields_and_shapes_payload() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/api/3/issue"))
        .and(body_json(json!({
            "fields": {
                "project": { "key": "TEST" },
                "summary": "Fix the flux capacitor",
                "issuetype": { "name": "Task" }
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "10024",
            "key": "TEST-24",
            "self": "https://tracker.example.com/rest/api/3/issue/10024"
        })))
        .mount(&server)
        .await;

    let provider = tracker_at(server.uri());
    let result = provider
        .execute(
            ProviderOperation::Create,
            &params(json!({
                "project": "TEST",
                "summary": "Fix the flux capacitor",
                "issuetype": "Task"
            })),
        )
        .await
        .unwrap();

    assert_eq!(result["key"], "TEST-24");
    assert_eq!(result["id"], "10024");
    assert_eq!(result["message"], "Issue TEST-24 created successfully");
}

#[tokio::test]
async fn subtask_inherits_project_from_parent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/api/3/issue/TEST-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "key": "TEST-7",
            "fields": { "project": { "key": "TEST" } }
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/api/3/issue"))
        .and(body_json(json!({
            "fields": {
                "project": { "key": "TEST" },
                "parent": { "key": "TEST-7" },
                "summary": "Split the work",
                "issuetype": { "name": "Sub-task" }
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "10025",
            "key": "TEST-25"
        })))
        .mount(&server)
        .await;

    let provider = tracker_at(server.uri());
    let result = provider
        .execute(
            ProviderOperation::Create,
            &params(json!({
                "parentKey": "TEST-7",
                "summary": "Split the work",
                "issuetype": "Sub-task"
            })),
        )
        .await
        .unwrap();

    assert_eq!(result["key"], "TEST-25");
    assert_eq!(result["parentKey"], "TEST-7");
    assert_eq!(result["message"], "Subtask TEST-25 created for TEST-7");
}

#[tokio::test]
async fn update_synthesizes_payload_from_no_content() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/rest/api/3/issue/TEST-1"))
        .and(body_json(json!({
            "fields": { "summary": "New summary" }
        })))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let provider = tracker_at(server.uri());
    let result = provider
        .execute(
            ProviderOperation::Update,
            &params(json!({ "key": "TEST-1", "summary": "New summary" })),
        )
        .await
        .unwrap();

    assert_eq!(result["key"], "TEST-1");
    assert_eq!(result["message"], "Issue TEST-1 updated successfully");
}

#[tokio::test]
async fn delete_answers_with_confirmation() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/rest/api/3/issue/TEST-9"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let provider = tracker_at(server.uri());
    let result = provider
        .execute(ProviderOperation::Delete, &params(json!({ "key": "TEST-9" })))
        .await
        .unwrap();

    assert_eq!(result["message"], "Issue TEST-9 deleted successfully");
}

#[tokio::test]
async fn search_clamps_max_results_to_the_cap() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/api/3/search"))
        .and(body_json(json!({
            "jql": "project = \"TEST\"",
            "maxResults": 50
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 2,
            "issues": [
                { "key": "TEST-1", "fields": { "summary": "First" } },
                { "key": "TEST-2", "fields": { "summary": "Second" } }
            ]
        })))
        .mount(&server)
        .await;

    let provider = tracker_at(server.uri());
    let result = provider
        .execute(
            ProviderOperation::Search,
            &params(json!({ "project": "TEST", "maxResults": 200 })),
        )
        .await
        .unwrap();

    assert_eq!(result["count"], 2);
    assert_eq!(result["issues"][0]["key"], "TEST-1");
    assert_eq!(result["message"], "Found 2 issues");
}

#[tokio::test]
async fn unauthorized_maps_to_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/api/3/issue"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "errorMessages": ["Invalid credentials"]
        })))
        .mount(&server)
        .await;

    let provider = tracker_at(server.uri());
    let err = provider
        .execute(
            ProviderOperation::Create,
            &params(json!({
                "project": "TEST",
                "summary": "s",
                "issuetype": "Task"
            })),
        )
        .await
        .unwrap_err();

    match err {
        BridgeError::ProviderAuth(_) => {}
        other => panic!("expected ProviderAuth, got: {:?}", other),
    }
}

#[tokio::test]
async fn missing_issue_maps_to_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/rest/api/3/issue/TEST-404"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "errorMessages": ["Issue does not exist"]
        })))
        .mount(&server)
        .await;

    let provider = tracker_at(server.uri());
    let err = provider
        .execute(
            ProviderOperation::Delete,
            &params(json!({ "key": "TEST-404" })),
        )
        .await
        .unwrap_err();

    match err {
        BridgeError::ProviderNotFound(_) => {}
        other => panic!("expected ProviderNotFound, got: {:?}", other),
    }
}

#[tokio::test]
async fn throttling_maps_to_rate_limited() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/api/3/search"))
        .respond_with(
            ResponseTemplate::new(429)
                .set_body_string("Too many requests")
                .insert_header("retry-after", "60"),
        )
        .mount(&server)
        .await;

    let provider = tracker_at(server.uri());
    let err = provider
        .execute(ProviderOperation::Search, &params(json!({ "project": "TEST" })))
        .await
        .unwrap_err();

    match err {
        BridgeError::ProviderRateLimited(_) => {}
        other => panic!("expected ProviderRateLimited, got: {:?}", other),
    }
}

#[tokio::test]
async fn server_fault_maps_to_provider_internal() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/api/3/issue"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let provider = tracker_at(server.uri());
    let err = provider
        .execute(
            ProviderOperation::Create,
            &params(json!({
                "project": "TEST",
                "summary": "s",
                "issuetype": "Task"
            })),
        )
        .await
        .unwrap_err();

    match err {
        BridgeError::ProviderInternal(_) => {}
        other => panic!("expected ProviderInternal, got: {:?}", other),
    }
}

#[tokio::test]
async fn unreachable_backend_maps_to_network_error() {
    // A pooled server (`MockServer::start`) keeps its listener alive after
    // drop; only a dedicated builder server actually frees the port.
    let server = MockServer::builder().start().await;
    let dead_uri = server.uri();
    drop(server);

    let provider = tracker_at(dead_uri);
    let err = provider
        .execute(ProviderOperation::Search, &params(json!({ "project": "TEST" })))
        .await
        .unwrap_err();

    match err {
        BridgeError::ProviderNetwork(_) => {}
        other => panic!("expected ProviderNetwork, got: {:?}", other),
    }
}

#[tokio::test]
async fn slow_backend_times_out_as_network_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/api/3/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "issues": [] }))
                .set_delay(std::time::Duration::from_millis(1500)),
        )
        .mount(&server)
        .await;

    let credentials = ProviderCredentials {
        url: server.uri(),
        username: "bot@example.com".into(),
        token: "secret".into(),
        auth_type: AuthType::Basic,
    };
    let config = AppConfig {
        http: HttpConfig {
            timeout_seconds: 1,
            accept_invalid_certs: false,
        },
        ..AppConfig::default()
    };
    let provider = IssueTrackerProvider::new(credentials, &config).unwrap();

    let err = provider
        .execute(ProviderOperation::Search, &params(json!({ "project": "TEST" })))
        .await
        .unwrap_err();

    match err {
        BridgeError::ProviderNetwork(_) => {}
        other => panic!("expected ProviderNetwork, got: {:?}", other),
    }
}

#[tokio::test]
async fn debug_sections_fail_independently() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/api/3/project"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/api/3/issuetype"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "Task", "description": "A task" },
            { "name": "Bug" }
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/api/3/myself"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accountId": "abc123",
            "displayName": "Bridge Bot"
        })))
        .mount(&server)
        .await;

    let provider = tracker_at(server.uri());
    let result = provider
        .execute(ProviderOperation::Debug, &Map::new())
        .await
        .unwrap();

    assert!(result.get("projects").is_none());
    assert!(result["projectsError"].as_str().unwrap().contains("500"));
    assert_eq!(
        result["issuetypes"],
        json!([
            { "name": "Task", "description": "A task" },
            { "name": "Bug", "description": "" }
        ])
    );
    assert_eq!(result["currentUser"]["displayName"], "Bridge Bot");
}

#[tokio::test]
async fn search_by_parent_is_not_part_of_the_tracker_surface() {
    let server = MockServer::start().await;
    let provider = tracker_at(server.uri());

    let err = provider
        .execute(
            ProviderOperation::SearchByParent,
            &params(json!({ "parentId": "123" })),
        )
        .await
        .unwrap_err();

    match err {
        BridgeError::ProviderInternal(_) => {}
        other => panic!("expected ProviderInternal, got: {:?}", other),
    }
}
