//! End-to-end lifecycle tests against a mocked management API
//!
//! Exercises the dispatcher the way the orchestration engine would: configure
//! once, then issue create/read/update/delete/diff calls per resource kind.

use supabase_provider::provider::GET_TYPESCRIPT_TYPES;
use supabase_provider::{ConfigOptions, SupabaseProvider};
use supabase_provider_core::error::ProviderError;
use supabase_provider_core::property::{PropertyBag, PropertyValue};
use wiremock::matchers::{bearer_token, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ORGANIZATION: &str = "supabase:index:Organization";
const PROJECT: &str = "supabase:index:Project";
const FUNCTION: &str = "supabase:project:Function";
const SECRET: &str = "supabase:project:Secret";

fn provider_for(server: &MockServer) -> SupabaseProvider {
    SupabaseProvider::configure(
        ConfigOptions {
            server: Some(format!("{}/v1/", server.uri())),
            token: Some("sbp_test".to_string()),
        },
        "0.1.0",
        b"{\"name\":\"supabase\"}".to_vec(),
    )
    .unwrap()
}

fn bag(pairs: &[(&str, PropertyValue)]) -> PropertyBag {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn project_input() -> PropertyBag {
    bag(&[
        ("name", PropertyValue::from("acme")),
        ("region", PropertyValue::from("us-east-1")),
        (
            "organizationId",
            PropertyValue::ResourceReference {
                id: Box::new(PropertyValue::from("org_1")),
            },
        ),
        (
            "dbPass",
            PropertyValue::Secret(Box::new(PropertyValue::from("hunter2"))),
        ),
    ])
}

#[tokio::test]
async fn create_project_preview_returns_input_derived_bag_without_calls() {
    let server = MockServer::start().await;
    let provider = provider_for(&server);

    let state = provider.create(PROJECT, &project_input(), true).await.unwrap();

    assert_eq!(state.id, "");
    assert_eq!(state.outputs.get("name"), Some(&PropertyValue::from("acme")));
    assert_eq!(
        state.outputs.get("region"),
        Some(&PropertyValue::from("us-east-1"))
    );
    assert_eq!(
        state.outputs.get("organizationId"),
        Some(&PropertyValue::from("org_1"))
    );
    assert!(!state.outputs.contains_key("id"));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn create_project_preview_succeeds_without_db_pass() {
    let server = MockServer::start().await;
    let provider = provider_for(&server);

    let input = bag(&[
        ("name", PropertyValue::from("acme")),
        ("region", PropertyValue::from("us-east-1")),
        ("organizationId", PropertyValue::from("org_1")),
    ]);
    let state = provider.create(PROJECT, &input, true).await.unwrap();

    assert_eq!(state.id, "");
    assert_eq!(state.outputs.get("name"), Some(&PropertyValue::from("acme")));
    assert_eq!(
        state.outputs.get("organizationId"),
        Some(&PropertyValue::from("org_1"))
    );
    assert!(server.received_requests().await.unwrap().is_empty());

    // Same outcome when the password is merely unknown rather than absent
    let mut with_computed = input.clone();
    with_computed.insert("dbPass".to_string(), PropertyValue::Computed);
    let state = provider.create(PROJECT, &with_computed, true).await.unwrap();
    assert_eq!(state.id, "");
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn read_project_decorates_connection_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/projects"))
        .and(bearer_token("sbp_test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": "proj_42", "organization_id": "org_1", "name": "acme", "region": "us-east-1"}
        ])))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let state = provider
        .read(PROJECT, "proj_42", &PropertyBag::new())
        .await
        .unwrap();

    assert_eq!(state.id, "proj_42");
    assert_eq!(
        state.outputs.get("dbHost"),
        Some(&PropertyValue::from("db.proj_42.supabase.co"))
    );
    assert_eq!(
        state.outputs.get("dbPoolingPort"),
        Some(&PropertyValue::from(6543i64))
    );
    assert_eq!(
        state.outputs.get("endpoint"),
        Some(&PropertyValue::from("https://proj_42.supabase.co"))
    );
}

#[tokio::test]
async fn read_twice_yields_identical_bags() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/organizations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": "org_1", "name": "acme"}
        ])))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let first = provider
        .read(ORGANIZATION, "org_1", &PropertyBag::new())
        .await
        .unwrap();
    let second = provider
        .read(ORGANIZATION, "org_1", &PropertyBag::new())
        .await
        .unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn diff_function_body_updates_slug_replaces() {
    let server = MockServer::start().await;
    let provider = provider_for(&server);

    let old = bag(&[
        ("slug", PropertyValue::from("hello")),
        ("body", PropertyValue::from("export {}")),
    ]);

    let mut new_body = old.clone();
    new_body.insert("body".to_string(), PropertyValue::from("export default 1"));
    let decision = provider.diff(FUNCTION, &old, &new_body).unwrap();
    assert_eq!(decision.changed_keys, vec!["body"]);
    assert!(!decision.requires_replace);
    // Deterministic on repeat
    assert_eq!(decision, provider.diff(FUNCTION, &old, &new_body).unwrap());

    let mut new_slug = old.clone();
    new_slug.insert("slug".to_string(), PropertyValue::from("world"));
    let decision = provider.diff(FUNCTION, &old, &new_slug).unwrap();
    assert!(decision.changed_keys.contains(&"slug".to_string()));
    assert!(decision.requires_replace);
}

#[tokio::test]
async fn delete_secret_404_surfaces_upstream_error() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v1/projects/proj_1/secrets"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let input = bag(&[("projectId", PropertyValue::from("proj_1"))]);
    let err = provider
        .delete(SECRET, "API_KEY", &input)
        .await
        .unwrap_err();
    match err {
        ProviderError::Upstream { status, .. } => assert_eq!(status, 404),
        other => panic!("expected Upstream, got {other:?}"),
    }
}

#[tokio::test]
async fn update_organization_always_fails_unsupported() {
    let server = MockServer::start().await;
    let provider = provider_for(&server);

    let old = bag(&[("name", PropertyValue::from("acme"))]);
    let new = bag(&[("name", PropertyValue::from("acme-2"))]);
    let err = provider
        .update(ORGANIZATION, &old, &new, false)
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::UnsupportedOperation { .. }));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn full_function_lifecycle_against_mock_api() {
    let server = MockServer::start().await;
    let function_json = serde_json::json!({
        "id": "fn_1", "slug": "hello", "name": "Hello",
        "status": "ACTIVE", "verify_jwt": false, "version": 1
    });
    Mock::given(method("POST"))
        .and(path("/v1/projects/proj_1/functions"))
        .respond_with(ResponseTemplate::new(201).set_body_json(&function_json))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/projects/proj_1/functions/hello"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&function_json))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/projects/proj_1/functions/hello/body"))
        .respond_with(ResponseTemplate::new(200).set_body_string("export {}"))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v1/projects/proj_1/functions/hello"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let input = bag(&[
        ("projectId", PropertyValue::from("proj_1")),
        ("slug", PropertyValue::from("hello")),
        ("name", PropertyValue::from("Hello")),
        ("body", PropertyValue::from("export {}")),
    ]);

    let created = provider.create(FUNCTION, &input, false).await.unwrap();
    assert_eq!(created.id, "fn_1");

    let read = provider.read(FUNCTION, "fn_1", &input).await.unwrap();
    assert_eq!(read.id, "fn_1");
    assert_eq!(
        read.outputs.get("body"),
        Some(&PropertyValue::from("export {}"))
    );

    provider.delete(FUNCTION, "fn_1", &input).await.unwrap();
}

#[tokio::test]
async fn invoke_fetches_typescript_types() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/projects/proj_1/types/typescript"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "types": "export interface Database {}"
        })))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let args = bag(&[("projectId", PropertyValue::from("proj_1"))]);
    let result = provider.invoke(GET_TYPESCRIPT_TYPES, &args).await.unwrap();
    assert_eq!(
        result.get("types"),
        Some(&PropertyValue::from("export interface Database {}"))
    );
}

#[tokio::test]
async fn cancel_aborts_subsequent_calls_without_network() {
    let server = MockServer::start().await;
    let provider = provider_for(&server);

    provider.cancel();
    let err = provider
        .read(ORGANIZATION, "org_1", &PropertyBag::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Transport(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn create_with_computed_required_input_fails_outside_preview() {
    let server = MockServer::start().await;
    let provider = provider_for(&server);

    let mut input = project_input();
    input.insert("dbPass".to_string(), PropertyValue::Computed);
    let err = provider.create(PROJECT, &input, false).await.unwrap_err();
    assert!(matches!(err, ProviderError::Unwrap(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}
