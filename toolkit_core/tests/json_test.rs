use axum::{
    body::Body,
    extract::Request,
    http::{HeaderMap, StatusCode},
    response::Response,
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower::ServiceExt;
use toolkit_core::{
    error_json, write_json, JsonError, JsonResponse, StrictJson, Toolkit, ToolkitConfig,
};

#[derive(Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
struct Foo {
    foo: String,
}

fn json_request(body: &'static str) -> Request {
    Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_read_json_cases() {
    struct Case {
        name: &'static str,
        json: &'static str,
        error_expected: bool,
        max_size: u64,
        allow_unknown: bool,
    }

    let cases = [
        Case { name: "good json", json: r#"{"foo": "bar"}"#, error_expected: false, max_size: 1024, allow_unknown: false },
        Case { name: "badly formatted json", json: r#"{"foo":}"#, error_expected: true, max_size: 1024, allow_unknown: false },
        Case { name: "incorrect type", json: r#"{"foo": 1}"#, error_expected: true, max_size: 1024, allow_unknown: false },
        Case { name: "two json files", json: r#"{"foo": "1"}{"alpha": "beta"}"#, error_expected: true, max_size: 1024, allow_unknown: false },
        Case { name: "empty body", json: "", error_expected: true, max_size: 1024, allow_unknown: false },
        Case { name: "syntax error in json", json: r#"{"foo": 1""#, error_expected: true, max_size: 1024, allow_unknown: false },
        Case { name: "unknown field in json", json: r#"{"fooo": "1"}"#, error_expected: true, max_size: 1024, allow_unknown: false },
        Case { name: "allow unknown fields in json", json: r#"{"fooo": "1"}"#, error_expected: false, max_size: 1024, allow_unknown: true },
        Case { name: "missing field name", json: r#"{jack: "1"}"#, error_expected: true, max_size: 1024, allow_unknown: true },
        Case { name: "file too large", json: r#"{"foo": "bar"}"#, error_expected: true, max_size: 5, allow_unknown: true },
        Case { name: "not json", json: "Hello, world!", error_expected: true, max_size: 1024, allow_unknown: true },
    ];

    for case in cases {
        let toolkit = Toolkit::new(
            ToolkitConfig::default()
                .with_max_json_bytes(case.max_size)
                .with_unknown_json_fields(case.allow_unknown),
        );

        let result = toolkit.read_json::<Foo>(json_request(case.json)).await;

        assert_eq!(
            result.is_err(),
            case.error_expected,
            "{}: unexpected result {:?}",
            case.name,
            result
        );
    }
}

#[tokio::test]
async fn test_read_json_error_kinds() {
    let toolkit = Toolkit::default();

    let err = toolkit.read_json::<Foo>(json_request("")).await.unwrap_err();
    assert_eq!(err, JsonError::EmptyBody);

    let err = toolkit.read_json::<Foo>(json_request(r#"{"fooo":"bar"}"#)).await.unwrap_err();
    assert_eq!(err, JsonError::UnknownField("fooo".to_string()));

    let err = toolkit
        .read_json::<Foo>(json_request(r#"{"foo":"1"}{"alpha":"beta"}"#))
        .await
        .unwrap_err();
    assert_eq!(err, JsonError::MultipleValues);

    let err = toolkit.read_json::<Foo>(json_request(r#"{"foo":1}"#)).await.unwrap_err();
    assert!(matches!(err, JsonError::TypeMismatch { field: Some(ref f), .. } if f == "foo"));
}

#[tokio::test]
async fn test_zero_json_limit_uses_upload_limit() {
    let toolkit = Toolkit::new(ToolkitConfig::default().with_max_json_bytes(0));

    let decoded: Foo = toolkit.read_json(json_request(r#"{"foo":"bar"}"#)).await.unwrap();
    assert_eq!(decoded.foo, "bar");
}

async fn echo(StrictJson(foo): StrictJson<Foo>) -> Response {
    write_json(StatusCode::OK, &JsonResponse::success("ok", foo), &HeaderMap::new()).unwrap()
}

#[tokio::test]
async fn test_strict_json_extractor_in_router() {
    let app = Router::new()
        .route("/", post(echo))
        .with_state(Toolkit::default());

    let response = app.clone().oneshot(json_request(r#"{"foo":"bar"}"#)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"error": false, "message": "ok", "data": {"foo": "bar"}})
    );

    let response = app.oneshot(json_request(r#"{"foo":}"#)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let value = body_json(response).await;
    assert_eq!(value["error"], json!(true));
    assert!(value["message"]
        .as_str()
        .unwrap()
        .starts_with("body contains badly-formed JSON"));
}

#[tokio::test]
async fn test_error_json_envelope() {
    let response = error_json(&JsonError::EmptyBody).unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({"error": true, "message": "body must not be empty"})
    );
}
