use std::time::Duration;

use relay_core::directive::{Argument, parse_directive};
use relay_core::gateway::{ArgumentShape, HttpToolGateway, ToolSpec};
use relay_core::traits::{DispatchOutcome, ToolGateway};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gateway(server: &MockServer) -> HttpToolGateway {
    let base = server.uri();
    HttpToolGateway::with_timeout(
        vec![
            ToolSpec::new("memory", format!("{base}/memory/memory"), ArgumentShape::Input),
            ToolSpec::new("time", format!("{base}/time"), ArgumentShape::Time),
            ToolSpec::new("fetch", format!("{base}/fetch/fetch"), ArgumentShape::Fetch),
            ToolSpec::new(
                "ainews",
                format!("{base}/ainews/latest_genai_news"),
                ArgumentShape::Input,
            ),
        ],
        Duration::from_millis(500),
    )
    .expect("gateway")
}

fn directive_argument(reply: &str) -> (String, Argument) {
    let directive = parse_directive(reply)
        .expect("well-formed directive")
        .expect("directive present");
    (directive.name, directive.argument)
}

#[tokio::test]
async fn time_without_conversion_fields_hits_current_time() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/time/get_current_time"))
        .and(body_json(json!({ "timezone": "UTC" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": "2026-10-15T10:00:00+00:00"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (name, argument) = directive_argument(r#"TOOLCALL[time|{"timezone":"UTC"}]"#);
    let dispatch = gateway(&server).invoke(&name, &argument).await;

    assert_eq!(dispatch.output, "2026-10-15T10:00:00+00:00");
    assert_eq!(dispatch.outcome, DispatchOutcome::Completed { status: 200 });
}

#[tokio::test]
async fn time_conversion_routes_to_convert_time() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/time/convert_time"))
        .and(body_json(json!({
            "source_timezone": "Europe/Paris",
            "target_timezone": "Asia/Tokyo",
            "time": "09:30"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": "16:30" })))
        .expect(1)
        .mount(&server)
        .await;

    let (name, argument) = directive_argument(
        r#"TOOLCALL[time|{"source_timezone":"Europe/Paris","target_timezone":"Asia/Tokyo","time":"09:30"}]"#,
    );
    let dispatch = gateway(&server).invoke(&name, &argument).await;

    assert_eq!(dispatch.output, "16:30");
}

#[tokio::test]
async fn fetch_returns_body_verbatim() {
    let server = MockServer::start().await;
    let page = r#"{"result": "not unwrapped", "links": ["https://example.com/a?b=c&d=e"]}"#;
    Mock::given(method("POST"))
        .and(path("/fetch/fetch"))
        .and(body_json(json!({
            "url": "https://example.com",
            "max_length": 5000,
            "start_index": 0,
            "raw": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string(page))
        .expect(1)
        .mount(&server)
        .await;

    let (name, argument) = directive_argument("TOOLCALL[fetch|https://example.com]");
    let dispatch = gateway(&server).invoke(&name, &argument).await;

    assert_eq!(dispatch.output, page);
}

#[tokio::test]
async fn memory_wraps_input_and_falls_back_to_raw_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/memory/memory"))
        .and(body_json(json!({ "input": "remember the milk" })))
        .respond_with(ResponseTemplate::new(200).set_body_string("stored"))
        .expect(1)
        .mount(&server)
        .await;

    let dispatch = gateway(&server)
        .invoke("memory", &Argument::Text("remember the milk".into()))
        .await;

    assert_eq!(dispatch.output, "stored");
}

#[tokio::test]
async fn news_without_result_field_returns_whole_body() {
    let server = MockServer::start().await;
    let body = json!({
        "news": [{ "title": "A", "url": "https://arxiv.org/abs/1", "source": "arXiv" }],
        "count": 1
    });
    Mock::given(method("POST"))
        .and(path("/ainews/latest_genai_news"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
        .mount(&server)
        .await;

    let dispatch = gateway(&server)
        .invoke("ainews", &Argument::Text(String::new()))
        .await;

    let echoed: serde_json::Value = serde_json::from_str(&dispatch.output).unwrap();
    assert_eq!(echoed, body);
}

#[tokio::test]
async fn server_error_becomes_error_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/memory/memory"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let dispatch = gateway(&server)
        .invoke("memory", &Argument::Text("x".into()))
        .await;

    assert!(dispatch.output.starts_with("Error calling memory: "));
    assert!(dispatch.output.contains("500"));
    assert_eq!(dispatch.outcome, DispatchOutcome::Failed);
}

#[tokio::test]
async fn slow_tool_times_out_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/fetch/fetch"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .expect(1)
        .mount(&server)
        .await;

    let dispatch = gateway(&server)
        .invoke("fetch", &Argument::Text("https://slow.example".into()))
        .await;

    assert!(dispatch.output.starts_with("Error calling fetch: "));
    assert_eq!(dispatch.outcome, DispatchOutcome::Failed);
}

#[tokio::test]
async fn invalid_input_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let gateway = gateway(&server);
    let time = gateway.invoke("time", &Argument::Text("now".into())).await;
    let (_, bad_fetch) = directive_argument(r#"TOOLCALL[fetch|{"url": 42}]"#);
    let fetch = gateway.invoke("fetch", &bad_fetch).await;
    let unknown = gateway.invoke("bogus", &Argument::Text("x".into())).await;

    assert_eq!(time.outcome, DispatchOutcome::InvalidInput);
    assert_eq!(fetch.output, "Invalid input to fetch tool.");
    assert_eq!(unknown.output, "Tool bogus not configured.");
}
