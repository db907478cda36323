//! The HTTP wiring layer: status mapping, JSON bodies, and a live server.

use std::io;

use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use nex::{Context, Endpoint, HttpResponse, Payload, ResponseSink, Server, register};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::oneshot;

#[derive(Deserialize)]
struct Deposit {
    account: String,
    cents: i64,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Balance {
    account: String,
    cents: i64,
}

#[derive(Debug, thiserror::Error)]
#[error("account {0} is frozen")]
struct Frozen(String);

async fn deposit(Payload(d): Payload<Deposit>, sink: ResponseSink) -> Result<Balance, Frozen> {
    if d.account == "frozen" {
        return Err(Frozen(d.account));
    }
    sink.insert_header(
        HeaderName::from_static("x-ledger"),
        HeaderValue::from_static("main"),
    );
    Ok(Balance { account: d.account, cents: d.cents + 100 })
}

fn request(body: &'static str) -> http::Request<Full<Bytes>> {
    http::Request::post("/deposit")
        .body(Full::new(Bytes::from_static(body.as_bytes())))
        .unwrap()
}

async fn body_json(res: HttpResponse) -> serde_json::Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn payload_becomes_json_200() {
    let endpoint = Endpoint::new(register(deposit).unwrap());
    let res = endpoint.handle(request(r#"{"account":"a-1","cents":250}"#)).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[CONTENT_TYPE], "application/json");
    assert_eq!(res.headers()["x-ledger"], "main");
    assert_eq!(
        body_json(res).await,
        serde_json::json!({ "account": "a-1", "cents": 350 }),
    );
}

#[tokio::test]
async fn decode_error_becomes_400() {
    let endpoint = Endpoint::new(register(deposit).unwrap());
    let res = endpoint.handle(request(r#"{"account":"a-1""#)).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = body_json(res).await;
    assert!(body["error"].as_str().unwrap().starts_with("malformed payload"));
}

#[tokio::test]
async fn handler_error_becomes_500() {
    let endpoint = Endpoint::new(register(deposit).unwrap());
    let res = endpoint.handle(request(r#"{"account":"frozen","cents":1}"#)).await;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(res).await, serde_json::json!({ "error": "account frozen is frozen" }));
}

#[tokio::test]
async fn sink_status_and_context_from_extensions() {
    #[derive(Clone)]
    struct Caller(&'static str);

    async fn whoami(ctx: Context, sink: ResponseSink) -> Result<String, io::Error> {
        sink.set_status(StatusCode::ACCEPTED);
        Ok(ctx.value::<Caller>().map(|c| c.0).unwrap_or("anonymous").to_owned())
    }

    let endpoint = Endpoint::new(register(whoami).unwrap());

    let mut req = request("");
    req.extensions_mut().insert(Context::new().with_value(Caller("ops")));
    let res = endpoint.handle(req).await;

    assert_eq!(res.status(), StatusCode::ACCEPTED);
    assert_eq!(body_json(res).await, serde_json::json!("ops"));

    let res = endpoint.handle(request("")).await;
    assert_eq!(body_json(res).await, serde_json::json!("anonymous"));
}

#[tokio::test]
async fn server_serves_endpoint_until_shutdown() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let endpoint = Endpoint::new(register(deposit).unwrap());

    let (stop, stopped) = oneshot::channel::<()>();
    let server = tokio::spawn(
        Server::from_listener(listener).serve_with_shutdown(endpoint, async move {
            let _ = stopped.await;
        }),
    );

    let body = r#"{"account":"tcp","cents":1}"#;
    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    let raw = format!(
        "POST /deposit HTTP/1.1\r\nhost: {addr}\r\ncontent-type: application/json\r\n\
         content-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len(),
    );
    stream.write_all(raw.as_bytes()).await.unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();

    assert!(response.starts_with("HTTP/1.1 200 OK"), "{response}");
    assert!(response.ends_with(r#"{"account":"tcp","cents":101}"#), "{response}");

    stop.send(()).unwrap();
    server.await.unwrap().unwrap();
}
