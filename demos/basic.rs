//! Minimal nex example: one JSON endpoint that uses every parameter kind.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic
//!
//! Try:
//!   curl -X POST http://localhost:3000/orders \
//!        -H 'content-type: application/json' \
//!        -H 'x-tenant: acme' \
//!        -d '{"sku":"A-100","qty":3}'
//!   curl -X POST http://localhost:3000/orders -d '{"sku":'     # 400

use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, StatusCode};
use nex::{Context, Endpoint, Payload, ResponseSink, Server, register};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
struct CreateOrder {
    sku: String,
    qty: u32,
}

#[derive(Serialize)]
struct Order {
    id: u64,
    sku: String,
    qty: u32,
    tenant: String,
}

#[derive(Debug)]
struct Tenant(String);

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let adapter = register(create_order).expect("invalid handler signature");

    Server::bind("0.0.0.0:3000")
        .serve(Endpoint::new(adapter))
        .await
        .expect("server error");
}

// Ambient headers and sink, the context, and the decoded body, in any order.
// Returning a context hands it back to the wiring layer.
async fn create_order(
    headers: HeaderMap,
    ctx: Context,
    Payload(req): Payload<CreateOrder>,
    sink: ResponseSink,
) -> (Context, Result<Order, std::io::Error>) {
    let tenant = headers
        .get("x-tenant")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("default")
        .to_owned();

    sink.set_status(StatusCode::CREATED);
    sink.insert_header(
        HeaderName::from_static("location"),
        HeaderValue::from_static("/orders/99"),
    );

    let ctx = ctx.with_value(Tenant(tenant.clone()));
    let order = Order { id: 99, sku: req.sku, qty: req.qty, tenant };
    (ctx, Ok(order))
}
