//! # nex
//!
//! Turn a plain `async fn` into a JSON request endpoint.
//!
//! ## The contract
//!
//! A handler declares what it needs in its parameter list and nex supplies
//! it. Each parameter is one of:
//!
//! - **ambient**: read straight off the request or response, e.g.
//!   `http::Method`, `http::HeaderMap`, [`ResponseSink`]
//! - **context**: the request-scoped [`Context`]
//! - **payload**: at most one [`Payload<T>`], decoded from the JSON body into
//!   a fresh `T` on every call
//!
//! and returns either `Result<T, E>` or `(Context, Result<T, E>)`.
//!
//! [`register`] checks the signature once, at startup, and picks the cheapest
//! way to call it. Bad signatures fail there, never per request. Every call
//! then yields an [`Invocation`]: `(context, payload, error)`.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use nex::{Endpoint, Payload, Server, register};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Deserialize)]
//! struct Greet { name: String }
//!
//! #[derive(Serialize)]
//! struct Greeting { message: String }
//!
//! async fn greet(Payload(req): Payload<Greet>) -> Result<Greeting, std::io::Error> {
//!     Ok(Greeting { message: format!("hello, {}", req.name) })
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let adapter = register(greet).expect("valid handler");
//!     Server::bind("0.0.0.0:3000").serve(Endpoint::new(adapter)).await.unwrap();
//! }
//! ```

mod adapter;
mod ambient;
mod classify;
mod context;
mod endpoint;
mod error;
mod handler;
mod outcome;
mod params;
mod payload;
mod request;
mod response;
mod server;
mod sink;
mod strategy;

pub use adapter::{Adapter, register};
pub use classify::{HandlerDescriptor, classify};
pub use context::Context;
pub use endpoint::Endpoint;
pub use error::{BoxError, Error, InvokeError, PayloadDecodeError, RegistrationError};
pub use handler::Handler;
pub use outcome::{Invocation, Outcome, Reply, ReturnShape};
pub use params::{Param, ParamKind, Params, Slots};
pub use payload::{Payload, PayloadShape, probe};
pub use request::Request;
pub use response::HttpResponse;
pub use server::Server;
pub use sink::ResponseSink;
pub use strategy::Strategy;
