//! Core types shared by the csrfp crates.
//!
//! - [`HttpRequest`] / [`HttpResponse`]: the request context the protector
//!   reads and the response it decorates
//! - [`RequestType`]: GET vs POST classification
//! - [`Middleware`] / [`MiddlewareChain`]: async request pipeline
//! - [`logging`]: `tracing` subscriber setup

pub mod error;
pub mod http;
pub mod logging;
pub mod middleware;

pub use error::Error;
pub use http::{HttpRequest, HttpResponse, RequestType, parse_cookie_header};
pub use middleware::{HandlerFn, Middleware, MiddlewareChain, Next, ResponseFuture, handler_fn};
