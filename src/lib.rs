//! A request router that matches paths segment by segment, built on hyper.
//!
//! ```no_run
//! use switchyard::{route, Body, HttpRouter, Params, Request, ResponseBuilder, RouterBuilder};
//! use switchyard::hyper::Server;
//!
//! async fn user(_req: Request, params: Params) -> anyhow::Result<hyper::Response<Body>> {
//! 	Ok(ResponseBuilder::default().body(params.by_name("id").to_owned().into())?)
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! 	let mut builder = RouterBuilder::default();
//! 	builder
//! 		.get("/users/:id", route(user))?
//! 		.delete("/users/:id", route(user))?;
//!
//! 	let router = HttpRouter::from(builder);
//! 	let addr = ([127, 0, 0, 1], 3000).into();
//! 	let server = Server::bind(&addr).serve(router);
//! 	println!("Listening on http://{}", addr);
//!
//! 	server.await?;
//! 	Ok(())
//! }
//! ```
//!
//! Patterns are made of `/`-separated segments. A segment is a literal, a
//! parameter `:name` matching exactly one segment, or, as the last segment
//! only, a wildcard `*name` matching the rest of the path. A wildcard route
//! also matches its parent path, with an empty value. Literal segments win
//! over parameters when both could match. Matching ignores the case of
//! literals, and parameter values are passed on as written in the request.
//!
//! Registration fails with a [`RouteError`] when a pattern is malformed or
//! would be ambiguous with one registered before it.

mod config;
mod error;
mod method;
mod params;
mod path;
mod pattern;
mod pool;
mod registry;
mod tree;

/// Contains the core structs of the router.
///
/// Use the RouterBuilder to create a Router, then look requests up in it or
/// hand it to an [`HttpRouter`](crate::HttpRouter).
pub mod router;

#[cfg(feature = "http")]
mod http;
#[cfg(feature = "http")]
pub use http::*;

/// Various types and utilities for defining route handlers.
#[cfg(feature = "http")]
pub mod route;
#[cfg(feature = "http")]
pub use route::*;

pub use config::RouterConfig;
pub use error::{ConfigError, RouteError};
pub use method::Method;
pub use params::{Param, Params, MATCHED_ROUTE_PATH};
pub use path::clean_path;
pub use pool::ParamsPool;
pub use router::*;
