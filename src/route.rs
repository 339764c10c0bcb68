use crate::params::Params;
use anyhow::Result;
use futures::future::poll_fn;
use hyper::service::Service;
use std::{future::Future, pin::Pin, sync::Arc};

pub use hyper::Body;

pub type Request = hyper::Request<Body>;
pub type Response = Pin<Box<dyn Future<Output = Result<hyper::Response<Body>>> + Send>>;

/// A request handler stored in the router. It receives the request together
/// with the parameters extracted from its path.
pub type Route = Arc<dyn Fn(Request, Params) -> Response + Send + Sync>;

/// Wraps an async function as a [`Route`].
///
/// ```rust
/// use switchyard::{route, Body, Params, Request, ResponseBuilder, RouterBuilder};
///
/// async fn hello(_req: Request, params: Params) -> anyhow::Result<hyper::Response<Body>> {
/// 	let body = format!("hello, {}", params.by_name("name"));
/// 	Ok(ResponseBuilder::default().body(body.into())?)
/// }
///
/// let mut builder = RouterBuilder::default();
/// builder.get("/hello/:name", route(hello)).unwrap();
/// ```
pub fn route<F, Fut>(handler: F) -> Route
where
	F: Fn(Request, Params) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = Result<hyper::Response<Body>>> + Send + 'static,
{
	Arc::new(move |req: Request, params: Params| -> Response { Box::pin(handler(req, params)) })
}

/// Wraps a hyper service as a [`Route`]. The service is cloned for every
/// request and never sees the path parameters.
pub fn service<S>(svc: S) -> Route
where
	S: Service<Request, Response = hyper::Response<Body>> + Clone + Send + Sync + 'static,
	S::Error: std::error::Error + Send + Sync + 'static,
	S::Future: Send,
{
	Arc::new(move |req: Request, _: Params| -> Response {
		let mut svc = svc.clone();
		Box::pin(async move {
			poll_fn(|cx| svc.poll_ready(cx)).await?;
			Ok(svc.call(req).await?)
		})
	})
}
