use crate::{
	error::RouteError,
	method::Method,
	params::Params,
	route::{Request, Response, Route},
	router::{Router, RouterBuilder},
};
use anyhow::Error;
use futures::FutureExt;
use hyper::{
	body::Body,
	header::{HeaderValue, ALLOW},
	http::uri::{PathAndQuery, Uri},
	service::Service,
	StatusCode,
};
use std::{
	any::Any,
	convert::Infallible,
	future::{ready, Future, Ready},
	panic::{self, AssertUnwindSafe},
	pin::Pin,
	sync::Arc,
	task::{Context, Poll},
};
use tracing::{error, trace, warn};

pub use hyper;

pub use hyper::http::response::Builder as ResponseBuilder;

type Dispatch = Pin<Box<dyn Future<Output = Result<hyper::Response<Body>, Infallible>> + Send>>;

fn with_status(status: StatusCode, body: Body) -> hyper::Response<Body> {
	let mut response = hyper::Response::new(body);
	*response.status_mut() = status;
	response
}

fn default_error_handler(e: Error) -> hyper::Response<Body> {
	error!(error = %e, "route handler failed");
	with_status(StatusCode::INTERNAL_SERVER_ERROR, e.to_string().into())
}

fn default_not_found_handler(_req: Request) -> hyper::Response<Body> {
	with_status(StatusCode::NOT_FOUND, Body::empty())
}

/// A function that can convert an error into a response.
pub type ErrorHandler = fn(e: Error) -> hyper::Response<Body>;

/// A function that answers a request no route accepted.
pub type FallbackHandler = fn(req: Request) -> hyper::Response<Body>;

/// A function that turns a panic raised by a route into a response. It gets
/// the method and path of the request that panicked.
pub type PanicHandler = fn(method: &hyper::Method, path: &str, payload: Box<dyn Any + Send>) -> hyper::Response<Body>;

#[derive(Clone, Copy)]
struct Hooks {
	internal_error: ErrorHandler,
	not_found: FallbackHandler,
	method_not_allowed: Option<FallbackHandler>,
	global_options: Option<FallbackHandler>,
	panic: Option<PanicHandler>,
}

impl Default for Hooks {
	fn default() -> Self {
		Self {
			internal_error: default_error_handler,
			not_found: default_not_found_handler,
			method_not_allowed: None,
			global_options: None,
			panic: None,
		}
	}
}

/// Serves a [`Router`] of [`Route`]s through hyper. Pass it to
/// `Server::serve` as the make-service.
#[derive(Clone)]
pub struct HttpRouter {
	router: Arc<Router<Route>>,
	hooks: Hooks,
}

impl From<Router<Route>> for HttpRouter {
	fn from(router: Router<Route>) -> Self {
		Self {
			router: Arc::new(router),
			hooks: Hooks::default(),
		}
	}
}

impl From<RouterBuilder<Route>> for HttpRouter {
	fn from(builder: RouterBuilder<Route>) -> Self {
		builder.build().into()
	}
}

impl HttpRouter {
	/// Handles errors returned by routes. The default answers 500 with the
	/// error text.
	pub fn internal_error_handler(mut self, handler: ErrorHandler) -> Self {
		self.hooks.internal_error = handler;
		self
	}

	/// Handles requests nothing matched. The default answers an empty 404.
	pub fn not_found_handler(mut self, handler: FallbackHandler) -> Self {
		self.hooks.not_found = handler;
		self
	}

	/// Builds the 405 response. The `Allow` header is set on whatever it
	/// returns.
	pub fn method_not_allowed_handler(mut self, handler: FallbackHandler) -> Self {
		self.hooks.method_not_allowed = Some(handler);
		self
	}

	/// Builds the response to automatic OPTIONS requests. The `Allow` header
	/// is set on whatever it returns.
	pub fn global_options_handler(mut self, handler: FallbackHandler) -> Self {
		self.hooks.global_options = Some(handler);
		self
	}

	/// Recovers panics raised by routes. Without one, a panic tears down the
	/// connection that was serving the request.
	pub fn panic_handler(mut self, handler: PanicHandler) -> Self {
		self.hooks.panic = Some(handler);
		self
	}

	pub fn router(&self) -> &Router<Route> {
		&self.router
	}

	/// A request service sharing this router.
	pub fn handler(&self) -> RouteHandler {
		RouteHandler {
			router: Arc::clone(&self.router),
			hooks: self.hooks,
		}
	}
}

impl<T> Service<T> for HttpRouter {
	type Response = RouteHandler;
	type Error = Infallible;
	type Future = Ready<Result<Self::Response, Self::Error>>;

	fn poll_ready(&mut self, _: &mut Context) -> Poll<Result<(), Self::Error>> {
		Poll::Ready(Ok(()))
	}

	fn call(&mut self, _: T) -> Self::Future {
		ready(Ok(self.handler()))
	}
}

fn table_method(method: &hyper::Method) -> Option<Method> {
	match *method {
		hyper::Method::GET => Some(Method::Get),
		hyper::Method::POST => Some(Method::Post),
		hyper::Method::PUT => Some(Method::Put),
		hyper::Method::DELETE => Some(Method::Delete),
		hyper::Method::HEAD => Some(Method::Head),
		hyper::Method::PATCH => Some(Method::Patch),
		hyper::Method::OPTIONS => Some(Method::Options),
		_ => None,
	}
}

fn set_allow(response: &mut hyper::Response<Body>, allowed: &[Method]) {
	let allow = allowed
		.iter()
		.map(|method| method.as_str())
		.collect::<Vec<_>>()
		.join(", ");
	if let Ok(value) = HeaderValue::from_str(&allow) {
		response.headers_mut().insert(ALLOW, value);
	}
}

/// Responsible for handling the actual HTTP requests from hyper.
#[derive(Clone)]
pub struct RouteHandler {
	router: Arc<Router<Route>>,
	hooks: Hooks,
}

impl RouteHandler {
	/// Routes one request and produces its response.
	pub fn dispatch(&self, req: Request) -> Dispatch {
		let method = table_method(req.method());
		let path = req.uri().path().to_owned();

		if let Some(matched) = method.and_then(|method| self.router.lookup(method, &path)) {
			return self.invoke(matched.value, req, matched.params);
		}

		let config = self.router.config();
		if method == Some(Method::Options) && config.handle_options {
			let allowed = self.router.allowed(&path, req.method().as_str());
			if !allowed.is_empty() {
				let mut response = match self.hooks.global_options {
					Some(handler) => handler(req),
					None => with_status(StatusCode::OK, Body::empty()),
				};
				set_allow(&mut response, &allowed);
				return Box::pin(async { Ok(response) });
			}
		} else if config.handle_method_not_allowed {
			let allowed = self.router.allowed(&path, req.method().as_str());
			if !allowed.is_empty() {
				let mut response = match self.hooks.method_not_allowed {
					Some(handler) => handler(req),
					None => with_status(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed".into()),
				};
				set_allow(&mut response, &allowed);
				return Box::pin(async { Ok(response) });
			}
		}

		trace!(method = %req.method(), path = %path, "no route matched");
		let response = (self.hooks.not_found)(req);
		Box::pin(async { Ok(response) })
	}

	fn invoke(&self, route: &Route, req: Request, params: Params) -> Dispatch {
		let internal_error = self.hooks.internal_error;
		let on_panic = match self.hooks.panic {
			Some(handler) => handler,
			None => {
				let fut = route(req, params);
				return Box::pin(async move { Ok(fut.await.unwrap_or_else(internal_error)) });
			}
		};

		let method = req.method().clone();
		let path = req.uri().path().to_owned();
		let fut = match panic::catch_unwind(AssertUnwindSafe(|| route(req, params))) {
			Ok(fut) => fut,
			Err(payload) => {
				warn!(method = %method, path = %path, "recovered panic in route");
				let response = on_panic(&method, &path, payload);
				return Box::pin(async { Ok(response) });
			}
		};

		Box::pin(async move {
			match AssertUnwindSafe(fut).catch_unwind().await {
				Ok(result) => Ok(result.unwrap_or_else(internal_error)),
				Err(payload) => {
					warn!(method = %method, path = %path, "recovered panic in route");
					Ok(on_panic(&method, &path, payload))
				}
			}
		})
	}
}

impl Service<Request> for RouteHandler {
	type Response = hyper::Response<Body>;
	type Error = Infallible;
	type Future = Dispatch;

	fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
		Poll::Ready(Ok(()))
	}

	fn call(&mut self, req: Request) -> Self::Future {
		self.dispatch(req)
	}
}

/// The read side of static file serving. Requests reach it with their path
/// rewritten to the file path below the served root, query kept.
pub trait FileSystem: Send + Sync + 'static {
	fn serve(&self, req: Request) -> Response;
}

fn rewrite_uri(uri: &Uri, filepath: &str) -> anyhow::Result<Uri> {
	let path_and_query = match uri.query() {
		Some(query) => format!("/{}?{}", filepath, query),
		None => format!("/{}", filepath),
	};

	let mut parts = uri.clone().into_parts();
	parts.path_and_query = Some(path_and_query.parse::<PathAndQuery>()?);
	Ok(Uri::from_parts(parts)?)
}

impl RouterBuilder<Route> {
	/// Serves the files of `fs` under the literal prefix of `pattern`, which
	/// must end in `/*filepath`.
	///
	/// ```rust,ignore
	/// builder.serve_files("/static/*filepath", Directory::new("public"))?;
	/// ```
	pub fn serve_files<F: FileSystem>(&mut self, pattern: &str, fs: F) -> Result<&mut Self, RouteError> {
		let fs = Arc::new(fs);
		let route: Route = Arc::new(move |mut req: Request, params: Params| -> Response {
			match rewrite_uri(req.uri(), params.by_name("filepath")) {
				Ok(uri) => *req.uri_mut() = uri,
				Err(e) => return Box::pin(async move { Err(e) }),
			}
			drop(params);
			fs.serve(req)
		});
		self.files(pattern, route)
	}
}

#[cfg(test)]
mod test {
	use super::rewrite_uri;
	use hyper::http::uri::Uri;

	#[test]
	fn rewrites_to_file_path() {
		let uri: Uri = "/static/css/app.css?v=3".parse().unwrap();
		assert_eq!(rewrite_uri(&uri, "css/app.css").unwrap(), "/css/app.css?v=3");

		let uri: Uri = "http://example.com/static".parse().unwrap();
		assert_eq!(rewrite_uri(&uri, "").unwrap(), "http://example.com/");
	}
}
