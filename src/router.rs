use crate::{
	config::RouterConfig,
	error::RouteError,
	method::{Method, METHOD_COUNT},
	params::{fill_params, Param, Params, MATCHED_ROUTE_PATH},
	path::{clean_path, has_prefix, split_segments},
	pattern::{is_param, resolve_key_pairs, validate},
	pool::ParamsPool,
	registry::Registry,
	tree::{Endpoint, Tree},
};
use std::sync::Arc;
use tracing::debug;

const FILE_PATH_SUFFIX: &str = "/*filepath";

type Trees<T> = [Option<Tree<T>>; METHOD_COUNT];

#[derive(Debug)]
struct FileRoot<T> {
	// lower-cased literal prefix, empty for the root
	prefix: String,
	endpoint: Endpoint,
	value: T,
}

/// A successful lookup.
#[derive(Debug)]
pub struct Match<'r, T> {
	/// The value registered for the route.
	pub value: &'r T,
	/// The parameters extracted from the path.
	pub params: Params,
	/// The pattern the route was registered with.
	pub pattern: &'r str,
}

/// Collects routes; [`build`](RouterBuilder::build) freezes them into a
/// [`Router`].
#[derive(Debug)]
pub struct RouterBuilder<T> {
	trees: Trees<T>,
	files: Vec<FileRoot<T>>,
	registry: Registry,
	pool: ParamsPool,
	config: RouterConfig,
}

impl<T> Default for RouterBuilder<T> {
	fn default() -> Self {
		Self::new(RouterConfig::default())
	}
}

impl<T> RouterBuilder<T> {
	pub fn new(config: RouterConfig) -> Self {
		Self {
			trees: Default::default(),
			files: Vec::new(),
			registry: Registry::default(),
			pool: ParamsPool::new(config.pool_capacity),
			config,
		}
	}

	/// Registers `value` for requests with the given method whose path matches
	/// `pattern`.
	///
	/// ```rust
	/// use switchyard::{Method, RouterBuilder};
	///
	/// # fn main() -> Result<(), switchyard::RouteError> {
	/// let mut builder = RouterBuilder::default();
	/// builder
	/// 	.register(Method::Get, "/users/:id", "user")?
	/// 	.register(Method::Get, "/files/*path", "file")?;
	///
	/// let router = builder.build();
	/// let matched = router.lookup(Method::Get, "/users/42").unwrap();
	/// assert_eq!(*matched.value, "user");
	/// assert_eq!(matched.params.by_name("id"), "42");
	/// # Ok(())
	/// # }
	/// ```
	pub fn register(&mut self, method: Method, pattern: &str, value: T) -> Result<&mut Self, RouteError> {
		let pattern = validate(pattern, self.config.max_segments)?;
		self.registry.check(method, &pattern)?;

		let tree = self.trees[method.index()].get_or_insert_with(Tree::new);
		let arity = tree.insert(&pattern, value)?;
		self.registry.record(method, &pattern);
		let extra = self.extra_slots();
		self.pool.ensure(arity + extra);

		debug!(method = %method, pattern = %pattern, params = arity, "registered route");
		Ok(self)
	}

	/// Like [`register`](RouterBuilder::register), with the method given by
	/// name.
	pub fn handle(&mut self, method: &str, pattern: &str, value: T) -> Result<&mut Self, RouteError> {
		self.register(method.parse()?, pattern, value)
	}

	/// Register a value for GET requests
	pub fn get(&mut self, pattern: &str, value: T) -> Result<&mut Self, RouteError> {
		self.register(Method::Get, pattern, value)
	}

	/// Register a value for POST requests
	pub fn post(&mut self, pattern: &str, value: T) -> Result<&mut Self, RouteError> {
		self.register(Method::Post, pattern, value)
	}

	/// Register a value for PUT requests
	pub fn put(&mut self, pattern: &str, value: T) -> Result<&mut Self, RouteError> {
		self.register(Method::Put, pattern, value)
	}

	/// Register a value for DELETE requests
	pub fn delete(&mut self, pattern: &str, value: T) -> Result<&mut Self, RouteError> {
		self.register(Method::Delete, pattern, value)
	}

	/// Register a value for HEAD requests
	pub fn head(&mut self, pattern: &str, value: T) -> Result<&mut Self, RouteError> {
		self.register(Method::Head, pattern, value)
	}

	/// Register a value for PATCH requests
	pub fn patch(&mut self, pattern: &str, value: T) -> Result<&mut Self, RouteError> {
		self.register(Method::Patch, pattern, value)
	}

	/// Register a value for OPTIONS requests
	pub fn options(&mut self, pattern: &str, value: T) -> Result<&mut Self, RouteError> {
		self.register(Method::Options, pattern, value)
	}

	/// Registers a file root: GET requests under the literal prefix of
	/// `pattern`, which must end in `/*filepath`, go to `value` before any
	/// other GET route is considered. The rest of the path is passed as the
	/// `filepath` parameter.
	pub fn files(&mut self, pattern: &str, value: T) -> Result<&mut Self, RouteError> {
		let pattern = validate(pattern, self.config.max_segments)?;
		let prefix = pattern
			.strip_suffix(FILE_PATH_SUFFIX)
			.filter(|prefix| !prefix.split('/').any(is_param))
			.ok_or_else(|| RouteError::InvalidFilePattern(pattern.to_string()))?
			.to_lowercase();

		self.registry.check_files(&prefix, &pattern)?;
		self.registry.record_files(&prefix, &pattern);
		let extra = self.extra_slots();
		self.pool.ensure(1 + extra);

		debug!(pattern = %pattern, "registered file root");
		self.files.push(FileRoot {
			prefix,
			endpoint: Endpoint {
				key_pairs: resolve_key_pairs(&pattern),
				pattern: pattern.into_owned(),
				wildcard: true,
			},
			value,
		});
		// most specific root first
		self.files
			.sort_by(|a, b| b.endpoint.pattern.cmp(&a.endpoint.pattern));
		Ok(self)
	}

	fn extra_slots(&self) -> usize {
		usize::from(self.config.save_matched_route_path)
	}

	pub fn build(self) -> Router<T> {
		let methods = self.trees.iter().flatten().count();
		debug!(methods, file_roots = self.files.len(), "router built");

		Router {
			trees: self.trees,
			files: self.files,
			pool: Arc::new(self.pool),
			config: self.config,
		}
	}
}

/// An immutable routing table. Lookups take `&self` and may run from any
/// number of threads at once.
#[derive(Debug)]
pub struct Router<T> {
	trees: Trees<T>,
	files: Vec<FileRoot<T>>,
	pool: Arc<ParamsPool>,
	config: RouterConfig,
}

impl<T> Router<T> {
	pub fn builder() -> RouterBuilder<T> {
		RouterBuilder::default()
	}

	pub fn config(&self) -> &RouterConfig {
		&self.config
	}

	/// Finds the route for a method and path. For GET, file roots are tried
	/// before the routing tree.
	///
	/// The returned parameters hold a buffer from the router's pool until they
	/// are dropped.
	pub fn lookup(&self, method: Method, path: &str) -> Option<Match<'_, T>> {
		let path = clean_path(path);
		let lowered = path.to_lowercase();
		let (value, endpoint) = self.find(method, &lowered)?;

		Some(Match {
			value,
			params: self.params(&path, endpoint),
			pattern: &endpoint.pattern,
		})
	}

	fn find(&self, method: Method, lowered: &str) -> Option<(&T, &Endpoint)> {
		if method == Method::Get {
			let root = self.files.iter().find(|root| has_prefix(lowered, &root.prefix));
			if let Some(root) = root {
				return Some((&root.value, &root.endpoint));
			}
		}

		let tree = self.trees[method.index()].as_ref()?;
		tree.find(&split_segments(lowered))
	}

	fn params(&self, path: &str, endpoint: &Endpoint) -> Params {
		let saved = self.config.save_matched_route_path;
		let arity = endpoint.key_pairs.len() + usize::from(saved);
		if arity == 0 {
			return Params::new();
		}

		let mut buffer = self.pool.acquire(arity);
		fill_params(path, &endpoint.key_pairs, endpoint.wildcard, &mut buffer);
		if saved {
			if let Some(slot) = buffer.last_mut() {
				*slot = Param::new(MATCHED_ROUTE_PATH, &endpoint.pattern);
			}
		}
		Params::pooled(buffer, Arc::clone(&self.pool))
	}

	/// Lists the methods other than `requested` that have a route for `path`.
	/// The path `*` lists every method with at least one route. A non-empty
	/// list ends with OPTIONS when OPTIONS requests are answered automatically.
	pub fn allowed(&self, path: &str, requested: &str) -> Vec<Method> {
		let any = path == "*";
		let lowered = clean_path(path).to_lowercase();
		let mut allowed = Vec::new();

		for method in Method::ALL {
			if method == Method::Options || method.as_str() == requested {
				continue;
			}

			let routable = if any {
				self.has_routes(method)
			} else {
				self.find(method, &lowered).is_some()
			};
			if routable {
				allowed.push(method);
			}
		}

		if !allowed.is_empty()
			&& (self.config.handle_options || self.find(Method::Options, &lowered).is_some())
		{
			allowed.push(Method::Options);
		}
		allowed
	}

	fn has_routes(&self, method: Method) -> bool {
		self.trees[method.index()].is_some() || (method == Method::Get && !self.files.is_empty())
	}

	/// Number of parameter buffers of the given arity waiting for reuse.
	pub fn idle_params(&self, arity: usize) -> usize {
		self.pool.idle(arity)
	}
}

#[cfg(test)]
mod test {
	use super::{Router, RouterBuilder};
	use crate::{config::RouterConfig, error::RouteError, method::Method, params::MATCHED_ROUTE_PATH};

	fn router(routes: &[(Method, &'static str)]) -> Router<&'static str> {
		let mut builder = RouterBuilder::default();
		for (method, pattern) in routes {
			builder.register(*method, pattern, *pattern).unwrap();
		}
		builder.build()
	}

	#[test]
	fn adds_routes() {
		let router = router(&[
			(Method::Get, "/"),
			(Method::Post, "/:id"),
			(Method::Put, "/:id/foo/bar"),
		]);

		assert_eq!(*router.lookup(Method::Get, "/").unwrap().value, "/");
		assert_eq!(*router.lookup(Method::Post, "/abc").unwrap().value, "/:id");
		assert_eq!(
			router.lookup(Method::Put, "/abc/foo/bar").unwrap().params.by_name("id"),
			"abc"
		);
		assert!(router.lookup(Method::Get, "/abc").is_none());
		assert!(router.lookup(Method::Delete, "/").is_none());
	}

	#[test]
	fn handle_parses_method() {
		let mut builder = RouterBuilder::default();
		builder.handle("patch", "/a", "a").unwrap();
		assert_eq!(
			builder.handle("BREW", "/a", "a").err(),
			Some(RouteError::UnsupportedMethod("BREW".into()))
		);

		let router = builder.build();
		assert!(router.lookup(Method::Patch, "/a").is_some());
	}

	#[test]
	fn lookup_cleans_and_folds_case() {
		let router = router(&[(Method::Get, "/Users/:name")]);

		let matched = router.lookup(Method::Get, "//users/./Alice/").unwrap();
		assert_eq!(matched.pattern, "/Users/:name");
		assert_eq!(matched.params.by_name("name"), "Alice");
	}

	#[test]
	fn matched_route_path() {
		let config = RouterConfig {
			save_matched_route_path: true,
			..RouterConfig::default()
		};
		let mut builder = RouterBuilder::new(config);
		builder.get("/a/:b", "ab").unwrap();
		builder.get("/plain", "plain").unwrap();
		let router = builder.build();

		let matched = router.lookup(Method::Get, "/a/1").unwrap();
		assert_eq!(matched.params.matched_route_path(), "/a/:b");
		assert_eq!(matched.params.by_name("b"), "1");
		assert_eq!(matched.params.len(), 2);

		let matched = router.lookup(Method::Get, "/plain").unwrap();
		assert_eq!(matched.params.by_name(MATCHED_ROUTE_PATH), "/plain");
	}

	#[test]
	fn params_return_to_pool() {
		let router = router(&[(Method::Get, "/a/:b/:c")]);
		assert_eq!(router.idle_params(2), 0);

		let matched = router.lookup(Method::Get, "/a/1/2").unwrap();
		assert_eq!(router.idle_params(2), 0);
		drop(matched);
		assert_eq!(router.idle_params(2), 1);

		let matched = router.lookup(Method::Get, "/a/3/4").unwrap();
		assert_eq!(router.idle_params(2), 0);
		assert_eq!(matched.params.by_name("b"), "3");
		assert_eq!(matched.params.by_name("c"), "4");
	}

	#[test]
	fn file_roots() {
		let mut builder = RouterBuilder::default();
		builder.files("/static/*filepath", "static").unwrap();
		builder.files("/assets/img/*filepath", "img").unwrap();
		builder.get("/:page", "page").unwrap();
		let router = builder.build();

		let matched = router.lookup(Method::Get, "/static/css/site.css").unwrap();
		assert_eq!(*matched.value, "static");
		assert_eq!(matched.params.by_name("filepath"), "css/site.css");

		let matched = router.lookup(Method::Get, "/assets/img/logo.png").unwrap();
		assert_eq!(*matched.value, "img");
		assert_eq!(matched.params.by_name("filepath"), "logo.png");

		let matched = router.lookup(Method::Get, "/static").unwrap();
		assert_eq!(matched.params.by_name("filepath"), "");

		assert_eq!(*router.lookup(Method::Get, "/statics").unwrap().value, "page");
		assert!(router.lookup(Method::Post, "/static/x").is_none());
	}

	#[test]
	fn invalid_file_patterns() {
		let mut builder = RouterBuilder::default();
		for pattern in ["/static/*path", "/static", "/:dir/*filepath"] {
			assert_eq!(
				builder.files(pattern, "x").err(),
				Some(RouteError::InvalidFilePattern(pattern.into()))
			);
		}
	}

	#[test]
	fn allowed_methods() {
		let router = router(&[
			(Method::Get, "/products"),
			(Method::Post, "/products"),
			(Method::Delete, "/products/:id"),
		]);

		assert_eq!(
			router.allowed("/products", "PUT"),
			vec![Method::Get, Method::Post, Method::Options]
		);
		assert_eq!(router.allowed("/products", "GET"), vec![Method::Post, Method::Options]);
		assert_eq!(router.allowed("/products/1", "GET"), vec![Method::Delete, Method::Options]);
		assert!(router.allowed("/nothing", "GET").is_empty());
		assert_eq!(
			router.allowed("*", "OPTIONS"),
			vec![Method::Get, Method::Post, Method::Delete, Method::Options]
		);
	}

	#[test]
	fn allowed_without_auto_options() {
		let config = RouterConfig {
			handle_options: false,
			..RouterConfig::default()
		};
		let mut builder = RouterBuilder::new(config);
		builder.get("/a", "a").unwrap();
		let router = builder.build();

		assert_eq!(router.allowed("/a", "POST"), vec![Method::Get]);
	}
}
