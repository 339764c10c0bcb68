use thiserror::Error;

/// Represents errors that can occur when registering a route.
///
/// These are configuration mistakes: a router should not start serving with
/// a route table that produced one of them.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum RouteError {
	/// The pattern was an empty string.
	#[error("route pattern must not be empty")]
	EmptyPattern,

	/// The pattern did not start with `/`.
	#[error("route pattern must begin with '/': {0}")]
	MissingLeadingSlash(String),

	/// The pattern has more segments than the router allows.
	#[error("route {pattern} has {count} segments, the limit is {max}")]
	TooManySegments {
		pattern: String,
		count: usize,
		max: usize,
	},

	/// A `:` or `*` segment without a name.
	#[error("parameters must be registered with a name: {0}")]
	UnnamedParam(String),

	/// Wildcard parameters are only allowed as the final segment.
	#[error("wildcard parameters are only allowed at the end of a route: {0}")]
	InvalidWildcard(String),

	/// The pattern is ambiguous with a previously registered one.
	#[error("insertion of {pattern} conflicts with previously registered route {with}")]
	Conflict {
		/// The pattern being registered.
		pattern: String,
		/// The existing route that the insertion is conflicting with.
		with: String,
	},

	/// File server patterns must have a literal prefix and end in `/*filepath`.
	#[error("file server pattern must be a literal prefix ending in /*filepath: {0}")]
	InvalidFilePattern(String),

	/// The method is not one of the routable HTTP methods.
	#[error("unsupported HTTP method: {0}")]
	UnsupportedMethod(String),
}

impl RouteError {
	pub(crate) fn conflict(pattern: &str, with: &str) -> Self {
		RouteError::Conflict {
			pattern: pattern.to_owned(),
			with: with.to_owned(),
		}
	}
}

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("Parse error: {0}")]
	Parse(#[from] toml::de::Error),

	#[error("Invalid configuration: {0}")]
	Invalid(String),
}
