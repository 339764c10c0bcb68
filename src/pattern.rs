use crate::{error::RouteError, path::clean_path};
use std::{borrow::Cow, iter};

const PLACEHOLDER_PREFIX: &str = "__placeholder__";

/// The position of a parameter in a pattern, as an index into
/// `pattern.split('/')`. Index 0 is the empty segment before the leading
/// slash, so the first real segment has depth 1.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct KeyPair {
	pub(crate) depth: usize,
	pub(crate) name: String,
}

impl KeyPair {
	#[cfg(test)]
	pub(crate) fn new(depth: usize, name: &str) -> Self {
		KeyPair {
			depth,
			name: name.to_owned(),
		}
	}
}

pub(crate) fn is_param(segment: &str) -> bool {
	segment.starts_with(':') || segment.starts_with('*')
}

pub(crate) fn is_wildcard(segment: &str) -> bool {
	segment.starts_with('*')
}

/// Collects the `(depth, name)` of every `:name` and `*name` segment, in
/// declaration order.
pub(crate) fn resolve_key_pairs(pattern: &str) -> Vec<KeyPair> {
	pattern
		.split('/')
		.enumerate()
		.filter(|(_, segment)| is_param(segment))
		.map(|(depth, segment)| KeyPair {
			depth,
			name: segment[1..].to_owned(),
		})
		.collect()
}

/// Rewrites patterns so that two patterns with the same shape compare equal,
/// whatever their parameters are called.
#[derive(Clone, Debug)]
pub(crate) struct Normalizer {
	placeholder: String,
}

impl Normalizer {
	pub(crate) fn new() -> Self {
		let suffix: String = iter::repeat_with(fastrand::lowercase).take(4).collect();
		Normalizer {
			placeholder: format!("{}{}", PLACEHOLDER_PREFIX, suffix),
		}
	}

	#[cfg(test)]
	pub(crate) fn placeholder(&self) -> &str {
		&self.placeholder
	}

	/// `/a/:name/c` and `/A/:user/c` both become `/a/<placeholder>/c`.
	pub(crate) fn unify(&self, pattern: &str) -> String {
		pattern
			.to_lowercase()
			.split('/')
			.map(|segment| {
				if is_param(segment) {
					self.placeholder.as_str()
				} else {
					segment
				}
			})
			.collect::<Vec<_>>()
			.join("/")
	}
}

impl Default for Normalizer {
	fn default() -> Self {
		Self::new()
	}
}

/// Checks a pattern against the registration rules and returns its cleaned
/// form.
pub(crate) fn validate(pattern: &str, max_segments: usize) -> Result<Cow<'_, str>, RouteError> {
	if pattern.is_empty() {
		return Err(RouteError::EmptyPattern);
	}
	if !pattern.starts_with('/') {
		return Err(RouteError::MissingLeadingSlash(pattern.to_owned()));
	}

	let cleaned = clean_path(pattern);
	let segments: Vec<&str> = cleaned.split('/').skip(1).filter(|s| !s.is_empty()).collect();

	if segments.len() > max_segments {
		return Err(RouteError::TooManySegments {
			pattern: pattern.to_owned(),
			count: segments.len(),
			max: max_segments,
		});
	}

	let last = segments.len().saturating_sub(1);
	for (i, segment) in segments.iter().enumerate() {
		if is_param(segment) && segment.len() == 1 {
			return Err(RouteError::UnnamedParam(pattern.to_owned()));
		}
		if is_wildcard(segment) && i != last {
			return Err(RouteError::InvalidWildcard(pattern.to_owned()));
		}
	}

	Ok(cleaned)
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn key_pairs() {
		assert_eq!(resolve_key_pairs("/a/b/c/d"), Vec::<KeyPair>::new());
		assert_eq!(
			resolve_key_pairs("/a/:name/c/:id"),
			vec![KeyPair::new(2, "name"), KeyPair::new(4, "id")]
		);
		assert_eq!(
			resolve_key_pairs("/a/b/:user/*id"),
			vec![KeyPair::new(3, "user"), KeyPair::new(4, "id")]
		);
	}

	#[test]
	fn key_pairs_keep_case() {
		assert_eq!(resolve_key_pairs("/users/:userId"), vec![KeyPair::new(2, "userId")]);
	}

	#[test]
	fn unify() {
		let normalizer = Normalizer::new();
		let placeholder = normalizer.placeholder().to_owned();

		assert_eq!(normalizer.unify("/a/b/c"), "/a/b/c");
		assert_eq!(normalizer.unify("/A/B/c"), "/a/b/c");
		assert_eq!(normalizer.unify("/a/:name/c"), format!("/a/{}/c", placeholder));
		assert_eq!(normalizer.unify("/a/:user/c"), normalizer.unify("/a/:name/c"));
		assert_eq!(normalizer.unify("/files/*path"), normalizer.unify("/files/*filepath"));
		assert_eq!(normalizer.unify("/files/*path"), normalizer.unify("/files/:path"));
	}

	#[test]
	fn placeholder_shape() {
		let normalizer = Normalizer::new();
		let suffix = normalizer
			.placeholder()
			.strip_prefix(PLACEHOLDER_PREFIX)
			.unwrap();
		assert_eq!(suffix.len(), 4);
		assert!(suffix.chars().all(|c| c.is_ascii_lowercase()));
	}

	#[test]
	fn validation() {
		assert_eq!(validate("", 16), Err(RouteError::EmptyPattern));
		assert_eq!(
			validate("a/b", 16),
			Err(RouteError::MissingLeadingSlash("a/b".into()))
		);
		assert_eq!(
			validate("/a/*x/b", 16),
			Err(RouteError::InvalidWildcard("/a/*x/b".into()))
		);
		assert_eq!(
			validate("/a/:/b", 16),
			Err(RouteError::UnnamedParam("/a/:/b".into()))
		);
		assert_eq!(
			validate("/a/b/c", 2),
			Err(RouteError::TooManySegments {
				pattern: "/a/b/c".into(),
				count: 3,
				max: 2,
			})
		);
		assert_eq!(validate("/a//b/", 16).unwrap(), "/a/b");
		assert_eq!(validate("/", 16).unwrap(), "/");
		assert_eq!(validate("/a/:b/*c", 16).unwrap(), "/a/:b/*c");
	}
}
