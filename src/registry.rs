use crate::{
	error::RouteError,
	method::{Method, METHOD_COUNT},
	path::has_prefix,
	pattern::{is_wildcard, Normalizer},
};
use std::collections::HashMap;

/// Registration-time bookkeeping used to reject ambiguous routes. Lookups
/// never consult it.
#[derive(Debug, Default)]
pub(crate) struct Registry {
	normalizer: Normalizer,
	patterns: [HashMap<String, String>; METHOD_COUNT],
	file_roots: Vec<(String, String)>,
}

// A trailing-wildcard pattern also claims the pattern without its wildcard.
fn forms(pattern: &str) -> impl Iterator<Item = &str> {
	let parent = match pattern.rsplit_once('/') {
		Some((parent, last)) if is_wildcard(last) => Some(if parent.is_empty() { "/" } else { parent }),
		_ => None,
	};
	std::iter::once(pattern).chain(parent)
}

impl Registry {
	pub(crate) fn check(&self, method: Method, pattern: &str) -> Result<(), RouteError> {
		let registered = &self.patterns[method.index()];
		for form in forms(pattern) {
			if let Some(existing) = registered.get(&self.normalizer.unify(form)) {
				return Err(RouteError::conflict(pattern, existing));
			}
		}

		if method == Method::Get {
			let lowered = pattern.to_lowercase();
			if let Some((_, root)) = self.file_roots.iter().find(|(prefix, _)| has_prefix(&lowered, prefix)) {
				return Err(RouteError::conflict(pattern, root));
			}
		}

		Ok(())
	}

	pub(crate) fn record(&mut self, method: Method, pattern: &str) {
		let registered = &mut self.patterns[method.index()];
		for form in forms(pattern) {
			registered.insert(self.normalizer.unify(form), pattern.to_owned());
		}
	}

	/// A file root conflicts with any other root it overlaps, and with any GET
	/// route it would shadow.
	pub(crate) fn check_files(&self, prefix: &str, pattern: &str) -> Result<(), RouteError> {
		let overlapping = self
			.file_roots
			.iter()
			.find(|(other, _)| has_prefix(prefix, other) || has_prefix(other, prefix));
		if let Some((_, root)) = overlapping {
			return Err(RouteError::conflict(pattern, root));
		}

		let shadowed = self.patterns[Method::Get.index()]
			.values()
			.find(|existing| has_prefix(&existing.to_lowercase(), prefix));
		if let Some(existing) = shadowed {
			return Err(RouteError::conflict(pattern, existing));
		}

		Ok(())
	}

	pub(crate) fn record_files(&mut self, prefix: &str, pattern: &str) {
		self.file_roots.push((prefix.to_owned(), pattern.to_owned()));
	}
}
