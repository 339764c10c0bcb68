use crate::{pattern::KeyPair, pool::ParamsPool};
use std::{fmt, mem, ops::Index, sync::Arc};

/// The key under which the matched pattern is stored, when the router is
/// configured to save it.
pub const MATCHED_ROUTE_PATH: &str = "$matchedRoutePath";

/// A single URL parameter, consisting of a key and a value.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Param {
	pub key: String,
	pub value: String,
}

impl Param {
	pub fn new(key: &str, value: &str) -> Param {
		Param {
			key: key.to_owned(),
			value: value.to_owned(),
		}
	}

	fn overwrite(&mut self, key: &str, value: &str) {
		self.key.clear();
		self.key.push_str(key);
		self.value.clear();
		self.value.push_str(value);
	}
}

/// The parameters extracted by a route match, in the order they are declared
/// in the pattern.
///
/// Parameters handed out by a [`Router`](crate::Router) borrow their buffer
/// from its pool; dropping them gives the buffer back.
pub struct Params {
	list: Vec<Param>,
	pool: Option<Arc<ParamsPool>>,
}

impl Params {
	pub fn new() -> Self {
		Params {
			list: Vec::new(),
			pool: None,
		}
	}

	pub(crate) fn pooled(list: Vec<Param>, pool: Arc<ParamsPool>) -> Self {
		Params {
			list,
			pool: Some(pool),
		}
	}

	/// Returns the value of the first parameter registered under the given
	/// key, or an empty string.
	pub fn by_name(&self, name: &str) -> &str {
		self.get(name).unwrap_or_default()
	}

	pub fn get(&self, name: &str) -> Option<&str> {
		self.list
			.iter()
			.find(|param| param.key == name)
			.map(|param| param.value.as_str())
	}

	/// The pattern that matched, if the router saves it.
	pub fn matched_route_path(&self) -> &str {
		self.by_name(MATCHED_ROUTE_PATH)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.list
			.iter()
			.map(|param| (param.key.as_str(), param.value.as_str()))
	}

	pub fn len(&self) -> usize {
		self.list.len()
	}

	pub fn is_empty(&self) -> bool {
		self.list.is_empty()
	}

	pub fn push(&mut self, key: &str, value: &str) {
		self.list.push(Param::new(key, value));
	}
}

impl Default for Params {
	fn default() -> Self {
		Self::new()
	}
}

impl Drop for Params {
	fn drop(&mut self) {
		if let Some(pool) = self.pool.take() {
			pool.release(mem::take(&mut self.list));
		}
	}
}

/// Clones are detached from the pool.
impl Clone for Params {
	fn clone(&self) -> Self {
		Params {
			list: self.list.clone(),
			pool: None,
		}
	}
}

impl PartialEq for Params {
	fn eq(&self, other: &Self) -> bool {
		self.list == other.list
	}
}

impl Eq for Params {}

impl fmt::Debug for Params {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_list().entries(self.iter()).finish()
	}
}

impl Index<usize> for Params {
	type Output = Param;

	fn index(&self, i: usize) -> &Self::Output {
		&self.list[i]
	}
}

impl<'a> FromIterator<(&'a str, &'a str)> for Params {
	fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
		let mut params = Params::new();
		for (key, value) in iter {
			params.push(key, value);
		}
		params
	}
}

// Finds the segment of `path.split('/')` at `depth` and its byte offset.
fn segment_at(path: &str, depth: usize) -> Option<(usize, &str)> {
	let mut start = 0;
	for (i, segment) in path.split('/').enumerate() {
		if i == depth {
			return Some((start, segment));
		}
		start += segment.len() + 1;
	}
	None
}

/// Writes the parameters described by `key_pairs` for `path` into the first
/// `key_pairs.len()` slots. Every one of those slots has both its key and its
/// value overwritten, whatever they held before.
///
/// The last key pair is special: when the path is too short to reach it its
/// value is empty, and when `wildcard` is set it captures the remainder of
/// the path, slashes included.
pub(crate) fn fill_params(path: &str, key_pairs: &[KeyPair], wildcard: bool, slots: &mut [Param]) {
	let last = key_pairs.len().saturating_sub(1);

	for (i, (pair, slot)) in key_pairs.iter().zip(slots.iter_mut()).enumerate() {
		let value = match segment_at(path, pair.depth) {
			None => "",
			Some((start, _)) if i == last && wildcard => &path[start..],
			Some((_, segment)) => segment,
		};
		slot.overwrite(&pair.name, value);
	}
}

/// Extracts parameters into a freshly allocated list.
#[cfg(test)]
pub(crate) fn resolve_params(path: &str, key_pairs: &[KeyPair], wildcard: bool) -> Params {
	let mut list = vec![Param::default(); key_pairs.len()];
	fill_params(path, key_pairs, wildcard, &mut list);
	Params { list, pool: None }
}
