use crate::{
	error::RouteError,
	path::split_segments,
	pattern::{is_wildcard, resolve_key_pairs, KeyPair},
};
use std::{cmp, collections::BTreeMap};

type NodeId = usize;

const ROOT: NodeId = 0;

// Below this many siblings a linear scan beats binary search.
const LINEAR_SCAN_LIMIT: usize = 8;

#[derive(Clone, Debug, Eq, PartialEq)]
enum Kind {
	Root,
	Static(String),
	Param(String),
	CatchAll(String),
}

impl Kind {
	fn of(segment: &str) -> Kind {
		match segment.as_bytes().first() {
			Some(b':') => Kind::Param(segment[1..].to_owned()),
			Some(b'*') => Kind::CatchAll(segment[1..].to_owned()),
			_ => Kind::Static(segment.to_owned()),
		}
	}

	fn text(&self) -> &str {
		match self {
			Kind::Static(text) => text,
			_ => "",
		}
	}
}

/// What a route needs at lookup time to rebuild its parameters.
#[derive(Clone, Debug)]
pub(crate) struct Endpoint {
	pub(crate) pattern: String,
	pub(crate) key_pairs: Vec<KeyPair>,
	pub(crate) wildcard: bool,
}

#[derive(Clone, Debug)]
struct Terminal {
	value: usize,
	endpoint: Endpoint,
}

/// One segment of one routing tree. Children are bucketed by how many
/// segments remain in the path when they are reached, so a path only ever
/// descends into routes of its own length.
#[derive(Clone, Debug)]
struct Node {
	kind: Kind,
	// the pattern that created this node, for conflict messages
	origin: String,
	terminal: Option<Terminal>,
	// sorted by literal text
	exact: BTreeMap<usize, Vec<NodeId>>,
	// at most one parameter or wildcard child per remaining depth
	dynamic: BTreeMap<usize, NodeId>,
}

impl Node {
	fn new(kind: Kind, origin: &str) -> Self {
		Node {
			kind,
			origin: origin.to_owned(),
			terminal: None,
			exact: BTreeMap::new(),
			dynamic: BTreeMap::new(),
		}
	}
}

/// The routing tree of a single method. Nodes are kept in one arena and refer
/// to each other by index; handler values are kept on the side so a wildcard
/// route can end at two nodes.
#[derive(Clone, Debug)]
pub(crate) struct Tree<T> {
	nodes: Vec<Node>,
	values: Vec<T>,
	wildcard: bool,
	max_depth: usize,
}

impl<T> Tree<T> {
	pub(crate) fn new() -> Self {
		Tree {
			nodes: vec![Node::new(Kind::Root, "/")],
			values: Vec::new(),
			wildcard: false,
			max_depth: 0,
		}
	}

	/// Inserts a cleaned and validated pattern, returning how many parameters
	/// it declares. On error the tree is left untouched.
	///
	/// A pattern ending in a wildcard also ends at the node of the pattern
	/// without its wildcard, so `/files/*path` matches `/files` too.
	pub(crate) fn insert(&mut self, pattern: &str, value: T) -> Result<usize, RouteError> {
		let lowered = pattern.to_lowercase();
		let segments = split_segments(&lowered);
		let wildcard = segments.last().map_or(false, |last| is_wildcard(last));
		let parent = if wildcard {
			Some(&segments[..segments.len() - 1])
		} else {
			None
		};

		if let Some(parent) = parent {
			self.probe(parent, pattern)?;
		}
		self.probe(&segments, pattern)?;

		let endpoint = Endpoint {
			pattern: pattern.to_owned(),
			key_pairs: resolve_key_pairs(pattern),
			wildcard,
		};
		let arity = endpoint.key_pairs.len();

		let index = self.values.len();
		self.values.push(value);

		if let Some(parent) = parent {
			let id = self.extend(parent, pattern);
			self.nodes[id].terminal = Some(Terminal {
				value: index,
				endpoint: endpoint.clone(),
			});
		}
		let id = self.extend(&segments, pattern);
		self.nodes[id].terminal = Some(Terminal {
			value: index,
			endpoint,
		});

		self.wildcard |= wildcard;
		self.max_depth = cmp::max(self.max_depth, segments.len());
		Ok(arity)
	}

	// Walks the existing nodes a pattern would use and reports the first
	// conflict, without creating anything.
	fn probe(&self, segments: &[&str], pattern: &str) -> Result<(), RouteError> {
		let mut current = ROOT;

		for (i, segment) in segments.iter().enumerate() {
			let remaining = segments.len() - i;
			let node = &self.nodes[current];

			let next = match Kind::of(segment) {
				Kind::Static(_) => node
					.exact
					.get(&remaining)
					.and_then(|bucket| self.find_child(bucket, segment)),
				kind => match node.dynamic.get(&remaining) {
					Some(&child) if self.nodes[child].kind != kind => {
						return Err(RouteError::conflict(pattern, &self.nodes[child].origin));
					}
					child => child.copied(),
				},
			};

			match next {
				Some(child) => current = child,
				// nothing below a new node can conflict
				None => return Ok(()),
			}
		}

		match &self.nodes[current].terminal {
			Some(terminal) => Err(RouteError::conflict(pattern, &terminal.endpoint.pattern)),
			None => Ok(()),
		}
	}

	// Creates the nodes of an already probed pattern and returns the last one.
	fn extend(&mut self, segments: &[&str], pattern: &str) -> NodeId {
		let mut current = ROOT;

		for (i, segment) in segments.iter().enumerate() {
			let remaining = segments.len() - i;
			current = match Kind::of(segment) {
				Kind::Static(text) => self.static_child(current, remaining, text, pattern),
				kind => self.dynamic_child(current, remaining, kind, pattern),
			};
		}

		current
	}

	fn static_child(&mut self, parent: NodeId, remaining: usize, text: String, pattern: &str) -> NodeId {
		let position = match self.nodes[parent].exact.get(&remaining) {
			Some(bucket) => bucket.binary_search_by(|&id| self.nodes[id].kind.text().cmp(text.as_str())),
			None => Err(0),
		};

		match position {
			Ok(i) => self.nodes[parent].exact[&remaining][i],
			Err(i) => {
				let id = self.push(Node::new(Kind::Static(text), pattern));
				self.nodes[parent].exact.entry(remaining).or_default().insert(i, id);
				id
			}
		}
	}

	fn dynamic_child(&mut self, parent: NodeId, remaining: usize, kind: Kind, pattern: &str) -> NodeId {
		if let Some(&id) = self.nodes[parent].dynamic.get(&remaining) {
			return id;
		}

		let id = self.push(Node::new(kind, pattern));
		self.nodes[parent].dynamic.insert(remaining, id);
		id
	}

	fn push(&mut self, node: Node) -> NodeId {
		self.nodes.push(node);
		self.nodes.len() - 1
	}

	fn find_child(&self, bucket: &[NodeId], segment: &str) -> Option<NodeId> {
		if bucket.len() < LINEAR_SCAN_LIMIT {
			return bucket
				.iter()
				.copied()
				.find(|&id| self.nodes[id].kind.text() == segment);
		}

		bucket
			.binary_search_by(|&id| self.nodes[id].kind.text().cmp(segment))
			.ok()
			.map(|i| bucket[i])
	}

	/// Finds the route for the lower-cased segments of a cleaned path.
	///
	/// When the tree holds a wildcard route and no route has exactly this many
	/// segments, shorter and shorter prefixes of the path are tried, accepting
	/// only wildcard routes. This is an approximation of suffix matching: the
	/// deepest prefix that reaches a wildcard wins, which is not necessarily
	/// the most specific route.
	pub(crate) fn find(&self, segments: &[&str]) -> Option<(&T, &Endpoint)> {
		let terminal = self
			.walk(ROOT, segments, false)
			.or_else(|| self.fallback(segments))?;
		Some((&self.values[terminal.value], &terminal.endpoint))
	}

	fn fallback(&self, segments: &[&str]) -> Option<&Terminal> {
		if !self.wildcard || segments.is_empty() {
			return None;
		}

		let longest = cmp::min(segments.len() - 1, self.max_depth);
		let found = (0..=longest)
			.rev()
			.find_map(|len| self.walk(ROOT, &segments[..len], true));
		if let Some(terminal) = found {
			tracing::trace!(pattern = %terminal.endpoint.pattern, "matched through wildcard fallback");
		}
		found
	}

	// Exact children are tried before the parameter or wildcard child of the
	// same depth; a failed exact subtree falls back to the dynamic child.
	fn walk(&self, id: NodeId, segments: &[&str], wildcard_only: bool) -> Option<&Terminal> {
		let node = &self.nodes[id];

		let (first, rest) = match segments.split_first() {
			Some(split) => split,
			None => {
				return node
					.terminal
					.as_ref()
					.filter(|terminal| !wildcard_only || terminal.endpoint.wildcard)
			}
		};
		let remaining = segments.len();

		node.exact
			.get(&remaining)
			.and_then(|bucket| self.find_child(bucket, first))
			.and_then(|child| self.walk(child, rest, wildcard_only))
			.or_else(|| {
				node.dynamic
					.get(&remaining)
					.and_then(|&child| self.walk(child, rest, wildcard_only))
			})
	}
}
