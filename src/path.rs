use std::borrow::Cow;

/// Returns the canonical form of a URL path.
///
/// The following rules are applied:
///	1. Replace multiple slashes with a single slash.
///	2. Eliminate each `.` path element.
///	3. Eliminate each `..` element along with the element that precedes it.
///	   A `..` at the root is dropped.
///	4. Remove the trailing slash.
///
/// The result is always rooted; an empty result becomes `/`. A path that is
/// already clean is returned without allocating.
pub fn clean_path(p: &str) -> Cow<'_, str> {
	if is_clean(p) {
		return Cow::Borrowed(p);
	}

	let mut kept: Vec<&str> = Vec::new();
	for segment in p.split('/') {
		match segment {
			"" | "." => {}
			".." => {
				kept.pop();
			}
			segment => kept.push(segment),
		}
	}

	if kept.is_empty() {
		return Cow::Borrowed("/");
	}

	let mut cleaned = String::with_capacity(p.len() + 1);
	for segment in kept {
		cleaned.push('/');
		cleaned.push_str(segment);
	}
	Cow::Owned(cleaned)
}

fn is_clean(p: &str) -> bool {
	if p == "/" {
		return true;
	}
	p.starts_with('/')
		&& p[1..]
			.split('/')
			.all(|segment| !matches!(segment, "" | "." | ".."))
}

/// Splits a cleaned path into its segments, leaving out the empty segment in
/// front of the leading slash.
pub(crate) fn split_segments(path: &str) -> Vec<&str> {
	path.split('/').filter(|segment| !segment.is_empty()).collect()
}

/// Segment-aligned prefix test: `/static` is a prefix of `/static/app.js` but
/// not of `/statics`. The root prefix matches everything.
pub(crate) fn has_prefix(path: &str, prefix: &str) -> bool {
	let prefix = prefix.trim_end_matches('/');
	if prefix.is_empty() {
		return true;
	}
	match path.strip_prefix(prefix) {
		Some(rest) => rest.is_empty() || rest.starts_with('/'),
		None => false,
	}
}

#[cfg(test)]
mod test {
	use super::*;

	// path, result
	fn clean_tests() -> Vec<(&'static str, &'static str)> {
		vec![
			// Already clean
			("/", "/"),
			("/abc", "/abc"),
			("/a/b/c", "/a/b/c"),
			// Trailing slash
			("/abc/", "/abc"),
			("/a/b/c/", "/a/b/c"),
			// missing root
			("", "/"),
			("a/", "/a"),
			("abc", "/abc"),
			("abc/def", "/abc/def"),
			("a/b/c", "/a/b/c"),
			// Remove doubled slash
			("//", "/"),
			("/abc//", "/abc"),
			("/abc//def//ghi", "/abc/def/ghi"),
			("//abc", "/abc"),
			("///abc", "/abc"),
			// Remove . elements
			(".", "/"),
			("./", "/"),
			("/abc/./def", "/abc/def"),
			("/./abc/def", "/abc/def"),
			("/abc/.", "/abc"),
			// Remove .. elements
			("..", "/"),
			("../../", "/"),
			("../../abc", "/abc"),
			("/abc/def/ghi/../jkl", "/abc/def/jkl"),
			("/abc/def/../ghi/../jkl", "/abc/jkl"),
			("/abc/def/..", "/abc"),
			("/abc/def/../..", "/"),
			("/abc/def/../../..", "/"),
			("/abc/def/../../../ghi/jkl/../../../mno", "/mno"),
			// Combinations
			("abc/./../def", "/def"),
			("abc//./../def", "/def"),
			("abc/../../././../def", "/def"),
			// Dots inside names are kept
			("/a.b/..c/.d", "/a.b/..c/.d"),
		]
	}

	#[test]
	fn test_path_clean() {
		for (input, expected) in clean_tests() {
			assert_eq!(clean_path(input), expected, "cleaning '{}'", input);
			assert_eq!(clean_path(expected), expected, "re-cleaning '{}'", expected);
		}
	}

	#[test]
	fn clean_paths_are_borrowed() {
		assert!(matches!(clean_path("/a/b/c"), Cow::Borrowed(_)));
		assert!(matches!(clean_path("/"), Cow::Borrowed(_)));
		assert!(matches!(clean_path("/a//b"), Cow::Owned(_)));
	}

	#[test]
	fn segments() {
		assert_eq!(split_segments("/"), Vec::<&str>::new());
		assert_eq!(split_segments("/a/b/c"), vec!["a", "b", "c"]);
	}

	#[test]
	fn prefixes() {
		assert!(has_prefix("/static/app.js", "/static"));
		assert!(has_prefix("/static", "/static"));
		assert!(!has_prefix("/statics", "/static"));
		assert!(!has_prefix("/other", "/static"));
		assert!(has_prefix("/anything", ""));
		assert!(has_prefix("/anything", "/"));
	}
}
