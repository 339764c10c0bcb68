use crate::error::RouteError;
use std::{fmt, str::FromStr};

pub(crate) const METHOD_COUNT: usize = 7;

/// The HTTP methods a router keeps a routing tree for.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Method {
	Get,
	Post,
	Put,
	Delete,
	Head,
	Patch,
	Options,
}

impl Method {
	pub const ALL: [Method; METHOD_COUNT] = [
		Method::Get,
		Method::Post,
		Method::Put,
		Method::Delete,
		Method::Head,
		Method::Patch,
		Method::Options,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Delete => "DELETE",
			Method::Head => "HEAD",
			Method::Patch => "PATCH",
			Method::Options => "OPTIONS",
		}
	}

	pub(crate) fn index(self) -> usize {
		self as usize
	}
}

/// Parses a method name, ignoring case.
impl FromStr for Method {
	type Err = RouteError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Method::ALL
			.iter()
			.copied()
			.find(|method| method.as_str().eq_ignore_ascii_case(s))
			.ok_or_else(|| RouteError::UnsupportedMethod(s.to_owned()))
	}
}

impl fmt::Display for Method {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod test {
	use super::Method;
	use crate::error::RouteError;

	#[test]
	fn parses_any_case() {
		assert_eq!("get".parse::<Method>(), Ok(Method::Get));
		assert_eq!("Patch".parse::<Method>(), Ok(Method::Patch));
		assert_eq!("OPTIONS".parse::<Method>(), Ok(Method::Options));
	}

	#[test]
	fn rejects_unknown() {
		assert_eq!(
			"TRACE".parse::<Method>(),
			Err(RouteError::UnsupportedMethod("TRACE".into()))
		);
	}

	#[test]
	fn indexes_follow_table_order() {
		for (i, method) in Method::ALL.iter().enumerate() {
			assert_eq!(method.index(), i);
		}
	}
}
