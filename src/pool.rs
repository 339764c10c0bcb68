use crate::params::Param;
use std::sync::{Mutex, MutexGuard, PoisonError};

type Bucket = Mutex<Vec<Vec<Param>>>;

/// Reusable parameter buffers, one free list per arity.
///
/// Bucket `n - 1` holds buffers of length `n`. Buckets are added while routes
/// are registered and never afterwards; taking and returning buffers only
/// locks the bucket involved.
#[derive(Debug)]
pub struct ParamsPool {
	buckets: Vec<Bucket>,
	capacity: usize,
}

impl ParamsPool {
	pub fn new(capacity: usize) -> Self {
		Self {
			buckets: Vec::new(),
			capacity,
		}
	}

	/// Makes room for buffers of up to `arity` parameters.
	pub fn ensure(&mut self, arity: usize) {
		while self.buckets.len() < arity {
			self.buckets.push(Mutex::default());
		}
	}

	/// Takes a buffer of exactly `arity` slots. The slots hold whatever the
	/// previous user left in them.
	pub fn acquire(&self, arity: usize) -> Vec<Param> {
		if arity == 0 {
			return Vec::new();
		}

		self.bucket(arity)
			.and_then(|mut free| free.pop())
			.unwrap_or_else(|| vec![Param::default(); arity])
	}

	/// Returns a buffer for reuse. Buffers beyond the pool capacity, or of an
	/// arity the pool was never sized for, are dropped.
	pub fn release(&self, buffer: Vec<Param>) {
		if let Some(mut free) = self.bucket(buffer.len()) {
			if free.len() < self.capacity {
				free.push(buffer);
			}
		}
	}

	/// Number of buffers of the given arity waiting to be reused.
	pub fn idle(&self, arity: usize) -> usize {
		self.bucket(arity).map_or(0, |free| free.len())
	}

	fn bucket(&self, arity: usize) -> Option<MutexGuard<'_, Vec<Vec<Param>>>> {
		let bucket = self.buckets.get(arity.checked_sub(1)?)?;
		Some(bucket.lock().unwrap_or_else(PoisonError::into_inner))
	}
}

impl Default for ParamsPool {
	fn default() -> Self {
		Self::new(64)
	}
}
