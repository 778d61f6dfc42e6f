use std::io;

use bytes::BytesMut;

use super::Source;
use crate::error::{Error, Result};

/**
# Block-read source

One fixed-capacity slab, allocated once and refilled from a sequential
[`io::Read`] channel. [`consume`](Source::consume) compacts the unconsumed
tail to the front of the slab so that an element straddling two physical
reads stays representable without copying more than that tail; every
compaction and every successful read advances the generation.

The capacity must be at least as large as the longest element in the input,
and should be much larger: the bigger the slab, the fewer read calls. The
channel is taken by value; pass `&mut reader` (or `&File`) to keep ownership
on the caller side. Dropping the source releases the slab only, never the
channel.
*/
pub struct BlockSource<R> {
	rd: R,
	buf: BytesMut,
	len: usize,
	generation: u64,
	eof: bool,
}

impl<R: io::Read> BlockSource<R> {
	/// Default slab capacity (10 MiB).
	pub const DEFAULT_CAPACITY: usize = 10 * 1024 * 1024;

	/// Create a block source with the given slab capacity.
	///
	/// Fails with [`Error::InvalidArgument`] if `capacity` is zero.
	pub fn new(rd: R, capacity: usize) -> Result<BlockSource<R>> {
		if capacity == 0 {
			return Err(Error::InvalidArgument("block capacity must be non-zero"));
		}
		Ok(BlockSource {
			rd: rd,
			buf: BytesMut::zeroed(capacity),
			len: 0,
			generation: 0,
			eof: false,
		})
	}

	/// Create a block source with [`DEFAULT_CAPACITY`](Self::DEFAULT_CAPACITY).
	pub fn with_default_capacity(rd: R) -> Result<BlockSource<R>> {
		Self::new(rd, Self::DEFAULT_CAPACITY)
	}

	/// Slab capacity in bytes.
	pub fn capacity(&self) -> usize {
		self.buf.len()
	}

	/// Whether the channel has reported end of input.
	pub fn at_eof(&self) -> bool {
		self.eof
	}

	pub fn get_ref(&self) -> &R {
		&self.rd
	}

	pub fn get_mut(&mut self) -> &mut R {
		&mut self.rd
	}

	/// Release the slab and hand the channel back.
	pub fn into_inner(self) -> R {
		self.rd
	}
}

impl<R: io::Read> Source for BlockSource<R> {
	fn window(&self) -> &[u8] {
		&self.buf[..self.len]
	}

	fn generation(&self) -> u64 {
		self.generation
	}

	fn consume(&mut self, upto: usize) -> usize {
		debug_assert!(upto <= self.len);
		if upto == 0 {
			return 0;
		}
		self.buf.copy_within(upto..self.len, 0);
		self.len -= upto;
		self.generation += 1;
		upto
	}

	fn refill(&mut self) -> Result<usize> {
		if self.eof {
			return Ok(0);
		}
		if self.len == self.buf.len() {
			return Err(Error::BufferExhausted(self.buf.len()));
		}
		loop {
			match self.rd.read(&mut self.buf[self.len..]) {
				Ok(0) => {
					self.eof = true;
					return Ok(0);
				}
				Ok(n) => {
					self.len += n;
					self.generation += 1;
					return Ok(n);
				}
				Err(e) => {
					if e.kind() == io::ErrorKind::Interrupted {
						continue;
					}
					return Err(Error::io(e));
				}
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::source::Span;

	#[test]
	fn zero_capacity_is_rejected() {
		match BlockSource::new(&b"x"[..], 0) {
			Err(Error::InvalidArgument(_)) => (),
			other => panic!("unexpected result: {:?}", other.map(|_| ())),
		}
	}

	#[test]
	fn refill_reads_into_the_slab() {
		let mut src = BlockSource::new(&b"abcdef"[..], 4).unwrap();
		assert_eq!(src.window(), b"");
		assert_eq!(src.refill().unwrap(), 4);
		assert_eq!(src.window(), b"abcd");
		assert!(!src.at_eof());
	}

	#[test]
	fn consume_compacts_and_bumps_the_generation() {
		let mut src = BlockSource::new(&b"abcdef"[..], 4).unwrap();
		src.refill().unwrap();
		let g = src.generation();
		assert_eq!(src.consume(2), 2);
		assert_eq!(src.window(), b"cd");
		assert_eq!(src.generation(), g + 1);
		assert_eq!(src.refill().unwrap(), 2);
		assert_eq!(src.window(), b"cdef");
	}

	#[test]
	fn consume_of_nothing_is_free() {
		let mut src = BlockSource::new(&b"abcdef"[..], 4).unwrap();
		src.refill().unwrap();
		let g = src.generation();
		assert_eq!(src.consume(0), 0);
		assert_eq!(src.generation(), g);
	}

	#[test]
	fn eof_is_latched() {
		let mut src = BlockSource::new(&b"ab"[..], 4).unwrap();
		assert_eq!(src.refill().unwrap(), 2);
		assert_eq!(src.refill().unwrap(), 0);
		assert!(src.at_eof());
		assert_eq!(src.refill().unwrap(), 0);
	}

	#[test]
	fn full_slab_without_consumption_is_reported() {
		let mut src = BlockSource::new(&b"abcdef"[..], 4).unwrap();
		src.refill().unwrap();
		match src.refill() {
			Err(Error::BufferExhausted(4)) => (),
			other => panic!("unexpected result: {:?}", other),
		}
	}

	#[test]
	fn refill_invalidates_spans() {
		let mut src = BlockSource::new(&b"abcdef"[..], 4).unwrap();
		src.refill().unwrap();
		let span = Span::new(0, 2, src.generation());
		assert_eq!(src.bytes(span).unwrap(), b"ab");
		src.consume(2);
		src.refill().unwrap();
		match src.bytes(span) {
			Err(Error::StaleSpan { .. }) => (),
			other => panic!("unexpected result: {:?}", other),
		}
	}

	#[test]
	fn into_inner_returns_the_channel() {
		let data: &[u8] = b"abc";
		let mut src = BlockSource::new(data, 2).unwrap();
		src.refill().unwrap();
		let rest = src.into_inner();
		assert_eq!(rest, b"c");
	}
}
