/*!
# Buffer sources

A source owns the backing storage of one input stream and exposes it as a
byte *window*. The tokenizer only ever looks at the window; when it runs out
of bytes it asks the source to [`consume`](Source::consume) the part it is
done with and to [`refill`](Source::refill) the rest.

Three variants exist, all behind the same [`Source`] surface:

* [`BlockSource`]: one fixed slab, refilled from an [`std::io::Read`]
  channel. Bounded memory regardless of input size; spans only survive
  until the next refill.
* [`MappedSource`]: the whole file made addressable at once (feature
  `mmap`). Spans survive for the life of the mapping, which is the mode to
  pick when elements must be retained across many calls.
* [`SliceSource`]: an in-memory byte slice, e.g. for re-tokenizing the
  interior of an already extracted element.
*/
use crate::error::{Error, Result};

mod block;
#[cfg(feature = "mmap")]
mod mapped;

pub use block::BlockSource;
#[cfg(feature = "mmap")]
pub use mapped::MappedSource;

/**
# Non-owning view into a source window

A span describes a byte range inside the window of the [`Source`] which
produced it, together with the source *generation* current at that time. It
owns nothing and is freely copyable.

Spans are resolved back into bytes with [`Source::bytes`]. Resolution is
checked: once the source window has moved on (any refill in block mode),
the generations no longer match and resolution fails with
[`Error::StaleSpan`] instead of silently reading overwritten memory. For
mapped and slice sources the generation never changes and spans resolve for
the life of the source.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
	start: usize,
	end: usize,
	generation: u64,
}

impl Span {
	pub(crate) fn new(start: usize, end: usize, generation: u64) -> Span {
		debug_assert!(start <= end);
		Span {
			start: start,
			end: end,
			generation: generation,
		}
	}

	/// The zero-length span. Resolves to an empty slice on any source still
	/// at generation 0.
	pub const fn empty() -> Span {
		Span {
			start: 0,
			end: 0,
			generation: 0,
		}
	}

	/// Number of bytes covered.
	pub fn len(&self) -> usize {
		self.end - self.start
	}

	pub fn is_empty(&self) -> bool {
		self.end == self.start
	}

	/// Start offset inside the window which produced the span.
	pub fn start(&self) -> usize {
		self.start
	}

	/// End offset (exclusive) inside the window which produced the span.
	pub fn end(&self) -> usize {
		self.end
	}

	/// Source generation at which the span was produced.
	pub fn generation(&self) -> u64 {
		self.generation
	}
}

/**
# Backing store of one input stream

The capability surface shared by all backing-store variants. The tokenizer
is written purely against this trait; for the non-refillable variants
(mapped, slice) [`refill`](Source::refill) simply reports that no more data
will ever arrive.

None of the operations touch the underlying channel beyond reading; in
particular, dropping a source never closes it.
*/
pub trait Source {
	/// The currently readable window.
	fn window(&self) -> &[u8];

	/// Current window generation.
	///
	/// Increments whenever bytes inside the window move or new bytes
	/// arrive; spans from older generations no longer resolve.
	fn generation(&self) -> u64;

	/// Drop the consumed prefix of the window so a refill can reuse the
	/// space. Returns the number of bytes actually dropped, which is 0 for
	/// sources whose window never moves.
	///
	/// Infallible; positions into the window shift down by the returned
	/// amount.
	fn consume(&mut self, upto: usize) -> usize;

	/// Read more bytes from the channel into the window.
	///
	/// Returns the number of bytes added; `Ok(0)` signals end of input.
	/// `Err(Error::Io)` leaves the window untouched and may be retried.
	/// `Err(Error::BufferExhausted)` means the window is full and nothing
	/// has been consumed.
	fn refill(&mut self) -> Result<usize>;

	/// Resolve a span produced from this source back into bytes.
	///
	/// Fails with [`Error::StaleSpan`] when the span's generation does not
	/// match the current one, i.e. when the window has been refilled since
	/// the span was produced.
	fn bytes(&self, span: Span) -> Result<&[u8]> {
		if span.generation != self.generation() {
			return Err(Error::StaleSpan {
				span: span.generation,
				source: self.generation(),
			});
		}
		match self.window().get(span.start..span.end) {
			Some(b) => Ok(b),
			None => Err(Error::StaleSpan {
				span: span.generation,
				source: self.generation(),
			}),
		}
	}
}

/**
# In-memory source

Wraps a byte slice as a whole-buffer window. Refills are no-ops, the
generation never changes, and spans stay valid for the borrow's lifetime.

Useful for documents already in memory and for feeding an extracted piece
of a stream back through the tokenizer, e.g. the internal subset of a
DOCTYPE declaration.
*/
pub struct SliceSource<'a> {
	data: &'a [u8],
}

impl<'a> SliceSource<'a> {
	pub fn new(data: &'a [u8]) -> SliceSource<'a> {
		SliceSource { data: data }
	}
}

impl<'a> Source for SliceSource<'a> {
	fn window(&self) -> &[u8] {
		self.data
	}

	fn generation(&self) -> u64 {
		0
	}

	fn consume(&mut self, _upto: usize) -> usize {
		0
	}

	fn refill(&mut self) -> Result<usize> {
		Ok(0)
	}
}
