/*!
# Element tokenizer

Slices a [`Source`] window into successive lexical units: tags (`<` through
the matching `>`, quote-aware) and literal text runs between tags.
Concatenating all emitted spans in order reproduces the input byte stream
exactly.
*/
use memchr::{memchr, memchr3, memchr_iter};

use crate::error::{Error, Result};
use crate::source::{Source, Span};

/// Kind of lexical unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
	/// A tag, `<` through the matching `>` (delimiters included in the
	/// span).
	Tag,
	/// A literal text run between tags.
	Literal,
}

/// One lexical unit as returned by [`Tokenizer::next_element`].
///
/// Elements own nothing; the bytes are resolved through the source via
/// [`Source::bytes`]. In block mode the span only stays resolvable until
/// the next call which triggers a refill, so process the element before
/// asking for the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Element {
	pub span: Span,
	pub kind: ElementKind,
	/// 1-based line number of the element's first byte (count of `\n`
	/// strictly before it, plus one).
	pub line: u64,
}

/// Scan state, persisted across calls so that a retried I/O error resumes
/// exactly where the failed call stopped.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ScanState {
	/// Between elements.
	Scanning,
	/// Inside a literal run which started at window offset `start`.
	Literal { start: usize },
	/// Inside a tag which started at window offset `start`; `quote` is the
	/// active attribute-value delimiter, if any. While a delimiter is
	/// active, `<` and `>` are inert.
	Tag { start: usize, quote: Option<u8> },
}

/**
# Lexical tokenizer over a buffer source

Produces one [`Element`] per call to [`next_element`](Self::next_element),
requesting refills from the source as the window runs dry and tracking line
numbers along the way.

The tokenizer drives the generic [`Source`] surface only, so the same state
machine serves block, mapped and slice mode; for the latter two, "refill"
simply reports that no more data will arrive.
*/
pub struct Tokenizer<S> {
	src: S,
	pos: usize,
	line: u64,
	elem_line: u64,
	state: ScanState,
	err: Option<Error>,
}

impl<S: Source> Tokenizer<S> {
	pub fn new(src: S) -> Tokenizer<S> {
		Tokenizer {
			src: src,
			pos: 0,
			line: 1,
			elem_line: 1,
			state: ScanState::Scanning,
			err: None,
		}
	}

	pub fn source(&self) -> &S {
		&self.src
	}

	pub fn source_mut(&mut self) -> &mut S {
		&mut self.src
	}

	pub fn into_source(self) -> S {
		self.src
	}

	/// Line number at the scan cursor.
	pub fn line(&self) -> u64 {
		self.line
	}

	/// Read the next element from the stream.
	///
	/// Returns `Ok(Some(..))` for each element in document byte order,
	/// `Ok(None)` on clean end of input, and `Err(..)` otherwise. I/O
	/// errors may be retried; all other errors are latched and will be
	/// returned again without reading further data.
	pub fn next_element(&mut self) -> Result<Option<Element>> {
		if let Some(e) = self.err.as_ref() {
			return Err(e.clone());
		}
		match self.scan() {
			Err(e) => {
				if !matches!(e, Error::Io(_)) {
					self.err = Some(e.clone());
				}
				Err(e)
			}
			other => other,
		}
	}

	/// Drive the whole stream, handing each element together with the
	/// source (for span resolution) to `cb`.
	pub fn read_all<F: FnMut(&S, Element)>(&mut self, mut cb: F) -> Result<()> {
		while let Some(elem) = self.next_element()? {
			cb(&self.src, elem);
		}
		Ok(())
	}

	fn scan(&mut self) -> Result<Option<Element>> {
		loop {
			match self.state {
				ScanState::Scanning => {
					if self.pos >= self.src.window().len() {
						if !self.more(self.pos)? {
							return Ok(None);
						}
						continue;
					}
					self.elem_line = self.line;
					if self.src.window()[self.pos] == b'<' {
						self.state = ScanState::Tag {
							start: self.pos,
							quote: None,
						};
						self.pos += 1;
					} else {
						self.state = ScanState::Literal { start: self.pos };
					}
				}
				ScanState::Literal { .. } => {
					let hit = memchr(b'<', &self.src.window()[self.pos..]);
					match hit {
						Some(off) => {
							self.track_lines(self.pos, self.pos + off);
							self.pos += off;
							return Ok(Some(self.finish(ElementKind::Literal)));
						}
						None => {
							let end = self.src.window().len();
							self.track_lines(self.pos, end);
							self.pos = end;
							let keep = self.state_start();
							match self.more(keep) {
								Ok(true) => (),
								// clean end of input: the run is complete
								Ok(false) => {
									return Ok(Some(self.finish(ElementKind::Literal)))
								}
								// the run fills the whole slab; emit it in
								// pieces, concatenation stays byte-exact
								Err(Error::BufferExhausted(_)) => {
									return Ok(Some(self.finish(ElementKind::Literal)))
								}
								Err(e) => return Err(e),
							}
						}
					}
				}
				ScanState::Tag { quote, .. } => {
					let hit = match quote {
						Some(q) => memchr(q, &self.src.window()[self.pos..]),
						None => memchr3(b'>', b'"', b'\'', &self.src.window()[self.pos..]),
					};
					match hit {
						Some(off) => {
							let b = self.src.window()[self.pos + off];
							self.track_lines(self.pos, self.pos + off + 1);
							self.pos += off + 1;
							match (quote, b) {
								// closing value delimiter
								(Some(_), _) => self.set_quote(None),
								(None, b'>') => {
									return Ok(Some(self.finish(ElementKind::Tag)))
								}
								// opening value delimiter
								(None, q) => self.set_quote(Some(q)),
							}
						}
						None => {
							let end = self.src.window().len();
							self.track_lines(self.pos, end);
							self.pos = end;
							let keep = self.state_start();
							if !self.more(keep)? {
								return Err(Error::UnterminatedTag);
							}
						}
					}
				}
			}
		}
	}

	/// Ask the source for more bytes, allowing it to drop everything before
	/// `keep`. Rebases the cursor and the in-progress element by however
	/// much the source actually dropped, so positions stay valid even when
	/// the refill fails and the call is retried. Returns whether new bytes
	/// arrived.
	fn more(&mut self, keep: usize) -> Result<bool> {
		let dropped = self.src.consume(keep);
		if dropped > 0 {
			self.pos -= dropped;
			self.state = match self.state {
				ScanState::Scanning => ScanState::Scanning,
				ScanState::Literal { start } => ScanState::Literal {
					start: start - dropped,
				},
				ScanState::Tag { start, quote } => ScanState::Tag {
					start: start - dropped,
					quote: quote,
				},
			};
		}
		Ok(self.src.refill()? > 0)
	}

	/// Window offset at which the in-progress element starts.
	fn state_start(&self) -> usize {
		match self.state {
			ScanState::Scanning => self.pos,
			ScanState::Literal { start } => start,
			ScanState::Tag { start, .. } => start,
		}
	}

	/// Emit the in-progress element, ending at the cursor, and return to
	/// scanning.
	fn finish(&mut self, kind: ElementKind) -> Element {
		let start = self.state_start();
		self.state = ScanState::Scanning;
		Element {
			span: Span::new(start, self.pos, self.src.generation()),
			kind: kind,
			line: self.elem_line,
		}
	}

	fn set_quote(&mut self, quote: Option<u8>) {
		if let ScanState::Tag { start, .. } = self.state {
			self.state = ScanState::Tag {
				start: start,
				quote: quote,
			};
		}
	}

	fn track_lines(&mut self, from: usize, to: usize) {
		let n = memchr_iter(b'\n', &self.src.window()[from..to]).count();
		self.line += n as u64;
	}
}
