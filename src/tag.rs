/*!
# Tag decoding

Classifies a tokenized element and extracts its name and attribute list,
without copying any bytes: every string in the decoded record is a [`Span`]
into the source window the element came from.

Decoding never fails on malformed input. Anything that does not parse as a
recognized production classifies as [`TagType::Illegal`] and is surfaced as
data, so callers decide whether to treat it as a soft error.
*/
use std::io;

use memchr::{memchr, memchr2};

use crate::error::{Error, Result};
use crate::source::{Source, Span};
use crate::tokenizer::{Element, ElementKind};

/// Classification of a decoded element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagType {
	/// Unrecognizable unit. Usually indicates a syntax error in the input.
	Illegal,
	/// Opening tag, `<name ...>`.
	Open,
	/// Self-closed tag, `<name .../>`.
	Single,
	/// Closing tag, `</name>`.
	Close,
	/// Literal text between tags.
	Literal,
	/// Declaration, `<! ... >`.
	Declaration,
	/// Processing instruction, `<? ... ?>`.
	Instruction,
	/// Comment, `<!-- ... -->`.
	Comment,
}

/// Delimiter of an attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quote {
	/// `'`
	Single,
	/// `"`
	Double,
}

impl Quote {
	pub fn as_byte(self) -> u8 {
		match self {
			Quote::Single => b'\'',
			Quote::Double => b'"',
		}
	}
}

/// One decoded `name="value"` pair.
///
/// The value span excludes the delimiters; the delimiter itself is kept in
/// `delim` so the attribute can be re-serialized verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute {
	pub name: Span,
	pub value: Span,
	pub delim: Quote,
}

// name start / continuation bytes; bytes >= 0x80 pass so UTF-8 names do
// not classify as Illegal
fn is_name_start(b: u8) -> bool {
	b.is_ascii_alphabetic() || b == b'_' || b == b':' || b >= 0x80
}

fn is_name_byte(b: u8) -> bool {
	b.is_ascii_alphanumeric() || b == b'.' || b == b'-' || b == b'_' || b == b':' || b >= 0x80
}

/// Byte cursor over a tag interior. Spans it produces stay relative to the
/// source window the element came from.
struct Cursor<'a> {
	buf: &'a [u8],
	pos: usize,
	base: usize,
	generation: u64,
}

impl<'a> Cursor<'a> {
	fn rest(&self) -> &'a [u8] {
		&self.buf[self.pos..]
	}

	fn at_end(&self) -> bool {
		self.pos >= self.buf.len()
	}

	fn peek(&self) -> Option<u8> {
		self.buf.get(self.pos).copied()
	}

	fn bump(&mut self) {
		self.pos += 1;
	}

	fn skip_whitespace(&mut self) {
		while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
			self.pos += 1;
		}
	}

	fn span(&self, from: usize, to: usize) -> Span {
		Span::new(self.base + from, self.base + to, self.generation)
	}

	/// Read a name token. Yields an empty span when the cursor does not
	/// stand on a valid name start byte.
	fn take_name(&mut self) -> Span {
		let from = self.pos;
		if matches!(self.peek(), Some(b) if is_name_start(b)) {
			self.pos += 1;
			while matches!(self.peek(), Some(b) if is_name_byte(b)) {
				self.pos += 1;
			}
		}
		self.span(from, self.pos)
	}

	/// Read everything up to the next whitespace byte.
	fn take_word(&mut self) -> Span {
		let from = self.pos;
		while matches!(self.peek(), Some(b) if !b.is_ascii_whitespace()) {
			self.pos += 1;
		}
		self.span(from, self.pos)
	}
}

/**
# Reusable decoded-tag record

Holds one decoded element: name, classification and an attribute list of
fixed capacity chosen at creation. The record is meant to be created once
and reused across many [`decode`](Self::decode) calls; decoding clears and
refills it without touching the backing allocation, so the hot loop of a
large stream runs without any allocation at all.

Attributes beyond the capacity are parsed and counted in
[`truncated`](Self::truncated) but not stored; decoding still succeeds.
*/
#[derive(Debug, Clone, PartialEq)]
pub struct TagRecord {
	name: Span,
	tag_type: TagType,
	attrs: Vec<Attribute>,
	max_attrs: usize,
	truncated: usize,
}

impl TagRecord {
	/// Create a record with room for at most `max_attrs` attributes.
	pub fn with_capacity(max_attrs: usize) -> TagRecord {
		TagRecord {
			name: Span::empty(),
			tag_type: TagType::Illegal,
			attrs: Vec::with_capacity(max_attrs),
			max_attrs: max_attrs,
			truncated: 0,
		}
	}

	/// Clear the record without releasing the attribute storage.
	///
	/// [`decode`](Self::decode) does this implicitly.
	pub fn reset(&mut self) {
		self.name = Span::empty();
		self.tag_type = TagType::Illegal;
		self.attrs.clear();
		self.truncated = 0;
	}

	/// Name of the decoded element. For [`TagType::Literal`], the whole
	/// text run.
	pub fn name(&self) -> Span {
		self.name
	}

	pub fn tag_type(&self) -> TagType {
		self.tag_type
	}

	/// Decoded attributes, in document order.
	pub fn attributes(&self) -> &[Attribute] {
		&self.attrs
	}

	/// Maximum number of attributes the record stores.
	pub fn capacity(&self) -> usize {
		self.max_attrs
	}

	/// Number of attributes which were parsed but dropped because the
	/// record was full.
	pub fn truncated(&self) -> usize {
		self.truncated
	}

	/// Decode `elem` into this record, in place.
	///
	/// Malformed input classifies instead of failing; the only error is
	/// [`Error::StaleSpan`] when the element's span no longer resolves
	/// against `src`.
	pub fn decode<S: Source>(&mut self, src: &S, elem: Element) -> Result<()> {
		self.reset();
		let bytes = src.bytes(elem.span)?;
		if elem.kind == ElementKind::Literal {
			self.name = elem.span;
			self.tag_type = TagType::Literal;
			return Ok(());
		}
		// the tokenizer always includes the angle delimiters
		if bytes.len() < 2 || bytes[0] != b'<' || bytes[bytes.len() - 1] != b'>' {
			return Ok(());
		}
		let inner = &bytes[1..bytes.len() - 1];
		let base = elem.span.start() + 1;
		let generation = elem.span.generation();

		if inner.starts_with(b"!--") {
			if inner.len() >= 5 && inner.ends_with(b"--") {
				let body = &inner[3..inner.len() - 2];
				let mut cur = Cursor {
					buf: body,
					pos: 0,
					base: base + 3,
					generation: generation,
				};
				cur.skip_whitespace();
				self.name = cur.take_word();
				self.tag_type = TagType::Comment;
			}
			// `!--` without a closing `--` stays Illegal
			return Ok(());
		}

		// classify by the first and last significant bytes, then narrow the
		// cursor to the region between the markers
		let (ty, lead, cut) = match inner.first() {
			Some(&b'!') => (TagType::Declaration, 1, 0),
			Some(&b'?') if inner.len() >= 2 && inner.ends_with(b"?") => {
				(TagType::Instruction, 1, 1)
			}
			Some(&b'/') => (TagType::Close, 1, 0),
			Some(_) if inner.ends_with(b"/") => (TagType::Single, 0, 1),
			Some(_) => (TagType::Open, 0, 0),
			None => return Ok(()),
		};
		let mut cur = Cursor {
			buf: &inner[lead..inner.len() - cut],
			pos: 0,
			base: base + lead,
			generation: generation,
		};

		cur.skip_whitespace();
		let name = cur.take_name();
		if name.is_empty() {
			// best-effort partial name for the Illegal record
			self.name = cur.take_word();
			return Ok(());
		}
		self.name = name;
		self.tag_type = ty;
		match ty {
			TagType::Open | TagType::Single | TagType::Instruction | TagType::Declaration => {
				self.scan_attributes(&mut cur)
			}
			_ => (),
		}
		Ok(())
	}

	/// Attribute loop: name `=` quoted-value, repeated. Malformed syntax
	/// truncates scanning for this tag; already-collected attributes stay.
	fn scan_attributes(&mut self, cur: &mut Cursor<'_>) {
		loop {
			cur.skip_whitespace();
			if cur.at_end() {
				return;
			}
			let name = cur.take_name();
			if name.is_empty() {
				return;
			}
			cur.skip_whitespace();
			if cur.peek() != Some(b'=') {
				return;
			}
			cur.bump();
			cur.skip_whitespace();
			// the value is delimited by the next quote byte encountered
			let rest = cur.rest();
			let (qoff, qb) = match memchr2(b'"', b'\'', rest) {
				Some(off) => (off, rest[off]),
				None => return,
			};
			let vstart = cur.pos + qoff + 1;
			let vend = match memchr(qb, &cur.buf[vstart..]) {
				Some(off) => vstart + off,
				// unterminated value
				None => return,
			};
			let attr = Attribute {
				name: name,
				value: cur.span(vstart, vend),
				delim: if qb == b'"' {
					Quote::Double
				} else {
					Quote::Single
				},
			};
			cur.pos = vend + 1;
			if self.attrs.len() < self.max_attrs {
				self.attrs.push(attr);
			} else {
				self.truncated += 1;
			}
		}
	}

	/// Write the record back out as XML.
	///
	/// Re-serializes from the recorded spans, keeping each attribute's
	/// original value delimiter. [`TagType::Illegal`] records write
	/// nothing.
	pub fn write_tag<S: Source, W: io::Write>(&self, src: &S, w: &mut W) -> Result<()> {
		fn put<W: io::Write>(w: &mut W, bytes: &[u8]) -> Result<()> {
			w.write_all(bytes).map_err(Error::io)
		}

		let (head, foot): (&[u8], &[u8]) = match self.tag_type {
			TagType::Illegal => return Ok(()),
			TagType::Literal => return put(w, src.bytes(self.name)?),
			TagType::Open => (b"<", b">"),
			TagType::Single => (b"<", b"/>"),
			TagType::Close => (b"</", b">"),
			TagType::Declaration => (b"<!", b">"),
			TagType::Instruction => (b"<?", b"?>"),
			TagType::Comment => (b"<!-- ", b" -->"),
		};
		put(w, head)?;
		put(w, src.bytes(self.name)?)?;
		for attr in self.attrs.iter() {
			put(w, b" ")?;
			put(w, src.bytes(attr.name)?)?;
			put(w, b"=")?;
			put(w, &[attr.delim.as_byte()])?;
			put(w, src.bytes(attr.value)?)?;
			put(w, &[attr.delim.as_byte()])?;
		}
		put(w, foot)
	}
}
