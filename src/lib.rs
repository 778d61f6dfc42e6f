/*!
# Streaming zero-copy XML tokenization

This crate provides a streaming tokenizer and tag decoder for very large
XML documents (tens to hundreds of gigabytes, e.g. OSM planet files) with
bounded, predictable memory use.

## Design (some call it a lack of features)

* One lexical [`Element`] per call: a tag or a literal text run, in strict
  document byte order, with its line number.
* Zero-copy throughout: every string is a [`Span`] into the input buffer;
  nothing is allocated per element.
* Two backing-store modes behind one [`Source`] surface: a fixed
  [`BlockSource`] slab refilled from any [`std::io::Read`], or a
  whole-file [`MappedSource`] when spans must stay valid across the whole
  stream (feature `mmap`, enabled by default).
* Decoding into a reusable [`TagRecord`] of fixed attribute capacity, so
  the hot loop runs allocation-free.
* No well-formedness validation beyond lexical syntax, no entity or
  namespace resolution, no document tree. Unrecognizable units classify as
  [`TagType::Illegal`] instead of failing the stream.

## Example

```
use zxml::{SliceSource, Source, Tokenizer, TagRecord, ElementKind, TagType};

let doc = b"<node id=\"1\"><tag k='name' v='Stephansplatz'/></node>";
let mut tok = Tokenizer::new(SliceSource::new(&doc[..]));
let mut rec = TagRecord::with_capacity(16);
let mut names = Vec::new();
while let Some(elem) = tok.next_element().unwrap() {
	if elem.kind == ElementKind::Tag {
		rec.decode(tok.source(), elem).unwrap();
		if rec.tag_type() != TagType::Close {
			let name = tok.source().bytes(rec.name()).unwrap();
			names.push(name.to_vec());
		}
	}
}
assert_eq!(names, vec![b"node".to_vec(), b"tag".to_vec()]);
```

## Choosing a source

In block mode a span only stays resolvable until the next refill, so each
element must be processed before the next call to
[`Tokenizer::next_element`]; resolving a stale span fails fast with
[`Error::StaleSpan`] rather than reading overwritten memory. When elements
must be retained across many calls (e.g. building an in-memory graph of
cross-referencing elements), use [`MappedSource`]: its spans stay valid for
the life of the mapping and no physical memory proportional to the file
size is needed.

## Concurrency

None. Every operation is a plain blocking call on caller-owned values;
use one source + tokenizer pair per thread.
*/
pub mod error;
pub mod source;
pub mod tag;
pub mod tokenizer;

#[cfg(test)]
pub mod tests;

#[doc(inline)]
pub use error::{Error, Result};
#[cfg(feature = "mmap")]
#[doc(inline)]
pub use source::MappedSource;
#[doc(inline)]
pub use source::{BlockSource, SliceSource, Source, Span};
#[doc(inline)]
pub use tag::{Attribute, Quote, TagRecord, TagType};
#[doc(inline)]
pub use tokenizer::{Element, ElementKind, Tokenizer};

pub const VERSION: &'static str = env!("CARGO_PKG_VERSION");
