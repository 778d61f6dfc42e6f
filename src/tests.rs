use super::*;

// note that these are just smoketests... the components are tested
// extensively in their modules.

static DOC: &'static [u8] = b"<?xml version='1.0' encoding='UTF-8'?>\n<osm version=\"0.6\" generator=\"smoke\">\n <node id=\"1\" lat=\"48.2\" lon=\"16.3\"/>\n <!-- boundary -->\n <way id=\"2\"><nd ref=\"1\"/></way>\n</osm>";

fn decode_stream<S: Source>(mut tok: Tokenizer<S>) -> Vec<(TagType, Vec<u8>, usize, u64)> {
	let mut rec = TagRecord::with_capacity(8);
	let mut out = Vec::new();
	while let Some(elem) = tok.next_element().unwrap() {
		rec.decode(tok.source(), elem).unwrap();
		out.push((
			rec.tag_type(),
			tok.source().bytes(rec.name()).unwrap().to_vec(),
			rec.attributes().len(),
			elem.line,
		));
		assert_eq!(rec.truncated(), 0);
	}
	out
}

#[test]
fn block_mode_can_walk_a_document() {
	// capacity just above the longest element forces plenty of refills
	let tok = Tokenizer::new(BlockSource::new(DOC, 48).unwrap());
	let out = decode_stream(tok);
	let expected: Vec<(TagType, &[u8], usize, u64)> = vec![
		(TagType::Instruction, b"xml", 2, 1),
		(TagType::Literal, b"\n", 0, 1),
		(TagType::Open, b"osm", 2, 2),
		(TagType::Literal, b"\n ", 0, 2),
		(TagType::Single, b"node", 3, 3),
		(TagType::Literal, b"\n ", 0, 3),
		(TagType::Comment, b"boundary", 0, 4),
		(TagType::Literal, b"\n ", 0, 4),
		(TagType::Open, b"way", 1, 5),
		(TagType::Single, b"nd", 1, 5),
		(TagType::Close, b"way", 0, 5),
		(TagType::Literal, b"\n", 0, 5),
		(TagType::Close, b"osm", 0, 6),
	];
	assert_eq!(out.len(), expected.len());
	for (got, want) in out.iter().zip(expected.iter()) {
		assert_eq!(got.0, want.0);
		assert_eq!(got.1, want.1.to_vec());
		assert_eq!(got.2, want.2);
		assert_eq!(got.3, want.3);
	}
}

#[test]
fn block_mode_is_capacity_independent() {
	let reference = decode_stream(Tokenizer::new(SliceSource::new(DOC)));
	for capacity in &[48usize, 64, 100, 4096] {
		let tok = Tokenizer::new(BlockSource::new(DOC, *capacity).unwrap());
		assert_eq!(decode_stream(tok), reference, "capacity {}", capacity);
	}
}

#[test]
fn rewriting_reproduces_the_document() {
	// the document uses canonical spacing, so re-serializing every decoded
	// record must reproduce it byte-for-byte
	let mut tok = Tokenizer::new(SliceSource::new(DOC));
	let mut rec = TagRecord::with_capacity(8);
	let mut out = Vec::new();
	while let Some(elem) = tok.next_element().unwrap() {
		rec.decode(tok.source(), elem).unwrap();
		rec.write_tag(tok.source(), &mut out).unwrap();
	}
	assert_eq!(out, DOC.to_vec());
}

#[cfg(feature = "mmap")]
#[test]
fn mapped_mode_matches_block_mode_and_retains_spans() {
	use std::io::Write;

	let path = std::env::temp_dir().join(format!("zxml-smoke-{}", std::process::id()));
	{
		let mut f = std::fs::File::create(&path).unwrap();
		f.write_all(DOC).unwrap();
	}
	let f = std::fs::File::open(&path).unwrap();
	let src = MappedSource::new(&f, DOC.len() as u64).unwrap();
	drop(f);

	let mut tok = Tokenizer::new(src);
	let mut elems = Vec::new();
	tok.read_all(|_, elem| elems.push(elem)).unwrap();

	// mapped spans survive arbitrarily many calls; resolve them all after
	// the stream has ended
	let mut glued = Vec::new();
	for elem in elems.iter() {
		glued.extend_from_slice(tok.source().bytes(elem.span).unwrap());
	}
	assert_eq!(glued, DOC.to_vec());

	let reference = decode_stream(Tokenizer::new(SliceSource::new(DOC)));
	let mut rec = TagRecord::with_capacity(8);
	let mut out = Vec::new();
	for elem in elems.iter() {
		rec.decode(tok.source(), *elem).unwrap();
		out.push((
			rec.tag_type(),
			tok.source().bytes(rec.name()).unwrap().to_vec(),
			rec.attributes().len(),
			elem.line,
		));
	}
	assert_eq!(out, reference);

	drop(tok);
	std::fs::remove_file(path).unwrap();
}
