#[macro_use]
extern crate afl;
extern crate zxml;

use zxml::{BlockSource, ElementKind, Source, TagRecord, Tokenizer};

/// Tokenize and decode the whole input through a block source of the given
/// capacity. Literal runs longer than the slab come out in pieces, so the
/// canonical shape merges adjacent literals: a list of (is_tag, bytes)
/// pairs plus the glued-together byte stream.
fn walk(data: &[u8], capacity: usize) -> zxml::Result<(Vec<(bool, Vec<u8>)>, Vec<u8>)> {
	let mut tok = Tokenizer::new(BlockSource::new(data, capacity)?);
	let mut rec = TagRecord::with_capacity(4);
	let mut units: Vec<(bool, Vec<u8>)> = Vec::new();
	let mut glued = Vec::new();
	while let Some(elem) = tok.next_element()? {
		let bytes = tok.source().bytes(elem.span)?.to_vec();
		glued.extend_from_slice(&bytes);
		match elem.kind {
			ElementKind::Tag => {
				rec.decode(tok.source(), elem)?;
				units.push((true, bytes));
			}
			ElementKind::Literal => match units.last_mut() {
				Some((false, acc)) => acc.extend_from_slice(&bytes),
				_ => units.push((false, bytes)),
			},
		}
	}
	Ok((units, glued))
}

fn main() {
	fuzz!(|data: &[u8]| {
		let small = walk(data, 7);
		let large = walk(data, 4096);
		if let (Ok((su, sg)), Ok((lu, lg))) = (&small, &large) {
			// tokenization must not depend on the slab capacity
			if su != lu {
				panic!("unit stream depends on block capacity");
			}
			// no bytes dropped, duplicated or reordered
			if sg.as_slice() != data || lg.as_slice() != data {
				panic!("concatenated spans do not reproduce the input");
			}
		}
	});
}
