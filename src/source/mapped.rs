use std::fs;

use memmap2::Mmap;

use super::Source;
use crate::error::{Error, Result};

/**
# Whole-file mapped source

Maps the entire addressable extent of a file up front. The window is the
whole file, the generation never changes, and spans stay valid for the life
of the mapping. This is the mode to pick when elements must be retained
across many calls, e.g. to build an in-memory graph of cross-referencing
elements: the pages are brought in by the operating system on first touch,
so no physical memory proportional to the file size is required.

The file handle is borrowed only for the duration of the call; closing it
afterwards is the caller's business and does not invalidate the mapping.
*/
pub struct MappedSource {
	map: Mmap,
}

impl MappedSource {
	/// Map the whole file.
	///
	/// `total_len` must be the exact length of the file's extent; this
	/// fails with [`Error::InvalidArgument`] when it is zero or does not
	/// match, with [`Error::UnsupportedMode`] when the extent exceeds the
	/// address width of the platform (files beyond 4 GiB on 32-bit
	/// targets), and with [`Error::Io`] when the mapping itself fails.
	pub fn new(file: &fs::File, total_len: u64) -> Result<MappedSource> {
		if total_len == 0 {
			return Err(Error::InvalidArgument("mapped length must be non-zero"));
		}
		if total_len > usize::MAX as u64 {
			return Err(Error::UnsupportedMode(
				"input exceeds the address width of this platform",
			));
		}
		// the mapping aliases file contents; the caller must not truncate
		// the file while the source is alive
		let map = unsafe { Mmap::map(file) }.map_err(Error::io)?;
		if map.len() as u64 != total_len {
			return Err(Error::InvalidArgument(
				"mapped length does not match the file extent",
			));
		}
		Ok(MappedSource { map: map })
	}

	/// Length of the mapped extent in bytes.
	pub fn len(&self) -> usize {
		self.map.len()
	}

	pub fn is_empty(&self) -> bool {
		self.map.len() == 0
	}
}

impl Source for MappedSource {
	fn window(&self) -> &[u8] {
		&self.map[..]
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

#[cfg(test)]
mod tests {
	use super::*;
	use std::env;
	use std::io::Write;

	fn scratch_file(name: &str, contents: &[u8]) -> (std::path::PathBuf, fs::File) {
		let path = env::temp_dir().join(format!("zxml-{}-{}", name, std::process::id()));
		let mut f = fs::File::create(&path).unwrap();
		f.write_all(contents).unwrap();
		f.flush().unwrap();
		let f = fs::File::open(&path).unwrap();
		(path, f)
	}

	#[test]
	fn maps_the_whole_file() {
		let (path, f) = scratch_file("maps", b"<a>text</a>");
		let mut src = MappedSource::new(&f, 11).unwrap();
		assert_eq!(src.window(), b"<a>text</a>");
		assert_eq!(src.consume(4), 0);
		assert_eq!(src.refill().unwrap(), 0);
		assert_eq!(src.window(), b"<a>text</a>");
		drop(src);
		fs::remove_file(path).unwrap();
	}

	#[test]
	fn zero_length_is_rejected() {
		let (path, f) = scratch_file("zero", b"x");
		match MappedSource::new(&f, 0) {
			Err(Error::InvalidArgument(_)) => (),
			other => panic!("unexpected result: {:?}", other.map(|_| ())),
		}
		drop(f);
		fs::remove_file(path).unwrap();
	}

	#[test]
	fn mismatched_length_is_rejected() {
		let (path, f) = scratch_file("mismatch", b"abc");
		match MappedSource::new(&f, 2) {
			Err(Error::InvalidArgument(_)) => (),
			other => panic!("unexpected result: {:?}", other.map(|_| ())),
		}
		drop(f);
		fs::remove_file(path).unwrap();
	}
}
