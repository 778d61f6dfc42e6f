/*!
# Error types

This module holds the error type returned by the various functions of this
crate.

With the exception of [`Error::Io`], all errors are fatal to the stream they
occurred on: the tokenizer latches them and returns them again on every
subsequent call. I/O errors may be retried; the stream is left at the last
consistent boundary.
*/
use std::error;
use std::fmt;
use std::io;
use std::ops::Deref;
use std::result::Result as StdResult;
use std::sync::Arc;

/// [`std::sync::Arc`]-based wrapper around [`std::io::Error`] to allow
/// cloning.
#[derive(Clone)]
pub struct SharedIoError(Arc<io::Error>);

impl SharedIoError {
	fn wrap(e: io::Error) -> SharedIoError {
		SharedIoError(Arc::new(e))
	}
}

impl fmt::Debug for SharedIoError {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		fmt::Debug::fmt(&**self, f)
	}
}

impl fmt::Display for SharedIoError {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		fmt::Display::fmt(&**self, f)
	}
}

impl PartialEq for SharedIoError {
	fn eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}
}

impl AsRef<io::Error> for SharedIoError {
	fn as_ref(&self) -> &io::Error {
		&*self.0
	}
}

impl Deref for SharedIoError {
	type Target = io::Error;

	fn deref(&self) -> &io::Error {
		&*self.0
	}
}

/// Error types which may be returned from a source or the tokenizer.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
	/// A construction parameter was outside the accepted range.
	///
	/// The string indicates which one and should not be interpreted by user
	/// code.
	InvalidArgument(&'static str),

	/// Mapped mode cannot service this input on the current platform.
	///
	/// Most notably, an input larger than the address width of the platform
	/// cannot be mapped as a whole.
	UnsupportedMode(&'static str),

	/// An I/O error was encountered while reading from the input channel.
	///
	/// I/O errors are not fatal and may be retried; the stream is left at
	/// the last consistent boundary.
	Io(SharedIoError),

	/// The input ended while a tag was still open.
	///
	/// This is a syntax condition, not end-of-input; the stream should be
	/// considered ended and corrupt afterwards.
	UnterminatedTag,

	/// A single element is larger than the entire block buffer.
	///
	/// Carries the buffer capacity. Streams containing such elements need a
	/// larger capacity (or mapped mode).
	BufferExhausted(usize),

	/// A [`Span`](crate::Span) was resolved against a source whose window
	/// has moved on since the span was produced.
	///
	/// Carries the generation recorded in the span and the current
	/// generation of the source.
	StaleSpan { span: u64, source: u64 },
}

pub type Result<T> = StdResult<T, Error>;

impl Error {
	pub fn io(e: io::Error) -> Error {
		Error::Io(SharedIoError::wrap(e))
	}
}

impl From<io::Error> for Error {
	fn from(e: io::Error) -> Error {
		Error::io(e)
	}
}

impl fmt::Display for Error {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			Error::InvalidArgument(what) => write!(f, "invalid argument: {}", what),
			Error::UnsupportedMode(what) => write!(f, "unsupported mode: {}", what),
			Error::Io(e) => write!(f, "I/O error: {}", e),
			Error::UnterminatedTag => f.write_str("input ended inside an unterminated tag"),
			Error::BufferExhausted(cap) => write!(
				f,
				"element does not fit into the block buffer ({} bytes)",
				cap
			),
			Error::StaleSpan { span, source } => write!(
				f,
				"stale span: produced at generation {}, source is at generation {}",
				span, source
			),
		}
	}
}

impl error::Error for Error {
	fn source(&self) -> Option<&(dyn error::Error + 'static)> {
		match self {
			Error::Io(e) => Some(&**e),
			Error::InvalidArgument(_)
			| Error::UnsupportedMode(_)
			| Error::UnterminatedTag
			| Error::BufferExhausted(_)
			| Error::StaleSpan { .. } => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn io_errors_compare_by_identity() {
		let e1 = Error::io(io::Error::new(io::ErrorKind::Other, "x"));
		let e2 = e1.clone();
		assert_eq!(e1, e2);
		let e3 = Error::io(io::Error::new(io::ErrorKind::Other, "x"));
		assert_ne!(e1, e3);
	}

	#[test]
	fn display_names_the_generations() {
		let e = Error::StaleSpan { span: 1, source: 3 };
		assert_eq!(
			format!("{}", e),
			"stale span: produced at generation 1, source is at generation 3"
		);
	}
}
