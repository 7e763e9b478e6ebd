//! Error types for `ZtGfx`

use std::path::PathBuf;

use thiserror::Error;

/// The error type for `ZtGfx` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ==================== Decode Errors ====================
    /// The container or palette byte stream is malformed.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// The palette could not be loaded or does not cover a pixel index.
    #[error(transparent)]
    Palette(#[from] PaletteError),

    /// A full load failed; the specific cause is kept as the error source.
    #[error("the file format is not recognized or is corrupt: {}", path.display())]
    CorruptFile {
        /// The container that was being loaded.
        path: PathBuf,
        /// The underlying failure.
        #[source]
        source: Box<Error>,
    },

    /// The load was cancelled by the caller before it completed.
    #[error("load cancelled")]
    Cancelled,

    // ==================== Image Export Errors ====================
    /// Failed to create an image buffer from surface data.
    #[error("failed to create image buffer")]
    ImageBufferFailed,

    /// Failed to encode PNG image.
    #[error("failed to encode PNG: {message}")]
    PngEncodeFailed {
        /// The encoding error message.
        message: String,
    },
}

impl Error {
    /// The innermost error, looking through [`Error::CorruptFile`] wrappers.
    #[must_use]
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::CorruptFile { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Structural errors in a ZTGFX container or palette stream.
#[derive(Error, Debug)]
pub enum FormatError {
    /// The stream ended before a fixed-size field or record was complete.
    #[error("stream truncated while reading {field}")]
    Truncated {
        /// The field being read when the stream ran out.
        field: &'static str,
        /// The original read failure.
        #[source]
        source: std::io::Error,
    },

    /// A length-prefixed field declared a negative size.
    #[error("invalid length for {field}: {value}")]
    InvalidLength {
        /// The field carrying the bad length.
        field: &'static str,
        /// The declared value.
        value: i32,
    },

    /// A read failed for a reason other than running out of data.
    #[error("IO error while reading {field}: {source}")]
    Io {
        /// The field being read.
        field: &'static str,
        /// The original read failure.
        #[source]
        source: std::io::Error,
    },
}

impl FormatError {
    /// Classify a read failure on `field`: end-of-stream becomes
    /// [`FormatError::Truncated`], anything else [`FormatError::Io`].
    pub(crate) fn from_read(field: &'static str, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::UnexpectedEof {
            FormatError::Truncated { field, source }
        } else {
            FormatError::Io { field, source }
        }
    }
}

/// Palette lookup and loading errors.
#[derive(Error, Debug)]
pub enum PaletteError {
    /// The referenced palette file could not be opened.
    #[error("palette file not found: {}", path.display())]
    NotFound {
        /// The resolved palette path.
        path: PathBuf,
        /// The file-system failure.
        #[source]
        source: std::io::Error,
    },

    /// A pixel run references an index the palette does not define.
    #[error("palette index {index} out of range (palette has {color_count} colors)")]
    IndexOutOfRange {
        /// The offending palette index.
        index: u8,
        /// Number of colors in the palette.
        color_count: usize,
    },
}

/// A specialized Result type for `ZtGfx` operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_eof_is_truncated() {
        let err = FormatError::from_read("frame_count", io::Error::from(io::ErrorKind::UnexpectedEof));
        assert!(matches!(err, FormatError::Truncated { field: "frame_count", .. }));
    }

    #[test]
    fn test_other_io_is_not_truncated() {
        let err = FormatError::from_read("height", io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(err, FormatError::Io { field: "height", .. }));
    }

    #[test]
    fn test_root_cause_unwraps_corrupt_file() {
        let inner = Error::Palette(PaletteError::IndexOutOfRange { index: 9, color_count: 2 });
        let err = Error::CorruptFile {
            path: PathBuf::from("a.ztgfx"),
            source: Box::new(inner),
        };
        assert!(matches!(
            err.root_cause(),
            Error::Palette(PaletteError::IndexOutOfRange { index: 9, color_count: 2 })
        ));
        assert!(err.to_string().contains("not recognized or is corrupt"));
    }
}
