//! Error types for csv2pdf.
//!
//! Every failure in the conversion pipeline surfaces as one of these variants;
//! the message names the operation that failed and the underlying cause.

use std::path::PathBuf;

/// Result type alias for csv2pdf operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while converting CSV to PDF.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No font directory was given and none is bundled
    #[error("no font directory given, and no font directory is bundled: {0}")]
    NoFontAssets(String),

    /// Charset label not known to the decoder
    #[error("unknown charset {0:?}")]
    UnknownCharset(String),

    /// Charset mapping file is missing or malformed
    #[error("error loading charset mapping from {path:?}: {reason}")]
    CharsetMap {
        /// Path of the mapping file
        path: PathBuf,
        /// Reason for the failure
        reason: String,
    },

    /// IO error with the operation that caused it
    #[error("{context}: {source}")]
    Io {
        /// The failing operation, e.g. "error opening \"a.csv\""
        context: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Malformed CSV record
    #[error("error parsing csv: {0}")]
    Csv(#[from] csv::Error),

    /// Input contained no records at all
    #[error("error reading csv header: input is empty")]
    EmptyInput,

    /// Font archive could not be read
    #[error("error opening font archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// A single archive entry could not be extracted
    #[error("error extracting {entry:?}: {reason}")]
    Extraction {
        /// Entry name inside the archive
        entry: String,
        /// Reason for the failure
        reason: String,
    },

    /// PDF generation failed
    #[error("error writing PDF: {0}")]
    Pdf(String),
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            context: "IO error".to_string(),
            source,
        }
    }
}

/// Attach the failing operation to an IO result.
pub trait IoContext<T> {
    /// Wrap the error with a lazily built description of the operation.
    fn context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> IoContext<T> for std::result::Result<T, std::io::Error> {
    fn context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|source| Error::Io {
            context: f().into(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_context_message() {
        let res: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"));
        let err = res.context(|| "error opening \"a.csv\"").unwrap_err();
        let msg = format!("{}", err);
        assert!(msg.starts_with("error opening \"a.csv\""));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_charset_map_error() {
        let err = Error::CharsetMap {
            path: PathBuf::from("/fonts/iso-8859-2.map"),
            reason: "line 3: bad code".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("iso-8859-2.map"));
        assert!(msg.contains("line 3"));
    }

    #[test]
    fn test_empty_input_error() {
        let msg = format!("{}", Error::EmptyInput);
        assert!(msg.contains("empty"));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
