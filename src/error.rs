//! Error type shared by every module of Panes
//!
//! One enum covers file I/O, the settings file, bad search input and the
//! structural failures of pane/tab operations (no editor, cancelled prompt).
//! Per-file failures inside a batch search or replace are collected instead
//! of returned, so the batch keeps going.

use log::warn;
use std::fmt;
use std::io;
use std::path::PathBuf;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// Bare I/O failure with no file attached (temp files, config backup)
    Io(io::Error),
    FileRead {
        path: PathBuf,
        source: io::Error,
    },
    FileWrite {
        path: PathBuf,
        source: io::Error,
    },
    /// Readable, but not UTF-8
    InvalidUtf8 { path: PathBuf },

    ConfigLoad { path: PathBuf, source: BoxedSource },
    ConfigSave { path: PathBuf, source: BoxedSource },
    ConfigParse {
        message: String,
        source: Option<BoxedSource>,
    },
    /// The platform reported no config directory
    ConfigDirNotFound,

    /// Find was started with nothing typed
    EmptySearch,
    /// The scope (open tabs or directory) yielded no files
    NoFilesToSearch,

    NoActiveEditor,
    /// Plain save on an untitled document
    NoFilePath,
    /// The user backed out of a prompt
    Cancelled,

    Clipboard(String),
    Application(String),
}

impl Error {
    /// Map a failed read to `InvalidUtf8` when the bytes were the problem,
    /// `FileRead` otherwise.
    pub fn from_read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            io::ErrorKind::InvalidData => Error::InvalidUtf8 { path },
            _ => Error::FileRead { path, source },
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        let message = err.to_string();
        Error::ConfigParse {
            message,
            source: Some(Box::new(err)),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::FileRead { path, source } => {
                write!(f, "Could not read '{}': {}", path.display(), source)
            }
            Error::FileWrite { path, source } => {
                write!(f, "Could not write '{}': {}", path.display(), source)
            }
            Error::InvalidUtf8 { path } => {
                write!(f, "'{}' is not valid UTF-8 text", path.display())
            }

            Error::ConfigLoad { path, source } => {
                write!(f, "Settings file '{}' unreadable: {}", path.display(), source)
            }
            Error::ConfigSave { path, source } => {
                write!(f, "Settings not written to '{}': {}", path.display(), source)
            }
            Error::ConfigParse { message, .. } => write!(f, "Malformed settings: {}", message),
            Error::ConfigDirNotFound => f.write_str("No configuration directory on this system"),

            Error::EmptySearch => f.write_str("Please enter search text"),
            Error::NoFilesToSearch => f.write_str("No files to search"),

            Error::NoActiveEditor => f.write_str("No active editor"),
            Error::NoFilePath => f.write_str("Document has no file path"),
            Error::Cancelled => f.write_str("Operation cancelled"),

            Error::Clipboard(msg) => write!(f, "Clipboard error: {}", msg),
            Error::Application(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err)
            | Error::FileRead { source: err, .. }
            | Error::FileWrite { source: err, .. } => Some(err),
            Error::ConfigLoad { source, .. } | Error::ConfigSave { source, .. } => {
                Some(source.as_ref())
            }
            Error::ConfigParse {
                source: Some(source),
                ..
            } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Fall back to a default instead of failing, leaving a warning in the log.
pub trait ResultExt<T> {
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T;
}

impl<T> ResultExt<T> for Result<T> {
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T {
        self.unwrap_or_else(|err| {
            warn!("{}: {}. Using default.", context, err);
            default
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    #[test]
    fn test_question_mark_on_io_error() {
        fn touch() -> Result<()> {
            Err(io::Error::new(io::ErrorKind::NotFound, "gone"))?;
            Ok(())
        }
        assert!(matches!(touch(), Err(Error::Io(_))));
    }

    #[test]
    fn test_from_read_classifies_invalid_data() {
        let err = Error::from_read(
            "/tmp/binary.txt",
            io::Error::new(io::ErrorKind::InvalidData, "stream did not contain valid UTF-8"),
        );
        assert!(matches!(err, Error::InvalidUtf8 { .. }));

        let err = Error::from_read("/tmp/gone.txt", io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(err, Error::FileRead { .. }));
    }

    #[test]
    fn test_search_input_messages() {
        assert_eq!(Error::EmptySearch.to_string(), "Please enter search text");
        assert_eq!(Error::NoFilesToSearch.to_string(), "No files to search");
    }

    #[test]
    fn test_bad_json_becomes_config_parse() {
        let parsed: std::result::Result<u32, _> = serde_json::from_str("{ nope");
        let err = Error::from(parsed.unwrap_err());
        assert!(matches!(err, Error::ConfigParse { .. }));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_file_write_message_names_path_and_cause() {
        let err = Error::FileWrite {
            path: PathBuf::from("/test/notes.txt"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("notes.txt"));
        assert!(msg.contains("denied"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_structural_errors_have_no_source() {
        assert!(Error::Cancelled.source().is_none());
        assert!(Error::NoActiveEditor.source().is_none());
        assert!(Error::InvalidUtf8 {
            path: PathBuf::from("x")
        }
        .source()
        .is_none());
    }

    #[test]
    fn test_is_cancelled() {
        assert!(Error::Cancelled.is_cancelled());
        assert!(!Error::NoFilePath.is_cancelled());
    }

    #[test]
    fn test_unwrap_or_warn_default() {
        let ok: Result<i32> = Ok(42);
        assert_eq!(ok.unwrap_or_warn_default(0, "answer"), 42);

        let err: Result<i32> = Err(Error::Application("boom".to_string()));
        assert_eq!(err.unwrap_or_warn_default(7, "answer"), 7);
    }
}
