use std::path::PathBuf;

/// Errors raised around the expander: reading configs, FASTA I/O, globbing.
///
/// Expansion itself has no error path.
#[derive(thiserror::Error, Debug)]
pub enum DslSeqError {
    #[error("file does not exist: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("{path}, line {line}: {message}")]
    ConfigSyntax {
        path: String,
        line: usize,
        message: String,
    },

    #[error("no section: '{0}'")]
    NoSection(String),

    #[error("no option '{option}' in section: '{section}'")]
    NoOption { section: String, option: String },

    #[error("bad interpolation of option '{option}' in section '{section}': {reason}")]
    Interpolation {
        section: String,
        option: String,
        reason: String,
    },

    #[error("invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("cannot read glob match: {0}")]
    Glob(#[from] glob::GlobError),

    #[error("{path}: {source}")]
    FileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DslSeqError {
    pub(crate) fn file_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DslSeqError::FileIo {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, DslSeqError>;
