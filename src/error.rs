use miette::Diagnostic;
use thiserror::Error;

use crate::codec::CodecError;
use crate::pipeline::spell_icons::ExtractError;
use crate::types::CommandKind;

/// Main error type for archive conversion.
///
/// Every variant aborts the batch. Conditions the pipeline can skip past
/// (excluded files, optional members that are absent, failed output writes)
/// never surface as errors.
#[derive(Error, Diagnostic, Debug)]
pub enum MinifyError {
    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(minify::io))]
    Io {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("Parse error: {message}")]
    #[diagnostic(code(minify::parse))]
    Parse {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(minify::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Failed to read archive file {path}: {message}")]
    #[diagnostic(code(minify::archive))]
    Archive { path: String, message: String },

    #[error("Failed {format}->CLX conversion of {asset}: {source}")]
    #[diagnostic(code(minify::codec))]
    Codec {
        format: &'static str,
        asset: String,
        #[source]
        source: CodecError,
    },

    #[error("Failed to extract spell icons from {asset}: {source}")]
    #[diagnostic(code(minify::spell_icons))]
    SpellIcons {
        asset: String,
        #[source]
        source: ExtractError,
    },

    #[error("{message}")]
    #[diagnostic(code(minify::usage))]
    Usage {
        message: String,
        #[help]
        help: Option<String>,
    },
}

impl MinifyError {
    pub(crate) fn codec(kind: CommandKind, asset: impl Into<String>, source: CodecError) -> Self {
        Self::Codec {
            format: kind.source_format(),
            asset: asset.into(),
            source,
        }
    }

    pub(crate) fn archive(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Archive {
            path: path.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MinifyError>;
