//! Conversion command definitions.
//!
//! Each command names a legacy sprite format and carries only the
//! parameters its transcoder needs.

use std::fmt;

/// The kind of conversion a directive line requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// CL2 (indexed run-length) to CLX.
    Cl2ToClx,
    /// CEL (raster run-length) to CLX.
    CelToClx,
    /// PCX (indexed bitmap) to CLX.
    PcxToClx,
}

impl CommandKind {
    /// Directive keyword that selects this kind.
    pub fn keyword(&self) -> &'static str {
        match self {
            CommandKind::Cl2ToClx => "cl22clx",
            CommandKind::CelToClx => "cel2clx",
            CommandKind::PcxToClx => "pcx2clx",
        }
    }

    /// Look up a kind by its directive keyword.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "cl22clx" => Some(CommandKind::Cl2ToClx),
            "cel2clx" => Some(CommandKind::CelToClx),
            "pcx2clx" => Some(CommandKind::PcxToClx),
            _ => None,
        }
    }

    /// Short label of the source format, used in status messages.
    pub fn source_format(&self) -> &'static str {
        match self {
            CommandKind::Cl2ToClx => "CL2",
            CommandKind::CelToClx => "CEL",
            CommandKind::PcxToClx => "PCX",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

/// A conversion to CLX with the parameters of its source format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionCommand {
    /// Frame widths; the last width repeats for any remaining frames.
    Cl2ToClx { widths: Vec<u16> },

    /// Frame widths; the last width repeats for any remaining frames.
    CelToClx { widths: Vec<u16> },

    PcxToClx {
        /// Number of frames stacked vertically in the bitmap.
        num_frames: usize,
        /// Palette index rendered as transparent.
        transparent_color: Option<u8>,
        /// Also write the 768-byte palette next to the output.
        export_palette: bool,
    },
}

impl ConversionCommand {
    /// The kind of this command.
    pub fn kind(&self) -> CommandKind {
        match self {
            ConversionCommand::Cl2ToClx { .. } => CommandKind::Cl2ToClx,
            ConversionCommand::CelToClx { .. } => CommandKind::CelToClx,
            ConversionCommand::PcxToClx { .. } => CommandKind::PcxToClx,
        }
    }

    /// Default command of a kind, before any flags are applied.
    pub fn empty(kind: CommandKind) -> Self {
        match kind {
            CommandKind::Cl2ToClx => ConversionCommand::Cl2ToClx { widths: vec![] },
            CommandKind::CelToClx => ConversionCommand::CelToClx { widths: vec![] },
            CommandKind::PcxToClx => ConversionCommand::PcxToClx {
                num_frames: 1,
                transparent_color: None,
                export_palette: false,
            },
        }
    }
}
