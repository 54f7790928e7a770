//! Conversion directive parser.
//!
//! A directive file holds one command per line:
//!
//! ```text
//! # comment
//! cel2clx --width 28 ctrlpan/smaltext.cel
//! cl22clx --width 96 --combine towners/smith/smithn.cl2 towners/smith/smithw.cl2
//! pcx2clx --num-sprites 4 --transparent-color 1 gendata/cutportr.pcx
//! ```
//!
//! The first token selects the command, flags follow, and every other token
//! names a file the command applies to.

use std::str::SplitWhitespace;

use crate::error::{MinifyError, Result};
use crate::types::{CommandKind, ConversionCommand};

use super::number::{parse_int, parse_int_list};

/// A parsed directive line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub command: ConversionCommand,
    /// Target files in declaration order.
    pub files: Vec<String>,
    /// All files of the line are combined into one sheet (`cl22clx` only).
    pub combine: bool,
}

/// Parse a single directive line.
///
/// Returns `Ok(None)` for blank lines and `#` comments.
pub fn parse_directive(line: &str) -> Result<Option<Directive>> {
    let mut tokens = line.split_whitespace();
    let keyword = match tokens.next() {
        None => return Ok(None),
        Some(token) if token.starts_with('#') => return Ok(None),
        Some(token) => token,
    };

    let kind = CommandKind::from_keyword(keyword).ok_or_else(|| MinifyError::Parse {
        message: format!("Unknown command: {}", keyword),
        help: Some("Expected one of cl22clx, cel2clx, pcx2clx".to_string()),
    })?;

    let mut command = ConversionCommand::empty(kind);
    let mut files = Vec::new();
    let mut combine = false;

    while let Some(arg) = tokens.next() {
        match (&mut command, arg) {
            (
                ConversionCommand::Cl2ToClx { widths } | ConversionCommand::CelToClx { widths },
                "--width",
            ) => {
                *widths = parse_int_list(flag_value(&mut tokens, arg)?)?;
            }
            (ConversionCommand::Cl2ToClx { .. }, "--combine") => combine = true,
            (ConversionCommand::PcxToClx { num_frames, .. }, "--num-sprites") => {
                *num_frames = parse_int(flag_value(&mut tokens, arg)?)?;
            }
            (ConversionCommand::PcxToClx { transparent_color, .. }, "--transparent-color") => {
                *transparent_color = Some(parse_int::<u8>(flag_value(&mut tokens, arg)?)?);
            }
            (ConversionCommand::PcxToClx { export_palette, .. }, "--export-palette") => {
                *export_palette = true;
            }
            (_, flag) if flag.starts_with('-') => {
                return Err(MinifyError::Parse {
                    message: format!("Unknown argument: {}", flag),
                    help: Some(format!("{} does not accept {}", kind, flag)),
                });
            }
            (_, file) => files.push(file.to_string()),
        }
    }

    Ok(Some(Directive {
        command,
        files,
        combine,
    }))
}

/// Parse every line of a directive file.
///
/// Errors are annotated with the 1-based line number.
pub fn parse_directives<'a>(lines: impl IntoIterator<Item = &'a str>) -> Result<Vec<Directive>> {
    let mut directives = Vec::new();
    for (index, line) in lines.into_iter().enumerate() {
        match parse_directive(line) {
            Ok(Some(directive)) => directives.push(directive),
            Ok(None) => {}
            Err(MinifyError::Parse { message, help }) => {
                return Err(MinifyError::Parse {
                    message: format!("line {}: {}", index + 1, message),
                    help,
                });
            }
            Err(e) => return Err(e),
        }
    }
    Ok(directives)
}

/// Take the value token following a flag.
fn flag_value<'a>(tokens: &mut SplitWhitespace<'a>, flag: &str) -> Result<&'a str> {
    tokens.next().ok_or_else(|| MinifyError::Parse {
        message: format!("{} requires a value", flag),
        help: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(line: &str) -> Directive {
        parse_directive(line).unwrap().unwrap()
    }

    fn parse_err(line: &str) -> String {
        match parse_directive(line).unwrap_err() {
            MinifyError::Parse { message, .. } => message,
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_blank_and_comment_lines_are_skipped() {
        assert!(parse_directive("").unwrap().is_none());
        assert!(parse_directive("   \t ").unwrap().is_none());
        assert!(parse_directive("# cel2clx --bogus").unwrap().is_none());
        assert!(parse_directive("#comment").unwrap().is_none());
    }

    #[test]
    fn test_cel_with_widths() {
        let directive = parse("cel2clx --width 28,13 ctrlpan/smaltext.cel data/char.cel");
        assert_eq!(
            directive,
            Directive {
                command: ConversionCommand::CelToClx { widths: vec![28, 13] },
                files: vec!["ctrlpan/smaltext.cel".to_string(), "data/char.cel".to_string()],
                combine: false,
            }
        );
    }

    #[test]
    fn test_cl2_combine() {
        let directive = parse("cl22clx --combine --width 96 towners/smith/smithn.cl2 towners/smith/smithw.cl2");
        assert!(directive.combine);
        assert_eq!(directive.command, ConversionCommand::Cl2ToClx { widths: vec![96] });
        assert_eq!(directive.files.len(), 2);
    }

    #[test]
    fn test_pcx_flags() {
        let directive = parse("pcx2clx --num-sprites 4 --transparent-color 1 --export-palette gendata/cutportr.pcx");
        assert_eq!(
            directive.command,
            ConversionCommand::PcxToClx {
                num_frames: 4,
                transparent_color: Some(1),
                export_palette: true,
            }
        );
        assert_eq!(directive.files, vec!["gendata/cutportr.pcx"]);
    }

    #[test]
    fn test_pcx_defaults() {
        let directive = parse("pcx2clx ui_art/title.pcx");
        assert_eq!(directive.command, ConversionCommand::empty(CommandKind::PcxToClx));
    }

    #[test]
    fn test_extra_whitespace_between_tokens() {
        let directive = parse("cel2clx   --width\t64   a.cel  ");
        assert_eq!(directive.command, ConversionCommand::CelToClx { widths: vec![64] });
        assert_eq!(directive.files, vec!["a.cel"]);
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(parse_err("wav2mp3 music/dintro.wav"), "Unknown command: wav2mp3");
    }

    #[test]
    fn test_unknown_flag_names_token() {
        assert_eq!(parse_err("cel2clx --combine a.cel"), "Unknown argument: --combine");
        assert_eq!(parse_err("pcx2clx --width 3 a.pcx"), "Unknown argument: --width");
        assert_eq!(parse_err("cl22clx -x a.cl2"), "Unknown argument: -x");
    }

    #[test]
    fn test_transparent_color_bounds() {
        assert_eq!(
            parse_err("pcx2clx --transparent-color 300 a.pcx"),
            "expected a number between 0 and 255, got 300"
        );
    }

    #[test]
    fn test_zero_sprites_parsed() {
        let directive = parse("pcx2clx --num-sprites 0 a.pcx");
        assert_eq!(
            directive.command,
            ConversionCommand::PcxToClx {
                num_frames: 0,
                transparent_color: None,
                export_palette: false,
            }
        );
    }

    #[test]
    fn test_negative_sprites_rejected() {
        assert!(parse_err("pcx2clx --num-sprites -1 a.pcx").contains("-1"));
    }

    #[test]
    fn test_missing_flag_value() {
        assert_eq!(parse_err("cel2clx --width"), "--width requires a value");
    }

    #[test]
    fn test_parse_directives_reports_line() {
        let err = parse_directives(["# header", "cel2clx a.cel", "cel2clx --oops b.cel"]).unwrap_err();
        match err {
            MinifyError::Parse { message, .. } => {
                assert_eq!(message, "line 3: Unknown argument: --oops")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_directives_skips_noise() {
        let directives = parse_directives(["", "# only comments", "cel2clx a.cel", ""]).unwrap();
        assert_eq!(directives.len(), 1);
    }
}
