//! Command-line surface
//!
//! Argument values are decoded here; the commands only see typed values.

use clap::{ArgAction, Args, Parser, Subcommand};
use mti_common::{Context, DocType};
use std::path::PathBuf;

use crate::source::SourceKind;

/// Medical terminology importer
#[derive(Parser, Debug)]
#[command(name = "mti-importer")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import a terminology file into the search index
    Import(ImportArgs),

    /// Upload a local terminology file to the private bucket
    Upload(UploadArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ImportArgs {
    /// Terminology the file belongs to (snomed-ct, icd-10-gm)
    #[arg(long)]
    pub context: Context,

    /// Record layout of the file (snomed-ct-description, icd-10-gm-code)
    #[arg(long, alias = "doc_type")]
    pub doc_type: DocType,

    /// Where the file is read from; defaults to SOURCE_TYPE
    #[arg(long, alias = "source_type", value_enum)]
    pub source_type: Option<SourceKind>,

    /// Whether the first line is a header row (yes/no)
    #[arg(long, alias = "has_header", action = ArgAction::Set, required = true, value_parser = parse_bool)]
    pub has_header: bool,

    /// Field separator; escape sequences such as \t are decoded
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: String,

    /// Local path, or object key inside the bucket
    #[arg(long, alias = "file_path")]
    pub file_path: String,
}

#[derive(Args, Debug, Clone)]
pub struct UploadArgs {
    /// Local file to upload
    #[arg(long)]
    pub file: PathBuf,

    /// Object key, relative to FILE_KEY_BASE_DIR
    #[arg(long)]
    pub key: String,
}

/// Accepts yes/true/y/1 and no/false/n/0, in any case.
pub fn parse_bool(value: &str) -> Result<bool, String> {
    match value.trim().to_lowercase().as_str() {
        "yes" | "true" | "y" | "1" => Ok(true),
        "no" | "false" | "n" | "0" => Ok(false),
        _ => Err(format!("Boolean value expected, got '{}'", value)),
    }
}

/// Decode a delimiter given on the command line.
///
/// A single character is used as-is. Anything else is decoded for escape
/// sequences, falling back to the raw text when it isn't a valid escape
/// string.
pub fn parse_delimiter(value: &str) -> Result<String, String> {
    if value.is_empty() {
        return Err("Delimiter must not be empty".to_string());
    }
    if value.chars().count() == 1 {
        return Ok(value.to_string());
    }
    Ok(decode_escapes(value).unwrap_or_else(|| value.to_string()))
}

/// Replace backslash escapes with the characters they stand for.
///
/// Returns `None` on an unknown or truncated escape.
pub fn decode_escapes(value: &str) -> Option<String> {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        let decoded = match chars.next()? {
            't' => '\t',
            'n' => '\n',
            'r' => '\r',
            'f' => '\u{0c}',
            'b' => '\u{08}',
            'v' => '\u{0b}',
            'a' => '\u{07}',
            '0' => '\0',
            '\\' => '\\',
            '"' => '"',
            '\'' => '\'',
            'x' => {
                let hex: String = chars.by_ref().take(2).collect();
                if hex.len() != 2 {
                    return None;
                }
                char::from_u32(u32::from_str_radix(&hex, 16).ok()?)?
            }
            'u' => {
                let rest = chars.as_str();
                let (hex, consumed) = if let Some(braced) = rest.strip_prefix('{') {
                    let end = braced.find('}')?;
                    (&braced[..end], end + 2)
                } else {
                    (rest.get(..4)?, 4)
                };
                if hex.is_empty() {
                    return None;
                }
                let ch = char::from_u32(u32::from_str_radix(hex, 16).ok()?)?;
                chars = rest.get(consumed..)?.chars();
                ch
            }
            _ => return None,
        };
        out.push(decoded);
    }

    Some(out)
}
