//! Parsers for conversion directive files.
//!
//! Directive files (`<archive>-clx.txt`) describe, one line at a time, which
//! archive members are converted to CLX and how.
//!
//! # Usage
//!
//! ```ignore
//! use mpq_minify::parser::parse_directives;
//!
//! let source = std::fs::read_to_string("data/diabdat-clx.txt")?;
//! for directive in parse_directives(source.lines())? {
//!     println!("{} -> {:?}", directive.command.kind(), directive.files);
//! }
//! ```

mod command;
pub mod number;

pub use command::{parse_directive, parse_directives, Directive};
pub use number::{parse_int, parse_int_in, parse_int_list};
