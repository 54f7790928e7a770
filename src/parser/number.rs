//! Bounded integer parsing for directive arguments.

use std::fmt::Display;
use std::num::IntErrorKind;
use std::str::FromStr;

use crate::error::{MinifyError, Result};

/// Integer types accepted by directive flags.
pub trait DirectiveInt: FromStr<Err = std::num::ParseIntError> + PartialOrd + Display + Copy {
    const MIN: Self;
    const MAX: Self;
}

macro_rules! directive_int {
    ($($t:ty),*) => {
        $(impl DirectiveInt for $t {
            const MIN: Self = <$t>::MIN;
            const MAX: Self = <$t>::MAX;
        })*
    };
}

directive_int!(u8, u16, u32, usize);

/// Parse an integer within `[min, max]`.
pub fn parse_int_in<T: DirectiveInt>(text: &str, min: T, max: T) -> Result<T> {
    let out_of_range = || MinifyError::Parse {
        message: format!("expected a number between {} and {}, got {}", min, max, text),
        help: None,
    };
    match text.parse::<T>() {
        Ok(value) if value < min || value > max => Err(out_of_range()),
        Ok(value) => Ok(value),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => Err(out_of_range()),
            _ => Err(MinifyError::Parse {
                message: format!("expected a number, got {}", text),
                help: None,
            }),
        },
    }
}

/// Parse an integer over the full range of `T`.
pub fn parse_int<T: DirectiveInt>(text: &str) -> Result<T> {
    parse_int_in(text, T::MIN, T::MAX)
}

/// Parse a comma-separated list of integers, e.g. `96,128,96`.
pub fn parse_int_list<T: DirectiveInt>(text: &str) -> Result<Vec<T>> {
    text.split(',').map(parse_int).collect()
}
