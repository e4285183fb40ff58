//! Fuel gauge: turns a `numerator/denominator` line into an `E`, `F` or
//! `NN%` reading.

use std::fmt;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

use tracing::debug;

use crate::error::GaugeError;

pub const PROMPT: &str = "Fraction: ";

/// A proper, non-negative fraction with a non-zero denominator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fraction {
    numerator: i128,
    denominator: i128,
}

impl Fraction {
    pub fn new(numerator: i128, denominator: i128) -> Result<Self, GaugeError> {
        if denominator == 0 {
            return Err(GaugeError::ZeroDenominator);
        }
        if numerator < 0 {
            return Err(GaugeError::Negative);
        }
        if numerator > denominator {
            return Err(GaugeError::Improper);
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// `numerator / denominator * 100`, rounded half to even.
    ///
    /// Computed exactly over integers, so ties such as `1/8` (12.5) land on
    /// the even neighbour and operands up to `i128::MAX` never overflow.
    pub fn percent(&self) -> u8 {
        let numerator = self.numerator.unsigned_abs();
        let denominator = self.denominator.unsigned_abs();

        // Shift-and-add over the bits of 100, keeping `remainder < denominator`.
        // Both operands are below 2^127, so doubling stays inside u128.
        let (mut quotient, mut remainder) = (0u128, 0u128);
        for bit in (0..7).rev() {
            quotient *= 2;
            remainder *= 2;
            if remainder >= denominator {
                remainder -= denominator;
                quotient += 1;
            }
            if (100 >> bit) & 1 == 1 {
                remainder += numerator;
                if remainder >= denominator {
                    remainder -= denominator;
                    quotient += 1;
                }
            }
        }

        let twice_remainder = remainder * 2;
        let rounded = if twice_remainder > denominator
            || (twice_remainder == denominator && quotient % 2 == 1)
        {
            quotient + 1
        } else {
            quotient
        };

        // 0 <= numerator <= denominator keeps this within 0..=100
        rounded as u8
    }

    pub fn reading(&self) -> Reading {
        Reading::from_percent(self.percent())
    }
}

impl FromStr for Fraction {
    type Err = GaugeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = s.split('/').collect();
        let [numerator, denominator] = tokens.as_slice() else {
            return Err(GaugeError::Format(s.to_string()));
        };
        Fraction::new(parse_int(numerator)?, parse_int(denominator)?)
    }
}

fn parse_int(token: &str) -> Result<i128, GaugeError> {
    token
        .trim()
        .parse()
        .map_err(|_| GaugeError::Parse(token.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reading {
    Empty,
    Full,
    Percent(u8),
}

impl Reading {
    pub fn from_percent(percent: u8) -> Self {
        match percent {
            p if p >= 99 => Reading::Full,
            p if p <= 1 => Reading::Empty,
            p => Reading::Percent(p),
        }
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reading::Empty => f.write_str("E"),
            Reading::Full => f.write_str("F"),
            Reading::Percent(p) => write!(f, "{p}%"),
        }
    }
}

/// Prompts on `output` until a valid fraction is read from `input`.
///
/// Invalid lines are dropped and the prompt is repeated. Running out of
/// input before a valid line is an [`io::ErrorKind::UnexpectedEof`] error.
pub fn read_reading<R: BufRead, W: Write>(mut input: R, mut output: W) -> io::Result<Reading> {
    let mut line = String::new();
    loop {
        output.write_all(PROMPT.as_bytes())?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed before a valid fraction was entered",
            ));
        }

        let entered = line.trim_end_matches(['\r', '\n']);
        match entered.parse::<Fraction>() {
            Ok(fraction) => return Ok(fraction.reading()),
            Err(e) => debug!(input = entered, reason = %e, "Rejected fraction"),
        }
    }
}
