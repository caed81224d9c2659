//! SCPI numeric keywords (`MINimum`, `MAXimum`, `DEFault`, ...).

use serde::{Deserialize, Serialize};

/// A recognized numeric keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NumericKeyword {
    /// `MINimum`
    Minimum,
    /// `MAXimum`
    Maximum,
    /// `DEFault`
    Default,
    /// `INFinity` / `+INF`
    InfinityPos,
    /// `NINFinity` / `-INF`
    InfinityNeg,
    /// `NAN` / `NOTANumber`
    NotANumber,
    /// `UP`
    Up,
    /// `DOWN`
    Down,
}

/// Check an (uppercased) input against a short/long mnemonic pair.
///
/// Accepts the exact short form, the exact long form, or any prefix of the
/// long form at least as long as the short form. This is the same matching
/// rule the command tree applies to mnemonics.
fn matches_mnemonic(input: &str, short: &str, long: &str) -> bool {
    if input == short || input == long {
        return true;
    }
    input.len() >= short.len() && input.len() <= long.len() && long.starts_with(input)
}

/// Parse a string as a numeric keyword. Matching is case-insensitive.
pub fn parse_numeric_keyword(s: &str) -> Option<NumericKeyword> {
    if s.is_empty() {
        return None;
    }
    let upper = s.to_ascii_uppercase();

    // Signed infinity spellings come first; the sign is part of the token.
    if upper == "+INF" || upper == "+INFINITY" {
        return Some(NumericKeyword::InfinityPos);
    }
    if upper == "-INF" || upper == "-INFINITY" {
        return Some(NumericKeyword::InfinityNeg);
    }

    if matches_mnemonic(&upper, "MIN", "MINIMUM") {
        return Some(NumericKeyword::Minimum);
    }
    if matches_mnemonic(&upper, "MAX", "MAXIMUM") {
        return Some(NumericKeyword::Maximum);
    }
    if matches_mnemonic(&upper, "DEF", "DEFAULT") {
        return Some(NumericKeyword::Default);
    }
    if matches_mnemonic(&upper, "INF", "INFINITY") {
        return Some(NumericKeyword::InfinityPos);
    }
    if matches_mnemonic(&upper, "NINF", "NINFINITY") {
        return Some(NumericKeyword::InfinityNeg);
    }
    if upper == "NAN" || matches_mnemonic(&upper, "NOTA", "NOTANUMBER") {
        return Some(NumericKeyword::NotANumber);
    }
    if upper == "UP" {
        return Some(NumericKeyword::Up);
    }
    if upper == "DOWN" {
        return Some(NumericKeyword::Down);
    }

    None
}

/// Returns `true` if `s` parses as a numeric keyword.
pub fn is_numeric_keyword(s: &str) -> bool {
    parse_numeric_keyword(s).is_some()
}

impl NumericKeyword {
    /// Canonical long name (`"MINIMUM"`, `"NINFINITY"`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            NumericKeyword::Minimum => "MINIMUM",
            NumericKeyword::Maximum => "MAXIMUM",
            NumericKeyword::Default => "DEFAULT",
            NumericKeyword::InfinityPos => "INFINITY",
            NumericKeyword::InfinityNeg => "NINFINITY",
            NumericKeyword::NotANumber => "NAN",
            NumericKeyword::Up => "UP",
            NumericKeyword::Down => "DOWN",
        }
    }

    /// Canonical short name (`"MIN"`, `"NINF"`, ...).
    pub fn short_str(&self) -> &'static str {
        match self {
            NumericKeyword::Minimum => "MIN",
            NumericKeyword::Maximum => "MAX",
            NumericKeyword::Default => "DEF",
            NumericKeyword::InfinityPos => "INF",
            NumericKeyword::InfinityNeg => "NINF",
            NumericKeyword::NotANumber => "NAN",
            NumericKeyword::Up => "UP",
            NumericKeyword::Down => "DOWN",
        }
    }

    /// Canonical `f64` value: infinities and NaN map to themselves, every
    /// other keyword maps to `0.0` (callers resolve MIN/MAX/DEF through
    /// context, e.g. [`crate::params::Parameter::to_f64_or`]).
    pub fn to_f64(&self) -> f64 {
        match self {
            NumericKeyword::InfinityPos => f64::INFINITY,
            NumericKeyword::InfinityNeg => f64::NEG_INFINITY,
            NumericKeyword::NotANumber => f64::NAN,
            _ => 0.0,
        }
    }

    /// Returns `true` for positive or negative infinity.
    pub fn is_infinity(&self) -> bool {
        matches!(
            self,
            NumericKeyword::InfinityPos | NumericKeyword::InfinityNeg
        )
    }

    /// Returns `true` for MIN, MAX, or DEF.
    pub fn is_min_max_def(&self) -> bool {
        matches!(
            self,
            NumericKeyword::Minimum | NumericKeyword::Maximum | NumericKeyword::Default
        )
    }

    /// Returns `true` for UP or DOWN.
    pub fn is_up_down(&self) -> bool {
        matches!(self, NumericKeyword::Up | NumericKeyword::Down)
    }
}

impl std::fmt::Display for NumericKeyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
