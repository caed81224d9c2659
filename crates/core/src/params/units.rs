//! SI prefixes, base units, and numeric-with-unit parsing.
//!
//! Implements the SCPI suffix program-data rules: a numeric literal may be
//! followed (without separator) by an SI prefix and a base-unit mnemonic,
//! e.g. `100mV`, `1.5e6Hz`, `2.2kOHM`. Case is significant only where the
//! standard makes it so: lowercase `m` is always milli, uppercase `M` is
//! mega, everything else is matched case-insensitively.

use serde::{Deserialize, Serialize};

/// SI magnitude prefix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiPrefix {
    /// No prefix (multiplier 1).
    #[default]
    None,
    /// `f` (1e-15)
    Femto,
    /// `p` (1e-12)
    Pico,
    /// `n` (1e-9)
    Nano,
    /// `u` (1e-6)
    Micro,
    /// `m` (1e-3)
    Milli,
    /// `k` / `K` (1e3)
    Kilo,
    /// `M` (1e6)
    Mega,
    /// `G` (1e9)
    Giga,
    /// `T` (1e12)
    Tera,
}

impl SiPrefix {
    /// The multiplier this prefix scales by.
    pub fn multiplier(&self) -> f64 {
        match self {
            SiPrefix::Femto => 1e-15,
            SiPrefix::Pico => 1e-12,
            SiPrefix::Nano => 1e-9,
            SiPrefix::Micro => 1e-6,
            SiPrefix::Milli => 1e-3,
            SiPrefix::None => 1.0,
            SiPrefix::Kilo => 1e3,
            SiPrefix::Mega => 1e6,
            SiPrefix::Giga => 1e9,
            SiPrefix::Tera => 1e12,
        }
    }

    /// Canonical suffix letter (`"m"`, `"M"`, `"k"`, ...). Empty for
    /// [`SiPrefix::None`].
    pub fn as_str(&self) -> &'static str {
        match self {
            SiPrefix::Femto => "f",
            SiPrefix::Pico => "p",
            SiPrefix::Nano => "n",
            SiPrefix::Micro => "u",
            SiPrefix::Milli => "m",
            SiPrefix::None => "",
            SiPrefix::Kilo => "k",
            SiPrefix::Mega => "M",
            SiPrefix::Giga => "G",
            SiPrefix::Tera => "T",
        }
    }
}

/// Recognized base units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseUnit {
    /// Pure number, no unit.
    #[default]
    None,
    /// `V` — volt
    Volt,
    /// `A` — ampere
    Ampere,
    /// `W` — watt
    Watt,
    /// `OHM` — ohm
    Ohm,
    /// `F` — farad
    Farad,
    /// `H` — henry
    Henry,
    /// `Hz` — hertz
    Hertz,
    /// `s` — second
    Second,
    /// `CEL` — degree Celsius
    Celsius,
    /// `K` — kelvin
    Kelvin,
    /// `FAR` — degree Fahrenheit
    Fahrenheit,
    /// `DEG` — degree of arc
    Degree,
    /// `RAD` — radian
    Radian,
    /// `PCT` / `%` — percent
    Percent,
    /// `dB` — decibel
    Decibel,
    /// `dBm` — decibel-milliwatt
    Dbm,
}

impl BaseUnit {
    /// Canonical mnemonic used when formatting (`"V"`, `"Hz"`, `"OHM"`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            BaseUnit::None => "",
            BaseUnit::Volt => "V",
            BaseUnit::Ampere => "A",
            BaseUnit::Watt => "W",
            BaseUnit::Ohm => "OHM",
            BaseUnit::Farad => "F",
            BaseUnit::Henry => "H",
            BaseUnit::Hertz => "Hz",
            BaseUnit::Second => "s",
            BaseUnit::Celsius => "CEL",
            BaseUnit::Kelvin => "K",
            BaseUnit::Fahrenheit => "FAR",
            BaseUnit::Degree => "DEG",
            BaseUnit::Radian => "RAD",
            BaseUnit::Percent => "%",
            BaseUnit::Decibel => "dB",
            BaseUnit::Dbm => "dBm",
        }
    }
}

/// Parse a base-unit mnemonic. Case-insensitive, long-name aliases included.
pub fn parse_base_unit(s: &str) -> BaseUnit {
    if s.is_empty() {
        return BaseUnit::None;
    }
    match s.to_ascii_uppercase().as_str() {
        "V" | "VOLT" | "VOLTS" => BaseUnit::Volt,
        "A" | "AMP" | "AMPERE" | "AMPERES" => BaseUnit::Ampere,
        "W" | "WATT" | "WATTS" => BaseUnit::Watt,
        "OHM" | "OHMS" => BaseUnit::Ohm,
        "F" | "FARAD" | "FARADS" => BaseUnit::Farad,
        "H" | "HENRY" | "HENRYS" | "HENRIES" => BaseUnit::Henry,
        "HZ" | "HERTZ" => BaseUnit::Hertz,
        "S" | "SEC" | "SECOND" | "SECONDS" => BaseUnit::Second,
        "CEL" | "CELSIUS" => BaseUnit::Celsius,
        "K" | "KELVIN" => BaseUnit::Kelvin,
        "FAR" | "FAHRENHEIT" => BaseUnit::Fahrenheit,
        "DEG" | "DEGREE" | "DEGREES" => BaseUnit::Degree,
        "RAD" | "RADIAN" | "RADIANS" => BaseUnit::Radian,
        "PCT" | "PERCENT" | "%" => BaseUnit::Percent,
        "DB" | "DECIBEL" | "DECIBELS" => BaseUnit::Decibel,
        "DBM" => BaseUnit::Dbm,
        _ => BaseUnit::None,
    }
}

/// A numeric value with its SI prefix and base unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitValue {
    /// Value as written, before prefix scaling.
    pub raw: f64,
    /// Value scaled into the base unit (`raw * multiplier`).
    pub scaled: f64,
    /// SI prefix.
    pub prefix: SiPrefix,
    /// Base unit.
    pub unit: BaseUnit,
    /// Multiplier applied by the prefix.
    pub multiplier: f64,
    /// `true` when a prefix or unit was present in the source.
    pub has_unit: bool,
}

impl Default for UnitValue {
    fn default() -> Self {
        Self {
            raw: 0.0,
            scaled: 0.0,
            prefix: SiPrefix::None,
            unit: BaseUnit::None,
            multiplier: 1.0,
            has_unit: false,
        }
    }
}

impl UnitValue {
    /// Build a unit value from its parts, computing the scaled form.
    pub fn new(raw: f64, prefix: SiPrefix, unit: BaseUnit) -> Self {
        let multiplier = prefix.multiplier();
        Self {
            raw,
            scaled: raw * multiplier,
            prefix,
            unit,
            multiplier,
            has_unit: true,
        }
    }
}

/// Resolve a single prefix character. Lowercase `m` and uppercase `M` are
/// handled by the caller (milli/mega disambiguation); every other letter is
/// case-insensitive per SCPI.
fn parse_prefix_char(c: u8) -> SiPrefix {
    match c {
        b'T' => SiPrefix::Tera,
        b'G' => SiPrefix::Giga,
        b'M' => SiPrefix::Mega,
        b'K' | b'k' => SiPrefix::Kilo,
        b'm' => SiPrefix::Milli,
        b'u' | b'U' => SiPrefix::Micro,
        b'n' | b'N' => SiPrefix::Nano,
        b'p' | b'P' => SiPrefix::Pico,
        b'f' | b'F' => SiPrefix::Femto,
        _ => SiPrefix::None,
    }
}

/// Resolve a unit suffix string into `(prefix, unit)`.
///
/// Tries the whole suffix as a bare unit first (so `K` is kelvin, not kilo),
/// then a one-letter prefix plus unit. The standalone suffix `MA` is mega
/// with no base unit. Returns `None` when the suffix cannot be resolved.
pub fn parse_unit_suffix(suffix: &str) -> Option<(SiPrefix, BaseUnit)> {
    if suffix.is_empty() {
        return Some((SiPrefix::None, BaseUnit::None));
    }

    // Whole suffix as a unit, no prefix.
    let unit = parse_base_unit(suffix);
    if unit != BaseUnit::None {
        return Some((SiPrefix::None, unit));
    }

    // One prefix character + unit.
    if suffix.len() >= 2 {
        let unit = parse_base_unit(&suffix[1..]);
        if unit != BaseUnit::None {
            let first = suffix.as_bytes()[0];
            // `mA` is milliampere, `MA` is megaampere.
            let prefix = match first {
                b'm' => SiPrefix::Milli,
                b'M' => SiPrefix::Mega,
                other => parse_prefix_char(other),
            };
            if prefix != SiPrefix::None {
                return Some((prefix, unit));
            }
        }
    }

    // Bare `MA`: mega with no unit.
    if suffix.eq_ignore_ascii_case("MA") {
        return Some((SiPrefix::Mega, BaseUnit::None));
    }

    None
}

/// Parse a full `number[unit]` string, e.g. `"100mV"` or `"1.5e6Hz"`.
///
/// Returns `None` when there is no numeric part or the unit suffix cannot
/// be resolved.
pub fn parse_unit_value(input: &str) -> Option<UnitValue> {
    if input.is_empty() {
        return None;
    }
    let bytes = input.as_bytes();
    let len = bytes.len();

    // Scan the numeric part: sign, digits, one '.', one exponent.
    let mut num_end = 0usize;
    let mut has_decimal = false;
    let mut has_exponent = false;

    if matches!(bytes[0], b'+' | b'-') {
        num_end = 1;
    }
    while num_end < len {
        let c = bytes[num_end];
        if c.is_ascii_digit() {
            num_end += 1;
        } else if c == b'.' && !has_decimal && !has_exponent {
            has_decimal = true;
            num_end += 1;
        } else if matches!(c, b'e' | b'E') && !has_exponent {
            has_exponent = true;
            num_end += 1;
            if num_end < len && matches!(bytes[num_end], b'+' | b'-') {
                num_end += 1;
            }
        } else {
            break;
        }
    }

    if num_end == 0 || (num_end == 1 && matches!(bytes[0], b'+' | b'-')) {
        return None;
    }

    let raw: f64 = input[..num_end].parse().ok()?;

    let mut result = UnitValue {
        raw,
        ..UnitValue::default()
    };

    if num_end < len {
        let (prefix, unit) = parse_unit_suffix(&input[num_end..])?;
        result.prefix = prefix;
        result.unit = unit;
        result.has_unit = unit != BaseUnit::None || prefix != SiPrefix::None;
    }

    result.multiplier = result.prefix.multiplier();
    result.scaled = result.raw * result.multiplier;
    Some(result)
}

// ── Formatting ──────────────────────────────────────────────────────────────

/// Pick the SI prefix that renders `value` with the fewest leading zeros.
pub fn select_best_prefix(value: f64) -> SiPrefix {
    if value == 0.0 {
        return SiPrefix::None;
    }
    let abs = value.abs();
    if abs >= 1e12 {
        SiPrefix::Tera
    } else if abs >= 1e9 {
        SiPrefix::Giga
    } else if abs >= 1e6 {
        SiPrefix::Mega
    } else if abs >= 1e3 {
        SiPrefix::Kilo
    } else if abs >= 1.0 {
        SiPrefix::None
    } else if abs >= 1e-3 {
        SiPrefix::Milli
    } else if abs >= 1e-6 {
        SiPrefix::Micro
    } else if abs >= 1e-9 {
        SiPrefix::Nano
    } else if abs >= 1e-12 {
        SiPrefix::Pico
    } else {
        SiPrefix::Femto
    }
}

/// Format a base-unit value as `<number><prefix><unit>`, optionally
/// rescaling through the best SI prefix (`format_unit(0.1, Volt, true)` is
/// `"100mV"`).
pub fn format_unit(value: f64, unit: BaseUnit, use_prefix: bool) -> String {
    let (prefix, display) = if use_prefix && value != 0.0 {
        let p = select_best_prefix(value);
        (p, value / p.multiplier())
    } else {
        (SiPrefix::None, value)
    };

    let mut out = crate::params::format_significant(display, 6);
    out.push_str(prefix.as_str());
    out.push_str(unit.as_str());
    out
}
