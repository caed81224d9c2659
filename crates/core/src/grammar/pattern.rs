//! Registration-pattern parsing.
//!
//! A registration string names a colon-separated path of mnemonics, each
//! written as `SHORTlong` (uppercase letters form the short name), with
//! optional sub-paths in `[...]` (or `[:...]`), numeric-suffix parameters as
//! `<name>` / `<name:lo-hi>` / `#`, and a trailing `?` marking a query:
//!
//! ```text
//! :MEASure:VOLTage[:DC]?
//! :MEASure<ch:1-8>:VOLTage?
//! :SOURce#:FREQuency
//! ```

use crate::tree::node::{NodeParamDef, SuffixConstraint};

/// A registration-pattern failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    /// The pattern string was empty.
    #[error("empty pattern")]
    EmptyPattern,
    /// The pattern contained no node tokens.
    #[error("no command nodes found")]
    NoNodes,
    /// `[` and `]` did not balance.
    #[error("unmatched '[]' in pattern")]
    UnmatchedBrackets,
    /// `<` and `>` did not balance.
    #[error("unmatched '<>' in pattern")]
    UnmatchedAngles,
    /// A `<` had no closing `>`.
    #[error("missing '>' in parameter definition")]
    UnterminatedParam,
    /// Characters followed a `>` inside one node token.
    #[error("unexpected characters after parameter definition")]
    TrailingAfterParam,
    /// Characters followed a `#` inside one node token.
    #[error("unexpected characters after '#'")]
    TrailingAfterHash,
    /// A node token was empty after stripping `[` `]`.
    #[error("empty node after removing brackets")]
    EmptyNode,
    /// A node token had a parameter but no name.
    #[error("empty node name")]
    EmptyNodeName,
    /// The `lo-hi` range did not parse as integers.
    #[error("invalid range specification: {0}")]
    InvalidRange(String),
    /// The range lacked the `lo-hi` form.
    #[error("invalid range format, expected 'min-max'")]
    RangeFormat,
    /// `lo` exceeded `hi`.
    #[error("invalid range: min > max")]
    MinGreaterThanMax,
}

/// One node descriptor produced from a registration pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternNode {
    /// Uppercase-letters short form.
    pub short_name: String,
    /// Full long form as written.
    pub long_name: String,
    /// `true` when the node was bracketed.
    pub optional: bool,
    /// Suffix-parameter definition, when the node carried `<...>` or `#`.
    pub param: Option<NodeParamDef>,
}

/// Parse a registration pattern into node descriptors.
///
/// Returns the nodes and whether the pattern ended with `?`.
pub fn parse_pattern(pattern: &str) -> Result<(Vec<PatternNode>, bool), PatternError> {
    if pattern.is_empty() {
        return Err(PatternError::EmptyPattern);
    }

    let mut pat = pattern;
    let is_query = pat.ends_with('?');
    if is_query {
        pat = &pat[..pat.len() - 1];
    }
    let pat = pat.strip_prefix(':').unwrap_or(pat);

    // Split on ':' while respecting '[...]' and '<...>' nesting. The
    // '[:' form lifts the bracketed run out as its own node token.
    let bytes = pat.as_bytes();
    let mut parts: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut bracket_depth = 0i32;
    let mut angle_depth = 0i32;

    let mut i = 0usize;
    while i < bytes.len() {
        let c = bytes[i];
        match c {
            b'[' if i + 1 < bytes.len() && bytes[i + 1] == b':' => {
                if !current.is_empty() {
                    parts.push(std::mem::take(&mut current));
                }
                current.push('[');
                i += 2;
                while i < bytes.len() && bytes[i] != b']' {
                    match bytes[i] {
                        b'<' => angle_depth += 1,
                        b'>' => angle_depth -= 1,
                        _ => {}
                    }
                    current.push(bytes[i] as char);
                    i += 1;
                }
                if i < bytes.len() {
                    current.push(']');
                }
                if !current.is_empty() {
                    parts.push(std::mem::take(&mut current));
                }
            }
            b'[' => {
                bracket_depth += 1;
                current.push('[');
            }
            b']' => {
                if bracket_depth > 0 {
                    bracket_depth -= 1;
                }
                current.push(']');
            }
            b'<' => {
                angle_depth += 1;
                current.push('<');
            }
            b'>' => {
                angle_depth -= 1;
                current.push('>');
            }
            b':' if bracket_depth == 0 && angle_depth == 0 => {
                if !current.is_empty() {
                    parts.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(c as char),
        }
        i += 1;
    }
    if !current.is_empty() {
        parts.push(current);
    }

    if parts.is_empty() {
        return Err(PatternError::NoNodes);
    }
    if bracket_depth != 0 {
        return Err(PatternError::UnmatchedBrackets);
    }
    if angle_depth != 0 {
        return Err(PatternError::UnmatchedAngles);
    }

    let mut nodes = Vec::with_capacity(parts.len());
    let mut auto_index = 1;
    for part in &parts {
        nodes.push(parse_node(part, &mut auto_index)?);
    }

    Ok((nodes, is_query))
}

fn parse_node(token: &str, auto_index: &mut u32) -> Result<PatternNode, PatternError> {
    let mut s = token;
    let mut optional = false;

    if s.starts_with('[') {
        if !s.ends_with(']') {
            return Err(PatternError::UnmatchedBrackets);
        }
        optional = true;
        s = &s[1..s.len() - 1];
    }

    if s.is_empty() {
        return Err(PatternError::EmptyNode);
    }

    let (long_name, param) = if let Some(param_start) = s.find('<') {
        // Named parameter: MEASure<ch> or MEASure<ch:1-16>
        let Some(param_end) = s[param_start..].find('>').map(|p| p + param_start) else {
            return Err(PatternError::UnterminatedParam);
        };
        if param_end + 1 != s.len() {
            return Err(PatternError::TrailingAfterParam);
        }
        let base = &s[..param_start];
        let def = parse_param_def(&s[param_start + 1..param_end], auto_index)?;
        (base, Some(def))
    } else if let Some(hash_pos) = s.find('#') {
        // Anonymous auto-numbered parameter: MEASure#
        if hash_pos + 1 != s.len() {
            return Err(PatternError::TrailingAfterHash);
        }
        let name = format!("_{auto_index}");
        *auto_index += 1;
        (&s[..hash_pos], Some(NodeParamDef::new(name)))
    } else {
        (s, None)
    };

    if long_name.is_empty() {
        return Err(PatternError::EmptyNodeName);
    }

    Ok(PatternNode {
        short_name: extract_short_name(long_name),
        long_name: long_name.to_string(),
        optional,
        param,
    })
}

fn parse_param_def(def: &str, auto_index: &mut u32) -> Result<NodeParamDef, PatternError> {
    let mut constraint = SuffixConstraint::default();

    let name = if let Some((name, range)) = def.split_once(':') {
        let Some((min_str, max_str)) = range.split_once('-') else {
            return Err(PatternError::RangeFormat);
        };
        let (Ok(min), Ok(max)) = (min_str.trim().parse::<i32>(), max_str.trim().parse::<i32>())
        else {
            return Err(PatternError::InvalidRange(range.to_string()));
        };
        if min > max {
            return Err(PatternError::MinGreaterThanMax);
        }
        constraint.min = min;
        constraint.max = max;
        name
    } else {
        def
    };

    let name = if name.is_empty() {
        let auto = format!("_{auto_index}");
        *auto_index += 1;
        auto
    } else {
        name.to_string()
    };

    Ok(NodeParamDef::with_constraint(name, constraint))
}

/// Extract the short form of a mnemonic: its uppercase letters in order,
/// or the whole name uppercased when it has none.
pub fn extract_short_name(name: &str) -> String {
    let short: String = name.chars().filter(|c| c.is_ascii_uppercase()).collect();
    if short.is_empty() {
        name.to_ascii_uppercase()
    } else {
        short
    }
}

/// Returns `true` when `pattern` parses.
pub fn is_valid_pattern(pattern: &str) -> bool {
    parse_pattern(pattern).is_ok()
}
