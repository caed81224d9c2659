//! JSON serialization helpers for parsed commands.

use crate::grammar::splitter::ParsedCommand;

/// Serialize parsed commands to pretty-printed JSON.
///
/// Intended for debugging and tooling; falls back to an error string only
/// if serialization itself fails, which would indicate a bug in the
/// data-model derives.
pub fn to_pretty_json(commands: &[ParsedCommand]) -> String {
    serde_json::to_string_pretty(commands)
        .unwrap_or_else(|e| format!("{{\"error\":\"serialization failed: {e}\"}}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::splitter::split;

    #[test]
    fn dump_contains_paths_and_params() {
        let cmds = split(b":MEAS2:VOLT? 1.5,MIN").unwrap();
        let json = to_pretty_json(&cmds);
        assert!(json.contains("\"MEAS\""));
        assert!(json.contains("\"suffix\": 2"));
        assert!(json.contains("\"is_query\": true"));
        assert!(json.contains("MINIMUM"));
    }

    #[test]
    fn dump_round_trips_through_serde_json_value() {
        let cmds = split(b"*IDN?").unwrap();
        let json = to_pretty_json(&cmds);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["is_common"], true);
    }
}
