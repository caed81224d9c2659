//! Error reporting for the scpi-kit parser/dispatcher.
//!
//! Provides the SCPI error-code constants ([`codes`]), the default message
//! table ([`message`]), range classifiers used for ESR-bit selection, the
//! timestamped [`ErrorEntry`] record, and the bounded, thread-safe
//! [`ErrorQueue`] mandated by IEEE 488.2.

#![warn(missing_docs)]

/// SCPI error-code constants grouped by century.
pub mod codes;
mod queue;

pub use queue::{DEFAULT_ERROR_QUEUE_CAPACITY, ErrorQueue};

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

// ── Range classifiers ───────────────────────────────────────────────────────
// These drive ESR-bit selection: CME for command errors, EXE for execution,
// DDE for device-specific, QYE for query errors.

/// Returns `true` for command errors (-100..=-199).
pub fn is_command_error(code: i32) -> bool {
    (-199..=-100).contains(&code)
}

/// Returns `true` for execution errors (-200..=-299).
pub fn is_execution_error(code: i32) -> bool {
    (-299..=-200).contains(&code)
}

/// Returns `true` for device-specific errors (-300..=-399).
pub fn is_device_error(code: i32) -> bool {
    (-399..=-300).contains(&code)
}

/// Returns `true` for query errors (-400..=-499).
pub fn is_query_error(code: i32) -> bool {
    (-499..=-400).contains(&code)
}

/// Returns `true` for device-defined (positive) error codes.
pub fn is_user_error(code: i32) -> bool {
    code > 0
}

/// Returns `true` for any non-zero code.
pub fn is_error(code: i32) -> bool {
    code != codes::NO_ERROR
}

// ── Default messages ────────────────────────────────────────────────────────

/// Returns the default English message for a SCPI error code.
///
/// Unknown negative codes map to `"Unknown error"`; positive codes map to
/// `"Device-defined error"`.
pub fn message(code: i32) -> &'static str {
    use codes::*;
    match code {
        NO_ERROR => "No error",

        COMMAND_ERROR => "Command error",
        INVALID_CHARACTER => "Invalid character",
        SYNTAX_ERROR => "Syntax error",
        INVALID_SEPARATOR => "Invalid separator",
        DATA_TYPE_ERROR => "Data type error",
        GET_NOT_ALLOWED => "GET not allowed",
        PARAMETER_NOT_ALLOWED => "Parameter not allowed",
        MISSING_PARAMETER => "Missing parameter",
        COMMAND_HEADER_ERROR => "Command header error",
        HEADER_SEPARATOR_ERROR => "Header separator error",
        PROGRAM_MNEMONIC_TOO_LONG => "Program mnemonic too long",
        UNDEFINED_HEADER => "Undefined header",
        HEADER_SUFFIX_OUT_OF_RANGE => "Header suffix out of range",
        UNEXPECTED_NUMBER_OF_PARAMS => "Unexpected number of parameters",

        NUMERIC_DATA_ERROR => "Numeric data error",
        INVALID_CHAR_IN_NUMBER => "Invalid character in number",
        EXPONENT_TOO_LARGE => "Exponent too large",
        TOO_MANY_DIGITS => "Too many digits",
        NUMERIC_DATA_NOT_ALLOWED => "Numeric data not allowed",

        SUFFIX_ERROR => "Suffix error",
        INVALID_SUFFIX => "Invalid suffix",
        SUFFIX_TOO_LONG => "Suffix too long",
        SUFFIX_NOT_ALLOWED => "Suffix not allowed",

        CHARACTER_DATA_ERROR => "Character data error",
        INVALID_CHARACTER_DATA => "Invalid character data",
        CHARACTER_DATA_TOO_LONG => "Character data too long",
        CHARACTER_DATA_NOT_ALLOWED => "Character data not allowed",

        STRING_DATA_ERROR => "String data error",
        INVALID_STRING_DATA => "Invalid string data",
        STRING_DATA_NOT_ALLOWED => "String data not allowed",

        BLOCK_DATA_ERROR => "Block data error",
        INVALID_BLOCK_DATA => "Invalid block data",
        BLOCK_DATA_NOT_ALLOWED => "Block data not allowed",

        EXPRESSION_ERROR => "Expression error",
        INVALID_EXPRESSION => "Invalid expression",
        EXPRESSION_NOT_ALLOWED => "Expression data not allowed",

        MACRO_DEFINITION_ERROR => "Macro error",

        EXECUTION_ERROR => "Execution error",
        INVALID_WHILE_IN_LOCAL => "Invalid while in local",
        SETTINGS_LOST_DUE_TO_RTL => "Settings lost due to rtl",
        COMMAND_PROTECTED => "Command protected",

        TRIGGER_ERROR => "Trigger error",
        TRIGGER_IGNORED => "Trigger ignored",
        ARM_IGNORED => "Arm ignored",
        INIT_IGNORED => "Init ignored",
        TRIGGER_DEADLOCK => "Trigger deadlock",
        ARM_DEADLOCK => "Arm deadlock",

        PARAMETER_ERROR => "Parameter error",
        SETTINGS_CONFLICT => "Settings conflict",
        DATA_OUT_OF_RANGE => "Data out of range",
        TOO_MUCH_DATA => "Too much data",
        ILLEGAL_PARAMETER_VALUE => "Illegal parameter value",
        OUT_OF_MEMORY => "Out of memory",
        LISTS_NOT_SAME_LENGTH => "Lists not same length",

        DATA_CORRUPT_OR_STALE => "Data corrupt or stale",
        DATA_QUESTIONABLE => "Data questionable",
        INVALID_FORMAT => "Invalid format",
        INVALID_VERSION => "Invalid version",

        HARDWARE_ERROR => "Hardware error",
        HARDWARE_MISSING => "Hardware missing",

        MASS_STORAGE_ERROR => "Mass storage error",
        MISSING_MASS_STORAGE => "Missing mass storage",
        MISSING_MEDIA => "Missing media",
        CORRUPT_MEDIA => "Corrupt media",
        MEDIA_FULL => "Media full",
        DIRECTORY_FULL => "Directory full",
        FILE_NOT_FOUND => "File name not found",
        FILE_NAME_ERROR => "File name error",
        MEDIA_PROTECTED => "Media protected",

        EXPRESSION_EXEC_ERROR => "Expression error",
        MATH_ERROR_IN_EXPRESSION => "Math error in expression",

        DEVICE_SPECIFIC_ERROR => "Device-specific error",
        SYSTEM_ERROR => "System error",
        MEMORY_ERROR => "Memory error",
        PUD_MEMORY_LOST => "PUD memory lost",
        CALIBRATION_MEMORY_LOST => "Calibration memory lost",
        SAVE_RECALL_MEMORY_LOST => "Save/recall memory lost",
        CONFIGURATION_MEMORY_LOST => "Configuration memory lost",
        STORAGE_FAULT => "Storage fault",
        OUT_OF_DEVICE_MEMORY => "Out of memory",
        SELF_TEST_FAILED => "Self-test failed",
        CALIBRATION_FAILED => "Calibration failed",
        QUEUE_OVERFLOW => "Queue overflow",
        COMMUNICATION_ERROR => "Communication error",
        PARITY_ERROR => "Parity error in program message",
        FRAMING_ERROR => "Framing error in program message",
        INPUT_BUFFER_OVERRUN => "Input buffer overrun",
        TIMEOUT_ERROR => "Time out error",

        QUERY_ERROR => "Query error",
        QUERY_INTERRUPTED => "Query INTERRUPTED",
        QUERY_UNTERMINATED => "Query UNTERMINATED",
        QUERY_DEADLOCKED => "Query DEADLOCKED",
        QUERY_UNTERMINATED_INDEF => "Query UNTERMINATED after indefinite response",

        _ if code > 0 => "Device-defined error",
        _ => "Unknown error",
    }
}

// ── ErrorEntry ──────────────────────────────────────────────────────────────

/// A single entry in the instrument error queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    /// SCPI error code. `0` is reserved for "No error".
    pub code: i32,
    /// Human-readable message.
    pub message: String,
    /// Unix timestamp (seconds) at which the error was queued.
    pub timestamp: u64,
    /// Optional context, e.g. the offending command text. Empty when absent.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub context: String,
}

impl ErrorEntry {
    /// Create an entry stamped with the current time.
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self::with_context(code, message, "")
    }

    /// Create an entry with a context string, stamped with the current time.
    pub fn with_context(
        code: i32,
        message: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            timestamp: unix_now(),
            context: context.into(),
        }
    }

    /// Create a standard entry using the default message for `code`.
    pub fn standard(code: i32) -> Self {
        Self::new(code, message(code))
    }

    /// The "No error" sentinel returned when popping an empty queue.
    pub fn no_error() -> Self {
        Self {
            code: codes::NO_ERROR,
            message: message(codes::NO_ERROR).to_string(),
            timestamp: 0,
            context: String::new(),
        }
    }

    /// Returns `true` unless this is the "No error" sentinel.
    pub fn is_error(&self) -> bool {
        self.code != codes::NO_ERROR
    }

    /// Format as the `:SYSTem:ERRor?` response element: `<code>,"<message>"`.
    ///
    /// Double quotes inside the message are escaped by doubling, per the
    /// IEEE 488.2 string program-data rules.
    pub fn to_response_string(&self) -> String {
        let mut out = String::with_capacity(self.message.len() + 8);
        out.push_str(&self.code.to_string());
        out.push_str(",\"");
        for c in self.message.chars() {
            if c == '"' {
                out.push_str("\"\"");
            } else {
                out.push(c);
            }
        }
        out.push('"');
        out
    }
}

impl std::fmt::Display for ErrorEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error {}: {}", self.code, self.message)?;
        if !self.context.is_empty() {
            write!(f, " [{}]", self.context)?;
        }
        Ok(())
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Classifiers ─────────────────────────────────────────────────────

    #[test]
    fn classifier_ranges() {
        assert!(is_command_error(codes::SYNTAX_ERROR));
        assert!(is_command_error(-199));
        assert!(!is_command_error(-200));
        assert!(is_execution_error(codes::DATA_OUT_OF_RANGE));
        assert!(is_device_error(codes::QUEUE_OVERFLOW));
        assert!(is_query_error(codes::QUERY_INTERRUPTED));
        assert!(is_user_error(1));
        assert!(!is_user_error(0));
        assert!(!is_user_error(-100));
        assert!(is_error(-1));
        assert!(!is_error(0));
    }

    #[test]
    fn classifiers_are_disjoint() {
        for code in [-499, -400, -399, -300, -299, -200, -199, -100] {
            let hits = [
                is_command_error(code),
                is_execution_error(code),
                is_device_error(code),
                is_query_error(code),
            ]
            .iter()
            .filter(|b| **b)
            .count();
            assert_eq!(hits, 1, "code {code} should match exactly one range");
        }
    }

    // ── Messages ────────────────────────────────────────────────────────

    #[test]
    fn standard_messages() {
        assert_eq!(message(codes::NO_ERROR), "No error");
        assert_eq!(message(codes::UNDEFINED_HEADER), "Undefined header");
        assert_eq!(message(codes::QUEUE_OVERFLOW), "Queue overflow");
        assert_eq!(message(codes::QUERY_INTERRUPTED), "Query INTERRUPTED");
        assert_eq!(message(codes::QUERY_UNTERMINATED), "Query UNTERMINATED");
        assert_eq!(
            message(codes::QUERY_UNTERMINATED_INDEF),
            "Query UNTERMINATED after indefinite response"
        );
    }

    #[test]
    fn unknown_codes() {
        assert_eq!(message(42), "Device-defined error");
        assert_eq!(message(-999), "Unknown error");
    }

    // ── ErrorEntry ──────────────────────────────────────────────────────

    #[test]
    fn entry_response_format() {
        let e = ErrorEntry::new(-113, "Undefined header");
        assert_eq!(e.to_response_string(), "-113,\"Undefined header\"");
    }

    #[test]
    fn entry_response_escapes_quotes() {
        let e = ErrorEntry::new(-102, "bad token \"FOO\"");
        assert_eq!(e.to_response_string(), "-102,\"bad token \"\"FOO\"\"\"");
    }

    #[test]
    fn no_error_sentinel() {
        let e = ErrorEntry::no_error();
        assert!(!e.is_error());
        assert_eq!(e.to_response_string(), "0,\"No error\"");
    }

    #[test]
    fn entry_display_with_context() {
        let e = ErrorEntry::with_context(-222, "Data out of range", ":VOLT 99");
        assert_eq!(format!("{e}"), "Error -222: Data out of range [:VOLT 99]");
    }

    #[test]
    fn entry_serde_roundtrip() {
        let e = ErrorEntry::with_context(-350, "Queue overflow", "ctx");
        let json = serde_json::to_string(&e).unwrap();
        let back: ErrorEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(e, back);
    }

    #[test]
    fn entry_serde_omits_empty_context() {
        let e = ErrorEntry::new(-100, "Command error");
        let json = serde_json::to_string(&e).unwrap();
        assert!(!json.contains("context"), "empty context omitted: {json}");
    }
}
