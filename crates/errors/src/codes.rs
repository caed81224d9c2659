//! SCPI error-code constants.
//!
//! Codes follow SCPI-1999 volume 2 chapter 21: negative codes carry standard
//! semantics grouped by century (-1xx command, -2xx execution, -3xx
//! device-specific, -4xx query); positive codes are reserved for
//! device-defined errors. Use these instead of bare integer literals to get
//! compile-time typo detection and IDE autocomplete.

/// No error (the queue-empty sentinel).
pub const NO_ERROR: i32 = 0;

// ── Command errors (-100..-199): lexical and syntactic problems ─────────────

/// Generic command error.
pub const COMMAND_ERROR: i32 = -100;
/// A character was received that is not valid in a program message.
pub const INVALID_CHARACTER: i32 = -101;
/// Unrecognized syntax in the program message.
pub const SYNTAX_ERROR: i32 = -102;
/// A separator was received where none was expected.
pub const INVALID_SEPARATOR: i32 = -103;
/// A parameter had the wrong data type for the header.
pub const DATA_TYPE_ERROR: i32 = -104;
/// A group execute trigger was received inside a program message.
pub const GET_NOT_ALLOWED: i32 = -105;
/// A parameter was received for a header that takes none.
pub const PARAMETER_NOT_ALLOWED: i32 = -108;
/// Fewer parameters were received than the header requires.
pub const MISSING_PARAMETER: i32 = -109;
/// Generic command-header error.
pub const COMMAND_HEADER_ERROR: i32 = -110;
/// An invalid character followed a header separator.
pub const HEADER_SEPARATOR_ERROR: i32 = -111;
/// A mnemonic exceeded the maximum length.
pub const PROGRAM_MNEMONIC_TOO_LONG: i32 = -112;
/// The header did not resolve against the command tree.
pub const UNDEFINED_HEADER: i32 = -113;
/// A mnemonic's numeric suffix fell outside the registered range.
pub const HEADER_SUFFIX_OUT_OF_RANGE: i32 = -114;
/// The number of parameters did not match the header.
pub const UNEXPECTED_NUMBER_OF_PARAMS: i32 = -115;

/// Generic numeric-data error.
pub const NUMERIC_DATA_ERROR: i32 = -120;
/// An invalid character appeared inside a numeric literal.
pub const INVALID_CHAR_IN_NUMBER: i32 = -121;
/// The exponent of a numeric literal was too large.
pub const EXPONENT_TOO_LARGE: i32 = -123;
/// A numeric literal had too many digits.
pub const TOO_MANY_DIGITS: i32 = -124;
/// Numeric data was received where none is allowed.
pub const NUMERIC_DATA_NOT_ALLOWED: i32 = -128;

/// Generic suffix error.
pub const SUFFIX_ERROR: i32 = -130;
/// An unrecognized unit suffix followed a numeric literal.
pub const INVALID_SUFFIX: i32 = -131;
/// A unit suffix exceeded the maximum length.
pub const SUFFIX_TOO_LONG: i32 = -134;
/// A unit suffix was received where none is allowed.
pub const SUFFIX_NOT_ALLOWED: i32 = -138;

/// Generic character-data error.
pub const CHARACTER_DATA_ERROR: i32 = -140;
/// Invalid character-data element.
pub const INVALID_CHARACTER_DATA: i32 = -141;
/// A character-data element exceeded the maximum length.
pub const CHARACTER_DATA_TOO_LONG: i32 = -144;
/// Character data was received where none is allowed.
pub const CHARACTER_DATA_NOT_ALLOWED: i32 = -148;

/// Generic string-data error.
pub const STRING_DATA_ERROR: i32 = -150;
/// Invalid string-data element (e.g. unterminated quote).
pub const INVALID_STRING_DATA: i32 = -151;
/// String data was received where none is allowed.
pub const STRING_DATA_NOT_ALLOWED: i32 = -158;

/// Generic block-data error.
pub const BLOCK_DATA_ERROR: i32 = -160;
/// Invalid block-data element (e.g. truncated payload).
pub const INVALID_BLOCK_DATA: i32 = -161;
/// Block data was received where none is allowed.
pub const BLOCK_DATA_NOT_ALLOWED: i32 = -168;

/// Generic expression error.
pub const EXPRESSION_ERROR: i32 = -170;
/// Invalid expression element.
pub const INVALID_EXPRESSION: i32 = -171;
/// Expression data was received where none is allowed.
pub const EXPRESSION_NOT_ALLOWED: i32 = -178;

/// Macro definition error.
pub const MACRO_DEFINITION_ERROR: i32 = -180;

// ── Execution errors (-200..-299): valid syntax, failed execution ───────────

/// Generic execution error.
pub const EXECUTION_ERROR: i32 = -200;
/// Command invalid while the instrument is in local mode.
pub const INVALID_WHILE_IN_LOCAL: i32 = -201;
/// Settings were lost due to a return-to-local transition.
pub const SETTINGS_LOST_DUE_TO_RTL: i32 = -202;
/// The command is protected and was refused.
pub const COMMAND_PROTECTED: i32 = -203;

/// Generic trigger error.
pub const TRIGGER_ERROR: i32 = -210;
/// A trigger was received but ignored.
pub const TRIGGER_IGNORED: i32 = -211;
/// An arming signal was received but ignored.
pub const ARM_IGNORED: i32 = -212;
/// An initiate request was received but ignored.
pub const INIT_IGNORED: i32 = -213;
/// Trigger deadlock detected.
pub const TRIGGER_DEADLOCK: i32 = -214;
/// Arm deadlock detected.
pub const ARM_DEADLOCK: i32 = -215;

/// Generic parameter error.
pub const PARAMETER_ERROR: i32 = -220;
/// A legal parameter conflicts with the instrument state.
pub const SETTINGS_CONFLICT: i32 = -221;
/// A parameter value was outside the legal range.
pub const DATA_OUT_OF_RANGE: i32 = -222;
/// More data was received than the instrument can handle.
pub const TOO_MUCH_DATA: i32 = -223;
/// A parameter value was not among the legal discrete values.
pub const ILLEGAL_PARAMETER_VALUE: i32 = -224;
/// The instrument ran out of memory for the requested operation.
pub const OUT_OF_MEMORY: i32 = -225;
/// Paired list parameters had different lengths.
pub const LISTS_NOT_SAME_LENGTH: i32 = -226;

/// Data are corrupt or stale.
pub const DATA_CORRUPT_OR_STALE: i32 = -230;
/// Measurement accuracy is suspect.
pub const DATA_QUESTIONABLE: i32 = -231;
/// Invalid data format.
pub const INVALID_FORMAT: i32 = -232;
/// Unsupported data-format version.
pub const INVALID_VERSION: i32 = -233;

/// Generic hardware error.
pub const HARDWARE_ERROR: i32 = -240;
/// Required hardware is missing.
pub const HARDWARE_MISSING: i32 = -241;

/// Generic mass-storage error.
pub const MASS_STORAGE_ERROR: i32 = -250;
/// Mass-storage device is missing.
pub const MISSING_MASS_STORAGE: i32 = -251;
/// Storage media is missing.
pub const MISSING_MEDIA: i32 = -252;
/// Storage media is corrupt.
pub const CORRUPT_MEDIA: i32 = -253;
/// Storage media is full.
pub const MEDIA_FULL: i32 = -254;
/// Directory is full.
pub const DIRECTORY_FULL: i32 = -255;
/// File name not found on media.
pub const FILE_NOT_FOUND: i32 = -256;
/// Invalid file name.
pub const FILE_NAME_ERROR: i32 = -257;
/// Storage media is write-protected.
pub const MEDIA_PROTECTED: i32 = -258;

/// Expression evaluation error.
pub const EXPRESSION_EXEC_ERROR: i32 = -260;
/// Math error while evaluating an expression.
pub const MATH_ERROR_IN_EXPRESSION: i32 = -261;

// ── Device-specific errors (-300..-399) ─────────────────────────────────────

/// Generic device-specific error.
pub const DEVICE_SPECIFIC_ERROR: i32 = -300;
/// Generic system error.
pub const SYSTEM_ERROR: i32 = -310;
/// Generic memory error.
pub const MEMORY_ERROR: i32 = -311;
/// Protected user data was lost.
pub const PUD_MEMORY_LOST: i32 = -312;
/// Calibration data was lost.
pub const CALIBRATION_MEMORY_LOST: i32 = -313;
/// Save/recall memory was lost.
pub const SAVE_RECALL_MEMORY_LOST: i32 = -314;
/// Configuration memory was lost.
pub const CONFIGURATION_MEMORY_LOST: i32 = -315;
/// Storage fault.
pub const STORAGE_FAULT: i32 = -320;
/// Device memory exhausted.
pub const OUT_OF_DEVICE_MEMORY: i32 = -321;
/// Self-test failed.
pub const SELF_TEST_FAILED: i32 = -330;
/// Calibration failed.
pub const CALIBRATION_FAILED: i32 = -340;
/// The error queue overflowed; at least one error was lost.
pub const QUEUE_OVERFLOW: i32 = -350;
/// Generic communication error.
pub const COMMUNICATION_ERROR: i32 = -360;
/// Parity error in the program message.
pub const PARITY_ERROR: i32 = -361;
/// Framing error in the program message.
pub const FRAMING_ERROR: i32 = -362;
/// The input buffer overran.
pub const INPUT_BUFFER_OVERRUN: i32 = -363;
/// A device-level timeout elapsed.
pub const TIMEOUT_ERROR: i32 = -365;

// ── Query errors (-400..-499) ───────────────────────────────────────────────

/// Generic query error.
pub const QUERY_ERROR: i32 = -400;
/// A new command arrived before a pending response was read.
pub const QUERY_INTERRUPTED: i32 = -410;
/// A response was requested but no query produced one.
pub const QUERY_UNTERMINATED: i32 = -420;
/// Query deadlock: both buffers full.
pub const QUERY_DEADLOCKED: i32 = -430;
/// A new command arrived while an indefinite-length response was pending.
pub const QUERY_UNTERMINATED_INDEF: i32 = -440;
