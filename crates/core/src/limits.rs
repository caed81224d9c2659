//! Hard resource limits enforced by the parsing pipeline.

/// Maximum accepted length of a single command header + parameters (64 KiB).
pub const MAX_COMMAND_LEN: usize = 65536;

/// Maximum accepted length of one arbitrary-block payload (100 MiB).
pub const MAX_BLOCK_DATA_LEN: usize = 100 * 1024 * 1024;

/// Maximum accepted length of one program message.
///
/// Sized to admit one maximal block plus a maximal command header.
pub const MAX_INPUT_LEN: usize = MAX_BLOCK_DATA_LEN + MAX_COMMAND_LEN;

/// Maximum length of a single mnemonic or identifier.
pub const MAX_IDENTIFIER_LEN: usize = 255;

/// Maximum number of entries a channel list may expand to.
pub const MAX_CHANNEL_LIST_LEN: usize = 100_000;

/// Maximum resolver search depth across epsilon and consume moves.
pub const MAX_RESOLVE_DEPTH: usize = 32;
