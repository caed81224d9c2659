//! The dispatcher facade.
//!
//! Owns the command tree and the semicolon path context, and drives the
//! full pipeline for one program message: split, resolve, bind, invoke,
//! and book-keep errors and status. Registration forwards to the tree.

use crate::exec::context::Context;
use crate::exec::{ieee488, system};
use crate::grammar::lexer::LexerConfig;
use crate::grammar::pattern::PatternError;
use crate::grammar::splitter::{ParsedCommand, split_with_config};
use crate::limits;
use crate::tree::node::{CommandHandler, NodeId};
use crate::tree::resolver::{PathResolver, Resolved, ResolvedTarget};
use crate::tree::{CommandTree, handler};
use scpi_kit_errors::codes;

/// The semicolon-chained relative-path context.
///
/// Holds a stable node handle into the dispatcher's tree; `None` means the
/// root. Registration never removes nodes, so the handle cannot dangle.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathContext {
    current: Option<NodeId>,
}

impl PathContext {
    /// Context at the root.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to the root.
    pub fn reset(&mut self) {
        self.current = None;
    }

    /// Current node, `None` at the root.
    pub fn current(&self) -> Option<NodeId> {
        self.current
    }

    /// Move the context to `node` (`None` for the root).
    pub fn set_current(&mut self, node: Option<NodeId>) {
        self.current = node;
    }
}

/// SCPI command registrar and program-message executor.
pub struct Dispatcher {
    tree: CommandTree,
    path_context: PathContext,
    auto_reset_context: bool,
    lexer_config: LexerConfig,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    /// Dispatcher with an empty tree and auto-resetting path context.
    pub fn new() -> Self {
        Self {
            tree: CommandTree::new(),
            path_context: PathContext::new(),
            auto_reset_context: true,
            lexer_config: LexerConfig::default(),
        }
    }

    // ── Registration ────────────────────────────────────────────────────

    /// Register a set handler under `pattern`.
    ///
    /// Numeric-keyword and boolean spellings (`ON`, `OFF`, `MIN`, `MAX`,
    /// `DEF`, `INF`, `NINF`, `NAN`, `UP`, `DOWN` and their long forms) are
    /// never legal mnemonics; registering one is not rejected but such a
    /// node is unreachable from parameter positions.
    pub fn register_set(
        &mut self,
        pattern: &str,
        f: impl Fn(&mut Context) -> i32 + Send + Sync + 'static,
    ) -> Result<NodeId, PatternError> {
        self.tree.register_set(pattern, handler(f))
    }

    /// Register a query handler under `pattern` (trailing `?` implied).
    pub fn register_query(
        &mut self,
        pattern: &str,
        f: impl Fn(&mut Context) -> i32 + Send + Sync + 'static,
    ) -> Result<NodeId, PatternError> {
        self.tree.register_query(pattern, handler(f))
    }

    /// Register set and query handlers under the same `pattern`.
    pub fn register_both(
        &mut self,
        pattern: &str,
        set: impl Fn(&mut Context) -> i32 + Send + Sync + 'static,
        query: impl Fn(&mut Context) -> i32 + Send + Sync + 'static,
    ) -> Result<NodeId, PatternError> {
        self.tree.register_both(pattern, handler(set), handler(query))
    }

    /// Register an IEEE 488.2 common command (name begins with `*`; a
    /// trailing `?` marks the query form).
    pub fn register_common(
        &mut self,
        name: &str,
        f: impl Fn(&mut Context) -> i32 + Send + Sync + 'static,
    ) {
        self.tree.register_common(name, handler(f));
    }

    /// Register by pattern shape: `*`-prefixed names go to the common
    /// map, a trailing `?` selects the query slot, otherwise the set slot.
    /// Returns the tree node for tree commands, `None` for common ones.
    pub fn register_auto(
        &mut self,
        pattern: &str,
        f: impl Fn(&mut Context) -> i32 + Send + Sync + 'static,
    ) -> Result<Option<NodeId>, PatternError> {
        if pattern.starts_with('*') {
            self.register_common(pattern, f);
            return Ok(None);
        }
        if pattern.ends_with('?') {
            self.register_query(pattern, f).map(Some)
        } else {
            self.register_set(pattern, f).map(Some)
        }
    }

    /// [`Dispatcher::register_auto`] for an optional set/query handler
    /// pair. Supplying both registers both slots (for common commands the
    /// `*NAME` and `*NAME?` forms); supplying one falls back to the
    /// single-handler rules.
    pub fn register_auto_pair(
        &mut self,
        pattern: &str,
        set: Option<CommandHandler>,
        query: Option<CommandHandler>,
    ) -> Result<Option<NodeId>, PatternError> {
        match (set, query) {
            (Some(set), Some(query)) => {
                if pattern.starts_with('*') {
                    let base = pattern.strip_suffix('?').unwrap_or(pattern);
                    self.tree.register_common(base, set);
                    self.tree.register_common(&format!("{base}?"), query);
                    return Ok(None);
                }
                self.tree.register_both(pattern, set, query).map(Some)
            }
            (None, Some(query)) => {
                if pattern.starts_with('*') {
                    let name = if pattern.ends_with('?') {
                        pattern.to_string()
                    } else {
                        format!("{pattern}?")
                    };
                    self.tree.register_common(&name, query);
                    return Ok(None);
                }
                self.tree.register_query(pattern, query).map(Some)
            }
            (Some(set), None) => {
                if pattern.starts_with('*') {
                    self.tree.register_common(pattern, set);
                    return Ok(None);
                }
                if pattern.ends_with('?') {
                    self.tree.register_query(pattern, set).map(Some)
                } else {
                    self.tree.register_set(pattern, set).map(Some)
                }
            }
            (None, None) => Ok(None),
        }
    }

    /// Register the default IEEE 488.2 common commands (`*CLS`, `*IDN?`,
    /// `*RST`, `*OPC`, `*ESR?`, `*ESE`, `*SRE`, `*STB?`).
    pub fn register_default_common_commands(&mut self) {
        ieee488::register_defaults(self);
    }

    /// Register the default `:SYSTem:ERRor` subtree.
    pub fn register_default_system_commands(&mut self) {
        system::register_defaults(self);
    }

    // ── Configuration ───────────────────────────────────────────────────

    /// The registered command tree.
    pub fn tree(&self) -> &CommandTree {
        &self.tree
    }

    /// Reset the path context to the root.
    pub fn reset_context(&mut self) {
        self.path_context.reset();
    }

    /// When enabled (the default), every `execute_all` starts from the
    /// root context, matching one-program-message-per-call transports.
    pub fn set_auto_reset_context(&mut self, enabled: bool) {
        self.auto_reset_context = enabled;
    }

    /// Whether the path context resets before each message.
    pub fn auto_reset_context(&self) -> bool {
        self.auto_reset_context
    }

    /// Lexer limits and block-terminator configuration used for splitting.
    pub fn set_lexer_config(&mut self, config: LexerConfig) {
        self.lexer_config = config;
    }

    // ── Execution ───────────────────────────────────────────────────────

    /// Execute one program message. Alias of [`Dispatcher::execute_all`],
    /// kept for hosts that submit exactly one command per call.
    pub fn execute(&mut self, input: &[u8], ctx: &mut Context) -> i32 {
        self.execute_all(input, ctx)
    }

    /// Execute a full program message (commands separated by `;` or
    /// newlines). Returns the last non-zero handler/resolution code, or 0.
    pub fn execute_all(&mut self, input: &[u8], ctx: &mut Context) -> i32 {
        if input.len() > limits::MAX_INPUT_LEN {
            ctx.push_standard_error_with_info(codes::OUT_OF_MEMORY, "Command string too long");
            return codes::OUT_OF_MEMORY;
        }

        if self.auto_reset_context {
            self.path_context.reset();
        }

        let commands = match split_with_config(input, self.lexer_config) {
            Ok(commands) => commands,
            Err(err) => {
                let code = if err.code != 0 {
                    err.code
                } else {
                    codes::SYNTAX_ERROR
                };
                ctx.push_standard_error_with_info(code, &err.message);
                return code;
            }
        };

        let mut last_rc = 0;

        for cmd in &commands {
            // Query-sequence check, buffered mode only: an unread response
            // from an earlier query is discarded and reported before this
            // command runs.
            if ctx.has_pending_response() {
                if ctx.last_response_was_indefinite() {
                    ctx.push_standard_error(codes::QUERY_UNTERMINATED_INDEF);
                } else {
                    ctx.push_standard_error(codes::QUERY_INTERRUPTED);
                }
                ctx.clear_responses();
            }

            let resolved = match PathResolver::new(&self.tree).resolve(cmd, self.path_context.current())
            {
                Ok(resolved) => resolved,
                Err(err) => {
                    ctx.push_standard_error_with_info(err.code, &err.message);
                    last_rc = err.code;
                    // Failed resolves leave the path context untouched.
                    continue;
                }
            };

            let rc = self.execute_resolved(cmd, &resolved, ctx);
            if rc != 0 {
                last_rc = rc;
            }

            self.update_path_context(cmd, &resolved);
        }

        last_rc
    }

    fn execute_resolved(&self, cmd: &ParsedCommand, resolved: &Resolved, ctx: &mut Context) -> i32 {
        ctx.reset_command_state();
        ctx.bind_command(cmd.params.clone(), resolved.node_params.clone(), cmd.is_query);

        let handler = match &resolved.target {
            ResolvedTarget::Common(h) => h.clone(),
            ResolvedTarget::Node(id) => {
                let node = self.tree.node(*id);
                let slot = if cmd.is_query {
                    node.query_handler()
                } else {
                    node.handler()
                };
                match slot {
                    Some(h) => h.clone(),
                    None => {
                        let code = if cmd.is_query {
                            codes::QUERY_ERROR
                        } else {
                            codes::COMMAND_ERROR
                        };
                        ctx.push_standard_error(code);
                        return code;
                    }
                }
            }
        };

        let rc = normalize_handler_return(handler(ctx));

        // A failing handler that did not queue its own error gets the
        // standard message for its code.
        if rc != 0 && !ctx.has_transient_error() {
            if (-499..=-100).contains(&rc) {
                ctx.push_standard_error(rc);
            } else if rc > 0 {
                ctx.push_error(rc, "Device-defined error");
            } else {
                ctx.push_standard_error(codes::EXECUTION_ERROR);
            }
        }

        rc
    }

    /// After a successful resolve, the context rests at the parent of the
    /// consumed path: `:SOUR:FREQ` leaves the context at `SOURce` so that
    /// `;AMPL` resolves beside `FREQ`. Single-segment commands keep their
    /// starting context (root when absolute).
    fn update_path_context(&mut self, cmd: &ParsedCommand, resolved: &Resolved) {
        if matches!(resolved.target, ResolvedTarget::Common(_)) {
            // Common commands do not disturb the path context.
            return;
        }

        let start = if cmd.is_absolute {
            None
        } else {
            self.path_context.current()
        };

        let new = match resolved.consumed_path.len() {
            0 => start,
            1 => start,
            n => Some(resolved.consumed_path[n - 2]),
        };
        self.path_context.set_current(new);
    }
}

/// Normalize a handler return code: 0 passes, SCPI-range negatives and
/// positive device codes pass, any other negative becomes `-200`.
fn normalize_handler_return(rc: i32) -> i32 {
    if rc == 0 || rc > 0 || (-499..=-100).contains(&rc) {
        rc
    } else {
        codes::EXECUTION_ERROR
    }
}
