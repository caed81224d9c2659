//! scpi-kit core library.
//!
//! Parses and dispatches SCPI (IEEE 488.2 + SCPI-1999) program messages
//! for a test-and-measurement instrument. The main entry points are
//! [`Dispatcher`] for registration and execution, and [`Context`] for the
//! per-message state handlers interact with:
//!
//! ```
//! use scpi_kit_core::{Context, Dispatcher};
//!
//! let mut scpi = Dispatcher::new();
//! scpi.register_default_common_commands();
//! scpi.register_both(
//!     ":SOURce:FREQuency",
//!     |ctx| {
//!         let hz = ctx.params().numeric(0, 1.0, 1e9, 1e3);
//!         ctx.set_user_data(hz);
//!         0
//!     },
//!     |ctx| {
//!         let hz = ctx.user_data::<f64>().copied().unwrap_or(1e3);
//!         ctx.result_f64(hz);
//!         0
//!     },
//! )
//! .unwrap();
//!
//! let mut ctx = Context::new();
//! assert_eq!(scpi.execute_all(b":SOUR:FREQ 1MHz;FREQ?", &mut ctx), 0);
//! assert_eq!(ctx.pop_text_response(), "1000000");
//! ```
//!
//! Threading: everything here is single-threaded per [`Context`] except
//! the error queue, which is internally locked so background threads can
//! push errors through a cloned [`errors::ErrorQueue`] handle.

#![warn(missing_docs)]

/// Execution: context, status registers, dispatcher, default commands.
pub mod exec;
/// Grammar: lexer, splitter, registration patterns, dump helpers.
pub mod grammar;
/// Hard resource limits.
pub mod limits;
/// Typed parameters, units, and numeric keywords.
pub mod params;
/// Command tree, nodes, and path resolution.
pub mod tree;

// ── Convenience re-exports ──────────────────────────────────────────────────
// Flat imports for the common entry points; full module paths remain
// available for the less common types.

// Dispatch
pub use exec::context::{ByteOrder, Context};
pub use exec::dispatcher::{Dispatcher, PathContext};
pub use exec::status::StatusRegister;

// Grammar
pub use grammar::dump::to_pretty_json;
pub use grammar::lexer::{Lexer, LexerConfig, TokKind, Token};
pub use grammar::pattern::{PatternError, parse_pattern};
pub use grammar::splitter::{ParsedCommand, PathSegment, SplitError, split};

// Parameters
pub use params::keywords::NumericKeyword;
pub use params::units::{BaseUnit, SiPrefix, UnitValue};
pub use params::{BlockScalar, Parameter, ParameterList};

// Tree
pub use tree::node::{CommandHandler, CommandNode, NodeId, NodeParamDef, SuffixConstraint};
pub use tree::node_params::NodeParamValues;
pub use tree::resolver::{PathResolver, Resolved, ResolveError, ResolvedTarget};
pub use tree::{CommandTree, handler};

// Errors (re-exported from the errors crate)
pub use scpi_kit_errors as errors;
