//! Command-tree nodes and numeric-suffix constraints.

use crate::exec::context::Context;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Handler invoked for a resolved command.
///
/// Returns `0` on success, a SCPI error code (or device-defined positive
/// code) on failure. The same handler value may be bound to several nodes
/// when a registration pattern ends in an optional chain.
pub type CommandHandler = Arc<dyn Fn(&mut Context) -> i32 + Send + Sync>;

/// Stable handle to a node inside a [`crate::tree::CommandTree`].
///
/// Handles index an arena owned by the tree; registration never removes
/// nodes, so a handle stays valid for the tree's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// Valid range for a mnemonic's numeric suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuffixConstraint {
    /// Smallest accepted suffix.
    pub min: i32,
    /// Largest accepted suffix.
    pub max: i32,
    /// When `false`, the suffix may be omitted and `default` is bound.
    pub required: bool,
    /// Value bound when an optional suffix is omitted.
    pub default: i32,
}

impl Default for SuffixConstraint {
    fn default() -> Self {
        Self {
            min: 1,
            max: i32::MAX,
            required: true,
            default: 1,
        }
    }
}

impl SuffixConstraint {
    /// Constraint over an inclusive range, suffix required.
    pub fn range(min: i32, max: i32) -> Self {
        Self {
            min,
            max,
            ..Self::default()
        }
    }

    /// Optional suffix with the given default, full `i32` range.
    pub fn optional(default: i32) -> Self {
        Self {
            required: false,
            default,
            ..Self::default()
        }
    }

    /// Optional suffix with both a range and a default.
    pub fn optional_range(min: i32, max: i32, default: i32) -> Self {
        Self {
            min,
            max,
            required: false,
            default,
        }
    }

    /// Returns `true` when `value` is inside the range.
    pub fn accepts(&self, value: i32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// A node's suffix-parameter definition, fixed at registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeParamDef {
    /// Name the handler uses to look the value up (e.g. `"ch"`).
    pub name: String,
    /// Accepted range and optionality.
    pub constraint: SuffixConstraint,
}

impl NodeParamDef {
    /// Definition with the default constraint.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraint: SuffixConstraint::default(),
        }
    }

    /// Definition with an explicit constraint.
    pub fn with_constraint(name: impl Into<String>, constraint: SuffixConstraint) -> Self {
        Self {
            name: name.into(),
            constraint,
        }
    }
}

/// One registered mnemonic in the command tree.
pub struct CommandNode {
    pub(crate) short_name: String,
    pub(crate) long_name: String,
    pub(crate) optional: bool,
    pub(crate) param: Option<NodeParamDef>,
    pub(crate) handler: Option<CommandHandler>,
    pub(crate) query_handler: Option<CommandHandler>,
    /// Children keyed by uppercase short name. `BTreeMap` keeps child
    /// iteration deterministic, which the resolver's DFS relies on.
    pub(crate) children: BTreeMap<String, NodeId>,
}

impl CommandNode {
    pub(crate) fn new(short_name: &str, long_name: &str, param: Option<NodeParamDef>) -> Self {
        Self {
            short_name: short_name.to_string(),
            long_name: long_name.to_string(),
            optional: false,
            param,
            handler: None,
            query_handler: None,
            children: BTreeMap::new(),
        }
    }

    /// Canonical short form (uppercase letters of the long form).
    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    /// Full registered long form.
    pub fn long_name(&self) -> &str {
        &self.long_name
    }

    /// Returns `true` when the node may be skipped during resolution.
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// The node's suffix-parameter definition, when registered with one.
    pub fn param(&self) -> Option<&NodeParamDef> {
        self.param.as_ref()
    }

    /// Returns `true` when the node binds a numeric suffix.
    pub fn has_param(&self) -> bool {
        self.param.is_some()
    }

    /// The set handler, when bound.
    pub fn handler(&self) -> Option<&CommandHandler> {
        self.handler.as_ref()
    }

    /// The query handler, when bound.
    pub fn query_handler(&self) -> Option<&CommandHandler> {
        self.query_handler.as_ref()
    }

    /// One-line description of the node, for tree dumps.
    pub fn describe(&self) -> String {
        let mut out = self.short_name.clone();
        if self.short_name != self.long_name {
            out.push('(');
            out.push_str(&self.long_name);
            out.push(')');
        }
        if let Some(def) = &self.param {
            out.push('<');
            out.push_str(&def.name);
            let c = &def.constraint;
            if c.min != 1 || c.max != i32::MAX {
                out.push_str(&format!(":{}-{}", c.min, c.max));
            }
            if !c.required {
                out.push_str(&format!(",def={}", c.default));
            }
            out.push('>');
        }
        out
    }
}

/// Match an input mnemonic against a node's short/long names.
///
/// Accepts the short form, the long form, or any prefix of the long form at
/// least as long as the short form. All comparisons are case-insensitive.
pub(crate) fn match_name(input: &str, short_name: &str, long_name: &str) -> bool {
    let input = input.to_ascii_uppercase();
    let short = short_name.to_ascii_uppercase();
    let long = long_name.to_ascii_uppercase();

    if input == short || input == long {
        return true;
    }
    input.len() >= short.len() && input.len() <= long.len() && long.starts_with(&input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraint_defaults() {
        let c = SuffixConstraint::default();
        assert_eq!(c.min, 1);
        assert_eq!(c.max, i32::MAX);
        assert!(c.required);
        assert_eq!(c.default, 1);
    }

    #[test]
    fn constraint_accepts() {
        let c = SuffixConstraint::range(2, 8);
        assert!(c.accepts(2));
        assert!(c.accepts(8));
        assert!(!c.accepts(1));
        assert!(!c.accepts(9));
    }

    #[test]
    fn optional_constraint() {
        let c = SuffixConstraint::optional_range(1, 4, 3);
        assert!(!c.required);
        assert_eq!(c.default, 3);
    }

    #[test]
    fn name_matching() {
        assert!(match_name("MEAS", "MEAS", "MEASure"));
        assert!(match_name("measure", "MEAS", "MEASure"));
        assert!(match_name("MEASU", "MEAS", "MEASure"));
        // Shorter than the short form is rejected.
        assert!(!match_name("ME", "MEAS", "MEASure"));
        // Not a prefix.
        assert!(!match_name("MEASX", "MEAS", "MEASure"));
        // Longer than the long form.
        assert!(!match_name("MEASUREMENT", "MEAS", "MEASure"));
    }

    #[test]
    fn describe_formats() {
        let mut node = CommandNode::new(
            "MEAS",
            "MEASure",
            Some(NodeParamDef::with_constraint(
                "ch",
                SuffixConstraint::range(1, 8),
            )),
        );
        node.optional = false;
        assert_eq!(node.describe(), "MEAS(MEASure)<ch:1-8>");
    }
}
