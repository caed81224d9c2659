//! The registered command tree.
//!
//! Registration walks [`crate::grammar::pattern`] node descriptors into an
//! arena of [`CommandNode`]s addressed by stable [`NodeId`] handles. A
//! pattern ending in a chain of optional nodes binds its handler to every
//! prefix of the path from the last non-optional ancestor through the leaf,
//! so `:MEASure:VOLTage[:DC]?` answers both `:MEAS:VOLT?` and
//! `:MEAS:VOLT:DC?` with the same handler.
//!
//! IEEE 488.2 common commands (`*IDN?`, `*CLS`, ...) live outside the tree
//! in a case-insensitive name map.

/// Command nodes, handler types, and suffix constraints.
pub mod node;
/// Extracted node-suffix values.
pub mod node_params;
/// Path resolution against the registered tree.
pub mod resolver;

use crate::exec::context::Context;
use crate::grammar::pattern::{PatternError, PatternNode, parse_pattern};
use node::{CommandHandler, CommandNode, NodeId};
use std::collections::HashMap;
use std::sync::Arc;

/// Wrap a closure as a shareable [`CommandHandler`].
pub fn handler(f: impl Fn(&mut Context) -> i32 + Send + Sync + 'static) -> CommandHandler {
    Arc::new(f)
}

/// Arena-backed SCPI command tree plus the common-command map.
///
/// The tree is mutated only during registration; afterwards it is read-only
/// and safe to share across concurrently executing contexts.
pub struct CommandTree {
    nodes: Vec<CommandNode>,
    common: HashMap<String, CommandHandler>,
}

impl Default for CommandTree {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandTree {
    /// Create a tree containing only the root node.
    pub fn new() -> Self {
        Self {
            nodes: vec![CommandNode::new("ROOT", "ROOT", None)],
            common: HashMap::new(),
        }
    }

    /// Handle of the root node.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Borrow a node by handle.
    pub fn node(&self, id: NodeId) -> &CommandNode {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut CommandNode {
        &mut self.nodes[id.0]
    }

    // ── Registration ────────────────────────────────────────────────────

    /// Register a set (non-query) handler under `pattern`.
    pub fn register_set(
        &mut self,
        pattern: &str,
        handler: CommandHandler,
    ) -> Result<NodeId, PatternError> {
        let (nodes, _) = parse_pattern(pattern)?;
        Ok(self.bind(&nodes, handler, false))
    }

    /// Register a query handler under `pattern`. A missing trailing `?` is
    /// implied.
    pub fn register_query(
        &mut self,
        pattern: &str,
        handler: CommandHandler,
    ) -> Result<NodeId, PatternError> {
        let owned;
        let pattern = if pattern.ends_with('?') {
            pattern
        } else {
            owned = format!("{pattern}?");
            &owned
        };
        let (nodes, _) = parse_pattern(pattern)?;
        Ok(self.bind(&nodes, handler, true))
    }

    /// Register a set and a query handler under the same `pattern` (any
    /// trailing `?` is ignored for tree placement).
    pub fn register_both(
        &mut self,
        pattern: &str,
        set_handler: CommandHandler,
        query_handler: CommandHandler,
    ) -> Result<NodeId, PatternError> {
        let pattern = pattern.strip_suffix('?').unwrap_or(pattern);
        let (nodes, _) = parse_pattern(pattern)?;
        self.bind(&nodes, set_handler, false);
        Ok(self.bind(&nodes, query_handler, true))
    }

    /// Bind `handler` for the parsed path, duplicating it across a trailing
    /// optional chain. Returns the leaf node.
    fn bind(&mut self, nodes: &[PatternNode], handler: CommandHandler, is_query: bool) -> NodeId {
        let leaf = self.ensure_path(nodes);

        let optional_start = trailing_optional_start(nodes);
        if optional_start < nodes.len() {
            // Bind onto every prefix whose last node is the last
            // non-optional ancestor or any optional node after it.
            for i in optional_start..=nodes.len() {
                if i == 0 {
                    continue;
                }
                let target = self.ensure_path(&nodes[..i]);
                self.set_handler_slot(target, handler.clone(), is_query);
            }
        } else {
            self.set_handler_slot(leaf, handler, is_query);
        }

        leaf
    }

    fn set_handler_slot(&mut self, id: NodeId, handler: CommandHandler, is_query: bool) {
        let node = self.node_mut(id);
        if is_query {
            node.query_handler = Some(handler);
        } else {
            node.handler = Some(handler);
        }
    }

    /// Walk `nodes` from the root, creating missing children. A pattern
    /// marking an existing node optional upgrades the node in place; the
    /// first registration wins for the parameter definition.
    fn ensure_path(&mut self, nodes: &[PatternNode]) -> NodeId {
        let mut current = self.root();
        for pn in nodes {
            let key = pn.short_name.to_ascii_uppercase();
            let existing = self.node(current).children.get(&key).copied();
            current = match existing {
                Some(child) => {
                    if pn.optional {
                        self.node_mut(child).optional = true;
                    }
                    child
                }
                None => {
                    let id = NodeId(self.nodes.len());
                    let mut node =
                        CommandNode::new(&pn.short_name, &pn.long_name, pn.param.clone());
                    node.optional = pn.optional;
                    self.nodes.push(node);
                    self.node_mut(current).children.insert(key, id);
                    id
                }
            };
        }
        current
    }

    // ── Child lookup ────────────────────────────────────────────────────

    /// Find a child of `parent` matching an input mnemonic, honoring the
    /// suffix constraint. Returns the child and the suffix value to bind
    /// (the constraint default when an optional suffix was omitted).
    pub(crate) fn find_child(
        &self,
        parent: NodeId,
        base: &str,
        suffix: Option<i32>,
    ) -> Option<(NodeId, i32)> {
        for &child_id in self.node(parent).children.values() {
            let child = self.node(child_id);
            if !node::match_name(base, &child.short_name, &child.long_name) {
                continue;
            }
            match (&child.param, suffix) {
                (Some(def), Some(value)) => {
                    if def.constraint.accepts(value) {
                        return Some((child_id, value));
                    }
                    // Out-of-range suffix: keep searching siblings.
                }
                (Some(def), None) => {
                    if !def.constraint.required {
                        return Some((child_id, def.constraint.default));
                    }
                }
                (None, None) => return Some((child_id, 0)),
                (None, Some(_)) => {}
            }
        }
        None
    }

    // ── Common commands ─────────────────────────────────────────────────

    /// Register an IEEE 488.2 common command. The name is normalized to
    /// uppercase with a leading `*`; a trailing `?` distinguishes the query
    /// form.
    pub fn register_common(&mut self, name: &str, handler: CommandHandler) {
        self.common.insert(normalize_common_name(name), handler);
    }

    /// Look up a common command by (possibly unnormalized) name.
    pub fn find_common(&self, name: &str) -> Option<CommandHandler> {
        self.common.get(&normalize_common_name(name)).cloned()
    }

    /// Returns `true` when a common command is registered under `name`.
    pub fn has_common(&self, name: &str) -> bool {
        self.common.contains_key(&normalize_common_name(name))
    }

    // ── Debug ───────────────────────────────────────────────────────────

    /// Render the tree structure, one node per line.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for &child in self.node(self.root()).children.values() {
            self.dump_node(child, 0, &mut out);
        }
        if !self.common.is_empty() {
            let mut names: Vec<&String> = self.common.keys().collect();
            names.sort();
            for name in names {
                out.push_str(name);
                out.push('\n');
            }
        }
        out
    }

    fn dump_node(&self, id: NodeId, indent: usize, out: &mut String) {
        let node = self.node(id);
        out.push_str(&"  ".repeat(indent));
        out.push_str(&node.describe());
        if node.optional {
            out.push_str(" [optional]");
        }
        if node.handler.is_some() {
            out.push_str(" [SET]");
        }
        if node.query_handler.is_some() {
            out.push_str(" [QUERY]");
        }
        out.push('\n');
        for &child in node.children.values() {
            self.dump_node(child, indent + 1, out);
        }
    }
}

/// Index of the first node of the maximal trailing optional run, or
/// `nodes.len()` when the pattern ends with a required node.
fn trailing_optional_start(nodes: &[PatternNode]) -> usize {
    let mut start = nodes.len();
    for i in (0..nodes.len()).rev() {
        if nodes[i].optional {
            start = i;
        } else {
            break;
        }
    }
    start
}

/// Normalize a common-command name: uppercase with a leading `*`.
fn normalize_common_name(name: &str) -> String {
    let upper = name.to_ascii_uppercase();
    if upper.starts_with('*') {
        upper
    } else {
        format!("*{upper}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> CommandHandler {
        handler(|_| 0)
    }

    fn walk<'a>(tree: &'a CommandTree, path: &[&str]) -> Option<NodeId> {
        let mut current = tree.root();
        for name in path {
            let (child, _) = tree.find_child(current, name, None)?;
            current = child;
        }
        Some(current)
    }

    #[test]
    fn register_creates_path() {
        let mut tree = CommandTree::new();
        tree.register_set(":SOURce:FREQuency", noop()).unwrap();
        let node = walk(&tree, &["SOUR", "FREQ"]).expect("path exists");
        assert!(tree.node(node).handler().is_some());
        assert!(tree.node(node).query_handler().is_none());
    }

    #[test]
    fn register_query_appends_question_mark() {
        let mut tree = CommandTree::new();
        tree.register_query(":SYSTem:VERSion", noop()).unwrap();
        let node = walk(&tree, &["SYST", "VERS"]).unwrap();
        assert!(tree.node(node).query_handler().is_some());
    }

    #[test]
    fn register_both_binds_two_slots() {
        let mut tree = CommandTree::new();
        tree.register_both(":OUTPut:STATe?", noop(), noop()).unwrap();
        let node = walk(&tree, &["OUTP", "STAT"]).unwrap();
        assert!(tree.node(node).handler().is_some());
        assert!(tree.node(node).query_handler().is_some());
    }

    #[test]
    fn repeated_registration_reuses_nodes() {
        let mut tree = CommandTree::new();
        tree.register_set(":SOURce:FREQuency", noop()).unwrap();
        tree.register_set(":SOURce:AMPLitude", noop()).unwrap();
        let count = tree.nodes.len();
        // ROOT + SOURce + FREQuency + AMPLitude
        assert_eq!(count, 4);
    }

    #[test]
    fn optional_chain_binds_every_prefix() {
        let mut tree = CommandTree::new();
        tree.register_query(":MEASure:VOLTage[:DC]?", noop()).unwrap();

        let volt = walk(&tree, &["MEAS", "VOLT"]).unwrap();
        let dc = walk(&tree, &["MEAS", "VOLT", "DC"]).unwrap();
        assert!(tree.node(volt).query_handler().is_some());
        assert!(tree.node(dc).query_handler().is_some());
        assert!(tree.node(dc).is_optional());
        // The non-optional ancestor's parent is not bound.
        let meas = walk(&tree, &["MEAS"]).unwrap();
        assert!(tree.node(meas).query_handler().is_none());
    }

    #[test]
    fn later_optional_registration_upgrades_node() {
        let mut tree = CommandTree::new();
        tree.register_set(":SENSe:BANDwidth", noop()).unwrap();
        let bw = walk(&tree, &["SENS", "BAND"]).unwrap();
        assert!(!tree.node(bw).is_optional());
        tree.register_set(":SENSe[:BANDwidth]", noop()).unwrap();
        assert!(tree.node(bw).is_optional());
    }

    #[test]
    fn find_child_long_form_prefix() {
        let mut tree = CommandTree::new();
        tree.register_set(":MEASure:VOLTage", noop()).unwrap();
        assert!(walk(&tree, &["MEASURE", "VOLTAGE"]).is_some());
        assert!(walk(&tree, &["measu", "volta"]).is_some());
        assert!(walk(&tree, &["ME", "VOLT"]).is_none());
    }

    #[test]
    fn find_child_suffix_constraint() {
        let mut tree = CommandTree::new();
        tree.register_set(":MEASure<ch:1-8>:VOLTage", noop()).unwrap();

        let (_, v) = tree.find_child(tree.root(), "MEAS", Some(3)).unwrap();
        assert_eq!(v, 3);
        assert!(tree.find_child(tree.root(), "MEAS", Some(9)).is_none());
        // Required suffix omitted: no match.
        assert!(tree.find_child(tree.root(), "MEAS", None).is_none());
    }

    #[test]
    fn find_child_rejects_suffix_on_plain_node() {
        let mut tree = CommandTree::new();
        tree.register_set(":SOURce:FREQuency", noop()).unwrap();
        assert!(tree.find_child(tree.root(), "SOUR", Some(2)).is_none());
    }

    #[test]
    fn common_command_normalization() {
        let mut tree = CommandTree::new();
        tree.register_common("*IDN?", noop());
        tree.register_common("rst", noop());
        assert!(tree.has_common("*idn?"));
        assert!(tree.has_common("IDN?"));
        assert!(tree.has_common("*RST"));
        assert!(!tree.has_common("*IDN"));
        assert!(tree.find_common("*IDN?").is_some());
    }

    #[test]
    fn dump_lists_structure() {
        let mut tree = CommandTree::new();
        tree.register_both(":OUTPut[:STATe]", noop(), noop()).unwrap();
        tree.register_common("*CLS", noop());
        let dump = tree.dump();
        assert!(dump.contains("OUTP(OUTPut)"));
        assert!(dump.contains("[optional]"));
        assert!(dump.contains("*CLS"));
    }
}
