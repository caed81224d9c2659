//! Path resolution against the command tree.
//!
//! Resolution is a bounded depth-first search over two move kinds: an
//! epsilon move descends into an optional child without consuming input,
//! and a consume move matches the next header segment (mnemonic plus
//! optional numeric suffix) against a child. A visited set over
//! `(node, input index)` pairs keeps epsilon chains from looping, and a
//! depth cap bounds adversarial optional nesting.

use crate::grammar::splitter::{ParsedCommand, PathSegment};
use crate::limits;
use crate::tree::CommandTree;
use crate::tree::node::{CommandHandler, NodeId};
use crate::tree::node_params::NodeParamValues;
use scpi_kit_errors::{codes, message};
use std::collections::HashSet;

/// A resolution failure, carrying the SCPI code to queue.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ResolveError {
    /// SCPI error code (usually `-113 Undefined header`).
    pub code: i32,
    /// Human-readable description.
    pub message: String,
}

impl ResolveError {
    fn undefined_header(detail: &str) -> Self {
        Self {
            code: codes::UNDEFINED_HEADER,
            message: if detail.is_empty() {
                message(codes::UNDEFINED_HEADER).to_string()
            } else {
                format!("{} near: {detail}", message(codes::UNDEFINED_HEADER))
            },
        }
    }
}

/// What a command resolved to.
pub enum ResolvedTarget {
    /// A node in the command tree.
    Node(NodeId),
    /// An IEEE 488.2 common-command handler.
    Common(CommandHandler),
}

impl std::fmt::Debug for ResolvedTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Node(id) => f.debug_tuple("Node").field(id).finish(),
            Self::Common(_) => f.debug_tuple("Common").field(&"<handler>").finish(),
        }
    }
}

/// Successful resolution of one parsed command.
#[derive(Debug)]
pub struct Resolved {
    /// The resolved handler location.
    pub target: ResolvedTarget,
    /// Node-suffix bindings collected along consume moves.
    pub node_params: NodeParamValues,
    /// Every node entered, including epsilon moves.
    pub matched_path: Vec<NodeId>,
    /// Only the nodes entered by consuming an input segment.
    pub consumed_path: Vec<NodeId>,
}

/// Resolves parsed commands against a registered tree.
pub struct PathResolver<'t> {
    tree: &'t CommandTree,
}

impl<'t> PathResolver<'t> {
    /// Create a resolver over `tree`.
    pub fn new(tree: &'t CommandTree) -> Self {
        Self { tree }
    }

    /// Resolve `cmd` starting from `current` (the semicolon path context;
    /// `None` means root).
    pub fn resolve(
        &self,
        cmd: &ParsedCommand,
        current: Option<NodeId>,
    ) -> Result<Resolved, ResolveError> {
        if cmd.path.is_empty() {
            return Err(ResolveError {
                code: codes::SYNTAX_ERROR,
                message: "Empty command header".to_string(),
            });
        }

        if cmd.is_common {
            let name = common_lookup_name(cmd);
            let Some(handler) = self.tree.find_common(&name) else {
                return Err(ResolveError {
                    code: codes::UNDEFINED_HEADER,
                    message: format!("Unknown common command: {name}"),
                });
            };
            return Ok(Resolved {
                target: ResolvedTarget::Common(handler),
                node_params: NodeParamValues::new(),
                matched_path: Vec::new(),
                consumed_path: Vec::new(),
            });
        }

        let start = if cmd.is_absolute {
            self.tree.root()
        } else {
            current.unwrap_or(self.tree.root())
        };

        let mut visited = HashSet::new();
        self.dfs(
            start,
            &cmd.path,
            0,
            NodeParamValues::new(),
            Vec::new(),
            Vec::new(),
            &mut visited,
            0,
        )
        .ok_or_else(|| {
            let near = cmd.path.first().map(|s| s.to_string()).unwrap_or_default();
            ResolveError::undefined_header(&near)
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn dfs(
        &self,
        current: NodeId,
        path: &[PathSegment],
        index: usize,
        node_params: NodeParamValues,
        matched_path: Vec<NodeId>,
        consumed_path: Vec<NodeId>,
        visited: &mut HashSet<(NodeId, usize)>,
        depth: usize,
    ) -> Option<Resolved> {
        if depth > limits::MAX_RESOLVE_DEPTH {
            return None;
        }
        if !visited.insert((current, index)) {
            return None;
        }

        if index >= path.len() {
            return Some(Resolved {
                target: ResolvedTarget::Node(current),
                node_params,
                matched_path,
                consumed_path,
            });
        }

        // Epsilon moves: descend into optional children without consuming
        // input. Child order is deterministic (BTreeMap by short name).
        let optional_children: Vec<NodeId> = self
            .tree
            .node(current)
            .children
            .values()
            .copied()
            .filter(|&id| self.tree.node(id).is_optional())
            .collect();
        for child in optional_children {
            let mut matched = matched_path.clone();
            matched.push(child);
            if let Some(found) = self.dfs(
                child,
                path,
                index,
                node_params.clone(),
                matched,
                consumed_path.clone(),
                visited,
                depth + 1,
            ) {
                return Some(found);
            }
        }

        // Consume move: match the next input segment.
        let segment = &path[index];
        if let Some((next, extracted)) = self.tree.find_child(current, &segment.name, segment.suffix)
        {
            let mut matched = matched_path;
            matched.push(next);
            let mut consumed = consumed_path;
            consumed.push(next);

            let mut params = node_params;
            let node = self.tree.node(next);
            if let Some(def) = node.param() {
                params.add(&def.name, node.short_name(), node.long_name(), extracted);
            }

            if let Some(found) = self.dfs(
                next,
                path,
                index + 1,
                params,
                matched,
                consumed,
                visited,
                depth + 1,
            ) {
                return Some(found);
            }
        }

        None
    }
}

/// Normalized common-command lookup name: `*<UPPER>` plus `?` for queries.
fn common_lookup_name(cmd: &ParsedCommand) -> String {
    let mut name = String::from("*");
    if let Some(first) = cmd.path.first() {
        name.push_str(&first.name.to_ascii_uppercase());
    }
    if cmd.is_query {
        name.push('?');
    }
    name
}
