//! Node-suffix values extracted during path resolution.

use std::collections::HashMap;

/// One extracted suffix binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeParamEntry {
    /// Parameter name from the registration pattern (e.g. `"ch"`).
    pub param_name: String,
    /// Short name of the node that carried the suffix (e.g. `"MEAS"`).
    pub node_short_name: String,
    /// Long name of the node (e.g. `"MEASure"`).
    pub node_long_name: String,
    /// The bound suffix value.
    pub value: i32,
}

/// Ordered collection of suffix bindings for one resolved command.
///
/// Values are retrievable by registration parameter name, by either node
/// name form, or by ordinal position. Name lookups are case-insensitive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeParamValues {
    entries: Vec<NodeParamEntry>,
    by_param_name: HashMap<String, usize>,
    by_node_name: HashMap<String, usize>,
}

impl NodeParamValues {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a binding. Later bindings shadow earlier ones under the same
    /// lookup key; ordinal access keeps every entry.
    pub fn add(
        &mut self,
        param_name: &str,
        node_short_name: &str,
        node_long_name: &str,
        value: i32,
    ) {
        let index = self.entries.len();
        self.entries.push(NodeParamEntry {
            param_name: param_name.to_string(),
            node_short_name: node_short_name.to_string(),
            node_long_name: node_long_name.to_string(),
            value,
        });

        self.by_param_name
            .insert(param_name.to_ascii_uppercase(), index);
        let upper_short = node_short_name.to_ascii_uppercase();
        let upper_long = node_long_name.to_ascii_uppercase();
        self.by_node_name.insert(upper_short.clone(), index);
        if upper_short != upper_long {
            self.by_node_name.insert(upper_long, index);
        }
    }

    /// Value by registration parameter name, or `default` when absent.
    pub fn get(&self, param_name: &str, default: i32) -> i32 {
        self.by_param_name
            .get(&param_name.to_ascii_uppercase())
            .map_or(default, |&i| self.entries[i].value)
    }

    /// Value by position in extraction order, or `default` out of range.
    pub fn get_index(&self, index: usize, default: i32) -> i32 {
        self.entries.get(index).map_or(default, |e| e.value)
    }

    /// Value by node short or long name, or `default` when absent.
    pub fn get_by_node_name(&self, node_name: &str, default: i32) -> i32 {
        self.by_node_name
            .get(&node_name.to_ascii_uppercase())
            .map_or(default, |&i| self.entries[i].value)
    }

    /// Returns `true` when a binding exists for the parameter name.
    pub fn has(&self, param_name: &str) -> bool {
        self.by_param_name
            .contains_key(&param_name.to_ascii_uppercase())
    }

    /// Returns `true` when a binding exists for the node name.
    pub fn has_node(&self, node_name: &str) -> bool {
        self.by_node_name
            .contains_key(&node_name.to_ascii_uppercase())
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no bindings were extracted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All bindings in extraction order.
    pub fn entries(&self) -> &[NodeParamEntry] {
        &self.entries
    }

    /// Remove all bindings.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.by_param_name.clear();
        self.by_node_name.clear();
    }
}

impl std::fmt::Display for NodeParamValues {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NodeParams[")?;
        for (i, e) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}({})={}", e.param_name, e.node_short_name, e.value)?;
        }
        write!(f, "]")
    }
}
