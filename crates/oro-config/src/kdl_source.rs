use indexmap::IndexMap;
use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};

use crate::ConfigValue;

const OPTIONS: &str = "options";

/// Reads the flat key/value pairs under the top-level `options` node.
///
/// ```kdl
/// options {
///     registry "https://registry.npmjs.org/"
///     "//registry.npmjs.org/:always-auth" false
/// }
/// ```
///
/// Each child node is a key, and its first positional argument is the
/// value. Children without a usable value are skipped.
pub(crate) fn read_options(doc: &KdlDocument) -> IndexMap<String, ConfigValue> {
    let mut map = IndexMap::new();
    let Some(children) = doc.get(OPTIONS).and_then(|node| node.children()) else {
        return map;
    };
    for node in children.nodes() {
        let key = node.name().value();
        match node_value(node) {
            Some(value) => {
                map.insert(key.to_string(), value);
            }
            None => tracing::debug!("Skipping config key without a value: {key}"),
        }
    }
    map
}

/// Syncs the `options` node of `doc` with `values`, leaving every other
/// top-level node, and any nested option blocks, alone. Comments survive,
/// but the document is reformatted.
pub(crate) fn write_options(doc: &mut KdlDocument, values: &IndexMap<String, ConfigValue>) {
    if doc.get(OPTIONS).is_none() {
        doc.nodes_mut().push(KdlNode::new(OPTIONS));
    }
    let Some(options) = doc.get_mut(OPTIONS) else {
        return;
    };
    options.ensure_children();
    if let Some(children) = options.children_mut().as_mut() {
        // Nodes without a readable value, like nested blocks, stay put.
        children.nodes_mut().retain(|node| {
            values.contains_key(node.name().value()) || node_value(node).is_none()
        });
        for (key, value) in values {
            if let Some(node) = children.get_mut(key) {
                if node_value(node).as_ref() != Some(value) {
                    node.entries_mut().clear();
                    node.push(entry(value));
                }
            } else {
                let mut node = KdlNode::new(key.as_str());
                node.push(entry(value));
                children.nodes_mut().push(node);
            }
        }
    }
    doc.fmt();
}

fn node_value(node: &KdlNode) -> Option<ConfigValue> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| value_kind(e.value()))
}

fn value_kind(value: &KdlValue) -> Option<ConfigValue> {
    if let Some(str) = value.as_string() {
        Some(ConfigValue::String(str.into()))
    } else if let Some(boolean) = value.as_bool() {
        Some(ConfigValue::Bool(boolean))
    } else {
        value.as_i64().map(ConfigValue::Integer)
    }
}

fn entry(value: &ConfigValue) -> KdlEntry {
    KdlEntry::new(match value {
        ConfigValue::String(s) => KdlValue::String(s.clone()),
        ConfigValue::Bool(b) => KdlValue::Bool(*b),
        ConfigValue::Integer(i) => KdlValue::Base10(*i),
    })
}
