//! XML rendering of a materialized tree.
//!
//! The layout is deterministic: category roots appear in schema order,
//! entity nodes under each parent are sorted (and deduplicated) by their
//! unique identifier, single-line properties become attributes, multi-line
//! properties become nested text elements, and cross-references render as
//! self-closing elements carrying the target's identifier.

use std::collections::BTreeMap;
use std::io::Write;

use crate::error::Result;
use crate::kind::EntityKind;
use crate::tree::{NodeId, Tree};

/// Write the whole tree as an XML document under the given root element.
pub fn write_xml<W: Write>(out: &mut W, tree: &Tree, root: &str) -> Result<()> {
    writeln!(out, "<{}>", root)?;
    for (name, node) in tree.categories() {
        writeln!(out, "  <{}>", name)?;
        write_children(out, tree, node, 2)?;
        writeln!(out, "  </{}>", name)?;
    }
    writeln!(out, "</{}>", root)?;
    Ok(())
}

/// Render the tree to a string.
pub fn to_xml(tree: &Tree, root: &str) -> Result<String> {
    let mut buffer = Vec::new();
    write_xml(&mut buffer, tree, root)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

fn write_children<W: Write>(out: &mut W, tree: &Tree, parent: NodeId, depth: usize) -> Result<()> {
    // Sort by unique id; duplicates collapse, last one wins.
    let mut sorted: BTreeMap<String, NodeId> = BTreeMap::new();
    for &child in tree.children(parent) {
        sorted.insert(tree.unique_id(child), child);
    }
    for (uid, child) in sorted {
        write_node(out, tree, child, &uid, depth)?;
    }
    Ok(())
}

fn write_node<W: Write>(
    out: &mut W,
    tree: &Tree,
    node: NodeId,
    uid: &str,
    depth: usize,
) -> Result<()> {
    let pad = "  ".repeat(depth);

    if tree.kind(node) == Some(EntityKind::Reference) {
        // A cross-reference points at its target's identifier, not its own.
        let target = tree
            .references(node)
            .next()
            .map(|(_, t)| tree.unique_id(t))
            .unwrap_or_default();
        writeln!(out, "{}<reference pk='{}'/>", pad, escape(&target))?;
        return Ok(());
    }

    let tag = tree.tag(node).unwrap_or("node");
    let mut attrs = format!(" pk='{}'", escape(uid));
    let mut nested: Vec<(&str, String)> = Vec::new();
    for (key, value) in tree.properties(node) {
        let text = value.to_string();
        if text.contains('\n') {
            nested.push((key, text));
        } else {
            attrs.push_str(&format!(" {}='{}'", key, escape(&text)));
        }
    }

    let slots: Vec<(&str, NodeId)> = tree.references(node).collect();
    if nested.is_empty() && slots.is_empty() && tree.children(node).is_empty() {
        writeln!(out, "{}<{}{}/>", pad, tag, attrs)?;
        return Ok(());
    }

    writeln!(out, "{}<{}{}>", pad, tag, attrs)?;
    for (slot, target) in slots {
        writeln!(
            out,
            "{}  <{} pk='{}'/>",
            pad,
            slot,
            escape(&tree.unique_id(target))
        )?;
    }
    for (key, text) in nested {
        writeln!(out, "{}  <{}>", pad, key)?;
        for line in text.split('\n') {
            writeln!(out, "{}  {}", pad, escape(line))?;
        }
        writeln!(out, "{}  </{}>", pad, key)?;
    }
    write_children(out, tree, node, depth + 1)?;
    writeln!(out, "{}</{}>", pad, tag)?;
    Ok(())
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}
