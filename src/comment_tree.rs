//! Comment tree flattener (§4.2): canonical pre-order traversal of the reply
//! forest, plus the tolerant parent-id resolver both sides of the protocol
//! must agree on.

use std::collections::HashMap;

use crate::carrier::RawComment;

/// One entry of the flattened, canonical pre-order traversal `F`.
#[derive(Debug, Clone)]
pub struct FlatComment {
    pub id: String,
    pub parent_id: Option<String>,
    pub thread_root_id: Option<String>,
    pub author: Option<String>,
    pub body: String,
    pub permalink: String,
}

/// Produces `F` by depth-first pre-order: the root list in its given order,
/// each node followed by the flattened traversal of its own replies.
pub fn flatten(roots: &[RawComment]) -> Vec<FlatComment> {
    let mut out = Vec::new();
    for root in roots {
        flatten_into(root, &mut out);
    }
    out
}

fn flatten_into(node: &RawComment, out: &mut Vec<FlatComment>) {
    out.push(FlatComment {
        id: node.id.clone(),
        parent_id: node.parent_id.clone(),
        thread_root_id: node.thread_root_id.clone(),
        author: node.author.clone(),
        body: node.body.clone(),
        permalink: node.permalink.clone(),
    });
    for reply in &node.replies {
        flatten_into(reply, out);
    }
}

/// Maps comment id -> position in `F`, built once and reused by every
/// parent lookup.
pub fn index_by_id(flat: &[FlatComment]) -> HashMap<&str, usize> {
    flat.iter()
        .enumerate()
        .map(|(i, c)| (c.id.as_str(), i))
        .collect()
}

/// If `id` is of the form `<prefix>_<suffix>`, returns the suffix after the
/// last underscore. This is the protocol's tolerance rule (§3, §4.2):
/// Reddit-style fullnames (`t1_abc123`) must resolve against bare ids
/// (`abc123`) and vice versa.
fn suffix_after_last_underscore(id: &str) -> Option<&str> {
    id.rfind('_').map(|pos| &id[pos + 1..])
}

/// Resolves a parent-id against the flattened list, trying the tolerant
/// fallback when a direct lookup misses.
pub fn resolve_parent<'a>(
    parent_id: &str,
    index: &HashMap<&str, usize>,
    flat: &'a [FlatComment],
) -> Option<&'a FlatComment> {
    if let Some(&i) = index.get(parent_id) {
        return Some(&flat[i]);
    }
    if let Some(suffix) = suffix_after_last_underscore(parent_id) {
        if let Some(&i) = index.get(suffix) {
            return Some(&flat[i]);
        }
    }
    None
}

/// Tolerant equality between two ids, used to detect "we've reached the
/// thread root" when walking ancestor chains: a bare id matches its
/// `prefix_`-qualified form in either direction.
pub fn ids_match(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    if let Some(suffix) = suffix_after_last_underscore(a) {
        if suffix == b {
            return true;
        }
    }
    if let Some(suffix) = suffix_after_last_underscore(b) {
        if suffix == a {
            return true;
        }
    }
    false
}
