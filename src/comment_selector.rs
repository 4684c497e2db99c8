//! Comment selector (§4.7): consumes a fixed-width field off the front of
//! the bitstream and resolves it to the post or to a comment in `F`,
//! reconstructing the ancestor chain for the chosen target.

use crate::bits::{decode_int, take_bits, width};
use crate::comment_tree::{self, FlatComment};

/// One projected node of the ancestor chain, emitted root-first (§4.7).
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainNode {
    pub author: String,
    pub body: String,
    pub id: String,
    pub parent_id: Option<String>,
    pub permalink: String,
}

/// What the popped field resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Post,
    Comment,
}

/// A minimal view of the post, used as embedding context when the target is
/// the post itself rather than a comment.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostContext {
    pub id: String,
    pub body: String,
}

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentSelection {
    pub bits_used: String,
    pub bits_count: usize,
    pub selection_index: u64,
    pub target_type: TargetType,
    pub context: PostContext,
    pub picked_comment_chain: Vec<ChainNode>,
    pub insufficient_bits: bool,
}

/// Pops `ceil(log2(|F|+1))` bits off `bitstream`, resolves the value to the
/// post (index 0) or a comment (index 1..=|F|), and reconstructs the
/// ancestor chain when a comment is targeted (§4.7).
///
/// Returns the selection and the unconsumed remainder of the bitstream.
pub fn select<'a>(
    bitstream: &'a [bool],
    flat: &[FlatComment],
    post_id: &str,
    post_body: &str,
    thread_root_id: Option<&str>,
) -> (CommentSelection, &'a [bool]) {
    let n = flat.len() as u64;
    let k = width(n) as usize;
    let (used, rest, insufficient) = take_bits(bitstream, k);

    let raw = decode_int(&used);
    let s = if raw > n { raw % (n + 1) } else { raw };

    let context = PostContext {
        id: post_id.to_string(),
        body: post_body.to_string(),
    };

    let (target_type, chain) = if s == 0 {
        (TargetType::Post, Vec::new())
    } else {
        let target = &flat[(s - 1) as usize];
        let chain = build_ancestor_chain(target, flat, thread_root_id);
        (TargetType::Comment, chain)
    };

    let selection = CommentSelection {
        bits_used: crate::bits::to_bit_string(&used),
        bits_count: used.len(),
        selection_index: s,
        target_type,
        context,
        picked_comment_chain: chain,
        insufficient_bits: insufficient,
    };

    (selection, rest)
}

/// Walks parent-ids from `target` up to (but not past) the thread root,
/// guarded against cycles, and returns the chain root-first.
fn build_ancestor_chain(
    target: &FlatComment,
    flat: &[FlatComment],
    thread_root_id: Option<&str>,
) -> Vec<ChainNode> {
    let index = comment_tree::index_by_id(flat);
    let mut chain = vec![project(target)];
    let mut visited = std::collections::HashSet::new();
    visited.insert(target.id.clone());

    let mut current = target;
    loop {
        let Some(parent_id) = current.parent_id.as_deref() else {
            break;
        };
        if let Some(root) = thread_root_id {
            if comment_tree::ids_match(parent_id, root) {
                break;
            }
        }
        let Some(parent) = comment_tree::resolve_parent(parent_id, &index, flat) else {
            break;
        };
        if !visited.insert(parent.id.clone()) {
            break;
        }
        chain.push(project(parent));
        current = parent;
    }

    chain.reverse();
    chain
}

fn project(comment: &FlatComment) -> ChainNode {
    ChainNode {
        author: comment
            .author
            .clone()
            .unwrap_or_else(|| "unknown".to_string()),
        body: comment.body.clone(),
        id: comment.id.clone(),
        parent_id: comment.parent_id.clone(),
        permalink: comment.permalink.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_comment(id: &str, parent_id: Option<&str>) -> FlatComment {
        FlatComment {
            id: id.to_string(),
            parent_id: parent_id.map(str::to_string),
            thread_root_id: Some("root".to_string()),
            author: Some("author".to_string()),
            body: format!("body {id}"),
            permalink: format!("/{id}"),
        }
    }

    #[test]
    fn index_zero_targets_post() {
        let flat = vec![flat_comment("A", Some("root"))];
        let bits = crate::bits::from_bit_string("0"); // width(1) = 1 bit, value 0
        let (sel, rest) = select(&bits, &flat, "root", "post body", Some("root"));
        assert_eq!(sel.target_type, TargetType::Post);
        assert!(rest.is_empty());
    }

    #[test]
    fn s3_two_comment_chain_resolves() {
        // B's parent_id = "t1_A"; A.id = "A". Selection index 2 -> B.
        let a = flat_comment("A", Some("root"));
        let b = flat_comment("B", Some("t1_A"));
        let flat = vec![a, b];
        // width(2) = ceil(log2(3)) = 2 bits; value 2 = "10"
        let bits = crate::bits::from_bit_string("10");
        let (sel, _rest) = select(&bits, &flat, "root", "post", Some("root"));
        assert_eq!(sel.target_type, TargetType::Comment);
        let ids: Vec<_> = sel.picked_comment_chain.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B"]);
    }

    #[test]
    fn clamps_out_of_range_selection() {
        let flat = vec![flat_comment("A", Some("root"))];
        // n=1, k=width(1)=1, only two possible values (0,1); out-of-range needs larger k.
        // Force an out-of-range raw value directly through modulo logic by using n=1's
        // k and checking s never exceeds n.
        let bits = crate::bits::from_bit_string("1");
        let (sel, _rest) = select(&bits, &flat, "root", "post", Some("root"));
        assert!(sel.selection_index <= 1);
    }

    #[test]
    fn underflow_pads_and_flags_insufficient() {
        let flat: Vec<FlatComment> = (0..100).map(|i| flat_comment(&i.to_string(), Some("root"))).collect();
        let bits = crate::bits::from_bit_string("10"); // only 2 bits, width(100) = 7
        let (sel, rest) = select(&bits, &flat, "root", "post", Some("root"));
        assert!(sel.insufficient_bits);
        assert!(rest.is_empty());
    }
}
