//! Dictionary builder (§4.3): assembles the ordered reference-text list `D`
//! the DP compressor takes its back-references from.

use crate::comment_tree::FlatComment;

/// Builds `D` as `[post_body, each reference document in order, each
/// flattened comment body in canonical tree order]`, dropping empty
/// entries. Ordering of the surviving entries is preserved — this is the
/// protocol parameter the decoder must reconstruct identically.
pub fn build_dictionary(
    post_body: &str,
    search_results: &[String],
    flat_comments: &[FlatComment],
) -> Vec<String> {
    let mut dictionary = Vec::with_capacity(1 + search_results.len() + flat_comments.len());

    dictionary.push(post_body.to_string());
    dictionary.extend(search_results.iter().cloned());
    dictionary.extend(flat_comments.iter().map(|c| c.body.clone()));

    dictionary.retain(|entry| !entry.is_empty());
    dictionary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(bodies: &[&str]) -> Vec<FlatComment> {
        bodies
            .iter()
            .enumerate()
            .map(|(i, b)| FlatComment {
                id: i.to_string(),
                parent_id: None,
                thread_root_id: None,
                author: None,
                body: b.to_string(),
                permalink: String::new(),
            })
            .collect()
    }

    #[test]
    fn preserves_order_and_drops_empty() {
        let comments = flat(&["", "hello", "world"]);
        let dict = build_dictionary("post body", &["doc1".into(), "".into()], &comments);
        assert_eq!(dict, vec!["post body", "doc1", "hello", "world"]);
    }

    #[test]
    fn empty_carrier_yields_empty_dictionary() {
        let dict = build_dictionary("", &[], &[]);
        assert!(dict.is_empty());
    }
}
