//! The carrier record (§3, §6): the discussion thread, its attached
//! documents, and the per-document angle lists the core reads bits from.
//!
//! This module only normalizes the boundary shapes (§9 "nested/mutable
//! carrier parsing", "duck-typed optional wrappers"); everything downstream
//! of [`CarrierRecord`] operates on one canonical shape.

use serde::{Deserialize, Serialize};

/// One node of the reply forest, as supplied by the upstream sanitizer.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawComment {
    pub id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    /// The thread's root id, usually carried on every node (Reddit calls
    /// this `link_id`).
    #[serde(default, alias = "link_id")]
    pub thread_root_id: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub replies: Vec<RawComment>,
}

/// The root post of the thread.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawPost {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub selftext: String,
    #[serde(default)]
    pub subreddit: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub search_results: Vec<String>,
    #[serde(default)]
    pub comments: Vec<RawComment>,
}

/// An editorial pointer into one of the attached documents.
///
/// Two angles are equal iff `source_quote`, `tangent` and `category` all
/// match; `source_document` is metadata, not identity (§3).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Angle {
    pub source_quote: String,
    pub tangent: String,
    pub category: String,
    #[serde(default)]
    pub source_document: Option<usize>,
}

impl PartialEq for Angle {
    fn eq(&self, other: &Self) -> bool {
        self.source_quote == other.source_quote
            && self.tangent == other.tangent
            && self.category == other.category
    }
}

/// The two documented top-level shapes of the input record: `{ post, angles
/// }` and the duck-typed `{ data: <post-shape>, angles }` alternative.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum PostShape {
    Post {
        post: RawPost,
    },
    Data {
        #[serde(rename = "data")]
        post: RawPost,
    },
}

/// The wire-level input record, accepted in either documented shape and
/// normalized by [`CarrierInput::into_record`].
#[derive(Debug, Clone, Deserialize)]
pub struct CarrierInput {
    #[serde(flatten)]
    shape: PostShape,
    #[serde(default)]
    angles: Vec<Vec<Angle>>,
}

/// The canonical, normalized carrier the rest of the core operates on.
#[derive(Debug, Clone)]
pub struct CarrierRecord {
    pub post_id: String,
    pub post_body: String,
    pub search_results: Vec<String>,
    pub comments: Vec<RawComment>,
    pub angle_groups: Vec<Vec<Angle>>,
}

impl CarrierInput {
    pub fn into_record(self) -> CarrierRecord {
        let post = match self.shape {
            PostShape::Post { post } => post,
            PostShape::Data { post } => post,
        };
        CarrierRecord {
            post_id: post.id,
            post_body: post.selftext,
            search_results: post.search_results,
            comments: post.comments,
            angle_groups: self.angles,
        }
    }
}

/// The payload, accepted either bare or wrapped as `{ payload: "…" }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PayloadInput {
    Wrapped { payload: String },
    Bare(String),
}

impl PayloadInput {
    pub fn into_text(self) -> String {
        match self {
            PayloadInput::Wrapped { payload } => payload,
            PayloadInput::Bare(text) => text,
        }
    }
}
