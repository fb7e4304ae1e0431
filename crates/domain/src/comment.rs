//! Comment trees.
//!
//! Comments on an ad form a tree: a top-level list where each node carries
//! a list of child replies, nested to unbounded depth.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::generate_id;

/// A comment node, possibly with nested replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Unique identifier.
    pub id: String,
    /// Author's user id.
    pub author_id: String,
    /// Author's display name at posting time.
    pub author_name: String,
    /// Comment body.
    pub text: String,
    /// When the comment was posted.
    pub created_at: DateTime<Utc>,
    /// Child replies, in posting order.
    #[serde(default)]
    pub replies: Vec<Comment>,
}

impl Comment {
    /// Creates a leaf comment with no replies.
    #[must_use]
    pub fn new(
        author_id: impl Into<String>,
        author_name: impl Into<String>,
        text: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: generate_id(),
            author_id: author_id.into(),
            author_name: author_name.into(),
            text: text.into(),
            created_at: now,
            replies: Vec::new(),
        }
    }

    /// Total number of nodes in this subtree, including self.
    #[must_use]
    pub fn subtree_len(&self) -> usize {
        1 + self.replies.iter().map(Self::subtree_len).sum::<usize>()
    }
}

/// Finds a node by id, searching depth-first from the top-level comments.
pub fn find_comment_mut<'a>(comments: &'a mut [Comment], id: &str) -> Option<&'a mut Comment> {
    for comment in comments {
        if comment.id == id {
            return Some(comment);
        }
        if let Some(found) = find_comment_mut(&mut comment.replies, id) {
            return Some(found);
        }
    }
    None
}

/// Inserts `reply` under the first node whose id equals `parent_id`,
/// searching depth-first from the top-level comments.
///
/// Returns false (and leaves the tree untouched) when no node matches.
pub fn insert_reply(comments: &mut [Comment], parent_id: &str, reply: Comment) -> bool {
    match find_comment_mut(comments, parent_id) {
        Some(parent) => {
            parent.replies.push(reply);
            true
        }
        None => false,
    }
}

/// Removes the node with `comment_id` at any depth, rebuilding the tree and
/// preserving all remaining sibling and ancestor structure. The removed
/// node's own replies are discarded with it.
#[must_use]
pub fn remove_comment(comments: Vec<Comment>, comment_id: &str) -> Vec<Comment> {
    comments
        .into_iter()
        .filter(|c| c.id != comment_id)
        .map(|mut c| {
            c.replies = remove_comment(std::mem::take(&mut c.replies), comment_id);
            c
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn tree() -> Vec<Comment> {
        // a
        // └── b
        //     └── c
        // d
        let now = Utc::now();
        let mut a = Comment::new("u1", "A", "top", now);
        a.id = "a".to_string();
        let mut b = Comment::new("u2", "B", "reply", now);
        b.id = "b".to_string();
        let mut c = Comment::new("u3", "C", "deep", now);
        c.id = "c".to_string();
        b.replies.push(c);
        a.replies.push(b);
        let mut d = Comment::new("u4", "D", "other", now);
        d.id = "d".to_string();
        vec![a, d]
    }

    #[test]
    fn test_insert_reply_at_depth() {
        let mut comments = tree();
        let reply = Comment::new("u5", "E", "nested", Utc::now());
        let reply_id = reply.id.clone();

        assert!(insert_reply(&mut comments, "c", reply));
        assert_eq!(comments[0].replies[0].replies[0].replies[0].id, reply_id);
    }

    #[test]
    fn test_insert_reply_missing_parent() {
        let mut comments = tree();
        let reply = Comment::new("u5", "E", "orphan", Utc::now());
        assert!(!insert_reply(&mut comments, "nope", reply));
        assert_eq!(comments.iter().map(Comment::subtree_len).sum::<usize>(), 4);
    }

    #[test]
    fn test_remove_deep_node_preserves_structure() {
        let comments = remove_comment(tree(), "c");
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].id, "a");
        assert_eq!(comments[0].replies[0].id, "b");
        assert!(comments[0].replies[0].replies.is_empty());
        assert_eq!(comments[1].id, "d");
    }

    #[test]
    fn test_remove_branch_discards_subtree() {
        let comments = remove_comment(tree(), "b");
        assert_eq!(comments[0].id, "a");
        assert!(comments[0].replies.is_empty());
    }

    #[test]
    fn test_remove_top_level() {
        let comments = remove_comment(tree(), "a");
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].id, "d");
    }
}
