//! Post document schema
//!
//! Author name and avatar are denormalized snapshots taken at creation time,
//! not live references to the user document. The likes list is a set over
//! identity ids: an identity may like a post at most once.

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;
use crate::types::ApiError;

/// Collection name for posts
pub const POST_COLLECTION: &str = "posts";

/// A like by one identity
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Like {
    pub user: ObjectId,
}

/// A comment on a post
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    /// Comment author identity
    pub user: ObjectId,
    /// Author name snapshot
    pub name: String,
    /// Author avatar snapshot
    pub avatar: String,
    pub text: String,
    pub date: DateTime,
}

impl Comment {
    pub fn new(user: ObjectId, name: String, avatar: String, text: String) -> Self {
        Self {
            id: ObjectId::new(),
            user,
            name,
            avatar,
            text,
            date: DateTime::now(),
        }
    }
}

/// Post document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PostDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata (created_at, updated_at)
    #[serde(default)]
    pub metadata: Metadata,

    /// Author identity; the trust boundary for post deletion
    pub user: ObjectId,

    /// Author name snapshot
    pub name: String,

    /// Author avatar snapshot
    pub avatar: String,

    pub text: String,

    /// Newest like first
    #[serde(default)]
    pub likes: Vec<Like>,

    /// Newest comment first
    #[serde(default)]
    pub comments: Vec<Comment>,

    /// Creation time; listing sorts on this, newest first
    pub date: DateTime,
}

impl PostDoc {
    /// Create a new post with author snapshots
    pub fn new(user: ObjectId, name: String, avatar: String, text: String) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            user,
            name,
            avatar,
            text,
            likes: Vec::new(),
            comments: Vec::new(),
            date: DateTime::now(),
        }
    }

    /// Record a like, newest first.
    ///
    /// Rejects a second like from the same identity; the likes list stays a
    /// set.
    pub fn add_like(&mut self, user: ObjectId) -> Result<(), ApiError> {
        if self.likes.iter().any(|like| like.user == user) {
            return Err(ApiError::Conflict("Post already Like".into()));
        }
        self.likes.insert(0, Like { user });
        Ok(())
    }

    /// Remove this identity's like.
    pub fn remove_like(&mut self, user: &ObjectId) -> Result<(), ApiError> {
        let Some(index) = self.likes.iter().position(|like| like.user == *user) else {
            return Err(ApiError::Conflict("Post has not yet been liked".into()));
        };
        self.likes.remove(index);
        Ok(())
    }

    /// Prepend a comment (newest first)
    pub fn add_comment(&mut self, comment: Comment) {
        self.comments.insert(0, comment);
    }

    /// Find the first comment authored by the given identity.
    ///
    /// Comment deletion selects by author, not by comment id: whichever of
    /// the caller's comments comes first in the list is the one removed.
    pub fn first_comment_by(&self, user: &ObjectId) -> Option<&Comment> {
        self.comments.iter().find(|c| c.user == *user)
    }

    /// Remove the first comment authored by the given identity.
    pub fn remove_first_comment_by(&mut self, user: &ObjectId) -> Result<Comment, ApiError> {
        let Some(index) = self.comments.iter().position(|c| c.user == *user) else {
            return Err(ApiError::NotFound("Comment does not exits".into()));
        };
        Ok(self.comments.remove(index))
    }
}

impl IntoIndexes for PostDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // Listing sorts by date descending
            (
                doc! { "date": -1 },
                Some(IndexOptions::builder().name("date_desc".to_string()).build()),
            ),
            // Author lookups
            (
                doc! { "user": 1 },
                Some(IndexOptions::builder().name("user_index".to_string()).build()),
            ),
        ]
    }
}

impl MutMetadata for PostDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_post() -> PostDoc {
        PostDoc::new(
            ObjectId::new(),
            "Ada".into(),
            "https://www.gravatar.com/avatar/abc".into(),
            "hi".into(),
        )
    }

    #[test]
    fn test_like_is_idempotent_rejecting() {
        let mut post = sample_post();
        let user = ObjectId::new();

        post.add_like(user).unwrap();
        assert_eq!(post.likes.len(), 1);

        let err = post.add_like(user).unwrap_err();
        assert_eq!(err.to_string(), "Post already Like");
        assert_eq!(post.likes.len(), 1);
    }

    #[test]
    fn test_like_unlike_round_trip() {
        let mut post = sample_post();
        let user = ObjectId::new();

        post.add_like(user).unwrap();
        post.remove_like(&user).unwrap();
        assert!(post.likes.is_empty());

        // Unliking again fails; likes were never there
        let err = post.remove_like(&user).unwrap_err();
        assert_eq!(err.to_string(), "Post has not yet been liked");
    }

    #[test]
    fn test_likes_prepend() {
        let mut post = sample_post();
        let first = ObjectId::new();
        let second = ObjectId::new();

        post.add_like(first).unwrap();
        post.add_like(second).unwrap();

        assert_eq!(post.likes[0].user, second);
        assert_eq!(post.likes[1].user, first);
    }

    #[test]
    fn test_comments_prepend() {
        let mut post = sample_post();
        let author = ObjectId::new();

        post.add_comment(Comment::new(author, "Ada".into(), "a".into(), "one".into()));
        post.add_comment(Comment::new(author, "Ada".into(), "a".into(), "two".into()));

        assert_eq!(post.comments[0].text, "two");
        assert_eq!(post.comments[1].text, "one");
    }

    #[test]
    fn test_remove_first_comment_by_author() {
        let mut post = sample_post();
        let author = ObjectId::new();
        let other = ObjectId::new();

        post.add_comment(Comment::new(author, "Ada".into(), "a".into(), "oldest".into()));
        post.add_comment(Comment::new(other, "Bob".into(), "b".into(), "middle".into()));
        post.add_comment(Comment::new(author, "Ada".into(), "a".into(), "newest".into()));

        // Selection is by author: the first matching comment in list order
        // goes, regardless of which one the caller meant
        let removed = post.remove_first_comment_by(&author).unwrap();
        assert_eq!(removed.text, "newest");
        assert_eq!(post.comments.len(), 2);

        let err = post.remove_first_comment_by(&ObjectId::new()).unwrap_err();
        assert_eq!(err.to_string(), "Comment does not exits");
    }
}
