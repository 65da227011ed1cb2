use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod error;
pub mod interaction;
pub mod model;
pub mod reactions;
pub mod service;
pub mod thread;

pub use error::{ServiceError, ThreadError, WriteAction};
pub use interaction::{EditPhase, EditTarget, PendingAction, ThreadUi};
pub use model::CommentThreadModel;
pub use reactions::ArticleReactionsModel;
pub use service::{ArticleService, CommentService, NotificationService, Session};
pub use thread::{hydrate, CommentThread, Entry};

pub type CommentId = String;
pub type ReplyId = String;
pub type BlogId = String;
pub type UserId = String;

/// Shown wherever a record's author is missing (deleted or unknown user).
pub const ANONYMOUS: &str = "Anonymous";

// ── Session ──

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

// ── Authors ──

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRef {
    #[serde(rename = "_id")]
    pub id: UserId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "avatar")]
    pub avatar_url: Option<String>,
}

impl AuthorRef {
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => ANONYMOUS,
        }
    }
}

/// Display name for an optional author.
pub fn author_name(author: Option<&AuthorRef>) -> &str {
    author.map(AuthorRef::display_name).unwrap_or(ANONYMOUS)
}

/// True when `user` wrote the record. A record without an author is owned by nobody.
pub fn is_owned_by(author: Option<&AuthorRef>, user: &CurrentUser) -> bool {
    author.is_some_and(|a| a.id == user.id)
}

// ── Wire records ──

/// A comment or reply exactly as the comment service returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub user: Option<AuthorRef>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub dislikes: u64,
    #[serde(default)]
    pub is_reply: bool,
    #[serde(default)]
    pub parent_comment: Option<CommentId>,
    /// Embedded reply ids. Never trusted; membership is recomputed on hydration.
    #[serde(default)]
    pub replies: Vec<ReplyId>,
    #[serde(default)]
    pub blog: Option<BlogId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewComment {
    pub content: String,
    pub blog: BlogId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateComment {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "ref")]
    pub ref_model: String,
    pub ref_id: String,
}

// ── Hydrated thread ──

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: CommentId,
    pub author: Option<AuthorRef>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub likes: u64,
    pub dislikes: u64,
    /// Newest first, recomputed from the reply records of the same batch.
    pub reply_ids: Vec<ReplyId>,
    pub blog_id: Option<BlogId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub id: ReplyId,
    pub author: Option<AuthorRef>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub likes: u64,
    pub dislikes: u64,
    pub parent_comment_id: CommentId,
}

// ── Article reactions ──

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionCounts {
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub dislikes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_backend_record() {
        let json = r#"{
            "_id": "r1",
            "user": {"_id": "u1", "name": "Dr. Salma", "avatar": "https://cdn/a.png"},
            "content": "hey",
            "createdAt": "2025-03-01T10:00:00Z",
            "likes": 2,
            "isReply": true,
            "parentComment": "c1"
        }"#;
        let record: CommentRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.id, "r1");
        assert!(record.is_reply);
        assert_eq!(record.parent_comment.as_deref(), Some("c1"));
        assert_eq!(record.likes, 2);
        assert_eq!(record.dislikes, 0);
        assert!(record.replies.is_empty());
        assert_eq!(
            record.user.unwrap().avatar_url.as_deref(),
            Some("https://cdn/a.png")
        );
    }

    #[test]
    fn null_user_decodes_as_missing_author() {
        let json = r#"{"_id":"c1","user":null,"content":"hi","createdAt":"2025-03-01T10:00:00Z"}"#;
        let record: CommentRecord = serde_json::from_str(json).unwrap();

        assert!(record.user.is_none());
        assert!(!record.is_reply);
        assert_eq!(author_name(record.user.as_ref()), ANONYMOUS);
    }

    #[test]
    fn blank_author_name_falls_back() {
        let author = AuthorRef {
            id: "u1".into(),
            name: Some("  ".into()),
            avatar_url: None,
        };
        assert_eq!(author.display_name(), ANONYMOUS);
    }

    #[test]
    fn ownership_requires_matching_author() {
        let user = CurrentUser {
            id: "u1".into(),
            name: "Lina".into(),
            avatar: None,
        };
        let own = AuthorRef {
            id: "u1".into(),
            name: None,
            avatar_url: None,
        };
        let other = AuthorRef {
            id: "u2".into(),
            ..own.clone()
        };

        assert!(is_owned_by(Some(&own), &user));
        assert!(!is_owned_by(Some(&other), &user));
        assert!(!is_owned_by(None, &user));
    }

    #[test]
    fn notification_uses_backend_field_names() {
        let n = NewNotification {
            title: "New comment".into(),
            message: "Lina commented on your article".into(),
            kind: "comment".into(),
            ref_model: "Blog".into(),
            ref_id: "b1".into(),
        };
        let value = serde_json::to_value(&n).unwrap();

        assert_eq!(value["type"], "comment");
        assert_eq!(value["ref"], "Blog");
        assert_eq!(value["refId"], "b1");
    }
}
