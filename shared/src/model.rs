//! Interactions against one article's comment thread.
//!
//! Every write is followed by a fresh `load`, and the resynced thread is what
//! the caller displays. Nothing is applied locally before the backend confirms
//! it, so a failed call leaves the caller's thread untouched.

use tracing::{debug, info, warn};

use crate::error::{ServiceError, ThreadError, ThreadResult, WriteAction};
use crate::service::{CommentService, NotificationService, Session};
use crate::thread::{hydrate, CommentThread, Entry};
use crate::{
    author_name, is_owned_by, BlogId, CurrentUser, NewComment, NewNotification, UpdateComment,
};

#[derive(Debug, Clone)]
pub struct CommentThreadModel<S, A> {
    service: S,
    session: A,
    blog_id: BlogId,
}

impl<S, A> CommentThreadModel<S, A>
where
    S: CommentService + NotificationService,
    A: Session,
{
    pub fn new(service: S, session: A, blog_id: impl Into<BlogId>) -> Self {
        Self {
            service,
            session,
            blog_id: blog_id.into(),
        }
    }

    pub fn blog_id(&self) -> &str {
        &self.blog_id
    }

    pub fn current_user(&self) -> Option<CurrentUser> {
        self.session.current_user()
    }

    /// Fetch the article's comments and replies and hydrate them.
    pub async fn load(&self) -> ThreadResult<CommentThread> {
        let records = self
            .service
            .comments_by_blog(&self.blog_id)
            .await
            .map_err(|e| {
                warn!(blog = %self.blog_id, error = %e, "failed to load comments");
                ThreadError::Fetch(e)
            })?;

        let thread = hydrate(records);
        debug!(
            blog = %self.blog_id,
            comments = thread.comments().len(),
            replies = thread.replies().len(),
            "comments loaded"
        );
        Ok(thread)
    }

    pub async fn post_comment(&self, text: &str) -> ThreadResult<CommentThread> {
        let user = self.require_user()?;
        let content = non_empty(text, "Comment cannot be empty")?;

        let payload = NewComment {
            content,
            blog: self.blog_id.clone(),
        };
        let created = self
            .service
            .add_comment(&payload)
            .await
            .map_err(|e| self.write_failed(WriteAction::PostComment, e))?;
        info!(blog = %self.blog_id, id = %created.id, "comment posted");

        self.notify(NewNotification {
            title: "New comment".to_string(),
            message: format!("{} commented on your article", user.name),
            kind: "comment".to_string(),
            ref_model: "Blog".to_string(),
            ref_id: self.blog_id.clone(),
        })
        .await;

        self.load().await
    }

    /// Reply to a comment of `thread`.
    pub async fn post_reply(
        &self,
        thread: &CommentThread,
        comment_id: &str,
        text: &str,
    ) -> ThreadResult<CommentThread> {
        let user = self.require_user()?;
        let content = non_empty(text, "Reply cannot be empty")?;
        let parent = thread
            .comment(comment_id)
            .ok_or_else(|| ThreadError::unknown(comment_id))?;

        let payload = NewComment {
            content,
            blog: self.blog_id.clone(),
        };
        let created = self
            .service
            .add_reply(comment_id, &payload)
            .await
            .map_err(|e| self.write_failed(WriteAction::PostReply, e))?;
        info!(comment = %comment_id, id = %created.id, "reply posted");

        if !is_owned_by(parent.author.as_ref(), &user) {
            self.notify(NewNotification {
                title: "New reply".to_string(),
                message: format!(
                    "{} replied to {}'s comment",
                    user.name,
                    author_name(parent.author.as_ref())
                ),
                kind: "reply".to_string(),
                ref_model: "Comment".to_string(),
                ref_id: comment_id.to_string(),
            })
            .await;
        }

        self.load().await
    }

    /// Replace the content of one of the user's own comments or replies.
    pub async fn edit(
        &self,
        thread: &CommentThread,
        id: &str,
        text: &str,
    ) -> ThreadResult<CommentThread> {
        let user = self.require_user()?;
        let entry = thread.find(id).ok_or_else(|| ThreadError::unknown(id))?;
        require_owner(entry, &user)?;
        let content = non_empty(text, "Comment cannot be empty")?;

        self.service
            .update_comment(id, &UpdateComment { content })
            .await
            .map_err(|e| self.write_failed(WriteAction::Edit, e))?;
        info!(id = %id, "comment edited");

        self.load().await
    }

    /// Delete a top-level comment. Its replies go with it on the backend.
    pub async fn delete_comment(
        &self,
        thread: &CommentThread,
        comment_id: &str,
    ) -> ThreadResult<CommentThread> {
        let user = self.require_user()?;
        let comment = thread
            .comment(comment_id)
            .ok_or_else(|| ThreadError::unknown(comment_id))?;
        require_owner(Entry::Comment(comment), &user)?;

        self.service
            .delete_comment(comment_id)
            .await
            .map_err(|e| self.write_failed(WriteAction::DeleteComment, e))?;
        info!(
            id = %comment_id,
            replies = comment.reply_ids.len(),
            "comment deleted"
        );

        self.load().await
    }

    pub async fn delete_reply(
        &self,
        thread: &CommentThread,
        comment_id: &str,
        reply_id: &str,
    ) -> ThreadResult<CommentThread> {
        let user = self.require_user()?;
        let reply = thread
            .reply(reply_id)
            .filter(|r| r.parent_comment_id == comment_id)
            .ok_or_else(|| ThreadError::unknown(reply_id))?;
        require_owner(Entry::Reply(reply), &user)?;

        self.service
            .delete_reply(comment_id, reply_id)
            .await
            .map_err(|e| self.write_failed(WriteAction::DeleteReply, e))?;
        info!(comment = %comment_id, id = %reply_id, "reply deleted");

        self.load().await
    }

    /// Add a like. There is no unlike; each call adds one more.
    pub async fn like(&self, id: &str) -> ThreadResult<CommentThread> {
        self.require_user()?;
        self.service
            .like_comment(id)
            .await
            .map_err(|e| self.write_failed(WriteAction::Like, e))?;
        debug!(id = %id, "liked");

        self.load().await
    }

    /// Add a dislike. Independent of likes; each call adds one more.
    pub async fn dislike(&self, id: &str) -> ThreadResult<CommentThread> {
        self.require_user()?;
        self.service
            .dislike_comment(id)
            .await
            .map_err(|e| self.write_failed(WriteAction::Dislike, e))?;
        debug!(id = %id, "disliked");

        self.load().await
    }

    fn require_user(&self) -> ThreadResult<CurrentUser> {
        self.current_user().ok_or(ThreadError::AuthRequired)
    }

    fn write_failed(&self, action: WriteAction, source: ServiceError) -> ThreadError {
        warn!(blog = %self.blog_id, %action, error = %source, "write failed");
        ThreadError::Write { action, source }
    }

    /// Notifications never fail the write they follow.
    async fn notify(&self, notification: NewNotification) {
        if let Err(e) = self.service.create_notification(&notification).await {
            warn!(
                kind = %notification.kind,
                ref_id = %notification.ref_id,
                error = %e,
                "failed to send notification"
            );
        }
    }
}

fn non_empty(text: &str, message: &'static str) -> ThreadResult<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ThreadError::Validation(message));
    }
    Ok(trimmed.to_string())
}

fn require_owner(entry: Entry<'_>, user: &CurrentUser) -> ThreadResult<()> {
    if is_owned_by(entry.author(), user) {
        Ok(())
    } else {
        warn!(id = %entry.id(), user = %user.id, "rejected change by non-author");
        Err(ThreadError::NotOwner)
    }
}
