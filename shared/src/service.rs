//! Collaborators the thread model talks to. The browser implements these over
//! HTTP; tests use an in-memory backend.

use async_trait::async_trait;

use crate::error::ServiceResult;
use crate::{
    CommentRecord, CurrentUser, NewComment, NewNotification, ReactionCounts, UpdateComment,
};

#[async_trait(?Send)]
pub trait CommentService {
    async fn comments_by_blog(&self, blog_id: &str) -> ServiceResult<Vec<CommentRecord>>;
    async fn add_comment(&self, payload: &NewComment) -> ServiceResult<CommentRecord>;
    async fn add_reply(
        &self,
        comment_id: &str,
        payload: &NewComment,
    ) -> ServiceResult<CommentRecord>;
    /// Works for comments and replies alike.
    async fn update_comment(&self, id: &str, payload: &UpdateComment)
        -> ServiceResult<CommentRecord>;
    /// The backend removes the comment's replies with it.
    async fn delete_comment(&self, id: &str) -> ServiceResult<()>;
    async fn delete_reply(&self, comment_id: &str, reply_id: &str) -> ServiceResult<()>;
    async fn like_comment(&self, id: &str) -> ServiceResult<()>;
    async fn dislike_comment(&self, id: &str) -> ServiceResult<()>;
}

#[async_trait(?Send)]
pub trait NotificationService {
    async fn create_notification(&self, notification: &NewNotification) -> ServiceResult<()>;
}

#[async_trait(?Send)]
pub trait ArticleService {
    async fn article_reactions(&self, blog_id: &str) -> ServiceResult<ReactionCounts>;
    async fn like_article(&self, blog_id: &str) -> ServiceResult<()>;
    async fn dislike_article(&self, blog_id: &str) -> ServiceResult<()>;
}

/// Source of the signed-in user. Absence of a user gates every write.
pub trait Session {
    fn current_user(&self) -> Option<CurrentUser>;
}

impl Session for Option<CurrentUser> {
    fn current_user(&self) -> Option<CurrentUser> {
        self.clone()
    }
}

impl<T: Session + ?Sized> Session for std::rc::Rc<T> {
    fn current_user(&self) -> Option<CurrentUser> {
        (**self).current_user()
    }
}

#[async_trait(?Send)]
impl<T: CommentService + ?Sized> CommentService for std::rc::Rc<T> {
    async fn comments_by_blog(&self, blog_id: &str) -> ServiceResult<Vec<CommentRecord>> {
        (**self).comments_by_blog(blog_id).await
    }

    async fn add_comment(&self, payload: &NewComment) -> ServiceResult<CommentRecord> {
        (**self).add_comment(payload).await
    }

    async fn add_reply(
        &self,
        comment_id: &str,
        payload: &NewComment,
    ) -> ServiceResult<CommentRecord> {
        (**self).add_reply(comment_id, payload).await
    }

    async fn update_comment(
        &self,
        id: &str,
        payload: &UpdateComment,
    ) -> ServiceResult<CommentRecord> {
        (**self).update_comment(id, payload).await
    }

    async fn delete_comment(&self, id: &str) -> ServiceResult<()> {
        (**self).delete_comment(id).await
    }

    async fn delete_reply(&self, comment_id: &str, reply_id: &str) -> ServiceResult<()> {
        (**self).delete_reply(comment_id, reply_id).await
    }

    async fn like_comment(&self, id: &str) -> ServiceResult<()> {
        (**self).like_comment(id).await
    }

    async fn dislike_comment(&self, id: &str) -> ServiceResult<()> {
        (**self).dislike_comment(id).await
    }
}

#[async_trait(?Send)]
impl<T: NotificationService + ?Sized> NotificationService for std::rc::Rc<T> {
    async fn create_notification(&self, notification: &NewNotification) -> ServiceResult<()> {
        (**self).create_notification(notification).await
    }
}

#[async_trait(?Send)]
impl<T: ArticleService + ?Sized> ArticleService for std::rc::Rc<T> {
    async fn article_reactions(&self, blog_id: &str) -> ServiceResult<ReactionCounts> {
        (**self).article_reactions(blog_id).await
    }

    async fn like_article(&self, blog_id: &str) -> ServiceResult<()> {
        (**self).like_article(blog_id).await
    }

    async fn dislike_article(&self, blog_id: &str) -> ServiceResult<()> {
        (**self).dislike_article(blog_id).await
    }
}
