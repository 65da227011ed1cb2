//! Clinic backend endpoints behind the collaborator traits.

use async_trait::async_trait;
use pearl_shared::error::ServiceResult;
use pearl_shared::{
    ArticleService, CommentRecord, CommentService, NewComment, NewNotification,
    NotificationService, ReactionCounts, UpdateComment,
};

use crate::api::ApiClient;

#[derive(Clone)]
pub struct HttpServices {
    api: ApiClient,
}

impl HttpServices {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

fn seg(id: &str) -> String {
    web_sys::js_sys::encode_uri_component(id)
        .as_string()
        .unwrap_or_default()
}

#[async_trait(?Send)]
impl CommentService for HttpServices {
    async fn comments_by_blog(&self, blog_id: &str) -> ServiceResult<Vec<CommentRecord>> {
        self.api
            .get(&format!("/api/comments/blog/{}", seg(blog_id)))
            .await
    }

    async fn add_comment(&self, payload: &NewComment) -> ServiceResult<CommentRecord> {
        self.api.post("/api/comments", payload).await
    }

    async fn add_reply(
        &self,
        comment_id: &str,
        payload: &NewComment,
    ) -> ServiceResult<CommentRecord> {
        self.api
            .post(&format!("/api/comments/{}/replies", seg(comment_id)), payload)
            .await
    }

    async fn update_comment(
        &self,
        id: &str,
        payload: &UpdateComment,
    ) -> ServiceResult<CommentRecord> {
        self.api
            .put(&format!("/api/comments/{}", seg(id)), payload)
            .await
    }

    async fn delete_comment(&self, id: &str) -> ServiceResult<()> {
        self.api.delete(&format!("/api/comments/{}", seg(id))).await
    }

    async fn delete_reply(&self, comment_id: &str, reply_id: &str) -> ServiceResult<()> {
        self.api
            .delete(&format!(
                "/api/comments/{}/replies/{}",
                seg(comment_id),
                seg(reply_id)
            ))
            .await
    }

    async fn like_comment(&self, id: &str) -> ServiceResult<()> {
        self.api
            .post_empty(&format!("/api/comments/{}/like", seg(id)))
            .await
    }

    async fn dislike_comment(&self, id: &str) -> ServiceResult<()> {
        self.api
            .post_empty(&format!("/api/comments/{}/dislike", seg(id)))
            .await
    }
}

#[async_trait(?Send)]
impl NotificationService for HttpServices {
    async fn create_notification(&self, notification: &NewNotification) -> ServiceResult<()> {
        self.api.post_ignore("/api/notifications", notification).await
    }
}

#[async_trait(?Send)]
impl ArticleService for HttpServices {
    async fn article_reactions(&self, blog_id: &str) -> ServiceResult<ReactionCounts> {
        self.api.get(&format!("/api/blogs/{}", seg(blog_id))).await
    }

    async fn like_article(&self, blog_id: &str) -> ServiceResult<()> {
        self.api
            .post_empty(&format!("/api/blogs/{}/like", seg(blog_id)))
            .await
    }

    async fn dislike_article(&self, blog_id: &str) -> ServiceResult<()> {
        self.api
            .post_empty(&format!("/api/blogs/{}/dislike", seg(blog_id)))
            .await
    }
}
