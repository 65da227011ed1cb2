//! Like/dislike counters of the article itself.
//!
//! Same policy as comment counters: write, then read the counts back.

use tracing::{debug, warn};

use crate::error::{ServiceError, ThreadError, ThreadResult, WriteAction};
use crate::service::{ArticleService, Session};
use crate::{BlogId, ReactionCounts};

#[derive(Debug, Clone)]
pub struct ArticleReactionsModel<S, A> {
    service: S,
    session: A,
    blog_id: BlogId,
}

impl<S, A> ArticleReactionsModel<S, A>
where
    S: ArticleService,
    A: Session,
{
    pub fn new(service: S, session: A, blog_id: impl Into<BlogId>) -> Self {
        Self {
            service,
            session,
            blog_id: blog_id.into(),
        }
    }

    pub async fn counts(&self) -> ThreadResult<ReactionCounts> {
        self.service
            .article_reactions(&self.blog_id)
            .await
            .map_err(|e| {
                warn!(blog = %self.blog_id, error = %e, "failed to load reactions");
                ThreadError::Fetch(e)
            })
    }

    pub async fn like(&self) -> ThreadResult<ReactionCounts> {
        self.require_user()?;
        let result = self.service.like_article(&self.blog_id).await;
        self.settle(WriteAction::Like, result).await
    }

    pub async fn dislike(&self) -> ThreadResult<ReactionCounts> {
        self.require_user()?;
        let result = self.service.dislike_article(&self.blog_id).await;
        self.settle(WriteAction::Dislike, result).await
    }

    fn require_user(&self) -> ThreadResult<()> {
        match self.session.current_user() {
            Some(_) => Ok(()),
            None => Err(ThreadError::AuthRequired),
        }
    }

    async fn settle(
        &self,
        action: WriteAction,
        result: Result<(), ServiceError>,
    ) -> ThreadResult<ReactionCounts> {
        result.map_err(|source| {
            warn!(blog = %self.blog_id, %action, error = %source, "reaction failed");
            ThreadError::Write { action, source }
        })?;
        debug!(blog = %self.blog_id, %action, "article reaction recorded");

        self.counts().await
    }
}
