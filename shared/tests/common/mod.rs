#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use pearl_shared::error::{ServiceError, ServiceResult};
use pearl_shared::{
    ArticleService, AuthorRef, CommentRecord, CommentService, CurrentUser, NewComment,
    NewNotification, NotificationService, ReactionCounts, UpdateComment,
};

pub const BLOG: &str = "blog-whitening";

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap()
}

pub fn user(id: &str, name: &str) -> CurrentUser {
    CurrentUser {
        id: id.to_string(),
        name: name.to_string(),
        avatar: None,
    }
}

pub fn author(user: &CurrentUser) -> AuthorRef {
    AuthorRef {
        id: user.id.clone(),
        name: Some(user.name.clone()),
        avatar_url: user.avatar.clone(),
    }
}

/// In-memory comment backend: assigns ids and timestamps, cascades comment
/// deletes, and records every call it receives.
pub struct FakeBackend {
    records: RefCell<Vec<CommentRecord>>,
    calls: RefCell<Vec<String>>,
    notifications: RefCell<Vec<NewNotification>>,
    acting: RefCell<Option<AuthorRef>>,
    article: Cell<ReactionCounts>,
    next_id: Cell<u32>,
    tick: Cell<i64>,
    pub fail_reads: Cell<bool>,
    pub fail_writes: Cell<bool>,
    pub fail_notifications: Cell<bool>,
}

impl FakeBackend {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            records: RefCell::new(Vec::new()),
            calls: RefCell::new(Vec::new()),
            notifications: RefCell::new(Vec::new()),
            acting: RefCell::new(None),
            article: Cell::new(ReactionCounts::default()),
            next_id: Cell::new(1),
            tick: Cell::new(0),
            fail_reads: Cell::new(false),
            fail_writes: Cell::new(false),
            fail_notifications: Cell::new(false),
        })
    }

    /// Author stamped on records created through the service.
    pub fn act_as(&self, user: &CurrentUser) {
        *self.acting.borrow_mut() = Some(author(user));
    }

    /// Insert a record directly, bypassing the service.
    pub fn seed(&self, record: CommentRecord) {
        self.records.borrow_mut().push(record);
    }

    pub fn seed_comment(&self, id: &str, by: &CurrentUser, minute: i64) {
        self.seed(record(id, Some(author(by)), None, minute));
    }

    pub fn seed_reply(&self, id: &str, parent: &str, by: &CurrentUser, minute: i64) {
        self.seed(record(id, Some(author(by)), Some(parent), minute));
        let mut records = self.records.borrow_mut();
        if let Some(p) = records.iter_mut().find(|r| r.id == parent) {
            p.replies.push(id.to_string());
        }
    }

    pub fn record(&self, id: &str) -> Option<CommentRecord> {
        self.records.borrow().iter().find(|r| r.id == id).cloned()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Calls other than reads.
    pub fn writes(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| !c.starts_with("comments_by_blog") && !c.starts_with("article_reactions"))
            .cloned()
            .collect()
    }

    pub fn notifications(&self) -> Vec<NewNotification> {
        self.notifications.borrow().clone()
    }

    pub fn set_article(&self, counts: ReactionCounts) {
        self.article.set(counts);
    }

    fn log(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    fn write_gate(&self) -> ServiceResult<()> {
        if self.fail_writes.get() {
            Err(ServiceError::status(503, "backend unavailable"))
        } else {
            Ok(())
        }
    }

    fn create(&self, payload: &NewComment, parent: Option<&str>) -> CommentRecord {
        let id = format!("new-{}", self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        self.tick.set(self.tick.get() + 1);

        let mut rec = record(&id, self.acting.borrow().clone(), parent, 1000 + self.tick.get());
        rec.content = payload.content.clone();
        rec.blog = Some(payload.blog.clone());
        self.records.borrow_mut().push(rec.clone());
        rec
    }

    fn bump(&self, id: &str, like: bool) -> ServiceResult<()> {
        let mut records = self.records.borrow_mut();
        let rec = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| ServiceError::status(404, "not found"))?;
        if like {
            rec.likes += 1;
        } else {
            rec.dislikes += 1;
        }
        Ok(())
    }
}

pub fn record(
    id: &str,
    user: Option<AuthorRef>,
    parent: Option<&str>,
    minute: i64,
) -> CommentRecord {
    CommentRecord {
        id: id.to_string(),
        user,
        content: format!("content of {id}"),
        created_at: t0() + Duration::minutes(minute),
        likes: 0,
        dislikes: 0,
        is_reply: parent.is_some(),
        parent_comment: parent.map(str::to_string),
        replies: Vec::new(),
        blog: parent.is_none().then(|| BLOG.to_string()),
    }
}

#[async_trait(?Send)]
impl CommentService for FakeBackend {
    async fn comments_by_blog(&self, blog_id: &str) -> ServiceResult<Vec<CommentRecord>> {
        self.log(format!("comments_by_blog {blog_id}"));
        if self.fail_reads.get() {
            return Err(ServiceError::Network("connection reset".into()));
        }
        Ok(self.records.borrow().clone())
    }

    async fn add_comment(&self, payload: &NewComment) -> ServiceResult<CommentRecord> {
        self.log(format!("add_comment {}", payload.content));
        self.write_gate()?;
        Ok(self.create(payload, None))
    }

    async fn add_reply(
        &self,
        comment_id: &str,
        payload: &NewComment,
    ) -> ServiceResult<CommentRecord> {
        self.log(format!("add_reply {comment_id} {}", payload.content));
        self.write_gate()?;
        let rec = self.create(payload, Some(comment_id));
        let mut records = self.records.borrow_mut();
        if let Some(p) = records.iter_mut().find(|r| r.id == comment_id) {
            p.replies.push(rec.id.clone());
        }
        Ok(rec)
    }

    async fn update_comment(
        &self,
        id: &str,
        payload: &UpdateComment,
    ) -> ServiceResult<CommentRecord> {
        self.log(format!("update_comment {id}"));
        self.write_gate()?;
        let mut records = self.records.borrow_mut();
        let rec = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| ServiceError::status(404, "not found"))?;
        rec.content = payload.content.clone();
        Ok(rec.clone())
    }

    async fn delete_comment(&self, id: &str) -> ServiceResult<()> {
        self.log(format!("delete_comment {id}"));
        self.write_gate()?;
        self.records
            .borrow_mut()
            .retain(|r| r.id != id && r.parent_comment.as_deref() != Some(id));
        Ok(())
    }

    async fn delete_reply(&self, comment_id: &str, reply_id: &str) -> ServiceResult<()> {
        self.log(format!("delete_reply {comment_id} {reply_id}"));
        self.write_gate()?;
        let mut records = self.records.borrow_mut();
        records.retain(|r| r.id != reply_id);
        if let Some(p) = records.iter_mut().find(|r| r.id == comment_id) {
            p.replies.retain(|r| r != reply_id);
        }
        Ok(())
    }

    async fn like_comment(&self, id: &str) -> ServiceResult<()> {
        self.log(format!("like_comment {id}"));
        self.write_gate()?;
        self.bump(id, true)
    }

    async fn dislike_comment(&self, id: &str) -> ServiceResult<()> {
        self.log(format!("dislike_comment {id}"));
        self.write_gate()?;
        self.bump(id, false)
    }
}

#[async_trait(?Send)]
impl NotificationService for FakeBackend {
    async fn create_notification(&self, notification: &NewNotification) -> ServiceResult<()> {
        self.log(format!("create_notification {}", notification.kind));
        if self.fail_notifications.get() {
            return Err(ServiceError::Network("notifications down".into()));
        }
        self.notifications.borrow_mut().push(notification.clone());
        Ok(())
    }
}

#[async_trait(?Send)]
impl ArticleService for FakeBackend {
    async fn article_reactions(&self, blog_id: &str) -> ServiceResult<ReactionCounts> {
        self.log(format!("article_reactions {blog_id}"));
        if self.fail_reads.get() {
            return Err(ServiceError::Network("connection reset".into()));
        }
        Ok(self.article.get())
    }

    async fn like_article(&self, blog_id: &str) -> ServiceResult<()> {
        self.log(format!("like_article {blog_id}"));
        self.write_gate()?;
        let mut counts = self.article.get();
        counts.likes += 1;
        self.article.set(counts);
        Ok(())
    }

    async fn dislike_article(&self, blog_id: &str) -> ServiceResult<()> {
        self.log(format!("dislike_article {blog_id}"));
        self.write_gate()?;
        let mut counts = self.article.get();
        counts.dislikes += 1;
        self.article.set(counts);
        Ok(())
    }
}
