//! Two-level comment → replies view built from the flat comment service payload.

use std::collections::HashSet;

use tracing::debug;

use crate::{AuthorRef, Comment, CommentRecord, Reply};

/// Hydrated thread for one article. Both levels are newest first and every
/// reply's parent is one of `comments`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentThread {
    comments: Vec<Comment>,
    replies: Vec<Reply>,
}

/// A comment or a reply, found by id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Entry<'a> {
    Comment(&'a Comment),
    Reply(&'a Reply),
}

impl<'a> Entry<'a> {
    pub fn id(&self) -> &'a str {
        match self {
            Entry::Comment(c) => &c.id,
            Entry::Reply(r) => &r.id,
        }
    }

    pub fn author(&self) -> Option<&'a AuthorRef> {
        match self {
            Entry::Comment(c) => c.author.as_ref(),
            Entry::Reply(r) => r.author.as_ref(),
        }
    }

    pub fn content(&self) -> &'a str {
        match self {
            Entry::Comment(c) => &c.content,
            Entry::Reply(r) => &r.content,
        }
    }
}

impl CommentThread {
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn replies(&self) -> &[Reply] {
        &self.replies
    }

    pub fn comment(&self, id: &str) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == id)
    }

    pub fn reply(&self, id: &str) -> Option<&Reply> {
        self.replies.iter().find(|r| r.id == id)
    }

    pub fn find(&self, id: &str) -> Option<Entry<'_>> {
        self.comment(id)
            .map(Entry::Comment)
            .or_else(|| self.reply(id).map(Entry::Reply))
    }

    /// Replies nested under `comment_id`, in display order.
    pub fn replies_for(&self, comment_id: &str) -> Vec<&Reply> {
        self.replies
            .iter()
            .filter(|r| r.parent_comment_id == comment_id)
            .collect()
    }

    /// Total number of displayed records.
    pub fn len(&self) -> usize {
        self.comments.len() + self.replies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }
}

/// Build the displayed thread from one fetch batch.
pub fn hydrate(records: Vec<CommentRecord>) -> CommentThread {
    let mut seen = HashSet::new();
    let (mut comment_records, mut reply_records): (Vec<_>, Vec<_>) = records
        .into_iter()
        .filter(|r| {
            let fresh = seen.insert(r.id.clone());
            if !fresh {
                debug!(id = %r.id, "dropping duplicate comment record");
            }
            fresh
        })
        .partition(|r| !r.is_reply);

    // Stable: equal timestamps keep the server's order.
    comment_records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    reply_records.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let comment_ids: HashSet<&str> = comment_records.iter().map(|c| c.id.as_str()).collect();

    let replies: Vec<Reply> = reply_records
        .into_iter()
        .filter_map(|r| {
            let parent = match r.parent_comment {
                Some(ref p) if comment_ids.contains(p.as_str()) => p.clone(),
                ref other => {
                    debug!(id = %r.id, parent = ?other, "dropping orphaned reply");
                    return None;
                }
            };
            Some(Reply {
                id: r.id,
                author: r.user,
                content: r.content,
                created_at: r.created_at,
                likes: r.likes,
                dislikes: r.dislikes,
                parent_comment_id: parent,
            })
        })
        .collect();

    let comments = comment_records
        .into_iter()
        .map(|c| {
            let reply_ids: Vec<_> = replies
                .iter()
                .filter(|r| r.parent_comment_id == c.id)
                .map(|r| r.id.clone())
                .collect();

            let embedded: HashSet<&str> = c.replies.iter().map(String::as_str).collect();
            let derived: HashSet<&str> = reply_ids.iter().map(String::as_str).collect();
            if embedded != derived {
                debug!(
                    id = %c.id,
                    embedded = embedded.len(),
                    derived = derived.len(),
                    "embedded reply ids disagree with reply records"
                );
            }

            Comment {
                id: c.id,
                author: c.user,
                content: c.content,
                created_at: c.created_at,
                likes: c.likes,
                dislikes: c.dislikes,
                reply_ids,
                blog_id: c.blog,
            }
        })
        .collect();

    CommentThread { comments, replies }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};

    use super::*;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 10, minute, 0).unwrap()
    }

    fn comment(id: &str, minute: u32) -> CommentRecord {
        CommentRecord {
            id: id.to_string(),
            user: None,
            content: format!("comment {id}"),
            created_at: at(minute),
            likes: 0,
            dislikes: 0,
            is_reply: false,
            parent_comment: None,
            replies: Vec::new(),
            blog: Some("b1".to_string()),
        }
    }

    fn reply(id: &str, parent: &str, minute: u32) -> CommentRecord {
        CommentRecord {
            is_reply: true,
            parent_comment: Some(parent.to_string()),
            blog: None,
            ..comment(id, minute)
        }
    }

    fn ids<'a>(items: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
        items.into_iter().collect()
    }

    #[test]
    fn nests_single_reply_under_its_comment() {
        let mut c1 = comment("c1", 1);
        c1.content = "hi".into();
        let mut r1 = reply("r1", "c1", 2);
        r1.content = "hey".into();

        let thread = hydrate(vec![c1, r1]);

        assert_eq!(thread.comments().len(), 1);
        let c = &thread.comments()[0];
        assert_eq!(c.id, "c1");
        assert_eq!(c.content, "hi");
        assert_eq!(c.reply_ids, vec!["r1".to_string()]);

        assert_eq!(thread.replies().len(), 1);
        let r = &thread.replies()[0];
        assert_eq!(r.id, "r1");
        assert_eq!(r.parent_comment_id, "c1");
        assert_eq!(r.content, "hey");
    }

    #[test]
    fn sorts_both_levels_newest_first() {
        let thread = hydrate(vec![
            comment("c1", 1),
            comment("c3", 3),
            comment("c2", 2),
            reply("r1", "c1", 4),
            reply("r3", "c1", 6),
            reply("r2", "c1", 5),
        ]);

        assert_eq!(
            ids(thread.comments().iter().map(|c| c.id.as_str())),
            ["c3", "c2", "c1"]
        );
        assert_eq!(
            ids(thread.replies_for("c1").into_iter().map(|r| r.id.as_str())),
            ["r3", "r2", "r1"]
        );
        assert_eq!(thread.comment("c1").unwrap().reply_ids, ["r3", "r2", "r1"]);
    }

    #[test]
    fn equal_timestamps_keep_server_order() {
        let thread = hydrate(vec![comment("a", 1), comment("b", 1), comment("c", 1)]);

        assert_eq!(
            ids(thread.comments().iter().map(|c| c.id.as_str())),
            ["a", "b", "c"]
        );
    }

    #[test]
    fn drops_orphaned_and_parentless_replies() {
        let mut parentless = reply("r3", "c1", 3);
        parentless.parent_comment = None;

        let thread = hydrate(vec![
            comment("c1", 1),
            reply("r1", "c1", 2),
            reply("r2", "gone", 2),
            parentless,
        ]);

        assert_eq!(ids(thread.replies().iter().map(|r| r.id.as_str())), ["r1"]);
        assert!(thread.reply("r2").is_none());
        assert_eq!(thread.len(), 2);
        for r in thread.replies() {
            assert!(thread.comment(&r.parent_comment_id).is_some());
        }
    }

    #[test]
    fn recomputes_membership_instead_of_trusting_embedded_ids() {
        let mut c1 = comment("c1", 1);
        c1.replies = vec!["stale".into(), "r2".into()];
        let c2 = comment("c2", 2);

        let thread = hydrate(vec![c1, c2, reply("r1", "c1", 3), reply("r2", "c2", 4)]);

        assert_eq!(thread.comment("c1").unwrap().reply_ids, ["r1"]);
        assert_eq!(thread.comment("c2").unwrap().reply_ids, ["r2"]);
    }

    #[test]
    fn first_duplicate_wins() {
        let mut dup = comment("c1", 5);
        dup.content = "second copy".into();

        let thread = hydrate(vec![comment("c1", 1), dup]);

        assert_eq!(thread.comments().len(), 1);
        assert_eq!(thread.comments()[0].content, "comment c1");
    }

    #[test]
    fn find_covers_both_levels() {
        let thread = hydrate(vec![comment("c1", 1), reply("r1", "c1", 2)]);

        assert!(matches!(thread.find("c1"), Some(Entry::Comment(_))));
        assert!(matches!(thread.find("r1"), Some(Entry::Reply(_))));
        assert_eq!(thread.find("r1").unwrap().content(), "comment r1");
        assert!(thread.find("nope").is_none());
    }

    #[test]
    fn empty_batch_is_empty_thread() {
        let thread = hydrate(Vec::new());
        assert!(thread.is_empty());
        assert_eq!(thread.len(), 0);
    }
}
