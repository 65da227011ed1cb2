//! Local UI state of one comment thread. Nothing here touches the network.

use std::collections::BTreeSet;

use crate::error::{ThreadError, ThreadResult};
use crate::thread::{CommentThread, Entry};
use crate::{is_owned_by, CommentId, CurrentUser, ReplyId};

/// The single edit slot: at most one comment or one reply is edited at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditTarget {
    #[default]
    None,
    Comment(CommentId),
    Reply(ReplyId),
}

impl EditTarget {
    pub fn id(&self) -> Option<&str> {
        match self {
            EditTarget::None => None,
            EditTarget::Comment(id) | EditTarget::Reply(id) => Some(id.as_str()),
        }
    }

    pub fn is(&self, id: &str) -> bool {
        self.id() == Some(id)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditPhase {
    #[default]
    Viewing,
    Editing,
    Saving,
}

/// Request currently in flight; its control stays disabled until it settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    PostComment,
    PostReply(CommentId),
    SaveEdit(String),
    Delete(String),
    Like(String),
    Dislike(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThreadUi {
    expanded: BTreeSet<CommentId>,
    edit: EditTarget,
    edit_draft: String,
    phase: EditPhase,
    reply_to: Option<CommentId>,
    reply_draft: String,
    pending: Option<PendingAction>,
}

impl ThreadUi {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Reply visibility ──

    /// Flip a comment's replies open or closed; returns the new state.
    pub fn toggle_replies(&mut self, comment_id: &str) -> bool {
        if self.expanded.remove(comment_id) {
            false
        } else {
            self.expanded.insert(comment_id.to_string());
            true
        }
    }

    pub fn is_expanded(&self, comment_id: &str) -> bool {
        self.expanded.contains(comment_id)
    }

    // ── Edit slot ──

    pub fn edit_target(&self) -> &EditTarget {
        &self.edit
    }

    pub fn edit_phase(&self) -> EditPhase {
        self.phase
    }

    pub fn edit_draft(&self) -> &str {
        &self.edit_draft
    }

    /// Enter Editing for `target`, seeding the draft with its current content.
    /// Replaces whatever was being edited before.
    pub fn begin_edit(
        &mut self,
        thread: &CommentThread,
        user: Option<&CurrentUser>,
        target: EditTarget,
    ) -> ThreadResult<()> {
        let user = user.ok_or(ThreadError::AuthRequired)?;
        let entry = match &target {
            EditTarget::None => {
                self.cancel_edit();
                return Ok(());
            }
            EditTarget::Comment(id) => thread
                .comment(id)
                .map(Entry::Comment)
                .ok_or_else(|| ThreadError::unknown(id))?,
            EditTarget::Reply(id) => thread
                .reply(id)
                .map(Entry::Reply)
                .ok_or_else(|| ThreadError::unknown(id))?,
        };
        if !is_owned_by(entry.author(), user) {
            return Err(ThreadError::NotOwner);
        }

        self.edit_draft = entry.content().to_string();
        self.edit = target;
        self.phase = EditPhase::Editing;
        Ok(())
    }

    pub fn set_edit_draft(&mut self, text: impl Into<String>) {
        if self.phase == EditPhase::Editing {
            self.edit_draft = text.into();
        }
    }

    /// Editing → Saving. Returns the target id and draft to submit.
    pub fn start_saving(&mut self) -> Option<(String, String)> {
        if self.phase != EditPhase::Editing {
            return None;
        }
        let id = self.edit.id()?.to_string();
        self.phase = EditPhase::Saving;
        Some((id, self.edit_draft.clone()))
    }

    /// Saving → Viewing on success; back to Editing with the draft kept on failure.
    pub fn finish_saving(&mut self, ok: bool) {
        if self.phase != EditPhase::Saving {
            return;
        }
        if ok {
            self.cancel_edit();
        } else {
            self.phase = EditPhase::Editing;
        }
    }

    pub fn cancel_edit(&mut self) {
        self.edit = EditTarget::None;
        self.edit_draft.clear();
        self.phase = EditPhase::Viewing;
    }

    // ── Reply composer ──

    pub fn reply_to(&self) -> Option<&str> {
        self.reply_to.as_deref()
    }

    pub fn reply_draft(&self) -> &str {
        &self.reply_draft
    }

    /// Open the composer under `comment_id`, or close it if it is already open there.
    pub fn open_reply(&mut self, comment_id: &str) {
        if self.reply_to.as_deref() == Some(comment_id) {
            self.close_reply();
        } else {
            self.reply_to = Some(comment_id.to_string());
            self.reply_draft.clear();
        }
    }

    pub fn close_reply(&mut self) {
        self.reply_to = None;
        self.reply_draft.clear();
    }

    pub fn set_reply_draft(&mut self, text: impl Into<String>) {
        self.reply_draft = text.into();
    }

    /// Collapse the composer after a successful reply and show the parent's replies.
    pub fn reply_posted(&mut self, comment_id: &str) {
        self.close_reply();
        self.expanded.insert(comment_id.to_string());
    }

    // ── In-flight request ──

    /// Claim the request slot. False while another action is still pending.
    pub fn begin(&mut self, action: PendingAction) -> bool {
        if self.pending.is_some() {
            return false;
        }
        self.pending = Some(action);
        true
    }

    pub fn finish(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self, action: &PendingAction) -> bool {
        self.pending.as_ref() == Some(action)
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Forget state that points at records gone after a resync.
    pub fn retain_known(&mut self, thread: &CommentThread) {
        self.expanded.retain(|id| thread.comment(id).is_some());
        if self.edit.id().is_some_and(|id| thread.find(id).is_none()) {
            self.cancel_edit();
        }
        if self
            .reply_to
            .as_deref()
            .is_some_and(|id| thread.comment(id).is_none())
        {
            self.close_reply();
        }
    }
}
