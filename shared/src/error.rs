use std::fmt;

use thiserror::Error;

/// Failure talking to a backend collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("network error: {0}")]
    Network(String),

    #[error("API error {status}: {message}")]
    Status { status: u16, message: String },

    #[error("decode error: {0}")]
    Decode(String),

    #[error("request aborted")]
    Aborted,
}

impl ServiceError {
    pub fn status(status: u16, message: impl AsRef<str>) -> Self {
        ServiceError::Status {
            status,
            message: message.as_ref().to_string(),
        }
    }
}

/// The write a failed request was performing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteAction {
    PostComment,
    PostReply,
    Edit,
    DeleteComment,
    DeleteReply,
    Like,
    Dislike,
}

impl fmt::Display for WriteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WriteAction::PostComment => "post comment",
            WriteAction::PostReply => "post reply",
            WriteAction::Edit => "edit",
            WriteAction::DeleteComment => "delete comment",
            WriteAction::DeleteReply => "delete reply",
            WriteAction::Like => "like",
            WriteAction::Dislike => "dislike",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ThreadError {
    #[error("sign in required")]
    AuthRequired,

    #[error("invalid input: {0}")]
    Validation(&'static str),

    #[error("failed to load comments: {0}")]
    Fetch(#[source] ServiceError),

    #[error("failed to {action}: {source}")]
    Write {
        action: WriteAction,
        #[source]
        source: ServiceError,
    },

    #[error("only the author can change this")]
    NotOwner,

    #[error("unknown comment or reply: {id}")]
    UnknownRecord { id: String },
}

impl ThreadError {
    pub fn unknown(id: impl AsRef<str>) -> Self {
        ThreadError::UnknownRecord {
            id: id.as_ref().to_string(),
        }
    }

    /// For an error returned by a write operation: whether the write itself
    /// reached the backend. Writes are checked and sent before the resync, so
    /// only the resync can fail with `Fetch`.
    pub fn write_landed(&self) -> bool {
        matches!(self, ThreadError::Fetch(_))
    }

    /// Notice for an error returned by a write operation.
    pub fn write_notice(&self) -> String {
        if self.write_landed() {
            "Saved, but the comments could not be refreshed.".to_string()
        } else {
            self.notice()
        }
    }

    /// Short inline notice for the widget.
    pub fn notice(&self) -> String {
        match self {
            ThreadError::AuthRequired => "Please sign in to continue.".to_string(),
            ThreadError::Validation(what) => format!("{what}."),
            ThreadError::Fetch(_) => "Comments could not be loaded.".to_string(),
            ThreadError::Write { action, .. } => format!("Could not {action}. Please try again."),
            ThreadError::NotOwner => "You can only change your own comments.".to_string(),
            ThreadError::UnknownRecord { .. } => "That comment no longer exists.".to_string(),
        }
    }
}

pub type ThreadResult<T> = Result<T, ThreadError>;
pub type ServiceResult<T> = Result<T, ServiceError>;
