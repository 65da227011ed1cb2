use std::future::Future;

use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use pearl_shared::error::{ServiceError, ThreadResult};
use pearl_shared::{
    author_name, is_owned_by, AuthorRef, Comment, CommentThread, CommentThreadModel, EditPhase,
    EditTarget, PendingAction, Reply, Session, ThreadError, ThreadUi,
};
use wasm_bindgen_futures::spawn_local;
use web_sys::AbortController;

use crate::api::ApiClient;
use crate::auth::{AuthState, SessionBadge};
use crate::config::ClientConfig;
use crate::services::HttpServices;

type Model = CommentThreadModel<HttpServices, AuthState>;

/// Signals shared by every part of one comment section.
#[derive(Clone, Copy)]
struct ThreadCtx {
    thread: RwSignal<CommentThread>,
    ui: RwSignal<ThreadUi>,
    notice: RwSignal<Option<String>>,
    model: StoredValue<Model, LocalStorage>,
}

impl ThreadCtx {
    /// Run one write. The displayed thread is replaced only by the resynced
    /// thread the model returns; on failure it stays as it was.
    ///
    /// `after` learns whether the write reached the backend, which is also
    /// the case when only the resync failed. Drafts must be cleared then, or
    /// submitting again would post a duplicate.
    fn run<F, Fut>(self, action: PendingAction, op: F, after: impl FnOnce(bool) + 'static)
    where
        F: FnOnce(Model, CommentThread) -> Fut + 'static,
        Fut: Future<Output = ThreadResult<CommentThread>> + 'static,
    {
        let Some(model) = self.model.try_get_value() else {
            return;
        };
        if !self.ui.try_update(|ui| ui.begin(action)).unwrap_or(false) {
            return;
        }
        self.notice.set(None);
        let current = self.thread.get_untracked();

        spawn_local(async move {
            let landed = match op(model, current).await {
                Ok(thread) => {
                    self.apply(thread);
                    true
                }
                // View is gone
                Err(e) if is_aborted(&e) => return,
                Err(e) => {
                    self.notice.try_set(Some(e.write_notice()));
                    e.write_landed()
                }
            };
            after(landed);
            self.ui.try_update(ThreadUi::finish);
        });
    }

    fn apply(self, thread: CommentThread) {
        self.ui.try_update(|ui| ui.retain_known(&thread));
        self.thread.try_set(thread);
    }
}

fn is_aborted(err: &ThreadError) -> bool {
    matches!(
        err,
        ThreadError::Fetch(ServiceError::Aborted)
            | ThreadError::Write {
                source: ServiceError::Aborted,
                ..
            }
    )
}

fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(message).ok())
        .unwrap_or(false)
}

fn comment_key(c: &Comment) -> (String, String, u64, u64, usize) {
    (
        c.id.clone(),
        c.content.clone(),
        c.likes,
        c.dislikes,
        c.reply_ids.len(),
    )
}

fn reply_key(r: &Reply) -> (String, String, u64, u64) {
    (r.id.clone(), r.content.clone(), r.likes, r.dislikes)
}

fn owns(
    auth: AuthState,
    author: Option<AuthorRef>,
) -> impl Fn() -> bool + Clone + Send + Sync + 'static {
    move || {
        auth.user
            .with(|u| u.as_ref().is_some_and(|u| is_owned_by(author.as_ref(), u)))
    }
}

fn begin_edit(ctx: ThreadCtx, auth: AuthState, target: EditTarget) {
    let user = auth.current_user();
    let result = ctx.thread.with_untracked(|thread| {
        ctx.ui
            .try_update(|ui| ui.begin_edit(thread, user.as_ref(), target))
    });
    if let Some(Err(e)) = result {
        ctx.notice.set(Some(e.notice()));
    }
}

/// Comment section for one article.
#[component]
pub fn CommentSection(blog_id: String) -> impl IntoView {
    let auth = expect_context::<AuthState>();
    let config = expect_context::<ClientConfig>();

    // Abort whatever is still in flight when the section goes away
    let controller = AbortController::new().ok();
    let api = ApiClient::new(&config).with_abort(controller.as_ref().map(AbortController::signal));
    let controller = StoredValue::new_local(controller);
    on_cleanup(move || {
        controller.try_with_value(|c| {
            if let Some(c) = c {
                c.abort();
            }
        });
    });

    let model = CommentThreadModel::new(HttpServices::new(api), auth, blog_id);
    let ctx = ThreadCtx {
        thread: RwSignal::new(CommentThread::default()),
        ui: RwSignal::new(ThreadUi::new()),
        notice: RwSignal::new(None),
        model: StoredValue::new_local(model),
    };
    provide_context(ctx);
    let loading = RwSignal::new(true);

    // Fetch comments on mount
    if let Some(model) = ctx.model.try_get_value() {
        spawn_local(async move {
            match model.load().await {
                Ok(thread) => ctx.apply(thread),
                Err(e) if is_aborted(&e) => return,
                Err(e) => {
                    ctx.notice.try_set(Some(e.notice()));
                }
            }
            loading.try_set(false);
        });
    }

    view! {
        <section class="pearl-comments">
            <h3>{move || format!("Comments ({})", ctx.thread.with(CommentThread::len))}</h3>
            <SessionBadge />
            <CommentForm />
            <Show when=move || ctx.notice.with(Option::is_some)>
                <p class="pearl-notice" role="status">
                    {move || ctx.notice.get().unwrap_or_default()}
                    <button class="pearl-btn pearl-btn-sm" on:click=move |_| ctx.notice.set(None)>
                        "Dismiss"
                    </button>
                </p>
            </Show>
            <Show when=move || loading.get()>
                <p class="pearl-loading">"Loading comments..."</p>
            </Show>
            <Show when=move || !loading.get() && ctx.thread.with(CommentThread::is_empty)>
                <p class="pearl-hint">"No comments yet. Be the first to ask our dentists."</p>
            </Show>
            <div class="pearl-comment-list">
                <For
                    each=move || ctx.thread.with(|t| t.comments().to_vec())
                    key=comment_key
                    let:comment
                >
                    <CommentItem comment=comment />
                </For>
            </div>
        </section>
    }
}

/// Form for posting a new comment.
#[component]
fn CommentForm() -> impl IntoView {
    let ctx = expect_context::<ThreadCtx>();
    let auth = expect_context::<AuthState>();
    let body = RwSignal::new(String::new());
    let posting = move || ctx.ui.with(|ui| ui.is_pending(&PendingAction::PostComment));

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let text = body.get_untracked();
        ctx.run(
            PendingAction::PostComment,
            move |m, _| async move { m.post_comment(&text).await },
            move |ok| {
                if ok {
                    body.try_set(String::new());
                }
            },
        );
    };

    move || {
        if auth.user.with(Option::is_some) {
            view! {
                <form class="pearl-comment-form" on:submit=on_submit>
                    <textarea
                        class="pearl-textarea"
                        placeholder="Ask a question or share your experience..."
                        prop:value=move || body.get()
                        on:input=move |ev| {
                            body.set(event_target_value(&ev));
                        }
                    />
                    <button
                        class="pearl-btn"
                        type="submit"
                        disabled=move || ctx.ui.with(ThreadUi::is_busy)
                    >
                        {move || if posting() { "Posting..." } else { "Post Comment" }}
                    </button>
                </form>
            }
            .into_any()
        } else {
            view! { <p class="pearl-hint">"Sign in to leave a comment."</p> }.into_any()
        }
    }
}

#[component]
fn EntryHeader(author: Option<AuthorRef>, created_at: String, datetime: String) -> impl IntoView {
    let name = author_name(author.as_ref()).to_string();
    let avatar = author.and_then(|a| a.avatar_url);

    view! {
        <header class="pearl-comment-header">
            {avatar.map(|src| view! {
                <img src=src alt="" class="pearl-avatar" width="24" height="24" />
            })}
            <strong>{name}</strong>
            <time datetime=datetime>{created_at}</time>
        </header>
    }
}

/// Textarea for the single item being edited.
#[component]
fn EditBox() -> impl IntoView {
    let ctx = expect_context::<ThreadCtx>();
    let saving = move || ctx.ui.with(|ui| ui.edit_phase() == EditPhase::Saving);

    let on_save = move |ev: SubmitEvent| {
        ev.prevent_default();
        if ctx.ui.with_untracked(ThreadUi::is_busy) {
            return;
        }
        let Some((id, draft)) = ctx.ui.try_update(ThreadUi::start_saving).flatten() else {
            return;
        };
        ctx.run(
            PendingAction::SaveEdit(id.clone()),
            move |m, t| async move { m.edit(&t, &id, &draft).await },
            move |ok| {
                ctx.ui.try_update(|ui| ui.finish_saving(ok));
            },
        );
    };

    view! {
        <form class="pearl-edit-form" on:submit=on_save>
            <textarea
                class="pearl-textarea"
                prop:value=move || ctx.ui.with(|ui| ui.edit_draft().to_string())
                on:input=move |ev| ctx.ui.update(|ui| ui.set_edit_draft(event_target_value(&ev)))
            />
            <button class="pearl-btn pearl-btn-sm" type="submit" disabled=saving>
                {move || if saving() { "Saving..." } else { "Save" }}
            </button>
            <button
                class="pearl-btn pearl-btn-sm"
                type="button"
                disabled=saving
                on:click=move |_| ctx.ui.update(ThreadUi::cancel_edit)
            >
                "Cancel"
            </button>
        </form>
    }
}

/// Like / dislike buttons. Counts come from the last resync.
#[component]
fn ReactionBar(id: String, likes: u64, dislikes: u64) -> impl IntoView {
    let ctx = expect_context::<ThreadCtx>();
    let busy = move || ctx.ui.with(ThreadUi::is_busy);

    let on_like = {
        let id = id.clone();
        move |_| {
            let id = id.clone();
            ctx.run(
                PendingAction::Like(id.clone()),
                move |m, _| async move { m.like(&id).await },
                |_| {},
            );
        }
    };
    let on_dislike = move |_| {
        let id = id.clone();
        ctx.run(
            PendingAction::Dislike(id.clone()),
            move |m, _| async move { m.dislike(&id).await },
            |_| {},
        );
    };

    view! {
        <div class="pearl-reactions">
            <button class="pearl-vote-btn" title="Like" disabled=busy on:click=on_like>
                "\u{1F44D} "
                {likes}
            </button>
            <button class="pearl-vote-btn" title="Dislike" disabled=busy on:click=on_dislike>
                "\u{1F44E} "
                {dislikes}
            </button>
        </div>
    }
}

#[component]
fn ReplyComposer(comment_id: String) -> impl IntoView {
    let ctx = expect_context::<ThreadCtx>();
    let posting = {
        let action = PendingAction::PostReply(comment_id.clone());
        move || ctx.ui.with(|ui| ui.is_pending(&action))
    };

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let text = ctx.ui.with_untracked(|ui| ui.reply_draft().to_string());
        let id = comment_id.clone();
        let posted = comment_id.clone();
        ctx.run(
            PendingAction::PostReply(id.clone()),
            move |m, t| async move { m.post_reply(&t, &id, &text).await },
            move |ok| {
                if ok {
                    ctx.ui.try_update(|ui| ui.reply_posted(&posted));
                }
            },
        );
    };

    view! {
        <form class="pearl-reply-form" on:submit=on_submit>
            <textarea
                class="pearl-textarea"
                placeholder="Write a reply..."
                prop:value=move || ctx.ui.with(|ui| ui.reply_draft().to_string())
                on:input=move |ev| ctx.ui.update(|ui| ui.set_reply_draft(event_target_value(&ev)))
            />
            <button
                class="pearl-btn pearl-btn-sm"
                type="submit"
                disabled=move || ctx.ui.with(ThreadUi::is_busy)
            >
                {move || if posting() { "Posting..." } else { "Reply" }}
            </button>
            <button
                class="pearl-btn pearl-btn-sm"
                type="button"
                disabled=move || ctx.ui.with(ThreadUi::is_busy)
                on:click=move |_| ctx.ui.update(ThreadUi::close_reply)
            >
                "Cancel"
            </button>
        </form>
    }
}

/// Single top-level comment with its replies.
#[component]
fn CommentItem(comment: Comment) -> impl IntoView {
    let ctx = expect_context::<ThreadCtx>();
    let auth = expect_context::<AuthState>();
    let id = comment.id.clone();
    let reply_count = comment.reply_ids.len();
    let is_own = owns(auth, comment.author.clone());
    let busy = move || ctx.ui.with(ThreadUi::is_busy);

    let editing = {
        let id = id.clone();
        move || ctx.ui.with(|ui| ui.edit_target().is(&id))
    };
    let expanded = {
        let id = id.clone();
        move || ctx.ui.with(|ui| ui.is_expanded(&id))
    };
    let composing = {
        let id = id.clone();
        move || ctx.ui.with(|ui| ui.reply_to() == Some(id.as_str()))
    };
    let replies = {
        let id = id.clone();
        move || {
            ctx.thread
                .with(|t| t.replies_for(&id).into_iter().cloned().collect::<Vec<_>>())
        }
    };

    let on_edit = {
        let id = id.clone();
        move |_| begin_edit(ctx, auth, EditTarget::Comment(id.clone()))
    };
    let on_delete = {
        let id = id.clone();
        move |_| {
            if !confirm("Delete this comment and all of its replies?") {
                return;
            }
            let id = id.clone();
            ctx.run(
                PendingAction::Delete(id.clone()),
                move |m, t| async move { m.delete_comment(&t, &id).await },
                |_| {},
            );
        }
    };
    let on_reply = {
        let id = id.clone();
        move |_| ctx.ui.update(|ui| ui.open_reply(&id))
    };
    let on_toggle = {
        let id = id.clone();
        move |_| {
            ctx.ui.update(|ui| {
                ui.toggle_replies(&id);
            });
        }
    };

    let toggle_label = {
        let expanded = expanded.clone();
        move || {
            if expanded() {
                "Hide replies".to_string()
            } else if reply_count == 1 {
                "Show 1 reply".to_string()
            } else {
                format!("Show {reply_count} replies")
            }
        }
    };
    let composer_id = id.clone();
    let content = comment.content.clone();

    view! {
        <article class="pearl-comment">
            <EntryHeader
                author=comment.author.clone()
                created_at=comment.created_at.format("%b %-d, %Y %H:%M").to_string()
                datetime=comment.created_at.to_rfc3339()
            />
            <Show when=is_own>
                <div class="pearl-owner-actions">
                    <button class="pearl-btn pearl-btn-sm" disabled=busy on:click=on_edit.clone()>
                        "Edit"
                    </button>
                    <button
                        class="pearl-btn pearl-btn-sm pearl-btn-danger"
                        disabled=busy
                        on:click=on_delete.clone()
                    >
                        "Delete"
                    </button>
                </div>
            </Show>
            {move || {
                if editing() {
                    view! { <EditBox /> }.into_any()
                } else {
                    view! { <p class="pearl-comment-body">{content.clone()}</p> }.into_any()
                }
            }}
            <div class="pearl-comment-actions">
                <ReactionBar id=id likes=comment.likes dislikes=comment.dislikes />
                <Show when=move || auth.user.with(Option::is_some)>
                    <button class="pearl-btn pearl-btn-sm" on:click=on_reply.clone()>"Reply"</button>
                </Show>
                {(reply_count > 0).then(|| view! {
                    <button class="pearl-btn pearl-btn-sm" on:click=on_toggle>{toggle_label}</button>
                })}
            </div>
            <Show when=composing>
                <ReplyComposer comment_id=composer_id.clone() />
            </Show>
            <Show when=expanded>
                <div class="pearl-replies">
                    <For each=replies.clone() key=reply_key let:reply>
                        <ReplyItem reply=reply />
                    </For>
                </div>
            </Show>
        </article>
    }
}

#[component]
fn ReplyItem(reply: Reply) -> impl IntoView {
    let ctx = expect_context::<ThreadCtx>();
    let auth = expect_context::<AuthState>();
    let id = reply.id.clone();
    let is_own = owns(auth, reply.author.clone());
    let busy = move || ctx.ui.with(ThreadUi::is_busy);

    let editing = {
        let id = id.clone();
        move || ctx.ui.with(|ui| ui.edit_target().is(&id))
    };
    let on_edit = {
        let id = id.clone();
        move |_| begin_edit(ctx, auth, EditTarget::Reply(id.clone()))
    };
    let on_delete = {
        let id = id.clone();
        let parent = reply.parent_comment_id.clone();
        move |_| {
            if !confirm("Delete this reply?") {
                return;
            }
            let (id, parent) = (id.clone(), parent.clone());
            ctx.run(
                PendingAction::Delete(id.clone()),
                move |m, t| async move { m.delete_reply(&t, &parent, &id).await },
                |_| {},
            );
        }
    };
    let content = reply.content.clone();

    view! {
        <div class="pearl-reply">
            <EntryHeader
                author=reply.author.clone()
                created_at=reply.created_at.format("%b %-d, %Y %H:%M").to_string()
                datetime=reply.created_at.to_rfc3339()
            />
            <Show when=is_own>
                <div class="pearl-owner-actions">
                    <button class="pearl-btn pearl-btn-sm" disabled=busy on:click=on_edit.clone()>
                        "Edit"
                    </button>
                    <button
                        class="pearl-btn pearl-btn-sm pearl-btn-danger"
                        disabled=busy
                        on:click=on_delete.clone()
                    >
                        "Delete"
                    </button>
                </div>
            </Show>
            {move || {
                if editing() {
                    view! { <EditBox /> }.into_any()
                } else {
                    view! { <p class="pearl-comment-body">{content.clone()}</p> }.into_any()
                }
            }}
            <ReactionBar id=id likes=reply.likes dislikes=reply.dislikes />
        </div>
    }
}
