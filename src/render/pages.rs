use super::html::{escape, layout};
use super::policy::{can_manage, can_react, can_subscribe};
use super::ViewContext;
use crate::user::Permission;
use crate::video::Video;
use std::fmt::Write;

fn error_line(error: Option<&str>) -> String {
    error
        .map(|e| format!(r#"<p class="error">{}</p>"#, escape(e)))
        .unwrap_or_default()
}

fn manage_controls(video: &Video) -> String {
    format!(
        r#"<div class="manage">
<form class="inline" method="post" action="/video/{id}/rename"><input name="title" value="{title}"><button type="submit">Rename</button></form>
<form class="inline" method="post" action="/video/{id}/delete"><button type="submit">Delete</button></form>
</div>"#,
        id = escape(&video.id),
        title = escape(&video.title),
    )
}

/// Feed entry. Rename and delete show up for whoever may manage the video.
fn video_card(ctx: &ViewContext, video: &Video) -> String {
    let mut card = format!(
        r#"<div class="video-card"><a href="/video/{id}">
<img src="/media/{id}/thumbnail" alt="{title}">
<div class="info"><h3>{title}</h3><p class="meta">{author} &middot; {views} views &middot; {date}</p>
<p class="reactions">&#128077; {likes} &#128078; {dislikes}</p></div>
</a>"#,
        id = escape(&video.id),
        title = escape(&video.title),
        author = escape(&video.author_name),
        views = video.view_count(),
        date = video.timestamp.format("%Y-%m-%d"),
        likes = video.like_count(),
        dislikes = video.dislike_count(),
    );
    if can_manage(ctx.current_user, video) {
        card.push_str(&manage_controls(video));
    }
    card.push_str("</div>");
    card
}

fn role_form() -> &'static str {
    r#"<section class="admin-tools">
<h2>Roles</h2>
<form method="post" action="/admin/role">
<input name="username" placeholder="Username" required>
<select name="role"><option value="Regular">Regular</option><option value="Admin">Admin</option></select>
<button type="submit">Apply</button>
</form>
</section>"#
}

/// The feed, already ordered by the caller.
pub fn home_page(ctx: &ViewContext, feed: &[&Video]) -> String {
    let mut body = String::new();
    if feed.is_empty() {
        body.push_str(r#"<p class="empty">No videos yet. Be the first to upload!</p>"#);
    } else {
        body.push_str(r#"<div class="video-grid">"#);
        for video in feed {
            body.push_str(&video_card(ctx, video));
        }
        body.push_str("</div>");
    }
    if ctx
        .current_user
        .is_some_and(|u| u.has_permission(Permission::ManageRoles))
    {
        body.push_str(role_form());
    }
    layout(ctx, "Home", &body)
}

fn credentials_form(action: &str, submit: &str, error: Option<&str>, footer: &str) -> String {
    format!(
        r#"<form class="auth-form" method="post" action="{action}">
<h2>{submit}</h2>
{error}
<input name="username" placeholder="Username" autocomplete="username">
<input name="password" type="password" placeholder="Password">
<button type="submit">{submit}</button>
{footer}
</form>"#,
        action = action,
        submit = submit,
        error = error_line(error),
        footer = footer,
    )
}

pub fn login_page(ctx: &ViewContext, error: Option<&str>) -> String {
    let body = credentials_form(
        "/login",
        "Log in",
        error,
        r#"<p>No account yet? <a href="/register">Register</a></p>"#,
    );
    layout(ctx, "Log in", &body)
}

pub fn register_page(ctx: &ViewContext, error: Option<&str>) -> String {
    let body = credentials_form(
        "/register",
        "Register",
        error,
        r#"<p>Already registered? <a href="/login">Log in</a></p>"#,
    );
    layout(ctx, "Register", &body)
}

pub fn upload_page(ctx: &ViewContext, error: Option<&str>) -> String {
    let body = format!(
        r#"<form class="auth-form" method="post" action="/upload" enctype="multipart/form-data">
<h2>Upload a video</h2>
{error}
<input name="title" placeholder="Title">
<label>Video <input name="video_file" type="file" accept="video/mp4"></label>
<label>Thumbnail <input name="thumbnail_file" type="file" accept="image/*"></label>
<button type="submit">Publish</button>
</form>"#,
        error = error_line(error),
    );
    layout(ctx, "Upload", &body)
}

pub fn import_page(ctx: &ViewContext, error: Option<&str>) -> String {
    let body = format!(
        r#"<form class="auth-form" method="post" action="/import">
<h2>Import videos</h2>
{error}
<p>Every folder inside the directory holding an MP4 video and an image becomes one video, titled after the folder.</p>
<input name="directory" placeholder="/path/to/videos">
<button type="submit">Import</button>
</form>"#,
        error = error_line(error),
    );
    layout(ctx, "Import", &body)
}

/// What the video page shows next to the video itself.
pub struct VideoPageModel<'a> {
    pub video: &'a Video,
    pub more_from_author: Vec<&'a Video>,
}

fn post_button(action: &str, label: &str, active: bool) -> String {
    format!(
        r#"<form class="inline" method="post" action="{action}"><button type="submit"{class}>{label}</button></form>"#,
        action = action,
        class = if active { r#" class="active""# } else { "" },
        label = label,
    )
}

pub fn video_page(ctx: &ViewContext, model: &VideoPageModel) -> String {
    let video = model.video;
    let user = ctx.current_user;
    let id = escape(&video.id);
    let mut body = String::new();

    let _ = write!(
        body,
        r#"<video controls autoplay src="/media/{id}/video" poster="/media/{id}/thumbnail"></video>
<h1>{title}</h1>
<p class="meta">{author} &middot; {views} views &middot; {date}</p>
<div class="actions">"#,
        id = id,
        title = escape(&video.title),
        author = escape(&video.author_name),
        views = video.view_count(),
        date = video.timestamp.format("%Y-%m-%d %H:%M"),
    );

    let reacting_user = user.filter(|_| can_react(user));
    let liked = reacting_user.is_some_and(|u| video.is_liked_by(&u.id));
    let disliked = reacting_user.is_some_and(|u| video.is_disliked_by(&u.id));
    body.push_str(&post_button(
        &format!("/video/{}/like", id),
        &format!("&#128077; {}", video.like_count()),
        liked,
    ));
    body.push_str(&post_button(
        &format!("/video/{}/dislike", id),
        &format!("&#128078; {}", video.dislike_count()),
        disliked,
    ));

    // Anonymous visitors see the button and get sent to the login page.
    if user.is_none() || can_subscribe(user, video) {
        let subscribed = user.is_some_and(|u| u.is_subscribed_to(&video.author_id));
        let label = if subscribed { "Subscribed" } else { "Subscribe" };
        body.push_str(&post_button(
            &format!("/video/{}/subscribe", id),
            label,
            subscribed,
        ));
    }
    body.push_str("</div>");

    if can_manage(user, video) {
        body.push_str(&manage_controls(video));
    }

    if !model.more_from_author.is_empty() {
        let _ = write!(
            body,
            r#"<h2>More from {}</h2><div class="video-grid">"#,
            escape(&video.author_name)
        );
        for other in &model.more_from_author {
            body.push_str(&video_card(ctx, other));
        }
        body.push_str("</div>");
    }

    layout(ctx, &video.title, &body)
}

pub fn not_found_page(ctx: &ViewContext, what: &str) -> String {
    let body = format!(
        r#"<h1>Not found</h1><p>{}</p><p><a href="/">Back to the feed</a></p>"#,
        escape(what)
    );
    layout(ctx, "Not found", &body)
}
