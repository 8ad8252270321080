use super::server::{not_found, notice_redirect, render_page, NoticeQuery};
use super::session::{login_redirect, Session};
use super::state::{GuardedAppState, ServerState};
use crate::error::ServiceError;
use crate::importer;
use crate::render::{self, policy::can_manage, VideoPageModel, ViewContext};
use crate::user::Permission;
use crate::video::{
    feed::{more_from_author, MORE_FROM_AUTHOR_LIMIT},
    EmbeddedBlob,
};

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{error, info, warn};

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct RenameForm {
    title: String,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct ImportForm {
    directory: String,
}

fn video_location(id: &str) -> String {
    format!("/video/{}", urlencoding::encode(id))
}

async fn get_video(
    State(app): State<GuardedAppState>,
    Path(id): Path<String>,
    Query(query): Query<NoticeQuery>,
) -> Response {
    let mut state = app.lock().unwrap();
    let viewer = state.current_user().map(|u| u.id.clone());
    let recorded = state.videos().record_view(&id, viewer.as_deref());
    match recorded {
        Ok(true) => {}
        Ok(false) => return not_found(&state, "Video not found"),
        Err(err) => return err.into_response(),
    }

    let Some(video) = state.get_video(&id) else {
        return not_found(&state, "Video not found");
    };
    let model = VideoPageModel {
        video,
        more_from_author: more_from_author(state.all_videos(), video, MORE_FROM_AUTHOR_LIMIT),
    };
    let ctx = ViewContext {
        current_user: state.current_user(),
        notice: query.notice.as_deref(),
    };
    Html(render::video_page(&ctx, &model)).into_response()
}

#[derive(Debug, Clone, Copy)]
enum ReactionKind {
    Like,
    Dislike,
}

fn toggle_reaction(
    session: Option<Session>,
    app: &GuardedAppState,
    id: &str,
    kind: ReactionKind,
) -> Response {
    let Some(session) = session else {
        return login_redirect(match kind {
            ReactionKind::Like => "Log in to like videos",
            ReactionKind::Dislike => "Log in to dislike videos",
        });
    };
    if !session.has_permission(Permission::React) {
        return ServiceError::Forbidden.into_response();
    }

    let mut state = app.lock().unwrap();
    let result = match kind {
        ReactionKind::Like => state.videos().toggle_like(id, &session.user_id),
        ReactionKind::Dislike => state.videos().toggle_dislike(id, &session.user_id),
    };
    match result {
        Ok(true) => Redirect::to(&video_location(id)).into_response(),
        Ok(false) => not_found(&state, "Video not found"),
        Err(err) => err.into_response(),
    }
}

async fn like_video(
    session: Option<Session>,
    State(app): State<GuardedAppState>,
    Path(id): Path<String>,
) -> Response {
    toggle_reaction(session, &app, &id, ReactionKind::Like)
}

async fn dislike_video(
    session: Option<Session>,
    State(app): State<GuardedAppState>,
    Path(id): Path<String>,
) -> Response {
    toggle_reaction(session, &app, &id, ReactionKind::Dislike)
}

async fn subscribe(
    session: Option<Session>,
    State(app): State<GuardedAppState>,
    Path(id): Path<String>,
) -> Response {
    let Some(session) = session else {
        return login_redirect("Log in to subscribe");
    };
    if !session.has_permission(Permission::Subscribe) {
        return ServiceError::Forbidden.into_response();
    }

    let mut state = app.lock().unwrap();
    let Some(author_id) = state.get_video(&id).map(|v| v.author_id.clone()) else {
        return not_found(&state, "Video not found");
    };
    if author_id == session.user_id {
        return Redirect::to(&video_location(&id)).into_response();
    }
    let result = state.videos().toggle_subscription(&author_id, &session.user_id);
    match result {
        Ok(_) => Redirect::to(&video_location(&id)).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn rename_video(
    session: Session,
    State(app): State<GuardedAppState>,
    Path(id): Path<String>,
    Form(form): Form<RenameForm>,
) -> Response {
    let mut state = app.lock().unwrap();
    let Some(video) = state.get_video(&id) else {
        return not_found(&state, "Video not found");
    };
    if !can_manage(state.find_user_by_id(&session.user_id), video) {
        warn!("{} may not rename video {}", session.username, id);
        return ServiceError::Forbidden.into_response();
    }
    let title = form.title.trim();
    if title.is_empty() {
        return notice_redirect(&video_location(&id), &ServiceError::EmptyField.to_string());
    }

    let result = state.videos().rename(&id, title);
    match result {
        Ok(_) => Redirect::to(&video_location(&id)).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn delete_video(
    session: Session,
    State(app): State<GuardedAppState>,
    Path(id): Path<String>,
) -> Response {
    let mut state = app.lock().unwrap();
    let Some(video) = state.get_video(&id) else {
        return not_found(&state, "Video not found");
    };
    if !can_manage(state.find_user_by_id(&session.user_id), video) {
        warn!("{} may not delete video {}", session.username, id);
        return ServiceError::Forbidden.into_response();
    }

    let result = state.videos().delete(&id);
    match result {
        Ok(_) => notice_redirect("/", "Video deleted"),
        Err(err) => err.into_response(),
    }
}

async fn get_media(
    State(app): State<GuardedAppState>,
    Path((id, kind)): Path<(String, String)>,
) -> Response {
    let blob = {
        let state = app.lock().unwrap();
        let Some(video) = state.get_video(&id) else {
            return StatusCode::NOT_FOUND.into_response();
        };
        match kind.as_str() {
            "video" => video.video_data.clone(),
            "thumbnail" => video.thumbnail_data.clone(),
            _ => return StatusCode::NOT_FOUND.into_response(),
        }
    };

    match blob.decode() {
        Ok((mime_type, bytes)) => ([(header::CONTENT_TYPE, mime_type)], bytes).into_response(),
        Err(err) => {
            error!("Stored {} of video {} is unreadable: {}", kind, id, err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn upload_form(
    _session: Session,
    State(app): State<GuardedAppState>,
    Query(query): Query<NoticeQuery>,
) -> Html<String> {
    render_page(&app, query.notice.as_deref(), |ctx| {
        render::upload_page(ctx, None)
    })
}

#[derive(Default)]
struct UploadForm {
    title: Option<String>,
    video: Option<EmbeddedBlob>,
    thumbnail: Option<EmbeddedBlob>,
}

/// The type the browser declared, content is sniffed only when it gave none.
fn upload_mime_type(declared: Option<&str>, bytes: &[u8]) -> String {
    declared
        .filter(|mime_type| !mime_type.is_empty() && *mime_type != "application/octet-stream")
        .map(str::to_string)
        .or_else(|| infer::get(bytes).map(|kind| kind.mime_type().to_string()))
        .unwrap_or_else(|| "application/octet-stream".to_string())
}

async fn read_upload_form(multipart: &mut Multipart) -> Result<UploadForm, MultipartError> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => {
                let title = field.text().await?;
                form.title = Some(title.trim().to_string()).filter(|t| !t.is_empty());
            }
            "video_file" | "thumbnail_file" => {
                let declared = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;
                // Browsers send an empty part when no file was picked.
                if bytes.is_empty() {
                    continue;
                }
                let blob =
                    EmbeddedBlob::encode(&upload_mime_type(declared.as_deref(), &bytes), &bytes);
                if name == "video_file" {
                    form.video = Some(blob);
                } else {
                    form.thumbnail = Some(blob);
                }
            }
            _ => {}
        }
    }
    Ok(form)
}

fn upload_failure(app: &GuardedAppState, status: StatusCode, message: &str) -> Response {
    let page = render_page(app, None, |ctx| render::upload_page(ctx, Some(message)));
    (status, page).into_response()
}

async fn upload(
    session: Session,
    State(app): State<GuardedAppState>,
    mut multipart: Multipart,
) -> Response {
    if !session.has_permission(Permission::UploadVideos) {
        return ServiceError::Forbidden.into_response();
    }
    let form = match read_upload_form(&mut multipart).await {
        Ok(form) => form,
        Err(err) => {
            error!("Could not read upload of {}: {}", session.username, err);
            return upload_failure(&app, err.status(), "Could not read the uploaded files");
        }
    };
    let (Some(title), Some(video), Some(thumbnail)) = (form.title, form.video, form.thumbnail)
    else {
        return upload_failure(
            &app,
            StatusCode::BAD_REQUEST,
            &ServiceError::EmptyField.to_string(),
        );
    };

    let created = app.lock().unwrap().videos().create(&title, video, thumbnail);
    match created {
        Ok(video) => notice_redirect(&video_location(&video.id), "Video published!"),
        Err(err) => upload_failure(&app, err.status_code(), &err.to_string()),
    }
}

async fn import_form(
    _session: Session,
    State(app): State<GuardedAppState>,
    Query(query): Query<NoticeQuery>,
) -> Html<String> {
    render_page(&app, query.notice.as_deref(), |ctx| {
        render::import_page(ctx, None)
    })
}

fn import_failure(app: &GuardedAppState, status: StatusCode, message: &str) -> Response {
    let page = render_page(app, None, |ctx| render::import_page(ctx, Some(message)));
    (status, page).into_response()
}

async fn import(
    session: Session,
    State(app): State<GuardedAppState>,
    Form(form): Form<ImportForm>,
) -> Response {
    if !session.has_permission(Permission::UploadVideos) {
        return ServiceError::Forbidden.into_response();
    }
    let directory = form.directory.trim();
    if directory.is_empty() {
        return import_failure(
            &app,
            StatusCode::BAD_REQUEST,
            &ServiceError::EmptyField.to_string(),
        );
    }

    let files = match importer::scan_directory(PathBuf::from(directory)).await {
        Ok(files) => files,
        Err(err) => {
            warn!("Could not scan {}: {:#}", directory, err);
            return import_failure(
                &app,
                StatusCode::BAD_REQUEST,
                &format!("Could not read {}", directory),
            );
        }
    };

    let report = importer::import_files(&app, files).await;
    if report.aborted_unauthenticated {
        return login_redirect("You need to log in to import videos");
    }
    info!("{} imported from {}: {:?}", session.username, directory, report);
    notice_redirect("/", &report.summary())
}

pub fn make_video_routes(state: ServerState) -> Router {
    Router::new()
        .route("/video/{id}", get(get_video))
        .route("/video/{id}/like", post(like_video))
        .route("/video/{id}/dislike", post(dislike_video))
        .route("/video/{id}/subscribe", post(subscribe))
        .route("/video/{id}/rename", post(rename_video))
        .route("/video/{id}/delete", post(delete_video))
        .route("/media/{id}/{kind}", get(get_media))
        .route("/upload", get(upload_form).post(upload))
        .route("/import", get(import_form).post(import))
        .with_state(state)
}
