//! HTTP client for end-to-end tests
//!
//! Redirects are never followed, so tests can assert on where the server
//! sends the browser next. The server keeps a single session for the whole
//! device, logging in with one client logs in every client.

use super::constants::*;
use reqwest::{header::LOCATION, multipart, redirect, Client, Response};
use std::time::Duration;

pub struct TestClient {
    pub base_url: String,
    client: Client,
}

impl TestClient {
    /// Creates a client, nobody is logged in by it.
    pub fn new(base_url: String) -> Self {
        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build HTTP client");
        Self { base_url, client }
    }

    /// Creates a client and logs in as [`TEST_USER`].
    pub async fn authenticated(base_url: String) -> Self {
        Self::logged_in_as(base_url, TEST_USER, TEST_PASS).await
    }

    /// Creates a client and logs in as [`ADMIN_USER`].
    #[allow(dead_code)]
    pub async fn authenticated_admin(base_url: String) -> Self {
        Self::logged_in_as(base_url, ADMIN_USER, ADMIN_PASS).await
    }

    pub async fn logged_in_as(base_url: String, username: &str, password: &str) -> Self {
        let client = Self::new(base_url);
        let response = client.login(username, password).await;
        assert!(
            response.status().is_redirection(),
            "Login as {} failed with {}",
            username,
            response.status()
        );
        client
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("Request failed")
    }

    async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("Request failed")
    }

    // ========================================================================
    // Accounts
    // ========================================================================

    pub async fn register(&self, username: &str, password: &str) -> Response {
        self.post_form("/register", &[("username", username), ("password", password)])
            .await
    }

    pub async fn login(&self, username: &str, password: &str) -> Response {
        self.post_form("/login", &[("username", username), ("password", password)])
            .await
    }

    pub async fn logout(&self) -> Response {
        self.post_form("/logout", &[]).await
    }

    #[allow(dead_code)]
    pub async fn set_role(&self, username: &str, role: &str) -> Response {
        self.post_form("/admin/role", &[("username", username), ("role", role)])
            .await
    }

    // ========================================================================
    // Pages
    // ========================================================================

    pub async fn home(&self) -> Response {
        self.get("/").await
    }

    #[allow(dead_code)]
    pub async fn page(&self, path: &str) -> Response {
        self.get(path).await
    }

    #[allow(dead_code)]
    pub async fn video(&self, id: &str) -> Response {
        self.get(&format!("/video/{}", id)).await
    }

    #[allow(dead_code)]
    pub async fn media(&self, id: &str, kind: &str) -> Response {
        self.get(&format!("/media/{}/{}", id, kind)).await
    }

    // ========================================================================
    // Videos
    // ========================================================================

    /// Uploads the sample MP4 with the sample PNG thumbnail.
    #[allow(dead_code)]
    pub async fn upload(&self, title: &str) -> Response {
        self.upload_parts(title, Some(SAMPLE_MP4), Some(SAMPLE_PNG))
            .await
    }

    #[allow(dead_code)]
    pub async fn upload_parts(
        &self,
        title: &str,
        video: Option<&[u8]>,
        thumbnail: Option<&[u8]>,
    ) -> Response {
        let mut form = multipart::Form::new().text("title", title.to_string());
        if let Some(bytes) = video {
            let part = multipart::Part::bytes(bytes.to_vec())
                .file_name("clip.mp4")
                .mime_str("video/mp4")
                .expect("Invalid mime type");
            form = form.part("video_file", part);
        }
        if let Some(bytes) = thumbnail {
            let part = multipart::Part::bytes(bytes.to_vec())
                .file_name("cover.png")
                .mime_str("image/png")
                .expect("Invalid mime type");
            form = form.part("thumbnail_file", part);
        }
        self.client
            .post(self.url("/upload"))
            .multipart(form)
            .send()
            .await
            .expect("Request failed")
    }

    /// Uploads a video and returns its id, read from the redirect.
    #[allow(dead_code)]
    pub async fn upload_and_get_id(&self, title: &str) -> String {
        let response = self.upload(title).await;
        assert!(
            response.status().is_redirection(),
            "Upload failed with {}",
            response.status()
        );
        video_id_from_location(&response).expect("Upload did not redirect to a video")
    }

    #[allow(dead_code)]
    pub async fn like(&self, id: &str) -> Response {
        self.post_form(&format!("/video/{}/like", id), &[]).await
    }

    #[allow(dead_code)]
    pub async fn dislike(&self, id: &str) -> Response {
        self.post_form(&format!("/video/{}/dislike", id), &[]).await
    }

    #[allow(dead_code)]
    pub async fn subscribe(&self, id: &str) -> Response {
        self.post_form(&format!("/video/{}/subscribe", id), &[]).await
    }

    #[allow(dead_code)]
    pub async fn rename(&self, id: &str, title: &str) -> Response {
        self.post_form(&format!("/video/{}/rename", id), &[("title", title)])
            .await
    }

    #[allow(dead_code)]
    pub async fn delete(&self, id: &str) -> Response {
        self.post_form(&format!("/video/{}/delete", id), &[]).await
    }

    #[allow(dead_code)]
    pub async fn import(&self, directory: &str) -> Response {
        self.post_form("/import", &[("directory", directory)]).await
    }
}

/// Target of a redirect response.
#[allow(dead_code)]
pub fn location(response: &Response) -> Option<String> {
    response
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

/// Video id out of a `/video/{id}` redirect, notice query stripped.
#[allow(dead_code)]
pub fn video_id_from_location(response: &Response) -> Option<String> {
    let location = location(response)?;
    let path = location.split('?').next()?;
    path.strip_prefix("/video/").map(str::to_string)
}
