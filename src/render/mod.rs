//! HTML views. Every function is pure: it gets the state it shows and
//! returns the whole document.

mod html;
mod pages;
pub mod policy;

pub use html::{escape, layout, APP_NAME};
pub use pages::{
    home_page, import_page, login_page, not_found_page, register_page, upload_page, video_page,
    VideoPageModel,
};

use crate::user::User;

/// Who is looking at the page, plus the banner carried by `?notice=`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewContext<'a> {
    pub current_user: Option<&'a User>,
    pub notice: Option<&'a str>,
}
