use super::ViewContext;
use std::fmt::Write;

pub const APP_NAME: &str = "VidShare";

/// Escapes text for use in element content and quoted attributes.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

const STYLE: &str = r#"
body { font-family: sans-serif; margin: 0; background: #f9f9f9 url('/assets/BackGround.png'); }
header { display: flex; justify-content: space-between; align-items: center; padding: 8px 16px; background: #fff; border-bottom: 1px solid #ddd; }
header .logo { display: flex; align-items: center; gap: 8px; font-weight: bold; color: #c00; text-decoration: none; }
header .logo img { height: 32px; }
.user-section { display: flex; gap: 8px; align-items: center; }
.notice { margin: 12px 16px; padding: 8px 12px; background: #fff4ce; border: 1px solid #e6c200; }
main { padding: 16px; }
.video-grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(240px, 1fr)); gap: 16px; }
.video-card { background: #fff; border-radius: 8px; overflow: hidden; color: inherit; text-decoration: none; }
.video-card img { width: 100%; aspect-ratio: 16 / 9; object-fit: cover; }
.video-card .info { padding: 8px; }
.video-card a { color: inherit; text-decoration: none; }
.video-card .manage, .video-card .reactions { padding: 0 8px 8px; }
.meta { color: #666; font-size: 0.9em; }
.active { background: #065fd4; color: #fff; }
form.inline { display: inline; }
.auth-form { max-width: 360px; margin: 32px auto; display: flex; flex-direction: column; gap: 8px; }
.error { color: #c00; }
video { width: 100%; max-width: 960px; background: #000; }
"#;

fn user_section(ctx: &ViewContext) -> String {
    match ctx.current_user {
        Some(user) => {
            let mut section = String::new();
            let _ = write!(
                section,
                r#"<span class="username">{}{}</span>"#,
                escape(&user.username),
                if user.is_admin() { " (admin)" } else { "" }
            );
            section.push_str(r#"<a href="/upload">Upload</a>"#);
            section.push_str(r#"<a href="/import">Import</a>"#);
            section.push_str(
                r#"<form class="inline" method="post" action="/logout"><button type="submit">Log out</button></form>"#,
            );
            section
        }
        None => r#"<a href="/login">Log in</a><a href="/register">Register</a>"#.to_string(),
    }
}

/// Wraps `body` into the full document with header and notice banner.
pub fn layout(ctx: &ViewContext, title: &str, body: &str) -> String {
    let notice = ctx
        .notice
        .map(|n| format!(r#"<div class="notice">{}</div>"#, escape(n)))
        .unwrap_or_default();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title} - {app}</title>
<style>{style}</style>
</head>
<body>
<header>
<a class="logo" href="/"><img src="/assets/Logo.png" alt="">{app}</a>
<div class="user-section">{user_section}</div>
</header>
{notice}
<main>
{body}
</main>
</body>
</html>
"#,
        title = escape(title),
        app = APP_NAME,
        style = STYLE,
        user_section = user_section(ctx),
        notice = notice,
        body = body,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape(r#"<b onclick="x">Tom & 'Jerry'</b>"#),
            "&lt;b onclick=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn layout_shows_escaped_notice() {
        let ctx = ViewContext {
            current_user: None,
            notice: Some("<hi>"),
        };
        let page = layout(&ctx, "Home", "<p>body</p>");
        assert!(page.contains(r#"<div class="notice">&lt;hi&gt;</div>"#));
        assert!(page.contains("<p>body</p>"));
        assert!(page.contains(r#"href="/login""#));
    }
}
