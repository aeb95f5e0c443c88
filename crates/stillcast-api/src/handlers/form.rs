//! The submission form.

use axum::response::{Html, IntoResponse};
use axum_extra::extract::cookie::SignedCookieJar;

use crate::flash::take_flash;

const INDEX_HTML: &str = r#"<!doctype html>
<html lang="it">
<head>
  <meta charset="utf-8">
  <title>MP3 + Immagine &rarr; MP4</title>
  <style>
    body { font-family: Arial, Helvetica, sans-serif; margin: 40px; }
    form { display: flex; flex-direction: column; gap: 10px; max-width: 420px; }
    input[type=file] { padding: 6px; }
    .note { font-size: 0.9rem; color: #555; margin-top: 6px; }
    .flash { color: darkred; }
  </style>
</head>
<body>
  <h1>Converti MP3 + Immagine &rarr; MP4</h1>
  {flash}
  <form method="post" action="/convert" enctype="multipart/form-data">
    <label>Immagine (png/jpg/webp): <input type="file" name="image" accept="image/*" required></label>
    <label>Audio (mp3/wav/m4a/ogg): <input type="file" name="audio" accept="audio/*" required></label>
    <label>Durata massima opzionale (secondi): <input type="number" name="max_seconds" min="1" placeholder="lascia vuoto per usare durata audio"></label>
    <button type="submit">Genera MP4</button>
  </form>
  <p class="note">Il file risultante verr&agrave; scaricato automaticamente.</p>
</body>
</html>
"#;

/// `GET /` — render the form with at most one pending flash message.
pub async fn index(jar: SignedCookieJar) -> impl IntoResponse {
    let (jar, flash) = take_flash(jar);
    (jar, Html(render_index(flash.as_deref())))
}

fn render_index(flash: Option<&str>) -> String {
    let block = match flash {
        Some(message) => format!(r#"<div class="flash">{}</div>"#, html_escape(message)),
        None => String::new(),
    };
    INDEX_HTML.replace("{flash}", &block)
}

/// Flash messages may embed a user-supplied extension; escape it.
fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
