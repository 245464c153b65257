//! Site file layout and serving
//!
//! Paths are mapped onto a fixed set of files under the site directory.
//! Only `/assets/` is open-ended, and its paths may not leave that folder.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::error::{ApiError, ApiResult};

/// Page served to anyone without a valid session
pub const SIGNIN_PAGE: &str = "signin.html";

const ASSETS_PREFIX: &str = "/assets/";
const FILE_NOT_FOUND: &str = "File not found.";
const DATA_NOT_FOUND: &str = "Invalid data request.";

/// File served without a session, relative to the site directory
pub fn public_file(path: &str) -> Option<PathBuf> {
    if let Some(rest) = path.strip_prefix(ASSETS_PREFIX) {
        let relative = Path::new(rest);
        let contained = !rest.is_empty()
            && !rest.ends_with('/')
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        return contained.then(|| Path::new("assets").join(relative));
    }

    match path {
        "/favicon.ico" => Some(PathBuf::from("assets/favicon.ico")),
        "/style.css" => Some(PathBuf::from("style.css")),
        _ => None,
    }
}

/// File served to a signed-in user
pub fn protected_file(path: &str) -> Option<&'static str> {
    match path {
        "/" | "/proj.html" => Some("proj.html"),
        "/file.html" => Some("file.html"),
        "/js/proj.js" => Some("proj.js"),
        "/js/file.js" => Some("file.js"),
        _ => None,
    }
}

/// Whether the path asks for generated per-user data
pub fn is_data_path(path: &str) -> bool {
    path.starts_with("/data/")
}

/// Script assigning the signed-in user's data to the global `var_name`
///
/// # Errors
/// [`ApiError::NotFound`] for any data path other than `/data/proj.js`.
pub fn data_script(var_name: &str, user: &str, path: &str) -> ApiResult<String> {
    let data = match path {
        "/data/proj.js" => json!({
            "session": { "user": user },
            "proj": null,
        }),
        _ => return Err(ApiError::NotFound(DATA_NOT_FOUND)),
    };
    Ok(format!("var {var_name} = {data};"))
}

/// Serve a data script with a JavaScript content type
pub fn serve_script(script: String) -> Response {
    ([(CONTENT_TYPE, content_type("js"))], script).into_response()
}

/// Read a file below `site_dir` into a response
///
/// # Errors
/// [`ApiError::NotFound`] if the file does not exist,
/// [`ApiError::Internal`] if it cannot be read.
pub async fn serve_file(site_dir: &Path, relative: impl AsRef<Path>) -> ApiResult<Response> {
    let path = site_dir.join(relative.as_ref());
    let body = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => ApiError::NotFound(FILE_NOT_FOUND),
        _ => ApiError::Internal(format!("reading {}: {e}", path.display())),
    })?;

    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    Ok(([(CONTENT_TYPE, content_type(extension))], body).into_response())
}

/// Not-found error for unmapped paths
pub fn not_found() -> ApiError {
    ApiError::NotFound(FILE_NOT_FOUND)
}

fn content_type(extension: &str) -> &'static str {
    match extension {
        "html" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" => "text/javascript; charset=utf-8",
        "json" => "application/json",
        "ico" => "image/x-icon",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "woff2" => "font/woff2",
        "txt" => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}
