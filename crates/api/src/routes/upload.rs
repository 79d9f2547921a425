//! Photo upload route handler.
//!
//! Accepts a multipart form with a `file` field and writes it under the
//! configured upload directory. Files are served back under `/assets`.

use axum::{Json, extract::Multipart, extract::State};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::state::AppState;

/// `POST /api/upload`.
///
/// Returns the path the SPA should store on the bike (`/assets/<name>`).
#[instrument(skip_all)]
pub async fn upload(
    RequireUser(_current): RequireUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<String>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid upload: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field
            .file_name()
            .map(sanitize_file_name)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| AppError::BadRequest("No file selected".to_string()))?;

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Invalid upload: {e}")))?;
        if bytes.is_empty() {
            return Err(AppError::BadRequest("No file selected".to_string()));
        }

        let dir = &state.config().upload_dir;
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| AppError::Internal(format!("File upload failed: {e}")))?;
        tokio::fs::write(dir.join(&file_name), &bytes)
            .await
            .map_err(|e| AppError::Internal(format!("File upload failed: {e}")))?;

        return Ok(Json(format!("/assets/{file_name}")));
    }

    Err(AppError::BadRequest("No file selected".to_string()))
}

/// Keep only the final path component and drop characters that could escape
/// the upload directory.
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    base.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect::<String>()
        .trim_matches('.')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_plain_names() {
        assert_eq!(sanitize_file_name("bike.png"), "bike.png");
        assert_eq!(sanitize_file_name("s1000rr-2024.jpg"), "s1000rr-2024.jpg");
    }

    #[test]
    fn test_sanitize_strips_directories() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("a/b/c.png"), "c.png");
        assert_eq!(sanitize_file_name("..\\evil.exe"), "evil.exe");
    }

    #[test]
    fn test_sanitize_drops_special_characters() {
        assert_eq!(sanitize_file_name("a b?.png"), "ab.png");
        assert_eq!(sanitize_file_name("...."), "");
    }
}
