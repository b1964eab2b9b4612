use crate::database::SortDirection;
use crate::error::PageTreeError;
use axum::http::StatusCode;

pub mod blocks;
pub mod pages;
pub mod snapshots;

/// Status code a failed operation is reported with.
pub fn error_status(err: PageTreeError) -> StatusCode {
    match err {
        PageTreeError::InvalidCriteria(_) | PageTreeError::InvalidArgument(_) => {
            tracing::debug!(error = %err, "rejected request");
            StatusCode::BAD_REQUEST
        }
        PageTreeError::NotFound { .. } => StatusCode::NOT_FOUND,
        PageTreeError::Store(_) | PageTreeError::Serialization(_) => {
            tracing::error!(error = %err, "request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Parses `field:direction` pairs separated by commas, e.g. `url:desc,name`.
/// The direction defaults to ascending; field names are checked by the
/// managers.
pub fn parse_sort(raw: Option<&str>) -> Result<Vec<(String, SortDirection)>, StatusCode> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };

    raw.split(',')
        .filter(|part| !part.trim().is_empty())
        .map(|part| {
            let (field, direction) = part.split_once(':').unwrap_or((part, "asc"));
            let direction = match direction.trim().to_ascii_lowercase().as_str() {
                "asc" => SortDirection::Asc,
                "desc" => SortDirection::Desc,
                _ => return Err(StatusCode::BAD_REQUEST),
            };
            Ok((field.trim().to_string(), direction))
        })
        .collect()
}
