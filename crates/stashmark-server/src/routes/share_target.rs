use crate::error::ApiError;
use crate::extract::{Form, State};
use http::StatusCode;
use stashmark_core::{ShareTargetPayload, ShareTargetService};
use std::sync::Arc;

pub const SHARE_TARGET_PATH: &str = "/api/v1/pwa/share-target";

/// `POST /api/v1/pwa/share-target`
///
/// Receives a share from the OS share sheet and stores it as a bookmark.
/// Answers `201 Created` with an empty body. A store failure aborts only
/// this request.
pub async fn share_target(
    State(service): State<Arc<ShareTargetService>>,
    Form(payload): Form<ShareTargetPayload>,
) -> Result<StatusCode, ApiError> {
    match service.submit(payload).await {
        Ok(_) => Ok(StatusCode::CREATED),
        Err(err) if err.is_fatal() => {
            tracing::error!(error = %err, "share target submission aborted");
            Err(err.into())
        }
        Err(err) => {
            tracing::debug!(error = %err, "share target submission rejected");
            Err(err.into())
        }
    }
}
