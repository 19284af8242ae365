use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::model::entity::Attachment;

/// Learner view: the object key stays on the server.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct AttachmentResponse {
    id: Uuid,
    title: String,
    mime_type: String,
    size_bytes: Option<i64>,
    lecture_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl From<&Attachment> for AttachmentResponse {
    fn from(attachment: &Attachment) -> Self {
        Self {
            id: attachment.id(),
            title: attachment.title().to_string(),
            mime_type: attachment.mime_type().to_string(),
            size_bytes: attachment.size_bytes(),
            lecture_id: attachment.lecture_id(),
            created_at: attachment.created_at(),
        }
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct AttachmentListResponse {
    pub attachments: Vec<AttachmentResponse>,
}

impl AttachmentListResponse {
    pub fn new(attachments: &[Attachment]) -> Self {
        Self {
            attachments: attachments.iter().map(AttachmentResponse::from).collect(),
        }
    }
}
