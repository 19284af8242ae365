use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    model::entity::{Lecture, VideoProgress},
    web::dto::attachments::AttachmentResponse,
};

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct LectureResponse {
    id: Uuid,
    course_id: Uuid,
    title: String,
    description: String,
    notes_md: Option<String>,
    notes_attachment_id: Option<Uuid>,
    notes_attachment: Option<AttachmentResponse>,
    order_index: i32,
}

impl LectureResponse {
    pub fn new(lecture: &Lecture, notes_attachment: Option<AttachmentResponse>) -> Self {
        Self {
            id: lecture.id(),
            course_id: lecture.course_id(),
            title: lecture.title().to_string(),
            description: lecture.description().to_string(),
            notes_md: lecture.notes_md().map(str::to_string),
            notes_attachment_id: lecture.notes_attachment_id(),
            notes_attachment,
            order_index: lecture.order_index(),
        }
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct ProgressResponse {
    pub progress_pct: f64,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Option<VideoProgress>> for ProgressResponse {
    fn from(progress: Option<VideoProgress>) -> Self {
        match progress {
            Some(p) => Self {
                progress_pct: p.progress_pct(),
                updated_at: Some(p.updated_at()),
            },
            None => Self {
                progress_pct: 0.0,
                updated_at: None,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct LectureDetailResponse {
    pub lecture: LectureResponse,
    pub progress: ProgressResponse,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct ProgressUpdateResponse {
    pub progress: ProgressResponse,
}
