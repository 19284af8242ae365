use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::model::entity::{Course, CourseWithAssignmentRow, Lecture};

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct CourseResponse {
    id: Uuid,
    title: String,
    description: String,
    thumbnail_key: Option<String>,
    price_inr_paise: i64,
    created_at: DateTime<Utc>,
}

impl From<&Course> for CourseResponse {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id(),
            title: course.title().to_string(),
            description: course.description().to_string(),
            thumbnail_key: course.thumbnail_key().map(str::to_string),
            price_inr_paise: course.price_inr_paise(),
            created_at: course.created_at(),
        }
    }
}

/// Lecture as listed inside a course; no storage details.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct LectureSummary {
    id: Uuid,
    title: String,
    description: String,
    order_index: i32,
}

impl From<&Lecture> for LectureSummary {
    fn from(lecture: &Lecture) -> Self {
        Self {
            id: lecture.id(),
            title: lecture.title().to_string(),
            description: lecture.description().to_string(),
            order_index: lecture.order_index(),
        }
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct CourseWithLectures {
    #[serde(flatten)]
    pub course: CourseResponse,
    pub lectures: Vec<LectureSummary>,
}

impl CourseWithLectures {
    pub fn new(course: &Course, lectures: &[Lecture]) -> Self {
        Self {
            course: CourseResponse::from(course),
            lectures: lectures.iter().map(LectureSummary::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct CourseDetailResponse {
    pub course: CourseWithLectures,
    pub assigned: bool,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CourseListResponse {
    pub courses: Vec<CourseWithAssignmentRow>,
}
