mod user;
pub use user::{PlanStatus, UserEntity, UserEntityCreate, UserEntityUpdate};

mod course;
pub use course::{Course, CourseCreate, CourseUpdate, CourseWithAssignmentRow};

mod lecture;
pub use lecture::{Lecture, LectureCreate, LectureUpdate};

mod assignment;
pub use assignment::{AssignmentDetailedRow, CourseAssignment};

mod coupon;
pub use coupon::{Coupon, CouponCreate, CouponUpdate};

mod payment;
pub use payment::{Payment, PaymentCreate, PaymentStatus};

mod attachment;
pub use attachment::{Attachment, AttachmentCreate};

mod storage_provider;
pub use storage_provider::{StorageProvider, StorageProviderCreate, StorageProviderUpdate};

mod refresh_token;
pub use refresh_token::RefreshToken;

mod video_progress;
pub use video_progress::VideoProgress;
