use serde::{Deserialize, Serialize};

use crate::{
    model::{ModelManager, error::DatabaseResult},
    web::AuthenticatedUser,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    User,
    Course,
    Lecture,
    Assignment,
    Coupon,
    Payment,
    Attachment,
    StorageProvider,
    RefreshToken,
    VideoProgress,
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::User => "User",
            Self::Course => "Course",
            Self::Lecture => "Lecture",
            Self::Assignment => "Assignment",
            Self::Coupon => "Coupon",
            Self::Payment => "Payment",
            Self::Attachment => "Attachment",
            Self::StorageProvider => "Storage provider",
            Self::RefreshToken => "Refresh token",
            Self::VideoProgress => "Video progress",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, limit: i64, offset: i64) -> Self {
        Self {
            items,
            total,
            limit,
            offset,
        }
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            limit: self.limit,
            offset: self.offset,
        }
    }
}

pub trait ResourceTyped {
    fn get_resource_type() -> ResourceType;
}

/// Create and update payloads are separate types: updates are partial.
#[async_trait::async_trait]
pub trait CrudRepository<T, Create, Update, V>
where
    T: ResourceTyped,
    V: Clone + Copy,
{
    async fn create(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        data: Create,
    ) -> DatabaseResult<T>;
    async fn update(
        self,
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        data: Update,
    ) -> DatabaseResult<T>
    where
        Self: Sized;

    async fn delete(self, mm: &ModelManager, actor: &AuthenticatedUser) -> DatabaseResult<()>
    where
        Self: Sized;

    async fn find_by_id(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        id: V,
    ) -> DatabaseResult<Option<T>>;
    async fn list(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<Vec<T>>;
    async fn count(mm: &ModelManager, actor: &AuthenticatedUser) -> DatabaseResult<i64>;
}

#[async_trait::async_trait]
pub trait PaginatableRepository<T, Create, Update, V>
where
    T: ResourceTyped + CrudRepository<T, Create, Update, V>,
    V: Clone + Copy,
{
    async fn page(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<Page<T>>;
}

#[macro_export]
macro_rules! impl_paginatable_for {
    ($ent:ident, $ent_create:ident, $ent_update:ident, $ent_id:ident) => {
        #[async_trait::async_trait]
        impl $crate::model::PaginatableRepository<$ent, $ent_create, $ent_update, $ent_id> for $ent {
            async fn page(
                mm: &$crate::model::ModelManager,
                actor: &$crate::web::AuthenticatedUser,
                limit: i64,
                offset: i64,
            ) -> $crate::model::DatabaseResult<$crate::model::Page<$ent>> {
                let (items, count) = tokio::try_join!(
                    <$ent as $crate::model::CrudRepository<$ent, $ent_create, $ent_update, $ent_id>>::list(mm, actor, limit, offset),
                    <$ent as $crate::model::CrudRepository<$ent, $ent_create, $ent_update, $ent_id>>::count(mm, actor),
                )?;
                Ok($crate::model::Page::new(items, count, limit, offset))
            }
        }
    };
}
