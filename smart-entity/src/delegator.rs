//! 持久化委托器（Delegator）
//!
//! 委托器是唯一允许读写后端存储的组件。引擎在每次调用时从上下文取得委托器，
//! 因此不同调用可以指向不同的存储或会话；事务边界由调用方与委托器负责。
//!
use crate::entity::{BoxEntity, Entity};
use crate::entity_type::EntityType;
use crate::error::DomainResult;
use crate::query::{FindOptions, Page, PageRequest};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

#[async_trait]
pub trait Delegator: Send + Sync {
    async fn find_by_id(
        &self,
        ty: &EntityType,
        id: &Value,
        use_cache: bool,
    ) -> DomainResult<Option<BoxEntity>>;

    async fn find_list_by_and(
        &self,
        ty: &EntityType,
        and_map: &Map<String, Value>,
        opts: &FindOptions,
    ) -> DomainResult<Vec<BoxEntity>>;

    async fn find_list_by_condition(
        &self,
        ty: &EntityType,
        condition: &str,
        opts: &FindOptions,
    ) -> DomainResult<Vec<BoxEntity>>;

    async fn find_page_by_and(
        &self,
        ty: &EntityType,
        and_map: &Map<String, Value>,
        page: PageRequest,
        opts: &FindOptions,
    ) -> DomainResult<Page<BoxEntity>>;

    async fn find_page_by_condition(
        &self,
        ty: &EntityType,
        condition: &str,
        page: PageRequest,
        opts: &FindOptions,
    ) -> DomainResult<Page<BoxEntity>>;

    /// 新增或更新，返回持久化后的实体
    async fn save(&self, entity: BoxEntity) -> DomainResult<BoxEntity>;

    /// 删除；存在引用约束时返回 `DomainError::ConstraintViolation`
    async fn remove(&self, entity: &dyn Entity) -> DomainResult<()>;
}

#[async_trait]
impl<T> Delegator for Arc<T>
where
    T: Delegator + ?Sized,
{
    async fn find_by_id(
        &self,
        ty: &EntityType,
        id: &Value,
        use_cache: bool,
    ) -> DomainResult<Option<BoxEntity>> {
        (**self).find_by_id(ty, id, use_cache).await
    }

    async fn find_list_by_and(
        &self,
        ty: &EntityType,
        and_map: &Map<String, Value>,
        opts: &FindOptions,
    ) -> DomainResult<Vec<BoxEntity>> {
        (**self).find_list_by_and(ty, and_map, opts).await
    }

    async fn find_list_by_condition(
        &self,
        ty: &EntityType,
        condition: &str,
        opts: &FindOptions,
    ) -> DomainResult<Vec<BoxEntity>> {
        (**self).find_list_by_condition(ty, condition, opts).await
    }

    async fn find_page_by_and(
        &self,
        ty: &EntityType,
        and_map: &Map<String, Value>,
        page: PageRequest,
        opts: &FindOptions,
    ) -> DomainResult<Page<BoxEntity>> {
        (**self).find_page_by_and(ty, and_map, page, opts).await
    }

    async fn find_page_by_condition(
        &self,
        ty: &EntityType,
        condition: &str,
        page: PageRequest,
        opts: &FindOptions,
    ) -> DomainResult<Page<BoxEntity>> {
        (**self).find_page_by_condition(ty, condition, page, opts).await
    }

    async fn save(&self, entity: BoxEntity) -> DomainResult<BoxEntity> {
        (**self).save(entity).await
    }

    async fn remove(&self, entity: &dyn Entity) -> DomainResult<()> {
        (**self).remove(entity).await
    }
}
