//! 实体自动引擎（EntityAutoEngine）
//!
//! 仅凭服务定义即可完成实体的增删改查，无需为每个服务编写代码：
//! 1. 校验前置条件（服务名、上下文、服务定义、委托器、实体类型），失败即返回 `ServiceError`；
//! 2. 按操作类型分派到对应处理流程；
//! 3. 处理流程中出现的业务问题以 `ServiceResult::Problem` 返回，
//!    其余协作方错误在引擎边界统一记录日志并转换为 `ENTITY_AUTO_ENGINE_ERROR`。
//!
use crate::{
    config::EntityAutoConfig,
    context::{ServiceContext, keys},
    engine::Engine,
    error::ServiceError,
    model::{OperationKind, ServiceModel},
    params,
    registry::ServiceRegistry,
    resolver::EntityTypeResolver,
    result::{ServiceResult, codes},
};
use async_trait::async_trait;
use bon::Builder;
use serde_json::{Map, Value};
use smart_entity::{
    converter::{EntityConverter, SerdeEntityConverter},
    delegator::Delegator,
    entity::{BoxEntity, Entity},
    entity_type::EntityType,
    error::{DomainError, DomainResult},
    query::{FindOptions, OrderBy, PageRequest},
    validation::{EntityRulesValidator, ValidateProfile, Validator},
};
use std::sync::Arc;
use tracing::{debug, error, instrument};

/// 引擎名称，外层调度器据此选择引擎
pub const ENGINE_NAME: &str = "entityAuto";

#[derive(Builder)]
pub struct EntityAutoEngine {
    registry: Arc<ServiceRegistry>,
    resolver: Arc<EntityTypeResolver>,
    #[builder(default = default_converter())]
    converter: Arc<dyn EntityConverter>,
    #[builder(default = default_validator())]
    validator: Arc<dyn Validator>,
    #[builder(default)]
    config: EntityAutoConfig,
}

fn default_converter() -> Arc<dyn EntityConverter> {
    Arc::new(SerdeEntityConverter)
}

fn default_validator() -> Arc<dyn Validator> {
    Arc::new(EntityRulesValidator)
}

/// 单次调用在各处理流程间共享的只读视图
struct Invocation<'a> {
    params: &'a Map<String, Value>,
    delegator: &'a dyn Delegator,
    ty: &'a Arc<EntityType>,
    return_name: Option<&'a str>,
}

/// 列表/分页查询的过滤条件
struct Filter<'a> {
    condition: Option<&'a str>,
    and_map: Map<String, Value>,
    opts: FindOptions,
}

impl EntityAutoEngine {
    /// 执行一次实体自动服务调用
    ///
    /// 前置条件不满足时返回 `Err`；通过后总是返回结果信封，协作方错误不会外泄。
    #[instrument(skip_all, fields(service = %service_name, engine = ENGINE_NAME))]
    pub async fn execute(
        &self,
        service_name: &str,
        model: Option<&ServiceModel>,
        ctx: Option<&ServiceContext>,
    ) -> Result<ServiceResult, ServiceError> {
        if service_name.trim().is_empty() {
            return Err(ServiceError::EmptyServiceName);
        }
        let ctx = ctx.ok_or_else(|| ServiceError::ContextMissing(service_name.to_string()))?;
        let model = model.ok_or_else(|| ServiceError::ServiceNotFound(service_name.to_string()))?;

        let misconfigured = |reason: &str| ServiceError::ServiceMisconfigured {
            service: service_name.to_string(),
            reason: reason.to_string(),
        };
        let invoke = model
            .invoke
            .as_ref()
            .filter(|kind| !kind.as_str().trim().is_empty())
            .ok_or_else(|| misconfigured("invoke is not set"))?;
        let entity_name = model
            .entity_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| misconfigured("entity name is not set"))?;

        let delegator = ctx
            .delegator()
            .ok_or_else(|| ServiceError::DelegatorRequired(service_name.to_string()))?;
        let ty = self.resolver.resolve(entity_name)?;

        match self.dispatch(invoke, &ctx.params, delegator.as_ref(), &ty).await {
            Ok(result) => Ok(result),
            Err(err) => {
                error!(
                    service = service_name,
                    engine = ENGINE_NAME,
                    invoke = %invoke,
                    entity = entity_name,
                    error = %err,
                    "entity auto engine failed"
                );
                Ok(ServiceResult::problem(
                    codes::ENTITY_AUTO_ENGINE_ERROR,
                    err.to_string(),
                ))
            }
        }
    }

    async fn dispatch(
        &self,
        invoke: &OperationKind,
        params: &Map<String, Value>,
        delegator: &dyn Delegator,
        ty: &Arc<EntityType>,
    ) -> DomainResult<ServiceResult> {
        let inv = Invocation {
            params,
            delegator,
            ty,
            return_name: params::read_str(params, keys::RETURN_NAME)?.filter(|n| !n.is_empty()),
        };

        match invoke {
            OperationKind::Create => self.create(&inv).await,
            OperationKind::Update => self.update(&inv).await,
            OperationKind::Remove => self.remove(&inv).await,
            OperationKind::FindById => self.find_by_id(&inv).await,
            OperationKind::FindListByAnd | OperationKind::FindListByCondition => {
                self.find_list(&inv).await
            }
            OperationKind::FindPageByAnd | OperationKind::FindPageByCondition => {
                self.find_page(&inv).await
            }
            OperationKind::Other(name) => {
                debug!(invoke = %name, "unrecognized operation ignored");
                Ok(ServiceResult::success())
            }
        }
    }

    async fn create(&self, inv: &Invocation<'_>) -> DomainResult<ServiceResult> {
        let entity = self
            .converter
            .convert(inv.ty, inv.params, inv.delegator)
            .await?;
        if let Some(problem) = self.check(entity.as_ref(), ValidateProfile::Create)? {
            return Ok(problem);
        }

        let saved = inv.delegator.save(entity).await?;
        Ok(single(inv.return_name, keys::MODEL, saved.to_value()?))
    }

    async fn update(&self, inv: &Invocation<'_>) -> DomainResult<ServiceResult> {
        let Some(id) = required_id(inv.params) else {
            return Ok(id_required());
        };
        let Some(existing) = inv.delegator.find_by_id(inv.ty, id, false).await? else {
            return Ok(ServiceResult::success());
        };

        // 以已有实体的具体类型转换，支持多态实体
        let concrete = self.concrete_type(inv.ty, &existing)?;
        let mut merged = match existing.to_value()? {
            Value::Object(fields) => fields,
            _ => Map::new(),
        };
        merged.extend(inv.params.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged.insert(concrete.id_field().to_string(), existing.id_value()?);

        let entity = self
            .converter
            .convert(&concrete, &merged, inv.delegator)
            .await?;
        // 更新同样校验：合并后的实体按 UPDATE 场景检查，不通过则不保存
        if let Some(problem) = self.check(entity.as_ref(), ValidateProfile::Update)? {
            return Ok(problem);
        }

        let saved = inv.delegator.save(entity).await?;
        Ok(single(inv.return_name, keys::MODEL, saved.to_value()?))
    }

    async fn remove(&self, inv: &Invocation<'_>) -> DomainResult<ServiceResult> {
        let Some(id) = required_id(inv.params) else {
            return Ok(id_required());
        };
        let Some(existing) = inv.delegator.find_by_id(inv.ty, id, false).await? else {
            return Ok(ServiceResult::success());
        };

        match inv.delegator.remove(existing.as_ref()).await {
            Ok(()) => Ok(single(None, keys::REMOVED_MODEL, existing.to_value()?)),
            Err(err) if err.is_constraint_violation() => {
                debug!(error = %err, "removal rejected by constraint");
                Ok(ServiceResult::problem(
                    codes::ENTITY_REFERENCED_CONSTRAINT,
                    "The entity has referenced another entity.",
                ))
            }
            Err(err) => Err(err),
        }
    }

    async fn find_by_id(&self, inv: &Invocation<'_>) -> DomainResult<ServiceResult> {
        let use_cache = params::read_bool(inv.params, keys::USE_CACHE)?.unwrap_or(false);
        let Some(id) = required_id(inv.params) else {
            return Ok(id_required());
        };

        let found = inv.delegator.find_by_id(inv.ty, id, use_cache).await?;
        let value = found
            .map(|e| e.to_value())
            .transpose()?
            .unwrap_or(Value::Null);
        Ok(single(inv.return_name, keys::MODEL, value))
    }

    async fn find_list(&self, inv: &Invocation<'_>) -> DomainResult<ServiceResult> {
        let filter = self.filter(inv)?;
        let list = match filter.condition {
            Some(condition) => {
                inv.delegator
                    .find_list_by_condition(inv.ty, condition, &filter.opts)
                    .await?
            }
            None => {
                inv.delegator
                    .find_list_by_and(inv.ty, &filter.and_map, &filter.opts)
                    .await?
            }
        };

        let values = list
            .iter()
            .map(|e| e.to_value())
            .collect::<DomainResult<Vec<_>>>()?;
        Ok(single(inv.return_name, keys::MODEL_LIST, Value::Array(values)))
    }

    async fn find_page(&self, inv: &Invocation<'_>) -> DomainResult<ServiceResult> {
        let filter = self.filter(inv)?;
        let page_no = params::read_positive(inv.params, keys::PAGE_NO)?
            .unwrap_or(self.config.default_page_no);
        let page_size = params::read_positive(inv.params, keys::PAGE_SIZE)?
            .unwrap_or(self.config.default_page_size);
        let request = PageRequest::new(page_no, page_size)?;

        let page = match filter.condition {
            Some(condition) => {
                inv.delegator
                    .find_page_by_condition(inv.ty, condition, request, &filter.opts)
                    .await?
            }
            None => {
                inv.delegator
                    .find_page_by_and(inv.ty, &filter.and_map, request, &filter.opts)
                    .await?
            }
        };
        let page = serde_json::to_value(page.try_map(|e| e.to_value())?)?;

        // 指定 returnName 时整体嵌套，否则分页字段直接平铺到结果中
        let mut out = Map::new();
        match (inv.return_name, page) {
            (Some(name), page) => {
                out.insert(name.to_string(), page);
            }
            (None, Value::Object(fields)) => out.extend(fields),
            (None, other) => {
                return Err(DomainError::TypeMismatch {
                    expected: "page object".to_string(),
                    found: other.to_string(),
                });
            }
        }
        Ok(ServiceResult::Success(out))
    }

    fn filter<'a>(&self, inv: &Invocation<'a>) -> DomainResult<Filter<'a>> {
        let p = inv.params;
        let use_cache = params::read_bool(p, keys::USE_CACHE)?.unwrap_or(false);
        let condition = params::read_str(p, keys::CONDITION)?
            .map(str::trim)
            .filter(|c| !c.is_empty());
        let and_map = params::read_map(p, keys::AND_MAP)?
            .cloned()
            .unwrap_or_default();
        let fields = params::read_fields(p, keys::FIELDS_TO_SELECT)?;

        let updated_at = &self.config.updated_at_field;
        let order_by = match params::read_order_by(p, keys::ORDER_BY)? {
            Some(order_by) => Some(order_by),
            None if inv.ty.has_field(updated_at) => Some(vec![OrderBy::desc(updated_at)]),
            None => None,
        };

        Ok(Filter {
            condition,
            and_map,
            opts: FindOptions::builder()
                .maybe_fields(fields)
                .maybe_order_by(order_by)
                .use_cache(use_cache)
                .build(),
        })
    }

    fn check(
        &self,
        entity: &dyn Entity,
        profile: ValidateProfile,
    ) -> DomainResult<Option<ServiceResult>> {
        let violations = self.validator.validate(entity, profile);
        if violations.is_empty() {
            return Ok(None);
        }

        debug!(%profile, violations = violations.len(), "validation not passed");
        Ok(Some(ServiceResult::problem_with_detail(
            codes::VALIDATION_NOT_PASSED,
            "Validation being unable to be passed.",
            serde_json::to_value(&violations)?,
        )))
    }

    fn concrete_type(
        &self,
        declared: &Arc<EntityType>,
        existing: &BoxEntity,
    ) -> DomainResult<Arc<EntityType>> {
        if existing.entity_type() == declared.name() {
            return Ok(Arc::clone(declared));
        }
        self.resolver
            .resolve(existing.entity_type())
            .map_err(|err| DomainError::NotFound {
                reason: err.to_string(),
            })
    }
}

#[async_trait]
impl Engine for EntityAutoEngine {
    fn name(&self) -> &'static str {
        ENGINE_NAME
    }

    async fn run_sync(
        &self,
        service_name: &str,
        ctx: &ServiceContext,
    ) -> Result<ServiceResult, ServiceError> {
        let model = self.registry.lookup(service_name);
        self.execute(service_name, model.as_deref(), Some(ctx)).await
    }
}

fn required_id(params: &Map<String, Value>) -> Option<&Value> {
    let id = params.get(keys::ENTITY_ID);
    (!params::is_empty_id(id)).then_some(id).flatten()
}

fn id_required() -> ServiceResult {
    ServiceResult::problem(codes::ENTITY_ID_REQUIRED, "The entity id required.")
}

fn single(return_name: Option<&str>, default_key: &str, value: Value) -> ServiceResult {
    let mut out = Map::new();
    out.insert(return_name.unwrap_or(default_key).to_string(), value);
    ServiceResult::Success(out)
}
