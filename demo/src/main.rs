use anyhow::Context;
use chrono::{DateTime, Utc};
use serde_json::json;
use smart_entity::validation::{ConstraintViolation, ValidateProfile};
use smart_entity::{Delegator, EntityTypeRegistry, InMemoryDelegator};
use smart_macros::entity_model;
use smart_service::{
    ENGINE_NAME, EntityAutoEngine, EntityTypeResolver, OperationKind, ServiceContext,
    ServiceDispatcher, ServiceModel, ServiceRegistry,
};
use std::sync::Arc;
use tracing::info;
use ulid::Ulid;

#[entity_model(name = "Customer", validate = Customer::rules)]
struct Customer {
    name: String,
    email: String,
    level: i32,
    updated_at: Option<DateTime<Utc>>,
}

impl Customer {
    fn rules(&self, profile: ValidateProfile) -> Vec<ConstraintViolation> {
        let mut violations = Vec::new();
        if self.name.trim().is_empty() {
            violations.push(ConstraintViolation::new("name", "required", "name is required"));
        }
        if profile == ValidateProfile::Create && !self.email.contains('@') {
            violations.push(ConstraintViolation::new("email", "format", "email is malformed"));
        }
        violations
    }
}

#[entity_model(name = "VipCustomer", table = "Customer")]
struct VipCustomer {
    name: String,
    email: String,
    level: i32,
    updated_at: Option<DateTime<Utc>>,
    discount: u8,
}

fn init_tracing() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()
        .map_err(|err| anyhow::anyhow!(err))
        .context("initialize tracing subscriber")
}

fn customer_service(name: &str, invoke: OperationKind) -> ServiceModel {
    ServiceModel::builder()
        .name(name)
        .engine_name(ENGINE_NAME)
        .entity_name("Customer")
        .invoke(invoke)
        .build()
}

fn dispatcher() -> anyhow::Result<ServiceDispatcher> {
    let registry: Arc<ServiceRegistry> = Arc::new(
        [
            customer_service("createCustomer", OperationKind::Create),
            customer_service("updateCustomer", OperationKind::Update),
            customer_service("removeCustomer", OperationKind::Remove),
            customer_service("findCustomer", OperationKind::FindById),
            customer_service("listCustomers", OperationKind::FindListByAnd),
            customer_service("pageCustomers", OperationKind::FindPageByAnd),
        ]
        .into_iter()
        .collect(),
    );
    let types = EntityTypeRegistry::new()
        .register::<Customer>()
        .register::<VipCustomer>();

    let engine = EntityAutoEngine::builder()
        .registry(Arc::clone(&registry))
        .resolver(Arc::new(EntityTypeResolver::new(Arc::new(types))))
        .build();

    let dispatcher = ServiceDispatcher::new(registry);
    dispatcher
        .register_engine(Arc::new(engine))
        .context("register entity auto engine")?;
    Ok(dispatcher)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let dispatcher = dispatcher()?;
    let store = Arc::new(InMemoryDelegator::new());
    let ctx = || ServiceContext::new().with_delegator(store.clone());

    // 新增
    let id = Ulid::new().to_string();
    let created = dispatcher
        .run_sync(
            "createCustomer",
            &ctx()
                .with("id", id.as_str())
                .with("name", "Ada")
                .with("email", "ada@example.com")
                .with("updated_at", Utc::now().to_rfc3339()),
        )
        .await?;
    info!(?created, "customer created");

    // 校验失败
    let rejected = dispatcher
        .run_sync(
            "createCustomer",
            &ctx().with("id", Ulid::new().to_string()).with("name", "Bob"),
        )
        .await?;
    println!("rejected: {}", json!(rejected.into_map()));

    // 部分更新
    let updated = dispatcher
        .run_sync(
            "updateCustomer",
            &ctx()
                .with("entityId", id.as_str())
                .with("level", 2)
                .with("updated_at", Utc::now().to_rfc3339()),
        )
        .await?;
    println!("updated: {}", json!(updated.into_map()));

    let found = dispatcher
        .run_sync(
            "findCustomer",
            &ctx().with("entityId", id.as_str()).with("returnName", "customer"),
        )
        .await?;
    println!("found: {}", json!(found.into_map()));

    for n in 0..3 {
        dispatcher
            .run_sync(
                "createCustomer",
                &ctx()
                    .with("id", Ulid::new().to_string())
                    .with("name", format!("guest-{n}"))
                    .with("email", format!("guest-{n}@example.com"))
                    .with("updated_at", Utc::now().to_rfc3339()),
            )
            .await?;
    }

    let list = dispatcher
        .run_sync("listCustomers", &ctx().with("fieldsToSelect", "name"))
        .await?;
    println!("list: {}", json!(list.into_map()));

    let page = dispatcher
        .run_sync("pageCustomers", &ctx().with("pageNo", 2).with("pageSize", 3))
        .await?;
    println!("page: {}", json!(page.into_map()));

    // 被引用的实体不可删除
    store.reference("Customer", &json!(id));
    let blocked = dispatcher
        .run_sync("removeCustomer", &ctx().with("entityId", id.as_str()))
        .await?;
    println!("blocked: {}", json!(blocked.into_map()));

    // 多态实体共享同一张表，更新时按已存实体的具体类型转换
    let vip_id = Ulid::new().to_string();
    store
        .save(Box::new(VipCustomer {
            id: vip_id.clone(),
            name: "Grace".to_string(),
            email: "grace@example.com".to_string(),
            discount: 15,
            ..Default::default()
        }))
        .await?;
    let vip = dispatcher
        .run_sync(
            "updateCustomer",
            &ctx().with("entityId", vip_id.as_str()).with("level", 9),
        )
        .await?;
    println!("vip: {}", json!(vip.into_map()));

    println!("customers stored: {}", store.count("Customer"));
    Ok(())
}
