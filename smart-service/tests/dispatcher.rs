use async_trait::async_trait;
use serde_json::{Map, Value, json};
use smart_entity::InMemoryDelegator;
use smart_entity::entity_type::EntityTypeRegistry;
use smart_macros::entity_model;
use smart_service::result::{PROBLEM_CODE, RESPONSE_MESSAGE};
use smart_service::{
    ENGINE_NAME, Engine, EntityAutoEngine, EntityTypeResolver, OperationKind, ServiceContext,
    ServiceDispatcher, ServiceError, ServiceModel, ServiceRegistry, ServiceResult,
};
use std::sync::Arc;

#[entity_model(name = "Note")]
struct Note {
    text: String,
}

/// 原样回显参数的引擎
struct EchoEngine;

#[async_trait]
impl Engine for EchoEngine {
    fn name(&self) -> &'static str {
        "echo"
    }

    async fn run_sync(
        &self,
        _service_name: &str,
        ctx: &ServiceContext,
    ) -> Result<ServiceResult, ServiceError> {
        Ok(ServiceResult::Success(ctx.params.clone()))
    }
}

fn dispatcher() -> ServiceDispatcher {
    let registry: Arc<ServiceRegistry> = Arc::new(
        [
            ServiceModel::builder()
                .name("createNote")
                .engine_name(ENGINE_NAME)
                .entity_name("Note")
                .invoke(OperationKind::Create)
                .build(),
            ServiceModel::builder()
                .name("findNote")
                .engine_name(ENGINE_NAME)
                .entity_name("Note")
                .invoke(OperationKind::FindById)
                .build(),
            ServiceModel::builder().name("echo").engine_name("echo").build(),
            ServiceModel::builder().name("script").engine_name("groovy").build(),
            ServiceModel::builder().name("orphan").build(),
        ]
        .into_iter()
        .collect(),
    );

    let types = EntityTypeRegistry::new().register::<Note>();
    let entity_auto = EntityAutoEngine::builder()
        .registry(Arc::clone(&registry))
        .resolver(Arc::new(EntityTypeResolver::new(Arc::new(types))))
        .build();

    let dispatcher = ServiceDispatcher::new(registry);
    dispatcher.register_engine(Arc::new(entity_auto)).unwrap();
    dispatcher.register_engine(Arc::new(EchoEngine)).unwrap();
    dispatcher
}

#[tokio::test]
async fn routes_by_engine_name() -> anyhow::Result<()> {
    let dispatcher = dispatcher();
    let store = Arc::new(InMemoryDelegator::new());
    let ctx = |params: Value| {
        let params: Map<String, Value> = params.as_object().cloned().unwrap_or_default();
        ServiceContext::from_params(params).with_delegator(store.clone())
    };

    let created = dispatcher
        .run_sync("createNote", &ctx(json!({"id": "n-1", "text": "hi"})))
        .await?;
    assert_eq!(created.get("model").unwrap()["text"], "hi");

    let found = dispatcher
        .run_sync("findNote", &ctx(json!({"entityId": "n-1"})))
        .await?
        .into_map();
    assert_eq!(found[RESPONSE_MESSAGE], "success");
    assert_eq!(found["model"]["id"], "n-1");

    let echoed = dispatcher
        .run_sync("echo", &ctx(json!({"ping": 1})))
        .await?;
    assert_eq!(echoed.get("ping"), Some(&json!(1)));
    Ok(())
}

#[tokio::test]
async fn problems_project_to_loose_map() -> anyhow::Result<()> {
    let dispatcher = dispatcher();
    let ctx = ServiceContext::new().with_delegator(Arc::new(InMemoryDelegator::new()));

    let out = dispatcher.run_sync("findNote", &ctx).await?.into_map();
    assert_eq!(out[RESPONSE_MESSAGE], "problem");
    assert_eq!(out[PROBLEM_CODE], "ENTITY_ID_REQUIRED");
    Ok(())
}

#[tokio::test]
async fn unroutable_services_are_configuration_errors() {
    let dispatcher = dispatcher();
    let ctx = ServiceContext::new();

    let err = dispatcher.run_sync(" ", &ctx).await.unwrap_err();
    assert!(matches!(err, ServiceError::EmptyServiceName));

    let err = dispatcher.run_sync("unknown", &ctx).await.unwrap_err();
    assert!(matches!(err, ServiceError::ServiceNotFound(_)));

    let err = dispatcher.run_sync("orphan", &ctx).await.unwrap_err();
    assert!(matches!(err, ServiceError::ServiceMisconfigured { .. }));

    let err = dispatcher.run_sync("script", &ctx).await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::EngineNotFound { ref engine, .. } if engine == "groovy"
    ));
}

#[test]
fn engines_register_once() {
    let dispatcher = dispatcher();

    let err = dispatcher.register_engine(Arc::new(EchoEngine)).unwrap_err();
    assert!(matches!(err, ServiceError::AlreadyRegisteredEngine(ref n) if n == "echo"));

    let mut engines = dispatcher.registered_engines();
    engines.sort();
    assert_eq!(engines, vec!["echo", ENGINE_NAME]);
    assert_eq!(dispatcher.registry().registered_services().len(), 5);
}
