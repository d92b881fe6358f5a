//! 声明式服务调用层（smart-service）
//!
//! 调用方以“服务名 + 松散参数映射”调用服务，调度器按服务定义选择引擎；
//! 实体自动引擎（`entity_auto`）仅凭元数据完成实体的增删改查，
//! 并把结果统一为成功/问题信封（`result`）。
//!
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod engine;
pub mod entity_auto;
pub mod error;
pub mod model;
mod params;
pub mod registry;
pub mod resolver;
pub mod result;

pub use context::{ServiceContext, keys};
pub use dispatcher::ServiceDispatcher;
pub use engine::Engine;
pub use entity_auto::{ENGINE_NAME, EntityAutoEngine};
pub use error::ServiceError;
pub use model::{OperationKind, Parameter, ServiceModel};
pub use registry::ServiceRegistry;
pub use resolver::EntityTypeResolver;
pub use result::{Problem, ServiceResult, codes};
