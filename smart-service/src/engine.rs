use crate::{context::ServiceContext, error::ServiceError, result::ServiceResult};
use async_trait::async_trait;

/// 服务引擎
///
/// - 外层调度器按服务定义的 `engine_name` 在多个引擎间选择（实体自动、脚本、远程调用等）；
/// - `run_sync` 表示在当前调用内执行至完成并返回结果，而非投递到后台任务。
#[async_trait]
pub trait Engine: Send + Sync {
    /// 引擎的稳定名称
    fn name(&self) -> &'static str;

    async fn run_sync(
        &self,
        service_name: &str,
        ctx: &ServiceContext,
    ) -> Result<ServiceResult, ServiceError>;
}
