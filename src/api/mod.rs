// ==========================================
// 发货包装系统 - API 层
// ==========================================
// 职责: 对外业务接口，统一错误类型，配置校验
// ==========================================

pub mod error;
pub mod packaging_api;
pub mod validator;

// 重导出核心类型
pub use error::{ApiError, ApiResult, ValidationViolation};
pub use packaging_api::PackagingApi;
pub use validator::{PackagingConfigValidator, PackagingOptionInput};
