// ==========================================
// 发货包装系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，把各层错误转换为用户可读的错误消息
// ==========================================

use crate::config::ConfigResult;
use crate::domain::error::DomainError;
use crate::engine::error::PackagingError;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入 / 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    /// 包装配置校验失败（带详细原因）
    #[error("包装配置校验失败: {reason}")]
    ConfigValidationError {
        reason: String,
        violations: Vec<ValidationViolation>,
    },

    // ==========================================
    // 引擎错误
    // ==========================================
    #[error("待定包裹类型与包裹记录类型不一致: {0}")]
    PackageTypeMismatch(String),

    #[error("费率计算失败: {0}")]
    RateCalculationError(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    #[error("配置读取失败: {0}")]
    ConfigError(String),

    // ==========================================
    // 导入错误
    // ==========================================
    #[error("文件导入失败: {0}")]
    ImportError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("外键约束违反: {}", msg))
            }
            RepositoryError::SerializationError(msg) => {
                ApiError::InvalidInput(format!("数据格式错误: {}", msg))
            }
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("字段{}错误: {}", field, message))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 DomainError / PackagingError 转换
// ==========================================
impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::PackageTypeMismatch { .. } => ApiError::PackageTypeMismatch(err.to_string()),
            other => ApiError::InvalidInput(other.to_string()),
        }
    }
}

impl From<PackagingError> for ApiError {
    fn from(err: PackagingError) -> Self {
        match err {
            PackagingError::Domain(e) => e.into(),
            PackagingError::Repository(e) => e.into(),
            PackagingError::RateCalculation { .. } => ApiError::RateCalculationError(err.to_string()),
        }
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Repository(e) => e.into(),
            ImportError::Other(e) => ApiError::Other(e),
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

/// 配置读取错误（Box<dyn Error>）统一转换
pub(crate) fn config_error<T>(result: ConfigResult<T>) -> ApiResult<T> {
    result.map_err(|e| ApiError::ConfigError(e.to_string()))
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

// ==========================================
// 校验违规详情
// ==========================================

/// 校验违规详情
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationViolation {
    /// 违规类型（UNKNOWN_PACKAGER / DUPLICATE_PACKAGER / INVALID_OPTION / UNKNOWN_PACKAGE_TYPE）
    pub violation_type: String,
    /// 违规对象（打包器 id / 订单项 id / 策略 id）
    pub subject: String,
    /// 违规原因
    pub reason: String,
}
