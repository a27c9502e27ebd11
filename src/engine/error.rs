// ==========================================
// 发货包装系统 - 引擎层错误类型
// ==========================================

use crate::domain::error::DomainError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PackagingError {
    /// 数据完整性错误（输入对象非法），直接向上传播
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("配送方式费率计算失败 (method={method_id}): {message}")]
    RateCalculation { method_id: String, message: String },
}

pub type PackagingResult<T> = Result<T, PackagingError>;
