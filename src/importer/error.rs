// ==========================================
// 发货包装系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    #[error("缺少必需列: {0}")]
    MissingColumn(String),

    // ===== 行级错误 =====
    #[error("字段缺失 (行 {row}, 字段 {field})")]
    MissingField { row: usize, field: String },

    #[error("类型转换失败 (行 {row}, 字段 {field}): {message}")]
    TypeConversionError {
        row: usize,
        field: String,
        message: String,
    },

    #[error("数值范围错误 (行 {row}, 字段 {field}): 值 {value} 必须大于等于 0")]
    NegativeValue {
        row: usize,
        field: String,
        value: f64,
    },

    #[error("重复的包装类型 id (行 {row}): {id}")]
    DuplicateId { row: usize, id: String },

    // ===== 存储错误 =====
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImportError {
    /// 行级错误所在行号（文件行号，含表头）
    pub fn row(&self) -> Option<usize> {
        match self {
            ImportError::MissingField { row, .. }
            | ImportError::TypeConversionError { row, .. }
            | ImportError::NegativeValue { row, .. }
            | ImportError::DuplicateId { row, .. } => Some(*row),
            _ => None,
        }
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
