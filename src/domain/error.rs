// ==========================================
// 发货包装系统 - 领域层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分类: 全部属于 "无效参数" 类错误（编程错误，必须上抛，不可吞掉）
// ==========================================

use thiserror::Error;

/// 领域层错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    // ===== 构造校验错误 =====
    #[error("缺少必填属性: \"{0}\"")]
    MissingProperty(String),

    #[error("发货项不合法: {0}")]
    InvalidShipmentItem(String),

    #[error("数量不合法: {0}")]
    InvalidQuantity(String),

    // ===== 计量/金额错误 =====
    #[error("币种不一致: {left} vs {right}")]
    CurrencyMismatch { left: String, right: String },

    #[error("未知计量单位: {0}")]
    UnknownUnit(String),

    // ===== 包装错误 =====
    #[error("待定包裹类型 \"{proposed}\" 与包裹记录类型 \"{expected}\" 不一致")]
    PackageTypeMismatch { proposed: String, expected: String },

    #[error("包装选项不合法: {0}")]
    InvalidPackagingOption(String),

    #[error("待定包裹数据无法解析: {0}")]
    MalformedProposal(String),
}

/// Result 类型别名
pub type DomainResult<T> = Result<T, DomainError>;
