// ==========================================
// 发货包装系统 - 包装配置读取 Trait
// ==========================================
// 职责: 定义编排所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::error::Error;

/// 配置读取结果
pub type ConfigResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

// ==========================================
// PackagingConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）/ PackagingConfig（内存）
#[async_trait]
pub trait PackagingConfigReader: Send + Sync {
    /// 获取全局启用的打包器（有序）
    ///
    /// # 默认值
    /// - 空列表（不运行任何打包器）
    async fn get_enabled_packagers(&self) -> ConfigResult<Vec<String>>;

    /// 获取全局默认包装类型 id
    ///
    /// # 默认值
    /// - None
    async fn get_default_package_type_id(&self) -> ConfigResult<Option<String>>;

    /// 获取发货单类型 → 包裹记录类型映射
    ///
    /// # 返回
    /// - BTreeMap<String, String>: shipment_type → record_type
    ///
    /// # 默认值
    /// - 空映射（所有发货单类型都视为未配置）
    async fn get_shipment_package_types(&self) -> ConfigResult<BTreeMap<String, String>>;
}
