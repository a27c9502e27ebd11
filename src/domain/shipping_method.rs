// ==========================================
// 发货包装系统 - 配送方式包装配置
// ==========================================
// 职责: 配送方式中与包装相关的配置（策略 id / 打包器覆写 / 默认包装类型）
// 说明: ShippingMethodPackaging 以组合方式嵌入任意配送方式实现
// ==========================================

use crate::domain::measure::Money;
use crate::domain::package_type::PackageType;
use crate::domain::strategy::{effective_packager_ids, PackagerEntry};
use serde::{Deserialize, Serialize};

/// 配送方式的包装配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShippingMethodConfiguration {
    /// 包装策略 id（供默认策略解析器读取）
    #[serde(default)]
    pub packaging_strategy: Option<String>,
    /// 打包器覆写（None 表示使用全局设置）
    #[serde(default)]
    pub packagers: Option<Vec<PackagerEntry>>,
    /// 默认包装类型 id
    #[serde(default)]
    pub default_package_type: Option<String>,
}

// ==========================================
// ShippingMethodPackaging - 可嵌入的包装能力
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShippingMethodPackaging {
    pub configuration: ShippingMethodConfiguration,
    /// 已按目录解析的默认包装类型
    #[serde(default)]
    pub default_package_type: Option<PackageType>,
}

impl ShippingMethodPackaging {
    pub fn new(configuration: ShippingMethodConfiguration) -> Self {
        Self {
            configuration,
            default_package_type: None,
        }
    }

    pub fn with_default_package_type(mut self, package_type: PackageType) -> Self {
        self.configuration.default_package_type = Some(package_type.id.clone());
        self.default_package_type = Some(package_type);
        self
    }

    /// 是否存在配送方式级别的打包器覆写
    pub fn has_custom_packaging(&self) -> bool {
        self.configuration
            .packagers
            .as_ref()
            .map(|entries| !entries.is_empty())
            .unwrap_or(false)
    }

    /// 覆写中的有效打包器顺序
    pub fn custom_packager_ids(&self) -> Vec<String> {
        self.configuration
            .packagers
            .as_deref()
            .map(effective_packager_ids)
            .unwrap_or_default()
    }

    pub fn packaging_strategy_id(&self) -> Option<&str> {
        self.configuration
            .packaging_strategy
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    /// 保存打包器设置
    ///
    /// use_global = true 时清除覆写，回落到全局设置。
    pub fn apply_packager_settings(&mut self, use_global: bool, entries: Vec<PackagerEntry>) {
        if use_global {
            self.configuration.packagers = None;
        } else {
            self.configuration.packagers = Some(entries);
        }
    }
}

/// 配送费率（由外部配送方式计算，本系统只负责排序与汇总）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingRate {
    pub id: String,
    pub shipping_method_id: String,
    pub service: String,
    pub amount: Money,
}
