// ==========================================
// 发货包装系统 - 包装配置快照
// ==========================================
// 职责: 单次编排调用使用的配置（显式传入，不读全局状态）
// ==========================================

use crate::config::config_reader::{ConfigResult, PackagingConfigReader};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackagingConfig {
    /// 全局启用的打包器 id（按执行顺序）
    #[serde(default)]
    pub enabled_packagers: Vec<String>,
    /// 全局默认包装类型 id
    #[serde(default)]
    pub default_package_type_id: Option<String>,
    /// 发货单类型 → 包裹记录类型
    #[serde(default)]
    pub shipment_package_types: BTreeMap<String, String>,
}

impl PackagingConfig {
    /// 从配置读取器加载（每次编排调用加载一次）
    pub async fn load(reader: &dyn PackagingConfigReader) -> ConfigResult<Self> {
        Ok(Self {
            enabled_packagers: reader.get_enabled_packagers().await?,
            default_package_type_id: reader.get_default_package_type_id().await?,
            shipment_package_types: reader.get_shipment_package_types().await?,
        })
    }

    pub fn with_enabled_packagers<I, S>(mut self, packagers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enabled_packagers = packagers.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_default_package_type(mut self, package_type_id: impl Into<String>) -> Self {
        self.default_package_type_id = Some(package_type_id.into());
        self
    }

    pub fn with_shipment_package_type(
        mut self,
        shipment_type: impl Into<String>,
        record_type: impl Into<String>,
    ) -> Self {
        self.shipment_package_types
            .insert(shipment_type.into(), record_type.into());
        self
    }

    /// 发货单类型对应的包裹记录类型（空字符串视为未配置）
    pub fn record_type_for(&self, shipment_type: &str) -> Option<&str> {
        self.shipment_package_types
            .get(shipment_type)
            .map(String::as_str)
            .filter(|t| !t.trim().is_empty())
    }
}

#[async_trait]
impl PackagingConfigReader for PackagingConfig {
    async fn get_enabled_packagers(&self) -> ConfigResult<Vec<String>> {
        Ok(self.enabled_packagers.clone())
    }

    async fn get_default_package_type_id(&self) -> ConfigResult<Option<String>> {
        Ok(self.default_package_type_id.clone())
    }

    async fn get_shipment_package_types(&self) -> ConfigResult<BTreeMap<String, String>> {
        Ok(self.shipment_package_types.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_type_lookup_ignores_blank() {
        let config = PackagingConfig::default()
            .with_shipment_package_type("default", "default")
            .with_shipment_package_type("freight", " ");
        assert_eq!(config.record_type_for("default"), Some("default"));
        assert_eq!(config.record_type_for("freight"), None);
        assert_eq!(config.record_type_for("missing"), None);
    }

    #[tokio::test]
    async fn test_load_from_in_memory_reader() {
        let source = PackagingConfig::default()
            .with_enabled_packagers(["manual", "all_in_one"])
            .with_default_package_type("box_m");
        let loaded = PackagingConfig::load(&source).await.unwrap();
        assert_eq!(loaded, source);
    }
}
