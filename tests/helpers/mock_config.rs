// ==========================================
// Mock 配置实现 - 用于集成测试
// ==========================================

use async_trait::async_trait;
use shipment_packaging::config::{ConfigResult, PackagingConfigReader};
use std::collections::BTreeMap;

/// Mock 配置结构
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub enabled_packagers: Vec<String>,
    pub default_package_type_id: Option<String>,
    pub shipment_package_types: BTreeMap<String, String>,
    /// 为 true 时所有读取都返回错误
    pub unavailable: bool,
}

impl MockConfig {
    /// 创建默认配置: default → default，默认包装类型 box_m，不启用打包器
    pub fn default() -> Self {
        let mut shipment_package_types = BTreeMap::new();
        shipment_package_types.insert("default".to_string(), "default".to_string());
        Self {
            enabled_packagers: Vec::new(),
            default_package_type_id: Some("box_m".to_string()),
            shipment_package_types,
            unavailable: false,
        }
    }

    /// 指定启用的打包器
    pub fn with_packagers(packagers: &[&str]) -> Self {
        let mut config = Self::default();
        config.enabled_packagers = packagers.iter().map(|p| p.to_string()).collect();
        config
    }

    /// 未配置包裹记录类型
    pub fn without_record_types() -> Self {
        let mut config = Self::default();
        config.shipment_package_types.clear();
        config
    }

    /// 配置源不可用
    pub fn unavailable() -> Self {
        let mut config = Self::default();
        config.unavailable = true;
        config
    }

    fn check(&self) -> ConfigResult<()> {
        if self.unavailable {
            return Err("配置源不可用".into());
        }
        Ok(())
    }
}

#[async_trait]
impl PackagingConfigReader for MockConfig {
    async fn get_enabled_packagers(&self) -> ConfigResult<Vec<String>> {
        self.check()?;
        Ok(self.enabled_packagers.clone())
    }

    async fn get_default_package_type_id(&self) -> ConfigResult<Option<String>> {
        self.check()?;
        Ok(self.default_package_type_id.clone())
    }

    async fn get_shipment_package_types(&self) -> ConfigResult<BTreeMap<String, String>> {
        self.check()?;
        Ok(self.shipment_package_types.clone())
    }
}
