// ==========================================
// 发货包装系统 - 包装策略 (PackagingStrategy)
// ==========================================
// 用途: 命名的、有序的打包器清单 + 默认包装类型
// 规则: 有效顺序 = 启用项按 weight 升序（同 weight 保持声明顺序）
// ==========================================

use crate::domain::package_type::PackageType;
use serde::{Deserialize, Serialize};

/// 打包器条目（策略/配送方式覆写中的一行）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackagerEntry {
    pub packager_id: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub weight: i32,
}

fn default_enabled() -> bool {
    true
}

impl PackagerEntry {
    pub fn enabled(packager_id: impl Into<String>, weight: i32) -> Self {
        Self {
            packager_id: packager_id.into(),
            enabled: true,
            weight,
        }
    }

    pub fn disabled(packager_id: impl Into<String>, weight: i32) -> Self {
        Self {
            packager_id: packager_id.into(),
            enabled: false,
            weight,
        }
    }
}

/// 计算有效打包器顺序
///
/// sort_by_key 为稳定排序，同 weight 保持声明顺序。
pub fn effective_packager_ids(entries: &[PackagerEntry]) -> Vec<String> {
    let mut enabled: Vec<&PackagerEntry> = entries.iter().filter(|e| e.enabled).collect();
    enabled.sort_by_key(|e| e.weight);
    enabled.into_iter().map(|e| e.packager_id.clone()).collect()
}

/// 包装策略
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackagingStrategy {
    pub id: String,
    pub label: String,
    pub default_package_type: PackageType,
    #[serde(default)]
    pub packagers: Vec<PackagerEntry>,
}

impl PackagingStrategy {
    /// 有效打包器 id 列表（已过滤禁用项并排序）
    pub fn shipment_packager_ids(&self) -> Vec<String> {
        effective_packager_ids(&self.packagers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_order_by_weight_then_declaration() {
        let entries = vec![
            PackagerEntry::enabled("manual", 5),
            PackagerEntry::disabled("individual", -10),
            PackagerEntry::enabled("all_in_one", 10),
            PackagerEntry::enabled("custom_a", 5),
            PackagerEntry::enabled("custom_b", 0),
        ];
        assert_eq!(
            effective_packager_ids(&entries),
            vec!["custom_b", "manual", "custom_a", "all_in_one"]
        );
    }

    #[test]
    fn test_entry_enabled_defaults_to_true() {
        let entry: PackagerEntry = serde_json::from_str(r#"{"packager_id":"manual"}"#).unwrap();
        assert!(entry.enabled);
        assert_eq!(entry.weight, 0);
    }
}
