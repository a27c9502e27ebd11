// ==========================================
// 发货包装系统 - 包装类型 (PackageType)
// ==========================================
// 职责: 物理包装箱描述（外部目录提供，只读）
// 红线: 本系统只按 id 引用，不修改
// ==========================================

use crate::domain::measure::{Dimensions, Weight};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 包装类型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageType {
    pub id: String,
    pub label: String,
    pub dimensions: Dimensions,
    /// 皮重（空箱重量）
    pub weight: Weight,
    /// 承重上限（可选，仅供承运商适配使用）
    #[serde(default)]
    pub max_weight: Option<Weight>,
}

impl PackageType {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        dimensions: Dimensions,
        weight: Weight,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            dimensions,
            weight,
            max_weight: None,
        }
    }

    pub fn with_max_weight(mut self, max_weight: Weight) -> Self {
        self.max_weight = Some(max_weight);
        self
    }
}

// ==========================================
// PackageTypeCatalog - 包装类型目录
// ==========================================
// 调用方在编排前一次性加载到内存
#[derive(Debug, Clone, Default)]
pub struct PackageTypeCatalog {
    types: BTreeMap<String, PackageType>,
}

impl PackageTypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, package_type: PackageType) {
        self.types.insert(package_type.id.clone(), package_type);
    }

    pub fn get(&self, id: &str) -> Option<&PackageType> {
        self.types.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.types.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl FromIterator<PackageType> for PackageTypeCatalog {
    fn from_iter<I: IntoIterator<Item = PackageType>>(iter: I) -> Self {
        let mut catalog = PackageTypeCatalog::new();
        for package_type in iter {
            catalog.insert(package_type);
        }
        catalog
    }
}
