// ==========================================
// 发货包装系统 - 商品包装选项 (PackagingOption)
// ==========================================
// 用途: Manual 打包器的输入，来自商品（可购买实体）元数据
// 红线: max = 0 在配置阶段拒绝，不留到装箱阶段
// ==========================================

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::package_type::PackageType;
use serde::{Deserialize, Serialize};

/// 包装选项: 一个目标包装类型 + 闭区间 [min, max] 件数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PackagingOptionData")]
pub struct PackagingOption {
    package_type: PackageType,
    min: u32,
    max: u32,
}

#[derive(Debug, Clone, Deserialize)]
struct PackagingOptionData {
    package_type: PackageType,
    min: u32,
    max: u32,
}

impl TryFrom<PackagingOptionData> for PackagingOption {
    type Error = DomainError;

    fn try_from(data: PackagingOptionData) -> Result<Self, Self::Error> {
        PackagingOption::new(data.package_type, data.min, data.max)
    }
}

impl PackagingOption {
    /// 创建包装选项
    ///
    /// # 错误
    /// - max = 0
    /// - min > max
    pub fn new(package_type: PackageType, min: u32, max: u32) -> DomainResult<Self> {
        if max == 0 {
            return Err(DomainError::InvalidPackagingOption(format!(
                "package_type={} 的 max 不能为 0",
                package_type.id
            )));
        }
        if min > max {
            return Err(DomainError::InvalidPackagingOption(format!(
                "package_type={} 的 min({}) 大于 max({})",
                package_type.id, min, max
            )));
        }
        Ok(Self {
            package_type,
            min,
            max,
        })
    }

    pub fn package_type(&self) -> &PackageType {
        &self.package_type
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    /// 剩余件数是否落在 [min, max] 内
    pub fn accepts(&self, quantity: u32) -> bool {
        quantity > 0 && quantity >= self.min && quantity <= self.max
    }
}

/// 按 max 降序排列（稳定排序，同 max 保持原顺序）
pub fn sort_options(options: &mut [PackagingOption]) {
    options.sort_by(|a, b| b.max.cmp(&a.max));
}
