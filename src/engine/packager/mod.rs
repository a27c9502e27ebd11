// ==========================================
// 发货包装系统 - 打包器
// ==========================================
// 职责: 把未装箱发货项转换为待定包裹
// 契约: package_items(发货单, 记录类型, 未装箱项) -> (待定包裹, 剩余未装箱项)
// 红线: 不修改入参发货项，总是返回新构造的对象
// ==========================================

pub mod all_in_one;
pub mod individual;
pub mod manual;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::measure::{Money, Weight};
use crate::domain::package_type::PackageType;
use crate::domain::proposed_package::{ProposedShipmentPackage, ProposedShipmentPackageDefinition};
use crate::domain::shipment::Shipment;
use crate::domain::shipment_item::ShipmentItem;
use crate::domain::types::BuiltinPackager;
use crate::engine::error::PackagingResult;
use crate::repository::storage::PackagingOptionSource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

pub use all_in_one::AllInOnePackager;
pub use individual::IndividualPackager;
pub use manual::ManualPackager;

/// 打包器元信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackagerDefinition {
    pub id: String,
    pub label: String,
    pub description: String,
    /// 默认排序权重（越小越靠前）
    pub weight: i32,
}

impl From<BuiltinPackager> for PackagerDefinition {
    fn from(packager: BuiltinPackager) -> Self {
        Self {
            id: packager.as_str().to_string(),
            label: packager.label().to_string(),
            description: packager.description().to_string(),
            weight: packager.default_weight(),
        }
    }
}

/// 单个打包器的输出
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackagerOutput {
    pub packages: Vec<ProposedShipmentPackage>,
    pub unpackaged: Vec<ShipmentItem>,
}

// ==========================================
// ShipmentPackager Trait
// ==========================================
pub trait ShipmentPackager: Send + Sync {
    fn definition(&self) -> PackagerDefinition;

    /// 对未装箱发货项装箱
    ///
    /// # 参数
    /// - shipment: 发货单（已设置包装类型）
    /// - record_type: 待定包裹的记录类型
    /// - unpackaged: 未装箱发货项
    fn package_items(
        &self,
        shipment: &Shipment,
        record_type: &str,
        unpackaged: &[ShipmentItem],
    ) -> PackagingResult<PackagerOutput>;
}

/// 发货单当前包装类型（编排器保证已设置）
pub(crate) fn shipment_package_type(shipment: &Shipment) -> DomainResult<&PackageType> {
    shipment
        .package_type()
        .ok_or_else(|| DomainError::MissingProperty("package_type".to_string()))
}

/// 构造待定包裹：重量与申报价值为发货项合计
pub(crate) fn propose_package(
    shipment: &Shipment,
    record_type: &str,
    title: String,
    package_type: &PackageType,
    items: Vec<ShipmentItem>,
) -> DomainResult<ProposedShipmentPackage> {
    let mut weight: Option<Weight> = None;
    let mut declared_value: Option<Money> = None;
    for item in &items {
        weight = Some(match weight {
            None => *item.weight(),
            Some(total) => total.add(item.weight()),
        });
        declared_value = Some(match declared_value {
            None => item.declared_value().clone(),
            Some(total) => total.add(item.declared_value())?,
        });
    }

    ProposedShipmentPackage::new(ProposedShipmentPackageDefinition {
        record_type: Some(record_type.to_string()),
        shipment_id: Some(shipment.id.clone()),
        title: Some(title),
        items,
        package_type: Some(package_type.clone()),
        weight,
        declared_value,
        custom_fields: BTreeMap::new(),
    })
}

// ==========================================
// PackagerRegistry - 打包器注册表
// ==========================================
type PackagerFactory = Box<dyn Fn() -> Box<dyn ShipmentPackager> + Send + Sync>;

pub struct PackagerRegistry {
    entries: BTreeMap<String, (PackagerDefinition, PackagerFactory)>,
}

impl PackagerRegistry {
    /// 空注册表
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// 注册内置打包器
    pub fn with_defaults(option_source: Arc<dyn PackagingOptionSource>) -> Self {
        let mut registry = Self::new();
        registry.register(BuiltinPackager::AllInOne.into(), || {
            Box::new(AllInOnePackager::new())
        });
        registry.register(BuiltinPackager::Individual.into(), || {
            Box::new(IndividualPackager::new())
        });
        registry.register(BuiltinPackager::Manual.into(), move || {
            Box::new(ManualPackager::new(option_source.clone()))
        });
        registry
    }

    /// 注册（同 id 覆盖）
    pub fn register<F>(&mut self, definition: PackagerDefinition, factory: F)
    where
        F: Fn() -> Box<dyn ShipmentPackager> + Send + Sync + 'static,
    {
        self.entries
            .insert(definition.id.clone(), (definition, Box::new(factory)));
    }

    pub fn contains(&self, packager_id: &str) -> bool {
        self.entries.contains_key(packager_id)
    }

    /// 按 id 创建打包器实例
    pub fn create(&self, packager_id: &str) -> Option<Box<dyn ShipmentPackager>> {
        self.entries.get(packager_id).map(|(_, factory)| factory())
    }

    /// 全部定义（按权重、id 排序）
    pub fn definitions(&self) -> Vec<PackagerDefinition> {
        let mut definitions: Vec<PackagerDefinition> =
            self.entries.values().map(|(d, _)| d.clone()).collect();
        definitions.sort_by(|a, b| a.weight.cmp(&b.weight).then_with(|| a.id.cmp(&b.id)));
        definitions
    }
}

impl Default for PackagerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
