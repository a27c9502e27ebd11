// ==========================================
// 发货包装系统 - 待定包裹 (ProposedShipmentPackage)
// ==========================================
// 职责: 打包器产出的、尚未落库的候选包裹
// 约束: 构造时校验全部必填字段；构造后不可变
// ==========================================

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::measure::{Money, Weight};
use crate::domain::package_type::PackageType;
use crate::domain::shipment_item::ShipmentItem;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// 待定包裹定义（构造入参，也是反序列化入口）
///
/// 必填: type / title / items / package_type / weight / declared_value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProposedShipmentPackageDefinition {
    #[serde(rename = "type", default)]
    pub record_type: Option<String>,
    #[serde(default)]
    pub shipment_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub items: Vec<ShipmentItem>,
    #[serde(default)]
    pub package_type: Option<PackageType>,
    #[serde(default)]
    pub weight: Option<Weight>,
    #[serde(default)]
    pub declared_value: Option<Money>,
    #[serde(default)]
    pub custom_fields: BTreeMap<String, Value>,
}

/// 待定包裹
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ProposedShipmentPackageDefinition")]
pub struct ProposedShipmentPackage {
    #[serde(rename = "type")]
    record_type: String,
    shipment_id: Option<String>,
    title: String,
    items: Vec<ShipmentItem>,
    package_type: PackageType,
    weight: Weight,
    declared_value: Money,
    custom_fields: BTreeMap<String, Value>,
}

fn require<T>(value: Option<T>, property: &str) -> DomainResult<T> {
    value.ok_or_else(|| DomainError::MissingProperty(property.to_string()))
}

fn require_text(value: Option<String>, property: &str) -> DomainResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(DomainError::MissingProperty(property.to_string())),
    }
}

impl ProposedShipmentPackage {
    /// 按定义构造待定包裹
    ///
    /// # 错误
    /// - MissingProperty: 任一必填字段缺失或为空
    /// - InvalidShipmentItem: items 中存在不合法的发货项
    pub fn new(definition: ProposedShipmentPackageDefinition) -> DomainResult<Self> {
        let record_type = require_text(definition.record_type, "type")?;
        let title = require_text(definition.title, "title")?;
        if definition.items.is_empty() {
            return Err(DomainError::MissingProperty("items".to_string()));
        }
        let package_type = require(definition.package_type, "package_type")?;
        let weight = require(definition.weight, "weight")?;
        let declared_value = require(definition.declared_value, "declared_value")?;

        for item in &definition.items {
            item.validate()?;
        }

        Ok(Self {
            record_type,
            shipment_id: definition.shipment_id,
            title,
            items: definition.items,
            package_type,
            weight,
            declared_value,
            custom_fields: definition.custom_fields,
        })
    }

    /// 包裹记录类型（对应持久化包裹的 bundle）
    pub fn record_type(&self) -> &str {
        &self.record_type
    }

    pub fn shipment_id(&self) -> Option<&str> {
        self.shipment_id.as_deref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn items(&self) -> &[ShipmentItem] {
        &self.items
    }

    pub fn package_type(&self) -> &PackageType {
        &self.package_type
    }

    pub fn weight(&self) -> &Weight {
        &self.weight
    }

    pub fn declared_value(&self) -> &Money {
        &self.declared_value
    }

    pub fn custom_fields(&self) -> &BTreeMap<String, Value> {
        &self.custom_fields
    }

    /// 包裹内件数合计
    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(ShipmentItem::quantity).sum()
    }
}

impl TryFrom<ProposedShipmentPackageDefinition> for ProposedShipmentPackage {
    type Error = DomainError;

    fn try_from(definition: ProposedShipmentPackageDefinition) -> Result<Self, Self::Error> {
        ProposedShipmentPackage::new(definition)
    }
}
