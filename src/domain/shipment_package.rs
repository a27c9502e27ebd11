// ==========================================
// 发货包装系统 - 持久化包裹记录 (ShipmentPackage)
// ==========================================
// 职责: 订单完成时由待定包裹转换而来的持久化包裹
// 规则: 重量 = 发货项重量合计 + 包装类型皮重
// 规则: 申报价值 = 发货项申报价值合计
// ==========================================

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::measure::{Money, Weight};
use crate::domain::package_type::PackageType;
use crate::domain::proposed_package::ProposedShipmentPackage;
use crate::domain::shipment_item::ShipmentItem;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

/// 可直接写入字段的自定义属性名（其余写入 data）
pub const TRACKING_CODE_FIELD: &str = "tracking_code";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentPackage {
    pub package_id: String,
    /// 包裹记录类型（bundle）
    pub record_type: String,
    pub shipment_id: Option<String>,
    pub title: String,
    pub items: Vec<ShipmentItem>,
    /// 包装类型快照（持久化时按 id 引用）
    pub package_type: Option<PackageType>,
    pub weight: Option<Weight>,
    pub declared_value: Option<Money>,
    #[serde(default)]
    pub tracking_code: String,
    #[serde(default)]
    pub data: BTreeMap<String, Value>,
    pub created_at: DateTime<Utc>,
    pub changed_at: DateTime<Utc>,
}

impl ShipmentPackage {
    /// 创建空包裹记录
    pub fn new(record_type: impl Into<String>, shipment_id: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            package_id: Uuid::new_v4().to_string(),
            record_type: record_type.into(),
            shipment_id,
            title: String::new(),
            items: Vec::new(),
            package_type: None,
            weight: None,
            declared_value: None,
            tracking_code: String::new(),
            data: BTreeMap::new(),
            created_at: now,
            changed_at: now,
        }
    }

    /// 由待定包裹填充
    ///
    /// # 错误
    /// - PackageTypeMismatch: 待定包裹的记录类型与本记录不一致
    pub fn populate_from_proposed(&mut self, proposed: &ProposedShipmentPackage) -> DomainResult<()> {
        if proposed.record_type() != self.record_type {
            return Err(DomainError::PackageTypeMismatch {
                proposed: proposed.record_type().to_string(),
                expected: self.record_type.clone(),
            });
        }

        if let Some(shipment_id) = proposed.shipment_id() {
            self.shipment_id = Some(shipment_id.to_string());
        }
        self.title = proposed.title().to_string();
        self.items = proposed.items().to_vec();
        self.package_type = Some(proposed.package_type().clone());
        for (field, value) in proposed.custom_fields() {
            match (field.as_str(), value) {
                (TRACKING_CODE_FIELD, Value::String(code)) => self.tracking_code = code.clone(),
                _ => {
                    self.data.insert(field.clone(), value.clone());
                }
            }
        }
        self.recalculate()
    }

    pub fn package_type_id(&self) -> Option<&str> {
        self.package_type.as_ref().map(|t| t.id.as_str())
    }

    pub fn has_items(&self) -> bool {
        !self.items.is_empty()
    }

    pub fn set_items(&mut self, items: Vec<ShipmentItem>) -> DomainResult<()> {
        self.items = items;
        self.recalculate()
    }

    pub fn add_item(&mut self, item: ShipmentItem) -> DomainResult<()> {
        self.items.push(item);
        self.recalculate()
    }

    /// 移除第一个与入参相等的发货项
    pub fn remove_item(&mut self, item: &ShipmentItem) -> DomainResult<()> {
        if let Some(pos) = self.items.iter().position(|i| i == item) {
            self.items.remove(pos);
            self.recalculate()?;
        }
        Ok(())
    }

    pub fn set_package_type(&mut self, package_type: PackageType) -> DomainResult<()> {
        self.package_type = Some(package_type);
        self.recalculate()
    }

    fn recalculate(&mut self) -> DomainResult<()> {
        self.recalculate_weight();
        self.recalculate_declared_value()?;
        self.changed_at = Utc::now();
        Ok(())
    }

    /// 重算重量（无发货项时保持原值）
    fn recalculate_weight(&mut self) {
        let mut items = self.items.iter();
        let Some(first) = items.next() else {
            return;
        };
        let mut weight = items.fold(*first.weight(), |acc, item| acc.add(item.weight()));
        if let Some(package_type) = &self.package_type {
            weight = weight.add(&package_type.weight);
        }
        self.weight = Some(weight);
    }

    fn recalculate_declared_value(&mut self) -> DomainResult<()> {
        let mut total: Option<Money> = None;
        for item in &self.items {
            total = Some(match total {
                None => item.declared_value().clone(),
                Some(acc) => acc.add(item.declared_value())?,
            });
        }
        self.declared_value = total;
        Ok(())
    }
}
