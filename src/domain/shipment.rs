// ==========================================
// 发货包装系统 - 发货单 (Shipment) / 订单 (Order)
// ==========================================
// 说明: 发货单为外部实体，这里只保留包装引擎所需的窄接口
// - 发货项列表（get/set）
// - 单个包装类型槽位
// - 任意键值元数据（待定包裹缓冲区）
// - 持久化包裹列表（仅由 Finalizer 写入）
// ==========================================

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::package_type::PackageType;
use crate::domain::proposed_package::ProposedShipmentPackage;
use crate::domain::shipment_item::ShipmentItem;
use crate::domain::shipment_package::ShipmentPackage;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// 元数据键: 待定包裹缓冲区 { method_id: [ProposedShipmentPackage] }
pub const PROPOSED_PACKAGES_KEY: &str = "proposed_shipment_packages";

/// 元数据键: 打包器链未能装箱的发货项 { method_id: [ShipmentItem] }
pub const UNPACKAGED_ITEMS_KEY: &str = "unpackaged_shipment_items";

/// 未指定配送方式时使用的缓冲区键
pub const GLOBAL_PROPOSAL_KEY: &str = "_global";

/// 按配送方式分组的待定包裹
pub type ProposalBuffer = BTreeMap<String, Vec<ProposedShipmentPackage>>;

// ==========================================
// Shipment - 发货单
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    pub id: String,
    /// 发货单类型（bundle），用于查找包裹记录类型
    #[serde(default = "default_shipment_type")]
    pub shipment_type: String,
    #[serde(default)]
    pub order_id: Option<String>,
    /// 最终选定的配送方式
    #[serde(default)]
    pub shipping_method_id: Option<String>,
    #[serde(default)]
    items: Vec<ShipmentItem>,
    #[serde(default)]
    package_type: Option<PackageType>,
    #[serde(default)]
    data: BTreeMap<String, Value>,
    #[serde(default)]
    packages: Vec<ShipmentPackage>,
}

fn default_shipment_type() -> String {
    "default".to_string()
}

impl Shipment {
    pub fn new(id: impl Into<String>, shipment_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            shipment_type: shipment_type.into(),
            order_id: None,
            shipping_method_id: None,
            items: Vec::new(),
            package_type: None,
            data: BTreeMap::new(),
            packages: Vec::new(),
        }
    }

    pub fn with_items(mut self, items: Vec<ShipmentItem>) -> Self {
        self.items = items;
        self
    }

    // ===== 发货项 =====

    pub fn items(&self) -> &[ShipmentItem] {
        &self.items
    }

    pub fn set_items(&mut self, items: Vec<ShipmentItem>) {
        self.items = items;
    }

    // ===== 包装类型 =====

    pub fn package_type(&self) -> Option<&PackageType> {
        self.package_type.as_ref()
    }

    pub fn set_package_type(&mut self, package_type: PackageType) {
        self.package_type = Some(package_type);
    }

    // ===== 元数据 =====

    pub fn get_data(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn set_data(&mut self, key: impl Into<String>, value: Value) {
        self.data.insert(key.into(), value);
    }

    // ===== 待定包裹缓冲区 =====

    /// 读取待定包裹缓冲区（不存在时返回空）
    pub fn proposed_packages(&self) -> DomainResult<ProposalBuffer> {
        match self.data.get(PROPOSED_PACKAGES_KEY) {
            None | Some(Value::Null) => Ok(ProposalBuffer::new()),
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| DomainError::MalformedProposal(e.to_string())),
        }
    }

    /// 读取指定配送方式的待定包裹
    pub fn proposed_packages_for(&self, method_key: &str) -> DomainResult<Vec<ProposedShipmentPackage>> {
        Ok(self
            .proposed_packages()?
            .remove(method_key)
            .unwrap_or_default())
    }

    /// 写入指定配送方式的待定包裹（保留其他配送方式的条目）
    pub fn set_proposed_packages(
        &mut self,
        method_key: &str,
        packages: Vec<ProposedShipmentPackage>,
    ) -> DomainResult<()> {
        let mut buffer = self.proposed_packages()?;
        buffer.insert(method_key.to_string(), packages);
        let value = serde_json::to_value(&buffer)
            .map_err(|e| DomainError::MalformedProposal(e.to_string()))?;
        self.data.insert(PROPOSED_PACKAGES_KEY.to_string(), value);
        Ok(())
    }

    /// 清空待定包裹缓冲区（连同未装箱记录）
    pub fn clear_proposed_packages(&mut self) {
        self.data.remove(PROPOSED_PACKAGES_KEY);
        self.data.remove(UNPACKAGED_ITEMS_KEY);
    }

    /// 读取指定配送方式下未装箱的发货项
    pub fn unpackaged_items_for(&self, method_key: &str) -> DomainResult<Vec<ShipmentItem>> {
        let Some(value) = self.data.get(UNPACKAGED_ITEMS_KEY) else {
            return Ok(Vec::new());
        };
        let mut map: BTreeMap<String, Vec<ShipmentItem>> = serde_json::from_value(value.clone())
            .map_err(|e| DomainError::MalformedProposal(e.to_string()))?;
        Ok(map.remove(method_key).unwrap_or_default())
    }

    /// 记录指定配送方式下未装箱的发货项（空列表时移除该条目）
    pub fn set_unpackaged_items(
        &mut self,
        method_key: &str,
        items: Vec<ShipmentItem>,
    ) -> DomainResult<()> {
        let mut map: BTreeMap<String, Vec<ShipmentItem>> = match self.data.get(UNPACKAGED_ITEMS_KEY) {
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| DomainError::MalformedProposal(e.to_string()))?,
            None => BTreeMap::new(),
        };
        if items.is_empty() {
            map.remove(method_key);
        } else {
            map.insert(method_key.to_string(), items);
        }
        if map.is_empty() {
            self.data.remove(UNPACKAGED_ITEMS_KEY);
        } else {
            let value = serde_json::to_value(&map)
                .map_err(|e| DomainError::MalformedProposal(e.to_string()))?;
            self.data.insert(UNPACKAGED_ITEMS_KEY.to_string(), value);
        }
        Ok(())
    }

    // ===== 持久化包裹 =====

    pub fn packages(&self) -> &[ShipmentPackage] {
        &self.packages
    }

    pub fn set_packages(&mut self, packages: Vec<ShipmentPackage>) {
        self.packages = packages;
    }
}

// ==========================================
// Order - 订单（仅承载发货单引用）
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    /// None 表示该订单类型不带发货单字段
    #[serde(default)]
    pub shipments: Option<Vec<Shipment>>,
}
