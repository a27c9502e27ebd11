// ==========================================
// 发货包装系统 - 发货项 (ShipmentItem)
// ==========================================
// 约束: quantity > 0
// 约束: weight / declared_value 为该数量的合计值（非单价）
// ==========================================

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::measure::{Money, Weight};
use serde::{Deserialize, Serialize};

/// 发货项（不可变值对象）
///
/// 反序列化同样经过 [`ShipmentItem::new`] 校验。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ShipmentItemData")]
pub struct ShipmentItem {
    order_item_id: String,
    title: String,
    quantity: u32,
    weight: Weight,
    declared_value: Money,
}

/// 发货项原始数据（反序列化入口）
#[derive(Debug, Clone, Deserialize)]
struct ShipmentItemData {
    order_item_id: String,
    title: String,
    quantity: u32,
    weight: Weight,
    declared_value: Money,
}

impl TryFrom<ShipmentItemData> for ShipmentItem {
    type Error = DomainError;

    fn try_from(data: ShipmentItemData) -> Result<Self, Self::Error> {
        ShipmentItem::new(
            data.order_item_id,
            data.title,
            data.quantity,
            data.weight,
            data.declared_value,
        )
    }
}

impl ShipmentItem {
    /// 创建发货项
    ///
    /// # 错误
    /// - quantity = 0
    /// - order_item_id 为空
    /// - 重量/金额不是有限值，或重量为负
    pub fn new(
        order_item_id: impl Into<String>,
        title: impl Into<String>,
        quantity: u32,
        weight: Weight,
        declared_value: Money,
    ) -> DomainResult<Self> {
        let item = Self {
            order_item_id: order_item_id.into(),
            title: title.into(),
            quantity,
            weight,
            declared_value,
        };
        item.validate()?;
        Ok(item)
    }

    /// 校验发货项结构
    pub fn validate(&self) -> DomainResult<()> {
        if self.order_item_id.trim().is_empty() {
            return Err(DomainError::InvalidShipmentItem(
                "order_item_id 为空".to_string(),
            ));
        }
        if self.quantity == 0 {
            return Err(DomainError::InvalidShipmentItem(format!(
                "order_item_id={} 数量必须大于 0",
                self.order_item_id
            )));
        }
        if !self.weight.number.is_finite() || self.weight.number < 0.0 {
            return Err(DomainError::InvalidShipmentItem(format!(
                "order_item_id={} 重量不合法: {}",
                self.order_item_id, self.weight
            )));
        }
        if !self.declared_value.number.is_finite() {
            return Err(DomainError::InvalidShipmentItem(format!(
                "order_item_id={} 申报价值不合法",
                self.order_item_id
            )));
        }
        Ok(())
    }

    pub fn order_item_id(&self) -> &str {
        &self.order_item_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn weight(&self) -> &Weight {
        &self.weight
    }

    pub fn declared_value(&self) -> &Money {
        &self.declared_value
    }

    /// 单件重量
    pub fn unit_weight(&self) -> Weight {
        self.weight.divide(f64::from(self.quantity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::measure::WeightUnit;

    #[test]
    fn test_zero_quantity_rejected() {
        let err = ShipmentItem::new(
            "1",
            "T-shirt",
            0,
            Weight::new(1.0, WeightUnit::Kg),
            Money::new(10.0, "USD"),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::InvalidShipmentItem(_)));
    }

    #[test]
    fn test_deserialize_goes_through_validation() {
        let json = r#"{
            "order_item_id": "7",
            "title": "Mug",
            "quantity": 0,
            "weight": {"number": 1.0, "unit": "kg"},
            "declared_value": {"number": 3.0, "currency_code": "USD"}
        }"#;
        assert!(serde_json::from_str::<ShipmentItem>(json).is_err());

        let ok = json.replace("\"quantity\": 0", "\"quantity\": 2");
        let item: ShipmentItem = serde_json::from_str(&ok).unwrap();
        assert_eq!(item.quantity(), 2);
        assert!((item.unit_weight().number - 0.5).abs() < 1e-9);
    }
}
