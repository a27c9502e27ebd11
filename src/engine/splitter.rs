// ==========================================
// 发货包装系统 - 发货项拆分
// ==========================================
// 规则: 拆分后保持单件重量 / 单件申报价值不变
// 规则: split_off 的剩余部分 = 原值 - 拆出部分（合计守恒）
// ==========================================

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::measure::{Money, Weight};
use crate::domain::shipment_item::ShipmentItem;

// ==========================================
// Splitter - 无状态拆分器
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct Splitter;

impl Splitter {
    pub fn new() -> Self {
        Self
    }

    /// 按新数量构造发货项（重量与申报价值按比例缩放）
    ///
    /// # 错误
    /// - InvalidQuantity: new_quantity = 0
    pub fn split(&self, item: &ShipmentItem, new_quantity: u32) -> DomainResult<ShipmentItem> {
        if new_quantity == 0 {
            return Err(DomainError::InvalidQuantity(format!(
                "order_item_id={} 的拆分数量不能为 0",
                item.order_item_id()
            )));
        }
        let ratio = f64::from(new_quantity) / f64::from(item.quantity());

        ShipmentItem::new(
            item.order_item_id(),
            item.title(),
            new_quantity,
            item.weight().multiply(ratio),
            item.declared_value().multiply(ratio),
        )
    }

    /// 从发货项拆出 quantity 件
    ///
    /// # 返回
    /// - (拆出部分, 剩余部分)；quantity >= 原数量时剩余为 None，拆出部分即原发货项
    pub fn split_off(
        &self,
        item: &ShipmentItem,
        quantity: u32,
    ) -> DomainResult<(ShipmentItem, Option<ShipmentItem>)> {
        if quantity >= item.quantity() {
            return Ok((item.clone(), None));
        }

        let part = self.split(item, quantity)?;
        let rest_weight = clamp_non_negative(item.weight().subtract(part.weight()));
        let rest_value: Money = item.declared_value().subtract(part.declared_value())?;
        let rest = ShipmentItem::new(
            item.order_item_id(),
            item.title(),
            item.quantity() - part.quantity(),
            rest_weight,
            rest_value,
        )?;
        Ok((part, Some(rest)))
    }

    /// 拆分为 N 个单件发货项
    pub fn split_into_units(&self, item: &ShipmentItem) -> DomainResult<Vec<ShipmentItem>> {
        (0..item.quantity()).map(|_| self.split(item, 1)).collect()
    }
}

// 浮点误差导致的负值或近零值统一归零
fn clamp_non_negative(weight: Weight) -> Weight {
    if weight.number < 0.0 || weight.is_zero() {
        Weight::zero(weight.unit)
    } else {
        weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::measure::WeightUnit;

    fn item(quantity: u32, grams: f64, value: f64) -> ShipmentItem {
        ShipmentItem::new(
            "oi-1",
            "Widget",
            quantity,
            Weight::new(grams, WeightUnit::G),
            Money::new(value, "USD"),
        )
        .unwrap()
    }

    #[test]
    fn test_split_keeps_unit_rate() {
        let splitter = Splitter::new();
        let part = splitter.split(&item(4, 400.0, 20.0), 3).unwrap();
        assert_eq!(part.quantity(), 3);
        assert!(part.weight().approx_eq(&Weight::new(300.0, WeightUnit::G)));
        assert!(part.declared_value().approx_eq(&Money::new(15.0, "USD")));
    }

    #[test]
    fn test_split_zero_quantity_rejected() {
        let err = Splitter::new().split(&item(4, 400.0, 20.0), 0).unwrap_err();
        assert!(matches!(err, DomainError::InvalidQuantity(_)));

        let err = Splitter::new().split_off(&item(4, 400.0, 20.0), 0).unwrap_err();
        assert!(matches!(err, DomainError::InvalidQuantity(_)));
    }

    #[test]
    fn test_split_off_conserves_totals() {
        let original = item(3, 100.0, 10.0);
        let (part, rest) = Splitter::new().split_off(&original, 1).unwrap();
        let rest = rest.unwrap();

        assert_eq!(part.quantity() + rest.quantity(), 3);
        assert!(part
            .weight()
            .add(rest.weight())
            .approx_eq(original.weight()));
        assert!(part
            .declared_value()
            .add(rest.declared_value())
            .unwrap()
            .approx_eq(original.declared_value()));
    }

    #[test]
    fn test_split_off_whole_item() {
        let original = item(2, 100.0, 10.0);
        let (part, rest) = Splitter::new().split_off(&original, 5).unwrap();
        assert_eq!(part, original);
        assert!(rest.is_none());
    }

    #[test]
    fn test_split_into_units() {
        let units = Splitter::new().split_into_units(&item(3, 90.0, 9.0)).unwrap();
        assert_eq!(units.len(), 3);
        assert!(units.iter().all(|u| u.quantity() == 1));
        assert!(units[0].weight().approx_eq(&Weight::new(30.0, WeightUnit::G)));
    }
}
