// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use shipment_packaging::domain::{
    Dimensions, LengthUnit, Money, PackageType, PackagerEntry, PackagingOption,
    PackagingStrategy, Shipment, ShipmentItem, Weight, WeightUnit,
};

// ==========================================
// ShipmentItem 构建器
// ==========================================

pub struct ItemBuilder {
    order_item_id: String,
    quantity: u32,
    unit_weight_kg: f64,
    unit_price: f64,
    currency: String,
}

impl ItemBuilder {
    pub fn new(order_item_id: &str) -> Self {
        Self {
            order_item_id: order_item_id.to_string(),
            quantity: 1,
            unit_weight_kg: 1.0,
            unit_price: 10.0,
            currency: "USD".to_string(),
        }
    }

    pub fn quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn unit_weight_kg(mut self, weight: f64) -> Self {
        self.unit_weight_kg = weight;
        self
    }

    pub fn unit_price(mut self, price: f64) -> Self {
        self.unit_price = price;
        self
    }

    pub fn currency(mut self, currency: &str) -> Self {
        self.currency = currency.to_string();
        self
    }

    pub fn build(self) -> ShipmentItem {
        let quantity = f64::from(self.quantity);
        ShipmentItem::new(
            self.order_item_id.clone(),
            format!("Product {}", self.order_item_id),
            self.quantity,
            Weight::new(self.unit_weight_kg * quantity, WeightUnit::Kg),
            Money::new(self.unit_price * quantity, self.currency),
        )
        .expect("valid shipment item")
    }
}

// ==========================================
// Shipment 构建器
// ==========================================

pub struct ShipmentBuilder {
    shipment: Shipment,
}

impl ShipmentBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            shipment: Shipment::new(id, "default"),
        }
    }

    pub fn shipment_type(mut self, shipment_type: &str) -> Self {
        self.shipment.shipment_type = shipment_type.to_string();
        self
    }

    pub fn item(mut self, item: ShipmentItem) -> Self {
        let mut items = self.shipment.items().to_vec();
        items.push(item);
        self.shipment.set_items(items);
        self
    }

    pub fn package_type(mut self, package_type: PackageType) -> Self {
        self.shipment.set_package_type(package_type);
        self
    }

    pub fn order(mut self, order_id: &str) -> Self {
        self.shipment.order_id = Some(order_id.to_string());
        self
    }

    pub fn build(self) -> Shipment {
        self.shipment
    }
}

// ==========================================
// 包装类型 / 选项 / 策略
// ==========================================

pub fn package_type(id: &str, label: &str) -> PackageType {
    PackageType::new(
        id,
        label,
        Dimensions::new(40.0, 30.0, 20.0, LengthUnit::Cm),
        Weight::new(250.0, WeightUnit::G),
    )
}

pub fn option(package_type_id: &str, min: u32, max: u32) -> PackagingOption {
    PackagingOption::new(package_type(package_type_id, &package_type_id.to_uppercase()), min, max)
        .expect("valid packaging option")
}

pub fn strategy(id: &str, default_package_type: PackageType, packagers: &[&str]) -> PackagingStrategy {
    PackagingStrategy {
        id: id.to_string(),
        label: id.to_string(),
        default_package_type,
        packagers: packagers
            .iter()
            .enumerate()
            .map(|(index, id)| PackagerEntry::enabled(*id, index as i32 * 10))
            .collect(),
    }
}
