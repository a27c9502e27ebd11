// ==========================================
// 发货包装系统 - 配送方式协作接口
// ==========================================
// 职责: 编排器 / 费率循环调用的配送方式接口
// 说明: 包装相关配置由嵌入的 ShippingMethodPackaging 提供
// ==========================================

use crate::domain::package_type::PackageType;
use crate::domain::shipment::Shipment;
use crate::domain::shipping_method::{ShippingMethodPackaging, ShippingRate};
use crate::engine::error::PackagingResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 选中费率后写入发货单 data 的键
pub const SELECTED_SERVICE_KEY: &str = "shipping_service";

// ==========================================
// PackagingShippingMethod Trait
// ==========================================
pub trait PackagingShippingMethod: Send + Sync {
    fn id(&self) -> &str;

    fn label(&self) -> &str;

    fn packaging(&self) -> &ShippingMethodPackaging;

    /// 计算费率（由具体配送方式实现）
    fn calculate_rates(&self, shipment: &Shipment) -> PackagingResult<Vec<ShippingRate>>;

    fn default_package_type(&self) -> Option<&PackageType> {
        self.packaging().default_package_type.as_ref()
    }

    fn has_custom_packaging(&self) -> bool {
        self.packaging().has_custom_packaging()
    }

    /// 费率计算前钩子（已完成装箱，默认不做处理）
    fn before_rate_calculation(&self, _shipment: &mut Shipment) -> PackagingResult<()> {
        Ok(())
    }

    /// 选中费率钩子：记录配送方式与服务
    fn on_rate_selected(&self, shipment: &mut Shipment, rate: &ShippingRate) {
        shipment.shipping_method_id = Some(self.id().to_string());
        shipment.set_data(SELECTED_SERVICE_KEY, Value::String(rate.service.clone()));
    }
}

// ==========================================
// ConfiguredShippingMethod - 仅含配置的配送方式
// ==========================================
// 用途: CLI / 测试；不产生费率
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfiguredShippingMethod {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub packaging: ShippingMethodPackaging,
}

impl ConfiguredShippingMethod {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            packaging: ShippingMethodPackaging::default(),
        }
    }

    pub fn with_packaging(mut self, packaging: ShippingMethodPackaging) -> Self {
        self.packaging = packaging;
        self
    }
}

impl PackagingShippingMethod for ConfiguredShippingMethod {
    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn packaging(&self) -> &ShippingMethodPackaging {
        &self.packaging
    }

    fn calculate_rates(&self, _shipment: &Shipment) -> PackagingResult<Vec<ShippingRate>> {
        Ok(Vec::new())
    }
}
