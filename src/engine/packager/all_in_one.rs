// ==========================================
// 发货包装系统 - 全部装一箱打包器
// ==========================================
// 规则: 全部未装箱项放入一个包裹（发货单当前包装类型）
// 规则: 从不拒绝发货项，剩余未装箱项恒为空
// ==========================================

use crate::domain::shipment::Shipment;
use crate::domain::shipment_item::ShipmentItem;
use crate::domain::types::BuiltinPackager;
use crate::engine::error::PackagingResult;
use crate::engine::packager::{
    propose_package, shipment_package_type, PackagerDefinition, PackagerOutput, ShipmentPackager,
};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct AllInOnePackager;

impl AllInOnePackager {
    pub fn new() -> Self {
        Self
    }
}

impl ShipmentPackager for AllInOnePackager {
    fn definition(&self) -> PackagerDefinition {
        BuiltinPackager::AllInOne.into()
    }

    fn package_items(
        &self,
        shipment: &Shipment,
        record_type: &str,
        unpackaged: &[ShipmentItem],
    ) -> PackagingResult<PackagerOutput> {
        if unpackaged.is_empty() {
            return Ok(PackagerOutput::default());
        }

        let package_type = shipment_package_type(shipment)?;
        let package = propose_package(
            shipment,
            record_type,
            package_type.label.clone(),
            package_type,
            unpackaged.to_vec(),
        )?;

        debug!(
            shipment_id = %shipment.id,
            item_count = unpackaged.len(),
            "AllInOne: 全部发货项装入单个包裹"
        );

        Ok(PackagerOutput {
            packages: vec![package],
            unpackaged: Vec::new(),
        })
    }
}
