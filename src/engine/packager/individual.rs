// ==========================================
// 发货包装系统 - 逐件打包器
// ==========================================
// 规则: 数量为 N 的发货项拆为 N 个单件，每件一个包裹
// 规则: 标题为 "<包装类型名称>-<序号>"，序号在每个源发货项内从 0 开始
// ==========================================

use crate::domain::shipment::Shipment;
use crate::domain::shipment_item::ShipmentItem;
use crate::domain::types::BuiltinPackager;
use crate::engine::error::PackagingResult;
use crate::engine::packager::{
    propose_package, shipment_package_type, PackagerDefinition, PackagerOutput, ShipmentPackager,
};
use crate::engine::splitter::Splitter;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct IndividualPackager {
    splitter: Splitter,
}

impl IndividualPackager {
    pub fn new() -> Self {
        Self {
            splitter: Splitter::new(),
        }
    }
}

impl ShipmentPackager for IndividualPackager {
    fn definition(&self) -> PackagerDefinition {
        BuiltinPackager::Individual.into()
    }

    fn package_items(
        &self,
        shipment: &Shipment,
        record_type: &str,
        unpackaged: &[ShipmentItem],
    ) -> PackagingResult<PackagerOutput> {
        let mut packages = Vec::new();
        if unpackaged.is_empty() {
            return Ok(PackagerOutput::default());
        }

        let package_type = shipment_package_type(shipment)?;
        for item in unpackaged {
            let units = self.splitter.split_into_units(item)?;
            for (index, unit) in units.into_iter().enumerate() {
                let title = format!("{}-{}", package_type.label, index);
                packages.push(propose_package(
                    shipment,
                    record_type,
                    title,
                    package_type,
                    vec![unit],
                )?);
            }
        }

        debug!(
            shipment_id = %shipment.id,
            package_count = packages.len(),
            "Individual: 按件拆分完成"
        );

        Ok(PackagerOutput {
            packages,
            unpackaged: Vec::new(),
        })
    }
}
