// ==========================================
// 发货包装系统 - 包裹定稿 (Finalizer)
// ==========================================
// 职责: 订单完成时把选定配送方式的待定包裹转换为持久化包裹
// 红线: 唯一写入持久化包裹列表的组件
// ==========================================
// 流程:
// 1) 读取选定配送方式（未选定时为全局键）的待定包裹；为空则不做处理
// 2) 逐个构造持久化包裹（类型不一致直接报错，此时尚未删除旧包裹）
// 3) 事务内替换发货单下的旧包裹
// 4) 挂到发货单并清空缓冲区
// ==========================================

use crate::config::PackagingConfig;
use crate::domain::shipment::{Shipment, GLOBAL_PROPOSAL_KEY};
use crate::domain::shipment_package::ShipmentPackage;
use crate::engine::error::PackagingResult;
use crate::engine::messenger::PackagingMessenger;
use crate::i18n::t_with_args;
use crate::repository::storage::ShipmentPackageStorage;
use std::sync::Arc;
use tracing::{debug, info, instrument};

pub struct PackageFinalizer {
    storage: Arc<dyn ShipmentPackageStorage>,
    messenger: Arc<dyn PackagingMessenger>,
}

impl PackageFinalizer {
    pub fn new(
        storage: Arc<dyn ShipmentPackageStorage>,
        messenger: Arc<dyn PackagingMessenger>,
    ) -> Self {
        Self { storage, messenger }
    }

    /// 定稿发货单的待定包裹
    ///
    /// 包裹记录类型取发货单类型对应的配置；未配置时沿用待定包裹自身的类型。
    ///
    /// # 错误
    /// - PackageTypeMismatch: 待定包裹类型与包裹记录类型不一致（不会删除旧包裹）
    /// - 仓储错误
    #[instrument(skip_all, fields(shipment_id = %shipment.id))]
    pub fn finalize(
        &self,
        mut shipment: Shipment,
        config: &PackagingConfig,
    ) -> PackagingResult<Shipment> {
        let key = shipment
            .shipping_method_id
            .clone()
            .unwrap_or_else(|| GLOBAL_PROPOSAL_KEY.to_string());
        let proposed = shipment.proposed_packages_for(&key)?;
        if proposed.is_empty() {
            debug!(proposal_key = %key, "无待定包裹，跳过定稿");
            return Ok(shipment);
        }

        let record_type = config.record_type_for(&shipment.shipment_type);
        let mut packages = Vec::with_capacity(proposed.len());
        for package in &proposed {
            let mut record = ShipmentPackage::new(
                record_type.unwrap_or_else(|| package.record_type()),
                Some(shipment.id.clone()),
            );
            record.populate_from_proposed(package)?;
            packages.push(record);
        }

        self.storage.replace_for_shipment(&shipment.id, &packages)?;

        let count = packages.len();
        shipment.set_packages(packages);
        shipment.clear_proposed_packages();

        info!(proposal_key = %key, packages = count, "待定包裹已定稿");
        self.messenger.add_message(&t_with_args(
            "packaging.finalized",
            &[("shipment", shipment.id.as_str()), ("count", count.to_string().as_str())],
        ));
        Ok(shipment)
    }
}
