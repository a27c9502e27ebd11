// ==========================================
// 发货包装系统 - 订单完成订阅者
// ==========================================
// 职责: 订单进入完成状态时定稿全部发货单的待定包裹
// 说明: 订单类型不带发货单字段（shipments = None）时不做处理
// ==========================================

use crate::config::PackagingConfig;
use crate::domain::shipment::Order;
use crate::engine::error::PackagingResult;
use crate::engine::finalizer::PackageFinalizer;
use std::sync::Arc;
use tracing::{debug, info};

pub struct CheckoutSubscriber {
    finalizer: Arc<PackageFinalizer>,
}

impl CheckoutSubscriber {
    pub fn new(finalizer: Arc<PackageFinalizer>) -> Self {
        Self { finalizer }
    }

    /// 订单完成
    ///
    /// 任一发货单定稿失败立即返回错误（已定稿的发货单保持定稿状态）。
    pub fn on_checkout_complete(
        &self,
        mut order: Order,
        config: &PackagingConfig,
    ) -> PackagingResult<Order> {
        let Some(shipments) = order.shipments.take() else {
            debug!(order_id = %order.order_id, "订单不含发货单，跳过定稿");
            return Ok(order);
        };

        let mut finalized = Vec::with_capacity(shipments.len());
        for shipment in shipments {
            finalized.push(self.finalizer.finalize(shipment, config)?);
        }

        info!(order_id = %order.order_id, shipments = finalized.len(), "订单发货单定稿完成");
        order.shipments = Some(finalized);
        Ok(order)
    }
}
