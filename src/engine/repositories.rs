// ==========================================
// 发货包装系统 - 引擎层存储聚合
// ==========================================
// 职责: 聚合包装引擎所需的全部存储接口
// 目标: 减少 API 层构造参数
// ==========================================

use rusqlite::Connection;
use std::sync::{Arc, Mutex};

use crate::repository::storage::{
    PackageTypeSource, PackagingOptionSource, PackagingStrategyStorage, ShipmentPackageStorage,
};
use crate::repository::{
    PackageTypeRepository, PackagingOptionRepository, PackagingStrategyRepository,
    ShipmentPackageRepository,
};

/// 包装引擎存储集合
///
/// # 包含的存储
/// - `package_types`: 包装类型目录
/// - `strategies`: 包装策略
/// - `packaging_options`: 商品包装选项（Manual 打包器）
/// - `shipment_packages`: 持久化包裹
#[derive(Clone)]
pub struct PackagingRepositories {
    pub package_types: Arc<dyn PackageTypeSource>,
    pub strategies: Arc<dyn PackagingStrategyStorage>,
    pub packaging_options: Arc<dyn PackagingOptionSource>,
    pub shipment_packages: Arc<dyn ShipmentPackageStorage>,
}

impl PackagingRepositories {
    pub fn new(
        package_types: Arc<dyn PackageTypeSource>,
        strategies: Arc<dyn PackagingStrategyStorage>,
        packaging_options: Arc<dyn PackagingOptionSource>,
        shipment_packages: Arc<dyn ShipmentPackageStorage>,
    ) -> Self {
        Self {
            package_types,
            strategies,
            packaging_options,
            shipment_packages,
        }
    }

    /// 全部仓储共享同一个 SQLite 连接
    pub fn sqlite(conn: Arc<Mutex<Connection>>) -> Self {
        Self::new(
            Arc::new(PackageTypeRepository::from_connection(conn.clone())),
            Arc::new(PackagingStrategyRepository::from_connection(conn.clone())),
            Arc::new(PackagingOptionRepository::from_connection(conn.clone())),
            Arc::new(ShipmentPackageRepository::from_connection(conn)),
        )
    }
}
