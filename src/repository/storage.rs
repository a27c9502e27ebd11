// ==========================================
// 发货包装系统 - 存储接口 Trait
// ==========================================
// 职责: 定义引擎依赖的数据访问接口（不包含业务逻辑）
// 实现者: SQLite 仓储 / 内存实现（测试与 CLI 使用）
// ==========================================

use crate::domain::package_type::PackageTypeCatalog;
use crate::domain::packaging_option::PackagingOption;
use crate::domain::shipment_package::ShipmentPackage;
use crate::domain::strategy::PackagingStrategy;
use crate::repository::error::RepositoryResult;

// ==========================================
// PackageTypeSource - 包装类型目录
// ==========================================
pub trait PackageTypeSource: Send + Sync {
    /// 加载全部包装类型
    fn load_catalog(&self) -> RepositoryResult<PackageTypeCatalog>;
}

// ==========================================
// PackagingStrategyStorage - 包装策略存储
// ==========================================
pub trait PackagingStrategyStorage: Send + Sync {
    /// 按 id 加载策略
    ///
    /// # 返回
    /// - Ok(None): 策略不存在
    fn load_strategy(&self, strategy_id: &str) -> RepositoryResult<Option<PackagingStrategy>>;
}

// ==========================================
// ShipmentPackageStorage - 持久化包裹存储
// ==========================================
pub trait ShipmentPackageStorage: Send + Sync {
    /// 查询发货单下的全部包裹（按创建顺序）
    fn list_by_shipment(&self, shipment_id: &str) -> RepositoryResult<Vec<ShipmentPackage>>;

    /// 写入单个包裹
    fn insert(&self, package: &ShipmentPackage) -> RepositoryResult<()>;

    /// 删除发货单下的全部包裹，返回删除条数
    fn delete_by_shipment(&self, shipment_id: &str) -> RepositoryResult<usize>;

    /// 用新包裹整体替换发货单下的包裹
    ///
    /// 删除与写入在同一事务中完成，失败时保持原包裹不变。
    fn replace_for_shipment(
        &self,
        shipment_id: &str,
        packages: &[ShipmentPackage],
    ) -> RepositoryResult<()>;
}

// ==========================================
// PackagingOptionSource - 商品包装选项
// ==========================================
pub trait PackagingOptionSource: Send + Sync {
    /// 查询订单项的包装选项（无配置时返回空列表）
    fn packaging_options(&self, order_item_id: &str) -> RepositoryResult<Vec<PackagingOption>>;
}
