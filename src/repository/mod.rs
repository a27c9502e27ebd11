// ==========================================
// 发货包装系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod error;
pub mod memory;
pub mod package_type_repo;
pub mod packaging_option_repo;
pub mod shipment_package_repo;
pub mod storage;
pub mod strategy_repo;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use memory::{
    InMemoryPackageTypes, InMemoryPackagingOptions, InMemoryShipmentPackages,
    InMemoryStrategyStorage,
};
pub use package_type_repo::PackageTypeRepository;
pub use packaging_option_repo::PackagingOptionRepository;
pub use shipment_package_repo::ShipmentPackageRepository;
pub use storage::{
    PackageTypeSource, PackagingOptionSource, PackagingStrategyStorage, ShipmentPackageStorage,
};
pub use strategy_repo::PackagingStrategyRepository;
