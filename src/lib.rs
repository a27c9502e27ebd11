// ==========================================
// 发货包装系统 - 核心库
// ==========================================
// 职责: 发货单装箱（打包器链）、包装策略解析、包裹定稿
// 技术栈: Rust + SQLite
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 值对象与实体
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 装箱编排
pub mod engine;

// 导入层 - 包装类型目录
pub mod importer;

// 配置层 - 包装全局配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 共享状态
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{BuiltinPackager, NoticeLevel};

// 领域实体
pub use domain::{
    Order, PackageType, PackageTypeCatalog, PackagingOption, PackagingStrategy,
    ProposedShipmentPackage, Shipment, ShipmentItem, ShipmentPackage,
};

// 引擎
pub use engine::{
    ChainPackagingStrategyResolver, ChainShipmentPackager, CheckoutSubscriber, PackageFinalizer,
    PackagerRegistry, ShipmentManager,
};

// API
pub use api::{ApiError, PackagingApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "发货包装系统";
