// ==========================================
// 发货包装系统 - 引擎层
// ==========================================
// 职责: 策略解析、打包器链编排、定稿、费率循环
// 红线: Engine 不拼 SQL，数据访问只经由 repository::storage 接口
// 红线: 配置缺失类问题只产生提示，数据完整性问题必须上抛
// ==========================================

pub mod checkout;
pub mod error;
pub mod finalizer;
pub mod messenger;
pub mod orchestrator;
pub mod packager;
pub mod repositories;
pub mod resolver;
pub mod shipment_manager;
pub mod shipping_method;
pub mod splitter;

// 重导出核心引擎
pub use checkout::CheckoutSubscriber;
pub use error::{PackagingError, PackagingResult};
pub use finalizer::PackageFinalizer;
pub use messenger::{InMemoryMessenger, NoOpMessenger, PackagingMessenger, PackagingNotice};
pub use orchestrator::ChainShipmentPackager;
pub use packager::{
    AllInOnePackager, IndividualPackager, ManualPackager, PackagerDefinition, PackagerOutput,
    PackagerRegistry, ShipmentPackager,
};
pub use repositories::PackagingRepositories;
pub use resolver::{
    ChainPackagingStrategyResolver, DefaultPackagingStrategyResolver, MethodOverrideResolver,
    PackagingStrategyResolver,
};
pub use shipment_manager::{RateCalculation, ShipmentManager};
pub use shipping_method::{ConfiguredShippingMethod, PackagingShippingMethod, SELECTED_SERVICE_KEY};
pub use splitter::Splitter;
