// ==========================================
// 发货包装系统 - 领域模型层
// ==========================================
// 职责: 定义值对象、实体、领域错误
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod error;
pub mod measure;
pub mod package_type;
pub mod packaging_option;
pub mod proposed_package;
pub mod shipment;
pub mod shipment_item;
pub mod shipment_package;
pub mod shipping_method;
pub mod strategy;
pub mod types;

// 重导出核心类型
pub use error::{DomainError, DomainResult};
pub use measure::{Dimensions, LengthUnit, Money, Weight, WeightUnit};
pub use package_type::{PackageType, PackageTypeCatalog};
pub use packaging_option::{sort_options, PackagingOption};
pub use proposed_package::{ProposedShipmentPackage, ProposedShipmentPackageDefinition};
pub use shipment::{
    Order, ProposalBuffer, Shipment, GLOBAL_PROPOSAL_KEY, PROPOSED_PACKAGES_KEY,
    UNPACKAGED_ITEMS_KEY,
};
pub use shipment_item::ShipmentItem;
pub use shipment_package::ShipmentPackage;
pub use shipping_method::{ShippingMethodConfiguration, ShippingMethodPackaging, ShippingRate};
pub use strategy::{effective_packager_ids, PackagerEntry, PackagingStrategy};
pub use types::{BuiltinPackager, NoticeLevel};
