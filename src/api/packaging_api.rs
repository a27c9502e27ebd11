// ==========================================
// 发货包装系统 - 包装 API
// ==========================================
// 职责: 对外入口（装箱 / 定稿 / 费率 / 订单完成 / 配置校验）
// 规则: 每次调用只加载一次 PackagingConfig，随后调用同步引擎
// ==========================================

use std::sync::Arc;
use tracing::{info, instrument};

use crate::api::error::{config_error, ApiError, ApiResult};
use crate::api::validator::PackagingConfigValidator;
use crate::config::{PackagingConfig, PackagingConfigReader};
use crate::domain::package_type::PackageTypeCatalog;
use crate::domain::shipment::{Order, Shipment};
use crate::domain::shipping_method::ShippingRate;
use crate::engine::{
    ChainPackagingStrategyResolver, ChainShipmentPackager, CheckoutSubscriber,
    DefaultPackagingStrategyResolver, PackageFinalizer, PackagerDefinition, PackagerRegistry,
    PackagingMessenger, PackagingRepositories, PackagingShippingMethod, PackagingStrategyResolver,
    RateCalculation, ShipmentManager,
};

// ==========================================
// PackagingApi
// ==========================================
pub struct PackagingApi {
    config_reader: Arc<dyn PackagingConfigReader>,
    repositories: PackagingRepositories,
    registry: Arc<PackagerRegistry>,
    packager: Arc<ChainShipmentPackager>,
    finalizer: Arc<PackageFinalizer>,
    shipment_manager: ShipmentManager,
    checkout: CheckoutSubscriber,
    validator: PackagingConfigValidator,
}

impl PackagingApi {
    /// 创建 API 实例
    ///
    /// # 参数
    /// - config_reader: 全局配置读取
    /// - repositories: 存储集合
    /// - resolver: 包装策略解析器（通常为链式解析器）
    /// - messenger: 用户提示通道
    pub fn new(
        config_reader: Arc<dyn PackagingConfigReader>,
        repositories: PackagingRepositories,
        resolver: Arc<dyn PackagingStrategyResolver>,
        messenger: Arc<dyn PackagingMessenger>,
    ) -> Self {
        let registry = Arc::new(PackagerRegistry::with_defaults(
            repositories.packaging_options.clone(),
        ));
        let packager = Arc::new(ChainShipmentPackager::new(
            resolver,
            registry.clone(),
            messenger.clone(),
        ));
        let finalizer = Arc::new(PackageFinalizer::new(
            repositories.shipment_packages.clone(),
            messenger.clone(),
        ));

        Self {
            config_reader,
            repositories,
            registry: registry.clone(),
            shipment_manager: ShipmentManager::new(packager.clone(), messenger),
            checkout: CheckoutSubscriber::new(finalizer.clone()),
            validator: PackagingConfigValidator::new(registry),
            packager,
            finalizer,
        }
    }

    /// 使用默认策略解析器（只读取配送方式配置中的策略 id）
    pub fn with_default_resolver(
        config_reader: Arc<dyn PackagingConfigReader>,
        repositories: PackagingRepositories,
        messenger: Arc<dyn PackagingMessenger>,
    ) -> Self {
        let default_resolver: Arc<dyn PackagingStrategyResolver> = Arc::new(
            DefaultPackagingStrategyResolver::new(repositories.strategies.clone()),
        );
        let resolver = ChainPackagingStrategyResolver::new(vec![default_resolver]);
        Self::new(config_reader, repositories, Arc::new(resolver), messenger)
    }

    async fn load_config(&self) -> ApiResult<PackagingConfig> {
        config_error(PackagingConfig::load(self.config_reader.as_ref()).await)
    }

    fn load_catalog(&self) -> ApiResult<PackageTypeCatalog> {
        Ok(self.repositories.package_types.load_catalog()?)
    }

    /// 已注册打包器（默认排序）
    pub fn packager_definitions(&self) -> Vec<PackagerDefinition> {
        self.registry.definitions()
    }

    /// 对发货单装箱
    #[instrument(skip_all, fields(shipment_id = %shipment.id))]
    pub async fn package_shipment(
        &self,
        shipment: Shipment,
        method: Option<&dyn PackagingShippingMethod>,
    ) -> ApiResult<Shipment> {
        let config = self.load_config().await?;
        let catalog = self.load_catalog()?;
        Ok(self
            .packager
            .package_shipment(shipment, method, &config, &catalog)?)
    }

    /// 定稿发货单（选定配送方式的待定包裹）
    #[instrument(skip_all, fields(shipment_id = %shipment.id))]
    pub async fn finalize_shipment(&self, shipment: Shipment) -> ApiResult<Shipment> {
        let config = self.load_config().await?;
        Ok(self.finalizer.finalize(shipment, &config)?)
    }

    /// 计算各配送方式费率（单个配送方式失败不影响其他方式）
    #[instrument(skip_all, fields(shipment_id = %shipment.id, methods = methods.len()))]
    pub async fn calculate_rates(
        &self,
        shipment: Shipment,
        methods: &[Arc<dyn PackagingShippingMethod>],
    ) -> ApiResult<RateCalculation> {
        let config = self.load_config().await?;
        let catalog = self.load_catalog()?;
        Ok(self
            .shipment_manager
            .calculate_rates(shipment, methods, &config, &catalog))
    }

    /// 选择费率
    pub fn select_rate(
        &self,
        shipment: &mut Shipment,
        methods: &[Arc<dyn PackagingShippingMethod>],
        rate: &ShippingRate,
    ) -> ApiResult<()> {
        if self.shipment_manager.select_rate(shipment, methods, rate) {
            Ok(())
        } else {
            Err(ApiError::NotFound(format!(
                "配送方式(id={})不存在",
                rate.shipping_method_id
            )))
        }
    }

    /// 订单完成：定稿全部发货单
    #[instrument(skip_all, fields(order_id = %order.order_id))]
    pub async fn complete_checkout(&self, order: Order) -> ApiResult<Order> {
        let config = self.load_config().await?;
        let order = self.checkout.on_checkout_complete(order, &config)?;
        info!("订单完成处理结束");
        Ok(order)
    }

    /// 校验当前全局配置
    pub async fn validate_config(&self) -> ApiResult<()> {
        let config = self.load_config().await?;
        let catalog = self.load_catalog()?;
        self.validator.validate_config(&config, &catalog)
    }

    pub fn validator(&self) -> &PackagingConfigValidator {
        &self.validator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::measure::{Dimensions, LengthUnit, Money, Weight, WeightUnit};
    use crate::domain::package_type::PackageType;
    use crate::domain::shipment::GLOBAL_PROPOSAL_KEY;
    use crate::domain::shipment_item::ShipmentItem;
    use crate::engine::InMemoryMessenger;
    use crate::repository::memory::{
        InMemoryPackageTypes, InMemoryPackagingOptions, InMemoryShipmentPackages,
        InMemoryStrategyStorage,
    };
    use crate::repository::storage::ShipmentPackageStorage;

    fn api(config: PackagingConfig) -> (PackagingApi, Arc<InMemoryShipmentPackages>) {
        let packages = Arc::new(InMemoryShipmentPackages::new());
        let repositories = PackagingRepositories::new(
            Arc::new(InMemoryPackageTypes::new(vec![PackageType::new(
                "box",
                "Box",
                Dimensions::new(10.0, 10.0, 10.0, LengthUnit::Cm),
                Weight::new(100.0, WeightUnit::G),
            )])),
            Arc::new(InMemoryStrategyStorage::new()),
            Arc::new(InMemoryPackagingOptions::new()),
            packages.clone(),
        );
        (
            PackagingApi::with_default_resolver(
                Arc::new(config),
                repositories,
                Arc::new(InMemoryMessenger::new()),
            ),
            packages,
        )
    }

    fn shipment() -> Shipment {
        Shipment::new("s-1", "default").with_items(vec![ShipmentItem::new(
            "a",
            "A",
            2,
            Weight::new(2.0, WeightUnit::Kg),
            Money::new(8.0, "USD"),
        )
        .unwrap()])
    }

    #[tokio::test]
    async fn test_package_then_finalize() {
        let config = PackagingConfig::default()
            .with_shipment_package_type("default", "default")
            .with_default_package_type("box")
            .with_enabled_packagers(["all_in_one"]);
        let (api, storage) = api(config);

        let packaged = api.package_shipment(shipment(), None).await.unwrap();
        assert_eq!(packaged.proposed_packages_for(GLOBAL_PROPOSAL_KEY).unwrap().len(), 1);

        let finalized = api.finalize_shipment(packaged).await.unwrap();
        assert_eq!(finalized.packages().len(), 1);
        assert!(finalized.proposed_packages().unwrap().is_empty());
        assert_eq!(storage.list_by_shipment("s-1").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_validate_config_rejects_unknown_packager() {
        let config = PackagingConfig::default().with_enabled_packagers(["box_fit"]);
        let (api, _storage) = api(config);
        let err = api.validate_config().await.unwrap_err();
        assert!(matches!(err, ApiError::ConfigValidationError { .. }));
        assert_eq!(api.packager_definitions().len(), 3);
    }
}
