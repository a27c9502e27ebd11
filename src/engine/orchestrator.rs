// ==========================================
// 发货包装系统 - 打包编排器
// ==========================================
// 职责: 按配置依次运行打包器，产生待定包裹并写入发货单缓冲区
// 输入: 发货单 + 配送方式(可选) + 包装配置 + 包装类型目录
// 输出: 发货单（缓冲区更新）
// ==========================================
// 软失败: 未配置包裹记录类型 / 无法确定包装类型 -> 警告并原样返回
// 软失败: 打包器链结束后仍有未装箱项 -> 警告（不重试）
// ==========================================

use crate::config::PackagingConfig;
use crate::domain::package_type::{PackageType, PackageTypeCatalog};
use crate::domain::proposed_package::ProposedShipmentPackage;
use crate::domain::shipment::{Shipment, GLOBAL_PROPOSAL_KEY};
use crate::domain::strategy::PackagingStrategy;
use crate::engine::error::PackagingResult;
use crate::engine::messenger::PackagingMessenger;
use crate::engine::packager::PackagerRegistry;
use crate::engine::resolver::PackagingStrategyResolver;
use crate::engine::shipping_method::PackagingShippingMethod;
use crate::i18n::{t, t_with_args};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

// ==========================================
// ChainShipmentPackager - 打包编排器
// ==========================================
pub struct ChainShipmentPackager {
    resolver: Arc<dyn PackagingStrategyResolver>,
    registry: Arc<PackagerRegistry>,
    messenger: Arc<dyn PackagingMessenger>,
}

impl ChainShipmentPackager {
    pub fn new(
        resolver: Arc<dyn PackagingStrategyResolver>,
        registry: Arc<PackagerRegistry>,
        messenger: Arc<dyn PackagingMessenger>,
    ) -> Self {
        Self {
            resolver,
            registry,
            messenger,
        }
    }

    pub fn registry(&self) -> &PackagerRegistry {
        &self.registry
    }

    /// 解析配送方式对应的包装策略
    pub fn packaging_strategy(
        &self,
        method: &dyn PackagingShippingMethod,
        shipment: &Shipment,
    ) -> PackagingResult<Option<PackagingStrategy>> {
        self.resolver.resolve(method, shipment)
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 对发货单装箱
    ///
    /// 流程:
    /// 1) 发货单类型未配置包裹记录类型 -> 警告，原样返回
    /// 2) 发货单无包装类型时依次取：策略默认 -> 配送方式默认 -> 全局默认；均无 -> 警告，原样返回
    /// 3) 打包器列表：策略 -> 配送方式覆写 -> 全局启用列表
    /// 4) 列表为空 -> 返回
    /// 5) 依次运行打包器，未装箱项为空时提前结束
    /// 6) 仍有未装箱项 -> 警告
    /// 7) 待定包裹写入缓冲区（配送方式 id，无配送方式时为全局键）
    ///
    /// # 错误
    /// - 数据完整性错误（非法发货项、币种不一致等）直接返回
    #[instrument(skip_all, fields(
        shipment_id = %shipment.id,
        shipment_type = %shipment.shipment_type,
        method_id = method.map(|m| m.id()).unwrap_or(GLOBAL_PROPOSAL_KEY)
    ))]
    pub fn package_shipment(
        &self,
        mut shipment: Shipment,
        method: Option<&dyn PackagingShippingMethod>,
        config: &PackagingConfig,
        catalog: &PackageTypeCatalog,
    ) -> PackagingResult<Shipment> {
        // 1. 包裹记录类型
        let Some(record_type) = config.record_type_for(&shipment.shipment_type) else {
            warn!(shipment_type = %shipment.shipment_type, "发货单类型未配置包裹记录类型，跳过装箱");
            self.messenger.add_warning(&t_with_args(
                "packaging.missing_record_type",
                &[("type", shipment.shipment_type.as_str())],
            ));
            return Ok(shipment);
        };

        let strategy = match method {
            Some(method) => self.resolver.resolve(method, &shipment)?,
            None => None,
        };

        // 2. 包装类型
        if shipment.package_type().is_none() {
            match self.select_package_type(strategy.as_ref(), method, config, catalog) {
                Some(package_type) => shipment.set_package_type(package_type),
                None => {
                    warn!("无法确定包装类型，跳过装箱");
                    self.messenger.add_warning(&t_with_args(
                        "packaging.missing_package_type",
                        &[("shipment", shipment.id.as_str())],
                    ));
                    return Ok(shipment);
                }
            }
        }

        // 3. 打包器列表
        let packager_ids = Self::select_packager_ids(strategy.as_ref(), method, config);
        if packager_ids.is_empty() {
            debug!("无启用的打包器");
            return Ok(shipment);
        }

        // 4. 依次运行
        let mut packaged: Vec<ProposedShipmentPackage> = Vec::new();
        let mut unpackaged = shipment.items().to_vec();
        for packager_id in &packager_ids {
            if unpackaged.is_empty() {
                break;
            }
            let Some(packager) = self.registry.create(packager_id) else {
                warn!(packager_id = %packager_id, "未知打包器，已跳过");
                self.messenger.add_warning(&t_with_args(
                    "packaging.unknown_packager",
                    &[("packager", packager_id.as_str())],
                ));
                continue;
            };

            let output = packager.package_items(&shipment, record_type, &unpackaged)?;
            debug!(
                packager_id = %packager_id,
                produced = output.packages.len(),
                remaining = output.unpackaged.len(),
                "打包器执行完成"
            );
            packaged.extend(output.packages);
            unpackaged = output.unpackaged;
        }

        if !unpackaged.is_empty() {
            warn!(remaining = unpackaged.len(), "并非所有发货项都已装箱");
            self.messenger.add_warning(&t("packaging.not_all_items_packaged"));
        }

        // 5. 写入缓冲区
        let key = method.map(|m| m.id()).unwrap_or(GLOBAL_PROPOSAL_KEY);
        info!(
            packages = packaged.len(),
            unpackaged = unpackaged.len(),
            proposal_key = %key,
            "装箱完成"
        );
        shipment.set_proposed_packages(key, packaged)?;
        shipment.set_unpackaged_items(key, unpackaged)?;

        Ok(shipment)
    }

    fn select_package_type(
        &self,
        strategy: Option<&PackagingStrategy>,
        method: Option<&dyn PackagingShippingMethod>,
        config: &PackagingConfig,
        catalog: &PackageTypeCatalog,
    ) -> Option<PackageType> {
        if let Some(strategy) = strategy {
            return Some(strategy.default_package_type.clone());
        }
        if let Some(package_type) = method.and_then(|m| m.default_package_type()) {
            return Some(package_type.clone());
        }

        let id = config.default_package_type_id.as_deref()?;
        let found = catalog.get(id).cloned();
        if found.is_none() {
            warn!(package_type_id = %id, "全局默认包装类型不在目录中");
        }
        found
    }

    fn select_packager_ids(
        strategy: Option<&PackagingStrategy>,
        method: Option<&dyn PackagingShippingMethod>,
        config: &PackagingConfig,
    ) -> Vec<String> {
        if let Some(strategy) = strategy {
            return strategy.shipment_packager_ids();
        }
        match method {
            Some(method) if method.has_custom_packaging() => method.packaging().custom_packager_ids(),
            _ => config.enabled_packagers.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::measure::{Dimensions, LengthUnit, Money, Weight, WeightUnit};
    use crate::domain::shipment_item::ShipmentItem;
    use crate::domain::shipping_method::{ShippingMethodConfiguration, ShippingMethodPackaging};
    use crate::domain::strategy::PackagerEntry;
    use crate::engine::messenger::InMemoryMessenger;
    use crate::engine::resolver::{ChainPackagingStrategyResolver, DefaultPackagingStrategyResolver};
    use crate::engine::shipping_method::ConfiguredShippingMethod;
    use crate::repository::memory::{InMemoryPackagingOptions, InMemoryStrategyStorage};

    fn box_type(id: &str, label: &str) -> PackageType {
        PackageType::new(
            id,
            label,
            Dimensions::new(30.0, 30.0, 30.0, LengthUnit::Cm),
            Weight::new(200.0, WeightUnit::G),
        )
    }

    fn setup(storage: InMemoryStrategyStorage) -> (ChainShipmentPackager, InMemoryMessenger) {
        let messenger = InMemoryMessenger::new();
        let mut chain = ChainPackagingStrategyResolver::default();
        chain.add_resolver(Arc::new(DefaultPackagingStrategyResolver::new(Arc::new(storage))));
        let packager = ChainShipmentPackager::new(
            Arc::new(chain),
            Arc::new(PackagerRegistry::with_defaults(Arc::new(InMemoryPackagingOptions::new()))),
            Arc::new(messenger.clone()),
        );
        (packager, messenger)
    }

    fn shipment() -> Shipment {
        Shipment::new("s-1", "default").with_items(vec![
            ShipmentItem::new("a", "A", 2, Weight::new(1.0, WeightUnit::Kg), Money::new(10.0, "USD"))
                .unwrap(),
            ShipmentItem::new("b", "B", 1, Weight::new(0.5, WeightUnit::Kg), Money::new(4.0, "USD"))
                .unwrap(),
        ])
    }

    fn config() -> PackagingConfig {
        PackagingConfig::default()
            .with_shipment_package_type("default", "default")
            .with_default_package_type("box_m")
    }

    fn catalog() -> PackageTypeCatalog {
        [box_type("box_m", "Medium"), box_type("box_s", "Small")]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_missing_record_type_returns_unchanged() {
        let (packager, messenger) = setup(InMemoryStrategyStorage::new());
        let input = shipment();
        let config = PackagingConfig::default().with_enabled_packagers(["all_in_one"]);

        let output = packager.package_shipment(input.clone(), None, &config, &catalog()).unwrap();
        assert_eq!(output, input);
        assert_eq!(messenger.warnings().len(), 1);
    }

    #[test]
    fn test_missing_package_type_returns_unchanged() {
        let (packager, messenger) = setup(InMemoryStrategyStorage::new());
        let config = PackagingConfig::default()
            .with_shipment_package_type("default", "default")
            .with_enabled_packagers(["all_in_one"]);

        let output = packager
            .package_shipment(shipment(), None, &config, &PackageTypeCatalog::new())
            .unwrap();
        assert!(output.package_type().is_none());
        assert!(output.proposed_packages().unwrap().is_empty());
        assert_eq!(messenger.warnings().len(), 1);
    }

    #[test]
    fn test_global_chain_writes_global_key() {
        let (packager, messenger) = setup(InMemoryStrategyStorage::new());
        let config = config().with_enabled_packagers(["all_in_one"]);

        let output = packager.package_shipment(shipment(), None, &config, &catalog()).unwrap();
        assert_eq!(output.package_type().unwrap().id, "box_m");
        let packages = output.proposed_packages_for(GLOBAL_PROPOSAL_KEY).unwrap();
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].total_quantity(), 3);
        assert!(messenger.notices().is_empty());
    }

    #[test]
    fn test_empty_packager_list_leaves_buffer_empty() {
        let (packager, _messenger) = setup(InMemoryStrategyStorage::new());
        let output = packager.package_shipment(shipment(), None, &config(), &catalog()).unwrap();
        assert!(output.proposed_packages().unwrap().is_empty());
        assert_eq!(output.package_type().unwrap().id, "box_m");
    }

    #[test]
    fn test_method_override_beats_global_list() {
        let (packager, _messenger) = setup(InMemoryStrategyStorage::new());
        let mut packaging = ShippingMethodPackaging::default().with_default_package_type(box_type("box_s", "Small"));
        packaging.apply_packager_settings(false, vec![PackagerEntry::enabled("individual", 0)]);
        let method = ConfiguredShippingMethod::new("ups", "UPS").with_packaging(packaging);
        let config = config().with_enabled_packagers(["all_in_one"]);

        let output = packager
            .package_shipment(shipment(), Some(&method), &config, &catalog())
            .unwrap();
        let packages = output.proposed_packages_for("ups").unwrap();
        assert_eq!(packages.len(), 3);
        assert_eq!(packages[0].title(), "Small-0");
        assert!(output.proposed_packages_for(GLOBAL_PROPOSAL_KEY).unwrap().is_empty());
    }

    #[test]
    fn test_strategy_takes_precedence() {
        let strategy = PackagingStrategy {
            id: "bulk".to_string(),
            label: "Bulk".to_string(),
            default_package_type: box_type("crate", "Crate"),
            packagers: vec![PackagerEntry::enabled("all_in_one", 0)],
        };
        let (packager, _messenger) = setup(InMemoryStrategyStorage::new().with_strategy(strategy));
        let mut packaging = ShippingMethodPackaging::new(ShippingMethodConfiguration {
            packaging_strategy: Some("bulk".to_string()),
            ..Default::default()
        });
        packaging.apply_packager_settings(false, vec![PackagerEntry::enabled("individual", 0)]);
        let method = ConfiguredShippingMethod::new("fedex", "FedEx").with_packaging(packaging);

        let output = packager
            .package_shipment(shipment(), Some(&method), &config(), &catalog())
            .unwrap();
        assert_eq!(output.package_type().unwrap().id, "crate");
        let packages = output.proposed_packages_for("fedex").unwrap();
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].title(), "Crate");
    }

    #[test]
    fn test_unknown_packager_is_skipped_and_remainder_warned() {
        let (packager, messenger) = setup(InMemoryStrategyStorage::new());
        let config = config().with_enabled_packagers(["box_fit", "manual"]);

        let output = packager.package_shipment(shipment(), None, &config, &catalog()).unwrap();
        assert!(output.proposed_packages_for(GLOBAL_PROPOSAL_KEY).unwrap().is_empty());
        assert_eq!(output.unpackaged_items_for(GLOBAL_PROPOSAL_KEY).unwrap().len(), 2);
        assert_eq!(messenger.warnings().len(), 2);
        // 发货项本身不变
        assert_eq!(output.items(), shipment().items());
    }

    #[test]
    fn test_repackaging_is_idempotent() {
        let (packager, _messenger) = setup(InMemoryStrategyStorage::new());
        let config = config().with_enabled_packagers(["individual"]);

        let first = packager.package_shipment(shipment(), None, &config, &catalog()).unwrap();
        let second = packager.package_shipment(first.clone(), None, &config, &catalog()).unwrap();
        assert_eq!(
            first.proposed_packages_for(GLOBAL_PROPOSAL_KEY).unwrap(),
            second.proposed_packages_for(GLOBAL_PROPOSAL_KEY).unwrap()
        );
    }
}
