// ==========================================
// 发货包装系统 - 费率计算循环
// ==========================================
// 职责: 对每个配送方式装箱后计算费率，汇总排序
// 规则: 单个配送方式失败只记录日志并跳过，不影响其他配送方式
// 规则: 费率按金额升序；同 id 的费率后者覆盖前者
// ==========================================

use crate::config::PackagingConfig;
use crate::domain::package_type::PackageTypeCatalog;
use crate::domain::shipment::Shipment;
use crate::domain::shipping_method::ShippingRate;
use crate::engine::error::PackagingResult;
use crate::engine::messenger::PackagingMessenger;
use crate::engine::orchestrator::ChainShipmentPackager;
use crate::engine::shipping_method::PackagingShippingMethod;
use crate::i18n::t_with_args;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// 费率计算结果
#[derive(Debug, Clone, PartialEq)]
pub struct RateCalculation {
    /// 写入了各配送方式待定包裹的发货单
    pub shipment: Shipment,
    /// 按金额升序的费率
    pub rates: Vec<ShippingRate>,
}

impl RateCalculation {
    pub fn find_rate(&self, rate_id: &str) -> Option<&ShippingRate> {
        self.rates.iter().find(|r| r.id == rate_id)
    }
}

pub struct ShipmentManager {
    packager: Arc<ChainShipmentPackager>,
    messenger: Arc<dyn PackagingMessenger>,
}

impl ShipmentManager {
    pub fn new(packager: Arc<ChainShipmentPackager>, messenger: Arc<dyn PackagingMessenger>) -> Self {
        Self { packager, messenger }
    }

    /// 计算全部配送方式的费率
    ///
    /// 每个配送方式都从入参发货单的原始状态开始装箱，
    /// 只把该方式的待定包裹与未装箱记录合并回结果。
    #[instrument(skip_all, fields(shipment_id = %shipment.id, methods = methods.len()))]
    pub fn calculate_rates(
        &self,
        shipment: Shipment,
        methods: &[Arc<dyn PackagingShippingMethod>],
        config: &PackagingConfig,
        catalog: &PackageTypeCatalog,
    ) -> RateCalculation {
        let mut result = shipment.clone();
        let mut rates: Vec<ShippingRate> = Vec::new();

        for method in methods {
            let method = method.as_ref();
            match self.rates_for_method(&shipment, &mut result, method, config, catalog) {
                Ok(method_rates) => {
                    for rate in method_rates {
                        match rates.iter_mut().find(|r| r.id == rate.id) {
                            Some(existing) => *existing = rate,
                            None => rates.push(rate),
                        }
                    }
                }
                Err(e) => {
                    error!(method_id = %method.id(), error = %e, "配送方式费率计算失败，已跳过");
                    self.messenger.add_warning(&t_with_args(
                        "rates.calculation_failed",
                        &[("method", method.label()), ("message", e.to_string().as_str())],
                    ));
                }
            }
        }

        rates.sort_by(|a, b| a.amount.number.total_cmp(&b.amount.number));
        info!(rates = rates.len(), "费率计算完成");
        RateCalculation {
            shipment: result,
            rates,
        }
    }

    fn rates_for_method(
        &self,
        base: &Shipment,
        result: &mut Shipment,
        method: &dyn PackagingShippingMethod,
        config: &PackagingConfig,
        catalog: &PackageTypeCatalog,
    ) -> PackagingResult<Vec<ShippingRate>> {
        let mut packaged = self
            .packager
            .package_shipment(base.clone(), Some(method), config, catalog)?;
        method.before_rate_calculation(&mut packaged)?;
        let rates = method.calculate_rates(&packaged)?;

        // 全部成功后才合并，失败的配送方式不留下缓冲区条目
        // 装箱软失败（未写入该配送方式的条目）时同样不合并
        let key = method.id();
        if let Some(packages) = packaged.proposed_packages()?.remove(key) {
            result.set_proposed_packages(key, packages)?;
            result.set_unpackaged_items(key, packaged.unpackaged_items_for(key)?)?;
        }
        Ok(rates)
    }

    /// 选中费率：调用对应配送方式的钩子
    ///
    /// # 返回
    /// - false: 没有配送方式与费率匹配
    pub fn select_rate(
        &self,
        shipment: &mut Shipment,
        methods: &[Arc<dyn PackagingShippingMethod>],
        rate: &ShippingRate,
    ) -> bool {
        match methods.iter().find(|m| m.id() == rate.shipping_method_id) {
            Some(method) => {
                method.on_rate_selected(shipment, rate);
                info!(
                    shipment_id = %shipment.id,
                    method_id = %method.id(),
                    rate_id = %rate.id,
                    "已选择配送费率"
                );
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::measure::{Dimensions, LengthUnit, Money, Weight, WeightUnit};
    use crate::domain::package_type::PackageType;
    use crate::domain::shipment_item::ShipmentItem;
    use crate::domain::shipping_method::ShippingMethodPackaging;
    use crate::engine::error::PackagingError;
    use crate::engine::messenger::InMemoryMessenger;
    use crate::engine::packager::PackagerRegistry;
    use crate::engine::resolver::ChainPackagingStrategyResolver;
    use crate::engine::shipping_method::{ConfiguredShippingMethod, SELECTED_SERVICE_KEY};
    use crate::repository::memory::InMemoryPackagingOptions;

    /// 按包裹数计费的配送方式
    struct PerPackageMethod {
        inner: ConfiguredShippingMethod,
        price: f64,
        fail: bool,
    }

    impl PackagingShippingMethod for PerPackageMethod {
        fn id(&self) -> &str {
            self.inner.id()
        }

        fn label(&self) -> &str {
            self.inner.label()
        }

        fn packaging(&self) -> &ShippingMethodPackaging {
            self.inner.packaging()
        }

        fn calculate_rates(&self, shipment: &Shipment) -> PackagingResult<Vec<ShippingRate>> {
            if self.fail {
                return Err(PackagingError::RateCalculation {
                    method_id: self.id().to_string(),
                    message: "carrier unavailable".to_string(),
                });
            }
            let count = shipment.proposed_packages_for(self.id())?.len();
            Ok(vec![ShippingRate {
                id: format!("{}--standard", self.id()),
                shipping_method_id: self.id().to_string(),
                service: "standard".to_string(),
                amount: Money::new(self.price * count as f64, "USD"),
            }])
        }
    }

    fn method(id: &str, price: f64, fail: bool) -> Arc<dyn PackagingShippingMethod> {
        Arc::new(PerPackageMethod {
            inner: ConfiguredShippingMethod::new(id, id.to_uppercase()),
            price,
            fail,
        })
    }

    fn manager() -> (ShipmentManager, InMemoryMessenger) {
        let messenger = InMemoryMessenger::new();
        let packager = ChainShipmentPackager::new(
            Arc::new(ChainPackagingStrategyResolver::default()),
            Arc::new(PackagerRegistry::with_defaults(Arc::new(InMemoryPackagingOptions::new()))),
            Arc::new(messenger.clone()),
        );
        (
            ShipmentManager::new(Arc::new(packager), Arc::new(messenger.clone())),
            messenger,
        )
    }

    fn fixture() -> (Shipment, PackagingConfig, PackageTypeCatalog) {
        let shipment = Shipment::new("s-1", "default").with_items(vec![ShipmentItem::new(
            "a",
            "A",
            3,
            Weight::new(3.0, WeightUnit::Kg),
            Money::new(30.0, "USD"),
        )
        .unwrap()]);
        let config = PackagingConfig::default()
            .with_shipment_package_type("default", "default")
            .with_default_package_type("box")
            .with_enabled_packagers(["individual"]);
        let catalog = [PackageType::new(
            "box",
            "Box",
            Dimensions::new(20.0, 20.0, 20.0, LengthUnit::Cm),
            Weight::new(150.0, WeightUnit::G),
        )]
        .into_iter()
        .collect();
        (shipment, config, catalog)
    }

    #[test]
    fn test_rates_sorted_and_failures_isolated() {
        let (manager, messenger) = manager();
        let (shipment, config, catalog) = fixture();
        let methods = vec![method("ups", 5.0, false), method("dhl", 9.0, true), method("usps", 2.0, false)];

        let result = manager.calculate_rates(shipment, &methods, &config, &catalog);
        let ids: Vec<&str> = result.rates.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["usps--standard", "ups--standard"]);
        assert!((result.rates[1].amount.number - 15.0).abs() < 1e-9);

        assert_eq!(result.shipment.proposed_packages_for("ups").unwrap().len(), 3);
        assert!(result.shipment.proposed_packages_for("dhl").unwrap().is_empty());
        let warnings = messenger.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("DHL"));
    }

    #[test]
    fn test_soft_failed_packaging_leaves_no_buffer_entry() {
        let (manager, messenger) = manager();
        let (shipment, _config, catalog) = fixture();
        // 未配置包裹记录类型: 装箱跳过，但费率仍可计算
        let config = PackagingConfig::default()
            .with_default_package_type("box")
            .with_enabled_packagers(["individual"]);

        let result = manager.calculate_rates(shipment, &[method("ups", 5.0, false)], &config, &catalog);
        assert_eq!(result.rates.len(), 1);
        assert!(!result.shipment.proposed_packages().unwrap().contains_key("ups"));
        assert!(result.shipment.unpackaged_items_for("ups").unwrap().is_empty());
        assert_eq!(messenger.warnings().len(), 1);
    }

    #[test]
    fn test_select_rate_records_method() {
        let (manager, _messenger) = manager();
        let (shipment, config, catalog) = fixture();
        let methods = vec![method("ups", 5.0, false)];

        let mut result = manager.calculate_rates(shipment, &methods, &config, &catalog);
        let rate = result.find_rate("ups--standard").cloned().unwrap();
        assert!(manager.select_rate(&mut result.shipment, &methods, &rate));
        assert_eq!(result.shipment.shipping_method_id.as_deref(), Some("ups"));
        assert!(result.shipment.get_data(SELECTED_SERVICE_KEY).is_some());

        let stray = ShippingRate {
            shipping_method_id: "fedex".to_string(),
            ..rate
        };
        assert!(!manager.select_rate(&mut result.shipment, &methods, &stray));
    }
}
