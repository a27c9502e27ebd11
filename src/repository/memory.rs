// ==========================================
// 发货包装系统 - 内存存储实现
// ==========================================
// 用途: 单元测试 / CLI 离线运行（不落库）
// ==========================================

use crate::domain::package_type::{PackageType, PackageTypeCatalog};
use crate::domain::packaging_option::PackagingOption;
use crate::domain::shipment_package::ShipmentPackage;
use crate::domain::strategy::PackagingStrategy;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::storage::{
    PackageTypeSource, PackagingOptionSource, PackagingStrategyStorage, ShipmentPackageStorage,
};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

fn lock<T>(mutex: &Mutex<T>) -> RepositoryResult<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|e| RepositoryError::LockError(e.to_string()))
}

// ==========================================
// InMemoryPackageTypes
// ==========================================
#[derive(Debug, Default)]
pub struct InMemoryPackageTypes {
    types: Vec<PackageType>,
}

impl InMemoryPackageTypes {
    pub fn new(types: Vec<PackageType>) -> Self {
        Self { types }
    }
}

impl PackageTypeSource for InMemoryPackageTypes {
    fn load_catalog(&self) -> RepositoryResult<PackageTypeCatalog> {
        Ok(self.types.iter().cloned().collect())
    }
}

// ==========================================
// InMemoryStrategyStorage
// ==========================================
#[derive(Debug, Default)]
pub struct InMemoryStrategyStorage {
    strategies: BTreeMap<String, PackagingStrategy>,
}

impl InMemoryStrategyStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strategy(mut self, strategy: PackagingStrategy) -> Self {
        self.strategies.insert(strategy.id.clone(), strategy);
        self
    }
}

impl PackagingStrategyStorage for InMemoryStrategyStorage {
    fn load_strategy(&self, strategy_id: &str) -> RepositoryResult<Option<PackagingStrategy>> {
        Ok(self.strategies.get(strategy_id).cloned())
    }
}

// ==========================================
// InMemoryPackagingOptions
// ==========================================
#[derive(Debug, Default)]
pub struct InMemoryPackagingOptions {
    options: BTreeMap<String, Vec<PackagingOption>>,
}

impl InMemoryPackagingOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(mut self, order_item_id: impl Into<String>, options: Vec<PackagingOption>) -> Self {
        self.options.insert(order_item_id.into(), options);
        self
    }
}

impl PackagingOptionSource for InMemoryPackagingOptions {
    fn packaging_options(&self, order_item_id: &str) -> RepositoryResult<Vec<PackagingOption>> {
        Ok(self.options.get(order_item_id).cloned().unwrap_or_default())
    }
}

// ==========================================
// InMemoryShipmentPackages
// ==========================================
#[derive(Debug, Default)]
pub struct InMemoryShipmentPackages {
    packages: Mutex<BTreeMap<String, Vec<ShipmentPackage>>>,
}

impl InMemoryShipmentPackages {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ShipmentPackageStorage for InMemoryShipmentPackages {
    fn list_by_shipment(&self, shipment_id: &str) -> RepositoryResult<Vec<ShipmentPackage>> {
        let packages = lock(&self.packages)?;
        Ok(packages.get(shipment_id).cloned().unwrap_or_default())
    }

    fn insert(&self, package: &ShipmentPackage) -> RepositoryResult<()> {
        let mut packages = lock(&self.packages)?;
        let key = package.shipment_id.clone().unwrap_or_default();
        packages.entry(key).or_default().push(package.clone());
        Ok(())
    }

    fn delete_by_shipment(&self, shipment_id: &str) -> RepositoryResult<usize> {
        let mut packages = lock(&self.packages)?;
        Ok(packages.remove(shipment_id).map(|p| p.len()).unwrap_or(0))
    }

    fn replace_for_shipment(
        &self,
        shipment_id: &str,
        new_packages: &[ShipmentPackage],
    ) -> RepositoryResult<()> {
        let mut packages = lock(&self.packages)?;
        if new_packages.is_empty() {
            packages.remove(shipment_id);
        } else {
            packages.insert(shipment_id.to_string(), new_packages.to_vec());
        }
        Ok(())
    }
}
