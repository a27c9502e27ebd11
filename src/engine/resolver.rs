// ==========================================
// 发货包装系统 - 包装策略解析器
// ==========================================
// 契约: resolve(配送方式, 发货单) -> 策略 | None
// 规则: 链式解析器按顺序调用，第一个返回策略的解析器胜出
// ==========================================

use crate::domain::shipment::Shipment;
use crate::domain::strategy::PackagingStrategy;
use crate::engine::error::PackagingResult;
use crate::engine::shipping_method::PackagingShippingMethod;
use crate::repository::storage::PackagingStrategyStorage;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

pub trait PackagingStrategyResolver: Send + Sync {
    fn resolve(
        &self,
        method: &dyn PackagingShippingMethod,
        shipment: &Shipment,
    ) -> PackagingResult<Option<PackagingStrategy>>;
}

// ==========================================
// ChainPackagingStrategyResolver
// ==========================================
#[derive(Default, Clone)]
pub struct ChainPackagingStrategyResolver {
    resolvers: Vec<Arc<dyn PackagingStrategyResolver>>,
}

impl ChainPackagingStrategyResolver {
    pub fn new(resolvers: Vec<Arc<dyn PackagingStrategyResolver>>) -> Self {
        Self { resolvers }
    }

    /// 追加解析器（排在已有解析器之后）
    pub fn add_resolver(&mut self, resolver: Arc<dyn PackagingStrategyResolver>) {
        self.resolvers.push(resolver);
    }

    pub fn resolvers(&self) -> &[Arc<dyn PackagingStrategyResolver>] {
        &self.resolvers
    }
}

impl PackagingStrategyResolver for ChainPackagingStrategyResolver {
    fn resolve(
        &self,
        method: &dyn PackagingShippingMethod,
        shipment: &Shipment,
    ) -> PackagingResult<Option<PackagingStrategy>> {
        for (index, resolver) in self.resolvers.iter().enumerate() {
            if let Some(strategy) = resolver.resolve(method, shipment)? {
                debug!(
                    method_id = %method.id(),
                    strategy_id = %strategy.id,
                    resolver_index = index,
                    "包装策略已解析"
                );
                return Ok(Some(strategy));
            }
        }
        debug!(method_id = %method.id(), "无解析器返回包装策略");
        Ok(None)
    }
}

// ==========================================
// DefaultPackagingStrategyResolver
// ==========================================
// 读取配送方式配置中的 packaging_strategy 并加载
pub struct DefaultPackagingStrategyResolver {
    storage: Arc<dyn PackagingStrategyStorage>,
}

impl DefaultPackagingStrategyResolver {
    pub fn new(storage: Arc<dyn PackagingStrategyStorage>) -> Self {
        Self { storage }
    }
}

impl PackagingStrategyResolver for DefaultPackagingStrategyResolver {
    fn resolve(
        &self,
        method: &dyn PackagingShippingMethod,
        _shipment: &Shipment,
    ) -> PackagingResult<Option<PackagingStrategy>> {
        let Some(strategy_id) = method.packaging().packaging_strategy_id() else {
            return Ok(None);
        };
        Ok(self.storage.load_strategy(strategy_id)?)
    }
}

// ==========================================
// MethodOverrideResolver
// ==========================================
// 按配送方式 id 指定策略，通常排在默认解析器之前
pub struct MethodOverrideResolver {
    storage: Arc<dyn PackagingStrategyStorage>,
    overrides: BTreeMap<String, String>,
}

impl MethodOverrideResolver {
    pub fn new(storage: Arc<dyn PackagingStrategyStorage>) -> Self {
        Self {
            storage,
            overrides: BTreeMap::new(),
        }
    }

    pub fn with_override(mut self, method_id: impl Into<String>, strategy_id: impl Into<String>) -> Self {
        self.overrides.insert(method_id.into(), strategy_id.into());
        self
    }
}

impl PackagingStrategyResolver for MethodOverrideResolver {
    fn resolve(
        &self,
        method: &dyn PackagingShippingMethod,
        _shipment: &Shipment,
    ) -> PackagingResult<Option<PackagingStrategy>> {
        match self.overrides.get(method.id()) {
            Some(strategy_id) => Ok(self.storage.load_strategy(strategy_id)?),
            None => Ok(None),
        }
    }
}
