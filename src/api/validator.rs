// ==========================================
// 发货包装系统 - 包装配置校验器
// ==========================================
// 职责: 保存配置前的前置校验（运行期只告警跳过，这里直接拒绝）
// 规则:
// - 打包器 id 必须已注册，且不可重复
// - 包装选项 max > 0 且 min <= max，包装类型必须在目录中
// - 策略 / 全局默认包装类型必须在目录中
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult, ValidationViolation};
use crate::config::PackagingConfig;
use crate::domain::package_type::PackageTypeCatalog;
use crate::domain::packaging_option::PackagingOption;
use crate::domain::strategy::{PackagerEntry, PackagingStrategy};
use crate::engine::packager::PackagerRegistry;
use crate::i18n::t_with_args;

pub const VIOLATION_UNKNOWN_PACKAGER: &str = "UNKNOWN_PACKAGER";
pub const VIOLATION_DUPLICATE_PACKAGER: &str = "DUPLICATE_PACKAGER";
pub const VIOLATION_INVALID_OPTION: &str = "INVALID_OPTION";
pub const VIOLATION_UNKNOWN_PACKAGE_TYPE: &str = "UNKNOWN_PACKAGE_TYPE";

/// 包装选项原始输入（包装类型按 id 引用）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackagingOptionInput {
    pub package_type_id: String,
    #[serde(default)]
    pub min: u32,
    pub max: u32,
}

// ==========================================
// PackagingConfigValidator
// ==========================================
pub struct PackagingConfigValidator {
    registry: Arc<PackagerRegistry>,
}

impl PackagingConfigValidator {
    pub fn new(registry: Arc<PackagerRegistry>) -> Self {
        Self { registry }
    }

    /// 校验打包器 id 列表
    pub fn check_packager_ids(&self, packager_ids: &[String]) -> Vec<ValidationViolation> {
        let mut violations = Vec::new();
        let mut seen = HashSet::new();
        for id in packager_ids {
            if !self.registry.contains(id) {
                violations.push(violation(
                    VIOLATION_UNKNOWN_PACKAGER,
                    id,
                    t_with_args("validation.unknown_packager", &[("packager", id.as_str())]),
                ));
            } else if !seen.insert(id.as_str()) {
                violations.push(violation(
                    VIOLATION_DUPLICATE_PACKAGER,
                    id,
                    t_with_args("validation.duplicate_packager", &[("packager", id.as_str())]),
                ));
            }
        }
        violations
    }

    /// 校验打包器条目（含禁用条目）
    pub fn check_packager_entries(&self, entries: &[PackagerEntry]) -> Vec<ValidationViolation> {
        let ids: Vec<String> = entries.iter().map(|e| e.packager_id.clone()).collect();
        self.check_packager_ids(&ids)
    }

    /// 校验全局配置
    pub fn check_config(
        &self,
        config: &PackagingConfig,
        catalog: &PackageTypeCatalog,
    ) -> Vec<ValidationViolation> {
        let mut violations = self.check_packager_ids(&config.enabled_packagers);
        if let Some(id) = config.default_package_type_id.as_deref() {
            check_package_type(catalog, id, "default_package_type", &mut violations);
        }
        violations
    }

    /// 校验包装策略
    pub fn check_strategy(
        &self,
        strategy: &PackagingStrategy,
        catalog: &PackageTypeCatalog,
    ) -> Vec<ValidationViolation> {
        let mut violations = self.check_packager_entries(&strategy.packagers);
        check_package_type(
            catalog,
            &strategy.default_package_type.id,
            &strategy.id,
            &mut violations,
        );
        violations
    }

    /// 校验并构造订单项的包装选项
    pub fn check_options(
        &self,
        order_item_id: &str,
        inputs: &[PackagingOptionInput],
        catalog: &PackageTypeCatalog,
    ) -> (Vec<PackagingOption>, Vec<ValidationViolation>) {
        let mut options = Vec::with_capacity(inputs.len());
        let mut violations = Vec::new();
        for input in inputs {
            let Some(package_type) = catalog.get(&input.package_type_id) else {
                check_package_type(catalog, &input.package_type_id, order_item_id, &mut violations);
                continue;
            };
            match PackagingOption::new(package_type.clone(), input.min, input.max) {
                Ok(option) => options.push(option),
                Err(e) => violations.push(violation(
                    VIOLATION_INVALID_OPTION,
                    order_item_id,
                    t_with_args(
                        "validation.invalid_option",
                        &[("item", order_item_id), ("message", e.to_string().as_str())],
                    ),
                )),
            }
        }
        (options, violations)
    }

    /// 严格校验：存在违规即返回错误
    pub fn ensure(violations: Vec<ValidationViolation>) -> ApiResult<()> {
        if violations.is_empty() {
            return Ok(());
        }
        let reason = violations
            .iter()
            .map(|v| v.reason.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        Err(ApiError::ConfigValidationError { reason, violations })
    }

    pub fn validate_config(&self, config: &PackagingConfig, catalog: &PackageTypeCatalog) -> ApiResult<()> {
        Self::ensure(self.check_config(config, catalog))
    }

    pub fn validate_strategy(
        &self,
        strategy: &PackagingStrategy,
        catalog: &PackageTypeCatalog,
    ) -> ApiResult<()> {
        Self::ensure(self.check_strategy(strategy, catalog))
    }

    pub fn validate_options(
        &self,
        order_item_id: &str,
        inputs: &[PackagingOptionInput],
        catalog: &PackageTypeCatalog,
    ) -> ApiResult<Vec<PackagingOption>> {
        let (options, violations) = self.check_options(order_item_id, inputs, catalog);
        Self::ensure(violations)?;
        Ok(options)
    }
}

fn violation(violation_type: &str, subject: &str, reason: String) -> ValidationViolation {
    ValidationViolation {
        violation_type: violation_type.to_string(),
        subject: subject.to_string(),
        reason,
    }
}

fn check_package_type(
    catalog: &PackageTypeCatalog,
    package_type_id: &str,
    subject: &str,
    violations: &mut Vec<ValidationViolation>,
) {
    if !catalog.contains(package_type_id) {
        violations.push(violation(
            VIOLATION_UNKNOWN_PACKAGE_TYPE,
            subject,
            t_with_args(
                "validation.unknown_package_type",
                &[("package_type", package_type_id)],
            ),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::measure::{Dimensions, LengthUnit, Weight, WeightUnit};
    use crate::domain::package_type::PackageType;
    use crate::repository::memory::InMemoryPackagingOptions;

    fn validator() -> PackagingConfigValidator {
        PackagingConfigValidator::new(Arc::new(PackagerRegistry::with_defaults(Arc::new(
            InMemoryPackagingOptions::new(),
        ))))
    }

    fn box_type(id: &str) -> PackageType {
        PackageType::new(
            id,
            id,
            Dimensions::new(1.0, 1.0, 1.0, LengthUnit::M),
            Weight::zero(WeightUnit::Kg),
        )
    }

    fn catalog() -> PackageTypeCatalog {
        [box_type("box")].into_iter().collect()
    }

    fn types(violations: &[ValidationViolation]) -> Vec<&str> {
        violations.iter().map(|v| v.violation_type.as_str()).collect()
    }

    #[test]
    fn test_unknown_and_duplicate_packagers() {
        let config = PackagingConfig::default()
            .with_enabled_packagers(["manual", "box_fit", "manual", "all_in_one"])
            .with_default_package_type("box");
        let violations = validator().check_config(&config, &catalog());
        assert_eq!(
            types(&violations),
            vec![VIOLATION_UNKNOWN_PACKAGER, VIOLATION_DUPLICATE_PACKAGER]
        );
        assert_eq!(violations[0].subject, "box_fit");
    }

    #[test]
    fn test_valid_config_passes() {
        let config = PackagingConfig::default()
            .with_enabled_packagers(["manual", "all_in_one"])
            .with_default_package_type("box");
        assert!(validator().validate_config(&config, &catalog()).is_ok());

        let missing = config.with_default_package_type("crate");
        let err = validator().validate_config(&missing, &catalog()).unwrap_err();
        assert!(matches!(err, ApiError::ConfigValidationError { ref violations, .. } if violations.len() == 1));
    }

    #[test]
    fn test_invalid_options() {
        let inputs = vec![
            PackagingOptionInput { package_type_id: "box".to_string(), min: 1, max: 10 },
            PackagingOptionInput { package_type_id: "box".to_string(), min: 0, max: 0 },
            PackagingOptionInput { package_type_id: "box".to_string(), min: 5, max: 3 },
            PackagingOptionInput { package_type_id: "crate".to_string(), min: 1, max: 3 },
        ];
        let (options, violations) = validator().check_options("item-1", &inputs, &catalog());
        assert_eq!(options.len(), 1);
        assert_eq!(
            types(&violations),
            vec![
                VIOLATION_INVALID_OPTION,
                VIOLATION_INVALID_OPTION,
                VIOLATION_UNKNOWN_PACKAGE_TYPE
            ]
        );
    }

    #[test]
    fn test_strategy_default_type_must_exist() {
        let strategy = PackagingStrategy {
            id: "bulk".to_string(),
            label: "Bulk".to_string(),
            default_package_type: box_type("pallet"),
            packagers: vec![PackagerEntry::enabled("individual", 0)],
        };
        let violations = validator().check_strategy(&strategy, &catalog());
        assert_eq!(types(&violations), vec![VIOLATION_UNKNOWN_PACKAGE_TYPE]);
        assert_eq!(violations[0].subject, "bulk");

        let valid = PackagingStrategy {
            default_package_type: box_type("box"),
            ..strategy
        };
        assert!(validator().validate_strategy(&valid, &catalog()).is_ok());
    }

    #[test]
    fn test_validate_options_strict() {
        let inputs = vec![
            PackagingOptionInput { package_type_id: "box".to_string(), min: 1, max: 3 },
            PackagingOptionInput { package_type_id: "box".to_string(), min: 5, max: 10 },
        ];
        let options = validator()
            .validate_options("item-1", &inputs, &catalog())
            .unwrap();
        assert_eq!(options.len(), 2);

        let bad = vec![PackagingOptionInput { package_type_id: "box".to_string(), min: 0, max: 0 }];
        let err = validator().validate_options("item-1", &bad, &catalog()).unwrap_err();
        assert!(matches!(err, ApiError::ConfigValidationError { .. }));
    }
}
