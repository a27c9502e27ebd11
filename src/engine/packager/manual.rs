// ==========================================
// 发货包装系统 - 按包装选项打包器 (Manual)
// ==========================================
// 规则:
// 1) 选项按 max 降序尝试（max 最大者优先）
// 2) 剩余数量 >= max 时反复拆出 max 件装一箱
// 3) 剩余数量落在 [min, max] 时再装一箱并结束该发货项
// 4) 否则剩余数量整体交给下一个（更小的）选项
// 5) 所有选项都无法吸收的剩余，以及无包装选项的发货项，原样返回为未装箱
// ==========================================

use crate::domain::packaging_option::sort_options;
use crate::domain::shipment::Shipment;
use crate::domain::shipment_item::ShipmentItem;
use crate::domain::types::BuiltinPackager;
use crate::engine::error::PackagingResult;
use crate::engine::packager::{propose_package, PackagerDefinition, PackagerOutput, ShipmentPackager};
use crate::engine::splitter::Splitter;
use crate::repository::storage::PackagingOptionSource;
use std::sync::Arc;
use tracing::debug;

pub struct ManualPackager {
    option_source: Arc<dyn PackagingOptionSource>,
    splitter: Splitter,
}

impl ManualPackager {
    pub fn new(option_source: Arc<dyn PackagingOptionSource>) -> Self {
        Self {
            option_source,
            splitter: Splitter::new(),
        }
    }
}

impl ShipmentPackager for ManualPackager {
    fn definition(&self) -> PackagerDefinition {
        BuiltinPackager::Manual.into()
    }

    fn package_items(
        &self,
        shipment: &Shipment,
        record_type: &str,
        unpackaged: &[ShipmentItem],
    ) -> PackagingResult<PackagerOutput> {
        let mut output = PackagerOutput::default();

        for item in unpackaged {
            let mut options = self.option_source.packaging_options(item.order_item_id())?;
            if options.is_empty() {
                output.unpackaged.push(item.clone());
                continue;
            }
            sort_options(&mut options);

            let mut remaining = Some(item.clone());
            for option in &options {
                let Some(mut current) = remaining.take() else {
                    break;
                };
                let package_type = option.package_type();

                // 整箱拆出
                let mut exhausted = false;
                while current.quantity() >= option.max() {
                    let (part, rest) = self.splitter.split_off(&current, option.max())?;
                    output.packages.push(propose_package(
                        shipment,
                        record_type,
                        package_type.label.clone(),
                        package_type,
                        vec![part],
                    )?);
                    match rest {
                        Some(rest) => current = rest,
                        None => {
                            exhausted = true;
                            break;
                        }
                    }
                }
                if exhausted {
                    break;
                }

                // 尾箱
                if option.accepts(current.quantity()) {
                    output.packages.push(propose_package(
                        shipment,
                        record_type,
                        package_type.label.clone(),
                        package_type,
                        vec![current],
                    )?);
                    break;
                }

                remaining = Some(current);
            }

            if let Some(rest) = remaining {
                debug!(
                    order_item_id = %rest.order_item_id(),
                    quantity = rest.quantity(),
                    "Manual: 剩余数量无匹配包装选项"
                );
                output.unpackaged.push(rest);
            }
        }

        Ok(output)
    }
}
