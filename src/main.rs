// ==========================================
// 发货包装系统 - 命令行入口
// ==========================================
// 用法:
//   shipment-packaging <shipment.json> [method.json]
//   shipment-packaging import-package-types <types.csv>
// 输出: stdout 为 JSON 结果，stderr 为日志与用户提示
// ==========================================

use anyhow::{bail, Context};
use std::path::Path;

use shipment_packaging::app::{get_default_db_path, AppState};
use shipment_packaging::engine::{ConfiguredShippingMethod, PackagingShippingMethod};
use shipment_packaging::importer::PackageTypeCsvImporter;
use shipment_packaging::{i18n, logging, Shipment};

/// 界面语言环境变量（zh-CN / en）
const LOCALE_ENV: &str = "SHIPMENT_PACKAGING_LOCALE";

const USAGE: &str = "用法:
  shipment-packaging <shipment.json> [method.json]
  shipment-packaging import-package-types <types.csv>";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();
    if let Ok(locale) = std::env::var(LOCALE_ENV) {
        i18n::set_locale(locale.trim());
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        bail!("{}", USAGE);
    }

    tracing::info!("==================================================");
    tracing::info!("{} v{}", shipment_packaging::APP_NAME, shipment_packaging::VERSION);
    tracing::info!("==================================================");

    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);
    let state = AppState::new(db_path).map_err(anyhow::Error::msg)?;

    match args[0].as_str() {
        "import-package-types" => {
            let Some(csv_path) = args.get(1) else {
                bail!("{}", USAGE);
            };
            import_package_types(&state, Path::new(csv_path))?;
        }
        shipment_path => {
            package_shipment(&state, Path::new(shipment_path), args.get(1).map(Path::new)).await?;
        }
    }

    for notice in state.messenger.drain() {
        eprintln!("[{}] {}", notice.level, notice.text);
    }
    Ok(())
}

async fn package_shipment(
    state: &AppState,
    shipment_path: &Path,
    method_path: Option<&Path>,
) -> anyhow::Result<()> {
    let shipment: Shipment = read_json(shipment_path)?;
    let method: Option<ConfiguredShippingMethod> = method_path.map(read_json).transpose()?;

    let shipment = state
        .packaging_api
        .package_shipment(
            shipment,
            method.as_ref().map(|m| m as &dyn PackagingShippingMethod),
        )
        .await?;

    println!("{}", serde_json::to_string_pretty(&shipment)?);
    Ok(())
}

fn import_package_types(state: &AppState, csv_path: &Path) -> anyhow::Result<()> {
    let summary = PackageTypeCsvImporter::new().import_file(csv_path, &state.package_type_repo)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("无法读取文件: {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("JSON 解析失败: {}", path.display()))
}
