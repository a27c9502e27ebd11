// ==========================================
// 发货包装系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use rusqlite::Connection;
use std::sync::{Arc, Mutex};

use crate::api::PackagingApi;
use crate::config::config_manager::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection};
use crate::engine::{InMemoryMessenger, PackagingRepositories};
use crate::repository::PackageTypeRepository;

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "SHIPMENT_PACKAGING_DB_PATH";

/// 应用状态
///
/// 所有仓储与配置管理器共享同一个数据库连接。
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    /// 存储集合
    pub repositories: PackagingRepositories,

    /// 包装类型仓储（目录导入写入）
    pub package_type_repo: Arc<PackageTypeRepository>,

    /// 包装API
    pub packaging_api: Arc<PackagingApi>,

    /// 用户提示（CLI 在结束时输出）
    pub messenger: InMemoryMessenger,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开数据库并建表（幂等）
    /// 2. 初始化配置管理器与全部仓储
    /// 3. 创建API实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("数据库建表失败: {}", e))?;
        let conn: Arc<Mutex<Connection>> = Arc::new(Mutex::new(conn));

        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );
        let package_type_repo = Arc::new(PackageTypeRepository::from_connection(conn.clone()));
        let repositories = PackagingRepositories::sqlite(conn);
        let messenger = InMemoryMessenger::new();

        let packaging_api = Arc::new(PackagingApi::with_default_resolver(
            config_manager.clone(),
            repositories.clone(),
            Arc::new(messenger.clone()),
        ));

        tracing::info!("AppState初始化完成");
        Ok(Self {
            db_path,
            config_manager,
            repositories,
            package_type_repo,
            packaging_api,
            messenger,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 SHIPMENT_PACKAGING_DB_PATH > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./shipment_packaging.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("shipment-packaging");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("shipment_packaging.db");
        }
    }

    path.to_string_lossy().to_string()
}
