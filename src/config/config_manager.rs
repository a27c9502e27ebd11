// ==========================================
// 发货包装系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// 格式: 值统一保存为 JSON 文本
// ==========================================

use crate::config::config_reader::{ConfigResult, PackagingConfigReader};
use crate::db::open_sqlite_connection;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

const GLOBAL_SCOPE: &str = "global";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    fn get_conn(&self) -> ConfigResult<MutexGuard<'_, Connection>> {
        Ok(self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?)
    }

    /// 读取 global scope 的原始配置值
    ///
    /// # 返回
    /// - Some(String): 配置值（JSON 文本）
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
                params![GLOBAL_SCOPE, key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入 global scope 的配置值（JSON 序列化）
    pub fn set_global_config_value<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> ConfigResult<()> {
        let json = serde_json::to_string(value)?;
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = excluded.value, updated_at = datetime('now')",
            params![GLOBAL_SCOPE, key, json],
        )?;
        debug!(key = %key, "配置已更新");
        Ok(())
    }

    /// 读取并反序列化配置值，不存在时返回默认值
    fn get_json_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> ConfigResult<T> {
        match self.get_global_config_value(key)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(T::default()),
        }
    }

    /// 获取所有 global 配置的快照（JSON 格式）
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = ?1 ORDER BY key")?;

        let rows = stmt.query_map(params![GLOBAL_SCOPE], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&config_map)?)
    }

    /// 从配置快照恢复配置（覆盖同名 global 配置）
    ///
    /// # 返回
    /// - Ok(usize): 恢复的配置项数量
    pub fn restore_config_from_snapshot(&self, snapshot_json: &str) -> ConfigResult<usize> {
        let config_map: BTreeMap<String, String> = serde_json::from_str(snapshot_json)?;

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let mut count = 0;
        for (key, value) in config_map.iter() {
            count += tx.execute(
                "INSERT INTO config_kv (scope_id, key, value) VALUES (?1, ?2, ?3)
                 ON CONFLICT(scope_id, key) DO UPDATE SET value = excluded.value",
                params![GLOBAL_SCOPE, key, value],
            )?;
        }

        tx.commit()?;
        Ok(count)
    }
}

#[async_trait]
impl PackagingConfigReader for ConfigManager {
    async fn get_enabled_packagers(&self) -> ConfigResult<Vec<String>> {
        self.get_json_or_default(config_keys::ENABLED_PACKAGERS)
    }

    async fn get_default_package_type_id(&self) -> ConfigResult<Option<String>> {
        let id: Option<String> = self.get_json_or_default(config_keys::DEFAULT_PACKAGE_TYPE)?;
        Ok(id.filter(|id| !id.trim().is_empty()))
    }

    async fn get_shipment_package_types(&self) -> ConfigResult<BTreeMap<String, String>> {
        self.get_json_or_default(config_keys::SHIPMENT_PACKAGE_TYPES)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 打包器
    pub const ENABLED_PACKAGERS: &str = "packaging/enabled_packagers"; // JSON 数组
    pub const DEFAULT_PACKAGE_TYPE: &str = "packaging/default_package_type";

    // 发货单类型 → 包裹记录类型 (JSON 对象)
    pub const SHIPMENT_PACKAGE_TYPES: &str = "packaging/shipment_package_types";
}
