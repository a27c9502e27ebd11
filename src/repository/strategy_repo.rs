// ==========================================
// 发货包装系统 - 包装策略仓储
// ==========================================
// 职责: 管理 packaging_strategy 表
// 存储: 打包器列表以 JSON 保存于 packagers_json
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::strategy::{PackagerEntry, PackagingStrategy};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::package_type_repo::find_with_conn;
use crate::repository::storage::PackagingStrategyStorage;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

/// 策略行（未解析包装类型）
#[derive(Debug, Clone)]
struct StrategyRow {
    strategy_id: String,
    label: String,
    default_package_type_id: String,
    packagers_json: String,
}

pub struct PackagingStrategyRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PackagingStrategyRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 保存策略（默认包装类型需已存在于 package_type 表）
    pub fn save(&self, strategy: &PackagingStrategy) -> RepositoryResult<()> {
        let packagers_json = serde_json::to_string(&strategy.packagers)?;
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO packaging_strategy (strategy_id, label, default_package_type_id, packagers_json)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(strategy_id) DO UPDATE SET
                label = excluded.label,
                default_package_type_id = excluded.default_package_type_id,
                packagers_json = excluded.packagers_json
            "#,
            params![
                strategy.id,
                strategy.label,
                strategy.default_package_type.id,
                packagers_json
            ],
        )?;
        Ok(())
    }

    pub fn find_by_id(&self, strategy_id: &str) -> RepositoryResult<Option<PackagingStrategy>> {
        let conn = self.get_conn()?;
        let row = conn
            .query_row(
                "SELECT strategy_id, label, default_package_type_id, packagers_json \
                 FROM packaging_strategy WHERE strategy_id = ?1",
                params![strategy_id],
                |row| {
                    Ok(StrategyRow {
                        strategy_id: row.get(0)?,
                        label: row.get(1)?,
                        default_package_type_id: row.get(2)?,
                        packagers_json: row.get(3)?,
                    })
                },
            )
            .optional()?;

        match row {
            Some(row) => Ok(Some(resolve_row(&conn, row)?)),
            None => Ok(None),
        }
    }

    pub fn list_all(&self) -> RepositoryResult<Vec<PackagingStrategy>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT strategy_id, label, default_package_type_id, packagers_json \
             FROM packaging_strategy ORDER BY strategy_id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(StrategyRow {
                    strategy_id: row.get(0)?,
                    label: row.get(1)?,
                    default_package_type_id: row.get(2)?,
                    packagers_json: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(|row| resolve_row(&conn, row)).collect()
    }

    pub fn delete(&self, strategy_id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM packaging_strategy WHERE strategy_id = ?1",
            params![strategy_id],
        )?;
        Ok(affected > 0)
    }
}

impl PackagingStrategyStorage for PackagingStrategyRepository {
    fn load_strategy(&self, strategy_id: &str) -> RepositoryResult<Option<PackagingStrategy>> {
        self.find_by_id(strategy_id)
    }
}

fn resolve_row(conn: &Connection, row: StrategyRow) -> RepositoryResult<PackagingStrategy> {
    let default_package_type =
        find_with_conn(conn, &row.default_package_type_id)?.ok_or_else(|| {
            RepositoryError::NotFound {
                entity: "PackageType".to_string(),
                id: row.default_package_type_id.clone(),
            }
        })?;
    let packagers: Vec<PackagerEntry> = serde_json::from_str(&row.packagers_json)?;

    Ok(PackagingStrategy {
        id: row.strategy_id,
        label: row.label,
        default_package_type,
        packagers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{configure_sqlite_connection, init_schema};
    use crate::domain::measure::{Dimensions, LengthUnit, Weight, WeightUnit};
    use crate::domain::package_type::PackageType;
    use crate::repository::package_type_repo::PackageTypeRepository;

    fn setup() -> (PackageTypeRepository, PackagingStrategyRepository) {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        let conn = Arc::new(Mutex::new(conn));
        (
            PackageTypeRepository::from_connection(conn.clone()),
            PackagingStrategyRepository::from_connection(conn),
        )
    }

    fn envelope() -> PackageType {
        PackageType::new(
            "envelope",
            "Envelope",
            Dimensions::new(30.0, 22.0, 1.0, LengthUnit::Cm),
            Weight::new(15.0, WeightUnit::G),
        )
    }

    #[test]
    fn test_save_and_load_strategy() {
        let (types, strategies) = setup();
        types.upsert(&envelope()).unwrap();

        let strategy = PackagingStrategy {
            id: "docs".to_string(),
            label: "Documents".to_string(),
            default_package_type: envelope(),
            packagers: vec![
                PackagerEntry::enabled("individual", 5),
                PackagerEntry::disabled("manual", 0),
            ],
        };
        strategies.save(&strategy).unwrap();

        let loaded = strategies.load_strategy("docs").unwrap().unwrap();
        assert_eq!(loaded, strategy);
        assert_eq!(loaded.shipment_packager_ids(), vec!["individual"]);
        assert!(strategies.load_strategy("missing").unwrap().is_none());
        assert_eq!(strategies.list_all().unwrap().len(), 1);
    }

    #[test]
    fn test_save_requires_existing_package_type() {
        let (_types, strategies) = setup();
        let strategy = PackagingStrategy {
            id: "docs".to_string(),
            label: "Documents".to_string(),
            default_package_type: envelope(),
            packagers: Vec::new(),
        };
        let err = strategies.save(&strategy).unwrap_err();
        assert!(matches!(err, RepositoryError::ForeignKeyViolation(_)));
    }
}
