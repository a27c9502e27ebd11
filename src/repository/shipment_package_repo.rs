// ==========================================
// 发货包装系统 - 持久化包裹仓储
// ==========================================
// 职责: 管理 shipment_package 表
// 存储: 发货项 / 包装类型快照 / 扩展数据以 JSON 保存
// 排序: 查询按写入顺序 (rowid) 返回
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::measure::{Money, Weight};
use crate::domain::package_type::PackageType;
use crate::domain::shipment_item::ShipmentItem;
use crate::domain::shipment_package::ShipmentPackage;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::package_type_repo::parse_weight_unit;
use crate::repository::storage::ShipmentPackageStorage;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

const SELECT_COLUMNS: &str = "package_id, record_type, shipment_id, title, items_json, \
     package_type_json, weight, weight_unit, declared_value, currency_code, tracking_code, \
     data_json, created_at, changed_at";

/// 原始行（JSON 字段尚未解析）
#[derive(Debug)]
struct PackageRow {
    package_id: String,
    record_type: String,
    shipment_id: Option<String>,
    title: String,
    items_json: String,
    package_type_json: Option<String>,
    weight: Option<f64>,
    weight_unit: Option<String>,
    declared_value: Option<f64>,
    currency_code: Option<String>,
    tracking_code: String,
    data_json: String,
    created_at: String,
    changed_at: String,
}

pub struct ShipmentPackageRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ShipmentPackageRepository {
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

    pub fn find_by_id(&self, package_id: &str) -> RepositoryResult<Option<ShipmentPackage>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM shipment_package WHERE package_id = ?1", SELECT_COLUMNS);
        let row = conn
            .query_row(&sql, params![package_id], map_row)
            .optional()?;
        row.map(row_to_package).transpose()
    }

    pub fn count_by_shipment(&self, shipment_id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM shipment_package WHERE shipment_id = ?1",
            params![shipment_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

impl ShipmentPackageStorage for ShipmentPackageRepository {
    fn list_by_shipment(&self, shipment_id: &str) -> RepositoryResult<Vec<ShipmentPackage>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM shipment_package WHERE shipment_id = ?1 ORDER BY rowid",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![shipment_id], map_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(row_to_package).collect()
    }

    fn insert(&self, package: &ShipmentPackage) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        insert_with_conn(&conn, package)
    }

    fn delete_by_shipment(&self, shipment_id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM shipment_package WHERE shipment_id = ?1",
            params![shipment_id],
        )?;
        Ok(affected)
    }

    fn replace_for_shipment(
        &self,
        shipment_id: &str,
        packages: &[ShipmentPackage],
    ) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        tx.execute(
            "DELETE FROM shipment_package WHERE shipment_id = ?1",
            params![shipment_id],
        )?;
        for package in packages {
            insert_with_conn(&tx, package)?;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }
}

fn insert_with_conn(conn: &Connection, package: &ShipmentPackage) -> RepositoryResult<()> {
    let items_json = serde_json::to_string(&package.items)?;
    let package_type_json = package
        .package_type
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;
    let data_json = serde_json::to_string(&package.data)?;

    conn.execute(
        r#"
        INSERT INTO shipment_package (
            package_id, record_type, shipment_id, title, items_json,
            package_type_id, package_type_json, weight, weight_unit,
            declared_value, currency_code, tracking_code, data_json,
            created_at, changed_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
        "#,
        params![
            package.package_id,
            package.record_type,
            package.shipment_id,
            package.title,
            items_json,
            package.package_type_id(),
            package_type_json,
            package.weight.map(|w| w.number),
            package.weight.map(|w| w.unit.as_str()),
            package.declared_value.as_ref().map(|m| m.number),
            package.declared_value.as_ref().map(|m| m.currency_code.clone()),
            package.tracking_code,
            data_json,
            package.created_at.to_rfc3339(),
            package.changed_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PackageRow> {
    Ok(PackageRow {
        package_id: row.get(0)?,
        record_type: row.get(1)?,
        shipment_id: row.get(2)?,
        title: row.get(3)?,
        items_json: row.get(4)?,
        package_type_json: row.get(5)?,
        weight: row.get(6)?,
        weight_unit: row.get(7)?,
        declared_value: row.get(8)?,
        currency_code: row.get(9)?,
        tracking_code: row.get(10)?,
        data_json: row.get(11)?,
        created_at: row.get(12)?,
        changed_at: row.get(13)?,
    })
}

fn row_to_package(row: PackageRow) -> RepositoryResult<ShipmentPackage> {
    let items: Vec<ShipmentItem> = serde_json::from_str(&row.items_json)?;
    let package_type: Option<PackageType> = row
        .package_type_json
        .as_deref()
        .map(serde_json::from_str)
        .transpose()?;
    let data: BTreeMap<String, Value> = serde_json::from_str(&row.data_json)?;

    let weight = match (row.weight, row.weight_unit) {
        (Some(number), Some(unit)) => Some(Weight::new(number, parse_weight_unit("weight_unit", &unit)?)),
        _ => None,
    };
    let declared_value = match (row.declared_value, row.currency_code) {
        (Some(number), Some(code)) => Some(Money::new(number, code)),
        _ => None,
    };

    Ok(ShipmentPackage {
        package_id: row.package_id,
        record_type: row.record_type,
        shipment_id: row.shipment_id,
        title: row.title,
        items,
        package_type,
        weight,
        declared_value,
        tracking_code: row.tracking_code,
        data,
        created_at: parse_timestamp("created_at", &row.created_at)?,
        changed_at: parse_timestamp("changed_at", &row.changed_at)?,
    })
}

fn parse_timestamp(field: &str, value: &str) -> RepositoryResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::FieldValueError {
            field: field.to_string(),
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;
    use crate::domain::measure::{Dimensions, LengthUnit, WeightUnit};

    fn setup() -> ShipmentPackageRepository {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        ShipmentPackageRepository::from_connection(Arc::new(Mutex::new(conn)))
    }

    fn package(shipment_id: &str, title: &str) -> ShipmentPackage {
        let mut package = ShipmentPackage::new("default", Some(shipment_id.to_string()));
        package.title = title.to_string();
        package
            .set_package_type(PackageType::new(
                "box",
                "Box",
                Dimensions::new(10.0, 10.0, 10.0, LengthUnit::Cm),
                Weight::new(100.0, WeightUnit::G),
            ))
            .unwrap();
        package
            .add_item(
                ShipmentItem::new(
                    "oi-1",
                    "Mug",
                    2,
                    Weight::new(800.0, WeightUnit::G),
                    Money::new(24.0, "USD"),
                )
                .unwrap(),
            )
            .unwrap();
        package.tracking_code = "1Z999".to_string();
        package
            .data
            .insert("insurance".to_string(), Value::Bool(true));
        package
    }

    #[test]
    fn test_insert_and_list_preserves_fields() {
        let repo = setup();
        let original = package("s-1", "Box-1");
        repo.insert(&original).unwrap();

        let loaded = repo.list_by_shipment("s-1").unwrap();
        assert_eq!(loaded.len(), 1);
        let loaded = &loaded[0];
        assert_eq!(loaded.package_id, original.package_id);
        assert_eq!(loaded.items, original.items);
        assert_eq!(loaded.package_type_id(), Some("box"));
        assert!(loaded.weight.unwrap().approx_eq(&Weight::new(900.0, WeightUnit::G)));
        assert_eq!(loaded.tracking_code, "1Z999");
        assert_eq!(loaded.data.get("insurance"), Some(&Value::Bool(true)));
        assert_eq!(loaded.created_at, original.created_at);
    }

    #[test]
    fn test_replace_for_shipment_keeps_other_shipments() {
        let repo = setup();
        repo.insert(&package("s-1", "old")).unwrap();
        repo.insert(&package("s-2", "other")).unwrap();

        repo.replace_for_shipment("s-1", &[package("s-1", "new-1"), package("s-1", "new-2")])
            .unwrap();

        let titles: Vec<String> = repo
            .list_by_shipment("s-1")
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["new-1", "new-2"]);
        assert_eq!(repo.count_by_shipment("s-2").unwrap(), 1);

        assert_eq!(repo.delete_by_shipment("s-1").unwrap(), 2);
        assert!(repo.list_by_shipment("s-1").unwrap().is_empty());
    }
}
