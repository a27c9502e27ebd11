// ==========================================
// 发货包装系统 - 包装类型仓储
// ==========================================
// 职责: 管理 package_type 表
// 说明: 包装类型同时被策略、包裹记录按 id 引用
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::measure::{Dimensions, LengthUnit, Weight, WeightUnit};
use crate::domain::package_type::{PackageType, PackageTypeCatalog};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::storage::PackageTypeSource;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

pub(crate) const PACKAGE_TYPE_COLUMNS: &str = "package_type_id, label, length, width, height, \
     dimension_unit, weight, weight_unit, max_weight, max_weight_unit";

pub struct PackageTypeRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PackageTypeRepository {
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

    /// 新增或更新包装类型
    pub fn upsert(&self, package_type: &PackageType) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        upsert_with_conn(&conn, package_type)
    }

    /// 批量写入（单事务）
    pub fn upsert_batch(&self, package_types: &[PackageType]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        for package_type in package_types {
            upsert_with_conn(&tx, package_type)?;
        }
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(package_types.len())
    }

    pub fn find_by_id(&self, package_type_id: &str) -> RepositoryResult<Option<PackageType>> {
        let conn = self.get_conn()?;
        find_with_conn(&conn, package_type_id)
    }

    pub fn list_all(&self) -> RepositoryResult<Vec<PackageType>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM package_type ORDER BY package_type_id",
            PACKAGE_TYPE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], map_package_type_row)?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row??);
        }
        Ok(result)
    }

    pub fn delete(&self, package_type_id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM package_type WHERE package_type_id = ?1",
            params![package_type_id],
        )?;
        Ok(affected > 0)
    }
}

impl PackageTypeSource for PackageTypeRepository {
    fn load_catalog(&self) -> RepositoryResult<PackageTypeCatalog> {
        Ok(self.list_all()?.into_iter().collect())
    }
}

fn upsert_with_conn(conn: &Connection, package_type: &PackageType) -> RepositoryResult<()> {
    conn.execute(
        r#"
        INSERT INTO package_type (
            package_type_id, label, length, width, height, dimension_unit,
            weight, weight_unit, max_weight, max_weight_unit
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        ON CONFLICT(package_type_id) DO UPDATE SET
            label = excluded.label,
            length = excluded.length,
            width = excluded.width,
            height = excluded.height,
            dimension_unit = excluded.dimension_unit,
            weight = excluded.weight,
            weight_unit = excluded.weight_unit,
            max_weight = excluded.max_weight,
            max_weight_unit = excluded.max_weight_unit
        "#,
        params![
            package_type.id,
            package_type.label,
            package_type.dimensions.length,
            package_type.dimensions.width,
            package_type.dimensions.height,
            package_type.dimensions.unit.as_str(),
            package_type.weight.number,
            package_type.weight.unit.as_str(),
            package_type.max_weight.map(|w| w.number),
            package_type.max_weight.map(|w| w.unit.as_str()),
        ],
    )?;
    Ok(())
}

pub(crate) fn find_with_conn(
    conn: &Connection,
    package_type_id: &str,
) -> RepositoryResult<Option<PackageType>> {
    let sql = format!(
        "SELECT {} FROM package_type WHERE package_type_id = ?1",
        PACKAGE_TYPE_COLUMNS
    );
    let row = conn
        .query_row(&sql, params![package_type_id], map_package_type_row)
        .optional()?;
    row.transpose()
}

/// 行映射：单位解析失败时返回 FieldValueError（外层 Result 为 SQLite 读取错误）
pub(crate) fn map_package_type_row(row: &Row<'_>) -> rusqlite::Result<RepositoryResult<PackageType>> {
    let id: String = row.get(0)?;
    let label: String = row.get(1)?;
    let length: f64 = row.get(2)?;
    let width: f64 = row.get(3)?;
    let height: f64 = row.get(4)?;
    let dimension_unit: String = row.get(5)?;
    let weight: f64 = row.get(6)?;
    let weight_unit: String = row.get(7)?;
    let max_weight: Option<f64> = row.get(8)?;
    let max_weight_unit: Option<String> = row.get(9)?;

    Ok(build_package_type(
        id,
        label,
        (length, width, height, &dimension_unit),
        (weight, &weight_unit),
        max_weight.zip(max_weight_unit),
    ))
}

fn build_package_type(
    id: String,
    label: String,
    (length, width, height, dimension_unit): (f64, f64, f64, &str),
    (weight, weight_unit): (f64, &str),
    max_weight: Option<(f64, String)>,
) -> RepositoryResult<PackageType> {
    let length_unit: LengthUnit = dimension_unit.parse().map_err(|e| RepositoryError::FieldValueError {
        field: "dimension_unit".to_string(),
        message: format!("{}", e),
    })?;
    let unit = parse_weight_unit("weight_unit", weight_unit)?;

    let mut package_type = PackageType::new(
        id,
        label,
        Dimensions::new(length, width, height, length_unit),
        Weight::new(weight, unit),
    );
    if let Some((number, unit)) = max_weight {
        let unit = parse_weight_unit("max_weight_unit", &unit)?;
        package_type = package_type.with_max_weight(Weight::new(number, unit));
    }
    Ok(package_type)
}

pub(crate) fn parse_weight_unit(field: &str, value: &str) -> RepositoryResult<WeightUnit> {
    value.parse().map_err(|e| RepositoryError::FieldValueError {
        field: field.to_string(),
        message: format!("{}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;

    fn setup() -> PackageTypeRepository {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        PackageTypeRepository::from_connection(Arc::new(Mutex::new(conn)))
    }

    fn box_type(id: &str) -> PackageType {
        PackageType::new(
            id,
            format!("Box {}", id),
            Dimensions::new(30.0, 20.0, 10.0, LengthUnit::Cm),
            Weight::new(120.0, WeightUnit::G),
        )
    }

    #[test]
    fn test_upsert_and_find() {
        let repo = setup();
        let pt = box_type("box_s").with_max_weight(Weight::new(5.0, WeightUnit::Kg));
        repo.upsert(&pt).unwrap();

        let loaded = repo.find_by_id("box_s").unwrap().unwrap();
        assert_eq!(loaded, pt);
        assert!(repo.find_by_id("missing").unwrap().is_none());
    }

    #[test]
    fn test_upsert_overwrites_label() {
        let repo = setup();
        repo.upsert(&box_type("box_s")).unwrap();
        let mut changed = box_type("box_s");
        changed.label = "Small".to_string();
        repo.upsert(&changed).unwrap();

        assert_eq!(repo.list_all().unwrap().len(), 1);
        assert_eq!(repo.find_by_id("box_s").unwrap().unwrap().label, "Small");
    }

    #[test]
    fn test_load_catalog() {
        let repo = setup();
        repo.upsert_batch(&[box_type("a"), box_type("b")]).unwrap();
        let catalog = repo.load_catalog().unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.contains("a"));
        assert!(repo.delete("a").unwrap());
        assert!(!repo.delete("a").unwrap());
    }
}
