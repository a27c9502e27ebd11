// ==========================================
// 发货包装系统 - 商品包装选项仓储
// ==========================================
// 职责: 管理 order_item_packaging 表
// 说明: 每个订单项对应一组包装选项（JSON 数组，读取时校验）
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::packaging_option::PackagingOption;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::storage::PackagingOptionSource;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct PackagingOptionRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PackagingOptionRepository {
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

    /// 覆盖保存订单项的包装选项
    pub fn save_options(&self, order_item_id: &str, options: &[PackagingOption]) -> RepositoryResult<()> {
        let options_json = serde_json::to_string(options)?;
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO order_item_packaging (order_item_id, options_json)
            VALUES (?1, ?2)
            ON CONFLICT(order_item_id) DO UPDATE SET options_json = excluded.options_json
            "#,
            params![order_item_id, options_json],
        )?;
        Ok(())
    }

    pub fn clear_options(&self, order_item_id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM order_item_packaging WHERE order_item_id = ?1",
            params![order_item_id],
        )?;
        Ok(affected > 0)
    }
}

impl PackagingOptionSource for PackagingOptionRepository {
    fn packaging_options(&self, order_item_id: &str) -> RepositoryResult<Vec<PackagingOption>> {
        let conn = self.get_conn()?;
        let options_json: Option<String> = conn
            .query_row(
                "SELECT options_json FROM order_item_packaging WHERE order_item_id = ?1",
                params![order_item_id],
                |row| row.get(0),
            )
            .optional()?;

        match options_json {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;
    use crate::domain::measure::{Dimensions, LengthUnit, Weight, WeightUnit};
    use crate::domain::package_type::PackageType;

    fn setup() -> (Arc<Mutex<Connection>>, PackagingOptionRepository) {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        let conn = Arc::new(Mutex::new(conn));
        (conn.clone(), PackagingOptionRepository::from_connection(conn))
    }

    fn crate_type() -> PackageType {
        PackageType::new(
            "crate",
            "Crate",
            Dimensions::new(40.0, 30.0, 30.0, LengthUnit::Cm),
            Weight::new(1.0, WeightUnit::Kg),
        )
    }

    #[test]
    fn test_missing_item_has_no_options() {
        let (_conn, repo) = setup();
        assert!(repo.packaging_options("oi-404").unwrap().is_empty());
    }

    #[test]
    fn test_save_and_load_options() {
        let (_conn, repo) = setup();
        let options = vec![PackagingOption::new(crate_type(), 2, 12).unwrap()];
        repo.save_options("oi-1", &options).unwrap();
        assert_eq!(repo.packaging_options("oi-1").unwrap(), options);

        assert!(repo.clear_options("oi-1").unwrap());
        assert!(repo.packaging_options("oi-1").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_stored_option_is_serialization_error() {
        let (conn, repo) = setup();
        conn.lock()
            .unwrap()
            .execute(
                "INSERT INTO order_item_packaging (order_item_id, options_json) VALUES ('oi-1', ?1)",
                params![r#"[{"package_type":{"id":"c","label":"C","dimensions":{"length":1,"width":1,"height":1,"unit":"cm"},"weight":{"number":0,"unit":"g"}},"min":5,"max":2}]"#],
            )
            .unwrap();
        let err = repo.packaging_options("oi-1").unwrap_err();
        assert!(matches!(err, RepositoryError::SerializationError(_)));
    }
}
