// ==========================================
// 发货包装系统 - 包装类型目录导入
// ==========================================
// 表头: id,label,length,width,height,dimension_unit,weight,weight_unit[,max_weight]
// 规则: 行级错误收集后继续处理其他行；只写入通过校验的行
// 规则: max_weight 使用 weight_unit
// ==========================================

use crate::domain::measure::{Dimensions, LengthUnit, Weight, WeightUnit};
use crate::domain::package_type::{PackageType, PackageTypeCatalog};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{CsvParser, RawRecord};
use crate::repository::PackageTypeRepository;
use serde::Serialize;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use tracing::{info, instrument, warn};

/// 必需列
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "id",
    "label",
    "length",
    "width",
    "height",
    "dimension_unit",
    "weight",
    "weight_unit",
];

/// 行级错误（供界面展示）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowError {
    pub row: usize,
    pub message: String,
}

/// 解析结果
#[derive(Debug, Default)]
pub struct PackageTypeImport {
    pub package_types: Vec<PackageType>,
    pub errors: Vec<RowError>,
}

impl PackageTypeImport {
    pub fn into_catalog(self) -> PackageTypeCatalog {
        self.package_types.into_iter().collect()
    }
}

/// 导入汇总
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportSummary {
    pub total_rows: usize,
    pub imported: usize,
    pub errors: Vec<RowError>,
}

pub struct PackageTypeCsvImporter {
    parser: CsvParser,
}

impl Default for PackageTypeCsvImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageTypeCsvImporter {
    pub fn new() -> Self {
        Self { parser: CsvParser }
    }

    /// 解析 CSV 文件
    pub fn parse_file(&self, path: &Path) -> ImportResult<PackageTypeImport> {
        let (headers, records) = self.parser.parse_file(path)?;
        Self::map_records(&headers, records)
    }

    pub fn parse_reader<R: Read>(&self, source: R) -> ImportResult<PackageTypeImport> {
        let (headers, records) = self.parser.parse_reader(source)?;
        Self::map_records(&headers, records)
    }

    /// 解析并写入包装类型表（同 id 覆盖）
    #[instrument(skip(self, repo), fields(path = %path.display()))]
    pub fn import_file(&self, path: &Path, repo: &PackageTypeRepository) -> ImportResult<ImportSummary> {
        let parsed = self.parse_file(path)?;
        let total_rows = parsed.package_types.len() + parsed.errors.len();
        let imported = repo.upsert_batch(&parsed.package_types)?;

        info!(
            total_rows,
            imported,
            errors = parsed.errors.len(),
            "包装类型导入完成"
        );
        Ok(ImportSummary {
            total_rows,
            imported,
            errors: parsed.errors,
        })
    }

    fn map_records(headers: &[String], records: Vec<RawRecord>) -> ImportResult<PackageTypeImport> {
        if let Some(missing) = REQUIRED_COLUMNS
            .iter()
            .copied()
            .find(|column| !headers.iter().any(|h| h == column))
        {
            return Err(ImportError::MissingColumn(missing.to_string()));
        }

        let mut result = PackageTypeImport::default();
        let mut seen: HashSet<String> = HashSet::new();
        for record in &records {
            match map_record(record).and_then(|package_type| {
                if seen.insert(package_type.id.clone()) {
                    Ok(package_type)
                } else {
                    Err(ImportError::DuplicateId {
                        row: record.file_line,
                        id: package_type.id,
                    })
                }
            }) {
                Ok(package_type) => result.package_types.push(package_type),
                Err(e) => {
                    warn!(row = record.file_line, error = %e, "包装类型行校验失败");
                    result.errors.push(RowError {
                        row: record.file_line,
                        message: e.to_string(),
                    });
                }
            }
        }
        Ok(result)
    }
}

fn map_record(record: &RawRecord) -> ImportResult<PackageType> {
    let weight_unit: WeightUnit = parse_field(record, "weight_unit")?;
    let dimensions = Dimensions::new(
        parse_amount(record, "length")?,
        parse_amount(record, "width")?,
        parse_amount(record, "height")?,
        parse_field::<LengthUnit>(record, "dimension_unit")?,
    );

    let mut package_type = PackageType::new(
        required(record, "id")?,
        required(record, "label")?,
        dimensions,
        Weight::new(parse_amount(record, "weight")?, weight_unit),
    );
    if record.get("max_weight").is_some() {
        package_type = package_type.with_max_weight(Weight::new(
            parse_amount(record, "max_weight")?,
            weight_unit,
        ));
    }

    Ok(package_type)
}

fn required<'a>(record: &'a RawRecord, field: &str) -> ImportResult<&'a str> {
    record.get(field).ok_or_else(|| ImportError::MissingField {
        row: record.file_line,
        field: field.to_string(),
    })
}

fn parse_field<T>(record: &RawRecord, field: &str) -> ImportResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    required(record, field)?
        .parse::<T>()
        .map_err(|e| ImportError::TypeConversionError {
            row: record.file_line,
            field: field.to_string(),
            message: e.to_string(),
        })
}

/// 非负有限数值
fn parse_amount(record: &RawRecord, field: &str) -> ImportResult<f64> {
    let value: f64 = parse_field(record, field)?;
    if !value.is_finite() || value < 0.0 {
        return Err(ImportError::NegativeValue {
            row: record.file_line,
            field: field.to_string(),
            value,
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "id,label,length,width,height,dimension_unit,weight,weight_unit,max_weight\n";

    #[test]
    fn test_parse_valid_rows() {
        let data = format!(
            "{}box_s,Small Box,20,15,10,cm,120,g,5000\nenvelope,Envelope,30,22,1,cm,0.02,kg,\n",
            HEADER
        );
        let parsed = PackageTypeCsvImporter::new().parse_reader(data.as_bytes()).unwrap();
        assert!(parsed.errors.is_empty());
        assert_eq!(parsed.package_types.len(), 2);

        let small = &parsed.package_types[0];
        assert_eq!(small.label, "Small Box");
        assert_eq!(small.dimensions.unit, LengthUnit::Cm);
        assert_eq!(small.max_weight, Some(Weight::new(5000.0, WeightUnit::G)));
        assert!(parsed.package_types[1].max_weight.is_none());

        let catalog = parsed.into_catalog();
        assert!(catalog.contains("envelope"));
    }

    #[test]
    fn test_row_errors_are_collected() {
        let data = format!(
            "{}box_s,Small,20,15,10,cm,120,g,\n\
             bad_unit,Bad,1,1,1,yard,1,g,\n\
             ,NoId,1,1,1,cm,1,g,\n\
             negative,Neg,-1,1,1,cm,1,g,\n\
             box_s,Again,1,1,1,cm,1,g,\n",
            HEADER
        );
        let parsed = PackageTypeCsvImporter::new().parse_reader(data.as_bytes()).unwrap();
        assert_eq!(parsed.package_types.len(), 1);
        let rows: Vec<usize> = parsed.errors.iter().map(|e| e.row).collect();
        assert_eq!(rows, vec![3, 4, 5, 6]);
    }

    #[test]
    fn test_missing_required_column() {
        let data = "id,label,length\nbox,Box,1\n";
        let err = PackageTypeCsvImporter::new().parse_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, ImportError::MissingColumn(ref c) if c == "width"));
    }

    #[test]
    fn test_import_file_upserts_valid_rows() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("packaging.db");
        let db_path = db_path.to_string_lossy().to_string();
        let conn = crate::db::open_sqlite_connection(&db_path).unwrap();
        crate::db::init_schema(&conn).unwrap();
        drop(conn);

        let csv_path = dir.path().join("types.csv");
        std::fs::write(
            &csv_path,
            format!("{}box_m,Medium,30,30,30,cm,200,g,\nbroken,Broken,x,1,1,cm,1,g,\n", HEADER),
        )
        .unwrap();

        let repo = PackageTypeRepository::new(&db_path).unwrap();
        let summary = PackageTypeCsvImporter::new().import_file(&csv_path, &repo).unwrap();
        assert_eq!(summary.total_rows, 2);
        assert_eq!(summary.imported, 1);
        assert_eq!(summary.errors.len(), 1);
        assert!(repo.find_by_id("box_m").unwrap().is_some());
    }
}
