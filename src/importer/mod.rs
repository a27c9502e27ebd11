// ==========================================
// 发货包装系统 - 导入层
// ==========================================
// 职责: 外部数据导入（包装类型目录）
// 支持: CSV
// ==========================================

pub mod error;
pub mod file_parser;
pub mod package_type_importer;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, RawRecord};
pub use package_type_importer::{
    ImportSummary, PackageTypeCsvImporter, PackageTypeImport, RowError, REQUIRED_COLUMNS,
};
