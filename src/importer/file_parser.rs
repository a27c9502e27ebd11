// ==========================================
// 发货包装系统 - CSV 文件解析
// ==========================================
// 输出: 每行一个 { 表头: 值 } 映射（值已去除首尾空白）
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// 原始行（file_line 为文件中的行号，表头为第 1 行）
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub file_line: usize,
    pub fields: HashMap<String, String>,
}

impl RawRecord {
    /// 读取字段（空字符串视为缺失）
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

pub struct CsvParser;

impl CsvParser {
    /// 解析 CSV 文件
    pub fn parse_file(&self, path: &Path) -> ImportResult<(Vec<String>, Vec<RawRecord>)> {
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        if let Some(ext) = path.extension() {
            if !ext.eq_ignore_ascii_case("csv") {
                return Err(ImportError::UnsupportedFormat(
                    ext.to_string_lossy().to_string(),
                ));
            }
        }

        let file = File::open(path)?;
        self.parse_reader(file)
    }

    /// 从任意 Reader 解析（测试与标准输入使用）
    pub fn parse_reader<R: Read>(&self, source: R) -> ImportResult<(Vec<String>, Vec<RawRecord>)> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致（可选列可省略）
            .from_reader(source);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect();

        let mut records = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let record = result?;
            let mut fields = HashMap::new();
            for (col_idx, value) in record.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    fields.insert(header.clone(), value.trim().to_string());
                }
            }

            // 跳过完全空白的行
            if fields.values().all(|v| v.is_empty()) {
                continue;
            }

            records.push(RawRecord {
                file_line: index + 2,
                fields,
            });
        }

        Ok((headers, records))
    }
}
