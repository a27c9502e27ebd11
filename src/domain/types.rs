// ==========================================
// 发货包装系统 - 领域类型定义
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 内置打包器 (Builtin Packager)
// ==========================================
// 稳定字符串 id 即配置中使用的 packager_id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinPackager {
    AllInOne,   // 全部装入一个包裹
    Individual, // 每件一个包裹
    Manual,     // 按商品包装选项装箱
}

impl BuiltinPackager {
    pub const ALL: [BuiltinPackager; 3] = [
        BuiltinPackager::AllInOne,
        BuiltinPackager::Individual,
        BuiltinPackager::Manual,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BuiltinPackager::AllInOne => "all_in_one",
            BuiltinPackager::Individual => "individual",
            BuiltinPackager::Manual => "manual",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BuiltinPackager::AllInOne => "All In One",
            BuiltinPackager::Individual => "Individual",
            BuiltinPackager::Manual => "Manual",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            BuiltinPackager::AllInOne => "Places all shipment items into the default package.",
            BuiltinPackager::Individual => {
                "Places each shipment item into its own default package."
            }
            BuiltinPackager::Manual => {
                "Uses the packaging options of purchased items to place them into the specified packages."
            }
        }
    }

    /// 默认排序权重
    pub fn default_weight(&self) -> i32 {
        match self {
            BuiltinPackager::AllInOne => 0,
            BuiltinPackager::Individual => 10,
            BuiltinPackager::Manual => 20,
        }
    }
}

impl fmt::Display for BuiltinPackager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BuiltinPackager {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all_in_one" | "all-in-one" => Ok(BuiltinPackager::AllInOne),
            "individual" => Ok(BuiltinPackager::Individual),
            "manual" => Ok(BuiltinPackager::Manual),
            other => Err(format!("未知打包器: {}", other)),
        }
    }
}

// ==========================================
// 提示级别 (Notice Level)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NoticeLevel {
    Status,  // 一般提示
    Warning, // 警告
}

impl fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoticeLevel::Status => write!(f, "STATUS"),
            NoticeLevel::Warning => write!(f, "WARNING"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_packager_roundtrip() {
        for packager in BuiltinPackager::ALL {
            assert_eq!(packager.as_str().parse::<BuiltinPackager>().unwrap(), packager);
        }
        assert_eq!("All-In-One".parse::<BuiltinPackager>().unwrap(), BuiltinPackager::AllInOne);
        assert!("box_fit".parse::<BuiltinPackager>().is_err());
    }
}
