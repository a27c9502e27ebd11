// ==========================================
// 发货包装系统 - 计量与金额值对象
// ==========================================
// 职责: 重量 / 申报价值 / 尺寸的不可变值类型
// 约束: 所有运算返回新值，不修改自身
// ==========================================

use crate::domain::error::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 浮点比较容差（重量/金额的拆分与累加允许的误差）
pub const MEASURE_EPSILON: f64 = 1e-6;

// ==========================================
// 重量单位 (Weight Unit)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    G,  // 克
    Kg, // 千克
    Oz, // 盎司
    Lb, // 磅
}

impl WeightUnit {
    /// 换算为克的系数
    fn grams_factor(&self) -> f64 {
        match self {
            WeightUnit::G => 1.0,
            WeightUnit::Kg => 1000.0,
            WeightUnit::Oz => 28.349_523_125,
            WeightUnit::Lb => 453.592_37,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeightUnit::G => "g",
            WeightUnit::Kg => "kg",
            WeightUnit::Oz => "oz",
            WeightUnit::Lb => "lb",
        }
    }
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for WeightUnit {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "g" => Ok(WeightUnit::G),
            "kg" => Ok(WeightUnit::Kg),
            "oz" => Ok(WeightUnit::Oz),
            "lb" | "lbs" => Ok(WeightUnit::Lb),
            other => Err(DomainError::UnknownUnit(other.to_string())),
        }
    }
}

// ==========================================
// Weight - 重量
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weight {
    pub number: f64,
    pub unit: WeightUnit,
}

impl Weight {
    pub fn new(number: f64, unit: WeightUnit) -> Self {
        Self { number, unit }
    }

    pub fn zero(unit: WeightUnit) -> Self {
        Self { number: 0.0, unit }
    }

    /// 换算到指定单位
    pub fn convert(&self, unit: WeightUnit) -> Weight {
        if self.unit == unit {
            return *self;
        }
        let grams = self.number * self.unit.grams_factor();
        Weight::new(grams / unit.grams_factor(), unit)
    }

    /// 相加（右操作数先换算为左操作数的单位）
    pub fn add(&self, other: &Weight) -> Weight {
        Weight::new(self.number + other.convert(self.unit).number, self.unit)
    }

    pub fn subtract(&self, other: &Weight) -> Weight {
        Weight::new(self.number - other.convert(self.unit).number, self.unit)
    }

    pub fn multiply(&self, factor: f64) -> Weight {
        Weight::new(self.number * factor, self.unit)
    }

    pub fn divide(&self, divisor: f64) -> Weight {
        Weight::new(self.number / divisor, self.unit)
    }

    pub fn is_zero(&self) -> bool {
        self.number.abs() < MEASURE_EPSILON
    }

    /// 容差比较（跨单位）
    pub fn approx_eq(&self, other: &Weight) -> bool {
        (self.number - other.convert(self.unit).number).abs() < MEASURE_EPSILON
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.number, self.unit)
    }
}

// ==========================================
// Money - 申报价值
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Money {
    pub number: f64,
    pub currency_code: String,
}

impl Money {
    pub fn new(number: f64, currency_code: impl Into<String>) -> Self {
        Self {
            number,
            currency_code: currency_code.into(),
        }
    }

    fn ensure_same_currency(&self, other: &Money) -> DomainResult<()> {
        if self.currency_code != other.currency_code {
            return Err(DomainError::CurrencyMismatch {
                left: self.currency_code.clone(),
                right: other.currency_code.clone(),
            });
        }
        Ok(())
    }

    pub fn add(&self, other: &Money) -> DomainResult<Money> {
        self.ensure_same_currency(other)?;
        Ok(Money::new(self.number + other.number, self.currency_code.clone()))
    }

    pub fn subtract(&self, other: &Money) -> DomainResult<Money> {
        self.ensure_same_currency(other)?;
        Ok(Money::new(self.number - other.number, self.currency_code.clone()))
    }

    pub fn multiply(&self, factor: f64) -> Money {
        Money::new(self.number * factor, self.currency_code.clone())
    }

    pub fn divide(&self, divisor: f64) -> Money {
        Money::new(self.number / divisor, self.currency_code.clone())
    }

    pub fn approx_eq(&self, other: &Money) -> bool {
        self.currency_code == other.currency_code && (self.number - other.number).abs() < MEASURE_EPSILON
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.number, self.currency_code)
    }
}

// ==========================================
// 长度单位 / 尺寸
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    Mm,
    Cm,
    M,
    In,
    Ft,
}

impl LengthUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            LengthUnit::Mm => "mm",
            LengthUnit::Cm => "cm",
            LengthUnit::M => "m",
            LengthUnit::In => "in",
            LengthUnit::Ft => "ft",
        }
    }
}

impl FromStr for LengthUnit {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mm" => Ok(LengthUnit::Mm),
            "cm" => Ok(LengthUnit::Cm),
            "m" => Ok(LengthUnit::M),
            "in" => Ok(LengthUnit::In),
            "ft" => Ok(LengthUnit::Ft),
            other => Err(DomainError::UnknownUnit(other.to_string())),
        }
    }
}

/// 包装箱外形尺寸
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub unit: LengthUnit,
}

impl Dimensions {
    pub fn new(length: f64, width: f64, height: f64, unit: LengthUnit) -> Self {
        Self {
            length,
            width,
            height,
            unit,
        }
    }
}
