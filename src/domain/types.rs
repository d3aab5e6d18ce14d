// ==========================================
// 运费计价引擎 - 领域类型定义
// ==========================================
// 职责: 定义计价维度相关的枚举类型
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 区域代码 (Zone Code)
// ==========================================
// 计价的主维度: A(同城) < B(同省/近距离) < C(大都市互发) < D(全国默认) < E(偏远)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ZoneCode {
    A, // 同城/同微区
    B, // 同省或距离阈值内
    C, // 大都市互发
    D, // 全国默认
    E, // 偏远地区
}

impl ZoneCode {
    /// 全部区域代码（按计价距离从近到远）
    pub const ALL: [ZoneCode; 5] = [
        ZoneCode::A,
        ZoneCode::B,
        ZoneCode::C,
        ZoneCode::D,
        ZoneCode::E,
    ];

    /// 从字符串解析区域代码
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "A" => Some(ZoneCode::A),
            "B" => Some(ZoneCode::B),
            "C" => Some(ZoneCode::C),
            "D" => Some(ZoneCode::D),
            "E" => Some(ZoneCode::E),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ZoneCode::A => "A",
            ZoneCode::B => "B",
            ZoneCode::C => "C",
            ZoneCode::D => "D",
            ZoneCode::E => "E",
        }
    }
}

impl fmt::Display for ZoneCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 运单类型 (Shipment Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipmentType {
    Forward, // 正向运单
    Reverse, // 逆向运单(退货)
}

impl ShipmentType {
    /// 从字符串解析运单类型
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "FORWARD" => Some(ShipmentType::Forward),
            "REVERSE" => Some(ShipmentType::Reverse),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ShipmentType::Forward => "FORWARD",
            ShipmentType::Reverse => "REVERSE",
        }
    }
}

impl fmt::Display for ShipmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 支付方式 (Payment Mode)
// ==========================================
// COD 运单在计价时附加代收货款手续费
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMode {
    Cod,     // 货到付款
    Prepaid, // 预付
}

impl PaymentMode {
    /// 从字符串解析支付方式
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "COD" => Some(PaymentMode::Cod),
            "PREPAID" => Some(PaymentMode::Prepaid),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            PaymentMode::Cod => "COD",
            PaymentMode::Prepaid => "PREPAID",
        }
    }
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 价卡状态 (Rate Card Status)
// ==========================================
// 只有 ACTIVE 的价卡参与选择; 价卡永不物理删除
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RateCardStatus {
    Draft,    // 草稿
    Active,   // 激活
    Inactive, // 停用(被新版本取代)
    Expired,  // 过期
}

impl RateCardStatus {
    /// 从字符串解析状态
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "DRAFT" => Some(RateCardStatus::Draft),
            "ACTIVE" => Some(RateCardStatus::Active),
            "INACTIVE" => Some(RateCardStatus::Inactive),
            "EXPIRED" => Some(RateCardStatus::Expired),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            RateCardStatus::Draft => "DRAFT",
            RateCardStatus::Active => "ACTIVE",
            RateCardStatus::Inactive => "INACTIVE",
            RateCardStatus::Expired => "EXPIRED",
        }
    }
}

impl fmt::Display for RateCardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// B区判定模式 (Zone B Mode)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ZoneBMode {
    State,    // 同省即 B 区
    Distance, // 质心距离低于阈值即 B 区
}

impl ZoneBMode {
    /// 从字符串解析判定模式
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "STATE" => Some(ZoneBMode::State),
            "DISTANCE" => Some(ZoneBMode::Distance),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ZoneBMode::State => "STATE",
            ZoneBMode::Distance => "DISTANCE",
        }
    }
}

impl fmt::Display for ZoneBMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 燃油附加费计算基数 (Fuel Basis)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FuelBasis {
    Freight,        // 仅运费
    FreightPlusCod, // 运费 + COD 手续费
}

impl fmt::Display for FuelBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FuelBasis::Freight => write!(f, "FREIGHT"),
            FuelBasis::FreightPlusCod => write!(f, "FREIGHT_PLUS_COD"),
        }
    }
}

// ==========================================
// 最低运费计算基数 (Minimum Fare Basis)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MinimumFareBasis {
    Freight,              // 仅运费
    FreightPlusOverheads, // 运费 + 各项附加费
}

impl fmt::Display for MinimumFareBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MinimumFareBasis::Freight => write!(f, "FREIGHT"),
            MinimumFareBasis::FreightPlusOverheads => write!(f, "FREIGHT_PLUS_OVERHEADS"),
        }
    }
}

// ==========================================
// 计费重量取整模式 (Weight Rounding Mode)
// ==========================================
// 当前仅支持向上取整; 保留枚举以固定线上格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WeightRoundingMode {
    Ceil, // 向上取整到取整单位
}

impl fmt::Display for WeightRoundingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeightRoundingMode::Ceil => write!(f, "CEIL"),
        }
    }
}
