// ==========================================
// 运费计价引擎 - 价卡实体
// ==========================================
// 职责: 定义商家可配置的版本化计价配置(价卡)
// 红线: 价卡永不物理删除(软删除), 历史价格必须可复现
// 红线: 计价只认统一的 zone_pricing 结构, 不保留多套并存的旧计价表示
// ==========================================

use crate::domain::types::{
    FuelBasis, MinimumFareBasis, RateCardStatus, ShipmentType, WeightRoundingMode, ZoneBMode,
    ZoneCode,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

// ==========================================
// ZoneSlabPricing - 单区域阶梯价
// ==========================================
// base_weight_kg 内收 base_price, 超出部分按 additional_price_per_kg 线性计费
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneSlabPricing {
    pub base_weight_kg: Decimal,        // 免重(首重)
    pub base_price: Decimal,            // 首重价格
    pub additional_price_per_kg: Decimal, // 续重单价(每kg)
}

// ==========================================
// CodSlab - 代收货款分段费率
// ==========================================
// 按申报价值区间取费; flat 与 percent 至少配置其一, 同时配置时取两者较大值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodSlab {
    pub min_value: Decimal,           // 区间下限(含)
    pub max_value: Option<Decimal>,   // 区间上限(含); None 表示无上限
    pub flat_charge: Option<Decimal>, // 固定手续费
    pub percent: Option<Decimal>,     // 按申报价值的百分比
}

impl CodSlab {
    /// 判断申报价值是否落入本区间
    pub fn contains(&self, declared_value: Decimal) -> bool {
        if declared_value < self.min_value {
            return false;
        }
        match self.max_value {
            Some(max) => declared_value <= max,
            None => true,
        }
    }
}

// ==========================================
// CodChargeConfig - COD 手续费配置
// ==========================================
// slabs 非空时优先按区间取费; 否则按 max(申报价值×percent, minimum_charge)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodChargeConfig {
    pub percent: Decimal,        // 百分比费率(如 2 表示 2%)
    pub minimum_charge: Decimal, // 手续费下限
    #[serde(default)]
    pub slabs: Vec<CodSlab>,     // 分段费率(可选)
}

// ==========================================
// FuelSurchargeConfig - 燃油附加费配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelSurchargeConfig {
    pub percent: Decimal,  // 百分比(如 10 表示 10%)
    pub basis: FuelBasis,  // 计算基数
}

// ==========================================
// RemoteAreaConfig - 偏远地区附加费配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteAreaConfig {
    pub enabled: bool,
    pub charge: Decimal, // 固定附加费
}

// ==========================================
// MinimumFareConfig - 最低运费配置
// ==========================================
// 基数不足最低运费时补足差额, 永不超补
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinimumFareConfig {
    pub amount: Decimal,
    pub basis: MinimumFareBasis,
}

// ==========================================
// WeightPolicy - 计费重量策略
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightPolicy {
    pub rounding_unit_kg: Decimal,        // 取整单位(如 0.5kg)
    pub rounding_mode: WeightRoundingMode, // 取整模式(向上)
    pub volumetric_divisor: Decimal,      // 体积重除数(通常 5000)
}

impl Default for WeightPolicy {
    fn default() -> Self {
        Self {
            rounding_unit_kg: dec!(0.5),
            rounding_mode: WeightRoundingMode::Ceil,
            volumetric_divisor: dec!(5000),
        }
    }
}

// ==========================================
// CustomerOverride - 客户级覆盖
// ==========================================
// customer_id 与 customer_group 至少填一项;
// 同一客户命中多个 group 覆盖时, 按 group_priority 降序取第一个(并列按列表顺序)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerOverride {
    pub customer_id: Option<String>,
    pub customer_group: Option<String>,
    #[serde(default)]
    pub group_priority: i32,
    pub discount_percent: Option<Decimal>, // 运费折扣百分比
    pub flat_discount: Option<Decimal>,    // 运费固定减免
}

// ==========================================
// RateCard - 价卡(版本化计价配置)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateCard {
    // ===== 身份 =====
    pub card_id: String,                 // 价卡ID (UUID)
    pub company_id: String,              // 所属商家
    pub name: String,                    // 可读名称
    pub shipment_type: Option<ShipmentType>, // None 表示类型无关
    pub category: Option<String>,        // 服务品类(economy/standard/premium); None 表示品类无关
    pub carrier_code: Option<String>,    // 关联承运商/服务

    // ===== 计价配置 =====
    pub zone_pricing: HashMap<ZoneCode, ZoneSlabPricing>, // 五个区域必须齐全
    pub cod_charge: CodChargeConfig,
    pub fuel_surcharge: FuelSurchargeConfig,
    pub remote_area: RemoteAreaConfig,
    pub minimum_fare: MinimumFareConfig,
    pub zone_b_mode: ZoneBMode,
    pub weight_policy: WeightPolicy,

    // ===== 生命周期 =====
    pub effective_from: NaiveDate,
    pub effective_to: Option<NaiveDate>,
    pub status: RateCardStatus,
    pub is_deleted: bool,
    pub version_number: i32,
    pub parent_version_id: Option<String>, // 上一版本(审计链)
    pub priority: i32,                     // 同级平手时的决胜序数
    pub is_special_promotion: bool,        // 限时促销卡
    pub is_default: bool,                  // 商家在该品类下的默认卡

    // ===== 客户覆盖 =====
    #[serde(default)]
    pub customer_overrides: Vec<CustomerOverride>,

    // ===== 审计 =====
    pub created_at: chrono::DateTime<Utc>,
    pub updated_at: chrono::DateTime<Utc>,
}

impl RateCard {
    /// 创建新价卡(自动生成 UUID 与时间戳, 版本号从 1 开始)
    pub fn new(company_id: &str, name: &str, effective_from: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            card_id: Uuid::new_v4().to_string(),
            company_id: company_id.to_string(),
            name: name.to_string(),
            shipment_type: None,
            category: None,
            carrier_code: None,
            zone_pricing: HashMap::new(),
            cod_charge: CodChargeConfig {
                percent: dec!(2),
                minimum_charge: dec!(30),
                slabs: Vec::new(),
            },
            fuel_surcharge: FuelSurchargeConfig {
                percent: Decimal::ZERO,
                basis: FuelBasis::Freight,
            },
            remote_area: RemoteAreaConfig {
                enabled: false,
                charge: Decimal::ZERO,
            },
            minimum_fare: MinimumFareConfig {
                amount: Decimal::ZERO,
                basis: MinimumFareBasis::Freight,
            },
            zone_b_mode: ZoneBMode::State,
            weight_policy: WeightPolicy::default(),
            effective_from,
            effective_to: None,
            status: RateCardStatus::Draft,
            is_deleted: false,
            version_number: 1,
            parent_version_id: None,
            priority: 0,
            is_special_promotion: false,
            is_default: false,
            customer_overrides: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// 判断价卡在给定日期是否处于有效期内
    pub fn is_effective_on(&self, date: NaiveDate) -> bool {
        if self.effective_from > date {
            return false;
        }
        match self.effective_to {
            Some(end) => end >= date,
            None => true,
        }
    }

    /// 判断价卡是否匹配请求的运单类型(类型无关的卡匹配一切)
    pub fn matches_shipment_type(&self, shipment_type: ShipmentType) -> bool {
        match self.shipment_type {
            Some(t) => t == shipment_type,
            None => true,
        }
    }

    /// 判断价卡是否匹配请求的品类(品类无关的卡匹配一切)
    pub fn matches_category(&self, category: Option<&str>) -> bool {
        match (&self.category, category) {
            (None, _) => true,
            (Some(own), Some(req)) => own == req,
            (Some(_), None) => false,
        }
    }

    /// 查找客户ID精确命中的覆盖项
    pub fn find_customer_override(&self, customer_id: &str) -> Option<&CustomerOverride> {
        self.customer_overrides
            .iter()
            .find(|o| o.customer_id.as_deref() == Some(customer_id))
    }

    /// 查找客户组命中的覆盖项
    ///
    /// # 规则
    /// - 多个组同时命中时按 group_priority 降序取第一个
    /// - group_priority 并列时按列表顺序
    pub fn find_group_override(&self, customer_group: &str) -> Option<&CustomerOverride> {
        self.customer_overrides
            .iter()
            .filter(|o| o.customer_group.as_deref() == Some(customer_group))
            .max_by(|a, b| {
                // max_by 在并列时返回靠后的元素, 反转比较以保证取列表中靠前者
                match a.group_priority.cmp(&b.group_priority) {
                    std::cmp::Ordering::Equal => std::cmp::Ordering::Greater,
                    other => other,
                }
            })
    }

    /// 结构校验: 返回所有问题的描述列表, 空列表表示合法
    ///
    /// # 校验项
    /// 1. 五个区域的 zone_pricing 必须齐全
    /// 2. 区域价格字段非负, 免重为正
    /// 3. 取整单位与体积重除数必须为正
    /// 4. COD 分段区间下限不可大于上限, 且 flat/percent 至少一项
    /// 5. 有效期起止顺序
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        for zone in ZoneCode::ALL {
            match self.zone_pricing.get(&zone) {
                None => problems.push(format!("缺少区域 {} 的 zone_pricing 配置", zone)),
                Some(slab) => {
                    if slab.base_weight_kg <= Decimal::ZERO {
                        problems.push(format!("区域 {} 的免重必须为正", zone));
                    }
                    if slab.base_price < Decimal::ZERO
                        || slab.additional_price_per_kg < Decimal::ZERO
                    {
                        problems.push(format!("区域 {} 的价格字段不可为负", zone));
                    }
                }
            }
        }

        if self.weight_policy.rounding_unit_kg <= Decimal::ZERO {
            problems.push("计费重量取整单位必须为正".to_string());
        }
        if self.weight_policy.volumetric_divisor <= Decimal::ZERO {
            problems.push("体积重除数必须为正".to_string());
        }

        for (idx, slab) in self.cod_charge.slabs.iter().enumerate() {
            if let Some(max) = slab.max_value {
                if slab.min_value > max {
                    problems.push(format!("COD 分段 {} 的下限大于上限", idx));
                }
            }
            if slab.flat_charge.is_none() && slab.percent.is_none() {
                problems.push(format!("COD 分段 {} 缺少 flat_charge/percent", idx));
            }
        }

        if let Some(end) = self.effective_to {
            if end < self.effective_from {
                problems.push("有效期结束日期早于开始日期".to_string());
            }
        }

        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card_with_full_zones() -> RateCard {
        let mut card = RateCard::new("CMP001", "标准价卡", NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        for zone in ZoneCode::ALL {
            card.zone_pricing.insert(
                zone,
                ZoneSlabPricing {
                    base_weight_kg: dec!(0.5),
                    base_price: dec!(40),
                    additional_price_per_kg: dec!(20),
                },
            );
        }
        card
    }

    #[test]
    fn test_validate_ok() {
        let card = card_with_full_zones();
        assert!(card.validate().is_empty());
    }

    #[test]
    fn test_validate_missing_zone() {
        let mut card = card_with_full_zones();
        card.zone_pricing.remove(&ZoneCode::E);
        let problems = card.validate();
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("E"));
    }

    #[test]
    fn test_is_effective_on_window() {
        let mut card = card_with_full_zones();
        card.effective_to = Some(NaiveDate::from_ymd_opt(2026, 6, 30).unwrap());

        assert!(!card.is_effective_on(NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()));
        assert!(card.is_effective_on(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()));
        assert!(card.is_effective_on(NaiveDate::from_ymd_opt(2026, 6, 30).unwrap()));
        assert!(!card.is_effective_on(NaiveDate::from_ymd_opt(2026, 7, 1).unwrap()));
    }

    #[test]
    fn test_matches_category_agnostic() {
        let mut card = card_with_full_zones();
        assert!(card.matches_category(Some("economy")));
        assert!(card.matches_category(None));

        card.category = Some("premium".to_string());
        assert!(card.matches_category(Some("premium")));
        assert!(!card.matches_category(Some("economy")));
        assert!(!card.matches_category(None));
    }

    #[test]
    fn test_find_group_override_priority() {
        let mut card = card_with_full_zones();
        card.customer_overrides = vec![
            CustomerOverride {
                customer_id: None,
                customer_group: Some("VIP".to_string()),
                group_priority: 10,
                discount_percent: Some(dec!(5)),
                flat_discount: None,
            },
            CustomerOverride {
                customer_id: None,
                customer_group: Some("VIP".to_string()),
                group_priority: 20,
                discount_percent: Some(dec!(8)),
                flat_discount: None,
            },
        ];

        let hit = card.find_group_override("VIP").expect("应命中 VIP 覆盖");
        assert_eq!(hit.group_priority, 20);
        assert_eq!(hit.discount_percent, Some(dec!(8)));
    }

    #[test]
    fn test_find_group_override_tie_keeps_list_order() {
        let mut card = card_with_full_zones();
        card.customer_overrides = vec![
            CustomerOverride {
                customer_id: None,
                customer_group: Some("VIP".to_string()),
                group_priority: 10,
                discount_percent: Some(dec!(5)),
                flat_discount: None,
            },
            CustomerOverride {
                customer_id: None,
                customer_group: Some("VIP".to_string()),
                group_priority: 10,
                discount_percent: Some(dec!(9)),
                flat_discount: None,
            },
        ];

        let hit = card.find_group_override("VIP").expect("应命中 VIP 覆盖");
        assert_eq!(hit.discount_percent, Some(dec!(5))); // 并列取列表靠前者
    }

    #[test]
    fn test_cod_slab_contains() {
        let slab = CodSlab {
            min_value: dec!(0),
            max_value: Some(dec!(1000)),
            flat_charge: Some(dec!(25)),
            percent: None,
        };
        assert!(slab.contains(dec!(0)));
        assert!(slab.contains(dec!(1000)));
        assert!(!slab.contains(dec!(1000.01)));

        let open = CodSlab {
            min_value: dec!(5000),
            max_value: None,
            flat_charge: None,
            percent: Some(dec!(1.5)),
        };
        assert!(open.contains(dec!(99999)));
        assert!(!open.contains(dec!(4999.99)));
    }
}
