// ==========================================
// 运费计价引擎 - Pricing Core 纯函数库
// ==========================================
// 职责: 提供计费重量、运费、各项附加费、税费的纯计算逻辑
// 红线: 无状态、无副作用、无 I/O 操作、不读墙上时钟
// 红线: 相同输入必须产出逐位相同的结果(Decimal, 不用浮点)
// ==========================================

use crate::domain::pricing::TaxBreakdown;
use crate::domain::rate_card::{
    CodChargeConfig, CustomerOverride, FuelSurchargeConfig, MinimumFareConfig, RemoteAreaConfig,
    WeightPolicy, ZoneSlabPricing,
};
use crate::domain::types::{FuelBasis, MinimumFareBasis, PaymentMode, ZoneCode};
use crate::engine::error::{PricingEngineResult, PricingError};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// 货币最小精度(2 位小数)
pub const CURRENCY_SCALE: u32 = 2;

const HUNDRED: Decimal = dec!(100);

// ==========================================
// PricingCore - 纯函数工具类
// ==========================================
pub struct PricingCore;

impl PricingCore {
    /// 货币取整: 2 位小数, 中点远离零
    pub fn round_currency(value: Decimal) -> Decimal {
        value.round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero)
    }

    /// 体积重 = 长 × 宽 × 高 / 除数 (单位 cm, 除数通常 5000)
    pub fn volumetric_weight(
        length_cm: Decimal,
        width_cm: Decimal,
        height_cm: Decimal,
        divisor: Decimal,
    ) -> Decimal {
        length_cm * width_cm * height_cm / divisor
    }

    /// 向上取整到取整单位
    ///
    /// # 规则
    /// - rounded = ceil(weight / unit) × unit
    /// - 1.2kg @ 0.5kg 单位 → 1.5kg
    pub fn round_up_to_unit(weight_kg: Decimal, unit_kg: Decimal) -> Decimal {
        (weight_kg / unit_kg).ceil() * unit_kg
    }

    /// 计算计费重量
    ///
    /// # 规则
    /// 1. volumetric = L×W×H/divisor (仅在三维齐全时)
    /// 2. chargeable = max(actual, volumetric)
    /// 3. 按价卡取整单位向上取整
    ///
    /// # 错误
    /// - 实际重量 ≤ 0 → ValidationError
    /// - 任一维度 ≤ 0 → ValidationError
    ///
    /// # 返回
    /// - (计费重量, 决策原因)
    pub fn chargeable_weight(
        actual_kg: Decimal,
        dimensions_cm: Option<(Decimal, Decimal, Decimal)>,
        policy: &WeightPolicy,
    ) -> PricingEngineResult<(Decimal, Vec<String>)> {
        if actual_kg <= Decimal::ZERO {
            return Err(PricingError::Validation(format!(
                "实际重量必须为正: weight_kg={}",
                actual_kg
            )));
        }

        let mut reasons = Vec::new();
        let mut raw = actual_kg;

        if let Some((l, w, h)) = dimensions_cm {
            if l <= Decimal::ZERO || w <= Decimal::ZERO || h <= Decimal::ZERO {
                return Err(PricingError::Validation(format!(
                    "尺寸必须为正: L={} W={} H={}",
                    l, w, h
                )));
            }
            let volumetric = Self::volumetric_weight(l, w, h, policy.volumetric_divisor);
            if volumetric > actual_kg {
                reasons.push(format!(
                    "VOLUMETRIC: {}kg > actual {}kg",
                    volumetric, actual_kg
                ));
                raw = volumetric;
            }
        }

        let rounded = Self::round_up_to_unit(raw, policy.rounding_unit_kg);
        reasons.push(format!(
            "WEIGHT_ROUNDED: {}kg -> {}kg (unit={}kg)",
            raw, rounded, policy.rounding_unit_kg
        ));

        Ok((rounded, reasons))
    }

    /// 计算运费(首重 + 续重)
    ///
    /// # 规则
    /// - chargeable ≤ base_weight → base_price
    /// - 否则 → base_price + (chargeable − base_weight) × additional_price_per_kg
    pub fn freight(slab: &ZoneSlabPricing, chargeable_kg: Decimal) -> Decimal {
        let raw = if chargeable_kg <= slab.base_weight_kg {
            slab.base_price
        } else {
            slab.base_price
                + (chargeable_kg - slab.base_weight_kg) * slab.additional_price_per_kg
        };
        Self::round_currency(raw)
    }

    /// 对运费应用客户覆盖折扣
    ///
    /// # 规则
    /// - discount_percent 与 flat_discount 可叠加(先按百分比, 再减固定额)
    /// - 折后运费不为负
    ///
    /// # 返回
    /// - (折后运费, 决策原因)
    pub fn apply_customer_discount(
        freight: Decimal,
        over: &CustomerOverride,
    ) -> (Decimal, Option<String>) {
        let mut discounted = freight;

        if let Some(pct) = over.discount_percent {
            discounted -= discounted * pct / HUNDRED;
        }
        if let Some(flat) = over.flat_discount {
            discounted -= flat;
        }
        if discounted < Decimal::ZERO {
            discounted = Decimal::ZERO;
        }
        discounted = Self::round_currency(discounted);

        if discounted == freight {
            (freight, None)
        } else {
            let reason = format!("CUSTOMER_DISCOUNT: freight {} -> {}", freight, discounted);
            (discounted, Some(reason))
        }
    }

    /// 计算 COD 手续费
    ///
    /// # 规则
    /// 1. 非 COD 运单 → 0
    /// 2. 配置了分段费率时, 取申报价值所在区间的 flat/percent 规则
    ///    (同时配置取较大值; 无区间命中时回落到百分比规则)
    /// 3. 否则 → max(declared × percent, minimum_charge)
    ///
    /// # 返回
    /// - (手续费, 决策原因)
    pub fn cod_charge(
        config: &CodChargeConfig,
        payment_mode: PaymentMode,
        declared_value: Decimal,
    ) -> (Decimal, Option<String>) {
        if payment_mode != PaymentMode::Cod {
            return (Decimal::ZERO, None);
        }

        if !config.slabs.is_empty() {
            if let Some(slab) = config.slabs.iter().find(|s| s.contains(declared_value)) {
                let flat = slab.flat_charge.unwrap_or(Decimal::ZERO);
                let pct_charge = slab
                    .percent
                    .map(|p| declared_value * p / HUNDRED)
                    .unwrap_or(Decimal::ZERO);
                let charge = Self::round_currency(flat.max(pct_charge));
                return (
                    charge,
                    Some(format!(
                        "COD_SLAB: declared={} in [{}, {:?}] -> {}",
                        declared_value, slab.min_value, slab.max_value, charge
                    )),
                );
            }
            // 区间未覆盖申报价值时回落到百分比规则
        }

        let pct_charge = declared_value * config.percent / HUNDRED;
        let charge = Self::round_currency(pct_charge.max(config.minimum_charge));
        (
            charge,
            Some(format!(
                "COD_PERCENT: max({}x{}%, floor {}) -> {}",
                declared_value, config.percent, config.minimum_charge, charge
            )),
        )
    }

    /// 计算燃油附加费
    ///
    /// # 规则
    /// - 基数 = freight 或 freight + cod (按配置)
    /// - fuel = 基数 × percent
    pub fn fuel_surcharge(
        config: &FuelSurchargeConfig,
        freight: Decimal,
        cod_charge: Decimal,
    ) -> Decimal {
        let basis = match config.basis {
            FuelBasis::Freight => freight,
            FuelBasis::FreightPlusCod => freight + cod_charge,
        };
        Self::round_currency(basis * config.percent / HUNDRED)
    }

    /// 计算偏远地区附加费
    ///
    /// # 规则
    /// - 未启用 → 0
    /// - 目的邮编标记偏远, 或解析区域为 E → 固定附加费
    pub fn remote_area_charge(
        config: &RemoteAreaConfig,
        zone: ZoneCode,
        dest_is_remote: bool,
    ) -> Decimal {
        if config.enabled && (dest_is_remote || zone == ZoneCode::E) {
            Self::round_currency(config.charge)
        } else {
            Decimal::ZERO
        }
    }

    /// 计算最低运费补足额
    ///
    /// # 规则
    /// - 基数 = freight 或 (freight + cod + fuel + remote) (按配置)
    /// - 基数 < minimum_fare → 补足差额(恰好补到 minimum_fare, 永不超补)
    /// - 基数 ≥ minimum_fare → 0
    pub fn minimum_fare_top_up(
        config: &MinimumFareConfig,
        freight: Decimal,
        cod_charge: Decimal,
        fuel: Decimal,
        remote: Decimal,
    ) -> Decimal {
        let basis = match config.basis {
            MinimumFareBasis::Freight => freight,
            MinimumFareBasis::FreightPlusOverheads => freight + cod_charge + fuel + remote,
        };
        if basis < config.amount {
            Self::round_currency(config.amount - basis)
        } else {
            Decimal::ZERO
        }
    }

    /// 计算税费明细
    ///
    /// # 规则
    /// - 同邦: CGST + SGST 各半(先算总税再二分, 保证 CGST+SGST 与 IGST 分毫不差)
    /// - 跨邦: IGST 全额
    /// - 税只对小计计一次, 不复利
    pub fn tax(
        subtotal: Decimal,
        gst_rate_percent: Decimal,
        origin_state: &str,
        dest_state: &str,
    ) -> TaxBreakdown {
        let total_tax = Self::round_currency(subtotal * gst_rate_percent / HUNDRED);

        if origin_state == dest_state {
            let cgst = Self::round_currency(total_tax / dec!(2));
            let sgst = total_tax - cgst;
            TaxBreakdown {
                cgst: Some(cgst),
                sgst: Some(sgst),
                igst: None,
            }
        } else {
            TaxBreakdown {
                cgst: None,
                sgst: None,
                igst: Some(total_tax),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::WeightRoundingMode;

    fn policy(unit: Decimal, divisor: Decimal) -> WeightPolicy {
        WeightPolicy {
            rounding_unit_kg: unit,
            rounding_mode: WeightRoundingMode::Ceil,
            volumetric_divisor: divisor,
        }
    }

    // ==========================================
    // 测试 1: 计费重量
    // ==========================================

    #[test]
    fn test_chargeable_weight_ceil_scenario() {
        // 1.2kg @ 0.5kg 取整单位 → 1.5kg
        let (w, _) =
            PricingCore::chargeable_weight(dec!(1.2), None, &policy(dec!(0.5), dec!(5000)))
                .expect("计费重量计算失败");
        assert_eq!(w, dec!(1.5));
    }

    #[test]
    fn test_chargeable_weight_exact_multiple_no_overshoot() {
        // 恰为取整单位整数倍时不再上跳
        let (w, _) =
            PricingCore::chargeable_weight(dec!(1.5), None, &policy(dec!(0.5), dec!(5000)))
                .expect("计费重量计算失败");
        assert_eq!(w, dec!(1.5));
    }

    #[test]
    fn test_chargeable_weight_volumetric_wins() {
        // 30×40×50/5000 = 12kg > 实际 2kg
        let (w, reasons) = PricingCore::chargeable_weight(
            dec!(2),
            Some((dec!(30), dec!(40), dec!(50))),
            &policy(dec!(0.5), dec!(5000)),
        )
        .expect("计费重量计算失败");
        assert_eq!(w, dec!(12.0));
        assert!(reasons.iter().any(|r| r.contains("VOLUMETRIC")));
    }

    #[test]
    fn test_chargeable_weight_actual_wins() {
        // 10×10×10/5000 = 0.2kg < 实际 3kg
        let (w, reasons) = PricingCore::chargeable_weight(
            dec!(3),
            Some((dec!(10), dec!(10), dec!(10))),
            &policy(dec!(1), dec!(5000)),
        )
        .expect("计费重量计算失败");
        assert_eq!(w, dec!(3));
        assert!(!reasons.iter().any(|r| r.contains("VOLUMETRIC")));
    }

    #[test]
    fn test_chargeable_weight_rounded_within_one_unit() {
        // 取整后 ≥ 原值, 且与原值差不超过一个取整单位
        let unit = dec!(0.5);
        for raw in [dec!(0.01), dec!(0.5), dec!(0.51), dec!(1.2), dec!(7.49)] {
            let (w, _) = PricingCore::chargeable_weight(raw, None, &policy(unit, dec!(5000)))
                .expect("计费重量计算失败");
            assert!(w >= raw);
            assert!(w - raw < unit);
        }
    }

    #[test]
    fn test_chargeable_weight_rejects_non_positive() {
        let err = PricingCore::chargeable_weight(dec!(0), None, &policy(dec!(0.5), dec!(5000)))
            .expect_err("零重量应失败");
        assert!(matches!(err, PricingError::Validation(_)));

        let err = PricingCore::chargeable_weight(dec!(-1), None, &policy(dec!(0.5), dec!(5000)))
            .expect_err("负重量应失败");
        assert!(matches!(err, PricingError::Validation(_)));
    }

    #[test]
    fn test_chargeable_weight_rejects_bad_dimensions() {
        let err = PricingCore::chargeable_weight(
            dec!(1),
            Some((dec!(30), dec!(0), dec!(10))),
            &policy(dec!(0.5), dec!(5000)),
        )
        .expect_err("零维度应失败");
        assert!(matches!(err, PricingError::Validation(_)));
    }

    // ==========================================
    // 测试 2: 运费
    // ==========================================

    fn slab() -> ZoneSlabPricing {
        ZoneSlabPricing {
            base_weight_kg: dec!(0.5),
            base_price: dec!(40),
            additional_price_per_kg: dec!(20),
        }
    }

    #[test]
    fn test_freight_within_base_weight() {
        assert_eq!(PricingCore::freight(&slab(), dec!(0.5)), dec!(40));
        assert_eq!(PricingCore::freight(&slab(), dec!(0.3)), dec!(40));
    }

    #[test]
    fn test_freight_beyond_base_weight() {
        // 40 + (2.0 - 0.5) × 20 = 70
        assert_eq!(PricingCore::freight(&slab(), dec!(2.0)), dec!(70.00));
    }

    // ==========================================
    // 测试 3: COD 手续费
    // ==========================================

    #[test]
    fn test_cod_charge_prepaid_is_zero() {
        let config = CodChargeConfig {
            percent: dec!(2),
            minimum_charge: dec!(30),
            slabs: Vec::new(),
        };
        let (charge, reason) = PricingCore::cod_charge(&config, PaymentMode::Prepaid, dec!(5000));
        assert_eq!(charge, Decimal::ZERO);
        assert!(reason.is_none());
    }

    #[test]
    fn test_cod_charge_percent_vs_floor() {
        let config = CodChargeConfig {
            percent: dec!(2),
            minimum_charge: dec!(30),
            slabs: Vec::new(),
        };
        // 2% × 1000 = 20 < 30 → 取下限
        let (charge, _) = PricingCore::cod_charge(&config, PaymentMode::Cod, dec!(1000));
        assert_eq!(charge, dec!(30));
        // 2% × 5000 = 100 > 30 → 取百分比
        let (charge, _) = PricingCore::cod_charge(&config, PaymentMode::Cod, dec!(5000));
        assert_eq!(charge, dec!(100.00));
    }

    #[test]
    fn test_cod_charge_slab_hit() {
        use crate::domain::rate_card::CodSlab;
        let config = CodChargeConfig {
            percent: dec!(2),
            minimum_charge: dec!(30),
            slabs: vec![
                CodSlab {
                    min_value: dec!(0),
                    max_value: Some(dec!(1000)),
                    flat_charge: Some(dec!(25)),
                    percent: None,
                },
                CodSlab {
                    min_value: dec!(1000.01),
                    max_value: None,
                    flat_charge: None,
                    percent: Some(dec!(1.5)),
                },
            ],
        };

        let (charge, reason) = PricingCore::cod_charge(&config, PaymentMode::Cod, dec!(800));
        assert_eq!(charge, dec!(25));
        assert!(reason.expect("应有原因").contains("COD_SLAB"));

        let (charge, _) = PricingCore::cod_charge(&config, PaymentMode::Cod, dec!(2000));
        assert_eq!(charge, dec!(30.00)); // 1.5% × 2000
    }

    #[test]
    fn test_cod_charge_slab_miss_falls_back_to_percent() {
        use crate::domain::rate_card::CodSlab;
        let config = CodChargeConfig {
            percent: dec!(2),
            minimum_charge: dec!(10),
            slabs: vec![CodSlab {
                min_value: dec!(5000),
                max_value: None,
                flat_charge: Some(dec!(60)),
                percent: None,
            }],
        };
        // 申报价值 1000 未命中任何区间 → 回落百分比规则
        let (charge, reason) = PricingCore::cod_charge(&config, PaymentMode::Cod, dec!(1000));
        assert_eq!(charge, dec!(20.00));
        assert!(reason.expect("应有原因").contains("COD_PERCENT"));
    }

    // ==========================================
    // 测试 4: 燃油附加费
    // ==========================================

    #[test]
    fn test_fuel_surcharge_bases() {
        let freight_only = FuelSurchargeConfig {
            percent: dec!(10),
            basis: FuelBasis::Freight,
        };
        assert_eq!(
            PricingCore::fuel_surcharge(&freight_only, dec!(75), dec!(20)),
            dec!(7.50)
        );

        let with_cod = FuelSurchargeConfig {
            percent: dec!(10),
            basis: FuelBasis::FreightPlusCod,
        };
        assert_eq!(
            PricingCore::fuel_surcharge(&with_cod, dec!(75), dec!(20)),
            dec!(9.50)
        );
    }

    // ==========================================
    // 测试 5: 偏远附加费
    // ==========================================

    #[test]
    fn test_remote_area_charge_rules() {
        let config = RemoteAreaConfig {
            enabled: true,
            charge: dec!(50),
        };
        assert_eq!(
            PricingCore::remote_area_charge(&config, ZoneCode::E, false),
            dec!(50)
        );
        assert_eq!(
            PricingCore::remote_area_charge(&config, ZoneCode::D, true),
            dec!(50)
        );
        assert_eq!(
            PricingCore::remote_area_charge(&config, ZoneCode::D, false),
            Decimal::ZERO
        );

        let disabled = RemoteAreaConfig {
            enabled: false,
            charge: dec!(50),
        };
        assert_eq!(
            PricingCore::remote_area_charge(&disabled, ZoneCode::E, true),
            Decimal::ZERO
        );
    }

    // ==========================================
    // 测试 6: 最低运费补足
    // ==========================================

    #[test]
    fn test_minimum_fare_top_up_exact_deficit() {
        // 最低运费 40, 运费基数 32 → 补 8
        let config = MinimumFareConfig {
            amount: dec!(40),
            basis: MinimumFareBasis::Freight,
        };
        let top_up =
            PricingCore::minimum_fare_top_up(&config, dec!(32), dec!(0), dec!(0), dec!(0));
        assert_eq!(top_up, dec!(8));
    }

    #[test]
    fn test_minimum_fare_top_up_zero_when_met() {
        let config = MinimumFareConfig {
            amount: dec!(40),
            basis: MinimumFareBasis::Freight,
        };
        assert_eq!(
            PricingCore::minimum_fare_top_up(&config, dec!(40), dec!(0), dec!(0), dec!(0)),
            Decimal::ZERO
        );
        assert_eq!(
            PricingCore::minimum_fare_top_up(&config, dec!(55), dec!(0), dec!(0), dec!(0)),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_minimum_fare_top_up_overheads_basis() {
        // 基数含各项附加费: 30 + 20 + 5 + 0 = 55 ≥ 50 → 不补
        let config = MinimumFareConfig {
            amount: dec!(50),
            basis: MinimumFareBasis::FreightPlusOverheads,
        };
        assert_eq!(
            PricingCore::minimum_fare_top_up(&config, dec!(30), dec!(20), dec!(5), dec!(0)),
            Decimal::ZERO
        );
        // 仅运费基数则不足: 30 < 50 → 补 20
        let freight_basis = MinimumFareConfig {
            amount: dec!(50),
            basis: MinimumFareBasis::Freight,
        };
        assert_eq!(
            PricingCore::minimum_fare_top_up(&freight_basis, dec!(30), dec!(20), dec!(5), dec!(0)),
            dec!(20)
        );
    }

    // ==========================================
    // 测试 7: 税费
    // ==========================================

    #[test]
    fn test_tax_intra_state_split() {
        let tax = PricingCore::tax(dec!(104.50), dec!(18), "MH", "MH");
        assert_eq!(tax.cgst, Some(dec!(9.41)));
        assert_eq!(tax.sgst, Some(dec!(9.40)));
        assert_eq!(tax.igst, None);
        assert_eq!(tax.total(), dec!(18.81));
    }

    #[test]
    fn test_tax_inter_state_igst() {
        let tax = PricingCore::tax(dec!(104.50), dec!(18), "DL", "MH");
        assert_eq!(tax.cgst, None);
        assert_eq!(tax.sgst, None);
        assert_eq!(tax.igst, Some(dec!(18.81)));
    }

    #[test]
    fn test_tax_split_equals_igst_to_the_cent() {
        // 对同一小计, CGST+SGST 必须与 IGST 分毫不差
        for subtotal in [dec!(104.50), dec!(99.99), dec!(0.01), dec!(123.45), dec!(33.33)] {
            let intra = PricingCore::tax(subtotal, dec!(18), "KA", "KA");
            let inter = PricingCore::tax(subtotal, dec!(18), "KA", "TN");
            assert_eq!(intra.total(), inter.total(), "subtotal={}", subtotal);
        }
    }

    // ==========================================
    // 测试 8: 客户折扣
    // ==========================================

    #[test]
    fn test_apply_customer_discount_percent_and_flat() {
        let over = CustomerOverride {
            customer_id: Some("CUST01".to_string()),
            customer_group: None,
            group_priority: 0,
            discount_percent: Some(dec!(10)),
            flat_discount: Some(dec!(5)),
        };
        // 100 → 90 → 85
        let (discounted, reason) = PricingCore::apply_customer_discount(dec!(100), &over);
        assert_eq!(discounted, dec!(85.00));
        assert!(reason.expect("应有原因").contains("CUSTOMER_DISCOUNT"));
    }

    #[test]
    fn test_apply_customer_discount_never_negative() {
        let over = CustomerOverride {
            customer_id: Some("CUST01".to_string()),
            customer_group: None,
            group_priority: 0,
            discount_percent: None,
            flat_discount: Some(dec!(999)),
        };
        let (discounted, _) = PricingCore::apply_customer_discount(dec!(40), &over);
        assert_eq!(discounted, Decimal::ZERO);
    }
}
