// ==========================================
// 运费计价引擎 - Pricing Engine 计价编排器
// ==========================================
// 职责: 串联区域解析 → 价卡选择 → 逐项计费 → 计税,
//       产出带决策原因的完整计价结果
// 红线: 计费顺序固定(重量 → 运费 → 折扣 → COD → 燃油 → 偏远 →
//       最低补足 → 税), 任何环节失败即整单失败
// 红线: 墙上时钟只在此处读一次(effective_date 缺省), 核心保持纯函数
// ==========================================

use crate::config::PricingConfigReader;
use crate::domain::pricing::{PricingRequest, PricingResult};
use crate::domain::rate_card::{CustomerOverride, RateCard};
use crate::engine::error::{PricingEngineResult, PricingError};
use crate::engine::pricing_core::PricingCore;
use crate::engine::rate_card_selector::{RateCardSelector, RateCardSource, SelectionQuery};
use crate::engine::zone_resolver::{PincodeLookup, ZoneResolver, ZoneRuleParams};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info};

// ==========================================
// PricingEngine - 计价编排器
// ==========================================
pub struct PricingEngine<C: PricingConfigReader> {
    config: Arc<C>,
    pincodes: Arc<dyn PincodeLookup>,
    cards: Arc<dyn RateCardSource>,
}

impl<C: PricingConfigReader> PricingEngine<C> {
    pub fn new(
        config: Arc<C>,
        pincodes: Arc<dyn PincodeLookup>,
        cards: Arc<dyn RateCardSource>,
    ) -> Self {
        Self {
            config,
            pincodes,
            cards,
        }
    }

    /// 从配置装配区域判定参数
    async fn zone_rule_params(&self) -> PricingEngineResult<ZoneRuleParams> {
        Ok(ZoneRuleParams {
            micro_region_prefix_len: self.config.get_micro_region_prefix_len().await?,
            metro_prefixes: self.config.get_metro_pincode_prefixes().await?,
            remote_states: self.config.get_remote_state_codes().await?,
            zone_b_distance_threshold_km: self.config.get_zone_b_distance_threshold_km().await?,
        })
    }

    /// 计价入口
    ///
    /// # 流程
    /// 1. 校验输入(支付方式与申报价值的一致性)
    /// 2. 选择价卡(候选集 → 过滤 → 优先档位)
    /// 3. 按价卡的 B 区模式解析区域
    /// 4. 固定顺序逐项计费, 每条规则输出 reason
    ///
    /// # 错误
    /// - 邮编缺失 → ZoneResolution
    /// - 无适用价卡 → NoRateCard
    /// - 价卡结构不合法 / 区域缺价 → Config
    pub async fn price(&self, request: &PricingRequest) -> PricingEngineResult<PricingResult> {
        Self::validate_request(request)?;

        let effective_date = request
            .effective_date
            .unwrap_or_else(|| chrono::Utc::now().date_naive());

        let mut reasons = Vec::new();

        // ===== 价卡选择 =====
        let candidates = self.cards.candidates(&request.company_id)?;
        let query = SelectionQuery {
            company_id: &request.company_id,
            shipment_type: request.shipment_type,
            category: request.category.as_deref(),
            customer_id: request.customer_id.as_deref(),
            customer_group: request.customer_group.as_deref(),
            effective_date,
        };
        let (card, selection_reasons) = RateCardSelector::select(&candidates, &query)?;
        reasons.extend(selection_reasons);

        let problems = card.validate();
        if !problems.is_empty() {
            return Err(PricingError::Config(format!(
                "价卡 {} 结构不合法: {}",
                card.card_id,
                problems.join("; ")
            )));
        }

        // ===== 区域解析(B 区模式取自选中的价卡) =====
        let params = self.zone_rule_params().await?;
        let resolver = ZoneResolver::new(self.pincodes.clone(), params);
        let (zone, from_rec, to_rec, zone_reasons) = resolver.resolve_zone(
            &request.company_id,
            &request.from_pincode,
            &request.to_pincode,
            card.zone_b_mode,
        )?;
        reasons.extend(zone_reasons);

        let slab = card.zone_pricing.get(&zone).ok_or_else(|| {
            PricingError::Config(format!("价卡 {} 缺少区域 {} 的价格", card.card_id, zone))
        })?;

        // ===== 计费重量 =====
        let (chargeable_kg, weight_reasons) = PricingCore::chargeable_weight(
            request.weight_kg,
            request.dimensions(),
            &card.weight_policy,
        )?;
        reasons.extend(weight_reasons);

        // ===== 运费 + 客户折扣 =====
        let mut freight = PricingCore::freight(slab, chargeable_kg);
        debug!(zone = %zone, chargeable_kg = %chargeable_kg, freight = %freight, "运费计算完成");

        if let Some(over) = Self::applicable_override(card, request) {
            let (discounted, reason) = PricingCore::apply_customer_discount(freight, over);
            freight = discounted;
            if let Some(reason) = reason {
                reasons.push(reason);
            }
        }

        // ===== 附加费 =====
        let (cod_charge, cod_reason) = PricingCore::cod_charge(
            &card.cod_charge,
            request.payment_mode,
            request.declared_value,
        );
        if let Some(reason) = cod_reason {
            reasons.push(reason);
        }

        let fuel = PricingCore::fuel_surcharge(&card.fuel_surcharge, freight, cod_charge);
        if fuel > Decimal::ZERO {
            reasons.push(format!(
                "FUEL: {}% of {:?} -> {}",
                card.fuel_surcharge.percent, card.fuel_surcharge.basis, fuel
            ));
        }

        let resolver_params = resolver.params();
        let remote = PricingCore::remote_area_charge(
            &card.remote_area,
            zone,
            resolver_params.is_remote(&to_rec),
        );
        if remote > Decimal::ZERO {
            reasons.push(format!("REMOTE_AREA: {}", remote));
        }

        let top_up =
            PricingCore::minimum_fare_top_up(&card.minimum_fare, freight, cod_charge, fuel, remote);
        if top_up > Decimal::ZERO {
            reasons.push(format!(
                "MINIMUM_FARE: top up {} to reach {}",
                top_up, card.minimum_fare.amount
            ));
        }

        // ===== 小计与税 =====
        let subtotal =
            PricingCore::round_currency(freight + cod_charge + fuel + remote + top_up);
        let gst_rate = self.config.get_gst_rate_percent().await?;
        let tax = PricingCore::tax(subtotal, gst_rate, &from_rec.state, &to_rec.state);
        reasons.push(if from_rec.state == to_rec.state {
            format!("GST_INTRA: CGST+SGST {}% on {}", gst_rate, subtotal)
        } else {
            format!("GST_INTER: IGST {}% on {}", gst_rate, subtotal)
        });

        let total = PricingCore::round_currency(subtotal + tax.total());

        info!(
            company_id = %request.company_id,
            from = %request.from_pincode,
            to = %request.to_pincode,
            zone = %zone,
            card_id = %card.card_id,
            card_version = card.version_number,
            total = %total,
            "计价完成"
        );

        Ok(PricingResult {
            zone,
            chargeable_weight_kg: chargeable_kg,
            freight,
            cod_charge,
            fuel_surcharge: fuel,
            remote_area_charge: remote,
            minimum_fare_top_up: top_up,
            subtotal,
            tax_breakdown: tax,
            total,
            rate_card_id: card.card_id.clone(),
            rate_card_version: card.version_number,
            reasons,
        })
    }

    /// 输入一致性校验
    fn validate_request(request: &PricingRequest) -> PricingEngineResult<()> {
        if request.from_pincode.trim().is_empty() || request.to_pincode.trim().is_empty() {
            return Err(PricingError::Validation("邮编不可为空".to_string()));
        }
        if request.declared_value < Decimal::ZERO {
            return Err(PricingError::Validation(format!(
                "申报价值不可为负: {}",
                request.declared_value
            )));
        }
        Ok(())
    }

    /// 确定适用的客户覆盖项: 客户ID精确命中优先, 其次客户组
    fn applicable_override<'c>(
        card: &'c RateCard,
        request: &PricingRequest,
    ) -> Option<&'c CustomerOverride> {
        if let Some(customer_id) = request.customer_id.as_deref() {
            if let Some(over) = card.find_customer_override(customer_id) {
                return Some(over);
            }
        }
        if let Some(group) = request.customer_group.as_deref() {
            if let Some(over) = card.find_group_override(group) {
                return Some(over);
            }
        }
        None
    }
}
