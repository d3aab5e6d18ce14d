// ==========================================
// 运费计价引擎 - Rate Card Selector 价卡选择引擎
// ==========================================
// 职责: 在候选价卡集合中确定唯一适用的价卡
// 红线: 选择是输入与配置集的纯函数; 相同输入对未变更的配置集
//       永远返回同一张卡, 绝不歧义、有默认卡时绝不为空
// ==========================================

use crate::domain::rate_card::RateCard;
use crate::domain::types::{RateCardStatus, ShipmentType};
use crate::engine::error::{PricingEngineResult, PricingError};
use chrono::NaiveDate;
use tracing::debug;

// ==========================================
// RateCardSource - 价卡候选集来源
// ==========================================
// 由仓储或缓存门面实现; 只返回 ACTIVE 且未软删除的记录
pub trait RateCardSource: Send + Sync {
    fn candidates(&self, company_id: &str) -> PricingEngineResult<Vec<RateCard>>;
}

// ==========================================
// SelectionQuery - 选择查询条件
// ==========================================
#[derive(Debug, Clone)]
pub struct SelectionQuery<'a> {
    pub company_id: &'a str,
    pub shipment_type: ShipmentType,
    pub category: Option<&'a str>,
    pub customer_id: Option<&'a str>,
    pub customer_group: Option<&'a str>,
    pub effective_date: NaiveDate,
}

/// 优先级档位(数值越大越优先)
/// 5: 客户ID覆盖命中  4: 客户组覆盖命中  3: 有效期内的限时促销卡
/// 2: 品类默认卡      1: 通过过滤的兜底卡
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SelectionTier {
    Fallback = 1,
    CategoryDefault = 2,
    SpecialPromotion = 3,
    GroupOverride = 4,
    CustomerOverride = 5,
}

// ==========================================
// RateCardSelector - 价卡选择引擎
// ==========================================
pub struct RateCardSelector;

impl RateCardSelector {
    /// 从候选集中选出唯一适用的价卡
    ///
    /// # 过滤阶段(全部满足)
    /// - company_id 匹配
    /// - status == ACTIVE 且未软删除
    /// - effective_from ≤ effective_date ≤ effective_to(缺省视为无上限)
    /// - 运单类型匹配(类型无关的卡匹配一切)
    /// - 品类匹配(品类无关的卡匹配一切)
    ///
    /// # 优先阶段(档位高者胜; 并列按 priority 降序, 再按 version_number 降序)
    ///
    /// # 错误
    /// - 过滤后为空 → NoRateCardError
    pub fn select<'c>(
        candidates: &'c [RateCard],
        query: &SelectionQuery<'_>,
    ) -> PricingEngineResult<(&'c RateCard, Vec<String>)> {
        let survivors: Vec<&RateCard> = candidates
            .iter()
            .filter(|c| Self::passes_filter(c, query))
            .collect();

        // 档位 → priority → version_number 的字典序最大者
        let selected = match survivors
            .iter()
            .max_by_key(|c| (Self::tier(c, query), c.priority, c.version_number))
            .copied()
        {
            Some(card) => card,
            None => {
                return Err(PricingError::NoRateCard {
                    company_id: query.company_id.to_string(),
                    shipment_type: query.shipment_type.to_string(),
                    category: query.category.map(|s| s.to_string()),
                })
            }
        };

        let tier = Self::tier(selected, query);
        let reasons = vec![format!(
            "RATE_CARD: id={} version={} tier={:?} priority={}",
            selected.card_id, selected.version_number, tier, selected.priority
        )];

        debug!(
            card_id = %selected.card_id,
            version = selected.version_number,
            tier = ?tier,
            candidates = candidates.len(),
            survivors = survivors.len(),
            "价卡选择完成"
        );

        Ok((selected, reasons))
    }

    /// 过滤阶段判定
    fn passes_filter(card: &RateCard, query: &SelectionQuery<'_>) -> bool {
        card.company_id == query.company_id
            && card.status == RateCardStatus::Active
            && !card.is_deleted
            && card.is_effective_on(query.effective_date)
            && card.matches_shipment_type(query.shipment_type)
            && card.matches_category(query.category)
    }

    /// 优先档位判定
    fn tier(card: &RateCard, query: &SelectionQuery<'_>) -> SelectionTier {
        if let Some(customer_id) = query.customer_id {
            if card.find_customer_override(customer_id).is_some() {
                return SelectionTier::CustomerOverride;
            }
        }
        if let Some(group) = query.customer_group {
            if card.find_group_override(group).is_some() {
                return SelectionTier::GroupOverride;
            }
        }
        // 促销卡的有效性按其自身有效期窗口判定(过滤阶段已校验)
        if card.is_special_promotion && card.is_effective_on(query.effective_date) {
            return SelectionTier::SpecialPromotion;
        }
        if card.is_default {
            return SelectionTier::CategoryDefault;
        }
        SelectionTier::Fallback
    }
}
