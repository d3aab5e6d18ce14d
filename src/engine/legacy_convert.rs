// ==========================================
// 运费计价引擎 - 旧计价模型一次性转换
// ==========================================
// 职责: 将历史上并存的多种计价表示统一转换为 zone_pricing
// 红线: 转换是迁移期的一次性动作, 产出新版本价卡落库;
//       计价运行时只认 zone_pricing, 绝不回读旧表示
// ==========================================

use crate::domain::rate_card::{RateCard, ZoneSlabPricing};
use crate::domain::types::ZoneCode;
use crate::engine::error::{PricingEngineResult, PricingError};
use crate::engine::pricing_core::PricingCore;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

// ==========================================
// LegacyRateModel - 历史计价表示
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LegacyRateModel {
    /// 单一基准价 × 区域乘数
    BaseRateMultiplier {
        base_weight_kg: Decimal,
        base_price: Decimal,
        additional_price_per_kg: Decimal,
        zone_multipliers: HashMap<ZoneCode, Decimal>,
    },
    /// 单一基准价 + 区域附加额(只加在首重价格上)
    ZoneAdditive {
        base_weight_kg: Decimal,
        base_price: Decimal,
        additional_price_per_kg: Decimal,
        zone_surcharges: HashMap<ZoneCode, Decimal>,
    },
    /// 各区域已是显式阶梯价, 直接搬运
    PerZoneSlabs {
        zones: HashMap<ZoneCode, ZoneSlabPricing>,
    },
}

// ==========================================
// LegacyConverter - 转换器
// ==========================================
pub struct LegacyConverter;

impl LegacyConverter {
    /// 将旧表示转换为统一的 zone_pricing
    ///
    /// # 错误
    /// - 任一区域缺少乘数/附加额/阶梯价 → Config(转换必须五区齐全)
    pub fn convert(model: &LegacyRateModel) -> PricingEngineResult<HashMap<ZoneCode, ZoneSlabPricing>> {
        let mut zone_pricing = HashMap::new();

        match model {
            LegacyRateModel::BaseRateMultiplier {
                base_weight_kg,
                base_price,
                additional_price_per_kg,
                zone_multipliers,
            } => {
                for zone in ZoneCode::ALL {
                    let multiplier = zone_multipliers.get(&zone).ok_or_else(|| {
                        PricingError::Config(format!("旧模型缺少区域 {} 的乘数", zone))
                    })?;
                    zone_pricing.insert(
                        zone,
                        ZoneSlabPricing {
                            base_weight_kg: *base_weight_kg,
                            base_price: PricingCore::round_currency(base_price * multiplier),
                            additional_price_per_kg: PricingCore::round_currency(
                                additional_price_per_kg * multiplier,
                            ),
                        },
                    );
                }
            }
            LegacyRateModel::ZoneAdditive {
                base_weight_kg,
                base_price,
                additional_price_per_kg,
                zone_surcharges,
            } => {
                for zone in ZoneCode::ALL {
                    let surcharge = zone_surcharges.get(&zone).ok_or_else(|| {
                        PricingError::Config(format!("旧模型缺少区域 {} 的附加额", zone))
                    })?;
                    zone_pricing.insert(
                        zone,
                        ZoneSlabPricing {
                            base_weight_kg: *base_weight_kg,
                            base_price: PricingCore::round_currency(base_price + surcharge),
                            additional_price_per_kg: *additional_price_per_kg,
                        },
                    );
                }
            }
            LegacyRateModel::PerZoneSlabs { zones } => {
                for zone in ZoneCode::ALL {
                    let slab = zones.get(&zone).ok_or_else(|| {
                        PricingError::Config(format!("旧模型缺少区域 {} 的阶梯价", zone))
                    })?;
                    zone_pricing.insert(zone, slab.clone());
                }
            }
        }

        Ok(zone_pricing)
    }

    /// 基于旧表示构造升级后的价卡草案
    ///
    /// # 说明
    /// - 返回值由调用方经 supersede 落库, 获得版本号与审计链;
    ///   此处不做任何持久化
    pub fn upgraded_card(
        parent: &RateCard,
        model: &LegacyRateModel,
    ) -> PricingEngineResult<RateCard> {
        let zone_pricing = Self::convert(model)?;

        let mut upgraded = parent.clone();
        upgraded.zone_pricing = zone_pricing;

        let problems = upgraded.validate();
        if !problems.is_empty() {
            return Err(PricingError::Config(format!(
                "转换结果不合法: {}",
                problems.join("; ")
            )));
        }

        info!(
            card_id = %parent.card_id,
            company_id = %parent.company_id,
            "旧计价模型转换完成"
        );
        Ok(upgraded)
    }
}
