// ==========================================
// 运费计价引擎 - 引擎层
// ==========================================
// 职责: 区域解析、价卡选择、计价核心、计价编排
// 红线: 核心计算为纯函数; I/O 与时钟只进编排器
// ==========================================

pub mod calculator;
pub mod error;
pub mod legacy_convert;
pub mod pricing_core;
pub mod rate_card_selector;
pub mod zone_resolver;

pub use calculator::PricingEngine;
pub use error::{PricingEngineResult, PricingError};
pub use legacy_convert::{LegacyConverter, LegacyRateModel};
pub use pricing_core::PricingCore;
pub use rate_card_selector::{RateCardSelector, RateCardSource, SelectionQuery, SelectionTier};
pub use zone_resolver::{PincodeLookup, ZoneResolver, ZoneResolverCore, ZoneRuleParams};
