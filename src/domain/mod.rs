// ==========================================
// 运费计价引擎 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、业务规则接口
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod pricing;
pub mod rate_card;
pub mod types;
pub mod zone;

// 重导出核心类型
pub use pricing::{PricingRequest, PricingResult, TaxBreakdown};
pub use rate_card::{
    CodChargeConfig, CodSlab, CustomerOverride, FuelSurchargeConfig, MinimumFareConfig,
    RateCard, RemoteAreaConfig, WeightPolicy, ZoneSlabPricing,
};
pub use types::{
    FuelBasis, MinimumFareBasis, PaymentMode, RateCardStatus, ShipmentType, WeightRoundingMode,
    ZoneBMode, ZoneCode,
};
pub use zone::PincodeRecord;
