// ==========================================
// 运费计价引擎 - 引擎层错误类型
// ==========================================
// 红线: 任何解析/选择/校验失败都是计价调用的硬失败,
//       绝不回退到默认价格(静默默认会污染账单)
// 工具: thiserror 派生宏
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug)]
pub enum PricingError {
    // ===== 区域解析错误 =====
    #[error("区域解析失败: 邮编 {pincode} 不在邮政主数据中(不可服务)")]
    ZoneResolution { pincode: String },

    // ===== 价卡选择错误 =====
    #[error("无可用价卡: company_id={company_id}, shipment_type={shipment_type}, category={category:?}")]
    NoRateCard {
        company_id: String,
        shipment_type: String,
        category: Option<String>,
    },

    // ===== 配置错误 =====
    #[error("价卡配置错误: {0}")]
    Config(String),

    // ===== 输入校验错误 =====
    #[error("输入校验失败: {0}")]
    Validation(String),

    // ===== 下层透传 =====
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result 类型别名
pub type PricingEngineResult<T> = Result<T, PricingError>;
