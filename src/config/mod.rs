// ==========================================
// 运费计价引擎 - 配置层
// ==========================================
// 职责: 全局计价参数的存储与类型化读取
// ==========================================

pub mod config_keys;
pub mod config_manager;

pub use config_manager::{ConfigManager, PricingConfigReader};
