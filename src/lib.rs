// ==========================================
// 运费计价引擎
// ==========================================
// 分层:
// - domain:     领域模型(价卡/邮编/请求与结果)
// - repository: SQLite 持久化
// - cache:      读穿缓存与写后失效
// - config:     全局计价参数
// - engine:     区域解析/价卡选择/计价核心/编排
// ==========================================

pub mod cache;
pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod logging;
pub mod repository;

/// 版本号
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 应用名称
pub const APP_NAME: &str = "shipping-rate-engine";
