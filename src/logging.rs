// ==========================================
// 运费计价引擎 - 日志初始化
// ==========================================
// 工具: tracing + tracing-subscriber
// 约定: 级别由 RUST_LOG 控制, 默认 info
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 初始化日志系统(进程内只调用一次)
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(true).init();
}

/// 测试用日志初始化(重复调用不报错)
pub fn init_test() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
