// ==========================================
// 运费计价引擎 - 配置缓存层
// ==========================================
// 职责: 为邮政主数据与价卡文档提供读穿缓存
// 红线: 缓存是注入依赖(接口), 不是进程级单例;
//       计价核心保持纯函数、可独立测试
// 红线: 缓存故障按未命中处理, 读穿到后备存储,
//       绝不让计价返回部分/未定义结果
// ==========================================

pub mod facade;
pub mod keys;
pub mod memory;

use std::time::Duration;

/// 邮政主数据缓存默认 TTL(24 小时, 邮编/区域映射极少变更)
pub const DEFAULT_PINCODE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// 价卡文档缓存默认 TTL(1 小时, 商家编辑价格更频繁)
pub const DEFAULT_RATE_CARD_TTL: Duration = Duration::from_secs(60 * 60);

// ==========================================
// ConfigCache - 通用键值缓存接口
// ==========================================
// get 的未命中与过期统一表现为 None; 外部编辑流程对
// 后备记录的任何写入必须在返回成功前同步 invalidate 对应键
pub trait ConfigCache: Send + Sync {
    /// 读取缓存值; 未命中或已过期返回 None
    fn get(&self, key: &str) -> Option<String>;

    /// 写入缓存值并设置 TTL
    fn set(&self, key: &str, value: String, ttl: Duration);

    /// 使指定键立即失效
    fn invalidate(&self, key: &str);
}

// 重导出
pub use facade::{CachedPincodeLookup, CachedRateCardSource};
pub use memory::InMemoryCache;
