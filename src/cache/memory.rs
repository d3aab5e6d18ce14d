// ==========================================
// 运费计价引擎 - 进程内键值缓存
// ==========================================
// 职责: ConfigCache 的默认实现(Mutex<HashMap> + 到期时间戳)
// 说明: 共享基础设施缓存(如 Redis)由部署侧以同一接口接入;
//       本实现用于单进程部署与测试
// ==========================================

use crate::cache::ConfigCache;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::warn;

// ==========================================
// InMemoryCache - 进程内缓存
// ==========================================
pub struct InMemoryCache {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// 清除所有已过期条目, 返回清除数量
    pub fn purge_expired(&self) -> usize {
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(e) => {
                warn!(error = %e, "缓存锁中毒, 跳过过期清理");
                return 0;
            }
        };
        let now = Instant::now();
        let before = entries.len();
        entries.retain(|_, (_, expires_at)| *expires_at > now);
        before - entries.len()
    }

    /// 当前条目数(含未清理的过期条目)
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigCache for InMemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        // 锁故障视为未命中(读穿到后备存储), 不阻断计价
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(e) => {
                warn!(error = %e, key = %key, "缓存锁中毒, 视为未命中");
                return None;
            }
        };

        match entries.get(key) {
            Some((value, expires_at)) if *expires_at > Instant::now() => Some(value.clone()),
            Some(_) => {
                // 过期条目在读路径上顺手删除
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn set(&self, key: &str, value: String, ttl: Duration) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), (value, Instant::now() + ttl));
        }
    }

    fn invalidate(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(key);
        }
    }
}
