// ==========================================
// 运费计价引擎 - 配置管理器
// ==========================================
// 职责: 管理 config_kv 表(全局计价参数), 提供类型化读取接口
// 红线: 配置值解析失败回落默认值并告警, 绝不让计价因配置脏数据中断
// ==========================================

use crate::config::config_keys;
use crate::db::open_sqlite_connection;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tracing::warn;

/// 全局配置作用域
const GLOBAL_SCOPE: &str = "global";

// ==========================================
// PricingConfigReader - 计价配置读取接口
// ==========================================
// 计价引擎只依赖此接口, 不关心配置落在哪(SQLite / 测试桩)
#[async_trait]
pub trait PricingConfigReader: Send + Sync {
    /// GST 税率(百分比, 默认 18)
    async fn get_gst_rate_percent(&self) -> RepositoryResult<Decimal>;

    /// 大都市邮编前缀集合
    async fn get_metro_pincode_prefixes(&self) -> RepositoryResult<Vec<String>>;

    /// 偏远邦代码集合
    async fn get_remote_state_codes(&self) -> RepositoryResult<Vec<String>>;

    /// DISTANCE 模式下的 B 区距离阈值(km, 默认 500)
    async fn get_zone_b_distance_threshold_km(&self) -> RepositoryResult<f64>;

    /// 微区前缀长度(默认 3)
    async fn get_micro_region_prefix_len(&self) -> RepositoryResult<usize>;

    /// 邮政主数据缓存 TTL(秒, 默认 86400)
    async fn get_pincode_cache_ttl_secs(&self) -> RepositoryResult<u64>;

    /// 价卡缓存 TTL(秒, 默认 3600)
    async fn get_rate_card_cache_ttl_secs(&self) -> RepositoryResult<u64>;
}

// ==========================================
// ConfigManager - SQLite 配置存储
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        let manager = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        manager.ensure_table()?;
        Ok(manager)
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        let manager = Self { conn };
        manager.ensure_table()?;
        Ok(manager)
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 确保表存在(如果不存在则创建)
    fn ensure_table(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS config_kv (
              scope_id TEXT NOT NULL,
              config_key TEXT NOT NULL,
              config_value TEXT NOT NULL,
              updated_at TEXT NOT NULL DEFAULT (datetime('now')),
              PRIMARY KEY (scope_id, config_key)
            );
            "#,
        )?;
        Ok(())
    }

    /// 读取全局配置值; 未配置返回 None
    pub fn get_config(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let result = conn.query_row(
            "SELECT config_value FROM config_kv WHERE scope_id = ?1 AND config_key = ?2",
            params![GLOBAL_SCOPE, key],
            |row| row.get::<_, String>(0),
        );
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 读取全局配置值, 缺失时返回默认值
    pub fn get_config_or_default(&self, key: &str, default: &str) -> RepositoryResult<String> {
        Ok(self.get_config(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 写入全局配置值(覆盖)
    pub fn set_config(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, config_key, config_value, updated_at)
            VALUES (?1, ?2, ?3, datetime('now'))
            ON CONFLICT(scope_id, config_key) DO UPDATE SET
                config_value = excluded.config_value,
                updated_at = excluded.updated_at
            "#,
            params![GLOBAL_SCOPE, key, value],
        )?;
        Ok(())
    }

    /// 按类型解析配置值; 解析失败回落默认值并告警
    fn parse_or_default<T: FromStr>(&self, key: &str, default: &str) -> RepositoryResult<T> {
        let raw = self.get_config_or_default(key, default)?;
        match raw.parse::<T>() {
            Ok(v) => Ok(v),
            Err(_) => {
                warn!(key = %key, value = %raw, default = %default, "配置值解析失败, 回落默认值");
                default.parse::<T>().map_err(|_| {
                    RepositoryError::ValidationError(format!("配置默认值不可解析: {}", key))
                })
            }
        }
    }

    fn parse_csv(&self, key: &str, default: &str) -> RepositoryResult<Vec<String>> {
        let raw = self.get_config_or_default(key, default)?;
        Ok(raw
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect())
    }
}

#[async_trait]
impl PricingConfigReader for ConfigManager {
    async fn get_gst_rate_percent(&self) -> RepositoryResult<Decimal> {
        self.parse_or_default(
            config_keys::GST_RATE_PERCENT,
            config_keys::DEFAULT_GST_RATE_PERCENT,
        )
    }

    async fn get_metro_pincode_prefixes(&self) -> RepositoryResult<Vec<String>> {
        self.parse_csv(
            config_keys::METRO_PINCODE_PREFIXES,
            config_keys::DEFAULT_METRO_PINCODE_PREFIXES,
        )
    }

    async fn get_remote_state_codes(&self) -> RepositoryResult<Vec<String>> {
        self.parse_csv(
            config_keys::REMOTE_STATE_CODES,
            config_keys::DEFAULT_REMOTE_STATE_CODES,
        )
    }

    async fn get_zone_b_distance_threshold_km(&self) -> RepositoryResult<f64> {
        self.parse_or_default(
            config_keys::ZONE_B_DISTANCE_THRESHOLD_KM,
            config_keys::DEFAULT_ZONE_B_DISTANCE_THRESHOLD_KM,
        )
    }

    async fn get_micro_region_prefix_len(&self) -> RepositoryResult<usize> {
        self.parse_or_default(
            config_keys::MICRO_REGION_PREFIX_LEN,
            config_keys::DEFAULT_MICRO_REGION_PREFIX_LEN,
        )
    }

    async fn get_pincode_cache_ttl_secs(&self) -> RepositoryResult<u64> {
        self.parse_or_default(
            config_keys::PINCODE_CACHE_TTL_SECS,
            config_keys::DEFAULT_PINCODE_CACHE_TTL_SECS,
        )
    }

    async fn get_rate_card_cache_ttl_secs(&self) -> RepositoryResult<u64> {
        self.parse_or_default(
            config_keys::RATE_CARD_CACHE_TTL_SECS,
            config_keys::DEFAULT_RATE_CARD_CACHE_TTL_SECS,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn setup_test_manager() -> ConfigManager {
        ConfigManager::new(":memory:").expect("Failed to create test manager")
    }

    #[tokio::test]
    async fn test_defaults_when_unset() {
        let manager = setup_test_manager();

        assert_eq!(
            manager.get_gst_rate_percent().await.expect("读取失败"),
            dec!(18)
        );
        assert_eq!(
            manager
                .get_zone_b_distance_threshold_km()
                .await
                .expect("读取失败"),
            500.0
        );
        assert_eq!(
            manager.get_micro_region_prefix_len().await.expect("读取失败"),
            3
        );
        assert_eq!(
            manager.get_pincode_cache_ttl_secs().await.expect("读取失败"),
            86_400
        );
        assert_eq!(
            manager.get_rate_card_cache_ttl_secs().await.expect("读取失败"),
            3_600
        );

        let prefixes = manager
            .get_metro_pincode_prefixes()
            .await
            .expect("读取失败");
        assert_eq!(prefixes.len(), 6);
        assert!(prefixes.contains(&"560".to_string()));

        let states = manager.get_remote_state_codes().await.expect("读取失败");
        assert!(states.contains(&"AN".to_string()));
    }

    #[tokio::test]
    async fn test_set_overrides_default() {
        let manager = setup_test_manager();
        manager
            .set_config(config_keys::GST_RATE_PERCENT, "12")
            .expect("写入失败");
        assert_eq!(
            manager.get_gst_rate_percent().await.expect("读取失败"),
            dec!(12)
        );

        // 覆盖写
        manager
            .set_config(config_keys::GST_RATE_PERCENT, "5")
            .expect("写入失败");
        assert_eq!(
            manager.get_gst_rate_percent().await.expect("读取失败"),
            dec!(5)
        );
    }

    #[tokio::test]
    async fn test_unparsable_value_falls_back() {
        let manager = setup_test_manager();
        manager
            .set_config(config_keys::GST_RATE_PERCENT, "abc")
            .expect("写入失败");
        assert_eq!(
            manager.get_gst_rate_percent().await.expect("读取失败"),
            dec!(18)
        );
    }

    #[tokio::test]
    async fn test_csv_parsing_trims_and_skips_empty() {
        let manager = setup_test_manager();
        manager
            .set_config(config_keys::REMOTE_STATE_CODES, " AR , AS ,, LD ")
            .expect("写入失败");
        let states = manager.get_remote_state_codes().await.expect("读取失败");
        assert_eq!(states, vec!["AR", "AS", "LD"]);
    }
}
