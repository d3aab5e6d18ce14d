// ==========================================
// 运费计价引擎 - 配置键与默认值
// ==========================================
// 约定: 所有键集中定义, 读写两侧共用同一常量;
//       默认值是配置缺失时的回落, 不是业务硬编码
// ==========================================

/// GST 税率(百分比)
pub const GST_RATE_PERCENT: &str = "gst_rate_percent";
pub const DEFAULT_GST_RATE_PERCENT: &str = "18";

/// 大都市邮编前缀(逗号分隔)
pub const METRO_PINCODE_PREFIXES: &str = "metro_pincode_prefixes";
pub const DEFAULT_METRO_PINCODE_PREFIXES: &str = "110,400,560,600,700,500";

/// 偏远邦代码(逗号分隔)
pub const REMOTE_STATE_CODES: &str = "remote_state_codes";
pub const DEFAULT_REMOTE_STATE_CODES: &str = "AR,AS,MN,ML,MZ,NL,SK,TR,AN,LD,JK,LA";

/// DISTANCE 模式下的 B 区距离阈值(km)
pub const ZONE_B_DISTANCE_THRESHOLD_KM: &str = "zone_b_distance_threshold_km";
pub const DEFAULT_ZONE_B_DISTANCE_THRESHOLD_KM: &str = "500";

/// 微区前缀长度(邮编前 N 位)
pub const MICRO_REGION_PREFIX_LEN: &str = "micro_region_prefix_len";
pub const DEFAULT_MICRO_REGION_PREFIX_LEN: &str = "3";

/// 邮政主数据缓存 TTL(秒)
pub const PINCODE_CACHE_TTL_SECS: &str = "pincode_cache_ttl_secs";
pub const DEFAULT_PINCODE_CACHE_TTL_SECS: &str = "86400";

/// 价卡缓存 TTL(秒)
pub const RATE_CARD_CACHE_TTL_SECS: &str = "rate_card_cache_ttl_secs";
pub const DEFAULT_RATE_CARD_CACHE_TTL_SECS: &str = "3600";
