// ==========================================
// 运费计价引擎 - 缓存门面
// ==========================================
// 职责: 在仓储之上实现读穿缓存, 并承载写后失效
// 红线: 所有写路径在返回成功前同步 invalidate 对应键,
//       读路径只允许 TTL 级陈旧, 不允许写后陈旧
// 红线: 缓存内容损坏按未命中处理并立即失效该键
// ==========================================

use crate::cache::keys::{pincode_key, rate_cards_key};
use crate::cache::ConfigCache;
use crate::domain::rate_card::RateCard;
use crate::domain::zone::PincodeRecord;
use crate::engine::error::PricingEngineResult;
use crate::engine::rate_card_selector::RateCardSource;
use crate::engine::zone_resolver::PincodeLookup;
use crate::repository::{PincodeRepository, RateCardRepository, RepositoryResult};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// 共享回落哨兵: 商家键存此值表示"该商家走共享默认键"(非合法记录 JSON)
const SHARED_FALLBACK_MARKER: &str = "@shared";

// ==========================================
// CachedPincodeLookup - 邮政主数据读穿缓存
// ==========================================
// 键方案: 记录只缓存在归属方自己的键下(商家私有键或共享默认键);
// 商家命中共享回落时, 商家键存一个指向默认键的哨兵标记。
// 商家键缺失不允许直接回落默认键, 否则会遮蔽尚未入缓存的私有记录
pub struct CachedPincodeLookup {
    repo: Arc<PincodeRepository>,
    cache: Arc<dyn ConfigCache>,
    ttl: Duration,
}

impl CachedPincodeLookup {
    pub fn new(repo: Arc<PincodeRepository>, cache: Arc<dyn ConfigCache>, ttl: Duration) -> Self {
        Self { repo, cache, ttl }
    }

    /// 写入邮编记录并失效其缓存键
    ///
    /// 说明: 只需失效记录自身的键——共享记录的编辑使默认键失效,
    /// 所有持哨兵标记的商家视角随之读穿刷新; 新建私有记录使该
    /// 商家键(哨兵)失效, 立即压过已缓存的共享回落
    pub fn upsert(&self, record: &PincodeRecord) -> RepositoryResult<()> {
        self.repo.upsert(record)?;
        self.cache
            .invalidate(&pincode_key(record.company_id.as_deref(), &record.pincode));
        Ok(())
    }

    /// 批量导入并失效全部涉及的键
    pub fn bulk_insert(&self, records: &[PincodeRecord]) -> RepositoryResult<usize> {
        let count = self.repo.bulk_insert(records)?;
        for record in records {
            self.cache
                .invalidate(&pincode_key(record.company_id.as_deref(), &record.pincode));
        }
        Ok(count)
    }

    fn cached_record(&self, key: &str) -> Option<PincodeRecord> {
        let raw = self.cache.get(key)?;
        match serde_json::from_str::<PincodeRecord>(&raw) {
            Ok(record) => {
                debug!(key = %key, "邮编缓存命中");
                Some(record)
            }
            Err(e) => {
                warn!(key = %key, error = %e, "邮编缓存内容损坏, 按未命中处理");
                self.cache.invalidate(key);
                None
            }
        }
    }
}

impl PincodeLookup for CachedPincodeLookup {
    fn lookup(
        &self,
        company_id: &str,
        pincode: &str,
    ) -> PricingEngineResult<Option<PincodeRecord>> {
        let company_key = pincode_key(Some(company_id), pincode);

        match self.cache.get(&company_key) {
            // 哨兵: 该商家无私有记录, 走共享默认键;
            // 默认键失效(共享记录刚被编辑)时读穿刷新
            Some(raw) if raw == SHARED_FALLBACK_MARKER => {
                if let Some(record) = self.cached_record(&pincode_key(None, pincode)) {
                    return Ok(Some(record));
                }
            }
            Some(raw) => match serde_json::from_str::<PincodeRecord>(&raw) {
                Ok(record) => {
                    debug!(key = %company_key, "邮编缓存命中");
                    return Ok(Some(record));
                }
                Err(e) => {
                    warn!(key = %company_key, error = %e, "邮编缓存内容损坏, 按未命中处理");
                    self.cache.invalidate(&company_key);
                }
            },
            None => {}
        }

        let record = self.repo.lookup(company_id, pincode)?;
        if let Some(ref rec) = record {
            if let Ok(raw) = serde_json::to_string(rec) {
                if rec.company_id.is_some() {
                    self.cache.set(&company_key, raw, self.ttl);
                } else {
                    self.cache.set(&pincode_key(None, pincode), raw, self.ttl);
                    self.cache
                        .set(&company_key, SHARED_FALLBACK_MARKER.to_string(), self.ttl);
                }
            }
        }
        // 未命中不缓存: 邮编缺失是硬错误路径, 留给主数据修复后立即生效
        Ok(record)
    }
}

// ==========================================
// CachedRateCardSource - 价卡候选集读穿缓存
// ==========================================
pub struct CachedRateCardSource {
    repo: Arc<RateCardRepository>,
    cache: Arc<dyn ConfigCache>,
    ttl: Duration,
}

impl CachedRateCardSource {
    pub fn new(repo: Arc<RateCardRepository>, cache: Arc<dyn ConfigCache>, ttl: Duration) -> Self {
        Self { repo, cache, ttl }
    }

    /// 新建价卡, 返回前失效该商家的候选集缓存
    pub fn insert(&self, card: &RateCard) -> RepositoryResult<()> {
        self.repo.insert(card)?;
        self.cache.invalidate(&rate_cards_key(&card.company_id));
        Ok(())
    }

    /// 以新版本取代既有价卡, 返回前失效候选集缓存
    pub fn supersede(&self, parent_card_id: &str, updated: RateCard) -> RepositoryResult<RateCard> {
        let new_version = self.repo.supersede(parent_card_id, updated)?;
        self.cache
            .invalidate(&rate_cards_key(&new_version.company_id));
        Ok(new_version)
    }

    /// 软删除价卡, 返回前失效候选集缓存
    pub fn soft_delete(&self, card_id: &str) -> RepositoryResult<()> {
        let card = self.repo.find_by_id(card_id)?;
        self.repo.soft_delete(card_id)?;
        if let Some(card) = card {
            self.cache.invalidate(&rate_cards_key(&card.company_id));
        }
        Ok(())
    }
}

impl RateCardSource for CachedRateCardSource {
    fn candidates(&self, company_id: &str) -> PricingEngineResult<Vec<RateCard>> {
        let key = rate_cards_key(company_id);

        if let Some(raw) = self.cache.get(&key) {
            match serde_json::from_str::<Vec<RateCard>>(&raw) {
                Ok(cards) => {
                    debug!(key = %key, count = cards.len(), "价卡缓存命中");
                    return Ok(cards);
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "价卡缓存内容损坏, 按未命中处理");
                    self.cache.invalidate(&key);
                }
            }
        }

        let cards = self.repo.list_candidates(company_id)?;
        if let Ok(raw) = serde_json::to_string(&cards) {
            self.cache.set(&key, raw, self.ttl);
        }
        Ok(cards)
    }
}
