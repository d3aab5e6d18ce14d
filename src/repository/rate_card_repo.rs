// ==========================================
// 运费计价引擎 - 价卡仓储
// ==========================================
// 职责: 管理 rate_card 表(JSON 文档列 + 选择用索引列)
// 红线: 价卡永不物理删除, 只软删除; 历史版本永不原地修改
// 红线: 版本链是只追加的不可变快照日志(parent_version_id 指向上一版本)
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::rate_card::RateCard;
use crate::domain::types::RateCardStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use uuid::Uuid;
use std::sync::{Arc, Mutex};

pub struct RateCardRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RateCardRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        let repo = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        repo.ensure_table()?;
        Ok(repo)
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        let repo = Self { conn };
        repo.ensure_table()?;
        Ok(repo)
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 确保表存在(如果不存在则创建)
    ///
    /// 说明: 完整价卡以 JSON 文档存 doc_json 列, 选择阶段
    /// 高频过滤的字段冗余为索引列, 两者以文档为准
    fn ensure_table(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS rate_card (
              card_id TEXT PRIMARY KEY,
              company_id TEXT NOT NULL,
              status TEXT NOT NULL,
              is_deleted INTEGER NOT NULL DEFAULT 0,
              version_number INTEGER NOT NULL,
              parent_version_id TEXT,
              doc_json TEXT NOT NULL,
              updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX IF NOT EXISTS idx_rate_card_company
              ON rate_card(company_id, status, is_deleted);
            CREATE INDEX IF NOT EXISTS idx_rate_card_parent
              ON rate_card(parent_version_id);
            "#,
        )?;
        Ok(())
    }

    fn insert_row(conn: &Connection, card: &RateCard) -> RepositoryResult<()> {
        let doc = serde_json::to_string(card)?;
        conn.execute(
            r#"
            INSERT INTO rate_card (
                card_id, company_id, status, is_deleted,
                version_number, parent_version_id, doc_json, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, datetime('now'))
            "#,
            params![
                card.card_id,
                card.company_id,
                card.status.to_db_str(),
                card.is_deleted as i64,
                card.version_number,
                card.parent_version_id,
                doc,
            ],
        )?;
        Ok(())
    }

    /// 插入新价卡(版本 1)
    pub fn insert(&self, card: &RateCard) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        Self::insert_row(&conn, card)
    }

    /// 以新版本取代既有价卡
    ///
    /// # 规则
    /// 1. 新版本获得新 card_id, version_number = 父版本 + 1,
    ///    parent_version_id 指向父版本(审计链)
    /// 2. 父版本行原样保留, 仅状态降为 INACTIVE(历史价格可复现)
    /// 3. 两步在同一事务内完成
    ///
    /// # 返回
    /// - 已落库的新版本价卡
    pub fn supersede(&self, parent_card_id: &str, mut updated: RateCard) -> RepositoryResult<RateCard> {
        let mut conn = self.get_conn()?;

        let parent = Self::find_by_id_inner(&conn, parent_card_id)?.ok_or_else(|| {
            RepositoryError::NotFound {
                entity: "RateCard".to_string(),
                id: parent_card_id.to_string(),
            }
        })?;

        updated.card_id = Uuid::new_v4().to_string();
        updated.version_number = parent.version_number + 1;
        updated.parent_version_id = Some(parent.card_id.clone());
        updated.status = RateCardStatus::Active;
        updated.is_deleted = false;
        updated.updated_at = chrono::Utc::now();

        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        Self::insert_row(&tx, &updated)?;

        // 父版本降级(文档与索引列同步更新)
        let mut demoted = parent.clone();
        demoted.status = RateCardStatus::Inactive;
        demoted.updated_at = chrono::Utc::now();
        let demoted_doc = serde_json::to_string(&demoted)?;
        tx.execute(
            "UPDATE rate_card SET status = ?1, doc_json = ?2, updated_at = datetime('now')
             WHERE card_id = ?3",
            params![RateCardStatus::Inactive.to_db_str(), demoted_doc, parent.card_id],
        )?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(updated)
    }

    /// 软删除价卡(行保留, 仅打标)
    pub fn soft_delete(&self, card_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let card = Self::find_by_id_inner(&conn, card_id)?.ok_or_else(|| {
            RepositoryError::NotFound {
                entity: "RateCard".to_string(),
                id: card_id.to_string(),
            }
        })?;

        let mut deleted = card;
        deleted.is_deleted = true;
        deleted.updated_at = chrono::Utc::now();
        let doc = serde_json::to_string(&deleted)?;

        conn.execute(
            "UPDATE rate_card SET is_deleted = 1, doc_json = ?1, updated_at = datetime('now')
             WHERE card_id = ?2",
            params![doc, card_id],
        )?;
        Ok(())
    }

    fn find_by_id_inner(conn: &Connection, card_id: &str) -> RepositoryResult<Option<RateCard>> {
        let result = conn.query_row(
            "SELECT doc_json FROM rate_card WHERE card_id = ?1",
            params![card_id],
            |row| row.get::<_, String>(0),
        );
        match result {
            Ok(doc) => Ok(Some(serde_json::from_str(&doc)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 按ID查找价卡(含软删除与历史版本, 供审计复现使用)
    pub fn find_by_id(&self, card_id: &str) -> RepositoryResult<Option<RateCard>> {
        let conn = self.get_conn()?;
        Self::find_by_id_inner(&conn, card_id)
    }

    /// 列出商家的选择候选集(ACTIVE 且未软删除)
    pub fn list_candidates(&self, company_id: &str) -> RepositoryResult<Vec<RateCard>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT doc_json FROM rate_card
            WHERE company_id = ?1 AND status = 'ACTIVE' AND is_deleted = 0
            ORDER BY card_id ASC
            "#,
        )?;

        let docs = stmt
            .query_map(params![company_id], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;

        let mut cards = Vec::with_capacity(docs.len());
        for doc in docs {
            cards.push(serde_json::from_str(&doc)?);
        }
        Ok(cards)
    }

    /// 沿 parent_version_id 回溯版本链(从给定版本到根, 用于审计)
    pub fn version_chain(&self, card_id: &str) -> RepositoryResult<Vec<RateCard>> {
        let conn = self.get_conn()?;

        let mut chain = Vec::new();
        let mut cursor = Some(card_id.to_string());
        while let Some(id) = cursor {
            match Self::find_by_id_inner(&conn, &id)? {
                Some(card) => {
                    cursor = card.parent_version_id.clone();
                    chain.push(card);
                }
                None => break,
            }
        }
        Ok(chain)
    }
}
