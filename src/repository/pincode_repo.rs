// ==========================================
// 运费计价引擎 - 邮政主数据仓储
// ==========================================
// 职责: 管理 pincode_master 表(商家私有目录 + 共享默认目录)
// 红线: Repository 不含业务逻辑, 查询全部参数化
// 说明: company_id 存空串表示共享默认目录(保证 UNIQUE 约束生效)
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::types::ZoneCode;
use crate::domain::zone::PincodeRecord;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

pub struct PincodeRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PincodeRepository {
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
    fn ensure_table(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS pincode_master (
              pincode TEXT NOT NULL,
              company_id TEXT NOT NULL DEFAULT '',
              state TEXT NOT NULL,
              city TEXT,
              is_metro INTEGER NOT NULL DEFAULT 0,
              is_remote INTEGER NOT NULL DEFAULT 0,
              lat REAL,
              lon REAL,
              zone_override TEXT,
              updated_at TEXT NOT NULL DEFAULT (datetime('now')),
              UNIQUE(pincode, company_id)
            );

            CREATE INDEX IF NOT EXISTS idx_pincode_master_pincode
              ON pincode_master(pincode);
            "#,
        )?;
        Ok(())
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<PincodeRecord> {
        let company_raw: String = row.get(1)?;
        let override_raw: Option<String> = row.get(8)?;
        Ok(PincodeRecord {
            pincode: row.get(0)?,
            company_id: if company_raw.is_empty() {
                None
            } else {
                Some(company_raw)
            },
            state: row.get(2)?,
            city: row.get(3)?,
            is_metro: row.get::<_, i64>(4)? != 0,
            is_remote: row.get::<_, i64>(5)? != 0,
            lat: row.get(6)?,
            lon: row.get(7)?,
            zone_override: override_raw.and_then(|s| ZoneCode::from_str(&s)),
        })
    }

    /// 创建或更新邮编记录(按 pincode+company_id 去重)
    pub fn upsert(&self, record: &PincodeRecord) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO pincode_master (
                pincode, company_id, state, city, is_metro, is_remote,
                lat, lon, zone_override, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, datetime('now'))
            ON CONFLICT(pincode, company_id) DO UPDATE SET
                state = excluded.state,
                city = excluded.city,
                is_metro = excluded.is_metro,
                is_remote = excluded.is_remote,
                lat = excluded.lat,
                lon = excluded.lon,
                zone_override = excluded.zone_override,
                updated_at = excluded.updated_at
            "#,
            params![
                record.pincode,
                record.company_id.as_deref().unwrap_or(""),
                record.state,
                record.city,
                record.is_metro as i64,
                record.is_remote as i64,
                record.lat,
                record.lon,
                record.zone_override.map(|z| z.to_db_str()),
            ],
        )?;
        Ok(())
    }

    /// 批量导入邮编记录(单事务, 用于初始化目录)
    pub fn bulk_insert(&self, records: &[PincodeRecord]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let mut count = 0;
        for record in records {
            tx.execute(
                r#"
                INSERT INTO pincode_master (
                    pincode, company_id, state, city, is_metro, is_remote,
                    lat, lon, zone_override, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, datetime('now'))
                ON CONFLICT(pincode, company_id) DO UPDATE SET
                    state = excluded.state,
                    city = excluded.city,
                    is_metro = excluded.is_metro,
                    is_remote = excluded.is_remote,
                    lat = excluded.lat,
                    lon = excluded.lon,
                    zone_override = excluded.zone_override,
                    updated_at = excluded.updated_at
                "#,
                params![
                    record.pincode,
                    record.company_id.as_deref().unwrap_or(""),
                    record.state,
                    record.city,
                    record.is_metro as i64,
                    record.is_remote as i64,
                    record.lat,
                    record.lon,
                    record.zone_override.map(|z| z.to_db_str()),
                ],
            )?;
            count += 1;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(count)
    }

    /// 查询邮编记录: 商家私有记录优先, 回落共享默认目录
    pub fn lookup(
        &self,
        company_id: &str,
        pincode: &str,
    ) -> RepositoryResult<Option<PincodeRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT pincode, company_id, state, city, is_metro, is_remote,
                   lat, lon, zone_override
            FROM pincode_master
            WHERE pincode = ?1 AND company_id IN (?2, '')
            ORDER BY (company_id = ?2) DESC
            LIMIT 1
            "#,
        )?;

        let result = stmt.query_row(params![pincode, company_id], Self::map_row);
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
