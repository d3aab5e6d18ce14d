// ==========================================
// 运费计价引擎 - 仓储层
// ==========================================
// 职责: SQLite 持久化(邮政主数据 / 价卡文档 / 配置键值)
// 红线: Repository 不含业务逻辑, 上层只通过公开方法访问数据
// ==========================================

pub mod error;
pub mod pincode_repo;
pub mod rate_card_repo;

pub use error::{RepositoryError, RepositoryResult};
pub use pincode_repo::PincodeRepository;
pub use rate_card_repo::RateCardRepository;
