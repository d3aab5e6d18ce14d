// ==========================================
// 运费计价引擎 - 邮政主数据实体
// ==========================================
// 职责: 定义邮编主数据记录(区域解析的只读查询依据)
// 说明: 邮编目录支持商家私有(company_id 非空)与共享默认(company_id 为空)两套,
//       查询时商家私有记录优先
// ==========================================

use crate::domain::types::ZoneCode;
use serde::{Deserialize, Serialize};

// ==========================================
// PincodeRecord - 邮编主数据记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PincodeRecord {
    pub pincode: String,               // 6位邮编
    pub company_id: Option<String>,    // None 表示共享默认目录
    pub state: String,                 // 所属邦/州
    pub city: Option<String>,          // 城市
    pub is_metro: bool,                // 是否大都市邮区
    pub is_remote: bool,               // 是否偏远(东北各邦/离岛/J&K 类)
    pub lat: Option<f64>,              // 质心纬度(DISTANCE 模式用)
    pub lon: Option<f64>,              // 质心经度
    pub zone_override: Option<ZoneCode>, // 显式区域覆盖(命中即短路)
}

impl PincodeRecord {
    /// 创建共享默认目录记录
    pub fn shared(pincode: &str, state: &str) -> Self {
        Self {
            pincode: pincode.to_string(),
            company_id: None,
            state: state.to_string(),
            city: None,
            is_metro: false,
            is_remote: false,
            lat: None,
            lon: None,
            zone_override: None,
        }
    }

    /// 邮编微区前缀(前 N 位); 两端同微区视为同城
    pub fn micro_region(&self, prefix_len: usize) -> &str {
        let len = prefix_len.min(self.pincode.len());
        &self.pincode[..len]
    }
}
