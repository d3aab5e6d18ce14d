// ==========================================
// 运费计价引擎 - 缓存键方案
// ==========================================
// 约定: 写路径与读路径必须使用同一键构造函数,
//       保证写后失效命中正确的键
// ==========================================

/// 邮编记录缓存键: pincode/{company|default}/{pin}
pub fn pincode_key(company_id: Option<&str>, pincode: &str) -> String {
    match company_id {
        Some(company) => format!("pincode/{}/{}", company, pincode),
        None => format!("pincode/default/{}", pincode),
    }
}

/// 价卡候选集缓存键: rate_cards/{company}
pub fn rate_cards_key(company_id: &str) -> String {
    format!("rate_cards/{}", company_id)
}
