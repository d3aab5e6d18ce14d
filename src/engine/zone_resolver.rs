// ==========================================
// 运费计价引擎 - Zone Resolver 区域解析引擎
// ==========================================
// 职责: 将 (起始邮编, 目的邮编, B区判定模式) 解析为区域代码 A-E
// 红线: 解析必须全覆盖且互斥(任意合法邮编对恰好落在一个区域)
// 红线: 邮编缺失于主数据 → ZoneResolutionError, 绝不默认
// ==========================================

use crate::domain::types::{ZoneBMode, ZoneCode};
use crate::domain::zone::PincodeRecord;
use crate::engine::error::{PricingEngineResult, PricingError};
use std::sync::Arc;
use tracing::debug;

/// 地球平均半径(km), 大圆距离用
const EARTH_RADIUS_KM: f64 = 6371.0;

// ==========================================
// PincodeLookup - 邮政主数据查询接口
// ==========================================
// 由仓储或缓存门面实现; 引擎侧只读
pub trait PincodeLookup: Send + Sync {
    /// 查询邮编记录(商家私有目录优先, 回落共享默认目录)
    fn lookup(&self, company_id: &str, pincode: &str)
        -> PricingEngineResult<Option<PincodeRecord>>;
}

// ==========================================
// ZoneRuleParams - 区域判定参数
// ==========================================
#[derive(Debug, Clone)]
pub struct ZoneRuleParams {
    pub micro_region_prefix_len: usize,     // 微区前缀长度(默认 3)
    pub metro_prefixes: Vec<String>,        // 大都市邮编前缀集合
    pub remote_states: Vec<String>,         // 偏远邦代码集合
    pub zone_b_distance_threshold_km: f64,  // DISTANCE 模式下的 B 区距离阈值
}

impl Default for ZoneRuleParams {
    fn default() -> Self {
        Self {
            micro_region_prefix_len: 3,
            metro_prefixes: vec![
                "110".to_string(), // Delhi
                "400".to_string(), // Mumbai
                "560".to_string(), // Bengaluru
                "600".to_string(), // Chennai
                "700".to_string(), // Kolkata
                "500".to_string(), // Hyderabad
            ],
            remote_states: vec![
                "AR".to_string(), "AS".to_string(), "MN".to_string(), "ML".to_string(),
                "MZ".to_string(), "NL".to_string(), "SK".to_string(), "TR".to_string(),
                "AN".to_string(), "LD".to_string(), "JK".to_string(), "LA".to_string(),
            ],
            zone_b_distance_threshold_km: 500.0,
        }
    }
}

impl ZoneRuleParams {
    /// 判断记录是否属于大都市邮区(显式标记或前缀命中)
    fn is_metro(&self, rec: &PincodeRecord) -> bool {
        rec.is_metro
            || self
                .metro_prefixes
                .iter()
                .any(|p| rec.pincode.starts_with(p.as_str()))
    }

    /// 判断记录是否属于偏远地区(显式标记或邦代码命中)
    pub fn is_remote(&self, rec: &PincodeRecord) -> bool {
        rec.is_remote || self.remote_states.iter().any(|s| s == &rec.state)
    }
}

// ==========================================
// ZoneResolverCore - 纯判定逻辑
// ==========================================
pub struct ZoneResolverCore;

impl ZoneResolverCore {
    /// 解析区域代码
    ///
    /// # 规则(依次判定, 首个命中即返回)
    /// 1. 任一端带 zone_override(目的端优先) → 覆盖区域
    /// 2. 同邮编或同微区 → A
    /// 3. STATE 模式同邦, 或 DISTANCE 模式质心大圆距离 < 阈值 → B
    /// 4. 两端均为大都市邮区 → C
    /// 5. 任一端偏远 → E
    /// 6. 其余 → D
    ///
    /// # 返回
    /// - (ZoneCode, Vec<String>): 区域 + 决策原因
    pub fn resolve(
        from: &PincodeRecord,
        to: &PincodeRecord,
        zone_b_mode: ZoneBMode,
        params: &ZoneRuleParams,
    ) -> (ZoneCode, Vec<String>) {
        let mut reasons = Vec::new();

        // 规则 1: 显式覆盖
        if let Some(zone) = to.zone_override.or(from.zone_override) {
            reasons.push(format!("ZONE_OVERRIDE: {}", zone));
            return (zone, reasons);
        }

        // 规则 2: 同城
        if from.pincode == to.pincode {
            reasons.push("ZONE_A: same pincode".to_string());
            return (ZoneCode::A, reasons);
        }
        let prefix_len = params.micro_region_prefix_len;
        if from.micro_region(prefix_len) == to.micro_region(prefix_len) {
            reasons.push(format!(
                "ZONE_A: same micro region {}",
                from.micro_region(prefix_len)
            ));
            return (ZoneCode::A, reasons);
        }

        // 规则 3: B 区判定
        match zone_b_mode {
            ZoneBMode::State => {
                if from.state == to.state {
                    reasons.push(format!("ZONE_B: same state {}", from.state));
                    return (ZoneCode::B, reasons);
                }
            }
            ZoneBMode::Distance => {
                if let Some(km) = Self::centroid_distance_km(from, to) {
                    if km < params.zone_b_distance_threshold_km {
                        reasons.push(format!(
                            "ZONE_B: distance {:.1}km < {:.1}km",
                            km, params.zone_b_distance_threshold_km
                        ));
                        return (ZoneCode::B, reasons);
                    }
                }
                // 缺少质心坐标时无法判 B, 继续后续规则
            }
        }

        // 规则 4: 大都市互发
        if params.is_metro(from) && params.is_metro(to) {
            reasons.push("ZONE_C: metro to metro".to_string());
            return (ZoneCode::C, reasons);
        }

        // 规则 5: 偏远
        if params.is_remote(from) || params.is_remote(to) {
            reasons.push("ZONE_E: remote region".to_string());
            return (ZoneCode::E, reasons);
        }

        // 规则 6: 全国默认
        reasons.push("ZONE_D: rest of country".to_string());
        (ZoneCode::D, reasons)
    }

    /// 两邮编质心的大圆距离(km); 任一端缺坐标返回 None
    pub fn centroid_distance_km(from: &PincodeRecord, to: &PincodeRecord) -> Option<f64> {
        let (lat1, lon1) = (from.lat?, from.lon?);
        let (lat2, lon2) = (to.lat?, to.lon?);

        let d_lat = (lat2 - lat1).to_radians();
        let d_lon = (lon2 - lon1).to_radians();
        let a = (d_lat / 2.0).sin().powi(2)
            + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        Some(EARTH_RADIUS_KM * c)
    }
}

// ==========================================
// ZoneResolver - 带主数据查询的解析器
// ==========================================
pub struct ZoneResolver {
    lookup: Arc<dyn PincodeLookup>,
    params: ZoneRuleParams,
}

impl ZoneResolver {
    pub fn new(lookup: Arc<dyn PincodeLookup>, params: ZoneRuleParams) -> Self {
        Self { lookup, params }
    }

    /// 解析区域, 同时返回两端主数据记录(计税与偏远判定复用)
    ///
    /// # 错误
    /// - 任一邮编缺失于主数据 → ZoneResolutionError
    pub fn resolve_zone(
        &self,
        company_id: &str,
        from_pincode: &str,
        to_pincode: &str,
        zone_b_mode: ZoneBMode,
    ) -> PricingEngineResult<(ZoneCode, PincodeRecord, PincodeRecord, Vec<String>)> {
        let from = self
            .lookup
            .lookup(company_id, from_pincode)?
            .ok_or_else(|| PricingError::ZoneResolution {
                pincode: from_pincode.to_string(),
            })?;
        let to = self
            .lookup
            .lookup(company_id, to_pincode)?
            .ok_or_else(|| PricingError::ZoneResolution {
                pincode: to_pincode.to_string(),
            })?;

        let (zone, reasons) = ZoneResolverCore::resolve(&from, &to, zone_b_mode, &self.params);
        debug!(
            from = %from_pincode,
            to = %to_pincode,
            mode = %zone_b_mode,
            zone = %zone,
            "区域解析完成"
        );

        Ok((zone, from, to, reasons))
    }

    pub fn params(&self) -> &ZoneRuleParams {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(pincode: &str, state: &str) -> PincodeRecord {
        PincodeRecord::shared(pincode, state)
    }

    fn params() -> ZoneRuleParams {
        ZoneRuleParams::default()
    }

    #[test]
    fn test_zone_a_same_pincode() {
        let (zone, reasons) = ZoneResolverCore::resolve(
            &rec("110001", "DL"),
            &rec("110001", "DL"),
            ZoneBMode::State,
            &params(),
        );
        assert_eq!(zone, ZoneCode::A);
        assert!(reasons[0].contains("same pincode"));
    }

    #[test]
    fn test_zone_a_same_micro_region() {
        let (zone, _) = ZoneResolverCore::resolve(
            &rec("110001", "DL"),
            &rec("110092", "DL"),
            ZoneBMode::State,
            &params(),
        );
        assert_eq!(zone, ZoneCode::A);
    }

    #[test]
    fn test_zone_b_same_state() {
        // 浦那与南浦那: 同邦不同微区
        let (zone, _) = ZoneResolverCore::resolve(
            &rec("411001", "MH"),
            &rec("413001", "MH"),
            ZoneBMode::State,
            &params(),
        );
        assert_eq!(zone, ZoneCode::B);
    }

    #[test]
    fn test_zone_b_distance_mode() {
        let mut from = rec("110001", "DL");
        from.lat = Some(28.63);
        from.lon = Some(77.22);
        let mut to = rec("302001", "RJ");
        to.lat = Some(26.92);
        to.lon = Some(75.79);

        // 德里-斋浦尔约 240km < 500km 阈值
        let (zone, reasons) =
            ZoneResolverCore::resolve(&from, &to, ZoneBMode::Distance, &params());
        assert_eq!(zone, ZoneCode::B);
        assert!(reasons[0].contains("ZONE_B"));
    }

    #[test]
    fn test_zone_b_distance_mode_without_coords_falls_through() {
        // 坐标缺失时不可判 B, 两端均大都市 → C
        let (zone, _) = ZoneResolverCore::resolve(
            &rec("110001", "DL"),
            &rec("400001", "MH"),
            ZoneBMode::Distance,
            &params(),
        );
        assert_eq!(zone, ZoneCode::C);
    }

    #[test]
    fn test_zone_c_metro_to_metro() {
        let (zone, _) = ZoneResolverCore::resolve(
            &rec("110001", "DL"),
            &rec("560001", "KA"),
            ZoneBMode::State,
            &params(),
        );
        assert_eq!(zone, ZoneCode::C);
    }

    #[test]
    fn test_zone_e_remote_state() {
        let (zone, _) = ZoneResolverCore::resolve(
            &rec("110001", "DL"),
            &rec("790001", "AR"),
            ZoneBMode::State,
            &params(),
        );
        assert_eq!(zone, ZoneCode::E);
    }

    #[test]
    fn test_zone_e_remote_flag_on_record() {
        let mut to = rec("682551", "KL");
        to.is_remote = true; // 拉克沙群岛邮编, 记录级标记
        let (zone, _) =
            ZoneResolverCore::resolve(&rec("110001", "DL"), &to, ZoneBMode::State, &params());
        assert_eq!(zone, ZoneCode::E);
    }

    #[test]
    fn test_zone_d_default() {
        let (zone, _) = ZoneResolverCore::resolve(
            &rec("302001", "RJ"),
            &rec("226001", "UP"),
            ZoneBMode::State,
            &params(),
        );
        assert_eq!(zone, ZoneCode::D);
    }

    #[test]
    fn test_zone_override_short_circuits() {
        let mut to = rec("226001", "UP");
        to.zone_override = Some(ZoneCode::B);
        let (zone, reasons) =
            ZoneResolverCore::resolve(&rec("302001", "RJ"), &to, ZoneBMode::State, &params());
        assert_eq!(zone, ZoneCode::B);
        assert!(reasons[0].contains("ZONE_OVERRIDE"));
    }

    #[test]
    fn test_resolution_total_and_exclusive() {
        // 任意组合恰好解析出一个区域(全覆盖性由返回类型保证, 此处验证稳定性)
        let pins = [
            rec("110001", "DL"),
            rec("110092", "DL"),
            rec("400001", "MH"),
            rec("413001", "MH"),
            rec("790001", "AR"),
            rec("226001", "UP"),
        ];
        for from in &pins {
            for to in &pins {
                let (z1, _) = ZoneResolverCore::resolve(from, to, ZoneBMode::State, &params());
                let (z2, _) = ZoneResolverCore::resolve(from, to, ZoneBMode::State, &params());
                assert_eq!(z1, z2); // 相同输入结果恒定
                assert!(ZoneCode::ALL.contains(&z1));
            }
        }
    }

    #[test]
    fn test_centroid_distance_known_pair() {
        let mut from = rec("110001", "DL");
        from.lat = Some(28.6139);
        from.lon = Some(77.2090);
        let mut to = rec("400001", "MH");
        to.lat = Some(19.0760);
        to.lon = Some(72.8777);

        let km = ZoneResolverCore::centroid_distance_km(&from, &to).expect("应有距离");
        // 德里-孟买大圆距离约 1150km
        assert!(km > 1100.0 && km < 1200.0, "km={}", km);
    }
}
