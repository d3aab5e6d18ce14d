// ==========================================
// 运费计价引擎 - 计价请求与结果
// ==========================================
// 职责: 定义计价调用的输入输出(瞬态对象, 本引擎不持久化)
// 说明: PricingResult 携带 rate_card_id/rate_card_version/zone,
//       调用方据此冻结快照, 保证历史订单价格可复现
// ==========================================

use crate::domain::types::{PaymentMode, ShipmentType, ZoneCode};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ==========================================
// PricingRequest - 计价请求
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingRequest {
    pub company_id: String,
    pub shipment_type: ShipmentType,
    pub category: Option<String>,
    pub customer_id: Option<String>,
    pub customer_group: Option<String>,

    pub from_pincode: String,
    pub to_pincode: String,

    pub weight_kg: Decimal,
    pub length_cm: Option<Decimal>,
    pub width_cm: Option<Decimal>,
    pub height_cm: Option<Decimal>,

    pub payment_mode: PaymentMode,
    pub declared_value: Decimal,

    /// 计价生效日期; None 表示取当日
    pub effective_date: Option<NaiveDate>,
}

impl PricingRequest {
    /// 三维尺寸齐全时返回 (长, 宽, 高)
    pub fn dimensions(&self) -> Option<(Decimal, Decimal, Decimal)> {
        match (self.length_cm, self.width_cm, self.height_cm) {
            (Some(l), Some(w), Some(h)) => Some((l, w, h)),
            _ => None,
        }
    }
}

// ==========================================
// TaxBreakdown - 税费明细
// ==========================================
// 同邦: CGST + SGST 各半; 跨邦: IGST 全额
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    pub cgst: Option<Decimal>,
    pub sgst: Option<Decimal>,
    pub igst: Option<Decimal>,
}

impl TaxBreakdown {
    /// 税费合计
    pub fn total(&self) -> Decimal {
        self.cgst.unwrap_or(Decimal::ZERO)
            + self.sgst.unwrap_or(Decimal::ZERO)
            + self.igst.unwrap_or(Decimal::ZERO)
    }
}

// ==========================================
// PricingResult - 计价结果(逐项明细)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingResult {
    pub zone: ZoneCode,
    pub chargeable_weight_kg: Decimal,

    pub freight: Decimal,
    pub cod_charge: Decimal,
    pub fuel_surcharge: Decimal,
    pub remote_area_charge: Decimal,
    pub minimum_fare_top_up: Decimal,

    pub subtotal: Decimal,
    pub tax_breakdown: TaxBreakdown,
    pub total: Decimal,

    // ===== 快照定位(审计/复现) =====
    pub rate_card_id: String,
    pub rate_card_version: i32,

    // ===== 决策原因(每条规则必须输出 reason) =====
    pub reasons: Vec<String>,
}
