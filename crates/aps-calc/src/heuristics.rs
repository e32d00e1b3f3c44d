//! 排序啟發式
//!
//! 每種啟發式是訂單集合上的全序，之後由排產器做單趟順序放置
//! （不回溯，已排定的訂單不再移動）。排序鍵相同時以訂單ID決勝，
//! 保證相同輸入產生逐位元相同的結果。

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use aps_core::ProductionOrder;

use crate::ScheduleWarning;

/// 排產算法（封閉集合，不做字串分派）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    /// 最早交期優先（Earliest Due Date）
    Edd,
    /// 最短加工時間優先（Shortest Processing Time）
    Spt,
    /// 緊迫係數（Critical Ratio）：剩餘時間 ÷ 剩餘工時，升冪
    CriticalRatio,
    /// 產能受限（Capacity-Constrained）：優先級降冪、交期升冪，
    /// 放置時查詢產能日曆
    CapacityConstrained,
}

impl Algorithm {
    /// 解析算法名稱
    ///
    /// 無法識別的名稱回退為 EDD 並回傳明確警告
    /// （沿用來源系統的寬容行為，但不再默默吞掉）
    pub fn parse(name: &str) -> (Self, Option<ScheduleWarning>) {
        match name.trim().to_ascii_lowercase().as_str() {
            "edd" => (Algorithm::Edd, None),
            "spt" => (Algorithm::Spt, None),
            "critical_ratio" | "cr" => (Algorithm::CriticalRatio, None),
            "capacity_constrained" | "cc" => (Algorithm::CapacityConstrained, None),
            other => (
                Algorithm::Edd,
                Some(ScheduleWarning::warning(
                    "UNKNOWN_ALGORITHM",
                    format!("未知的排產算法「{other}」，回退為 edd"),
                )),
            ),
        }
    }

    /// 算法名稱（序列化用）
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Edd => "edd",
            Algorithm::Spt => "spt",
            Algorithm::CriticalRatio => "critical_ratio",
            Algorithm::CapacityConstrained => "capacity_constrained",
        }
    }

    /// 是否為產能感知放置
    pub fn is_capacity_aware(&self) -> bool {
        matches!(self, Algorithm::CapacityConstrained)
    }

    /// 依啟發式對訂單排序
    pub fn sequence(
        &self,
        orders: &[ProductionOrder],
        now: NaiveDateTime,
    ) -> Vec<ProductionOrder> {
        let mut sequenced = orders.to_vec();
        match self {
            Algorithm::Edd => {
                sequenced.sort_by(|a, b| a.due_date.cmp(&b.due_date).then(a.id.cmp(&b.id)));
            }
            Algorithm::Spt => {
                sequenced.sort_by(|a, b| {
                    a.processing_hours
                        .cmp(&b.processing_hours)
                        .then(a.id.cmp(&b.id))
                });
            }
            Algorithm::CriticalRatio => {
                sequenced.sort_by(|a, b| {
                    critical_ratio(a, now)
                        .cmp(&critical_ratio(b, now))
                        .then(a.id.cmp(&b.id))
                });
            }
            Algorithm::CapacityConstrained => {
                sequenced.sort_by(|a, b| {
                    b.priority
                        .rank()
                        .cmp(&a.priority.rank())
                        .then(a.due_date.cmp(&b.due_date))
                        .then(a.id.cmp(&b.id))
                });
            }
        }
        sequenced
    }
}

/// 緊迫係數 = 剩餘時間（小時）÷ 剩餘工時（小時）
///
/// - 係數 < 1：訂單已落後
/// - 剩餘工時非正時視為最緊迫（驗證通常已排除此情況）
pub fn critical_ratio(order: &ProductionOrder, now: NaiveDateTime) -> Decimal {
    let work_remaining = order.total_hours();
    if work_remaining <= Decimal::ZERO {
        return Decimal::MIN;
    }

    let time_remaining =
        Decimal::from((order.due_date - now).num_minutes()) / Decimal::from(60);
    time_remaining / work_remaining
}
