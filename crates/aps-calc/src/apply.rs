//! 排程套用
//!
//! 套用是引擎唯一對外可見的變更：把排定時間交回持久層協作方回寫。
//! 套用前必須以最新已提交狀態重新執行衝突偵測——排程產生與套用之間
//! 可能有其他操作者改動訂單，後寫優先（last-writer-wins）不可接受；
//! 偵測到衝突時整筆套用失敗，草稿快照保持有效、可在解決衝突後重試。

use chrono::NaiveDateTime;
use uuid::Uuid;

use aps_core::{ApsError, Assignment, Result, Schedule};

use crate::conflict;

/// 套用結果：持久層協作方應在單一原子交易中回寫全部配對
#[derive(Debug, Clone)]
pub struct AppliedSchedule {
    /// 排程ID
    pub schedule_id: Uuid,

    /// 已更新的訂單ID
    pub updated_order_ids: Vec<Uuid>,

    /// 回寫配對：(訂單ID, 排定開始, 排定結束)
    pub pairs: Vec<(Uuid, NaiveDateTime, NaiveDateTime)>,
}

/// 套用排程（draft → applied，僅允許一次）
///
/// `committed` 為套用當下最新的已提交指派（由持久層協作方提供）；
/// 任何與其相交的時段使整筆套用以 `ScheduleConflict` 失敗
pub fn apply(schedule: &mut Schedule, committed: &[Assignment]) -> Result<AppliedSchedule> {
    if !schedule.is_draft() {
        return Err(ApsError::AlreadyApplied(schedule.id));
    }

    let mut colliding: Vec<Uuid> = Vec::new();
    for assignment in &schedule.assignments {
        for order_id in conflict::conflicts(
            committed,
            &assignment.work_center_id,
            assignment.scheduled_start,
            assignment.scheduled_end,
        ) {
            // 同一訂單自身的舊排定不算衝突（改排情境）
            if order_id != assignment.order_id && !colliding.contains(&order_id) {
                colliding.push(order_id);
            }
        }
    }

    if !colliding.is_empty() {
        return Err(ApsError::ScheduleConflict {
            conflicting_orders: colliding,
        });
    }

    schedule.mark_applied()?;

    let pairs = schedule.apply_pairs();
    Ok(AppliedSchedule {
        schedule_id: schedule.id,
        updated_order_ids: pairs.iter().map(|p| p.0).collect(),
        pairs,
    })
}
