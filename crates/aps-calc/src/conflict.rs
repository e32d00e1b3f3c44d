//! 排程衝突偵測與套用前驗證
//!
//! 時段採半開區間 `[start, end)`：一筆指派恰好在另一筆開始時結束
//! 不構成衝突。

use chrono::NaiveDateTime;
use uuid::Uuid;

use aps_core::{
    ApsError, Assignment, Result, Schedule, SchedulerConfig, ValidationFinding,
};

/// 兩個半開區間是否相交
pub fn overlaps(
    a_start: NaiveDateTime,
    a_end: NaiveDateTime,
    b_start: NaiveDateTime,
    b_end: NaiveDateTime,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// 找出與候選時段衝突的既有指派
///
/// 用於互動改排（回報碰撞的訂單清單）與套用前的最新狀態複檢
pub fn conflicts(
    existing: &[Assignment],
    work_center_id: &str,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Vec<Uuid> {
    existing
        .iter()
        .filter(|a| {
            a.work_center_id == work_center_id
                && overlaps(a.scheduled_start, a.scheduled_end, start, end)
        })
        .map(|a| a.order_id)
        .collect()
}

/// 排程內部的重疊檢查（同一工作中心上的指派兩兩比對）
pub fn internal_conflicts(assignments: &[Assignment]) -> Vec<Uuid> {
    let mut colliding = Vec::new();

    for (i, a) in assignments.iter().enumerate() {
        for b in assignments.iter().skip(i + 1) {
            if a.work_center_id == b.work_center_id
                && overlaps(
                    a.scheduled_start,
                    a.scheduled_end,
                    b.scheduled_start,
                    b.scheduled_end,
                )
            {
                if !colliding.contains(&a.order_id) {
                    colliding.push(a.order_id);
                }
                if !colliding.contains(&b.order_id) {
                    colliding.push(b.order_id);
                }
            }
        }
    }

    colliding
}

/// 套用前驗證
///
/// 重新檢查排程內部不重疊不變式，並彙整外部協作方提供的
/// 物料/前置條件發現；阻斷性發現（或配置為全面阻斷時的任何發現）
/// 使驗證失敗，否則發現以警告形式回傳
pub fn validate_schedule(
    schedule: &Schedule,
    findings: Vec<ValidationFinding>,
    config: &SchedulerConfig,
) -> Result<Vec<ValidationFinding>> {
    let colliding = internal_conflicts(&schedule.assignments);
    if !colliding.is_empty() {
        return Err(ApsError::ScheduleConflict {
            conflicting_orders: colliding,
        });
    }

    if let Some(blocking) = findings
        .iter()
        .find(|f| f.blocking || config.blocking_validation)
    {
        return Err(ApsError::ScheduleConflict {
            conflicting_orders: vec![blocking.order_id],
        });
    }

    Ok(findings)
}
