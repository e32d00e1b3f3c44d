//! 產能日曆與產能帳本
//!
//! 產能以「日」為粒度：每個工作日提供自 00:00 起算
//! `effective_daily_capacity()` 小時的工作窗口。帳本記錄每日的
//! 預訂前沿（最後一筆預訂的結束時刻，以距 00:00 的小時數表示），
//! 新時段一律接在前沿之後；起點在日中時，前沿之前的空隙視為已消耗。
//! `CapacityLedger` 只存在於單次排產執行期間，執行結束即丟棄，
//! 因此排產函數對外仍是純函數。

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::work_center::WorkCenter;

/// 日起點時間
fn day_start(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(0, 0, 0).expect("無效時間")
}

/// 自當日 00:00 起經過的小時數
fn hours_from_midnight(at: NaiveDateTime) -> Decimal {
    let minutes = (at - day_start(at.date())).num_minutes();
    Decimal::from(minutes) / Decimal::from(60)
}

/// 小時數轉換為時間長度（取整到分鐘）
pub fn hours_to_duration(hours: Decimal) -> chrono::Duration {
    let minutes = (hours * Decimal::from(60))
        .round()
        .to_i64()
        .expect("工時超出範圍");
    chrono::Duration::minutes(minutes)
}

/// 產能帳本：(工作中心, 日期) → 當日預訂前沿（距 00:00 的小時數）
///
/// 前沿是該日最後一筆預訂的結束時刻。新時段接在前沿之後，
/// 保證同一工作中心上的時段沿牆鐘時間單調推進、彼此不相交。
/// 每次排產執行開始時新建，僅在該次呼叫的調用鏈內傳遞
#[derive(Debug, Clone, Default)]
pub struct CapacityLedger {
    frontier: HashMap<(String, NaiveDate), Decimal>,
}

impl CapacityLedger {
    /// 創建空帳本
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定日期的預訂前沿（距 00:00 的小時數，無預訂時為 0）
    pub fn frontier_on(&self, work_center_id: &str, date: NaiveDate) -> Decimal {
        self.frontier
            .get(&(work_center_id.to_string(), date))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// 指定日期剩餘可用工時（非工作日為 0；前沿之前的空隙不再可用）
    pub fn available_on(&self, work_center: &WorkCenter, date: NaiveDate) -> Decimal {
        if !work_center.is_active_day(date) {
            return Decimal::ZERO;
        }
        let remaining =
            work_center.effective_daily_capacity() - self.frontier_on(&work_center.id, date);
        remaining.max(Decimal::ZERO)
    }

    /// 尋找最早可放置時段（純查詢，不改動帳本）
    ///
    /// 自 `not_before` 起逐日向前掃描，跳過非工作日，累積可用工時直到
    /// 足以容納 `duration_hours`（允許跨日拆分）。回傳的開始時間保證
    /// 自該點起的累積可用產能覆蓋整段工時；超出掃描範圍回傳 `None`。
    pub fn find_earliest_slot(
        &self,
        work_center: &WorkCenter,
        duration_hours: Decimal,
        not_before: NaiveDateTime,
        horizon_days: u32,
    ) -> Option<NaiveDateTime> {
        let mut date = not_before.date();
        let mut start: Option<NaiveDateTime> = None;
        let mut accumulated = Decimal::ZERO;

        for _ in 0..=horizon_days {
            if work_center.is_active_day(date) {
                let mut offset = self.frontier_on(&work_center.id, date);
                if date == not_before.date() {
                    offset = offset.max(hours_from_midnight(not_before));
                }

                let usable =
                    (work_center.effective_daily_capacity() - offset).max(Decimal::ZERO);

                if usable > Decimal::ZERO {
                    if start.is_none() {
                        start = Some(day_start(date) + hours_to_duration(offset));
                    }
                    accumulated += usable;
                    if accumulated >= duration_hours {
                        return start;
                    }
                }
            }
            date = date.succ_opt().expect("日期溢出");
        }

        None
    }

    /// 計算自 `start` 起消耗 `duration_hours` 的結束時間（純查詢）
    ///
    /// 與 `find_earliest_slot` 相同的逐日走訪，不改動帳本；
    /// 呼叫端需以 `book` 提交。掃描範圍耗盡時回傳 `None`。
    pub fn span_end(
        &self,
        work_center: &WorkCenter,
        start: NaiveDateTime,
        duration_hours: Decimal,
        horizon_days: u32,
    ) -> Option<NaiveDateTime> {
        let mut remaining = duration_hours;
        let mut date = start.date();

        for _ in 0..=horizon_days {
            if work_center.is_active_day(date) {
                let mut offset = self.frontier_on(&work_center.id, date);
                if date == start.date() {
                    offset = offset.max(hours_from_midnight(start));
                }

                let usable =
                    (work_center.effective_daily_capacity() - offset).max(Decimal::ZERO);
                let take = usable.min(remaining);

                if take > Decimal::ZERO {
                    remaining -= take;
                }
                if remaining <= Decimal::ZERO {
                    return Some(day_start(date) + hours_to_duration(offset + take));
                }
            }
            date = date.succ_opt().expect("日期溢出");
        }

        None
    }

    /// 提交預訂：`[start, end)` 觸及的每一天推進預訂前沿
    ///
    /// 結束日前沿推進到 `end` 的時刻（以工作窗口裁剪），
    /// 其餘觸及日推進到窗口末端；前沿只前進、不後退
    pub fn book(&mut self, work_center: &WorkCenter, start: NaiveDateTime, end: NaiveDateTime) {
        let effective = work_center.effective_daily_capacity();
        let mut date = start.date();

        while date <= end.date() {
            if work_center.is_active_day(date) {
                let advanced = if date == end.date() {
                    hours_from_midnight(end).min(effective)
                } else {
                    effective
                };

                let entry = self
                    .frontier
                    .entry((work_center.id.clone(), date))
                    .or_insert(Decimal::ZERO);
                if advanced > *entry {
                    *entry = advanced;
                }
            }
            date = date.succ_opt().expect("日期溢出");
        }
    }
}
