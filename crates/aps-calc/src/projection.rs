//! 排程視圖投影（唯讀轉換）
//!
//! 把排程快照整形為甘特圖、行事曆與狀態看板三種視圖。
//! 甘特任務附帶「近似寬裕度旗標」：`slack_hours = 交期 − 排定結束`，
//! ≤ 0 即標記落後。這是寬裕度近似，不是完整的 CPM 網路求解——
//! 引擎的輸入契約沒有前置依賴圖，依賴關係只做同產品先後的樸素推斷。

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use aps_core::{OrderStatus, ProductionOrder, Schedule};

/// 甘特圖任務
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GanttTask {
    /// 訂單ID
    pub id: Uuid,

    /// 顯示標籤
    pub label: String,

    /// 開始時間
    pub start: NaiveDateTime,

    /// 結束時間
    pub end: NaiveDateTime,

    /// 完成百分比（0-100）
    pub percent_complete: Decimal,

    /// 資源（工作中心）名稱
    pub resource: String,

    /// 依賴的訂單（同產品且結束在本任務開始之前，樸素推斷）
    pub depends_on: Vec<Uuid>,

    /// 寬裕度（小時）＝ 交期 − 排定結束
    pub slack_hours: Decimal,

    /// 近似落後旗標：寬裕度 ≤ 0
    pub behind_schedule: bool,
}

/// 行事曆事件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// 訂單ID
    pub order_id: Uuid,

    /// 事件標題
    pub title: String,

    /// 工作中心ID
    pub work_center_id: String,

    /// 開始時間
    pub start: NaiveDateTime,

    /// 結束時間
    pub end: NaiveDateTime,
}

/// 狀態看板卡片
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusCard {
    /// 訂單ID
    pub order_id: Uuid,

    /// 產品ID
    pub product_id: String,

    /// 數量
    pub quantity: Decimal,

    /// 交期
    pub due_date: NaiveDateTime,
}

/// 狀態看板欄位
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusColumn {
    /// 狀態
    pub status: OrderStatus,

    /// 卡片（依交期排序）
    pub cards: Vec<StatusCard>,
}

/// 產生甘特圖任務列表
///
/// `now` 用於推算生產中訂單的完成百分比
pub fn gantt_tasks(
    schedule: &Schedule,
    orders: &[ProductionOrder],
    now: NaiveDateTime,
) -> Vec<GanttTask> {
    schedule
        .assignments
        .iter()
        .filter_map(|assignment| {
            let order = orders.iter().find(|o| o.id == assignment.order_id)?;

            // 同產品且結束在本任務開始之前 → 視為前置
            let depends_on: Vec<Uuid> = schedule
                .assignments
                .iter()
                .filter(|other| {
                    other.order_id != assignment.order_id
                        && other.scheduled_end <= assignment.scheduled_start
                        && orders
                            .iter()
                            .any(|o| o.id == other.order_id && o.product_id == order.product_id)
                })
                .map(|other| other.order_id)
                .collect();

            let slack_minutes = (order.due_date - assignment.scheduled_end).num_minutes();
            let slack_hours = Decimal::from(slack_minutes) / Decimal::from(60);

            Some(GanttTask {
                id: assignment.order_id,
                label: format!("{} × {}", order.product_id, order.quantity),
                start: assignment.scheduled_start,
                end: assignment.scheduled_end,
                percent_complete: percent_complete(order, assignment.scheduled_start, assignment.scheduled_end, now),
                resource: assignment.work_center_id.clone(),
                depends_on,
                slack_hours,
                behind_schedule: slack_hours <= Decimal::ZERO,
            })
        })
        .collect()
}

/// 完成百分比：完工 100、取消 0、生產中依經過時間推算、其餘 0
fn percent_complete(
    order: &ProductionOrder,
    start: NaiveDateTime,
    end: NaiveDateTime,
    now: NaiveDateTime,
) -> Decimal {
    match order.status {
        OrderStatus::Completed => Decimal::from(100),
        OrderStatus::Cancelled | OrderStatus::Planned | OrderStatus::Released => Decimal::ZERO,
        OrderStatus::InProgress => {
            let total_minutes = (end - start).num_minutes();
            if total_minutes <= 0 {
                return Decimal::from(100);
            }
            let elapsed_minutes = (now - start).num_minutes().clamp(0, total_minutes);
            Decimal::from(elapsed_minutes) / Decimal::from(total_minutes) * Decimal::from(100)
        }
    }
}

/// 產生行事曆事件列表
pub fn calendar_events(schedule: &Schedule, orders: &[ProductionOrder]) -> Vec<CalendarEvent> {
    schedule
        .assignments
        .iter()
        .map(|assignment| {
            let title = orders
                .iter()
                .find(|o| o.id == assignment.order_id)
                .map(|o| format!("{} × {}", o.product_id, o.quantity))
                .unwrap_or_else(|| assignment.order_id.to_string());

            CalendarEvent {
                order_id: assignment.order_id,
                title,
                work_center_id: assignment.work_center_id.clone(),
                start: assignment.scheduled_start,
                end: assignment.scheduled_end,
            }
        })
        .collect()
}

/// 產生狀態看板（固定欄位順序，卡片依交期排序）
pub fn status_board(orders: &[ProductionOrder]) -> Vec<StatusColumn> {
    const COLUMNS: [OrderStatus; 5] = [
        OrderStatus::Planned,
        OrderStatus::Released,
        OrderStatus::InProgress,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    COLUMNS
        .iter()
        .map(|&status| {
            let mut cards: Vec<StatusCard> = orders
                .iter()
                .filter(|o| o.status == status)
                .map(|o| StatusCard {
                    order_id: o.id,
                    product_id: o.product_id.clone(),
                    quantity: o.quantity,
                    due_date: o.due_date,
                })
                .collect();
            cards.sort_by(|a, b| a.due_date.cmp(&b.due_date).then(a.order_id.cmp(&b.order_id)));

            StatusColumn { status, cards }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Scheduler;
    use aps_core::WorkCenter;
    use chrono::NaiveDate;

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 9, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn order(product: &str, hours: i64, due: NaiveDateTime) -> ProductionOrder {
        ProductionOrder::new(
            product.to_string(),
            Decimal::from(1),
            Decimal::from(hours),
            due,
            "WC-01".to_string(),
        )
    }

    fn run_edd(orders: &[ProductionOrder], now: NaiveDateTime) -> Schedule {
        let centers = vec![WorkCenter::new("WC-01".to_string(), Decimal::from(8))];
        Scheduler::default()
            .run(orders, &centers, "edd", now)
            .unwrap()
            .schedule
    }

    #[test]
    fn test_gantt_same_product_dependency() {
        let now = at(1, 0);
        let first = order("PROD-A", 4, at(2, 0));
        let second = order("PROD-A", 4, at(3, 0));
        let unrelated = order("PROD-B", 4, at(4, 0));

        let orders = vec![first.clone(), second.clone(), unrelated.clone()];
        let schedule = run_edd(&orders, now);
        let tasks = gantt_tasks(&schedule, &orders, now);

        let second_task = tasks.iter().find(|t| t.id == second.id).unwrap();
        assert_eq!(second_task.depends_on, vec![first.id]);

        // 不同產品不推斷依賴
        let first_task = tasks.iter().find(|t| t.id == first.id).unwrap();
        assert!(first_task.depends_on.is_empty());
    }

    #[test]
    fn test_gantt_slack_flag() {
        let now = at(1, 0);
        // 交期已過 → 負寬裕度，落後旗標
        let late = order("PROD-A", 8, at(1, 4));
        // 交期寬鬆 → 正寬裕度
        let comfortable = order("PROD-B", 2, at(5, 0));

        let orders = vec![late.clone(), comfortable.clone()];
        let schedule = run_edd(&orders, now);
        let tasks = gantt_tasks(&schedule, &orders, now);

        let late_task = tasks.iter().find(|t| t.id == late.id).unwrap();
        assert!(late_task.behind_schedule);
        assert!(late_task.slack_hours < Decimal::ZERO);

        let ok_task = tasks.iter().find(|t| t.id == comfortable.id).unwrap();
        assert!(!ok_task.behind_schedule);
    }

    #[test]
    fn test_gantt_percent_complete_in_progress() {
        use aps_core::OrderStatus;

        let start = at(1, 0);
        let in_progress = order("PROD-A", 8, at(3, 0)).with_status(OrderStatus::InProgress);
        let orders = vec![in_progress.clone()];
        let schedule = run_edd(&orders, start);

        // 執行到一半
        let halfway = at(1, 4);
        let tasks = gantt_tasks(&schedule, &orders, halfway);
        assert_eq!(tasks[0].percent_complete, Decimal::from(50));

        // 尚未開始
        let tasks = gantt_tasks(&schedule, &orders, start);
        assert_eq!(tasks[0].percent_complete, Decimal::ZERO);
    }

    #[test]
    fn test_calendar_events_carry_titles() {
        let now = at(1, 0);
        let o = order("PROD-A", 4, at(2, 0));
        let orders = vec![o.clone()];
        let schedule = run_edd(&orders, now);

        let events = calendar_events(&schedule, &orders);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "PROD-A × 1");
        assert_eq!(events[0].work_center_id, "WC-01");
    }

    #[test]
    fn test_status_board_groups_and_sorts() {
        use aps_core::OrderStatus;

        let later = order("PROD-A", 4, at(9, 0));
        let sooner = order("PROD-B", 4, at(2, 0));
        let done = order("PROD-C", 4, at(3, 0)).with_status(OrderStatus::Completed);

        let board = status_board(&[later.clone(), sooner.clone(), done.clone()]);

        let planned = board
            .iter()
            .find(|c| c.status == OrderStatus::Planned)
            .unwrap();
        assert_eq!(planned.cards.len(), 2);
        // 依交期排序
        assert_eq!(planned.cards[0].order_id, sooner.id);
        assert_eq!(planned.cards[1].order_id, later.id);

        let completed = board
            .iter()
            .find(|c| c.status == OrderStatus::Completed)
            .unwrap();
        assert_eq!(completed.cards.len(), 1);
        assert_eq!(completed.cards[0].order_id, done.id);
    }
}
