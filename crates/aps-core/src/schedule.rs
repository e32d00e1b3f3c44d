//! 排程結果模型

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ApsError, Result};

/// 排程指派（排產器輸出）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    /// 訂單ID
    pub order_id: Uuid,

    /// 工作中心ID
    pub work_center_id: String,

    /// 排定開始時間
    pub scheduled_start: NaiveDateTime,

    /// 排定結束時間
    pub scheduled_end: NaiveDateTime,

    /// 延遲天數 = max(0, 排定結束 − 交期)，不足一天以一天計
    pub lateness_days: i64,
}

impl Assignment {
    /// 創建新的指派，延遲天數由交期推算
    pub fn new(
        order_id: Uuid,
        work_center_id: String,
        scheduled_start: NaiveDateTime,
        scheduled_end: NaiveDateTime,
        due_date: NaiveDateTime,
    ) -> Self {
        Self {
            order_id,
            work_center_id,
            scheduled_start,
            scheduled_end,
            lateness_days: Self::lateness_days(scheduled_end, due_date),
        }
    }

    /// 計算延遲天數（向上取整）
    pub fn lateness_days(scheduled_end: NaiveDateTime, due_date: NaiveDateTime) -> i64 {
        if scheduled_end <= due_date {
            return 0;
        }
        let late_minutes = (scheduled_end - due_date).num_minutes();
        (late_minutes + 1439) / 1440
    }

    /// 是否準時
    pub fn is_on_time(&self) -> bool {
        self.lateness_days == 0
    }

    /// 指派總工期（小時）
    pub fn duration_hours(&self) -> Decimal {
        let minutes = (self.scheduled_end - self.scheduled_start).num_minutes();
        Decimal::from(minutes) / Decimal::from(60)
    }
}

/// 排程彙總指標
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleMetrics {
    /// 訂單總數
    pub total_orders: usize,

    /// 準時訂單數
    pub on_time_count: usize,

    /// 準時率（0-1）
    pub on_time_rate: Decimal,

    /// 平均延遲天數
    pub avg_lateness_days: Decimal,

    /// 最大延遲天數
    pub max_lateness_days: i64,

    /// 總工期（小時）
    pub total_duration_hours: Decimal,

    /// 排程跨度（天）
    pub schedule_span_days: i64,

    /// 利用率 = 總工期 ÷ (跨度天數 × 24)
    pub utilization_rate: Decimal,
}

/// 排程狀態：draft → applied（終態），不存在其他轉換
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    /// 草稿
    Draft,
    /// 已套用（排定時間已回寫至訂單記錄）
    Applied,
}

/// 排產執行參數
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleParameters {
    /// 呼叫端請求的算法名稱（可能與實際採用的不同，見警告）
    pub requested_algorithm: String,

    /// 時段掃描範圍（天）
    pub horizon_days: u32,
}

/// 排程（單次排產執行的不可變快照）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    /// 排程ID
    pub id: Uuid,

    /// 實際採用的算法
    pub algorithm: String,

    /// 執行參數
    pub parameters: ScheduleParameters,

    /// 指派列表（依排產順序）
    pub assignments: Vec<Assignment>,

    /// 彙總指標
    pub metrics: ScheduleMetrics,

    /// 狀態
    pub status: ScheduleStatus,

    /// 創建時間
    pub created_at: NaiveDateTime,
}

impl Schedule {
    /// 創建新的草稿排程
    pub fn new(
        algorithm: String,
        parameters: ScheduleParameters,
        assignments: Vec<Assignment>,
        metrics: ScheduleMetrics,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            algorithm,
            parameters,
            assignments,
            metrics,
            status: ScheduleStatus::Draft,
            created_at,
        }
    }

    /// 標記為已套用（draft → applied 僅允許一次）
    pub fn mark_applied(&mut self) -> Result<()> {
        if self.status == ScheduleStatus::Applied {
            return Err(ApsError::AlreadyApplied(self.id));
        }
        self.status = ScheduleStatus::Applied;
        Ok(())
    }

    /// 是否為草稿
    pub fn is_draft(&self) -> bool {
        self.status == ScheduleStatus::Draft
    }

    /// 回寫配對：持久層協作方據此更新訂單的排定時間
    pub fn apply_pairs(&self) -> Vec<(Uuid, NaiveDateTime, NaiveDateTime)> {
        self.assignments
            .iter()
            .map(|a| (a.order_id, a.scheduled_start, a.scheduled_end))
            .collect()
    }

    /// 查找指定訂單的指派
    pub fn assignment_for(&self, order_id: Uuid) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.order_id == order_id)
    }
}
