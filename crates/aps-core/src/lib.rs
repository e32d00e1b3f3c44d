//! # APS Core
//!
//! 排產引擎核心資料模型與類型定義

pub mod calendar;
pub mod config;
pub mod order;
pub mod schedule;
pub mod work_center;

// Re-export 主要類型
pub use calendar::CapacityLedger;
pub use config::SchedulerConfig;
pub use order::{OrderStatus, Priority, ProductionOrder};
pub use schedule::{Assignment, Schedule, ScheduleMetrics, ScheduleParameters, ScheduleStatus};
pub use work_center::WorkCenter;

use uuid::Uuid;

/// APS 錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum ApsError {
    #[error("無效的輸入（訂單 {order_id}，欄位 {field}）：{reason}")]
    InvalidInput {
        order_id: Uuid,
        field: &'static str,
        reason: String,
    },

    #[error("未知的排產算法: {0}")]
    UnknownAlgorithm(String),

    #[error("排程衝突，涉及 {} 筆訂單", conflicting_orders.len())]
    ScheduleConflict { conflicting_orders: Vec<Uuid> },

    #[error("產能不足：訂單 {order_id} 在 {horizon_days} 天掃描範圍內找不到可用時段")]
    CapacityExceeded { order_id: Uuid, horizon_days: u32 },

    #[error("排程 {0} 已套用，不可重複套用")]
    AlreadyApplied(Uuid),

    #[error("無效的工作中心（{work_center_id}，欄位 {field}）：{reason}")]
    InvalidWorkCenter {
        work_center_id: String,
        field: &'static str,
        reason: String,
    },

    #[error("找不到工作中心: {0}")]
    WorkCenterNotFound(String),
}

pub type Result<T> = std::result::Result<T, ApsError>;

/// 排程驗證發現類型
///
/// 物料/前置條件檢查由外部協作方提供結果，引擎只負責彙整與阻斷判斷
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FindingKind {
    /// 物料不足
    MaterialUnavailable,
    /// 前置條件未滿足
    PrerequisiteUnmet,
}

/// 排程驗證發現（非致命警告，除非配置為阻斷）
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ValidationFinding {
    /// 相關訂單ID
    pub order_id: Uuid,

    /// 發現類型
    pub kind: FindingKind,

    /// 說明訊息
    pub message: String,

    /// 是否阻斷套用
    pub blocking: bool,
}

impl ValidationFinding {
    /// 創建新的驗證發現
    pub fn new(order_id: Uuid, kind: FindingKind, message: String) -> Self {
        Self {
            order_id,
            kind,
            message,
            blocking: false,
        }
    }

    /// 建構器模式：設置為阻斷
    pub fn blocking(mut self) -> Self {
        self.blocking = true;
        self
    }
}
