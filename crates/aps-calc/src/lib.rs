//! # APS Calculation Engine
//!
//! 生產排產計算引擎：排序啟發式、產能裝箱、衝突偵測、
//! 指標/瓶頸分析、視圖投影與情境模擬

pub mod apply;
pub mod conflict;
pub mod heuristics;
pub mod metrics;
pub mod projection;
pub mod scheduler;
pub mod simulator;

// Re-export 主要類型
pub use apply::{apply, AppliedSchedule};
pub use conflict::{conflicts, validate_schedule};
pub use heuristics::Algorithm;
pub use metrics::{
    analyze_capacity, compute_metrics, find_bottlenecks, Bottleneck, BottleneckSeverity,
    CapacityAnalysis, UtilizationStatus,
};
pub use projection::{calendar_events, gantt_tasks, status_board, GanttTask};
pub use scheduler::Scheduler;
pub use simulator::{Scenario, SimulationReport, Simulator};

use uuid::Uuid;

/// 單次排產執行結果
#[derive(Debug, Clone)]
pub struct SchedulingRun {
    /// 產出的排程快照
    pub schedule: aps_core::Schedule,

    /// 警告信息（如算法名稱回退）
    pub warnings: Vec<ScheduleWarning>,

    /// 無法排入的訂單（產能受限啟發式專有，不會被默默丟棄）
    pub unscheduled: Vec<UnscheduledOrder>,
}

/// 無法排入的訂單
#[derive(Debug, Clone)]
pub struct UnscheduledOrder {
    pub order_id: Uuid,
    pub reason: String,
}

/// 排產警告
#[derive(Debug, Clone)]
pub struct ScheduleWarning {
    pub code: &'static str,
    pub message: String,
    pub severity: WarningSeverity,
}

impl ScheduleWarning {
    pub fn new(code: &'static str, message: String, severity: WarningSeverity) -> Self {
        Self {
            code,
            message,
            severity,
        }
    }

    pub fn info(code: &'static str, message: String) -> Self {
        Self::new(code, message, WarningSeverity::Info)
    }

    pub fn warning(code: &'static str, message: String) -> Self {
        Self::new(code, message, WarningSeverity::Warning)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    Info,
    Warning,
}
