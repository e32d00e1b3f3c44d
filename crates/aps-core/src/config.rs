//! 排產配置模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 排產器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// 時段掃描範圍（天）：限制單筆訂單逐日搜尋的上限，
    /// 亦是呼叫端約束整體延遲的手段
    pub scan_horizon_days: u32,

    /// 瓶頸判定門檻（利用率百分比）
    pub bottleneck_threshold_percent: Decimal,

    /// 驗證發現是否阻斷套用
    /// - false: 物料/前置條件發現僅作為警告（預設）
    /// - true: 任一發現即阻斷
    pub blocking_validation: bool,
}

impl SchedulerConfig {
    /// 創建預設配置
    pub fn new() -> Self {
        Self {
            scan_horizon_days: 365,
            bottleneck_threshold_percent: Decimal::from(90),
            blocking_validation: false,
        }
    }

    /// 建構器模式：設置掃描範圍
    pub fn with_scan_horizon(mut self, days: u32) -> Self {
        self.scan_horizon_days = days;
        self
    }

    /// 建構器模式：設置瓶頸門檻
    pub fn with_bottleneck_threshold(mut self, percent: Decimal) -> Self {
        self.bottleneck_threshold_percent = percent;
        self
    }

    /// 建構器模式：設置驗證阻斷
    pub fn with_blocking_validation(mut self, blocking: bool) -> Self {
        self.blocking_validation = blocking;
        self
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::new()
    }
}
