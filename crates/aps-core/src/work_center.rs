//! 工作中心模型

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{ApsError, Result};

/// 工作中心（可排產的生產資源，產能以每日小時數計）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkCenter {
    /// 工作中心ID
    pub id: String,

    /// 名稱
    pub name: String,

    /// 每日名義產能（小時）
    pub daily_capacity_hours: Decimal,

    /// 效率百分比（0-100）
    pub efficiency_percent: Decimal,

    /// 可用率百分比（0-100）
    pub availability_percent: Decimal,

    /// 工作日（索引 0 = 週一, 1 = 週二, ..., 6 = 週日）
    pub active_weekdays: [bool; 7],
}

impl WorkCenter {
    /// 創建新的工作中心（預設週一到週五工作，效率與可用率 100%）
    pub fn new(id: String, daily_capacity_hours: Decimal) -> Self {
        Self {
            name: id.clone(),
            id,
            daily_capacity_hours,
            efficiency_percent: Decimal::from(100),
            availability_percent: Decimal::from(100),
            active_weekdays: [true, true, true, true, true, false, false],
        }
    }

    /// 建構器模式：設置名稱
    pub fn with_name(mut self, name: String) -> Self {
        self.name = name;
        self
    }

    /// 建構器模式：設置效率百分比
    pub fn with_efficiency(mut self, percent: Decimal) -> Self {
        self.efficiency_percent = percent;
        self
    }

    /// 建構器模式：設置可用率百分比
    pub fn with_availability(mut self, percent: Decimal) -> Self {
        self.availability_percent = percent;
        self
    }

    /// 建構器模式：設置工作日
    pub fn with_active_weekdays(mut self, weekdays: [bool; 7]) -> Self {
        self.active_weekdays = weekdays;
        self
    }

    /// 建構器模式：7天全開（連續生產線）
    pub fn with_all_days_active(mut self) -> Self {
        self.active_weekdays = [true; 7];
        self
    }

    /// 有效每日產能 = 名義產能 × 可用率 × 效率
    pub fn effective_daily_capacity(&self) -> Decimal {
        let hundred = Decimal::from(100);
        self.daily_capacity_hours * (self.availability_percent / hundred)
            * (self.efficiency_percent / hundred)
    }

    /// 記錄級驗證：排產前拒絕格式錯誤的工作中心
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(ApsError::InvalidWorkCenter {
                work_center_id: self.id.clone(),
                field: "id",
                reason: "工作中心ID不可為空".to_string(),
            });
        }

        if self.daily_capacity_hours <= Decimal::ZERO {
            return Err(ApsError::InvalidWorkCenter {
                work_center_id: self.id.clone(),
                field: "daily_capacity_hours",
                reason: format!("每日產能必須為正數，實際為 {}", self.daily_capacity_hours),
            });
        }

        let hundred = Decimal::from(100);
        for (field, value) in [
            ("efficiency_percent", self.efficiency_percent),
            ("availability_percent", self.availability_percent),
        ] {
            if value <= Decimal::ZERO || value > hundred {
                return Err(ApsError::InvalidWorkCenter {
                    work_center_id: self.id.clone(),
                    field,
                    reason: format!("百分比必須介於 (0, 100]，實際為 {value}"),
                });
            }
        }

        Ok(())
    }

    /// 檢查指定日期是否為工作日
    pub fn is_active_day(&self, date: NaiveDate) -> bool {
        let weekday_index = date.weekday().num_days_from_monday() as usize;
        self.active_weekdays[weekday_index]
    }

    /// 獲取下一個工作日（不含當日）
    pub fn next_active_day(&self, date: NaiveDate) -> NaiveDate {
        let mut current = date;
        loop {
            current = current.succ_opt().expect("日期溢出");
            if self.is_active_day(current) {
                return current;
            }
        }
    }
}
