//! 生產訂單模型

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ApsError, Result};

/// 訂單優先級
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// 低
    Low,
    /// 一般
    Normal,
    /// 高
    High,
    /// 緊急
    Urgent,
}

impl Priority {
    /// 優先級數值（越大越優先）
    pub fn rank(&self) -> u8 {
        match self {
            Priority::Low => 1,
            Priority::Normal => 2,
            Priority::High => 3,
            Priority::Urgent => 4,
        }
    }
}

/// 訂單狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// 已計劃
    Planned,
    /// 已下達
    Released,
    /// 生產中
    InProgress,
    /// 已完工
    Completed,
    /// 已取消
    Cancelled,
}

/// 生產訂單（引擎輸入，業務記錄由外部協作方持有）
///
/// `processing_hours` / `setup_hours` 為已解析的工時
/// （單件工時 × 數量由呼叫端計算，引擎不做 BOM 展開）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionOrder {
    /// 訂單ID
    pub id: Uuid,

    /// 產品ID
    pub product_id: String,

    /// 計劃數量
    pub quantity: Decimal,

    /// 加工工時（小時）
    pub processing_hours: Decimal,

    /// 換線/準備工時（小時）
    pub setup_hours: Decimal,

    /// 交期
    pub due_date: NaiveDateTime,

    /// 優先級
    pub priority: Priority,

    /// 訂單狀態
    pub status: OrderStatus,

    /// 指定工作中心ID
    pub work_center_id: String,

    /// 計劃開始時間（由排產結果回寫）
    pub planned_start: Option<NaiveDateTime>,

    /// 計劃結束時間（由排產結果回寫）
    pub planned_end: Option<NaiveDateTime>,
}

impl ProductionOrder {
    /// 創建新的生產訂單
    pub fn new(
        product_id: String,
        quantity: Decimal,
        processing_hours: Decimal,
        due_date: NaiveDateTime,
        work_center_id: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_id,
            quantity,
            processing_hours,
            setup_hours: Decimal::ZERO,
            due_date,
            priority: Priority::Normal,
            status: OrderStatus::Planned,
            work_center_id,
            planned_start: None,
            planned_end: None,
        }
    }

    /// 建構器模式：設置訂單ID（來自外部系統時使用）
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// 建構器模式：設置準備工時
    pub fn with_setup_hours(mut self, hours: Decimal) -> Self {
        self.setup_hours = hours;
        self
    }

    /// 建構器模式：設置優先級
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// 建構器模式：設置狀態
    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = status;
        self
    }

    /// 總工時 = 加工工時 + 準備工時
    pub fn total_hours(&self) -> Decimal {
        self.processing_hours + self.setup_hours
    }

    /// 檢查是否可排產（已完工/已取消的訂單不進入排產）
    pub fn is_schedulable(&self) -> bool {
        matches!(self.status, OrderStatus::Planned | OrderStatus::Released)
    }

    /// 記錄級驗證：排產前拒絕格式錯誤的訂單
    pub fn validate(&self) -> Result<()> {
        if self.product_id.is_empty() {
            return Err(ApsError::InvalidInput {
                order_id: self.id,
                field: "product_id",
                reason: "產品ID不可為空".to_string(),
            });
        }

        if self.work_center_id.is_empty() {
            return Err(ApsError::InvalidInput {
                order_id: self.id,
                field: "work_center_id",
                reason: "工作中心ID不可為空".to_string(),
            });
        }

        if self.quantity <= Decimal::ZERO {
            return Err(ApsError::InvalidInput {
                order_id: self.id,
                field: "quantity",
                reason: format!("數量必須為正數，實際為 {}", self.quantity),
            });
        }

        if self.processing_hours <= Decimal::ZERO {
            return Err(ApsError::InvalidInput {
                order_id: self.id,
                field: "processing_hours",
                reason: format!("加工工時必須為正數，實際為 {}", self.processing_hours),
            });
        }

        if self.setup_hours < Decimal::ZERO {
            return Err(ApsError::InvalidInput {
                order_id: self.id,
                field: "setup_hours",
                reason: format!("準備工時不可為負數，實際為 {}", self.setup_hours),
            });
        }

        if let (Some(start), Some(end)) = (self.planned_start, self.planned_end) {
            if end < start {
                return Err(ApsError::InvalidInput {
                    order_id: self.id,
                    field: "planned_end",
                    reason: "計劃結束時間早於開始時間".to_string(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn due(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_create_order() {
        let order = ProductionOrder::new(
            "PROD-001".to_string(),
            Decimal::from(100),
            Decimal::from(8),
            due(2026, 9, 10),
            "WC-01".to_string(),
        );

        assert_eq!(order.product_id, "PROD-001");
        assert_eq!(order.priority, Priority::Normal);
        assert_eq!(order.status, OrderStatus::Planned);
        assert_eq!(order.total_hours(), Decimal::from(8));
        assert!(order.is_schedulable());
    }

    #[test]
    fn test_order_builder() {
        let order = ProductionOrder::new(
            "PROD-002".to_string(),
            Decimal::from(50),
            Decimal::from(4),
            due(2026, 9, 15),
            "WC-02".to_string(),
        )
        .with_setup_hours(Decimal::new(15, 1)) // 1.5 小時
        .with_priority(Priority::Urgent)
        .with_status(OrderStatus::Released);

        assert_eq!(order.setup_hours, Decimal::new(15, 1));
        assert_eq!(order.total_hours(), Decimal::new(55, 1));
        assert_eq!(order.priority, Priority::Urgent);
        assert!(order.is_schedulable());
    }

    #[test]
    fn test_priority_rank_ordering() {
        assert!(Priority::Urgent.rank() > Priority::High.rank());
        assert!(Priority::High.rank() > Priority::Normal.rank());
        assert!(Priority::Normal.rank() > Priority::Low.rank());
        assert!(Priority::Urgent > Priority::Low);
    }

    #[test]
    fn test_completed_not_schedulable() {
        let order = ProductionOrder::new(
            "PROD-003".to_string(),
            Decimal::from(10),
            Decimal::from(2),
            due(2026, 9, 1),
            "WC-01".to_string(),
        )
        .with_status(OrderStatus::Completed);

        assert!(!order.is_schedulable());
    }

    #[test]
    fn test_validate_rejects_non_positive_hours() {
        let order = ProductionOrder::new(
            "PROD-004".to_string(),
            Decimal::from(10),
            Decimal::ZERO,
            due(2026, 9, 1),
            "WC-01".to_string(),
        );

        let err = order.validate().unwrap_err();
        match err {
            crate::ApsError::InvalidInput { field, .. } => {
                assert_eq!(field, "processing_hours");
            }
            other => panic!("非預期錯誤: {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_empty_work_center() {
        let order = ProductionOrder::new(
            "PROD-005".to_string(),
            Decimal::from(10),
            Decimal::from(1),
            due(2026, 9, 1),
            String::new(),
        );

        assert!(order.validate().is_err());
    }
}
