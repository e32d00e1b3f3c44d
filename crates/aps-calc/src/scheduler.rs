//! 排產器：驗證 → 排序 → 放置 → 指標彙總
//!
//! 對相同的輸入與注入時鐘，`run` 是純函數：`CapacityLedger` 在每次
//! 呼叫開始時新建、結束即丟棄，不同執行之間沒有共享可變狀態。

use std::collections::HashMap;

use chrono::NaiveDateTime;

use aps_core::{
    calendar::hours_to_duration, ApsError, Assignment, CapacityLedger, ProductionOrder, Result,
    Schedule, ScheduleParameters, SchedulerConfig, WorkCenter,
};

use crate::heuristics::Algorithm;
use crate::{metrics, ScheduleWarning, SchedulingRun, UnscheduledOrder};

/// 排產器
#[derive(Debug, Clone)]
pub struct Scheduler {
    config: SchedulerConfig,
}

impl Scheduler {
    /// 創建新的排產器
    pub fn new(config: SchedulerConfig) -> Self {
        Self { config }
    }

    /// 獲取配置引用
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// 產能分析 + 瓶頸偵測，門檻取自配置
    pub fn bottlenecks(
        &self,
        assignments: &[Assignment],
        work_centers: &[WorkCenter],
        period_days: u32,
    ) -> Vec<crate::Bottleneck> {
        let analyses = metrics::analyze_capacity(assignments, work_centers, period_days);
        metrics::find_bottlenecks(&analyses, self.config.bottleneck_threshold_percent)
    }

    /// 執行排產
    ///
    /// `now` 為注入時鐘：緊迫係數與序列起點的唯一外部時間依賴，
    /// 由呼叫端明確傳入以保證可重現
    pub fn run(
        &self,
        orders: &[ProductionOrder],
        work_centers: &[WorkCenter],
        algorithm_name: &str,
        now: NaiveDateTime,
    ) -> Result<SchedulingRun> {
        tracing::info!(
            "開始排產：訂單 {} 筆，工作中心 {} 個，算法 {}",
            orders.len(),
            work_centers.len(),
            algorithm_name
        );

        // Step 1: 輸入驗證（任何排產動作之前，整批拒絕）
        tracing::debug!("Step 1: 輸入驗證");
        let work_center_map = Self::validate_inputs(orders, work_centers)?;

        // Step 2: 過濾可排產訂單
        let mut warnings: Vec<ScheduleWarning> = Vec::new();
        let schedulable: Vec<ProductionOrder> = orders
            .iter()
            .filter(|o| o.is_schedulable())
            .cloned()
            .collect();
        let filtered = orders.len() - schedulable.len();
        if filtered > 0 {
            warnings.push(ScheduleWarning::info(
                "ORDERS_FILTERED",
                format!("{filtered} 筆已完工/已取消訂單未納入排產"),
            ));
        }
        tracing::debug!("Step 2: 可排產訂單 {} 筆", schedulable.len());

        // Step 3: 解析算法（未知名稱回退 EDD 並產生警告）
        let (algorithm, fallback_warning) = Algorithm::parse(algorithm_name);
        if let Some(warning) = fallback_warning {
            tracing::warn!("{}", warning.message);
            warnings.push(warning);
        }

        // Step 4: 排序
        tracing::debug!("Step 4: 以 {} 排序", algorithm.name());
        let sequenced = algorithm.sequence(&schedulable, now);

        // Step 5: 放置
        tracing::debug!("Step 5: 順序放置");
        let mut unscheduled = Vec::new();
        let assignments = if algorithm.is_capacity_aware() {
            self.place_capacity_constrained(&sequenced, &work_center_map, now, &mut unscheduled)
        } else {
            Self::place_serial(&sequenced, now)
        };

        // Step 6: 指標彙總
        tracing::debug!("Step 6: 指標彙總");
        let schedule_metrics = metrics::compute_metrics(&assignments);

        let schedule = Schedule::new(
            algorithm.name().to_string(),
            ScheduleParameters {
                requested_algorithm: algorithm_name.to_string(),
                horizon_days: self.config.scan_horizon_days,
            },
            assignments,
            schedule_metrics,
            now,
        );

        tracing::info!(
            "排產完成：指派 {} 筆，未排入 {} 筆，準時率 {}",
            schedule.assignments.len(),
            unscheduled.len(),
            schedule.metrics.on_time_rate
        );

        Ok(SchedulingRun {
            schedule,
            warnings,
            unscheduled,
        })
    }

    /// 整批輸入驗證；回傳工作中心索引
    fn validate_inputs<'a>(
        orders: &[ProductionOrder],
        work_centers: &'a [WorkCenter],
    ) -> Result<HashMap<&'a str, &'a WorkCenter>> {
        for work_center in work_centers {
            work_center.validate()?;
        }

        let work_center_map: HashMap<&str, &WorkCenter> = work_centers
            .iter()
            .map(|wc| (wc.id.as_str(), wc))
            .collect();

        for order in orders {
            order.validate()?;
            if order.is_schedulable() && !work_center_map.contains_key(order.work_center_id.as_str())
            {
                return Err(ApsError::WorkCenterNotFound(order.work_center_id.clone()));
            }
        }

        Ok(work_center_map)
    }

    /// 串行放置（EDD / SPT / CR）
    ///
    /// 單一時間游標依序推進各訂單的總工時，模擬一條串行時間線；
    /// 不檢查跨資源競爭，亦不查詢產能日曆
    fn place_serial(sequenced: &[ProductionOrder], now: NaiveDateTime) -> Vec<Assignment> {
        let mut cursor = now;
        let mut assignments = Vec::with_capacity(sequenced.len());

        for order in sequenced {
            let start = cursor;
            let end = cursor + hours_to_duration(order.total_hours());
            cursor = end;

            assignments.push(Assignment::new(
                order.id,
                order.work_center_id.clone(),
                start,
                end,
                order.due_date,
            ));
        }

        assignments
    }

    /// 產能受限放置（CC）
    ///
    /// 逐筆在指定工作中心上查詢最早可用時段並提交至帳本；
    /// 掃描範圍內找不到時段的訂單進入未排入清單，不默默丟棄
    fn place_capacity_constrained(
        &self,
        sequenced: &[ProductionOrder],
        work_center_map: &HashMap<&str, &WorkCenter>,
        now: NaiveDateTime,
        unscheduled: &mut Vec<UnscheduledOrder>,
    ) -> Vec<Assignment> {
        let mut ledger = CapacityLedger::new();
        let mut assignments = Vec::with_capacity(sequenced.len());
        let horizon = self.config.scan_horizon_days;

        for order in sequenced {
            // 驗證已保證存在
            let Some(work_center) = work_center_map.get(order.work_center_id.as_str()) else {
                continue;
            };

            let duration = order.total_hours();
            let placed = ledger
                .find_earliest_slot(work_center, duration, now, horizon)
                .and_then(|start| {
                    ledger
                        .span_end(work_center, start, duration, horizon)
                        .map(|end| (start, end))
                });

            match placed {
                Some((start, end)) => {
                    ledger.book(work_center, start, end);
                    assignments.push(Assignment::new(
                        order.id,
                        order.work_center_id.clone(),
                        start,
                        end,
                        order.due_date,
                    ));
                }
                None => {
                    let error = ApsError::CapacityExceeded {
                        order_id: order.id,
                        horizon_days: horizon,
                    };
                    tracing::warn!("{error}");
                    unscheduled.push(UnscheduledOrder {
                        order_id: order.id,
                        reason: error.to_string(),
                    });
                }
            }
        }

        assignments
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}
