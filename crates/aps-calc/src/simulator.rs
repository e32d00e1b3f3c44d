//! 情境模擬（what-if）
//!
//! 對訂單集合施加確定性擾動後重跑排產，與基準指標比對。
//! 每次模擬各自持有產能帳本，彼此無共享狀態，批次模擬可安全平行。

use chrono::NaiveDateTime;
use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use aps_core::{ProductionOrder, Result, Schedule, ScheduleMetrics, SchedulerConfig, WorkCenter};

use crate::scheduler::Scheduler;

/// 模擬情境（對訂單集合的確定性轉換）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "scenario", rename_all = "snake_case")]
pub enum Scenario {
    /// 產能提升：加工工時等比例縮減 `percent`%
    CapacityIncrease { percent: Decimal },

    /// 插單：附加一批新訂單
    NewOrders { orders: Vec<ProductionOrder> },

    /// 停機保養：指定工作中心上的訂單各增加固定工時
    MaintenanceDowntime {
        work_center_id: String,
        added_hours: Decimal,
    },
}

impl Scenario {
    /// 情境標籤
    pub fn label(&self) -> &'static str {
        match self {
            Scenario::CapacityIncrease { .. } => "capacity_increase",
            Scenario::NewOrders { .. } => "new_orders",
            Scenario::MaintenanceDowntime { .. } => "maintenance_downtime",
        }
    }

    /// 對基準訂單集合施加擾動
    fn transform(&self, baseline: &[ProductionOrder]) -> Vec<ProductionOrder> {
        match self {
            Scenario::CapacityIncrease { percent } => {
                let factor = (Decimal::from(100) - *percent) / Decimal::from(100);
                baseline
                    .iter()
                    .map(|order| {
                        let mut perturbed = order.clone();
                        perturbed.processing_hours = order.processing_hours * factor;
                        perturbed
                    })
                    .collect()
            }
            Scenario::NewOrders { orders } => {
                let mut perturbed = baseline.to_vec();
                perturbed.extend(orders.iter().cloned());
                perturbed
            }
            Scenario::MaintenanceDowntime {
                work_center_id,
                added_hours,
            } => baseline
                .iter()
                .map(|order| {
                    let mut perturbed = order.clone();
                    if order.work_center_id == *work_center_id {
                        perturbed.processing_hours = order.processing_hours + *added_hours;
                    }
                    perturbed
                })
                .collect(),
        }
    }
}

/// 指標差異（情境 − 基準）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsDelta {
    /// 準時率差異
    pub on_time_rate: Decimal,

    /// 平均延遲天數差異
    pub avg_lateness_days: Decimal,

    /// 利用率差異
    pub utilization_rate: Decimal,
}

impl MetricsDelta {
    fn between(baseline: &ScheduleMetrics, simulated: &ScheduleMetrics) -> Self {
        Self {
            on_time_rate: simulated.on_time_rate - baseline.on_time_rate,
            avg_lateness_days: simulated.avg_lateness_days - baseline.avg_lateness_days,
            utilization_rate: simulated.utilization_rate - baseline.utilization_rate,
        }
    }
}

/// 建議等級
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationLevel {
    High,
    Warning,
    Info,
}

/// 門檻觸發的文字建議
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub level: RecommendationLevel,
    pub message: String,
}

/// 模擬報告
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    /// 情境標籤
    pub scenario: String,

    /// 情境排程快照
    pub schedule: Schedule,

    /// 基準指標
    pub baseline_metrics: ScheduleMetrics,

    /// 情境指標
    pub simulated_metrics: ScheduleMetrics,

    /// 指標差異（情境 − 基準）
    pub delta: MetricsDelta,

    /// 門檻觸發的建議
    pub recommendations: Vec<Recommendation>,
}

/// 情境模擬器
#[derive(Debug, Clone, Default)]
pub struct Simulator {
    scheduler: Scheduler,
}

impl Simulator {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            scheduler: Scheduler::new(config),
        }
    }

    /// 執行單一情境模擬
    ///
    /// 基準與情境各跑一次排產，回傳情境排程、指標差異與建議
    pub fn simulate(
        &self,
        scenario: &Scenario,
        baseline_orders: &[ProductionOrder],
        work_centers: &[WorkCenter],
        algorithm_name: &str,
        now: NaiveDateTime,
    ) -> Result<SimulationReport> {
        info!(
            scenario = scenario.label(),
            orders = baseline_orders.len(),
            "開始情境模擬"
        );

        let baseline_run = self
            .scheduler
            .run(baseline_orders, work_centers, algorithm_name, now)?;

        let perturbed = scenario.transform(baseline_orders);
        debug!(perturbed_orders = perturbed.len(), "擾動後訂單集合");

        let simulated_run = self
            .scheduler
            .run(&perturbed, work_centers, algorithm_name, now)?;

        let baseline_metrics = baseline_run.schedule.metrics.clone();
        let simulated_metrics = simulated_run.schedule.metrics.clone();
        let delta = MetricsDelta::between(&baseline_metrics, &simulated_metrics);
        let recommendations = recommendations_for(&simulated_metrics, &delta);

        info!(
            scenario = scenario.label(),
            on_time_rate_delta = %delta.on_time_rate,
            "情境模擬完成"
        );

        Ok(SimulationReport {
            scenario: scenario.label().to_string(),
            schedule: simulated_run.schedule,
            baseline_metrics,
            simulated_metrics,
            delta,
            recommendations,
        })
    }

    /// 平行執行多個獨立情境
    ///
    /// 每次模擬各自持有帳本，rayon 平行無需協調
    pub fn simulate_many(
        &self,
        scenarios: &[Scenario],
        baseline_orders: &[ProductionOrder],
        work_centers: &[WorkCenter],
        algorithm_name: &str,
        now: NaiveDateTime,
    ) -> Result<Vec<SimulationReport>> {
        scenarios
            .par_iter()
            .map(|scenario| {
                self.simulate(scenario, baseline_orders, work_centers, algorithm_name, now)
            })
            .collect()
    }
}

/// 門檻規則選取建議
fn recommendations_for(simulated: &ScheduleMetrics, delta: &MetricsDelta) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    if simulated.total_orders > 0 && simulated.on_time_rate < Decimal::new(8, 1) {
        recommendations.push(Recommendation {
            level: RecommendationLevel::High,
            message: format!(
                "情境準時率 {:.0}% 低於 80%，建議調整產能或交期",
                simulated.on_time_rate * Decimal::from(100)
            ),
        });
    }

    if delta.avg_lateness_days > Decimal::ZERO {
        recommendations.push(Recommendation {
            level: RecommendationLevel::Warning,
            message: format!(
                "平均延遲較基準增加 {} 天",
                delta.avg_lateness_days.round_dp(2)
            ),
        });
    }

    if delta.on_time_rate > Decimal::ZERO {
        recommendations.push(Recommendation {
            level: RecommendationLevel::Info,
            message: format!(
                "情境改善準時率 {:.0}%",
                delta.on_time_rate * Decimal::from(100)
            ),
        });
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
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

    fn centers() -> Vec<WorkCenter> {
        vec![WorkCenter::new("WC-01".to_string(), Decimal::from(8))]
    }

    /// 場景 4：產能提升 20% 不得使平均延遲上升（加工工時嚴格縮短）
    #[test]
    fn test_capacity_increase_never_worsens_lateness() {
        let now = at(1, 0);
        // 基準交期緊迫，必然延遲
        let orders = vec![
            order("PROD-A", 10, at(1, 4)),
            order("PROD-B", 8, at(1, 12)),
        ];

        let report = Simulator::default()
            .simulate(
                &Scenario::CapacityIncrease {
                    percent: Decimal::from(20),
                },
                &orders,
                &centers(),
                "edd",
                now,
            )
            .unwrap();

        assert!(report.baseline_metrics.avg_lateness_days > Decimal::ZERO);
        assert!(
            report.simulated_metrics.avg_lateness_days
                <= report.baseline_metrics.avg_lateness_days
        );
        assert!(report.delta.avg_lateness_days <= Decimal::ZERO);
        assert_eq!(report.scenario, "capacity_increase");
    }

    #[test]
    fn test_new_orders_appends_to_baseline() {
        let now = at(1, 0);
        let orders = vec![order("PROD-A", 4, at(2, 0))];
        let injected = order("PROD-X", 2, at(3, 0));

        let report = Simulator::default()
            .simulate(
                &Scenario::NewOrders {
                    orders: vec![injected],
                },
                &orders,
                &centers(),
                "edd",
                now,
            )
            .unwrap();

        assert_eq!(report.baseline_metrics.total_orders, 1);
        assert_eq!(report.simulated_metrics.total_orders, 2);
    }

    #[test]
    fn test_maintenance_downtime_only_hits_matching_work_center() {
        let now = at(1, 0);
        let mut other = order("PROD-B", 4, at(9, 0));
        other.work_center_id = "WC-02".to_string();

        let mut work_centers = centers();
        work_centers.push(WorkCenter::new("WC-02".to_string(), Decimal::from(8)));

        let orders = vec![order("PROD-A", 4, at(9, 0)), other];

        let report = Simulator::default()
            .simulate(
                &Scenario::MaintenanceDowntime {
                    work_center_id: "WC-01".to_string(),
                    added_hours: Decimal::from(2),
                },
                &orders,
                &work_centers,
                "edd",
                now,
            )
            .unwrap();

        // 只有 WC-01 的訂單加 2h
        assert_eq!(
            report.simulated_metrics.total_duration_hours,
            report.baseline_metrics.total_duration_hours + Decimal::from(2)
        );
    }

    #[test]
    fn test_low_on_time_rate_triggers_high_alert() {
        let now = at(1, 0);
        let orders = vec![order("PROD-A", 4, at(2, 0))];

        let report = Simulator::default()
            .simulate(
                &Scenario::MaintenanceDowntime {
                    work_center_id: "WC-01".to_string(),
                    added_hours: Decimal::from(100),
                },
                &orders,
                &centers(),
                "edd",
                now,
            )
            .unwrap();

        assert_eq!(report.simulated_metrics.on_time_rate, Decimal::ZERO);
        assert!(report
            .recommendations
            .iter()
            .any(|r| r.level == RecommendationLevel::High));
    }

    #[test]
    fn test_simulate_many_preserves_scenario_order() {
        let now = at(1, 0);
        let orders = vec![order("PROD-A", 4, at(2, 0))];

        let scenarios = vec![
            Scenario::CapacityIncrease {
                percent: Decimal::from(10),
            },
            Scenario::NewOrders {
                orders: vec![order("PROD-X", 2, at(3, 0))],
            },
            Scenario::MaintenanceDowntime {
                work_center_id: "WC-01".to_string(),
                added_hours: Decimal::from(1),
            },
        ];

        let reports = Simulator::default()
            .simulate_many(&scenarios, &orders, &centers(), "edd", now)
            .unwrap();

        assert_eq!(reports.len(), 3);
        assert_eq!(reports[0].scenario, "capacity_increase");
        assert_eq!(reports[1].scenario, "new_orders");
        assert_eq!(reports[2].scenario, "maintenance_downtime");
    }
}
