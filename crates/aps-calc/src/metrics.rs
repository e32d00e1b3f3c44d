//! 排程指標與瓶頸分析

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use aps_core::{Assignment, ScheduleMetrics, WorkCenter};

/// 由指派列表彙總排程指標
pub fn compute_metrics(assignments: &[Assignment]) -> ScheduleMetrics {
    if assignments.is_empty() {
        return ScheduleMetrics::default();
    }

    let total_orders = assignments.len();
    let on_time_count = assignments.iter().filter(|a| a.is_on_time()).count();
    let max_lateness_days = assignments
        .iter()
        .map(|a| a.lateness_days)
        .max()
        .unwrap_or(0);
    let total_lateness: i64 = assignments.iter().map(|a| a.lateness_days).sum();
    let total_duration_hours: Decimal = assignments.iter().map(|a| a.duration_hours()).sum();

    let span_start = assignments
        .iter()
        .map(|a| a.scheduled_start)
        .min()
        .expect("指派非空");
    let span_end = assignments
        .iter()
        .map(|a| a.scheduled_end)
        .max()
        .expect("指派非空");

    // 跨度不足一天以一天計
    let span_minutes = (span_end - span_start).num_minutes();
    let schedule_span_days = ((span_minutes + 1439) / 1440).max(1);

    let total = Decimal::from(total_orders as u64);
    let utilization_rate =
        total_duration_hours / (Decimal::from(schedule_span_days) * Decimal::from(24));

    ScheduleMetrics {
        total_orders,
        on_time_count,
        on_time_rate: Decimal::from(on_time_count as u64) / total,
        avg_lateness_days: Decimal::from(total_lateness) / total,
        max_lateness_days,
        total_duration_hours,
        schedule_span_days,
        utilization_rate,
    }
}

/// 利用率狀態分級
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UtilizationStatus {
    /// 超載（>100%）
    Overload,
    /// 高利用（>90%）
    High,
    /// 正常（>70%）
    Normal,
    /// 低利用
    Low,
}

impl UtilizationStatus {
    /// 依利用率百分比分級
    pub fn from_percent(percent: Decimal) -> Self {
        if percent > Decimal::from(100) {
            UtilizationStatus::Overload
        } else if percent > Decimal::from(90) {
            UtilizationStatus::High
        } else if percent > Decimal::from(70) {
            UtilizationStatus::Normal
        } else {
            UtilizationStatus::Low
        }
    }
}

/// 單一工作中心的產能分析
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapacityAnalysis {
    /// 工作中心ID
    pub work_center_id: String,

    /// 期間總產能（有效每日產能 × 期間天數）
    pub capacity_total: Decimal,

    /// 已排定工時
    pub scheduled_hours: Decimal,

    /// 利用率百分比
    pub utilization_percent: Decimal,

    /// 狀態分級
    pub status: UtilizationStatus,
}

/// 按工作中心彙總期間產能利用
pub fn analyze_capacity(
    assignments: &[Assignment],
    work_centers: &[WorkCenter],
    period_days: u32,
) -> Vec<CapacityAnalysis> {
    work_centers
        .iter()
        .map(|work_center| {
            let scheduled_hours: Decimal = assignments
                .iter()
                .filter(|a| a.work_center_id == work_center.id)
                .map(|a| a.duration_hours())
                .sum();

            let capacity_total =
                work_center.effective_daily_capacity() * Decimal::from(period_days);

            let utilization_percent = if capacity_total > Decimal::ZERO {
                scheduled_hours / capacity_total * Decimal::from(100)
            } else {
                Decimal::ZERO
            };

            CapacityAnalysis {
                work_center_id: work_center.id.clone(),
                capacity_total,
                scheduled_hours,
                utilization_percent,
                status: UtilizationStatus::from_percent(utilization_percent),
            }
        })
        .collect()
}

/// 瓶頸嚴重度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BottleneckSeverity {
    /// 利用率 >100%
    Critical,
    /// 利用率 >95%
    High,
    /// 超過門檻但 ≤95%
    Medium,
}

impl BottleneckSeverity {
    fn from_percent(percent: Decimal) -> Self {
        if percent > Decimal::from(100) {
            BottleneckSeverity::Critical
        } else if percent > Decimal::from(95) {
            BottleneckSeverity::High
        } else {
            BottleneckSeverity::Medium
        }
    }
}

/// 瓶頸工作中心
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bottleneck {
    /// 工作中心ID
    pub work_center_id: String,

    /// 利用率百分比
    pub utilization_percent: Decimal,

    /// 嚴重度
    pub severity: BottleneckSeverity,

    /// 影響分數 = min(利用率/100, 2) × 已排定工時/1000
    pub impact_score: Decimal,

    /// 改善建議（依門檻規則選取）
    pub suggestions: Vec<String>,
}

/// 找出超過門檻的瓶頸工作中心，依利用率降冪排列
pub fn find_bottlenecks(
    analyses: &[CapacityAnalysis],
    threshold_percent: Decimal,
) -> Vec<Bottleneck> {
    let mut bottlenecks: Vec<Bottleneck> = analyses
        .iter()
        .filter(|a| a.utilization_percent > threshold_percent)
        .map(|a| {
            let ratio = (a.utilization_percent / Decimal::from(100)).min(Decimal::from(2));
            let impact_score = ratio * (a.scheduled_hours / Decimal::from(1000));

            Bottleneck {
                work_center_id: a.work_center_id.clone(),
                utilization_percent: a.utilization_percent,
                severity: BottleneckSeverity::from_percent(a.utilization_percent),
                impact_score,
                suggestions: suggestions_for(a.utilization_percent),
            }
        })
        .collect();

    bottlenecks.sort_by(|a, b| {
        b.utilization_percent
            .cmp(&a.utilization_percent)
            .then(a.work_center_id.cmp(&b.work_center_id))
    });
    bottlenecks
}

/// 依利用率門檻選取改善建議
fn suggestions_for(utilization_percent: Decimal) -> Vec<String> {
    let mut suggestions = vec!["重新分配負載至利用率較低的工作中心".to_string()];

    if utilization_percent > Decimal::from(95) {
        suggestions.push("增加班次或安排加班時段".to_string());
    }
    if utilization_percent > Decimal::from(100) {
        suggestions.push("檢討換線與準備工時，縮短非加工佔用".to_string());
    }

    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use uuid::Uuid;

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 9, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn assignment(wc: &str, start: NaiveDateTime, end: NaiveDateTime, due: NaiveDateTime) -> Assignment {
        Assignment::new(Uuid::new_v4(), wc.to_string(), start, end, due)
    }

    #[test]
    fn test_metrics_empty() {
        let m = compute_metrics(&[]);
        assert_eq!(m.total_orders, 0);
        assert_eq!(m.on_time_rate, Decimal::ZERO);
        assert_eq!(m.schedule_span_days, 0);
    }

    #[test]
    fn test_metrics_basic() {
        let assignments = vec![
            assignment("WC-01", at(1, 0), at(1, 4), at(2, 0)), // 準時
            assignment("WC-01", at(1, 4), at(1, 8), at(1, 6)), // 晚 2h → 1 天
        ];

        let m = compute_metrics(&assignments);
        assert_eq!(m.total_orders, 2);
        assert_eq!(m.on_time_count, 1);
        assert_eq!(m.on_time_rate, Decimal::new(5, 1)); // 0.5
        assert_eq!(m.max_lateness_days, 1);
        assert_eq!(m.avg_lateness_days, Decimal::new(5, 1));
        assert_eq!(m.total_duration_hours, Decimal::from(8));
        // 跨度 8h → 以 1 天計；利用率 = 8 / 24
        assert_eq!(m.schedule_span_days, 1);
        assert_eq!(m.utilization_rate, Decimal::from(8) / Decimal::from(24));
    }

    #[test]
    fn test_metrics_span_multiple_days() {
        let assignments = vec![
            assignment("WC-01", at(1, 0), at(1, 8), at(5, 0)),
            assignment("WC-01", at(3, 0), at(3, 8), at(5, 0)),
        ];

        let m = compute_metrics(&assignments);
        // 09-01 00:00 → 09-03 08:00 = 56h → 3 天
        assert_eq!(m.schedule_span_days, 3);
    }

    #[test]
    fn test_utilization_status_banding() {
        assert_eq!(
            UtilizationStatus::from_percent(Decimal::from(110)),
            UtilizationStatus::Overload
        );
        assert_eq!(
            UtilizationStatus::from_percent(Decimal::from(95)),
            UtilizationStatus::High
        );
        assert_eq!(
            UtilizationStatus::from_percent(Decimal::from(80)),
            UtilizationStatus::Normal
        );
        assert_eq!(
            UtilizationStatus::from_percent(Decimal::from(50)),
            UtilizationStatus::Low
        );
    }

    #[test]
    fn test_analyze_capacity() {
        let wc = WorkCenter::new("WC-01".to_string(), Decimal::from(8));
        // 5 天期間 × 8h = 40h 產能，排定 20h
        let assignments = vec![
            assignment("WC-01", at(1, 0), at(1, 8), at(9, 0)),
            assignment("WC-01", at(2, 0), at(2, 8), at(9, 0)),
            assignment("WC-01", at(3, 0), at(3, 4), at(9, 0)),
        ];

        let analyses = analyze_capacity(&assignments, &[wc], 5);
        assert_eq!(analyses.len(), 1);
        assert_eq!(analyses[0].capacity_total, Decimal::from(40));
        assert_eq!(analyses[0].scheduled_hours, Decimal::from(20));
        assert_eq!(analyses[0].utilization_percent, Decimal::from(50));
        assert_eq!(analyses[0].status, UtilizationStatus::Low);
    }

    /// 場景 3：110% 利用率必須回報 critical 且建議非空
    #[test]
    fn test_bottleneck_critical_at_110_percent() {
        let analysis = CapacityAnalysis {
            work_center_id: "WC-01".to_string(),
            capacity_total: Decimal::from(40),
            scheduled_hours: Decimal::from(44),
            utilization_percent: Decimal::from(110),
            status: UtilizationStatus::Overload,
        };

        let bottlenecks = find_bottlenecks(&[analysis], Decimal::from(90));
        assert_eq!(bottlenecks.len(), 1);
        assert_eq!(bottlenecks[0].severity, BottleneckSeverity::Critical);
        assert!(!bottlenecks[0].suggestions.is_empty());

        // impact = min(1.1, 2) × 44/1000
        assert_eq!(
            bottlenecks[0].impact_score,
            Decimal::new(11, 1) * Decimal::from(44) / Decimal::from(1000)
        );
    }

    #[test]
    fn test_bottleneck_severity_bands() {
        let make = |percent: i64| CapacityAnalysis {
            work_center_id: format!("WC-{percent}"),
            capacity_total: Decimal::from(100),
            scheduled_hours: Decimal::from(percent),
            utilization_percent: Decimal::from(percent),
            status: UtilizationStatus::from_percent(Decimal::from(percent)),
        };

        let bottlenecks = find_bottlenecks(
            &[make(92), make(97), make(120), make(60)],
            Decimal::from(90),
        );

        // 60% 不超過門檻；其餘依利用率降冪
        assert_eq!(bottlenecks.len(), 3);
        assert_eq!(bottlenecks[0].severity, BottleneckSeverity::Critical);
        assert_eq!(bottlenecks[1].severity, BottleneckSeverity::High);
        assert_eq!(bottlenecks[2].severity, BottleneckSeverity::Medium);
    }
}
