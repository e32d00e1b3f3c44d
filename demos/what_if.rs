//! # 情境模擬（what-if）範例
//!
//! 對同一組訂單平行模擬三種情境：
//! - 產能提升 20%
//! - 插單兩筆急件
//! - CNC 停機保養（每筆訂單 +2h）

use aps_calc::{Scenario, Simulator};
use aps_core::*;
use chrono::NaiveDate;
use rust_decimal::Decimal;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    println!("🔮 ===== 情境模擬範例 =====");
    println!();

    let now = NaiveDate::from_ymd_opt(2026, 8, 31)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();

    let due = |d: u32, h: u32| {
        NaiveDate::from_ymd_opt(2026, 9, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    };

    let work_centers = vec![WorkCenter::new("CNC-01".to_string(), Decimal::from(8))];

    // 基準訂單：交期偏緊，部分延遲
    let orders = vec![
        ProductionOrder::new(
            "GEAR-100".to_string(),
            Decimal::from(50),
            Decimal::from(10),
            due(1, 4),
            "CNC-01".to_string(),
        ),
        ProductionOrder::new(
            "SHAFT-200".to_string(),
            Decimal::from(20),
            Decimal::from(6),
            due(1, 12),
            "CNC-01".to_string(),
        ),
    ];

    let scenarios = vec![
        Scenario::CapacityIncrease {
            percent: Decimal::from(20),
        },
        Scenario::NewOrders {
            orders: vec![ProductionOrder::new(
                "RUSH-999".to_string(),
                Decimal::from(5),
                Decimal::from(3),
                due(1, 0),
                "CNC-01".to_string(),
            )
            .with_priority(Priority::Urgent)],
        },
        Scenario::MaintenanceDowntime {
            work_center_id: "CNC-01".to_string(),
            added_hours: Decimal::from(2),
        },
    ];

    // 平行模擬（每次模擬各自持有產能帳本）
    let reports = Simulator::default().simulate_many(&scenarios, &orders, &work_centers, "edd", now)?;

    for report in &reports {
        println!("📋 情境: {}", report.scenario);
        println!(
            "   準時率: {} → {}（Δ {}）",
            report.baseline_metrics.on_time_rate,
            report.simulated_metrics.on_time_rate,
            report.delta.on_time_rate
        );
        println!(
            "   平均延遲: {} → {} 天",
            report.baseline_metrics.avg_lateness_days, report.simulated_metrics.avg_lateness_days
        );
        for recommendation in &report.recommendations {
            println!("   💡 [{:?}] {}", recommendation.level, recommendation.message);
        }
        println!();
    }

    Ok(())
}
