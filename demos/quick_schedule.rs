//! # 快速排產範例
//!
//! 這個範例展示完整的排產流程：
//! - 工作中心：CNC 加工中心（週一至週五，8h/天）
//! - 訂單：三筆不同交期的生產訂單
//! - 算法：EDD（最早交期優先）
//! - 輸出：排程快照、指標、甘特任務與瓶頸分析

use aps_calc::{analyze_capacity, gantt_tasks, Scheduler};
use aps_core::*;
use chrono::NaiveDate;
use rust_decimal::Decimal;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    println!("🏭 ===== 快速排產範例 =====");
    println!();

    // ========== 1. 建立工作中心 ==========
    println!("⚙️  步驟 1: 建立工作中心");
    let work_centers = vec![
        WorkCenter::new("CNC-01".to_string(), Decimal::from(8))
            .with_name("CNC 加工中心".to_string())
            .with_efficiency(Decimal::from(90)),
    ];
    println!(
        "   ✓ CNC-01: 8h/天 × 90% 效率 = 有效 {}h/天",
        work_centers[0].effective_daily_capacity()
    );
    println!();

    // ========== 2. 建立生產訂單 ==========
    println!("📋 步驟 2: 建立生產訂單");
    let now = NaiveDate::from_ymd_opt(2026, 8, 31)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();

    let due = |d: u32| {
        NaiveDate::from_ymd_opt(2026, 9, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    };

    let orders = vec![
        ProductionOrder::new(
            "GEAR-100".to_string(),
            Decimal::from(50),
            Decimal::from(4),
            due(1),
            "CNC-01".to_string(),
        ),
        ProductionOrder::new(
            "SHAFT-200".to_string(),
            Decimal::from(20),
            Decimal::from(4),
            due(3),
            "CNC-01".to_string(),
        )
        .with_priority(Priority::High),
        ProductionOrder::new(
            "PLATE-300".to_string(),
            Decimal::from(80),
            Decimal::from(4),
            due(2),
            "CNC-01".to_string(),
        )
        .with_setup_hours(Decimal::ONE),
    ];
    for order in &orders {
        println!(
            "   ✓ {} × {}: {}h, 交期 {}",
            order.product_id,
            order.quantity,
            order.total_hours(),
            order.due_date.date()
        );
    }
    println!();

    // ========== 3. 執行排產 ==========
    println!("🚀 步驟 3: 執行排產（EDD）");
    let scheduler = Scheduler::default();
    let run = scheduler.run(&orders, &work_centers, "edd", now)?;

    for assignment in &run.schedule.assignments {
        let order = orders
            .iter()
            .find(|o| o.id == assignment.order_id)
            .map(|o| o.product_id.as_str())
            .unwrap_or("?");
        println!(
            "   {} {} → {}（延遲 {} 天）",
            order, assignment.scheduled_start, assignment.scheduled_end, assignment.lateness_days
        );
    }
    println!();

    // ========== 4. 指標 ==========
    println!("📊 步驟 4: 排程指標");
    let metrics = &run.schedule.metrics;
    println!("   訂單總數: {}", metrics.total_orders);
    println!("   準時率: {}", metrics.on_time_rate);
    println!("   排程跨度: {} 天", metrics.schedule_span_days);
    println!();

    // ========== 5. 瓶頸分析 ==========
    println!("🔍 步驟 5: 瓶頸分析（5 天期間，門檻取自配置）");
    let analyses = analyze_capacity(&run.schedule.assignments, &work_centers, 5);
    let bottlenecks = scheduler.bottlenecks(&run.schedule.assignments, &work_centers, 5);
    if bottlenecks.is_empty() {
        println!("   ✓ 無瓶頸（最高利用率 {}%）", analyses[0].utilization_percent.round_dp(1));
    } else {
        for b in &bottlenecks {
            println!("   ⚠ {}: {}%", b.work_center_id, b.utilization_percent.round_dp(1));
        }
    }
    println!();

    // ========== 6. 甘特任務（JSON） ==========
    println!("📅 步驟 6: 甘特任務");
    let tasks = gantt_tasks(&run.schedule, &orders, now);
    println!(
        "{}",
        serde_json::to_string_pretty(&tasks).expect("序列化失敗")
    );

    Ok(())
}
