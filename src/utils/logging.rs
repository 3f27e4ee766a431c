/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use tracing::info;

use crate::config::AnnotationConfig;
use crate::models::TableSummary;

/// 记录程序启动信息
pub fn log_startup(config: &AnnotationConfig, model_name: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 批量身份标注模式");
    info!("🤖 模型: {} ({})", config.model_identifier(), model_name);
    info!("📝 提示词策略: {}", config.strategy_identifier());
    info!("📊 每组最大并发数: {}", config.worker_count);
    info!("{}", "=".repeat(60));
}

/// 记录分组加载信息
pub fn log_groups_loaded(groups: usize, records: usize) {
    info!("✓ 找到 {} 个分组，共 {} 条记录", groups, records);
    info!("💡 分组依次处理，组内并发\n");
}

/// 记录分组开始信息
pub fn log_group_start(group_num: usize, total_groups: usize, name: &str, records: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始处理第 {}/{} 组: {}", group_num, total_groups, name);
    info!("📄 本组记录: {} 条", records);
    info!("{}", "=".repeat(60));
}

/// 记录分组完成信息
pub fn log_group_complete(name: &str, summary: &TableSummary) {
    info!("\n{}", "─".repeat(60));
    info!(
        "✓ 分组 {} 完成: 评分 {} / 未评分 {} / 失败 {} (共 {})",
        name, summary.rated, summary.unrated, summary.failed, summary.total
    );
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
pub fn print_final_stats(summary: &TableSummary, output_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 已评分: {}/{}", summary.rated, summary.total);
    info!("➖ 未评分: {}", summary.unrated);
    info!("❌ 失败: {}", summary.failed);
    info!("{}", "=".repeat(60));
    info!("\n结果已保存至: {}", output_path);
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
