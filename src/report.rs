// 报告组装模块
// 纯格式化层：把各文件分析结果与聚合摘要拼成最终的评审报告文本。

use crate::types::{FileAnalysisResult, ReviewSummary};

/// 组装完整评审报告
pub fn compose_report(files: &[FileAnalysisResult], summary: &ReviewSummary) -> String {
    let mut report = String::new();

    report.push_str("🤖 PR Review Report\n");
    report.push_str(&"=".repeat(80));
    report.push('\n');

    for file in files {
        report.push_str(&format!("\n📄 File: {}\n", file.filename));

        if file.is_clean() {
            report.push_str("  ✅ No issues detected\n");
            continue;
        }

        for (category, issues) in &file.issues {
            for issue in issues {
                let code = issue
                    .code
                    .as_deref()
                    .map(|c| format!("{c}: "))
                    .unwrap_or_default();
                let line = issue
                    .source_line
                    .map(|l| format!(" (line {l})"))
                    .unwrap_or_default();
                report.push_str(&format!(
                    "  • [{}] {code}{}{line}\n",
                    category.label(),
                    issue.message
                ));
            }
        }

        if !file.inline_comments.is_empty() {
            report.push_str("  💬 Inline comments:\n");
            for comment in &file.inline_comments {
                report.push_str(&format!(
                    "    line {} [{}] {}\n",
                    comment.line,
                    comment.category.as_str(),
                    comment.original_issue
                ));
                report.push_str(&format!("      > {}\n", comment.code_snippet));
                report.push_str(&format!("      💡 {}\n", comment.suggestion));
            }
        }
    }

    report.push_str("\n📊 Summary\n");
    report.push_str(&format!("  Total issues: {}\n", summary.total_issues));
    report.push_str(&format!(
        "  Quality score: {:.1}/100\n",
        summary.quality_score
    ));
    report.push_str(&format!(
        "  Risk level: {} {}\n",
        summary.risk_level.to_emoji(),
        summary.risk_level.as_str()
    ));
    report.push_str("  Issues by category:\n");
    for (category, count) in &summary.category_counts {
        report.push_str(&format!("    {}: {count}\n", category.as_str()));
    }

    report.push_str("\n💡 Recommendations:\n");
    if summary.recommendations.is_empty() {
        report.push_str("  - No additional recommendations.\n");
    } else {
        for rec in &summary.recommendations {
            report.push_str(&format!("  [{}] {}\n", rec.priority.as_str(), rec.text));
        }
    }

    report.push_str("\n📚 Learning resources:\n");
    for resource in &summary.resources {
        report.push_str(&format!("  • {resource}\n"));
    }

    report.push_str(&"=".repeat(80));
    report.push('\n');
    report
}
