// 评审引擎模块
// 编排单文件分析（输入校验 → 进程型诊断工具 → 结构度量 →
// 安全扫描 → 行内锚定）和整个变更集的聚合评分。
//
// 引擎是纯同步、无状态的计算：一次评审的问题集进、一份报告出，
// 评审之间没有共享可变状态，可以并行跑任意多个评审。
// 引擎内部不存在致命错误：所有失败模式都降级为 bugs 类问题，
// 残缺的报告总好过没有报告。

use crate::config::AppConfig;
use crate::diff::parse_patch_line_map;
use crate::normalizer::{
    normalize_outcome, DiagnosticAdapter, Flake8Adapter, PylintAdapter,
};
use crate::producers;
use crate::recommend::RecommendationPrioritizer;
use crate::report::compose_report;
use crate::scoring::ScoringEngine;
use crate::security::SecurityScanner;
use crate::structural::StructuralCollector;
use crate::types::{
    empty_issue_map, merge_issues, total_issue_count, Category, ChangedFile, FileAnalysisResult,
    InlineComment, Issue, IssueMap, ReviewOutcome, ReviewSummary,
};
use std::time::Duration;

/// 评审聚合与评分引擎
pub struct ReviewEngine {
    pylint_command: String,
    flake8_command: String,
    producer_timeout: Duration,
    structural: StructuralCollector,
    security: SecurityScanner,
    scoring: ScoringEngine,
    prioritizer: RecommendationPrioritizer,
}

impl ReviewEngine {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            pylint_command: config.analysis.pylint_command.clone(),
            flake8_command: config.analysis.flake8_command.clone(),
            producer_timeout: Duration::from_secs(config.analysis.producer_timeout_secs),
            structural: StructuralCollector::new(&config.analysis),
            security: SecurityScanner::new(),
            scoring: ScoringEngine::new(config.scoring.clone()),
            prioritizer: RecommendationPrioritizer::new(),
        }
    }

    /// 分析单个变更文件
    ///
    /// 任何失败都收敛为问题数据，此函数不返回错误。
    pub fn analyze_file(&self, file: &ChangedFile) -> FileAnalysisResult {
        log::info!("分析文件: {}", file.filename);
        let mut issues = empty_issue_map();

        if let Some(reason) = unanalyzable_reason(file) {
            log::debug!("{} 跳过分析: {reason}", file.filename);
            push(&mut issues, Issue::new(Category::Bugs, reason));
            return FileAnalysisResult {
                filename: file.filename.clone(),
                issues,
                inline_comments: Vec::new(),
            };
        }

        self.run_producers(&file.content, &mut issues);

        for issue in self.structural.collect(&file.content) {
            push(&mut issues, issue);
        }
        for issue in self.security.scan(&file.content) {
            push(&mut issues, issue);
        }

        let inline_comments = self.build_inline_comments(&issues, &file.patch);
        log::debug!(
            "{}: {} 个问题, {} 条行内评论",
            file.filename,
            total_issue_count(&issues),
            inline_comments.len()
        );

        FileAnalysisResult {
            filename: file.filename.clone(),
            issues,
            inline_comments,
        }
    }

    /// 评审整个变更集，产出摘要、各文件结果与渲染好的报告
    pub fn review(&self, files: &[ChangedFile]) -> ReviewOutcome {
        let results: Vec<FileAnalysisResult> =
            files.iter().map(|file| self.analyze_file(file)).collect();

        let mut aggregate = empty_issue_map();
        let mut total_risk_score = 0.0;
        for result in &results {
            total_risk_score += self.scoring.risk_score(&result.issues);
            merge_issues(&mut aggregate, result.issues.clone());
        }

        let summary = ReviewSummary {
            total_issues: total_issue_count(&aggregate),
            quality_score: self.scoring.quality_score(&aggregate),
            risk_level: self.scoring.overall_risk_level(total_risk_score, results.len()),
            category_counts: aggregate.iter().map(|(c, v)| (*c, v.len())).collect(),
            recommendations: self.prioritizer.recommendations(&aggregate),
            resources: self.prioritizer.learning_resources(&aggregate),
        };

        let report = compose_report(&results, &summary);
        ReviewOutcome {
            summary,
            files: results,
            report,
        }
    }

    /// 单文件的原始风险分与质量分（报告细化与测试用）
    pub fn file_scores(&self, result: &FileAnalysisResult) -> (f64, f64) {
        (
            self.scoring.risk_score(&result.issues),
            self.scoring.quality_score(&result.issues),
        )
    }

    /// 把文件内容写入临时文件并依次运行进程型诊断工具
    ///
    /// 临时文件句柄在本函数作用域内持有，任何路径退出都会删除文件。
    fn run_producers(&self, content: &str, issues: &mut IssueMap) {
        let temp = match producers::write_temp_source(content) {
            Ok(temp) => temp,
            Err(e) => {
                push(
                    issues,
                    Issue::new(
                        Category::Bugs,
                        format!("Failed to stage file content for producers: {e}"),
                    ),
                );
                return;
            }
        };

        let runs: [(&dyn DiagnosticAdapter, &str); 2] = [
            (&PylintAdapter, self.pylint_command.as_str()),
            (&Flake8Adapter, self.flake8_command.as_str()),
        ];

        for (adapter, command) in runs {
            let outcome = producers::run_producer(command, temp.path(), self.producer_timeout);
            for issue in normalize_outcome(adapter, &outcome) {
                push(issues, issue);
            }
        }
    }

    /// 把带行号的问题锚定到 diff 可见的行
    ///
    /// 补丁为空或无法解析时映射为空，所有问题退化为无行内锚点，
    /// 这不是错误：问题仍然计入评分。
    fn build_inline_comments(&self, issues: &IssueMap, patch: &str) -> Vec<InlineComment> {
        let line_map = parse_patch_line_map(patch);
        if line_map.is_empty() {
            return Vec::new();
        }

        issues
            .values()
            .flatten()
            .filter_map(|issue| {
                let line = issue.source_line?;
                let snippet = line_map.get(&line)?;
                let original_issue = match issue.code.as_deref() {
                    Some(code) => format!("{code}: {}", issue.message),
                    None => issue.message.clone(),
                };
                Some(InlineComment {
                    line,
                    category: issue.category,
                    original_issue,
                    code_snippet: snippet.trim().to_string(),
                    suggestion: self.prioritizer.inline_suggestion(issue),
                })
            })
            .collect()
    }
}

fn push(issues: &mut IssueMap, issue: Issue) {
    issues.entry(issue.category).or_default().push(issue);
}

/// 内容无法分析时返回原因：空文件、二进制、非 Python 源码
fn unanalyzable_reason(file: &ChangedFile) -> Option<String> {
    if file.content.is_empty() {
        return Some("File is empty, not analyzable".to_string());
    }
    if file.content.contains('\u{0}') {
        return Some("Binary or encoding-invalid content, not analyzable".to_string());
    }
    if !file.filename.ends_with(".py") {
        return Some(format!(
            "Non-Python file '{}', not analyzable by configured producers",
            file.filename
        ));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> ReviewEngine {
        // 测试环境没有 pylint/flake8，指向不存在的命令，
        // 让进程型诊断按失败路径降级
        let mut config = AppConfig::default();
        config.analysis.pylint_command = "prreview-test-missing-pylint".to_string();
        config.analysis.flake8_command = "prreview-test-missing-flake8".to_string();
        engine_with(config)
    }

    fn engine_with(config: AppConfig) -> ReviewEngine {
        ReviewEngine::new(&config)
    }

    fn changed_file(filename: &str, content: &str, patch: &str) -> ChangedFile {
        ChangedFile {
            filename: filename.to_string(),
            content: content.to_string(),
            patch: patch.to_string(),
            additions: 1,
            deletions: 0,
        }
    }

    #[test]
    fn test_empty_file_short_circuits_to_single_bugs_issue() {
        let result = engine().analyze_file(&changed_file("empty.py", "", ""));
        assert_eq!(result.issue_count(), 1);
        assert_eq!(result.issues[&Category::Bugs].len(), 1);
        assert!(result.issues[&Category::Bugs][0]
            .message
            .contains("not analyzable"));
    }

    #[test]
    fn test_binary_content_short_circuits() {
        let result = engine().analyze_file(&changed_file("blob.py", "abc\u{0}def", ""));
        assert_eq!(result.issue_count(), 1);
        assert!(result.issues[&Category::Bugs][0].message.contains("Binary"));
    }

    #[test]
    fn test_missing_producers_degrade_to_issues_not_errors() {
        let result = engine().analyze_file(&changed_file("ok.py", "x = 1\n", ""));
        // 两个诊断工具各贡献一条失败问题，其余检查正常跑完
        let producer_failures = result.issues[&Category::Bugs]
            .iter()
            .filter(|i| i.message.contains("failed"))
            .count();
        assert_eq!(producer_failures, 2);
    }

    #[test]
    fn test_security_issue_from_content() {
        let result = engine().analyze_file(&changed_file("risky.py", "eval(user)\n", ""));
        assert_eq!(result.issues[&Category::Security].len(), 1);
    }

    #[test]
    fn test_inline_comment_anchored_via_patch() {
        // 超阈值嵌套从第 1 行开始，会带 source_line；
        // 补丁声明第 1 行可见
        let mut content = String::new();
        for depth in 0..5 {
            content.push_str(&format!("{}if x > {depth}:\n", "    ".repeat(depth)));
        }
        content.push_str(&format!("{}y = 1\n", "    ".repeat(5)));
        let patch = "@@ -0,0 +1,6 @@\n+if x > 0:";

        let result = engine().analyze_file(&changed_file("deep.py", &content, patch));
        let structure_comments: Vec<_> = result
            .inline_comments
            .iter()
            .filter(|c| c.category == Category::Structure)
            .collect();
        assert_eq!(structure_comments.len(), 1);
        assert_eq!(structure_comments[0].line, 1);
        assert_eq!(structure_comments[0].code_snippet, "if x > 0:");
    }

    #[test]
    fn test_unanchorable_issue_still_counts_toward_scoring() {
        let result = engine().analyze_file(&changed_file("risky.py", "eval(user)\n", ""));
        assert!(result.inline_comments.is_empty());
        let (risk, quality) = engine().file_scores(&result);
        assert!(risk > 0.0);
        assert!(quality < 100.0);
    }

    #[test]
    fn test_review_aggregates_across_files() {
        let outcome = engine().review(&[
            changed_file("a.py", "eval(x)\n", ""),
            changed_file("b.py", "eval(y)\n", ""),
        ]);
        assert_eq!(outcome.files.len(), 2);
        assert!(outcome.summary.total_issues >= 2);
        assert!(outcome.summary.quality_score < 100.0);
        assert!(outcome.report.contains("PR Review Report"));
    }
}
