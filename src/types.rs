// 评审相关的数据结构定义
// 所有公共数据形状都可序列化，便于 CLI/Webhook 层直接输出 JSON

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 问题类别（封闭集合）
///
/// 诊断工具输出无法识别的类别时一律归入 `Bugs`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// 编码规范
    Standards,
    /// 结构问题
    Structure,
    /// 缺陷/错误
    Bugs,
    /// 复杂度
    Complexity,
    /// 安全风险
    Security,
    /// 性能问题
    Performance,
}

impl Category {
    /// 全部类别（确定性顺序，用于遍历和报告输出）
    pub const ALL: [Category; 6] = [
        Category::Standards,
        Category::Structure,
        Category::Bugs,
        Category::Complexity,
        Category::Security,
        Category::Performance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Standards => "standards",
            Category::Structure => "structure",
            Category::Bugs => "bugs",
            Category::Complexity => "complexity",
            Category::Security => "security",
            Category::Performance => "performance",
        }
    }

    /// 报告中显示的标题
    pub fn label(&self) -> &'static str {
        match self {
            Category::Standards => "Standards",
            Category::Structure => "Structure",
            Category::Bugs => "Bugs",
            Category::Complexity => "Complexity",
            Category::Security => "Security",
            Category::Performance => "Performance",
        }
    }
}

/// 一条诊断发现
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    /// 类别
    pub category: Category,
    /// 诊断工具给出的短标识（结构/安全检查自行合成描述，可为空）
    pub code: Option<String>,
    /// 人类可读描述，尽量保留工具原文
    pub message: String,
    /// 完整文件内容中的行号（1 起始，工具未报告时为空）
    pub source_line: Option<u32>,
}

impl Issue {
    pub fn new(category: Category, message: impl Into<String>) -> Self {
        Self {
            category,
            code: None,
            message: message.into(),
            source_line: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_line(mut self, line: u32) -> Self {
        self.source_line = Some(line);
        self
    }
}

/// 类别 → 问题列表的映射
///
/// 约定：六个类别始终全部存在（允许空列表），BTreeMap 保证遍历顺序稳定。
pub type IssueMap = BTreeMap<Category, Vec<Issue>>;

/// 构造包含全部六个类别的空映射
pub fn empty_issue_map() -> IssueMap {
    Category::ALL.iter().map(|c| (*c, Vec::new())).collect()
}

/// 将 `src` 中的问题并入 `dst`，保持各自的相对顺序
pub fn merge_issues(dst: &mut IssueMap, src: IssueMap) {
    for (category, mut items) in src {
        dst.entry(category).or_default().append(&mut items);
    }
}

/// 映射中的问题总数
pub fn total_issue_count(issues: &IssueMap) -> usize {
    issues.values().map(|v| v.len()).sum()
}

/// 托管平台提供的单个变更文件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangedFile {
    pub filename: String,
    /// 变更后的完整文件内容
    pub content: String,
    /// unified diff 补丁文本（可能为空，如纯重命名）
    #[serde(default)]
    pub patch: String,
    pub additions: u32,
    pub deletions: u32,
}

/// 锚定到 diff 可见行的行内评论
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InlineComment {
    /// 变更后文件中的行号
    pub line: u32,
    pub category: Category,
    /// 原始问题文本
    pub original_issue: String,
    /// 该行的代码文本
    pub code_snippet: String,
    /// 模板化的修改建议
    pub suggestion: String,
}

/// 单文件分析结果
///
/// 每次评审中每个文件创建一次，创建后不再修改，也不跨文件合并。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileAnalysisResult {
    pub filename: String,
    pub issues: IssueMap,
    pub inline_comments: Vec<InlineComment>,
}

impl FileAnalysisResult {
    pub fn issue_count(&self) -> usize {
        total_issue_count(&self.issues)
    }

    pub fn is_clean(&self) -> bool {
        self.issue_count() == 0
    }
}

/// 风险等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
    Minimal,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::High => "HIGH",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::Low => "LOW",
            RiskLevel::Minimal => "MINIMAL",
        }
    }

    /// 终端输出用的 emoji 标记
    pub fn to_emoji(&self) -> &'static str {
        match self {
            RiskLevel::High => "🔴",
            RiskLevel::Medium => "🟡",
            RiskLevel::Low => "🔵",
            RiskLevel::Minimal => "🟢",
        }
    }
}

/// 建议优先级
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "HIGH",
            Priority::Medium => "MEDIUM",
            Priority::Low => "LOW",
        }
    }
}

/// 一条带优先级的改进建议
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub priority: Priority,
    pub text: String,
}

/// 整个评审的聚合摘要
///
/// 每次评审重新计算，不持久化、不跨评审共享。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewSummary {
    pub total_issues: usize,
    /// 质量分（5..=100）
    pub quality_score: f64,
    pub risk_level: RiskLevel,
    pub category_counts: BTreeMap<Category, usize>,
    pub recommendations: Vec<Recommendation>,
    pub resources: Vec<String>,
}

/// 一次评审的完整产出
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewOutcome {
    pub summary: ReviewSummary,
    pub files: Vec<FileAnalysisResult>,
    /// 渲染好的评审报告文本
    pub report: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_issue_map_has_all_categories() {
        let map = empty_issue_map();
        assert_eq!(map.len(), 6);
        for category in Category::ALL {
            assert!(map.get(&category).map(|v| v.is_empty()).unwrap_or(false));
        }
    }

    #[test]
    fn test_merge_preserves_relative_order() {
        let mut dst = empty_issue_map();
        dst.get_mut(&Category::Bugs)
            .unwrap()
            .push(Issue::new(Category::Bugs, "first"));

        let mut src = empty_issue_map();
        src.get_mut(&Category::Bugs)
            .unwrap()
            .push(Issue::new(Category::Bugs, "second"));
        merge_issues(&mut dst, src);

        let bugs = &dst[&Category::Bugs];
        assert_eq!(bugs.len(), 2);
        assert_eq!(bugs[0].message, "first");
        assert_eq!(bugs[1].message, "second");
    }

    #[test]
    fn test_category_serde_snake_case() {
        let json = serde_json::to_string(&Category::Security).unwrap();
        assert_eq!(json, "\"security\"");
    }
}
