// 建议生成模块
// 对整个评审的聚合问题集评估一张固定有序的规则表，产出去重、
// 分优先级的改进建议和按类别命中的学习资料链接；
// 另有独立的 代码 → 模板 查找表用于行内评论的建议文案。

use crate::types::{Category, Issue, IssueMap, Priority, Recommendation};

/// 行内建议中原始问题文本的预览长度上限
const MAX_PREVIEW_LEN: usize = 80;

/// 聚合建议规则：问题代码或消息关键词命中即触发
struct IssueRule {
    code: &'static str,
    keyword: &'static str,
    suggestion: &'static str,
}

/// 类别级规则：该类别非空即触发
struct CategoryRule {
    category: Category,
    suggestion: &'static str,
}

const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        category: Category::Security,
        suggestion: "Fix security issues immediately: dangerous constructs were flagged by the security scan.",
    },
    CategoryRule {
        category: Category::Complexity,
        suggestion: "Refactor functions with high cyclomatic complexity into smaller units.",
    },
    CategoryRule {
        category: Category::Performance,
        suggestion: "Profile the changed code paths and address the reported performance findings.",
    },
];

const ISSUE_RULES: &[IssueRule] = &[
    IssueRule { code: "C0114", keyword: "missing module docstring", suggestion: "Add docstrings to functions and modules for better readability." },
    IssueRule { code: "C0116", keyword: "missing function docstring", suggestion: "Add docstrings to functions and modules for better readability." },
    IssueRule { code: "C0115", keyword: "missing class docstring", suggestion: "Add docstrings to classes for better documentation." },
    IssueRule { code: "W0612", keyword: "unused variable", suggestion: "Remove unused variables to improve clarity." },
    IssueRule { code: "F841", keyword: "never used", suggestion: "Remove unused variables to improve clarity." },
    IssueRule { code: "W0101", keyword: "unreachable code", suggestion: "Remove unreachable code to improve clarity." },
    IssueRule { code: "C3001", keyword: "unnecessary-lambda-assignment", suggestion: "Replace lambda assignments with proper function definitions." },
    IssueRule { code: "E731", keyword: "lambda expression", suggestion: "Use 'def' for function definitions instead of lambda assignments." },
    IssueRule { code: "W0125", keyword: "conditional statement with a constant value", suggestion: "Avoid using constant values in conditional statements." },
    IssueRule { code: "R0903", keyword: "too few public methods", suggestion: "Consider adding more public methods to classes for better functionality." },
    IssueRule { code: "E231", keyword: "missing whitespace", suggestion: "Add proper spacing after commas to comply with PEP 8." },
    IssueRule { code: "E261", keyword: "before inline comment", suggestion: "Ensure at least two spaces before inline comments per PEP 8." },
    IssueRule { code: "E302", keyword: "expected 2 blank lines", suggestion: "Add two blank lines before function or class definitions for better readability." },
    IssueRule { code: "E305", keyword: "expected 2 blank lines after", suggestion: "Add two blank lines after function or class definitions for better readability." },
];

/// 行内评论用的 代码 → 建议模板 表
const INLINE_TEMPLATES: &[(&str, &str)] = &[
    ("E231", "Add a space after the comma"),
    ("E261", "Add at least two spaces before the inline comment"),
    ("E302", "Add 2 blank lines before this function/class definition"),
    ("E305", "Add 2 blank lines after this function/class definition"),
    ("E731", "Replace this lambda assignment with a def function"),
    ("F841", "Remove this unused variable"),
    ("C0114", "Add a module docstring at the top of the file"),
    ("C0116", "Add a docstring describing this function"),
    ("C0115", "Add a class docstring"),
    ("C3001", "Replace this lambda with a proper function definition"),
    ("W0612", "Remove or use this variable"),
    ("W0101", "This code is unreachable - remove it"),
    ("W0125", "Avoid constant conditionals - use a variable or real logic"),
    ("R0903", "Consider adding more public methods to this class"),
];

/// 按建议文本自身的关键词分优先级
fn priority_for(text: &str) -> Priority {
    let lower = text.to_lowercase();
    if lower.contains("security") || lower.contains("critical") || lower.contains("error") {
        Priority::High
    } else if lower.contains("unused") || lower.contains("unreachable") || lower.contains("complexity")
    {
        Priority::Medium
    } else {
        Priority::Low
    }
}

/// 建议优先级排序器
///
/// 规则表在构造时固定；同一触发问题出现多少次都只贡献一条建议，
/// 相同文本的建议做集合语义去重。
pub struct RecommendationPrioritizer;

impl Default for RecommendationPrioritizer {
    fn default() -> Self {
        Self::new()
    }
}

impl RecommendationPrioritizer {
    pub fn new() -> Self {
        Self
    }

    /// 对聚合问题集生成去重、按优先级排序的建议列表
    pub fn recommendations(&self, aggregate: &IssueMap) -> Vec<Recommendation> {
        let mut texts: Vec<&'static str> = Vec::new();

        for rule in CATEGORY_RULES {
            let triggered = aggregate
                .get(&rule.category)
                .map(|v| !v.is_empty())
                .unwrap_or(false);
            if triggered && !texts.contains(&rule.suggestion) {
                texts.push(rule.suggestion);
            }
        }

        for rule in ISSUE_RULES {
            let triggered = aggregate.values().flatten().any(|issue| {
                issue.code.as_deref() == Some(rule.code)
                    || issue.message.to_lowercase().contains(rule.keyword)
            });
            if triggered && !texts.contains(&rule.suggestion) {
                texts.push(rule.suggestion);
            }
        }

        let mut recommendations: Vec<Recommendation> = texts
            .into_iter()
            .map(|text| Recommendation {
                priority: priority_for(text),
                text: text.to_string(),
            })
            .collect();
        // HIGH → MEDIUM → LOW，同档内保持规则表顺序
        recommendations.sort_by_key(|r| r.priority);
        recommendations
    }

    /// 按非空类别给出主题阅读清单
    pub fn learning_resources(&self, aggregate: &IssueMap) -> Vec<String> {
        let non_empty =
            |category: Category| aggregate.get(&category).map(|v| !v.is_empty()).unwrap_or(false);

        let mut resources = Vec::new();
        if non_empty(Category::Security) {
            resources.push(
                "OWASP secure coding practices: https://owasp.org/www-project-secure-coding-practices-quick-reference-guide/".to_string(),
            );
        }
        if non_empty(Category::Standards) {
            resources.push("PEP 8 style guide: https://peps.python.org/pep-0008/".to_string());
        }
        if non_empty(Category::Complexity) || non_empty(Category::Structure) {
            resources.push("Refactoring catalog: https://refactoring.com/catalog/".to_string());
        }
        if resources.is_empty() {
            resources.push(
                "Code review best practices: https://google.github.io/eng-practices/review/"
                    .to_string(),
            );
        }
        resources
    }

    /// 行内评论的建议文案：查代码模板表，未命中则退化为通用模板
    pub fn inline_suggestion(&self, issue: &Issue) -> String {
        if let Some(code) = issue.code.as_deref() {
            if let Some((_, template)) = INLINE_TEMPLATES.iter().find(|(c, _)| *c == code) {
                return (*template).to_string();
            }
        }

        let preview: String = issue.message.chars().take(MAX_PREVIEW_LEN).collect();
        format!(
            "Consider reviewing this {} issue: {preview}",
            issue.category.as_str()
        )
    }
}
