// 安全模式扫描模块
// 对原始文件文本做固定正则表的启发式匹配，标记危险调用。
// 这不是语义级安全分析，误报/漏报是预期内的。

use crate::types::{Category, Issue};
use regex::{Regex, RegexBuilder};

/// 一条安全扫描规则：匹配模式 + 固定的风险说明
#[derive(Debug, Clone)]
pub struct SecurityRule {
    pub pattern: String,
    pub message: String,
}

/// 默认规则表（按风险说明的固定顺序评估）
pub fn default_security_rules() -> Vec<SecurityRule> {
    let table: [(&str, &str); 6] = [
        (
            r"eval\s*\(",
            "Use of eval() enables dynamic code execution and is a security risk",
        ),
        (
            r"__import__\s*\(",
            "Dynamic import via __import__() can load untrusted modules",
        ),
        (
            r"pickle\.loads?\s*\(",
            "Unpickling untrusted data can execute arbitrary code",
        ),
        (
            r"(os\.system|subprocess\.(call|run|popen|check_output))\s*\(",
            "External command execution without validation is a security risk",
        ),
        (
            r"shell\s*=\s*true",
            "shell=True in subprocess calls is prone to shell injection",
        ),
        (
            r"input\s*\(",
            "Unvalidated user input should be sanitized before use",
        ),
    ];

    table
        .iter()
        .map(|(pattern, message)| SecurityRule {
            pattern: (*pattern).to_string(),
            message: (*message).to_string(),
        })
        .collect()
}

/// 安全扫描器
///
/// 规则表在构造时注入，编译为大小写不敏感的正则。
pub struct SecurityScanner {
    rules: Vec<(Regex, String)>,
}

impl Default for SecurityScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl SecurityScanner {
    pub fn new() -> Self {
        // 默认表是静态可编译的
        Self::with_rules(&default_security_rules()).unwrap()
    }

    /// 用自定义规则表构造；非法正则返回错误
    pub fn with_rules(rules: &[SecurityRule]) -> Result<Self, regex::Error> {
        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules {
            let re = RegexBuilder::new(&rule.pattern)
                .case_insensitive(true)
                .build()?;
            compiled.push((re, rule.message.clone()));
        }
        Ok(Self { rules: compiled })
    }

    /// 扫描文件文本
    ///
    /// 每条命中的规则恰好产生一个 security 问题，只报告"存在"，
    /// 不统计出现次数。
    pub fn scan(&self, content: &str) -> Vec<Issue> {
        self.rules
            .iter()
            .filter(|(re, _)| re.is_match(content))
            .map(|(_, message)| Issue::new(Category::Security, message.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eval_reported_once_regardless_of_occurrences() {
        let scanner = SecurityScanner::new();
        let issues = scanner.scan("eval(x)\neval(y)\neval(z)\n");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].category, Category::Security);
        assert!(issues[0].message.contains("eval()"));
    }

    #[test]
    fn test_clean_content_has_no_findings() {
        let scanner = SecurityScanner::new();
        assert!(scanner.scan("def add(a, b):\n    return a + b\n").is_empty());
    }

    #[test]
    fn test_case_insensitive_match() {
        let scanner = SecurityScanner::new();
        let issues = scanner.scan("subprocess.run(cmd, SHELL=True)");
        // 命中外部命令执行与 shell 注入两条规则
        assert_eq!(issues.len(), 2);
    }

    #[test]
    fn test_invalid_custom_rule_is_rejected() {
        let rules = vec![SecurityRule {
            pattern: "(unclosed".to_string(),
            message: "bad".to_string(),
        }];
        assert!(SecurityScanner::with_rules(&rules).is_err());
    }
}
