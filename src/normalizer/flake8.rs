// flake8 输出适配器
//
// 诊断行格式形如：
//   temp.py:3:1: E302 expected 2 blank lines, got 1
// flake8 的代码语义与 pylint 不同：E(pycodestyle error) 和 F(pyflakes)
// 归入 bugs，W 归入 standards，C9(mccabe) 归入 complexity。

use super::DiagnosticAdapter;
use crate::types::{Category, Issue};
use regex::Regex;

pub struct Flake8Adapter;

impl DiagnosticAdapter for Flake8Adapter {
    fn producer(&self) -> &'static str {
        "flake8"
    }

    fn normalize(&self, raw: &str) -> Vec<Issue> {
        let (mut issues, skipped) = parse_flake8_output(raw);
        // 解析不了的行不许静默丢弃，按 bugs 问题原样上报
        for line in skipped {
            log::debug!("flake8 输出行未能解析: {line}");
            issues.push(Issue::new(
                Category::Bugs,
                format!("Unparseable flake8 output: {line}"),
            ));
        }
        issues
    }
}

fn category_for_code(code: &str) -> Category {
    if code.starts_with("C9") {
        return Category::Complexity;
    }
    match code.chars().next() {
        Some('W') => Category::Standards,
        // E/F 及其他一律归入 bugs
        _ => Category::Bugs,
    }
}

/// 全函数的解析器：返回解析出的问题和无法解释的行
pub fn parse_flake8_output(raw: &str) -> (Vec<Issue>, Vec<String>) {
    // path:line:col: CODE message
    let diag =
        Regex::new(r"^(?P<path>[^:]+):(?P<line>\d+):(?P<col>\d+):\s*(?P<code>[A-Z]+\d+)\s+(?P<msg>.+)$")
            .unwrap();

    let mut issues = Vec::new();
    let mut skipped = Vec::new();

    for line in raw.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match diag.captures(trimmed) {
            Some(caps) => {
                let code = caps["code"].to_string();
                let mut issue = Issue::new(category_for_code(&code), caps["msg"].to_string())
                    .with_code(code);
                if let Ok(num) = caps["line"].parse::<u32>() {
                    issue = issue.with_line(num);
                }
                issues.push(issue);
            }
            None => skipped.push(trimmed.to_string()),
        }
    }

    (issues, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
temp.py:3:1: E302 expected 2 blank lines, got 1
temp.py:5:10: W291 trailing whitespace
temp.py:8:5: F841 local variable 'unused' is assigned to but never used
temp.py:12:1: C901 'handler' is too complex (12)
";

    #[test]
    fn test_codes_map_to_categories() {
        let adapter = Flake8Adapter;
        let issues = adapter.normalize(SAMPLE);
        assert_eq!(issues.len(), 4);
        assert_eq!(issues[0].category, Category::Bugs);
        assert_eq!(issues[1].category, Category::Standards);
        assert_eq!(issues[2].category, Category::Bugs);
        assert_eq!(issues[3].category, Category::Complexity);
    }

    #[test]
    fn test_code_and_line_extracted() {
        let adapter = Flake8Adapter;
        let issues = adapter.normalize(SAMPLE);
        assert_eq!(issues[0].code.as_deref(), Some("E302"));
        assert_eq!(issues[0].source_line, Some(3));
        assert_eq!(issues[0].message, "expected 2 blank lines, got 1");
    }

    #[test]
    fn test_empty_output_is_not_an_error() {
        let adapter = Flake8Adapter;
        assert!(adapter.normalize("").is_empty());
    }

    #[test]
    fn test_unparseable_line_surfaces_as_bugs_issue() {
        let adapter = Flake8Adapter;
        let issues = adapter.normalize("warning: something flake8 never emits\n");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].category, Category::Bugs);
        assert!(issues[0].message.contains("Unparseable flake8 output"));
    }
}
