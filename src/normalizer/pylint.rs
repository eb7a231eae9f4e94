// pylint 文本输出适配器
//
// 诊断行格式形如：
//   temp.py:5:0: C0114: Missing module docstring (missing-module-docstring)
// 代码首字母决定类别：C(convention) → standards，R(refactor) → structure，
// E/W/F 以及其余未匹配的 → bugs。

use super::DiagnosticAdapter;
use crate::types::{Category, Issue};
use regex::Regex;

pub struct PylintAdapter;

impl DiagnosticAdapter for PylintAdapter {
    fn producer(&self) -> &'static str {
        "pylint"
    }

    fn normalize(&self, raw: &str) -> Vec<Issue> {
        let (mut issues, skipped) = parse_pylint_output(raw);
        // 解析不了的行不许静默丢弃，按 bugs 问题原样上报
        for line in skipped {
            log::debug!("pylint 输出行未能解析: {line}");
            issues.push(Issue::new(
                Category::Bugs,
                format!("Unparseable pylint output: {line}"),
            ));
        }
        issues
    }
}

/// 按代码前缀解析类别
fn category_for_code(code: &str) -> Category {
    match code.chars().next() {
        Some('C') => Category::Standards,
        Some('R') => Category::Structure,
        // E/W/F 及其他一律归入 bugs
        _ => Category::Bugs,
    }
}

/// 全函数的解析器：返回解析出的问题和无法解释的行
pub fn parse_pylint_output(raw: &str) -> (Vec<Issue>, Vec<String>) {
    // path:line:col: CODE: message
    let diag = Regex::new(r"^(?P<path>[^:]+):(?P<line>\d+):(?P<col>-?\d+):\s*(?P<code>[A-Z]\d{4}):\s*(?P<msg>.+)$").unwrap();

    let mut issues = Vec::new();
    let mut skipped = Vec::new();

    for line in raw.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty()
            || trimmed.starts_with("***")
            || trimmed.starts_with('-')
            || trimmed.starts_with("Your code has been rated")
        {
            // 模块分隔头与结尾评分行不是诊断
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
