// 结构度量模块
// 基于 Tree-sitter 语法树直接推导复杂度与嵌套深度问题，
// 不调用任何外部进程。解析失败时 fail closed：产生一条 bugs
// 问题并跳过该文件的其余结构检查，错误不会越过组件边界。

use crate::config::AnalysisConfig;
use crate::types::{Category, Issue};
use tree_sitter::{Node, Parser};

/// 计入圈复杂度的分支节点
fn is_branch_kind(kind: &str) -> bool {
    matches!(
        kind,
        "if_statement"
            | "elif_clause"
            | "for_statement"
            | "while_statement"
            | "except_clause"
            | "conditional_expression"
    )
}

/// 计入嵌套深度的块级节点（条件/循环/资源域/异常）
fn is_nesting_kind(kind: &str) -> bool {
    matches!(
        kind,
        "if_statement" | "for_statement" | "while_statement" | "with_statement" | "try_statement"
    )
}

/// 结构度量收集器
pub struct StructuralCollector {
    complexity_threshold: u32,
    nesting_threshold: u32,
}

impl StructuralCollector {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            complexity_threshold: config.complexity_threshold,
            nesting_threshold: config.nesting_threshold,
        }
    }

    /// 分析文件内容，返回结构类问题
    pub fn collect(&self, content: &str) -> Vec<Issue> {
        let mut parser = Parser::new();
        if parser.set_language(tree_sitter_python::language()).is_err() {
            log::warn!("Python 语法加载失败，跳过结构分析");
            return vec![Issue::new(
                Category::Bugs,
                "Structural analysis unavailable: failed to load python grammar",
            )];
        }

        let tree = match parser.parse(content, None) {
            Some(tree) => tree,
            None => {
                return vec![Issue::new(
                    Category::Bugs,
                    "Structural analysis skipped: parser produced no syntax tree",
                )]
            }
        };

        let root = tree.root_node();
        if root.has_error() {
            let line = first_error_line(root);
            return vec![Issue::new(
                Category::Bugs,
                format!("Syntax error near line {line}, structural checks skipped"),
            )
            .with_line(line)];
        }

        let source = content.as_bytes();
        let mut issues = Vec::new();
        self.check_function_complexity(root, source, &mut issues);
        self.check_top_level_nesting(root, &mut issues);
        issues
    }

    /// 每个函数计算圈复杂度，超阈值时各产生一条 complexity 问题
    fn check_function_complexity(&self, node: Node, source: &[u8], issues: &mut Vec<Issue>) {
        if node.kind() == "function_definition" {
            let name = node
                .child_by_field_name("name")
                .and_then(|n| n.utf8_text(source).ok())
                .unwrap_or("<anonymous>")
                .to_string();
            let complexity = 1 + branch_count(node);
            if complexity > self.complexity_threshold {
                let line = node.start_position().row as u32 + 1;
                issues.push(
                    Issue::new(
                        Category::Complexity,
                        format!(
                            "Function '{name}' has cyclomatic complexity {complexity} (threshold: {})",
                            self.complexity_threshold
                        ),
                    )
                    .with_line(line),
                );
            }
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.check_function_complexity(child, source, issues);
        }
    }

    /// 每个顶层分支语句计算最大嵌套深度，超阈值时产生 structure 问题
    fn check_top_level_nesting(&self, root: Node, issues: &mut Vec<Issue>) {
        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            if !is_nesting_kind(child.kind()) {
                continue;
            }
            let depth = nesting_depth(child);
            if depth > self.nesting_threshold {
                let line = child.start_position().row as u32 + 1;
                issues.push(
                    Issue::new(
                        Category::Structure,
                        format!(
                            "Deeply nested block starting at line {line}: depth {depth} exceeds threshold {}",
                            self.nesting_threshold
                        ),
                    )
                    .with_line(line),
                );
            }
        }
    }
}

/// 统计子树中的分支点：条件/循环/异常处理各计 1，
/// 每个布尔运算符节点计 1（等价于"操作数 − 1"逐布尔表达式求和）。
/// 嵌套函数单独计分，不混入外层函数。
fn branch_count(node: Node) -> u32 {
    let mut count = 0;
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "function_definition" {
            continue;
        }
        if is_branch_kind(child.kind()) || child.kind() == "boolean_operator" {
            count += 1;
        }
        count += branch_count(child);
    }
    count
}

/// 递归计算块级节点的最大嵌套深度
fn nesting_depth(node: Node) -> u32 {
    let own = u32::from(is_nesting_kind(node.kind()));
    let mut max_child = 0;
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "function_definition" {
            continue;
        }
        max_child = max_child.max(nesting_depth(child));
    }
    own + max_child
}

/// 找到第一个错误节点所在行（1 起始）
fn first_error_line(node: Node) -> u32 {
    if node.is_error() || node.is_missing() {
        return node.start_position().row as u32 + 1;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() {
            return first_error_line(child);
        }
    }
    node.start_position().row as u32 + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collector() -> StructuralCollector {
        StructuralCollector::new(&AnalysisConfig::default())
    }

    #[test]
    fn test_simple_function_has_no_findings() {
        let issues = collector().collect("def add(a, b):\n    return a + b\n");
        assert!(issues.is_empty());
    }

    #[test]
    fn test_complex_function_is_flagged() {
        // 10 个 if 分支 → 复杂度 11，超过默认阈值 10
        let mut code = String::from("def busy(x):\n");
        for i in 0..10 {
            code.push_str(&format!("    if x == {i}:\n        return {i}\n"));
        }
        code.push_str("    return -1\n");

        let issues = collector().collect(&code);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].category, Category::Complexity);
        assert!(issues[0].message.contains("busy"));
        assert!(issues[0].message.contains("11"));
    }

    #[test]
    fn test_boolean_operators_add_complexity() {
        // 1 + if(1) + 9 个布尔运算符 = 11
        let conds: Vec<String> = (0..10).map(|i| format!("x == {i}")).collect();
        let code = format!("def gate(x):\n    if {}:\n        return True\n", conds.join(" and "));
        let issues = collector().collect(&code);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].category, Category::Complexity);
    }

    #[test]
    fn test_deep_nesting_is_flagged() {
        let mut code = String::new();
        for depth in 0..5 {
            let indent = "    ".repeat(depth);
            code.push_str(&format!("{indent}if x > {depth}:\n"));
        }
        code.push_str(&format!("{}y = 1\n", "    ".repeat(5)));

        let issues = collector().collect(&code);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].category, Category::Structure);
        assert!(issues[0].message.contains("depth 5"));
    }

    #[test]
    fn test_syntax_error_fails_closed_as_single_bugs_issue() {
        let issues = collector().collect("def broken(:\n    pass\n");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].category, Category::Bugs);
        assert!(issues[0].message.contains("Syntax error"));
    }
}
