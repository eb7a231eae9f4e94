// unified diff 行号映射模块
// 把补丁文本解析为「变更后行号 → 行文本」的映射，
// 用于将问题锚定到本次变更实际触及的行。

use regex::Regex;
use std::collections::BTreeMap;

/// 解析 unified diff 补丁，返回变更后行号到行文本的映射
///
/// 只覆盖补丁中出现的行（新增行与上下文行）；删除行不占行号。
/// 计数器以每个 `@@ -a,b +c,d @@` 头中的 `+c` 为种子，
/// 每遇到一个非删除行前进一次，新的块头重置计数器。
///
/// 纯函数：同一补丁文本两次解析结果相同。空补丁或完全无法解析的
/// 补丁返回空映射而不是错误，调用方退化为"无行内锚点"。
/// 块头缺少 `+<数字>` 时计数器从 0 重新开始，该块的行号只能当作
/// 尽力而为的结果。
pub fn parse_patch_line_map(patch: &str) -> BTreeMap<u32, String> {
    let hunk_start = Regex::new(r"\+(\d+)").unwrap();
    let mut mapping = BTreeMap::new();
    let mut current_line: u32 = 0;
    let mut in_hunk = false;

    for line in patch.lines() {
        if line.starts_with("@@") {
            in_hunk = true;
            current_line = hunk_start
                .captures(line)
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(0);
        } else if !in_hunk || line.starts_with('\\') {
            // 块头之前的文件头（--- / +++）以及 "\ No newline" 标记都跳过
            continue;
        } else if line.starts_with('+') {
            mapping.insert(current_line, line[1..].to_string());
            current_line = current_line.saturating_add(1);
        } else if !line.starts_with('-') {
            // 上下文行：去掉前导空格标记后同样计入映射
            let text = line.strip_prefix(' ').unwrap_or(line);
            mapping.insert(current_line, text.to_string());
            current_line = current_line.saturating_add(1);
        }
        // 删除行不前进计数器，也不产生映射
    }

    mapping
}
