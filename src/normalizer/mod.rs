// 诊断归一化模块
// 每个诊断工具一个适配器，把各自的原始输出转换为统一的 Issue 模型。
// 上层组件只依赖该适配器能力，不感知任何工具的原生格式；
// 新增工具时只需要新写一个适配器，不改动评分与报告逻辑。

pub mod flake8;
pub mod pylint;

pub use flake8::Flake8Adapter;
pub use pylint::PylintAdapter;

use crate::types::{Category, Issue};

/// 诊断工具一次运行的结果
///
/// 显式结果类型代替跨组件传播异常：崩溃/超时/不可用
/// 都作为 `Failure` 携带失败文本返回。
#[derive(Debug, Clone)]
pub enum ProducerOutcome {
    /// 正常产出（可能为空字符串）
    Output(String),
    /// 运行失败的描述文本
    Failure(String),
}

/// 诊断适配器能力：单一的 normalize 契约
pub trait DiagnosticAdapter {
    /// 工具名，用于合成失败问题的文案
    fn producer(&self) -> &'static str;

    /// 解析原始输出为问题序列
    ///
    /// 全函数：永不失败；空输出产生空序列；保持工具输出内的相对顺序。
    fn normalize(&self, raw: &str) -> Vec<Issue>;
}

/// 把一次运行结果归一化为问题序列
///
/// 失败结果被转换为恰好一条 bugs 问题，归一化本身永不报错。
pub fn normalize_outcome(adapter: &dyn DiagnosticAdapter, outcome: &ProducerOutcome) -> Vec<Issue> {
    match outcome {
        ProducerOutcome::Output(raw) => adapter.normalize(raw),
        ProducerOutcome::Failure(text) => {
            log::warn!("诊断工具 {} 运行失败: {text}", adapter.producer());
            vec![Issue::new(
                Category::Bugs,
                format!("Producer '{}' failed: {text}", adapter.producer()),
            )]
        }
    }
}
