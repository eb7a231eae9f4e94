// 风险评分模块
// 消费单文件或整个评审的问题映射，产出 0-100 质量分和风险分档。
//
// 线性惩罚会让单一高噪声类别（比如 50 条规范性 nit）不成比例地
// 拖垮总分；这里用渐进惩罚加单类别上限来约束任何一个类别能造成
// 的最大伤害，同时保证干净代码仍能拿到高分。

use crate::config::ScoringConfig;
use crate::types::{IssueMap, RiskLevel};

/// 风险评分引擎
///
/// 权重表在构造时注入，评分行为可独立做单元测试。
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// 加法风险分 = Σ 各类别 条数 × 权重
    ///
    /// 向上无界，只用于相对分档，不是 0-100 质量分。
    pub fn risk_score(&self, issues: &IssueMap) -> f64 {
        issues
            .iter()
            .map(|(category, items)| items.len() as f64 * self.config.weights.weight(*category))
            .sum()
    }

    /// 风险分档（阈值均为含边界比较）
    pub fn risk_level(&self, score: f64) -> RiskLevel {
        if score >= self.config.high_risk_threshold {
            RiskLevel::High
        } else if score >= self.config.medium_risk_threshold {
            RiskLevel::Medium
        } else if score >= self.config.low_risk_threshold {
            RiskLevel::Low
        } else {
            RiskLevel::Minimal
        }
    }

    /// 质量分（5..=100，问题越多分数单调不增）
    ///
    /// 每个类别内按条数分段惩罚：前 3 条每条 0.5×权重，
    /// 第 4-7 条每条 0.8×权重，第 8 条起每条 1.0×权重；
    /// 单类别惩罚合计封顶 40 分。总分 = max(5, 100 − 总惩罚)。
    pub fn quality_score(&self, issues: &IssueMap) -> f64 {
        let cfg = &self.config;
        let mut total_penalty = 0.0;

        for (category, items) in issues {
            let weight = cfg.weights.weight(*category);
            let count = items.len();

            let light = count.min(cfg.light_breakpoint);
            let medium = count.min(cfg.medium_breakpoint).saturating_sub(light);
            let heavy = count.saturating_sub(cfg.medium_breakpoint);

            let penalty = light as f64 * cfg.light_multiplier * weight
                + medium as f64 * cfg.medium_multiplier * weight
                + heavy as f64 * cfg.full_multiplier * weight;

            total_penalty += penalty.min(cfg.category_penalty_cap);
        }

        (100.0 - total_penalty).max(cfg.score_floor)
    }

    /// 整体风险分档：按文件平均的原始风险分套用同一组阈值
    pub fn overall_risk_level(&self, total_risk_score: f64, file_count: usize) -> RiskLevel {
        if file_count == 0 {
            return RiskLevel::Minimal;
        }
        self.risk_level(total_risk_score / file_count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{empty_issue_map, Category, Issue};

    fn engine() -> ScoringEngine {
        ScoringEngine::new(ScoringConfig::default())
    }

    fn map_with(category: Category, count: usize) -> IssueMap {
        let mut map = empty_issue_map();
        for i in 0..count {
            map.get_mut(&category)
                .unwrap()
                .push(Issue::new(category, format!("issue {i}")));
        }
        map
    }

    #[test]
    fn test_perfect_score_iff_all_empty() {
        let engine = engine();
        assert_eq!(engine.quality_score(&empty_issue_map()), 100.0);
        // 任一类别有一条问题就不再是 100
        for category in Category::ALL {
            let score = engine.quality_score(&map_with(category, 1));
            assert!(score < 100.0, "{category:?} 单条问题未降低分数");
        }
    }

    #[test]
    fn test_score_stays_within_floor_and_ceiling() {
        let engine = engine();
        for count in [0usize, 1, 5, 20, 500] {
            let score = engine.quality_score(&map_with(Category::Security, count));
            assert!((5.0..=100.0).contains(&score), "count={count} score={score}");
        }
    }

    #[test]
    fn test_score_monotonically_non_increasing() {
        let engine = engine();
        let mut previous = 100.0;
        for count in 1..40usize {
            let score = engine.quality_score(&map_with(Category::Bugs, count));
            assert!(score <= previous, "count={count}: {score} > {previous}");
            previous = score;
        }
    }

    #[test]
    fn test_reference_scenario_four_bugs() {
        // 3×0.5×8 + 1×0.8×8 = 18.4 ⇒ 质量分 81.6；风险分 4×8=32 ⇒ LOW
        let engine = engine();
        let map = map_with(Category::Bugs, 4);
        let score = engine.quality_score(&map);
        assert!((score - 81.6).abs() < 1e-9, "score={score}");
        assert_eq!(engine.risk_score(&map), 32.0);
        assert_eq!(engine.risk_level(32.0), RiskLevel::Low);
    }

    #[test]
    fn test_band_thresholds_are_inclusive() {
        let engine = engine();
        assert_eq!(engine.risk_level(80.0), RiskLevel::High);
        assert_eq!(engine.risk_level(79.9), RiskLevel::Medium);
        assert_eq!(engine.risk_level(40.0), RiskLevel::Medium);
        assert_eq!(engine.risk_level(39.9), RiskLevel::Low);
        assert_eq!(engine.risk_level(15.0), RiskLevel::Low);
        assert_eq!(engine.risk_level(14.9), RiskLevel::Minimal);
        assert_eq!(engine.risk_level(0.0), RiskLevel::Minimal);
    }

    #[test]
    fn test_per_category_cap_bounds_noisy_category() {
        let engine = engine();
        // 500 条规范问题：未封顶时惩罚巨大，封顶后只能扣 40 分
        let score = engine.quality_score(&map_with(Category::Standards, 500));
        assert_eq!(score, 60.0);
    }

    #[test]
    fn test_overall_risk_uses_average_per_file() {
        let engine = engine();
        // 两个文件合计 160 分 → 平均 80 → HIGH
        assert_eq!(engine.overall_risk_level(160.0, 2), RiskLevel::High);
        assert_eq!(engine.overall_risk_level(160.0, 8), RiskLevel::Low);
        assert_eq!(engine.overall_risk_level(0.0, 0), RiskLevel::Minimal);
    }
}
