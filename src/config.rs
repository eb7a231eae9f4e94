// 应用配置模块
// 评分权重、分析阈值等固定表都在这里建模为可注入的配置数据，
// 而不是模块级全局变量，便于按部署替换和单元测试。

use crate::errors::ConfigError;
use crate::types::Category;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Git 托管平台配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// API 根地址
    pub api_url: String,
    /// 访问令牌（环境变量 GITHUB_TOKEN 优先）
    pub token: Option<String>,
    /// webhook 签名密钥（环境变量 GITHUB_WEBHOOK_SECRET 优先）
    pub webhook_secret: Option<String>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            token: None,
            webhook_secret: None,
        }
    }
}

/// 各类别的风险权重
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryWeights {
    pub security: f64,
    pub complexity: f64,
    pub structure: f64,
    pub performance: f64,
    pub bugs: f64,
    pub standards: f64,
}

impl Default for CategoryWeights {
    fn default() -> Self {
        // 安全与复杂度占主导，规范类权重最低
        Self {
            security: 20.0,
            complexity: 12.0,
            structure: 8.0,
            performance: 8.0,
            bugs: 8.0,
            standards: 4.0,
        }
    }
}

impl CategoryWeights {
    pub fn weight(&self, category: Category) -> f64 {
        match category {
            Category::Security => self.security,
            Category::Complexity => self.complexity,
            Category::Structure => self.structure,
            Category::Performance => self.performance,
            Category::Bugs => self.bugs,
            Category::Standards => self.standards,
        }
    }
}

/// 评分引擎配置
///
/// 渐进惩罚的断点和倍率是经验值，按需调整。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: CategoryWeights,
    /// 前几条问题按此倍率计惩罚
    pub light_multiplier: f64,
    /// 中段问题的惩罚倍率
    pub medium_multiplier: f64,
    /// 超出中段后按全额权重计
    pub full_multiplier: f64,
    /// 轻惩罚段的条数上限
    pub light_breakpoint: usize,
    /// 中惩罚段的条数上限
    pub medium_breakpoint: usize,
    /// 单类别惩罚上限
    pub category_penalty_cap: f64,
    /// 质量分下限（永不为 0，表示"收到了信号"而非"彻底失败"）
    pub score_floor: f64,
    /// 风险分档阈值（均为含边界比较）
    pub high_risk_threshold: f64,
    pub medium_risk_threshold: f64,
    pub low_risk_threshold: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: CategoryWeights::default(),
            light_multiplier: 0.5,
            medium_multiplier: 0.8,
            full_multiplier: 1.0,
            light_breakpoint: 3,
            medium_breakpoint: 7,
            category_penalty_cap: 40.0,
            score_floor: 5.0,
            high_risk_threshold: 80.0,
            medium_risk_threshold: 40.0,
            low_risk_threshold: 15.0,
        }
    }
}

/// 分析配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// 圈复杂度阈值，超过则产生 complexity 问题
    pub complexity_threshold: u32,
    /// 嵌套深度阈值，超过则产生 structure 问题
    pub nesting_threshold: u32,
    /// 单个诊断工具的执行超时（秒）
    pub producer_timeout_secs: u64,
    /// pylint 可执行命令
    pub pylint_command: String,
    /// flake8 可执行命令
    pub flake8_command: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            complexity_threshold: 10,
            nesting_threshold: 4,
            producer_timeout_secs: 60,
            pylint_command: "pylint".to_string(),
            flake8_command: "flake8".to_string(),
        }
    }
}

/// Webhook 服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub github: GitHubConfig,
    pub scoring: ScoringConfig,
    pub analysis: AnalysisConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    /// 配置文件路径：PRREVIEW_CONFIG 环境变量优先，
    /// 否则使用用户配置目录下的 prreview/config.toml
    pub fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("PRREVIEW_CONFIG") {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|d| d.join("prreview").join("config.toml"))
    }

    /// 加载配置：文件不存在时使用默认值，环境变量覆盖敏感字段
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => {
                tracing::info!("正在加载配置文件: {:?}", path);
                let content = std::fs::read_to_string(&path)
                    .map_err(|e| ConfigError::FileRead(path.display().to_string(), e))?;
                toml::from_str(&content)
                    .map_err(|e| ConfigError::TomlParse(path.display().to_string(), e))?
            }
            _ => {
                tracing::debug!("未找到配置文件，使用默认配置");
                Self::default()
            }
        };

        if let Ok(token) = std::env::var("GITHUB_TOKEN") {
            if !token.is_empty() {
                config.github.token = Some(token);
            }
        }
        if let Ok(secret) = std::env::var("GITHUB_WEBHOOK_SECRET") {
            if !secret.is_empty() {
                config.github.webhook_secret = Some(secret);
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// 校验必填字段：诊断工具命令不许为空
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.analysis.pylint_command.trim().is_empty() {
            return Err(ConfigError::FieldMissing(
                "analysis.pylint_command".to_string(),
            ));
        }
        if self.analysis.flake8_command.trim().is_empty() {
            return Err(ConfigError::FieldMissing(
                "analysis.flake8_command".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_match_reference_table() {
        let weights = CategoryWeights::default();
        assert_eq!(weights.weight(Category::Security), 20.0);
        assert_eq!(weights.weight(Category::Complexity), 12.0);
        assert_eq!(weights.weight(Category::Structure), 8.0);
        assert_eq!(weights.weight(Category::Performance), 8.0);
        assert_eq!(weights.weight(Category::Bugs), 8.0);
        assert_eq!(weights.weight(Category::Standards), 4.0);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [analysis]
            complexity_threshold = 15

            [scoring.weights]
            security = 30.0
            "#,
        )
        .unwrap();

        assert_eq!(config.analysis.complexity_threshold, 15);
        assert_eq!(config.analysis.nesting_threshold, 4);
        assert_eq!(config.scoring.weights.security, 30.0);
        assert_eq!(config.scoring.weights.standards, 4.0);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_empty_producer_command_is_rejected() {
        let mut config = AppConfig::default();
        assert!(config.validate().is_ok());

        config.analysis.pylint_command = "   ".to_string();
        match config.validate() {
            Err(ConfigError::FieldMissing(field)) => {
                assert_eq!(field, "analysis.pylint_command");
            }
            other => panic!("expected FieldMissing, got {other:?}"),
        }
    }

    #[test]
    fn test_default_scoring_breakpoints() {
        let scoring = ScoringConfig::default();
        assert_eq!(scoring.light_breakpoint, 3);
        assert_eq!(scoring.medium_breakpoint, 7);
        assert_eq!(scoring.category_penalty_cap, 40.0);
        assert_eq!(scoring.score_floor, 5.0);
    }
}
