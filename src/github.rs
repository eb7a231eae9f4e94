// GitHub API 客户端模块
// 拉取 PR 的变更文件（补丁 + head 提交处的完整内容），
// 并把评审报告作为 issue 评论回帖。

use crate::config::GitHubConfig;
use crate::errors::GitHostError;
use crate::types::ChangedFile;
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

const REQUEST_TIMEOUT_SECONDS: u64 = 30;
const USER_AGENT: &str = concat!("prreview/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct PullRequestInfo {
    head: HeadRef,
}

#[derive(Debug, Deserialize)]
struct HeadRef {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct PullRequestFile {
    filename: String,
    status: String,
    additions: u32,
    deletions: u32,
    #[serde(default)]
    patch: Option<String>,
}

#[derive(Debug)]
pub struct GitHubClient {
    api_url: String,
    token: String,
    client: Client,
    timeout: Duration,
}

impl GitHubClient {
    /// 根据配置构造客户端；缺少令牌直接报认证错误
    pub fn new(config: &GitHubConfig) -> Result<Self, GitHostError> {
        let token = config
            .token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or(GitHostError::Authentication)?;

        Ok(Self {
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token,
            client: Client::new(),
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECONDS),
        })
    }

    fn get(&self, url: &str, accept: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
            .header(header::ACCEPT, accept)
            .header(header::USER_AGENT, USER_AGENT)
            .timeout(self.timeout)
    }

    fn map_status(status: StatusCode, repository: &str, pr_number: u64) -> GitHostError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GitHostError::Authentication,
            StatusCode::NOT_FOUND => GitHostError::PullRequestNotFound {
                repository: repository.to_string(),
                pr_number,
            },
            s => GitHostError::ServerError {
                status_code: s.as_u16(),
            },
        }
    }

    /// 拉取 PR 的全部变更文件
    ///
    /// 每个文件带上 head 提交处的完整内容；单个文件内容拉取失败
    /// 会降级为空内容（引擎会以 bugs 问题的形式体现出来），
    /// 不会使整个评审失败。
    pub async fn fetch_pr_files(
        &self,
        repository: &str,
        pr_number: u64,
    ) -> Result<Vec<ChangedFile>, GitHostError> {
        let pr_url = format!("{}/repos/{repository}/pulls/{pr_number}", self.api_url);
        let response = self.get(&pr_url, "application/vnd.github+json").send().await?;
        if !response.status().is_success() {
            return Err(Self::map_status(response.status(), repository, pr_number));
        }
        let pr_info: PullRequestInfo = response
            .json()
            .await
            .map_err(|e| GitHostError::UnexpectedResponse(format!("pull request payload: {e}")))?;

        let files_url = format!(
            "{}/repos/{repository}/pulls/{pr_number}/files?per_page=100",
            self.api_url
        );
        let response = self
            .get(&files_url, "application/vnd.github+json")
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::map_status(response.status(), repository, pr_number));
        }
        let pr_files: Vec<PullRequestFile> = response
            .json()
            .await
            .map_err(|e| GitHostError::UnexpectedResponse(format!("file list payload: {e}")))?;

        let mut files = Vec::with_capacity(pr_files.len());
        for file in pr_files {
            if file.status == "removed" {
                continue;
            }
            let content = match self
                .fetch_file_content(repository, &file.filename, &pr_info.head.sha)
                .await
            {
                Ok(content) => content,
                Err(e) => {
                    log::warn!("拉取 {} 的内容失败: {e}", file.filename);
                    String::new()
                }
            };
            files.push(ChangedFile {
                filename: file.filename,
                content,
                patch: file.patch.unwrap_or_default(),
                additions: file.additions,
                deletions: file.deletions,
            });
        }

        Ok(files)
    }

    /// 通过 raw 媒体类型直接拿文件文本，避免 base64 往返
    async fn fetch_file_content(
        &self,
        repository: &str,
        path: &str,
        git_ref: &str,
    ) -> Result<String, GitHostError> {
        let url = format!(
            "{}/repos/{repository}/contents/{path}?ref={git_ref}",
            self.api_url
        );
        let response = self.get(&url, "application/vnd.github.raw").send().await?;
        if !response.status().is_success() {
            return Err(GitHostError::ServerError {
                status_code: response.status().as_u16(),
            });
        }
        Ok(response.text().await?)
    }

    /// 把评审报告作为评论发布到 PR
    pub async fn post_review_comment(
        &self,
        repository: &str,
        pr_number: u64,
        body: &str,
    ) -> Result<(), GitHostError> {
        let url = format!(
            "{}/repos/{repository}/issues/{pr_number}/comments",
            self.api_url
        );
        let response = self
            .client
            .post(&url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
            .header(header::ACCEPT, "application/vnd.github+json")
            .header(header::USER_AGENT, USER_AGENT)
            .timeout(self.timeout)
            .json(&serde_json::json!({ "body": body }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::map_status(response.status(), repository, pr_number));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_token_is_authentication_error() {
        let config = GitHubConfig::default();
        assert!(matches!(
            GitHubClient::new(&config),
            Err(GitHostError::Authentication)
        ));
    }

    #[test]
    fn test_api_url_trailing_slash_trimmed() {
        let config = GitHubConfig {
            api_url: "https://api.github.com/".to_string(),
            token: Some("t".to_string()),
            webhook_secret: None,
        };
        let client = GitHubClient::new(&config).unwrap();
        assert_eq!(client.api_url, "https://api.github.com");
    }
}
