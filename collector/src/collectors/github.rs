//! Repository stars, forks and the latest release, from the GitHub REST API.

use super::{
    http,
    Collector,
};
use crate::metrics::{
    Reading,
    SourceTag,
    Summary,
};
use chrono::{
    DateTime,
    Utc,
};
use eyre::Result;
use metrics_tracker_config::GithubConfig;
use reqwest::{
    header,
    Client,
    RequestBuilder,
};
use serde::Deserialize;
use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
};
use url::Url;

/// Shared by the three GitHub collectors.
pub struct GithubApi {
    config: GithubConfig,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct Repository {
    full_name: String,
    stargazers_count: i64,
    forks_count: i64,
}

#[derive(Debug, Deserialize)]
struct Release {
    tag_name: String,
    name: Option<String>,
    published_at: Option<DateTime<Utc>>,
}

impl GithubApi {
    pub fn new(config: GithubConfig, client: Client) -> Arc<Self> {
        Arc::new(Self { config, client })
    }

    fn repository_path(&self) -> String {
        format!("{}/{}", self.config.owner, self.config.repo)
    }

    fn get(&self, url: Url) -> RequestBuilder {
        let request = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
        match self.config.token.as_deref().filter(|token| !token.is_empty()) {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn repository(&self) -> Result<Repository> {
        let url = http::endpoint(
            &self.config.api_base,
            &["repos", self.config.owner.as_str(), self.config.repo.as_str()],
        )?;
        http::get_json(self.get(url), "GitHub repository").await
    }

    async fn latest_release(&self) -> Result<Release> {
        let url = http::endpoint(
            &self.config.api_base,
            &["repos", self.config.owner.as_str(), self.config.repo.as_str(), "releases", "latest"],
        )?;
        http::get_json(self.get(url), "GitHub latest release").await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GithubMetric {
    Stars,
    Forks,
    /// Logged only; a release has no count.
    Release,
}

pub struct GithubCollector {
    api: Arc<GithubApi>,
    metric: GithubMetric,
}

impl GithubCollector {
    pub fn new(api: Arc<GithubApi>, metric: GithubMetric) -> Self {
        Self { api, metric }
    }
}

impl Collector for GithubCollector {
    fn collect(&self) -> Pin<Box<dyn Future<Output = Result<Reading>> + Send + '_>> {
        Box::pin(async move {
            match self.metric {
                GithubMetric::Stars => {
                    let repo = self.api.repository().await?;
                    Ok(Reading::repository(
                        format!("{} has {} stars", repo.full_name, repo.stargazers_count),
                        repo.stargazers_count,
                        repo.full_name,
                    ))
                }
                GithubMetric::Forks => {
                    let repo = self.api.repository().await?;
                    Ok(Reading::repository(
                        format!("{} has {} forks", repo.full_name, repo.forks_count),
                        repo.forks_count,
                        repo.full_name,
                    ))
                }
                GithubMetric::Release => {
                    let release = self.api.latest_release().await?;
                    let published = release
                        .published_at
                        .map(|at| at.format("%Y-%m-%d").to_string())
                        .unwrap_or_else(|| "unpublished".to_string());
                    Ok(Reading {
                        status: format!(
                            "{} latest release {} ({})",
                            self.api.repository_path(),
                            release.tag_name,
                            published
                        ),
                        summary: Summary::Release {
                            tag: release.tag_name,
                            name: release.name,
                            published_at: release.published_at,
                        },
                    })
                }
            }
        })
    }

    fn source(&self) -> Option<SourceTag> {
        match self.metric {
            GithubMetric::Stars => Some(SourceTag::GithubStars),
            GithubMetric::Forks => Some(SourceTag::GithubForks),
            GithubMetric::Release => None,
        }
    }

    fn name(&self) -> &'static str {
        match self.metric {
            GithubMetric::Stars => "GitHub stars",
            GithubMetric::Forks => "GitHub forks",
            GithubMetric::Release => "GitHub release",
        }
    }
}
