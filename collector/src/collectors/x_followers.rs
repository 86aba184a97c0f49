use super::{
    http,
    Collector,
};
use crate::metrics::{
    Reading,
    SourceTag,
};
use eyre::Result;
use metrics_tracker_config::XConfig;
use reqwest::Client;
use serde::Deserialize;
use std::{
    future::Future,
    pin::Pin,
};

/// Follower count of an X account, via the v2 user lookup.
pub struct XFollowersCollector {
    config: XConfig,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    data: Option<User>,
    #[serde(default)]
    errors: Vec<ApiError>,
}

#[derive(Debug, Deserialize)]
struct User {
    public_metrics: PublicMetrics,
}

#[derive(Debug, Deserialize)]
struct PublicMetrics {
    followers_count: i64,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    detail: Option<String>,
    title: Option<String>,
}

impl XFollowersCollector {
    pub fn new(config: XConfig, client: Client) -> Self {
        Self { config, client }
    }

    async fn followers(&self) -> Result<i64> {
        let token = http::required(&self.config.bearer_token, "X bearer token")?;
        let url = http::endpoint(
            &self.config.api_base,
            &["2", "users", "by", "username", self.config.username.as_str()],
        )?;
        let response: UserResponse = http::get_json(
            self.client
                .get(url)
                .query(&[("user.fields", "public_metrics")])
                .bearer_auth(token),
            "X user lookup",
        )
        .await?;

        match response.data {
            Some(user) => Ok(user.public_metrics.followers_count),
            None => {
                let reason = response
                    .errors
                    .into_iter()
                    .find_map(|error| error.detail.or(error.title))
                    .unwrap_or_else(|| "no user data in response".to_string());
                Err(eyre::eyre!("X user lookup for @{} failed: {}", self.config.username, reason))
            }
        }
    }
}

impl Collector for XFollowersCollector {
    fn collect(&self) -> Pin<Box<dyn Future<Output = Result<Reading>> + Send + '_>> {
        Box::pin(async move {
            let followers = self.followers().await?;
            Ok(Reading::count(
                format!("@{} has {} followers", self.config.username, followers),
                followers,
            ))
        })
    }

    fn source(&self) -> Option<SourceTag> {
        Some(SourceTag::X)
    }

    fn name(&self) -> &'static str {
        "X followers"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collectors::http::testing::serve_once;
    use pretty_assertions::assert_eq;

    fn config(api_base: url::Url) -> XConfig {
        XConfig {
            api_base,
            username: "metrics".into(),
            bearer_token: Some("secret".into()),
        }
    }

    fn client() -> Client {
        Client::builder().no_proxy().build().unwrap()
    }

    #[tokio::test]
    async fn reads_follower_count() {
        let (base, request) =
            serve_once(200, r#"{"data":{"id":"1","public_metrics":{"followers_count":1234}}}"#).await;
        let collector = XFollowersCollector::new(config(base), client());

        let reading = collector.collect().await.unwrap();
        assert_eq!(reading.current(), Some(1234));

        let head = request.await.unwrap();
        assert!(head.starts_with("GET /2/users/by/username/metrics?user.fields=public_metrics "));
        assert!(head.to_lowercase().contains("authorization: bearer secret"));
    }

    #[tokio::test]
    async fn api_errors_fail_the_collection() {
        let (base, _) = serve_once(200, r#"{"errors":[{"title":"Not Found Error","detail":"Could not find user"}]}"#).await;
        let collector = XFollowersCollector::new(config(base), client());
        let err = collector.collect().await.unwrap_err();
        assert!(err.to_string().contains("Could not find user"));
    }

    #[tokio::test]
    async fn missing_token_fails_without_a_request() {
        let mut config = config("http://127.0.0.1:9/".parse().unwrap());
        config.bearer_token = None;
        let err = XFollowersCollector::new(config, client()).collect().await.unwrap_err();
        assert_eq!(err.to_string(), "X bearer token is not configured");
    }
}
