use super::{
    http,
    Collector,
};
use crate::metrics::{
    Reading,
    SourceTag,
};
use eyre::Result;
use metrics_tracker_config::TelegramConfig;
use reqwest::Client;
use serde::Deserialize;
use std::{
    future::Future,
    pin::Pin,
};

/// Member count of a Telegram chat, via the Bot API.
pub struct TelegramMembersCollector {
    config: TelegramConfig,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct BotResponse {
    ok: bool,
    result: Option<i64>,
    description: Option<String>,
}

impl TelegramMembersCollector {
    pub fn new(config: TelegramConfig, client: Client) -> Self {
        Self { config, client }
    }

    async fn members(&self) -> Result<i64> {
        let token = http::required(&self.config.bot_token, "Telegram bot token")?;
        let method = format!("bot{token}");
        let url = http::endpoint(&self.config.api_base, &[method.as_str(), "getChatMemberCount"])?;
        let response: BotResponse = http::get_json(
            self.client
                .get(url)
                .query(&[("chat_id", self.config.chat_id.as_str())]),
            "getChatMemberCount",
        )
        .await?;

        match response {
            BotResponse {
                ok: true,
                result: Some(count),
                ..
            } => Ok(count),
            BotResponse { description, .. } => Err(eyre::eyre!(
                "getChatMemberCount for {} failed: {}",
                self.config.chat_id,
                description.unwrap_or_else(|| "no result".to_string())
            )),
        }
    }
}

impl Collector for TelegramMembersCollector {
    fn collect(&self) -> Pin<Box<dyn Future<Output = Result<Reading>> + Send + '_>> {
        Box::pin(async move {
            let members = self.members().await?;
            Ok(Reading::count(
                format!("{} has {} members", self.config.chat_id, members),
                members,
            ))
        })
    }

    fn source(&self) -> Option<SourceTag> {
        Some(SourceTag::Telegram)
    }

    fn name(&self) -> &'static str {
        "Telegram members"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collectors::http::testing::serve_once;
    use pretty_assertions::assert_eq;

    fn collector(api_base: url::Url) -> TelegramMembersCollector {
        TelegramMembersCollector::new(
            TelegramConfig {
                api_base,
                chat_id: "@metrics".into(),
                bot_token: Some("42:abc".into()),
            },
            Client::builder().no_proxy().build().unwrap(),
        )
    }

    #[tokio::test]
    async fn reads_member_count() {
        let (base, request) = serve_once(200, r#"{"ok":true,"result":871}"#).await;
        let reading = collector(base).collect().await.unwrap();
        assert_eq!(reading.current(), Some(871));
        assert!(request
            .await
            .unwrap()
            .starts_with("GET /bot42:abc/getChatMemberCount?chat_id=%40metrics "));
    }

    #[tokio::test]
    async fn not_ok_responses_fail() {
        let (base, _) = serve_once(200, r#"{"ok":false,"description":"Bad Request: chat not found"}"#).await;
        let err = collector(base).collect().await.unwrap_err();
        assert!(err.to_string().contains("chat not found"));
    }

    #[tokio::test]
    async fn transport_errors_do_not_leak_the_bot_token() {
        let mut collector = collector("http://127.0.0.1:9/".parse().unwrap());
        collector.config.bot_token = Some("SUPERSECRET123".into());

        let rendered = format!("{:#}", collector.collect().await.unwrap_err());
        assert!(rendered.contains("getChatMemberCount"), "{rendered}");
        assert!(!rendered.contains("SUPERSECRET123"), "{rendered}");
    }
}
