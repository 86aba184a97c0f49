use super::{
    http,
    Collector,
};
use crate::metrics::{
    Reading,
    SourceTag,
};
use eyre::{
    Context as _,
    Result,
};
use metrics_tracker_config::HoldersConfig;
use reqwest::Client;
use serde::Deserialize;
use std::{
    future::Future,
    pin::Pin,
};

/// Holder count of a token contract, from an Etherscan-compatible explorer API.
pub struct TokenHoldersCollector {
    config: HoldersConfig,
    client: Client,
}

/// Explorer envelope. `result` is the count as a string on success and the error text otherwise.
#[derive(Debug, Deserialize)]
struct ExplorerResponse {
    status: String,
    message: String,
    result: serde_json::Value,
}

impl TokenHoldersCollector {
    pub fn new(config: HoldersConfig, client: Client) -> Self {
        Self { config, client }
    }

    async fn holders(&self) -> Result<i64> {
        let mut query = vec![
            ("module", "token"),
            ("action", "tokenholdercount"),
            ("contractaddress", self.config.contract_address.as_str()),
        ];
        if let Some(key) = self.config.api_key.as_deref() {
            query.push(("apikey", key));
        }
        let response: ExplorerResponse = http::get_json(
            self.client.get(self.config.api_base.clone()).query(&query),
            "tokenholdercount",
        )
        .await?;

        if response.status != "1" {
            return Err(eyre::eyre!(
                "tokenholdercount for {} failed: {} ({})",
                self.config.contract_address,
                response.message,
                response.result
            ));
        }
        match &response.result {
            serde_json::Value::Number(number) => number
                .as_i64()
                .ok_or_else(|| eyre::eyre!("Holder count {number} is out of range")),
            serde_json::Value::String(text) => text
                .trim()
                .parse()
                .wrap_err_with(|| format!("Holder count '{text}' is not a number")),
            other => Err(eyre::eyre!("Unexpected holder count {other}")),
        }
    }
}

impl Collector for TokenHoldersCollector {
    fn collect(&self) -> Pin<Box<dyn Future<Output = Result<Reading>> + Send + '_>> {
        Box::pin(async move {
            let holders = self.holders().await?;
            Ok(Reading::count(
                format!("{} has {} holders", self.config.contract_address, holders),
                holders,
            ))
        })
    }

    fn source(&self) -> Option<SourceTag> {
        Some(SourceTag::Holders)
    }

    fn name(&self) -> &'static str {
        "Token holders"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collectors::http::testing::serve_once;
    use pretty_assertions::assert_eq;

    fn collector(api_base: url::Url, api_key: Option<&str>) -> TokenHoldersCollector {
        TokenHoldersCollector::new(
            HoldersConfig {
                api_base,
                contract_address: "0xabc".into(),
                api_key: api_key.map(str::to_string),
            },
            Client::builder().no_proxy().build().unwrap(),
        )
    }

    #[tokio::test]
    async fn parses_string_counts() {
        let (base, request) = serve_once(200, r#"{"status":"1","message":"OK","result":"5021"}"#).await;
        let reading = collector(base, Some("key")).collect().await.unwrap();
        assert_eq!(reading.current(), Some(5021));
        assert!(request
            .await
            .unwrap()
            .starts_with("GET /?module=token&action=tokenholdercount&contractaddress=0xabc&apikey=key "));
    }

    #[tokio::test]
    async fn explorer_errors_fail() {
        let (base, _) = serve_once(200, r#"{"status":"0","message":"NOTOK","result":"Invalid API Key"}"#).await;
        let err = collector(base, None).collect().await.unwrap_err();
        assert!(err.to_string().contains("Invalid API Key"));
    }

    #[tokio::test]
    async fn undecodable_bodies_do_not_leak_the_api_key() {
        let (base, _) = serve_once(200, "<html>rate limited</html>").await;
        let rendered = format!("{:#}", collector(base, Some("SECRETKEY")).collect().await.unwrap_err());
        assert!(rendered.starts_with("Invalid tokenholdercount response body"), "{rendered}");
        assert!(!rendered.contains("SECRETKEY"), "{rendered}");
    }
}
