//! Request helpers shared by the HTTP collectors.

use eyre::{
    bail,
    eyre,
    Context as _,
    Result,
};
use reqwest::{
    Client,
    RequestBuilder,
};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// One client per process, every request bounded by `timeout`.
pub fn client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .wrap_err("Failed to build HTTP client")
}

/// Appends path segments to `base`, whether or not it ends with a slash.
pub fn endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| eyre!("{base} cannot be used as an API base"))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Sends the request and decodes a JSON body. Non-2xx responses become errors carrying the body.
///
/// Request URLs can hold credentials, so errors name the call by `label` and never by URL.
pub async fn get_json<T: DeserializeOwned>(request: RequestBuilder, label: &str) -> Result<T> {
    let response = request
        .send()
        .await
        .map_err(reqwest::Error::without_url)
        .wrap_err_with(|| format!("{label} request failed"))?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        bail!("{label}: HTTP {status}: {}", body.trim());
    }
    response
        .json::<T>()
        .await
        .map_err(reqwest::Error::without_url)
        .wrap_err_with(|| format!("Invalid {label} response body"))
}

pub fn required<'a>(value: &'a Option<String>, what: &str) -> Result<&'a str> {
    value
        .as_deref()
        .filter(|value| !value.is_empty())
        .ok_or_else(|| eyre!("{what} is not configured"))
}

#[cfg(test)]
pub mod testing {
    //! A one-shot HTTP server returning a canned response.

    use std::net::SocketAddr;
    use tokio::{
        io::{
            AsyncReadExt,
            AsyncWriteExt,
        },
        net::TcpListener,
        sync::oneshot,
    };
    use url::Url;

    /// Serves a single request. The receiver yields the raw request head.
    pub async fn serve_once(status: u16, body: &'static str) -> (Url, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let mut read = 0;
            loop {
                let n = socket.read(&mut buf[read..]).await.unwrap();
                read += n;
                if n == 0 || buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            let _ = tx.send(String::from_utf8_lossy(&buf[..read]).into_owned());
            let response = format!(
                "HTTP/1.1 {status} Canned\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        (format!("http://{addr}/").parse().unwrap(), rx)
    }
}
