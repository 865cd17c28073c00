use std::time::Duration;

use ureq::{Agent, Proxy};
use url::Url;

use crate::config::ConfigProperties;
use crate::error::{AddContext, UCError};
use crate::io::{ByteStream, Downloader};
use crate::proxy::{ProxyRoute, ProxySelector};
use crate::{log_debug, Result};

const USER_AGENT: &str = concat!("uc/", env!("CARGO_PKG_VERSION"));

/// Blocking HTTP downloader.
pub struct HttpDownloader {
    agent: Agent,
    proxy: Option<String>,
}

impl HttpDownloader {
    /// Downloader honouring the configured timeout. The proxy is the first
    /// non-direct route `proxy_selector` gives for the configured URL, the
    /// same routes the proxy summary reports.
    pub fn new(config: &impl ConfigProperties, proxy_selector: &dyn ProxySelector) -> Result<Self> {
        let url = Url::parse(config.url()).map_err(|err| {
            UCError::ConfigurationError(format!("Invalid URL {}: {}", config.url(), err))
        })?;
        let address = proxy_selector
            .select(&url)
            .into_iter()
            .find_map(|route| match route {
                ProxyRoute::Direct => None,
                ProxyRoute::Proxied(address) => Some(address),
            });
        let proxy = match &address {
            Some(address) => Some(
                Proxy::new(&format!("http://{}", address))
                    .map_err(|err| UCError::ConfigurationError(err.to_string()))
                    .err_context(format!("Invalid proxy {}", address))?,
            ),
            None => None,
        };
        let timeout: Duration = config.timeout().into();
        let agent_config = Agent::config_builder()
            .timeout_global(Some(timeout))
            // Status codes are mapped to stream/no data/error below.
            .http_status_as_error(false)
            .proxy(proxy)
            .build();
        Ok(HttpDownloader {
            agent: Agent::new_with_config(agent_config),
            proxy: address,
        })
    }

    /// `host:port` of the proxy requests go through, `None` when direct.
    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }
}

impl Downloader for HttpDownloader {
    fn open_stream(&self, url: &Url) -> Result<Option<ByteStream>> {
        log_debug!("GET {}", url);
        let response = self
            .agent
            .get(url.as_str())
            .header("User-Agent", USER_AGENT)
            .call()
            .map_err(|err| UCError::TransportError(format!("{}: {}", url, err)))?;
        let status = response.status().as_u16();
        log_debug!("Status {} from {}", status, url);
        match status {
            204 | 404 => Ok(None),
            200..=299 => Ok(Some(Box::new(response.into_body().into_reader()))),
            _ => Err(UCError::TransportError(format!("Status {} from {}", status, url)).into()),
        }
    }
}
