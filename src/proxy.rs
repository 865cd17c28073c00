//! Proxy routes applicable to a URL and their human readable summary.

use url::Url;

use crate::error::UCError;
use crate::Result;

#[derive(Clone, Debug, PartialEq)]
pub enum ProxyRoute {
    Direct,
    /// Proxy address as `host:port`.
    Proxied(String),
}

impl ProxyRoute {
    pub fn is_direct(&self) -> bool {
        matches!(self, ProxyRoute::Direct)
    }
}

/// Resolves the ordered list of routes to use when connecting to a URL.
pub trait ProxySelector {
    fn select(&self, url: &Url) -> Vec<ProxyRoute>;
}

/// Summarize the proxy configuration that applies to `url`.
///
/// A single direct route reads `no HTTP proxy`. Otherwise every non-direct
/// route is listed as `proxy: <address>`, joined with `, `. Direct routes
/// are skipped in that case, so a direct route next to a proxied one only
/// reports the proxied one.
pub fn describe_proxies(url: &str, selector: &dyn ProxySelector) -> Result<String> {
    let url = Url::parse(url).map_err(|err| {
        UCError::ConfigurationError(format!(
            "Can not load configuration of HTTP proxies: {}",
            err
        ))
    })?;
    let routes = selector.select(&url);
    let descriptions: Vec<String> = match routes.as_slice() {
        [route] if route.is_direct() => vec!["no HTTP proxy".to_string()],
        _ => routes
            .iter()
            .filter_map(|route| match route {
                ProxyRoute::Direct => None,
                ProxyRoute::Proxied(address) => Some(format!("proxy: {}", address)),
            })
            .collect(),
    };
    Ok(descriptions.join(", "))
}

/// Always answers the same routes. Used for explicitly configured proxies.
#[derive(Clone, Debug, PartialEq)]
pub struct FixedProxySelector {
    routes: Vec<ProxyRoute>,
}

impl FixedProxySelector {
    pub fn new(routes: Vec<ProxyRoute>) -> Self {
        FixedProxySelector { routes }
    }

    pub fn direct() -> Self {
        FixedProxySelector::new(vec![ProxyRoute::Direct])
    }
}

impl ProxySelector for FixedProxySelector {
    fn select(&self, _url: &Url) -> Vec<ProxyRoute> {
        self.routes.clone()
    }
}

/// System default selector backed by the conventional proxy environment
/// variables: `http_proxy`, `https_proxy`, `all_proxy` and `no_proxy`, lower
/// case first, then upper case.
#[derive(Clone, Debug, Default)]
pub struct EnvProxySelector {
    lookup: Option<fn(&str) -> Option<String>>,
}

impl EnvProxySelector {
    pub fn new() -> Self {
        EnvProxySelector { lookup: None }
    }

    /// Selector reading variables from `lookup` instead of the process
    /// environment.
    pub fn with_lookup(lookup: fn(&str) -> Option<String>) -> Self {
        EnvProxySelector {
            lookup: Some(lookup),
        }
    }

    fn var(&self, name: &str) -> Option<String> {
        let read = |name: &str| match self.lookup {
            Some(lookup) => lookup(name),
            None => std::env::var(name).ok(),
        };
        read(name)
            .or_else(|| read(&name.to_uppercase()))
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn bypassed(&self, host: &str) -> bool {
        let Some(no_proxy) = self.var("no_proxy") else {
            return false;
        };
        no_proxy
            .split(',')
            .map(|entry| entry.trim().trim_start_matches('.'))
            .filter(|entry| !entry.is_empty())
            .any(|entry| {
                entry == "*" || host == entry || host.ends_with(&format!(".{}", entry))
            })
    }
}

// Accepts `http://host:port/`, `host:port` or a bare host.
fn proxy_address(proxy: &str) -> String {
    let with_scheme = if proxy.contains("://") {
        proxy.to_string()
    } else {
        format!("http://{}", proxy)
    };
    match Url::parse(&with_scheme) {
        Ok(url) => match (url.host_str(), url.port_or_known_default()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            _ => proxy.to_string(),
        },
        Err(_) => proxy.to_string(),
    }
}

impl ProxySelector for EnvProxySelector {
    fn select(&self, url: &Url) -> Vec<ProxyRoute> {
        let host = url.host_str().unwrap_or_default();
        if self.bypassed(host) {
            return vec![ProxyRoute::Direct];
        }
        let proxy = match url.scheme() {
            "http" => self.var("http_proxy"),
            "https" => self.var("https_proxy"),
            _ => None,
        }
        .or_else(|| self.var("all_proxy"));
        match proxy {
            Some(proxy) => vec![ProxyRoute::Proxied(proxy_address(&proxy))],
            None => vec![ProxyRoute::Direct],
        }
    }
}
