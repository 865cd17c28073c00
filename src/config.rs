//! Config file parsing and validation.

use crate::api_defaults::{
    DEFAULT_PROXY_PORT, DEFAULT_TIMEOUT_SECONDS, DEFAULT_URL, PROXY_HOST_PROPERTY,
    PROXY_PORT_PROPERTY, REFRESH_PERIOD_MILLISECONDS, REFRESH_PERIOD_PROPERTY, TIMEOUT_PROPERTY,
    URL_PROPERTY,
};
use crate::error::{AddContext, UCError};
use crate::properties::Properties;
use crate::time::{Milliseconds, Seconds};
use crate::Result;
use std::io::Read;

pub trait ConfigProperties {
    fn url(&self) -> &str {
        DEFAULT_URL
    }
    fn refresh_period(&self) -> Milliseconds {
        Milliseconds::new(REFRESH_PERIOD_MILLISECONDS)
    }
    fn timeout(&self) -> Seconds {
        Seconds::new(DEFAULT_TIMEOUT_SECONDS)
    }
    /// `host:port` of an explicitly configured HTTP proxy.
    fn proxy(&self) -> Option<&str> {
        None
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    url: String,
    refresh_period: Milliseconds,
    timeout: Seconds,
    proxy: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            url: DEFAULT_URL.to_string(),
            refresh_period: Milliseconds::new(REFRESH_PERIOD_MILLISECONDS),
            timeout: Seconds::new(DEFAULT_TIMEOUT_SECONDS),
            proxy: None,
        }
    }
}

impl Config {
    pub fn new<T: Read>(reader: T) -> Result<Self> {
        let properties = Properties::load(reader).err_context("Could not read config file")?;
        Config::from_properties(&properties)
    }

    pub fn from_properties(properties: &Properties) -> Result<Self> {
        let defaults = Config::default();
        let url = properties
            .get(URL_PROPERTY)
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .unwrap_or(defaults.url);
        let refresh_period = match properties.get(REFRESH_PERIOD_PROPERTY) {
            Some(period) => Seconds::try_from(period)?.into(),
            None => defaults.refresh_period,
        };
        let timeout = match properties.get(TIMEOUT_PROPERTY) {
            Some(timeout) => Seconds::try_from(timeout)?,
            None => defaults.timeout,
        };
        Ok(Config {
            url,
            refresh_period,
            timeout,
            proxy: Config::proxy(properties)?,
        })
    }

    /// Override the remote location, ex. from the command line.
    pub fn with_url<T: Into<String>>(self, url: T) -> Self {
        Config {
            url: url.into(),
            ..self
        }
    }

    fn proxy(properties: &Properties) -> Result<Option<String>> {
        let host = match properties.get(PROXY_HOST_PROPERTY).map(str::trim) {
            Some(host) if !host.is_empty() => host,
            _ => return Ok(None),
        };
        let port = match properties.get(PROXY_PORT_PROPERTY).map(str::trim) {
            Some(port) if !port.is_empty() => port.parse::<u16>().map_err(|err| {
                UCError::ConfigurationError(format!(
                    "Invalid {} value {}: {}",
                    PROXY_PORT_PROPERTY, port, err
                ))
            })?,
            _ => DEFAULT_PROXY_PORT,
        };
        Ok(Some(format!("{}:{}", host, port)))
    }
}

impl ConfigProperties for Config {
    fn url(&self) -> &str {
        &self.url
    }

    fn refresh_period(&self) -> Milliseconds {
        self.refresh_period
    }

    fn timeout(&self) -> Seconds {
        self.timeout
    }

    fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_on_empty_file() {
        let config = Config::new("".as_bytes()).unwrap();
        assert_eq!(DEFAULT_URL, config.url());
        assert_eq!(Milliseconds::new(3_600_000), config.refresh_period());
        assert_eq!(Seconds::new(30), config.timeout());
        assert_eq!(None, config.proxy());
    }

    #[test]
    fn test_config_all_values() {
        let data = r#"
        # update center
        sonar.updatecenter.url=http://localhost:9000/uc.properties
        uc.refresh_period=30m
        uc.timeout=5s
        uc.proxy.host=10.0.0.1
        uc.proxy.port=8080
        "#;
        let config = Config::new(data.as_bytes()).unwrap();
        assert_eq!("http://localhost:9000/uc.properties", config.url());
        assert_eq!(Milliseconds::new(1_800_000), config.refresh_period());
        assert_eq!(Seconds::new(5), config.timeout());
        assert_eq!(Some("10.0.0.1:8080"), config.proxy());
    }

    #[test]
    fn test_config_proxy_default_port() {
        let config = Config::new("uc.proxy.host=proxy.local".as_bytes()).unwrap();
        assert_eq!(Some("proxy.local:80"), config.proxy());
    }

    #[test]
    fn test_config_invalid_proxy_port_is_configuration_error() {
        let data = "uc.proxy.host=proxy.local\nuc.proxy.port=http";
        let err = Config::new(data.as_bytes()).unwrap_err();
        match err.downcast_ref::<UCError>() {
            Some(UCError::ConfigurationError(_)) => (),
            _ => panic!("Expected ConfigurationError"),
        }
    }

    #[test]
    fn test_config_invalid_refresh_period_is_time_conversion_error() {
        let err = Config::new("uc.refresh_period=1x".as_bytes()).unwrap_err();
        match err.downcast_ref::<UCError>() {
            Some(UCError::TimeConversionError(_)) => (),
            _ => panic!("Expected TimeConversionError"),
        }
    }

    #[test]
    fn test_config_with_url_override() {
        let config = Config::default().with_url("http://other/uc.properties");
        assert_eq!("http://other/uc.properties", config.url());
        assert_eq!(Seconds::new(30), config.timeout());
    }
}
