// Property holding the location of the update center descriptor.
pub const URL_PROPERTY: &str = "sonar.updatecenter.url";

pub const DEFAULT_URL: &str = "http://update.sonarsource.org/update-center.properties";

// Refresh the descriptor at most once per hour.
pub const REFRESH_PERIOD_MILLISECONDS: u64 = 60 * 60 * 1000;

// Global timeout for a single download, connect + read.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

// Port used when a proxy host is configured without a port.
pub const DEFAULT_PROXY_PORT: u16 = 80;

pub const REFRESH_PERIOD_PROPERTY: &str = "uc.refresh_period";
pub const TIMEOUT_PROPERTY: &str = "uc.timeout";
pub const PROXY_HOST_PROPERTY: &str = "uc.proxy.host";
pub const PROXY_PORT_PROPERTY: &str = "uc.proxy.port";
