//! In-memory cache of the remote update center descriptor.
//!
//! The descriptor is downloaded at most once per refresh period. A failed
//! download never discards a previously good model: callers keep getting the
//! last known one until a later download succeeds.

use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use url::Url;

use crate::api_defaults::REFRESH_PERIOD_MILLISECONDS;
use crate::config::ConfigProperties;
use crate::error::UCError;
use crate::io::{Downloader, Parser};
use crate::logging::{LogCrateLogger, Logger};
use crate::properties::Properties;
use crate::proxy::{describe_proxies, ProxySelector};
use crate::time::{Clock, Milliseconds, SystemClock};
use crate::{log_debug, Result};

#[derive(Builder, Clone, Debug, PartialEq)]
#[builder(pattern = "owned")]
pub struct RefreshPolicy {
    #[builder(setter(into))]
    url: String,
    #[builder(default = "Milliseconds::new(REFRESH_PERIOD_MILLISECONDS)")]
    period: Milliseconds,
}

impl RefreshPolicy {
    pub fn builder() -> RefreshPolicyBuilder {
        RefreshPolicyBuilder::default()
    }

    pub fn from_config(config: &impl ConfigProperties) -> Self {
        RefreshPolicy {
            url: config.url().to_string(),
            period: config.refresh_period(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn period(&self) -> Milliseconds {
        self.period
    }
}

/// Last good model and the time of the last completed download attempt.
/// Both are always read and written together.
#[derive(Debug)]
pub struct CacheEntry<M> {
    model: Option<Arc<M>>,
    last_refresh: Option<Milliseconds>,
}

impl<M> Default for CacheEntry<M> {
    fn default() -> Self {
        CacheEntry {
            model: None,
            last_refresh: None,
        }
    }
}

pub struct RefreshingCache<D, P: Parser, C = SystemClock, L = LogCrateLogger> {
    policy: RefreshPolicy,
    url: Url,
    downloader: D,
    parser: P,
    clock: C,
    logger: L,
    entry: RwLock<CacheEntry<P::Model>>,
    // Serializes downloads. Waiters re-check staleness once they get it.
    fetch_gate: Mutex<()>,
}

impl<D: Downloader, P: Parser> RefreshingCache<D, P> {
    pub fn new(
        policy: RefreshPolicy,
        downloader: D,
        parser: P,
        proxy_selector: &dyn ProxySelector,
    ) -> Result<Self> {
        RefreshingCache::with_collaborators(
            policy,
            downloader,
            parser,
            proxy_selector,
            SystemClock,
            LogCrateLogger,
        )
    }
}

impl<D: Downloader, P: Parser, C: Clock, L: Logger> RefreshingCache<D, P, C, L> {
    /// Fails with a configuration error if the policy URL is malformed.
    pub fn with_collaborators(
        policy: RefreshPolicy,
        downloader: D,
        parser: P,
        proxy_selector: &dyn ProxySelector,
        clock: C,
        logger: L,
    ) -> Result<Self> {
        let proxies = describe_proxies(policy.url(), proxy_selector)?;
        logger.info(&format!("Update center: {} ({})", policy.url(), proxies));
        let url = Url::parse(policy.url()).map_err(|err| {
            UCError::ConfigurationError(format!("Invalid URL {}: {}", policy.url(), err))
        })?;
        Ok(RefreshingCache {
            policy,
            url,
            downloader,
            parser,
            clock,
            logger,
            entry: RwLock::new(CacheEntry::default()),
            fetch_gate: Mutex::new(()),
        })
    }

    /// Current model, downloading it first when there is none yet, when
    /// `force_refresh` is set or when the refresh period has elapsed. `None`
    /// until a download succeeds.
    pub fn get(&self, force_refresh: bool) -> Option<Arc<P::Model>> {
        if force_refresh || self.needs_fetch() {
            let _gate = self
                .fetch_gate
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if force_refresh || self.needs_fetch() {
                self.refresh();
            }
        }
        self.read_entry().model.clone()
    }

    pub fn get_cached(&self) -> Option<Arc<P::Model>> {
        self.get(false)
    }

    /// Time of the last completed download attempt, successful or not.
    pub fn last_refresh_time(&self) -> Option<Milliseconds> {
        self.read_entry().last_refresh
    }

    pub fn policy(&self) -> &RefreshPolicy {
        &self.policy
    }

    pub fn url(&self) -> &str {
        self.policy.url()
    }

    fn needs_fetch(&self) -> bool {
        let entry = self.read_entry();
        match (&entry.model, entry.last_refresh) {
            // No model ever downloaded. Fetch whatever the clock says.
            (None, _) | (_, None) => true,
            (Some(_), Some(last_refresh)) => self.needs_refresh(last_refresh),
        }
    }

    fn needs_refresh(&self, last_refresh: Milliseconds) -> bool {
        last_refresh + self.policy.period() < self.clock.now()
    }

    fn refresh(&self) {
        let downloaded = match self.download() {
            Ok(model) => model,
            Err(err) => {
                self.logger.error(&format!(
                    "Fail to download data from update center: {:#}",
                    err
                ));
                None
            }
        };
        let now = self.clock.now();
        let mut entry = self.write_entry();
        if let Some(model) = downloaded {
            entry.model = Some(Arc::new(model));
        }
        entry.last_refresh = Some(now);
    }

    // The stream is consumed by the properties loader and dropped when it
    // returns, whatever the outcome.
    fn download(&self) -> Result<Option<P::Model>> {
        let Some(stream) = self.downloader.open_stream(&self.url)? else {
            log_debug!("No data from {}", self.url);
            return Ok(None);
        };
        let properties = Properties::load(stream)?;
        let model = self.parser.parse(&properties)?;
        Ok(Some(model))
    }

    fn read_entry(&self) -> RwLockReadGuard<'_, CacheEntry<P::Model>> {
        self.entry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_entry(&self) -> RwLockWriteGuard<'_, CacheEntry<P::Model>> {
        self.entry.write().unwrap_or_else(PoisonError::into_inner)
    }
}
