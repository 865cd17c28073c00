use std::io::Write;
use std::sync::Arc;

use crate::cache::RefreshingCache;
use crate::cli::{CliOptions, PluginsOptions};
use crate::error;
use crate::io::Downloader;
use crate::logging::Logger;
use crate::proxy::{describe_proxies, ProxySelector};
use crate::time::Clock;
use crate::update_center::{Plugin, Release, UpdateCenter, UpdateCenterDeserializer, Version};
use crate::Result;

pub type UpdateCenterCache<D, C, L> = RefreshingCache<D, UpdateCenterDeserializer, C, L>;

pub fn execute<D: Downloader, C: Clock, L: Logger, W: Write>(
    options: CliOptions,
    cache: &UpdateCenterCache<D, C, L>,
    proxy_selector: &dyn ProxySelector,
    writer: &mut W,
) -> Result<()> {
    match options {
        CliOptions::Show { refresh } => show(&*update_center(cache, refresh)?, writer),
        CliOptions::Plugins(options) => {
            plugins(&*update_center(cache, options.refresh)?, &options, writer)
        }
        CliOptions::Proxies => {
            writeln!(writer, "{}", describe_proxies(cache.url(), proxy_selector)?)?;
            Ok(())
        }
        CliOptions::Status { refresh } => status(cache, refresh, writer),
    }
}

fn update_center<D: Downloader, C: Clock, L: Logger>(
    cache: &UpdateCenterCache<D, C, L>,
    refresh: bool,
) -> Result<Arc<UpdateCenter>> {
    cache.get(refresh).ok_or_else(|| {
        error::gen(format!(
            "No update center data available from {}. Run with -v for details.",
            cache.url()
        ))
    })
}

fn show<W: Write>(center: &UpdateCenter, writer: &mut W) -> Result<()> {
    writeln!(writer, "Date: {}", center.date.as_deref().unwrap_or("-"))?;
    let versions: Vec<&str> = center.sonar_versions.iter().map(Version::as_str).collect();
    writeln!(writer, "Sonar versions: {}", versions.join(", "))?;
    writeln!(writer, "Plugins: {}", center.plugins.len())?;
    Ok(())
}

fn plugins<W: Write>(
    center: &UpdateCenter,
    options: &PluginsOptions,
    writer: &mut W,
) -> Result<()> {
    let sonar_version = options.sonar_version.as_deref().map(Version::new);
    let selected: Vec<(&Plugin, Option<&Release>)> = center
        .plugins
        .iter()
        .map(|plugin| {
            let release = match &sonar_version {
                Some(version) => plugin
                    .compatible_releases(version)
                    .into_iter()
                    .max_by(|a, b| a.version.cmp(&b.version)),
                None => plugin.last_release(),
            };
            (plugin, release)
        })
        .filter(|(_, release)| sonar_version.is_none() || release.is_some())
        .collect();
    if options.json {
        let json: Vec<serde_json::Value> = selected
            .iter()
            .map(|(plugin, release)| {
                serde_json::json!({
                    "key": plugin.key,
                    "name": plugin.name,
                    "release": release,
                })
            })
            .collect();
        writeln!(writer, "{}", serde_json::to_string_pretty(&json)?)?;
        return Ok(());
    }
    for (plugin, release) in selected {
        let version = release.map(|r| r.version.as_str()).unwrap_or("-");
        writeln!(writer, "{} | {} | {}", plugin.key, plugin.name, version)?;
    }
    Ok(())
}

fn status<D: Downloader, C: Clock, L: Logger, W: Write>(
    cache: &UpdateCenterCache<D, C, L>,
    refresh: bool,
    writer: &mut W,
) -> Result<()> {
    let available = cache.get(refresh).is_some();
    let last_refresh = cache
        .last_refresh_time()
        .and_then(|time| time.to_local())
        .map(|date| date.format("%Y-%m-%d %H:%M:%S %z").to_string())
        .unwrap_or_else(|| "never".to_string());
    writeln!(writer, "URL: {}", cache.url())?;
    writeln!(writer, "Last refresh: {}", last_refresh)?;
    writeln!(
        writer,
        "Data: {}",
        if available { "available" } else { "unavailable" }
    )?;
    Ok(())
}
