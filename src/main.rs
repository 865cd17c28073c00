use std::fs::File;

use env_logger::Env;
use uc::{
    cache::{RefreshPolicy, RefreshingCache},
    cli::parse_cli,
    cmds,
    config::{Config, ConfigProperties},
    error::AddContext,
    http::HttpDownloader,
    proxy::{EnvProxySelector, FixedProxySelector, ProxyRoute, ProxySelector},
    update_center::UpdateCenterDeserializer,
    Result,
};

fn main() -> Result<()> {
    let option_args = parse_cli();
    let cli_args = option_args.cli_args;
    if cli_args.verbose {
        let env = Env::default().default_filter_or("info");
        env_logger::init_from_env(env);
    }
    let config = match &cli_args.config {
        Some(path) => {
            let f = File::open(path).err_context(format!("Unable to open config file {}", path))?;
            Config::new(f)?
        }
        None => Config::default(),
    };
    let config = match cli_args.url {
        Some(url) => config.with_url(url),
        None => config,
    };
    let proxy_selector: Box<dyn ProxySelector> = match config.proxy() {
        Some(address) => Box::new(FixedProxySelector::new(vec![ProxyRoute::Proxied(
            address.to_string(),
        )])),
        None => Box::new(EnvProxySelector::new()),
    };
    let cache = RefreshingCache::new(
        RefreshPolicy::from_config(&config),
        HttpDownloader::new(&config, proxy_selector.as_ref())?,
        UpdateCenterDeserializer,
        proxy_selector.as_ref(),
    )?;
    let stdout = std::io::stdout();
    cmds::execute(
        option_args.cli_options,
        &cache,
        proxy_selector.as_ref(),
        &mut stdout.lock(),
    )
}
