//! spalite headless driver.
//!
//! Loads a static site from a directory and replays a sequence of
//! in-place navigations against it, logging every swap, fallback and
//! history step:
//!
//! ```text
//! spalite-app <site-dir> /pricing /services back back forward
//! ```
//!
//! `back` and `forward` move through session history and replay the
//! resulting popstate. `SPALITE_CONFIG` may point at a TOML navigation
//! config; `SPALITE_ORIGIN` overrides the origin the site is served from.

mod fs_fetcher;
mod script;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use futures::executor::block_on;

use spalite_nav::config::NavConfig;
use spalite_nav::headless::HeadlessPage;
use spalite_nav::{NavigationController, PageHost};

use fs_fetcher::FsFetcher;
use script::Step;

const DEFAULT_ORIGIN: &str = "http://localhost";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let Some(site_dir) = args.next().map(PathBuf::from) else {
        bail!("usage: spalite-app <site-dir> <path|back|forward>...");
    };
    let steps: Vec<Step> = args.map(|a| Step::parse(&a)).collect();

    let config = load_config()?;
    let origin = std::env::var("SPALITE_ORIGIN").unwrap_or_else(|_| DEFAULT_ORIGIN.to_string());
    let origin = origin.trim_end_matches('/');

    let index = site_dir.join(config.index_path().trim_start_matches('/'));
    let html = std::fs::read_to_string(&index)
        .with_context(|| format!("reading entry page {}", index.display()))?;
    let page = HeadlessPage::load(&format!("{origin}/"), &html, &config.content_region_id);
    log::info!(
        "Loaded {} from {} ({} step(s))",
        page.location(),
        site_dir.display(),
        steps.len()
    );

    let controller = NavigationController::new(config, page, FsFetcher::new(&site_dir))?;
    controller.on_page_changed(|event| log::debug!("page changed: {}", event.url));
    controller.start();

    for step in &steps {
        let report = block_on(script::run_step(&controller, step));
        log::info!("{step}: {report}");
    }

    script::summarize(&controller);
    Ok(())
}

fn load_config() -> Result<NavConfig> {
    match std::env::var("SPALITE_CONFIG") {
        Ok(path) => {
            let source =
                std::fs::read_to_string(&path).with_context(|| format!("reading config {path}"))?;
            let config = NavConfig::from_toml(&source)?;
            config.validate()?;
            log::info!("Using navigation config from {path}");
            Ok(config)
        },
        Err(_) => Ok(NavConfig::default()),
    }
}
