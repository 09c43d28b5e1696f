//! Navigation scripts for the headless driver.

use std::fmt;

use spalite_nav::headless::HeadlessPage;
use spalite_nav::host::{NavigationMode, PageFetcher, PageHost};
use spalite_nav::{NavigationController, NavigationOutcome};

/// One step of a navigation script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// In-place navigation to an `href`, as a link click would trigger.
    Visit(String),
    /// Browser back button.
    Back,
    /// Browser forward button.
    Forward,
}

impl Step {
    pub fn parse(arg: &str) -> Self {
        match arg {
            "back" => Step::Back,
            "forward" => Step::Forward,
            href => Step::Visit(href.to_string()),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Visit(href) => write!(f, "visit {href}"),
            Step::Back => write!(f, "back"),
            Step::Forward => write!(f, "forward"),
        }
    }
}

/// Execute a step and describe what happened.
pub async fn run_step<F: PageFetcher>(
    controller: &NavigationController<HeadlessPage, F>,
    step: &Step,
) -> String {
    let page = controller.host();
    let outcome = match step {
        Step::Visit(href) => controller.navigate(href, NavigationMode::Push).await,
        Step::Back | Step::Forward => {
            let moved = if *step == Step::Back {
                page.go_back()
            } else {
                page.go_forward()
            };
            if moved.is_none() {
                return "no history entry".to_string();
            }
            controller.handle_popstate().await
        },
    };
    describe(page, &outcome)
}

fn describe(page: &HeadlessPage, outcome: &NavigationOutcome) -> String {
    match outcome {
        NavigationOutcome::Swapped { url } => format!("{url} \"{}\"", page.title()),
        NavigationOutcome::Unchanged => "already on this page".to_string(),
        NavigationOutcome::Stale => "superseded".to_string(),
        NavigationOutcome::Failed(failure) => match page.native_loads().last() {
            Some(target) => format!("{failure}, full load of {target}"),
            None => failure.to_string(),
        },
    }
}

/// Log the final session state.
pub fn summarize<F: PageFetcher>(controller: &NavigationController<HeadlessPage, F>) {
    let page = controller.host();
    let history = page.history();
    log::info!(
        "Final page {} \"{}\", {} history entr{}, {}/{} cached page(s)",
        page.location(),
        page.title(),
        history.len(),
        if history.len() == 1 { "y" } else { "ies" },
        controller.cached_pages(),
        controller.config().cache_capacity
    );
    for entry in history.entries() {
        let marker = if std::ptr::eq(entry, history.current()) { ">" } else { " " };
        log::info!("{marker} {}", entry.url);
    }
    for url in controller.cached_urls() {
        log::debug!("cached {url}");
    }
    let current = page.current_links();
    if !current.is_empty() {
        log::info!("Current link(s): {}", current.join(", "));
    }
}
