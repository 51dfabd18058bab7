//! `pricewalk scrape <URL>`: one traversal, printed as a table or JSON.

use crate::catalog::profile::SiteProfile;
use crate::cli::output::{self, Styled};
use crate::cli::progress;
use crate::config::{BrowserEndpoint, TraversalConfig};
use crate::events::EventBus;
use crate::renderer::chromium::ChromiumConnector;
use crate::rest;
use crate::traversal::{Traversal, TraversalReport};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

/// Overrides from the command line.
#[derive(Debug, Clone, Default)]
pub struct ScrapeOptions {
    pub budget_secs: Option<u64>,
    pub max_retries: Option<u32>,
    pub local: bool,
}

/// Environment config with command-line overrides applied.
pub fn effective_config(opts: &ScrapeOptions) -> TraversalConfig {
    let mut config = TraversalConfig::from_env();
    if let Some(secs) = opts.budget_secs {
        config.time_budget = Duration::from_secs(secs);
    }
    if let Some(n) = opts.max_retries {
        config.max_attempts = n.max(1);
    }
    config
}

pub async fn run(url: &str, opts: ScrapeOptions) -> Result<()> {
    let endpoint = if opts.local {
        BrowserEndpoint::local_from_env()
    } else {
        BrowserEndpoint::remote_from_env()
    };
    let events = Arc::new(EventBus::default());
    let traversal = Traversal::new(
        Arc::new(ChromiumConnector),
        endpoint,
        effective_config(&opts),
        SiteProfile::embedded().clone(),
        Arc::clone(&events),
    );

    let show_progress = !output::is_quiet() && !output::is_json();
    let spinner = show_progress.then(|| {
        let bar = progress::create_spinner(&format!("Traversing {url}"));
        let follower = progress::follow(&events, bar.clone());
        (bar, follower)
    });

    let result = traversal.run(url).await;

    if let Some((bar, follower)) = spinner {
        follower.abort();
        bar.finish_and_clear();
    }

    let report = result?;

    if output::is_json() {
        output::print_json(&rest::success_envelope(&report));
        return Ok(());
    }

    print_table(&report);
    if !output::is_quiet() {
        print_summary(&Styled::new(), &report);
    }
    Ok(())
}

fn print_table(report: &TraversalReport) {
    println!(
        "{:<20} {:<40} {:>12} {:<14} {:>14} {:<8}",
        "SUBCATEGORY", "ITEM", "PRICE", "QTY", "UNIT PRICE", "PER"
    );
    for item in &report.items {
        println!(
            "{:<20} {:<40} {:>12} {:<14} {:>14.2} {:<8}",
            output::truncate(&item.subcategory, 20),
            output::truncate(&item.item_name, 40),
            output::truncate(&item.raw_price, 12),
            output::truncate(&item.unit_quantity, 14),
            item.base_unit_price,
            item.base_unit,
        );
    }
}

fn print_summary(s: &Styled, report: &TraversalReport) {
    eprintln!();
    output::print_header(s);
    output::print_check(s.ok_sym(), "Category", &report.category);
    output::print_check(
        s.ok_sym(),
        "Items",
        &report.total_items().to_string(),
    );

    let visited = format!(
        "{}/{}",
        report.subcategories_visited, report.subcategories_found
    );
    if report.budget_exhausted {
        output::print_check(s.warn_sym(), "Subcategories", &visited);
        output::print_detail(&s.yellow("time budget reached, results are partial"));
    } else {
        output::print_check(s.ok_sym(), "Subcategories", &visited);
    }
    if !report.root_loaded {
        output::print_check(s.fail_sym(), "Root page", &s.red("blocked or unreachable"));
    }
    output::print_check(
        s.ok_sym(),
        "Elapsed",
        &output::format_elapsed(report.elapsed_ms),
    );
}
