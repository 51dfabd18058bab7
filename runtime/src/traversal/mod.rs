//! Category traversal: one browser session, root page, subcategories, items.

pub mod orchestrator;
pub mod session;

pub use orchestrator::Traversal;
pub use session::TraversalSession;

use crate::error::TraversalError;
use crate::model::CatalogItem;
use serde::{Deserialize, Serialize};

/// Everything one traversal produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraversalReport {
    pub category: String,
    /// Subcategory discovery order, then tile order within each page.
    pub items: Vec<CatalogItem>,
    pub subcategories_found: usize,
    pub subcategories_visited: usize,
    /// The time budget stopped the traversal before every subcategory was visited.
    pub budget_exhausted: bool,
    /// Whether the root page loaded without being blocked.
    pub root_loaded: bool,
    pub elapsed_ms: u64,
}

impl TraversalReport {
    /// A report with no items, labelled with `category`.
    pub fn empty(category: String) -> Self {
        Self {
            category,
            items: Vec::new(),
            subcategories_found: 0,
            subcategories_visited: 0,
            budget_exhausted: false,
            root_loaded: false,
            elapsed_ms: 0,
        }
    }

    pub fn total_items(&self) -> usize {
        self.items.len()
    }
}

/// Scheme, host and port of `target`, plus the bare host.
///
/// Only `http` and `https` URLs with a host are accepted.
pub fn domain_base(target: &str) -> Result<(String, String), TraversalError> {
    let invalid = |reason: &str| TraversalError::InvalidTarget {
        url: target.to_string(),
        reason: reason.to_string(),
    };

    let url = url::Url::parse(target.trim()).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    let host = url.host_str().ok_or_else(|| invalid("missing host"))?;

    let base = match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    };
    Ok((base, host.to_string()))
}
