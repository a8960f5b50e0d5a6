//! Driver contract: pluggable adapters to remote image sources.
//!
//! Drivers are registered once at startup through [`DriverRegistryBuilder`];
//! the resulting [`DriverRegistry`] is immutable.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::DriverError;

/// Which item to ask a driver for.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Locator {
    /// Any fresh item.
    #[default]
    Fresh,
    /// A specific item, optionally at a page. Drivers advance one page when
    /// asked for the page they last returned.
    Item { id: String, page: Option<String> },
}

impl Locator {
    /// Parse `"id/page"`. Parts are trimmed and empty parts dropped, so `""`
    /// and `"/"` are [`Locator::Fresh`].
    pub fn parse(s: &str) -> Self {
        let mut parts = s.split('/').map(str::trim).filter(|p| !p.is_empty());
        match parts.next() {
            Some(id) => Self::Item {
                id: id.to_string(),
                page: parts.next().map(str::to_string),
            },
            None => Self::Fresh,
        }
    }

    pub fn item(id: impl Into<String>, page: impl Into<String>) -> Self {
        Self::Item {
            id: id.into(),
            page: Some(page.into()),
        }
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self, Self::Fresh)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fresh => Ok(()),
            Self::Item { id, page: None } => f.write_str(id),
            Self::Item {
                id,
                page: Some(page),
            } => write!(f, "{id}/{page}"),
        }
    }
}

/// An item returned by [`Driver::next`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverItem {
    pub id: String,
    pub page: String,
    pub url: String,
    /// Locator to request next time to continue from this item.
    pub locator: Locator,
}

/// An item returned by [`Driver::preload`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreloadItem {
    pub id: String,
    pub page: String,
    pub url: String,
    /// Items now buffered ahead.
    pub amount: usize,
}

/// A remote image source.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Registry key, e.g. `"pixiv"`.
    fn id(&self) -> &str;

    /// Human-readable name.
    fn name(&self) -> &str;

    /// Fetch the item at `locator`. `Ok(None)` means the source is exhausted
    /// (or returned a duplicate); callers retry with [`Locator::Fresh`].
    async fn next(&self, locator: &Locator) -> Result<Option<DriverItem>, DriverError>;

    /// Advance the read-ahead buffer by at most one item, keeping at most
    /// `amount` buffered. `Ok(None)` when nothing more needs preloading.
    async fn preload(&self, amount: usize) -> Result<Option<PreloadItem>, DriverError>;
}

// ─── Registry ────────────────────────────────────────────────────────────

/// Drivers by key, in registration order.
#[derive(Clone, Default)]
pub struct DriverRegistry {
    drivers: Vec<(String, Arc<dyn Driver>)>,
}

impl fmt::Debug for DriverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.keys()).finish()
    }
}

impl DriverRegistry {
    pub fn builder() -> DriverRegistryBuilder {
        DriverRegistryBuilder::default()
    }

    pub fn get(&self, key: &str) -> Option<Arc<dyn Driver>> {
        self.drivers
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, d)| Arc::clone(d))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.drivers.iter().any(|(k, _)| k == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.drivers.iter().map(|(k, _)| k.as_str())
    }

    /// The first registered driver's key.
    pub fn default_key(&self) -> Option<&str> {
        self.drivers.first().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }
}

#[derive(Default)]
pub struct DriverRegistryBuilder {
    drivers: Vec<(String, Arc<dyn Driver>)>,
}

impl DriverRegistryBuilder {
    /// Register `driver` under its own [`Driver::id`]. A later registration
    /// with the same key replaces the earlier one in place.
    pub fn register(mut self, driver: Arc<dyn Driver>) -> Self {
        let key = driver.id().to_string();
        match self.drivers.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => {
                log::warn!("driver {key:?} registered twice; keeping the later one");
                slot.1 = driver;
            }
            None => self.drivers.push((key, driver)),
        }
        self
    }

    pub fn build(self) -> DriverRegistry {
        log::debug!("driver registry: {} drivers", self.drivers.len());
        DriverRegistry {
            drivers: self.drivers,
        }
    }
}
