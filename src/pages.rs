use crate::fragments;
use crate::utils;
use futures::future::LocalBoxFuture;
use futures::FutureExt;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

/// Retrieves the raw text served at a site path.
pub trait PageFetcher {
    fn fetch_text<'a>(&'a self, path: &'a str) -> LocalBoxFuture<'a, Result<String, String>>;
}

pub struct HttpPageFetcher;

impl PageFetcher for HttpPageFetcher {
    fn fetch_text<'a>(&'a self, path: &'a str) -> LocalBoxFuture<'a, Result<String, String>> {
        async move {
            utils::fetch_text(path)
                .await
                .map_err(utils::js_error_message)
        }
        .boxed_local()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub raw: String,
    pub blocks: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEntry {
    Loaded(Page),
    Failed { message: String },
}

/// First-result-wins memo of fetched pages, errors included.
#[derive(Default)]
pub struct PageCache {
    entries: RefCell<HashMap<String, PageEntry>>,
}

impl PageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<PageEntry> {
        self.entries.borrow().get(path).cloned()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub async fn fetch_page(&self, fetcher: &dyn PageFetcher, path: &str) -> PageEntry {
        if let Some(entry) = self.get(path) {
            return entry;
        }

        let entry = match fetcher.fetch_text(path).await {
            Ok(raw) => {
                let blocks = fragments::extract_sections(&raw);
                PageEntry::Loaded(Page { raw, blocks })
            }
            Err(message) => PageEntry::Failed { message },
        };

        // Another fetch of the same path may have landed while this one was
        // pending; the earlier write stays.
        self.entries
            .borrow_mut()
            .entry(path.to_string())
            .or_insert(entry)
            .clone()
    }
}
