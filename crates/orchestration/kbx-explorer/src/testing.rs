//! In-memory backup store for unit tests.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use kbx_error::{Result, StorageError};
use kbx_traits::{ContentFetcher, ListEntry, StorageLister};

use crate::content::tests::gzip;

/// Objects keyed by full storage key, listed hierarchically on `/`.
#[derive(Default)]
pub(crate) struct MemoryStore {
    objects: BTreeMap<String, Bytes>,
    failing_lists: HashSet<String>,
    failing_fetches: HashSet<String>,
    list_delay: Option<Duration>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    listed: Mutex<Vec<String>>,
    fetched: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Add an object holding the gzip-compressed `text`.
    pub(crate) fn with_text(mut self, key: &str, text: &str) -> Self {
        self.objects
            .insert(key.to_string(), Bytes::from(gzip(text.as_bytes())));
        self
    }

    /// Add an object with raw bytes.
    pub(crate) fn with_raw(mut self, key: &str, raw: &[u8]) -> Self {
        self.objects
            .insert(key.to_string(), Bytes::copy_from_slice(raw));
        self
    }

    pub(crate) fn fail_list(mut self, prefix: &str) -> Self {
        self.failing_lists.insert(prefix.to_string());
        self
    }

    pub(crate) fn fail_fetch(mut self, key: &str) -> Self {
        self.failing_fetches.insert(key.to_string());
        self
    }

    /// Make every listing take `delay`.
    pub(crate) fn with_list_delay(mut self, delay: Duration) -> Self {
        self.list_delay = Some(delay);
        self
    }

    /// Highest number of listings that were in progress at once.
    pub(crate) fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Prefixes listed so far, in call order.
    pub(crate) fn listed(&self) -> Vec<String> {
        self.listed.lock().unwrap().clone()
    }

    /// Keys fetched so far, in call order.
    pub(crate) fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl StorageLister for MemoryStore {
    async fn list_children(&self, prefix: &str) -> Result<Vec<ListEntry>> {
        self.listed.lock().unwrap().push(prefix.to_string());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.list_delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing_lists.contains(prefix) {
            return Err(StorageError::List {
                prefix: prefix.to_string(),
                message: "injected failure".to_string(),
            }
            .into());
        }

        let mut entries: Vec<ListEntry> = Vec::new();
        for key in self.objects.keys().filter(|k| k.starts_with(prefix)) {
            let rest = &key[prefix.len()..];
            match rest.find('/') {
                Some(idx) => {
                    let partition = format!("{prefix}{}", &rest[..=idx]);
                    // Keys sharing a prefix are contiguous in sorted order
                    if entries.last().map(|e| &e.key) != Some(&partition) {
                        entries.push(ListEntry::partition(partition));
                    }
                }
                None => entries.push(ListEntry::leaf(key.clone())),
            }
        }

        Ok(entries)
    }
}

#[async_trait]
impl ContentFetcher for MemoryStore {
    async fn fetch_content(&self, key: &str) -> Result<Bytes> {
        self.fetched.lock().unwrap().push(key.to_string());

        if self.failing_fetches.contains(key) {
            return Err(StorageError::Fetch {
                key: key.to_string(),
                message: "injected failure".to_string(),
            }
            .into());
        }

        self.objects.get(key).cloned().ok_or_else(|| {
            StorageError::Fetch {
                key: key.to_string(),
                message: "no such key".to_string(),
            }
            .into()
        })
    }
}

pub(crate) const SECURITY: &str = "topics/neptunedb-security/";
pub(crate) const REPORTS: &str = "topics/neptunedb-reports/";

/// Full key of a data file below `topic_prefix`.
pub(crate) fn data_key(topic_prefix: &str, y: u32, m: u32, d: u32, h: u32, file: &str) -> String {
    format!("{topic_prefix}year={y}/month={m:02}/day={d:02}/hour={h:02}/{file}")
}

/// Two well-formed topics around early November 2023 plus one foreign layout.
pub(crate) fn backup_store() -> MemoryStore {
    MemoryStore::new()
        .with_text(
            &data_key(SECURITY, 2023, 10, 31, 23, "neptunedb-security+0+0000000001.json.gz"),
            r#"{"type":"gs.event.db.datachange.neptune.actions","id":1}"#,
        )
        .with_text(
            &data_key(SECURITY, 2023, 11, 1, 0, "neptunedb-security+0+0000000002.json.gz"),
            r#"{"type":"gs.event.db.datachange.neptune.actions","id":2}"#,
        )
        .with_text(
            &data_key(SECURITY, 2023, 11, 2, 10, "neptunedb-security+0+0000000003.json.gz"),
            r#"{"type":"gs.event.audit.login","id":3}"#,
        )
        .with_text(
            &data_key(SECURITY, 2023, 11, 3, 15, "neptunedb-security+1+0000000000.json.gz"),
            r#"{"type":"gs.event.db.datachange.neptune.actions","id":4}"#,
        )
        .with_text(
            &data_key(SECURITY, 2023, 11, 4, 0, "neptunedb-security+0+0000000004.json.gz"),
            r#"{"type":"gs.event.db.datachange.neptune.actions","id":5}"#,
        )
        .with_text(
            &data_key(SECURITY, 2023, 12, 1, 0, "neptunedb-security+0+0000000005.json.gz"),
            r#"{"type":"gs.event.db.datachange.neptune.actions","id":6}"#,
        )
        .with_text(
            &data_key(REPORTS, 2022, 5, 10, 8, "neptunedb-reports+0+0000000000.json.gz"),
            r#"{"report":"Potsdam weekly","station":"Glieneckerbruecke"}"#,
        )
        .with_text(
            &data_key(REPORTS, 2023, 11, 2, 11, "neptunedb-reports+0+0000000001.json.gz"),
            r#"{"type":"gs.event.db.datachange.reports","id":7}"#,
        )
        .with_text("topics/unknownformat/xyz", "gs.event.db.datachange")
}
