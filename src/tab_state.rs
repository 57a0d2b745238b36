/// Per-tab cache of resolved go links

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::link_data::{LinkEntry, TabId, TabRecord};

/// Proof that a resolution was started for a given tab and URL.
///
/// Sequence numbers come from one counter for the whole store, so a ticket
/// issued before a tab was removed can never match anything afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub tab_id: TabId,
    pub url: String,
    seq: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StaleResolution {
    #[error("tab {0} is no longer tracked")]
    TabGone(TabId),
    #[error("tab {tab_id} already holds a newer resolution than {url}")]
    Superseded { tab_id: TabId, url: String },
}

/// Where a tab sits in its resolve cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabPhase {
    Unknown,
    Resolving { url: String },
    Resolved { has_links: bool },
}

#[derive(Debug, Default)]
struct TabSlot {
    record: Option<TabRecord>,
    record_seq: u64,
    latest_seq: u64,
    pending_url: Option<String>,
}

#[derive(Debug, Default)]
pub struct TabStateStore {
    tabs: HashMap<TabId, TabSlot>,
    next_seq: u64,
}

impl TabStateStore {
    pub fn new() -> Self {
        TabStateStore::default()
    }

    pub fn get(&self, tab_id: TabId) -> Option<TabRecord> {
        self.tabs.get(&tab_id).and_then(|slot| slot.record.clone())
    }

    pub fn phase(&self, tab_id: TabId) -> TabPhase {
        match self.tabs.get(&tab_id) {
            None => TabPhase::Unknown,
            Some(slot) => match (&slot.pending_url, &slot.record) {
                (Some(url), _) => TabPhase::Resolving { url: url.clone() },
                (None, Some(record)) => TabPhase::Resolved {
                    has_links: record.has_links(),
                },
                (None, None) => TabPhase::Unknown,
            },
        }
    }

    /// Start tracking a resolution of `url` for `tab_id`
    pub fn begin(&mut self, tab_id: TabId, url: &str) -> Ticket {
        self.next_seq += 1;
        let seq = self.next_seq;

        let slot = self.tabs.entry(tab_id).or_default();
        slot.latest_seq = seq;
        slot.pending_url = Some(url.to_string());

        Ticket {
            tab_id,
            url: url.to_string(),
            seq,
        }
    }

    /// Store the outcome of a resolution, replacing the record wholesale.
    ///
    /// Rejected when the tab was removed since `begin`, or when a resolution
    /// that started later has already been stored.
    pub fn commit(
        &mut self,
        ticket: Ticket,
        links: Vec<LinkEntry>,
        now: f64,
    ) -> Result<TabRecord, StaleResolution> {
        let Some(slot) = self.tabs.get_mut(&ticket.tab_id) else {
            return Err(StaleResolution::TabGone(ticket.tab_id));
        };

        if ticket.seq <= slot.record_seq {
            return Err(StaleResolution::Superseded {
                tab_id: ticket.tab_id,
                url: ticket.url,
            });
        }

        let record = TabRecord {
            tab_id: ticket.tab_id,
            url: ticket.url,
            resolved_links: links,
            last_resolved_at: now,
        };

        slot.record = Some(record.clone());
        slot.record_seq = ticket.seq;
        if ticket.seq == slot.latest_seq {
            slot.pending_url = None;
        }

        Ok(record)
    }

    /// Replace a tab's record outright, outside of any resolution cycle
    pub fn put(&mut self, tab_id: TabId, url: &str, links: Vec<LinkEntry>, now: f64) -> TabRecord {
        let ticket = self.begin(tab_id, url);
        let record = TabRecord {
            tab_id,
            url: ticket.url,
            resolved_links: links,
            last_resolved_at: now,
        };

        let slot = self.tabs.entry(tab_id).or_default();
        slot.record = Some(record.clone());
        slot.record_seq = ticket.seq;
        slot.pending_url = None;

        record
    }

    /// Reinstate a record saved by an earlier run.
    ///
    /// Ignored when the tab is already tracked, since anything tracked here is
    /// at least as new as what was saved.
    pub fn restore(&mut self, record: TabRecord) -> bool {
        if self.tabs.contains_key(&record.tab_id) {
            return false;
        }
        self.next_seq += 1;
        let slot = TabSlot {
            record_seq: self.next_seq,
            latest_seq: self.next_seq,
            pending_url: None,
            record: Some(record.clone()),
        };
        self.tabs.insert(record.tab_id, slot);
        true
    }

    pub fn remove(&mut self, tab_id: TabId) -> bool {
        self.tabs.remove(&tab_id).is_some()
    }

    /// Drop every tab not in `open`, returning the ones dropped
    pub fn retain(&mut self, open: &HashSet<TabId>) -> Vec<TabId> {
        let dropped: Vec<TabId> = self
            .tabs
            .keys()
            .filter(|tab_id| !open.contains(tab_id))
            .copied()
            .collect();
        for tab_id in &dropped {
            self.tabs.remove(tab_id);
        }
        dropped
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tab(id: i32) -> TabId {
        TabId::new(id)
    }

    fn docs_link() -> LinkEntry {
        LinkEntry::new("/docs", "https://docs.example/readme")
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = TabStateStore::new();

        assert!(store.is_empty());
        assert_eq!(store.get(tab(1)), None);
        assert_eq!(store.phase(tab(1)), TabPhase::Unknown);
    }

    #[test]
    fn test_begin_then_commit() {
        let mut store = TabStateStore::new();

        let ticket = store.begin(tab(1), "https://docs.example/readme");
        assert_eq!(
            store.phase(tab(1)),
            TabPhase::Resolving { url: "https://docs.example/readme".to_string() }
        );

        let record = store.commit(ticket, vec![docs_link()], 1000.0).unwrap();

        assert_eq!(record.url, "https://docs.example/readme");
        assert_eq!(store.get(tab(1)), Some(record));
        assert_eq!(store.phase(tab(1)), TabPhase::Resolved { has_links: true });
    }

    #[test]
    fn test_older_result_does_not_overwrite_newer() {
        let mut store = TabStateStore::new();

        let a = store.begin(tab(1), "https://a.example/");
        let b = store.begin(tab(1), "https://b.example/");

        store.commit(b, vec![docs_link()], 2.0).unwrap();
        let stale = store.commit(a, vec![], 3.0);

        assert_eq!(
            stale,
            Err(StaleResolution::Superseded {
                tab_id: tab(1),
                url: "https://a.example/".to_string(),
            })
        );
        let record = store.get(tab(1)).unwrap();
        assert_eq!(record.url, "https://b.example/");
        assert_eq!(record.resolved_links, vec![docs_link()]);
    }

    #[test]
    fn test_older_result_arriving_first_keeps_tab_resolving() {
        let mut store = TabStateStore::new();

        let a = store.begin(tab(1), "https://a.example/");
        let b = store.begin(tab(1), "https://b.example/");

        store.commit(a, vec![], 1.0).unwrap();
        assert_eq!(
            store.phase(tab(1)),
            TabPhase::Resolving { url: "https://b.example/".to_string() }
        );

        store.commit(b, vec![docs_link()], 2.0).unwrap();
        assert_eq!(store.get(tab(1)).unwrap().url, "https://b.example/");
        assert_eq!(store.phase(tab(1)), TabPhase::Resolved { has_links: true });
    }

    #[test]
    fn test_commit_after_remove_is_discarded() {
        let mut store = TabStateStore::new();

        let ticket = store.begin(tab(1), "https://a.example/");
        assert!(store.remove(tab(1)));

        assert_eq!(store.commit(ticket, vec![], 1.0), Err(StaleResolution::TabGone(tab(1))));
        assert_eq!(store.get(tab(1)), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_put_replaces_record_and_supersedes_in_flight() {
        let mut store = TabStateStore::new();

        let in_flight = store.begin(tab(1), "https://a.example/");
        store.put(tab(1), "chrome://newtab/", vec![], 5.0);

        assert!(store.commit(in_flight, vec![docs_link()], 6.0).is_err());
        let record = store.get(tab(1)).unwrap();
        assert_eq!(record.url, "chrome://newtab/");
        assert!(record.resolved_links.is_empty());
    }

    #[test]
    fn test_tabs_are_independent() {
        let mut store = TabStateStore::new();

        let one = store.begin(tab(1), "https://a.example/");
        let two = store.begin(tab(2), "https://b.example/");

        store.commit(two, vec![docs_link()], 1.0).unwrap();
        store.commit(one, vec![], 2.0).unwrap();

        assert_eq!(store.get(tab(1)).unwrap().url, "https://a.example/");
        assert_eq!(store.get(tab(2)).unwrap().url, "https://b.example/");
    }

    #[test]
    fn test_retain_drops_closed_tabs() {
        let mut store = TabStateStore::new();
        store.put(tab(1), "https://a.example/", vec![], 1.0);
        store.put(tab(2), "https://b.example/", vec![], 1.0);
        store.put(tab(3), "https://c.example/", vec![], 1.0);

        let open: HashSet<TabId> = [tab(2)].into_iter().collect();
        let mut dropped = store.retain(&open);
        dropped.sort_by_key(|tab_id| tab_id.get());

        assert_eq!(dropped, vec![tab(1), tab(3)]);
        assert_eq!(store.len(), 1);
        assert!(store.get(tab(2)).is_some());
    }

    #[test]
    fn test_restore_only_fills_untracked_tabs() {
        let mut store = TabStateStore::new();
        let saved = TabRecord {
            tab_id: tab(1),
            url: "https://old.example/".to_string(),
            resolved_links: vec![LinkEntry::new("/old", "https://old.example/")],
            last_resolved_at: 1.0,
        };

        assert!(store.restore(saved.clone()));
        assert_eq!(store.get(tab(1)), Some(saved.clone()));
        assert_eq!(store.phase(tab(1)), TabPhase::Resolved { has_links: true });

        store.put(tab(2), "https://new.example/", vec![], 2.0);
        assert!(!store.restore(TabRecord { tab_id: tab(2), ..saved }));
        assert_eq!(store.get(tab(2)).unwrap().url, "https://new.example/");
    }

    #[test]
    fn test_resolution_after_restore_wins() {
        let mut store = TabStateStore::new();
        store.restore(TabRecord {
            tab_id: tab(1),
            url: "https://old.example/".to_string(),
            resolved_links: vec![],
            last_resolved_at: 1.0,
        });

        let ticket = store.begin(tab(1), "https://new.example/");
        assert!(store.commit(ticket, vec![], 2.0).is_ok());
        assert_eq!(store.get(tab(1)).unwrap().url, "https://new.example/");
    }
}
