/// Keeps every tab's cached go links in step with what the tab is showing

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use futures::future::join_all;
use log::{debug, info};

use crate::affordance::{Affordance, affordance};
use crate::link_data::{TabId, TabRecord, TabSnapshot};
use crate::link_name::is_resolvable_url;
use crate::lookup::{HttpTransport, LookupClient};
use crate::settings::SettingsSource;
use crate::tab_state::{TabPhase, TabStateStore};

pub type SharedStore = Rc<RefCell<TabStateStore>>;

/// Browser capabilities the controller relies on
#[allow(async_fn_in_trait)]
pub trait BrowserHost {
    async fn tab_url(&self, tab_id: TabId) -> Option<String>;
    async fn active_tab(&self) -> Option<TabSnapshot>;
    async fn open_tabs(&self) -> Vec<TabSnapshot>;
    fn show_affordance(&self, tab_id: TabId, affordance: &Affordance);
    /// Write a record to storage that outlives the background worker
    fn save_record(&self, record: &TabRecord);
    fn forget_records(&self, tab_ids: &[TabId]);
    async fn saved_records(&self) -> Vec<TabRecord>;
    /// Milliseconds since the epoch
    fn now_ms(&self) -> f64;
}

/// Tab lifecycle and navigation events, as delivered by the browser
#[derive(Debug, Clone, PartialEq)]
pub enum TabEvent {
    Created { tab_id: TabId, url: Option<String> },
    Updated { tab_id: TabId, complete: bool, url: Option<String> },
    Activated { tab_id: TabId },
    Removed { tab_id: TabId },
    /// The browser swapped `removed` out for `added`, e.g. a prerendered page
    Replaced { added: TabId, removed: TabId },
    UrlChanged { tab_id: TabId, url: String },
}

/// What handling an event did to the tab's state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Resolved { has_links: bool, count: usize },
    /// A newer resolution for the tab already landed, or the tab closed
    Discarded,
    Removed,
    Ignored,
}

pub struct SyncController<H, T, S> {
    host: H,
    lookup: LookupClient<T, S>,
    store: SharedStore,
    hydrated: Cell<bool>,
}

impl<H: BrowserHost, T: HttpTransport, S: SettingsSource> SyncController<H, T, S> {
    pub fn new(host: H, lookup: LookupClient<T, S>) -> Self {
        SyncController {
            host,
            lookup,
            store: Rc::new(RefCell::new(TabStateStore::new())),
            hydrated: Cell::new(false),
        }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn lookup(&self) -> &LookupClient<T, S> {
        &self.lookup
    }

    pub async fn handle_event(&self, event: TabEvent) -> Outcome {
        match event {
            TabEvent::Created { tab_id, url: Some(url) } => self.resolve(tab_id, &url).await,
            TabEvent::Updated {
                tab_id,
                complete: true,
                url: Some(url),
            } => self.resolve(tab_id, &url).await,
            TabEvent::Activated { tab_id } => match self.host.tab_url(tab_id).await {
                Some(url) => self.resolve(tab_id, &url).await,
                None => Outcome::Ignored,
            },
            TabEvent::UrlChanged { tab_id, url } => self.resolve(tab_id, &url).await,
            TabEvent::Removed { tab_id } => {
                self.remove_tab(tab_id);
                Outcome::Removed
            }
            TabEvent::Replaced { added, removed } => {
                self.remove_tab(removed);
                match self.host.tab_url(added).await {
                    Some(url) => self.resolve(added, &url).await,
                    None => Outcome::Removed,
                }
            }
            TabEvent::Created { .. } | TabEvent::Updated { .. } => Outcome::Ignored,
        }
    }

    /// Look up `url` for `tab_id` and publish the result.
    ///
    /// The ticket is drawn before the first suspension point so that events
    /// for the same tab are ordered by arrival, whatever order the lookups
    /// finish in.
    pub async fn resolve(&self, tab_id: TabId, url: &str) -> Outcome {
        let ticket = self.store.borrow_mut().begin(tab_id, url);

        let links = if is_resolvable_url(url) {
            debug!("Resolving go links for tab {}: {}", tab_id, url);
            self.lookup.resolve_reverse(url).await.into_links()
        } else {
            Vec::new()
        };

        let committed = self.store.borrow_mut().commit(ticket, links, self.host.now_ms());
        match committed {
            Ok(record) => {
                let count = record.resolved_links.len();
                self.host.save_record(&record);
                // A newer lookup is still out; it will set the icon when it lands.
                let settled = !matches!(self.store.borrow().phase(tab_id), TabPhase::Resolving { .. });
                if settled {
                    self.host
                        .show_affordance(tab_id, &affordance(record.has_links(), count));
                }
                Outcome::Resolved {
                    has_links: record.has_links(),
                    count,
                }
            }
            Err(stale) => {
                debug!("Discarding resolution: {}", stale);
                Outcome::Discarded
            }
        }
    }

    pub fn remove_tab(&self, tab_id: TabId) {
        if self.store.borrow_mut().remove(tab_id) {
            debug!("Dropped cached go links for closed tab {}", tab_id);
        }
        // Saved by an earlier worker even when this one never saw the tab.
        self.host.forget_records(&[tab_id]);
    }

    /// Reload the records an earlier background worker saved, once.
    ///
    /// Saved records of tabs that have since closed are deleted instead.
    /// Returns the number of records restored.
    pub async fn rehydrate(&self) -> usize {
        if self.hydrated.get() {
            return 0;
        }
        let saved = self.host.saved_records().await;
        let open: HashSet<TabId> = self.host.open_tabs().await.iter().map(|tab| tab.id).collect();
        if self.hydrated.replace(true) {
            return 0;
        }

        let (live, closed): (Vec<TabRecord>, Vec<TabRecord>) =
            saved.into_iter().partition(|record| open.contains(&record.tab_id));
        if !closed.is_empty() {
            let closed: Vec<TabId> = closed.iter().map(|record| record.tab_id).collect();
            self.host.forget_records(&closed);
        }

        let mut store = self.store.borrow_mut();
        let mut restored = 0;
        for record in live {
            if store.restore(record) {
                restored += 1;
            }
        }
        if restored > 0 {
            info!("Restored cached go links for {} tab(s)", restored);
        }
        restored
    }

    /// Forget tabs that are gone and resolve every tab that is open.
    ///
    /// The active tab goes first; the rest are resolved concurrently.
    /// Returns the number of tabs resolved.
    pub async fn startup(&self) -> usize {
        self.rehydrate().await;

        let tabs = self.host.open_tabs().await;
        let open: HashSet<TabId> = tabs.iter().map(|tab| tab.id).collect();

        let pruned = self.store.borrow_mut().retain(&open);
        if !pruned.is_empty() {
            self.host.forget_records(&pruned);
        }
        info!("Startup: {} open tab(s), {} stale record(s) pruned", tabs.len(), pruned.len());

        let active = self.host.active_tab().await.map(|tab| tab.id);
        let (first, rest): (Vec<(TabId, String)>, Vec<(TabId, String)>) = tabs
            .into_iter()
            .filter_map(|tab| Some((tab.id, tab.url?)))
            .partition(|(tab_id, _)| Some(*tab_id) == active);

        for (tab_id, url) in &first {
            self.resolve(*tab_id, url).await;
        }
        join_all(rest.iter().map(|(tab_id, url)| self.resolve(*tab_id, url))).await;

        first.len() + rest.len()
    }
}
