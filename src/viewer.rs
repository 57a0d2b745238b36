/// Answers the popup's questions from the tab cache

use std::rc::Rc;

use log::{info, warn};

use crate::controller::{BrowserHost, SyncController, TabEvent};
use crate::link_data::{CreateResponse, CurrentTabData, NewLink, Request, Response, TabSnapshot};
use crate::lookup::HttpTransport;
use crate::settings::SettingsSource;

pub struct ViewerQuery<H, T, S> {
    controller: Rc<SyncController<H, T, S>>,
}

impl<H: BrowserHost, T: HttpTransport, S: SettingsSource> ViewerQuery<H, T, S> {
    pub fn new(controller: Rc<SyncController<H, T, S>>) -> Self {
        ViewerQuery { controller }
    }

    /// What is cached for `tab`; its live URL and no links when nothing is
    pub fn query(&self, tab: &TabSnapshot) -> CurrentTabData {
        let record = self.controller.store().borrow().get(tab.id);
        match record {
            Some(record) => CurrentTabData {
                go_links: record.resolved_links,
                current_url: record.url,
            },
            None => CurrentTabData {
                go_links: Vec::new(),
                current_url: tab.url.clone().unwrap_or_default(),
            },
        }
    }

    /// Answer for the active tab, after picking up records saved by an
    /// earlier background worker
    pub async fn current_tab_data(&self) -> CurrentTabData {
        self.controller.rehydrate().await;
        match self.controller.host().active_tab().await {
            Some(tab) => self.query(&tab),
            None => CurrentTabData {
                go_links: Vec::new(),
                current_url: String::new(),
            },
        }
    }

    /// Create a go link, then refresh `tab` so its cache includes it
    pub async fn create(&self, tab: Option<&TabSnapshot>, request: NewLink) -> CreateResponse {
        let created = self
            .controller
            .lookup()
            .create_link(&request.source, &request.target)
            .await;

        match created {
            Ok(link) => {
                info!("Created go link {} -> {}", link.source, link.target);
                if let Some(TabSnapshot { id, url: Some(url) }) = tab {
                    self.controller.resolve(*id, url).await;
                }
                CreateResponse::created(link)
            }
            Err(e) => {
                warn!("Error creating go link: {}", e);
                CreateResponse::failed(e.to_string())
            }
        }
    }

    /// Dispatch one inbound runtime message
    pub async fn handle_request(&self, request: Request, sender: Option<TabSnapshot>) -> Option<Response> {
        match request {
            Request::GetCurrentTabData => Some(Response::TabData(self.current_tab_data().await)),
            Request::CreateGoLink { data } => {
                let tab = self.controller.host().active_tab().await;
                Some(Response::Created(self.create(tab.as_ref(), data).await))
            }
            Request::UrlChanged { url } => {
                match sender {
                    Some(sender) => {
                        self.controller
                            .handle_event(TabEvent::UrlChanged { tab_id: sender.id, url })
                            .await;
                    }
                    None => warn!("Ignoring urlChanged from a sender without a tab"),
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;
    use crate::controller::tests::{FakeHost, controller};
    use crate::link_data::{LinkEntry, TabId};
    use crate::lookup::tests::{FakeService, FakeSettings};

    fn viewer(host: &FakeHost, service: &FakeService) -> ViewerQuery<FakeHost, FakeService, FakeSettings> {
        ViewerQuery::new(Rc::new(controller(host, service)))
    }

    #[test]
    fn test_query_without_record_falls_back_to_live_url() {
        let host = FakeHost::default();
        let service = FakeService::default();
        let viewer = viewer(&host, &service);

        let data = viewer.query(&TabSnapshot::new(TabId::new(3), "https://fresh.example/"));

        assert_eq!(data.current_url, "https://fresh.example/");
        assert!(data.go_links.is_empty());
    }

    #[test]
    fn test_query_reads_cache_without_network() {
        let host = FakeHost::with_tabs(&[(1, "https://docs.example/readme")]);
        let service = FakeService::with_links(vec![LinkEntry::new("/docs", "https://docs.example/readme")]);
        let viewer = viewer(&host, &service);
        block_on(viewer.handle_request(
            Request::UrlChanged { url: "https://docs.example/readme".to_string() },
            Some(TabSnapshot::new(TabId::new(1), "https://docs.example/readme")),
        ));
        let requests_after_resolve = service.request_count();

        let first = block_on(viewer.current_tab_data());
        let second = block_on(viewer.current_tab_data());

        assert_eq!(first, second);
        assert_eq!(first.current_url, "https://docs.example/readme");
        assert_eq!(first.go_links, vec![LinkEntry::new("/docs", "https://docs.example/readme")]);
        assert_eq!(service.request_count(), requests_after_resolve);
    }

    #[test]
    fn test_wiki_page_with_no_links() {
        let host = FakeHost::with_tabs(&[(1, "https://wiki.example/page")]);
        let service = FakeService::default();
        let viewer = viewer(&host, &service);

        block_on(viewer.handle_request(
            Request::UrlChanged { url: "https://wiki.example/page".to_string() },
            Some(TabSnapshot::new(TabId::new(1), "https://wiki.example/page")),
        ));
        let reply = block_on(viewer.handle_request(Request::GetCurrentTabData, None));

        assert_eq!(
            reply,
            Some(Response::TabData(CurrentTabData {
                go_links: vec![],
                current_url: "https://wiki.example/page".to_string(),
            }))
        );
        assert_eq!(host.shown(1).unwrap().title, "No links found");
    }

    #[test]
    fn test_create_refreshes_active_tab() {
        let host = FakeHost::with_tabs(&[(1, "https://example.com/x")]);
        let service = FakeService::default();
        let viewer = viewer(&host, &service);
        block_on(viewer.handle_request(
            Request::UrlChanged { url: "https://example.com/x".to_string() },
            Some(TabSnapshot::new(TabId::new(1), "https://example.com/x")),
        ));

        let reply = block_on(viewer.handle_request(
            Request::CreateGoLink {
                data: NewLink {
                    source: "foo".to_string(),
                    target: "https://example.com/x".to_string(),
                },
            },
            None,
        ));

        assert_eq!(
            reply,
            Some(Response::Created(CreateResponse::created(LinkEntry::new("/foo", "https://example.com/x"))))
        );
        let data = block_on(viewer.current_tab_data());
        assert_eq!(data.go_links, vec![LinkEntry::new("/foo", "https://example.com/x")]);
        assert_eq!(host.shown(1).unwrap().title, "1 link(s) found");
    }

    #[test]
    fn test_create_conflict_is_reported() {
        let host = FakeHost::with_tabs(&[(1, "https://example.com/x")]);
        let service = FakeService::with_links(vec![LinkEntry::new("/foo", "https://other.example/")]);
        let viewer = viewer(&host, &service);

        let response = block_on(viewer.create(
            None,
            NewLink {
                source: "/foo".to_string(),
                target: "https://example.com/x".to_string(),
            },
        ));

        assert!(!response.success);
        assert_eq!(
            response.error.as_deref(),
            Some("A link with host 'go' and source '/foo' already exists")
        );
    }

    #[test]
    fn test_url_changed_has_no_reply() {
        let host = FakeHost::default();
        let service = FakeService::default();
        let viewer = viewer(&host, &service);

        let reply = block_on(viewer.handle_request(
            Request::UrlChanged { url: "https://a.example/".to_string() },
            Some(TabSnapshot::new(TabId::new(5), "https://a.example/")),
        ));
        let orphan = block_on(viewer.handle_request(Request::UrlChanged { url: "https://b.example/".to_string() }, None));

        assert_eq!(reply, None);
        assert_eq!(orphan, None);
        assert_eq!(
            viewer.query(&TabSnapshot::new(TabId::new(5), "ignored")).current_url,
            "https://a.example/"
        );
    }

    #[test]
    fn test_restarted_worker_still_serves_cached_links() {
        let host = FakeHost::with_tabs(&[(1, "https://docs.example/readme")]);
        let service = FakeService::with_links(vec![LinkEntry::new("/docs", "https://docs.example/readme")]);
        block_on(controller(&host, &service).resolve(TabId::new(1), "https://docs.example/readme"));
        assert_eq!(host.shown(1).unwrap().title, "1 link(s) found");

        let restarted = viewer(&host, &service);
        let data = block_on(restarted.current_tab_data());

        assert_eq!(data.go_links, vec![LinkEntry::new("/docs", "https://docs.example/readme")]);
        assert_eq!(data.current_url, "https://docs.example/readme");
        assert_eq!(service.request_count(), 1);
    }
}
