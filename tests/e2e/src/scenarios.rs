//! Full lifecycle scenarios

use alloc::vec;

use offline_worker::{
    CacheStorage, Clients, ControlMessage, MessageEvent, NotificationClickEvent, PushEvent,
    Request, WorkerState,
};

use crate::fixtures::{run_activate, run_fetch, run_install, Site};

const V1_PAGES: &[&str] = &["/", "/index.html", "/about.html", "/pic/cover.png"];
const V2_PAGES: &[&str] = &["/", "/index.html", "/about.html", "/faq.html", "/pic/cover.png"];

#[test]
fn test_first_visit_install_and_activate() {
    let site = Site::new();
    site.serve_pages(V1_PAGES);
    site.clients.connect("/index.html");

    let worker = site.worker("site-v1", V1_PAGES);
    run_install(&worker).unwrap();
    assert!(worker.ready_to_activate());
    run_activate(&worker).unwrap();

    assert_eq!(worker.state(), WorkerState::Activated);
    assert_eq!(site.caches.len("site-v1"), V1_PAGES.len());
    assert_eq!(site.clients.controlled_count(), 1);
}

#[test]
fn test_version_upgrade_isolates_generations() {
    let site = Site::new();
    site.serve_pages(V1_PAGES);

    let v1 = site.worker("site-v1", V1_PAGES);
    run_install(&v1).unwrap();
    run_activate(&v1).unwrap();

    // Browsing populates v1 beyond its manifest.
    site.net
        .serve("/music.html", offline_worker::Response::basic(200).with_body(b"music".to_vec()));
    let (response, settled) = run_fetch(&v1, Request::navigation("/music.html"));
    assert_eq!(response.unwrap().status, 200);
    settled.unwrap();
    assert_eq!(site.caches.len("site-v1"), V1_PAGES.len() + 1);

    // A new deploy ships a new generation.
    site.serve_pages(V2_PAGES);
    let v2 = site.worker("site-v2", V2_PAGES);
    run_install(&v2).unwrap();
    assert!(site.caches.has("site-v1"));
    assert!(site.caches.has("site-v2"));

    run_activate(&v2).unwrap();
    assert_eq!(site.caches.keys(), ["site-v2"]);
    assert_eq!(site.caches.len("site-v2"), V2_PAGES.len());
}

#[test]
fn test_failed_install_keeps_previous_generation_active() {
    let site = Site::new();
    site.serve_pages(V1_PAGES);

    let v1 = site.worker("site-v1", V1_PAGES);
    run_install(&v1).unwrap();
    run_activate(&v1).unwrap();

    // v2's manifest lists an asset the deploy forgot to publish.
    let v2 = site.worker("site-v2", &["/", "/index.html", "/pic/unpublished.png"]);
    assert!(run_install(&v2).is_err());

    assert_eq!(v2.state(), WorkerState::Redundant);
    assert_eq!(v1.state(), WorkerState::Activated);
    assert_eq!(site.caches.len("site-v1"), V1_PAGES.len());
    assert_eq!(site.caches.len("site-v2"), 0);

    // v1 keeps serving from its intact store.
    let (response, settled) = run_fetch(&v1, Request::new("/index.html"));
    assert_eq!(response.unwrap().status, 200);
    settled.unwrap();
}

#[test]
fn test_skip_waiting_message_lets_update_proceed_with_pages_open() {
    let site = Site::new();
    site.serve_pages(V1_PAGES);
    site.clients.connect("/index.html");
    site.clients.connect("/about.html");

    let worker = site.worker("site-v1", V1_PAGES);

    // A page asks for the immediate switch while the install is pending.
    let mut message = MessageEvent::new(ControlMessage::SkipWaiting.encode(), "https://site.example");
    worker.handle_message(&mut message);
    message.settle().unwrap();
    assert!(worker.skip_waiting_requested());
    assert!(!worker.ready_to_activate());

    run_install(&worker).unwrap();
    assert!(worker.ready_to_activate());
    run_activate(&worker).unwrap();
    assert_eq!(site.clients.controlled_count(), 2);
}

#[test]
fn test_offline_browsing_serves_cached_site() {
    let site = Site::new();
    site.serve_pages(V1_PAGES);

    let worker = site.worker("site-v1", V1_PAGES);
    run_install(&worker).unwrap();
    run_activate(&worker).unwrap();

    site.net.go_offline();
    let calls_before = site.net.calls();

    // Cached pages keep working without the network.
    let (response, settled) = run_fetch(&worker, Request::navigation("/about.html"));
    assert_eq!(
        response.unwrap().body.as_deref(),
        Some(b"/about.html page body".as_slice())
    );
    settled.unwrap();
    assert_eq!(site.net.calls(), calls_before);

    // An uncached navigation falls back to the root document.
    let (response, settled) = run_fetch(&worker, Request::navigation("/solutions.html"));
    assert_eq!(
        response.unwrap().body.as_deref(),
        Some(b"/index.html page body".as_slice())
    );
    settled.unwrap();

    // An uncached image has no fallback; the failure surfaces.
    let (response, settled) = run_fetch(
        &worker,
        Request::new("/pic/absent.png")
            .with_destination(offline_worker::RequestDestination::Image),
    );
    assert!(response.is_none());
    settled.unwrap();
}

#[test]
fn test_repeat_visit_populates_then_hits_cache() {
    let site = Site::new();
    site.serve_pages(V1_PAGES);

    let worker = site.worker("site-v1", &["/index.html"]);
    run_install(&worker).unwrap();
    run_activate(&worker).unwrap();

    site.net
        .serve("/faq.html", offline_worker::Response::basic(200).with_body(b"faq".to_vec()));

    let (first, settled) = run_fetch(&worker, Request::navigation("/faq.html"));
    assert_eq!(first.unwrap().status, 200);
    settled.unwrap();
    let calls_after_first = site.net.calls();

    let (second, settled) = run_fetch(&worker, Request::navigation("/faq.html"));
    assert_eq!(second.unwrap().body.as_deref(), Some(b"faq".as_slice()));
    settled.unwrap();
    assert_eq!(site.net.calls(), calls_after_first);
}

#[test]
fn test_push_notification_click_opens_site() {
    let site = Site::new();
    let worker = site.worker("site-v1", &[]);

    let mut push = PushEvent::new(Some(b"spring schedule published".to_vec()), 1_719_000_000_000);
    worker.handle_push(&mut push);
    push.settle().unwrap();

    let shown = site.notifications.shown();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].title, "Site updates");
    assert_eq!(shown[0].body, "spring schedule published");
    assert_eq!(shown[0].data.date_of_arrival, 1_719_000_000_000);

    let mut click = NotificationClickEvent::new("push-1");
    worker.handle_notification_click(&mut click);
    click.settle().unwrap();

    assert_eq!(site.notifications.closed(), vec!["push-1"]);
    let opened = site.clients.count();
    assert_eq!(opened, 1);
}
