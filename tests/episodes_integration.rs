//! End-to-end tests for composed resources against fixture transports.
//!
//! These follow the collections/episodes API: fetch the collections, pick the
//! first one, then fetch the episodes and keep those that belong to it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tributary::prelude::*;
use tributary::testing::{CallLog, FixtureTransport};
use tributary::{assert_fetch_failed, assert_fetched};

const COLLECTIONS: &str = "https://talk.objc.io/collections.json";
const EPISODES: &str = "https://talk.objc.io/episodes.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Collection {
    id: String,
    title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Episode {
    number: u32,
    title: String,
    collection: String,
}

fn episode(number: u32, title: &str, collection: &str) -> Episode {
    Episode {
        number,
        title: title.to_string(),
        collection: collection.to_string(),
    }
}

fn fixture(collections: Vec<Collection>) -> FixtureTransport {
    FixtureTransport::new()
        .route_json(COLLECTIONS, &collections)
        .route_json(
            EPISODES,
            &vec![episode(1, "Ep1", "c1"), episode(2, "Ep2", "c2")],
        )
}

fn swift_talk() -> Vec<Collection> {
    vec![Collection {
        id: "c1".to_string(),
        title: "Swift Talk".to_string(),
    }]
}

fn episodes_of_first_collection() -> Combined<Vec<Episode>> {
    Resource::<Vec<Collection>>::get_json(COLLECTIONS)
        .try_map("no collections", |collections| collections.into_iter().next())
        .combined()
        .flat_map(|collection| {
            Resource::<Vec<Episode>>::get_json(EPISODES)
                .map(move |episodes| {
                    episodes
                        .into_iter()
                        .filter(|e| e.collection == collection.id)
                        .collect::<Vec<_>>()
                })
                .combined()
        })
}

#[tokio::test]
async fn first_collection_episodes_are_filtered() {
    let transport = fixture(swift_talk());

    let episodes = assert_fetched!(load(&transport, episodes_of_first_collection()).await);

    assert_eq!(episodes, vec![episode(1, "Ep1", "c1")]);
    assert_eq!(transport.calls(), vec![COLLECTIONS, EPISODES]);
}

#[tokio::test]
async fn empty_collections_never_request_episodes() {
    let transport = fixture(Vec::new());

    let outcome = load(&transport, episodes_of_first_collection()).await;

    assert_fetch_failed!(
        outcome.clone(),
        FetchError::Decode {
            source: DecodeError::Rejected("no collections"),
            ..
        }
    );
    assert_eq!(outcome.ok(), None);
    assert_eq!(transport.calls(), vec![COLLECTIONS]);
}

#[tokio::test]
async fn collections_outage_fails_whole_chain() {
    let transport = fixture(swift_talk())
        .route_failure(COLLECTIONS, TransportError::new("bad gateway").with_status(502));

    let outcome = load(&transport, episodes_of_first_collection()).await;

    let err = outcome.unwrap_err();
    assert!(err.is_transport());
    assert_eq!(err.target(), Some(COLLECTIONS));
    assert_eq!(transport.calls(), vec![COLLECTIONS]);
}

#[tokio::test]
async fn left_failure_never_invokes_continuation() {
    let invoked = Arc::new(AtomicUsize::new(0));
    let spy = Arc::clone(&invoked);
    let transport = FixtureTransport::new()
        .route(COLLECTIONS, b"not json".to_vec())
        .route_json(EPISODES, &Vec::<Episode>::new());

    let chain = Resource::<Vec<Collection>>::get_json(COLLECTIONS)
        .combined()
        .flat_map(move |_| {
            spy.fetch_add(1, Ordering::SeqCst);
            Resource::<Vec<Episode>>::get_json(EPISODES).combined()
        });

    assert_fetch_failed!(load(&transport, chain).await, FetchError::Decode { .. });
    assert_eq!(invoked.load(Ordering::SeqCst), 0);
    assert_eq!(transport.calls(), vec![COLLECTIONS]);
}

fn marked(log: &CallLog, target: &'static str) -> Resource<String> {
    let log = log.clone();
    Resource::get(target, move |bytes: &[u8]| {
        log.record(format!("parsed {}", target));
        Ok(String::from_utf8_lossy(bytes).into_owned())
    })
}

#[tokio::test]
async fn three_deep_chain_runs_in_declaration_order() {
    let log = CallLog::new();
    let transport = FixtureTransport::with_log(log.clone())
        .route("/one", b"/two".to_vec())
        .route("/two", b"/three".to_vec())
        .route("/three", b"done".to_vec());

    let (two, three) = (marked(&log, "/two"), marked(&log, "/three"));
    let chain = marked(&log, "/one")
        .combined()
        .flat_map(move |next| {
            assert_eq!(next, "/two");
            two.combined()
        })
        .flat_map(move |next| {
            assert_eq!(next, "/three");
            three.combined()
        });

    assert_eq!(load(&transport, chain).await, Ok("done".to_string()));
    assert_eq!(
        log.entries(),
        vec![
            "/one",
            "parsed /one",
            "/two",
            "parsed /two",
            "/three",
            "parsed /three"
        ]
    );
}

#[tokio::test]
async fn nested_chain_runs_in_declaration_order() {
    let transport = FixtureTransport::new()
        .route("/one", b"1".to_vec())
        .route("/two", b"2".to_vec())
        .route("/three", b"3".to_vec());

    let raw = |target: &str| Resource::get(target, |bytes: &[u8]| Ok(bytes.to_vec()));
    let chain = raw("/one").combined().flat_map(move |one| {
        raw("/two").combined().flat_map(move |two| {
            raw("/three")
                .combined()
                .map(move |three| [one.clone(), two.clone(), three].concat())
        })
    });

    assert_eq!(load(&transport, chain).await, Ok(b"123".to_vec()));
    assert_eq!(transport.calls(), vec!["/one", "/two", "/three"]);
}

#[tokio::test]
async fn failure_in_middle_stops_chain() {
    let transport = FixtureTransport::new()
        .route("/one", b"1".to_vec())
        .route("/three", b"3".to_vec());

    let raw = |target: &str| Resource::get(target, |bytes: &[u8]| Ok(bytes.to_vec()));
    let chain = raw("/one")
        .combined()
        .flat_map(move |_| raw("/two").combined())
        .flat_map(move |_| raw("/three").combined());

    let err = load(&transport, chain).await.unwrap_err();
    assert_eq!(err.target(), Some("/two"));
    assert_eq!(transport.calls(), vec!["/one", "/two"]);
}

#[tokio::test]
async fn completion_runs_once_on_success_and_failure() {
    let transport = fixture(swift_talk());
    let mut successes = 0;
    execute(&transport, episodes_of_first_collection(), |outcome| {
        assert!(outcome.is_ok());
        successes += 1;
    })
    .await;
    assert_eq!(successes, 1);

    let empty = fixture(Vec::new());
    let mut failures = 0;
    execute(&empty, episodes_of_first_collection(), |outcome| {
        assert!(outcome.is_err());
        failures += 1;
    })
    .await;
    assert_eq!(failures, 1);
}

#[tokio::test]
async fn map_issues_no_extra_request() {
    let transport = fixture(swift_talk());

    let titles = episodes_of_first_collection()
        .map(|episodes| episodes.into_iter().map(|e| e.title).collect::<Vec<_>>())
        .map(|titles| titles.join(", "));

    assert_eq!(load(&transport, titles).await, Ok("Ep1".to_string()));
    assert_eq!(transport.calls().len(), 2);
}

#[tokio::test]
async fn pure_branch_skips_network() {
    let transport = fixture(Vec::new());

    let chain = Resource::<Vec<Collection>>::get_json(COLLECTIONS)
        .combined()
        .flat_map(|collections| {
            if collections.is_empty() {
                Combined::pure(Vec::new())
            } else {
                Resource::<Vec<Episode>>::get_json(EPISODES).combined()
            }
        });

    assert_eq!(load(&transport, chain).await, Ok(Vec::new()));
    assert_eq!(transport.calls(), vec![COLLECTIONS]);
}

#[tokio::test]
async fn zip_loads_independent_resources() {
    let transport = fixture(swift_talk());

    let both = Resource::<Vec<Collection>>::get_json(COLLECTIONS)
        .combined()
        .zip(Resource::<Vec<Episode>>::get_json(EPISODES).combined())
        .map(|(collections, episodes)| (collections.len(), episodes.len()));

    assert_eq!(load(&transport, both).await, Ok((1, 2)));
    let mut calls = transport.calls();
    calls.sort();
    assert_eq!(calls, vec![COLLECTIONS, EPISODES]);
}

#[tokio::test]
async fn zip_inside_bind_waits_for_left_side() {
    let transport = fixture(swift_talk()).route("/featured", b"c1".to_vec());

    let featured = Resource::get("/featured", |bytes: &[u8]| {
        Ok(String::from_utf8_lossy(bytes).into_owned())
    });
    let chain = featured.combined().flat_map(|id| {
        Resource::<Vec<Collection>>::get_json(COLLECTIONS)
            .combined()
            .zip(Resource::<Vec<Episode>>::get_json(EPISODES).combined())
            .map(move |(collections, episodes)| {
                let title = collections
                    .iter()
                    .find(|c| c.id == id)
                    .map(|c| c.title.clone());
                let count = episodes.iter().filter(|e| e.collection == id).count();
                (title, count)
            })
    });

    assert_eq!(
        load(&transport, chain).await,
        Ok((Some("Swift Talk".to_string()), 1))
    );
    assert_eq!(transport.calls()[0], "/featured");
    assert_eq!(transport.calls().len(), 3);
}

/// Answers each route after a delay, logging when requests start and finish.
struct DelayedTransport {
    routes: HashMap<String, (Duration, Result<Vec<u8>, TransportError>)>,
    log: CallLog,
}

impl DelayedTransport {
    fn new(log: CallLog) -> Self {
        DelayedTransport {
            routes: HashMap::new(),
            log,
        }
    }

    fn route(
        mut self,
        target: &str,
        after: Duration,
        reply: Result<Vec<u8>, TransportError>,
    ) -> Self {
        self.routes.insert(target.to_string(), (after, reply));
        self
    }
}

impl Transport for DelayedTransport {
    fn perform(
        &self,
        request: &Request,
    ) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send {
        let target = request.target().to_string();
        let route = self.routes.get(&target).cloned();
        let log = self.log.clone();
        async move {
            log.record(format!("start {}", target));
            let missing = Err(TransportError::new("no route").with_status(404));
            let (after, reply) = route.unwrap_or((Duration::ZERO, missing));
            tokio::time::sleep(after).await;
            log.record(format!("finish {}", target));
            reply
        }
    }
}

fn bytes(target: &str) -> Combined<Vec<u8>> {
    Resource::get(target, |bytes: &[u8]| Ok(bytes.to_vec())).combined()
}

#[tokio::test]
async fn zip_has_both_requests_in_flight() {
    let log = CallLog::new();
    let transport = DelayedTransport::new(log.clone())
        .route("/left", Duration::from_millis(50), Ok(b"l".to_vec()))
        .route("/right", Duration::from_millis(50), Ok(b"r".to_vec()));

    let pair = load(&transport, bytes("/left").zip(bytes("/right"))).await;

    assert_eq!(pair, Ok((b"l".to_vec(), b"r".to_vec())));
    let entries = log.entries();
    assert_eq!(entries.len(), 4);
    assert!(entries[..2].iter().all(|entry| entry.starts_with("start ")));
    assert!(entries[2..].iter().all(|entry| entry.starts_with("finish ")));
}

#[tokio::test]
async fn zip_fails_fast_and_abandons_slow_side() {
    let log = CallLog::new();
    let transport = DelayedTransport::new(log.clone())
        .route("/slow", Duration::from_millis(300), Ok(b"late".to_vec()))
        .route(
            "/fast",
            Duration::ZERO,
            Err(TransportError::new("unavailable").with_status(503)),
        );

    let outcome = tokio::time::timeout(
        Duration::from_millis(150),
        load(&transport, bytes("/slow").zip(bytes("/fast"))),
    )
    .await
    .expect("pair should fail before the slow side answers");

    let err = outcome.unwrap_err();
    assert!(err.is_transport());
    assert_eq!(err.target(), Some("/fast"));

    tokio::time::sleep(Duration::from_millis(400)).await;
    let entries = log.entries();
    assert!(entries.contains(&"start /slow".to_string()));
    assert!(!entries.contains(&"finish /slow".to_string()));
}
