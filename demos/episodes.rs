//! Loads the episodes of the first collection in one composed resource
//!
//! Run with: cargo run --example episodes

use serde::{Deserialize, Serialize};
use tributary::instrument::TransportTracingExt;
use tributary::prelude::*;
use tributary::testing::FixtureTransport;

const COLLECTIONS: &str = "https://talk.objc.io/collections.json";
const EPISODES: &str = "https://talk.objc.io/episodes.json";

#[derive(Debug, Serialize, Deserialize)]
struct Collection {
    id: String,
    title: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Episode {
    number: u32,
    title: String,
    collection: String,
}

#[tokio::main]
async fn main() {
    // Set up tracing subscriber
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    // Canned responses stand in for the real API
    let transport = FixtureTransport::new()
        .route_json(
            COLLECTIONS,
            &vec![Collection {
                id: "c1".to_string(),
                title: "Swift Talk".to_string(),
            }],
        )
        .route_json(
            EPISODES,
            &vec![
                Episode {
                    number: 1,
                    title: "Ep1".to_string(),
                    collection: "c1".to_string(),
                },
                Episode {
                    number: 2,
                    title: "Ep2".to_string(),
                    collection: "c2".to_string(),
                },
            ],
        )
        .instrument(tracing::info_span!("talk_api"));

    let episodes = Resource::<Vec<Collection>>::get_json(COLLECTIONS)
        .try_map("no collections", |collections| collections.into_iter().next())
        .combined()
        .flat_map(|collection| {
            tracing::info!(collection = %collection.title, "picked first collection");
            Resource::<Vec<Episode>>::get_json(EPISODES)
                .map(move |episodes| {
                    episodes
                        .into_iter()
                        .filter(|episode| episode.collection == collection.id)
                        .collect::<Vec<_>>()
                })
                .combined()
        });

    execute(&transport, episodes, |outcome| match outcome {
        Ok(episodes) => tracing::info!("Loaded episodes: {:?}", episodes),
        Err(e) => tracing::error!("Loading failed: {}", e),
    })
    .await;

    // Both lists side by side, requested concurrently
    let counts = Resource::<Vec<Collection>>::get_json(COLLECTIONS)
        .combined()
        .zip(Resource::<Vec<Episode>>::get_json(EPISODES).combined())
        .map(|(collections, episodes)| (collections.len(), episodes.len()));

    match transport.load(counts).await {
        Ok((collections, episodes)) => {
            tracing::info!(collections, episodes, "Counted both lists")
        }
        Err(e) => tracing::error!("Counting failed: {}", e),
    }
}
