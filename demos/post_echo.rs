//! Posts a JSON body and reads it back through an echo transport
//!
//! Run with: cargo run --example post_echo

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tributary::prelude::*;
use tributary::testing::EchoTransport;

#[derive(Debug, Serialize, Deserialize)]
struct NewEpisode {
    title: String,
    collection: String,
}

#[tokio::main]
async fn main() -> Result<(), FetchError> {
    let body = NewEpisode {
        title: "Combined Resources".to_string(),
        collection: "c1".to_string(),
    };

    // Bodies are encoded when the resource is built
    let create = Resource::<NewEpisode>::json("/episodes", HttpMethod::Post(&body))?;
    let created = EchoTransport::new().load(create.combined()).await?;
    println!("Echoed back: {:?}", created);

    // Maps with non-string keys have no JSON form, so building fails up front
    let mut invalid = HashMap::new();
    invalid.insert((1, 2), "tuple key");
    match Resource::<()>::json("/episodes", HttpMethod::Post(&invalid)) {
        Ok(_) => println!("Unexpectedly encoded"),
        Err(e) => println!("Refused before any request: {}", e),
    }

    Ok(())
}
