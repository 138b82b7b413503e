//! Exercises a shared client from several threads against one fake miner.

use std::sync::Arc;
use std::thread;

use anyhow::{Context, Result, anyhow};
use minerboard_api::MinerClient;
use minerboard_api::testing::{FakeMiner, Reply};
use serde_json::json;

const CALLERS: usize = 4;

#[test]
fn shared_client_serves_concurrent_callers() -> Result<()> {
    let replies = (0..CALLERS)
        .map(|_| Reply::json(&json!({"POOLS": [{"POOL": 0, "URL": "stratum+tcp://a:1"}]})))
        .collect();
    let fake = FakeMiner::spawn(replies).context("spawn fake miner")?;
    let client = Arc::new(MinerClient::new(fake.endpoint()));

    let handles: Vec<_> = (0..CALLERS)
        .map(|_| {
            let client = Arc::clone(&client);
            thread::spawn(move || client.pools())
        })
        .collect();

    for handle in handles {
        let pools = handle
            .join()
            .map_err(|_| anyhow!("caller thread panicked"))?
            .context("pools call")?;
        assert_eq!(pools.len(), 1);
    }

    let requests = fake.finish().context("finish fake miner")?;
    assert_eq!(requests.len(), CALLERS);
    assert!(requests.iter().all(|request| request == &json!({"command": "pools"})));
    Ok(())
}
