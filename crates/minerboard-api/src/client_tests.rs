//! Unit tests for [`MinerClient`] against the fake miner.

use rstest::rstest;
use serde_json::{Value, json};

use crate::testing::{FakeMiner, Reply};
use crate::{ApiError, MinerClient, UNKNOWN_VERSION};

fn miner(replies: Vec<Value>) -> (FakeMiner, MinerClient) {
    let fake = FakeMiner::spawn(replies.iter().map(Reply::json).collect())
        .expect("spawn fake miner");
    let client = MinerClient::new(fake.endpoint());
    (fake, client)
}

fn success(message: &str) -> Value {
    json!({"STATUS": [{"STATUS": "S", "Msg": message, "Code": 0}]})
}

#[test]
fn add_pool_escapes_and_joins_credentials() {
    let (fake, client) = miner(vec![success("Pool added")]);

    let message = client
        .add_pool("stratum+tcp://pool.example:3333", "user1", "pass1")
        .expect("add pool");

    assert_eq!(message, "Pool added");
    let requests = fake.finish().expect("finish");
    assert_eq!(
        requests,
        vec![json!({
            "command": "addpool",
            "parameter": "stratum+tcp://pool.example:3333,user1,pass1"
        })]
    );
}

#[test]
fn add_pool_escapes_significant_characters() {
    let (fake, client) = miner(vec![success("Pool added")]);

    client
        .add_pool("stratum+tcp://pool.example:3333", "rig,01", "p\\w")
        .expect("add pool");

    let requests = fake.finish().expect("finish");
    assert_eq!(
        requests[0]["parameter"],
        json!("stratum+tcp://pool.example:3333,rig\\,01,p\\\\w")
    );
}

#[test]
fn delete_pool_surfaces_daemon_code() {
    let (fake, client) = miner(vec![json!({
        "STATUS": [{"STATUS": "E", "Msg": "invalid pool id", "Code": 13}]
    })]);

    let error = client.delete_pool(2).unwrap_err();

    assert_eq!(error.code(), 13);
    assert!(error.is_daemon_error());
    assert!(error.to_string().contains("invalid pool id"));
    let requests = fake.finish().expect("finish");
    assert_eq!(requests, vec![json!({"command": "removepool", "parameter": "2"})]);
}

#[rstest]
#[case::top("switchpool", 4)]
#[case::enable("enablepool", 1)]
#[case::disable("disablepool", 0)]
fn pool_commands_send_bare_ids(#[case] command: &str, #[case] id: u32) {
    let (fake, client) = miner(vec![success("done")]);

    let message = match command {
        "switchpool" => client.top_pool(id),
        "enablepool" => client.enable_pool(id, true),
        _ => client.enable_pool(id, false),
    }
    .expect("pool command");

    assert_eq!(message, "done");
    let requests = fake.finish().expect("finish");
    assert_eq!(
        requests,
        vec![json!({"command": command, "parameter": id.to_string()})]
    );
}

#[test]
fn save_sends_no_parameter() {
    let (fake, client) = miner(vec![json!({"STATUS": [{"STATUS": "S"}]})]);

    assert_eq!(client.save().expect("save"), "Completed successfully.");
    assert_eq!(fake.finish().expect("finish"), vec![json!({"command": "save"})]);
}

#[test]
fn mutating_command_without_status_fails() {
    let (_fake, client) = miner(vec![json!({"POOLS": []})]);

    let error = client.save().unwrap_err();

    assert!(matches!(error, ApiError::DaemonError { code: -6, .. }));
}

#[test]
fn queries_return_sections_without_status_check() {
    let (fake, client) = miner(vec![
        json!({"DEVS": [{"Name": "BFL", "ID": 0}]}),
        json!({"STATUS": [{"STATUS": "E"}], "NOTIFY": [{"Reason Not Well": "None"}]}),
        json!({"STATUS": [{"STATUS": "S"}]}),
    ]);

    let devices = client.devices().expect("devices");
    let notify = client.notify().expect("notify");
    let pools = client.pools().expect("pools");

    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0]["Name"], json!("BFL"));
    assert_eq!(notify[0]["Reason Not Well"], json!("None"));
    assert!(pools.is_empty());
    let commands: Vec<Value> = fake
        .finish()
        .expect("finish")
        .into_iter()
        .map(|request| request["command"].clone())
        .collect();
    assert_eq!(commands, vec![json!("devs"), json!("notify"), json!("pools")]);
}

#[rstest]
#[case(json!({"VERSION": [{"CGMiner": "4.9.0", "API": "3.1"}]}), 0, "4.9.0")]
#[case(json!({"VERSION": []}), 0, UNKNOWN_VERSION)]
#[case(json!({"VERSION": [{"CGMiner": "4.9.0"}]}), 1, UNKNOWN_VERSION)]
#[case(json!({"STATUS": [{"STATUS": "S"}]}), 0, UNKNOWN_VERSION)]
fn miner_version_falls_back_to_unknown(
    #[case] response: Value,
    #[case] index: usize,
    #[case] expected: &str,
) {
    let (_fake, client) = miner(vec![response]);
    assert_eq!(client.miner_version(index).expect("version"), expected);
}

#[test]
fn api_version_reads_api_field() {
    let (fake, client) = miner(vec![json!({"VERSION": [{"CGMiner": "4.9.0", "API": "3.1"}]})]);

    assert_eq!(client.api_version(0).expect("version"), "3.1");
    assert_eq!(fake.finish().expect("finish"), vec![json!({"command": "version"})]);
}

#[test]
fn malformed_response_is_reported() {
    let fake = FakeMiner::spawn(vec![Reply::text("Socket connect failed")]).expect("spawn");
    let client = MinerClient::new(fake.endpoint());

    let error = client.pools().unwrap_err();

    assert!(matches!(error, ApiError::MalformedResponse { ref raw_payload, .. } if raw_payload == "Socket connect failed"));
    assert_eq!(error.code(), -2);
}

#[test]
fn each_call_uses_its_own_connection() {
    let (fake, client) = miner(vec![success("one"), success("two")]);

    assert_eq!(client.top_pool(1).expect("first"), "one");
    assert_eq!(client.top_pool(2).expect("second"), "two");
    assert_eq!(fake.finish().expect("finish").len(), 2);
}
