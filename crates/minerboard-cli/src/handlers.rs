//! Maps dashboard requests onto miner API calls.

use minerboard_api::{Connector, MinerClient};
use serde_json::{Map, Value};
use tracing::info;

use crate::AppError;
use crate::cli::{CliCommand, PoolAction};
use crate::views::{POOL_LIST_FIELDS, POOL_STAT_FIELDS, devices_view, pools_view};

/// Runs one request and returns the data half of the success envelope.
pub(crate) fn handle<C: Connector>(
    client: &MinerClient<C>,
    command: &CliCommand,
) -> Result<Map<String, Value>, AppError> {
    match command {
        CliCommand::Stats => stats(client),
        CliCommand::Version => version(client),
        CliCommand::Pools { action } => pools(client, action),
    }
}

fn stats<C: Connector>(client: &MinerClient<C>) -> Result<Map<String, Value>, AppError> {
    let notify = client.notify()?;
    let devices = client.devices()?;
    let pools = client.pools()?;

    let mut data = Map::new();
    data.insert(
        String::from("devices"),
        Value::Array(devices_view(&devices, &notify)),
    );
    data.insert(
        String::from("pools"),
        Value::Array(pools_view(&pools, POOL_STAT_FIELDS)),
    );
    Ok(data)
}

fn version<C: Connector>(client: &MinerClient<C>) -> Result<Map<String, Value>, AppError> {
    let mut data = Map::new();
    data.insert(String::from("miner"), Value::String(client.miner_version(0)?));
    data.insert(String::from("api"), Value::String(client.api_version(0)?));
    Ok(data)
}

fn pools<C: Connector>(
    client: &MinerClient<C>,
    action: &PoolAction,
) -> Result<Map<String, Value>, AppError> {
    let message = match action {
        PoolAction::List => None,
        PoolAction::Add { url, user, pass } => {
            if url.is_empty() || user.is_empty() || pass.is_empty() {
                return Err(AppError::MissingParameter);
            }
            Some(client.add_pool(url, user, pass)?)
        }
        PoolAction::Remove { id } => Some(client.delete_pool(*id)?),
        PoolAction::Top { id } => Some(client.top_pool(*id)?),
        PoolAction::Enable { id } => Some(client.enable_pool(*id, true)?),
        PoolAction::Disable { id } => Some(client.enable_pool(*id, false)?),
    };

    let mut data = Map::new();
    if let Some(message) = message {
        // Persist before listing so the list reflects the saved state.
        client.save()?;
        info!(%message, "pool change saved");
        data.insert(String::from("message"), Value::String(message));
    }
    data.insert(
        String::from("pools"),
        Value::Array(pools_view(&client.pools()?, POOL_LIST_FIELDS)),
    );
    Ok(data)
}
