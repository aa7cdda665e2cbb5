//! Probe runner.
//!
//! Connects one client, logs every bus event, and runs until Ctrl-C.

use std::sync::Arc;

use anyhow::Context;
use miracle_sdk::bus::listener;
use miracle_sdk::client::{ClientConfig, MiracleClient};
use miracle_sdk::ws::messages::Registration;
use miracle_sdk::ws::{names, BaseHandler, ClientBus, ClientEvent, ClientHandler, WsClient};
use miracle_sdk::{
    BaseClient, ChatClient, ChatHandler, MatchClient, MatchHandler, UserId, UserIdRequest,
    WsConfig,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::config::{ProbeConfig, ProbeMode};

/// Returns the event names published in `mode`.
#[must_use]
pub fn event_names(mode: ProbeMode) -> &'static [&'static str] {
    match mode {
        ProbeMode::Base => &[],
        ProbeMode::Match => &names::MATCH_ALL,
        ProbeMode::Chat => &names::CHAT_ALL,
    }
}

/// Subscribes a JSON logging listener to every event of `mode`.
pub fn subscribe_logging(bus: &ClientBus, mode: ProbeMode) {
    for &name in event_names(mode) {
        bus.subscribe(
            name,
            listener(move |event: &ClientEvent| match serde_json::to_string(event) {
                Ok(json) => info!(event = name, payload = %json, "bus event"),
                Err(e) => warn!(event = name, error = %e, "failed to serialize bus event"),
            }),
        );
    }
}

/// Sends one stdin line over the chat client.
///
/// Private to `target` when set, broadcast otherwise. Blank lines are
/// skipped and return false.
pub fn send_line(client: &ChatClient, target: Option<UserId>, line: &str) -> bool {
    let line = line.trim();
    if line.is_empty() {
        return false;
    }
    match target {
        Some(target) => client.send_private(line, target, None),
        None => client.send_broadcast(line),
    }
}

/// Fetches and logs the user's profile.
///
/// # Errors
///
/// Returns an error if the request fails.
pub async fn fetch_profile(config: &ProbeConfig, user_id: UserId) -> anyhow::Result<()> {
    let mut client_config = ClientConfig::new(&config.api_url);
    if let Some(token) = &config.auth_token {
        client_config = client_config.with_auth_token(token);
    }
    let client = MiracleClient::new(client_config).context("invalid REST configuration")?;

    let user = client
        .get_user_info_with_user_id(&UserIdRequest::from(user_id))
        .await
        .context("failed to fetch user profile")?;

    info!(
        user_id = %user.user_id,
        name = %user.telegram_user_name,
        gender = ?user.gender,
        age = ?user.age,
        matches = user.match_ids.len(),
        "user profile"
    );
    Ok(())
}

/// Runs the probe until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the first connection
/// attempt fails.
pub async fn run(config: ProbeConfig) -> anyhow::Result<()> {
    let user_id = config.require_user_id()?;
    info!(mode = %config.mode, user_id = %user_id, ws_url = %config.ws_url, "starting probe");

    if config.fetch_profile {
        if let Err(e) = fetch_profile(&config, user_id).await {
            warn!(error = %e, "profile fetch failed, continuing");
        }
    }

    let bus = Arc::new(ClientBus::new());
    subscribe_logging(&bus, config.mode);
    let ws_config = WsConfig::for_endpoint(&config.ws_url, config.mode.endpoint());

    match config.mode {
        ProbeMode::Base => {
            let client = BaseClient::new(ws_config, BaseHandler, bus)?;
            client.connect().await?;
            if !client.register(&Registration::new(user_id)) {
                warn!("registration not sent");
            }
            wait_for_shutdown(&client).await
        }
        ProbeMode::Match => {
            let client = MatchClient::new(ws_config, MatchHandler::new(user_id), bus)?;
            client.connect().await?;
            wait_for_shutdown(&client).await
        }
        ProbeMode::Chat => {
            let client = ChatClient::new(ws_config, ChatHandler::new(user_id), bus)?;
            client.connect().await?;
            run_chat(&client, config.target_user_id).await
        }
    }
}

async fn wait_for_shutdown<H: ClientHandler>(client: &WsClient<H>) -> anyhow::Result<()> {
    tokio::signal::ctrl_c().await?;
    info!("shutting down probe");
    client.disconnect();
    Ok(())
}

async fn run_chat(client: &ChatClient, target: Option<UserId>) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    info!(target_user_id = ?target, "type messages, one per line");

    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => {
                    if !line.trim().is_empty() && !send_line(client, target, &line) {
                        warn!(state = %client.state(), "message not sent");
                    }
                }
                None => {
                    info!("stdin closed");
                    tokio::signal::ctrl_c().await?;
                    break;
                }
            },
            signal = tokio::signal::ctrl_c() => {
                signal?;
                break;
            }
        }
    }

    info!("shutting down probe");
    client.disconnect();
    Ok(())
}
