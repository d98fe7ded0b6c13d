//! Engine runtime setup and orchestration.
//!
//! This module wires together configuration, shared state, session
//! restoration and the message dispatch loop that listens to frontend
//! bridge requests.

use std::{sync::Arc, thread};

use subflow_bridge::{MessageFromBackend, MessageToBackend};
use subflow_timeline::store::TimelineStore;
use tokio::sync::{
    RwLock,
    mpsc::{Receiver, Sender},
};

use crate::api::ServiceClient;
use crate::app::AppContext;
use crate::session::SessionStore;
use crate::state::{Session, State};

/// Initialize engine state, restore the previous session and start
/// processing frontend messages.
async fn setup_engine(rx: Receiver<MessageToBackend>, tx: Sender<MessageFromBackend>) {
    let (config, data_path) = crate::config::load_config()
        .await
        .expect("failed to load config");

    let client = ServiceClient::new(reqwest::Client::new(), &config.service_url)
        .expect("config has an unusable service URL");
    let store = SessionStore::new(data_path.join("session"));
    let display_mode = config.default_display_mode;

    let state = Arc::new(RwLock::new(State {
        config,
        store,
        client,
        session: Session::default(),
        timeline: TimelineStore::default(),
        display_mode,
        api_key: None,
        poll: None,
        runtime_timer: None,
        generation: 0,
    }));

    let context = Arc::new(AppContext { state, tx });
    crate::bootstrap::restore(&context).await;
    context.consume_bridge_messages(rx).await;
}

/// Spawn the engine runtime and begin processing bridge messages.
pub fn run(rx: Receiver<MessageToBackend>, tx: Sender<MessageFromBackend>) {
    thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .expect("failed to build tokio runtime");
        runtime.block_on(async { setup_engine(rx, tx).await });
    });
}
