use subflow_bridge::MessageFromBackend;
use subflow_bridge::config::Config;
use subflow_bridge::notification::NotificationType;

/// Handles an incoming configuration request (see
/// [`subflow_bridge::MessageToBackend::ConfigurationRequest`]).
pub async fn handle_config_request(context: super::AppContextHandle) {
    let config = {
        let state = context.state.read().await;
        state.config.clone()
    };
    context
        .send(MessageFromBackend::ConfigurationResponse(config))
        .await;
}

/// Handles a configuration update: swaps the live config, re-points the
/// service client and persists the result.
pub async fn handle_config_update(context: super::AppContextHandle, config: Config) {
    let rebased = {
        let state = context.state.read().await;
        state.client.rebase(&config.service_url)
    };
    let client = match rebased {
        Ok(client) => client,
        Err(err) => {
            context
                .send_notification(NotificationType::Error, err.to_string())
                .await;
            return;
        }
    };

    {
        let mut state = context.state.write().await;
        state.config = config.clone();
        state.client = client;
    }

    if let Err(err) = crate::config::save_config(&config).await {
        log::error!("Failed to save configuration: {err}");
        context
            .send_notification(NotificationType::Warning, "Settings apply but could not be saved")
            .await;
    }
    context
        .send(MessageFromBackend::ConfigurationResponse(config))
        .await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing;

    #[tokio::test]
    async fn bad_service_url_is_rejected_without_touching_state() {
        let (context, mut rx, _dir) = testing::context().await;
        let old_url = context.state.read().await.config.service_url.clone();

        let config = Config {
            service_url: String::from("definitely not a url"),
            ..Config::default()
        };
        handle_config_update(context.clone(), config).await;

        assert_eq!(context.state.read().await.config.service_url, old_url);
        let events = testing::drain(&mut rx);
        assert!(events.iter().any(|event| matches!(
            event,
            MessageFromBackend::NotificationMessage(note)
                if note.notification_type == NotificationType::Error
        )));
        assert!(!events
            .iter()
            .any(|event| matches!(event, MessageFromBackend::ConfigurationResponse(_))));
    }
}
