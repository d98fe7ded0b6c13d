fn main() -> anyhow::Result<()> {
    simple_logger::SimpleLogger::new()
        .with_colors(true)
        .with_threads(true)
        .with_local_timestamps()
        .with_level(log::LevelFilter::Info)
        .init()
        .expect("failed to build logger instance");

    let channels = subflow_bridge::BridgeChannels::default();
    subflow_backend::run(channels.backend_rx, channels.backend_tx);
    subflow_console::run(channels.frontend_rx, channels.frontend_tx)
}
