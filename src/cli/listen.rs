use anyhow::{Context, Result};
use log::info;
use std::net::IpAddr;
use std::path::PathBuf;

use structfeed::listener::{Frame, Listener, ListenerConfig};

use super::Config;

/// Receive messages and print one line per decoded frame
pub fn run(
    bind: Option<IpAddr>,
    port: Option<u16>,
    config: Option<PathBuf>,
    count: Option<u64>,
    json: bool,
) -> Result<()> {
    let mut listener_config = ListenerConfig::default();
    if let Some(path) = config {
        let file_config = Config::from_file(&path)?;
        listener_config = file_config.listener.apply(listener_config);
    }
    if let Some(address) = bind {
        listener_config = listener_config.with_bind_address(address);
    }
    if let Some(port) = port {
        listener_config = listener_config.with_port(port);
    }

    let mut listener = Listener::bind(listener_config).context("Failed to start listener")?;

    info!("structfeed listener");
    info!("===================");
    info!("Address: {}", listener.local_addr()?);
    info!("Max datagram size: {} bytes", listener.config().max_datagram_size);
    if let Some(n) = count {
        info!("Stopping after {} frames", n);
    }

    let mut shown = 0u64;
    while count.map_or(true, |n| shown < n) {
        let frame = listener.next_frame().context("Receive failed")?;
        print_frame(&frame, json)?;
        shown += 1;
    }

    let stats = listener.stats();
    info!("Listener finished");
    info!("  Datagrams received: {}", stats.datagrams_received);
    info!("  Frames decoded: {}", stats.frames_decoded);
    info!(
        "  Discarded: {} ({} truncated, {} malformed)",
        stats.discarded(),
        stats.truncated,
        stats.malformed
    );

    Ok(())
}

fn print_frame(frame: &Frame, json: bool) -> Result<()> {
    if json {
        let line = serde_json::json!({
            "sequence": frame.sequence,
            "source": frame.source.to_string(),
            "received_at": frame.received_at.to_rfc3339(),
            "fields": frame.table.to_value(),
        });
        println!("{}", serde_json::to_string(&line)?);
    } else {
        println!(
            "#{} {} from {}: {} fields, {} values [{}]",
            frame.sequence,
            frame.received_at.format("%H:%M:%S%.3f"),
            frame.source,
            frame.table.len(),
            frame.table.data().len(),
            frame.table.child_names().join(", ")
        );
    }
    Ok(())
}
