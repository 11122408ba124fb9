//! Server command implementation

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use finsmart_core::Settings;

use super::open_store;

pub async fn cmd_serve(data_path: &Path, settings: Settings, host: &str, port: u16) -> Result<()> {
    println!("🚀 Starting FinSmart web server...");
    println!("   Data file: {}", data_path.display());
    println!("   Listening: http://{}:{}", host, port);
    if settings.alerts.enabled {
        println!("   🔔 SMS alerts: enabled (threshold {:.0}%)", settings.alerts.threshold * 100.0);
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let store = open_store(data_path)?;
    finsmart_server::serve(Arc::new(store), settings, host, port).await?;

    Ok(())
}
