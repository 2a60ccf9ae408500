//! Poll a scale once and print the reading
//!
//! ```text
//! WEIGHLINK_CONFIG=scale.json cargo run --example read_scale
//! ```

use std::time::Duration;

use tracing_subscriber::EnvFilter;
use weighlink::{DeviceConfig, Scale};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let path = std::env::var("WEIGHLINK_CONFIG").unwrap_or_else(|_| "scale.json".to_string());
    let device = DeviceConfig::load(&path)?;

    if device.protocol().is_simulated() {
        println!("Simulator configured, no device to poll");
        return Ok(());
    }

    let mut scale = Scale::from_config(&device).with_read_timeout(Duration::from_secs(1));
    println!("Protocol: {}", scale.protocol());

    scale.connect().await?;

    // A binary reply may arrive in several chunks
    scale.request_weight().await?;
    for _ in 0..3 {
        match scale.read_reading().await {
            Ok(Some(reading)) => {
                println!("{}", reading);
                break;
            }
            Ok(None) => continue,
            Err(e) => {
                eprintln!("{} ({:?})", e, e.category());
                break;
            }
        }
    }

    scale.disconnect().await?;
    Ok(())
}
