//! Send a raw label to a printer
//!
//! ```text
//! cargo run --example print_raw -- tcp 192.168.1.60
//! cargo run --example print_raw -- spooler "Zebra ZD420"
//! ```

use anyhow::bail;
use tracing_subscriber::EnvFilter;
use weighlink::{strategy_for, ConnectionConfig};

const LABEL: &[u8] = b"^XA^FO50,50^ADN,36,20^FDweighlink^FS^XZ";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "debug".into()))
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(kind), Some(target)) = (args.next(), args.next()) else {
        bail!("usage: print_raw <serial|tcp|spooler> <port|host|printer>");
    };

    let config = match kind.as_str() {
        "serial" => ConnectionConfig::serial(target),
        "tcp" => ConnectionConfig::tcp(target, printer_port()),
        "spooler" => ConnectionConfig::spooler(target),
        other => bail!("unknown transport {other}"),
    };

    let mut printer = strategy_for(config.kind);
    printer.connect(&config).await?;
    printer.send(LABEL).await?;
    println!("Sent {} bytes to {}", LABEL.len(), printer.target());
    printer.disconnect().await?;

    Ok(())
}

fn printer_port() -> u16 {
    std::env::var("PRINTER_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(9100)
}
