//! List DDC/CI monitors and the features they support.
//!
//! Usage:
//!   cargo run --example list_monitors -- [config.toml] [monitor...]
//!
//! Monitors can be selected by position, by part of their description, or
//! with `ALL`. Set `RUST_LOG=debug` to see bus traffic and `DDC_TRACE=1` for
//! frame hexdumps.

#[cfg(target_os = "linux")]
fn main() -> anyhow::Result<()> {
    use ddc_client::{discover, select_monitors, Config, Vcp};
    use std::env;
    use tracing::{info, warn};

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Parse command line arguments
    let mut args: Vec<String> = env::args().skip(1).collect();
    let config = match args.first() {
        Some(path) if path.ends_with(".toml") => {
            let config = Config::load(path)?;
            args.remove(0);
            config
        }
        _ => Config::default(),
    };

    let monitors = discover(&config)?;
    info!("Found {} monitor(s)", monitors.len());

    for monitor in select_monitors(&monitors, &args)? {
        let mut monitor = monitor.lock();
        let description = match monitor.description() {
            Ok(description) => description,
            Err(e) => {
                warn!("Monitor {}: {}", monitor.index(), e);
                format!("<unknown> @ {}", monitor.path().display())
            }
        };
        println!("Monitor {}: {}", monitor.index(), description);

        match monitor.capabilities() {
            Ok(capabilities) => {
                for (key, value) in capabilities.info() {
                    if key != "vcp" {
                        println!("    {key}: {value}");
                    }
                }
            }
            Err(e) => {
                warn!("Monitor {}: unable to read capabilities: {}", monitor.index(), e);
                continue;
            }
        }

        for line in monitor.feature_report(&[])? {
            println!("    {}: current=0x{:02X} max=0x{:02X}", line.feature, line.current, line.max);
            for (value, name) in line.named_values() {
                let marker = if value == line.current { "*" } else { " " };
                println!("      {marker} 0x{value:02X} ({name})");
            }
        }
    }

    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn main() {
    eprintln!("DDC/CI over I2C is only available on Linux");
}
