//! activity_monitor - user activity detector.
//!
//! Prints the Unix timestamp of every second in which a keyboard key or a
//! mouse button was used. Arguments are device capacities to ignore, see
//! `--help`. Logs go to stderr; stdout carries only timestamps.

use activity_monitor::config::Cli;
use clap::Parser;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("activity_monitor=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.list_devices {
        platform::print_devices()?;
    } else {
        platform::run(&cli)?;
    }
    Ok(())
}

#[cfg(windows)]
mod platform {
    use activity_monitor::config::Cli;
    use activity_monitor::error::MonitorError;
    use activity_monitor::listing::DeviceListing;
    use activity_monitor::monitor::{
        classify, ActivityMonitor, ClassifyError, DeviceKind, EventFilter, SystemClock,
        TICK_INTERVAL,
    };
    use activity_monitor::winapi_utils::*;

    pub fn run(cli: &Cli) -> Result<(), MonitorError> {
        let deny_list = cli.deny_list();
        tracing::info!(
            deny_list = ?deny_list.iter().collect::<Vec<_>>(),
            "Starting activity monitor"
        );

        let monitor = ActivityMonitor::new(
            EventFilter::new(deny_list),
            Win32DeviceQuery,
            SystemClock,
            std::io::stdout(),
        );

        let mut window = MessageWindow::create(Box::new(monitor))?;
        window.start(TICK_INTERVAL)?;

        // Ctrl+C may arrive as soon as the handler is installed
        bind_loop_thread();
        if let Err(e) = ctrlc::set_handler(|| {
            tracing::info!("Shutdown signal received");
            post_quit_message(0);
        }) {
            tracing::warn!(error = %e, "Failed to install Ctrl+C handler");
        }

        let loop_result = run_message_loop();

        // Destroying the window unregisters raw input and kills the timer
        window.close()?;
        let exit_code = loop_result?;
        tracing::debug!(exit_code, "Activity monitor exited");
        Ok(())
    }

    pub fn print_devices() -> Result<(), MonitorError> {
        let devices = list_devices()?;
        println!("Found {} raw input devices.", devices.len());

        for device in devices {
            let name = device_name(device.handle)?;
            let product = name.as_deref().and_then(product_string);

            let record = match device.kind {
                DeviceKind::Other => None,
                kind => Some(
                    classify(&Win32DeviceQuery, device.handle, kind).and_then(|_| {
                        device_sub_record(device.handle)
                            .ok_or(ClassifyError::QueryFailed(device.handle))
                    }),
                ),
            };

            println!();
            print!(
                "{}",
                DeviceListing {
                    handle: device.handle,
                    kind: device.kind,
                    name,
                    product,
                    record,
                }
            );
        }
        Ok(())
    }
}

#[cfg(not(windows))]
mod platform {
    use activity_monitor::config::Cli;
    use activity_monitor::error::MonitorError;

    const UNSUPPORTED: &str = "raw input capture is only available on Windows";

    pub fn run(_cli: &Cli) -> Result<(), MonitorError> {
        Err(MonitorError::Unsupported(UNSUPPORTED))
    }

    pub fn print_devices() -> Result<(), MonitorError> {
        Err(MonitorError::Unsupported(UNSUPPORTED))
    }
}
