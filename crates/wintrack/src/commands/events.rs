use std::thread;
use std::time::Duration;

use clap::Args;
use serde::Serialize;
use wintrack_core::{Config, Event, EventKind, Filter, Manager, StopHandle, Topic, WindowHandle};

use super::CommandResult;

/// Arguments for the `events` subcommand.
#[derive(Args)]
pub struct EventsArgs {
    /// Stop automatically after this many seconds
    #[arg(long)]
    duration: Option<u64>,
    /// Print one JSON object per event
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct EventRecord {
    kind: EventKind,
    handle: WindowHandle,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
}

impl EventRecord {
    fn new(event: &Event) -> Self {
        Self {
            kind: event.kind,
            handle: event.window.handle(),
            // A removed window may already be gone.
            title: event.window.title().ok(),
        }
    }
}

/// Watches window events in real time until Ctrl+C or `--duration`.
pub fn execute(args: &EventsArgs, config: &Config) -> CommandResult {
    let platform = super::platform()?;
    let mut manager =
        Manager::with_options(platform, Filter::from_config(config), config.manager);

    let json = args.json;
    if !json {
        let windows = manager.list_windows()?;
        println!("{} manageable windows:", windows.len());
        for window in &windows {
            println!("  {window}");
        }
        println!("\nWatching window events (press Ctrl+C to stop)...\n");
    }

    manager.subscribe(Topic::All, move |event, _| {
        let record = EventRecord::new(event);
        if json {
            println!("{}", serde_json::to_string(&record)?);
        } else {
            let title = record.title.as_deref().unwrap_or("<gone>");
            println!("{:<18} {} {title:?}", record.kind, record.handle);
        }
        Ok(())
    });

    install_ctrl_c(manager.stop_handle())?;
    if let Some(secs) = args.duration {
        let stop = manager.stop_handle();
        thread::spawn(move || {
            thread::sleep(Duration::from_secs(secs));
            tracing::info!("duration elapsed");
            stop.stop();
        });
    }

    manager.start()?;

    if !json {
        println!("\n{}", manager.dump_state());
    }
    Ok(())
}

#[cfg(windows)]
fn install_ctrl_c(stop: StopHandle) -> CommandResult {
    wintrack_windows::ctrl_c::set_handler(move || stop.stop())?;
    Ok(())
}

#[cfg(not(windows))]
fn install_ctrl_c(_stop: StopHandle) -> CommandResult {
    Ok(())
}
