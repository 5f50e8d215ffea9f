use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use tilegrid::actor::{self, reactor};
use tilegrid::actor::reactor::Reactor;
use tilegrid::common::config::{Config, config_file, data_dir};
use tilegrid::common::log;
use tilegrid::common::preferences::FilePreferenceStore;
use tilegrid::sys::snapshot::{Snapshot, SnapshotHost};
use tilegrid::sys::window_server::WindowId;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EventKind {
    /// The window given by --window was just opened.
    Created,
    /// The window given by --window was just closed.
    Removed,
    /// The toggle action was clicked, with --window focused.
    Toggle,
    Startup,
}

/// Runs one host event against a snapshot of windows and displays, and prints
/// the calls the host was asked to make.
#[derive(Parser)]
struct Cli {
    /// JSON file with `windows` and `displays`.
    snapshot: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = EventKind::Created)]
    event: EventKind,

    /// The window the event is about.
    #[arg(long)]
    window: Option<u32>,

    /// Read configuration from this file instead of ~/.tilegrid.toml.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Check the configuration file and exit.
    #[arg(long)]
    validate: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let opt: Cli = Parser::parse();
    log::init_logging();

    let config_path = opt.config.clone().unwrap_or_else(config_file);
    let mut config = Config::read_or_default(&config_path)?;

    if opt.validate {
        let issues = config.validate();
        if issues.is_empty() {
            println!("{} is valid", config_path.display());
            return Ok(());
        }
        for issue in &issues {
            eprintln!("{issue}");
        }
        bail!("{} has {} invalid value(s)", config_path.display(), issues.len());
    }

    let fixed = config.auto_fix_values();
    if fixed > 0 {
        warn!(fixed, "replaced invalid config values with defaults");
    }

    let Some(snapshot_path) = opt.snapshot.as_deref() else {
        bail!("a snapshot file is required unless --validate is given");
    };
    let snapshot = Snapshot::read(snapshot_path)
        .with_context(|| format!("reading snapshot {}", snapshot_path.display()))?;
    let host = SnapshotHost::new(snapshot);
    let window = opt.window.map(WindowId::new);

    let event = match opt.event {
        EventKind::Startup => reactor::Event::Startup,
        EventKind::Toggle => reactor::Event::ActionClicked { window },
        EventKind::Created => {
            let Some(id) = window else {
                bail!("--event created needs --window");
            };
            let info = host
                .window(id)
                .with_context(|| format!("window {id} is not in the snapshot"))?;
            reactor::Event::WindowCreated(info)
        }
        EventKind::Removed => {
            let Some(id) = window else {
                bail!("--event removed needs --window");
            };
            host.remove_window(id);
            reactor::Event::WindowRemoved(id)
        }
    };

    let store = FilePreferenceStore::new(data_dir());
    let mut reactor = Reactor::new(host, store, config);
    let (events_tx, events_rx) = actor::channel();
    if !events_tx.send(event) {
        bail!("reactor stopped before the event was queued");
    }
    drop(events_tx);
    reactor.run(events_rx).await;

    let calls = reactor.host().take_calls();
    info!(calls = calls.len(), "event handled");
    println!("{}", serde_json::to_string_pretty(&calls)?);
    Ok(())
}
