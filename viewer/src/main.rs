mod display;
mod font;
mod remote;
mod save;
mod session;
mod store;
mod stream;

use ball_capture_common::config::Config;
use remote::{BlockingRemoteSaver, RemoteSaveClient};
use save::LocalSaveWriter;
use session::CaptureSession;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use store::FrameStore;
use tokio::net::TcpStream;
use tracing::{error, info};

fn main() {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    let config = match Config::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {e}", config_path.display());
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.parse().unwrap_or_default()),
        )
        .init();

    info!(
        host = config.robot.host,
        stream_port = config.robot.stream_port,
        save_port = config.robot.save_port,
        "starting ball-capture viewer"
    );

    // The display loop owns the main thread (the window library requires it),
    // so the runtime is driven explicitly instead of via #[tokio::main].
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "failed to start async runtime");
            std::process::exit(1);
        }
    };

    // Connection failures at startup are fatal; there is no retry.
    let stream_addr = config.stream_addr();
    let stream_sock = match runtime.block_on(TcpStream::connect(&stream_addr)) {
        Ok(s) => {
            info!(addr = stream_addr, "connected to video stream");
            s
        }
        Err(e) => {
            error!(error = %e, addr = stream_addr, "failed to connect to video stream");
            std::process::exit(1);
        }
    };

    let save_addr = config.save_addr();
    let save_client = match runtime.block_on(RemoteSaveClient::connect(&save_addr)) {
        Ok(c) => {
            info!(addr = save_addr, "connected to save command server");
            c
        }
        Err(e) => {
            error!(error = %e, addr = save_addr, "failed to connect to save command server");
            std::process::exit(1);
        }
    };

    let local = match LocalSaveWriter::new(
        Path::new(&config.capture.save_dir),
        &config.capture.filename_prefix,
    ) {
        Ok(w) => w,
        Err(e) => {
            error!(error = %e, "failed to prepare local save directory");
            std::process::exit(1);
        }
    };

    let store = Arc::new(FrameStore::new());
    let shutdown = Arc::new(AtomicBool::new(false));

    runtime.spawn(stream::run_receiver(
        stream_sock,
        Arc::clone(&store),
        Arc::clone(&shutdown),
    ));

    {
        let shutdown = Arc::clone(&shutdown);
        runtime.spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupt received, shutting down");
                shutdown.store(true, Ordering::Relaxed);
            }
        });
    }

    let remote = BlockingRemoteSaver::new(runtime.handle().clone(), save_client);
    let mut session = CaptureSession::new(Arc::clone(&store), remote, local);

    info!("waiting for video stream");
    if let Err(e) = display::run(Arc::clone(&store), &mut session, Arc::clone(&shutdown)) {
        error!(error = %e, "display loop error");
    }

    // Best-effort shutdown on every exit path: stop the receiver, drop both
    // sockets with the runtime, report the final tally.
    shutdown.store(true, Ordering::Relaxed);
    let saved = session.saved_count();
    let local_dir = session.local_dir().display().to_string();
    runtime.shutdown_timeout(Duration::from_secs(1));

    info!(saved, dir = local_dir, "capture client stopped");
}
