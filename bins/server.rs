use std::process::ExitCode;

use configs::AppConfig;
use dotenvy::dotenv;
use tracing::{error, info};
use uuid::Uuid;

fn install_panic_hook(instance_id: Uuid) {
    std::panic::set_hook(Box::new(move |panic| {
        error!(service = "media_server", event = "panic", %instance_id, message = %panic, "unhandled panic");
    }));
}

fn build_runtime(worker_threads: Option<usize>) -> std::io::Result<tokio::runtime::Runtime> {
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = worker_threads {
        builder.worker_threads(w);
    }
    builder.build()
}

fn main() -> ExitCode {
    // .env before logging so RUST_LOG and LOG_FORMAT apply
    dotenv().ok();
    common::utils::logging::init_logging_default();

    let instance_id = Uuid::new_v4();
    install_panic_hook(instance_id);

    let cfg = match AppConfig::load_and_validate() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(service = "media_server", event = "config_invalid", error = %e, "cannot load configuration");
            return ExitCode::FAILURE;
        }
    };

    let threads = cfg.server.worker_threads;
    let rt = match build_runtime(threads) {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "media_server", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!(
        service = "media_server",
        event = "start",
        %instance_id,
        pid = std::process::id(),
        version = env!("CARGO_PKG_VERSION"),
        threads = threads.unwrap_or_default(),
        cloud = %cfg.cloudinary.cloud_name,
        "media server starting"
    );

    match rt.block_on(server::run(cfg)) {
        Ok(()) => {
            info!(service = "media_server", event = "stop", %instance_id, "media server stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(service = "media_server", event = "run_failed", %instance_id, error = %e, "media server failed");
            ExitCode::FAILURE
        }
    }
}
