use std::process::ExitCode;

use tracing::{error, info};
use uuid::Uuid;

/// Runtime size: `server.worker_threads` from config, else `TOKIO_WORKER_THREADS`.
fn worker_threads() -> Option<usize> {
    configs::AppConfig::load_and_validate()
        .ok()
        .and_then(|cfg| cfg.server.worker_threads)
        .or_else(|| std::env::var("TOKIO_WORKER_THREADS").ok().and_then(|v| v.parse().ok()))
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    common::utils::logging::init_logging_from_env();

    let run_id = Uuid::new_v4();
    std::panic::set_hook(Box::new(move |info| {
        error!(service = "ecoleta", event = "panic", %run_id, message = %info, "unhandled panic");
    }));

    let threads = worker_threads();
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(n) = threads {
        builder.worker_threads(n);
    }
    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "ecoleta", event = "runtime_build_failed", error = %e, "cannot build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!(
        service = "ecoleta",
        event = "start",
        %run_id,
        version = env!("CARGO_PKG_VERSION"),
        threads = threads.unwrap_or_default(),
        "ecoleta starting"
    );

    // server::run 在收到退出信号后会等待在途请求完成再返回
    match rt.block_on(server::run()) {
        Ok(()) => {
            info!(service = "ecoleta", event = "stop", %run_id, "ecoleta stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(service = "ecoleta", event = "run_failed", %run_id, error = %e, "ecoleta exited with error");
            ExitCode::FAILURE
        }
    }
}
