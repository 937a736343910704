use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Detects signals sent to the process and requests shutdown. Ctrl-C works everywhere, SIGTERM
/// (which `screentime stop` sends) only on unix.
///
/// On Windows detached processes can't detect signals sent to them, so there `stop` ends up
/// killing the daemon and only the periodic saves survive.
pub async fn detect_shutdown(cancelation: CancellationToken) {
    select! {
        _ = ctrl_c() => {
            info!("Received Ctrl-C, shutting down");
            cancelation.cancel();
        },
        _ = terminate() => {
            info!("Received termination signal, shutting down");
            cancelation.cancel();
        },
        _ = cancelation.cancelled() => (),
    };
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C {e:?}");
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn terminate() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut stream) => {
            stream.recv().await;
        }
        Err(e) => {
            error!("Failed to listen for SIGTERM {e:?}");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}
