use std::{future::IntoFuture, pin::pin, process, sync::Arc, time::Duration};

use atrium::{
    application::error::AppError,
    config::{self, ResolveArgs, Settings},
    domain::types::Locale,
    infra::{bootstrap, error::InfraError, http, telemetry},
};
use tokio::sync::Notify;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Resolve(args) => run_resolve(settings, args).await,
    }
}

async fn run_serve(settings: Settings) -> Result<(), AppError> {
    let state = bootstrap::http_state(&settings)?;

    if settings.content.prefetch_on_startup {
        state.content.prefetch_all(&settings.content.locales).await;
    }

    let router = http::build_router(state);
    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "atrium::serve",
        addr = %settings.server.addr,
        locales = ?settings.content.locales,
        "listening"
    );

    serve_until_signal(listener, router, settings.server.graceful_shutdown).await
}

/// In-flight requests get `grace` to finish once a shutdown signal arrives.
async fn serve_until_signal(
    listener: tokio::net::TcpListener,
    router: axum::Router,
    grace: Duration,
) -> Result<(), AppError> {
    let stop = Arc::new(Notify::new());
    let server = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown({
            let stop = stop.clone();
            async move { stop.notified().await }
        })
        .into_future();
    let mut server = pin!(server);

    tokio::select! {
        result = &mut server => {
            return result.map_err(|err| AppError::unexpected(format!("server error: {err}")));
        }
        _ = shutdown_signal() => {
            info!(target = "atrium::serve", grace_secs = grace.as_secs(), "shutting down");
            stop.notify_one();
        }
    }

    match tokio::time::timeout(grace, server).await {
        Ok(result) => {
            result.map_err(|err| AppError::unexpected(format!("server error: {err}")))
        }
        Err(_) => {
            warn!(target = "atrium::serve", "graceful shutdown timed out");
            Ok(())
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

async fn run_resolve(settings: Settings, args: ResolveArgs) -> Result<(), AppError> {
    let locale = Locale::parse(&args.locale)?;
    let content = bootstrap::site_content(&settings.content)?;

    let (value, resolution) = content.resolve_json(args.kind, &locale).await?;
    info!(
        target = "atrium::resolve",
        kind = %args.kind,
        locale = %locale,
        resolution = ?resolution,
        "resolved"
    );

    let rendered = serde_json::to_string_pretty(&value)
        .map_err(|err| AppError::unexpected(format!("failed to render json: {err}")))?;
    println!("{rendered}");
    Ok(())
}
