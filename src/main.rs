//! Nevermore demo
//!
//! Fills a shared cache with derived values on a timer. On unix, SIGUSR1
//! stands in for the host's low-memory notification.

use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nevermore::{Config, LowMemoryNotifier, MemoryCache, SharedCache};

/// Main entry point for the Nevermore demo.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the shared cache and subscribe it to low-memory notifications
/// 4. Cache derived values on every tick, broadcasting SIGUSR1 as low memory
/// 5. On SIGINT/SIGTERM, unsubscribe and print final stats as JSON
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nevermore=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Nevermore cache demo");

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        "Configuration loaded: count_limit={}, notifier_capacity={}, demo_interval={}ms",
        config.count_limit, config.notifier_capacity, config.demo_interval_ms
    );

    let cache = MemoryCache::from_config(&config).shared();
    let notifier = LowMemoryNotifier::new(config.notifier_capacity);
    let subscription = notifier
        .subscribe(cache.clone())
        .context("Failed to start low-memory listener")?;

    let mut low_memory = LowMemorySignal::install().context("Failed to install SIGUSR1 handler")?;
    let mut ticker = tokio::time::interval(Duration::from_millis(config.demo_interval_ms));
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    let mut tick: i64 = 0;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                tick += 1;
                cache_derived_values(&cache, tick).await;
            }
            _ = low_memory.recv() => {
                let listeners = notifier.notify();
                info!(listeners, "Received SIGUSR1, broadcasting low-memory notification");
            }
            _ = &mut shutdown => break,
        }
    }

    subscription.unsubscribe();

    let stats = cache.read().await.stats();
    println!("{}", serde_json::to_string_pretty(&stats)?);

    info!("Shutdown complete");
    Ok(())
}

/// Caches a few values computed from `tick` under keys of different types.
async fn cache_derived_values(cache: &SharedCache, tick: i64) {
    let mut cache = cache.write().await;

    cache.set_int(tick, tick.saturating_mul(tick));
    cache.set_text(&format!("sqrt:{tick}"), (tick as f64).sqrt());
    cache.set_float(tick as f64 / 2.0, format!("half of {tick}"));

    if tick % 20 == 0 {
        let removed = cache.remove_matching::<i64, _>(|key| key % 2 == 0);
        debug!(tick, removed, "Dropped even squares");
    }

    debug!(tick, count = cache.count(), "Cached derived values");
}

// == Low-Memory Signal ==
/// SIGUSR1 on unix; never fires elsewhere.
struct LowMemorySignal {
    #[cfg(unix)]
    inner: signal::unix::Signal,
}

impl LowMemorySignal {
    #[cfg(unix)]
    fn install() -> std::io::Result<Self> {
        let inner = signal::unix::signal(signal::unix::SignalKind::user_defined1())?;
        Ok(Self { inner })
    }

    #[cfg(not(unix))]
    fn install() -> std::io::Result<Self> {
        Ok(Self {})
    }

    #[cfg(unix)]
    async fn recv(&mut self) {
        if self.inner.recv().await.is_none() {
            std::future::pending::<()>().await;
        }
    }

    #[cfg(not(unix))]
    async fn recv(&mut self) {
        std::future::pending::<()>().await;
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
