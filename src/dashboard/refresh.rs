use futures_util::future::join_all;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::api::RenderClient;
use crate::config::ServiceConfig;
use crate::dashboard::DashboardEvent;
use crate::error::RdashError;
use crate::models::Service;

/// Fetch result for one configured service within a cycle.
#[derive(Debug)]
pub struct ServiceOutcome {
    pub config: ServiceConfig,
    pub result: Result<Service, RdashError>,
}

/// Everything one reconciliation cycle produced. One outcome per configured
/// service; the cycle as a whole never fails.
#[derive(Debug)]
pub struct CycleOutcome {
    pub services: Vec<ServiceOutcome>,
}

/// One full fetch pass over the configured services. All fetches run
/// concurrently, so total latency is bounded by the slowest single fetch,
/// and each failure stays confined to its own service.
pub async fn run_cycle(client: &RenderClient, services: &[ServiceConfig]) -> CycleOutcome {
    run_cycle_with(services, |svc| async move {
        client.get_service_with_deploy(&svc.id).await
    })
    .await
}

/// Cycle body parameterized over the fetch, so the fan-out and settle-all
/// behavior can be exercised without a live client.
pub async fn run_cycle_with<F, Fut>(services: &[ServiceConfig], fetch: F) -> CycleOutcome
where
    F: Fn(ServiceConfig) -> Fut,
    Fut: Future<Output = Result<Service, RdashError>>,
{
    let fetches = services.iter().map(|svc| fetch(svc.clone()));
    let results = join_all(fetches).await;

    let services = services
        .iter()
        .cloned()
        .zip(results)
        .map(|(config, result)| ServiceOutcome { config, result })
        .collect();

    CycleOutcome { services }
}

/// Periodic refresh task. Runs one cycle immediately, then one per interval,
/// publishing outcomes on the event channel until stopped or the receiver
/// goes away.
pub struct Refresher {
    handle: JoinHandle<()>,
    shutdown: watch::Sender<bool>,
}

impl Refresher {
    pub fn spawn(
        client: Arc<RenderClient>,
        services: Vec<ServiceConfig>,
        interval: Duration,
        tx: mpsc::Sender<DashboardEvent>,
    ) -> Self {
        let (shutdown, mut shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    // first tick fires immediately: that is the startup cycle
                    _ = ticker.tick() => {
                        let outcome = run_cycle(&client, &services).await;
                        if tx.send(DashboardEvent::CycleComplete(outcome)).await.is_err() {
                            break;
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }
        });

        Self { handle, shutdown }
    }

    /// Signal the task and wait for it to finish. A cycle already in flight
    /// is allowed to complete; nothing runs in the background afterwards.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.handle.await {
            tracing::warn!("refresh task did not shut down cleanly: {}", e);
        }
    }
}

/// User-triggered refresh, out of band with the periodic task. Overlap with
/// a scheduled cycle is fine: the merge is idempotent and last-completed
/// wins per service id. If the dashboard is gone the result is discarded.
pub fn spawn_manual(
    client: Arc<RenderClient>,
    services: Vec<ServiceConfig>,
    tx: mpsc::Sender<DashboardEvent>,
) {
    tokio::spawn(async move {
        let outcome = run_cycle(&client, &services).await;
        let _ = tx.send(DashboardEvent::CycleComplete(outcome)).await;
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ResponseCache;
    use crate::models::ServiceStatus;

    fn cfg(id: &str) -> ServiceConfig {
        ServiceConfig {
            id: id.to_string(),
            name: id.to_string(),
            aliases: vec![],
            priority: 1,
        }
    }

    fn fetched(id: &str) -> Service {
        Service {
            id: id.to_string(),
            name: id.to_string(),
            service_type: "web_service".to_string(),
            status: ServiceStatus::Available,
            url: None,
            custom_domain: None,
            latest_deploy: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn cycle_latency_is_bounded_by_the_slowest_fetch() {
        let services = vec![cfg("srv-1"), cfg("srv-2"), cfg("srv-3")];
        let start = tokio::time::Instant::now();

        let outcome = run_cycle_with(&services, |svc| async move {
            let millis = match svc.id.as_str() {
                "srv-1" => 50,
                "srv-2" => 200,
                _ => 120,
            };
            tokio::time::sleep(Duration::from_millis(millis)).await;
            Ok(fetched(&svc.id))
        })
        .await;

        // concurrent fan-out: the whole pass costs as much as the slowest
        // fetch, not the 370ms sum
        assert_eq!(start.elapsed(), Duration::from_millis(200));
        assert_eq!(outcome.services.len(), 3);
        assert!(outcome.services.iter().all(|o| o.result.is_ok()));
    }

    #[tokio::test]
    async fn one_failure_does_not_taint_the_others() {
        let services = vec![cfg("srv-1"), cfg("srv-2"), cfg("srv-3")];

        let outcome = run_cycle_with(&services, |svc| async move {
            if svc.id == "srv-2" {
                Err(RdashError::Network("connection reset".to_string()))
            } else {
                Ok(fetched(&svc.id))
            }
        })
        .await;

        assert_eq!(outcome.services.len(), 3);
        assert!(outcome.services[0].result.is_ok());
        assert!(outcome.services[1].result.is_err());
        assert!(outcome.services[2].result.is_ok());
        // outcomes stay aligned with the configured order
        assert_eq!(outcome.services[1].config.id, "srv-2");
    }

    #[tokio::test]
    async fn cycle_issues_exactly_one_fetch_per_service() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        let calls = AtomicUsize::new(0);
        let services = vec![cfg("srv-1"), cfg("srv-2")];

        run_cycle_with(&services, |svc| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok(fetched(&svc.id)) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn mixed_cycle_feeds_the_display_set() {
        use crate::dashboard::state::DashboardState;

        let services = vec![cfg("srv-1"), cfg("srv-2")];
        let outcome = run_cycle_with(&services, |svc| async move {
            if svc.id == "srv-2" {
                Err(RdashError::Network("connection reset".to_string()))
            } else {
                Ok(fetched(&svc.id))
            }
        })
        .await;

        let mut state = DashboardState::new();
        state.apply_cycle(outcome);

        let shown: Vec<_> = state.visible().iter().map(|e| e.config.id.clone()).collect();
        assert_eq!(shown, vec!["srv-1"]);
        assert_eq!(state.failures.len(), 1);
        assert!(state.last_refreshed.is_some());
    }

    #[tokio::test]
    async fn manual_refresh_delivers_an_out_of_band_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(dir.path().to_path_buf(), crate::cache::DEFAULT_TTL);
        let mut client = RenderClient::new("rnd_test", "RENDER_API_KEY", cache).unwrap();
        client.set_base_url("http://127.0.0.1:9".to_string());

        let (tx, mut rx) = mpsc::channel(4);
        spawn_manual(Arc::new(client), vec![cfg("srv-1")], tx);

        let DashboardEvent::CycleComplete(outcome) = rx.recv().await.expect("manual cycle") else {
            panic!("expected cycle outcome");
        };
        assert_eq!(outcome.services.len(), 1);
    }

    #[tokio::test]
    async fn refresher_runs_an_immediate_cycle_and_stops_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(dir.path().to_path_buf(), crate::cache::DEFAULT_TTL);
        let mut client = RenderClient::new("rnd_test", "RENDER_API_KEY", cache).unwrap();
        client.set_base_url("http://127.0.0.1:9".to_string());

        let (tx, mut rx) = mpsc::channel(4);
        let refresher = Refresher::spawn(
            Arc::new(client),
            vec![cfg("srv-1")],
            Duration::from_secs(3600),
            tx,
        );

        // startup cycle arrives without waiting for the interval; the
        // unreachable endpoint means a per-service failure, not a crash
        let event = rx.recv().await.expect("startup cycle");
        let DashboardEvent::CycleComplete(outcome) = event else {
            panic!("expected cycle outcome");
        };
        assert_eq!(outcome.services.len(), 1);
        assert!(outcome.services[0].result.is_err());

        refresher.stop().await;
    }
}
