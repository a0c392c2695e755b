// ── Power dispatcher ──
//
// Resolves a plug from the registry snapshot, performs the HTTP round
// trip, emits a state notification, and schedules the delayed side
// effects. Scheduled tasks are fire-and-forget: they never await each
// other, offer no ordering guarantee, and may race -- but they all hang
// off one CancellationToken so a shutdown can drop pending work.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use domoplug_api::{PowerState, RelayClient, TransportConfig};

use crate::config::{PlugConfig, PlugRegistry};
use crate::error::CoreError;
use crate::host::{CommandRunner, PrinterHost};
use crate::model::StateNotification;

const NOTIFY_CHANNEL_SIZE: usize = 64;

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<DispatcherInner>`. Holds the registry
/// snapshot, the injected host collaborators, and the notification
/// broadcast channel.
#[derive(Clone)]
pub struct PowerDispatcher {
    inner: Arc<DispatcherInner>,
}

struct DispatcherInner {
    registry: ArcSwap<PlugRegistry>,
    printer: Arc<dyn PrinterHost>,
    runner: Arc<dyn CommandRunner>,
    transport: TransportConfig,
    notify_tx: broadcast::Sender<StateNotification>,
    tasks: TaskTracker,
    cancel: CancellationToken,
}

impl PowerDispatcher {
    /// Create a dispatcher over a registry snapshot with injected host
    /// collaborators and the default transport (10s timeout).
    pub fn new(
        registry: PlugRegistry,
        printer: Arc<dyn PrinterHost>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self::with_transport(registry, printer, runner, TransportConfig::default())
    }

    /// Create a dispatcher with explicit transport settings.
    pub fn with_transport(
        registry: PlugRegistry,
        printer: Arc<dyn PrinterHost>,
        runner: Arc<dyn CommandRunner>,
        transport: TransportConfig,
    ) -> Self {
        let (notify_tx, _) = broadcast::channel(NOTIFY_CHANNEL_SIZE);
        Self {
            inner: Arc::new(DispatcherInner {
                registry: ArcSwap::from_pointee(registry),
                printer,
                runner,
                transport,
                notify_tx,
                tasks: TaskTracker::new(),
                cancel: CancellationToken::new(),
            }),
        }
    }

    /// Current registry snapshot (includes advisory state caches).
    pub fn registry(&self) -> Arc<PlugRegistry> {
        self.inner.registry.load_full()
    }

    /// Replace the registry snapshot (host settings changed).
    pub fn replace_registry(&self, registry: PlugRegistry) {
        self.inner.registry.store(Arc::new(registry));
    }

    /// Subscribe to state-change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<StateNotification> {
        self.inner.notify_tx.subscribe()
    }

    /// Cancel all pending scheduled tasks. Tasks already past their
    /// delay run to completion.
    pub fn shutdown(&self) {
        self.inner.cancel.cancel();
    }

    /// Wait for every scheduled task to finish instead of cancelling.
    ///
    /// One-shot consumers call this before exiting so delayed side
    /// effects (printer reconnects, local commands) still run. Tasks
    /// scheduled while draining -- a delayed G-code trigger scheduling
    /// its own follow-ups -- are waited on too.
    pub async fn drain(&self) {
        self.inner.tasks.close();
        self.inner.tasks.wait().await;
    }

    // ── Primary operations ───────────────────────────────────────

    /// Power a plug on.
    ///
    /// On success emits an `on` notification and schedules the optional
    /// printer reconnect and local command. Every failure -- unknown
    /// plug, network error, rejected command -- is logged and emitted as
    /// `unknown`; nothing propagates as a hard fault.
    pub async fn turn_on(&self, address: &str, idx: &str) -> PowerState {
        debug!(address, idx, "turning on");

        let registry = self.inner.registry.load_full();
        let Some(plug) = registry.find(address, idx).cloned() else {
            warn!(address, idx, "no plug configured");
            self.emit(PowerState::Unknown, address, idx);
            return PowerState::Unknown;
        };

        match self.power_request(&plug, true).await {
            Ok(()) => {
                self.finish(PowerState::On, &plug);

                if plug.auto_connect && self.inner.printer.is_disconnected_or_errored() {
                    let printer = Arc::clone(&self.inner.printer);
                    debug!(delay = plug.auto_connect_delay, "scheduling printer reconnect");
                    self.schedule(Duration::from_secs(plug.auto_connect_delay), async move {
                        printer.connect().await;
                    });
                }

                if plug.sys_cmd_on {
                    self.schedule_command(
                        plug.sys_run_cmd_on.clone(),
                        Duration::from_secs(plug.sys_cmd_on_delay),
                    );
                }

                PowerState::On
            }
            Err(e) => {
                error!(address = %plug.address, idx = %plug.idx, error = %e, "power on failed");
                self.finish(PowerState::Unknown, &plug);
                PowerState::Unknown
            }
        }
    }

    /// Power a plug off.
    ///
    /// Returns `None` when the printing guard suppressed the operation
    /// entirely (no network call, no notification). The guard applies to
    /// every off-trigger, API and G-code alike, and is evaluated at the
    /// moment the operation runs.
    pub async fn turn_off(&self, address: &str, idx: &str) -> Option<PowerState> {
        debug!(address, idx, "turning off");

        let registry = self.inner.registry.load_full();
        let Some(plug) = registry.find(address, idx).cloned() else {
            warn!(address, idx, "no plug configured");
            self.emit(PowerState::Unknown, address, idx);
            return Some(PowerState::Unknown);
        };

        if plug.warn_printing && self.inner.printer.is_print_active() {
            info!(
                plug = %plug.display_name(),
                "print in progress, not powering off"
            );
            return None;
        }

        if plug.sys_cmd_off {
            self.schedule_command(
                plug.sys_run_cmd_off.clone(),
                Duration::from_secs(plug.sys_cmd_off_delay),
            );
        }

        if plug.auto_disconnect {
            // Ordering guarantee: the printer must be disconnected, and
            // the grace delay elapsed, before the power-off request goes
            // out. This wait is inline, not a scheduled task.
            debug!(delay = plug.auto_disconnect_delay, "disconnecting printer");
            self.inner.printer.disconnect().await;
            tokio::time::sleep(Duration::from_secs(plug.auto_disconnect_delay)).await;
        }

        let state = match self.power_request(&plug, false).await {
            Ok(()) => PowerState::Off,
            Err(e) => {
                error!(address = %plug.address, idx = %plug.idx, error = %e, "power off failed");
                PowerState::Unknown
            }
        };

        self.finish(state, &plug);
        Some(state)
    }

    /// Query a plug's current state and emit it.
    ///
    /// A blank address is a no-op: no request, no notification.
    pub async fn check_status(&self, address: &str, idx: &str) -> Option<PowerState> {
        if address.trim().is_empty() {
            return None;
        }
        debug!(address, idx, "checking status");

        let registry = self.inner.registry.load_full();
        let Some(plug) = registry.find(address, idx).cloned() else {
            warn!(address, idx, "no plug configured");
            self.emit(PowerState::Unknown, address, idx);
            return Some(PowerState::Unknown);
        };

        let state = match self.status_request(&plug).await {
            Ok(state) => state,
            Err(e) => {
                error!(address = %plug.address, idx = %plug.idx, error = %e, "status query failed");
                PowerState::Unknown
            }
        };

        self.finish(state, &plug);
        Some(state)
    }

    /// Run an operator-supplied local command through the injected
    /// runner. Callers must already hold the control permission; see
    /// [`CommandGate`](crate::command::CommandGate).
    pub async fn run_local_command(&self, command: &str) -> Result<(), CoreError> {
        self.inner.runner.run(command).await
    }

    // ── Printer pass-throughs ────────────────────────────────────

    pub async fn connect_printer(&self) {
        debug!("connecting printer");
        self.inner.printer.connect().await;
    }

    pub async fn disconnect_printer(&self) {
        debug!("disconnecting printer");
        self.inner.printer.disconnect().await;
    }

    // ── Scheduling ───────────────────────────────────────────────

    /// Spawn a fire-and-forget task that runs `fut` after `delay`,
    /// unless the dispatcher is shut down during the delay.
    pub(crate) fn schedule<F>(&self, delay: Duration, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let cancel = self.inner.cancel.clone();
        self.inner.tasks.spawn(async move {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {}
                () = tokio::time::sleep(delay) => fut.await,
            }
        });
    }

    fn schedule_command(&self, command: String, delay: Duration) {
        debug!(%command, delay_secs = delay.as_secs(), "scheduling local command");
        let runner = Arc::clone(&self.inner.runner);
        self.schedule(delay, async move {
            if let Err(e) = runner.run(&command).await {
                error!(error = %e, "scheduled command failed");
            }
        });
    }

    // ── Plumbing ─────────────────────────────────────────────────

    fn client_for(&self, plug: &PlugConfig) -> Result<RelayClient, CoreError> {
        let transport = if plug.ignore_tls {
            self.inner.transport.clone().with_insecure_tls()
        } else {
            self.inner.transport.clone()
        };
        Ok(RelayClient::from_address(
            &plug.address,
            plug.credentials.clone(),
            &transport,
        )?)
    }

    async fn power_request(&self, plug: &PlugConfig, on: bool) -> Result<(), CoreError> {
        let client = self.client_for(plug)?;
        client.set_power(&plug.idx, on).await?;
        Ok(())
    }

    async fn status_request(&self, plug: &PlugConfig) -> Result<PowerState, CoreError> {
        let client = self.client_for(plug)?;
        Ok(client.device_status(&plug.idx).await?)
    }

    /// Update the advisory state cache and broadcast the notification.
    fn finish(&self, state: PowerState, plug: &PlugConfig) {
        self.inner
            .registry
            .rcu(|reg| reg.with_state(&plug.address, &plug.idx, state));
        self.emit(state, &plug.address, &plug.idx);
    }

    fn emit(&self, state: PowerState, address: &str, idx: &str) {
        debug!(%state, address, idx, "state notification");
        let _ = self.inner.notify_tx.send(StateNotification {
            current_state: state,
            address: address.to_string(),
            idx: idx.to_string(),
        });
    }
}
