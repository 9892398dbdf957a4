// Rust guideline compliant 2026-10-19

//! Simulation component -- the periodic driver of the bot-watch pipeline.
//!
//! Each tick generates one account, classifies it, records and announces new
//! bots, pushes the account into the [`StreamWindow`], refreshes a few
//! existing accounts and publishes a [`DashboardSnapshot`].
//!
//! Entry points: [`Simulation::run`], [`Simulation::tick_once`],
//! [`Simulation::subscribe`], [`Simulation::handle`]. Configuration via
//! [`SimulationConfig::builder`].

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use classifier::{ClassificationService, ModelSource};
use domain::{Account, BotAlert, ClassificationResult, DetectedBot, Notifier, NotifyError};
use generator::TelemetryGenerator;
use rand::{SeedableRng, rngs::StdRng};
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};
use window::{ActivityHistory, ActivityPoint, DashboardSnapshot, StreamWindow};

// ---------------------------------------------------------------------------
// SimulationError
// ---------------------------------------------------------------------------

/// Errors that can occur while configuring or driving a [`Simulation`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimulationError {
    /// The supplied configuration is invalid.
    #[error("invalid simulation configuration: {reason}")]
    InvalidConfig {
        /// Human-readable description of the problem.
        reason: String,
    },
    /// `run` was called on a simulation that already ran.
    #[error("simulation already started")]
    AlreadyStarted,
    /// A command was sent to a simulation that has finished.
    #[error("simulation stopped")]
    Stopped,
}

// ---------------------------------------------------------------------------
// SimulationConfig + builder
// ---------------------------------------------------------------------------

/// Runtime configuration for a [`Simulation`].
///
/// Construct via [`SimulationConfig::builder`].
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Accounts generated and classified before the first tick.
    pub initial_batch: usize,
    /// Delay between ticks. Always non-zero.
    pub period: Duration,
    /// Existing accounts refreshed per tick.
    pub refresh_count: usize,
    /// Optional upper bound on the number of ticks. `None` means infinite.
    pub iterations: Option<u64>,
    /// Optional seed for the refresh picker. `None` seeds from the OS.
    pub seed: Option<u64>,
}

/// Builder for [`SimulationConfig`].
///
/// Obtain via [`SimulationConfig::builder`]; finalize with [`build`](Self::build).
#[derive(Debug)]
pub struct SimulationConfigBuilder {
    initial_batch: usize,
    period: Duration,
    refresh_count: usize,
    iterations: Option<u64>,
    seed: Option<u64>,
}

impl SimulationConfig {
    /// Create a builder.
    ///
    /// Default values: `initial_batch = 10`, `period = 3 s`,
    /// `refresh_count = 3`, `iterations = None`, `seed = None`.
    #[must_use]
    pub fn builder() -> SimulationConfigBuilder {
        SimulationConfigBuilder {
            initial_batch: 10,
            period: Duration::from_secs(3),
            refresh_count: 3,
            iterations: None,
            seed: None,
        }
    }
}

impl SimulationConfigBuilder {
    /// Accounts seeded into the window on start.
    #[must_use]
    pub fn initial_batch(mut self, count: usize) -> Self {
        self.initial_batch = count;
        self
    }

    /// Override the tick period.
    #[must_use]
    pub fn period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Accounts advanced by the generator on every tick.
    #[must_use]
    pub fn refresh_count(mut self, count: usize) -> Self {
        self.refresh_count = count;
        self
    }

    /// Set a finite tick count. Without this the loop runs until stopped.
    #[must_use]
    pub fn iterations(mut self, n: u64) -> Self {
        self.iterations = Some(n);
        self
    }

    /// Fix the RNG seed for a deterministic refresh order (useful in tests).
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidConfig`] when `period` is zero.
    #[must_use = "the Result must be checked; use ? or unwrap"]
    pub fn build(self) -> Result<SimulationConfig, SimulationError> {
        if self.period.is_zero() {
            return Err(SimulationError::InvalidConfig {
                reason: "period must be > 0".to_owned(),
            });
        }
        Ok(SimulationConfig {
            initial_batch: self.initial_batch,
            period: self.period,
            refresh_count: self.refresh_count,
            iterations: self.iterations,
            seed: self.seed,
        })
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Requests applied by the loop between ticks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Finish after the in-flight tick.
    Stop,
    /// Drop an account and its bot record.
    Remove(String),
}

/// Cloneable remote control for a running [`Simulation`].
#[derive(Debug, Clone)]
pub struct SimulationHandle {
    commands: mpsc::UnboundedSender<Command>,
}

impl SimulationHandle {
    /// Ask the loop to stop. No further ticks start once it is processed.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Stopped`] when the loop has already finished.
    pub fn stop(&self) -> Result<(), SimulationError> {
        self.send(Command::Stop)
    }

    /// Ask the loop to remove account `id`. Unknown ids are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Stopped`] when the loop has already finished.
    pub fn remove(&self, id: impl Into<String>) -> Result<(), SimulationError> {
        self.send(Command::Remove(id.into()))
    }

    fn send(&self, command: Command) -> Result<(), SimulationError> {
        if self.commands.send(command).is_err() {
            return Err(SimulationError::Stopped);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

/// Lifecycle of a [`Simulation`]: `Idle -> Running -> Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationState {
    Idle,
    Running,
    Stopped,
}

/// What a single tick did.
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    /// Id of the account generated by this tick.
    pub account_id: String,
    pub result: ClassificationResult,
    /// `true` when the account produced a new bot record.
    pub newly_flagged: bool,
    /// Accounts pushed out of the window.
    pub evicted: usize,
    /// Existing accounts advanced by the generator.
    pub refreshed: usize,
    /// Set when the bot alert could not be delivered.
    pub notify_error: Option<NotifyError>,
}

/// Per-account result shared by seeding and ticking.
struct Ingested {
    result: ClassificationResult,
    newly_flagged: bool,
    evicted: usize,
    notify_error: Option<NotifyError>,
}

enum Wake {
    Command(Option<Command>),
    Tick,
}

/// Single writer of the [`StreamWindow`].
///
/// Readers observe it through [`subscribe`](Self::subscribe); other tasks
/// control it through a [`SimulationHandle`].
#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    generator: TelemetryGenerator,
    window: StreamWindow,
    history: ActivityHistory,
    classified: u64,
    flagged: u64,
    state: SimulationState,
    rng: StdRng,
    snapshots: watch::Sender<Arc<DashboardSnapshot>>,
    command_tx: mpsc::UnboundedSender<Command>,
    command_rx: mpsc::UnboundedReceiver<Command>,
}

impl Simulation {
    /// Create an idle simulation writing into `window`.
    ///
    /// Seeds the refresh picker from `config.seed` if set, otherwise from the OS.
    #[must_use]
    pub fn new(config: SimulationConfig, generator: TelemetryGenerator, window: StreamWindow) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let (snapshots, _) = watch::channel(Arc::new(DashboardSnapshot::default()));
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        Self {
            config,
            generator,
            window,
            history: ActivityHistory::default(),
            classified: 0,
            flagged: 0,
            state: SimulationState::Idle,
            rng,
            snapshots,
            command_tx,
            command_rx,
        }
    }

    #[must_use]
    pub fn state(&self) -> SimulationState {
        self.state
    }

    #[must_use]
    pub fn window(&self) -> &StreamWindow {
        &self.window
    }

    /// Number of classifications performed so far.
    #[must_use]
    pub fn classified(&self) -> u64 {
        self.classified
    }

    /// Number of bots flagged so far, including ones since evicted.
    #[must_use]
    pub fn flagged(&self) -> u64 {
        self.flagged
    }

    /// Receiver of the latest published snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<DashboardSnapshot>> {
        self.snapshots.subscribe()
    }

    /// Remote control; commands are applied by [`run`](Self::run) between ticks.
    #[must_use]
    pub fn handle(&self) -> SimulationHandle {
        SimulationHandle {
            commands: self.command_tx.clone(),
        }
    }

    /// Seed the window, then tick every `period` until stopped.
    ///
    /// Ticks run inline, so they never overlap; periods missed by a slow tick
    /// are skipped. Stops cleanly on [`Command::Stop`] or once
    /// `config.iterations` ticks have run. Returns the number of ticks.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::AlreadyStarted`] unless the simulation is idle.
    pub async fn run<S, N>(
        &mut self,
        service: &ClassificationService<S>,
        notifier: &N,
    ) -> Result<u64, SimulationError>
    where
        S: ModelSource,
        N: Notifier,
    {
        if self.state != SimulationState::Idle {
            return Err(SimulationError::AlreadyStarted);
        }
        self.state = SimulationState::Running;
        tracing::info!(
            initial_batch = self.config.initial_batch,
            period = ?self.config.period,
            "simulation.run.started"
        );
        self.seed(service, notifier).await;

        let mut ticker =
            tokio::time::interval_at(Instant::now() + self.config.period, self.config.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut count = 0u64;
        loop {
            if let Some(max) = self.config.iterations
                && count >= max
            {
                tracing::info!("simulation.run.stopped: iteration limit reached");
                break;
            }

            let wake = tokio::select! {
                biased;
                command = self.command_rx.recv() => Wake::Command(command),
                _ = ticker.tick() => Wake::Tick,
            };

            match wake {
                Wake::Command(Some(Command::Stop) | None) => {
                    tracing::info!("simulation.run.stopped: stop requested");
                    break;
                }
                Wake::Command(Some(Command::Remove(id))) => {
                    self.remove(&id);
                }
                Wake::Tick => {
                    let outcome = self.tick_once(service, notifier).await;
                    count += 1;
                    tracing::info!(
                        tick = count,
                        account_id = %outcome.account_id,
                        is_bot = outcome.result.is_bot,
                        window_size = self.window.len(),
                        "simulation.tick.completed"
                    );
                }
            }
        }

        // Later sends fail with `Stopped`; removals accepted before the close
        // are still applied.
        self.command_rx.close();
        while let Ok(command) = self.command_rx.try_recv() {
            if let Command::Remove(id) = command {
                self.remove(&id);
            }
        }
        self.state = SimulationState::Stopped;
        Ok(count)
    }

    /// Run one tick now.
    ///
    /// Notification failures are logged and reported in the outcome.
    pub async fn tick_once<S, N>(
        &mut self,
        service: &ClassificationService<S>,
        notifier: &N,
    ) -> TickOutcome
    where
        S: ModelSource,
        N: Notifier,
    {
        let now = Utc::now();
        let account = self.generator.generate_account(now);
        let account_id = account.id.clone();
        let ingested = self.ingest(account, service, notifier).await;
        let refreshed = self.refresh(&account_id, now);
        self.history.record(ActivityPoint::sample(&self.window, now));
        self.publish();
        TickOutcome {
            account_id,
            result: ingested.result,
            newly_flagged: ingested.newly_flagged,
            evicted: ingested.evicted,
            refreshed,
            notify_error: ingested.notify_error,
        }
    }

    /// Remove `id` from the window and publish the change.
    ///
    /// Returns `false` when the id was unknown.
    pub fn remove(&mut self, id: &str) -> bool {
        let removed = self.window.remove(id);
        if removed {
            tracing::info!(account_id = %id, "simulation.account.removed");
            self.publish();
        }
        removed
    }

    async fn seed<S, N>(&mut self, service: &ClassificationService<S>, notifier: &N)
    where
        S: ModelSource,
        N: Notifier,
    {
        let now = Utc::now();
        let batch = self.generator.generate_batch(self.config.initial_batch, now);
        let mut flagged = 0usize;
        for account in batch {
            if self.ingest(account, service, notifier).await.newly_flagged {
                flagged += 1;
            }
        }
        self.history.record(ActivityPoint::sample(&self.window, now));
        self.publish();
        tracing::info!(
            seeded = self.config.initial_batch,
            flagged,
            "simulation.window.seeded"
        );
    }

    async fn ingest<S, N>(
        &mut self,
        account: Account,
        service: &ClassificationService<S>,
        notifier: &N,
    ) -> Ingested
    where
        S: ModelSource,
        N: Notifier,
    {
        let result = service.classify(&account).await;
        self.classified += 1;

        let mut newly_flagged = false;
        let mut notify_error = None;
        if result.is_bot {
            newly_flagged = self.window.record_bot(DetectedBot::from_result(&account, &result));
            if newly_flagged {
                self.flagged += 1;
                tracing::info!(
                    account_id = %account.id,
                    category = %result.category,
                    confidence = result.confidence,
                    "simulation.bot.detected"
                );
                let alert = BotAlert {
                    account: account.clone(),
                    category: result.category,
                    confidence: result.confidence,
                };
                // Best-effort delivery: a failed alert never stops the loop.
                if let Err(e) = notifier.notify(&alert).await {
                    tracing::warn!(account_id = %account.id, error = %e, "simulation.notify.failed");
                    notify_error = Some(e);
                }
            }
        }

        let evicted = self.window.push(account).len();
        Ingested {
            result,
            newly_flagged,
            evicted,
            notify_error,
        }
    }

    /// Advance up to `refresh_count` random accounts other than `fresh_id`.
    fn refresh(&mut self, fresh_id: &str, now: DateTime<Utc>) -> usize {
        let candidates: Vec<String> = self
            .window
            .accounts()
            .iter()
            .filter(|a| a.id != fresh_id)
            .map(|a| a.id.clone())
            .collect();
        let amount = self.config.refresh_count.min(candidates.len());
        let picked = rand::seq::index::sample(&mut self.rng, candidates.len(), amount);
        let generator = &self.generator;
        let mut refreshed = 0;
        for index in picked {
            if self
                .window
                .update_account(&candidates[index], |a| generator.advance_activity(a, now))
            {
                refreshed += 1;
            }
        }
        refreshed
    }

    fn publish(&self) {
        let snapshot = DashboardSnapshot::capture(
            &self.window,
            &self.history,
            self.classified,
            self.flagged,
        );
        self.snapshots.send_replace(Arc::new(snapshot));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use classifier::{
        ClassifierConfig, DecisionTree, EnsembleModel, FeatureName, FeatureSchema, ModelLoadError,
        Node,
    };
    use domain::ClassifierKind;
    use generator::GeneratorConfig;
    use std::cell::RefCell;
    use window::MAX_ACCOUNTS;

    // ------------------------------------------------------------------
    // Mock adapters
    // ------------------------------------------------------------------

    /// No artifact: the service runs on the heuristic fallback.
    struct MissingModel;

    impl ModelSource for MissingModel {
        async fn load(&self) -> Result<EnsembleModel, ModelLoadError> {
            Err(ModelLoadError::NotFound {
                location: "mock://none".to_owned(),
            })
        }

        fn describe(&self) -> String {
            "mock://none".to_owned()
        }
    }

    /// A one-leaf forest that flags everything.
    struct AlwaysBotModel;

    impl ModelSource for AlwaysBotModel {
        async fn load(&self) -> Result<EnsembleModel, ModelLoadError> {
            Ok(EnsembleModel::new(
                FeatureSchema::new(vec![FeatureName::FfRatio]),
                vec![DecisionTree::from_nodes(vec![Node::Leaf(1.0)])],
            ))
        }

        fn describe(&self) -> String {
            "mock://always-bot".to_owned()
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        alerts: RefCell<Vec<BotAlert>>,
    }

    impl Notifier for RecordingNotifier {
        async fn notify(&self, alert: &BotAlert) -> Result<(), NotifyError> {
            self.alerts.borrow_mut().push(alert.clone());
            Ok(())
        }
    }

    /// What [`ControllingNotifier`] sends through the handle.
    enum Control {
        Stop,
        RemoveFirstAlerted,
    }

    /// Sends one command from inside `notify` once `at_alert` alerts arrived,
    /// which lands it in the middle of a running tick.
    struct ControllingNotifier {
        handle: SimulationHandle,
        at_alert: usize,
        control: Control,
        alerted: RefCell<Vec<String>>,
        sent: RefCell<Option<Result<(), SimulationError>>>,
    }

    impl ControllingNotifier {
        fn new(handle: SimulationHandle, at_alert: usize, control: Control) -> Self {
            Self {
                handle,
                at_alert,
                control,
                alerted: RefCell::new(Vec::new()),
                sent: RefCell::new(None),
            }
        }
    }

    impl Notifier for ControllingNotifier {
        async fn notify(&self, alert: &BotAlert) -> Result<(), NotifyError> {
            let count = {
                let mut alerted = self.alerted.borrow_mut();
                alerted.push(alert.account.id.clone());
                alerted.len()
            };
            if count == self.at_alert {
                let result = match self.control {
                    Control::Stop => self.handle.stop(),
                    Control::RemoveFirstAlerted => {
                        let first = self.alerted.borrow()[0].clone();
                        self.handle.remove(first)
                    }
                };
                *self.sent.borrow_mut() = Some(result);
            }
            Ok(())
        }
    }

    struct FailingNotifier;

    impl Notifier for FailingNotifier {
        async fn notify(&self, _alert: &BotAlert) -> Result<(), NotifyError> {
            Err(NotifyError::DeliveryFailed {
                reason: "mock failure".to_owned(),
            })
        }
    }

    // ------------------------------------------------------------------
    // Test helpers
    // ------------------------------------------------------------------

    const GENERATOR_SEED: u64 = 7;

    fn generator() -> TelemetryGenerator {
        TelemetryGenerator::new(GeneratorConfig::builder().seed(GENERATOR_SEED).build().unwrap())
    }

    fn make_simulation(iterations: Option<u64>) -> Simulation {
        let mut builder = SimulationConfig::builder().seed(1);
        if let Some(n) = iterations {
            builder = builder.iterations(n);
        }
        Simulation::new(builder.build().unwrap(), generator(), StreamWindow::default())
    }

    fn service<S: ModelSource>(source: S) -> ClassificationService<S> {
        ClassificationService::new(source, ClassifierConfig::default())
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    #[test]
    fn builder_defaults() {
        let config = SimulationConfig::builder().build().unwrap();
        assert_eq!(config.initial_batch, 10);
        assert_eq!(config.period, Duration::from_secs(3));
        assert_eq!(config.refresh_count, 3);
        assert_eq!(config.iterations, None);
    }

    #[test]
    fn zero_period_is_rejected() {
        let result = SimulationConfig::builder().period(Duration::ZERO).build();
        assert!(matches!(result, Err(SimulationError::InvalidConfig { .. })));
    }

    // ------------------------------------------------------------------
    // Loop
    // ------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn twenty_ticks_fill_the_window() {
        let mut sim = make_simulation(Some(20));
        let snapshots = sim.subscribe();
        let svc = service(MissingModel);
        let notifier = RecordingNotifier::default();

        let ticks = sim.run(&svc, &notifier).await.unwrap();

        assert_eq!(ticks, 20);
        assert_eq!(sim.state(), SimulationState::Stopped);
        assert_eq!(sim.window().len(), (10 + 20).min(MAX_ACCOUNTS));
        assert_eq!(sim.classified(), 30);
        let snapshot = snapshots.borrow().clone();
        assert_eq!(snapshot.accounts.len(), 30);
        assert_eq!(snapshot.metrics.classified, 30);
        assert_eq!(snapshot.activity.len(), window::metrics::ACTIVITY_HISTORY_LEN);
        assert_eq!(notifier.alerts.borrow().len(), sim.window().detected_bots().len());
    }

    #[tokio::test(start_paused = true)]
    async fn window_stays_bounded() {
        let config = SimulationConfig::builder().initial_batch(4).iterations(10).build().unwrap();
        let mut sim = Simulation::new(config, generator(), StreamWindow::new(8).unwrap());
        sim.run(&service(MissingModel), &RecordingNotifier::default()).await.unwrap();
        assert_eq!(sim.window().len(), 8);
    }

    #[tokio::test(start_paused = true)]
    async fn every_new_bot_is_announced_once() {
        let mut sim = make_simulation(Some(5));
        let svc = service(AlwaysBotModel);
        let notifier = RecordingNotifier::default();
        sim.run(&svc, &notifier).await.unwrap();

        assert_eq!(notifier.alerts.borrow().len(), 15);
        assert_eq!(sim.window().detected_bots().len(), 15);
        let first_id = notifier.alerts.borrow()[0].account.id.clone();
        assert!(sim.window().is_flagged(&first_id));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_ends_the_loop_and_rejects_later_commands() {
        let mut sim = make_simulation(None);
        let handle = sim.handle();
        let svc = service(MissingModel);
        let notifier = RecordingNotifier::default();

        let (ticks, ()) = tokio::join!(sim.run(&svc, &notifier), async {
            // Ticks fire at 3, 6 and 9 seconds.
            tokio::time::sleep(Duration::from_secs(10)).await;
            handle.stop().unwrap();
        });

        assert_eq!(ticks, Ok(3));
        assert_eq!(sim.window().len(), 13);
        assert_eq!(handle.stop(), Err(SimulationError::Stopped));
        assert_eq!(handle.remove("anything"), Err(SimulationError::Stopped));
        assert_eq!(
            sim.run(&svc, &notifier).await,
            Err(SimulationError::AlreadyStarted)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn queued_removal_is_applied_between_ticks() {
        let mut sim = make_simulation(Some(2));
        // An identically seeded generator predicts the first seeded id.
        let first_id = generator().generate_account(Utc::now()).id;
        sim.handle().remove(first_id.clone()).unwrap();

        sim.run(&service(AlwaysBotModel), &RecordingNotifier::default())
            .await
            .unwrap();

        assert!(sim.window().get(&first_id).is_none());
        assert!(!sim.window().is_flagged(&first_id));
        assert_eq!(sim.window().len(), 11);
    }

    #[tokio::test(start_paused = true)]
    async fn removal_sent_during_last_tick_is_applied() {
        let mut sim = make_simulation(Some(1));
        let snapshots = sim.subscribe();
        // Ten seeded bots, then the single tick raises the eleventh alert.
        let notifier =
            ControllingNotifier::new(sim.handle(), 11, Control::RemoveFirstAlerted);

        let ticks = sim.run(&service(AlwaysBotModel), &notifier).await;

        assert_eq!(ticks, Ok(1));
        assert_eq!(*notifier.sent.borrow(), Some(Ok(())));
        let first_id = notifier.alerted.borrow()[0].clone();
        assert!(sim.window().get(&first_id).is_none());
        assert!(!sim.window().is_flagged(&first_id));
        assert_eq!(sim.window().len(), 10);
        assert_eq!(snapshots.borrow().accounts.len(), 10);
        assert_eq!(sim.state(), SimulationState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_during_a_tick_lets_it_finish() {
        let mut sim = make_simulation(None);
        let notifier = ControllingNotifier::new(sim.handle(), 11, Control::Stop);

        let ticks = sim.run(&service(AlwaysBotModel), &notifier).await;

        assert_eq!(ticks, Ok(1));
        assert_eq!(*notifier.sent.borrow(), Some(Ok(())));
        // The interrupted tick still pushed and flagged its account.
        let tick_id = notifier.alerted.borrow()[10].clone();
        assert_eq!(sim.window().accounts()[0].id, tick_id);
        assert!(sim.window().is_flagged(&tick_id));
        assert_eq!(sim.window().len(), 11);
        assert_eq!(sim.classified(), 11);
        assert_eq!(notifier.alerted.borrow().len(), 11);
        assert_eq!(sim.state(), SimulationState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn overall_rate_survives_eviction() {
        let config = SimulationConfig::builder().initial_batch(4).iterations(6).build().unwrap();
        let mut sim = Simulation::new(config, generator(), StreamWindow::new(4).unwrap());
        let snapshots = sim.subscribe();
        sim.run(&service(AlwaysBotModel), &RecordingNotifier::default())
            .await
            .unwrap();

        assert_eq!(sim.classified(), 10);
        assert_eq!(sim.flagged(), 10);
        let metrics = snapshots.borrow().metrics;
        assert_eq!(metrics.flagged, 10);
        assert!((metrics.overall_bot_rate - 1.0).abs() < 1e-12);
        assert_eq!(metrics.window_size, 4);
    }

    // ------------------------------------------------------------------
    // Single tick
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn failed_notification_is_reported_not_fatal() {
        let mut sim = make_simulation(None);
        let svc = service(AlwaysBotModel);

        let outcome = sim.tick_once(&svc, &FailingNotifier).await;

        assert!(outcome.result.is_bot);
        assert_eq!(outcome.result.classifier, ClassifierKind::Ensemble);
        assert!(outcome.newly_flagged);
        assert!(matches!(outcome.notify_error, Some(NotifyError::DeliveryFailed { .. })));
        assert!(sim.window().is_flagged(&outcome.account_id));
        assert_eq!(sim.window().accounts()[0].id, outcome.account_id);
    }

    #[tokio::test]
    async fn tick_refreshes_existing_accounts() {
        let mut sim = make_simulation(None);
        let svc = service(MissingModel);
        let notifier = RecordingNotifier::default();

        let first = sim.tick_once(&svc, &notifier).await;
        assert_eq!(first.refreshed, 0);
        sim.tick_once(&svc, &notifier).await;
        let third = sim.tick_once(&svc, &notifier).await;
        assert_eq!(third.refreshed, 2);
        let fourth = sim.tick_once(&svc, &notifier).await;
        assert_eq!(fourth.refreshed, 3);
    }

    #[tokio::test]
    async fn remove_publishes_snapshot() {
        let mut sim = make_simulation(None);
        let snapshots = sim.subscribe();
        let svc = service(MissingModel);
        let outcome = sim.tick_once(&svc, &RecordingNotifier::default()).await;
        assert_eq!(snapshots.borrow().accounts.len(), 1);

        assert!(sim.remove(&outcome.account_id));
        assert!(snapshots.borrow().accounts.is_empty());
        assert!(!sim.remove(&outcome.account_id));
    }
}
