// Rust guideline compliant 2026-10-19

//! Classification service: lazy model loading plus per-call fallback.
//!
//! Entry points: [`ClassificationService::classify`],
//! [`ClassificationService::ensure_loaded`], [`ClassificationService::state`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use domain::{Account, ClassificationResult, ClassifierKind};
use tokio::sync::OnceCell;

use crate::config::ClassifierConfig;
use crate::ensemble::EnsembleClassifier;
use crate::fallback::HeuristicFallbackClassifier;
use crate::model::EnsembleModel;
use crate::{ModelLoadError, clamp_unit, features};

/// Reason reported when no rule fires.
pub const NO_SUSPICIOUS_PATTERNS: &str = "No suspicious patterns detected";

// ---------------------------------------------------------------------------
// Port
// ---------------------------------------------------------------------------

/// Hexagonal port: where the ensemble artifact comes from.
///
/// Called at most once per [`ClassificationService`].
#[expect(
    async_fn_in_trait,
    reason = "no dyn dispatch needed; internal workspace only"
)]
pub trait ModelSource {
    /// Fetch and decode the model.
    ///
    /// # Errors
    ///
    /// Returns [`ModelLoadError`] when the artifact is missing, unreadable or
    /// invalid. The service then runs on the fallback for its whole lifetime.
    async fn load(&self) -> Result<EnsembleModel, ModelLoadError>;

    /// Human-readable location, used in log events.
    fn describe(&self) -> String;
}

// ---------------------------------------------------------------------------
// ModelState
// ---------------------------------------------------------------------------

/// Lifecycle of the ensemble inside a [`ClassificationService`].
///
/// `Unloaded -> Loading -> Ready | FallbackOnly`. Both end states are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelState {
    /// No classification has been requested yet.
    Unloaded,
    /// The first load is in flight.
    Loading,
    /// The ensemble is available.
    Ready,
    /// Loading failed; every call uses the heuristic fallback.
    FallbackOnly,
}

// ---------------------------------------------------------------------------
// ClassificationService
// ---------------------------------------------------------------------------

/// Classifies accounts with the ensemble when it is available and with the
/// heuristic fallback otherwise.
///
/// The model is loaded on the first call to [`classify`](Self::classify) or
/// [`ensure_loaded`](Self::ensure_loaded). Concurrent first callers share a
/// single load.
#[derive(Debug)]
pub struct ClassificationService<S: ModelSource> {
    source: S,
    config: ClassifierConfig,
    fallback: HeuristicFallbackClassifier,
    /// `Some` once loaded, `None` after a failed load.
    ensemble: OnceCell<Option<EnsembleClassifier>>,
    /// Set while a load is in flight. Cleared again if that load is
    /// cancelled, so the state falls back to `Unloaded`.
    loading: AtomicBool,
}

impl<S: ModelSource> ClassificationService<S> {
    /// Create an unloaded service. No I/O happens until the first call.
    #[must_use]
    pub fn new(source: S, config: ClassifierConfig) -> Self {
        let fallback =
            HeuristicFallbackClassifier::new(config.fallback_rules.clone(), config.fallback_cutoff);
        Self {
            source,
            config,
            fallback,
            ensemble: OnceCell::new(),
            loading: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    #[must_use]
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ModelState {
        match self.ensemble.get() {
            Some(Some(_)) => ModelState::Ready,
            Some(None) => ModelState::FallbackOnly,
            None if self.loading.load(Ordering::Acquire) => ModelState::Loading,
            None => ModelState::Unloaded,
        }
    }

    /// Trigger the load if it has not happened yet and wait for it.
    pub async fn ensure_loaded(&self) -> ModelState {
        self.ensemble().await;
        self.state()
    }

    /// Classify one account. Never fails.
    ///
    /// Uses the ensemble when it is loaded and its traversal succeeds,
    /// otherwise the heuristic fallback. An inference failure affects this
    /// call only; the next call tries the ensemble again.
    pub async fn classify(&self, account: &Account) -> ClassificationResult {
        if let Some(ensemble) = self.ensemble().await {
            let vector = features::extract(account, ensemble.model().schema());
            match ensemble.predict(&vector) {
                Ok(prediction) => {
                    let confidence = ensemble.confidence(&vector);
                    tracing::debug!(
                        account_id = %account.id,
                        mean = prediction.mean,
                        is_bot = prediction.label,
                        "classifier.ensemble.predicted"
                    );
                    return self.package(
                        prediction.label,
                        confidence.value,
                        confidence.triggered,
                        ClassifierKind::Ensemble,
                    );
                }
                Err(e) => {
                    tracing::warn!(account_id = %account.id, error = %e, "classifier.inference.failed");
                }
            }
        }
        let verdict = self.fallback.classify_account(account);
        tracing::debug!(
            account_id = %account.id,
            score = verdict.score,
            is_bot = verdict.is_bot,
            "classifier.fallback.scored"
        );
        let confidence = verdict.confidence();
        self.package(verdict.is_bot, confidence, verdict.triggered, ClassifierKind::Fallback)
    }

    async fn ensemble(&self) -> Option<&EnsembleClassifier> {
        self.ensemble.get_or_init(|| self.load_once()).await.as_ref()
    }

    async fn load_once(&self) -> Option<EnsembleClassifier> {
        let _loading = LoadingFlag::raise(&self.loading);
        let location = self.source.describe();
        tracing::info!(source = %location, "classifier.model.loading");
        match self.source.load().await {
            Ok(model) => {
                tracing::info!(
                    source = %location,
                    name = model.name(),
                    version = model.version(),
                    trees = model.trees().len(),
                    features = model.schema().len(),
                    "classifier.model.loaded"
                );
                Some(EnsembleClassifier::new(
                    Arc::new(model),
                    self.config.signal_rules.clone(),
                ))
            }
            Err(e) => {
                tracing::warn!(
                    source = %location,
                    error = %e,
                    "classifier.model.load_failed: using heuristic fallback"
                );
                None
            }
        }
    }

    fn package(
        &self,
        is_bot: bool,
        confidence: f64,
        triggered: Vec<String>,
        classifier: ClassifierKind,
    ) -> ClassificationResult {
        let confidence = clamp_unit(confidence);
        let reason = if triggered.is_empty() {
            NO_SUSPICIOUS_PATTERNS.to_owned()
        } else {
            triggered.join("; ")
        };
        ClassificationResult {
            is_bot,
            confidence,
            reason,
            category: self.config.categories.for_verdict(is_bot, confidence),
            classifier,
        }
    }
}

/// Holds `loading` up for as long as the load future lives.
///
/// Dropping the future mid-load clears the flag. On completion the cell is
/// filled before anyone can observe the cleared flag.
struct LoadingFlag<'a>(&'a AtomicBool);

impl<'a> LoadingFlag<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag)
    }
}

impl Drop for LoadingFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
