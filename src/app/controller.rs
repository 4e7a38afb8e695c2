use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;

use crate::adapters::{TomlConfigStore, TomlHistoryFile};
use crate::app::constraints::ConstraintSet;
use crate::app::history_store::HistoryStore;
use crate::app::latest::LatestWins;
use crate::app::matcher::NameMatcher;
use crate::app::reconciler::Reconciler;
use crate::domain::{
    AppConfig, Board, Candidate, DomainError, HistoryChange, HistoryEvent, HistoryKind,
    IdentityDomain, IdentityKey, ItemAction, MatchResult, Port, Presentation, PresentationItem,
};
use crate::infrastructure::init_logging;
use crate::ports::{CatalogProvider, ConfigStore, HistoryPersistence};

/// Pinned and recent stores of one identity domain.
struct DomainHistory {
    pinned: HistoryStore,
    recent: HistoryStore,
}

impl DomainHistory {
    async fn open(
        domain: IdentityDomain,
        config: &AppConfig,
        persistence: &Arc<dyn HistoryPersistence>,
    ) -> Self {
        let pinned = HistoryStore::open(
            HistoryKind::Pinned,
            domain.slot(HistoryKind::Pinned),
            config.history.pinned_capacity,
            Arc::clone(persistence),
        )
        .await;
        let recent = HistoryStore::open(
            HistoryKind::Recent,
            domain.slot(HistoryKind::Recent),
            Some(config.history.recent_capacity),
            Arc::clone(persistence),
        )
        .await;
        Self { pinned, recent }
    }

    fn store(&self, kind: HistoryKind) -> &HistoryStore {
        match kind {
            HistoryKind::Pinned => &self.pinned,
            HistoryKind::Recent => &self.recent,
        }
    }
}

/// Application controller that owns configuration, history and matching,
/// and builds picker lists for ports and boards.
pub struct PickerController {
    config: RwLock<AppConfig>,
    config_store: Arc<dyn ConfigStore>,
    matcher: RwLock<NameMatcher>,
    reconciler: RwLock<Reconciler>,
    boards: DomainHistory,
    ports: DomainHistory,
    board_requests: LatestWins,
    port_requests: LatestWins,
    _log_guard: Option<WorkerGuard>,
}

impl PickerController {
    /// Initialize the controller from the OS application directories.
    /// This sets up configuration, logging, and the history file.
    pub async fn new() -> Result<Self, DomainError> {
        // Step 1: Initialize config store
        let config_store = Arc::new(TomlConfigStore::new()?);

        // Step 2: Load configuration
        let config = config_store.load()?;

        // Step 3: Initialize logging
        let log_guard = init_logging(&config_store.logs_dir(), &config.logging)?;

        info!("Device picker starting up");

        // Step 4: Open history next to the config file
        let persistence: Arc<dyn HistoryPersistence> =
            Arc::new(TomlHistoryFile::in_dir(&config_store.data_dir()));

        let mut controller = Self::assemble(config, config_store, persistence).await;
        controller._log_guard = log_guard;
        Ok(controller)
    }

    /// Build a controller from explicit collaborators. Logging is left to the
    /// host.
    pub async fn from_parts(
        config_store: Arc<dyn ConfigStore>,
        persistence: Arc<dyn HistoryPersistence>,
    ) -> Result<Self, DomainError> {
        let config = config_store.load()?;
        Ok(Self::assemble(config, config_store, persistence).await)
    }

    async fn assemble(
        config: AppConfig,
        config_store: Arc<dyn ConfigStore>,
        persistence: Arc<dyn HistoryPersistence>,
    ) -> Self {
        let boards = DomainHistory::open(IdentityDomain::Boards, &config, &persistence).await;
        let ports = DomainHistory::open(IdentityDomain::Ports, &config, &persistence).await;

        info!(
            min_fuzzy_score = config.matching.min_fuzzy_score,
            recent_capacity = config.history.recent_capacity,
            recent_display_cap = config.history.recent_display_cap,
            "PickerController initialized"
        );

        Self {
            matcher: RwLock::new(NameMatcher::new(&config.matching)),
            reconciler: RwLock::new(Reconciler::new(&config.history)),
            config: RwLock::new(config),
            config_store,
            boards,
            ports,
            board_requests: LatestWins::new(),
            port_requests: LatestWins::new(),
            _log_guard: None,
        }
    }

    /// Get the current configuration.
    pub fn config(&self) -> AppConfig {
        self.config.read().clone()
    }

    /// Update the configuration.
    ///
    /// Matching and display settings apply to the next call. History
    /// capacities are read when the stores are opened.
    pub fn update_config(&self, config: AppConfig) -> Result<(), DomainError> {
        // Save to disk
        self.config_store.save(&config)?;

        *self.matcher.write() = NameMatcher::new(&config.matching);
        *self.reconciler.write() = Reconciler::new(&config.history);

        // Update in-memory config
        *self.config.write() = config;

        info!("Configuration updated");
        Ok(())
    }

    fn domain(&self, domain: IdentityDomain) -> &DomainHistory {
        match domain {
            IdentityDomain::Boards => &self.boards,
            IdentityDomain::Ports => &self.ports,
        }
    }

    fn requests(&self, domain: IdentityDomain) -> &LatestWins {
        match domain {
            IdentityDomain::Boards => &self.board_requests,
            IdentityDomain::Ports => &self.port_requests,
        }
    }

    fn store(&self, domain: IdentityDomain, kind: HistoryKind) -> &HistoryStore {
        self.domain(domain).store(kind)
    }

    /// Keys of one history list, most recent first.
    pub fn history(&self, domain: IdentityDomain, kind: HistoryKind) -> Vec<IdentityKey> {
        self.store(domain, kind).items()
    }

    /// Subscribe to changes of one history list.
    pub fn subscribe(
        &self,
        domain: IdentityDomain,
        kind: HistoryKind,
    ) -> broadcast::Receiver<HistoryEvent> {
        self.store(domain, kind).subscribe()
    }

    /// Build the picker list for `catalog`.
    ///
    /// Returns `None` when another reconciliation of the same domain was
    /// started before this one finished.
    pub async fn reconcile<C: Candidate>(
        &self,
        catalog: &[C],
        constraints: &ConstraintSet<C>,
    ) -> Option<Presentation<C>> {
        let history = self.domain(C::DOMAIN);
        let pinned = history.pinned.items();
        let recent = history.recent.items();
        let reconciler = self.reconciler.read().clone();

        let presentation = self
            .requests(C::DOMAIN)
            .run(reconciler.reconcile(catalog, &pinned, &recent, constraints))
            .await;
        if presentation.is_none() {
            debug!(domain = %C::DOMAIN, "Reconciliation superseded");
        }
        presentation
    }

    /// Build the picker list from the provider's current snapshot.
    pub async fn reconcile_from<C, P>(
        &self,
        provider: &P,
        constraints: &ConstraintSet<C>,
    ) -> Option<Presentation<C>>
    where
        C: Candidate,
        P: CatalogProvider<C> + ?Sized,
    {
        let catalog = provider.snapshot();
        self.reconcile(&catalog, constraints).await
    }

    pub async fn reconcile_ports(
        &self,
        catalog: &[Port],
        constraints: &ConstraintSet<Port>,
    ) -> Option<Presentation<Port>> {
        self.reconcile(catalog, constraints).await
    }

    pub async fn reconcile_boards(
        &self,
        catalog: &[Board],
        constraints: &ConstraintSet<Board>,
    ) -> Option<Presentation<Board>> {
        self.reconcile(catalog, constraints).await
    }

    /// Best board for a user-entered or saved `name`, optionally within one
    /// platform.
    pub fn match_board(
        &self,
        name: &str,
        boards: &[Board],
        platform: Option<&str>,
    ) -> Option<(Board, MatchResult)> {
        let matcher = self.matcher.read();
        matcher
            .find_best_match(name, boards, platform)
            .map(|m| (m.candidate.clone(), m.result))
    }

    /// Name-only board history entries (pinned first) standing for `name`.
    ///
    /// Entries are revived from their keys, so `Board::name` holds the
    /// normalized name (e.g. "arduino uno"), not the spelling the user saw.
    /// Hosts should label them from their own data.
    pub fn match_board_history(&self, name: &str) -> Vec<Board> {
        let mut seen = HashSet::new();
        let entries: Vec<Board> = self
            .boards
            .pinned
            .items()
            .into_iter()
            .chain(self.boards.recent.items())
            .filter(|key| seen.insert(key.clone()))
            .filter_map(|key| Board::from_identity_key(&key))
            .collect();
        NameMatcher::match_history(name, &entries)
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn pin<C: Candidate>(&self, candidate: &C) -> Result<HistoryChange, DomainError> {
        self.pin_key(C::DOMAIN, candidate.identity_key()).await
    }

    pub async fn pin_key(
        &self,
        domain: IdentityDomain,
        key: IdentityKey,
    ) -> Result<HistoryChange, DomainError> {
        info!(%domain, key = %key, "Pinning");
        self.store(domain, HistoryKind::Pinned).add(key).await
    }

    pub async fn unpin<C: Candidate>(&self, candidate: &C) -> Result<bool, DomainError> {
        self.unpin_key(C::DOMAIN, &candidate.identity_key()).await
    }

    pub async fn unpin_key(
        &self,
        domain: IdentityDomain,
        key: &IdentityKey,
    ) -> Result<bool, DomainError> {
        info!(%domain, key = %key, "Unpinning");
        self.store(domain, HistoryKind::Pinned).remove(key).await
    }

    /// Record that `candidate` was just used.
    pub async fn remember<C: Candidate>(
        &self,
        candidate: &C,
    ) -> Result<HistoryChange, DomainError> {
        self.remember_key(C::DOMAIN, candidate.identity_key()).await
    }

    pub async fn remember_key(
        &self,
        domain: IdentityDomain,
        key: IdentityKey,
    ) -> Result<HistoryChange, DomainError> {
        self.store(domain, HistoryKind::Recent).add(key).await
    }

    /// Drop `candidate` from the recent list.
    pub async fn forget<C: Candidate>(&self, candidate: &C) -> Result<bool, DomainError> {
        self.forget_key(C::DOMAIN, &candidate.identity_key()).await
    }

    pub async fn forget_key(
        &self,
        domain: IdentityDomain,
        key: &IdentityKey,
    ) -> Result<bool, DomainError> {
        self.store(domain, HistoryKind::Recent).remove(key).await
    }

    /// Perform one of the actions offered on a presented item.
    ///
    /// Returns whether a history list changed.
    pub async fn apply_action<C: Candidate>(
        &self,
        item: &PresentationItem<C>,
        action: ItemAction,
    ) -> Result<bool, DomainError> {
        let domain = C::DOMAIN;
        match action {
            ItemAction::Pin => Ok(self.pin_key(domain, item.key.clone()).await?
                == HistoryChange::Changed),
            ItemAction::Unpin => self.unpin_key(domain, &item.key).await,
            ItemAction::RemoveFromHistory => self.forget_key(domain, &item.key).await,
        }
    }

    /// Get the data directory path.
    pub fn data_dir(&self) -> String {
        self.config_store.data_dir().to_string_lossy().to_string()
    }

    /// Get the logs directory path.
    pub fn logs_dir(&self) -> String {
        self.config_store.logs_dir().to_string_lossy().to_string()
    }

    /// Get the config file path.
    pub fn config_path(&self) -> String {
        self.config_store.config_path().to_string_lossy().to_string()
    }
}
