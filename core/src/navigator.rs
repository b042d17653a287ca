//! Navigation state machine over the verb taxonomy.
//!
//! One `Navigator` serves every `NavigationMode`:
//!
//! - `DrillDown`: `select` moves one level down along a single chain,
//!   `back` / `back_to` / `reset` move up. Every move refetches the level
//!   that becomes visible.
//! - `Selective`: `toggle_expand` opens or closes any visible node.
//! - `Overview`: groups, families and subfamilies are loaded by `load`.
//!
//! Transitions take `&self`. The inner mutex is only held between awaits,
//! and every fetch carries a ticket from the `RequestSequencer` so a
//! response that lost a race is dropped instead of applied.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;

use crate::builder::{TaxonomyTree, TreeBuilder};
use crate::config::{NavigationMode, NavigatorConfig};
use crate::error::{DataIntegrityWarning, Result, TaxonomyError};
use crate::expansion::ExpansionSet;
use crate::fetcher::{FetchedLevel, TaxonomyFetcher, fetch_children};
use crate::level::{Level, NodeKey};
use crate::node::TaxonomyNode;
use crate::sequence::{RequestSequencer, RequestSlot, Ticket};
use crate::state::{Breadcrumb, NavigationState};

const EVENT_CAPACITY: usize = 64;

/// Result of a transition that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// A new tree was published.
    Applied,
    /// Nothing to do (e.g. `back` at the groups level).
    Unchanged,
    /// A newer request for the same slot won; this response was dropped.
    Superseded,
}

/// Side channel for observers (banners, status lines, logs).
#[derive(Debug, Clone)]
pub enum NavigatorEvent {
    TreeUpdated(Arc<TaxonomyTree>),
    TransitionFailed(TaxonomyError),
    IntegrityWarning(DataIntegrityWarning),
}

struct Inner {
    builder: TreeBuilder,
    state: Arc<NavigationState>,
    expansion: Arc<ExpansionSet>,
    tree: Arc<TaxonomyTree>,
    sequencer: RequestSequencer,
    /// Bumped on every applied navigation; drill-down tickets compare it.
    generation: u64,
}

pub struct Navigator {
    fetcher: Arc<dyn TaxonomyFetcher>,
    mode: NavigationMode,
    root_label: String,
    inner: Mutex<Inner>,
    events: broadcast::Sender<NavigatorEvent>,
}

impl std::fmt::Debug for Navigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigator")
            .field("mode", &self.mode)
            .field("root_label", &self.root_label)
            .finish_non_exhaustive()
    }
}

impl Navigator {
    pub fn new(fetcher: Arc<dyn TaxonomyFetcher>, config: NavigatorConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let tree = TaxonomyTree::unloaded(config.root_label.clone(), config.root_color.clone());
        Self {
            fetcher,
            mode: config.mode,
            root_label: config.root_label.clone(),
            inner: Mutex::new(Inner {
                builder: TreeBuilder::new(config.root_label, config.root_color),
                state: Arc::new(NavigationState::initial()),
                expansion: Arc::new(ExpansionSet::new()),
                tree: Arc::new(tree),
                sequencer: RequestSequencer::new(),
                generation: 0,
            }),
            events,
        }
    }

    pub fn mode(&self) -> NavigationMode {
        self.mode
    }

    pub fn state(&self) -> Arc<NavigationState> {
        Arc::clone(&self.lock().state)
    }

    pub fn tree(&self) -> Arc<TaxonomyTree> {
        Arc::clone(&self.lock().tree)
    }

    pub fn expansion(&self) -> Arc<ExpansionSet> {
        Arc::clone(&self.lock().expansion)
    }

    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        self.state().breadcrumbs(&self.root_label)
    }

    /// Number of fetches whose response is still awaited.
    pub fn in_flight(&self) -> usize {
        self.lock().sequencer.in_flight()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NavigatorEvent> {
        self.events.subscribe()
    }

    /// Fetches the groups (and in overview mode everything down to the
    /// subfamilies) and publishes the first tree. Clears any selection and
    /// expansion.
    pub async fn load(&self) -> Result<TransitionOutcome> {
        match self.mode {
            NavigationMode::DrillDown => self.navigate(NavigationState::initial()).await,
            NavigationMode::Selective | NavigationMode::Overview => self.reload().await,
        }
    }

    /// Drills into `key`, which must be one of the displayed nodes.
    pub async fn select(&self, key: NodeKey) -> Result<TransitionOutcome> {
        let next = {
            let inner = self.lock();
            self.require_mode(NavigationMode::DrillDown, "select")?;
            let displayed = inner
                .builder
                .store()
                .children(inner.state.focus().as_ref())
                .is_some_and(|keys| keys.contains(&key));
            let stored = inner.builder.store().get(&key).filter(|_| displayed);
            let Some(stored) = stored else {
                return Err(self.fail(TaxonomyError::invalid_transition(format!(
                    "{key} is not among the displayed {}",
                    inner.state.current_level().plural()
                ))));
            };
            inner.state.select(&stored.node).map_err(|e| self.fail(e))?
        };
        self.navigate(next).await
    }

    /// One level up. A no-op at the groups level.
    pub async fn back(&self) -> Result<TransitionOutcome> {
        self.require_mode(NavigationMode::DrillDown, "back")?;
        let Some(next) = self.state().back() else {
            return Ok(TransitionOutcome::Unchanged);
        };
        self.navigate(next).await
    }

    /// Walks back until `level` is displayed (breadcrumb click).
    pub async fn back_to(&self, level: Level) -> Result<TransitionOutcome> {
        self.require_mode(NavigationMode::DrillDown, "back_to")?;
        let current = self.state();
        let next = current.back_to(level);
        if next == *current {
            return Ok(TransitionOutcome::Unchanged);
        }
        self.navigate(next).await
    }

    /// Back to the groups with nothing selected or expanded.
    pub async fn reset(&self) -> Result<TransitionOutcome> {
        self.load().await
    }

    /// Opens `key` when collapsed, closes it and its subtree when expanded.
    pub async fn toggle_expand(&self, key: NodeKey) -> Result<TransitionOutcome> {
        let expanded = self.lock().expansion.contains(&key);
        if expanded {
            self.collapse(key)
        } else {
            self.expand(key).await
        }
    }

    /// Fetches the children of `key` and marks it expanded.
    ///
    /// Verbs have no children and are left alone. Nodes whose children are
    /// already loaded (including loaded-empty) are expanded without a fetch.
    pub async fn expand(&self, key: NodeKey) -> Result<TransitionOutcome> {
        let ticket = {
            let mut inner = self.lock();
            self.require_mode(NavigationMode::Selective, "expand")?;
            if !inner.builder.store().contains(&key) {
                return Err(self.fail(TaxonomyError::invalid_transition(format!(
                    "{key} is not visible"
                ))));
            }
            if inner.expansion.contains(&key) || key.level.child().is_none() {
                return Ok(TransitionOutcome::Unchanged);
            }
            if inner.builder.store().is_loaded(Some(&key)) {
                Arc::make_mut(&mut inner.expansion).insert(key);
                self.publish(&mut inner);
                return Ok(TransitionOutcome::Applied);
            }
            inner.sequencer.issue(RequestSlot::Node(key))
        };

        tracing::debug!(key = %key, seq = ticket.seq, "expanding node");
        let fetched = fetch_children(self.fetcher.as_ref(), Some(&key)).await;

        let mut inner = self.lock();
        let current = inner.sequencer.is_latest(&ticket) && inner.builder.store().contains(&key);
        if !current {
            tracing::debug!(key = %key, seq = ticket.seq, "dropping superseded expansion");
            return Ok(TransitionOutcome::Superseded);
        }
        inner.sequencer.settle(&ticket);
        let fetched = fetched.map_err(|e| self.fail(e))?;

        inner.builder.record_level(Some(key), fetched);
        Arc::make_mut(&mut inner.expansion).insert(key);
        self.publish(&mut inner);
        Ok(TransitionOutcome::Applied)
    }

    /// Closes `key`, discarding its loaded subtree and every expanded
    /// descendant. A no-op when `key` is not expanded.
    pub fn collapse(&self, key: NodeKey) -> Result<TransitionOutcome> {
        self.require_mode(NavigationMode::Selective, "collapse")?;
        let mut inner = self.lock();
        if !inner.expansion.contains(&key) {
            return Ok(TransitionOutcome::Unchanged);
        }
        let removed = inner.builder.detach(&key);
        // Pending expansions below `key` must not land if `key` is reopened.
        inner.sequencer.forget(std::iter::once(&key).chain(&removed));
        Arc::make_mut(&mut inner.expansion).collapse(&key, &removed);
        tracing::debug!(key = %key, removed = removed.len(), "collapsed node");
        self.publish(&mut inner);
        Ok(TransitionOutcome::Applied)
    }

    /// Drill-down move: fetch the level `next` displays, then swap state.
    async fn navigate(&self, next: NavigationState) -> Result<TransitionOutcome> {
        let focus = next.focus();
        let (ticket, generation) = {
            let mut inner = self.lock();
            (
                inner.sequencer.issue(RequestSlot::Navigation),
                inner.generation,
            )
        };

        tracing::debug!(
            level = %next.current_level(),
            focus = ?focus,
            seq = ticket.seq,
            "navigating"
        );
        let fetched = fetch_children(self.fetcher.as_ref(), focus.as_ref()).await;

        let mut inner = self.lock();
        if !Self::is_current(&inner, &ticket, generation) {
            tracing::debug!(seq = ticket.seq, "dropping superseded navigation");
            return Ok(TransitionOutcome::Superseded);
        }
        inner.sequencer.settle(&ticket);
        let fetched = fetched.map_err(|e| self.fail(e))?;

        let kept: Vec<NodeKey> = next.path().iter().map(|node| node.key()).collect();
        let left: Vec<NodeKey> = inner
            .state
            .path()
            .iter()
            .map(|node| node.key())
            .filter(|key| !kept.contains(key))
            .collect();
        for key in left.iter().rev() {
            inner.builder.detach(key);
        }
        inner.builder.record_level(focus, fetched);
        inner.state = Arc::new(next);
        inner.generation += 1;
        self.publish(&mut inner);
        Ok(TransitionOutcome::Applied)
    }

    /// Selective/overview load: fresh groups, empty expansion set.
    async fn reload(&self) -> Result<TransitionOutcome> {
        let (ticket, generation) = {
            let mut inner = self.lock();
            (
                inner.sequencer.issue(RequestSlot::Navigation),
                inner.generation,
            )
        };

        tracing::debug!(mode = %self.mode, seq = ticket.seq, "loading taxonomy");
        let fetched = match self.mode {
            NavigationMode::Overview => self.fetch_overview().await,
            _ => self
                .fetcher
                .fetch_groups()
                .await
                .map(|groups| vec![(None, groups)]),
        };

        let mut inner = self.lock();
        if !Self::is_current(&inner, &ticket, generation) {
            tracing::debug!(seq = ticket.seq, "dropping superseded load");
            return Ok(TransitionOutcome::Superseded);
        }
        let levels = fetched.map_err(|e| {
            inner.sequencer.settle(&ticket);
            self.fail(e)
        })?;

        // Pending expansions belong to the tree being replaced.
        inner.sequencer.invalidate_all();
        inner.builder.clear();
        for (parent, level) in levels {
            inner.builder.record_level(parent, level);
        }
        inner.state = Arc::new(NavigationState::initial());
        inner.expansion = Arc::new(ExpansionSet::new());
        inner.generation += 1;
        self.publish(&mut inner);
        Ok(TransitionOutcome::Applied)
    }

    /// Groups, then families and subfamilies. Any failing fetch fails the
    /// whole load so a partial overview is never published.
    async fn fetch_overview(&self) -> Result<Vec<(Option<NodeKey>, FetchedLevel)>> {
        let groups = self.fetcher.fetch_groups().await?;
        let mut pending: Vec<NodeKey> = groups.nodes.iter().map(TaxonomyNode::key).collect();
        let mut levels = vec![(None, groups)];

        while let Some(parent) = pending.pop() {
            let level = fetch_children(self.fetcher.as_ref(), Some(&parent)).await?;
            if parent.level == Level::Group {
                pending.extend(level.nodes.iter().map(TaxonomyNode::key));
            }
            levels.push((Some(parent), level));
        }
        Ok(levels)
    }

    fn is_current(inner: &Inner, ticket: &Ticket, generation: u64) -> bool {
        inner.sequencer.is_latest(ticket) && inner.generation == generation
    }

    fn require_mode(&self, mode: NavigationMode, operation: &str) -> Result<()> {
        if self.mode == mode {
            return Ok(());
        }
        Err(self.fail(TaxonomyError::invalid_transition(format!(
            "{operation} is not available in {} mode",
            self.mode
        ))))
    }

    /// Reports a failed transition and hands the error back.
    fn fail(&self, error: TaxonomyError) -> TaxonomyError {
        tracing::debug!(category = error.category().as_str(), "transition failed: {error}");
        let _ = self.events.send(NavigatorEvent::TransitionFailed(error.clone()));
        error
    }

    fn publish(&self, inner: &mut Inner) {
        let tree = match self.mode {
            NavigationMode::DrillDown => inner.builder.single_path(&inner.state),
            NavigationMode::Selective => inner.builder.selective(&inner.expansion),
            NavigationMode::Overview => inner.builder.overview(),
        };

        for warning in tree.warnings() {
            if inner.tree.warnings().contains(warning) {
                continue;
            }
            tracing::warn!(
                key = %warning.key,
                backend_total = warning.backend_total,
                computed = warning.computed,
                "data integrity warning: {warning}"
            );
            let _ = self
                .events
                .send(NavigatorEvent::IntegrityWarning(warning.clone()));
        }

        let tree = Arc::new(tree);
        inner.tree = Arc::clone(&tree);
        let _ = self.events.send(NavigatorEvent::TreeUpdated(tree));
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
