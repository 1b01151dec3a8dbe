//! Scope Registry
//!
//! Session state shared by collection, claims and dispatch: the FIFO of
//! pending fragments, the producer bound to each event-bound element and
//! the compiled handlers of those elements.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::rc::Rc;

use islet_dom::NodeId;

use crate::{
    CompiledHandler, Exports, ExportsProducer, FragmentId, GlobalScope, NamedElements,
    PendingFragment, ScopeConfig, ScopeError, UnderflowPolicy,
};

/// Pending fragments and element bindings of one document
pub struct ScopeRegistry {
    config: ScopeConfig,
    next_id: u32,
    /// Keyed by id, so iteration order is collection order
    pending: BTreeMap<FragmentId, PendingFragment>,
    /// Every script ever collected, claimed or not
    scripts: HashMap<NodeId, FragmentId>,
    claimed: HashSet<FragmentId>,
    handlers: HashMap<NodeId, Vec<CompiledHandler>>,
    producers: HashMap<NodeId, ExportsProducer>,
    claims: usize,
    globals: GlobalScope,
}

impl ScopeRegistry {
    /// Registry with the default configuration
    pub fn new() -> Self {
        Self::build(ScopeConfig::default())
    }

    /// Registry with a validated configuration
    pub fn with_config(config: ScopeConfig) -> Result<Self, ScopeError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: ScopeConfig) -> Self {
        Self {
            config,
            next_id: 0,
            pending: BTreeMap::new(),
            scripts: HashMap::new(),
            claimed: HashSet::new(),
            handlers: HashMap::new(),
            producers: HashMap::new(),
            claims: 0,
            globals: GlobalScope::new(),
        }
    }

    pub fn config(&self) -> &ScopeConfig {
        &self.config
    }

    // ========================================================================
    // Claims
    // ========================================================================

    /// Claim the oldest pending fragment.
    ///
    /// `producer` is bound to every event-bound element of the fragment but
    /// not invoked; bound handlers call it each time they run.
    pub fn expose<F>(&mut self, producer: F) -> Result<NamedElements, ScopeError>
    where
        F: Fn() -> Exports + 'static,
    {
        let Some(id) = self.pending.keys().next().copied() else {
            return self.underflow();
        };
        self.bind(id, Rc::new(producer))
    }

    /// Claim the fragment collected for `script`
    pub fn expose_for<F>(
        &mut self,
        script: NodeId,
        producer: F,
    ) -> Result<NamedElements, ScopeError>
    where
        F: Fn() -> Exports + 'static,
    {
        let id = self
            .fragment_for_script(script)
            .ok_or(ScopeError::UnknownScript(script))?;
        self.claim(id, producer)
    }

    /// Claim a fragment by id
    pub fn claim<F>(&mut self, id: FragmentId, producer: F) -> Result<NamedElements, ScopeError>
    where
        F: Fn() -> Exports + 'static,
    {
        if self.claimed.contains(&id) {
            return Err(ScopeError::AlreadyClaimed(id));
        }
        if !self.pending.contains_key(&id) {
            return Err(ScopeError::UnknownFragment(id));
        }
        self.bind(id, Rc::new(producer))
    }

    fn bind(
        &mut self,
        id: FragmentId,
        producer: ExportsProducer,
    ) -> Result<NamedElements, ScopeError> {
        let fragment = self.pending.remove(&id).ok_or(ScopeError::UnknownFragment(id))?;

        for &element in &fragment.event_bound {
            if self.producers.insert(element, producer.clone()).is_some() {
                tracing::debug!("Fragment {} rebinds element {}", id, element);
            }
        }

        self.claimed.insert(id);
        self.claims += 1;
        tracing::debug!(
            "Claimed fragment {} (script {}): {} names, {} event-bound",
            id,
            fragment.script,
            fragment.named.len(),
            fragment.event_bound.len()
        );

        Ok(fragment.named)
    }

    fn underflow(&self) -> Result<NamedElements, ScopeError> {
        match self.config.underflow {
            UnderflowPolicy::Error => Err(ScopeError::NoPendingFragment { claims: self.claims }),
            UnderflowPolicy::Empty => {
                tracing::warn!(
                    "Scoped script claimed with no pending fragment ({} claims made)",
                    self.claims
                );
                Ok(NamedElements::new())
            }
        }
    }

    // ========================================================================
    // Collection
    // ========================================================================

    /// Enqueue a fragment and give it the next id
    pub(crate) fn enqueue(
        &mut self,
        script: NodeId,
        container: NodeId,
        named: NamedElements,
        event_bound: Vec<NodeId>,
    ) -> FragmentId {
        let id = FragmentId(self.next_id);
        self.next_id += 1;

        self.scripts.insert(script, id);
        self.pending.insert(
            id,
            PendingFragment {
                id,
                script,
                container,
                named,
                event_bound,
            },
        );
        id
    }

    pub(crate) fn has_handlers(&self, element: NodeId) -> bool {
        self.handlers.contains_key(&element)
    }

    pub(crate) fn set_handlers(&mut self, element: NodeId, handlers: Vec<CompiledHandler>) {
        self.handlers.insert(element, handlers);
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Fragments collected but not claimed yet
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn claimed_len(&self) -> usize {
        self.claimed.len()
    }

    /// Pending fragments, oldest first
    pub fn pending(&self) -> impl Iterator<Item = &PendingFragment> {
        self.pending.values()
    }

    pub fn fragment_for_script(&self, script: NodeId) -> Option<FragmentId> {
        self.scripts.get(&script).copied()
    }

    pub fn is_collected(&self, script: NodeId) -> bool {
        self.scripts.contains_key(&script)
    }

    pub fn is_claimed(&self, id: FragmentId) -> bool {
        self.claimed.contains(&id)
    }

    /// Collected scripts in collection order
    pub fn collected_scripts(&self) -> Vec<NodeId> {
        let mut scripts: Vec<_> = self.scripts.iter().map(|(&script, &id)| (id, script)).collect();
        scripts.sort_unstable();
        scripts.into_iter().map(|(_, script)| script).collect()
    }

    /// Producer bound to an event-bound element by its fragment's claim
    pub fn producer_for(&self, element: NodeId) -> Option<ExportsProducer> {
        self.producers.get(&element).cloned()
    }

    /// Whether collection compiled handlers for this element
    pub fn is_event_bound(&self, element: NodeId) -> bool {
        self.handlers.contains_key(&element)
    }

    pub fn handlers_for(&self, element: NodeId) -> &[CompiledHandler] {
        self.handlers.get(&element).map(Vec::as_slice).unwrap_or_default()
    }

    pub(crate) fn handler(&self, element: NodeId, event: &str) -> Option<&CompiledHandler> {
        self.handlers_for(element).iter().find(|h| h.event == event)
    }

    pub fn globals(&self) -> &GlobalScope {
        &self.globals
    }

    pub fn globals_mut(&mut self) -> &mut GlobalScope {
        &mut self.globals
    }

    /// Drop everything collected and bound; configuration and globals stay
    pub fn reset(&mut self) {
        tracing::debug!(
            "Resetting scope registry ({} pending, {} claimed)",
            self.pending.len(),
            self.claimed.len()
        );
        self.next_id = 0;
        self.pending.clear();
        self.scripts.clear();
        self.claimed.clear();
        self.handlers.clear();
        self.producers.clear();
        self.claims = 0;
    }
}

impl Default for ScopeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
