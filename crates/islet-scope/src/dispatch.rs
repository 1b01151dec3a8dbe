//! Event Dispatch
//!
//! Runs inline handlers along the propagation path of an event. Handlers
//! of event-bound elements see their fragment's exports first, then
//! `event`, then the properties of the element itself, then the global
//! scope. Other inline handlers run without exports.

use islet_dom::{Document, Event, EventPhase, NodeId};
use islet_handler::{
    CallContext, ElementBinding, EventBinding, HandlerError, Program, ScopeChain, Value,
};

use crate::{Exports, ScopeError, ScopeRegistry};

/// What happened while an event was dispatched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchOutcome {
    /// Handlers that completed without error
    pub handlers_run: usize,
    pub default_prevented: bool,
    pub propagation_stopped: bool,
    /// Handler failures, in the order they happened
    pub errors: Vec<ScopeError>,
}

impl DispatchOutcome {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

impl ScopeRegistry {
    /// Fire an event named `event_name` at `target`
    pub fn dispatch(
        &self,
        doc: &mut Document,
        target: NodeId,
        event_name: &str,
    ) -> Result<DispatchOutcome, ScopeError> {
        self.dispatch_event(doc, Event::named(event_name, target))
    }

    /// Fire a prepared event at its target.
    ///
    /// Handler errors are logged and collected; only an invalid target
    /// fails the whole dispatch.
    pub fn dispatch_event(
        &self,
        doc: &mut Document,
        mut event: Event,
    ) -> Result<DispatchOutcome, ScopeError> {
        let target = event.target;
        if !doc.tree().is_element(target) {
            return Err(ScopeError::InvalidTarget(target));
        }

        let mut path = vec![target];
        if event.bubbles {
            let tree = doc.tree();
            path.extend(tree.ancestors(target).filter(|&a| tree.is_element(a)));
        }

        tracing::debug!(
            "Dispatching {} at {} ({} elements on path)",
            event.event_type.name(),
            target,
            path.len()
        );

        let mut outcome = DispatchOutcome::default();
        for (i, &current) in path.iter().enumerate() {
            event.current_target = Some(current);
            event.phase = if i == 0 { EventPhase::AtTarget } else { EventPhase::Bubbling };

            self.invoke(doc, &mut event, current, &mut outcome);

            if event.is_propagation_stopped() {
                break;
            }
        }

        event.current_target = None;
        event.phase = EventPhase::None;
        outcome.default_prevented = event.is_default_prevented();
        outcome.propagation_stopped = event.is_propagation_stopped();
        Ok(outcome)
    }

    /// Run the handler of `element` for the current event, if it has one
    fn invoke(
        &self,
        doc: &mut Document,
        event: &mut Event,
        element: NodeId,
        outcome: &mut DispatchOutcome,
    ) {
        let event_name = event.event_type.name().to_string();
        let handler_error = |source: HandlerError| ScopeError::Handler {
            element,
            event: event_name.clone(),
            source,
        };

        let result = if self.is_event_bound(element) {
            let Some(handler) = self.handler(element, &event_name) else {
                return;
            };
            match self.producer_for(element) {
                None => Err(ScopeError::UnboundProducer { element }),
                Some(producer) => handler
                    .program
                    .as_ref()
                    .map_err(|e| handler_error(e.clone()))
                    .and_then(|program| {
                        let exports = producer();
                        self.run(program, doc, event, element, Some(&exports))
                            .map_err(&handler_error)
                    }),
            }
        } else {
            let attribute = format!("{}{}", self.config().handler_prefix, event_name);
            let tree = doc.tree();
            let Some(source) = tree.get_attribute(element, &attribute).map(str::to_string) else {
                return;
            };
            islet_handler::compile(&source)
                .and_then(|program| self.run(&program, doc, event, element, None))
                .map_err(&handler_error)
        };

        match result {
            Ok(()) => outcome.handlers_run += 1,
            Err(err) => {
                tracing::warn!("{}", err);
                outcome.errors.push(err);
            }
        }
    }

    fn run(
        &self,
        program: &Program,
        doc: &mut Document,
        event: &mut Event,
        element: NodeId,
        exports: Option<&Exports>,
    ) -> Result<(), HandlerError> {
        let mut chain = ScopeChain::new();
        if let Some(exports) = exports {
            chain = chain.with(exports);
        }
        let chain = chain
            .with(&EventBinding)
            .with(&ElementBinding)
            .with(self.globals());

        let mut cx = CallContext::new(doc, event, element);
        let result = islet_handler::run(program, &mut cx, &chain)?;

        // Inline handler semantics: returning false cancels the event
        if result == Value::Bool(false) {
            cx.event.prevent_default();
        }
        Ok(())
    }
}
