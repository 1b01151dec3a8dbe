//! Scope errors

use islet_dom::NodeId;
use islet_handler::HandlerError;

use crate::FragmentId;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScopeError {
    /// A claim was made with no fragment left to claim
    #[error("no pending fragment to claim ({claims} claims already made)")]
    NoPendingFragment { claims: usize },

    #[error("script {0} was not collected as a scoped script")]
    UnknownScript(NodeId),

    #[error("fragment {0} does not exist")]
    UnknownFragment(FragmentId),

    #[error("fragment {0} was already claimed")]
    AlreadyClaimed(FragmentId),

    #[error("scoped script {script} has no parent element")]
    OrphanScript { script: NodeId },

    #[error("event target {0} is not an element")]
    InvalidTarget(NodeId),

    #[error("handler on {element} fired before its fragment was claimed")]
    UnboundProducer { element: NodeId },

    #[error("on{event} handler of {element} failed: {source}")]
    Handler {
        element: NodeId,
        event: String,
        #[source]
        source: HandlerError,
    },

    #[error("no element named '{0}' in this fragment")]
    MissingName(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}
