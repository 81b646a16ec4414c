//! Effects produced by state transitions

/// Effects to be executed after state transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Ask the gateway for the next gathering reply
    RequestReply,

    /// Ask the gateway for the final project
    RequestArtifact,
}
