/// Misconfigured component props, reported before anything is composed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    #[error("a Bare component takes either `pure_by` or `should_update`, not both")]
    ConflictingUpdateGuards,
}
