use std::fmt;

/// Non-fatal conditions met while updating the changelog.
/// These are reported to the user and the run continues.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// The log query found no release-note fragments to remove
    NoStaleFragments { range: String },
    /// The hard reset reverts fragment removals staged earlier in the run
    FragmentRemovalDiscarded { count: usize },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::NoStaleFragments { range } => {
                write!(
                    f,
                    "No release-note fragments changed in '{}'; nothing to remove",
                    range
                )
            }
            BoundaryWarning::FragmentRemovalDiscarded { count } => {
                write!(
                    f,
                    "Resetting to HEAD discards the {} release-note fragment removal(s) staged earlier \
                     (pass --keep-fragment-removal to commit them with the changelog)",
                    count
                )
            }
        }
    }
}
