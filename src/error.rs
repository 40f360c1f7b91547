use crate::presenter::PresenterId;
use crate::slot::SlotKey;
use core::fmt;

/// Errors that may occur when mutating a presenter tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeError {
    /// The presenter is not in the tree (it was never inserted or has been destroyed).
    NoSuchPresenter(PresenterId),
    /// The insert would put a presenter inside itself or one of its descendants.
    ///
    /// `(parent, child)`
    OwnershipViolation(PresenterId, PresenterId),
    /// Strict mode only: the child does not occupy the slot it is being removed from.
    NotInSlot {
        parent: PresenterId,
        key: SlotKey,
        child: PresenterId,
    },
    /// Strict mode only: the child is not one of the parent’s popups.
    NotInPopupSlot {
        parent: PresenterId,
        child: PresenterId,
    },
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TreeError::NoSuchPresenter(id) => write!(f, "no such presenter: {}", id),
            TreeError::OwnershipViolation(parent, child) => write!(
                f,
                "cannot insert {} into {}: it would become its own ancestor",
                child, parent
            ),
            TreeError::NotInSlot { parent, key, child } => write!(
                f,
                "{} does not occupy {} of {}",
                child, key, parent
            ),
            TreeError::NotInPopupSlot { parent, child } => {
                write!(f, "{} is not a popup of {}", child, parent)
            }
        }
    }
}

impl std::error::Error for TreeError {}
