//! Composes presenters into a tree.
//!
//! A presenter may own a [`View`] and puts child presenters into named slots of that view, or
//! shows them as popups. Revealing or hiding a presenter carries over to everything attached to it,
//! and a presenter is only ever attached in one place.

mod config;
mod error;
pub mod events;
mod lifecycle;
mod popup;
mod presenter;
mod rect;
mod slot;
#[cfg(test)]
mod testing;
mod tree;
mod view;

pub use config::Config;
pub use error::TreeError;
pub use popup::PopupPlacement;
pub use presenter::{AsAny, Behavior, Context, Presenter, PresenterId};
pub use rect::Rect;
pub use slot::SlotKey;
pub use tree::{Occupancy, PresenterTree};
pub use view::View;
