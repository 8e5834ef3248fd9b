//! Web interface components for the ATM page
//!
//! The page is a single route: `Home` picks one of three views from the page
//! controller state and `AccountPanel` holds the ATM controls.

/// Page root and wallet detection
mod home;
pub use home::Home;

/// Balance, deposit, withdrawal and limit controls
mod account;
pub use account::AccountPanel;

/// Owner information card
mod owner;
pub use owner::OwnerCard;

/// Session transaction list
mod activity;
pub use activity::ActivityList;
