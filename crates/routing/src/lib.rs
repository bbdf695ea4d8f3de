//! Role-based routing for the Kenkō portal.
//!
//! The [`RouteTable`] maps client paths to an [`Access`] rule, [`evaluate`]
//! turns a session state and a rule into a [`Decision`], and the [`Router`]
//! applies decisions through a [`Navigator`].

pub mod guard;
pub mod navigator;
pub mod paths;
pub mod router;
pub mod table;

pub use guard::{evaluate, Access, Decision, RoleSet};
pub use navigator::{HistoryNavigator, Navigator};
pub use router::{RoutingError, Router, Visit};
pub use table::{RouteMatch, RouteRule, RouteTable, RouteTableBuilder, RouteTableError};
