//! Hierarchy navigation and weight aggregation for the verb taxonomy.
//!
//! The crate turns per-level backend responses (groups, families,
//! subfamilies, verbs) into immutable weighted trees ready for a sunburst
//! renderer, and drives the navigation state machine on top of them.
//! Transport lives behind [`TaxonomyFetcher`]; see `verbnav-backend-client`
//! for the REST implementation.

#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod builder;
pub mod chart;
pub mod config;
pub mod error;
pub mod expansion;
pub mod fetcher;
pub mod level;
pub mod navigator;
pub mod node;
pub mod sequence;
pub mod state;
pub mod store;

pub use builder::{TaxonomyTree, TreeBuilder, TreeRoot};
pub use chart::ChartNode;
pub use config::{NavigationMode, NavigatorConfig};
pub use error::{DataIntegrityWarning, ErrorCategory, Result, TaxonomyError};
pub use expansion::ExpansionSet;
pub use fetcher::{FetchedLevel, TaxonomyFetcher, fetch_children};
pub use level::{Level, NodeId, NodeKey, ParseNodeKeyError};
pub use navigator::{Navigator, NavigatorEvent, TransitionOutcome};
pub use node::{Children, ColorInfo, TaxonomyNode, Weight};
pub use state::{Breadcrumb, NavigationState};
pub use store::{NodeStore, StoredNode};
