//! roomodes core library: mode types, discovery, validation, ordering.
//!
//! - [`types`]: [`Mode`], [`Category`], [`CategorizedModeSet`]
//! - [`category`]: [`CategoryTable`] slug → category rules
//! - [`discovery`]: directory walk and per-file parsing
//! - [`validation`]: schema checks producing [`ValidationReport`]s
//! - [`ordering`]: the [`Strategy`] family and [`OrderingOptions`]
//! - [`config`]: strategy configuration files

pub mod category;
pub mod config;
pub mod discovery;
pub mod error;
pub mod ordering;
pub mod types;
pub mod validation;

pub use category::CategoryTable;
pub use config::{parse_strategy_argument, StrategyConfig};
pub use discovery::{discover, DiscoveryOptions, DiscoveryOutcome, DiscoveryWarning, RejectedMode};
pub use error::{ConfigurationError, DiscoveryError, ValidationError};
pub use ordering::{order, OrderingOptions, Strategy, WithinCategoryOrder};
pub use types::{CategorizedModeSet, Category, GroupEntry, GroupRestriction, Mode, ModeSource, Slug};
pub use validation::{validate, ValidationLevel, ValidationReport, Validator};
