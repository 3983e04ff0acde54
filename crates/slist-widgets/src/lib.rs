#![forbid(unsafe_code)]

//! Rows, list host, and the [`SimpleList`] controller.
//!
//! - [`RowRenderer`]: capability contract for producing rows (kind tag,
//!   fixed metrics, bind).
//! - [`ListHost`]: a [`VisualCollection`](slist_runtime::VisualCollection)
//!   that mounts rows, applies batches, and computes a one-column layout.
//! - [`RowActions`]: row-to-owner event channel.
//! - [`SimpleList`]: ties a host to a reconciler and a published source.

pub mod actions;
pub mod config;
pub mod host;
pub mod row;
pub mod simple_list;

pub use actions::{ActionButton, RowActions, RowEvent};
pub use config::ListConfig;
pub use host::{BatchSummary, ListHost, RowConfigurator};
pub use row::{Insets, RowFrame, RowMetrics, RowRenderer};
pub use simple_list::SimpleList;
