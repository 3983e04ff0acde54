#![forbid(unsafe_code)]

//! Example color list built on SimpleList.
//!
//! Seven rows, one per system color, each with a remove button that asks
//! the view model to drop its entry. The view model republishes and the
//! list reconciles.

pub mod data;
pub mod palette;
pub mod row;
pub mod screen;

pub use data::{ExampleData, ExampleViewModel};
pub use palette::SystemColor;
pub use row::{ExampleRow, ExampleRowView, REMOVE_ACTION};
pub use screen::ExampleScreen;
