#![forbid(unsafe_code)]

//! Row renderer for [`ExampleData`].

use slist_widgets::{ActionButton, Insets, RowMetrics, RowRenderer};

use crate::data::ExampleData;
use crate::palette::SystemColor;

/// Action emitted by a row's remove button.
pub const REMOVE_ACTION: &str = "remove";

/// Rendered state of one example row.
#[derive(Debug, Default)]
pub struct ExampleRowView {
    /// Color name, centered.
    pub title: String,
    pub background: Option<SystemColor>,
    pub button_title: &'static str,
    /// Remove button text color; matches the background.
    pub button_tint: Option<SystemColor>,
    pub corner_radius: f32,
    /// Wired by the screen once the row is bound.
    pub remove: Option<ActionButton<u64>>,
}

impl ExampleRowView {
    /// Press the remove button, if wired.
    pub fn tap_remove(&self) -> bool {
        match &self.remove {
            Some(button) => {
                button.press();
                true
            }
            None => false,
        }
    }
}

/// Large colored rows with a remove button.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExampleRow;

impl RowRenderer<ExampleData> for ExampleRow {
    const KIND: &'static str = "example_reuse_identifier";
    type Row = ExampleRowView;

    fn metrics() -> RowMetrics {
        RowMetrics::new(300.0, 10.0, Insets::uniform(10.0))
    }

    fn bind(&self, row: &mut ExampleRowView, item: &ExampleData, _position: usize) {
        row.title = item.color.name().to_owned();
        row.background = Some(item.color);
        row.button_title = "Remove";
        row.button_tint = Some(item.color);
        row.corner_radius = 8.0;
    }
}
