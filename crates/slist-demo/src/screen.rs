#![forbid(unsafe_code)]

//! The example screen: a list of colored rows, each with a remove button.

use slist_runtime::Subscription;
use slist_widgets::{ListConfig, RowEvent, SimpleList};

use crate::data::{ExampleData, ExampleViewModel};
use crate::row::{ExampleRow, REMOVE_ACTION};

/// Example list wired to its view model.
pub struct ExampleScreen {
    view_model: ExampleViewModel,
    list: SimpleList<ExampleData, ExampleRow>,
    _actions: Subscription,
}

impl ExampleScreen {
    #[must_use]
    pub fn new(config: ListConfig) -> Self {
        Self::with_view_model(ExampleViewModel::new(), config)
    }

    #[must_use]
    pub fn with_view_model(view_model: ExampleViewModel, config: ListConfig) -> Self {
        let mut list = SimpleList::new(ExampleRow, config);

        let actions = list.actions().clone();
        list.configure_rows(move |row, item, _| {
            row.remove = Some(actions.button(item.id, REMOVE_ACTION));
        });

        let owner = view_model.clone();
        let subscription = list.actions().subscribe(move |event| {
            if let RowEvent::ActionRequested { key, action } = event {
                if *action == REMOVE_ACTION {
                    owner.remove_item(*key);
                }
            }
        });

        list.bind_source(view_model.subject());
        Self {
            view_model,
            list,
            _actions: subscription,
        }
    }

    #[must_use]
    pub fn view_model(&self) -> &ExampleViewModel {
        &self.view_model
    }

    #[must_use]
    pub fn list(&self) -> &SimpleList<ExampleData, ExampleRow> {
        &self.list
    }

    /// Press the remove button on the row at `position`.
    pub fn tap_remove(&self, position: usize) -> bool {
        let button = self
            .list
            .with_host(|host| host.row(position).and_then(|row| row.remove.clone()))
            .flatten();
        match button {
            Some(button) => {
                button.press();
                true
            }
            None => false,
        }
    }

    /// Select the row at `position`.
    pub fn select(&self, position: usize) -> Option<u64> {
        self.list.select(position)
    }

    /// Finish pending animations until the list is idle. Returns how many
    /// were finished.
    pub fn settle(&self) -> usize {
        let mut finished = 0;
        while self.list.finish_animation() {
            finished += 1;
        }
        finished
    }

    /// One text line per row: offset, title, color, button.
    #[must_use]
    pub fn render(&self) -> Vec<String> {
        self.list
            .with_host(|host| {
                host.frames()
                    .into_iter()
                    .zip(host.rows())
                    .map(|(frame, row)| {
                        let hex = row.background.map(|color| color.hex()).unwrap_or_default();
                        format!(
                            "{:>7.1}  {:<14} {:<8} [{}]",
                            frame.y, row.title, hex, row.button_title
                        )
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Release the list. The view model stays usable.
    pub fn teardown(&mut self) {
        self.list.teardown();
    }
}
