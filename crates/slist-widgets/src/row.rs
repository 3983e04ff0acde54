#![forbid(unsafe_code)]

//! Row renderer contract and row layout metrics.
//!
//! A [`RowRenderer`] turns an item into the content of a visual row. The
//! host creates rows with `Row::default()` and calls
//! [`bind`](RowRenderer::bind) only when a row is mounted for an inserted
//! item or when an item's content changed; moves never rebind.
//!
//! Metrics are constant per row kind and read once, when the host builds
//! its layout.

/// Content margins around the row column.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Insets {
    pub top: f32,
    pub leading: f32,
    pub bottom: f32,
    pub trailing: f32,
}

impl Insets {
    /// Same margin on every side.
    #[must_use]
    pub const fn uniform(value: f32) -> Self {
        Self {
            top: value,
            leading: value,
            bottom: value,
            trailing: value,
        }
    }

    /// Top plus bottom.
    #[must_use]
    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }

    /// Leading plus trailing.
    #[must_use]
    pub fn horizontal(&self) -> f32 {
        self.leading + self.trailing
    }

    fn sanitized(self) -> Self {
        Self {
            top: non_negative(self.top),
            leading: non_negative(self.leading),
            bottom: non_negative(self.bottom),
            trailing: non_negative(self.trailing),
        }
    }
}

/// Fixed layout metrics for one row kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowMetrics {
    /// Height of every row.
    pub height: f32,
    /// Gap between consecutive rows.
    pub spacing: f32,
    /// Margins around the whole column.
    pub insets: Insets,
}

impl RowMetrics {
    /// Height used when a renderer reports an unusable one.
    pub const FALLBACK_HEIGHT: f32 = 44.0;

    #[must_use]
    pub const fn new(height: f32, spacing: f32, insets: Insets) -> Self {
        Self {
            height,
            spacing,
            insets,
        }
    }

    /// Replace non-finite or negative values.
    ///
    /// A zero or invalid height falls back to [`Self::FALLBACK_HEIGHT`];
    /// spacing and insets fall back to zero.
    #[must_use]
    pub fn sanitized(&self) -> Self {
        let height = if self.height.is_finite() && self.height > 0.0 {
            self.height
        } else {
            Self::FALLBACK_HEIGHT
        };
        Self {
            height,
            spacing: non_negative(self.spacing),
            insets: self.insets.sanitized(),
        }
    }

    /// Distance from one row's top edge to the next row's.
    #[must_use]
    pub fn stride(&self) -> f32 {
        self.height + self.spacing
    }
}

impl Default for RowMetrics {
    fn default() -> Self {
        Self::new(Self::FALLBACK_HEIGHT, 0.0, Insets::default())
    }
}

fn non_negative(value: f32) -> f32 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        0.0
    }
}

/// Vertical placement of one row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowFrame {
    pub y: f32,
    pub height: f32,
}

impl RowFrame {
    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Whether the frame overlaps the half-open band `[top, bottom)`.
    #[must_use]
    pub fn intersects(&self, top: f32, bottom: f32) -> bool {
        self.y < bottom && self.bottom() > top
    }
}

/// Produces visual rows for items of type `T`.
///
/// # Example
///
/// ```
/// use slist_widgets::{Insets, RowMetrics, RowRenderer};
///
/// struct Label;
///
/// impl RowRenderer<String> for Label {
///     const KIND: &'static str = "label";
///     type Row = String;
///
///     fn metrics() -> RowMetrics {
///         RowMetrics::new(24.0, 4.0, Insets::uniform(8.0))
///     }
///
///     fn bind(&self, row: &mut String, item: &String, position: usize) {
///         *row = format!("{position}: {item}");
///     }
/// }
/// ```
pub trait RowRenderer<T> {
    /// Stable tag for the row kind, used to register and reuse rows.
    const KIND: &'static str;

    /// Visual row instance. Fresh rows start from `Default`.
    type Row: Default + 'static;

    /// Layout metrics shared by every row of this kind.
    fn metrics() -> RowMetrics;

    /// Populate `row` with `item`, shown at `position`.
    fn bind(&self, row: &mut Self::Row, item: &T, position: usize);
}
