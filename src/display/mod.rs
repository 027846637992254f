pub mod cell;
pub mod columns;
pub mod progress;
pub mod table;

pub use cell::{CellFormatter, MembershipBadge, format_cell};
pub use columns::{ColumnStrategy, ColumnStrategyKind, infer_columns};
pub use progress::ProgressSpinner;
pub use table::{OutputFormat, TableDisplay};
