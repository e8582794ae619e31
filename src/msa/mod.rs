mod column;
mod row;

pub use column::{ColumnCounts, MsaByColumn};
pub use row::{MsaByRow, MsaRow, GAP, MAX_WINDOW_SPAN, PAD};
