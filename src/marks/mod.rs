pub mod model;
pub mod view;

pub use model::{Grade, Mark, MarkInput, MarkUpdate};
pub use view::{MarkDraft, MarkRow, MarksSnapshot, MarksSummary, MarksView};
