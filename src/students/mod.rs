pub mod directory;
pub mod editor;
pub mod model;
pub mod pagination;

pub use directory::{DirectoryQuery, DirectorySnapshot, DirectoryView, PageSize};
pub use editor::{Field, StudentDraft, StudentEditor, ValidationErrors};
pub use model::{Student, StudentInput};
pub use pagination::{PageControls, PageItem};
