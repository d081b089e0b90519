pub mod error;
pub mod family;
pub mod import;
pub mod project;
pub mod reader;
pub mod transform;
pub mod writer;

pub use error::{ErrorCode, ProjectError, Result};
pub use family::{Family, FamilyPolicy, ImportOptions};
pub use project::Project;
