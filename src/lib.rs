mod rfc3339;

pub mod policy;
pub mod render;
pub mod sanitize;
pub mod types;
pub mod utils;

pub use policy::AllowPolicy;
pub use sanitize::{sanitize, Sanitizer};
pub use types::{BlogPost, ContentExport, FaqEntry, Project};
