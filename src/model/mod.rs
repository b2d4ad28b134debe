pub mod name;
pub mod response;

pub use name::Name;
pub use response::{RecordData, RecordSet, Response};
