mod walk;

pub(crate) use walk::resolve_root;
pub use walk::{scan, ScanOptions, ScanOutput};
