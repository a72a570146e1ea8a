//! Background worker loops

mod due_scan;

pub use due_scan::DueScanWorker;
