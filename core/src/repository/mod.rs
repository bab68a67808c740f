pub mod file;
pub mod traits;

// Re-export
pub use file::FileTaskTracker;
pub use traits::TaskTracker;
