pub mod config;
pub mod model;
pub mod repository;
pub mod time;
pub mod service;
pub mod usecase;

pub use config::Config;
pub use model::action_item::ExtractedActionItem;
pub use model::bucket::{Bucket, SubBucket, RouteResult};
pub use model::task::{Task, NewTask, TaskUpdate, Priority, Status};
pub use repository::{TaskTracker, FileTaskTracker};
pub use time::{DateParser, PhraseDateParser};
pub use service::extractor::{ActionItemExtractor, extract_action_items};
pub use service::due_date::{DueDateResolver, resolve_due_date};
pub use service::priority::classify;
pub use service::router::route;
pub use service::dto::{ImportReport, PlannedItem};
pub use usecase::import::ImportUseCase;
