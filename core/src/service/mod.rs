pub mod dto;
pub mod due_date;
pub mod extractor;
pub mod priority;
pub mod router;
