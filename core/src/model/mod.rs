pub mod action_item;
pub mod bucket;
pub mod task;
