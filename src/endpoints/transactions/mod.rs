pub mod get_stats;
pub use get_stats::get_stats;

pub mod create;
pub use create::create;

pub mod update;
pub use update::update;

pub mod delete;
pub use delete::delete;

pub mod query;
pub use query::query;

pub mod import;
pub use import::import;
