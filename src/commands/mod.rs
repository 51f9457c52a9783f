pub mod clear_cache;
pub mod names_by_status;
pub mod not_today;
pub mod status_line;
pub mod summary;

pub use clear_cache::*;
pub use names_by_status::*;
pub use not_today::*;
pub use status_line::*;
pub use summary::*;
