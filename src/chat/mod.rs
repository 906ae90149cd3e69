pub mod filter;
pub mod formatter;
pub mod session;

pub use filter::TopicFilter;
pub use session::ChatSession;
