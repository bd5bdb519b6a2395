pub mod content;
pub mod user_state;

pub use content::ContentItem;
pub use user_state::{Filters, UserProfile, UserState};
