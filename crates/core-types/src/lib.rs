pub mod enums;
pub mod error;
pub mod slug;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{FundEventType, MeetingSource, MeetingStatus, UserRole};
pub use error::CoreError;
pub use slug::slug_base;
pub use structs::{
    FundHistoryRecord, Listener, Meeting, NewListener, NewMeeting, NewPitcher, Pitcher,
    ProfileUpdate,
};
