pub mod draft;
pub mod ordering;
pub mod types;

pub use draft::PollDraft;
pub use ordering::sort_polls;
pub use types::{Id, Poll, PollList, PollOption, PollPayload, PollType};
