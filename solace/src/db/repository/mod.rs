mod advice;
mod jobs;
mod memories;
mod notes;
mod quotes;
mod users;

pub use advice::AdviceRepository;
pub use jobs::AdviceJobRepository;
pub use memories::MemoryRepository;
pub use notes::NoteRepository;
pub use quotes::QuoteRepository;
pub use users::UserRepository;
