// Application layer - Use case interactors

pub mod container;
pub mod session_interactor;

// Re-export interactors
pub use container::{AppContainer, DefaultAppContainer};
pub use session_interactor::{NoticeLevel, SessionEvent, SessionInteractor};
