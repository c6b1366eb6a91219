pub mod app;
pub mod card;

pub use app::AppError;
pub use card::CardOutcome;
