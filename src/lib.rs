pub mod ai;
pub mod ai_response;
pub mod app;
pub mod error;
pub mod evaluator;
pub mod logging;
pub mod message;
pub mod prompt;
pub mod save;
pub mod scenario;
pub mod session;
pub mod settings;
pub mod strategy;
pub mod tui;
pub mod ui;

// Re-export commonly used items for easier access
pub use ai::{GameAI, OpenAIGenerator, TurnGenerator};
pub use ai_response::TurnResult;
pub use error::{AIError, AppError};
pub use message::{Message, Role};
pub use scenario::{Catalog, Persona, Scenario};
pub use session::{GamePhase, GameSession};
pub use strategy::Strategy;
