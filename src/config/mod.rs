pub mod ai;

pub use ai::AiConfig;
