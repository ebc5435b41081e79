pub mod content;
pub mod preferences;
