pub mod entities;
pub mod moderation;
pub mod types;
