pub mod chat;
pub mod knowledge;
pub mod onboard;
pub mod status;
