//! Graph API operations, grouped by resource

pub mod client;
pub mod mail;
pub mod me;
pub mod notebooks;
pub mod users;
