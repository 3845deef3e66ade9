pub mod auth;
pub mod chargers;
pub mod commands;
pub mod events;
pub mod sessions;
pub mod settlements;
pub mod sites;
