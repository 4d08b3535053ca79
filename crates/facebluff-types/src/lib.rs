//! Wire types shared between the HTTP layer and its clients.

pub mod api;
pub mod models;
