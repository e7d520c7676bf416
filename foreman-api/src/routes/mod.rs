//! Route handlers for the FOREMAN control surface.

pub mod conversation;
pub mod decision;
pub mod health;
