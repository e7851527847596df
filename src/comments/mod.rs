//! Post-booking feedback. Comments are written through the item catalog
//! (`POST /items/{id}/comment`), so this module has no routes of its own.

pub mod dto;
pub mod repo;
pub mod repo_types;
pub mod services;
