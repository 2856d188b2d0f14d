//! Core business logic - framework-agnostic operations over the entities.
//!
//! Every write follows the same shape: validate the input, check for a
//! duplicate, write the row (inside a transaction when more than one row
//! changes) and return the stored model.

pub mod access;
pub mod blog;
pub mod cuisine;
pub mod dish;
pub mod favorite;
pub mod feature;
pub mod gallery;
pub mod highlight;
pub mod order;
pub mod qr;
pub mod rating;
pub mod restaurant;
pub mod review;
pub mod service;
pub mod share;
pub mod slug;
pub mod table;
pub mod text;
pub mod video;
