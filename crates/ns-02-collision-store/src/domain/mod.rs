//! # Domain Layer
//!
//! Key layout, the stored record form, the collision index and the cursor.

pub mod cursor;
pub mod entities;
pub mod errors;
pub mod index;
pub mod keys;
