//! Concrete media store implementations.
//!
//! This module contains adapters for third-party media hosts that implement
//! the `MediaStore` trait defined in the domain layer.

pub mod cloudinary;

pub use cloudinary::{CloudinaryClient, CloudinaryClientConfig};
