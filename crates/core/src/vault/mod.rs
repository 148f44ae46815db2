//! Vault file discovery.
//!
//! This module provides utilities for walking vault directories and
//! collecting the markdown notes and image files they contain.

pub mod walker;

pub use walker::{VaultWalker, VaultWalkerError, WalkedFile};
