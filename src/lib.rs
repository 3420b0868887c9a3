//! Livraria application library
//!
//! The catalog module served over HTTP, the client data layer used by the
//! command-line front end, and the bootstrap that wires them together.

pub mod bootstrap;
pub mod client;
pub mod modules;
pub mod utils;

/// Re-export commonly used types
pub use modules::livros::models::{Livro, LivroPayload, NovoLivro};
