pub mod livros;

use std::sync::Arc;

use livraria_kernel::ModuleRegistry;

use livros::store::LivroStore;

/// Register all project-specific modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, store: Arc<dyn LivroStore>) {
    registry.register(livros::create_module(store));
}
