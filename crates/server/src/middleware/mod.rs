pub mod model_loaders;

pub use model_loaders::{
    load_cliente_middleware, load_pendiente_middleware, load_support_note_middleware,
};
