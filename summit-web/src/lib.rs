#![forbid(unsafe_code)]
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub mod backend;
pub mod bridge;
pub mod context;
pub mod dom;
pub mod engine;

pub use backend::BackendEvent;
pub use bridge::EngagementHandle;
pub use context::EngagementContext;
pub use engine::{
    JsClock, WebContext, WebDataError, WebDataLoader, WebStorage, WebStorageError,
    create_web_engine, open_web_context,
};

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    dom::init_console_logging(log::LevelFilter::Info);
}
