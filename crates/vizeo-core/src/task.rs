//! Local task spawning

use futures_util::future::LocalBoxFuture;

/// Runs `!Send` futures on the current thread's event loop.
///
/// In the browser this is `wasm_bindgen_futures::spawn_local`.
pub trait LocalSpawner {
    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>);
}
