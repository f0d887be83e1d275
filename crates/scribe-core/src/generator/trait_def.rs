//! The `Generator` trait -- the adapter interface for text generators.
//!
//! The pipeline treats the generative model as an opaque collaborator:
//! one prompt string in, one completion string out, fallible. The trait is
//! intentionally object-safe so it can be stored as `Arc<dyn Generator>`
//! behind the HTTP server state.

use anyhow::Result;
use async_trait::async_trait;

/// Adapter interface for external text generators.
///
/// Implementors wrap a specific model access path (a CLI binary, an API
/// client) behind a single awaited call. The pipeline issues exactly one
/// `generate` per run: no streaming, no retry, no cancellation. Errors and
/// blank output are both treated as unusable upstream output, for which
/// the pipeline substitutes its fallback text.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Human-readable name for this generator (e.g. "claude").
    fn name(&self) -> &str;

    /// Produce a completion for the given prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

// Compile-time assertion: Generator must be object-safe.
// If this line compiles, the trait can be used as `dyn Generator`.
const _: () = {
    fn _assert_object_safe(_: &dyn Generator) {}
};
