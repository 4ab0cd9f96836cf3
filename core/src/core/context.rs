// shoebox/src/core/context.rs

//! The `Handler<TData>` type for pipeline step handlers.

use crate::core::context_data::ContextData;
use crate::core::control::PipelineControl;
use crate::error::CatalogError;
use std::future::Future;
use std::pin::Pin;

/// An asynchronous step handler.
///
/// A handler receives a clone of the shared `ContextData<TData>` and must drop
/// every lock guard before its first `.await`. Handlers of a step with a retry
/// policy may be invoked more than once, so they should read their inputs from
/// the context on every call rather than moving them out.
pub type Handler<TData> = Box<
  dyn Fn(ContextData<TData>) -> Pin<Box<dyn Future<Output = Result<PipelineControl, CatalogError>> + Send>>
    + Send
    + Sync,
>;
