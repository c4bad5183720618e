//! # Furrow
//!
//! Faceted selection and aggregate query planning over a USDA irrigation
//! census fact store.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │              Selection (caller-owned state)              │
//! │   (states, commodity, domain, data items, years, ...)   │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [facet resolver]
//! ┌─────────────────────────────────────────────────────────┐
//! │        Legal value sets (intersection semantics)         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [reconciler]
//! ┌─────────────────────────────────────────────────────────┐
//! │       Retained choices + quota-disabled candidates       │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [aggregation planner]
//! ┌─────────────────────────────────────────────────────────┐
//! │      PlanOutcome: tie-break question or descriptor       │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [result shaper]
//! ┌─────────────────────────────────────────────────────────┐
//! │        Bar values / per-series year value vectors        │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine is a set of pure functions over a read-only [`store::FactStore`]
//! snapshot and a caller-supplied [`selection::Selection`]; it holds no
//! session state of its own and is safe to share across concurrent callers.

pub mod config;
pub mod engine;
pub mod error;
pub mod facet;
pub mod plan;
pub mod selection;
pub mod shape;
pub mod store;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::engine::Engine;
    pub use crate::error::{EngineError, EngineResult};
    pub use crate::facet::FacetResolver;
    pub use crate::plan::{
        plan, ChartShape, PlanOutcome, QueryDescriptor, Statistic, TieBreakQuestion,
    };
    pub use crate::selection::{
        reconcile, BarAxis, Cardinality, CompareMode, Dimension, LineLayout, Reconciled,
        Selection, TieBreaks,
    };
    pub use crate::shape::{execute, Shaped};
    pub use crate::store::{Fact, FactStore};
}

// Also export at crate root for convenience
pub use engine::Engine;
pub use error::{EngineError, EngineResult};
pub use selection::{Dimension, Selection, TieBreaks};
pub use store::{Fact, FactStore};
