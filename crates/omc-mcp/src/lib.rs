//! MCP tool catalog negotiation over JSON-RPC 2.0 stdio (spec.md §2
//! item 14, §6). Tool execution is out of scope; this crate only
//! negotiates names, schemas, and the `OMC_DISABLE_TOOLS` category
//! filter.

pub mod catalog;
pub mod rpc;
pub mod server;

pub use catalog::{build_catalog, disabled_categories};
pub use server::run;
