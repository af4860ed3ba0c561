/// Directly-follows graph struct and discovery
pub mod dfg_struct;
#[cfg(feature = "graphviz-export")]
/// DOT/image export of directly-follows graphs
pub mod image_export;

#[doc(inline)]
pub use dfg_struct::DirectlyFollowsGraph;
