/// Similarity-threshold clustering of object types with threshold tuning
pub mod clustering;
#[cfg(feature = "graphviz-export")]
/// DOT/image export of object-centric directly-follows graphs
pub mod image_export;
/// Markov edge probabilities and the object-type similarity matrix
pub mod markov;
/// Object-centric directly-follows graph struct and discovery
pub mod ocdfg_struct;

#[doc(inline)]
pub use ocdfg_struct::OCDirectlyFollowsGraph;
