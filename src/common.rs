/// Dense vertex identifier in `[0, V)`. All per-vertex state is kept in
/// parallel arrays indexed by this id.
pub type VertexId = u32;

/// Search epoch counter used by the generation-stamp scheme.
pub type Generation = u32;

/// Hop count along an ancestral path.
pub type Distance = u32;
