//! Typestate markers shared by the crate's builders

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(pub(crate) T);
