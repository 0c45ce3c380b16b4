//! Internal utility types.

/// Marker type used when type-erasing callables.
///
/// This zero-sized type serves as a placeholder in generic type parameters
/// when the actual concrete type has been erased. For example,
/// `CallableData<Erased, A, R>` represents a callable whose concrete type is
/// unknown at the current scope, but whose signature is still `A -> R`.
pub(crate) struct Erased;
