use bytemuck::Pod;

/// Used for "pod-enabled" types that can have a `None` value.
pub trait Nullable: Pod {
    /// Indicates if the value is `Some`.
    fn is_some(&self) -> bool;

    /// Indicates if the value is `None`.
    fn is_none(&self) -> bool;
}
