/// Domain-level error shared by the daybreak crates.
///
/// Persistence and generation failures have their own types closer to
/// where they happen; what the domain itself can reject is bad input.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),
}
