//! Opaque identifier generation.

use uuid::Uuid;

/// Generate a new entity identifier.
///
/// Identifiers are random (UUID v4, simple form) and unique with overwhelming
/// probability. Collisions are not guarded against elsewhere.
pub fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}
