use uuid::Uuid;

/// Fresh opaque id for an element or condition.
pub fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}
