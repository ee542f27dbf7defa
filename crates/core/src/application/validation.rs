// Request validation shared by the submit use case and (indirectly) the
// RPC layer's parameter deserialization.

use crate::application::constants::{
    MAX_JOB_TYPE_LEN, MAX_MAX_ATTEMPTS, MAX_PAYLOAD_DEPTH, MAX_PRIORITY, MIN_MAX_ATTEMPTS,
    MIN_PRIORITY,
};
use crate::error::{AppError, Result};

pub fn validate_job_type(job_type: &str) -> Result<()> {
    if job_type.is_empty() {
        return Err(AppError::Validation("job_type cannot be empty".into()));
    }
    if job_type.len() > MAX_JOB_TYPE_LEN {
        return Err(AppError::Validation(format!(
            "job_type too long (max {MAX_JOB_TYPE_LEN} chars, got {})",
            job_type.len()
        )));
    }
    Ok(())
}

pub fn validate_priority(priority: i32) -> Result<()> {
    if !(MIN_PRIORITY..=MAX_PRIORITY).contains(&priority) {
        return Err(AppError::Validation(format!(
            "priority out of range (must be between {MIN_PRIORITY} and {MAX_PRIORITY}, got {priority})"
        )));
    }
    Ok(())
}

pub fn validate_max_attempts(max_attempts: i32) -> Result<()> {
    if !(MIN_MAX_ATTEMPTS..=MAX_MAX_ATTEMPTS).contains(&max_attempts) {
        return Err(AppError::Validation(format!(
            "max_attempts out of range (must be between {MIN_MAX_ATTEMPTS} and {MAX_MAX_ATTEMPTS}, got {max_attempts})"
        )));
    }
    Ok(())
}

/// Reject pathologically deep payloads before they reach storage.
pub fn validate_payload_depth(value: &serde_json::Value) -> Result<()> {
    fn check(value: &serde_json::Value, depth: usize) -> Result<()> {
        if depth > MAX_PAYLOAD_DEPTH {
            return Err(AppError::Validation(format!(
                "payload too deeply nested (max depth {MAX_PAYLOAD_DEPTH})"
            )));
        }
        match value {
            serde_json::Value::Array(items) => {
                for item in items {
                    check(item, depth + 1)?;
                }
            }
            serde_json::Value::Object(fields) => {
                for value in fields.values() {
                    check(value, depth + 1)?;
                }
            }
            _ => {}
        }
        Ok(())
    }
    check(value, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_job_type() {
        assert!(validate_job_type("").is_err());
    }

    #[test]
    fn rejects_priority_out_of_range() {
        assert!(validate_priority(1000).is_err());
        assert!(validate_priority(-1000).is_err());
        assert!(validate_priority(0).is_err());
        assert!(validate_priority(1).is_ok());
        assert!(validate_priority(10).is_ok());
    }

    #[test]
    fn rejects_zero_max_attempts() {
        assert!(validate_max_attempts(0).is_err());
        assert!(validate_max_attempts(1).is_ok());
    }

    #[test]
    fn rejects_deeply_nested_payload() {
        let mut value = serde_json::json!(1);
        for _ in 0..40 {
            value = serde_json::json!([value]);
        }
        assert!(validate_payload_depth(&value).is_err());
    }

    #[test]
    fn accepts_shallow_payload() {
        let value = serde_json::json!({"a": [1, 2, 3]});
        assert!(validate_payload_depth(&value).is_ok());
    }
}
