#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_display() {
        let err = CoreError::Validation("bad status".to_string());
        assert_eq!(err.to_string(), "Validation failed: bad status");
    }
}
