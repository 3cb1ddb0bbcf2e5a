pub type SceneResult<T> = Result<T, SceneError>;

/// Engine error taxonomy.
///
/// Unknown section/scene ids and missing narration lines are intentionally
/// NOT errors: dispatch falls back to documented default scenes instead.
#[derive(thiserror::Error, Debug)]
pub enum SceneError {
    #[error("script error: {0}")]
    Script(String),

    #[error("draw error: {0}")]
    Draw(String),

    #[error("registry error: {0}")]
    Registry(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SceneError {
    pub fn script(msg: impl Into<String>) -> Self {
        Self::Script(msg.into())
    }

    pub fn draw(msg: impl Into<String>) -> Self {
        Self::Draw(msg.into())
    }

    pub fn registry(msg: impl Into<String>) -> Self {
        Self::Registry(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(SceneError::script("x").to_string().contains("script error:"));
        assert!(SceneError::draw("x").to_string().contains("draw error:"));
        assert!(
            SceneError::registry("x")
                .to_string()
                .contains("registry error:")
        );
        assert!(
            SceneError::serde("x")
                .to_string()
                .contains("serialization error:")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = SceneError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
