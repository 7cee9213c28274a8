use std::path::PathBuf;
use std::process::ExitStatus;

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("input not found: {0}")]
    MissingInput(PathBuf),

    #[error("failed to spawn ffmpeg: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("ffmpeg failed with status: {0}")]
    EngineFailed(ExitStatus),

    #[error("invalid filter graph: {0}")]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum GraphError {
    #[error("label [{0}] is used before it is defined")]
    Dangling(String),

    #[error("label [{0}] is defined more than once")]
    Redefined(String),

    #[error("label [{0}] is consumed {1} times, expected exactly once")]
    Consumption(String, usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            RenderError::MissingInput(PathBuf::from("a.mp4"))
                .to_string()
                .starts_with("input not found:")
        );
        assert_eq!(
            GraphError::Dangling("vid".into()).to_string(),
            "label [vid] is used before it is defined"
        );
        assert!(
            RenderError::from(GraphError::Redefined("base".into()))
                .to_string()
                .contains("defined more than once")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = RenderError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
