use std::error::Error as StdError;
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Decode,
    Fetch,
    DiscoveryExhausted,
    Usage,
    Internal,
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    hint: Option<String>,
    index: Option<usize>,
    partition: Option<String>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            hint: None,
            index: None,
            partition: None,
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn partition(&self) -> Option<&str> {
        self.partition.as_deref()
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_partition(mut self, partition: impl Into<String>) -> Self {
        self.partition = Some(partition.into());
        self
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(index) = self.index {
            write!(f, " (index: {index})")?;
        }
        if let Some(partition) = &self.partition {
            write!(f, " (partition: {partition})")?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, ErrorKind};

    #[test]
    fn display_includes_context() {
        let err = Error::new(ErrorKind::Fetch)
            .with_message("row fetch failed")
            .with_index(42)
            .with_partition("train");
        let rendered = err.to_string();
        assert_eq!(
            rendered,
            "Fetch: row fetch failed (index: 42) (partition: train)"
        );
    }

    #[test]
    fn source_is_preserved() {
        let io = std::io::Error::other("boom");
        let err = Error::new(ErrorKind::Fetch).with_source(io);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn hint_is_optional_context() {
        let err = Error::new(ErrorKind::DiscoveryExhausted)
            .with_hint("upload a local file instead");
        assert_eq!(err.hint(), Some("upload a local file instead"));
        assert_eq!(err.kind(), ErrorKind::DiscoveryExhausted);
    }
}
