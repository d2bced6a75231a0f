use std::fmt;

use quiz_core::model::{AttemptId, QuizId};

/// Family of server resources a cache entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Attempt,
    AttemptsMine,
    Dashboard,
    Quizzes,
    Quiz,
    Questions,
    Users,
    Languages,
    Teachers,
}

impl ResourceKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Attempt => "attempt",
            Self::AttemptsMine => "attempts-mine",
            Self::Dashboard => "dashboard",
            Self::Quizzes => "quizzes",
            Self::Quiz => "quiz",
            Self::Questions => "questions",
            Self::Users => "users",
            Self::Languages => "languages",
            Self::Teachers => "teachers",
        }
    }
}

/// One identifying or filtering component of a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyParam {
    Id(u64),
    Filter { name: &'static str, value: String },
}

impl fmt::Display for KeyParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyParam::Id(id) => write!(f, "{id}"),
            KeyParam::Filter { name, value } => write!(f, "{name}={value}"),
        }
    }
}

/// Structured cache key: resource kind plus ordered parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    kind: ResourceKind,
    params: Vec<KeyParam>,
}

impl CacheKey {
    #[must_use]
    pub fn new(kind: ResourceKind, params: Vec<KeyParam>) -> Self {
        Self { kind, params }
    }

    #[must_use]
    pub fn attempt(id: AttemptId) -> Self {
        Self::new(ResourceKind::Attempt, vec![KeyParam::Id(id.value())])
    }

    /// Page sequence of the current user's attempts.
    #[must_use]
    pub fn attempts_mine() -> Self {
        Self::new(ResourceKind::AttemptsMine, Vec::new())
    }

    #[must_use]
    pub fn dashboard() -> Self {
        Self::new(ResourceKind::Dashboard, Vec::new())
    }

    /// Page sequence of the catalog for one filter set.
    #[must_use]
    pub fn quizzes(search: Option<&str>) -> Self {
        let params = search
            .map(|value| {
                vec![KeyParam::Filter {
                    name: "search",
                    value: value.to_string(),
                }]
            })
            .unwrap_or_default();
        Self::new(ResourceKind::Quizzes, params)
    }

    #[must_use]
    pub fn quiz(id: QuizId) -> Self {
        Self::new(ResourceKind::Quiz, vec![KeyParam::Id(id.value())])
    }

    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    #[must_use]
    pub fn params(&self) -> &[KeyParam] {
        &self.params
    }

    #[must_use]
    pub fn matches(&self, prefix: &KeyPrefix) -> bool {
        self.kind == prefix.kind && self.params.starts_with(&prefix.params)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.as_str())?;
        for param in &self.params {
            write!(f, "/{param}")?;
        }
        Ok(())
    }
}

/// Partial key matching a whole family of entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPrefix {
    kind: ResourceKind,
    params: Vec<KeyParam>,
}

impl KeyPrefix {
    /// Every entry of `kind`, whatever its parameters.
    #[must_use]
    pub fn kind(kind: ResourceKind) -> Self {
        Self {
            kind,
            params: Vec::new(),
        }
    }

    /// Exactly `key` and any key extending it.
    #[must_use]
    pub fn key(key: &CacheKey) -> Self {
        Self {
            kind: key.kind,
            params: key.params.clone(),
        }
    }

    #[must_use]
    pub fn resource_kind(&self) -> ResourceKind {
        self.kind
    }
}

impl From<CacheKey> for KeyPrefix {
    fn from(key: CacheKey) -> Self {
        Self {
            kind: key.kind,
            params: key.params,
        }
    }
}

impl fmt::Display for KeyPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.as_str())?;
        for param in &self.params {
            write!(f, "/{param}")?;
        }
        f.write_str("/*")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_prefix_matches_every_filter_set() {
        let prefix = KeyPrefix::kind(ResourceKind::Quizzes);
        assert!(CacheKey::quizzes(None).matches(&prefix));
        assert!(CacheKey::quizzes(Some("rust")).matches(&prefix));
        assert!(!CacheKey::dashboard().matches(&prefix));
    }

    #[test]
    fn key_prefix_is_specific() {
        let prefix = KeyPrefix::key(&CacheKey::attempt(AttemptId::new(1)));
        assert!(CacheKey::attempt(AttemptId::new(1)).matches(&prefix));
        assert!(!CacheKey::attempt(AttemptId::new(2)).matches(&prefix));
    }

    #[test]
    fn display_is_path_like() {
        assert_eq!(CacheKey::attempt(AttemptId::new(7)).to_string(), "attempt/7");
        assert_eq!(
            CacheKey::quizzes(Some("sql")).to_string(),
            "quizzes/search=sql"
        );
        assert_eq!(
            KeyPrefix::kind(ResourceKind::AttemptsMine).to_string(),
            "attempts-mine/*"
        );
    }
}
