use quiz_core::model::{AttemptId, QuizId};

use super::key::{CacheKey, KeyParam, KeyPrefix, ResourceKind};

/// Administered entity families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminEntity {
    User,
    Language,
    Teacher,
    Quiz,
    Question,
}

impl AdminEntity {
    fn list_kind(self) -> ResourceKind {
        match self {
            Self::User => ResourceKind::Users,
            Self::Language => ResourceKind::Languages,
            Self::Teacher => ResourceKind::Teachers,
            Self::Quiz => ResourceKind::Quizzes,
            Self::Question => ResourceKind::Questions,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminOp {
    Create,
    Update,
    Delete,
}

/// A successful server-side write and the cache families it touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    StartAttempt {
        quiz_id: QuizId,
    },
    SubmitAttempt {
        attempt_id: AttemptId,
    },
    Admin {
        entity: AdminEntity,
        op: AdminOp,
        id: Option<u64>,
    },
}

impl Mutation {
    /// Key prefixes to mark stale once the mutation succeeds.
    ///
    /// List prefixes are always included so membership changes are never
    /// hidden behind a single-entity invalidation.
    #[must_use]
    pub fn invalidates(&self) -> Vec<KeyPrefix> {
        match self {
            Mutation::StartAttempt { .. } => vec![
                KeyPrefix::kind(ResourceKind::AttemptsMine),
                KeyPrefix::kind(ResourceKind::Dashboard),
            ],
            Mutation::SubmitAttempt { attempt_id } => vec![
                KeyPrefix::key(&CacheKey::attempt(*attempt_id)),
                KeyPrefix::kind(ResourceKind::AttemptsMine),
                KeyPrefix::kind(ResourceKind::Dashboard),
            ],
            Mutation::Admin { entity, op, id } => {
                let mut prefixes = vec![KeyPrefix::kind(entity.list_kind())];
                if let (Some(id), AdminOp::Update | AdminOp::Delete) = (id, op) {
                    let detail = match entity {
                        AdminEntity::Quiz => CacheKey::quiz(QuizId::new(*id)),
                        other => CacheKey::new(other.list_kind(), vec![KeyParam::Id(*id)]),
                    };
                    prefixes.push(KeyPrefix::key(&detail));
                }
                if matches!(entity, AdminEntity::Question) {
                    prefixes.push(KeyPrefix::kind(ResourceKind::Quizzes));
                    prefixes.push(KeyPrefix::kind(ResourceKind::Quiz));
                }
                if matches!(entity, AdminEntity::Quiz) {
                    prefixes.push(KeyPrefix::kind(ResourceKind::Dashboard));
                }
                prefixes
            }
        }
    }
}
