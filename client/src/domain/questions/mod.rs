//! Question aggregation, submission, and deletion services.
//!
//! The aggregation is the one composition-heavy piece of the client: a
//! top-level query against the question collection, a concurrent reply fetch
//! per question, and a join-then-sort once every sub-fetch has completed.

use std::sync::Arc;

use futures_util::future::join_all;
use mockable::Clock;
use serde_json::json;
use tracing::warn;

use super::ports::{self, DataStore};
use super::records::{self, ProfileRecord, QuestionRecord, ReplyRecord};
use super::{AuthUser, Error, QuestionId, ReplyId};

/// Selector determining which subset of questions an aggregation targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Every question in the store; the doctor-facing board.
    All,
    /// Questions owned by one user; the patient-facing board.
    OwnedBy(super::UserId),
}

impl Scope {
    /// Form the owned-by scope from an explicit session context.
    ///
    /// # Errors
    ///
    /// Fails with [`crate::domain::ErrorCode::NotAuthenticated`] when no
    /// session is active. The check happens here, before any fetch, so an
    /// empty result for a signed-in user is still reported as no-results.
    pub fn owned_by_session(session: Option<&AuthUser>) -> Result<Self, Error> {
        session
            .map(|user| Self::OwnedBy(user.id.clone()))
            .ok_or_else(|| Error::not_authenticated("you need to be signed in to view your questions"))
    }
}

/// Reply joined to its question during aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Store-assigned reply key.
    pub id: ReplyId,
    /// Free-text body.
    pub text: String,
    /// Identifier of the authoring doctor.
    pub doctor_id: String,
    /// Display name captured at submission time; never re-resolved.
    pub doctor_name: String,
    /// Whole seconds since the epoch.
    pub timestamp: i64,
}

/// Question record joined with its fetched replies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HydratedQuestion {
    /// Store-assigned question key.
    pub id: QuestionId,
    /// Merged `"<category>: <title>"` field.
    pub title: String,
    /// Free-text description.
    pub description: String,
    /// Whole seconds since the epoch.
    pub timestamp: i64,
    /// Identifier of the owning user; empty when the record lacks one.
    pub owner: String,
    /// Replies ordered by descending timestamp.
    pub replies: Vec<Reply>,
}

/// Draft of a new question, validated before submission.
///
/// The category and free title are merged into a single
/// `"<category>: <title>"` field at submission. Existing records use this
/// exact format, so it must be replicated for compatibility even though a
/// structured category field would filter better.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    category: String,
    title: String,
    description: String,
}

impl QuestionDraft {
    /// Construct a draft from raw field inputs.
    ///
    /// # Errors
    ///
    /// Fails with [`crate::domain::ErrorCode::ValidationFailed`] when any
    /// field is blank.
    pub fn try_from_parts(category: &str, title: &str, description: &str) -> Result<Self, Error> {
        if category.trim().is_empty() || title.trim().is_empty() || description.trim().is_empty() {
            return Err(Error::validation("all fields are required"));
        }
        Ok(Self {
            category: category.trim().to_owned(),
            title: title.trim().to_owned(),
            description: description.trim().to_owned(),
        })
    }

    /// The merged title written into the store.
    #[must_use]
    pub fn merged_title(&self) -> String {
        format!("{}: {}", self.category, self.title)
    }

    /// The description written into the store.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }
}

/// Service owning every question-collection operation.
#[derive(Clone)]
pub struct QuestionService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> QuestionService<S> {
    /// Create a service over a store handle and a clock.
    pub const fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }
}

impl<S: DataStore> QuestionService<S> {
    /// Fetch and hydrate every question in `scope`.
    ///
    /// Questions are ordered by descending creation timestamp, replies within
    /// each question likewise. Records sharing a timestamp keep the store's
    /// order; callers must not rely on that being stable.
    ///
    /// A failed reply fetch counts as zero replies for that question only —
    /// it is logged, never retried, and never fails the aggregation.
    ///
    /// # Errors
    ///
    /// - [`crate::domain::ErrorCode::FetchFailed`] when the top-level
    ///   question query fails.
    /// - [`crate::domain::ErrorCode::NoResults`] when the scope matches no
    ///   questions. Empty-but-valid: the shell reports it, nothing failed.
    pub async fn aggregate(&self, scope: &Scope) -> Result<Vec<HydratedQuestion>, Error> {
        let snapshot = match scope {
            Scope::All => self.store.read(ports::QUESTIONS_PATH).await,
            Scope::OwnedBy(owner) => {
                self.store
                    .read_matching(ports::QUESTIONS_PATH, "userId", owner.as_str())
                    .await
            }
        }
        .map_err(|err| Error::fetch_failed(format!("failed to fetch questions: {err}")))?;

        let question_records: Vec<(QuestionId, QuestionRecord)> =
            records::decode_children::<QuestionRecord>(snapshot)
                .into_iter()
                .filter_map(|(key, record)| match QuestionId::new(key) {
                    Ok(id) => Some((id, record)),
                    Err(err) => {
                        warn!(error = %err, "skipping question with unusable store key");
                        None
                    }
                })
                .collect();
        if question_records.is_empty() {
            return Err(match scope {
                Scope::All => Error::no_results("no questions found"),
                Scope::OwnedBy(_) => Error::no_results("no questions found for this user"),
            });
        }

        let hydrations = question_records
            .into_iter()
            .map(|(id, record)| async move {
                let replies = self.fetch_replies(&id).await;
                HydratedQuestion {
                    id,
                    title: record.title,
                    description: record.description,
                    timestamp: record.timestamp,
                    owner: record.user_id,
                    replies,
                }
            });

        // Barrier: the result is emitted only once every sub-fetch resolved.
        let mut questions = join_all(hydrations).await;
        questions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(questions)
    }

    /// Fetch one question's reply group, treating any failure as empty.
    async fn fetch_replies(&self, question: &QuestionId) -> Vec<Reply> {
        let snapshot = match self.store.read(&ports::replies_path(question)).await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(question = %question, error = %err, "reply fetch failed, treating as empty");
                return Vec::new();
            }
        };
        let mut replies: Vec<Reply> = records::decode_children::<ReplyRecord>(snapshot)
            .into_iter()
            .filter_map(|(key, record)| match ReplyId::new(key) {
                Ok(id) => Some(Reply {
                    id,
                    text: record.text,
                    doctor_id: record.doctor_id,
                    doctor_name: record.doctor_name,
                    timestamp: record.timestamp,
                }),
                Err(err) => {
                    warn!(question = %question, error = %err, "skipping reply with unusable store key");
                    None
                }
            })
            .collect();
        replies.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        replies
    }

    /// Create a new question owned by the session's user.
    ///
    /// # Errors
    ///
    /// - [`crate::domain::ErrorCode::NotAuthenticated`] without a session.
    /// - [`crate::domain::ErrorCode::WriteFailed`] when the store rejects the
    ///   write; nothing is retried automatically.
    pub async fn submit(
        &self,
        session: Option<&AuthUser>,
        draft: &QuestionDraft,
    ) -> Result<QuestionId, Error> {
        let user = session.ok_or_else(|| {
            Error::not_authenticated("you need to be signed in to submit a question")
        })?;
        let record = json!({
            "title": draft.merged_title(),
            "description": draft.description(),
            "timestamp": self.clock.utc().timestamp(),
            "userId": user.id.as_str(),
        });
        let key = self
            .store
            .push(ports::QUESTIONS_PATH, record)
            .await
            .map_err(|err| Error::write_failed(format!("error submitting question: {err}")))?;
        QuestionId::new(key)
            .map_err(|err| Error::write_failed(format!("store returned an unusable key: {err}")))
    }

    /// Append a reply to `question` on behalf of the session's user.
    ///
    /// The author's display name is captured by value and can never be
    /// corrected later, so a profile without a usable name aborts before
    /// anything is written.
    ///
    /// # Errors
    ///
    /// - [`crate::domain::ErrorCode::NotAuthenticated`] without a session.
    /// - [`crate::domain::ErrorCode::ValidationFailed`] for a blank body.
    /// - [`crate::domain::ErrorCode::FetchFailed`] when the profile lookup
    ///   fails outright.
    /// - [`crate::domain::ErrorCode::ProfileIncomplete`] when the profile is
    ///   missing or has no display name; nothing is written.
    /// - [`crate::domain::ErrorCode::WriteFailed`] when the store rejects the
    ///   write; the caller may resubmit manually.
    pub async fn submit_reply(
        &self,
        session: Option<&AuthUser>,
        question: &QuestionId,
        body: &str,
    ) -> Result<ReplyId, Error> {
        let user = session
            .ok_or_else(|| Error::not_authenticated("you need to be signed in to reply"))?;
        if body.trim().is_empty() {
            return Err(Error::validation("reply text is required"));
        }

        let snapshot = self
            .store
            .read(&ports::user_path(&user.id))
            .await
            .map_err(|err| Error::fetch_failed(format!("could not verify your profile: {err}")))?;
        let profile = records::decode_record::<ProfileRecord>(snapshot)
            .ok_or_else(|| Error::profile_incomplete("your profile could not be found"))?;
        if profile.name.trim().is_empty() {
            return Err(Error::profile_incomplete("your profile has no display name"));
        }

        let record = json!({
            "text": body.trim(),
            "doctorId": user.id.as_str(),
            "doctorName": profile.name,
            "timestamp": self.clock.utc().timestamp(),
        });
        let key = self
            .store
            .push(&ports::replies_path(question), record)
            .await
            .map_err(|err| Error::write_failed(format!("error submitting reply: {err}")))?;
        ReplyId::new(key)
            .map_err(|err| Error::write_failed(format!("store returned an unusable key: {err}")))
    }

    /// Delete `question` together with its reply group.
    ///
    /// Best-effort cascade, not a transaction: both removals are always
    /// attempted concurrently, individual failures are logged and swallowed,
    /// and completion is signalled only after both finish. There is no
    /// rollback, so a partial failure can leave an orphaned reply group the
    /// aggregation will simply never join to a visible question.
    pub async fn delete(&self, question: &QuestionId) {
        let replies_path = ports::replies_path(question);
        let question_path = ports::question_path(question);
        let (replies_result, question_result) = tokio::join!(
            self.store.remove(&replies_path),
            self.store.remove(&question_path),
        );
        if let Err(err) = replies_result {
            warn!(question = %question, error = %err, "error deleting replies");
        }
        if let Err(err) = question_result {
            warn!(question = %question, error = %err, "error deleting question");
        }
    }
}
