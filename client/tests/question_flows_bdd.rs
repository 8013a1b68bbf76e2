//! Behaviour tests for the question board flows.
//!
//! These scenarios drive the question services end to end over the in-memory
//! adapters: aggregation ordering, empty boards, partial reply failures,
//! session enforcement, and the best-effort cascade delete.
//
// rstest-bdd generates guard variables with double underscores, which trips
// the non_snake_case lint under -D warnings.
#![allow(non_snake_case)]
// `expect` is idiomatic in test code for failing fast on precondition violations.
#![expect(
    clippy::expect_used,
    reason = "test code uses expect for clear failure messages"
)]

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::DateTime;
use client::domain::ports::{self, DataStore};
use client::domain::{
    AccountService, AuthUser, Error, ErrorCode, HydratedQuestion, QuestionDraft, QuestionId,
    QuestionService, RegistrationForm, ReplyId, Role, Scope,
};
use client::outbound::memory::{MemoryAuthProvider, MemoryDataStore};
use mockable::{Clock, MockClock};
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::{ScenarioState, given, scenario, then, when};
use tokio::runtime::Runtime;

// ============================================================================
// Harness and world
// ============================================================================

/// Shared services plus the runtime the synchronous steps drive them on.
struct Harness {
    runtime: Runtime,
    store: Arc<MemoryDataStore>,
    now: Arc<AtomicI64>,
    questions: QuestionService<MemoryDataStore>,
    accounts: AccountService<MemoryDataStore, MemoryAuthProvider>,
}

impl Harness {
    fn new() -> Self {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("tokio runtime builds");
        let store = Arc::new(MemoryDataStore::new());
        let auth = Arc::new(MemoryAuthProvider::new());
        let now = Arc::new(AtomicI64::new(0));
        let questions = QuestionService::new(Arc::clone(&store), scripted_clock(Arc::clone(&now)));
        let accounts = AccountService::new(Arc::clone(&store), auth);
        Self {
            runtime,
            store,
            now,
            questions,
            accounts,
        }
    }

    fn set_time(&self, seconds: i64) {
        self.now.store(seconds, Ordering::SeqCst);
    }
}

fn scripted_clock(now: Arc<AtomicI64>) -> Arc<dyn Clock> {
    let mut clock = MockClock::new();
    clock.expect_utc().returning(move || {
        DateTime::from_timestamp(now.load(Ordering::SeqCst), 0).expect("valid scripted timestamp")
    });
    Arc::new(clock)
}

/// Test world holding the harness and the state scenarios accumulate.
#[derive(Default, ScenarioState)]
struct World {
    harness: Slot<Arc<Harness>>,
    patient: Slot<AuthUser>,
    doctor: Slot<AuthUser>,
    posted: Slot<Vec<QuestionId>>,
    board: Slot<Result<Vec<HydratedQuestion>, Error>>,
    reply_result: Slot<Result<ReplyId, Error>>,
}

impl World {
    fn harness(&self) -> Arc<Harness> {
        self.harness.get().expect("harness should be initialised")
    }

    fn patient(&self) -> AuthUser {
        self.patient.get().expect("patient should be registered")
    }

    fn posted(&self) -> Vec<QuestionId> {
        self.posted.get().unwrap_or_default()
    }

    fn latest_question(&self) -> QuestionId {
        self.posted()
            .last()
            .cloned()
            .expect("a question should have been posted")
    }

    fn board(&self) -> Result<Vec<HydratedQuestion>, Error> {
        self.board.get().expect("the board should be aggregated")
    }

    fn successful_board(&self) -> Vec<HydratedQuestion> {
        self.board().expect("aggregation should succeed")
    }
}

#[fixture]
fn world() -> World {
    let world = World::default();
    world.harness.set(Arc::new(Harness::new()));
    world
}

fn register(world: &World, name: &str, email: &str, role: Role) -> AuthUser {
    let harness = world.harness();
    let form = RegistrationForm::try_from_parts(name, email, "secret-pass", "secret-pass", role)
        .expect("valid fixture form");
    harness
        .runtime
        .block_on(harness.accounts.register(&form))
        .expect("registration succeeds")
}

fn post_question(world: &World, owner: &AuthUser, timestamp: i64) {
    let harness = world.harness();
    harness.set_time(timestamp);
    let draft = QuestionDraft::try_from_parts(
        "Cardiologist",
        "persistent chest pain",
        "Sharp pain in the chest after light exercise.",
    )
    .expect("valid fixture draft");
    let id = harness
        .runtime
        .block_on(harness.questions.submit(Some(owner), &draft))
        .expect("submission succeeds");
    let mut posted = world.posted();
    posted.push(id);
    world.posted.set(posted);
}

fn read_reply_group(world: &World, question: &QuestionId) -> Option<serde_json::Value> {
    let harness = world.harness();
    harness
        .runtime
        .block_on(harness.store.read(&ports::replies_path(question)))
        .expect("store read succeeds")
}

// ============================================================================
// Given steps
// ============================================================================

#[given("a registered patient with a signed-in session")]
fn a_registered_patient_with_a_signed_in_session(world: &World) {
    let user = register(world, "Priya Shah", "priya@example.com", Role::Patient);
    world.patient.set(user);
}

#[given("a registered doctor with a signed-in session")]
fn a_registered_doctor_with_a_signed_in_session(world: &World) {
    let user = register(world, "Dr. Grace Hollis", "grace@example.com", Role::Doctor);
    world.doctor.set(user);
}

#[given("the patient has posted a question at time {timestamp:i64}")]
fn the_patient_has_posted_a_question(world: &World, timestamp: i64) {
    let owner = world.patient();
    post_question(world, &owner, timestamp);
}

#[given("another patient has posted a question at time {timestamp:i64}")]
fn another_patient_has_posted_a_question(world: &World, timestamp: i64) {
    let other = register(world, "Omar Haddad", "omar@example.com", Role::Patient);
    post_question(world, &other, timestamp);
}

#[given("the doctor has replied to that question at time {timestamp:i64}")]
fn the_doctor_has_replied_to_that_question(world: &World, timestamp: i64) {
    let harness = world.harness();
    harness.set_time(timestamp);
    let doctor = world.doctor.get().expect("doctor should be registered");
    let question = world.latest_question();
    harness
        .runtime
        .block_on(
            harness
                .questions
                .submit_reply(Some(&doctor), &question, "Take rest and stay hydrated."),
        )
        .expect("reply submission succeeds");
}

#[given("reply reads fail for the latest question")]
fn reply_reads_fail_for_the_latest_question(world: &World) {
    let harness = world.harness();
    let question = world.latest_question();
    harness.store.fail_reads_at(&ports::replies_path(&question));
}

// ============================================================================
// When steps
// ============================================================================

#[when("the whole board is aggregated")]
fn the_whole_board_is_aggregated(world: &World) {
    let harness = world.harness();
    let board = harness
        .runtime
        .block_on(harness.questions.aggregate(&Scope::All));
    world.board.set(board);
}

#[when("the patient aggregates their own questions")]
fn the_patient_aggregates_their_own_questions(world: &World) {
    let harness = world.harness();
    let patient = world.patient();
    let scope = Scope::owned_by_session(Some(&patient)).expect("session present");
    let board = harness.runtime.block_on(harness.questions.aggregate(&scope));
    world.board.set(board);
}

#[when("a reply is submitted without a session")]
fn a_reply_is_submitted_without_a_session(world: &World) {
    let harness = world.harness();
    let question = world.latest_question();
    let result = harness
        .runtime
        .block_on(harness.questions.submit_reply(None, &question, "anonymous advice"));
    world.reply_result.set(result);
}

#[when("the latest question is deleted")]
fn the_latest_question_is_deleted(world: &World) {
    let harness = world.harness();
    let question = world.latest_question();
    harness.runtime.block_on(harness.questions.delete(&question));
}

// ============================================================================
// Then steps
// ============================================================================

#[then("the board lists {count:usize} questions newest first")]
fn the_board_lists_questions_newest_first(world: &World, count: usize) {
    let board = world.successful_board();
    assert_eq!(board.len(), count);
    let stamps: Vec<i64> = board.iter().map(|q| q.timestamp).collect();
    let mut sorted = stamps.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(stamps, sorted, "questions should be newest first");
}

#[then("aggregation reports no results")]
fn aggregation_reports_no_results(world: &World) {
    let err = world.board().expect_err("empty board should be reported");
    assert_eq!(err.code(), ErrorCode::NoResults);
}

#[then("the latest question shows no replies")]
fn the_latest_question_shows_no_replies(world: &World) {
    let board = world.successful_board();
    let latest = world.latest_question();
    let question = board
        .iter()
        .find(|q| q.id == latest)
        .expect("latest question should be listed");
    assert!(question.replies.is_empty());
}

#[then("the earlier question keeps its reply")]
fn the_earlier_question_keeps_its_reply(world: &World) {
    let board = world.successful_board();
    let posted = world.posted();
    let earlier = posted.first().expect("an earlier question exists");
    let question = board
        .iter()
        .find(|q| &q.id == earlier)
        .expect("earlier question should be listed");
    assert_eq!(question.replies.len(), 1);
}

#[then("the reply is rejected as unauthenticated")]
fn the_reply_is_rejected_as_unauthenticated(world: &World) {
    let result = world.reply_result.get().expect("reply result should be set");
    let err = result.expect_err("reply should be rejected");
    assert_eq!(err.code(), ErrorCode::NotAuthenticated);
}

#[then("the store holds no replies for the latest question")]
fn the_store_holds_no_replies_for_the_latest_question(world: &World) {
    let question = world.latest_question();
    assert_eq!(read_reply_group(world, &question), None);
}

#[then("the whole board reports no results afterwards")]
fn the_whole_board_reports_no_results_afterwards(world: &World) {
    let harness = world.harness();
    let err = harness
        .runtime
        .block_on(harness.questions.aggregate(&Scope::All))
        .expect_err("the deleted question should be gone");
    assert_eq!(err.code(), ErrorCode::NoResults);
}

#[then("the board lists only the patient's question")]
fn the_board_lists_only_the_patients_question(world: &World) {
    let board = world.successful_board();
    let patient = world.patient();
    assert_eq!(board.len(), 1);
    assert!(board.iter().all(|q| q.owner == patient.id.as_str()));
}

#[then("both questions carry one reply each")]
fn both_questions_carry_one_reply_each(world: &World) {
    let board = world.successful_board();
    assert!(board.iter().all(|q| q.replies.len() == 1));
}

#[then("the latest question carries the doctor's reply")]
fn the_latest_question_carries_the_doctors_reply(world: &World) {
    let board = world.successful_board();
    let doctor = world.doctor.get().expect("doctor should be registered");
    let latest = world.latest_question();
    let question = board
        .iter()
        .find(|q| q.id == latest)
        .expect("latest question should be listed");
    let reply = question.replies.first().expect("reply should be joined");
    assert_eq!(reply.doctor_id, doctor.id.as_str());
    assert_eq!(reply.doctor_name, "Dr. Grace Hollis");
    assert_eq!(reply.text, "Take rest and stay hydrated.");
}

// ============================================================================
// Scenario bindings
// ============================================================================

#[scenario(
    path = "tests/features/question_flows.feature",
    name = "Questions aggregate newest first"
)]
fn questions_aggregate_newest_first(world: World) {
    drop(world);
}

#[scenario(
    path = "tests/features/question_flows.feature",
    name = "An empty board reports no results"
)]
fn an_empty_board_reports_no_results(world: World) {
    drop(world);
}

#[scenario(
    path = "tests/features/question_flows.feature",
    name = "A failed reply fetch empties only its question"
)]
fn a_failed_reply_fetch_empties_only_its_question(world: World) {
    drop(world);
}

#[scenario(
    path = "tests/features/question_flows.feature",
    name = "An unauthenticated reply writes nothing"
)]
fn an_unauthenticated_reply_writes_nothing(world: World) {
    drop(world);
}

#[scenario(
    path = "tests/features/question_flows.feature",
    name = "Deleting a question removes its reply group"
)]
fn deleting_a_question_removes_its_reply_group(world: World) {
    drop(world);
}

#[scenario(
    path = "tests/features/question_flows.feature",
    name = "A patient sees only their own questions"
)]
fn a_patient_sees_only_their_own_questions(world: World) {
    drop(world);
}

#[scenario(
    path = "tests/features/question_flows.feature",
    name = "Owned questions keep their replies"
)]
fn owned_questions_keep_their_replies(world: World) {
    drop(world);
}

#[scenario(
    path = "tests/features/question_flows.feature",
    name = "A doctor's reply appears on the next aggregation"
)]
fn a_doctors_reply_appears_on_the_next_aggregation(world: World) {
    drop(world);
}
