use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};

use axum::response::Response;
use serde_json::Value;

use crate::listings::engagement::ledger::ResponseLedger;
use crate::listings::engagement::machine::EngagementStateMachine;
use crate::listings::engagement::memory::InMemoryEngagementRepository;
use crate::listings::engagement::repository::{
    EngagementRepository, EngagementStoreError, EngagementTx,
};
use crate::listings::registry::{ListingRef, ListingType};
use crate::listings::store::{ChatError, ChatService, ChatId, UserId};

pub(super) fn listing() -> ListingRef {
    ListingRef::new(ListingType::Service, 42)
}

pub(super) fn t(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 4, 1, 10, minute, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) const CLIENT: UserId = UserId(1);
pub(super) const PERFORMER_A: UserId = UserId(100);
pub(super) const PERFORMER_B: UserId = UserId(200);

/// Chat collaborator double issuing sequential ids and recording pairs.
#[derive(Default)]
pub(super) struct MemoryChatService {
    next_id: AtomicI64,
    pairs: Mutex<Vec<(UserId, UserId)>>,
}

impl MemoryChatService {
    pub(super) fn pairs(&self) -> Vec<(UserId, UserId)> {
        self.pairs.lock().expect("chat mutex poisoned").clone()
    }
}

impl ChatService for MemoryChatService {
    fn create_chat(&self, client: UserId, performer: UserId) -> Result<ChatId, ChatError> {
        self.pairs
            .lock()
            .expect("chat mutex poisoned")
            .push((client, performer));
        Ok(ChatId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1))
    }
}

pub(super) struct FailingChatService;

impl ChatService for FailingChatService {
    fn create_chat(&self, _client: UserId, _performer: UserId) -> Result<ChatId, ChatError> {
        Err(ChatError::Unavailable("chat backend offline".to_string()))
    }
}

/// Repository double whose every transaction fails before running.
pub(super) struct UnavailableRepository;

impl EngagementRepository for UnavailableRepository {
    fn transaction<T, E, F>(&self, _f: F) -> Result<T, E>
    where
        E: From<EngagementStoreError>,
        F: FnOnce(&mut dyn EngagementTx) -> Result<T, E>,
    {
        Err(EngagementStoreError::Unavailable("database offline".to_string()).into())
    }
}

pub(super) fn build_machine() -> (
    EngagementStateMachine<InMemoryEngagementRepository, MemoryChatService>,
    Arc<InMemoryEngagementRepository>,
    Arc<MemoryChatService>,
) {
    let repository = Arc::new(InMemoryEngagementRepository::default());
    let chat = Arc::new(MemoryChatService::default());
    let machine = EngagementStateMachine::new(repository.clone(), chat.clone());
    (machine, repository, chat)
}

pub(super) fn build_engagement() -> (
    ResponseLedger<InMemoryEngagementRepository>,
    EngagementStateMachine<InMemoryEngagementRepository, MemoryChatService>,
    Arc<InMemoryEngagementRepository>,
    Arc<MemoryChatService>,
) {
    let repository = Arc::new(InMemoryEngagementRepository::default());
    let chat = Arc::new(MemoryChatService::default());
    let ledger = ResponseLedger::new(repository.clone());
    let machine = EngagementStateMachine::new(repository.clone(), chat.clone());
    (ledger, machine, repository, chat)
}

pub(super) fn build_ledger() -> (
    ResponseLedger<InMemoryEngagementRepository>,
    Arc<InMemoryEngagementRepository>,
) {
    let repository = Arc::new(InMemoryEngagementRepository::default());
    let ledger = ResponseLedger::new(repository.clone());
    (ledger, repository)
}

pub(super) fn build_router() -> (
    axum::Router,
    Arc<InMemoryEngagementRepository>,
    Arc<MemoryChatService>,
) {
    let repository = Arc::new(InMemoryEngagementRepository::default());
    let chat = Arc::new(MemoryChatService::default());
    let handle = Arc::new(crate::listings::engagement::router::EngagementHandle::new(
        repository.clone(),
        chat.clone(),
    ));
    (
        crate::listings::engagement::router::engagement_router(handle),
        repository,
        chat,
    )
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
