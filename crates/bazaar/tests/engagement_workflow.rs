//! Integration specifications for the response/confirmation workflow.
//!
//! Scenarios drive the public facade end to end: submit, confirm with its
//! exclusivity cascade, cancel, and the fresh cycle afterwards, asserting
//! the invariants a relational adapter must also uphold.

mod common {
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::{Arc, Mutex};

    use chrono::{DateTime, TimeZone, Utc};

    use bazaar::listings::engagement::{
        EngagementStateMachine, InMemoryEngagementRepository, ResponseLedger,
    };
    use bazaar::listings::registry::{ListingRef, ListingType};
    use bazaar::listings::store::{ChatError, ChatId, ChatService, UserId};

    pub const CLIENT: UserId = UserId(1);
    pub const PERFORMER_A: UserId = UserId(100);
    pub const PERFORMER_B: UserId = UserId(200);

    pub fn listing() -> ListingRef {
        ListingRef::new(ListingType::Service, 42)
    }

    pub fn t(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 1, 10, minute, 0)
            .single()
            .expect("valid timestamp")
    }

    #[derive(Default)]
    pub struct RecordingChatService {
        next_id: AtomicI64,
        pairs: Mutex<Vec<(UserId, UserId)>>,
    }

    impl RecordingChatService {
        pub fn pairs(&self) -> Vec<(UserId, UserId)> {
            self.pairs.lock().expect("chat mutex poisoned").clone()
        }
    }

    impl ChatService for RecordingChatService {
        fn create_chat(&self, client: UserId, performer: UserId) -> Result<ChatId, ChatError> {
            self.pairs
                .lock()
                .expect("chat mutex poisoned")
                .push((client, performer));
            Ok(ChatId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1))
        }
    }

    pub struct Workbench {
        pub ledger: ResponseLedger<InMemoryEngagementRepository>,
        pub machine: EngagementStateMachine<InMemoryEngagementRepository, RecordingChatService>,
        pub repository: Arc<InMemoryEngagementRepository>,
        pub chat: Arc<RecordingChatService>,
    }

    pub fn workbench() -> Workbench {
        let repository = Arc::new(InMemoryEngagementRepository::default());
        let chat = Arc::new(RecordingChatService::default());
        Workbench {
            ledger: ResponseLedger::new(repository.clone()),
            machine: EngagementStateMachine::new(repository.clone(), chat.clone()),
            repository,
            chat,
        }
    }
}

use bazaar::listings::engagement::domain::ConfirmationStatus;
use bazaar::listings::registry::ListingStatus;
use common::*;

#[test]
fn submit_confirm_cancel_cycle() {
    let bench = workbench();

    // A bids 100 at t1, B bids 120 at t2.
    bench
        .ledger
        .submit(listing(), PERFORMER_A, 100, "bid A".to_string(), t(1))
        .expect("A responds");
    bench
        .ledger
        .submit(listing(), PERFORMER_B, 120, "bid B".to_string(), t(2))
        .expect("B responds");

    bench
        .machine
        .open(listing(), CLIENT, PERFORMER_A, t(3))
        .expect("conversation with A");
    assert_eq!(bench.chat.pairs(), vec![(CLIENT, PERFORMER_A)]);

    let confirmed = bench
        .machine
        .confirm(listing(), PERFORMER_A, t(4))
        .expect("A locked in");
    assert_eq!(confirmed.status, ConfirmationStatus::InProgress);

    // Cascade completeness: only A's response remains, listing moved along.
    let rows = bench.ledger.list_by_listing(listing()).expect("candidates");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].user_id, PERFORMER_A);
    assert_eq!(
        bench.repository.listing_status(listing()),
        Some(ListingStatus::InProgress)
    );

    // Cancel archives the row; B's response stays deleted.
    let archived = bench
        .machine
        .cancel(listing(), PERFORMER_A, t(5))
        .expect("cancelled");
    assert_eq!(archived.status, ConfirmationStatus::Archived);
    assert!(!archived.confirmed);

    let rows = bench.ledger.list_by_listing(listing()).expect("candidates");
    assert_eq!(rows.len(), 1, "rival responses are not restored");
    assert_eq!(rows[0].user_id, PERFORMER_A);
}

#[test]
fn response_uniqueness_survives_any_submission_sequence() {
    let bench = workbench();

    for (price, minute) in [(100, 1), (90, 2), (80, 3)] {
        let _ = bench
            .ledger
            .submit(listing(), PERFORMER_A, price, String::new(), t(minute));
    }

    let rows = bench.ledger.list_by_listing(listing()).expect("candidates");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].price, 100, "only the first submission is kept");
}

#[test]
fn confirmation_exclusivity_across_a_whole_history() {
    let bench = workbench();

    bench
        .machine
        .open(listing(), CLIENT, PERFORMER_A, t(1))
        .expect("conversation A");
    bench
        .machine
        .open(listing(), CLIENT, PERFORMER_B, t(2))
        .expect("conversation B");
    bench
        .machine
        .confirm(listing(), PERFORMER_A, t(3))
        .expect("A confirmed");
    bench
        .machine
        .cancel(listing(), PERFORMER_A, t(4))
        .expect("A cancelled");
    bench
        .machine
        .confirm(listing(), PERFORMER_B, t(5))
        .expect("B confirmed in the next cycle");

    let confirmed: Vec<_> = bench
        .repository
        .confirmations_for(listing())
        .into_iter()
        .filter(|row| row.confirmed)
        .collect();
    assert_eq!(confirmed.len(), 1);
    assert_eq!(confirmed[0].performer_id, PERFORMER_B);
}

#[test]
fn completion_closes_row_and_listing_together() {
    let bench = workbench();

    bench
        .ledger
        .submit(listing(), PERFORMER_A, 100, String::new(), t(1))
        .expect("A responds");
    bench
        .machine
        .open(listing(), CLIENT, PERFORMER_A, t(2))
        .expect("conversation");
    bench
        .machine
        .confirm(listing(), PERFORMER_A, t(3))
        .expect("confirmed");

    let done = bench.machine.complete(listing(), t(4)).expect("completed");
    assert_eq!(done.status, ConfirmationStatus::Done);
    assert_eq!(
        bench.repository.listing_status(listing()),
        Some(ListingStatus::Done)
    );
}
