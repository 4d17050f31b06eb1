use crate::infra::{
    midnight_utc, seed_catalog, InMemoryChatService, InMemoryListingStore, InMemoryReviewSource,
};
use crate::routes::{ranked_cards, PromotionState, RankMode};
use bazaar::error::AppError;
use bazaar::listings::engagement::{
    EngagementStateMachine, InMemoryEngagementRepository, ResponseLedger,
};
use bazaar::listings::promotion::TopAssignmentService;
use bazaar::listings::registry::{ListingRef, ListingType};
use bazaar::listings::store::UserId;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use clap::Args;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Evaluation date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Skip the promotion ranking portion of the demo.
    #[arg(long)]
    pub(crate) skip_promotion: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct TopPreviewArgs {
    /// Evaluation date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Boost duration in days applied to the demo purchases.
    #[arg(long, default_value_t = 7)]
    pub(crate) duration_days: i64,
}

pub(crate) fn run_top_preview(args: TopPreviewArgs) -> Result<(), AppError> {
    let now = args.today.map(midnight_utc).unwrap_or_else(Utc::now);
    let promotion = seeded_promotion_state(args.duration_days, now)?;

    println!("Promotion ranking preview (evaluated {})", now.date_naive());
    render_ranked(&promotion, RankMode::Full, now)?;
    render_ranked(&promotion, RankMode::Lift, now)?;
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let now = args.today.map(midnight_utc).unwrap_or_else(Utc::now);

    println!("Marketplace engagement demo");
    run_engagement_cycle(now)?;

    if args.skip_promotion {
        return Ok(());
    }

    println!("\nPromotion ranking demo");
    let promotion = seeded_promotion_state(7, now)?;
    render_ranked(&promotion, RankMode::Full, now)?;
    render_ranked(&promotion, RankMode::Lift, now)?;
    Ok(())
}

fn run_engagement_cycle(now: DateTime<Utc>) -> Result<(), AppError> {
    let repository = Arc::new(InMemoryEngagementRepository::default());
    let chat = Arc::new(InMemoryChatService::default());
    let ledger = ResponseLedger::new(repository.clone());
    let machine = EngagementStateMachine::new(repository, chat);

    let listing = ListingRef::new(ListingType::Service, 42);
    let client = UserId(1);
    let performer_a = UserId(100);
    let performer_b = UserId(200);

    ledger.submit(listing, performer_a, 100, "Can start tomorrow".to_string(), now)?;
    ledger.submit(
        listing,
        performer_b,
        120,
        "Ten years of experience".to_string(),
        now + Duration::minutes(5),
    )?;
    println!("- Two performers responded to {listing}");

    let opened = machine.open(listing, client, performer_a, now + Duration::minutes(10))?;
    println!(
        "- Conversation opened with performer {} (chat {})",
        opened.performer_id.0, opened.chat_id.0
    );

    let confirmed = machine.confirm(listing, performer_a, now + Duration::minutes(20))?;
    println!(
        "- Performer {} confirmed -> status {}",
        confirmed.performer_id.0,
        confirmed.status.label()
    );

    let remaining = ledger.list_by_listing(listing)?;
    println!("- Rival responses cascaded away, {} response(s) remain", remaining.len());

    let done = machine.complete(listing, now + Duration::hours(2))?;
    println!("- Engagement completed -> status {}", done.status.label());
    Ok(())
}

fn seeded_promotion_state(
    duration_days: i64,
    now: DateTime<Utc>,
) -> Result<PromotionState, AppError> {
    let store = Arc::new(InMemoryListingStore::default());
    let reviews = Arc::new(InMemoryReviewSource::default());
    let catalog = Arc::new(seed_catalog(&store, &reviews));
    let top = TopAssignmentService::new(store);

    // Two demo purchases bought a day apart.
    top.activate(
        ListingRef::new(ListingType::Service, 2),
        duration_days,
        now - Duration::days(1),
    )?;
    top.activate(ListingRef::new(ListingType::Rent, 4), duration_days, now)?;

    Ok(PromotionState { top, catalog, reviews })
}

fn render_ranked(
    promotion: &PromotionState,
    mode: RankMode,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    let label = match mode {
        RankMode::Full => "Full ranking (my-listings view)",
        RankMode::Lift => "Lift-only ranking (price-ordered search page)",
    };
    println!("\n{label}");

    for card in ranked_cards(promotion, mode, now)? {
        let boost_note = match card.top_until {
            Some(until) => format!(" | top until {}", until.date_naive()),
            None => String::new(),
        };
        println!(
            "- {}/{} | {} | {} | {} reviews, {:.1} avg{}",
            card.listing_type,
            card.id,
            card.title,
            card.price,
            card.review_count,
            card.average_rating,
            boost_note
        );
    }
    Ok(())
}
