//! Lifecycle tests for both lobby kinds, run against an in-memory
//! database through the same operations the handlers call.

use letsqueue::{AppError, archive, db, participants, private, public};
use sqlx::SqlitePool;

async fn setup() -> SqlitePool {
    let pool = db::connect("sqlite::memory:").await.expect("connect");
    db::migrate(&pool).await.expect("migrate");
    pool
}

fn public_req(max: i64) -> public::CreateLobby {
    public::CreateLobby {
        game: "valorant".to_owned(),
        rank: "gold1".to_owned(),
        vibe: "chill".to_owned(),
        mic_required: false,
        region: "EU".to_owned(),
        max_participants: Some(max),
    }
}

async fn expire_public(pool: &SqlitePool, id: &str) {
    sqlx::query("UPDATE public_lobbies SET expires_at = ? WHERE id = ?")
        .bind(letsqueue::now_ts() - 10)
        .bind(id)
        .execute(pool)
        .await
        .expect("expire lobby");
}

#[tokio::test]
async fn create_validates_against_the_rank_whitelist() {
    let pool = setup().await;

    let lobby = public::create(&pool, "tok-creator", &public_req(10)).await;
    assert!(lobby.is_ok());

    let mut req = public_req(10);
    req.rank = "predator".to_owned(); // an Apex rank
    assert!(matches!(
        public::create(&pool, "tok-creator", &req).await,
        Err(AppError::InvalidRank { .. })
    ));

    let mut req = public_req(10);
    req.game = "fortnite".to_owned();
    assert!(matches!(
        public::create(&pool, "tok-creator", &req).await,
        Err(AppError::InvalidGame(_))
    ));
}

#[tokio::test]
async fn capacity_bounds_are_enforced() {
    let pool = setup().await;

    assert!(matches!(
        public::create(&pool, "tok", &public_req(1)).await,
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        public::create(&pool, "tok", &public_req(11)).await,
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        private::create(&pool, "tok", &private::CreateLobby { max_participants: Some(6) }).await,
        Err(AppError::Validation(_))
    ));
}

#[tokio::test]
async fn filling_the_last_slot_flips_status_to_full() {
    let pool = setup().await;
    let lobby = public::create(&pool, "tok-creator", &public_req(2)).await.unwrap();

    public::join(&pool, &lobby.id, "tok-a", "Ana").await.unwrap();
    let detail = public::fetch_detail(&pool, &lobby.id).await.unwrap();
    assert_eq!(detail.status, "active");
    assert!(!detail.is_full);

    public::join(&pool, &lobby.id, "tok-b", "Ben").await.unwrap();
    let detail = public::fetch_detail(&pool, &lobby.id).await.unwrap();
    assert_eq!(detail.status, "full");
    assert!(detail.is_full);
    assert_eq!(detail.participant_count, 2);

    assert!(matches!(
        public::join(&pool, &lobby.id, "tok-c", "").await,
        Err(AppError::LobbyFull)
    ));
}

#[tokio::test]
async fn leaving_a_full_lobby_reopens_it() {
    let pool = setup().await;
    let lobby = public::create(&pool, "tok-creator", &public_req(2)).await.unwrap();
    public::join(&pool, &lobby.id, "tok-a", "").await.unwrap();
    public::join(&pool, &lobby.id, "tok-b", "").await.unwrap();

    public::leave(&pool, &lobby.id, "tok-a").await.unwrap();

    let detail = public::fetch_detail(&pool, &lobby.id).await.unwrap();
    assert_eq!(detail.status, "active");
    assert_eq!(detail.participant_count, 1);
}

#[tokio::test]
async fn duplicate_join_is_rejected_and_count_unchanged() {
    let pool = setup().await;
    let lobby = public::create(&pool, "tok-creator", &public_req(5)).await.unwrap();

    public::join(&pool, &lobby.id, "tok-a", "Ana").await.unwrap();
    assert!(matches!(
        public::join(&pool, &lobby.id, "tok-a", "Ana again").await,
        Err(AppError::AlreadyJoined)
    ));

    let count = participants::PUBLIC.count(&pool, &lobby.id).await.unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn leaving_without_membership_is_not_found() {
    let pool = setup().await;
    let lobby = public::create(&pool, "tok-creator", &public_req(5)).await.unwrap();

    assert!(matches!(
        public::leave(&pool, &lobby.id, "tok-stranger").await,
        Err(AppError::NotAMember)
    ));
}

#[tokio::test]
async fn expired_lobbies_reject_joins_and_reads_while_the_row_remains() {
    let pool = setup().await;
    let lobby = public::create(&pool, "tok-creator", &public_req(5)).await.unwrap();
    expire_public(&pool, &lobby.id).await;

    assert!(matches!(
        public::join(&pool, &lobby.id, "tok-a", "").await,
        Err(AppError::LobbyExpired)
    ));
    assert!(matches!(
        public::fetch_detail(&pool, &lobby.id).await,
        Err(AppError::LobbyExpired)
    ));

    // the row is still there until a delete or sweep reclaims it
    let (rows,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM public_lobbies WHERE id = ?")
        .bind(&lobby.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
async fn expired_lobbies_are_hidden_from_the_browse_list() {
    let pool = setup().await;
    let expired = public::create(&pool, "tok-creator", &public_req(5)).await.unwrap();
    let live = public::create(&pool, "tok-creator", &public_req(5)).await.unwrap();
    expire_public(&pool, &expired.id).await;

    let listed = public::list(&pool, &public::ListFilter::default()).await.unwrap();
    let ids: Vec<_> = listed.iter().map(|l| l.id.as_str()).collect();
    assert!(ids.contains(&live.id.as_str()));
    assert!(!ids.contains(&expired.id.as_str()));
}

#[tokio::test]
async fn list_filters_on_game_and_vibe() {
    let pool = setup().await;
    public::create(&pool, "tok", &public_req(5)).await.unwrap();

    let mut apex = public_req(5);
    apex.game = "apex".to_owned();
    apex.rank = "predator".to_owned();
    apex.vibe = "tryhard".to_owned();
    public::create(&pool, "tok", &apex).await.unwrap();

    let filter = public::ListFilter {
        game: Some("apex".to_owned()),
        ..Default::default()
    };
    let listed = public::list(&pool, &filter).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].game, "apex");

    let filter = public::ListFilter {
        game: Some("fortnite".to_owned()),
        ..Default::default()
    };
    assert!(matches!(
        public::list(&pool, &filter).await,
        Err(AppError::InvalidGame(_))
    ));
}

#[tokio::test]
async fn delete_archives_once_and_removes_everything() {
    let pool = setup().await;
    let lobby = public::create(&pool, "tok-creator", &public_req(5)).await.unwrap();
    public::join(&pool, &lobby.id, "tok-a", "Ana").await.unwrap();
    public::join(&pool, &lobby.id, "tok-b", "Ben").await.unwrap();

    assert!(matches!(
        public::delete(&pool, &lobby.id, "tok-stranger").await,
        Err(AppError::NotCreator)
    ));

    public::delete(&pool, &lobby.id, "tok-creator").await.unwrap();

    let (archives, total): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(SUM(total_participants), 0)
         FROM archived_public_lobby_stats WHERE lobby_id = ?",
    )
    .bind(&lobby.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(archives, 1);
    assert_eq!(total, 2);

    let (lobbies,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM public_lobbies WHERE id = ?")
        .bind(&lobby.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(lobbies, 0);

    let members = participants::PUBLIC.count(&pool, &lobby.id).await.unwrap();
    assert_eq!(members, 0);

    assert!(matches!(
        public::fetch_detail(&pool, &lobby.id).await,
        Err(AppError::NotFound)
    ));
}

#[tokio::test]
async fn private_lobby_walkthrough() {
    let pool = setup().await;

    // creator opens a two-seat lobby and takes the first seat
    let lobby = private::create(
        &pool,
        "tok-creator",
        &private::CreateLobby { max_participants: Some(2) },
    )
    .await
    .unwrap();

    let detail = private::fetch_detail(&pool, &lobby.id, "tok-creator").await.unwrap();
    assert_eq!(detail.participant_count, 1);
    assert_eq!(detail.status, "active");
    assert!(detail.is_creator);

    // second identity fills the lobby through the code, lowercase works
    let (joined, _) = private::join_by_code(
        &pool,
        &lobby.lobby_code.to_lowercase(),
        "tok-friend",
        "Fay",
    )
    .await
    .unwrap();
    assert_eq!(joined.id, lobby.id);

    let detail = private::fetch_detail(&pool, &lobby.id, "tok-friend").await.unwrap();
    assert_eq!(detail.participant_count, 2);
    assert_eq!(detail.status, "full");
    assert!(!detail.is_creator);

    // a third seat does not exist
    assert!(matches!(
        private::join_by_code(&pool, &lobby.lobby_code, "tok-third", "").await,
        Err(AppError::LobbyFull)
    ));

    // the friend can leave, which reopens the lobby
    private::leave(&pool, &lobby.id, "tok-friend").await.unwrap();
    let detail = private::fetch_detail(&pool, &lobby.id, "tok-creator").await.unwrap();
    assert_eq!(detail.participant_count, 1);
    assert_eq!(detail.status, "active");

    // the creator cannot leave, only delete
    assert!(matches!(
        private::leave(&pool, &lobby.id, "tok-creator").await,
        Err(AppError::CreatorCannotLeave)
    ));
    assert!(matches!(
        private::delete(&pool, &lobby.id, "tok-friend").await,
        Err(AppError::NotCreator)
    ));
    private::delete(&pool, &lobby.id, "tok-creator").await.unwrap();

    let (archives,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM archived_private_lobby_stats WHERE lobby_id = ?")
            .bind(&lobby.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(archives, 1);
    assert!(matches!(
        private::fetch_detail(&pool, &lobby.id, "tok-creator").await,
        Err(AppError::NotFound)
    ));
}

#[tokio::test]
async fn private_listing_only_shows_own_lobbies() {
    let pool = setup().await;
    let mine = private::create(&pool, "tok-me", &private::CreateLobby::default())
        .await
        .unwrap();
    private::create(&pool, "tok-other", &private::CreateLobby::default())
        .await
        .unwrap();

    let listed = private::list_for(&pool, "tok-me").await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, mine.id);
}

#[tokio::test]
async fn sweep_reclaims_only_expired_lobbies() {
    let pool = setup().await;
    let expired = public::create(&pool, "tok", &public_req(5)).await.unwrap();
    public::join(&pool, &expired.id, "tok-a", "").await.unwrap();
    let live = public::create(&pool, "tok", &public_req(5)).await.unwrap();
    expire_public(&pool, &expired.id).await;

    let expired_private = private::create(&pool, "tok", &private::CreateLobby::default())
        .await
        .unwrap();
    sqlx::query("UPDATE private_lobbies SET expires_at = ? WHERE id = ?")
        .bind(letsqueue::now_ts() - 10)
        .bind(&expired_private.id)
        .execute(&pool)
        .await
        .unwrap();

    let reclaimed = archive::sweep_expired(&pool).await.unwrap();
    assert_eq!(reclaimed, 2);

    assert!(public::fetch_detail(&pool, &live.id).await.is_ok());
    assert!(matches!(
        public::fetch_detail(&pool, &expired.id).await,
        Err(AppError::NotFound)
    ));

    let (archives, total): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(SUM(total_participants), 0)
         FROM archived_public_lobby_stats WHERE lobby_id = ?",
    )
    .bind(&expired.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(archives, 1);
    assert_eq!(total, 1);

    // running it again finds nothing left to do
    assert_eq!(archive::sweep_expired(&pool).await.unwrap(), 0);
}

#[tokio::test]
async fn operations_on_missing_lobbies_are_not_found() {
    let pool = setup().await;
    let ghost = uuid::Uuid::now_v7().to_string();

    assert!(matches!(
        public::join(&pool, &ghost, "tok", "").await,
        Err(AppError::NotFound)
    ));
    assert!(matches!(
        private::join_by_code(&pool, "ZZZZZZZZ", "tok", "").await,
        Err(AppError::NotFound)
    ));
}
