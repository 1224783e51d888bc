//! Quest Log session - runs a GM and a player client on a local bus.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use questlog_client::infrastructure::local_bus::LocalBus;
use questlog_client::infrastructure::memory::InMemoryQuestStore;
use questlog_client::{LocalClient, SyncSettings};
use questlog_domain::{
    Actor, PermissionLevel, Quest, QuestId, QuestPermissions, QuestStatus, Reward,
};
use questlog_shared::{CharacterRef, RewardClaim};

/// Time allowed for broadcasts to reach every listener.
const SETTLE: Duration = Duration::from_millis(50);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv_from_repo_root();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "questlog_client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = SyncSettings::from_env();
    tracing::info!(?settings, "Starting quest log session");

    let store = Arc::new(InMemoryQuestStore::new());
    seed(&store).await;

    let bus = LocalBus::new();
    let gm = Actor::gm("gm", "Morgan");
    let player = Actor::player("pat", "Pat");

    let (gm_client, gm_inbox) = LocalClient::connect(&bus, store.clone(), gm, settings);
    let (player_client, player_inbox) =
        LocalClient::connect(&bus, store.clone(), player.clone(), settings);
    let _gm_listener = gm_client.dispatcher.listen(gm_inbox)?;
    let _player_listener = player_client.dispatcher.listen(player_inbox)?;

    let q1 = QuestId::new("Q1");
    let q2 = QuestId::new("Q2");
    player_client.quests().open_quest(&q1, true).await?;
    player_client.quests().open_quest(&q2, true).await?;
    player_client.views.clear_events().await;

    // GM completes Q1; the player's Q1 and Q2 views follow.
    if let Some(quest) = store.snapshot(&q1).await {
        let outcome = gm_client
            .quests()
            .move_quest(&quest, QuestStatus::Completed)
            .await?;
        tracing::info!(?outcome, "GM moved Q1");
    }
    tokio::time::sleep(SETTLE).await;
    tracing::info!(
        rendered = ?player_client.views.rendered().await,
        "Player views after GM move"
    );

    // The player may only ask for moves into the active category.
    if let Some(quest) = store.snapshot(&q2).await {
        let refused = player_client
            .quests()
            .move_quest(&quest, QuestStatus::Failed)
            .await?;
        let requested = player_client
            .quests()
            .move_quest(&quest, QuestStatus::Active)
            .await?;
        tracing::info!(?refused, ?requested, "Player move requests");
    }
    tokio::time::sleep(SETTLE).await;

    // The player claims a reward; the GM client removes it.
    player_client
        .quests()
        .quest_reward_drop(
            CharacterRef {
                id: "aria".into(),
                name: "Aria".into(),
            },
            RewardClaim {
                quest_id: q1.clone(),
                reward_id: "gold".into(),
                user_id: player.id.clone(),
                user_name: player.name.clone(),
                item_name: "Bag of gold".into(),
            },
        )
        .await?;
    tokio::time::sleep(SETTLE).await;

    if let (Some(q1), Some(q2)) = (store.snapshot(&q1).await, store.snapshot(&q2).await) {
        tracing::info!(
            q1_status = %q1.status,
            q1_rewards = q1.rewards.len(),
            q2_status = %q2.status,
            revision = store.revision(),
            "Final quest state"
        );
    }
    for (level, notification) in gm_client.notifier.entries() {
        tracing::info!(?level, %notification, "GM notification");
    }

    Ok(())
}

async fn seed(store: &InMemoryQuestStore) {
    let permissions = QuestPermissions::with_default(PermissionLevel::Observer)
        .grant("pat", PermissionLevel::Owner);
    store
        .insert(
            Quest::new("Q1", "Recover the relic", QuestStatus::Active)
                .with_subquest("Q2")
                .with_reward(Reward::new("Bag of gold").with_id("gold"))
                .with_permissions(permissions.clone()),
        )
        .await;
    store
        .insert(
            Quest::new("Q2", "Find the map", QuestStatus::Available)
                .with_parent("Q1")
                .with_permissions(permissions),
        )
        .await;
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
