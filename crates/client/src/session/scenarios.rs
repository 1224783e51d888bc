//! Multi-client scenarios over the in-process bus.
//!
//! Every client shares one quest store, as the clients of a real session share
//! one replicated document store. Inboxes are pumped by hand so each test
//! controls delivery order.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::{mpsc, Barrier};

use crate::api::handlers;
use crate::app::{SyncContext, SyncPorts};
use crate::infrastructure::local_bus::LocalBus;
use crate::infrastructure::memory::{
    InMemoryQuestStore, InMemoryViewRegistry, RecordingNotifier, ViewEvent,
};
use crate::infrastructure::ports::{
    Notification, NotifyLevel, QuestDirectory, RepoError, SocketEmitter, ViewRegistry,
};
use crate::use_cases::{DeletedQuestNotice, MoveOutcome, RewardDropOutcome};
use crate::{DispatchOutcome, LocalClient, SyncSettings};
use questlog_domain::{
    Actor, PermissionLevel, Quest, QuestId, QuestPermissions, QuestStatus, Reward, RewardId,
};
use questlog_shared::{
    CharacterRef, MessageKind, MoveQuestPayload, QuestSocketMessage, RenderOptions, RewardClaim,
};

struct Session {
    bus: Arc<LocalBus>,
    store: Arc<InMemoryQuestStore>,
}

impl Session {
    async fn new(quests: Vec<Quest>) -> Self {
        let store = Arc::new(InMemoryQuestStore::new());
        for quest in quests {
            store.insert(quest).await;
        }
        Self {
            bus: LocalBus::new(),
            store,
        }
    }

    fn join(&self, actor: Actor) -> (LocalClient, mpsc::Receiver<Value>) {
        LocalClient::connect(
            &self.bus,
            self.store.clone(),
            actor,
            SyncSettings::default(),
        )
    }
}

fn visible() -> QuestPermissions {
    QuestPermissions::with_default(PermissionLevel::Observer).grant("pat", PermissionLevel::Owner)
}

fn id(raw: &str) -> QuestId {
    QuestId::new(raw)
}

fn gm(name: &str) -> Actor {
    Actor::gm(name.to_lowercase(), name)
}

fn pat() -> Actor {
    Actor::player("pat", "Pat")
}

async fn open_all(client: &LocalClient, session: &Session, ids: &[&str]) {
    for raw in ids {
        let quest = session
            .store
            .snapshot(&id(raw))
            .await
            .expect("seeded quest");
        client
            .views
            .open(&quest, &RenderOptions::new())
            .await
            .unwrap();
    }
    client.views.clear_events().await;
}

fn relic_family() -> Vec<Quest> {
    vec![
        Quest::new("Q1", "Recover the relic", QuestStatus::Active)
            .with_subquest("Q2")
            .with_permissions(visible()),
        Quest::new("Q2", "Find the map", QuestStatus::Available)
            .with_parent("Q1")
            .with_permissions(visible()),
    ]
}

#[tokio::test]
async fn handled_move_refreshes_player_views_without_reapplying() {
    let session = Session::new(relic_family()).await;
    let (gm_client, _gm_inbox) = session.join(gm("Morgan"));
    let (player, mut player_inbox) = session.join(pat());
    open_all(&player, &session, &["Q1", "Q2"]).await;

    // The GM client applied the move locally before announcing it.
    let mut q1 = session.store.snapshot(&id("Q1")).await.unwrap();
    q1.apply_move(QuestStatus::Completed);
    session.store.save(&q1).await.unwrap();
    let revision = session.store.revision();

    gm_client
        .socket
        .emit(&QuestSocketMessage::MoveQuest(MoveQuestPayload {
            quest_id: id("Q1"),
            handled: true,
            target: QuestStatus::Completed,
        }))
        .unwrap();

    let outcomes = player.pump(&mut player_inbox).await;

    assert_eq!(outcomes, vec![DispatchOutcome::Handled(MessageKind::MoveQuest)]);
    assert_eq!(session.store.revision(), revision);
    let rendered: HashSet<QuestId> = player.views.rendered().await.into_iter().collect();
    assert_eq!(rendered, HashSet::from([id("Q1"), id("Q2")]));
}

#[tokio::test]
async fn gm_move_reaches_player_through_refresh_broadcast() {
    let session = Session::new(relic_family()).await;
    let (gm_client, _gm_inbox) = session.join(gm("Morgan"));
    let (player, mut player_inbox) = session.join(pat());
    open_all(&player, &session, &["Q1", "Q2"]).await;

    let q1 = session.store.snapshot(&id("Q1")).await.unwrap();
    let outcome = gm_client
        .quests()
        .move_quest(&q1, QuestStatus::Completed)
        .await
        .unwrap();
    assert_eq!(outcome, MoveOutcome::Applied);
    assert_eq!(session.store.revision(), 1);
    assert_eq!(
        gm_client.notifier.entries().last().map(|(_, n)| n.clone()),
        Some(Notification::QuestMoved {
            target: QuestStatus::Completed
        })
    );

    let outcomes = player.pump(&mut player_inbox).await;
    assert!(outcomes
        .iter()
        .all(|outcome| matches!(outcome, DispatchOutcome::Handled(_))));
    assert!(outcomes.contains(&DispatchOutcome::Handled(MessageKind::QuestPreviewRefresh)));
    assert!(outcomes.contains(&DispatchOutcome::Handled(MessageKind::QuestLogRefresh)));

    let events = player.views.events().await;
    assert!(events.contains(&ViewEvent::Rendered(id("Q1"))));
    assert!(events.contains(&ViewEvent::Rendered(id("Q2"))));
    assert!(events.contains(&ViewEvent::LogRendered));
    assert_eq!(session.store.revision(), 1);
}

#[tokio::test]
async fn gated_player_move_sends_nothing() {
    let session = Session::new(relic_family()).await;
    let (gm_client, mut gm_inbox) = session.join(gm("Morgan"));
    let (player, _player_inbox) = session.join(pat());

    let q2 = session.store.snapshot(&id("Q2")).await.unwrap();
    let outcome = player
        .quests()
        .move_quest(&q2, QuestStatus::Completed)
        .await
        .unwrap();

    assert_eq!(outcome, MoveOutcome::Refused);
    assert!(gm_client.pump(&mut gm_inbox).await.is_empty());
    assert_eq!(session.store.revision(), 0);
}

#[tokio::test]
async fn enabling_player_accept_lets_requests_through() {
    let session = Session::new(relic_family()).await;
    let (gm_client, mut gm_inbox) = session.join(gm("Morgan"));
    let (player, _player_inbox) = session.join(pat());

    player
        .context
        .update_settings(SyncSettings {
            allow_players_accept: true,
            ..SyncSettings::default()
        })
        .await;

    let q2 = session.store.snapshot(&id("Q2")).await.unwrap();
    let outcome = player
        .quests()
        .move_quest(&q2, QuestStatus::Completed)
        .await
        .unwrap();
    assert_eq!(outcome, MoveOutcome::Requested);

    gm_client.pump(&mut gm_inbox).await;
    assert_eq!(
        session.store.snapshot(&id("Q2")).await.unwrap().status,
        QuestStatus::Completed
    );
}

#[tokio::test]
async fn two_gms_apply_an_unhandled_move_once_in_sequence() {
    let session = Session::new(relic_family()).await;
    let (gm_a, mut inbox_a) = session.join(gm("Morgan"));
    let (gm_b, mut inbox_b) = session.join(gm("Riley"));
    let (player, _player_inbox) = session.join(pat());

    let q2 = session.store.snapshot(&id("Q2")).await.unwrap();
    let outcome = player
        .quests()
        .move_quest(&q2, QuestStatus::Active)
        .await
        .unwrap();
    assert_eq!(outcome, MoveOutcome::Requested);

    gm_a.pump(&mut inbox_a).await;
    gm_b.pump(&mut inbox_b).await;
    gm_a.pump(&mut inbox_a).await;

    assert_eq!(session.store.revision(), 1);
    assert_eq!(
        session.store.snapshot(&id("Q2")).await.unwrap().status,
        QuestStatus::Active
    );
}

#[tokio::test]
async fn two_gms_pumped_together_apply_an_unhandled_move_once() {
    let session = Session::new(relic_family()).await;
    let (gm_a, mut inbox_a) = session.join(gm("Morgan"));
    let (gm_b, mut inbox_b) = session.join(gm("Riley"));
    let (player, _player_inbox) = session.join(pat());

    let q2 = session.store.snapshot(&id("Q2")).await.unwrap();
    player
        .quests()
        .move_quest(&q2, QuestStatus::Active)
        .await
        .unwrap();

    tokio::join!(gm_a.pump(&mut inbox_a), gm_b.pump(&mut inbox_b));

    assert_eq!(session.store.revision(), 1);
}

/// Directory view of the shared store that holds its first read until every
/// client in the barrier has read too.
struct ReadTogether {
    store: Arc<InMemoryQuestStore>,
    barrier: Arc<Barrier>,
    waited: AtomicBool,
}

#[async_trait]
impl QuestDirectory for ReadTogether {
    async fn get(&self, id: &QuestId) -> Result<Option<Quest>, RepoError> {
        let found = self.store.get(id).await?;
        if !self.waited.swap(true, Ordering::SeqCst) {
            self.barrier.wait().await;
        }
        Ok(found)
    }

    async fn save(&self, quest: &Quest) -> Result<(), RepoError> {
        self.store.save(quest).await
    }
}

fn gm_reading_together(
    session: &Session,
    name: &str,
    barrier: &Arc<Barrier>,
) -> (SyncContext, Arc<RecordingNotifier>) {
    let (socket, _inbox) = session.bus.connect();
    let notifier = Arc::new(RecordingNotifier::new());
    let ports = SyncPorts {
        directory: Arc::new(ReadTogether {
            store: session.store.clone(),
            barrier: barrier.clone(),
            waited: AtomicBool::new(false),
        }),
        views: Arc::new(InMemoryViewRegistry::new()),
        notifier: notifier.clone(),
        socket,
    };
    (
        SyncContext::new(gm(name), SyncSettings::default(), ports),
        notifier,
    )
}

#[tokio::test]
async fn two_gms_reading_before_either_writes_store_the_move_once() {
    let session = Session::new(relic_family()).await;
    let barrier = Arc::new(Barrier::new(2));
    let (gm_a, notes_a) = gm_reading_together(&session, "Morgan", &barrier);
    let (gm_b, notes_b) = gm_reading_together(&session, "Riley", &barrier);

    let request = MoveQuestPayload {
        quest_id: id("Q2"),
        handled: false,
        target: QuestStatus::Active,
    };
    let (a, b) = tokio::join!(
        handlers::move_quest(&gm_a, request.clone()),
        handlers::move_quest(&gm_b, request),
    );
    a.unwrap();
    b.unwrap();

    // Both clients applied the move from the same pre-move read.
    for notes in [&notes_a, &notes_b] {
        assert!(notes.entries().contains(&(
            NotifyLevel::Info,
            Notification::QuestMoved {
                target: QuestStatus::Active
            }
        )));
    }
    assert_eq!(session.store.revision(), 1);
    assert_eq!(
        session.store.snapshot(&id("Q2")).await.unwrap().status,
        QuestStatus::Active
    );
}

#[tokio::test]
async fn racing_writes_of_the_same_move_store_once() {
    let session = Session::new(relic_family()).await;

    // Both GM clients read before either writes.
    let mut seen_by_a = session.store.get(&id("Q2")).await.unwrap().unwrap();
    let mut seen_by_b = session.store.get(&id("Q2")).await.unwrap().unwrap();
    assert!(seen_by_a.apply_move(QuestStatus::Active));
    assert!(seen_by_b.apply_move(QuestStatus::Active));
    session.store.save(&seen_by_a).await.unwrap();
    session.store.save(&seen_by_b).await.unwrap();

    assert_eq!(session.store.revision(), 1);
}

#[tokio::test]
async fn refresh_fan_out_covers_parent_self_and_children_only() {
    let session = Session::new(vec![
        Quest::new("P", "Parent", QuestStatus::Active)
            .with_subquest("E")
            .with_permissions(visible()),
        Quest::new("E", "Entity", QuestStatus::Active)
            .with_parent("P")
            .with_subquest("C1")
            .with_subquest("C2")
            .with_permissions(visible()),
        Quest::new("C1", "Child one", QuestStatus::Active)
            .with_parent("E")
            .with_permissions(visible()),
        Quest::new("C2", "Child two", QuestStatus::Active)
            .with_parent("E")
            .with_permissions(visible()),
        Quest::new("X", "Unrelated", QuestStatus::Active).with_permissions(visible()),
    ])
    .await;
    let (gm_client, _gm_inbox) = session.join(gm("Morgan"));
    let (player, mut player_inbox) = session.join(pat());
    open_all(&player, &session, &["P", "E", "C1", "C2", "X"]).await;

    let entity = session.store.snapshot(&id("E")).await.unwrap();
    gm_client
        .quests()
        .move_quest(&entity, QuestStatus::Completed)
        .await
        .unwrap();
    player.pump(&mut player_inbox).await;

    let rendered: HashSet<QuestId> = player.views.rendered().await.into_iter().collect();
    assert_eq!(
        rendered,
        HashSet::from([id("P"), id("E"), id("C1"), id("C2")])
    );
}

#[tokio::test]
async fn hidden_quest_view_is_closed_not_rendered() {
    let session = Session::new(relic_family()).await;
    let (gm_client, _gm_inbox) = session.join(gm("Morgan"));
    let (player, mut player_inbox) = session.join(pat());
    open_all(&player, &session, &["Q1", "Q2"]).await;

    let q2 = session.store.snapshot(&id("Q2")).await.unwrap();
    gm_client
        .quests()
        .move_quest(&q2, QuestStatus::Inactive)
        .await
        .unwrap();
    player.pump(&mut player_inbox).await;

    assert!(!player.views.is_open(&id("Q2")));
    assert!(player.views.is_open(&id("Q1")));
    let events = player.views.events().await;
    assert!(!events.contains(&ViewEvent::Rendered(id("Q2"))));
    assert!(events.iter().any(|event| matches!(
        event,
        ViewEvent::Closed { quest_id, .. } if *quest_id == id("Q2")
    )));
}

#[tokio::test]
async fn deletion_closes_peer_view_without_save() {
    let session = Session::new(relic_family()).await;
    let (gm_client, _gm_inbox) = session.join(gm("Morgan"));
    let (player, mut player_inbox) = session.join(pat());
    open_all(&player, &session, &["Q1", "Q2"]).await;

    // Deleting Q2 rewrites its parent's subquest list.
    session.store.remove(&id("Q2")).await;
    let mut q1 = session.store.snapshot(&id("Q1")).await.unwrap();
    q1.subquests.clear();
    session.store.save(&q1).await.unwrap();

    gm_client
        .quests()
        .deleted_quest(DeletedQuestNotice {
            quest_id: id("Q2"),
            saved_ids: vec![id("Q1")],
        })
        .await
        .unwrap();
    let outcomes = player.pump(&mut player_inbox).await;

    assert_eq!(
        outcomes.first(),
        Some(&DispatchOutcome::Handled(MessageKind::DeletedQuest))
    );
    let events = player.views.events().await;
    assert!(events.contains(&ViewEvent::DialogsClosed(id("Q2"))));
    assert!(events.contains(&ViewEvent::Closed {
        quest_id: id("Q2"),
        no_save: true
    }));
    assert!(!events.contains(&ViewEvent::Rendered(id("Q2"))));
    assert!(events.contains(&ViewEvent::Rendered(id("Q1"))));
}

#[tokio::test]
async fn deletion_without_relinks_still_refreshes_every_log() {
    let mut quests = relic_family();
    quests.push(Quest::new("L", "Lone errand", QuestStatus::Active).with_permissions(visible()));
    let session = Session::new(quests).await;
    let (gm_client, _gm_inbox) = session.join(gm("Morgan"));
    let (player, mut player_inbox) = session.join(pat());
    open_all(&player, &session, &["L"]).await;

    session.store.remove(&id("L")).await;
    gm_client
        .quests()
        .deleted_quest(DeletedQuestNotice {
            quest_id: id("L"),
            saved_ids: vec![],
        })
        .await
        .unwrap();
    let outcomes = player.pump(&mut player_inbox).await;

    assert_eq!(
        outcomes,
        vec![
            DispatchOutcome::Handled(MessageKind::DeletedQuest),
            DispatchOutcome::Handled(MessageKind::QuestLogRefresh),
        ]
    );
    let events = player.views.events().await;
    assert!(!player.views.is_open(&id("L")));
    assert!(events.contains(&ViewEvent::LogRendered));
    assert!(gm_client
        .views
        .events()
        .await
        .contains(&ViewEvent::LogRendered));
}

#[tokio::test]
async fn bad_messages_do_not_stop_the_next_one() {
    let session = Session::new(relic_family()).await;
    let (gm_client, _gm_inbox) = session.join(gm("Morgan"));
    let (player, mut player_inbox) = session.join(pat());

    gm_client.socket.emit_raw(&json!("not an envelope"));
    gm_client
        .socket
        .emit_raw(&json!({"kind": "questPreviewRefresh", "payload": {"questId": 42}}));
    gm_client
        .socket
        .emit_raw(&json!({"kind": "questLogRefresh", "payload": {"options": []}}));

    let outcomes = player.pump(&mut player_inbox).await;

    assert_eq!(
        outcomes,
        vec![
            DispatchOutcome::Dropped,
            DispatchOutcome::Dropped,
            DispatchOutcome::Handled(MessageKind::QuestLogRefresh),
        ]
    );
    assert_eq!(player.views.events().await, vec![ViewEvent::LogRendered]);
}

#[tokio::test]
async fn reward_claim_is_removed_once_and_announced_once_per_gm() {
    let session = Session::new(vec![Quest::new("Q1", "Recover the relic", QuestStatus::Active)
        .with_reward(Reward::new("Bag of gold").with_id("gold"))
        .with_permissions(visible())])
    .await;
    let (gm_a, mut inbox_a) = session.join(gm("Morgan"));
    let (gm_b, mut inbox_b) = session.join(gm("Riley"));
    let (player, mut player_inbox) = session.join(pat());

    let outcome = player
        .quests()
        .quest_reward_drop(
            CharacterRef {
                id: "aria".into(),
                name: "Aria".into(),
            },
            RewardClaim {
                quest_id: id("Q1"),
                reward_id: RewardId::new("gold"),
                user_id: "pat".into(),
                user_name: "Pat".into(),
                item_name: "Bag of gold".into(),
            },
        )
        .await
        .unwrap();
    assert_eq!(outcome, RewardDropOutcome::Requested);

    gm_a.pump(&mut inbox_a).await;
    gm_b.pump(&mut inbox_b).await;
    gm_a.pump(&mut inbox_a).await;
    player.pump(&mut player_inbox).await;

    let quest = session.store.snapshot(&id("Q1")).await.unwrap();
    assert!(quest.rewards.is_empty());
    assert_eq!(session.store.revision(), 1);

    for client in [&gm_a, &gm_b] {
        let drops = client
            .notifier
            .entries()
            .into_iter()
            .filter(|(_, n)| matches!(n, Notification::RewardDropped { .. }))
            .count();
        assert_eq!(drops, 1);
    }
    assert!(player.notifier.entries().is_empty());
}

#[tokio::test]
async fn show_preview_opens_on_peers_that_can_observe() {
    let mut quests = relic_family();
    quests.push(Quest::new("Q3", "Secret", QuestStatus::Active));
    let session = Session::new(quests).await;
    let (gm_client, mut gm_inbox) = session.join(gm("Morgan"));
    let (player, mut player_inbox) = session.join(pat());

    gm_client.quests().show_quest_preview(id("Q1"));
    gm_client.quests().show_quest_preview(id("Q3"));
    player.pump(&mut player_inbox).await;

    assert!(player.views.is_open(&id("Q1")));
    assert!(!player.views.is_open(&id("Q3")));
    // a silent open never announces the failure
    assert!(gm_client.pump(&mut gm_inbox).await.is_empty());
    assert!(player.notifier.entries().is_empty());
}

#[tokio::test]
async fn failed_open_warns_gm_clients() {
    let mut quests = relic_family();
    quests.push(Quest::new("Q3", "Secret", QuestStatus::Active));
    let session = Session::new(quests).await;
    let (gm_client, mut gm_inbox) = session.join(gm("Morgan"));
    let (player, _player_inbox) = session.join(pat());

    player.quests().open_quest(&id("Q3"), true).await.unwrap();
    gm_client.pump(&mut gm_inbox).await;

    assert_eq!(
        gm_client
            .notifier
            .entries()
            .into_iter()
            .map(|(_, n)| n)
            .collect::<Vec<_>>(),
        vec![Notification::UserCantOpen {
            user: "Pat".into()
        }]
    );
}

#[tokio::test]
async fn listener_task_drives_dispatch() {
    let session = Session::new(relic_family()).await;
    let (gm_client, gm_inbox) = session.join(gm("Morgan"));
    let (player, _player_inbox) = session.join(pat());
    gm_client.dispatcher.listen(gm_inbox).unwrap();

    let q2 = session.store.snapshot(&id("Q2")).await.unwrap();
    player
        .quests()
        .move_quest(&q2, QuestStatus::Active)
        .await
        .unwrap();

    let mut applied = false;
    for _ in 0..50 {
        if session.store.revision() == 1 {
            applied = true;
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert!(applied);
}
