//! Session context and composition.

use std::sync::Arc;
use std::time::Duration;

use questlog_domain::{Actor, RewardId};

use crate::infrastructure::{
    cache::TtlSet,
    ports::{NotificationSink, QuestDirectory, SocketEmitter, ViewRegistry},
    settings::{SharedSettings, SyncSettings},
};
use crate::use_cases::{QuestSocket, RefreshBroadcaster};

/// How long a reward claim stays remembered for notification dedupe.
const ANNOUNCED_DROP_TTL: Duration = Duration::from_secs(10 * 60);

/// Container for the collaborator ports one client talks to.
#[derive(Clone)]
pub struct SyncPorts {
    pub directory: Arc<dyn QuestDirectory>,
    pub views: Arc<dyn ViewRegistry>,
    pub notifier: Arc<dyn NotificationSink>,
    pub socket: Arc<dyn SocketEmitter>,
}

/// Per-client synchronization state.
///
/// Built once per session (and once per test). Handlers receive it
/// explicitly; nothing here is global.
pub struct SyncContext {
    pub actor: Actor,
    pub settings: SharedSettings,
    pub ports: SyncPorts,
    pub refresh: Arc<RefreshBroadcaster>,
    pub quest_socket: Arc<QuestSocket>,
    /// Reward claims this client already announced.
    pub announced_drops: TtlSet<RewardId>,
}

impl SyncContext {
    pub fn new(actor: Actor, settings: SyncSettings, ports: SyncPorts) -> Self {
        let settings = settings.shared();
        let refresh = Arc::new(RefreshBroadcaster::new(
            actor.clone(),
            ports.directory.clone(),
            ports.views.clone(),
            ports.socket.clone(),
        ));
        let quest_socket = Arc::new(QuestSocket::new(
            actor.clone(),
            settings.clone(),
            ports.directory.clone(),
            ports.views.clone(),
            ports.notifier.clone(),
            ports.socket.clone(),
            refresh.clone(),
        ));

        Self {
            actor,
            settings,
            ports,
            refresh,
            quest_socket,
            announced_drops: TtlSet::new(ANNOUNCED_DROP_TTL),
        }
    }

    pub async fn settings(&self) -> SyncSettings {
        *self.settings.read().await
    }

    /// Replace the session settings, as a GM toggling them mid-session would.
    pub async fn update_settings(&self, settings: SyncSettings) {
        *self.settings.write().await = settings;
        tracing::info!(?settings, "Sync settings updated");
    }
}
