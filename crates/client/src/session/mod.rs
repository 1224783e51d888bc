//! In-process session clients.
//!
//! Wires one client's context and dispatcher onto a [`LocalBus`], with the
//! in-memory adapters standing in for storage, views and notifications.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;

use questlog_domain::Actor;

use crate::api::{DispatchOutcome, Dispatcher};
use crate::app::{SyncContext, SyncPorts};
use crate::infrastructure::local_bus::{LocalBus, LocalSocket};
use crate::infrastructure::memory::{InMemoryQuestStore, InMemoryViewRegistry, RecordingNotifier};
use crate::infrastructure::settings::SyncSettings;
use crate::use_cases::QuestSocket;

pub struct LocalClient {
    pub context: Arc<SyncContext>,
    pub dispatcher: Arc<Dispatcher>,
    pub views: Arc<InMemoryViewRegistry>,
    pub notifier: Arc<RecordingNotifier>,
    pub socket: Arc<LocalSocket>,
}

impl LocalClient {
    /// Join `bus` as `actor`. The returned inbox is not drained yet: hand it to
    /// [`Dispatcher::listen`] or step it with [`LocalClient::pump`].
    pub fn connect(
        bus: &Arc<LocalBus>,
        store: Arc<InMemoryQuestStore>,
        actor: Actor,
        settings: SyncSettings,
    ) -> (Self, mpsc::Receiver<Value>) {
        let (socket, inbox) = bus.connect();
        let views = Arc::new(InMemoryViewRegistry::new());
        let notifier = Arc::new(RecordingNotifier::new());

        let ports = SyncPorts {
            directory: store,
            views: views.clone(),
            notifier: notifier.clone(),
            socket: socket.clone(),
        };
        let context = Arc::new(SyncContext::new(actor, settings, ports));
        let dispatcher = Dispatcher::new(context.clone());

        let client = Self {
            context,
            dispatcher,
            views,
            notifier,
            socket,
        };
        (client, inbox)
    }

    pub fn quests(&self) -> &QuestSocket {
        &self.context.quest_socket
    }

    /// Dispatch everything currently waiting in `inbox`, in arrival order.
    pub async fn pump(&self, inbox: &mut mpsc::Receiver<Value>) -> Vec<DispatchOutcome> {
        let mut outcomes = Vec::new();
        while let Ok(value) = inbox.try_recv() {
            outcomes.push(self.dispatcher.dispatch_value(value).await);
        }
        outcomes
    }
}

#[cfg(test)]
mod scenarios;
