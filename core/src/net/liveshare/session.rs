//! Session relay: binds a diagram server to the collaboration transport
//!
//! Every session change derives a fresh identity and selects a
//! [`HostRelay`] or [`GuestRelay`]. The result is published as one
//! [`RelaySnapshot`]. Transitions are serialized; readers get whichever
//! snapshot is current and never block a transition.

use std::sync::{Arc, OnceLock, Weak};

use futures_util::FutureExt;
use tokio::sync::{Mutex, watch};

use glsp_collab_shared::{
    ActionMessage, DisposeClientSessionParameters, InitializeClientSessionParameters,
    SubclientInfo,
};

use super::guest::{GuestRelay, deliver_if_addressed};
use super::host::HostRelay;
use super::identity::derive_subclient_info;
use super::relay::CollaborationRelay;
use super::server::GlspServer;
use super::snapshot::RelaySnapshot;
use super::transport::CollaborationApi;
use super::types::{RelayError, Role, SessionChangeEvent};
use crate::config::CollaborationConfig;

pub struct SessionRelay {
    /// Handed to transport callbacks instead of a strong reference
    me: Weak<SessionRelay>,
    config: CollaborationConfig,
    api: OnceLock<Arc<dyn CollaborationApi>>,
    server: OnceLock<Arc<dyn GlspServer>>,
    snapshot: watch::Sender<Arc<RelaySnapshot>>,
    /// Held for the whole of a transition
    transition: Mutex<()>,
}

impl SessionRelay {
    pub fn new(config: CollaborationConfig) -> Arc<Self> {
        let (snapshot, _) = watch::channel(Arc::new(RelaySnapshot::default()));
        Arc::new_cyclic(|me| Self {
            me: me.clone(),
            config,
            api: OnceLock::new(),
            server: OnceLock::new(),
            snapshot,
            transition: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &CollaborationConfig {
        &self.config
    }

    /// Bind to the transport and subscribe to session changes.
    ///
    /// With no transport, collaboration stays disabled: the accessors keep
    /// returning defaults and this returns [`RelayError::NoTransport`].
    pub fn initialize(
        &self,
        api: Option<Arc<dyn CollaborationApi>>,
        server: Arc<dyn GlspServer>,
    ) -> Result<(), RelayError> {
        let Some(api) = api else {
            tracing::info!("Collaboration transport not available, collaboration disabled");
            return Err(RelayError::NoTransport);
        };
        self.api
            .set(api.clone())
            .map_err(|_| RelayError::AlreadyInitialized)?;
        let _ = self.server.set(server);

        let relay = self.me.clone();
        api.on_did_change_session(Arc::new(move |event: SessionChangeEvent| {
            let relay = relay.clone();
            async move {
                let Some(relay) = relay.upgrade() else {
                    return;
                };
                if let Err(e) = relay.handle_session_change(event).await {
                    tracing::warn!("Collaboration session change not fully applied: {}", e);
                }
            }
            .boxed()
        }));

        tracing::debug!("Subscribed to collaboration session changes");
        Ok(())
    }

    /// Apply one session change. Returns the new role.
    ///
    /// Role and identity are published even if the shared service cannot be
    /// published or found. In that case the snapshot carries no relay and this
    /// returns [`RelayError::ServiceUnavailable`].
    pub async fn handle_session_change(&self, event: SessionChangeEvent) -> Result<Role, RelayError> {
        let (Some(api), Some(server)) = (self.api.get(), self.server.get()) else {
            return Err(RelayError::NoTransport);
        };
        let _transition = self.transition.lock().await;

        let epoch = self.snapshot().epoch() + 1;
        let session = event.session;
        let role = session.role;
        let identity = derive_subclient_info(&session, &self.config);
        tracing::info!(
            "Collaboration session changed: role={:?} peer={} subclient={}",
            role,
            session.peer_number,
            identity.subclient_id
        );

        self.publish(RelaySnapshot::new(epoch, session.clone(), identity.clone(), None));

        let relay: Arc<dyn CollaborationRelay> = match role {
            Role::Host => Arc::new(
                HostRelay::publish(api.as_ref(), &self.config.service_name, server.clone()).await?,
            ),
            Role::Guest => {
                let relay = self.me.clone();
                Arc::new(
                    GuestRelay::attach(api.as_ref(), &self.config.service_name, move |message| {
                        if let Some(relay) = relay.upgrade() {
                            relay.deliver_to_guest(epoch, message);
                        }
                    })
                    .await?,
                )
            }
            Role::None => return Ok(role),
        };

        self.publish(RelaySnapshot::new(epoch, session, identity, Some(relay)));
        Ok(role)
    }

    /// Forward a host broadcast received by the proxy attached at `epoch`.
    ///
    /// Proxies from earlier transitions may stay registered with the
    /// transport; only the one matching the current snapshot delivers.
    fn deliver_to_guest(&self, epoch: u64, message: ActionMessage) {
        let current = self.snapshot();
        if current.epoch() != epoch || current.role() != Role::Guest {
            tracing::trace!("Ignoring broadcast for superseded session {}", epoch);
            return;
        }
        let Some(server) = self.server.get() else {
            return;
        };
        if let Err(e) = deliver_if_addressed(current.subclient_id(), message, server.as_ref()) {
            tracing::trace!("Not forwarding: {}", e);
        }
    }

    fn publish(&self, snapshot: RelaySnapshot) {
        self.snapshot.send_replace(Arc::new(snapshot));
    }

    /// Current state
    pub fn snapshot(&self) -> Arc<RelaySnapshot> {
        self.snapshot.borrow().clone()
    }

    /// Watch state transitions
    pub fn subscribe(&self) -> watch::Receiver<Arc<RelaySnapshot>> {
        self.snapshot.subscribe()
    }

    pub fn is_in_collaborate_mode(&self) -> bool {
        self.snapshot().is_in_collaborate_mode()
    }

    pub fn is_host(&self) -> bool {
        self.snapshot().is_host()
    }

    pub fn is_guest(&self) -> bool {
        self.snapshot().is_guest()
    }

    pub fn subclient_id(&self) -> String {
        self.snapshot().subclient_id().to_string()
    }

    pub fn subclient_info(&self) -> SubclientInfo {
        self.snapshot().subclient_info()
    }

    fn active_relay(&self) -> Result<Arc<dyn CollaborationRelay>, RelayError> {
        if self.api.get().is_none() {
            return Err(RelayError::NoTransport);
        }
        let snapshot = self.snapshot();
        match (snapshot.relay(), snapshot.role()) {
            (Some(relay), _) => Ok(relay.clone()),
            (None, Role::None) => Err(RelayError::NoSession),
            (None, _) => Err(RelayError::ServiceUnavailable),
        }
    }

    /// Guest: open a client session on the host's server
    pub async fn initialize_client_session(
        &self,
        params: InitializeClientSessionParameters,
    ) -> Result<(), RelayError> {
        let relay = self.active_relay()?;
        relay.initialize_client_session(params).await
    }

    /// Guest: dispose a client session on the host's server
    pub async fn dispose_client_session(
        &self,
        params: DisposeClientSessionParameters,
    ) -> Result<(), RelayError> {
        let relay = self.active_relay()?;
        relay.dispose_client_session(params).await
    }

    /// Guest: forward an action message to the host's protocol client
    pub async fn send_action_message(&self, message: ActionMessage) -> Result<(), RelayError> {
        let relay = self.active_relay()?;
        relay.send_action_message(message).await
    }

    /// Host: broadcast an action message to all guests
    pub fn handle_action_message(&self, message: ActionMessage) -> Result<(), RelayError> {
        self.active_relay()?.handle_action_message(message)
    }
}
