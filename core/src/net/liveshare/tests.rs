//! Integration tests for the session relay over the loopback transport

#![cfg(test)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use glsp_collab_shared::{
    Action, ActionMessage, COLORS, DISPOSE_CLIENT_SESSION, DisposeClientSessionParameters,
    INITIALIZE_CLIENT_SESSION, InitializeClientSessionParameters, ON_ACTION_MESSAGE,
    SEND_ACTION_MESSAGE, SERVICE_NAME, SUBCLIENT_HOST_ID, SubclientInfo,
};

use super::*;
use crate::config::CollaborationConfig;

#[derive(Default)]
struct RecordingClient {
    initialized: Mutex<Vec<InitializeClientSessionParameters>>,
    disposed: Mutex<Vec<DisposeClientSessionParameters>>,
    actions: Mutex<Vec<ActionMessage>>,
    fail: AtomicBool,
}

#[async_trait]
impl GlspClient for RecordingClient {
    async fn initialize_client_session(
        &self,
        params: InitializeClientSessionParameters,
    ) -> anyhow::Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("server refused session {}", params.client_session_id);
        }
        self.initialized.lock().unwrap().push(params);
        Ok(())
    }

    async fn dispose_client_session(
        &self,
        params: DisposeClientSessionParameters,
    ) -> anyhow::Result<()> {
        self.disposed.lock().unwrap().push(params);
        Ok(())
    }

    fn send_action_message(&self, message: ActionMessage) {
        self.actions.lock().unwrap().push(message);
    }
}

#[derive(Default)]
struct TestServer {
    client: Arc<RecordingClient>,
    sent: Mutex<Vec<ActionMessage>>,
}

#[async_trait]
impl GlspServer for TestServer {
    async fn glsp_client(&self) -> Arc<dyn GlspClient> {
        self.client.clone()
    }

    fn fire_server_send(&self, message: ActionMessage) {
        self.sent.lock().unwrap().push(message);
    }
}

struct Participant {
    peer: Arc<LoopbackPeer>,
    server: Arc<TestServer>,
    relay: Arc<SessionRelay>,
}

impl Participant {
    fn join(hub: &Arc<LoopbackHub>) -> Self {
        let peer = hub.peer();
        let server = Arc::new(TestServer::default());
        let relay = SessionRelay::new(CollaborationConfig::default());
        relay
            .initialize(Some(peer.clone() as Arc<dyn CollaborationApi>), server.clone())
            .unwrap();
        Self {
            peer,
            server,
            relay,
        }
    }

    fn received(&self) -> Vec<ActionMessage> {
        self.server.sent.lock().unwrap().clone()
    }
}

fn init_params(id: &str) -> InitializeClientSessionParameters {
    serde_json::from_value(json!({ "clientSessionId": id, "diagramType": "workflow-diagram" }))
        .unwrap()
}

fn dispose_params(id: &str) -> DisposeClientSessionParameters {
    serde_json::from_value(json!({ "clientSessionId": id })).unwrap()
}

fn message_for(subclient: &str) -> ActionMessage {
    ActionMessage::new("client-1", Action::new("updateModel").for_subclient(subclient))
}

#[tokio::test]
async fn test_no_transport_disables_collaboration() {
    let relay = SessionRelay::new(CollaborationConfig::default());
    let err = relay
        .initialize(None, Arc::new(TestServer::default()))
        .unwrap_err();
    assert!(matches!(err, RelayError::NoTransport));

    assert!(!relay.is_in_collaborate_mode());
    assert!(!relay.is_host());
    assert!(!relay.is_guest());
    assert_eq!(relay.subclient_id(), "");
    assert_eq!(relay.subclient_info(), SubclientInfo::default());

    let err = relay
        .initialize_client_session(init_params("s1"))
        .await
        .unwrap_err();
    assert!(matches!(err, RelayError::NoTransport));
    assert!(matches!(
        relay.handle_action_message(message_for("1")),
        Err(RelayError::NoTransport)
    ));
}

#[tokio::test]
async fn test_initialize_twice_is_rejected() {
    let hub = LoopbackHub::new();
    let host = Participant::join(&hub);
    let err = host
        .relay
        .initialize(
            Some(host.peer.clone() as Arc<dyn CollaborationApi>),
            host.server.clone(),
        )
        .unwrap_err();
    assert!(matches!(err, RelayError::AlreadyInitialized));
    assert_eq!(host.peer.listener_count(), 1);
}

#[tokio::test]
async fn test_defaults_before_first_session_change() {
    let hub = LoopbackHub::new();
    let guest = Participant::join(&hub);

    assert!(!guest.relay.is_in_collaborate_mode());
    assert_eq!(guest.relay.subclient_id(), "");
    assert!(matches!(
        guest.relay.send_action_message(message_for("H")).await,
        Err(RelayError::NoSession)
    ));
}

#[tokio::test]
async fn test_host_transition() {
    let hub = LoopbackHub::new();
    let host = Participant::join(&hub);

    host.peer.change_session(Session::host(7)).await;

    assert!(host.relay.is_host());
    assert!(!host.relay.is_guest());
    assert!(host.relay.is_in_collaborate_mode());
    assert_eq!(host.relay.subclient_id(), SUBCLIENT_HOST_ID);
    assert_eq!(host.relay.subclient_info().color, COLORS[0]);

    let service = hub.service(SERVICE_NAME).expect("host should publish the service");
    assert!(service.has_request_handler(INITIALIZE_CLIENT_SESSION));
    assert!(service.has_request_handler(DISPOSE_CLIENT_SESSION));
    assert!(service.has_request_handler(SEND_ACTION_MESSAGE));
}

#[tokio::test]
async fn test_guest_transition_peer_two() {
    let hub = LoopbackHub::new();
    let host = Participant::join(&hub);
    let guest = Participant::join(&hub);

    host.peer.change_session(Session::host(0)).await;
    guest.peer.change_session(Session::guest(2)).await;

    assert!(guest.relay.is_guest());
    assert!(!guest.relay.is_host());
    assert!(guest.relay.is_in_collaborate_mode());
    assert_eq!(guest.relay.subclient_id(), "2");
    assert_eq!(guest.relay.subclient_info().color, COLORS[1]);
}

#[tokio::test]
async fn test_guest_identity_uses_user_name() {
    let hub = LoopbackHub::new();
    let guest = Participant::join(&hub);

    guest
        .peer
        .change_session(Session::guest(3).with_user(SessionUser {
            display_name: "Grace".into(),
            email_address: Some("grace@example.org".into()),
        }))
        .await;

    let info = guest.relay.subclient_info();
    assert_eq!(info.subclient_id, "3");
    assert_eq!(info.name, "grace@example.org");
    assert_eq!(info.color, COLORS[2]);
}

#[tokio::test]
async fn test_guest_requests_reach_host_client() {
    let hub = LoopbackHub::new();
    let host = Participant::join(&hub);
    let guest = Participant::join(&hub);
    host.peer.change_session(Session::host(0)).await;
    guest.peer.change_session(Session::guest(1)).await;

    guest
        .relay
        .initialize_client_session(init_params("s1"))
        .await
        .unwrap();
    guest
        .relay
        .send_action_message(message_for(SUBCLIENT_HOST_ID))
        .await
        .unwrap();
    guest
        .relay
        .dispose_client_session(dispose_params("s1"))
        .await
        .unwrap();

    let client = &host.server.client;
    assert_eq!(*client.initialized.lock().unwrap(), vec![init_params("s1")]);
    assert_eq!(*client.disposed.lock().unwrap(), vec![dispose_params("s1")]);
    assert_eq!(
        *client.actions.lock().unwrap(),
        vec![message_for(SUBCLIENT_HOST_ID)]
    );
}

#[tokio::test]
async fn test_host_client_failure_reaches_guest() {
    let hub = LoopbackHub::new();
    let host = Participant::join(&hub);
    let guest = Participant::join(&hub);
    host.peer.change_session(Session::host(0)).await;
    guest.peer.change_session(Session::guest(1)).await;
    host.server.client.fail.store(true, Ordering::SeqCst);

    let err = guest
        .relay
        .initialize_client_session(init_params("s1"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RelayError::Transport(TransportError::Handler(ref reason)) if reason.contains("s1")
    ));
}

#[tokio::test]
async fn test_malformed_request_is_rejected_by_host() {
    let hub = LoopbackHub::new();
    let host = Participant::join(&hub);
    host.peer.change_session(Session::host(0)).await;

    let proxy = hub
        .peer()
        .get_shared_service(SERVICE_NAME)
        .await
        .expect("service published");
    let err = proxy
        .request(INITIALIZE_CLIENT_SESSION, vec![json!(42)])
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Decode(_)));

    let err = proxy.request(SEND_ACTION_MESSAGE, Vec::new()).await.unwrap_err();
    assert!(matches!(err, TransportError::Decode(_)));
    assert!(host.server.client.actions.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_broadcast_is_filtered_per_guest() {
    let hub = LoopbackHub::new();
    let host = Participant::join(&hub);
    let first = Participant::join(&hub);
    let second = Participant::join(&hub);
    host.peer.change_session(Session::host(0)).await;
    first.peer.change_session(Session::guest(1)).await;
    second.peer.change_session(Session::guest(2)).await;

    host.relay.handle_action_message(message_for("2")).unwrap();

    assert!(first.received().is_empty());
    assert_eq!(second.received(), vec![message_for("2")]);
    assert!(host.received().is_empty());
}

#[tokio::test]
async fn test_unaddressed_broadcast_is_dropped() {
    let hub = LoopbackHub::new();
    let host = Participant::join(&hub);
    let guest = Participant::join(&hub);
    host.peer.change_session(Session::host(0)).await;
    guest.peer.change_session(Session::guest(1)).await;

    host.relay
        .handle_action_message(ActionMessage::new("c", Action::new("updateModel")))
        .unwrap();
    hub.service(SERVICE_NAME)
        .unwrap()
        .notify(ON_ACTION_MESSAGE, json!({ "garbage": true }));

    assert!(guest.received().is_empty());
}

#[tokio::test]
async fn test_wrong_role_operations() {
    let hub = LoopbackHub::new();
    let host = Participant::join(&hub);
    let guest = Participant::join(&hub);
    host.peer.change_session(Session::host(0)).await;
    guest.peer.change_session(Session::guest(1)).await;

    assert!(matches!(
        host.relay.initialize_client_session(init_params("s")).await,
        Err(RelayError::NotGuest)
    ));
    assert!(matches!(
        host.relay.dispose_client_session(dispose_params("s")).await,
        Err(RelayError::NotGuest)
    ));
    assert!(matches!(
        host.relay.send_action_message(message_for("H")).await,
        Err(RelayError::NotGuest)
    ));
    assert!(matches!(
        guest.relay.handle_action_message(message_for("1")),
        Err(RelayError::NotHost)
    ));
}

#[tokio::test]
async fn test_sharing_refused() {
    let hub = LoopbackHub::new();
    hub.set_sharing_enabled(false);
    let host = Participant::join(&hub);

    let result = host
        .relay
        .handle_session_change(SessionChangeEvent {
            session: Session::host(0),
        })
        .await;
    assert!(matches!(result, Err(RelayError::ServiceUnavailable)));

    // Role and identity still reflect the session
    assert!(host.relay.is_host());
    assert_eq!(host.relay.subclient_id(), SUBCLIENT_HOST_ID);
    assert!(!host.relay.is_in_collaborate_mode());
    assert!(matches!(
        host.relay.handle_action_message(message_for("1")),
        Err(RelayError::ServiceUnavailable)
    ));
}

#[tokio::test]
async fn test_guest_without_host_service() {
    let hub = LoopbackHub::new();
    let guest = Participant::join(&hub);

    let result = guest
        .relay
        .handle_session_change(SessionChangeEvent {
            session: Session::guest(1),
        })
        .await;
    assert!(matches!(result, Err(RelayError::ServiceUnavailable)));
    assert!(guest.relay.is_guest());
    assert!(!guest.relay.is_in_collaborate_mode());
    assert!(matches!(
        guest.relay.initialize_client_session(init_params("s")).await,
        Err(RelayError::ServiceUnavailable)
    ));
}

#[tokio::test]
async fn test_unavailable_service() {
    let hub = LoopbackHub::new();
    let host = Participant::join(&hub);
    let guest = Participant::join(&hub);
    host.peer.change_session(Session::host(0)).await;
    guest.peer.change_session(Session::guest(1)).await;

    hub.service(SERVICE_NAME).unwrap().set_available(false);

    assert!(!host.relay.is_in_collaborate_mode());
    assert!(!guest.relay.is_in_collaborate_mode());
    let err = guest
        .relay
        .initialize_client_session(init_params("s"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RelayError::Transport(TransportError::Unavailable(ref name)) if name == SERVICE_NAME
    ));
}

#[tokio::test]
async fn test_session_end_drops_relay() {
    let hub = LoopbackHub::new();
    let host = Participant::join(&hub);
    host.peer.change_session(Session::host(0)).await;
    assert!(host.relay.is_in_collaborate_mode());

    host.peer.change_session(Session::ended()).await;

    assert_eq!(host.relay.snapshot().role(), Role::None);
    assert!(!host.relay.is_host());
    assert!(!host.relay.is_in_collaborate_mode());
    assert!(matches!(
        host.relay.handle_action_message(message_for("1")),
        Err(RelayError::NoSession)
    ));
}

#[tokio::test]
async fn test_filter_follows_current_identity() {
    let hub = LoopbackHub::new();
    let host = Participant::join(&hub);
    let guest = Participant::join(&hub);
    host.peer.change_session(Session::host(0)).await;
    guest.peer.change_session(Session::guest(1)).await;
    guest.peer.change_session(Session::guest(3)).await;

    host.relay.handle_action_message(message_for("1")).unwrap();
    assert!(guest.received().is_empty());

    host.relay.handle_action_message(message_for("3")).unwrap();
    assert_eq!(guest.received(), vec![message_for("3")]);
}

#[tokio::test]
async fn test_superseded_proxy_stays_quiet() {
    let hub = LoopbackHub::new();
    hub.set_retain_proxies(true);
    let host = Participant::join(&hub);
    let guest = Participant::join(&hub);
    host.peer.change_session(Session::host(0)).await;
    guest.peer.change_session(Session::guest(1)).await;
    guest.peer.change_session(Session::guest(3)).await;

    // Both proxies still receive every broadcast
    let service = hub.service(SERVICE_NAME).unwrap();
    assert_eq!(service.attached_proxy_count(), 2);

    host.relay.handle_action_message(message_for("3")).unwrap();
    assert_eq!(guest.received(), vec![message_for("3")]);

    host.relay.handle_action_message(message_for("1")).unwrap();
    assert_eq!(guest.received(), vec![message_for("3")]);
}

#[tokio::test]
async fn test_dropped_guest_is_freed() {
    for retain in [false, true] {
        let hub = LoopbackHub::new();
        hub.set_retain_proxies(retain);
        let host = Participant::join(&hub);
        let guest = Participant::join(&hub);
        host.peer.change_session(Session::host(0)).await;
        guest.peer.change_session(Session::guest(1)).await;

        let relay = Arc::downgrade(&guest.relay);
        let server = Arc::downgrade(&guest.server);
        drop(guest);

        assert!(relay.upgrade().is_none(), "relay leaked (retain={retain})");
        assert!(server.upgrade().is_none(), "server leaked (retain={retain})");

        let expected_proxies = if retain { 1 } else { 0 };
        let service = hub.service(SERVICE_NAME).unwrap();
        assert_eq!(service.attached_proxy_count(), expected_proxies);

        // A retained proxy outliving its guest delivers nowhere
        host.relay.handle_action_message(message_for("1")).unwrap();
    }
}

#[tokio::test]
async fn test_snapshot_watch_sees_transition() {
    let hub = LoopbackHub::new();
    let host = Participant::join(&hub);
    let mut watcher = host.relay.subscribe();

    host.peer.change_session(Session::host(0)).await;

    assert!(watcher.has_changed().unwrap());
    let snapshot = watcher.borrow_and_update().clone();
    assert!(snapshot.is_host());
    assert!(snapshot.is_in_collaborate_mode());
    assert_eq!(snapshot.session(), Some(&Session::host(0)));
}
