//! In-process collaboration transport
//!
//! All peers of a [`LoopbackHub`] share one service registry. Requests go
//! straight to the host's handlers and notifications fan out to every
//! attached proxy. Arguments are delivered exactly as sent.
//!
//! Switches on the hub and on services simulate a transport that refuses
//! to share, one that keeps every proxy it ever handed out, or a service
//! that went away.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use async_trait::async_trait;
use serde_json::Value;

use super::transport::{
    CollaborationApi, NotifyHandler, RequestHandler, SessionChangeListener,
    SharedService, SharedServiceProxy,
};
use super::types::{Session, SessionChangeEvent, TransportError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Registry shared by all loopback peers
pub struct LoopbackHub {
    services: Mutex<HashMap<String, Arc<LoopbackService>>>,
    sharing_enabled: AtomicBool,
    retain_proxies: AtomicBool,
}

impl LoopbackHub {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            services: Mutex::new(HashMap::new()),
            sharing_enabled: AtomicBool::new(true),
            retain_proxies: AtomicBool::new(false),
        })
    }

    /// Create a new peer attached to this hub
    pub fn peer(self: &Arc<Self>) -> Arc<LoopbackPeer> {
        Arc::new(LoopbackPeer {
            hub: self.clone(),
            listeners: Mutex::new(Vec::new()),
        })
    }

    /// When disabled, `share_service` returns `None`
    pub fn set_sharing_enabled(&self, enabled: bool) {
        self.sharing_enabled.store(enabled, Ordering::SeqCst);
    }

    /// When enabled, services hold every proxy strongly until they are
    /// dropped, so a guest's earlier proxies keep receiving notifications
    pub fn set_retain_proxies(&self, retain: bool) {
        self.retain_proxies.store(retain, Ordering::SeqCst);
    }

    /// Published service by name
    pub fn service(&self, name: &str) -> Option<Arc<LoopbackService>> {
        lock(&self.services).get(name).cloned()
    }
}

/// One participant's view of the transport
pub struct LoopbackPeer {
    hub: Arc<LoopbackHub>,
    listeners: Mutex<Vec<SessionChangeListener>>,
}

impl LoopbackPeer {
    /// Deliver a session change to every listener, one after another
    pub async fn change_session(&self, session: Session) {
        let listeners = lock(&self.listeners).clone();
        for listener in listeners {
            listener(SessionChangeEvent {
                session: session.clone(),
            })
            .await;
        }
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).len()
    }
}

#[async_trait]
impl CollaborationApi for LoopbackPeer {
    fn on_did_change_session(&self, listener: SessionChangeListener) {
        lock(&self.listeners).push(listener);
    }

    async fn share_service(&self, name: &str) -> Option<Arc<dyn SharedService>> {
        if !self.hub.sharing_enabled.load(Ordering::SeqCst) {
            return None;
        }
        let service = Arc::new(LoopbackService::new(name));
        lock(&self.hub.services).insert(name.to_string(), service.clone());
        Some(service as Arc<dyn SharedService>)
    }

    async fn get_shared_service(&self, name: &str) -> Option<Arc<dyn SharedServiceProxy>> {
        let service = self.hub.service(name)?;
        let proxy = Arc::new(LoopbackProxy {
            service: service.clone(),
            handlers: Mutex::new(HashMap::new()),
        });
        lock(&service.proxies).push(Arc::downgrade(&proxy));
        if self.hub.retain_proxies.load(Ordering::SeqCst) {
            lock(&service.retained).push(proxy.clone());
        }
        Some(proxy as Arc<dyn SharedServiceProxy>)
    }
}

/// Service published by a host peer
pub struct LoopbackService {
    name: String,
    available: AtomicBool,
    handlers: Mutex<HashMap<String, RequestHandler>>,
    proxies: Mutex<Vec<Weak<LoopbackProxy>>>,
    retained: Mutex<Vec<Arc<LoopbackProxy>>>,
}

impl LoopbackService {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            available: AtomicBool::new(true),
            handlers: Mutex::new(HashMap::new()),
            proxies: Mutex::new(Vec::new()),
            retained: Mutex::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unavailable services still exist but reject requests
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn has_request_handler(&self, name: &str) -> bool {
        lock(&self.handlers).contains_key(name)
    }

    /// Proxies still alive, whether or not their guest still uses them
    pub fn attached_proxy_count(&self) -> usize {
        self.attached_proxies().len()
    }

    fn attached_proxies(&self) -> Vec<Arc<LoopbackProxy>> {
        let mut proxies = lock(&self.proxies);
        proxies.retain(|proxy| proxy.strong_count() > 0);
        proxies.iter().filter_map(Weak::upgrade).collect()
    }
}

impl SharedService for LoopbackService {
    fn is_service_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn on_request(&self, name: &str, handler: RequestHandler) {
        lock(&self.handlers).insert(name.to_string(), handler);
    }

    fn notify(&self, name: &str, payload: Value) {
        for proxy in self.attached_proxies() {
            proxy.dispatch(name, &payload);
        }
    }
}

/// Guest-side proxy to a [`LoopbackService`]
pub struct LoopbackProxy {
    service: Arc<LoopbackService>,
    handlers: Mutex<HashMap<String, Vec<NotifyHandler>>>,
}

impl LoopbackProxy {
    fn dispatch(&self, name: &str, payload: &Value) {
        let handlers = lock(&self.handlers).get(name).cloned().unwrap_or_default();
        for handler in handlers {
            handler(payload.clone());
        }
    }
}

#[async_trait]
impl SharedServiceProxy for LoopbackProxy {
    fn is_service_available(&self) -> bool {
        self.service.is_service_available()
    }

    fn on_notify(&self, name: &str, handler: NotifyHandler) {
        lock(&self.handlers)
            .entry(name.to_string())
            .or_default()
            .push(handler);
    }

    async fn request(&self, name: &str, args: Vec<Value>) -> Result<Value, TransportError> {
        if !self.service.is_service_available() {
            return Err(TransportError::Unavailable(self.service.name.clone()));
        }
        let handler = lock(&self.service.handlers)
            .get(name)
            .cloned()
            .ok_or_else(|| TransportError::NoHandler(name.to_string()))?;
        handler(args).await
    }
}
