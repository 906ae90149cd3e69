use log::info;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tokio::sync::Mutex as SessionLock;
use uuid::Uuid;

use crate::chat::{ChatSession, TopicFilter};
use crate::config::AssistantConfig;
use crate::model::ChatCompletion;
use crate::web::errors::ApiError;

pub const MAX_SESSIONS: usize = 1000;
pub const SESSION_IDLE_TTL: Duration = Duration::from_secs(60 * 60);

pub type SharedSession = Arc<SessionLock<ChatSession>>;

struct Entry {
    session: SharedSession,
    last_used: Instant,
}

pub struct SessionStore {
    config: Arc<AssistantConfig>,
    filter: Arc<TopicFilter>,
    client: Arc<dyn ChatCompletion>,
    max_sessions: usize,
    idle_ttl: Duration,
    sessions: Mutex<HashMap<Uuid, Entry>>,
}

impl SessionStore {
    pub fn new(config: Arc<AssistantConfig>, client: Arc<dyn ChatCompletion>) -> Self {
        Self::with_limits(config, client, MAX_SESSIONS, SESSION_IDLE_TTL)
    }

    pub fn with_limits(
        config: Arc<AssistantConfig>,
        client: Arc<dyn ChatCompletion>,
        max_sessions: usize,
        idle_ttl: Duration,
    ) -> Self {
        let filter = Arc::new(TopicFilter::new(&config));
        Self {
            config,
            filter,
            client,
            max_sessions: max_sessions.max(1),
            idle_ttl,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Uuid, Entry>>, ApiError> {
        self.sessions
            .lock()
            .map_err(|e| ApiError::Internal(format!("Failed to lock sessions mutex: {}", e)))
    }

    pub fn get_or_create(&self, id: Uuid) -> Result<SharedSession, ApiError> {
        let mut sessions = self.lock()?;
        let now = Instant::now();

        if !sessions.contains_key(&id) {
            self.evict(&mut sessions, now);
        }

        let entry = sessions.entry(id).or_insert_with(|| Entry {
            session: Arc::new(SessionLock::new(ChatSession::new(
                self.config.clone(),
                self.filter.clone(),
                self.client.clone(),
            ))),
            last_used: now,
        });
        entry.last_used = now;
        Ok(entry.session.clone())
    }

    pub fn get(&self, id: Uuid) -> Result<Option<SharedSession>, ApiError> {
        Ok(self.lock()?.get(&id).map(|entry| entry.session.clone()))
    }

    pub fn remove(&self, id: Uuid) -> Result<Option<SharedSession>, ApiError> {
        Ok(self.lock()?.remove(&id).map(|entry| entry.session))
    }

    pub fn len(&self) -> Result<usize, ApiError> {
        Ok(self.lock()?.len())
    }

    // Drops idle sessions, then the least recently used ones, to make room for one more
    fn evict(&self, sessions: &mut HashMap<Uuid, Entry>, now: Instant) {
        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.last_used) < self.idle_ttl);

        while sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(id, _)| *id);
            match oldest {
                Some(id) => {
                    sessions.remove(&id);
                }
                None => break,
            }
        }

        if sessions.len() < before {
            info!("Evicted {} sessions", before - sessions.len());
        }
    }
}
