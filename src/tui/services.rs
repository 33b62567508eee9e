use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};

use crate::config::AppConfig;
use crate::core::llm::{GoogleProvider, LLMProvider};
use crate::core::session::Session;
use crate::core::workflow;

use super::events::{AppEvent, Notification, NotificationLevel};

/// Centralized handle to the backend.
///
/// Created once at startup, then passed by reference to views. Views spawn
/// their model work through [`Services::spawn_exclusive`], which admits one
/// action at a time.
pub struct Services {
    pub config: AppConfig,
    /// `None` when no credential is configured; tools refuse to run.
    pub provider: Option<Arc<dyn LLMProvider>>,
    pub session: Arc<Mutex<Session>>,
    pub event_tx: mpsc::UnboundedSender<AppEvent>,
    /// Model used for every call, chosen in the settings view.
    pub model: String,
    /// Game title shared by the three tools.
    pub game_title: String,
    busy: Arc<AtomicBool>,
}

impl Services {
    /// Initialize services from config. A missing or unusable credential
    /// leaves `provider` empty instead of failing.
    pub fn init(config: AppConfig, event_tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        let provider = match build_provider(&config) {
            Ok(provider) => {
                log::info!("Model service configured ({})", config.model.default_model);
                Some(provider)
            }
            Err(e) => {
                log::warn!("Model service unavailable: {e}");
                None
            }
        };
        Self::new(config, provider, event_tx)
    }

    pub fn new(
        config: AppConfig,
        provider: Option<Arc<dyn LLMProvider>>,
        event_tx: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        let model = config.model.default_model.clone();
        Self {
            config,
            provider,
            session: Arc::new(Mutex::new(Session::new())),
            event_tx,
            model,
            game_title: String::new(),
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    /// Whether a model action is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Game title, or `None` when left blank.
    pub fn title(&self) -> Option<String> {
        let title = self.game_title.trim();
        (!title.is_empty()).then(|| title.to_string())
    }

    pub fn notify(&self, message: impl Into<String>, level: NotificationLevel) {
        let _ = self
            .event_tx
            .send(AppEvent::Notification(Notification::new(message, level)));
    }

    /// The provider, or a warning notification when none is configured.
    pub fn require_provider(&self) -> Option<Arc<dyn LLMProvider>> {
        if self.provider.is_none() {
            self.notify(
                "GEMINI_API_KEY is not set. The Oracle cannot be consulted.",
                NotificationLevel::Warning,
            );
        }
        self.provider.clone()
    }

    /// Run `task` in the background unless another action is in flight, then
    /// deliver the event it yields. Returns `false` if refused.
    pub fn spawn_exclusive<F>(&self, task: F) -> bool
    where
        F: Future<Output = AppEvent> + Send + 'static,
    {
        if self.busy.swap(true, Ordering::SeqCst) {
            self.notify(
                "The Oracle is still pondering the previous request",
                NotificationLevel::Info,
            );
            return false;
        }

        let guard = BusyGuard(self.busy.clone());
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let event = task.await;
            drop(guard);
            let _ = tx.send(event);
        });
        true
    }
}

/// Clears the busy flag when the task finishes or unwinds.
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

fn build_provider(config: &AppConfig) -> crate::core::llm::Result<Arc<dyn LLMProvider>> {
    let api_key = config.model.api_key().unwrap_or_default().to_string();
    let provider = GoogleProvider::with_endpoint(
        api_key,
        config.model.default_model.clone(),
        config.model.base_url.clone(),
        Duration::from_secs(config.model.timeout_secs),
    )?;
    Ok(Arc::new(provider))
}

/// The loaded tomes and, when a provider is available, their authentication
/// results.
pub async fn tome_snapshot(
    session: &mut Session,
    provider: Option<&dyn LLMProvider>,
    model: &str,
) -> AppEvent {
    let loaded = session.documents().iter().map(|d| d.key()).collect();
    let statuses = match provider {
        Some(provider) => workflow::admit_documents(session, provider, model).await,
        None => Vec::new(),
    };
    AppEvent::TomesUpdated { loaded, statuses }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn services() -> (Services, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Services::new(AppConfig::default(), None, tx), rx)
    }

    #[test]
    fn test_init_without_key_has_no_provider() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let services = Services::init(AppConfig::default(), tx);
        assert!(!services.is_configured());
        assert_eq!(services.model, "gemini-3-flash-preview");
    }

    #[test]
    fn test_title_blank_is_none() {
        let (mut services, _rx) = services();
        services.game_title = "   ".to_string();
        assert_eq!(services.title(), None);
        services.game_title = " Catan ".to_string();
        assert_eq!(services.title().as_deref(), Some("Catan"));
    }

    #[test]
    fn test_require_provider_warns() {
        let (services, mut rx) = services();
        assert!(services.require_provider().is_none());
        match rx.try_recv() {
            Ok(AppEvent::Notification(n)) => assert_eq!(n.level, NotificationLevel::Warning),
            other => panic!("expected warning notification, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_spawn_exclusive_refuses_second_action() {
        let (services, mut rx) = services();
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();

        assert!(services.spawn_exclusive(async move {
            let _ = release_rx.await;
            AppEvent::Quit
        }));
        assert!(services.is_busy());
        assert!(!services.spawn_exclusive(async { AppEvent::Tick }));

        assert!(matches!(rx.recv().await, Some(AppEvent::Notification(_))));
        let _ = release_tx.send(());
        assert!(matches!(rx.recv().await, Some(AppEvent::Quit)));
        assert!(!services.is_busy());
    }

    #[tokio::test]
    async fn test_snapshot_without_provider_lists_documents_only() {
        let mut session = Session::new();
        session.add_document(crate::ingestion::Document::new("a.pdf", vec![1, 2, 3]));
        match tome_snapshot(&mut session, None, "m").await {
            AppEvent::TomesUpdated { loaded, statuses } => {
                assert_eq!(loaded.len(), 1);
                assert!(statuses.is_empty());
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
}
