use std::sync::{mpsc, Arc};
use std::time::Duration;

use async_trait::async_trait;
use kenko_auth::{
    FileStorage, IdentityVerifier, MemoryStorage, Profile, Role, Session, SessionState,
    SessionStorage, SessionStore, StorageError, StoredEntries,
};
use parking_lot::Mutex;
use tempfile::TempDir;
use tokio::sync::Notify;

type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

fn doctor_profile() -> Profile {
    Profile {
        id: 42,
        email: "doc@clinic.test".into(),
        first_name: "Elena".into(),
        last_name: "Soto".into(),
        role: Role::Doctor,
        org_id: 9,
    }
}

/// Accepts every session and echoes back the given profile.
struct AcceptingVerifier(Profile);

#[async_trait]
impl IdentityVerifier for AcceptingVerifier {
    async fn verify(&self, _session: &Session) -> anyhow::Result<Profile> {
        Ok(self.0.clone())
    }
}

struct RejectingVerifier;

#[async_trait]
impl IdentityVerifier for RejectingVerifier {
    async fn verify(&self, _session: &Session) -> anyhow::Result<Profile> {
        anyhow::bail!("connection refused")
    }
}

/// Holds verification until released, so tests can observe the pending state.
struct GatedVerifier {
    gate: Arc<Notify>,
    profile: Profile,
}

#[async_trait]
impl IdentityVerifier for GatedVerifier {
    async fn verify(&self, _session: &Session) -> anyhow::Result<Profile> {
        self.gate.notified().await;
        Ok(self.profile.clone())
    }
}

/// Signals the first read and then stalls before returning it.
struct StallingStorage {
    inner: MemoryStorage,
    reading: Mutex<Option<mpsc::Sender<()>>>,
}

impl SessionStorage for StallingStorage {
    fn read(&self) -> Result<StoredEntries, StorageError> {
        if let Some(reading) = self.reading.lock().take() {
            let _ = reading.send(());
            std::thread::sleep(Duration::from_millis(150));
        }
        self.inner.read()
    }

    fn write(&self, token: &str, user: &str) -> Result<(), StorageError> {
        self.inner.write(token, user)
    }

    fn erase(&self) -> Result<(), StorageError> {
        self.inner.erase()
    }
}

#[tokio::test]
async fn save_then_restore_yields_identical_session() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("session.json");

    let first = SessionStore::new(Arc::new(FileStorage::new(&path)));
    first.save("t1", doctor_profile())?;

    let second = SessionStore::new(Arc::new(FileStorage::new(&path)));
    let revalidation = second
        .restore(Arc::new(AcceptingVerifier(doctor_profile())))
        .expect("persisted session should trigger revalidation");
    assert!(revalidation.finished().await);

    let restored = second.session().expect("session restored");
    assert_eq!(restored.token, "t1");
    assert_eq!(restored.profile, doctor_profile());
    assert!(matches!(second.state(), SessionState::Verified(_)));
    Ok(())
}

#[tokio::test]
async fn restore_is_optimistic_while_revalidation_runs() -> TestResult {
    let storage = Arc::new(MemoryStorage::new());
    SessionStore::new(storage.clone()).save("t1", doctor_profile())?;

    let gate = Arc::new(Notify::new());
    let store = SessionStore::new(storage);
    let revalidation = store
        .restore(Arc::new(GatedVerifier {
            gate: gate.clone(),
            profile: doctor_profile(),
        }))
        .expect("revalidation started");

    assert!(matches!(store.state(), SessionState::Pending(_)));
    assert_eq!(store.token().as_deref(), Some("t1"));

    gate.notify_one();
    assert!(revalidation.finished().await);
    assert!(matches!(store.state(), SessionState::Verified(_)));
    Ok(())
}

#[tokio::test]
async fn failed_revalidation_clears_session_and_storage() -> TestResult {
    let storage = Arc::new(MemoryStorage::new());
    SessionStore::new(storage.clone()).save("stale", doctor_profile())?;

    let store = SessionStore::new(storage.clone());
    let revalidation = store
        .restore(Arc::new(RejectingVerifier))
        .expect("revalidation started");

    assert!(!revalidation.finished().await);
    assert_eq!(store.state(), SessionState::Anonymous);
    assert!(storage.snapshot().is_empty());
    Ok(())
}

#[tokio::test]
async fn revalidation_refreshes_profile_from_backend() -> TestResult {
    let storage = Arc::new(MemoryStorage::new());
    SessionStore::new(storage.clone()).save("t1", doctor_profile())?;

    let mut updated = doctor_profile();
    updated.last_name = "Soto Vega".into();

    let store = SessionStore::new(storage.clone());
    store
        .restore(Arc::new(AcceptingVerifier(updated.clone())))
        .expect("revalidation started")
        .finished()
        .await;

    assert_eq!(store.session().map(|s| s.profile), Some(updated.clone()));
    let persisted: Profile =
        serde_json::from_str(storage.snapshot().user.as_deref().unwrap_or_default())?;
    assert_eq!(persisted, updated);
    Ok(())
}

#[tokio::test]
async fn revalidation_result_is_dropped_after_logout() -> TestResult {
    let storage = Arc::new(MemoryStorage::new());
    SessionStore::new(storage.clone()).save("t1", doctor_profile())?;

    let gate = Arc::new(Notify::new());
    let store = SessionStore::new(storage.clone());
    let revalidation = store
        .restore(Arc::new(GatedVerifier {
            gate: gate.clone(),
            profile: doctor_profile(),
        }))
        .expect("revalidation started");

    store.clear()?;
    gate.notify_one();

    assert!(!revalidation.finished().await);
    assert_eq!(store.state(), SessionState::Anonymous);
    assert!(storage.snapshot().is_empty());
    Ok(())
}

#[tokio::test]
async fn restore_without_persisted_session_is_anonymous() {
    let store = SessionStore::in_memory();
    assert!(store.restore(Arc::new(RejectingVerifier)).is_none());
    assert_eq!(store.state(), SessionState::Anonymous);
}

#[tokio::test]
async fn restore_discards_token_without_profile() {
    let storage = Arc::new(MemoryStorage::with_entries(StoredEntries {
        token: Some("orphan".into()),
        user: None,
    }));
    let store = SessionStore::new(storage.clone());

    assert!(store
        .restore(Arc::new(AcceptingVerifier(doctor_profile())))
        .is_none());
    assert_eq!(store.state(), SessionState::Anonymous);
    assert!(storage.snapshot().is_empty());
}

#[tokio::test]
async fn restore_discards_profile_with_unknown_role() {
    let storage = Arc::new(MemoryStorage::with_entries(StoredEntries {
        token: Some("t".into()),
        user: Some(
            r#"{"id":1,"email":"a@b.c","firstName":"A","lastName":"B","role":"JANITOR","orgId":1}"#
                .into(),
        ),
    }));
    let store = SessionStore::new(storage.clone());

    assert!(store
        .restore(Arc::new(AcceptingVerifier(doctor_profile())))
        .is_none());
    assert_eq!(store.state(), SessionState::Anonymous);
    assert!(storage.snapshot().is_empty());
}

#[tokio::test]
async fn restore_discards_corrupt_file() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("session.json");
    std::fs::write(&path, "garbage")?;

    let store = SessionStore::new(Arc::new(FileStorage::new(&path)));
    assert!(store.restore(Arc::new(RejectingVerifier)).is_none());
    assert_eq!(store.state(), SessionState::Anonymous);
    assert!(!path.exists());
    Ok(())
}

#[tokio::test]
async fn logout_clears_both_persisted_keys() -> TestResult {
    let dir = TempDir::new()?;
    let storage = Arc::new(FileStorage::new(dir.path().join("session.json")));
    let store = SessionStore::new(storage.clone());

    store.save("t1", doctor_profile())?;
    store.clear()?;

    let entries = storage.read()?;
    assert!(entries.token.is_none());
    assert!(entries.user.is_none());
    Ok(())
}

#[tokio::test]
async fn subscribers_observe_transitions() -> TestResult {
    let store = SessionStore::in_memory();
    let mut receiver = store.subscribe();

    let waiter = tokio::spawn(async move {
        receiver
            .wait_for(|state| state.is_authenticated())
            .await
            .map(|state| state.role())
            .ok()
            .flatten()
    });

    store.save("t1", doctor_profile())?;
    let role = tokio::time::timeout(Duration::from_secs(1), waiter).await??;
    assert_eq!(role, Some(Role::Doctor));
    Ok(())
}

#[tokio::test]
async fn settled_waits_for_restore() {
    let store = SessionStore::in_memory();
    let waiting = store.clone();
    let handle = tokio::spawn(async move { waiting.settled().await });

    tokio::task::yield_now().await;
    store.restore(Arc::new(RejectingVerifier));

    let state = tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("settled resolves")
        .expect("task completes");
    assert_eq!(state, SessionState::Anonymous);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn login_during_restore_survives() -> TestResult {
    let inner = MemoryStorage::new();
    inner.write("stale", &serde_json::to_string(&doctor_profile())?)?;
    let (reading, started) = mpsc::channel();
    let store = SessionStore::new(Arc::new(StallingStorage {
        inner,
        reading: Mutex::new(Some(reading)),
    }));

    let restoring = {
        let store = store.clone();
        tokio::task::spawn_blocking(move || store.restore(Arc::new(RejectingVerifier)))
    };
    tokio::task::spawn_blocking(move || started.recv()).await??;

    let mut fresh = doctor_profile();
    fresh.id = 43;
    store.save("fresh", fresh.clone())?;

    if let Some(revalidation) = restoring.await? {
        revalidation.finished().await;
    }

    let session = store.session().expect("fresh login kept");
    assert_eq!(session.token, "fresh");
    assert_eq!(session.profile, fresh);
    Ok(())
}
