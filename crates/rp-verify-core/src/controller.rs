use crate::step::WizardStep;
use rp_api_types::{VerificationRecord, ID_PHOTO_SLOT, SELFIE_PHOTO_SLOT};
use rp_storage::{PhotoCache, ProgressStore};
use tracing::{debug, warn};

pub const STEP_KEY: &str = "rp_verify_step";
pub const EMAIL_KEY: &str = "rp_contact_email";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhotoSlot {
    Id,
    Selfie,
}

impl PhotoSlot {
    pub fn cache_id(self) -> &'static str {
        match self {
            PhotoSlot::Id => ID_PHOTO_SLOT,
            PhotoSlot::Selfie => SELFIE_PHOTO_SLOT,
        }
    }
}

/// Cross-step wizard state. The controller is its only writer; the step
/// UIs read it through `StepController::state`.
#[derive(Clone, Debug, Default)]
pub struct WizardState {
    pub step: WizardStep,
    pub id_photo: Option<String>,
    pub selfie_photo: Option<String>,
    pub outcome: Option<bool>,
    pub records: Vec<VerificationRecord>,
}

impl WizardState {
    pub fn photo(&self, slot: PhotoSlot) -> Option<&str> {
        match slot {
            PhotoSlot::Id => self.id_photo.as_deref(),
            PhotoSlot::Selfie => self.selfie_photo.as_deref(),
        }
    }
}

pub struct StepController<P, C> {
    progress: P,
    photos: C,
    state: WizardState,
    success_effects_fired: bool,
}

impl<P, C> StepController<P, C>
where
    P: ProgressStore,
    C: PhotoCache,
{
    pub fn new(progress: P, photos: C) -> Self {
        Self {
            progress,
            photos,
            state: WizardState::default(),
            success_effects_fired: false,
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn step(&self) -> WizardStep {
        self.state.step
    }

    pub fn progress(&self) -> &P {
        &self.progress
    }

    /// Restore persisted progress on mount: the step index from the
    /// progress store and both photos from the cache. Either store
    /// failing reads as "nothing persisted".
    pub async fn hydrate(&mut self) {
        let raw = match self.progress.get(STEP_KEY) {
            Ok(value) => value,
            Err(err) => {
                debug!("step index unavailable, starting fresh: {err}");
                None
            }
        };
        self.state.step = WizardStep::from_persisted(raw.as_deref());
        self.state.id_photo = self.cached_photo(PhotoSlot::Id).await;
        self.state.selfie_photo = self.cached_photo(PhotoSlot::Selfie).await;
    }

    async fn cached_photo(&self, slot: PhotoSlot) -> Option<String> {
        match self.photos.get(slot.cache_id()).await {
            Ok(data) => data,
            Err(err) => {
                debug!("photo cache miss for {}: {err}", slot.cache_id());
                None
            }
        }
    }

    pub fn next(&mut self) {
        self.transition(self.state.step.advance());
    }

    pub fn back(&mut self) {
        self.transition(self.state.step.retreat());
    }

    fn transition(&mut self, target: WizardStep) {
        if target == self.state.step {
            return;
        }
        self.state.step = target;
        self.persist_step();
    }

    fn persist_step(&self) {
        let index = self.state.step.index().to_string();
        if let Err(err) = self.progress.set(STEP_KEY, &index) {
            warn!("failed to persist step index: {err}");
        }
    }

    /// Record a captured photo. The in-memory copy is written first and
    /// the session proceeds even if the cache write fails; only
    /// resume-after-reload is affected then.
    pub async fn update_photo(&mut self, slot: PhotoSlot, payload: &str) {
        match slot {
            PhotoSlot::Id => self.state.id_photo = Some(payload.to_owned()),
            PhotoSlot::Selfie => self.state.selfie_photo = Some(payload.to_owned()),
        }
        if let Err(err) = self.photos.put(slot.cache_id(), payload).await {
            warn!("failed to cache {}: {err}", slot.cache_id());
        }
    }

    /// Terminal transition out of the submit step. The only way to reach
    /// `Result`. On success every persisted trace is erased; a failed
    /// verification leaves storage untouched so a reload still resumes.
    pub async fn complete(&mut self, success: bool, records: Vec<VerificationRecord>) {
        self.state.step = WizardStep::Result;
        self.state.outcome = Some(success);
        self.state.records = records;
        if success {
            self.clear_persisted().await;
        } else {
            self.persist_step();
        }
    }

    /// Reset to the first step, dropping photos, outcome, and every
    /// persisted trace. Each clear is independent; one failing does not
    /// stop the others.
    pub async fn restart(&mut self) {
        self.state = WizardState::default();
        self.success_effects_fired = false;
        self.clear_persisted().await;
    }

    async fn clear_persisted(&self) {
        if let Err(err) = self.progress.remove(STEP_KEY) {
            warn!("failed to clear step index: {err}");
        }
        if let Err(err) = self.progress.remove(EMAIL_KEY) {
            warn!("failed to clear contact email: {err}");
        }
        if let Err(err) = self.photos.clear().await {
            warn!("failed to clear photo cache: {err}");
        }
    }

    /// Gate for the post-success side effects (report email, token
    /// consumption). Returns `true` exactly once per successful
    /// completion; the guard is in-memory only, since success wipes the
    /// wizard and a reload cannot re-enter the result step.
    pub fn begin_success_effects(&mut self) -> bool {
        if self.state.outcome != Some(true) || self.success_effects_fired {
            return false;
        }
        self.success_effects_fired = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rp_storage::{
        InMemoryPhotoCache, InMemoryProgressStore, StorageError, StorageResult,
    };
    use std::collections::HashSet;
    use std::sync::Mutex;

    fn controller() -> StepController<InMemoryProgressStore, InMemoryPhotoCache> {
        StepController::new(InMemoryProgressStore::default(), InMemoryPhotoCache::default())
    }

    fn record(name: &str) -> VerificationRecord {
        VerificationRecord {
            name: name.to_owned(),
            probability: Vec::new(),
            passed: true,
        }
    }

    /// Progress store that rejects writes/removals for chosen keys.
    struct FlakyProgressStore {
        inner: InMemoryProgressStore,
        failing: HashSet<&'static str>,
    }

    impl FlakyProgressStore {
        fn failing_on(keys: &[&'static str]) -> Self {
            Self {
                inner: InMemoryProgressStore::default(),
                failing: keys.iter().copied().collect(),
            }
        }
    }

    impl ProgressStore for FlakyProgressStore {
        fn get(&self, key: &str) -> StorageResult<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> StorageResult<()> {
            if self.failing.contains(key) {
                return Err(StorageError::Backend("write rejected".into()));
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> StorageResult<()> {
            if self.failing.contains(key) {
                return Err(StorageError::Backend("remove rejected".into()));
            }
            self.inner.remove(key)
        }
    }

    /// Cache that fails every operation, as in private browsing.
    #[derive(Default)]
    struct UnavailablePhotoCache {
        puts_seen: Mutex<u32>,
    }

    #[async_trait(?Send)]
    impl PhotoCache for UnavailablePhotoCache {
        async fn put(&self, _id: &str, _data: &str) -> StorageResult<()> {
            *self.puts_seen.lock().unwrap() += 1;
            Err(StorageError::Unavailable("no indexeddb".into()))
        }

        async fn get(&self, _id: &str) -> StorageResult<Option<String>> {
            Err(StorageError::Unavailable("no indexeddb".into()))
        }

        async fn clear(&self) -> StorageResult<()> {
            Err(StorageError::Unavailable("no indexeddb".into()))
        }
    }

    #[tokio::test]
    async fn next_and_back_follow_the_transition_table() {
        let mut ctl = controller();
        assert_eq!(ctl.step(), WizardStep::IdCapture);

        ctl.back(); // no-op at the first step
        assert_eq!(ctl.step(), WizardStep::IdCapture);

        ctl.next();
        assert_eq!(ctl.step(), WizardStep::Selfie);
        ctl.next();
        assert_eq!(ctl.step(), WizardStep::Submit);
        ctl.next(); // submit only leaves via complete()
        assert_eq!(ctl.step(), WizardStep::Submit);

        ctl.back();
        assert_eq!(ctl.step(), WizardStep::Selfie);
    }

    #[tokio::test]
    async fn next_at_result_is_a_no_op() {
        let mut ctl = controller();
        ctl.complete(false, Vec::new()).await;
        assert_eq!(ctl.step(), WizardStep::Result);
        ctl.next();
        assert_eq!(ctl.step(), WizardStep::Result);
        ctl.back();
        assert_eq!(ctl.step(), WizardStep::Result);
    }

    #[tokio::test]
    async fn every_step_change_is_persisted() {
        let mut ctl = controller();
        ctl.next();
        assert_eq!(ctl.progress().get(STEP_KEY).unwrap().as_deref(), Some("2"));
        ctl.next();
        assert_eq!(ctl.progress().get(STEP_KEY).unwrap().as_deref(), Some("3"));
        ctl.back();
        assert_eq!(ctl.progress().get(STEP_KEY).unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn back_keeps_captured_photos() {
        let mut ctl = controller();
        ctl.update_photo(PhotoSlot::Id, "data:image/png;base64,ID").await;
        ctl.next();
        ctl.update_photo(PhotoSlot::Selfie, "data:image/png;base64,ME").await;
        ctl.back();
        assert_eq!(ctl.state().id_photo.as_deref(), Some("data:image/png;base64,ID"));
        assert_eq!(ctl.state().selfie_photo.as_deref(), Some("data:image/png;base64,ME"));
    }

    #[tokio::test]
    async fn updated_photo_survives_a_reload() {
        let progress = InMemoryProgressStore::default();
        let photos = InMemoryPhotoCache::default();

        let mut ctl = StepController::new(&progress, &photos);
        ctl.update_photo(PhotoSlot::Id, "data:image/png;base64,XYZ").await;
        ctl.next();

        // Fresh controller over the same stores, as after a page reload.
        let mut reloaded = StepController::new(&progress, &photos);
        reloaded.hydrate().await;
        assert_eq!(reloaded.step(), WizardStep::Selfie);
        assert_eq!(
            reloaded.state().id_photo.as_deref(),
            Some("data:image/png;base64,XYZ")
        );
        assert_eq!(reloaded.state().selfie_photo, None);
    }

    #[tokio::test]
    async fn photo_update_proceeds_when_cache_is_unavailable() {
        let mut ctl = StepController::new(
            InMemoryProgressStore::default(),
            UnavailablePhotoCache::default(),
        );
        ctl.update_photo(PhotoSlot::Id, "data:image/png;base64,ID").await;
        assert_eq!(ctl.state().id_photo.as_deref(), Some("data:image/png;base64,ID"));
        ctl.next();
        assert_eq!(ctl.step(), WizardStep::Selfie);
    }

    #[tokio::test]
    async fn hydrate_treats_cache_errors_as_misses() {
        let progress = InMemoryProgressStore::default();
        progress.set(STEP_KEY, "2").unwrap();
        let mut ctl = StepController::new(&progress, UnavailablePhotoCache::default());
        ctl.hydrate().await;
        assert_eq!(ctl.step(), WizardStep::Selfie);
        assert_eq!(ctl.state().id_photo, None);
    }

    #[tokio::test]
    async fn restart_clears_state_and_storage_from_any_step() {
        let progress = InMemoryProgressStore::default();
        progress.set(EMAIL_KEY, "user@example.com").unwrap();
        let photos = InMemoryPhotoCache::default();

        let mut ctl = StepController::new(&progress, &photos);
        ctl.update_photo(PhotoSlot::Id, "a").await;
        ctl.next();
        ctl.update_photo(PhotoSlot::Selfie, "b").await;
        ctl.next();
        ctl.complete(false, vec![record("document")]).await;

        ctl.restart().await;

        assert_eq!(ctl.step(), WizardStep::IdCapture);
        assert_eq!(ctl.state().id_photo, None);
        assert_eq!(ctl.state().selfie_photo, None);
        assert_eq!(ctl.state().outcome, None);
        assert!(ctl.state().records.is_empty());
        assert_eq!(progress.get(STEP_KEY).unwrap(), None);
        assert_eq!(progress.get(EMAIL_KEY).unwrap(), None);
        assert!(photos.is_empty());
    }

    #[tokio::test]
    async fn restart_clears_remain_independent_under_partial_failure() {
        let progress = FlakyProgressStore::failing_on(&[STEP_KEY]);
        progress.inner.set(STEP_KEY, "3").unwrap();
        progress.inner.set(EMAIL_KEY, "user@example.com").unwrap();
        let photos = InMemoryPhotoCache::default();
        photos.put(ID_PHOTO_SLOT, "a").await.unwrap();

        let mut ctl = StepController::new(&progress, &photos);
        ctl.restart().await;

        // The failing step-key removal did not stop the other clears.
        assert_eq!(progress.inner.get(EMAIL_KEY).unwrap(), None);
        assert!(photos.is_empty());
        assert_eq!(ctl.step(), WizardStep::IdCapture);
    }

    #[tokio::test]
    async fn scenario_a_success_erases_all_persisted_traces() {
        let progress = InMemoryProgressStore::default();
        progress.set(EMAIL_KEY, "user@example.com").unwrap();
        let photos = InMemoryPhotoCache::default();

        let mut ctl = StepController::new(&progress, &photos);
        ctl.hydrate().await;
        ctl.update_photo(PhotoSlot::Id, "data:image/jpeg;base64,ID").await;
        ctl.next();
        ctl.update_photo(PhotoSlot::Selfie, "data:image/jpeg;base64,ME").await;
        ctl.next();
        assert_eq!(ctl.step(), WizardStep::Submit);

        ctl.complete(true, Vec::new()).await;

        assert_eq!(ctl.step(), WizardStep::Result);
        assert_eq!(ctl.state().outcome, Some(true));
        assert_eq!(progress.get(STEP_KEY).unwrap(), None);
        assert_eq!(progress.get(EMAIL_KEY).unwrap(), None);
        assert!(photos.is_empty());
    }

    #[tokio::test]
    async fn scenario_b_failure_keeps_persisted_state_until_restart() {
        let progress = InMemoryProgressStore::default();
        progress.set(EMAIL_KEY, "user@example.com").unwrap();
        let photos = InMemoryPhotoCache::default();

        let mut ctl = StepController::new(&progress, &photos);
        ctl.update_photo(PhotoSlot::Id, "a").await;
        ctl.next();
        ctl.update_photo(PhotoSlot::Selfie, "b").await;
        ctl.next();
        ctl.complete(false, Vec::new()).await;

        assert_eq!(ctl.state().outcome, Some(false));
        // Failure does not wipe storage; the step change itself persists.
        assert_eq!(progress.get(STEP_KEY).unwrap().as_deref(), Some("4"));
        assert_eq!(progress.get(EMAIL_KEY).unwrap().as_deref(), Some("user@example.com"));
        assert_eq!(photos.len(), 2);

        ctl.restart().await;
        assert_eq!(progress.get(STEP_KEY).unwrap(), None);
        assert_eq!(progress.get(EMAIL_KEY).unwrap(), None);
        assert!(photos.is_empty());
    }

    #[tokio::test]
    async fn scenario_c_resumes_mid_flow_with_cached_photo() {
        let progress = InMemoryProgressStore::default();
        progress.set(STEP_KEY, "2").unwrap();
        let photos = InMemoryPhotoCache::default();
        photos.put(ID_PHOTO_SLOT, "data:image/png;base64,PRIOR").await.unwrap();

        let mut ctl = StepController::new(&progress, &photos);
        ctl.hydrate().await;

        assert_eq!(ctl.step(), WizardStep::Selfie);
        assert_eq!(ctl.state().id_photo.as_deref(), Some("data:image/png;base64,PRIOR"));
        assert_eq!(ctl.state().selfie_photo, None);
    }

    #[tokio::test]
    async fn success_effects_fire_exactly_once() {
        let mut ctl = controller();
        assert!(!ctl.begin_success_effects()); // nothing completed yet

        ctl.complete(true, Vec::new()).await;
        assert!(ctl.begin_success_effects());
        assert!(!ctl.begin_success_effects());
    }

    #[tokio::test]
    async fn success_effects_never_fire_on_failure() {
        let mut ctl = controller();
        ctl.complete(false, Vec::new()).await;
        assert!(!ctl.begin_success_effects());
    }

    #[tokio::test]
    async fn restart_rearms_the_success_effect_guard() {
        let mut ctl = controller();
        ctl.complete(true, Vec::new()).await;
        assert!(ctl.begin_success_effects());

        ctl.restart().await;
        ctl.complete(true, Vec::new()).await;
        assert!(ctl.begin_success_effects());
    }
}
