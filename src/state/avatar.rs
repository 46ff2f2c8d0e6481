/// Avatar selection view-model
///
/// `AvatarModal` ties the modal shell to the avatar catalog: opening it
/// starts a fresh catalog fetch, choosing an option yields the write to
/// perform and closes the shell straight away. `ProfileStore` owns the
/// cached `me` result and is invalidated once a write is acknowledged.
use std::time::Duration;

use super::data::{AvatarOption, Fetch, Profile};
use super::modal::{CloseReason, ModalConfig, ModalPhase, ModalSize, ModalState, Rounded};
use crate::api::Ack;
use crate::error::ApiError;

pub const AVATAR_MODAL_TITLE: &str = "Choose your avatar";

/// Size requested from the image delivery layer for each avatar tile
pub const AVATAR_REQUEST: (u32, u32) = (100, 100);

/// The write issued when the user picks an avatar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionCommand {
    pub image_url: String,
}

/// Catalog of selectable avatars
#[derive(Debug, Clone, Default)]
pub struct AvatarSelector {
    catalog: Fetch<Vec<AvatarOption>>,
}

impl AvatarSelector {
    pub fn begin_fetch(&mut self) {
        self.catalog = Fetch::Pending;
    }

    pub fn resolve(&mut self, result: Result<Vec<AvatarOption>, ApiError>) {
        match &result {
            Ok(options) => log::debug!("Loaded {} avatars", options.len()),
            Err(err) => log::warn!("Could not load avatars: {}", err),
        }
        self.catalog = Fetch::from_result(result);
    }

    pub fn catalog(&self) -> &Fetch<Vec<AvatarOption>> {
        &self.catalog
    }

    /// Options to render. Pending and failed fetches both show nothing.
    pub fn options(&self) -> &[AvatarOption] {
        self.catalog.ready().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn select(&self, index: usize) -> Option<SelectionCommand> {
        self.options().get(index).map(|option| SelectionCommand {
            image_url: option.url.clone(),
        })
    }
}

/// Modal shell plus the avatar catalog it shows
#[derive(Debug, Clone)]
pub struct AvatarModal {
    pub config: ModalConfig,
    state: ModalState,
    selector: AvatarSelector,
}

impl Default for AvatarModal {
    fn default() -> Self {
        Self {
            config: ModalConfig::new(AVATAR_MODAL_TITLE).size(ModalSize::Md),
            state: ModalState::default(),
            selector: AvatarSelector::default(),
        }
    }
}

impl AvatarModal {
    pub fn rounded(mut self, rounded: Rounded) -> Self {
        self.config = self.config.rounded(rounded);
        self
    }

    pub fn size(mut self, size: ModalSize) -> Self {
        self.config = self.config.size(size);
        self
    }

    /// Follow the owner's visibility flag. Returns true when the catalog
    /// has to be fetched, which is on every open.
    pub fn set_visible(&mut self, visible: bool) -> bool {
        let was_closed = self.state.phase() == ModalPhase::Closed;
        let changed = self.state.set_visible(visible);
        if changed && visible && was_closed {
            self.selector.begin_fetch();
            return true;
        }
        false
    }

    pub fn request_close(&mut self, reason: CloseReason) -> bool {
        self.state.request_close(reason)
    }

    pub fn tick(&mut self, elapsed: Duration) -> Option<ModalPhase> {
        self.state.tick(elapsed)
    }

    pub fn resolve_catalog(&mut self, result: Result<Vec<AvatarOption>, ApiError>) {
        self.selector.resolve(result);
    }

    /// User picked the option at `index`.
    ///
    /// The shell starts closing immediately; it does not wait for the
    /// write to be confirmed. Ignored unless the shell is fully open.
    pub fn choose(&mut self, index: usize) -> Option<SelectionCommand> {
        if !self.state.is_interactive() {
            return None;
        }
        let command = self.selector.select(index)?;
        log::info!("Avatar selected: {}", command.image_url);
        self.state.request_close(CloseReason::Programmatic);
        Some(command)
    }

    pub fn state(&self) -> &ModalState {
        &self.state
    }

    pub fn options(&self) -> &[AvatarOption] {
        self.selector.options()
    }

    pub fn is_loading(&self) -> bool {
        self.selector.catalog().is_pending()
    }
}

/// Cached result of the `me` query
#[derive(Debug, Clone, Default)]
pub struct ProfileStore {
    state: Fetch<Profile>,
    stale: bool,
    /// Id of the newest fetch; older responses are dropped
    generation: u64,
}

impl ProfileStore {
    /// Start a fetch and return its id, to be handed back to `resolve`
    pub fn begin_fetch(&mut self) -> u64 {
        self.stale = false;
        self.generation += 1;
        if self.state.ready().is_none() {
            self.state = Fetch::Pending;
        }
        self.generation
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Apply the result of fetch `generation`. Returns false when a newer
    /// fetch has started since, in which case the result is dropped.
    pub fn resolve(&mut self, generation: u64, result: Result<Profile, ApiError>) -> bool {
        if generation != self.generation {
            log::debug!(
                "Dropping profile response {} (latest is {})",
                generation,
                self.generation
            );
            return false;
        }
        match result {
            Ok(profile) => self.state = Fetch::Ready(profile),
            Err(err) => {
                log::warn!("Could not load profile: {}", err);
                // Keep showing the last known profile if there is one
                if self.state.ready().is_none() {
                    self.state = Fetch::Failed(err);
                }
            }
        }
        true
    }

    /// Mark the cached profile stale. Returns true when a refetch is due.
    pub fn invalidate(&mut self) -> bool {
        let was_stale = self.stale;
        self.stale = true;
        !was_stale
    }

    /// Outcome of an avatar write. An acknowledged write invalidates the
    /// profile; a rejected one is only logged.
    pub fn on_write(&mut self, result: &Result<Ack, ApiError>) -> bool {
        match result {
            Ok(Ack) => self.invalidate(),
            Err(err) => {
                log::warn!("Avatar update failed: {}", err);
                false
            }
        }
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.state.ready()
    }

    pub fn avatar_url(&self) -> Option<&str> {
        self.profile().and_then(|p| p.profile_image.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::modal::ENTER_DURATION;
    use pretty_assertions::assert_eq;

    fn one_avatar() -> Vec<AvatarOption> {
        vec![AvatarOption {
            id: "1".into(),
            name: "A".into(),
            url: "/a.png".into(),
        }]
    }

    fn opened_with(options: Vec<AvatarOption>) -> AvatarModal {
        let mut modal = AvatarModal::default();
        assert!(modal.set_visible(true));
        modal.tick(ENTER_DURATION);
        modal.resolve_catalog(Ok(options));
        modal
    }

    #[test]
    fn test_ready_catalog_renders_options_verbatim() {
        let modal = opened_with(one_avatar());
        assert_eq!(modal.options(), one_avatar().as_slice());
        assert_eq!(modal.options()[0].url, "/a.png");
    }

    #[test]
    fn test_pending_catalog_renders_nothing() {
        let mut modal = AvatarModal::default();
        modal.set_visible(true);
        assert!(modal.is_loading());
        assert!(modal.options().is_empty());
    }

    #[test]
    fn test_failed_catalog_renders_nothing() {
        let mut modal = AvatarModal::default();
        modal.set_visible(true);
        modal.resolve_catalog(Err(ApiError::MissingData("getAvatars")));
        assert!(!modal.is_loading());
        assert!(modal.options().is_empty());
    }

    #[test]
    fn test_every_open_refetches() {
        let mut modal = opened_with(one_avatar());
        modal.request_close(CloseReason::CloseButton);
        modal.tick(Duration::from_secs(1));
        assert!(modal.set_visible(true));
        assert!(modal.options().is_empty());
    }

    #[test]
    fn test_reopen_while_closing_does_not_refetch() {
        let mut modal = opened_with(one_avatar());
        modal.request_close(CloseReason::Backdrop);
        assert!(!modal.set_visible(true));
        assert_eq!(modal.options().len(), 1);
    }

    #[test]
    fn test_choose_yields_one_command_and_closes() {
        let mut modal = opened_with(one_avatar());
        let command = modal.choose(0);
        assert_eq!(
            command,
            Some(SelectionCommand {
                image_url: "/a.png".into()
            })
        );
        assert_eq!(modal.state().phase(), ModalPhase::Closing);

        // A second click while closing does not issue another write
        assert_eq!(modal.choose(0), None);
        modal.tick(Duration::from_secs(1));
        assert_eq!(modal.state().phase(), ModalPhase::Closed);
    }

    #[test]
    fn test_choose_out_of_range_keeps_modal_open() {
        let mut modal = opened_with(one_avatar());
        assert_eq!(modal.choose(3), None);
        assert_eq!(modal.state().phase(), ModalPhase::Open);
    }

    #[test]
    fn test_choose_ignored_while_opening() {
        let mut modal = AvatarModal::default();
        modal.set_visible(true);
        modal.resolve_catalog(Ok(one_avatar()));
        assert_eq!(modal.choose(0), None);
    }

    #[test]
    fn test_default_shell_is_md_titled() {
        let modal = AvatarModal::default();
        assert_eq!(modal.config.title, AVATAR_MODAL_TITLE);
        assert_eq!(modal.config.size, Some(ModalSize::Md));
    }

    #[test]
    fn test_ack_invalidates_profile_once() {
        let mut store = ProfileStore::default();
        assert!(store.on_write(&Ok(Ack)));
        assert!(store.is_stale());
        // Already stale: no second refetch queued
        assert!(!store.on_write(&Ok(Ack)));
        store.begin_fetch();
        assert!(!store.is_stale());
    }

    #[test]
    fn test_failed_write_leaves_profile_alone() {
        let mut store = ProfileStore::default();
        let id = store.begin_fetch();
        store.resolve(id, Ok(profile_with(Some("/old.png"))));
        assert!(!store.on_write(&Err(ApiError::Transport("refused".into()))));
        assert!(!store.is_stale());
        assert_eq!(store.avatar_url(), Some("/old.png"));
    }

    #[test]
    fn test_refetch_failure_keeps_last_profile() {
        let mut store = ProfileStore::default();
        let first = store.begin_fetch();
        store.resolve(first, Ok(profile_with(None)));
        store.invalidate();
        let second = store.begin_fetch();
        store.resolve(second, Err(ApiError::Transport("timeout".into())));
        assert_eq!(store.profile().map(|p| p.name.as_str()), Some("Asha"));
    }

    fn profile_with(image: Option<&str>) -> Profile {
        Profile {
            id: "1".into(),
            name: "Asha".into(),
            profile_image: image.map(String::from),
        }
    }

    #[test]
    fn test_older_profile_response_is_dropped() {
        let mut store = ProfileStore::default();
        let older = store.begin_fetch();
        let newer = store.begin_fetch();

        assert!(store.resolve(newer, Ok(profile_with(Some("/new.png")))));
        assert!(!store.resolve(older, Ok(profile_with(Some("/old.png")))));
        assert_eq!(store.avatar_url(), Some("/new.png"));
    }
}
