use env_logger::{Builder, Target};
use iced::keyboard::{self, key};
use iced::widget::image::Handle;
use iced::widget::{button, canvas, column, container, image, row, scrollable, text, Space};
use iced::{time, window, Alignment, Element, Length, Subscription, Task, Theme};
use log::LevelFilter;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

mod api;
mod config;
mod error;
mod state;
mod ui;

use api::{Ack, GraphQlClient, ImageDelivery, ProfileBackend};
use config::AppConfig;
use error::ApiError;
use state::avatar::{AvatarModal, ProfileStore, AVATAR_REQUEST};
use state::data::{AvatarOption, Profile};
use state::marquee::{MarqueeAnimation, MarqueeLayout, POSTER_REQUEST};
use state::modal::{CloseReason, ModalPhase};
use state::viewport::ViewportClass;

/// Frame interval while something is animating
const FRAME: Duration = Duration::from_millis(16);

/// Longest step fed to animations, so a stalled frame does not jump
const MAX_STEP: Duration = Duration::from_millis(100);

/// Main application state
struct FestPortal {
    config: AppConfig,
    backend: Arc<dyn ProfileBackend>,
    delivery: Arc<ImageDelivery>,
    /// Classified once, from the first window measurement
    viewport: Option<ViewportClass>,
    marquee: Option<MarqueeLayout>,
    animation: MarqueeAnimation,
    page_scroll: f32,
    last_tick: Option<Instant>,
    /// Loaded images keyed by the path or URL they were requested with
    images: HashMap<String, Handle>,
    requested: HashSet<String>,
    avatar_modal: AvatarModal,
    profile: ProfileStore,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// Width of the main window, read once at startup
    ViewportMeasured(Option<f32>),
    Tick(Instant),
    PageScrolled(scrollable::Viewport),
    ImageLoaded(String, Result<Handle, ApiError>),
    /// Owner-side visibility flag of the avatar modal
    ShowAvatarModal(bool),
    CloseAvatarModal(CloseReason),
    AvatarsLoaded(Result<Vec<AvatarOption>, ApiError>),
    AvatarChosen(usize),
    AvatarWritten(Result<Ack, ApiError>),
    /// Result of the `me` fetch with the given id
    ProfileLoaded(u64, Result<Profile, ApiError>),
}

impl FestPortal {
    fn new(config: AppConfig) -> (Self, Task<Message>) {
        let client = GraphQlClient::new(config.graphql_url.clone(), config.auth_token.clone());
        let delivery = ImageDelivery::new(
            reqwest::Client::new(),
            config.asset_base_url.clone(),
            api::delivery::default_cache_dir(),
        );

        log::info!(
            "Fest portal starting with {} posters from {}",
            config.posters.len(),
            config.poster_dir
        );

        let measure = match config.viewport_width {
            Some(width) => Task::done(Message::ViewportMeasured(Some(width))),
            None => window::get_latest()
                .then(|id| match id {
                    Some(id) => window::get_size(id).map(|size| Some(size.width)),
                    None => Task::done(None),
                })
                .map(Message::ViewportMeasured),
        };

        let avatar_modal = AvatarModal::default()
            .size(config.modal_size)
            .rounded(config.modal_rounded);
        let mut app = FestPortal {
            config,
            backend: Arc::new(client),
            delivery: Arc::new(delivery),
            viewport: None,
            marquee: None,
            animation: MarqueeAnimation::default(),
            page_scroll: 0.0,
            last_tick: None,
            images: HashMap::new(),
            requested: HashSet::new(),
            avatar_modal,
            profile: ProfileStore::default(),
        };
        let load_profile = app.fetch_profile();

        (app, Task::batch([measure, load_profile]))
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        let idle = !self.frames_running();
        let task = self.handle(message);
        // Frames were off: the last tick is stale, restart the clock
        if idle && self.frames_running() {
            self.last_tick = None;
        }
        task
    }

    fn handle(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::ViewportMeasured(width) => {
                if self.marquee.is_some() {
                    return Task::none();
                }
                let viewport = ViewportClass::classify(width);
                let layout =
                    MarqueeLayout::build(&self.config.posters, self.config.marquee_speed, viewport);
                log::info!(
                    "Viewport {:?} (width {:?}), marquee draws {} posters",
                    viewport,
                    width,
                    layout.render_count()
                );
                let paths: Vec<String> = layout
                    .assets()
                    .into_iter()
                    .map(|asset| asset.path(&self.config.poster_dir))
                    .collect();

                self.viewport = Some(viewport);
                self.marquee = Some(layout);
                Task::batch(paths.into_iter().map(|p| self.load_image(p, POSTER_REQUEST)))
            }
            Message::Tick(now) => {
                let elapsed = self
                    .last_tick
                    .map(|last| now.saturating_duration_since(last).min(MAX_STEP))
                    .unwrap_or_default();
                self.last_tick = Some(now);

                if matches!(self.marquee, Some(MarqueeLayout::Ribbons { .. })) {
                    self.animation.advance(elapsed);
                }
                if let Some(ModalPhase::Closed) = self.avatar_modal.tick(elapsed) {
                    log::debug!("Avatar modal closed");
                }
                Task::none()
            }
            Message::PageScrolled(viewport) => {
                self.page_scroll = viewport.absolute_offset().y;
                Task::none()
            }
            Message::ImageLoaded(path, result) => {
                match result {
                    Ok(handle) => {
                        self.images.insert(path, handle);
                    }
                    Err(err) => log::warn!("Could not load image {}: {}", path, err),
                }
                Task::none()
            }
            Message::ShowAvatarModal(visible) => {
                if self.avatar_modal.set_visible(visible) {
                    let backend = self.backend.clone();
                    return Task::perform(
                        async move { backend.get_avatars().await },
                        Message::AvatarsLoaded,
                    );
                }
                Task::none()
            }
            Message::CloseAvatarModal(reason) => {
                self.avatar_modal.request_close(reason);
                Task::none()
            }
            Message::AvatarsLoaded(result) => {
                let urls: Vec<String> = result
                    .as_ref()
                    .map(|options| options.iter().map(|o| o.url.clone()).collect())
                    .unwrap_or_default();
                self.avatar_modal.resolve_catalog(result);
                Task::batch(urls.into_iter().map(|url| self.load_image(url, AVATAR_REQUEST)))
            }
            Message::AvatarChosen(index) => {
                let Some(command) = self.avatar_modal.choose(index) else {
                    return Task::none();
                };
                // The modal is already closing; the write runs on its own
                let backend = self.backend.clone();
                Task::perform(
                    async move { backend.update_profile_image(&command.image_url).await },
                    Message::AvatarWritten,
                )
            }
            Message::AvatarWritten(result) => {
                if self.profile.on_write(&result) {
                    return self.fetch_profile();
                }
                Task::none()
            }
            Message::ProfileLoaded(generation, result) => {
                let avatar = result
                    .as_ref()
                    .ok()
                    .and_then(|p| p.profile_image.clone());
                if !self.profile.resolve(generation, result) {
                    return Task::none();
                }
                match avatar {
                    Some(url) => self.load_image(url, AVATAR_REQUEST),
                    None => Task::none(),
                }
            }
        }
    }

    fn fetch_profile(&mut self) -> Task<Message> {
        if self.profile.is_stale() {
            log::debug!("Refetching profile after avatar update");
        }
        let generation = self.profile.begin_fetch();
        let backend = self.backend.clone();
        Task::perform(async move { backend.me().await }, move |result| {
            Message::ProfileLoaded(generation, result)
        })
    }

    /// Whether frame ticks are being delivered
    fn frames_running(&self) -> bool {
        matches!(self.marquee, Some(MarqueeLayout::Ribbons { .. }))
            || self.avatar_modal.state().is_animating()
    }

    /// Queue a delivery request unless `path` was already asked for
    fn load_image(&mut self, path: String, (width, height): (u32, u32)) -> Task<Message> {
        if !self.requested.insert(path.clone()) {
            return Task::none();
        }
        let delivery = self.delivery.clone();
        Task::perform(
            async move {
                let result = delivery.request(&path, width, height).await;
                (path, result)
            },
            |(path, result)| Message::ImageLoaded(path, result),
        )
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let viewport = self.viewport.unwrap_or(ViewportClass::Desktop);

        let page = scrollable(
            column![
                self.header(),
                self.marquee_view(),
                container(text("Scroll to move the posters").size(14))
                    .height(Length::Fixed(900.0))
                    .center_x(Length::Fill),
            ]
            .spacing(24),
        )
        .on_scroll(Message::PageScrolled)
        .height(Length::Fill);

        ui::modal::modal(
            page,
            self.avatar_modal.state(),
            &self.avatar_modal.config,
            viewport,
            Message::CloseAvatarModal,
            ui::avatar_grid::avatar_grid(
                self.avatar_modal.options(),
                &self.images,
                self.avatar_modal.is_loading(),
            ),
        )
    }

    fn header(&self) -> Element<Message> {
        let who: Element<Message> = match self.profile.profile() {
            Some(profile) => {
                let avatar: Element<Message> = match self
                    .profile
                    .avatar_url()
                    .and_then(|url| self.images.get(url))
                {
                    Some(handle) => image(handle.clone()).width(36).height(36).into(),
                    None => Space::new(36, 36).into(),
                };
                row![avatar, text(profile.name.as_str()).size(16)]
                    .spacing(10)
                    .align_y(Alignment::Center)
                    .into()
            }
            None => text("Not signed in").size(14).into(),
        };

        row![
            text("Events").size(32),
            Space::with_width(Length::Fill),
            who,
            button("Change avatar")
                .on_press(Message::ShowAvatarModal(true))
                .padding(10),
        ]
        .spacing(16)
        .padding(20)
        .align_y(Alignment::Center)
        .into()
    }

    fn marquee_view(&self) -> Element<Message> {
        let Some(layout) = &self.marquee else {
            return Space::with_height(Length::Fixed(240.0)).into();
        };

        canvas(ui::marquee::MarqueeCanvas {
            layout,
            images: &self.images,
            poster_dir: &self.config.poster_dir,
            phase: self.animation.phase(),
            page_scroll: self.page_scroll,
        })
        .width(Length::Fill)
        .height(Length::Fixed(ui::marquee::canvas_height(layout)))
        .into()
    }

    fn subscription(&self) -> Subscription<Message> {
        let modal = self.avatar_modal.state();

        let frames = if self.frames_running() {
            time::every(FRAME).map(Message::Tick)
        } else {
            Subscription::none()
        };

        let escape = if modal.is_visible() {
            keyboard::on_key_press(|key, _modifiers| match key {
                keyboard::Key::Named(key::Named::Escape) => {
                    Some(Message::CloseAvatarModal(CloseReason::Escape))
                }
                _ => None,
            })
        } else {
            Subscription::none()
        };

        Subscription::batch([frames, escape])
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn init_logger() {
    Builder::new()
        .target(Target::Stdout)
        .filter_level(LevelFilter::Warn)
        .filter_module("fest_portal", LevelFilter::Debug)
        .init();
}

fn main() -> iced::Result {
    if std::env::var("RUST_LOG").is_err() {
        init_logger();
    } else {
        env_logger::init();
    }

    let config = AppConfig::from_environment();

    iced::application("Fest Portal", FestPortal::update, FestPortal::view)
        .subscription(FestPortal::subscription)
        .theme(FestPortal::theme)
        .window_size((1280.0, 800.0))
        .centered()
        .run_with(move || FestPortal::new(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FRAME_STEP: Duration = Duration::from_millis(16);

    fn desktop_app() -> FestPortal {
        let vars: HashMap<&str, &str> = [
            ("FEST_VIEWPORT_WIDTH", "1280"),
            ("FEST_POSTER_DIR", "/nonexistent/posters"),
            ("FEST_GRAPHQL_URL", "http://127.0.0.1:9/graphql"),
        ]
        .into_iter()
        .collect();
        let config = AppConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string()));
        let (mut app, _) = FestPortal::new(config);
        let _ = app.update(Message::ViewportMeasured(Some(1280.0)));
        app
    }

    /// Open the avatar modal with a one-item catalog, ticking at 60 Hz.
    /// Returns the time of the last tick.
    fn open_avatar_modal(app: &mut FestPortal, start: Instant) -> Instant {
        let _ = app.update(Message::ShowAvatarModal(true));
        let _ = app.update(Message::AvatarsLoaded(Ok(vec![AvatarOption {
            id: "1".into(),
            name: "A".into(),
            url: "/a.png".into(),
        }])));

        let mut now = start;
        for _ in 0..100 {
            let _ = app.update(Message::Tick(now));
            if app.avatar_modal.state().phase() == ModalPhase::Open {
                return now;
            }
            now += FRAME_STEP;
        }
        panic!("modal never opened");
    }

    #[test]
    fn test_desktop_frames_stop_once_modal_is_open() {
        let mut app = desktop_app();
        assert!(!app.frames_running());
        open_avatar_modal(&mut app, Instant::now());
        assert!(!app.frames_running());
    }

    #[test]
    fn test_close_after_idle_starts_from_full_opacity() {
        let mut app = desktop_app();
        let opened_at = open_avatar_modal(&mut app, Instant::now());

        // Nothing ticks while the modal sits open on desktop
        let later = opened_at + Duration::from_secs(10);
        let _ = app.update(Message::CloseAvatarModal(CloseReason::Backdrop));
        let _ = app.update(Message::Tick(later));
        let _ = app.update(Message::Tick(later + FRAME_STEP));

        let state = app.avatar_modal.state();
        assert_eq!(state.phase(), ModalPhase::Closing);
        assert!(state.opacity() > 0.99, "opacity {}", state.opacity());
    }

    #[test]
    fn test_selection_after_idle_animates_from_start() {
        let mut app = desktop_app();
        let opened_at = open_avatar_modal(&mut app, Instant::now());

        let later = opened_at + Duration::from_secs(10);
        let _ = app.update(Message::AvatarChosen(0));
        let _ = app.update(Message::Tick(later));

        let state = app.avatar_modal.state();
        assert_eq!(state.phase(), ModalPhase::Closing);
        assert_eq!(state.opacity(), 1.0);
    }

    #[test]
    fn test_acknowledged_selection_refetches_profile() {
        let mut app = desktop_app();
        let initial = app.profile.generation();
        open_avatar_modal(&mut app, Instant::now());

        let _ = app.update(Message::AvatarChosen(0));
        assert_eq!(app.avatar_modal.state().phase(), ModalPhase::Closing);
        // Closing does not wait for the write
        assert_eq!(app.profile.generation(), initial);

        let _ = app.update(Message::AvatarWritten(Ok(Ack)));
        assert_eq!(app.profile.generation(), initial + 1);

        let _ = app.update(Message::ProfileLoaded(
            initial + 1,
            Ok(Profile {
                id: "1".into(),
                name: "Asha".into(),
                profile_image: Some("/a.png".into()),
            }),
        ));
        assert_eq!(app.profile.avatar_url(), Some("/a.png"));
    }

    #[test]
    fn test_rejected_selection_does_not_refetch() {
        let mut app = desktop_app();
        let initial = app.profile.generation();
        open_avatar_modal(&mut app, Instant::now());

        let _ = app.update(Message::AvatarChosen(0));
        let _ = app.update(Message::AvatarWritten(Err(ApiError::GraphQl(vec![
            "forbidden".into(),
        ]))));
        assert_eq!(app.profile.generation(), initial);
    }

    #[test]
    fn test_stale_profile_response_is_ignored() {
        let mut app = desktop_app();
        let first = app.profile.generation();
        let _ = app.update(Message::AvatarWritten(Ok(Ack)));

        let _ = app.update(Message::ProfileLoaded(
            first + 1,
            Ok(Profile {
                id: "1".into(),
                name: "Asha".into(),
                profile_image: Some("/new.png".into()),
            }),
        ));
        let _ = app.update(Message::ProfileLoaded(
            first,
            Ok(Profile {
                id: "1".into(),
                name: "Asha".into(),
                profile_image: Some("/old.png".into()),
            }),
        ));
        assert_eq!(app.profile.avatar_url(), Some("/new.png"));
    }
}
