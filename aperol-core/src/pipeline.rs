//! The single run from "where am I" to a rendered page.
//!
//! A [`Pipeline`] is consumed by [`Pipeline::run`], so it executes at most
//! once. Every failure is terminal: the error text goes to the surface and the
//! run stops. Regions written before the failure stay as they are.

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, Utc};
use std::{fmt, sync::Arc};
use tracing::{debug, info, warn};

use crate::{
    error::{Error, Result},
    geocode::PlaceResolver,
    location::GeoProvider,
    model::{Coordinates, WeatherSnapshot},
    provider::WeatherProvider,
    render::{RenderOptions, Surface, current_uv, render_current, render_forecast, render_hourly},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Idle,
    LocationRequested,
    LocationResolved,
    WeatherRequested,
    Rendered,
    Error,
}

impl Stage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Rendered | Stage::Error)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// What happened during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    /// Every stage entered, starting with `Idle`.
    pub trail: Vec<Stage>,
    /// The message shown to the user when the run ended in `Error`.
    pub error: Option<String>,
}

impl PipelineReport {
    pub fn final_stage(&self) -> Stage {
        self.trail.last().copied().unwrap_or(Stage::Idle)
    }

    pub fn succeeded(&self) -> bool {
        self.final_stage() == Stage::Rendered
    }
}

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub struct Pipeline {
    geo: Box<dyn GeoProvider>,
    places: Box<dyn PlaceResolver>,
    weather: Box<dyn WeatherProvider>,
    options: RenderOptions,
    clock: Clock,
    trail: Vec<Stage>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("geo", &self.geo)
            .field("places", &self.places)
            .field("weather", &self.weather)
            .field("options", &self.options)
            .field("trail", &self.trail)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    pub fn new(
        geo: Box<dyn GeoProvider>,
        places: Box<dyn PlaceResolver>,
        weather: Box<dyn WeatherProvider>,
        options: RenderOptions,
    ) -> Self {
        Self {
            geo,
            places,
            weather,
            options,
            clock: Arc::new(Utc::now),
            trail: vec![Stage::Idle],
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    fn enter(&mut self, next: Stage) {
        let from = self.trail.last().copied().unwrap_or(Stage::Idle);
        debug!(%from, to = %next, "pipeline transition");
        self.trail.push(next);
    }

    fn fail(mut self, surface: &mut dyn Surface, err: Error) -> PipelineReport {
        let message = err.to_string();
        warn!(error = ?err, "pipeline failed");
        surface.show_error(&message);
        self.enter(Stage::Error);
        PipelineReport { trail: self.trail, error: Some(message) }
    }

    pub async fn run(mut self, surface: &mut dyn Surface) -> PipelineReport {
        if !self.geo.is_available() {
            return self.fail(surface, Error::CapabilityUnavailable);
        }

        self.enter(Stage::LocationRequested);
        let coords = match self.geo.current_position().await {
            Ok(coords) => coords,
            Err(err) => return self.fail(surface, err),
        };
        self.enter(Stage::LocationResolved);

        match self.fetch_and_render(coords, surface).await {
            Ok(()) => {
                self.enter(Stage::Rendered);
                info!("page rendered");
                PipelineReport { trail: self.trail, error: None }
            }
            Err(err) => self.fail(surface, err),
        }
    }

    async fn fetch_and_render(&mut self, coords: Coordinates, surface: &mut dyn Surface) -> Result<()> {
        // Place name first: it stays on screen even if the forecast fails.
        let name = self.places.resolve_place_name(coords).await?;
        surface.show_place_name(&name);

        self.enter(Stage::WeatherRequested);
        let snapshot = self.weather.fetch_weather(coords).await?;

        let now = self.local_now(&snapshot);
        let uv = self
            .options
            .uv
            .then(|| snapshot.hourly.as_ref().and_then(|h| current_uv(h, now)));

        surface.show_current(render_current(&snapshot.current, uv));
        if let Some(hourly) = snapshot.hourly.as_ref().filter(|_| self.options.hourly) {
            surface.show_hourly(render_hourly(hourly, now));
        }
        surface.show_forecast(render_forecast(&snapshot.daily, &self.options));

        Ok(())
    }

    /// Wall-clock time at the forecast location, or on this host if the
    /// service didn't report an offset.
    fn local_now(&self, snapshot: &WeatherSnapshot) -> NaiveDateTime {
        let utc = (self.clock)();
        match snapshot.utc_offset_seconds.and_then(FixedOffset::east_opt) {
            Some(offset) => utc.with_timezone(&offset).naive_local(),
            None => utc.with_timezone(&Local).naive_local(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        location::{FixedLocation, NoLocation},
        model::{CurrentWeather, DailySeries, HourlySeries},
        render::{CurrentRegion, Page},
    };
    use async_trait::async_trait;
    use chrono::TimeZone;
    use reqwest::StatusCode;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct FailingGeo;

    #[async_trait]
    impl GeoProvider for FailingGeo {
        async fn current_position(&self) -> Result<Coordinates> {
            Err(Error::Geolocation("User denied Geolocation".into()))
        }
    }

    #[derive(Debug)]
    struct StaticPlace(Option<&'static str>);

    #[async_trait]
    impl PlaceResolver for StaticPlace {
        async fn resolve_place_name(&self, _coords: Coordinates) -> Result<String> {
            match self.0 {
                Some(name) => Ok(name.to_string()),
                None => Err(Error::LocationFetch { status: StatusCode::SERVICE_UNAVAILABLE }),
            }
        }
    }

    #[derive(Debug, Default)]
    struct CountingWeather {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl WeatherProvider for CountingWeather {
        async fn fetch_weather(&self, _coords: Coordinates) -> Result<WeatherSnapshot> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Error::WeatherFetch { status: StatusCode::INTERNAL_SERVER_ERROR });
            }
            Ok(snapshot())
        }
    }

    fn snapshot() -> WeatherSnapshot {
        WeatherSnapshot {
            current: CurrentWeather {
                temperature: 18.2,
                windspeed: 10.0,
                winddirection: 90.0,
                weathercode: Some(1),
                time: "2026-10-18T14:00".into(),
            },
            hourly: Some(HourlySeries {
                time: vec!["2026-10-18T13:00".into(), "2026-10-18T14:00".into()],
                temperature: vec![Some(17.0), Some(18.2)],
                weathercode: vec![Some(1), Some(2)],
                uv_index: vec![Some(4.0), Some(3.0)],
            }),
            daily: DailySeries {
                time: vec!["2026-10-18".into(), "2026-10-19".into()],
                temperature_max: vec![Some(20.0), Some(22.0)],
                temperature_min: vec![Some(10.0), Some(12.0)],
                weathercode: vec![Some(1), Some(3)],
                uv_index_max: vec![Some(4.0), Some(3.5)],
            },
            utc_offset_seconds: Some(7200),
        }
    }

    fn berlin() -> Box<dyn GeoProvider> {
        Box::new(FixedLocation(Coordinates::new(52.5, 13.4).unwrap()))
    }

    fn fixed_clock() -> Clock {
        // 12:30 UTC is 14:30 at +02:00.
        Arc::new(|| Utc.with_ymd_and_hms(2026, 10, 18, 12, 30, 0).unwrap())
    }

    fn options() -> RenderOptions {
        RenderOptions { hourly: true, uv: true, ..Default::default() }
    }

    #[tokio::test]
    async fn happy_path_renders_every_region() {
        let pipeline = Pipeline::new(
            berlin(),
            Box::new(StaticPlace(Some("Berlin"))),
            Box::new(CountingWeather::default()),
            options(),
        )
        .with_clock(fixed_clock());

        let mut page = Page::default();
        let report = pipeline.run(&mut page).await;

        assert_eq!(
            report.trail,
            vec![
                Stage::Idle,
                Stage::LocationRequested,
                Stage::LocationResolved,
                Stage::WeatherRequested,
                Stage::Rendered,
            ]
        );
        assert!(report.succeeded());
        assert_eq!(page.place_name.as_deref(), Some("Berlin"));

        match page.current {
            Some(CurrentRegion::Weather(ref view)) => {
                assert_eq!(view.temperature, "18.2°C");
                assert_eq!(view.uv.as_ref().map(|u| u.value.as_str()), Some("3"));
            }
            ref other => panic!("expected weather, got {other:?}"),
        }

        let hourly = page.hourly.expect("hourly strip shown");
        assert_eq!(hourly.len(), 1);
        assert_eq!(hourly[0].time, "14:00");

        assert_eq!(page.forecast.len(), 1);
        assert_eq!(page.forecast[0].drink, "7");
    }

    #[tokio::test]
    async fn hourly_disabled_leaves_region_untouched() {
        let pipeline = Pipeline::new(
            berlin(),
            Box::new(StaticPlace(Some("Berlin"))),
            Box::new(CountingWeather::default()),
            RenderOptions::default(),
        )
        .with_clock(fixed_clock());

        let mut page = Page::default();
        assert!(pipeline.run(&mut page).await.succeeded());
        assert!(page.hourly.is_none());
    }

    #[tokio::test]
    async fn unavailable_capability_goes_straight_to_error() {
        let pipeline = Pipeline::new(
            Box::new(NoLocation),
            Box::new(StaticPlace(Some("Berlin"))),
            Box::new(CountingWeather::default()),
            options(),
        );

        let mut page = Page::default();
        let report = pipeline.run(&mut page).await;

        assert_eq!(report.trail, vec![Stage::Idle, Stage::Error]);
        assert_eq!(
            report.error.as_deref(),
            Some("Geolocation is not supported on this system.")
        );
        assert_eq!(page.error(), report.error.as_deref());
    }

    #[tokio::test]
    async fn geolocation_failure_is_reported() {
        let pipeline = Pipeline::new(
            Box::new(FailingGeo),
            Box::new(StaticPlace(Some("Berlin"))),
            Box::new(CountingWeather::default()),
            options(),
        );

        let mut page = Page::default();
        let report = pipeline.run(&mut page).await;

        assert_eq!(report.trail, vec![Stage::Idle, Stage::LocationRequested, Stage::Error]);
        assert_eq!(page.error(), Some("Geolocation error: User denied Geolocation"));
        assert!(page.place_name.is_none());
    }

    #[tokio::test]
    async fn geocode_failure_skips_weather_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let weather = CountingWeather { calls: calls.clone(), fail: false };
        let pipeline =
            Pipeline::new(berlin(), Box::new(StaticPlace(None)), Box::new(weather), options());

        let mut page = Page::default();
        let report = pipeline.run(&mut page).await;

        assert_eq!(report.final_stage(), Stage::Error);
        assert_eq!(report.error.as_deref(), Some("Location data fetch failed"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn weather_failure_keeps_place_name() {
        let weather = CountingWeather { calls: Arc::default(), fail: true };
        let pipeline = Pipeline::new(
            berlin(),
            Box::new(StaticPlace(Some("Berlin"))),
            Box::new(weather),
            options(),
        );

        let mut page = Page::default();
        let report = pipeline.run(&mut page).await;

        assert_eq!(
            report.trail,
            vec![
                Stage::Idle,
                Stage::LocationRequested,
                Stage::LocationResolved,
                Stage::WeatherRequested,
                Stage::Error,
            ]
        );
        assert_eq!(page.error(), Some("Weather data fetch failed"));
        assert_eq!(page.place_name.as_deref(), Some("Berlin"));
        assert!(page.forecast.is_empty());
        assert!(Stage::Error.is_terminal());
    }
}
