//! Upstream resolvers and the trace recorder.
//!
//! Each resolver is a thin adapter over one external HTTP service; none of
//! them surface errors, they log and return a degraded value or `None`.

pub mod country;
pub mod geolocation;
pub mod trace;
pub mod weather;

pub use country::CountryService;
pub use geolocation::GeolocationService;
pub use trace::TraceRecorder;
pub use weather::WeatherService;
