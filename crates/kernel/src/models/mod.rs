//! Request, response and trace models.

pub mod query;
pub mod trace;

pub use query::{CountryInfo, GeoInfo, Location, QueryRequest, QueryResponse, WeatherInfo};
pub use trace::TraceRecord;
