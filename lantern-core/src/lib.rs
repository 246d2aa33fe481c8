//! Lantern Core - Payload Types
//!
//! Validated payloads, the error taxonomy and the collaborator traits. All other
//! crates depend on this one; it performs no I/O.

mod counter;
mod entities;
mod error;
mod identity;
mod provider;
mod weather;

pub use counter::{validate_step, CounterState};
pub use entities::{Comment, Item, ItemKind, Story};
pub use error::{
    LanternError, LanternResult, NotFoundError, QueryError, StorageError, TransportError,
    ValidationError,
};
pub use identity::{timestamp_from_unix, ItemId, Timestamp};
pub use provider::{CoordinatesResolver, CounterStore, StoryApi, WeatherProvider};
pub use weather::{Coordinates, DailyForecast, Forecast, HourlyForecast, MinutelyPrecipitation};
