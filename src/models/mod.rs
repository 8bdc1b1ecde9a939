pub mod configuration;
pub mod draft;
pub mod hub;
pub mod legacy;
pub mod record;
pub mod snapshot;

pub use configuration::{find_option, ConfigCategory, ConfigOption, Configuration, CONFIG_OPTIONS};
pub use draft::{
    BookingDraft, CardDetails, DraftPatch, HubSelection, Payment, PaymentMode, Schedule,
    UserDetails,
};
pub use hub::{find_hub, find_hub_by_name, Hub, HUBS};
pub use record::{BookingKey, BookingRecord, PaymentSummary};
pub use snapshot::BookingSnapshot;
