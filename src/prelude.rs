//! Common imports for the crate's modules.

pub use crate::{
    base::{
        config::Config,
        types::{Classification, MonitorRequest, ReactionSnapshot, Res, Void},
    },
    runtime::Runtime,
    service::chat::ChatClient,
};
pub use anyhow::anyhow;
pub use tracing::{Instrument, debug, error, info, instrument, warn};
