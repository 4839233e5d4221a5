pub mod api;
pub mod cache;
pub mod client_ext;
pub mod config;
pub mod dashboard;

pub mod prelude {
    pub use crate::api::{Api, BrandSource};
    pub use crate::cache::{Activation, CacheEntry, CacheEvent, KeyedFetch, LazyCache, Status};
    pub use crate::client_ext::json::ClientJsonExt as Json;
    pub use crate::config::Config;
    pub use crate::dashboard::{
        event::EventDashboard, invest::InvestDashboard, stock::StockDashboard, Chart, TraceKind,
    };
    #[allow(unused_imports)]
    pub use reqwest::Client;

    pub fn build_client(config: &Config) -> anyhow::Result<Client> {
        let mut builder = reqwest::ClientBuilder::new().user_agent(&config.user_agent);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(builder.build()?)
    }
}
