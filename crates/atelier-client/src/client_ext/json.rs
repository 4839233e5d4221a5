use anyhow::{Context, Result};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use std::future::Future;

pub trait ClientJsonExt {
    fn get_json<T>(&self, url: Url) -> impl Future<Output = Result<T>> + Send
    where
        T: DeserializeOwned + Send;
}

/// Add-on methods for [`reqwest::Client`].
///
/// [`reqwest::Client`]: https://docs.rs/reqwest/latest/reqwest/struct.Client.html
impl ClientJsonExt for Client {
    /// GET `url` and decode the JSON body; non-2xx statuses are errors.
    async fn get_json<T>(&self, url: Url) -> Result<T>
    where
        T: DeserializeOwned + Send,
    {
        log::debug!("GET {url}");
        let time = std::time::Instant::now();

        let response = self
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("GET {url} failed"))?
            .error_for_status()
            .with_context(|| format!("GET {url} returned an error status"))?;
        let data = response
            .json::<T>()
            .await
            .with_context(|| format!("GET {url} returned an unexpected body"))?;

        log::trace!("GET {url} decoded in {} ms", time.elapsed().as_millis());
        Ok(data)
    }
}
