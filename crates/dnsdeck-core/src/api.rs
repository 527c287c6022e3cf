// ── Remote management API seam ──
//
// The stores depend on this trait rather than on `ApiClient` directly,
// so tests and embedders can inject their own backend.

use std::future::Future;

use dnsdeck_api::{ApiClient, LoginResponse, ZoneRecord};
use secrecy::SecretString;

/// The remote calls the state layer makes.
pub trait ManagementApi: Send + Sync + 'static {
    /// Exchange credentials for a bearer token plus user attributes.
    fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> impl Future<Output = Result<LoginResponse, dnsdeck_api::Error>> + Send;

    /// List zones visible to the current bearer token.
    fn list_zones(&self) -> impl Future<Output = Result<Vec<ZoneRecord>, dnsdeck_api::Error>> + Send;
}

impl ManagementApi for ApiClient {
    async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<LoginResponse, dnsdeck_api::Error> {
        ApiClient::login(self, username, password).await
    }

    async fn list_zones(&self) -> Result<Vec<ZoneRecord>, dnsdeck_api::Error> {
        ApiClient::list_zones(self).await
    }
}
