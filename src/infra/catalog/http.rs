use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, Response, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use storefront_api_types::{DeletedProduct, Product, ProductFormData, ProductId, ProductsPage};
use tracing::debug;

use crate::application::repos::{CatalogApi, CatalogError, CatalogOperation, CatalogTarget};
use crate::infra::error::InfraError;

pub const DEFAULT_BASE_URL: &str = "https://dummyjson.com";

/// Catalog backed by a DummyJSON-compatible REST service.
#[derive(Clone, Debug)]
pub struct HttpCatalog {
    client: Client,
    base: Url,
}

struct Call {
    operation: CatalogOperation,
    target: CatalogTarget,
}

impl Call {
    fn new(operation: CatalogOperation, target: CatalogTarget) -> Self {
        Self { operation, target }
    }

    fn network(&self, err: impl std::fmt::Display) -> CatalogError {
        CatalogError::network(self.operation, self.target, err)
    }

    fn decode(&self, err: impl std::fmt::Display) -> CatalogError {
        CatalogError::decode(self.operation, self.target, err)
    }
}

impl HttpCatalog {
    pub fn new(base_url: &Url, timeout: Duration) -> Result<Self, InfraError> {
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base: directory_url(base_url),
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("storefront/", env!("CARGO_PKG_VERSION"))
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn url(&self, path: &str, call: &Call) -> Result<Url, CatalogError> {
        self.base.join(path).map_err(|err| call.network(err))
    }

    async fn send<B, T>(
        &self,
        call: Call,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<T, CatalogError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(method = %method, url = %url, "Catalog request");
        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await.map_err(|err| call.network(err))?;
        Self::handle(call, response).await
    }

    async fn handle<T: DeserializeOwned>(call: Call, response: Response) -> Result<T, CatalogError> {
        let status = response.status();
        let bytes = response.bytes().await.map_err(|err| call.network(err))?;

        if status == StatusCode::NOT_FOUND && matches!(call.target, CatalogTarget::Product(_)) {
            return Err(CatalogError::not_found(call.operation, call.target));
        }
        if !status.is_success() {
            return Err(CatalogError::Status {
                operation: call.operation,
                target: call.target,
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        serde_json::from_slice(&bytes).map_err(|err| call.decode(err))
    }
}

/// Relative joins replace the last path segment unless the base ends in `/`.
fn directory_url(base: &Url) -> Url {
    let mut base = base.clone();
    base.set_query(None);
    base.set_fragment(None);
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base
}

#[async_trait]
impl CatalogApi for HttpCatalog {
    async fn list_products(&self, limit: u32, skip: u32) -> Result<ProductsPage, CatalogError> {
        let call = Call::new(CatalogOperation::Fetch, CatalogTarget::Products { limit, skip });
        let mut url = self.url("products", &call)?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("skip", &skip.to_string());
        self.send::<(), _>(call, Method::GET, url, None).await
    }

    async fn get_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        let call = Call::new(CatalogOperation::Fetch, CatalogTarget::Product(id));
        let url = self.url(&format!("products/{id}"), &call)?;
        self.send::<(), _>(call, Method::GET, url, None).await
    }

    async fn create_product(&self, data: &ProductFormData) -> Result<Product, CatalogError> {
        let call = Call::new(CatalogOperation::Create, CatalogTarget::NewProduct);
        let url = self.url("products/add", &call)?;
        self.send(call, Method::POST, url, Some(data)).await
    }

    async fn update_product(
        &self,
        id: ProductId,
        data: &ProductFormData,
    ) -> Result<Product, CatalogError> {
        let call = Call::new(CatalogOperation::Update, CatalogTarget::Product(id));
        let url = self.url(&format!("products/{id}"), &call)?;
        self.send(call, Method::PUT, url, Some(data)).await
    }

    async fn delete_product(&self, id: ProductId) -> Result<DeletedProduct, CatalogError> {
        let call = Call::new(CatalogOperation::Delete, CatalogTarget::Product(id));
        let url = self.url(&format!("products/{id}"), &call)?;
        self.send::<(), _>(call, Method::DELETE, url, None).await
    }
}
