//! Backend for the hosted relational datastore.
//!
//! Tables are exposed over a REST interface at `{url}/rest/v1/{table}` and filtered with
//! `column=op.value` query parameters. Every request carries the access key both as `apikey` and
//! as a bearer token.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::backend::{BackendMode, DirectoryBackend, DirectorySnapshot};
use crate::config::DatastoreConfig;
use crate::constants::{
    API_KEY_HEADER, CUSTOM_INSURANCES_TABLE, ORGANIZATIONS_TABLE, ORGANIZATIONS_WITH_PROVIDERS,
    PROVIDERS_TABLE, REST_PATH, RETURN_REPRESENTATION,
};
use crate::{
    DirectoryError, DirectoryResult, Organization, OrganizationDraft, Provider, ProviderDraft,
    RecordId,
};

#[derive(Deserialize)]
struct InsuranceRow {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Serialize)]
struct ProviderInsert<'a> {
    #[serde(flatten)]
    draft: &'a ProviderDraft,
    #[serde(skip_serializing_if = "Option::is_none")]
    organization_id: Option<&'a RecordId>,
}

/// [`DirectoryBackend`] over the datastore's REST tables.
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    client: Client,
    cfg: DatastoreConfig,
}

impl RemoteBackend {
    /// Creates a backend for the datastore described by `cfg`.
    ///
    /// No request is made until the first load or write.
    ///
    /// # Arguments
    /// * `cfg` - Validated datastore URL and access key.
    ///
    /// # Returns
    /// A backend ready to be handed to [`crate::DirectoryStore::initialise`].
    ///
    /// # Errors
    /// Returns `Http` if the HTTP client cannot be built.
    pub fn new(cfg: DatastoreConfig) -> DirectoryResult<Self> {
        let client = Client::builder().build()?;
        Ok(Self { client, cfg })
    }

    /// `{url}/rest/v1/{table}`.
    pub fn table_url(&self, table: &str) -> String {
        format!("{}/{}/{}", self.cfg.url(), REST_PATH, table)
    }

    fn authorised(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(API_KEY_HEADER, self.cfg.access_key())
            .bearer_auth(self.cfg.access_key())
    }

    async fn checked(
        response: Response,
        operation: &'static str,
        table: &'static str,
    ) -> DirectoryResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(operation, table, status = status.as_u16(), "datastore request rejected");
        Err(DirectoryError::Rejected {
            operation,
            table,
            status: status.as_u16(),
            body,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> DirectoryResult<T> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(DirectoryError::Deserialization)
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &'static str,
        filters: &[(&str, &str)],
    ) -> DirectoryResult<Vec<T>> {
        let request = self
            .client
            .get(self.table_url(table))
            .query(filters);
        let response = self.authorised(request).send().await?;
        let response = Self::checked(response, "select", table).await?;
        Self::decode(response).await
    }

    async fn insert_single<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        table: &'static str,
        body: &B,
    ) -> DirectoryResult<T> {
        let request = self
            .client
            .post(self.table_url(table))
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&[body]);
        let response = self.authorised(request).send().await?;
        let response = Self::checked(response, "insert", table).await?;
        let mut rows: Vec<T> = Self::decode(response).await?;
        if rows.is_empty() {
            return Err(DirectoryError::EmptyInsert(table));
        }
        Ok(rows.swap_remove(0))
    }

    async fn update_by_id<B: Serialize + Sync>(
        &self,
        table: &'static str,
        id: &RecordId,
        body: &B,
    ) -> DirectoryResult<()> {
        let filter = format!("eq.{id}");
        let request = self
            .client
            .patch(self.table_url(table))
            .query(&[("id", filter.as_str())])
            .json(body);
        let response = self.authorised(request).send().await?;
        Self::checked(response, "update", table).await?;
        Ok(())
    }

    async fn delete_by_id(&self, table: &'static str, id: &RecordId) -> DirectoryResult<()> {
        let filter = format!("eq.{id}");
        let request = self
            .client
            .delete(self.table_url(table))
            .query(&[("id", filter.as_str())]);
        let response = self.authorised(request).send().await?;
        Self::checked(response, "delete", table).await?;
        Ok(())
    }
}

#[async_trait]
impl DirectoryBackend for RemoteBackend {
    fn mode(&self) -> BackendMode {
        BackendMode::Remote
    }

    async fn load(&self) -> DirectoryResult<DirectorySnapshot> {
        let insurance_rows: Vec<InsuranceRow> = self
            .select(CUSTOM_INSURANCES_TABLE, &[("select", "*")])
            .await?;
        let organizations: Vec<Organization> = self
            .select(
                ORGANIZATIONS_TABLE,
                &[("select", ORGANIZATIONS_WITH_PROVIDERS)],
            )
            .await?;
        let independent_providers: Vec<Provider> = self
            .select(
                PROVIDERS_TABLE,
                &[("select", "*"), ("organization_id", "is.null")],
            )
            .await?;

        tracing::info!(
            organizations = organizations.len(),
            independent_providers = independent_providers.len(),
            "loaded directory from datastore"
        );

        Ok(DirectorySnapshot {
            organizations,
            independent_providers,
            insurance_names: insurance_rows.into_iter().filter_map(|row| row.name).collect(),
        })
    }

    async fn insert_organization(
        &self,
        draft: &OrganizationDraft,
    ) -> DirectoryResult<Organization> {
        let mut organization: Organization =
            self.insert_single(ORGANIZATIONS_TABLE, draft).await?;
        organization.providers.clear();
        Ok(organization)
    }

    async fn insert_provider(
        &self,
        draft: &ProviderDraft,
        organization_id: Option<&RecordId>,
    ) -> DirectoryResult<Provider> {
        let body = ProviderInsert {
            draft,
            organization_id,
        };
        let mut provider: Provider = self.insert_single(PROVIDERS_TABLE, &body).await?;
        if provider.organization_id.is_none() {
            provider.organization_id = organization_id.cloned();
        }
        Ok(provider)
    }

    async fn update_organization(
        &self,
        id: &RecordId,
        draft: &OrganizationDraft,
    ) -> DirectoryResult<()> {
        self.update_by_id(ORGANIZATIONS_TABLE, id, draft).await
    }

    async fn update_provider(&self, id: &RecordId, draft: &ProviderDraft) -> DirectoryResult<()> {
        self.update_by_id(PROVIDERS_TABLE, id, draft).await
    }

    async fn delete_organization(&self, id: &RecordId) -> DirectoryResult<()> {
        self.delete_by_id(ORGANIZATIONS_TABLE, id).await
    }

    async fn delete_provider(&self, id: &RecordId) -> DirectoryResult<()> {
        self.delete_by_id(PROVIDERS_TABLE, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn unreachable_backend() -> RemoteBackend {
        // Port 1 on loopback is not expected to accept connections.
        let cfg = DatastoreConfig::new("http://127.0.0.1:1", "key").unwrap();
        RemoteBackend::new(cfg).unwrap()
    }

    #[test]
    fn table_url_joins_rest_path() {
        let backend = unreachable_backend();
        assert_eq!(
            backend.table_url(PROVIDERS_TABLE),
            "http://127.0.0.1:1/rest/v1/providers"
        );
    }

    #[test]
    fn provider_insert_body_flattens_draft_and_owner() {
        let mut draft = ProviderDraft::new("Dr. Sarah Smith");
        draft.insurances.insert("Medicare");
        let owner = RecordId::from("1");

        let body = serde_json::to_value(ProviderInsert {
            draft: &draft,
            organization_id: Some(&owner),
        })
        .unwrap();
        assert_eq!(body["name"], json!("Dr. Sarah Smith"));
        assert_eq!(body["insurances"], json!(["Medicare"]));
        assert_eq!(body["organization_id"], json!("1"));

        let independent = serde_json::to_value(ProviderInsert {
            draft: &draft,
            organization_id: None,
        })
        .unwrap();
        assert!(independent.get("organization_id").is_none());
    }

    #[tokio::test]
    async fn unreachable_datastore_surfaces_http_error() {
        let backend = unreachable_backend();
        let err = backend.load().await.expect_err("load should fail");
        assert!(matches!(err, DirectoryError::Http(_)));

        let err = backend
            .delete_provider(&RecordId::from("1"))
            .await
            .expect_err("delete should fail");
        assert!(matches!(err, DirectoryError::Http(_)));
    }

    mod datastore_protocol {
        use super::*;
        use axum::body::Bytes;
        use axum::extract::{Query, State};
        use axum::http::{HeaderMap, Method, StatusCode, Uri};
        use serde_json::Value;
        use std::sync::{Arc, Mutex};

        const ACCESS_KEY: &str = "secret-key";

        #[derive(Debug, Clone)]
        struct Recorded {
            method: Method,
            path: String,
            query: Vec<(String, String)>,
            headers: HeaderMap,
            body: Value,
        }

        type Log = Arc<Mutex<Vec<Recorded>>>;

        fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
            items
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        }

        /// Stand-in for the hosted datastore: records every request and answers with canned rows.
        async fn datastore(
            State(log): State<Log>,
            method: Method,
            uri: Uri,
            Query(query): Query<Vec<(String, String)>>,
            headers: HeaderMap,
            body: Bytes,
        ) -> (StatusCode, String) {
            let path = uri.path().to_string();
            log.lock().unwrap().push(Recorded {
                method: method.clone(),
                path: path.clone(),
                query,
                headers,
                body: serde_json::from_slice(&body).unwrap_or(Value::Null),
            });

            let (status, body) = match (method.as_str(), path.as_str()) {
                ("GET", "/rest/v1/custom_insurances") => (
                    StatusCode::OK,
                    json!([{"name": "Tricare"}, {"name": null}]),
                ),
                ("GET", "/rest/v1/organizations") => (
                    StatusCode::OK,
                    json!([{
                        "id": 1,
                        "name": "Central Medical",
                        "phone": null,
                        "insurances": ["Aetna"],
                        "providers": [{"id": 11, "name": "Dr. Ana Lopez", "organization_id": 1}]
                    }]),
                ),
                ("GET", "/rest/v1/providers") => (
                    StatusCode::OK,
                    json!([{"id": "401", "name": "Dr. Solo", "organization_id": null}]),
                ),
                ("POST", "/rest/v1/organizations") => (
                    StatusCode::CREATED,
                    json!([{"id": 7, "name": "New Clinic", "insurances": ["Aetna"]}]),
                ),
                ("POST", "/rest/v1/providers") => (StatusCode::CREATED, json!([])),
                ("PATCH", _) | ("DELETE", "/rest/v1/organizations") => {
                    return (StatusCode::NO_CONTENT, String::new())
                }
                ("DELETE", "/rest/v1/providers") => {
                    return (StatusCode::CONFLICT, "conflict".to_string())
                }
                _ => return (StatusCode::NOT_FOUND, String::new()),
            };
            (status, body.to_string())
        }

        async fn spawn_datastore() -> (RemoteBackend, Log) {
            let log: Log = Arc::default();
            let app = axum::Router::new()
                .fallback(datastore)
                .with_state(log.clone());
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });

            let cfg = DatastoreConfig::new(format!("http://{addr}"), ACCESS_KEY).unwrap();
            (RemoteBackend::new(cfg).unwrap(), log)
        }

        fn recorded(log: &Log) -> Vec<Recorded> {
            log.lock().unwrap().clone()
        }

        fn assert_authorised(request: &Recorded) {
            assert_eq!(request.headers[API_KEY_HEADER], ACCESS_KEY);
            assert_eq!(request.headers["authorization"], "Bearer secret-key");
        }

        #[tokio::test]
        async fn load_reads_catalog_organizations_and_independents() {
            let (backend, log) = spawn_datastore().await;

            let snapshot = backend.load().await.unwrap();
            assert_eq!(snapshot.insurance_names, vec!["Tricare"]);
            assert_eq!(snapshot.organizations.len(), 1);
            let organization = &snapshot.organizations[0];
            assert_eq!(organization.id.as_str(), "1");
            assert_eq!(organization.phone, "");
            assert_eq!(organization.providers[0].id.as_str(), "11");
            assert_eq!(organization.providers[0].organization_id, Some("1".into()));
            assert_eq!(snapshot.independent_providers[0].id.as_str(), "401");
            assert!(snapshot.independent_providers[0].is_independent());

            let requests = recorded(&log);
            assert_eq!(requests.len(), 3);
            for request in &requests {
                assert_eq!(request.method, Method::GET);
                assert_authorised(request);
            }
            assert_eq!(requests[0].path, "/rest/v1/custom_insurances");
            assert_eq!(requests[0].query, pairs(&[("select", "*")]));
            assert_eq!(requests[1].path, "/rest/v1/organizations");
            assert_eq!(requests[1].query, pairs(&[("select", "*,providers(*)")]));
            assert_eq!(requests[2].path, "/rest/v1/providers");
            assert_eq!(
                requests[2].query,
                pairs(&[("select", "*"), ("organization_id", "is.null")])
            );
        }

        #[tokio::test]
        async fn insert_sends_one_row_and_takes_the_returned_row() {
            let (backend, log) = spawn_datastore().await;
            let mut draft = OrganizationDraft::new("New Clinic");
            draft.insurances.insert("Aetna");

            let organization = backend.insert_organization(&draft).await.unwrap();
            assert_eq!(organization.id.as_str(), "7");
            assert_eq!(organization.name, "New Clinic");
            assert!(organization.providers.is_empty());

            let requests = recorded(&log);
            let insert = &requests[0];
            assert_eq!(insert.method, Method::POST);
            assert_eq!(insert.path, "/rest/v1/organizations");
            assert_authorised(insert);
            assert_eq!(insert.headers["prefer"], RETURN_REPRESENTATION);
            let rows = insert.body.as_array().expect("insert body is an array");
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0]["name"], json!("New Clinic"));
            assert_eq!(rows[0]["insurances"], json!(["Aetna"]));
        }

        #[tokio::test]
        async fn insert_without_returned_row_is_an_error() {
            let (backend, log) = spawn_datastore().await;
            let owner = RecordId::from("1");

            let err = backend
                .insert_provider(&ProviderDraft::new("Dr. New"), Some(&owner))
                .await
                .unwrap_err();
            assert!(matches!(err, DirectoryError::EmptyInsert(PROVIDERS_TABLE)));

            let requests = recorded(&log);
            assert_eq!(requests[0].body[0]["organization_id"], json!("1"));
            assert_eq!(requests[0].body[0]["name"], json!("Dr. New"));
        }

        #[tokio::test]
        async fn update_and_delete_filter_by_id() {
            let (backend, log) = spawn_datastore().await;
            let id = RecordId::from("7");

            backend
                .update_organization(&id, &OrganizationDraft::new("Renamed"))
                .await
                .unwrap();
            backend.delete_organization(&id).await.unwrap();

            let requests = recorded(&log);
            assert_eq!(requests.len(), 2);

            assert_eq!(requests[0].method, Method::PATCH);
            assert_eq!(requests[0].path, "/rest/v1/organizations");
            assert_eq!(requests[0].query, pairs(&[("id", "eq.7")]));
            assert_eq!(requests[0].body["name"], json!("Renamed"));
            assert_authorised(&requests[0]);

            assert_eq!(requests[1].method, Method::DELETE);
            assert_eq!(requests[1].path, "/rest/v1/organizations");
            assert_eq!(requests[1].query, pairs(&[("id", "eq.7")]));
            assert_authorised(&requests[1]);
        }

        #[tokio::test]
        async fn non_success_status_is_rejected() {
            let (backend, _log) = spawn_datastore().await;

            let err = backend
                .delete_provider(&RecordId::from("11"))
                .await
                .unwrap_err();
            match err {
                DirectoryError::Rejected {
                    operation,
                    table,
                    status,
                    body,
                } => {
                    assert_eq!(operation, "delete");
                    assert_eq!(table, PROVIDERS_TABLE);
                    assert_eq!(status, 409);
                    assert_eq!(body, "conflict");
                }
                other => panic!("expected a rejected write, got {other:?}"),
            }
        }
    }
}
