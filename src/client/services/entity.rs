//! # Entity Service
//!
//! CRUD operations over a REST resource for any `RestEntity`.
//!
//! Date fields are normalized by the entity's serde representation, so the
//! payload built here already carries wire-format dates (or `null`) and the
//! decoded responses already carry parsed `CalendarDate` values.

use super::http::{ApiRequest, ApiResponse, HttpError, HttpTransport};
use crate::client::models::{
    create_request_params, Emprestimo, Livro, RequestOptions, Reserva, RestEntity,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

/// Pagination header carrying the total number of records
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// Decoded response of an entity operation
#[derive(Debug, Clone, PartialEq)]
pub struct EntityResponse<B> {
    /// Address that answered
    pub url: String,
    pub status: u16,
    pub status_text: String,
    pub headers: HashMap<String, String>,
    pub body: Option<B>,
}

/// Response of a collection query
pub type EntityArrayResponse<E> = EntityResponse<Vec<E>>;

impl<B> EntityResponse<B> {
    /// Build a response around an already decoded body
    pub fn new(status: u16, body: Option<B>) -> Self {
        let raw = ApiResponse::new(status, None);
        Self {
            url: raw.url,
            status,
            status_text: raw.status_text,
            headers: HashMap::new(),
            body,
        }
    }

    /// Check if the status indicates success (2xx)
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Total record count announced by the server for paginated queries
    pub fn total_count(&self) -> Option<u64> {
        self.header(TOTAL_COUNT_HEADER)
            .and_then(|value| value.trim().parse().ok())
    }

    fn decode(response: ApiResponse, url: &str) -> Result<Self, HttpError>
    where
        B: DeserializeOwned,
    {
        let body = match response.body {
            None | Some(Value::Null) => None,
            Some(value) => Some(serde_json::from_value(value).map_err(|e| {
                tracing::warn!("Failed to decode response from {}: {}", url, e);
                HttpError::Decode {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            })?),
        };
        let url = if response.url.is_empty() {
            url.to_string()
        } else {
            response.url
        };
        Ok(Self {
            url,
            status: response.status,
            status_text: response.status_text,
            headers: response.headers,
            body,
        })
    }
}

/// REST client for one entity resource
pub struct EntityService<E, T> {
    transport: Arc<T>,
    _entity: PhantomData<fn() -> E>,
}

/// Loan resource client
pub type EmprestimoService<T> = EntityService<Emprestimo, T>;
/// Reservation resource client
pub type ReservaService<T> = EntityService<Reserva, T>;
/// Book resource client
pub type LivroService<T> = EntityService<Livro, T>;

impl<E, T> Clone for EntityService<E, T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            _entity: PhantomData,
        }
    }
}

impl<E: RestEntity, T: HttpTransport> EntityService<E, T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self {
            transport,
            _entity: PhantomData,
        }
    }

    /// Collection endpoint, e.g. `api/emprestimos`
    pub fn resource_url(&self) -> &'static str {
        E::RESOURCE_PATH
    }

    fn item_url(id: i64) -> String {
        format!("{}/{}", E::RESOURCE_PATH, id)
    }

    fn to_payload(entity: &E) -> Result<Value, HttpError> {
        serde_json::to_value(entity).map_err(|e| HttpError::InvalidRequest {
            url: E::RESOURCE_PATH.to_string(),
            message: e.to_string(),
        })
    }

    /// POST a new entity to the collection
    pub async fn create(&self, entity: &E) -> Result<EntityResponse<E>, HttpError> {
        tracing::debug!("Creating {}", E::NAME);
        let request = ApiRequest::post(E::RESOURCE_PATH, Self::to_payload(entity)?);
        let response = self.transport.send(request).await?;
        EntityResponse::decode(response, E::RESOURCE_PATH)
    }

    /// PUT an existing entity to the collection
    pub async fn update(&self, entity: &E) -> Result<EntityResponse<E>, HttpError> {
        tracing::debug!("Updating {} {:?}", E::NAME, entity.id());
        let request = ApiRequest::put(E::RESOURCE_PATH, Self::to_payload(entity)?);
        let response = self.transport.send(request).await?;
        EntityResponse::decode(response, E::RESOURCE_PATH)
    }

    /// GET one entity by identifier
    pub async fn find(&self, id: i64) -> Result<EntityResponse<E>, HttpError> {
        tracing::debug!("Finding {} {}", E::NAME, id);
        let url = Self::item_url(id);
        let response = self.transport.send(ApiRequest::get(url.as_str())).await?;
        EntityResponse::decode(response, &url)
    }

    /// GET the collection, optionally filtered, sorted and paginated.
    ///
    /// The returned sequence keeps the server's order.
    pub async fn query(
        &self,
        options: Option<&RequestOptions>,
    ) -> Result<EntityArrayResponse<E>, HttpError> {
        let params = create_request_params(options);
        tracing::debug!("Querying {} with {:?}", E::NAME, params);
        let request = ApiRequest::get(E::RESOURCE_PATH).with_params(params);
        let response = self.transport.send(request).await?;
        EntityResponse::decode(response, E::RESOURCE_PATH)
    }

    /// DELETE one entity by identifier; the response body is not decoded
    pub async fn delete(&self, id: i64) -> Result<ApiResponse, HttpError> {
        tracing::debug!("Deleting {} {}", E::NAME, id);
        self.transport
            .send(ApiRequest::delete(Self::item_url(id)))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::models::CalendarDate;
    use crate::client::services::mock::MockTransport;
    use reqwest::Method;
    use serde_json::json;

    fn service(mock: &Arc<MockTransport>) -> EmprestimoService<MockTransport> {
        EmprestimoService::new(Arc::clone(mock))
    }

    #[tokio::test]
    async fn create_should_post_formatted_date_and_parse_reply() {
        let mock = Arc::new(MockTransport::new());
        mock.on(
            Method::POST,
            "api/emprestimos",
            Ok(ApiResponse::new(
                201,
                Some(json!({"id": 10, "dataEmprestimo": "2019-05-20"})),
            )),
        );

        let loan = Emprestimo::new(Some(CalendarDate::from_ymd(2019, 5, 20)));
        let response = service(&mock).create(&loan).await.unwrap();

        let sent = mock.last_request().unwrap();
        assert_eq!(sent.body, Some(json!({"dataEmprestimo": "2019-05-20"})));
        assert_eq!(response.status, 201);
        let created = response.body.unwrap();
        assert_eq!(created.id, Some(10));
        assert_eq!(created.data_emprestimo, Some(CalendarDate::from_ymd(2019, 5, 20)));
    }

    #[tokio::test]
    async fn create_should_not_modify_the_callers_entity() {
        let mock = Arc::new(MockTransport::new());
        mock.on(
            Method::POST,
            "api/emprestimos",
            Ok(ApiResponse::new(201, Some(json!({"id": 1})))),
        );

        let loan = Emprestimo::new(Some(CalendarDate::parse("garbage")));
        service(&mock).create(&loan).await.unwrap();

        assert_eq!(mock.last_request().unwrap().body, Some(json!({"dataEmprestimo": null})));
        assert_eq!(loan.data_emprestimo, Some(CalendarDate::parse("garbage")));
    }

    #[tokio::test]
    async fn update_should_put_to_collection_endpoint() {
        let mock = Arc::new(MockTransport::new());
        mock.on(
            Method::PUT,
            "api/emprestimos",
            Ok(ApiResponse::json(json!({"id": 4, "dataEmprestimo": null}))),
        );

        let loan = Emprestimo::new(None).with_id(4);
        let response = service(&mock).update(&loan).await.unwrap();

        assert_eq!(
            mock.last_request().unwrap().body,
            Some(json!({"id": 4, "dataEmprestimo": null}))
        );
        assert_eq!(response.body.unwrap().data_emprestimo, None);
    }

    #[tokio::test]
    async fn find_should_get_item_url() {
        let mock = Arc::new(MockTransport::new());
        mock.on(
            Method::GET,
            "api/emprestimos/3",
            Ok(ApiResponse::json(json!({"id": 3, "dataEmprestimo": "2018-11-02"}))),
        );

        let response = service(&mock).find(3).await.unwrap();
        assert_eq!(response.url, "api/emprestimos/3");
        let found = response.body.unwrap();
        assert_eq!(found.data_emprestimo, Some(CalendarDate::from_ymd(2018, 11, 2)));
    }

    #[tokio::test]
    async fn find_should_propagate_missing_entity_unchanged() {
        let mock = Arc::new(MockTransport::new());
        let error = service(&mock).find(99).await.unwrap_err();
        assert_eq!(error.status(), Some(404));
    }

    #[tokio::test]
    async fn query_should_decode_every_element_in_order() {
        let mock = Arc::new(MockTransport::new());
        mock.on(
            Method::GET,
            "api/emprestimos",
            Ok(ApiResponse::json(json!([
                {"id": 2, "dataEmprestimo": "2019-02-01"},
                {"id": 1, "dataEmprestimo": null},
                {"id": 3, "dataEmprestimo": "2019-03-01"}
            ]))
            .with_header("X-Total-Count", "3")),
        );

        let options = RequestOptions::new().page(0).size(20).sort("id,desc");
        let response = service(&mock).query(Some(&options)).await.unwrap();

        assert_eq!(response.total_count(), Some(3));
        let loans = response.body.unwrap();
        assert_eq!(
            loans.iter().map(|l| l.id).collect::<Vec<_>>(),
            vec![Some(2), Some(1), Some(3)]
        );
        assert_eq!(loans[0].data_emprestimo, Some(CalendarDate::from_ymd(2019, 2, 1)));
        assert_eq!(loans[1].data_emprestimo, None);
        assert_eq!(loans[2].data_emprestimo, Some(CalendarDate::from_ymd(2019, 3, 1)));

        let sent = mock.last_request().unwrap();
        assert_eq!(
            sent.params,
            vec![
                ("page".to_string(), "0".to_string()),
                ("size".to_string(), "20".to_string()),
                ("sort".to_string(), "id,desc".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn query_without_options_should_send_no_params() {
        let mock = Arc::new(MockTransport::new());
        mock.on(Method::GET, "api/emprestimos", Ok(ApiResponse::json(json!([]))));

        let response = service(&mock).query(None).await.unwrap();
        assert_eq!(response.body, Some(Vec::new()));
        assert!(mock.last_request().unwrap().params.is_empty());
    }

    #[tokio::test]
    async fn query_should_report_undecodable_bodies() {
        let mock = Arc::new(MockTransport::new());
        mock.on(Method::GET, "api/emprestimos", Ok(ApiResponse::json(json!({"not": "a list"}))));

        let error = service(&mock).query(None).await.unwrap_err();
        assert!(matches!(error, HttpError::Decode { .. }));
    }

    #[tokio::test]
    async fn delete_should_hit_item_url_without_decoding() {
        let mock = Arc::new(MockTransport::new());
        mock.on(Method::DELETE, "api/emprestimos/8", Ok(ApiResponse::new(200, None)));

        let response = service(&mock).delete(8).await.unwrap();
        assert!(response.ok());
        assert_eq!(mock.request_count(&Method::DELETE, "api/emprestimos/8"), 1);
    }

    #[tokio::test]
    async fn transport_errors_should_surface_unchanged() {
        let mock = Arc::new(MockTransport::new());
        let network = HttpError::Transport {
            url: "api/emprestimos".to_string(),
            message: "Network Error".to_string(),
        };
        mock.on(Method::POST, "api/emprestimos", Err(network.clone()));

        let error = service(&mock).create(&Emprestimo::default()).await.unwrap_err();
        assert_eq!(error, network);
    }

    #[test]
    fn total_count_should_ignore_missing_or_bad_header() {
        let response: EntityArrayResponse<Reserva> = EntityResponse::new(200, Some(Vec::new()));
        assert_eq!(response.total_count(), None);
        assert_eq!(response.status_text, "OK");
    }
}
