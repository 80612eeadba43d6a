//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every rental endpoint, the health probes and the
//! request/response bodies. The document backs Swagger UI in debug builds and
//! is exported by `cargo run --bin openapi-dump`.

use crate::inbound::http::dto::{
    AddressBody, AddressRequest, BikeBody, BikeRequest, ClientBody, ClientRequest, CommentBody,
    CommentRequest, OrderBody, OrderRequest, StorageBody, StorageRequest,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use utoipa::OpenApi;

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bike rental API",
        description = "Addresses, storages, bikes, clients, comments and orders of a bike rental."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::addresses::create_address,
        crate::inbound::http::addresses::list_addresses,
        crate::inbound::http::addresses::get_address,
        crate::inbound::http::addresses::update_address,
        crate::inbound::http::storages::create_storage,
        crate::inbound::http::storages::list_storages,
        crate::inbound::http::storages::get_storage,
        crate::inbound::http::storages::list_storage_bikes,
        crate::inbound::http::storages::list_storage_orders,
        crate::inbound::http::bikes::create_bike,
        crate::inbound::http::bikes::list_bikes,
        crate::inbound::http::bikes::get_bike,
        crate::inbound::http::bikes::list_bike_orders,
        crate::inbound::http::bikes::update_bike,
        crate::inbound::http::clients::create_client,
        crate::inbound::http::clients::list_clients,
        crate::inbound::http::clients::search_clients,
        crate::inbound::http::clients::get_client,
        crate::inbound::http::clients::list_client_comments,
        crate::inbound::http::clients::list_client_orders,
        crate::inbound::http::clients::update_client,
        crate::inbound::http::comments::create_comment,
        crate::inbound::http::comments::list_comments,
        crate::inbound::http::comments::get_comment,
        crate::inbound::http::orders::create_order,
        crate::inbound::http::orders::list_orders,
        crate::inbound::http::orders::get_order,
        crate::inbound::http::orders::update_order,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        AddressRequest,
        AddressBody,
        StorageRequest,
        StorageBody,
        BikeRequest,
        BikeBody,
        ClientRequest,
        ClientBody,
        CommentRequest,
        CommentBody,
        OrderRequest,
        OrderBody,
    )),
    tags(
        (name = "addresses", description = "Addresses and their paired storages"),
        (name = "storages", description = "Storages and what they hold"),
        (name = "bikes", description = "Rentable bikes"),
        (name = "clients", description = "Rental customers"),
        (name = "comments", description = "Remarks about clients"),
        (name = "orders", description = "Rental orders"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    // utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn openapi_error_schema_has_required_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get(ERROR_SCHEMA_NAME).expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
    }

    #[test]
    fn order_body_schema_is_camel_case() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let order = schemas.get("OrderBody").expect("OrderBody schema");

        assert_object_schema_has_field(order, "bikeIds");
        assert_object_schema_has_field(order, "storageId");
    }

    #[rstest]
    #[case("/api/v1/addresses/{id}/update")]
    #[case("/api/v1/storages/{id}/bikes")]
    #[case("/api/v1/clients/search")]
    #[case("/api/v1/orders/{id}/update")]
    #[case("/health/ready")]
    fn document_lists_path(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }
}
