//! Use-case level request handlers over the post service.
//!
//! # Responsibility
//! - Validate and normalize raw request input before calling the core.
//! - Translate each `ErrorCode` into a transport status and envelope.
//!
//! # Invariants
//! - Handlers never panic and never expose raw store errors.
//! - Rejected input is answered with `BADPARAMS` without touching the store.

use crate::params::{CreateRequest, ListParams, RequestError, UpdateRequest};
use crate::response::{current_page_link, payload_data, ApiResponse, ResponseBody};
use crate::status::{status_for, Operation};
use bender_core::{ErrorCode, Executor, PostService, QueryResult};
use log::warn;
use serde_json::json;

/// Greeting served at `/` and `/api`.
pub const GREETING: &str = "Hello, this is Bender, the bending machine";

/// Request handlers for the `/api/blogs` resource.
pub struct BlogApi<E: Executor> {
    service: PostService<E>,
}

impl<E: Executor> BlogApi<E> {
    pub fn new(service: PostService<E>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &PostService<E> {
        &self.service
    }

    pub fn greet(&self) -> &'static str {
        GREETING
    }

    /// `GET /api/blogs?fields=&limit=&offset=`
    pub fn list(
        &self,
        fields: Option<&str>,
        limit: Option<&str>,
        offset: Option<&str>,
    ) -> ApiResponse {
        let params = match ListParams::parse(fields, limit, offset) {
            Ok(params) => params,
            Err(err) => return bad_params("post_list", Operation::List, &err),
        };

        let result = self
            .service
            .list_all(&params.fields, params.limit, params.offset);
        let mut response = respond(Operation::List, &result);
        if response.status == 200 && !result.rows().is_empty() {
            response.body = response
                .body
                .with_links(vec![current_page_link(params.limit, params.offset)]);
        }
        response
    }

    /// `GET /api/blogs/:id?fields=`
    pub fn get(&self, id: &str, fields: Option<&str>) -> ApiResponse {
        let params = match ListParams::parse(fields, None, None) {
            Ok(params) => params,
            Err(err) => return bad_params("post_get", Operation::Get, &err),
        };
        respond(Operation::Get, &self.service.get_by_id(id, &params.fields))
    }

    /// `POST /api/blogs` with a JSON body.
    pub fn create(&self, body: &str) -> ApiResponse {
        let post = match CreateRequest::from_json(body).and_then(CreateRequest::into_new_post) {
            Ok(post) => post,
            Err(err) => return bad_params("post_create", Operation::Create, &err),
        };
        respond(Operation::Create, &self.service.create(post))
    }

    /// `PUT /api/blogs/:id` with a JSON body.
    pub fn update(&self, id: &str, body: &str) -> ApiResponse {
        let changes = match UpdateRequest::from_json(body) {
            Ok(request) => request.into_changes(),
            Err(err) => return bad_params("post_update", Operation::Update, &err),
        };
        respond(Operation::Update, &self.service.update(id, changes))
    }

    /// `DELETE /api/blogs/:id`
    pub fn delete(&self, id: &str) -> ApiResponse {
        respond(Operation::Delete, &self.service.delete(id))
    }
}

fn respond(operation: Operation, result: &QueryResult) -> ApiResponse {
    ApiResponse {
        status: status_for(operation, result.errno, result.rows().len()),
        body: ResponseBody::new(result.errno, payload_data(&result.payload)),
    }
}

fn bad_params(event: &str, operation: Operation, err: &RequestError) -> ApiResponse {
    warn!("event={event} module=api status=rejected errno=BADPARAMS error={err}");
    ApiResponse {
        status: status_for(operation, ErrorCode::BadParams, 0),
        body: ResponseBody::new(ErrorCode::BadParams, json!({ "error": err.to_string() })),
    }
}
