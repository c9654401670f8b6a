use uuid::Uuid;

/// Per-request context inserted by [`crate::middleware::request_id_middleware`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RequestContext {
    request_id: Uuid,
}

impl RequestContext {
    pub fn new(request_id: Uuid) -> Self {
        Self { request_id }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }
}
