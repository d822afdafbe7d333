use crate::entity::broadcast;
use crate::flash::FlashMessage;
use crate::format::ResponseFormat;
use crate::principal::Principal;

/// Per-request state assembled by the gate middleware and read by handlers
/// through `Extension<RequestContext>`.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub principal: Option<Principal>,
    pub format: ResponseFormat,
    /// Locale this response renders in.
    pub locale: String,
    /// Path and query of the request, as recorded for bounce-back.
    pub full_path: String,
    /// Messages queued by the previous request.
    pub flash: Vec<FlashMessage>,
    /// Messages for this response only.
    pub notices: Vec<FlashMessage>,
    /// Side panel content, filled once the request is authenticated.
    pub notifications: Vec<broadcast::Model>,
}

impl RequestContext {
    pub fn is_admin(&self) -> bool {
        self.principal.as_ref().is_some_and(Principal::is_admin)
    }

    /// Flash and notices together, in display order.
    pub fn messages(&self) -> impl Iterator<Item = &FlashMessage> {
        self.flash.iter().chain(self.notices.iter())
    }
}
