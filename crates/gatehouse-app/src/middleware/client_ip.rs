use salvo::Depot;

use crate::request::client_ip;

/// Client address resolved once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientAddress(pub String);

/// ## Summary
/// Resolves the caller's address and stores it in the depot.
///
/// Forwarding headers are only honored when `trust_forwarded_for` is set.
pub struct ClientAddressHandler {
    pub trust_forwarded_for: bool,
}

#[salvo::async_trait]
impl salvo::Handler for ClientAddressHandler {
    async fn handle(
        &self,
        req: &mut salvo::Request,
        depot: &mut Depot,
        _res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        depot.inject(ClientAddress(client_ip(req, self.trust_forwarded_for)));
    }
}

/// Address stored by [`ClientAddressHandler`], or `"unknown"` if it did not run.
#[must_use]
pub fn client_address(depot: &Depot) -> String {
    depot
        .obtain::<ClientAddress>()
        .map_or_else(|_err| "unknown".to_owned(), |address| address.0.clone())
}
