// Moneta - client SDK for a wallet payment service
//
// This library re-exports the transport layer and the payment submission
// engine: showcase forms, the form wizard and the payment process.

// Re-export the transport layer
pub use moneta_http as http;

// Re-export the payment engine
#[cfg(feature = "payments")]
pub use moneta_payments::*;

#[cfg(feature = "payments")]
pub mod prelude {
    pub use moneta_http::{HttpClient, HttpClientConfig, Transport};
    pub use moneta_payments::prelude::*;
}
