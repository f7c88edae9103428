//! Payments from bank cards without a wallet session

use super::PaymentFlow;
use crate::{
    api::{ApiClient, ApiRequest, parse_json_response},
    config::Hosts,
    error::{PaymentError, PaymentResult},
    params::ParameterMap,
    types::{MoneySource, ProcessExternalPayment, RequestExternalPayment},
};
use async_trait::async_trait;
use moneta_http::{Method, Response};
use secrecy::{ExposeSecret, SecretString};

/// Supplies the inputs of an external payment
pub trait ParameterProvider: Send + Sync {
    /// Payment pattern, e.g. a showcase id or `p2p`
    fn pattern_id(&self) -> String;

    /// Parameters resolved for the pattern
    fn payment_parameters(&self) -> ParameterMap;

    /// Where the bank sends the payer after a successful authorization
    fn ext_auth_success_uri(&self) -> String;

    /// Where the bank sends the payer after a failed authorization
    fn ext_auth_fail_uri(&self) -> String;

    /// Saved card to pay with, if any
    fn money_source(&self) -> Option<MoneySource> {
        None
    }

    /// Card security code for a saved card
    fn csc(&self) -> Option<SecretString> {
        None
    }

    /// Ask the server to save the card for later payments
    fn request_token(&self) -> bool {
        false
    }
}

/// Plain-value [`ParameterProvider`]
#[derive(Debug, Clone, Default)]
pub struct ExternalPaymentParameters {
    /// Payment pattern
    pub pattern_id: String,
    /// Parameters for the pattern
    pub payment_parameters: ParameterMap,
    /// Success redirect
    pub ext_auth_success_uri: String,
    /// Failure redirect
    pub ext_auth_fail_uri: String,
    /// Saved card
    pub money_source: Option<MoneySource>,
    /// Security code for the saved card
    pub csc: Option<SecretString>,
    /// Save the card
    pub request_token: bool,
}

impl ParameterProvider for ExternalPaymentParameters {
    fn pattern_id(&self) -> String {
        self.pattern_id.clone()
    }

    fn payment_parameters(&self) -> ParameterMap {
        self.payment_parameters.clone()
    }

    fn ext_auth_success_uri(&self) -> String {
        self.ext_auth_success_uri.clone()
    }

    fn ext_auth_fail_uri(&self) -> String {
        self.ext_auth_fail_uri.clone()
    }

    fn money_source(&self) -> Option<MoneySource> {
        self.money_source.clone()
    }

    fn csc(&self) -> Option<SecretString> {
        self.csc.clone()
    }

    fn request_token(&self) -> bool {
        self.request_token
    }
}

/// `request-external-payment` call
#[derive(Debug, Clone)]
pub struct RequestExternalPaymentCall {
    params: ParameterMap,
}

impl RequestExternalPaymentCall {
    /// Build the call; the pattern and its parameters must be non-empty
    pub fn new(
        instance_id: &str,
        pattern_id: &str,
        payment_parameters: ParameterMap,
    ) -> PaymentResult<Self> {
        if instance_id.is_empty() || pattern_id.is_empty() {
            return Err(PaymentError::InvalidRequest(
                "instance id and pattern id are required".to_string(),
            ));
        }
        if payment_parameters.is_empty() {
            return Err(PaymentError::InvalidRequest(
                "payment parameters are empty".to_string(),
            ));
        }

        let mut params = payment_parameters;
        params.insert("instance_id", instance_id);
        params.insert("pattern_id", pattern_id);
        Ok(Self { params })
    }
}

impl ApiRequest for RequestExternalPaymentCall {
    type Output = RequestExternalPayment;

    fn method(&self) -> Method {
        Method::POST
    }

    fn url(&self, hosts: &Hosts) -> String {
        hosts.money_api_url("request-external-payment")
    }

    fn parameters(&self) -> &ParameterMap {
        &self.params
    }

    fn parse(self, response: Response) -> PaymentResult<Self::Output> {
        parse_json_response(&response)
    }
}

/// `process-external-payment` call
#[derive(Debug, Clone)]
pub struct ProcessExternalPaymentCall {
    params: ParameterMap,
}

impl ProcessExternalPaymentCall {
    /// Build the call for the payment identified by `request_id`
    ///
    /// A saved card is charged only when a security code accompanies it;
    /// otherwise the payer enters card data on the bank's page.
    pub fn new(
        instance_id: &str,
        request_id: &str,
        provider: &dyn ParameterProvider,
    ) -> PaymentResult<Self> {
        if request_id.is_empty() {
            return Err(PaymentError::InvalidRequest(
                "request id is required".to_string(),
            ));
        }

        let mut params = ParameterMap::new()
            .with("instance_id", instance_id)
            .with("request_id", request_id)
            .with("ext_auth_success_uri", provider.ext_auth_success_uri())
            .with("ext_auth_fail_uri", provider.ext_auth_fail_uri());

        let csc = provider.csc().filter(|csc| !csc.expose_secret().is_empty());
        match (provider.money_source(), csc) {
            (Some(MoneySource::PaymentCard(card)), Some(csc)) => {
                params.insert("money_source_token", card.money_source_token);
                params.insert("csc", csc.expose_secret());
            }
            _ => {
                params.insert("request_token", provider.request_token().to_string());
            }
        }

        Ok(Self { params })
    }
}

impl ApiRequest for ProcessExternalPaymentCall {
    type Output = ProcessExternalPayment;

    fn method(&self) -> Method {
        Method::POST
    }

    fn url(&self, hosts: &Hosts) -> String {
        hosts.money_api_url("process-external-payment")
    }

    fn parameters(&self) -> &ParameterMap {
        &self.params
    }

    fn parse(self, response: Response) -> PaymentResult<Self::Output> {
        parse_json_response(&response)
    }
}

/// [`PaymentFlow`] over the external payment methods
pub struct ExternalPaymentFlow<P: ParameterProvider> {
    client: ApiClient,
    provider: P,
    instance_id: String,
}

impl<P: ParameterProvider> ExternalPaymentFlow<P> {
    /// Create a flow for an application instance
    pub fn new(client: ApiClient, provider: P, instance_id: impl Into<String>) -> Self {
        Self {
            client,
            provider,
            instance_id: instance_id.into(),
        }
    }

    /// Create a flow using the instance id from the client configuration
    pub fn from_config(client: ApiClient, provider: P) -> PaymentResult<Self> {
        let instance_id = client
            .config()
            .instance_id
            .clone()
            .ok_or_else(|| PaymentError::Config("instance id is not configured".to_string()))?;
        Ok(Self::new(client, provider, instance_id))
    }

    /// Application instance id
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Replace the instance id
    pub fn set_instance_id(&mut self, instance_id: impl Into<String>) {
        self.instance_id = instance_id.into();
    }

    /// Set or clear the access token used by the client
    pub fn set_access_token(&mut self, token: Option<String>) {
        self.client.set_access_token(token);
    }

    /// Parameter source
    pub fn provider(&self) -> &P {
        &self.provider
    }
}

#[async_trait]
impl<P: ParameterProvider> PaymentFlow for ExternalPaymentFlow<P> {
    type Request = RequestExternalPayment;
    type Process = ProcessExternalPayment;

    async fn request_payment(&self) -> PaymentResult<RequestExternalPayment> {
        let call = RequestExternalPaymentCall::new(
            &self.instance_id,
            &self.provider.pattern_id(),
            self.provider.payment_parameters(),
        )?;
        self.client.execute(call).await
    }

    async fn process_payment(
        &self,
        request: &RequestExternalPayment,
    ) -> PaymentResult<ProcessExternalPayment> {
        let request_id = request.request_id.as_deref().ok_or_else(|| {
            PaymentError::InvalidState(format!(
                "payment request has no request id (status {:?}, error {:?})",
                request.status, request.error
            ))
        })?;
        let call = ProcessExternalPaymentCall::new(&self.instance_id, request_id, &self.provider)?;
        self.client.execute(call).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::ClientConfig,
        process::{PaymentProcess, ProcessState},
        types::{ExternalCard, ProcessStatus},
    };
    use moneta_http::MockTransport;
    use std::sync::Arc;

    fn parameters() -> ExternalPaymentParameters {
        ExternalPaymentParameters {
            pattern_id: "p2p".to_string(),
            payment_parameters: ParameterMap::new().with("to", "4100175017397").with("amount", "10"),
            ext_auth_success_uri: "app://success".to_string(),
            ext_auth_fail_uri: "app://fail".to_string(),
            ..Default::default()
        }
    }

    fn card() -> MoneySource {
        MoneySource::PaymentCard(ExternalCard {
            payment_card_type: Some("VISA".to_string()),
            pan_fragment: None,
            money_source_token: "card-token".to_string(),
        })
    }

    #[test]
    fn test_request_call_parameters() {
        let call = RequestExternalPaymentCall::new("inst", "p2p", parameters().payment_parameters)
            .unwrap();
        assert_eq!(call.parameters().get("instance_id"), Some("inst"));
        assert_eq!(call.parameters().get("pattern_id"), Some("p2p"));
        assert_eq!(call.parameters().get("amount"), Some("10"));

        assert!(RequestExternalPaymentCall::new("inst", "p2p", ParameterMap::new()).is_err());
        assert!(RequestExternalPaymentCall::new("", "p2p", parameters().payment_parameters).is_err());
    }

    #[test]
    fn test_process_call_uses_saved_card_only_with_csc() {
        let mut provider = parameters();
        provider.money_source = Some(card());
        provider.request_token = true;

        let call = ProcessExternalPaymentCall::new("inst", "req", &provider).unwrap();
        assert_eq!(call.parameters().get("request_token"), Some("true"));
        assert!(!call.parameters().contains_key("money_source_token"));

        provider.csc = Some(SecretString::new("123".into()));
        let call = ProcessExternalPaymentCall::new("inst", "req", &provider).unwrap();
        assert_eq!(call.parameters().get("money_source_token"), Some("card-token"));
        assert_eq!(call.parameters().get("csc"), Some("123"));
        assert!(!call.parameters().contains_key("request_token"));
        assert_eq!(call.parameters().get("ext_auth_fail_uri"), Some("app://fail"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_process_drives_external_payment() {
        let transport = Arc::new(MockTransport::new());
        transport
            .respond(200, r#"{"status": "success", "request_id": "r-1", "contract_amount": "10.00"}"#)
            .respond(200, r#"{"status": "in_progress", "next_retry": 1000}"#)
            .respond(200, r#"{"status": "success", "invoice_id": "inv-1"}"#);
        let client = ApiClient::new(transport.clone(), ClientConfig::default());
        let flow = ExternalPaymentFlow::new(client, parameters(), "inst");
        let mut process = PaymentProcess::new(flow);

        assert!(!process.proceed().await.unwrap());
        assert!(process.proceed().await.unwrap());
        assert_eq!(process.state(), ProcessState::Completed);

        let result = process.process_payment().unwrap();
        assert_eq!(result.status, ProcessStatus::Success);
        assert_eq!(result.invoice_id.as_deref(), Some("inv-1"));

        let requests = transport.requests();
        assert_eq!(requests.len(), 3);
        assert!(requests[0].url().ends_with("/request-external-payment"));
        for poll in &requests[1..] {
            assert!(poll.url().ends_with("/process-external-payment"));
            let body = std::str::from_utf8(poll.body_bytes().unwrap()).unwrap();
            assert!(body.contains("request_id=r-1"));
        }
    }

    #[tokio::test]
    async fn test_refused_request_cannot_be_processed() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(200, r#"{"status": "refused", "error": "illegal_param_to"}"#);
        let client = ApiClient::new(transport, ClientConfig::default());
        let mut process = PaymentProcess::new(ExternalPaymentFlow::new(client, parameters(), "inst"));

        process.proceed().await.unwrap();
        let err = process.proceed().await.unwrap_err();
        assert!(matches!(err, PaymentError::InvalidState(ref m) if m.contains("illegal_param_to")));
        assert_eq!(process.state(), ProcessState::Started);
    }

    #[test]
    fn test_from_config_requires_instance_id() {
        let client = ApiClient::new(Arc::new(MockTransport::new()), ClientConfig::default());
        let err = ExternalPaymentFlow::from_config(client, parameters()).err().unwrap();
        assert!(matches!(err, PaymentError::Config(_)));
    }
}
