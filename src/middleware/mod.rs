pub mod oauth;
pub mod validator;

pub use oauth::{extract_token, oauth_validation_middleware, GateAction, OAuthGateway};
pub use validator::{HttpTokenValidator, TokenValidator, ValidationOutcome, ValidatorError};
