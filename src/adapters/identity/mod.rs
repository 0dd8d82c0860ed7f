pub mod cognito;

pub use cognito::CognitoVerifier;
