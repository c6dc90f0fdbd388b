//! Authentication core for the Moviebase server.
//!
//! Registration, password login, access/refresh token rotation, password
//! reset, and Google identity linking. The HTTP surface lives in `handlers`;
//! everything below it is transport-agnostic.

pub mod google;
pub mod handlers;
pub mod password;
pub mod reset;
pub mod service;
pub mod token;

pub use google::{GoogleUserData, GoogleVerifier, HttpGoogleVerifier};
pub use service::{AuthResponse, AuthService};
pub use token::{Claims, TokenIssuer, TokenPair};
