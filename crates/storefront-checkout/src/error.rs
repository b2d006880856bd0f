use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckoutError {
    /// No checkout capability was provided to the bridge.
    #[error("checkout integration is not available")]
    Integration,

    #[error("basket ident is required to launch checkout")]
    MissingBasketIdent,
}
