pub mod api;
pub mod client;
pub mod error;
pub mod types;

pub use api::CommerceApi;
pub use client::CommerceClient;
pub use error::CommerceError;
pub use types::{CreateBasketOptions, Page, SidebarModule};
