// ABOUTME: Library entry point for the SmartyShop shopping assistant client.
// ABOUTME: Re-exports AssistantClient, its builder, AssistantResponse and AssistantError.

//! Generative shopping assistant.
//!
//! ```no_run
//! use smartyshop_assistant::{AssistantClient, AssistantError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), AssistantError> {
//!     let client = AssistantClient::builder().api_key("...").build()?;
//!     let reply = client.insights(&[], "Which robot vacuum should I buy?").await?;
//!     println!("{}", reply.answer);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod prompt;
pub mod response;
pub mod wire;

pub use crate::client::{
    AssistantClient, AssistantClientBuilder, DEFAULT_ENDPOINT, DEFAULT_MODEL, DEFAULT_TIMEOUT,
};
pub use crate::error::AssistantError;
pub use crate::prompt::{build_prompt, product_line, MAX_RECOMMENDED};
pub use crate::response::{parse_reply, reply_text, strip_code_fence, AssistantResponse};
