//! # Quill Client Entry Point
//!
//! ## Startup Sequence
//! 1. Initialize tracing (logging)
//! 2. Read `QUILL_*` configuration
//! 3. Start the session (selection, clients, products)
//! 4. Resolve the landing route
//!
//! Backend failures are logged, never fatal.

#[tokio::main]
async fn main() {
    // The actual setup is in lib.rs for better testability
    quill_client::run().await;
}
