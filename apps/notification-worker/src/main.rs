//! Notification Worker - Entry Point
//!
//! Background worker that reacts to task events with notifications.

#[tokio::main]
async fn main() -> eyre::Result<()> {
    notification_worker::run().await
}
