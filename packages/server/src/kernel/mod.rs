//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod directory_client;
pub mod event_hub;
pub mod notifications;
pub mod test_dependencies;
pub mod traits;
pub mod webhook_notifier;

pub use deps::ServerDeps;
pub use directory_client::DirectoryClient;
pub use event_hub::EventHub;
pub use notifications::{notifications_for, spawn_notification_dispatcher};
pub use test_dependencies::TestDependencies;
pub use traits::*;
pub use webhook_notifier::{LogNotifier, WebhookNotifier};
