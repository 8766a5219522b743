//! Integration tests
//!
//! HTTP tests for the inbox API and end-to-end tests of the notification
//! pipeline through the dispatcher.

mod notifications_api_test;
mod pipeline_test;
mod realtime;
