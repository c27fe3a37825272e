//! Circle Server
//!
//! Backend for a small social network: accounts, friend requests, posts
//! with likes, notifications, and an admin-run verification workflow.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod notifications;
pub mod posts;
pub mod social;
pub mod users;
pub mod verification;
