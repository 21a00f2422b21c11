//! Estimo: planning poker over HTTP.
//!
//! Players open a [`Game`](models::Game), start rounds for the items they want
//! to size, drop their cards, and record the consensus once everyone has
//! voted. All mutations go through [`GameService`](gateway::GameService), which
//! serializes load-mutate-store cycles against the storage layer.

pub mod api;
pub mod client;
pub mod db;
pub mod gateway;
pub mod models;
pub mod render;
pub mod repository;
