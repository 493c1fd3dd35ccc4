//! Infrastructure layer: repositories (in-memory + Postgres), application
//! services and startup seeding.

pub mod repository;
pub mod seed;
pub mod services;

#[cfg(test)]
mod integration_tests;
